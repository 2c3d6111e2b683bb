//! OpenAPI 3.0 description of the HTTP surface, served at `/api-docs`.

use serde_json::{json, Value};

use crate::validation::MAX_TEXT_CHARS;

/// Path the document is served from.
pub const API_DOCS_PATH: &str = "/api-docs";

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorEnvelope" }
            }
        }
    })
}

fn json_response(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

/// Build the OpenAPI document.
pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Snippet Summarizer API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "AI-powered text summarization service"
        },
        "paths": {
            "/snippets": {
                "post": {
                    "summary": "Create a new snippet with AI-generated summary",
                    "tags": ["Snippets"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateSnippetRequest" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Snippet created successfully",
                            "headers": {
                                "Location": {
                                    "description": "Path of the new snippet",
                                    "schema": { "type": "string" }
                                }
                            },
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Snippet" }
                                }
                            }
                        },
                        "400": error_response("Validation error"),
                        "503": error_response("AI service is currently unavailable")
                    }
                },
                "get": {
                    "summary": "Get all snippets",
                    "tags": ["Snippets"],
                    "responses": {
                        "200": json_response("List of snippets retrieved successfully", "SnippetList")
                    }
                }
            },
            "/snippets/{id}": {
                "get": {
                    "summary": "Get a snippet by ID",
                    "tags": ["Snippets"],
                    "parameters": [{
                        "in": "path",
                        "name": "id",
                        "required": true,
                        "schema": { "type": "string", "pattern": "^[0-9a-fA-F]{24}$" },
                        "description": "Snippet ID"
                    }],
                    "responses": {
                        "200": json_response("Snippet retrieved successfully", "Snippet"),
                        "400": error_response("Invalid ID format"),
                        "404": error_response("Snippet not found")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Liveness check",
                    "tags": ["Health"],
                    "responses": {
                        "200": { "description": "Service is up" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "CreateSnippetRequest": {
                    "type": "object",
                    "required": ["text"],
                    "properties": {
                        "text": {
                            "type": "string",
                            "minLength": 1,
                            "maxLength": MAX_TEXT_CHARS,
                            "description": "Text content to summarize"
                        }
                    }
                },
                "Snippet": {
                    "type": "object",
                    "required": ["id", "text", "summary", "createdAt"],
                    "properties": {
                        "id": { "type": "string" },
                        "text": { "type": "string" },
                        "summary": { "type": "string" },
                        "createdAt": { "type": "string", "format": "date-time" }
                    }
                },
                "SnippetList": {
                    "type": "object",
                    "required": ["snippets", "total"],
                    "properties": {
                        "snippets": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Snippet" }
                        },
                        "total": { "type": "integer" }
                    }
                },
                "ErrorEnvelope": {
                    "type": "object",
                    "required": ["error", "message", "statusCode", "timestamp"],
                    "properties": {
                        "error": { "type": "string" },
                        "message": { "type": "string" },
                        "statusCode": { "type": "integer" },
                        "timestamp": { "type": "string", "format": "date-time" }
                    }
                }
            }
        }
    })
}
