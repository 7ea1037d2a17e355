pub mod error;
pub mod routes;
pub mod service;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::BookStore;
use bookshelf_kernel::{module::RouteInfo, InitCtx, Module};
use serde_json::json;

pub use error::BookError;
pub use service::BookService;

/// The book resource: validation, mediation and HTTP handlers over a [`BookStore`].
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            service: BookService::new(store),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "book"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "book module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn route_table(&self) -> Vec<RouteInfo> {
        vec![
            RouteInfo {
                method: "GET",
                path: "/",
                summary: "List books",
            },
            RouteInfo {
                method: "POST",
                path: "/",
                summary: "Create a book",
            },
            RouteInfo {
                method: "GET",
                path: "/{isbn}",
                summary: "Get a book by isbn",
            },
            RouteInfo {
                method: "PUT",
                path: "/{isbn}",
                summary: "Update a book by isbn",
            },
            RouteInfo {
                method: "DELETE",
                path: "/{isbn}",
                summary: "Delete a book by isbn",
            },
        ]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let json_body = |schema: serde_json::Value| {
            json!({ "application/json": { "schema": schema } })
        };
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let message_ref = json!({ "$ref": "#/components/schemas/Confirmation" });
        let isbn_param = json!([{
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": json_body(json!({ "type": "array", "items": book_ref }))
                            },
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": json_body(json!({ "$ref": "#/components/schemas/CreateBook" }))
                        },
                        "responses": {
                            "201": { "description": "Created book", "content": json_body(book_ref.clone()) },
                            "400": error("Validation error"),
                            "409": error("A book with this isbn already exists"),
                            "500": error("Internal server error")
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by isbn",
                        "description": "Responds 200 with a null body when no book matches.",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "responses": {
                            "200": { "description": "The book, or null", "content": json_body(book_ref.clone()) },
                            "400": error("Validation error"),
                            "500": error("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Update a book by isbn",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "requestBody": {
                            "required": false,
                            "content": json_body(json!({ "$ref": "#/components/schemas/UpdateBook" }))
                        },
                        "responses": {
                            "200": { "description": "Updated", "content": json_body(message_ref.clone()) },
                            "400": error("Validation error"),
                            "404": error("Book not found"),
                            "409": error("Another book already uses the new isbn"),
                            "500": error("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book by isbn",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "responses": {
                            "200": { "description": "Deleted", "content": json_body(message_ref) },
                            "400": error("Validation error"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string", "description": "Unique identifier for the book" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "publishYear": { "type": "integer" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["isbn", "title", "description", "publishYear", "createdAt", "updatedAt"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "publishYear": { "type": "integer" }
                        },
                        "required": ["isbn", "title", "description", "publishYear"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": {
                            "isbn": { "type": "string" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "publishYear": { "type": "integer" }
                        }
                    },
                    "Confirmation": {
                        "type": "object",
                        "properties": {
                            "msg": { "type": "string" }
                        },
                        "required": ["msg"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module stopped");
        Ok(())
    }
}

/// Create a new instance of the book module
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
