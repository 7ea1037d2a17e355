//! Bookshelf application library
//!
//! Wires the book module onto the kernel registry and runs it behind the HTTP facade.

pub mod modules;

pub use modules::*;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Connect the configured store and register every module against it.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let store = bookshelf_db::connect(&settings.database.endpoint)
        .with_context(|| "failed to open book store")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Run the service until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use bookshelf_kernel::settings::DatabaseSettings;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let settings = Settings::default();
        let registry = build_registry(&settings).unwrap();
        bookshelf_http::build_router(&registry, &settings)
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[test]
    fn registry_contains_book_module() {
        let registry = build_registry(&Settings::default()).unwrap();
        assert!(registry.get_module("book").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_store_endpoint_fails_registry() {
        let settings = Settings {
            database: DatabaseSettings {
                endpoint: "postgres://localhost/books".to_string(),
            },
            ..Settings::default()
        };
        let err = build_registry(&settings).err().unwrap();
        assert!(format!("{err:#}").contains("unsupported store scheme 'postgres'"));
    }

    #[tokio::test]
    async fn book_lifecycle_through_the_full_router() {
        let app = app();
        let book = json!({
            "isbn": "aa123",
            "title": "book123",
            "description": "new book add",
            "publishYear": 2014
        });

        let (status, created) = call(&app, "POST", "/book", Some(book.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["isbn"], "aa123");
        assert_eq!(created["publishYear"], 2014);

        let (status, _) = call(&app, "POST", "/book", Some(book)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, fetched) = call(&app, "GET", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "book123");

        let update = json!({"publishYear": 2020});
        let (status, body) = call(&app, "PUT", "/book/aa123", Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Update Successfully"}));

        let (status, body) = call(&app, "DELETE", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Deleted Successfully"}));

        let (status, _) = call(&app, "DELETE", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_lists_book_paths() {
        let app = app();
        let (status, spec) = call(&app, "GET", "/docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(spec["paths"]["/book"]["post"].is_object());
        assert!(spec["paths"]["/book/{isbn}"]["delete"].is_object());
    }
}
