//! HTTP handlers for the book resource.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_db::Book;
use bookshelf_http::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::service::BookService;
use super::validation::{self, Fields};

pub const UPDATED: &str = "Update Successfully";
pub const DELETED: &str = "Deleted Successfully";

/// Confirmation body for update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub msg: String,
}

impl Confirmation {
    fn new(msg: &str) -> Json<Self> {
        Json(Self {
            msg: msg.to_string(),
        })
    }
}

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list().await?))
}

/// Serializes to `null` when no record matches.
async fn get_book(
    State(service): State<BookService>,
    Path(isbn): Path<String>,
) -> Result<Json<Option<Book>>, AppError> {
    validation::identifier(&isbn)?;
    Ok(Json(service.get(&isbn).await?))
}

async fn create_book(
    State(service): State<BookService>,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let fields = body_fields(&body)?;
    let input = validation::create_input(&fields)?;
    let book = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(service): State<BookService>,
    Path(isbn): Path<String>,
    body: Bytes,
) -> Result<Json<Confirmation>, AppError> {
    let fields = body_fields(&body)?;
    let patch = validation::update_input(&isbn, &fields)?;
    service.update(&isbn, patch).await?;
    Ok(Confirmation::new(UPDATED))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(isbn): Path<String>,
) -> Result<Json<Confirmation>, AppError> {
    validation::identifier(&isbn)?;
    service.delete(&isbn).await?;
    Ok(Confirmation::new(DELETED))
}

/// Field map of a request body. An absent body is an empty map, so a bare PUT is a
/// zero-field update and a bare POST reports every field as missing.
fn body_fields(body: &Bytes) -> Result<Fields, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Fields::new());
    }

    match Json::<Value>::from_bytes(body) {
        Ok(Json(Value::Object(fields))) => Ok(fields),
        Ok(Json(_)) => Err(AppError::bad_request("request body must be a JSON object")),
        Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use bookshelf_db::{BookPatch, BookStore, MemoryBookStore, NewBook, StoreError};
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;

    /// Memory store that counts insert calls.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryBookStore,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl BookStore for RecordingStore {
        async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
            self.inner.find_all().await
        }

        async fn find_one(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
            self.inner.find_one(isbn).await
        }

        async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(book).await
        }

        async fn find_and_update(
            &self,
            isbn: &str,
            patch: BookPatch,
        ) -> Result<Option<Book>, StoreError> {
            self.inner.find_and_update(isbn, patch).await
        }

        async fn find_and_delete(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
            self.inner.find_and_delete(isbn).await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl BookStore for BrokenStore {
        async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
            Err(StoreError::unavailable("socket timeout on 10.0.0.7"))
        }

        async fn find_one(&self, _isbn: &str) -> Result<Option<Book>, StoreError> {
            Err(StoreError::unavailable("socket timeout on 10.0.0.7"))
        }

        async fn insert(&self, _book: NewBook) -> Result<Book, StoreError> {
            Err(StoreError::unavailable("socket timeout on 10.0.0.7"))
        }

        async fn find_and_update(
            &self,
            _isbn: &str,
            _patch: BookPatch,
        ) -> Result<Option<Book>, StoreError> {
            Err(StoreError::unavailable("socket timeout on 10.0.0.7"))
        }

        async fn find_and_delete(&self, _isbn: &str) -> Result<Option<Book>, StoreError> {
            Err(StoreError::unavailable("socket timeout on 10.0.0.7"))
        }
    }

    fn app_with(store: Arc<dyn BookStore>) -> Router {
        Router::new().nest("/book", router(BookService::new(store)))
    }

    fn app() -> (Router, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        (app_with(store.clone()), store)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    fn sample() -> Value {
        json!({
            "isbn": "aa123",
            "title": "book123",
            "description": "new book add",
            "publishYear": 2014
        })
    }

    #[tokio::test]
    async fn full_book_lifecycle() {
        let (app, _) = app();

        let (status, created) = send(&app, "POST", "/book", Some(sample())).await;
        assert_eq!(status, StatusCode::CREATED);
        for field in ["isbn", "title", "description", "publishYear"] {
            assert_eq!(created[field], sample()[field]);
        }
        assert!(created["createdAt"].is_string());
        assert!(created["updatedAt"].is_string());
        assert!(created.get("id").is_none());

        let (status, _) = send(&app, "POST", "/book", Some(sample())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, fetched) = send(&app, "GET", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, body) =
            send(&app, "PUT", "/book/aa123", Some(json!({"publishYear": 2020}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Update Successfully"}));

        let (_, fetched) = send(&app, "GET", "/book/aa123", None).await;
        assert_eq!(fetched["publishYear"], 2020);
        assert_eq!(fetched["title"], "book123");

        let (status, body) = send(&app, "DELETE", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Deleted Successfully"}));

        let (status, body) = send(&app, "DELETE", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn list_returns_array() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/book", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        send(&app, "POST", "/book", Some(sample())).await;
        let (_, body) = send(&app, "GET", "/book", None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["isbn"], "aa123");
    }

    #[tokio::test]
    async fn get_missing_book_is_null_with_ok() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/book/unknown", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_the_store() {
        let (app, store) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/book",
            Some(json!({"isbn": "aa123", "title": " ", "publishYear": "MMXIV"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(
            body["error"]["details"],
            json!([
                {"field": "title", "message": "Empty"},
                {"field": "description", "message": "Missing"},
                {"field": "publishYear", "message": "Integers Only"}
            ])
        );
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn conflicting_create_does_not_insert() {
        let (app, store) = app();
        send(&app, "POST", "/book", Some(sample())).await;

        let mut again = sample();
        again["title"] = json!("other");
        let (status, body) = send(&app, "POST", "/book", Some(again)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        let (_, fetched) = send(&app, "GET", "/book/aa123", None).await;
        assert_eq!(fetched["title"], "book123");
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let (app, store) = app();
        let (status, _) = send(&app, "PUT", "/book/ghost", Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_update_is_rejected() {
        let (app, _) = app();
        send(&app, "POST", "/book", Some(sample())).await;

        let (status, body) = send(
            &app,
            "PUT",
            "/book/aa123",
            Some(json!({"description": "", "publishYear": 19.5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["details"],
            json!([
                {"field": "description", "message": "Empty"},
                {"field": "publishYear", "message": "Integers Only"}
            ])
        );

        let (_, fetched) = send(&app, "GET", "/book/aa123", None).await;
        assert_eq!(fetched["description"], "new book add");
    }

    #[tokio::test]
    async fn blank_identifier_is_rejected() {
        let (app, _) = app();
        let (status, body) = send(&app, "DELETE", "/book/%20", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["details"],
            json!([{"field": "isbn", "message": "Empty"}])
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (app, store) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/book")
            .header("content-type", "application/json")
            .body(Body::from("{\"isbn\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bodyless_update_changes_nothing() {
        let (app, _) = app();
        let (_, created) = send(&app, "POST", "/book", Some(sample())).await;

        let (status, body) = send(&app, "PUT", "/book/aa123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Update Successfully"}));

        let (_, fetched) = send(&app, "GET", "/book/aa123", None).await;
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn bodyless_create_reports_every_field_missing() {
        let (app, store) = app();
        let (status, body) = send(&app, "POST", "/book", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(
            body["error"]["details"],
            json!([
                {"field": "isbn", "message": "Missing"},
                {"field": "title", "message": "Missing"},
                {"field": "description", "message": "Missing"},
                {"field": "publishYear", "message": "Missing"}
            ])
        );
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_object_body_is_bad_request() {
        let (app, _) = app();
        let (status, body) = send(&app, "POST", "/book", Some(json!([sample()]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn store_failures_are_uniform_500s() {
        let app = app_with(Arc::new(BrokenStore));

        let requests = [
            ("GET", "/book", None),
            ("GET", "/book/aa123", None),
            ("POST", "/book", Some(sample())),
            ("PUT", "/book/aa123", Some(json!({"title": "x"}))),
            ("DELETE", "/book/aa123", None),
        ];

        for (method, uri, body) in requests {
            let (status, body) = send(&app, method, uri, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
            assert_eq!(body["error"]["code"], "internal_error");
            assert_eq!(body["error"]["message"], "An internal server error occurred");
        }
    }
}
