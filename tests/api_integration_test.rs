use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use library_lending::db;
use library_lending::infrastructure::AppState;
use library_lending::infrastructure::config::LendingPolicy;
use library_lending::server;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to build the full application over a fresh database
async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, LendingPolicy::default());
    server::build_router(state, &[])
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let req = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_book(app: &Router, isbn: &str, copies: i32) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "isbn": isbn,
            "publishedYear": 1969,
            "genre": "Science Fiction",
            "totalCopies": copies,
            "description": "Winter, an icy world"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

async fn create_user(app: &Router, email: &str) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        "/api/users",
        Some(json!({
            "name": "Genly Ai",
            "email": email,
            "phone": "(11) 98765-4321",
            "membershipType": "COMMUNITY"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

fn due_in_days(days: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::days(days)).to_rfc3339()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, json) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_book_returns_camel_case() {
    let app = setup_app().await;
    let id = create_book(&app, "978-0441478125", 3).await;

    let (status, json) = send(&app, "GET", &format!("/api/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalCopies"], 3);
    assert_eq!(json["availableCopies"], 3);
    assert_eq!(json["publishedYear"], 1969);
}

#[tokio::test]
async fn test_create_book_invalid_input() {
    let app = setup_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "",
            "author": "Nobody",
            "isbn": "123",
            "publishedYear": 1969,
            "genre": "Essay",
            "totalCopies": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let details = json["details"].as_array().unwrap();
    assert!(details.len() >= 3);
}

#[tokio::test]
async fn test_validation_details_use_json_field_names() {
    let app = setup_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "Ancient Scroll",
            "author": "Anonymous",
            "isbn": "978-0140449136",
            "publishedYear": 999,
            "genre": "History",
            "totalCopies": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["publishedYear", "totalCopies"]);

    let book_id = create_book(&app, "978-0441478125", 1).await;
    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/books/{}/copies", book_id),
        Some(json!({ "totalCopies": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["field"], "totalCopies");
}

#[tokio::test]
async fn test_search_percent_is_literal() {
    let app = setup_app().await;
    create_book(&app, "978-0441478125", 1).await;

    let (status, books) = send(&app, "GET", "/api/books?search=%25", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(books.as_array().unwrap().is_empty());

    let (status, books) = send(&app, "GET", "/api/books?search=_", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(books.as_array().unwrap().is_empty());

    let (status, books) = send(&app, "GET", "/api/books?search=DARK", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_full_book_update_over_http() {
    let app = setup_app().await;
    let book_id = create_book(&app, "978-0441478125", 2).await;
    create_book(&app, "978-0441013593", 1).await;

    let payload = |isbn: &str, copies: i32| {
        json!({
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "isbn": isbn,
            "publishedYear": 1969,
            "genre": "Science Fiction",
            "totalCopies": copies
        })
    };

    let (status, book) = send(
        &app,
        "PUT",
        &format!("/api/books/{}", book_id),
        Some(payload("978-0441478125", 4)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["totalCopies"], 4);
    assert_eq!(book["availableCopies"], 4);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/books/{}", book_id),
        Some(payload("978-0441013593", 4)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = setup_app().await;

    let req = Request::builder()
        .uri("/api/books")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("invalid json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_not_found_body() {
    let app = setup_app().await;

    for uri in ["/api/books/999", "/api/users/999", "/api/loans/999"] {
        let (status, json) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json["error"].is_string());
        assert!(json.get("details").is_none());
    }
}

#[tokio::test]
async fn test_duplicate_isbn_rejected() {
    let app = setup_app().await;
    create_book(&app, "978-0441478125", 1).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "Copycat",
            "author": "Someone",
            "isbn": "978-0441478125",
            "publishedYear": 2000,
            "genre": "Fiction",
            "totalCopies": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_loan_lifecycle_over_http() {
    let app = setup_app().await;
    let book_id = create_book(&app, "978-0441478125", 1).await;
    let user_id = create_user(&app, "genly@ekumen.org").await;

    let (status, loan) = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "userId": user_id, "bookId": book_id, "dueDate": due_in_days(14) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "ACTIVE");
    let loan_id = loan["id"].as_i64().unwrap();

    // Last copy is out
    let other_user = create_user(&app, "estraven@karhide.org").await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "userId": other_user, "bookId": book_id, "dueDate": due_in_days(7) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "UNAVAILABLE");

    let (status, json) = send(&app, "DELETE", &format!("/api/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");

    let (status, renewed) =
        send(&app, "POST", &format!("/api/loans/{}/renew", loan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renewed["renewalCount"], 1);

    let (status, listed) = send(&app, "GET", "/api/loans?search=darkness", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["bookTitle"], "The Left Hand of Darkness");
    assert_eq!(listed[0]["userName"], "Genly Ai");

    let (status, returned) =
        send(&app, "POST", &format!("/api/loans/{}/return", loan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "RETURNED");

    let (status, json) =
        send(&app, "POST", &format!("/api/loans/{}/return", loan_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_STATE");

    let (status, book) = send(&app, "GET", &format!("/api/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["availableCopies"], 1);

    let (status, json) = send(&app, "DELETE", &format!("/api/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_update_copies_endpoint() {
    let app = setup_app().await;
    let book_id = create_book(&app, "978-0441478125", 2).await;

    let (status, book) = send(
        &app,
        "PUT",
        &format!("/api/books/{}/copies", book_id),
        Some(json!({ "totalCopies": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["totalCopies"], 4);
    assert_eq!(book["availableCopies"], 4);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/books/{}/copies", book_id),
        Some(json!({ "totalCopies": 101 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_user_listing_and_filters() {
    let app = setup_app().await;
    create_user(&app, "genly@ekumen.org").await;

    let (status, users) = send(&app, "GET", "/api/users?status=ACTIVE&search=ekumen", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["activeLoans"], 0);
    assert_eq!(users[0]["membershipType"], "COMMUNITY");

    let (status, json) = send(&app, "GET", "/api/users?status=BANNED", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, json) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({
            "name": "Genly Ai",
            "email": "not-an-email",
            "phone": "123",
            "membershipType": "COMMUNITY"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = setup_app().await;
    let book_id = create_book(&app, "978-0441478125", 2).await;
    let user_id = create_user(&app, "genly@ekumen.org").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/loans",
        Some(json!({ "userId": user_id, "bookId": book_id, "dueDate": due_in_days(3) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, stats) = send(&app, "GET", "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({ "totalBooks": 1, "totalUsers": 1, "activeLoans": 1, "overdueLoans": 0 })
    );
}
