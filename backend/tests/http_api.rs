//! End-to-end exercise of the HTTP surface against in-memory ports.
//!
//! Drives the full submission-and-triage scenario: register, login,
//! submit a complaint with an attachment, list and filter it, resolve it
//! as an administrator, and read the ledger back.

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::Value;

use redress_backend::server::configure_api;
use redress_backend::test_support::{TestBackend, test_backend};

const BOUNDARY: &str = "------------------------test9f3a1c7e";

/// Assemble a `multipart/form-data` body from text fields and files.
fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (file_name, content_type, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"attachments\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, token: &str, body: Vec<u8>) -> actix_http::Request {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request()
}

macro_rules! init_app {
    ($backend:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($backend.state.clone()))
                .configure(configure_api),
        )
        .await
    };
}

async fn register(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    test::read_body_json(res).await
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({ "email": email, "password": password }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    test::read_body_json(res).await
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn leaking_pipe_submission() -> Vec<u8> {
    multipart_body(
        &[
            ("category_id", "2"),
            ("subject", "Leaking pipe"),
            ("description", "Kitchen pipe leaking"),
            ("priority", "high"),
        ],
        &[("pipe.png", "image/png", b"\x89PNG\r\n\x1a\nfakeimage")],
    )
}

#[actix_web::test]
async fn registration_rejects_duplicate_email() {
    let backend = test_backend();
    let app = init_app!(backend);

    register(&app, "Alice", "alice@example.com", "s3cret").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "name": "Alice Again",
            "email": "alice@example.com",
            "password": "other",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_round_trips_identity_and_rejects_bad_credentials() {
    let backend = test_backend();
    let app = init_app!(backend);

    let registered = register(&app, "Alice", "alice@example.com", "s3cret").await;
    let user_id = registered["userId"].as_i64().expect("userId");

    let outcome = login(&app, "alice@example.com", "s3cret").await;
    assert_eq!(outcome["user"]["id"].as_i64(), Some(user_id));
    assert_eq!(outcome["user"]["role"], "user");
    assert!(outcome["token"].as_str().is_some_and(|t| !t.is_empty()));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({ "email": "alice@example.com", "password": "wrong" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn categories_are_listed_in_name_order() {
    let backend = test_backend();
    let app = init_app!(backend);

    let req = test::TestRequest::get().uri("/api/categories").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["category_name"].as_str().expect("name"))
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Water Supply"));
}

#[actix_web::test]
async fn submission_requires_a_token() {
    let backend = test_backend();
    let app = init_app!(backend);

    let req = test::TestRequest::post()
        .uri("/api/complaints")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(leaking_pipe_submission())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn submission_rejects_disallowed_file_types() {
    let backend = test_backend();
    let app = init_app!(backend);
    register(&app, "Alice", "alice@example.com", "s3cret").await;
    let token = login(&app, "alice@example.com", "s3cret").await["token"]
        .as_str()
        .expect("token")
        .to_owned();

    let body = multipart_body(
        &[
            ("category_id", "2"),
            ("subject", "Leaking pipe"),
            ("description", "Kitchen pipe leaking"),
        ],
        &[("payload.exe", "application/octet-stream", b"MZ")],
    );
    let res = test::call_service(&app, multipart_request("/api/complaints", &token, body)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn submission_requires_category_subject_description() {
    let backend = test_backend();
    let app = init_app!(backend);
    register(&app, "Alice", "alice@example.com", "s3cret").await;
    let token = login(&app, "alice@example.com", "s3cret").await["token"]
        .as_str()
        .expect("token")
        .to_owned();

    let body = multipart_body(
        &[("category_id", "2"), ("subject", "Leaking pipe")],
        &[],
    );
    let res = test::call_service(&app, multipart_request("/api/complaints", &token, body)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "description");
}

#[actix_web::test]
async fn full_lifecycle_from_submission_to_resolution() {
    let backend: TestBackend = test_backend();
    backend.seed_admin("Dana Admin", "admin@example.com", "adminpw");
    let app = init_app!(backend);

    register(&app, "Alice", "alice@example.com", "s3cret").await;
    register(&app, "Bob", "bob@example.com", "s3cret").await;
    let alice_token = login(&app, "alice@example.com", "s3cret").await["token"]
        .as_str()
        .expect("token")
        .to_owned();
    let bob_token = login(&app, "bob@example.com", "s3cret").await["token"]
        .as_str()
        .expect("token")
        .to_owned();
    let admin_login = login(&app, "admin@example.com", "adminpw").await;
    assert_eq!(admin_login["user"]["role"], "admin");
    let admin_token = admin_login["token"].as_str().expect("token").to_owned();

    // Alice submits a high-priority complaint with an attachment.
    let res = test::call_service(
        &app,
        multipart_request("/api/complaints", &alice_token, leaking_pipe_submission()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    let complaint_id = created["complaintId"].as_i64().expect("complaintId");
    let number = created["complaintNumber"].as_str().expect("number");
    assert!(number.starts_with("CMP"));
    assert!(number[3..].chars().all(|c| c.is_ascii_digit()));

    // It appears in her own listing, including via case-insensitive search.
    let req = test::TestRequest::get()
        .uri("/api/complaints/my-complaints?search=leaking")
        .insert_header(bearer(&alice_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let mine: Value = test::read_body_json(res).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["status"], "pending");
    assert_eq!(mine[0]["category_name"], "Electricity");

    // The admin sees it in the high-priority listing.
    let req = test::TestRequest::get()
        .uri("/api/complaints?priority=high")
        .insert_header(bearer(&admin_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let all: Value = test::read_body_json(res).await;
    assert!(
        all.as_array()
            .expect("array")
            .iter()
            .any(|c| c["complaint_id"].as_i64() == Some(complaint_id)),
        "admin listing should include the new complaint"
    );

    // The admin listing is admin-only.
    let req = test::TestRequest::get()
        .uri("/api/complaints")
        .insert_header(bearer(&alice_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Detail access: owner and admin yes, a stranger no.
    let detail_uri = format!("/api/complaints/{complaint_id}");
    for (token, expected) in [
        (&alice_token, StatusCode::OK),
        (&admin_token, StatusCode::OK),
        (&bob_token, StatusCode::FORBIDDEN),
    ] {
        let req = test::TestRequest::get()
            .uri(&detail_uri)
            .insert_header(bearer(token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }

    // Non-admins cannot transition status.
    let req = test::TestRequest::put()
        .uri(&format!("/api/complaints/{complaint_id}/status"))
        .insert_header(bearer(&alice_token))
        .set_json(serde_json::json!({ "status": "resolved" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Unknown status values are rejected.
    let req = test::TestRequest::put()
        .uri(&format!("/api/complaints/{complaint_id}/status"))
        .insert_header(bearer(&admin_token))
        .set_json(serde_json::json!({ "status": "escalated" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // The admin resolves it.
    let req = test::TestRequest::put()
        .uri(&format!("/api/complaints/{complaint_id}/status"))
        .insert_header(bearer(&admin_token))
        .set_json(serde_json::json!({ "status": "resolved" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    // The detail now shows the settled state and both ledger entries,
    // newest first.
    let req = test::TestRequest::get()
        .uri(&detail_uri)
        .insert_header(bearer(&alice_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    let detail: Value = test::read_body_json(res).await;
    assert_eq!(detail["status"], "resolved");
    assert!(detail["resolved_at"].as_str().is_some());
    let updates = detail["updates"].as_array().expect("updates");
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0]["old_status"], "pending");
    assert_eq!(updates[0]["new_status"], "resolved");
    assert_eq!(
        updates[0]["note"],
        "Status changed from pending to resolved"
    );
    assert_eq!(updates[1]["old_status"], Value::Null);
    assert_eq!(updates[1]["new_status"], "pending");
    let attachments = detail["attachments"].as_array().expect("attachments");
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["file_name"], "pipe.png");

    // A second read returns the identical document.
    let req = test::TestRequest::get()
        .uri(&detail_uri)
        .insert_header(bearer(&alice_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    let second: Value = test::read_body_json(res).await;
    assert_eq!(detail, second);

    // Dashboard counters reflect the single resolved, high-priority
    // complaint; the endpoint is admin-only.
    let req = test::TestRequest::get()
        .uri("/api/complaints/stats/dashboard")
        .insert_header(bearer(&alice_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::get()
        .uri("/api/complaints/stats/dashboard")
        .insert_header(bearer(&admin_token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let stats: Value = test::read_body_json(res).await;
    assert_eq!(stats["summary"]["total"], 1);
    assert_eq!(stats["summary"]["resolved"], 1);
    assert_eq!(stats["summary"]["pending"], 0);
    assert_eq!(stats["summary"]["high_priority"], 1);
    assert_eq!(stats["by_category"][0]["category_name"], "Electricity");
    assert_eq!(stats["by_category"][0]["count"], 1);
}

#[actix_web::test]
async fn status_filter_narrows_listings() {
    let backend = test_backend();
    backend.seed_admin("Dana Admin", "admin@example.com", "adminpw");
    let app = init_app!(backend);

    register(&app, "Alice", "alice@example.com", "s3cret").await;
    let token = login(&app, "alice@example.com", "s3cret").await["token"]
        .as_str()
        .expect("token")
        .to_owned();
    let admin_token = login(&app, "admin@example.com", "adminpw").await["token"]
        .as_str()
        .expect("token")
        .to_owned();

    for subject in ["First issue", "Second issue"] {
        let body = multipart_body(
            &[
                ("category_id", "1"),
                ("subject", subject),
                ("description", "details"),
            ],
            &[],
        );
        let res =
            test::call_service(&app, multipart_request("/api/complaints", &token, body)).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // Close the first complaint.
    let req = test::TestRequest::get()
        .uri("/api/complaints/my-complaints")
        .insert_header(bearer(&token))
        .to_request();
    let mine: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let first_id = mine
        .as_array()
        .expect("array")
        .iter()
        .find(|c| c["subject"] == "First issue")
        .and_then(|c| c["complaint_id"].as_i64())
        .expect("first complaint");
    let req = test::TestRequest::put()
        .uri(&format!("/api/complaints/{first_id}/status"))
        .insert_header(bearer(&admin_token))
        .set_json(serde_json::json!({ "status": "closed", "note": "duplicate" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // status=pending hides the closed one; status=all shows both.
    let req = test::TestRequest::get()
        .uri("/api/complaints/my-complaints?status=pending")
        .insert_header(bearer(&token))
        .to_request();
    let pending: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
    assert_eq!(pending[0]["subject"], "Second issue");

    let req = test::TestRequest::get()
        .uri("/api/complaints/my-complaints?status=all")
        .insert_header(bearer(&token))
        .to_request();
    let all: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    // The closed complaint's ledger kept the supplied note.
    let req = test::TestRequest::get()
        .uri(&format!("/api/complaints/{first_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let detail: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["updates"][0]["note"], "duplicate");
}

#[actix_web::test]
async fn missing_complaints_return_not_found() {
    let backend = test_backend();
    backend.seed_admin("Dana Admin", "admin@example.com", "adminpw");
    let app = init_app!(backend);
    let admin_token = login(&app, "admin@example.com", "adminpw").await["token"]
        .as_str()
        .expect("token")
        .to_owned();

    let req = test::TestRequest::get()
        .uri("/api/complaints/4711")
        .insert_header(bearer(&admin_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::put()
        .uri("/api/complaints/4711/status")
        .insert_header(bearer(&admin_token))
        .set_json(serde_json::json!({ "status": "closed" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
