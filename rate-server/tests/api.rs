//! End-to-end flows through the full router: auth, country CRUD,
//! workbook import, calculate and download, all in the
//! `{code, message, data}` envelope.

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use rate_server::routes::build_app;
use rate_server::{Config, JwtConfig, ServerState};

const ADMIN_PASSWORD: &str = "integration-secret";

const DOCS: &str = "zone,weight,price\n1,0.5,10.00\n1,1.0,15.00\n2,0.5,12.00\n2,1.0,18.00\n";
const NON_DOCS: &str = "zone,weight,price\n1,1.0,20.00\n2,1.0,24.50\n";
const ZONES: &str = "name,zone,transit_days\nNeighborland,1,2\nFarland,2,5\n";

struct TestApp {
    app: Router,
    state: ServerState,
    _dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        work_dir: dir.path().to_string_lossy().into_owned(),
        http_port: 0,
        database_path: None,
        environment: "test".into(),
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789abcdef".into(),
            expiration_minutes: 60,
            issuer: "rate-server".into(),
            audience: "rate-admin".into(),
        },
        admin_username: "admin".into(),
        admin_password: ADMIN_PASSWORD.into(),
    };
    let state = ServerState::initialize(&config).await.unwrap();
    TestApp {
        app: build_app(state.clone()),
        state,
        _dir: dir,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({"username": "admin", "password": ADMIN_PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_country(app: &Router, token: &str, body: &Value) -> i64 {
    let (status, body) = send(app, json_request("POST", "/country", Some(token), body)).await;
    assert_eq!(status, StatusCode::OK, "create country failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

const BOUNDARY: &str = "----ratecard-test-boundary";

fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str)],
) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (name, filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn upload_request(uri_token: (&str, &str), country_id: i64, rate_type: &str, sheets: (&str, &str, &str)) -> Request<Body> {
    let (uri, token) = uri_token;
    let id = country_id.to_string();
    multipart_request(
        uri,
        token,
        &[("country_id", id.as_str()), ("rate_type", rate_type)],
        &[
            ("documents", "documents.csv", sheets.0),
            ("non_documents", "non_documents.csv", sheets.1),
            ("zones", "zones.csv", sheets.2),
        ],
    )
}

// ── Public API ──────────────────────────────────────────────────────

#[tokio::test]
async fn public_api_health_and_reference_data() {
    let t = spawn_app().await;

    let (status, body) = send(&t.app, get_request("/api", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["name"], "rate-server");

    let (status, body) = send(&t.app, get_request("/api/test-db", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "database ok");

    let (status, body) = send(&t.app, get_request("/api/package-type", None)).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["key"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["DOCUMENT", "NON_DOCUMENT"]);
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_require_a_valid_token() {
    let t = spawn_app().await;

    let (status, body) = send(&t.app, get_request("/country", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) = send(&t.app, get_request("/country", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The public calculator stays open
    let (status, _) = send(&t.app, get_request("/api/sender", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
    let t = spawn_app().await;

    let (status, body) = send(
        &t.app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);

    let (status2, body2) = send(
        &t.app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({"username": "nobody", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status2, status);
    assert_eq!(body2["data"], body["data"]);

    let token = login(&t.app).await;
    let (status, _) = send(&t.app, get_request("/country", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Country CRUD ────────────────────────────────────────────────────

#[tokio::test]
async fn country_validation_is_field_keyed_and_mutates_nothing() {
    let t = spawn_app().await;
    let token = login(&t.app).await;

    let (status, body) = send(
        &t.app,
        json_request(
            "POST",
            "/country",
            Some(&token),
            &json!({"name": "  ", "code": "TOOLONG", "currency_code": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
    let errors = body["data"].as_object().unwrap();
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("code"));
    assert!(errors.contains_key("currency_code"));

    let (_, body) = send(&t.app, get_request("/country", Some(&token))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn country_create_update_with_quote_fields() {
    let t = spawn_app().await;
    let token = login(&t.app).await;

    let id = create_country(
        &t.app,
        &token,
        &json!({
            "name": "Testland",
            "code": "tl",
            "currency_code": "usd",
            "business_title_en": "Hi",
            "unknown_field": "ignored"
        }),
    )
    .await;

    let (status, body) = send(&t.app, get_request(&format!("/country/{id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    // Codes are normalized to uppercase
    assert_eq!(body["data"]["code"], "TL");
    assert_eq!(body["data"]["currency_code"], "USD");
    let quotes = body["data"]["quote_langs"].as_array().unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0]["name"], "business_title_en");
    assert_eq!(quotes[0]["lang"], "en");
    assert_eq!(quotes[0]["description"], "Hi");

    // Duplicate code is a field error
    let (status, body) = send(
        &t.app,
        json_request(
            "POST",
            "/country",
            Some(&token),
            &json!({"name": "Other", "code": "TL", "currency_code": "USD"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["code"][0], "has already been taken");

    // Updating the quote field upserts instead of duplicating
    let (status, _) = send(
        &t.app,
        json_request(
            "PUT",
            &format!("/country/{id}"),
            Some(&token),
            &json!({
                "name": "Testland",
                "code": "TL",
                "currency_code": "USD",
                "business_title_en": "Hello again"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, get_request(&format!("/country/{id}"), Some(&token))).await;
    let quotes = body["data"]["quote_langs"].as_array().unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0]["description"], "Hello again");

    // Missing country is a 404 envelope, not a crash
    let (status, body) = send(&t.app, get_request("/country/9999", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

// ── Import, rates, calculate ────────────────────────────────────────

#[tokio::test]
async fn import_then_rates_receivers_and_calculate() {
    let t = spawn_app().await;
    let token = login(&t.app).await;

    let sender = create_country(
        &t.app,
        &token,
        &json!({"name": "Senderland", "code": "SL", "currency_code": "USD", "price_symbol": "$"}),
    )
    .await;
    let receiver = create_country(
        &t.app,
        &token,
        &json!({"name": "Farland", "code": "FL", "currency_code": "EUR"}),
    )
    .await;

    let (status, body) = send(
        &t.app,
        upload_request(("/rate/upload", &token), sender, "PERSONAL", (DOCS, NON_DOCS, ZONES)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    assert_eq!(body["data"]["zones"], 2);
    assert_eq!(body["data"]["document_rates"], 4);
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 3);

    // Rates view with formatted prices and the display zone bound
    let (status, body) = send(
        &t.app,
        get_request(
            &format!("/country/{sender}/rates?package_type=DOCUMENT&rate_type=PERSONAL"),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["max_zone"], 2);
    assert_eq!(body["data"]["rates"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"]["rates"][0]["formatted"], "$10.00");

    // Receivers view lists the imported destinations
    let (_, body) = send(
        &t.app,
        get_request(&format!("/country/{sender}/receivers"), Some(&token)),
    )
    .await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|z| z["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Neighborland", "Farland"]);

    // Calculate: Farland is zone 2; 1.0 kg document sits exactly on the
    // 1.0 band ceiling -> 18.00, non-document 0.7 kg -> 24.50
    let (status, body) = send(
        &t.app,
        json_request(
            "POST",
            "/api/calculate",
            None,
            &json!({
                "sender_id": sender,
                "receiver_id": receiver,
                "rate_type": "PERSONAL",
                "packages": [
                    {"package_type": "DOCUMENT", "weight": 1.0},
                    {"package_type": "NON_DOCUMENT", "weight": 0.7}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "calculate failed: {body}");
    assert_eq!(body["data"]["zone"], 2);
    assert_eq!(body["data"]["transit_days"], 5);
    assert_eq!(body["data"]["packages"][0]["band_weight"], 1.0);
    assert_eq!(body["data"]["packages"][0]["price"], 18.0);
    assert_eq!(body["data"]["total"], 42.5);
    assert_eq!(body["data"]["total_formatted"], "$42.50");

    // A weight above every band is an explicit 404
    let (status, body) = send(
        &t.app,
        json_request(
            "POST",
            "/api/calculate",
            None,
            &json!({
                "sender_id": sender,
                "receiver_id": receiver,
                "packages": [{"package_type": "DOCUMENT", "weight": 99.0}]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn shared_country_reads_the_owners_zones_and_rates() {
    let t = spawn_app().await;
    let token = login(&t.app).await;

    let owner = create_country(
        &t.app,
        &token,
        &json!({"name": "Ownerland", "code": "OW", "currency_code": "USD", "price_symbol": "$"}),
    )
    .await;
    let receiver = create_country(
        &t.app,
        &token,
        &json!({"name": "Farland", "code": "FL", "currency_code": "EUR"}),
    )
    .await;
    let sharer = create_country(
        &t.app,
        &token,
        &json!({"name": "Borrowland", "code": "BR", "currency_code": "USD", "price_symbol": "$", "share_country_id": owner}),
    )
    .await;

    let (status, _) = send(
        &t.app,
        upload_request(("/rate/upload", &token), owner, "PERSONAL", (DOCS, NON_DOCS, ZONES)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The sharer's receivers are exactly the owner's zone rows
    let (_, body) = send(
        &t.app,
        get_request(&format!("/country/{sharer}/receivers"), Some(&token)),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &t.app,
        get_request(
            &format!("/country/{sharer}/rates?package_type=DOCUMENT&rate_type=PERSONAL"),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(body["data"]["rate_country_id"], owner);
    assert_eq!(body["data"]["rates"].as_array().unwrap().len(), 4);

    // Calculating with the sharer as sender prices from the owner's table
    let (status, body) = send(
        &t.app,
        json_request(
            "POST",
            "/api/calculate",
            None,
            &json!({
                "sender_id": sharer,
                "receiver_id": receiver,
                "packages": [{"package_type": "DOCUMENT", "weight": 0.5}]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "calculate failed: {body}");
    assert_eq!(body["data"]["packages"][0]["price"], 12.0);

    // Importing into the sharer is refused
    let (status, _) = send(
        &t.app,
        upload_request(("/rate/upload", &token), sharer, "PERSONAL", (DOCS, NON_DOCS, ZONES)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_sheet_aborts_import_without_traces() {
    let t = spawn_app().await;
    let token = login(&t.app).await;

    let country = create_country(
        &t.app,
        &token,
        &json!({"name": "Testland", "code": "TL", "currency_code": "USD"}),
    )
    .await;

    let bad_docs = "zone,weight,price\n1,0.5,10.00\n1,heavy,15.00\n";
    let (status, body) = send(
        &t.app,
        upload_request(("/rate/upload", &token), country, "PERSONAL", (bad_docs, NON_DOCS, ZONES)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["documents"][0].as_str().unwrap().contains("row 3"));

    // Nothing persisted: no rates, no zones, no provenance rows
    let (_, body) = send(
        &t.app,
        get_request(
            &format!("/country/{country}/rates?package_type=DOCUMENT&rate_type=PERSONAL"),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(body["data"]["rates"].as_array().unwrap().len(), 0);
    assert!(body["data"]["max_zone"].is_null());

    let (_, body) = send(
        &t.app,
        get_request(&format!("/country/{country}/receivers"), Some(&token)),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) = send(
        &t.app,
        get_request(&format!("/rate/files?country_id={country}"), Some(&token)),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

// ── Download ────────────────────────────────────────────────────────

#[tokio::test]
async fn download_streams_archives_and_reports_missing_files() {
    let t = spawn_app().await;
    let token = login(&t.app).await;

    let country = create_country(
        &t.app,
        &token,
        &json!({"name": "Testland", "code": "TL", "currency_code": "USD"}),
    )
    .await;
    let (status, body) = send(
        &t.app,
        upload_request(("/rate/upload", &token), country, "PERSONAL", (DOCS, NON_DOCS, ZONES)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    let file = &body["data"]["files"][0];
    let file_id = file["id"].as_i64().unwrap();
    let rel_path = file["path"].as_str().unwrap().to_string();

    // Existing archive streams back with an attachment disposition
    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/rate/download",
            Some(&token),
            &json!({"file_id": file_id}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("documents.csv"));
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), DOCS.as_bytes());

    // Unknown id
    let (status, body) = send(
        &t.app,
        json_request("POST", "/rate/download", Some(&token), &json!({"file_id": 9999})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ratecard file does not exist");

    // Row exists but the archived file is gone from disk
    std::fs::remove_file(t.state.storage.absolute(&rel_path)).unwrap();
    let (status, body) = send(
        &t.app,
        json_request("POST", "/rate/download", Some(&token), &json!({"file_id": file_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ratecard file does not exist");
}
