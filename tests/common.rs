use find_my_pg::{
    api::router::create_router,
    config::Config,
    infra::factory::bootstrap_state,
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-room-photo";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub db_filename: String,
    pub upload_dir: PathBuf,
}

#[allow(dead_code)]
pub struct Identity {
    pub id: String,
    pub token: String,
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Hand-built multipart body: text parts first, then `images` file parts.
#[allow(dead_code)]
pub fn multipart_body(fields: &[(&str, String)], images: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let boundary = format!("findmypg{}", Uuid::new_v4().simple());
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ).as_bytes());
    }
    for (file_name, content_type, data) in images {
        body.extend_from_slice(format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        ).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[allow(dead_code)]
pub fn listing_fields(name: &str, city: &str, locality: &str, gender: &str, tiers: Value) -> Vec<(&'static str, String)> {
    vec![
        ("name", name.to_string()),
        ("city", city.to_string()),
        ("locality", locality.to_string()),
        ("address", "12 Main Road".to_string()),
        ("gender", gender.to_string()),
        ("description", "Furnished rooms with meals".to_string()),
        ("sharing_types", tiers.to_string()),
        ("amenities", json!(["WiFi", "Laundry"]).to_string()),
    ]
}

#[allow(dead_code)]
pub fn booking_payload(property_id: &str, sharing_type: &str, monthly_rent: i64, duration: i32, total_amount: i64) -> Value {
    json!({
        "property_id": property_id,
        "sharing_type": sharing_type,
        "move_in_date": "2026-11-01",
        "duration": duration,
        "monthly_rent": monthly_rent,
        "total_amount": total_amount,
        "user_name": "Tara Tenant",
        "user_email": "tara@example.com",
        "user_phone": "9000000001"
    })
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let upload_dir = std::env::temp_dir().join(format!("find-my-pg-uploads-{}", Uuid::new_v4()));

        let mut config = Config {
            database_url: format!("sqlite://{}?mode=rwc", db_filename),
            port: 0,
            jwt_secret: "integration-test-secret".to_string(),
            jwt_ttl_hours: 1,
            auth_issuer: "test-issuer".to_string(),
            upload_dir: upload_dir.clone(),
            upload_url_prefix: "/uploads".to_string(),
            max_upload_bytes: 1024 * 1024,
            cors_origin: "http://localhost:3000".to_string(),
            verify_booking_totals: false,
        };
        customize(&mut config);

        let state = Arc::new(bootstrap_state(&config).await.expect("Failed to bootstrap test state"));
        let router = create_router(state.clone());

        Self { router, state, db_filename, upload_dir }
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_multipart(&self, uri: &str, token: Option<&str>, content_type: String, body: Vec<u8>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.router.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap()
    }

    pub async fn signup(&self, name: &str, email: &str, role: &str) -> Identity {
        let res = self.send("POST", "/api/v1/auth/signup", None, Some(json!({
            "name": name,
            "email": email,
            "password": "secret1",
            "role": role,
            "phone": "9000000000"
        }))).await;
        assert_eq!(res.status(), StatusCode::CREATED, "signup helper failed for {email}");
        let body = parse_body(res).await;
        Identity {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a listing with one PNG image and returns the stored record.
    pub async fn create_property(&self, token: &str, name: &str, tiers: Value) -> Value {
        let fields = listing_fields(name, "Bengaluru", "Koramangala", "boys", tiers);
        let (content_type, body) = multipart_body(&fields, &[("room.png", "image/png", PNG_BYTES)]);
        let res = self.send_multipart("/api/v1/properties", Some(token), content_type, body).await;
        assert_eq!(res.status(), StatusCode::CREATED, "create_property helper failed for {name}");
        parse_body(res).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
