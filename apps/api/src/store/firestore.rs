//! Firestore over its REST API, authenticated as a service account.
//!
//! Access tokens come from the OAuth2 JWT-bearer flow: an RS256 assertion
//! signed with the service-account key is exchanged at the key's `token_uri`.
//! The token is cached until shortly before it expires.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{PersistenceGateway, StoreError};
use crate::credentials::ServiceAccountKey;
use crate::models::cv_request::{CvRequest, DocumentId};

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before their stated expiry.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FirestoreError {
    error: FirestoreErrorBody,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

pub struct FirestoreStore {
    client: Client,
    base_url: String,
    project_id: String,
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    signing_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl FirestoreStore {
    /// Builds a store from a service-account key. Fails when the private key
    /// is not a usable RSA PEM, so bad credentials surface at startup.
    pub fn new(key: &ServiceAccountKey) -> Result<Self, StoreError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: FIRESTORE_API_URL.to_string(),
            project_id: key.project_id.clone(),
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            key_id: key.private_key_id.clone(),
            signing_key,
            token: Mutex::new(None),
        })
    }

    /// Points the store at another Firestore-compatible endpoint.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, StoreError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))
    }

    async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = self.sign_assertion(now)?;
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!("obtained Firestore access token, expires in {}s", token.expires_in);

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        });
        Ok(value)
    }

    fn collection_url(&self, collection_path: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url,
            self.project_id,
            collection_path.trim_matches('/')
        )
    }
}

#[async_trait]
impl PersistenceGateway for FirestoreStore {
    async fn append(
        &self,
        collection_path: &str,
        document: &CvRequest,
    ) -> Result<DocumentId, StoreError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(self.collection_url(collection_path))
            .bearer_auth(token)
            .json(&json!({ "fields": to_firestore_fields(document) }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FirestoreError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedDocument = response.json().await?;
        let id = document_id_from_name(&created.name)?;
        info!("Firestore document created: {}", created.name);
        Ok(id)
    }
}

/// Encodes a CV request as a Firestore `fields` map.
fn to_firestore_fields(request: &CvRequest) -> Map<String, Value> {
    let mut fields = Map::new();
    let mut put = |name: &str, value: Value| {
        fields.insert(name.to_string(), value);
    };

    put("full_name", string_value(&request.full_name));
    put("phone_number", string_value(&request.phone_number));
    put("requester_email", string_value(&request.requester_email));
    put("company_name", string_value(&request.company_name));
    put("position", string_value(&request.position));
    put("company_email", string_value(&request.company_email));
    put("company_address", optional_string_value(&request.company_address));
    put("company_contact", optional_string_value(&request.company_contact));
    put(
        "timestamp",
        json!({ "timestampValue": request.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true) }),
    );
    put("status", string_value(request.status.as_str()));

    fields
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn optional_string_value(value: &Option<String>) -> Value {
    match value {
        Some(v) => string_value(v),
        None => json!({ "nullValue": null }),
    }
}

/// Document names look like `projects/p/databases/(default)/documents/a/b/c/<id>`.
fn document_id_from_name(name: &str) -> Result<DocumentId, StoreError> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(|id| DocumentId(id.to_string()))
        .ok_or_else(|| StoreError::UnexpectedResponse(format!("bad document name '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv_request::CvRequestDetails;
    use axum::{
        extract::State,
        http::{header, HeaderMap, StatusCode, Uri},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use chrono::TimeZone;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TEST_RSA_KEY: &str = include_str!("testdata/test_rsa_key.pem");
    const COLLECTION: &str = "artifacts/app/public/data/cv_requests";

    /// Minimal stand-in for the OAuth token endpoint and Firestore documents API.
    struct StubBackend {
        token_status: StatusCode,
        document_status: StatusCode,
        token_calls: AtomicUsize,
        document_calls: std::sync::Mutex<Vec<(String, Option<String>, Value)>>,
    }

    impl StubBackend {
        fn new(token_status: StatusCode, document_status: StatusCode) -> Arc<Self> {
            Arc::new(Self {
                token_status,
                document_status,
                token_calls: AtomicUsize::new(0),
                document_calls: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    async fn stub_token(State(stub): State<Arc<StubBackend>>, body: String) -> impl IntoResponse {
        stub.token_calls.fetch_add(1, Ordering::SeqCst);
        if !stub.token_status.is_success() {
            return (stub.token_status, "invalid_grant".to_string()).into_response();
        }
        assert!(body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
        assert!(body.contains("assertion="));
        Json(json!({
            "access_token": "stub-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        }))
        .into_response()
    }

    async fn stub_documents(
        State(stub): State<Arc<StubBackend>>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let path = uri.path().to_string();
        stub.document_calls
            .lock()
            .unwrap()
            .push((path.clone(), auth, body));

        if !stub.document_status.is_success() {
            return (
                stub.document_status,
                Json(json!({
                    "error": {
                        "code": stub.document_status.as_u16(),
                        "message": "Missing or insufficient permissions.",
                        "status": "PERMISSION_DENIED"
                    }
                })),
            )
                .into_response();
        }

        let prefix = "/v1/";
        let name = format!("{}/doc-abc", path.trim_start_matches(prefix));
        Json(json!({ "name": name, "fields": {} })).into_response()
    }

    async fn spawn_stub(stub: Arc<StubBackend>) -> SocketAddr {
        let app = Router::new()
            .route("/token", post(stub_token))
            .fallback(stub_documents)
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn store_for(addr: SocketAddr) -> FirestoreStore {
        let key = ServiceAccountKey::from_json(
            &json!({
                "project_id": "portfolio-test",
                "client_email": "writer@portfolio-test.iam.gserviceaccount.com",
                "private_key": TEST_RSA_KEY,
                "private_key_id": "key-1",
                "token_uri": format!("http://{addr}/token"),
            })
            .to_string(),
        )
        .unwrap();
        FirestoreStore::new(&key)
            .unwrap()
            .with_base_url(format!("http://{addr}/v1/"))
    }

    fn sample_request() -> CvRequest {
        CvRequest::new(
            CvRequestDetails {
                full_name: "Jane Doe".to_string(),
                company_name: "Acme".to_string(),
                position: "Engineer".to_string(),
                company_email: "hr@acme.com".to_string(),
                company_contact: Some(String::new()),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_fields_use_firestore_value_types() {
        let fields = to_firestore_fields(&sample_request());
        assert_eq!(fields["full_name"], json!({ "stringValue": "Jane Doe" }));
        assert_eq!(fields["status"], json!({ "stringValue": "PendingReview" }));
        assert_eq!(
            fields["timestamp"],
            json!({ "timestampValue": "2024-05-01T12:30:00.000000Z" })
        );
    }

    #[test]
    fn test_optional_fields_keep_empty_strings_and_null_absent_ones() {
        let fields = to_firestore_fields(&sample_request());
        assert_eq!(fields["company_contact"], json!({ "stringValue": "" }));
        assert_eq!(fields["company_address"], json!({ "nullValue": null }));
        assert_eq!(fields["phone_number"], json!({ "stringValue": "" }));
    }

    #[test]
    fn test_document_id_is_last_path_segment() {
        let id = document_id_from_name(
            "projects/p/databases/(default)/documents/artifacts/app/public/data/cv_requests/Xy12",
        )
        .unwrap();
        assert_eq!(id, DocumentId("Xy12".to_string()));
    }

    #[test]
    fn test_document_id_rejects_trailing_slash() {
        assert!(document_id_from_name("projects/p/documents/").is_err());
    }

    #[test]
    fn test_invalid_private_key_fails_at_construction() {
        let key = ServiceAccountKey::from_json(
            r#"{"project_id": "p", "client_email": "e@x", "private_key": "not a pem"}"#,
        )
        .unwrap();
        assert!(matches!(FirestoreStore::new(&key), Err(StoreError::Auth(_))));
    }

    #[test]
    fn test_cached_token_expires_with_margin() {
        let now = Utc::now();
        let token = CachedToken {
            value: "t".to_string(),
            expires_at: now + chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS - 1),
        };
        assert!(!token.is_fresh(now));

        let token = CachedToken {
            value: "t".to_string(),
            expires_at: now + chrono::Duration::seconds(3600),
        };
        assert!(token.is_fresh(now));
    }

    #[tokio::test]
    async fn test_append_returns_id_from_created_document() {
        let stub = StubBackend::new(StatusCode::OK, StatusCode::OK);
        let store = store_for(spawn_stub(stub.clone()).await);

        let id = store.append(COLLECTION, &sample_request()).await.unwrap();

        assert_eq!(id, DocumentId("doc-abc".to_string()));
        let calls = stub.document_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (path, auth, body) = &calls[0];
        assert_eq!(
            path,
            "/v1/projects/portfolio-test/databases/(default)/documents/artifacts/app/public/data/cv_requests"
        );
        assert_eq!(auth.as_deref(), Some("Bearer stub-token"));
        assert_eq!(
            body["fields"]["company_name"],
            json!({ "stringValue": "Acme" })
        );
    }

    #[tokio::test]
    async fn test_access_token_is_reused_across_appends() {
        let stub = StubBackend::new(StatusCode::OK, StatusCode::OK);
        let store = store_for(spawn_stub(stub.clone()).await);

        store.append(COLLECTION, &sample_request()).await.unwrap();
        store.append(COLLECTION, &sample_request()).await.unwrap();

        assert_eq!(stub.token_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.document_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_token_exchange_is_auth_error() {
        let stub = StubBackend::new(StatusCode::UNAUTHORIZED, StatusCode::OK);
        let store = store_for(spawn_stub(stub.clone()).await);

        match store.append(COLLECTION, &sample_request()).await {
            Err(StoreError::Auth(message)) => assert!(message.contains("401"), "{message}"),
            other => panic!("expected auth error, got {other:?}"),
        }
        assert!(stub.document_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_firestore_error_body_becomes_api_error() {
        let stub = StubBackend::new(StatusCode::OK, StatusCode::FORBIDDEN);
        let store = store_for(spawn_stub(stub).await);

        match store.append(COLLECTION, &sample_request()).await {
            Err(StoreError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "Missing or insufficient permissions.");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
