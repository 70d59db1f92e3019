//! Shared harness for integration tests.
//!
//! Builds the full router over an in-memory key-value store, with wiremock
//! servers standing in for the JWKS endpoint and the blob-store origin.
//! Tokens are RS256-signed with a process-wide test key whose public half
//! is served from the mock JWKS.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;
use waypost::auth::{AuthGate, JwksFetcher};
use waypost::blob::{BlobStore, HttpBlobStore};
use waypost::config::Config;
use waypost::routes::{build_routes, AppState};
use waypost::store::{LinkStore, MemoryKvStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUER: &str = "https://auth.example.com";
pub const AUDIENCE: &str = "waypost";
pub const KID: &str = "itest-key-01";
pub const DOCS_URL: &str = "https://docs.example.com/waypost";

pub struct TestKey {
    encoding: EncodingKey,
    pub n: String,
    pub e: String,
}

// RSA key generation is slow; mint one per process.
static TEST_KEY: OnceLock<TestKey> = OnceLock::new();

pub fn test_key() -> &'static TestKey {
    TEST_KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 2048).expect("keygen");
        let pem = key.to_pkcs1_pem(LineEnding::LF).expect("pem");
        let encoding = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("encoding key");
        let n = URL_SAFE_NO_PAD.encode(key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(key.e().to_bytes_be());
        TestKey { encoding, n, e }
    })
}

/// The JWKS document served by the mock auth server.
pub fn jwks_document() -> serde_json::Value {
    let key = test_key();
    serde_json::json!({
        "keys": [{
            "kty": "RSA",
            "kid": KID,
            "n": key.n,
            "e": key.e,
            "alg": "RS256",
            "use": "sig"
        }]
    })
}

/// Sign an arbitrary claim set with the test key under the known `kid`.
pub fn sign(claims: &serde_json::Value) -> String {
    let mut jwt_header = Header::new(Algorithm::RS256);
    jwt_header.kid = Some(KID.to_string());
    encode(&jwt_header, claims, &test_key().encoding).expect("sign")
}

/// Sign with an explicit `kid` (for unknown-key tests).
pub fn sign_with_kid(claims: &serde_json::Value, kid: &str) -> String {
    let mut jwt_header = Header::new(Algorithm::RS256);
    jwt_header.kid = Some(kid.to_string());
    encode(&jwt_header, claims, &test_key().encoding).expect("sign")
}

/// Claims that pass every check, subject "test-user".
pub fn valid_claims() -> serde_json::Value {
    let now = chrono::Utc::now().timestamp();
    serde_json::json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "test-user",
        "exp": now + 3600,
    })
}

pub fn valid_token() -> String {
    sign(&valid_claims())
}

/// The application under test, wired to mock upstreams.
pub struct TestApp {
    pub jwks: MockServer,
    pub blobs: MockServer,
    pub kv: Arc<MemoryKvStore>,
    router: Router,
}

impl TestApp {
    /// Full setup: link store bound, JWKS mock serving the test key,
    /// blob origin answering 404 until a test mounts objects.
    pub async fn spawn() -> Self {
        Self::build(true).await
    }

    /// Setup without a key-value binding, for 503 behavior.
    pub async fn spawn_without_links() -> Self {
        Self::build(false).await
    }

    async fn build(with_links: bool) -> Self {
        let jwks = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_document()))
            .mount(&jwks)
            .await;

        // Unmatched blob requests answer 404, which is the store's "absent"
        let blobs = MockServer::start().await;

        let config = Config::from_vars(&HashMap::from([
            ("JWKS_URL".to_string(), format!("{}/jwks.json", jwks.uri())),
            ("JWT_ISSUER".to_string(), ISSUER.to_string()),
            ("JWT_AUDIENCE".to_string(), AUDIENCE.to_string()),
            ("BLOB_STORE_URL".to_string(), blobs.uri()),
            ("DOCS_URL".to_string(), DOCS_URL.to_string()),
        ]))
        .expect("test config");

        let kv = Arc::new(MemoryKvStore::new());
        let links = with_links.then(|| LinkStore::new(kv.clone()));

        let auth = AuthGate::new(
            JwksFetcher::new(config.jwks_url.clone()),
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
        );

        let blob_store: Arc<dyn BlobStore> = Arc::new(HttpBlobStore::new(blobs.uri()));

        let state = Arc::new(AppState {
            config,
            auth,
            links,
            blobs: blob_store,
        });

        Self {
            jwks,
            blobs,
            kv,
            router: build_routes(state),
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST/PUT a JSON body, optionally with a bearer token.
    pub async fn send_json(
        &self,
        http_method: &str,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(http_method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Collect a response body as bytes.
pub async fn body_bytes(response: Response<Body>) -> axum::body::Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
}
