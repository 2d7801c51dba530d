//! Router harness for route tests: in-memory `SQLite`, real migrations,
//! signed bearer tokens.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, create_router};
use agencia_core::airline::AirlineDirectory;
use agencia_db::migration::Migrator;
use agencia_shared::{JwtConfig, JwtService};

const AIRLINES: &str = r#"[
    {"iata": "AF", "icao": "AFR", "nom": "Air France", "pays": "France"},
    {"iata": "AH", "icao": "DAH", "nom": "Air Algérie", "pays": "Algérie"},
    {"iata": "TU", "icao": "TAR", "nom": "Tunisair", "pays": "Tunisie"}
]"#;

pub(crate) struct TestApp {
    router: Router,
    state: AppState,
    token: String,
}

impl TestApp {
    /// Fresh database, one agency, an `admin` token.
    pub(crate) async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let state = AppState {
            db: Arc::new(db),
            jwt_service: Arc::new(JwtService::new(&JwtConfig {
                secret: "agencia-test-secret".to_string(),
                access_token_expires_minutes: 15,
            })),
            airlines: Arc::new(AirlineDirectory::from_json(AIRLINES).unwrap()),
        };
        let token = state
            .jwt_service
            .generate_access_token(Uuid::now_v7(), Uuid::now_v7(), "admin")
            .unwrap();

        Self {
            router: create_router(state.clone()),
            state,
            token,
        }
    }

    /// Same database and agency, different role.
    pub(crate) fn with_role(&self, role: &str) -> Self {
        let claims = self.state.jwt_service.validate_token(&self.token).unwrap();
        self.with_token(claims.agency_id(), role)
    }

    /// Same database, another agency.
    pub(crate) fn for_agency(&self, agency_id: Uuid) -> Self {
        self.with_token(agency_id, "admin")
    }

    fn with_token(&self, agency_id: Uuid, role: &str) -> Self {
        let token = self
            .state
            .jwt_service
            .generate_access_token(Uuid::now_v7(), agency_id, role)
            .unwrap();
        Self {
            router: self.router.clone(),
            state: self.state.clone(),
            token,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authenticated: bool,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if authenticated {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let request = match body {
            Some(body) => request
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub(crate) async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, true).await
    }

    pub(crate) async fn get_anonymous(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, false).await
    }

    pub(crate) async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), true).await
    }

    pub(crate) async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), true).await
    }

    pub(crate) async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, true).await
    }
}

/// Creates a supplier and returns its ID.
pub(crate) async fn create_supplier(app: &TestApp, credit: &str, debt: &str) -> String {
    let (status, body) = app
        .post(
            "/api/v1/fournisseurs",
            json!({"nom": "Atlas Voyages", "soldeCrediteur": credit, "detteFournisseur": debt}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Creates a client and returns its ID.
pub(crate) async fn create_client(app: &TestApp, credit: &str) -> String {
    let (status, body) = app
        .post(
            "/api/v1/clients",
            json!({"nom": "Samir Benali", "soldeCrediteur": credit}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}
