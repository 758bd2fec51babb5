//! Shared fixtures for route tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, header::AUTHORIZATION},
    response::Response,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use kafala_core::ledger::{Case, CaseStatus, Donation, DonationType, LifecycleStatus};
use kafala_core::storage::ReportImageStore;
use kafala_core::workflow::PledgeInput;
use kafala_db::repositories::{InMemoryLedgerRepository, LedgerRepository, NewCase};
use kafala_db::LedgerService;
use kafala_shared::auth::{AuthContext, Role};
use kafala_shared::config::{JwtConfig, LedgerConfig};
use kafala_shared::types::UserId;
use kafala_shared::JwtVerifier;

use crate::{AppState, create_router};

const SECRET: &str = "route-test-secret";

pub struct TestApp {
    pub repo: Arc<InMemoryLedgerRepository>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storage(None)
    }

    pub fn with_storage(storage: Option<ReportImageStore>) -> Self {
        let repo = Arc::new(InMemoryLedgerRepository::new());
        let jwt = JwtVerifier::new(&JwtConfig {
            secret: SECRET.to_string(),
            audience: "authenticated".to_string(),
            leeway_secs: 0,
        });
        let state = AppState {
            ledger: LedgerService::new(repo.clone()),
            jwt: Arc::new(jwt),
            storage: storage.map(Arc::new),
            ledger_config: Arc::new(LedgerConfig::default()),
        };
        Self { repo, state }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Signs a token for `user_id` and grants it `roles`.
    pub async fn login(&self, user_id: UserId, roles: &[Role]) -> String {
        for role in roles {
            self.repo.grant_role(user_id, *role).await.unwrap();
        }
        token_for(user_id, SECRET)
    }

    pub async fn admin_token(&self) -> String {
        self.login(UserId::new(), &[Role::Admin]).await
    }

    pub async fn seed_case(&self, is_published: bool) -> Case {
        self.repo
            .insert_case(NewCase {
                title: "Orphan siblings".to_string(),
                title_ar: None,
                monthly_cost: Decimal::from(300),
                months_needed: Some(10),
                status: CaseStatus::Active,
                lifecycle_status: LifecycleStatus::Active,
                is_published,
            })
            .await
            .unwrap()
    }

    /// A confirmed monthly pledge of `months` for `case`.
    pub async fn confirmed_donation(&self, case: &Case, months: i32) -> Donation {
        let admin = AuthContext::new(UserId::new(), vec![Role::Admin]);
        let pledged = self
            .state
            .ledger
            .pledge(
                case.id,
                PledgeInput {
                    donation_type: DonationType::Monthly,
                    months: Some(months),
                    custom_amount: None,
                    donor_name: None,
                    donor_email: None,
                },
            )
            .await
            .unwrap();
        self.state
            .ledger
            .confirm_donation(&admin, pledged.id, None, None)
            .await
            .unwrap()
    }
}

pub fn token_for(user_id: UserId, secret: &str) -> String {
    let claims = json!({
        "sub": user_id.into_inner(),
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        "iat": Utc::now().timestamp(),
        "aud": "authenticated",
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
