//! In-memory stand-in for the ConnectWon backend API.
//!
//! Serves the same JSON envelopes as the real backend (`{ data: ... }` on
//! success, `{ error: { message, code } }` on failure) under `/api`, with a
//! seeded administrator account. `POST /api/__faults` makes the next N
//! requests fail with a chosen status so clients can exercise their retry
//! paths over real HTTP.

mod auth;
mod error;
mod handlers;
mod models;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use error::ApiFailure;
pub use models::*;

pub const ADMIN_EMAIL: &str = "admin@connectwon.kr";
pub const ADMIN_PASSWORD: &str = "admin1234";

/// Access token lifetime reported to clients, in seconds.
pub const TOKEN_TTL_SECS: u64 = 3600;

#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub passwords: HashMap<Uuid, String>,
    pub sessions: HashMap<String, Uuid>,
    pub refresh_tokens: HashMap<String, Uuid>,
    pub programs: Vec<Program>,
    pub participants: Vec<Participant>,
    pub venues: Vec<Venue>,
    pub payments: Vec<Payment>,
    pub fault: Option<Fault>,
}

impl Store {
    /// A store holding only the administrator account.
    pub fn seeded() -> Self {
        let admin = User {
            id: Uuid::new_v4(),
            email: ADMIN_EMAIL.to_string(),
            name: "관리자".to_string(),
            role: "admin".to_string(),
            phone: None,
            is_active: true,
        };
        let mut store = Store::default();
        store.passwords.insert(admin.id, ADMIN_PASSWORD.to_string());
        store.users.push(admin);
        store
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Success envelope.
pub struct Data<T>(pub T);

impl<T: Serialize> IntoResponse for Data<T> {
    fn into_response(self) -> Response {
        Json(json!({ "data": self.0 })).into_response()
    }
}

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

impl FromRequestParts<Db> for Session {
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(ApiFailure::unauthorized)?;
        let user_id = *db
            .read()
            .await
            .sessions
            .get(token)
            .ok_or_else(ApiFailure::unauthorized)?;
        Ok(Session {
            user_id,
            token: token.to_string(),
        })
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/programs",
            get(handlers::list_programs).post(handlers::create_program),
        )
        .route(
            "/programs/{id}",
            get(handlers::get_program)
                .patch(handlers::update_program)
                .delete(handlers::delete_program),
        )
        .route("/programs/{id}/activate", post(handlers::activate_program))
        .route("/programs/{id}/deactivate", post(handlers::deactivate_program))
        .route(
            "/participants",
            get(handlers::list_participants).post(handlers::create_participant),
        )
        .route(
            "/participants/{id}",
            get(handlers::get_participant)
                .patch(handlers::update_participant)
                .delete(handlers::delete_participant),
        )
        .route("/venues", get(handlers::list_venues).post(handlers::create_venue))
        .route(
            "/venues/{id}",
            get(handlers::get_venue)
                .patch(handlers::update_venue)
                .delete(handlers::delete_venue),
        )
        .route("/venues/{id}/stats", get(handlers::venue_stats))
        .route(
            "/payments",
            get(handlers::list_payments).post(handlers::create_payment),
        )
        .route(
            "/payments/{id}",
            get(handlers::get_payment)
                .patch(handlers::update_payment)
                .delete(handlers::delete_payment),
        )
        .route("/payments/{id}/process", post(handlers::process_payment))
        .route("/payments/{id}/refund", post(handlers::refund_payment))
        .route("/payments/{id}/cancel", post(handlers::cancel_payment))
        .route("/__faults", post(arm_fault))
        .layer(middleware::from_fn_with_state(db.clone(), inject_fault))
        .with_state(db);

    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn arm_fault(State(db): State<Db>, Json(fault): Json<Fault>) -> StatusCode {
    tracing::info!(status = fault.status, count = fault.count, "fault armed");
    db.write().await.fault = Some(fault).filter(|fault| fault.count > 0);
    StatusCode::NO_CONTENT
}

async fn inject_fault(State(db): State<Db>, request: Request, next: Next) -> Response {
    if request.uri().path().ends_with("/__faults") {
        return next.run(request).await;
    }

    let injected = {
        let mut store = db.write().await;
        let fault = store.fault;
        if let Some(fault) = fault {
            store.fault = Some(Fault {
                count: fault.count - 1,
                ..fault
            })
            .filter(|fault| fault.count > 0);
        }
        fault.map(|fault| fault.status)
    };

    match injected {
        Some(status) => {
            tracing::debug!(status, path = %request.uri().path(), "injecting fault");
            ApiFailure::new(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "INJECTED_FAULT",
                "injected fault",
            )
            .into_response()
        }
        None => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_holds_the_admin() {
        let store = Store::seeded();
        assert_eq!(store.users.len(), 1);
        assert_eq!(store.users[0].email, ADMIN_EMAIL);
        assert_eq!(
            store.passwords.get(&store.users[0].id).map(String::as_str),
            Some(ADMIN_PASSWORD)
        );
    }

    #[test]
    fn pagination_is_one_based() {
        let query = ListQuery {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(query.paginate(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        assert_eq!(ListQuery::default().paginate(vec![1, 2]), vec![1, 2]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let query = ListQuery {
            search: Some("ART".to_string()),
            ..Default::default()
        };
        assert!(query.matches_search("Art therapy"));
        assert!(!query.matches_search("Music"));
        assert!(ListQuery::default().matches_search("anything"));
    }

    #[test]
    fn create_program_defaults_description() {
        let input: CreateProgram = serde_json::from_str(
            r#"{"title":"Art","category":"art","capacity":10,"price":1000}"#,
        )
        .unwrap();
        assert_eq!(input.description, "");
        assert!(input.venue_id.is_none());
    }

    #[test]
    fn refund_request_fields_are_optional() {
        let input: RefundRequest = serde_json::from_str("{}").unwrap();
        assert!(input.amount.is_none());
        assert!(input.reason.is_none());
    }
}
