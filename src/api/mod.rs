//! HTTP front-end
//!
//! Router assembly and shared state. Three groups of routes: public
//! (health, session minting, credential registration and token issuing),
//! session-scoped but unauthenticated (customer creation, mirroring the
//! console flow where registration precedes login), and the protected
//! banking operations behind bearer auth.

pub mod middleware;
pub mod routes;
pub mod session;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::config::Config;

use self::session::{CredentialStore, SessionStore};

/// Shared application state
pub struct AppState {
    pub sessions: SessionStore,
    pub credentials: CredentialStore,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl_minutes, config.policy()),
            credentials: CredentialStore::new(config.token_ttl_minutes),
            config,
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/login/:national_id", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/accounts", post(routes::open_account).get(routes::list_accounts))
        .route("/accounts/:number", delete(routes::remove_account))
        .route("/balance", get(routes::get_balance))
        .route("/statement", get(routes::get_statement))
        .route("/deposit", post(routes::deposit))
        .route("/withdraw", post(routes::withdraw))
        .route("/loans/simulate", post(routes::simulate_loan))
        .route("/loans/contract", post(routes::contract_loan))
        .route("/loans/installment", post(routes::pay_installment))
        .route("/loans/payoff", post(routes::payoff_loan))
        .route("/chat", post(routes::chat))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Customer creation needs a session but no bearer token.
    let session_scoped = Router::new()
        .route("/customers", post(routes::create_customer))
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/session", post(routes::new_session))
        .route("/auth/register", post(routes::auth_register))
        .route("/auth/token", post(routes::auth_token))
        .merge(session_scoped)
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .with_state(state)
}
