//! API Routes
//!
//! HTTP endpoint definitions. Each handler locks the session's banking
//! service for the duration of the call; nothing is awaited while the lock
//! is held.

use std::str::FromStr;
use std::sync::{Arc, MutexGuard};

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat;
use crate::domain::{AccountSummary, LoanQuote, LoanStatus, LoanSummary, PayoffOutcome};
use crate::error::AppError;
use crate::service::{Bank, Statement};

use super::middleware::{AuthenticatedUser, SessionHandle};
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub national_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub name: String,
    pub national_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    pub principal: String,
    pub installments: u32,
    pub rate: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoffResponse {
    Settled { loan: LoanStatus },
    Partial { debited: Decimal, remaining: Decimal },
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

// =========================================================================
// Helpers
// =========================================================================

fn lock_bank(session: &SessionHandle) -> Result<MutexGuard<'_, Bank>, AppError> {
    session
        .bank
        .lock()
        .map_err(|_| AppError::Internal("session lock poisoned".to_string()))
}

fn parse_amount(raw: &str, field: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| AppError::InvalidRequest(format!("Invalid {field}: {raw}")))
}

// =========================================================================
// Handlers
// =========================================================================

/// Liveness probe
pub async fn health() -> &'static str {
    "OK"
}

/// Mint a fresh session
pub async fn new_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session_id = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(SessionResponse { session_id })))
}

/// Register access credentials
pub async fn auth_register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AuthRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state
        .credentials
        .register(&request.national_id, &request.password)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Access credentials registered".to_string(),
        }),
    ))
}

/// Exchange credentials for a bearer token
pub async fn auth_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let access_token = state
        .credentials
        .issue_token(&request.national_id, &request.password)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Create a banking customer in the session
pub async fn create_customer(
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    let mut bank = lock_bank(&session)?;
    bank.register_customer(
        request.name.clone(),
        request.national_id.clone(),
        request.birth_date,
        request.address,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse {
            name: request.name,
            national_id: request.national_id,
        }),
    ))
}

/// Make a customer active in the session
pub async fn login(
    Extension(session): Extension<SessionHandle>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(national_id): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    let mut bank = lock_bank(&session)?;
    let customer = bank.login(&national_id)?;
    tracing::info!(
        credential = %user.national_id,
        customer = %customer.national_id(),
        session = %session.id,
        "Customer login"
    );
    Ok(Json(CustomerResponse {
        name: customer.name().to_string(),
        national_id: customer.national_id().to_string(),
    }))
}

/// Clear the active customer
pub async fn logout(
    Extension(session): Extension<SessionHandle>,
) -> Result<StatusCode, AppError> {
    lock_bank(&session)?.logout();
    Ok(StatusCode::NO_CONTENT)
}

/// Open an account for the active customer
pub async fn open_account(
    Extension(session): Extension<SessionHandle>,
) -> Result<(StatusCode, Json<AccountSummary>), AppError> {
    let summary = lock_bank(&session)?.open_account()?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// List the active customer's accounts
pub async fn list_accounts(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<AccountsResponse>, AppError> {
    let accounts = lock_bank(&session)?.list_accounts()?;
    Ok(Json(AccountsResponse { accounts }))
}

/// Remove an emptied account
pub async fn remove_account(
    Extension(session): Extension<SessionHandle>,
    Path(number): Path<u32>,
) -> Result<StatusCode, AppError> {
    lock_bank(&session)?.remove_account(number)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current balance of the primary account
pub async fn get_balance(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = lock_bank(&session)?.balance()?;
    Ok(Json(BalanceResponse { balance }))
}

/// Transaction history of the primary account
pub async fn get_statement(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<Statement>, AppError> {
    let statement = lock_bank(&session)?.statement()?;
    Ok(Json(statement))
}

/// Deposit into the primary account
pub async fn deposit(
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let amount = parse_amount(&request.amount, "amount")?;
    let balance = lock_bank(&session)?.deposit(amount)?;
    Ok(Json(BalanceResponse { balance }))
}

/// Withdraw from the primary account
pub async fn withdraw(
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let amount = parse_amount(&request.amount, "amount")?;
    let balance = lock_bank(&session)?.withdraw(amount)?;
    Ok(Json(BalanceResponse { balance }))
}

/// Quote a loan without touching any state
pub async fn simulate_loan(
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<LoanRequest>,
) -> Result<Json<LoanQuote>, AppError> {
    let principal = parse_amount(&request.principal, "principal")?;
    let rate = parse_amount(&request.rate, "rate")?;
    let quote = lock_bank(&session)?.simulate_loan(principal, request.installments, rate)?;
    Ok(Json(quote))
}

/// Contract a loan and deposit the principal
pub async fn contract_loan(
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<LoanRequest>,
) -> Result<(StatusCode, Json<LoanSummary>), AppError> {
    let principal = parse_amount(&request.principal, "principal")?;
    let rate = parse_amount(&request.rate, "rate")?;
    let summary = lock_bank(&session)?.contract_loan(principal, request.installments, rate)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Pay one installment of the active loan
pub async fn pay_installment(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<LoanStatus>, AppError> {
    let status = lock_bank(&session)?.pay_installment()?;
    Ok(Json(status))
}

/// Settle the active loan, or partially debit what the account covers
pub async fn payoff_loan(
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<PayoffResponse>, AppError> {
    let outcome = lock_bank(&session)?.payoff_loan()?;
    let response = match outcome {
        PayoffOutcome::Settled(loan) => PayoffResponse::Settled { loan },
        PayoffOutcome::Partial { debited, remaining } => {
            PayoffResponse::Partial { debited, remaining }
        }
    };
    Ok(Json(response))
}

/// Chat interpreter over the session's banking service
pub async fn chat(
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut bank = lock_bank(&session)?;
    let message = chat::interpret(&mut bank, &request.message);
    Ok(Json(ChatResponse { message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_customer_request_deserialize() {
        let json = r#"{
            "name": "Ana Souza",
            "national_id": "111",
            "birth_date": "1990-04-12",
            "address": "12 Baker St"
        }"#;

        let request: CreateCustomerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.national_id, "111");
        assert_eq!(
            request.birth_date,
            NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100.50", "amount").unwrap(), Decimal::new(10050, 2));
        assert_eq!(parse_amount(" 7 ", "amount").unwrap(), Decimal::from(7));
        assert!(parse_amount("ten", "amount").is_err());
    }

    #[test]
    fn test_payoff_response_serialize() {
        let partial = PayoffResponse::Partial {
            debited: Decimal::from(200),
            remaining: Decimal::from(800),
        };
        let value = serde_json::to_value(&partial).unwrap();
        assert_eq!(value["status"], "partial");
        assert_eq!(value["debited"], "200");
    }
}
