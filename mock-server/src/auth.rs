use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    ApiFailure, ChangePasswordRequest, Data, Db, LoginRequest, LoginResponse, RefreshRequest,
    ResetPasswordRequest, Session, Store, TokenPair, User, TOKEN_TTL_SECS,
};

fn issue_tokens(store: &mut Store, user_id: Uuid) -> TokenPair {
    let tokens = TokenPair {
        access_token: Uuid::new_v4().simple().to_string(),
        refresh_token: Uuid::new_v4().simple().to_string(),
        expires_in: TOKEN_TTL_SECS,
    };
    store.sessions.insert(tokens.access_token.clone(), user_id);
    store
        .refresh_tokens
        .insert(tokens.refresh_token.clone(), user_id);
    tokens
}

fn find_user(store: &Store, id: Uuid) -> Result<User, ApiFailure> {
    store
        .users
        .iter()
        .find(|user| user.id == id)
        .cloned()
        .ok_or_else(|| ApiFailure::not_found("user"))
}

pub async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Data<LoginResponse>, ApiFailure> {
    let mut store = db.write().await;
    let user = store
        .users
        .iter()
        .find(|user| user.email.eq_ignore_ascii_case(&input.email))
        .filter(|user| store.passwords.get(&user.id) == Some(&input.password))
        .cloned()
        .ok_or_else(|| {
            ApiFailure::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "email or password is incorrect",
            )
        })?;
    if !user.is_active {
        return Err(ApiFailure::new(
            StatusCode::FORBIDDEN,
            "ACCOUNT_DISABLED",
            "account is disabled",
        ));
    }

    let tokens = issue_tokens(&mut store, user.id);
    Ok(Data(LoginResponse { tokens, user }))
}

pub async fn logout(State(db): State<Db>, session: Session) -> StatusCode {
    db.write().await.sessions.remove(&session.token);
    StatusCode::NO_CONTENT
}

pub async fn me(State(db): State<Db>, session: Session) -> Result<Data<User>, ApiFailure> {
    let store = db.read().await;
    find_user(&store, session.user_id).map(Data)
}

pub async fn refresh(
    State(db): State<Db>,
    Json(input): Json<RefreshRequest>,
) -> Result<Data<TokenPair>, ApiFailure> {
    let mut store = db.write().await;
    let user_id = store
        .refresh_tokens
        .remove(&input.refresh_token)
        .ok_or_else(|| {
            ApiFailure::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_REFRESH_TOKEN",
                "refresh token is invalid or already used",
            )
        })?;
    Ok(Data(issue_tokens(&mut store, user_id)))
}

pub async fn change_password(
    State(db): State<Db>,
    session: Session,
    Json(input): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    if store.passwords.get(&session.user_id) != Some(&input.current_password) {
        return Err(ApiFailure::bad_request(
            "INVALID_PASSWORD",
            "current password is incorrect",
        ));
    }
    if input.new_password.len() < 8 {
        return Err(ApiFailure::bad_request(
            "WEAK_PASSWORD",
            "new password must be at least 8 characters",
        ));
    }
    store.passwords.insert(session.user_id, input.new_password);
    Ok(StatusCode::NO_CONTENT)
}

/// Always succeeds; the response does not reveal whether the account exists.
pub async fn reset_password(Json(input): Json<ResetPasswordRequest>) -> StatusCode {
    tracing::info!(email = %input.email, "password reset requested");
    StatusCode::NO_CONTENT
}
