use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicAccount, RegisterRequest, RegisterResponse},
        extractors::ValidJson,
        services::{authenticate, register_account},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let account = match register_account(state.store.as_ref(), &state.hasher, payload).await {
        Ok(a) => a,
        Err(e) if e.is_infrastructure() => {
            error!(error = %e, "registration failed");
            return Err(ApiError::from_registration(
                e,
                state.config.expose_registration_errors,
            ));
        }
        Err(e) => {
            warn!(reason = %e, "registration rejected");
            return Err(e.into());
        }
    };

    info!(account_id = %account.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully!".into(),
            user: account.into(),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<PublicAccount>)> {
    let (account, token) = match authenticate(
        state.store.as_ref(),
        &state.hasher,
        &state.jwt,
        &payload.email,
        payload.password,
    )
    .await
    {
        Ok(v) => v,
        Err(e) if e.is_infrastructure() => {
            error!(error = %e, "login failed");
            return Err(e.into());
        }
        Err(e) => {
            warn!(reason = %e, "login rejected");
            return Err(e.into());
        }
    };

    let cookie = Cookie::build((state.config.cookie.name.clone(), token))
        .http_only(true)
        .secure(state.config.cookie.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::minutes(state.config.jwt.ttl_minutes));

    info!(account_id = %account.id, "user logged in");
    Ok((jar.add(cookie), Json(account.into())))
}
