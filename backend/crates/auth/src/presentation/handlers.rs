//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};
use platform::rate_limit::MemoryRateLimitStore;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentAccountUseCase, ForgotPasswordUseCase, ForgotUsernameUseCase, IdentityStore,
    LoginInput, LoginUseCase, LogoutOutcome, LogoutUseCase, RefreshUseCase, ResetPasswordInput,
    ResetPasswordUseCase, RequestEmailVerificationUseCase, SignUpInput, SignUpUseCase,
    TokenCodec, VerificationRequest, VerifyEmailUseCase,
};
use crate::domain::mailer::EmailDispatcher;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::identity::Identity;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccessTokenResponse, EmailRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    ResetPasswordRequest, SendVerificationRequest, SignUpRequest, SignUpResponse, UserResponse,
};
use crate::presentation::extract::AppJson;

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    pub store: Arc<IdentityStore<R>>,
    pub mailer: Arc<M>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
    pub rate_limiter: Arc<MemoryRateLimitStore>,
}

impl<R, M> AuthAppState<R, M>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    pub fn new(repo: R, mailer: M, config: AuthConfig) -> Self {
        Self {
            store: Arc::new(IdentityStore::new(Arc::new(repo), config.security_token_ttl)),
            mailer: Arc::new(mailer),
            codec: Arc::new(TokenCodec::new(&config)),
            config: Arc::new(config),
            rate_limiter: Arc::new(MemoryRateLimitStore::new()),
        }
    }
}

// Manual impl: a derive would demand `R: Clone` and `M: Clone`
impl<R, M> Clone for AuthAppState<R, M>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            mailer: self.mailer.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
            rate_limiter: self.rate_limiter.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    AppJson(req): AppJson<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.store.clone(), state.mailer.clone(), state.config.clone());

    let input = SignUpInput {
        email: req.email,
        user_name: req.username,
        password: req.password,
        full_name: req.full_name,
    };

    let output = use_case.execute(input).await?;

    let message = if output.verification_sent {
        "User registered successfully. Please check your email to verify your account."
    } else {
        "User registered successfully. The verification email could not be sent; please request a new one."
    };

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: message.to_string(),
            user: UserResponse::from(&output.account),
        }),
    ))
}

// ============================================================================
// Login / Logout / Refresh
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    AppJson(req): AppJson<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.store.clone(), state.codec.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            user_name: req.username,
            password: req.password,
        })
        .await?;

    let cookie = set_cookie_header(&state.config.refresh_cookie, &output.refresh_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: output.access_token,
            user: UserResponse::from(&output.account),
        }),
    ))
}

/// GET /api/auth/logout
///
/// The refresh cookie is cleared on every outcome, errors included.
pub async fn logout<R, M>(State(state): State<AuthAppState<R, M>>, headers: HeaderMap) -> Response
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie.name);
    let clear = [(header::SET_COOKIE, delete_cookie_header(&state.config.refresh_cookie))];

    let use_case = LogoutUseCase::new(state.store.clone());
    match use_case.execute(token.as_deref()).await {
        Ok(LogoutOutcome::LoggedOut) => (
            StatusCode::OK,
            clear,
            Json(MessageResponse::new("Logged out successfully")),
        )
            .into_response(),
        Ok(LogoutOutcome::NoSession) => (StatusCode::NO_CONTENT, clear).into_response(),
        Err(e) => (clear, e).into_response(),
    }
}

/// GET /api/auth/refresh
pub async fn refresh<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<AccessTokenResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie.name);

    let use_case = RefreshUseCase::new(state.store.clone(), state.codec.clone());
    let access_token = use_case.execute(token.as_deref()).await?;

    Ok(Json(AccessTokenResponse { access_token }))
}

// ============================================================================
// Recovery
// ============================================================================

/// POST /api/auth/forgotPassword
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    AppJson(req): AppJson<EmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.store.clone(),
        state.mailer.clone(),
        state.rate_limiter.clone(),
        state.config.clone(),
    );
    let message = use_case.execute(&req.email).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/auth/forgotUsername
pub async fn forgot_username<R, M>(
    State(state): State<AuthAppState<R, M>>,
    AppJson(req): AppJson<EmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let use_case = ForgotUsernameUseCase::new(
        state.store.clone(),
        state.mailer.clone(),
        state.rate_limiter.clone(),
        state.config.clone(),
    );
    let message = use_case.execute(&req.email).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/auth/resetPassword/{token}
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(state.store.clone(), state.config.clone());
    use_case
        .execute(ResetPasswordInput {
            token,
            new_password: req.new_password,
            confirm_password: req.confirm_password,
        })
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset successfully")))
}

// ============================================================================
// Email Verification
// ============================================================================

/// POST /api/auth/verifyEmail/{token}
pub async fn verify_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    VerifyEmailUseCase::new(state.store.clone()).execute(&token).await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// POST /api/auth/sendVerificationEmail (requires authentication)
///
/// The body is optional; `{"email": ".."}` requests verification of a new address.
pub async fn send_verification_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    identity: Identity,
    body: Bytes,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let req: SendVerificationRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SendVerificationRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AuthError::invalid_field("body", "Request body must be a JSON object"))?
    };

    let use_case = RequestEmailVerificationUseCase::new(
        state.store.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let message = match use_case.execute(&identity, req.email.as_deref()).await? {
        VerificationRequest::Sent => "Verification email sent",
        VerificationRequest::AlreadyVerified => "Email is already verified",
    };
    Ok(Json(MessageResponse::new(message)))
}

// ============================================================================
// Current Account
// ============================================================================

/// GET /api/auth/me (requires authentication)
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    identity: Identity,
) -> AuthResult<Json<MeResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let account = CurrentAccountUseCase::new(state.store.clone())
        .execute(&identity)
        .await?;

    Ok(Json(MeResponse {
        user: UserResponse::from(&account),
    }))
}
