/// Auth handlers - signup, signin, and external-provider signin
use crate::config::Config;
use crate::error::Result;
use crate::middleware::ACCESS_TOKEN_COOKIE;
use crate::response::ApiResponse;
use crate::services::AuthService;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

/// Fields are optional so that an omitted field gets the same "all fields
/// are required" answer as a blank one.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    pub email: String,
    pub name: String,
    pub google_photo_url: Option<String>,
}

/// Build the session cookie carrying a freshly issued token.
pub(crate) fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .http_only(true)
        .secure(config.auth.cookie_secure)
        .path("/")
        .max_age(CookieDuration::seconds(config.auth.token_ttl_seconds))
        .same_site(SameSite::Lax)
        .finish()
}

/// Register a new account
pub async fn signup(
    pool: web::Data<PgPool>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    service
        .signup(
            req.username.as_deref().unwrap_or(""),
            req.email.as_deref().unwrap_or(""),
            req.password.as_deref().unwrap_or(""),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Signup Successful !!")))
}

/// Sign in with email and password, setting the session cookie
pub async fn signin(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<SigninRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    let ttl = chrono::Duration::seconds(config.auth.token_ttl_seconds);

    let (user, token) = service
        .signin(
            req.email.as_deref().unwrap_or(""),
            req.password.as_deref().unwrap_or(""),
            ttl,
        )
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &config))
        .json(ApiResponse::success(user, "Signin Successful")))
}

/// Sign in with an already-verified Google identity, provisioning an
/// account on first contact
pub async fn google_auth(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<GoogleAuthRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    let ttl = chrono::Duration::seconds(config.auth.token_ttl_seconds);

    let (user, token) = service
        .external_auth(&req.email, &req.name, req.google_photo_url.as_deref(), ttl)
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &config))
        .json(ApiResponse::success(user, "Authentication Successful")))
}
