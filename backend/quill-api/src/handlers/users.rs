/// User handlers - profile updates, lookups, the admin roster, signout,
/// and account deletion
use crate::config::Config;
use crate::error::Result;
use crate::middleware::ACCESS_TOKEN_COOKIE;
use crate::response::ApiResponse;
use crate::security::Principal;
use crate::services::users::UserUpdate;
use crate::services::UserService;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub start_index: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

/// Update the caller's own profile
pub async fn update_user(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<i64>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let update = UserUpdate {
        username: req.username,
        email: req.email,
        password: req.password,
        profile_picture: req.profile_picture,
    };

    let service = UserService::new((**pool).clone());
    let user = service.update_user(&principal, *path, update).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User updated successfully")))
}

/// Admin roster with creation statistics
pub async fn get_users(
    pool: web::Data<PgPool>,
    principal: Principal,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse> {
    let start_index = query.start_index.unwrap_or(0);
    let limit = query.limit.unwrap_or(9);
    let descending = !matches!(query.sort.as_deref(), Some("asc"));

    let service = UserService::new((**pool).clone());
    let listing = service
        .get_users(&principal, start_index, limit, descending)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(listing, "Users retrieved successfully")))
}

/// Public profile lookup
pub async fn get_user(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let user = service.get_user(*path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User retrieved successfully")))
}

/// Clear the session cookie. The token itself stays valid until expiry;
/// only the client-side copy is discarded.
pub async fn signout(config: web::Data<Config>) -> Result<HttpResponse> {
    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .http_only(true)
        .secure(config.auth.cookie_secure)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::<()>::message("Sign Out Successful")))
}

/// Delete an account (owner or admin)
pub async fn delete_user(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    service.delete_user(&principal, *path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("User deleted successfully")))
}
