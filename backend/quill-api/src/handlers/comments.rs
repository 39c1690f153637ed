/// Comment handlers - creation, listings, the like toggle, and moderation
use crate::error::{AppError, Result};
use crate::response::ApiResponse;
use crate::security::Principal;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: Option<String>,
    pub post_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    pub start_index: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub content: Option<String>,
}

/// Comment on a post as the caller
pub async fn create_comment(
    pool: web::Data<PgPool>,
    principal: Principal,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let post_id = req
        .post_id
        .ok_or_else(|| AppError::InvalidInput("Post ID is required".to_string()))?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .create_comment(&principal, req.content.as_deref().unwrap_or(""), post_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(comment, "Comment created successfully")))
}

/// All comments under one post, newest first
pub async fn get_post_comments(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comments = service.get_post_comments(*path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        comments,
        "Comments retrieved successfully",
    )))
}

/// Admin-only feed of comments across every post
pub async fn get_comments(
    pool: web::Data<PgPool>,
    principal: Principal,
    query: web::Query<ListCommentsQuery>,
) -> Result<HttpResponse> {
    let start_index = query.start_index.unwrap_or(0);
    let limit = query.limit.unwrap_or(9);
    let descending = !matches!(query.sort.as_deref(), Some("asc"));

    let service = CommentService::new((**pool).clone());
    let listing = service
        .get_comments(&principal, start_index, limit, descending)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        listing,
        "Comments retrieved successfully",
    )))
}

/// Flip the caller's like on a comment
pub async fn like_comment(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service.toggle_like(&principal, *path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(comment, "Comment like toggled")))
}

/// Edit a comment (owner or admin)
pub async fn edit_comment(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<i64>,
    req: web::Json<EditCommentRequest>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service
        .edit_comment(&principal, *path, req.content.as_deref().unwrap_or(""))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(comment, "Comment updated successfully")))
}

/// Delete a comment (owner or admin)
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    service.delete_comment(&principal, *path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Comment deleted Successfully")))
}
