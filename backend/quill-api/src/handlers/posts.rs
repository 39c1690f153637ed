/// Post handlers - creation, the combined listing endpoint, search, and
/// owner-only mutation
use crate::error::Result;
use crate::response::ApiResponse;
use crate::security::Principal;
use crate::services::posts::PostQuery;
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPostsQuery {
    pub start_index: Option<i64>,
    pub limit: Option<i64>,
    pub order: Option<String>,
    pub user_id: Option<i64>,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub post_id: Option<i64>,
    pub search_term: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPostsQuery {
    pub search_term: Option<String>,
    pub sort: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

/// Create a new post authored by the caller
pub async fn create_post(
    pool: web::Data<PgPool>,
    principal: Principal,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service
        .create_post(
            &principal,
            req.title.as_deref().unwrap_or(""),
            req.content.as_deref().unwrap_or(""),
            req.category.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::created(post, "Post created successfully")))
}

/// Combined listing: by author, by id, by slug, or filtered
pub async fn get_posts(
    pool: web::Data<PgPool>,
    query: web::Query<GetPostsQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    let start_index = query.start_index.unwrap_or(0);
    let limit = query.limit.unwrap_or(12);
    let descending = !matches!(query.order.as_deref(), Some("asc"));

    let service = PostService::new((**pool).clone());
    let page = service
        .get_posts(
            start_index,
            limit,
            descending,
            PostQuery {
                author_id: query.user_id,
                post_id: query.post_id,
                slug: query.slug,
                category: query.category,
                search_term: query.search_term,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(page, "Posts retrieved successfully")))
}

/// Fetch a single post by id
pub async fn get_post(pool: web::Data<PgPool>, path: web::Path<i64>) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.get_post(*path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(post, "Post retrieved successfully")))
}

/// Search posts with page bookkeeping
pub async fn search_posts(
    pool: web::Data<PgPool>,
    query: web::Query<SearchPostsQuery>,
) -> Result<HttpResponse> {
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(12);

    let service = PostService::new((**pool).clone());
    let results = service
        .search_posts(
            query.search_term.as_deref(),
            query.sort.as_deref(),
            query.category.as_deref(),
            page,
            size,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        results,
        "Search results retrieved successfully",
    )))
}

/// Update a post (author only)
pub async fn update_post(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<(i64, i64)>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let (post_id, user_id) = path.into_inner();

    let service = PostService::new((**pool).clone());
    let post = service
        .update_post(
            &principal,
            post_id,
            user_id,
            req.title.as_deref(),
            req.content.as_deref(),
            req.category.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(post, "Post updated successfully")))
}

/// Delete a post (author only)
pub async fn delete_post(
    pool: web::Data<PgPool>,
    principal: Principal,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (post_id, user_id) = path.into_inner();

    let service = PostService::new((**pool).clone());
    service.delete_post(&principal, post_id, user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("The Post has been deleted")))
}
