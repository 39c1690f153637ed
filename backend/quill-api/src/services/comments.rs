/// Comment service - creation, listings, moderation, and the like toggle
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::security::policy;
use crate::security::Principal;
use crate::services::page_window;
use chrono::{Months, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Admin comment feed page. The `Comments` key is part of the existing
/// API and stays capitalized.
#[derive(Debug, Serialize)]
pub struct CommentListing {
    #[serde(rename = "Comments")]
    pub comments: Vec<Comment>,
    pub total: i64,
    #[serde(rename = "lastMonthComments")]
    pub last_month_comments: i64,
}

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comment on a post as the caller.
    pub async fn create_comment(
        &self,
        principal: &Principal,
        content: &str,
        post_id: i64,
    ) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidInput("Content is required".to_string()));
        }

        if post_repo::find_by_id(&self.pool, post_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Post not found with id: {}",
                post_id
            )));
        }

        let comment =
            comment_repo::create_comment(&self.pool, content.trim(), post_id, principal.user_id)
                .await?;

        Ok(comment)
    }

    /// All comments under one post, newest first. An unknown post simply
    /// has no comments.
    pub async fn get_post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = comment_repo::list_by_post(&self.pool, post_id).await?;
        Ok(comments)
    }

    /// Admin-only feed of comments across every post.
    pub async fn get_comments(
        &self,
        principal: &Principal,
        start_index: i64,
        limit: i64,
        descending: bool,
    ) -> Result<CommentListing> {
        if !policy::is_admin_only(Some(principal)) {
            return Err(AppError::Forbidden(
                "You are not allowed to view all the comments".to_string(),
            ));
        }

        let (offset, limit) = page_window(start_index, limit)?;

        let comments = comment_repo::list_all(&self.pool, limit, offset, descending).await?;
        let total = comment_repo::count_comments(&self.pool).await?;

        let one_month_ago = Utc::now() - Months::new(1);
        let last_month_comments =
            comment_repo::count_comments_created_since(&self.pool, one_month_ago).await?;

        Ok(CommentListing {
            comments,
            total,
            last_month_comments,
        })
    }

    /// Flip the caller's like on a comment and return the updated row.
    pub async fn toggle_like(&self, principal: &Principal, comment_id: i64) -> Result<Comment> {
        comment_repo::toggle_like(&self.pool, comment_id, principal.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    /// Replace a comment's content. The author may edit their own
    /// comments; admins may edit any.
    pub async fn edit_comment(
        &self,
        principal: &Principal,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let comment = self.find_comment(comment_id).await?;

        if !policy::is_owner_or_admin(Some(principal), comment.author_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to edit this comment".to_string(),
            ));
        }

        if content.trim().is_empty() {
            return Err(AppError::InvalidInput("Content is required".to_string()));
        }

        let comment = comment_repo::update_content(&self.pool, comment_id, content.trim()).await?;
        Ok(comment)
    }

    /// Remove a comment, owner-or-admin.
    pub async fn delete_comment(&self, principal: &Principal, comment_id: i64) -> Result<()> {
        let comment = self.find_comment(comment_id).await?;

        if !policy::is_owner_or_admin(Some(principal), comment.author_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this comment".to_string(),
            ));
        }

        comment_repo::delete_comment(&self.pool, comment_id).await?;
        Ok(())
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Comment> {
        comment_repo::find_by_id(&self.pool, comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }
}
