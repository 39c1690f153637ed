/// Post service - creation, the combined listing endpoint, search, and
/// owner-only mutation
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::models::Post;
use crate::security::policy;
use crate::security::Principal;
use crate::services::page_window;
use chrono::{Months, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// One page of posts with the statistics the dashboard expects.
///
/// `last_month_posts` is omitted on the by-author path, which historically
/// never carried it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_posts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_month_posts: Option<i64>,
}

/// Search results with explicit page bookkeeping.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub posts: Vec<Post>,
    pub total_posts: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub last_month_posts: i64,
}

/// Filters accepted by the combined listing endpoint. They are resolved
/// in a fixed priority order, not combined: author, then post id, then
/// slug, then the substring/category filter.
#[derive(Debug, Default)]
pub struct PostQuery {
    pub author_id: Option<i64>,
    pub post_id: Option<i64>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub search_term: Option<String>,
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post authored by the caller. The slug is derived from the
    /// title once, at creation, and both must be unused.
    pub async fn create_post(
        &self,
        principal: &Principal,
        title: &str,
        content: &str,
        category: Option<&str>,
    ) -> Result<Post> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please provide all the fields".to_string(),
            ));
        }

        let slug = generate_slug(title);

        if post_repo::title_exists(&self.pool, title.trim()).await? {
            return Err(AppError::Conflict(
                "Post with this title already exists".to_string(),
            ));
        }

        if post_repo::slug_exists(&self.pool, &slug).await? {
            return Err(AppError::Conflict(
                "Post with this slug already exists".to_string(),
            ));
        }

        let category = match category {
            Some(c) => c.trim(),
            None => "uncategorized",
        };

        let post = post_repo::create_post(
            &self.pool,
            title.trim(),
            content.trim(),
            category,
            &slug,
            principal.user_id,
        )
        .await?;

        Ok(post)
    }

    /// Fetch a single post by id.
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        post_repo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// The combined listing endpoint.
    pub async fn get_posts(
        &self,
        start_index: i64,
        limit: i64,
        descending: bool,
        query: PostQuery,
    ) -> Result<PostPage> {
        let (offset, limit) = page_window(start_index, limit)?;

        if let Some(author_id) = query.author_id {
            let posts =
                post_repo::list_by_author(&self.pool, author_id, limit, offset, descending)
                    .await?;
            let total_posts = post_repo::count_by_author(&self.pool, author_id).await?;

            return Ok(PostPage {
                posts,
                total_posts,
                last_month_posts: None,
            });
        }

        if let Some(post_id) = query.post_id {
            let post = self.get_post(post_id).await?;
            return Ok(single_post_page(post));
        }

        if let Some(slug) = query.slug.as_deref() {
            if !slug.trim().is_empty() {
                let post = post_repo::find_by_slug(&self.pool, slug.trim())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
                return Ok(single_post_page(post));
            }
        }

        let posts = post_repo::list_filtered(
            &self.pool,
            query.search_term.as_deref(),
            query.category.as_deref(),
            limit,
            offset,
            descending,
        )
        .await?;

        // The listing has always reported the whole table size here, not
        // the filtered count; dashboards depend on it.
        let total_posts = post_repo::count_posts(&self.pool).await?;

        let one_month_ago = Utc::now() - Months::new(1);
        let last_month_posts =
            post_repo::count_posts_created_since(&self.pool, one_month_ago).await?;

        Ok(PostPage {
            posts,
            total_posts,
            last_month_posts: Some(last_month_posts),
        })
    }

    /// Search with zero-based page addressing and a filtered total.
    pub async fn search_posts(
        &self,
        search_term: Option<&str>,
        sort: Option<&str>,
        category: Option<&str>,
        page: i64,
        size: i64,
    ) -> Result<SearchResults> {
        if size < 1 {
            return Err(AppError::InvalidInput(
                "Page size must be greater than zero".to_string(),
            ));
        }

        if page < 0 {
            return Err(AppError::InvalidInput(
                "Page index cannot be negative".to_string(),
            ));
        }

        // Some clients serialize absent parameters as the string "null".
        let descending = !matches!(sort, Some("asc"));
        let category = category.filter(|c| *c != "null");
        let search_term = search_term.filter(|s| !s.trim().is_empty());

        let offset = page * size;
        let posts = post_repo::list_filtered(
            &self.pool,
            search_term,
            category,
            size,
            offset,
            descending,
        )
        .await?;

        let total_posts = post_repo::count_filtered(&self.pool, search_term, category).await?;
        let total_pages = (total_posts + size - 1) / size;

        let one_month_ago = Utc::now() - Months::new(1);
        let last_month_posts =
            post_repo::count_posts_created_since(&self.pool, one_month_ago).await?;

        Ok(SearchResults {
            posts,
            total_posts,
            current_page: page,
            total_pages,
            page_size: size,
            has_next: page + 1 < total_pages,
            has_previous: page > 0,
            last_month_posts,
        })
    }

    /// Update a post. Only its author may do so; the path carries the
    /// claimed author id and both it and the stored author are checked.
    pub async fn update_post(
        &self,
        principal: &Principal,
        post_id: i64,
        path_user_id: i64,
        title: Option<&str>,
        content: Option<&str>,
        category: Option<&str>,
    ) -> Result<Post> {
        if !policy::is_strict_owner(Some(principal), path_user_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to update this post".to_string(),
            ));
        }

        let current = self.get_post(post_id).await?;

        if !policy::is_strict_owner(Some(principal), current.author_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to update this post".to_string(),
            ));
        }

        let mut new_title = current.title.clone();
        let mut new_content = current.content.clone();
        let mut new_category = current.category.clone();

        if let Some(title) = title {
            if !title.trim().is_empty() {
                new_title = title.trim().to_string();
            }
        }

        if let Some(content) = content {
            if !content.trim().is_empty() {
                new_content = content.trim().to_string();
            }
        }

        if let Some(category) = category {
            if !category.trim().is_empty() {
                new_category = category.trim().to_string();
            }
        }

        let post =
            post_repo::update_post(&self.pool, post_id, &new_title, &new_content, &new_category)
                .await?;

        Ok(post)
    }

    /// Delete a post, with the same double ownership check as updates.
    pub async fn delete_post(
        &self,
        principal: &Principal,
        post_id: i64,
        path_user_id: i64,
    ) -> Result<()> {
        if !policy::is_strict_owner(Some(principal), path_user_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this post".to_string(),
            ));
        }

        let current = self.get_post(post_id).await?;

        if !policy::is_strict_owner(Some(principal), current.author_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this post".to_string(),
            ));
        }

        post_repo::delete_post(&self.pool, post_id).await?;

        Ok(())
    }
}

fn single_post_page(post: Post) -> PostPage {
    PostPage {
        posts: vec![post],
        total_posts: 1,
        last_month_posts: Some(0),
    }
}

/// Derive a URL slug from a title: lowercase, keep only alphanumerics,
/// whitespace and hyphens, then collapse every separator run into one `-`.
pub(crate) fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(c);
        } else if c.is_ascii_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    if pending_separator {
        slug.push('-');
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_become_hyphenated_lowercase() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("My First Post"), "my-first-post");
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(generate_slug("Rust: Fearless Concurrency!"), "rust-fearless-concurrency");
        assert_eq!(generate_slug("What's new?"), "whats-new");
    }

    #[test]
    fn separator_runs_collapse() {
        assert_eq!(generate_slug("a  -  b"), "a-b");
        assert_eq!(generate_slug("a--b"), "a-b");
        assert_eq!(generate_slug("a - ! - b"), "a-b");
    }

    #[test]
    fn digits_are_kept() {
        assert_eq!(generate_slug("Top 10 Crates 2024"), "top-10-crates-2024");
    }

    #[test]
    fn leading_and_trailing_whitespace_leave_hyphens() {
        // Longstanding behavior: surrounding whitespace is folded into
        // separators rather than dropped.
        assert_eq!(generate_slug("  padded title  "), "-padded-title-");
    }

    #[test]
    fn non_ascii_is_dropped() {
        assert_eq!(generate_slug("Crème Brûlée"), "crme-brle");
    }
}
