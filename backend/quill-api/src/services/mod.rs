/// Business logic layer
///
/// Each service owns a pool handle, applies the access policy, and talks
/// to storage through the `db` repositories. Handlers construct services
/// per request and translate results into HTTP responses.
use crate::error::{AppError, Result};

pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;

pub use auth::AuthService;
pub use comments::CommentService;
pub use posts::PostService;
pub use users::UserService;

/// Translate startIndex/limit paging into an SQL (offset, limit) window.
/// The page that contains `start_index` is served whole.
pub(crate) fn page_window(start_index: i64, limit: i64) -> Result<(i64, i64)> {
    if limit < 1 {
        return Err(AppError::InvalidInput(
            "Limit must be greater than zero".to_string(),
        ));
    }

    if start_index < 0 {
        return Err(AppError::InvalidInput(
            "Start index cannot be negative".to_string(),
        ));
    }

    let page = start_index / limit;
    Ok((page * limit, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_index_snaps_to_its_page() {
        // Page size 9: indexes 0..=8 are page 0, 9..=17 page 1.
        assert_eq!(page_window(0, 9).unwrap(), (0, 9));
        assert_eq!(page_window(8, 9).unwrap(), (0, 9));
        assert_eq!(page_window(9, 9).unwrap(), (9, 9));
        assert_eq!(page_window(17, 9).unwrap(), (9, 9));
        assert_eq!(page_window(18, 9).unwrap(), (18, 9));
    }

    #[test]
    fn zero_or_negative_limit_is_rejected() {
        assert!(page_window(0, 0).is_err());
        assert!(page_window(0, -3).is_err());
    }

    #[test]
    fn negative_start_index_is_rejected() {
        assert!(page_window(-1, 9).is_err());
    }
}
