/// Identity resolution: token claims -> live principal
///
/// A verified token is not enough to act on. The subject row is re-read on
/// every request so that a deleted account stops resolving immediately and
/// the admin flag reflects current storage rather than whatever was true
/// when the token was issued.
use crate::db::user_repo;
use crate::security::jwt;
use sqlx::PgPool;
use tracing::{debug, error};

/// The authenticated caller attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    /// Current admin flag from storage, not the token claim.
    pub is_admin: bool,
}

/// Resolve a raw token string into a live principal.
///
/// Every failure mode collapses to `None`: the caller is treated as
/// anonymous and the request itself never fails here. Storage errors are
/// logged before being swallowed.
pub async fn resolve(pool: &PgPool, token: &str) -> Option<Principal> {
    let claims = match jwt::verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            return None;
        }
    };

    let user_id: i64 = match claims.sub.parse() {
        Ok(id) => id,
        Err(_) => {
            debug!("Session token subject is not a valid user id");
            return None;
        }
    };

    match user_repo::find_by_id(pool, user_id).await {
        Ok(Some(user)) => Some(Principal {
            user_id: user.id,
            is_admin: user.is_admin,
        }),
        Ok(None) => {
            debug!(user_id, "Session token subject no longer exists");
            None
        }
        Err(e) => {
            error!(user_id, "Failed to load user while resolving identity: {}", e);
            None
        }
    }
}
