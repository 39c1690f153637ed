/// Access policy predicates
///
/// Every authorization rule in the API lives in this table. Predicates are
/// pure functions over the resolved principal and the target's owner; they
/// perform no I/O, so handlers decide access with data they already hold.
///
/// Two deliberate asymmetries:
/// - Admins may edit or delete any comment, but may NOT modify another
///   user's post or profile. Post and profile mutation is strictly
///   owner-only.
/// - Account deletion allows the owner or an admin.
use crate::security::identity::Principal;

/// Read operations, split into those open to anonymous callers and those
/// reserved for admins. Listing every variant here keeps the policy
/// fail-closed: a new read path must be classified before it can ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAction {
    /// Browse or filter the post catalog
    ListPosts,
    /// Full-text search over posts
    SearchPosts,
    /// Fetch a single post by id or slug
    GetPost,
    /// Fetch a single user's public profile
    GetUser,
    /// List the comments under one post
    ListPostComments,
    /// Enumerate every user account
    ListAllUsers,
    /// Enumerate comments across all posts
    ListAllComments,
}

/// Whether `action` is served without any principal at all.
pub fn can_read_publicly(action: ReadAction) -> bool {
    match action {
        ReadAction::ListPosts
        | ReadAction::SearchPosts
        | ReadAction::GetPost
        | ReadAction::GetUser
        | ReadAction::ListPostComments => true,
        ReadAction::ListAllUsers | ReadAction::ListAllComments => false,
    }
}

/// Owner or admin: comment edits and deletes, account deletion.
pub fn is_owner_or_admin(principal: Option<&Principal>, owner_id: i64) -> bool {
    match principal {
        Some(p) => p.user_id == owner_id || p.is_admin,
        None => false,
    }
}

/// Strictly the owner, with no admin bypass: post updates and deletes,
/// profile updates.
pub fn is_strict_owner(principal: Option<&Principal>, owner_id: i64) -> bool {
    match principal {
        Some(p) => p.user_id == owner_id,
        None => false,
    }
}

/// Admin-only reads: the user roster and the cross-post comment feed.
pub fn is_admin_only(principal: Option<&Principal>) -> bool {
    match principal {
        Some(p) => p.is_admin,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> Principal {
        Principal {
            user_id: id,
            is_admin: false,
        }
    }

    fn admin(id: i64) -> Principal {
        Principal {
            user_id: id,
            is_admin: true,
        }
    }

    #[test]
    fn public_reads_need_no_principal() {
        assert!(can_read_publicly(ReadAction::ListPosts));
        assert!(can_read_publicly(ReadAction::SearchPosts));
        assert!(can_read_publicly(ReadAction::GetPost));
        assert!(can_read_publicly(ReadAction::GetUser));
        assert!(can_read_publicly(ReadAction::ListPostComments));
    }

    #[test]
    fn roster_and_comment_feed_are_not_public() {
        assert!(!can_read_publicly(ReadAction::ListAllUsers));
        assert!(!can_read_publicly(ReadAction::ListAllComments));
    }

    #[test]
    fn every_mutation_predicate_denies_anonymous_callers() {
        assert!(!is_owner_or_admin(None, 1));
        assert!(!is_strict_owner(None, 1));
        assert!(!is_admin_only(None));
    }

    #[test]
    fn owner_or_admin_accepts_both() {
        let owner = user(1);
        let other = user(2);
        let root = admin(9);

        assert!(is_owner_or_admin(Some(&owner), 1));
        assert!(is_owner_or_admin(Some(&root), 1));
        assert!(!is_owner_or_admin(Some(&other), 1));
    }

    #[test]
    fn strict_owner_has_no_admin_bypass() {
        let owner = user(1);
        let root = admin(9);

        assert!(is_strict_owner(Some(&owner), 1));
        assert!(!is_strict_owner(Some(&root), 1));
        assert!(!is_strict_owner(Some(&user(2)), 1));
    }

    #[test]
    fn admin_may_touch_comments_but_not_posts_of_others() {
        let root = admin(9);

        // Comment rules go through owner-or-admin, post rules through
        // strict-owner. The same admin passes one and fails the other.
        assert!(is_owner_or_admin(Some(&root), 1));
        assert!(!is_strict_owner(Some(&root), 1));
    }

    #[test]
    fn admin_only_rejects_regular_users() {
        assert!(is_admin_only(Some(&admin(9))));
        assert!(!is_admin_only(Some(&user(1))));
    }
}
