/// User service - profile updates, lookups, listings, and deletion
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::security::policy;
use crate::security::Principal;
use crate::services::page_window;
use chrono::{Months, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Optional-field profile update. `None` means "leave unchanged"; a blank
/// string is treated the same way, matching the existing client contract.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
}

/// Admin roster page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    pub users: Vec<User>,
    pub total_users: i64,
    pub last_month_users: i64,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a single user's profile.
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id: {}", user_id)))
    }

    /// Apply a profile update. Only the owner may update their account;
    /// admins get no bypass here.
    pub async fn update_user(
        &self,
        principal: &Principal,
        user_id: i64,
        update: UserUpdate,
    ) -> Result<User> {
        if !policy::is_strict_owner(Some(principal), user_id) {
            return Err(AppError::Forbidden("Update not allowed".to_string()));
        }

        let current = self.get_user(user_id).await?;

        let mut username = current.username.clone();
        let mut email = current.email.clone();
        let mut password_hash = current.password_hash.clone();
        let mut profile_picture = current.profile_picture.clone();

        if let Some(new_password) = update.password.as_deref() {
            if !new_password.trim().is_empty() {
                if new_password.chars().count() < 6 {
                    return Err(AppError::InvalidInput(
                        "Password must be at least 6 characters".to_string(),
                    ));
                }
                password_hash = crate::security::password::hash_password(new_password)?;
            }
        }

        if let Some(new_username) = update.username.as_deref() {
            if !new_username.trim().is_empty() {
                let new_username = new_username.trim();

                let length = new_username.chars().count();
                if !(7..=20).contains(&length) {
                    return Err(AppError::InvalidInput(
                        "Username must be between 7 and 20 characters".to_string(),
                    ));
                }

                if new_username.contains(' ') {
                    return Err(AppError::InvalidInput(
                        "Username cannot contain white spaces".to_string(),
                    ));
                }

                if new_username != new_username.to_lowercase() {
                    return Err(AppError::InvalidInput(
                        "username must be lowercase".to_string(),
                    ));
                }

                if !new_username.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(AppError::InvalidInput(
                        "Username can only contain letters and numbers".to_string(),
                    ));
                }

                if new_username != current.username
                    && user_repo::username_exists(&self.pool, new_username).await?
                {
                    return Err(AppError::Conflict("username already exists".to_string()));
                }

                username = new_username.to_string();
            }
        }

        if let Some(new_email) = update.email.as_deref() {
            if !new_email.trim().is_empty() {
                if new_email != current.email
                    && user_repo::email_exists(&self.pool, new_email).await?
                {
                    return Err(AppError::Conflict("Email Already Exists".to_string()));
                }
                email = new_email.to_string();
            }
        }

        if let Some(new_picture) = update.profile_picture {
            profile_picture = Some(new_picture);
        }

        let user = user_repo::update_user(
            &self.pool,
            user_id,
            &username,
            &email,
            &password_hash,
            profile_picture.as_deref(),
        )
        .await?;

        Ok(user)
    }

    /// Admin-only roster with creation statistics.
    pub async fn get_users(
        &self,
        principal: &Principal,
        start_index: i64,
        limit: i64,
        descending: bool,
    ) -> Result<UserListing> {
        if !policy::is_admin_only(Some(principal)) {
            return Err(AppError::Forbidden(
                "You are not allowed to see all the users".to_string(),
            ));
        }

        let (offset, limit) = page_window(start_index, limit)?;

        let users = user_repo::list_users(&self.pool, limit, offset, descending).await?;
        let total_users = user_repo::count_users(&self.pool).await?;

        let one_month_ago = Utc::now() - Months::new(1);
        let last_month_users =
            user_repo::count_users_created_since(&self.pool, one_month_ago).await?;

        Ok(UserListing {
            users,
            total_users,
            last_month_users,
        })
    }

    /// Remove an account. The owner may delete themselves; admins may
    /// delete anyone.
    pub async fn delete_user(&self, principal: &Principal, user_id: i64) -> Result<()> {
        if !policy::is_owner_or_admin(Some(principal), user_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this user".to_string(),
            ));
        }

        let removed = user_repo::delete_user(&self.pool, user_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "User not found with id: {}",
                user_id
            )));
        }

        Ok(())
    }
}
