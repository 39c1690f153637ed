/// Credential service - signup, signin, and external-provider auth
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::security::{jwt, password};
use chrono::Duration;
use rand::Rng;
use sqlx::PgPool;

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account. No token is issued; the caller signs in
    /// separately.
    pub async fn signup(&self, username: &str, email: &str, password_text: &str) -> Result<()> {
        if username.trim().is_empty() || email.trim().is_empty() || password_text.trim().is_empty()
        {
            return Err(AppError::InvalidInput("All fields are required!".to_string()));
        }

        if user_repo::email_exists(&self.pool, email).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        if user_repo::username_exists(&self.pool, username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = password::hash_password(password_text)?;
        user_repo::create_user(&self.pool, username.trim(), email.trim(), &password_hash, None)
            .await?;

        Ok(())
    }

    /// Authenticate with email and password, returning the user and a
    /// fresh session token.
    ///
    /// Unknown email and wrong password collapse into the same
    /// `InvalidCredentials` answer so the endpoint does not reveal which
    /// accounts exist.
    pub async fn signin(
        &self,
        email: &str,
        password_text: &str,
        token_ttl: Duration,
    ) -> Result<(User, String)> {
        if email.trim().is_empty() || password_text.trim().is_empty() {
            return Err(AppError::InvalidInput("All fields are required!".to_string()));
        }

        let user = user_repo::find_by_email(&self.pool, email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(password_text, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = issue_session_token(&user, token_ttl)?;
        Ok((user, token))
    }

    /// Sign in through an already-verified external identity provider.
    ///
    /// A known email signs straight in; an unknown one gets an account
    /// provisioned with a random password and a username derived from the
    /// display name.
    pub async fn external_auth(
        &self,
        email: &str,
        display_name: &str,
        avatar_url: Option<&str>,
        token_ttl: Duration,
    ) -> Result<(User, String)> {
        if let Some(user) = user_repo::find_by_email(&self.pool, email).await? {
            let token = issue_session_token(&user, token_ttl)?;
            return Ok((user, token));
        }

        let generated = password::generate_password();
        let password_hash = password::hash_password(&generated)?;
        let username = self.generate_unique_username(display_name).await?;

        let user =
            user_repo::create_user(&self.pool, &username, email, &password_hash, avatar_url)
                .await?;

        let token = issue_session_token(&user, token_ttl)?;
        Ok((user, token))
    }

    /// Derive a username from a display name, retrying with a random
    /// four-digit suffix until it is unique.
    async fn generate_unique_username(&self, display_name: &str) -> Result<String> {
        let base = sanitize_username(display_name);
        let mut candidate = base.clone();

        while user_repo::username_exists(&self.pool, &candidate).await? {
            let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
            candidate = format!("{}{:04}", base, suffix);
        }

        Ok(candidate)
    }
}

fn issue_session_token(user: &User, ttl: Duration) -> Result<String> {
    jwt::issue(user.id, user.is_admin, ttl).map_err(|e| AppError::Config(e.to_string()))
}

/// Lowercase a display name and drop every whitespace character.
fn sanitize_username(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_lose_case_and_spaces() {
        assert_eq!(sanitize_username("John Doe"), "johndoe");
        assert_eq!(sanitize_username("ANA maria SILVA"), "anamariasilva");
    }

    #[test]
    fn tabs_and_inner_runs_are_dropped_too() {
        assert_eq!(sanitize_username("a\tb  c"), "abc");
    }

    #[test]
    fn plain_names_pass_through_lowercased() {
        assert_eq!(sanitize_username("Quill"), "quill");
    }

    #[test]
    fn digits_survive_sanitizing() {
        assert_eq!(sanitize_username("Agent 007"), "agent007");
    }
}
