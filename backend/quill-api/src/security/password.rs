/// Password hashing and verification using Argon2id
use crate::error::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, Rng};

/// Length of passwords minted for externally authenticated accounts.
const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Hash a password using Argon2id with a per-password random salt.
///
/// Returns a PHC-formatted hash string safe for database storage.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash.
///
/// `Ok(false)` means the password simply does not match; any other failure
/// (corrupt hash, unsupported format) surfaces as an internal error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Generate a random password for accounts provisioned through an external
/// identity provider. The user never sees it; it only lets the account
/// satisfy the non-null password column and the usual signin path.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2quill").expect("should hash password");
        assert!(verify_password("hunter2quill", &hash).expect("should verify"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("hunter2quill").expect("should hash password");
        assert!(!verify_password("wrong-password", &hash).expect("verification should run"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hash1 = hash_password("hunter2quill").expect("should hash");
        let hash2 = hash_password("hunter2quill").expect("should hash");
        // Random salts keep equal passwords from colliding in storage.
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn corrupt_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("anything", "not-a-phc-hash").is_err());
    }

    #[test]
    fn generated_passwords_are_alphanumeric_and_sized() {
        let password = generate_password();
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
    }
}
