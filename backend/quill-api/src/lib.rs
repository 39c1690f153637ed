/// Quill API Library
///
/// Backend for the Quill content platform: users, posts, comments and
/// comment likes, authenticated by a signed token carried in a cookie.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and their request/response types
/// - `services`: Business logic layer
/// - `db`: Database access layer and repositories
/// - `models`: Row types shared across layers
/// - `security`: Token codec, password hashing, identity resolution, access policy
/// - `middleware`: Request authentication middleware and extractors
/// - `response`: Uniform API response envelope
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
