/// HTTP endpoint handlers
pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;

pub use auth::*;
pub use comments::*;
pub use posts::*;
pub use users::*;
