/// Security primitives: token codec, password hashing, identity
/// resolution, and the access policy table.
pub mod identity;
pub mod jwt;
pub mod password;
pub mod policy;

pub use identity::Principal;
