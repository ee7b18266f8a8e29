pub mod auth;
pub mod connections;
pub mod extract;
pub mod users;

pub use extract::AuthUser;
