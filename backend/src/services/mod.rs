pub mod auth;
pub mod connections;
pub mod identity;
pub mod search;

pub use auth::{AuthGate, Claims, Identity};
pub use connections::ConnectionGraph;
pub use identity::IdentityService;
pub use search::SearchRanker;
