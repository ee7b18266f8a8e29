pub mod connections;
pub mod users;

pub use connections::{CanonicalPair, Connection, ConnectionStatus, ConnectionWithUser};
pub use users::{
    LoginRequest, LoginResponse, NewUser, RegisterRequest, UpdateProfileRequest, User, UserAuth,
    UserPublic,
};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl SuccessResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}
