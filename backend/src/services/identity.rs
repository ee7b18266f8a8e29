use chrono::Utc;
use uuid::Uuid;

use super::auth::AuthGate;
use crate::db::DynStore;
use crate::error::{codes, AppError, AppResult};
use crate::models::{LoginRequest, NewUser, RegisterRequest, User};
use crate::utils::validation;

/// Account records: registration, credential checks and profile updates.
#[derive(Clone)]
pub struct IdentityService {
    store: DynStore,
}

impl IdentityService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Create an account. Email and username are pre-checked in that order;
    /// the store's unique constraints catch anything that races past them.
    pub async fn register(&self, req: RegisterRequest, auth: &AuthGate) -> AppResult<User> {
        let username = req.username.trim().to_string();
        let display_name = req.display_name.trim().to_string();
        let email = req.email.trim().to_string();

        validation::validate_username(&username)?;
        validation::validate_display_name(&display_name)?;
        validation::validate_email(&email)?;
        validation::validate_password(&req.password)?;

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(codes::USER_EXISTS, "User with this email already exists"));
        }
        if self.store.get_user_by_username(&username).await?.is_some() {
            return Err(AppError::conflict(codes::USERNAME_TAKEN, "Username is already taken"));
        }

        let hashed_password = auth.hash_password(&req.password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                id: Uuid::new_v4(),
                username,
                display_name,
                email,
                hashed_password,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, req: LoginRequest, auth: &AuthGate) -> AppResult<User> {
        let invalid = || AppError::unauthorized(codes::INVALID_CREDENTIALS, "Invalid email or password");

        let user = self
            .store
            .get_user_by_email(req.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !auth.verify_password(&req.password, &user.hashed_password).await? {
            tracing::info!("Failed login for user {}", user.id);
            return Err(invalid());
        }

        tracing::info!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(codes::USER_NOT_FOUND, "User not found"))
    }

    /// Only the display name is mutable.
    pub async fn update_profile(&self, user_id: Uuid, display_name: &str) -> AppResult<User> {
        let display_name = display_name.trim();
        validation::validate_display_name(display_name)?;

        let affected = self
            .store
            .update_display_name(user_id, display_name, Utc::now())
            .await?;
        if affected == 0 {
            return Err(AppError::not_found(codes::USER_NOT_FOUND, "User not found"));
        }

        self.get_user(user_id).await
    }
}
