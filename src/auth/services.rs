use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_password, verify_dummy, verify_password},
        repo::UserRepo,
        repo_types::{User, UserSummary},
    },
    error::{AppError, AppResult},
};

pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub async fn register(&self, reg: Registration<'_>) -> AppResult<UserSummary> {
        if self.users.find_by_email(reg.email).await?.is_some() {
            warn!("registration with taken email");
            return Err(AppError::Conflict("user with this email already exists".into()));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: reg.email.to_string(),
            password_hash: hash_password(reg.password)?,
            first_name: reg.first_name.to_string(),
            last_name: reg.last_name.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let user = self.users.insert(&user).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    /// Unknown email and wrong password fail with the same error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, UserSummary)> {
        let Some(user) = self.users.find_by_email(email).await? else {
            verify_dummy(password);
            warn!("login for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "login with invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "user logged in");
        Ok((token, user.into()))
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<UserSummary> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserSummary::from)
            .ok_or(AppError::NotFound("user"))
    }
}
