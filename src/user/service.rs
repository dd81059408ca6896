use std::sync::Arc;

use crate::auth::TokenManager;
use crate::error::AppError;
use crate::password;
use crate::user::model::{LoginRequest, RegisterRequest, TokenResponse, User};
use crate::user::repository::UserRepository;

/// Account creation, credential verification and profile retrieval.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: TokenManager,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: TokenManager) -> Self {
        Self { repo, tokens }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let username = req.username.trim();
        let email = req.email.trim();
        if username.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(AppError::Validation(
                "username, email and password are required".into(),
            ));
        }

        let hashed = password::hash(&req.password)?;
        let mut user = self.repo.create(username, email, &hashed).await?;
        user.password.clear();
        Ok(user)
    }

    /// The error is identical for an unknown email and a wrong password so
    /// the endpoint cannot be used to enumerate accounts.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        let user = match self.repo.get_by_email(&req.email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(invalid_credentials()),
            Err(e) => return Err(e),
        };

        if !password::verify(&req.password, &user.password) {
            return Err(invalid_credentials());
        }

        let token = self.tokens.sign(&user)?;
        Ok(TokenResponse { token })
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.repo.get_by_id(id).await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid credentials".into())
}
