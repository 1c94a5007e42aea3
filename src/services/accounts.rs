use std::sync::Arc;
use validator::Validate;

use crate::auth::{PasswordHasher, TokenKeys};
use crate::error::{AppError, STORE_FAILURE_MESSAGE};
use crate::models::{Account, LoginRequest, NewAccount, RegisterRequest};
use crate::store::{AccountRepository, StoreError};

pub const EMAIL_TAKEN: &str = "Email address already in use";
pub const EMAIL_NOT_FOUND: &str = "Email address not found";
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials. Please try again";

/// Registration and login.
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenKeys>,
    hasher: PasswordHasher,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<TokenKeys>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher: PasswordHasher::new(bcrypt_cost),
        }
    }

    /// Validates, hashes and stores a new account. The returned account carries no digest.
    pub async fn register(&self, request: RegisterRequest) -> Result<Account, AppError> {
        request.validate()?;

        if self.accounts.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
        }

        let password_hash = self.hasher.hash(request.password).await?;

        let account = self
            .accounts
            .insert(NewAccount {
                email: request.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                StoreError::UniqueViolation(_) => AppError::BadRequest(EMAIL_TAKEN.into()),
                other => other.into(),
            })?;

        log::info!("registered account {}", account.id);
        Ok(account.without_password())
    }

    /// Checks the credentials and issues a bearer token for the account.
    pub async fn login(&self, request: LoginRequest) -> Result<(String, Account), AppError> {
        let account = match self.accounts.find_by_email(&request.email).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(AppError::Unauthorized(EMAIL_NOT_FOUND.into())),
            Err(e) => {
                log::error!("account lookup failed: {}", e);
                return Err(AppError::Unauthorized(STORE_FAILURE_MESSAGE.into()));
            }
        };

        let matches = self
            .hasher
            .verify(request.password, account.password.clone())
            .await?;
        if !matches {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let account = account.without_password();
        let token = self.tokens.issue(&account)?;
        Ok((token, account))
    }
}
