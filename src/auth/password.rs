use crate::error::AppError;

/// Hashes `password` with a fresh random salt at the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// `Ok(false)` on mismatch; `Err` only when `digest` is not a bcrypt digest.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, digest)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// bcrypt at a fixed cost, run on the blocking pool so request workers stay free.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.cost;
        run_blocking(move || hash_password(&password, cost)).await
    }

    pub async fn verify(&self, password: String, digest: String) -> Result<bool, AppError> {
        run_blocking(move || verify_password(&password, &digest)).await
    }
}

async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalServerError(format!("blocking task failed: {}", e)))?
}
