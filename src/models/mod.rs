pub mod account;
pub mod task;

pub use account::{Account, LoginRequest, NewAccount, RegisterRequest};
pub use task::{NewTask, Task, TaskInput, TaskStatus};

use std::borrow::Cow;
use validator::ValidationError;

pub(crate) fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
