//! Business operations behind the HTTP handlers. Services depend only on the
//! repository traits, never on a concrete store.

pub mod accounts;
pub mod tasks;

pub use accounts::AccountService;
pub use tasks::TaskService;
