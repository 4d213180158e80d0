pub mod current_user;
pub mod require_user;
pub mod token_sync;

pub use current_user::{current_user_middleware, CurrentUser};
pub use require_user::{require_user, AuthOutcome};
pub use token_sync::token_sync_middleware;
