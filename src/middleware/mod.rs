pub mod auth;
pub mod require_role;
pub mod response;

pub use auth::{authenticate, require_auth, AuthUser};
pub use require_role::{authorize, require_admin};
pub use response::{ApiResponse, ApiResult};
