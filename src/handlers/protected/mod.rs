// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here runs behind `require_auth`; project delete and role
// assignment additionally run behind `require_admin`.

pub mod comments;
pub mod issues;
pub mod projects;
pub mod users;
