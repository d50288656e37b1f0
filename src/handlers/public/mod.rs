// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and account creation.

pub mod auth;
