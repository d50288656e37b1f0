// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token; some routes additionally admin-gated)

pub mod protected;
pub mod public;
pub mod utils;
