// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: no /api prefix (/auth/login)

pub mod auth;

pub use auth::*;
