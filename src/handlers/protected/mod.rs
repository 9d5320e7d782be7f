// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required, then a role group per operation
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware on every route; validate_user_middleware on
// the session routes under /api/auth

pub mod activities;
pub mod auth;
pub mod finance;
pub mod leadership;
pub mod members;
pub mod reports;
pub mod users;

pub use activities::*;
pub use auth::*;
pub use finance::*;
pub use leadership::*;
pub use members::*;
pub use reports::*;
pub use users::*;
