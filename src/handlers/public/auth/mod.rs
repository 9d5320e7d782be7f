// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition only. Every other auth operation needs a valid token and
// lives under handlers/protected/auth.

pub mod login; // POST /auth/login - authenticate and get JWT

pub use login::login_post;
