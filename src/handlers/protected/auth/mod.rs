pub mod session;

// Re-export handler functions for use in routing
pub use session::whoami as session_whoami;
pub use session::refresh_session as session_refresh;
pub use session::change_password as session_password;
