pub mod collection;
pub mod record;

pub use collection::get as users_list;
pub use collection::post as users_create;

pub use record::get as user_get;
pub use record::put as user_update;
pub use record::reset_password as user_reset_password;
