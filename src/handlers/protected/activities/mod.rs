pub mod activity;
pub mod attendance;

pub use activity::list as activities_list;
pub use activity::upcoming as activities_upcoming;
pub use activity::get as activity_get;
pub use activity::post as activity_create;
pub use activity::put as activity_update;
pub use activity::delete as activity_delete;

pub use attendance::list as attendance_list;
pub use attendance::record as attendance_record;
pub use attendance::summary as attendance_summary;
pub use attendance::remove as attendance_remove;
