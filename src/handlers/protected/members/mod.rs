// Membership records: members and home fellowship locations.

pub mod home_groups;
pub mod member;

pub use member::list as members_list;
pub use member::stats as members_stats;
pub use member::get as member_get;
pub use member::post as member_create;
pub use member::put as member_update;
pub use member::delete as member_delete;
pub use member::committees as member_committees;
pub use member::attendance as member_attendance;

pub use home_groups::list as home_groups_list;
pub use home_groups::get as home_group_get;
pub use home_groups::post as home_group_create;
pub use home_groups::put as home_group_update;
pub use home_groups::delete as home_group_delete;
pub use home_groups::members as home_group_members;
