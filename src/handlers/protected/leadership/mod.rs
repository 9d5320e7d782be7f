// Leadership structure: committees, deacons and societies.

pub mod committees;
pub mod deacons;
pub mod societies;

pub use committees::list as committees_list;
pub use committees::get as committee_get;
pub use committees::post as committee_create;
pub use committees::put as committee_update;
pub use committees::delete as committee_delete;
pub use committees::roster as committee_roster;
pub use committees::add_member as committee_add_member;
pub use committees::update_member as committee_update_member;
pub use committees::remove_member as committee_remove_member;

pub use deacons::list as deacons_list;
pub use deacons::get as deacon_get;
pub use deacons::post as deacon_create;
pub use deacons::put as deacon_update;
pub use deacons::delete as deacon_delete;

pub use societies::list as societies_list;
pub use societies::get as society_get;
pub use societies::post as society_create;
pub use societies::put as society_update;
pub use societies::delete as society_delete;
pub use societies::add_leader as society_add_leader;
pub use societies::update_leader as society_update_leader;
pub use societies::remove_leader as society_remove_leader;
