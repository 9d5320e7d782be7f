pub mod activity;
pub mod finance;
pub mod leadership;
pub mod member;
pub mod user;

pub use activity::{Activity, AttendanceRecord};
pub use finance::{BankAccount, Budget, Category, PettyCashFund, Transaction};
pub use leadership::{Committee, CommitteeMember, Deacon, Society, SocietyLeader};
pub use member::{HomeGroup, Member};
pub use user::User;
