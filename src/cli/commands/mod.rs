pub mod export;
pub mod migrate;
pub mod report;
pub mod user;
