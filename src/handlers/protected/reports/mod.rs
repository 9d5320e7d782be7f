pub mod export;
pub mod report;

pub use report::summary as report_summary;
pub use report::dashboard as report_dashboard;
pub use report::budget as report_budget;
pub use report::giving as report_giving;

pub use export::transactions as export_transactions;
pub use export::members as export_members;
