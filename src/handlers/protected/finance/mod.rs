// Finance: categories, bank accounts, petty cash, transactions and budgets.

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod petty_cash;
pub mod transactions;

pub use categories::list as categories_list;
pub use categories::get as category_get;
pub use categories::post as category_create;
pub use categories::put as category_update;
pub use categories::delete as category_delete;

pub use accounts::list as accounts_list;
pub use accounts::get as account_get;
pub use accounts::post as account_create;
pub use accounts::put as account_update;
pub use accounts::delete as account_delete;

pub use petty_cash::list as petty_cash_list;
pub use petty_cash::get as petty_cash_get;
pub use petty_cash::post as petty_cash_create;
pub use petty_cash::put as petty_cash_update;
pub use petty_cash::delete as petty_cash_delete;
pub use petty_cash::replenish as petty_cash_replenish;

pub use transactions::list as transactions_list;
pub use transactions::get as transaction_get;
pub use transactions::post as transaction_create;
pub use transactions::put as transaction_update;
pub use transactions::delete as transaction_delete;

pub use budgets::list as budgets_list;
pub use budgets::get as budget_get;
pub use budgets::post as budget_create;
pub use budgets::put as budget_update;
pub use budgets::delete as budget_delete;
