//! Financial and membership reports.
//!
//! Aggregation is done in memory over fetched rows so the same pure functions
//! back the HTTP handlers, the CLI and the unit tests.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};

use super::activities::ActivityService;
use super::budgets::BudgetService;
use super::members::MemberService;
use super::transactions::TransactionService;
use super::{Conditions, ServiceError, ServiceResult};
use crate::database::models::{Activity, Budget, Transaction};
use crate::types::EntryKind;

const DASHBOARD_UPCOMING: i64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub tithes: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub tithes: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category_id: i64,
    pub category_name: String,
    pub kind: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub year: i32,
    pub months: Vec<MonthBucket>,
    pub totals: Totals,
    pub categories: Vec<CategoryTotal>,
}

/// Buckets a year's transactions by month. Rows from other years are ignored.
pub fn summarize(year: i32, transactions: &[Transaction]) -> FinancialSummary {
    let mut months: Vec<MonthBucket> = (1..=12)
        .map(|month| MonthBucket { month, ..Default::default() })
        .collect();
    let mut categories: HashMap<i64, CategoryTotal> = HashMap::new();

    for t in transactions.iter().filter(|t| t.transaction_date.year() == year) {
        let bucket = &mut months[t.transaction_date.month0() as usize];
        if t.kind == EntryKind::Income.as_str() {
            bucket.income += t.amount;
            if t.is_tithe {
                bucket.tithes += t.amount;
            }
        } else {
            bucket.expense += t.amount;
        }

        categories
            .entry(t.category_id)
            .or_insert_with(|| CategoryTotal {
                category_id: t.category_id,
                category_name: t.category_name.clone(),
                kind: t.kind.clone(),
                total: Decimal::ZERO,
            })
            .total += t.amount;
    }

    let mut totals = Totals::default();
    for bucket in months.iter_mut() {
        bucket.balance = bucket.income - bucket.expense;
        totals.income += bucket.income;
        totals.expense += bucket.expense;
        totals.tithes += bucket.tithes;
    }
    totals.balance = totals.income - totals.expense;

    let mut categories: Vec<CategoryTotal> = categories.into_values().collect();
    categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category_name.cmp(&b.category_name)));

    FinancialSummary { year, months, totals, categories }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub budget_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub kind: String,
    pub budgeted: Decimal,
    pub actual: Decimal,
    pub variance: Decimal,
    /// `None` when nothing was budgeted
    pub percent_used: Option<Decimal>,
}

impl BudgetLine {
    pub fn new(budget: &Budget, actual: Decimal) -> Self {
        let percent_used = if budget.amount.is_zero() {
            None
        } else {
            Some((actual * Decimal::ONE_HUNDRED / budget.amount).round_dp(2))
        };
        Self {
            budget_id: budget.id,
            category_id: budget.category_id,
            category_name: budget.category_name.clone(),
            kind: budget.category_kind.clone(),
            budgeted: budget.amount,
            actual,
            variance: budget.amount - actual,
            percent_used,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetExecution {
    pub year: i32,
    pub month: Option<i32>,
    pub lines: Vec<BudgetLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub members_by_status: BTreeMap<String, i64>,
    pub month_income: Decimal,
    pub month_expense: Decimal,
    pub bank_balance: Decimal,
    pub petty_cash_balance: Decimal,
    pub upcoming_activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GivingStatement {
    pub member_id: i64,
    pub member_name: String,
    pub year: i32,
    pub total: Decimal,
    pub tithes: Decimal,
    pub transactions: Vec<Transaction>,
}

impl GivingStatement {
    fn build(member_id: i64, member_name: String, year: i32, transactions: Vec<Transaction>) -> Self {
        let total = transactions.iter().map(|t| t.amount).sum();
        let tithes = transactions.iter().filter(|t| t.is_tithe).map(|t| t.amount).sum();
        Self { member_id, member_name, year, total, tithes, transactions }
    }
}

/// First and last day of a year, or of one month in it.
pub fn period_bounds(year: i32, month: Option<i32>) -> ServiceResult<(NaiveDate, NaiveDate)> {
    let invalid = || ServiceError::field("month", "Month must be between 1 and 12");
    match month {
        None => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| ServiceError::field("year", "Invalid year"))?;
            let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| ServiceError::field("year", "Invalid year"))?;
            Ok((start, end))
        }
        Some(m) => {
            let m = u32::try_from(m).map_err(|_| invalid())?;
            let start = NaiveDate::from_ymd_opt(year, m, 1).ok_or_else(invalid)?;
            let (next_year, next_month) = if m == 12 { (year + 1, 1) } else { (year, m + 1) };
            let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
                .and_then(|d| d.pred_opt())
                .ok_or_else(invalid)?;
            Ok((start, end))
        }
    }
}

pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn financial_summary(&self, year: i32) -> ServiceResult<FinancialSummary> {
        let (start, end) = period_bounds(year, None)?;
        let transactions = TransactionService::new(self.pool.clone())
            .select_all(Conditions::new().range("transaction_date", Some(start), Some(end)))
            .await?;
        Ok(summarize(year, &transactions))
    }

    /// Headline figures as of `now`; only activities that have not started yet are listed.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> ServiceResult<Dashboard> {
        let today = now.date_naive();
        let (month_start, month_end) = period_bounds(today.year(), Some(today.month() as i32))?;
        let members = MemberService::new(self.pool.clone());
        let activities = ActivityService::new(self.pool.clone());

        let (members_by_status, (month_income, month_expense), bank_balance, petty_cash_balance, upcoming) =
            futures::try_join!(
                members.count_by_status(),
                self.income_expense(month_start, month_end),
                self.sum_active("bank_accounts"),
                self.sum_active("petty_cash_funds"),
                activities.upcoming(now, DASHBOARD_UPCOMING),
            )?;

        Ok(Dashboard {
            date: today,
            members_by_status,
            month_income,
            month_expense,
            bank_balance,
            petty_cash_balance,
            upcoming_activities: upcoming,
        })
    }

    pub async fn budget_execution(&self, year: i32, month: Option<i32>) -> ServiceResult<BudgetExecution> {
        let (start, end) = period_bounds(year, month)?;
        let budget_service = BudgetService::new(self.pool.clone());
        let (budgets, actuals) = futures::try_join!(
            budget_service.for_period(year, month),
            self.category_totals(start, end),
        )?;

        let lines = budgets
            .iter()
            .map(|b| BudgetLine::new(b, actuals.get(&b.category_id).copied().unwrap_or_default()))
            .collect();
        Ok(BudgetExecution { year, month, lines })
    }

    pub async fn giving_statement(&self, member_id: i64, year: i32) -> ServiceResult<GivingStatement> {
        let member = MemberService::new(self.pool.clone()).select_404(member_id).await?;
        let (start, end) = period_bounds(year, None)?;
        let conditions = Conditions::new()
            .eq("member_id", Some(member_id))
            .eq("kind", Some(EntryKind::Income.as_str()))
            .range("transaction_date", Some(start), Some(end));
        let transactions = TransactionService::new(self.pool.clone()).select_all(conditions).await?;
        Ok(GivingStatement::build(member_id, member.full_name, year, transactions))
    }

    async fn income_expense(&self, start: NaiveDate, end: NaiveDate) -> ServiceResult<(Decimal, Decimal)> {
        let sums: (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = 'income'), 0),
                COALESCE(SUM(amount) FILTER (WHERE kind = 'expense'), 0)
            FROM transactions
            WHERE transaction_date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(sums)
    }

    /// `table` is one of the two balance-carrying tables, never user input.
    async fn sum_active(&self, table: &'static str) -> ServiceResult<Decimal> {
        let sql = format!("SELECT COALESCE(SUM(balance), 0) FROM {} WHERE is_active", table);
        let total: Decimal = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn category_totals(&self, start: NaiveDate, end: NaiveDate) -> ServiceResult<HashMap<i64, Decimal>> {
        let rows: Vec<(i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT category_id, SUM(amount)
            FROM transactions
            WHERE transaction_date BETWEEN $1 AND $2
            GROUP BY category_id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn tx(id: i64, kind: &str, category: (i64, &str), tithe: bool, amount: Decimal, date: &str) -> Transaction {
        Transaction {
            id,
            kind: kind.to_string(),
            category_id: category.0,
            category_name: category.1.to_string(),
            is_tithe: tithe,
            member_id: None,
            member_name: None,
            bank_account_id: None,
            bank_account_name: None,
            petty_cash_id: None,
            petty_cash_name: None,
            amount,
            transaction_date: date.parse().unwrap(),
            payment_method: "cash".to_string(),
            reference: None,
            description: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_year_has_twelve_zero_buckets() {
        let summary = summarize(2024, &[]);
        assert_eq!(summary.months.len(), 12);
        assert_eq!(summary.months[0].month, 1);
        assert_eq!(summary.months[11].month, 12);
        assert!(summary.months.iter().all(|m| m.income.is_zero() && m.balance.is_zero()));
        assert_eq!(summary.totals, Totals::default());
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn transactions_land_in_their_month() {
        let rows = vec![
            tx(1, "income", (1, "Diezmos"), true, dec!(500.00), "2024-01-07"),
            tx(2, "income", (2, "Ofrendas"), false, dec!(120.50), "2024-01-14"),
            tx(3, "expense", (3, "Electricidad"), false, dec!(80.25), "2024-01-20"),
            tx(4, "expense", (3, "Electricidad"), false, dec!(90.00), "2024-03-20"),
            tx(5, "income", (1, "Diezmos"), true, dec!(999.00), "2023-12-31"),
        ];
        let summary = summarize(2024, &rows);

        let january = &summary.months[0];
        assert_eq!(january.income, dec!(620.50));
        assert_eq!(january.tithes, dec!(500.00));
        assert_eq!(january.expense, dec!(80.25));
        assert_eq!(january.balance, dec!(540.25));
        assert_eq!(summary.months[2].balance, dec!(-90.00));

        assert_eq!(summary.totals.income, dec!(620.50));
        assert_eq!(summary.totals.expense, dec!(170.25));
        assert_eq!(summary.totals.tithes, dec!(500.00));
        assert_eq!(summary.totals.balance, dec!(450.25));
    }

    #[test]
    fn categories_sorted_by_total_then_name() {
        let rows = vec![
            tx(1, "expense", (3, "Luz"), false, dec!(50), "2024-02-01"),
            tx(2, "income", (2, "Ofrendas"), false, dec!(50), "2024-02-01"),
            tx(3, "income", (1, "Diezmos"), true, dec!(300), "2024-02-01"),
        ];
        let names: Vec<String> = summarize(2024, &rows)
            .categories
            .into_iter()
            .map(|c| c.category_name)
            .collect();
        assert_eq!(names, vec!["Diezmos", "Luz", "Ofrendas"]);
    }

    fn budget(amount: Decimal) -> Budget {
        Budget {
            id: 9,
            category_id: 3,
            category_name: "Mantenimiento".to_string(),
            category_kind: "expense".to_string(),
            year: 2024,
            month: Some(5),
            amount,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn budget_line_variance_and_usage() {
        let line = BudgetLine::new(&budget(dec!(300.00)), dec!(100.00));
        assert_eq!(line.variance, dec!(200.00));
        assert_eq!(line.percent_used, Some(dec!(33.33)));

        let over = BudgetLine::new(&budget(dec!(200)), dec!(250));
        assert_eq!(over.variance, dec!(-50));
        assert_eq!(over.percent_used, Some(dec!(125)));
    }

    #[test]
    fn zero_budget_has_no_usage_percent() {
        let line = BudgetLine::new(&budget(Decimal::ZERO), dec!(10));
        assert_eq!(line.percent_used, None);
        assert_eq!(line.variance, dec!(-10));
    }

    #[test]
    fn period_bounds_cover_month_and_year() {
        let (start, end) = period_bounds(2024, Some(2)).unwrap();
        assert_eq!(start.to_string(), "2024-02-01");
        assert_eq!(end.to_string(), "2024-02-29");

        let (start, end) = period_bounds(2024, Some(12)).unwrap();
        assert_eq!((start.to_string(), end.to_string()), ("2024-12-01".into(), "2024-12-31".into()));

        let (start, end) = period_bounds(2023, None).unwrap();
        assert_eq!((start.to_string(), end.to_string()), ("2023-01-01".into(), "2023-12-31".into()));

        assert!(period_bounds(2024, Some(13)).is_err());
        assert!(period_bounds(2024, Some(0)).is_err());
    }

    #[test]
    fn giving_statement_totals() {
        let rows = vec![
            tx(1, "income", (1, "Diezmos"), true, dec!(200), "2024-01-07"),
            tx(2, "income", (2, "Ofrendas"), false, dec!(35.50), "2024-02-07"),
        ];
        let statement = GivingStatement::build(4, "Ana Rojas".to_string(), 2024, rows);
        assert_eq!(statement.total, dec!(235.50));
        assert_eq!(statement.tithes, dec!(200));
    }
}
