use axum::{
    extract::{Path, Query},
    Extension,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::auth::roles::{check_permission, ROLES_REPORTS};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::reports::{BudgetExecution, Dashboard, FinancialSummary, GivingStatement, ReportService};
use crate::validation::{FieldErrors, Validate};

/// Report period; the year defaults to the current one.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl PeriodQuery {
    fn year_or_current(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

impl Validate for PeriodQuery {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.year("year", self.year_or_current());
        errors.month("month", self.month);
        errors.into_result()
    }
}

/// GET /api/reports/summary?year= - Monthly income, expense and tithes
pub async fn summary(Extension(auth): Extension<AuthUser>, Query(query): Query<PeriodQuery>) -> ApiResult<FinancialSummary> {
    check_permission(&auth, ROLES_REPORTS)?;
    query.validate()?;

    let pool = DatabaseManager::pool()?;
    let summary = ReportService::new(pool).financial_summary(query.year_or_current()).await?;
    Ok(ApiResponse::success(summary))
}

/// GET /api/reports/dashboard - Headline figures for today
pub async fn dashboard(Extension(auth): Extension<AuthUser>) -> ApiResult<Dashboard> {
    check_permission(&auth, ROLES_REPORTS)?;

    let pool = DatabaseManager::pool()?;
    let dashboard = ReportService::new(pool).dashboard(Utc::now()).await?;
    Ok(ApiResponse::success(dashboard))
}

/// GET /api/reports/budget?year=&month= - Budgeted against actual per category
///
/// Without `month` the annual budgets are compared with the whole year.
pub async fn budget(Extension(auth): Extension<AuthUser>, Query(query): Query<PeriodQuery>) -> ApiResult<BudgetExecution> {
    check_permission(&auth, ROLES_REPORTS)?;
    query.validate()?;

    let pool = DatabaseManager::pool()?;
    let execution = ReportService::new(pool)
        .budget_execution(query.year_or_current(), query.month)
        .await?;
    Ok(ApiResponse::success(execution))
}

/// GET /api/reports/giving/:member_id?year= - A member's contributions in a year
pub async fn giving(
    Extension(auth): Extension<AuthUser>,
    Path(member_id): Path<i64>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<GivingStatement> {
    check_permission(&auth, ROLES_REPORTS)?;
    query.validate()?;

    let pool = DatabaseManager::pool()?;
    let statement = ReportService::new(pool)
        .giving_statement(member_id, query.year_or_current())
        .await?;
    Ok(ApiResponse::success(statement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_is_checked() {
        let bad = PeriodQuery { year: Some(1990), month: Some(0) };
        let errors = bad.validate().unwrap_err();
        assert!(errors.get("year").is_some());
        assert!(errors.get("month").is_some());

        assert!(PeriodQuery::default().validate().is_ok());
    }
}
