//! Reports against a live Postgres (skipped without DATABASE_URL).
mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::json;

use congrega_api::services::activities::{ActivityInput, ActivityService};
use congrega_api::services::reports::ReportService;

#[tokio::test]
async fn dashboard_omits_activities_already_under_way() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let activities = ActivityService::new(pool.clone());
    let now = Utc::now();

    let started: ActivityInput = serde_json::from_value(json!({
        "title": common::unique("Escuela dominical"),
        "activity_type": "bible_study",
        "starts_at": now - Duration::hours(1),
    }))?;
    let started = activities.create_one(&started).await?;
    let later: ActivityInput = serde_json::from_value(json!({
        "title": common::unique("Culto vespertino"),
        "activity_type": "worship",
        "starts_at": now + Duration::hours(1),
    }))?;
    let later = activities.create_one(&later).await?;

    let upcoming = activities.upcoming(now, 50).await?;
    assert!(upcoming.iter().all(|a| a.id != started.id));
    assert!(upcoming.iter().any(|a| a.id == later.id));

    let dashboard = ReportService::new(pool).dashboard(now).await?;
    assert_eq!(dashboard.date, now.date_naive());
    assert!(dashboard.upcoming_activities.iter().all(|a| a.starts_at >= now));
    assert!(dashboard.upcoming_activities.iter().all(|a| a.id != started.id));
    Ok(())
}

#[tokio::test]
async fn budget_execution_covers_requested_period() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let execution = ReportService::new(pool).budget_execution(1999, Some(3)).await?;
    assert_eq!((execution.year, execution.month), (1999, Some(3)));
    assert!(execution.lines.is_empty());
    Ok(())
}
