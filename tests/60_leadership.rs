//! Roster and attendance rules against a live Postgres (skipped without DATABASE_URL).
mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;

use congrega_api::services::activities::{ActivityInput, ActivityService};
use congrega_api::services::attendance::{AttendanceInput, AttendanceService};
use congrega_api::services::committees::{CommitteeInput, CommitteeMemberInput, CommitteeService};
use congrega_api::services::deacons::{DeaconInput, DeaconService};
use congrega_api::services::members::{MemberInput, MemberService};
use congrega_api::services::societies::{LeaderInput, SocietyInput, SocietyService};
use congrega_api::types::CommitteePosition;

fn input<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

async fn member_id(pool: &PgPool) -> Result<i64> {
    let input: MemberInput = input(json!({ "first_name": "Timoteo", "last_name": common::unique("Efeso") }))?;
    Ok(MemberService::new(pool.clone()).create_one(&input).await?.id)
}

#[tokio::test]
async fn committee_has_one_chair() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let committees = CommitteeService::new(pool.clone());
    let committee = committees
        .create_one(&input::<CommitteeInput>(json!({ "name": common::unique("Comite de obras") }))?)
        .await?;
    let (first, second) = (member_id(&pool).await?, member_id(&pool).await?);

    committees
        .add_member(committee.id, &input::<CommitteeMemberInput>(json!({ "member_id": first, "position": "chair" }))?)
        .await?;
    committees
        .add_member(committee.id, &input::<CommitteeMemberInput>(json!({ "member_id": second }))?)
        .await?;

    let err = committees
        .update_member_position(committee.id, second, CommitteePosition::Chair)
        .await
        .unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);

    let err = committees
        .add_member(committee.id, &input::<CommitteeMemberInput>(json!({ "member_id": first }))?)
        .await
        .unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn society_positions_are_single_except_counselor() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let societies = SocietyService::new(pool.clone());
    let society = societies
        .create_one(&input::<SocietyInput>(json!({ "name": common::unique("Sociedad de jovenes"), "kind": "youth" }))?)
        .await?;
    let ids = [member_id(&pool).await?, member_id(&pool).await?, member_id(&pool).await?, member_id(&pool).await?];

    societies
        .add_leader(society.id, &input::<LeaderInput>(json!({ "member_id": ids[0], "position": "president" }))?)
        .await?;
    let err = societies
        .add_leader(society.id, &input::<LeaderInput>(json!({ "member_id": ids[1], "position": "president" }))?)
        .await
        .unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);

    for id in &ids[2..] {
        societies
            .add_leader(society.id, &input::<LeaderInput>(json!({ "member_id": id, "position": "counselor" }))?)
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn member_is_registered_as_deacon_once() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let deacons = DeaconService::new(pool.clone());
    let member = member_id(&pool).await?;

    deacons
        .create_one(&input::<DeaconInput>(json!({ "member_id": member, "ministry": "Benevolencia" }))?)
        .await?;
    let err = deacons
        .create_one(&input::<DeaconInput>(json!({ "member_id": member }))?)
        .await
        .unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn cancelled_activity_takes_no_attendance() -> Result<()> {
    let Some(pool) = common::database().await? else { return Ok(()) };
    let activities = ActivityService::new(pool.clone());
    let attendance = AttendanceService::new(pool.clone());
    let member = member_id(&pool).await?;

    let held = activities
        .create_one(&input::<ActivityInput>(json!({
            "title": common::unique("Culto de oracion"),
            "activity_type": "prayer",
            "starts_at": "2024-05-01T19:00:00Z",
        }))?)
        .await?;
    let entries: AttendanceInput = input(json!({ "entries": [ { "member_id": member } ], "visitor_count": 2 }))?;
    let recorded = attendance.record(held.id, &entries).await?;
    assert_eq!(recorded.len(), 1);

    let summary = attendance.summary(held.id).await?;
    assert_eq!((summary.present, summary.visitors), (1, 2));

    let cancelled = activities
        .create_one(&input::<ActivityInput>(json!({
            "title": common::unique("Vigilia"),
            "starts_at": "2024-05-02T22:00:00Z",
            "status": "cancelled",
        }))?)
        .await?;
    let err = attendance.record(cancelled.id, &entries).await.unwrap_err();
    assert_eq!(common::status_of(err), StatusCode::CONFLICT);
    Ok(())
}
