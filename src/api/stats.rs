use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::engine::daily::{aggregate_day, GroupDayStats};
use crate::engine::day_key::{day_bounds_utc, week_range};
use crate::engine::range::{aggregate_range, RangeStats};
use crate::engine::{classify, vacation};
use crate::model::group::{Group, GroupWorkSettings};
use crate::model::scan_event::ScanEvent;
use crate::model::user::{GroupMember, User};
use crate::model::vacation::VacationRequest;

#[derive(Deserialize, IntoParams)]
pub struct DateQuery {
    /// Civil date (UTC+9) to aggregate, e.g. 2025-07-09
    #[param(value_type = String, format = "date")]
    pub date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct RangeQuery {
    /// First civil date of the range (inclusive)
    #[param(value_type = String, format = "date")]
    pub start: NaiveDate,
    /// Last civil date of the range (inclusive)
    #[param(value_type = String, format = "date")]
    pub end: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct UserDailyQuery {
    #[param(value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Group whose work-time settings apply; defaults apply when omitted.
    pub group_id: Option<u64>,
}

fn internal(context: &'static str) -> impl Fn(sqlx::Error) -> actix_web::Error {
    move |e| {
        tracing::error!(error = %e, context, "Stats query failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}

/// Stored settings for a group, falling back to the `{10, 18}` default.
async fn fetch_settings(pool: &MySqlPool, group_id: u64) -> Result<GroupWorkSettings, sqlx::Error> {
    let row = sqlx::query_as::<_, GroupWorkSettings>(
        r#"
        SELECT checkin_deadline_hour, checkout_start_hour
        FROM group_work_settings
        WHERE group_id = ?
        "#,
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.unwrap_or_default())
}

/// Students of the group; faculty owners do not enter the denominator.
async fn fetch_members(pool: &MySqlPool, group_id: u64) -> Result<Vec<GroupMember>, sqlx::Error> {
    sqlx::query_as::<_, GroupMember>(
        r#"
        SELECT u.id AS user_id, u.name
        FROM users u
        JOIN group_members gm ON gm.user_id = u.id
        WHERE gm.group_id = ? AND u.role = 'student'
        ORDER BY u.name
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
}

/// Group attribution for fetched rows: an explicit group id must match, and
/// rows logged without one count only for this group's own members. Keeps a
/// stray unattributed scan from leaking into a foreign group's aggregate.
fn scope_events(mut events: Vec<ScanEvent>, group_id: u64, members: &[GroupMember]) -> Vec<ScanEvent> {
    events.retain(|e| match e.group_id {
        Some(id) => id == group_id,
        None => members.iter().any(|m| m.user_id == e.user_id),
    });
    events
}

/// Events whose scan_time falls inside the civil-date range. Rows written
/// before the group link existed carry a NULL group_id; `scope_events`
/// settles their attribution after the fetch.
async fn fetch_events(
    pool: &MySqlPool,
    group_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ScanEvent>, sqlx::Error> {
    let (from, _) = day_bounds_utc(start);
    let (_, to) = day_bounds_utc(end);
    sqlx::query_as::<_, ScanEvent>(
        r#"
        SELECT id, user_id, group_id, scan_time, scan_type, location,
               latitude, longitude, absence_reason, is_edited, edited_by, edited_at
        FROM scan_events
        WHERE (group_id = ? OR group_id IS NULL)
          AND scan_time BETWEEN ? AND ?
        "#,
    )
    .bind(group_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

async fn fetch_group_vacations(
    pool: &MySqlPool,
    group_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<VacationRequest>, sqlx::Error> {
    sqlx::query_as::<_, VacationRequest>(
        r#"
        SELECT id, user_id, group_id, vacation_type, start_date, end_date,
               reason, status, reviewed_at, review_comment
        FROM vacation_requests
        WHERE group_id = ? AND status = 'approved'
          AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(group_id)
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await
}

async fn load_day(
    pool: &MySqlPool,
    group_id: u64,
    date: NaiveDate,
) -> Result<GroupDayStats, actix_web::Error> {
    let settings = fetch_settings(pool, group_id).await.map_err(internal("settings"))?;
    let members = fetch_members(pool, group_id).await.map_err(internal("members"))?;
    let events = fetch_events(pool, group_id, date, date).await.map_err(internal("events"))?;
    let events = scope_events(events, group_id, &members);
    let vacations = fetch_group_vacations(pool, group_id, date, date)
        .await
        .map_err(internal("vacations"))?;
    Ok(aggregate_day(&settings, date, &members, &events, &vacations))
}

async fn load_range(
    pool: &MySqlPool,
    group_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RangeStats, actix_web::Error> {
    let settings = fetch_settings(pool, group_id).await.map_err(internal("settings"))?;
    let members = fetch_members(pool, group_id).await.map_err(internal("members"))?;
    let events = fetch_events(pool, group_id, start, end).await.map_err(internal("events"))?;
    let events = scope_events(events, group_id, &members);
    let vacations = fetch_group_vacations(pool, group_id, start, end)
        .await
        .map_err(internal("vacations"))?;
    Ok(aggregate_range(&settings, &members, &events, &vacations, start, end))
}

/// Group dashboard: one day, counts plus per-member drill-down.
#[utoipa::path(
    get,
    path = "/api/v1/stats/group/{group_id}/daily",
    params(("group_id" = u64, Path, description = "Group id"), DateQuery),
    responses(
        (status = 200, description = "Group-day statistics", body = GroupDayStats),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn group_daily(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    let stats = load_day(pool.get_ref(), path.into_inner(), query.date).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Group dashboard: arbitrary inclusive date range.
#[utoipa::path(
    get,
    path = "/api/v1/stats/group/{group_id}/range",
    params(("group_id" = u64, Path, description = "Group id"), RangeQuery),
    responses(
        (status = 200, description = "Range statistics", body = RangeStats),
        (status = 400, description = "start after end"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn group_range(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    if query.start > query.end {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start cannot be after end"
        })));
    }
    let stats = load_range(pool.get_ref(), path.into_inner(), query.start, query.end).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Group dashboard: week `n` relative to the group's start date. Week 1 may
/// be short when the group starts mid-week.
#[utoipa::path(
    get,
    path = "/api/v1/stats/group/{group_id}/week/{week}",
    params(
        ("group_id" = u64, Path, description = "Group id"),
        ("week" = u32, Path, description = "1-based week number")
    ),
    responses(
        (status = 200, description = "Week statistics", body = RangeStats),
        (status = 400, description = "Week number out of range"),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn group_week(
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u32)>,
) -> actix_web::Result<impl Responder> {
    let (group_id, week) = path.into_inner();

    let group = sqlx::query_as::<_, Group>(
        "SELECT id, name, start_date, owner_id FROM `groups` WHERE id = ?",
    )
    .bind(group_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(internal("group"))?;

    let Some(group) = group else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Group not found"
        })));
    };

    let Some((start, end)) = week_range(group.start_date, week) else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Week number out of range"
        })));
    };
    let stats = load_range(pool.get_ref(), group_id, start, end).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Single user's derived status for one day.
#[utoipa::path(
    get,
    path = "/api/v1/stats/user/{user_id}/daily",
    params(("user_id" = u64, Path, description = "User id"), UserDailyQuery),
    responses(
        (status = 200, description = "User identity plus the derived daily record", body = Object),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn user_daily(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<UserDailyQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, name, role, department FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(internal("user"))?;

    let Some(user) = user else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    };

    let settings = match query.group_id {
        Some(group_id) => fetch_settings(pool.get_ref(), group_id)
            .await
            .map_err(internal("settings"))?,
        None => GroupWorkSettings::default(),
    };

    let (from, to) = day_bounds_utc(query.date);
    let events = sqlx::query_as::<_, ScanEvent>(
        r#"
        SELECT id, user_id, group_id, scan_time, scan_type, location,
               latitude, longitude, absence_reason, is_edited, edited_by, edited_at
        FROM scan_events
        WHERE user_id = ? AND scan_time BETWEEN ? AND ?
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal("user events"))?;

    let vacations = sqlx::query_as::<_, VacationRequest>(
        r#"
        SELECT id, user_id, group_id, vacation_type, start_date, end_date,
               reason, status, reviewed_at, review_comment
        FROM vacation_requests
        WHERE user_id = ? AND status = 'approved'
          AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(user_id)
    .bind(query.date)
    .bind(query.date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal("user vacations"))?;

    let overlap = vacation::approved_vacation_on(&vacations, user_id, query.date);
    let record = classify::classify(&settings, user_id, query.date, &events, overlap);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": {
            "id": user.id,
            "name": user.name,
            "role": user.role,
            "department": user.department,
        },
        "record": record,
    })))
}
