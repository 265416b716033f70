use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::engine::daily::{aggregate_day, round_rate, GroupDayStats, StatusCounts};
use crate::engine::day_key::weekday_column;
use crate::model::group::GroupWorkSettings;
use crate::model::scan_event::ScanEvent;
use crate::model::status::DailyStatus;
use crate::model::user::GroupMember;
use crate::model::vacation::VacationRequest;

/// One chart point in the day-by-day series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayPoint {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    /// "Mon".."Sun"; weekly charts keep the Mon..Fri columns.
    pub weekday: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRangeSummary {
    pub user_id: u64,
    pub name: String,
    /// Days whose status came from a real checkin
    /// (present/late/checkout/early_leave).
    pub present_days: u32,
    pub vacation_days: u32,
    /// Mon..Fri dates in the range.
    pub workdays: u32,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RangeStats {
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub total_members: u32,
    pub days: Vec<DayPoint>,
    #[serde(flatten)]
    pub totals: StatusCounts,
    pub users: Vec<UserRangeSummary>,
}

fn attended(status: DailyStatus) -> bool {
    matches!(
        status,
        DailyStatus::Present | DailyStatus::Late | DailyStatus::Checkout | DailyStatus::EarlyLeave
    )
}

/// Runs the daily aggregation for every date in `[start_date, end_date]`
/// (inclusive) and folds the results into a series, range totals, and
/// per-user summaries. A date with no data contributes all-absent buckets;
/// the range itself never fails.
pub fn aggregate_range(
    settings: &GroupWorkSettings,
    members: &[GroupMember],
    events: &[ScanEvent],
    vacations: &[VacationRequest],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> RangeStats {
    let mut days = Vec::new();
    let mut totals = StatusCounts::default();
    let mut present_days: HashMap<u64, u32> = HashMap::new();
    let mut vacation_days: HashMap<u64, u32> = HashMap::new();
    let mut workdays = 0u32;

    let mut date = start_date;
    while date <= end_date {
        if weekday_column(date).is_some() {
            workdays += 1;
        }

        let day = aggregate_day(settings, date, members, events, vacations);
        totals.accumulate(&day.counts);
        for member in &day.members {
            if attended(member.record.status) {
                *present_days.entry(member.user_id).or_default() += 1;
            }
            if member.record.status == DailyStatus::Vacation {
                *vacation_days.entry(member.user_id).or_default() += 1;
            }
        }
        days.push(day_point(&day));

        date += Duration::days(1);
    }

    let users = members
        .iter()
        .map(|m| {
            let present = present_days.get(&m.user_id).copied().unwrap_or(0);
            UserRangeSummary {
                user_id: m.user_id,
                name: m.name.clone(),
                present_days: present,
                vacation_days: vacation_days.get(&m.user_id).copied().unwrap_or(0),
                workdays,
                // Weekend checkins can push present_days past workdays; the
                // rate stays capped at a full score.
                attendance_rate: round_rate(present, workdays).min(100.0),
            }
        })
        .collect();

    RangeStats {
        start_date,
        end_date,
        total_members: members.len() as u32,
        days,
        totals,
        users,
    }
}

fn day_point(day: &GroupDayStats) -> DayPoint {
    DayPoint {
        date: day.date,
        weekday: day.date.weekday().to_string(),
        counts: day.counts,
        attendance_rate: day.attendance_rate,
    }
}
