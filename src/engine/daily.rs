use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::classify::classify;
use crate::engine::vacation::approved_vacation_on;
use crate::model::group::GroupWorkSettings;
use crate::model::scan_event::ScanEvent;
use crate::model::status::{DailyRecord, DailyStatus};
use crate::model::user::GroupMember;
use crate::model::vacation::VacationRequest;

/// Per-status tallies for one group-day. Statuses are exclusive, so the sum
/// of the buckets always equals the member count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub present: u32,
    pub late: u32,
    pub checkout: u32,
    pub early_leave: u32,
    pub absent: u32,
    pub vacation: u32,
}

impl StatusCounts {
    pub fn bump(&mut self, status: DailyStatus) {
        match status {
            DailyStatus::Present => self.present += 1,
            DailyStatus::Late => self.late += 1,
            DailyStatus::Checkout => self.checkout += 1,
            DailyStatus::EarlyLeave => self.early_leave += 1,
            DailyStatus::Absent => self.absent += 1,
            DailyStatus::Vacation => self.vacation += 1,
        }
    }

    pub fn accumulate(&mut self, other: &StatusCounts) {
        self.present += other.present;
        self.late += other.late;
        self.checkout += other.checkout;
        self.early_leave += other.early_leave;
        self.absent += other.absent;
        self.vacation += other.vacation;
    }

    pub fn total(&self) -> u32 {
        self.present + self.late + self.checkout + self.early_leave + self.absent + self.vacation
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberDay {
    pub user_id: u64,
    pub name: String,
    #[serde(flatten)]
    pub record: DailyRecord,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupDayStats {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub total_members: u32,
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// `(present + late) / total_members * 100`, one decimal; 0 for an
    /// empty group.
    pub attendance_rate: f64,
    pub members: Vec<MemberDay>,
}

/// One decimal place, matching what the dashboards display.
pub fn round_rate(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let rate = f64::from(numerator) / f64::from(denominator) * 100.0;
    (rate * 10.0).round() / 10.0
}

/// Classifies every member of a group for one date and buckets the results.
/// `events` and `vacations` may cover more than the date; filtering happens
/// per member inside the classifier and the overlap resolver.
pub fn aggregate_day(
    settings: &GroupWorkSettings,
    date: NaiveDate,
    members: &[GroupMember],
    events: &[ScanEvent],
    vacations: &[VacationRequest],
) -> GroupDayStats {
    let mut counts = StatusCounts::default();
    let mut detail = Vec::with_capacity(members.len());

    for member in members {
        let vacation = approved_vacation_on(vacations, member.user_id, date);
        let record = classify(settings, member.user_id, date, events, vacation);
        counts.bump(record.status);
        detail.push(MemberDay {
            user_id: member.user_id,
            name: member.name.clone(),
            record,
        });
    }

    let total_members = members.len() as u32;
    GroupDayStats {
        date,
        total_members,
        counts,
        attendance_rate: round_rate(counts.present + counts.late, total_members),
        members: detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::tests::{event, settings};
    use crate::model::scan_event::ScanType;
    use crate::model::vacation::{VacationStatus, VacationType};

    fn members(n: u64) -> Vec<GroupMember> {
        (1..=n)
            .map(|user_id| GroupMember {
                user_id,
                name: format!("member-{user_id}"),
            })
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 9).unwrap()
    }

    fn vacation_covering(user_id: u64) -> VacationRequest {
        VacationRequest {
            id: user_id,
            user_id,
            group_id: 1,
            vacation_type: VacationType::Annual,
            start_date: date(),
            end_date: date(),
            reason: None,
            status: VacationStatus::Approved,
            reviewed_at: None,
            review_comment: None,
        }
    }

    #[test]
    fn ten_member_scenario_rates_seventy_percent() {
        // 6 on-time checkins, 1 late, 1 absent, 2 on vacation.
        let mut events: Vec<_> = (1..=6)
            .map(|u| event(u, (9, 0, 0), ScanType::Checkin))
            .collect();
        events.push(event(7, (10, 30, 0), ScanType::Checkin));
        let vacations = vec![vacation_covering(9), vacation_covering(10)];

        let stats = aggregate_day(&settings(), date(), &members(10), &events, &vacations);
        assert_eq!(stats.counts.present, 6);
        assert_eq!(stats.counts.late, 1);
        assert_eq!(stats.counts.absent, 1);
        assert_eq!(stats.counts.vacation, 2);
        assert_eq!(stats.attendance_rate, 70.0);
    }

    #[test]
    fn buckets_sum_to_member_count() {
        let events = vec![
            event(1, (9, 0, 0), ScanType::Checkin),
            event(2, (10, 30, 0), ScanType::Checkin),
            event(3, (9, 0, 0), ScanType::Checkin),
            event(3, (18, 30, 0), ScanType::Checkout),
            event(4, (9, 0, 0), ScanType::Checkin),
            event(4, (16, 0, 0), ScanType::Checkout),
        ];
        let vacations = vec![vacation_covering(5)];
        let stats = aggregate_day(&settings(), date(), &members(7), &events, &vacations);
        assert_eq!(stats.counts.total(), stats.total_members);
        assert_eq!(stats.members.len(), 7);
    }

    #[test]
    fn empty_group_rates_zero_not_nan() {
        let stats = aggregate_day(&settings(), date(), &[], &[], &[]);
        assert_eq!(stats.total_members, 0);
        assert_eq!(stats.attendance_rate, 0.0);
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        // 1 of 3 present: 33.333... -> 33.3
        let events = vec![event(1, (9, 0, 0), ScanType::Checkin)];
        let stats = aggregate_day(&settings(), date(), &members(3), &events, &[]);
        assert_eq!(stats.attendance_rate, 33.3);
    }
}
