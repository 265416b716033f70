use chrono::NaiveDate;

use crate::engine::day_key::{day_key, local_hour};
use crate::model::group::GroupWorkSettings;
use crate::model::scan_event::{ScanEvent, ScanType};
use crate::model::status::{DailyRecord, DailyStatus, DataAnomaly};
use crate::model::vacation::VacationRequest;

/// Derives the single status for one user-day.
///
/// Pure: everything comes in through the parameters, so the same inputs
/// always produce the same record. `events` may be a wider slice (other
/// users, other days); only rows for `user_id` landing on `date` in the
/// fixed offset are considered. Approved vacation wins over any scan.
///
/// Multiple checkins keep the earliest; multiple checkouts keep the latest.
/// A checkout with no checkin on the same date is an inconsistent record and
/// is reported as an anomaly rather than guessed around.
pub fn classify(
    settings: &GroupWorkSettings,
    user_id: u64,
    date: NaiveDate,
    events: &[ScanEvent],
    vacation: Option<&VacationRequest>,
) -> DailyRecord {
    if vacation.is_some() {
        return DailyRecord {
            user_id,
            date,
            status: DailyStatus::Vacation,
            checkin_time: None,
            checkout_time: None,
            absence_reason: None,
            anomaly: None,
        };
    }

    let todays = || {
        events
            .iter()
            .filter(move |e| e.user_id == user_id && day_key(e.scan_time) == date)
    };

    let checkin = todays()
        .filter(|e| e.scan_type == ScanType::Checkin)
        .min_by_key(|e| e.scan_time);
    let checkout = todays()
        .filter(|e| e.scan_type == ScanType::Checkout)
        .max_by_key(|e| e.scan_time);
    let absence_reason = todays().find_map(|e| e.absence_reason.clone());

    let Some(checkin) = checkin else {
        // No checkin at all: absent. A stray checkout is surfaced, not
        // silently promoted to a full day.
        return DailyRecord {
            user_id,
            date,
            status: DailyStatus::Absent,
            checkin_time: None,
            checkout_time: checkout.map(|e| e.scan_time),
            absence_reason,
            anomaly: checkout.map(|_| DataAnomaly::CheckoutWithoutCheckin),
        };
    };

    let late = local_hour(checkin.scan_time) >= settings.checkin_deadline_hour;
    let status = match checkout {
        Some(out) if local_hour(out.scan_time) < settings.checkout_start_hour => {
            DailyStatus::EarlyLeave
        }
        Some(_) => DailyStatus::Checkout,
        None if late => DailyStatus::Late,
        None => DailyStatus::Present,
    };

    DailyRecord {
        user_id,
        date,
        status,
        checkin_time: Some(checkin.scan_time),
        checkout_time: checkout.map(|e| e.scan_time),
        absence_reason: None,
        anomaly: None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    use crate::model::vacation::{VacationStatus, VacationType};

    pub(crate) fn settings() -> GroupWorkSettings {
        GroupWorkSettings {
            checkin_deadline_hour: 10,
            checkout_start_hour: 18,
        }
    }

    /// Event at a UTC+9 wall-clock time on 2025-07-09.
    pub(crate) fn event(user_id: u64, hms: (u32, u32, u32), scan_type: ScanType) -> ScanEvent {
        event_on(user_id, (2025, 7, 9), hms, scan_type)
    }

    pub(crate) fn event_on(
        user_id: u64,
        ymd: (i32, u32, u32),
        hms: (u32, u32, u32),
        scan_type: ScanType,
    ) -> ScanEvent {
        let stamp = format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}+09:00",
            ymd.0, ymd.1, ymd.2, hms.0, hms.1, hms.2
        );
        ScanEvent {
            id: 0,
            user_id,
            group_id: Some(1),
            scan_time: DateTime::parse_from_rfc3339(&stamp).unwrap().with_timezone(&Utc),
            scan_type,
            location: "lab-3f".into(),
            latitude: Some(37.5665),
            longitude: Some(126.978),
            absence_reason: None,
            is_edited: false,
            edited_by: None,
            edited_at: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 9).unwrap()
    }

    fn approved_vacation(user_id: u64) -> VacationRequest {
        VacationRequest {
            id: 1,
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
    fn vacation_wins_over_any_scans() {
        let events = vec![
            event(7, (9, 0, 0), ScanType::Checkin),
            event(7, (18, 30, 0), ScanType::Checkout),
        ];
        let vacation = approved_vacation(7);
        let rec = classify(&settings(), 7, date(), &events, Some(&vacation));
        assert_eq!(rec.status, DailyStatus::Vacation);
        assert!(rec.checkin_time.is_none());
        assert!(rec.checkout_time.is_none());
    }

    #[test]
    fn late_boundary_is_the_exact_deadline_hour() {
        let on_the_hour = vec![event(7, (10, 0, 0), ScanType::Checkin)];
        let rec = classify(&settings(), 7, date(), &on_the_hour, None);
        assert_eq!(rec.status, DailyStatus::Late);

        let second_before = vec![event(7, (9, 59, 59), ScanType::Checkin)];
        let rec = classify(&settings(), 7, date(), &second_before, None);
        assert_eq!(rec.status, DailyStatus::Present);
    }

    #[test]
    fn early_leave_boundary_is_the_checkout_start_hour() {
        let at_start = vec![
            event(7, (9, 0, 0), ScanType::Checkin),
            event(7, (18, 0, 0), ScanType::Checkout),
        ];
        let rec = classify(&settings(), 7, date(), &at_start, None);
        assert_eq!(rec.status, DailyStatus::Checkout);

        let second_before = vec![
            event(7, (9, 0, 0), ScanType::Checkin),
            event(7, (17, 59, 59), ScanType::Checkout),
        ];
        let rec = classify(&settings(), 7, date(), &second_before, None);
        assert_eq!(rec.status, DailyStatus::EarlyLeave);
    }

    #[test]
    fn no_events_means_absent() {
        let rec = classify(&settings(), 7, date(), &[], None);
        assert_eq!(rec.status, DailyStatus::Absent);
        assert!(rec.anomaly.is_none());
    }

    #[test]
    fn checkout_without_checkin_is_flagged_not_guessed() {
        let events = vec![event(7, (18, 10, 0), ScanType::Checkout)];
        let rec = classify(&settings(), 7, date(), &events, None);
        assert_eq!(rec.status, DailyStatus::Absent);
        assert_eq!(rec.anomaly, Some(DataAnomaly::CheckoutWithoutCheckin));
        assert!(rec.checkout_time.is_some());
    }

    #[test]
    fn full_day_walkthrough() {
        // 09:05 in, 17:40 out: left early.
        let events = vec![
            event(7, (9, 5, 0), ScanType::Checkin),
            event(7, (17, 40, 0), ScanType::Checkout),
        ];
        assert_eq!(classify(&settings(), 7, date(), &events, None).status, DailyStatus::EarlyLeave);

        // Same checkin, 18:05 out: day closed out.
        let events = vec![
            event(7, (9, 5, 0), ScanType::Checkin),
            event(7, (18, 5, 0), ScanType::Checkout),
        ];
        assert_eq!(classify(&settings(), 7, date(), &events, None).status, DailyStatus::Checkout);

        // 10:05 in, no checkout: late.
        let events = vec![event(7, (10, 5, 0), ScanType::Checkin)];
        assert_eq!(classify(&settings(), 7, date(), &events, None).status, DailyStatus::Late);
    }

    #[test]
    fn earliest_checkin_and_latest_checkout_are_authoritative() {
        let events = vec![
            event(7, (11, 0, 0), ScanType::Checkin),
            event(7, (9, 30, 0), ScanType::Checkin),
            event(7, (12, 0, 0), ScanType::Checkout),
            event(7, (18, 40, 0), ScanType::Checkout),
        ];
        let rec = classify(&settings(), 7, date(), &events, None);
        assert_eq!(rec.status, DailyStatus::Checkout);
        assert_eq!(rec.checkin_time, Some(event(7, (9, 30, 0), ScanType::Checkin).scan_time));
        assert_eq!(rec.checkout_time, Some(event(7, (18, 40, 0), ScanType::Checkout).scan_time));
    }

    #[test]
    fn other_days_and_other_users_are_filtered_out() {
        let events = vec![
            event_on(7, (2025, 7, 8), (9, 0, 0), ScanType::Checkin),
            event(8, (9, 0, 0), ScanType::Checkin),
        ];
        let rec = classify(&settings(), 7, date(), &events, None);
        assert_eq!(rec.status, DailyStatus::Absent);
    }

    #[test]
    fn inverted_config_does_not_panic() {
        // Settings editor rejects this; the classifier still has to cope.
        let inverted = GroupWorkSettings {
            checkin_deadline_hour: 18,
            checkout_start_hour: 10,
        };
        let events = vec![
            event(7, (9, 0, 0), ScanType::Checkin),
            event(7, (17, 0, 0), ScanType::Checkout),
        ];
        let rec = classify(&inverted, 7, date(), &events, None);
        assert_eq!(rec.status, DailyStatus::Checkout);
    }

    #[test]
    fn midnight_straddle_buckets_by_civil_day() {
        // 23:30 UTC+9 on the 9th vs 00:30 UTC+9 on the 10th.
        let events = vec![event(7, (23, 30, 0), ScanType::Checkin)];
        assert_eq!(classify(&settings(), 7, date(), &events, None).status, DailyStatus::Late);

        let events = vec![event_on(7, (2025, 7, 10), (0, 30, 0), ScanType::Checkin)];
        assert_eq!(classify(&settings(), 7, date(), &events, None).status, DailyStatus::Absent);
    }
}
