use chrono::NaiveDate;

use crate::model::vacation::{VacationRequest, VacationStatus};

/// First approved request whose inclusive `[start_date, end_date]` contains
/// `date`. Overlapping approvals are not expected; any match suffices.
pub fn approved_vacation_on<'a>(
    requests: &'a [VacationRequest],
    user_id: u64,
    date: NaiveDate,
) -> Option<&'a VacationRequest> {
    requests.iter().find(|r| {
        r.user_id == user_id
            && r.status == VacationStatus::Approved
            && r.start_date <= date
            && date <= r.end_date
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vacation::VacationType;

    fn request(user_id: u64, start: (i32, u32, u32), end: (i32, u32, u32), status: VacationStatus) -> VacationRequest {
        VacationRequest {
            id: 1,
            user_id,
            group_id: 1,
            vacation_type: VacationType::Annual,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            reason: None,
            status,
            reviewed_at: None,
            review_comment: None,
        }
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let reqs = vec![request(7, (2025, 7, 9), (2025, 7, 11), VacationStatus::Approved)];
        for day in 9..=11 {
            let date = NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
            assert!(approved_vacation_on(&reqs, 7, date).is_some());
        }
        assert!(approved_vacation_on(&reqs, 7, NaiveDate::from_ymd_opt(2025, 7, 8).unwrap()).is_none());
        assert!(approved_vacation_on(&reqs, 7, NaiveDate::from_ymd_opt(2025, 7, 12).unwrap()).is_none());
    }

    #[test]
    fn pending_and_rejected_requests_do_not_count() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let reqs = vec![
            request(7, (2025, 7, 9), (2025, 7, 11), VacationStatus::Pending),
            request(7, (2025, 7, 9), (2025, 7, 11), VacationStatus::Rejected),
        ];
        assert!(approved_vacation_on(&reqs, 7, date).is_none());
    }

    #[test]
    fn other_users_requests_are_ignored() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let reqs = vec![request(8, (2025, 7, 9), (2025, 7, 11), VacationStatus::Approved)];
        assert!(approved_vacation_on(&reqs, 7, date).is_none());
    }
}
