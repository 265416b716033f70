use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;

/// The fixed civil offset (UTC+9) every day-boundary comparison uses. Scan
/// timestamps are stored as UTC instants; bucketing always normalizes into
/// this offset first, never into the caller's local zone.
pub static CIVIL_OFFSET: Lazy<FixedOffset> = Lazy::new(|| FixedOffset::east_opt(9 * 3600).unwrap());

/// Calendar day an instant falls on, in the fixed offset.
pub fn day_key(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&*CIVIL_OFFSET).date_naive()
}

/// Hour-of-day of an instant in the fixed offset, for deadline comparisons.
pub fn local_hour(instant: DateTime<Utc>) -> u32 {
    use chrono::Timelike;
    instant.with_timezone(&*CIVIL_OFFSET).hour()
}

/// UTC instants bounding `date` in the fixed offset: 00:00:00.000 through
/// 23:59:59.999. Used to window SQL scans over the event log.
pub fn day_bounds_utc(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = CIVIL_OFFSET
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    let end = CIVIL_OFFSET
        .from_local_datetime(&date.and_hms_milli_opt(23, 59, 59, 999).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    (start, end)
}

/// Mon..Fri column index (0..=4) for weekly charts; weekends have no column.
pub fn weekday_column(date: NaiveDate) -> Option<usize> {
    let wd = date.weekday().num_days_from_monday();
    (wd <= 4).then_some(wd as usize)
}

fn first_week_end(start_date: NaiveDate) -> NaiveDate {
    let wd = start_date.weekday().num_days_from_monday();
    // Friday of the starting week, or the following Friday for a
    // weekend start.
    let to_friday = if wd <= 4 { 4 - wd } else { 11 - wd };
    start_date + Duration::days(i64::from(to_friday))
}

/// Week number of `date` relative to a group's start. Week 1 runs from the
/// start date through the following Friday (possibly short); later weeks run
/// Monday through Friday. Dates before the start clamp to week 1.
pub fn week_number(start_date: NaiveDate, date: NaiveDate) -> u32 {
    let end1 = first_week_end(start_date);
    if date <= end1 {
        return 1;
    }
    let first_monday = end1 + Duration::days(3);
    ((date - first_monday).num_days() / 7) as u32 + 2
}

/// Inclusive date range covered by week `week` of a group. `None` when the
/// week lies beyond the representable calendar, so a wild path parameter
/// cannot panic the date arithmetic.
pub fn week_range(start_date: NaiveDate, week: u32) -> Option<(NaiveDate, NaiveDate)> {
    let end1 = first_week_end(start_date);
    if week <= 1 {
        return Some((start_date, end1));
    }
    let monday = end1.checked_add_signed(Duration::days(3 + 7 * (i64::from(week) - 2)))?;
    let friday = monday.checked_add_signed(Duration::days(4))?;
    Some((monday, friday))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn instants_an_hour_apart_can_land_on_different_days() {
        // 23:30 and 00:30 in UTC+9, 60 minutes apart as raw UTC.
        let before_midnight = utc(2025, 7, 9, 14, 30, 0);
        let after_midnight = utc(2025, 7, 9, 15, 30, 0);
        assert_eq!(day_key(before_midnight), NaiveDate::from_ymd_opt(2025, 7, 9).unwrap());
        assert_eq!(day_key(after_midnight), NaiveDate::from_ymd_opt(2025, 7, 10).unwrap());
    }

    #[test]
    fn day_bounds_cover_the_civil_day() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
        let (start, end) = day_bounds_utc(date);
        assert_eq!(start, utc(2025, 7, 8, 15, 0, 0));
        assert_eq!(day_key(start), date);
        assert_eq!(day_key(end), date);
        assert_eq!(day_key(end + Duration::milliseconds(1)), date.succ_opt().unwrap());
    }

    #[test]
    fn weekday_columns_skip_weekends() {
        assert_eq!(weekday_column(NaiveDate::from_ymd_opt(2025, 7, 7).unwrap()), Some(0)); // Mon
        assert_eq!(weekday_column(NaiveDate::from_ymd_opt(2025, 7, 11).unwrap()), Some(4)); // Fri
        assert_eq!(weekday_column(NaiveDate::from_ymd_opt(2025, 7, 12).unwrap()), None); // Sat
    }

    #[test]
    fn week_one_is_short_for_a_midweek_start() {
        // Wednesday start: week 1 is Wed..Fri, week 2 starts the next Monday.
        let start = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
        assert_eq!(
            week_range(start, 1),
            Some((start, NaiveDate::from_ymd_opt(2025, 7, 11).unwrap()))
        );
        assert_eq!(
            week_range(start, 2),
            Some((
                NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 18).unwrap()
            ))
        );
        assert_eq!(week_number(start, start), 1);
        assert_eq!(week_number(start, NaiveDate::from_ymd_opt(2025, 7, 11).unwrap()), 1);
        assert_eq!(week_number(start, NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()), 2);
        assert_eq!(week_number(start, NaiveDate::from_ymd_opt(2025, 7, 23).unwrap()), 3);
    }

    #[test]
    fn weekend_start_pushes_week_one_to_the_next_friday() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap(); // Saturday
        assert_eq!(
            week_range(start, 1),
            Some((start, NaiveDate::from_ymd_opt(2025, 7, 18).unwrap()))
        );
        assert_eq!(week_number(start, NaiveDate::from_ymd_opt(2025, 7, 21).unwrap()), 2);
    }

    #[test]
    fn absurd_week_numbers_are_rejected_not_panicked() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
        assert!(week_range(start, u32::MAX).is_none());
        assert!(week_range(start, 52).is_some());
    }
}
