//! Korean (ko-KR) date formatting for session timestamps, e.g. `2025년 3월 1일 오후 03:05`.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};

/// Format `dt` the way ko-KR renders a short date with a 12-hour, two-digit time.
pub fn format_ko<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    let (pm, hour) = dt.hour12();
    format!(
        "{}년 {}월 {}일 {} {:02}:{:02}",
        dt.year(),
        dt.month(),
        dt.day(),
        if pm { "오후" } else { "오전" },
        hour,
        dt.minute()
    )
}

/// Format a stored UTC timestamp in the local time zone.
pub fn format_local(dt: &DateTime<Utc>) -> String {
    format_ko(&dt.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn morning() {
        let dt = kst().with_ymd_and_hms(2025, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(format_ko(&dt), "2025년 3월 1일 오전 09:05");
    }

    #[test]
    fn afternoon() {
        let dt = kst().with_ymd_and_hms(2025, 12, 24, 15, 30, 0).unwrap();
        assert_eq!(format_ko(&dt), "2025년 12월 24일 오후 03:30");
    }

    #[test]
    fn noon_and_midnight() {
        let noon = kst().with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
        let midnight = kst().with_ymd_and_hms(2025, 1, 2, 0, 10, 0).unwrap();
        assert_eq!(format_ko(&noon), "2025년 1월 2일 오후 12:00");
        assert_eq!(format_ko(&midnight), "2025년 1월 2일 오전 12:10");
    }

    #[test]
    fn utc_is_converted_by_offset() {
        let utc = Utc.with_ymd_and_hms(2025, 3, 1, 0, 30, 0).unwrap();
        assert_eq!(format_ko(&utc.with_timezone(&kst())), "2025년 3월 1일 오전 09:30");
    }
}
