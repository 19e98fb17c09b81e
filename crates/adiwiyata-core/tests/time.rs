use adiwiyata_core::time::{JUST_NOW, fixed_zone, format_clock, format_relative};
use jiff::Timestamp;

fn at(second: i64) -> Timestamp {
    Timestamp::from_second(second).unwrap()
}

const NOW: i64 = 1_760_000_000;

#[test]
fn under_a_minute_is_just_now() {
    assert_eq!(format_relative(at(NOW), at(NOW - 30)), JUST_NOW);
    assert_eq!(format_relative(at(NOW), at(NOW - 59)), JUST_NOW);
}

#[test]
fn exact_zero_is_just_now() {
    assert_eq!(format_relative(at(NOW), at(NOW)), "baru saja");
}

#[test]
fn minutes_bucket() {
    assert_eq!(format_relative(at(NOW), at(NOW - 5 * 60)), "5 menit lalu");
    assert_eq!(format_relative(at(NOW), at(NOW - 60)), "1 menit lalu");
    assert_eq!(format_relative(at(NOW), at(NOW - 3_599)), "59 menit lalu");
}

#[test]
fn hours_bucket() {
    assert_eq!(format_relative(at(NOW), at(NOW - 3 * 3_600)), "3 jam lalu");
    assert_eq!(format_relative(at(NOW), at(NOW - 86_399)), "23 jam lalu");
}

#[test]
fn days_bucket() {
    assert_eq!(format_relative(at(NOW), at(NOW - 2 * 86_400)), "2 hari lalu");
    assert_eq!(format_relative(at(NOW), at(NOW - 40 * 86_400)), "40 hari lalu");
}

#[test]
fn future_timestamps_read_as_just_now() {
    assert_eq!(format_relative(at(NOW), at(NOW + 600)), JUST_NOW);
}

#[test]
fn clock_uses_display_zone() {
    let wib = fixed_zone(7).unwrap();
    assert_eq!(format_clock(at(0), &wib), "07:00");

    let utc = fixed_zone(0).unwrap();
    assert_eq!(format_clock(at(13 * 3_600 + 5 * 60), &utc), "13:05");
}

#[test]
fn out_of_range_offset_is_rejected() {
    assert!(fixed_zone(40).is_err());
}
