//! Slot labels are the strings a doctor's schedule is configured with ("09:00").
//! Booked appointment times are compared against them as times of day, so
//! "09:00" and "09:00:00" name the same slot.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const LABEL_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

pub fn parse_slot(label: &str) -> Option<NaiveTime> {
    let label = label.trim();
    LABEL_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(label, format).ok())
}

pub fn format_slot(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Hour component of a label: the text before the first `:` read as an integer.
pub fn slot_hour(label: &str) -> Option<i32> {
    label.split(':').next()?.parse().ok()
}

/// Whether a configured label names the given time of day. Labels that do not
/// parse fall back to exact comparison with the `HH:MM` rendering.
pub fn slot_matches(label: &str, time: NaiveTime) -> bool {
    match parse_slot(label) {
        Some(slot) => slot == time,
        None => label == format_slot(time),
    }
}

/// Configured labels not consumed by any booked time, in configured order.
pub fn free_slots(configured: &[String], booked: &[NaiveTime]) -> Vec<String> {
    configured
        .iter()
        .filter(|label| !booked.iter().any(|time| slot_matches(label, *time)))
        .cloned()
        .collect()
}

/// First configured label naming `time`, if any.
pub fn find_slot(configured: &[String], time: NaiveTime) -> Option<&String> {
    configured.iter().find(|label| slot_matches(label, time))
}

/// `[date 00:00:00, date 23:59:59.999999999]`.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::default());
    let end = start + Duration::days(1) - Duration::nanoseconds(1);
    (start, end)
}
