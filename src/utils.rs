// Time parsing/formatting helpers shared across ingestion, search and the CLI.
//
// GTFS clock strings may carry hours >= 24 (a trip that starts the previous
// service day and crosses midnight), so these are plain arithmetic, not
// `chrono::NaiveTime`.

use crate::error::PlannerError;
use crate::timetable::Timestamp;

pub fn parse_time_impl(h: &str, m: &str, s: &str) -> Result<Timestamp, std::num::ParseIntError> {
    let hours: Timestamp = h.parse()?;
    let minutes: Timestamp = m.parse()?;
    let seconds: Timestamp = s.parse()?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

pub fn parse_time(s: &str) -> Result<Timestamp, PlannerError> {
    let bad = || PlannerError::InvalidInput(format!("invalid time string: {s}"));
    if s.len() < 7 {
        return Err(bad());
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(bad());
    }
    let (hour, min, sec) = (parts[0], parts[1], parts[2]);
    if min.len() != 2 || sec.len() != 2 {
        return Err(bad());
    }
    parse_time_impl(hour, min, sec).map_err(|_| bad())
}

pub fn get_time_str(time: Timestamp) -> String {
    let hours = time / 3600;
    let minutes = (time % 3600) / 60;
    let seconds = time % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn is_zero(flags: &[bool]) -> bool {
    flags.iter().all(|&f| !f)
}
