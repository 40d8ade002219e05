/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let (hours, minutes) = time_str.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

/// Parses a comma-separated list of departures into sorted, de-duplicated HH:MM labels.
/// Returns the first entry that is not a valid time on failure.
pub fn parse_slot_list(list: &str) -> Result<Vec<String>, String> {
    let mut minutes = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        minutes.push(parse_time_to_minutes(part).ok_or_else(|| part.to_string())?);
    }
    minutes.sort_unstable();
    minutes.dedup();
    Ok(minutes.into_iter().map(minutes_to_time_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_times() {
        assert_eq!(parse_time_to_minutes("08:30"), Some(510));
        assert_eq!(parse_time_to_minutes("24:00"), None);
        assert_eq!(parse_time_to_minutes("8"), None);
        assert_eq!(minutes_to_time_string(510), "08:30");
    }

    #[test]
    fn slot_list_is_sorted_and_deduplicated() {
        assert_eq!(
            parse_slot_list("14:00, 8:00,08:00,,10:30").unwrap(),
            vec!["08:00", "10:30", "14:00"]
        );
        assert_eq!(parse_slot_list("08:00,noon").unwrap_err(), "noon");
    }
}
