use chrono::NaiveDate;

/// Share of available points won, as a percentage (football scoring: 3 per
/// win, 1 per draw).
pub fn points_percentage(points: i32, played: i32) -> f64 {
    if played <= 0 {
        return 0.0;
    }
    (points as f64) / ((played * 3) as f64) * 100.0
}

/// Validate team name format
pub fn validate_team_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().count() <= 100
}

/// An open-ended range is always valid.
pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a signed goal difference the way tables print it ("+2", "0", "-3").
pub fn format_goal_difference(gd: i32) -> String {
    if gd > 0 {
        format!("+{}", gd)
    } else {
        gd.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_percentage() {
        assert!((points_percentage(7, 3) - 77.777).abs() < 0.01);
        assert_eq!(points_percentage(0, 0), 0.0);
        assert_eq!(points_percentage(9, 3), 100.0);
    }

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Furacão"));
        assert!(!validate_team_name("   "));
        assert!(!validate_team_name(&"x".repeat(101)));
    }

    #[test]
    fn test_validate_date_range() {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day);
        assert!(validate_date_range(d(3, 1), d(6, 30)));
        assert!(validate_date_range(d(3, 1), d(3, 1)));
        assert!(!validate_date_range(d(6, 30), d(3, 1)));
        assert!(validate_date_range(None, d(3, 1)));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Furacão", "FURA"));
        assert!(contains_ignore_case("Estádio Municipal", "municipal"));
        assert!(!contains_ignore_case("Federal", "fura"));
    }

    #[test]
    fn test_format_goal_difference() {
        assert_eq!(format_goal_difference(2), "+2");
        assert_eq!(format_goal_difference(0), "0");
        assert_eq!(format_goal_difference(-3), "-3");
    }
}
