use serde::Deserialize;

/// Operating-day rules for slot generation. All values are minutes; the day
/// window is minutes since midnight.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleRules {
    pub day_start_minutes: u32,
    pub day_end_minutes: u32,
    pub step_minutes: u32,
    pub buffer_minutes: u32,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            day_start_minutes: 8 * 60,
            day_end_minutes: 17 * 60,
            step_minutes: 15,
            buffer_minutes: 10,
        }
    }
}

/// Candidate start times (minutes since midnight) for a ride of
/// `duration_minutes`, given already-blocked intervals on the same day.
/// Blocked intervals are expanded by the buffer on both sides.
pub fn available_starts(
    rules: &ScheduleRules,
    duration_minutes: u32,
    blocked: &[(u32, u32)],
) -> Vec<u32> {
    let mut available = Vec::new();
    if rules.step_minutes == 0 || duration_minutes == 0 {
        return available;
    }
    let latest_start = match rules.day_end_minutes.checked_sub(duration_minutes) {
        Some(v) if v >= rules.day_start_minutes => v,
        _ => return available,
    };

    let mut t = rules.day_start_minutes;
    while t <= latest_start {
        let candidate_end = t + duration_minutes;
        let conflict = blocked.iter().any(|&(start, end)| {
            let block_start = start.saturating_sub(rules.buffer_minutes);
            let block_end = (end + rules.buffer_minutes).min(24 * 60);
            t < block_end && candidate_end > block_start
        });
        if !conflict {
            available.push(t);
        }
        t += rules.step_minutes;
    }
    available
}

pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_day_offers_full_grid() {
        let rules = ScheduleRules::default();
        let starts = available_starts(&rules, 30, &[]);

        // 08:00 through 16:30 inclusive, every 15 minutes.
        assert_eq!(starts.first(), Some(&480));
        assert_eq!(starts.last(), Some(&990));
        assert_eq!(starts.len(), 35);
    }

    #[test]
    fn test_blocked_interval_removes_buffered_slots() {
        let rules = ScheduleRules::default();
        // Existing ride 10:00-10:30; with the 10-minute buffer, candidates
        // touching 09:50-10:40 are gone.
        let starts = available_starts(&rules, 30, &[(600, 630)]);

        assert!(!starts.contains(&600));
        assert!(!starts.contains(&585)); // 09:45 ride would run into the buffer
        assert!(!starts.contains(&630));
        assert!(starts.contains(&540)); // 09:00 ends 09:30, clear of 09:50
        assert!(starts.contains(&645)); // 10:45 starts after 10:40
    }

    #[test]
    fn test_duration_longer_than_day_yields_nothing() {
        let rules = ScheduleRules::default();
        assert!(available_starts(&rules, 10 * 60, &[]).is_empty());
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(480), "08:00");
        assert_eq!(format_minutes(995), "16:35");
    }
}
