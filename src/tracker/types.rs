//! Core data types for following tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::twitter::{FollowingList, FollowingRecord};

/// A tracked account as persisted in the account store.
///
/// `following` is an ordered id sequence with set semantics: ids are
/// appended in fetch order and never removed, so it only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedAccount {
    pub id: String,
    pub name: String,
    pub username: String,
    pub following: Vec<String>,
    pub last_checked: DateTime<Utc>,
}

/// Result of comparing a freshly fetched following list against the
/// previously stored id set. "New" means present in the fresh fetch and
/// absent from the stored set; fetch order is preserved.
#[derive(Debug, Clone)]
pub struct FollowingDiff {
    pub ids: Vec<String>,
    pub all: Vec<FollowingRecord>,
    pub count: usize,
}

impl FollowingDiff {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Compute the diff of `fresh` against the stored `known_ids` set.
pub fn diff_following(fresh: &FollowingList, known_ids: &[String]) -> FollowingDiff {
    let all: Vec<FollowingRecord> = fresh
        .all
        .iter()
        .filter(|record| !known_ids.contains(&record.id))
        .cloned()
        .collect();
    let ids = all.iter().map(|record| record.id.clone()).collect();
    let count = all.len();
    FollowingDiff { ids, all, count }
}

/// Human-readable elapsed time between two instants: days when over 24
/// hours (floored), else whole hours when at least one, else minutes.
/// Context for event output only, never a correctness-critical value.
pub fn format_elapsed(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let duration = end - start;
    let minutes = duration.num_minutes();
    let hours = duration.num_hours();
    if hours > 24 {
        format!("{} days", hours / 24)
    } else if hours > 0 {
        format!("{} hours", hours)
    } else {
        format!("{} minutes", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: &str) -> FollowingRecord {
        FollowingRecord {
            id: id.to_string(),
            name: format!("Name {}", id),
            username: format!("user{}", id),
        }
    }

    fn list_of(ids: &[&str]) -> FollowingList {
        let all: Vec<FollowingRecord> = ids.iter().map(|id| record(id)).collect();
        FollowingList {
            ids: all.iter().map(|r| r.id.clone()).collect(),
            count: all.len(),
            all,
        }
    }

    #[test]
    fn diff_picks_only_unknown_ids_in_fetch_order() {
        let fresh = list_of(&["A", "B", "C", "D"]);
        let known = vec!["A".to_string(), "B".to_string()];

        let diff = diff_following(&fresh, &known);

        assert_eq!(diff.ids, vec!["C", "D"]);
        assert_eq!(diff.count, 2);
        assert_eq!(diff.all.len(), 2);
        assert_eq!(diff.all[0].id, "C");
        assert_eq!(diff.all[1].id, "D");
    }

    #[test]
    fn identical_fetch_yields_empty_diff() {
        let fresh = list_of(&["A", "B"]);
        let known = vec!["A".to_string(), "B".to_string()];

        let diff = diff_following(&fresh, &known);
        assert!(diff.is_empty());
        assert_eq!(diff.count, 0);
    }

    #[test]
    fn empty_known_set_makes_everything_new() {
        let fresh = list_of(&["A", "B"]);
        let diff = diff_following(&fresh, &[]);
        assert_eq!(diff.ids, vec!["A", "B"]);
    }

    #[test]
    fn elapsed_under_an_hour_reports_minutes() {
        let start = Utc::now();
        let end = start + Duration::minutes(42);
        assert_eq!(format_elapsed(start, end), "42 minutes");
    }

    #[test]
    fn elapsed_between_one_and_twentyfour_hours_reports_hours() {
        let start = Utc::now();
        let end = start + Duration::hours(5) + Duration::minutes(10);
        assert_eq!(format_elapsed(start, end), "5 hours");
    }

    #[test]
    fn elapsed_at_exactly_twentyfour_hours_still_reports_hours() {
        let start = Utc::now();
        let end = start + Duration::hours(24);
        assert_eq!(format_elapsed(start, end), "24 hours");
    }

    #[test]
    fn elapsed_over_a_day_reports_floored_days() {
        let start = Utc::now();
        let end = start + Duration::hours(50);
        assert_eq!(format_elapsed(start, end), "2 days");
    }

    #[test]
    fn zero_elapsed_reports_zero_minutes() {
        let now = Utc::now();
        assert_eq!(format_elapsed(now, now), "0 minutes");
    }
}
