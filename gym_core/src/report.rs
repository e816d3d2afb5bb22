//! Leaderboard and membership statistics.

use crate::MemberSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Reported when there are no members to pick from
pub const NO_MEMBER: &str = "N/A";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub workout_count: usize,
}

/// Counter keyed by name; absent keys read as zero and reads never insert
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, usize>);

impl Tally {
    pub fn increment(&mut self, key: &str) {
        *self.0.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Membership-wide statistics
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionReport {
    pub goal_distribution: Tally,
    pub level_distribution: Tally,
    pub most_active_username: String,
    pub total_members: usize,
    pub total_workouts: usize,
    pub total_calories: u64,
}

/// Members ranked by workout count, highest first; ties keep input order
pub fn leaderboard(members: &[MemberSummary]) -> Vec<LeaderboardEntry> {
    let mut board: Vec<LeaderboardEntry> = members
        .iter()
        .map(|m| LeaderboardEntry {
            username: m.username.clone(),
            workout_count: m.workout_count,
        })
        .collect();

    board.sort_by_key(|entry| Reverse(entry.workout_count));
    board
}

/// Goal/level counts, totals and the most active member in a single pass
///
/// The most active member is the first one seen with the highest workout
/// count. An empty collection yields zeros and [`NO_MEMBER`].
pub fn distribution(members: &[MemberSummary]) -> DistributionReport {
    let mut goal_distribution = Tally::default();
    let mut level_distribution = Tally::default();
    let mut total_workouts = 0;
    let mut total_calories = 0;
    let mut most_active: Option<&MemberSummary> = None;

    for member in members {
        goal_distribution.increment(&member.goal);
        level_distribution.increment(member.level.as_str());
        total_workouts += member.workout_count;
        total_calories += member.total_calories;

        if most_active.map_or(true, |best| member.workout_count > best.workout_count) {
            most_active = Some(member);
        }
    }

    let report = DistributionReport {
        goal_distribution,
        level_distribution,
        most_active_username: most_active
            .map(|m| m.username.clone())
            .unwrap_or_else(|| NO_MEMBER.to_string()),
        total_members: members.len(),
        total_workouts,
        total_calories,
    };

    tracing::debug!(
        "Distribution over {} members, {} workouts",
        report.total_members,
        report.total_workouts
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DifficultyLevel;

    fn member(name: &str, workouts: usize, goal: &str, level: DifficultyLevel) -> MemberSummary {
        MemberSummary {
            username: name.into(),
            workout_count: workouts,
            total_calories: workouts as u64 * 500,
            goal: goal.into(),
            level,
        }
    }

    #[test]
    fn test_leaderboard_is_stable_on_ties() {
        let members = vec![
            member("ana", 3, "strength", DifficultyLevel::Advanced),
            member("ben", 1, "endurance", DifficultyLevel::Beginner),
            member("cho", 3, "strength", DifficultyLevel::Intermediate),
            member("dev", 0, "weight_loss", DifficultyLevel::Beginner),
        ];

        let board = leaderboard(&members);
        let order: Vec<_> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(order, vec!["ana", "cho", "ben", "dev"]);
        assert_eq!(board[0].workout_count, 3);
    }

    #[test]
    fn test_leaderboard_empty() {
        assert!(leaderboard(&[]).is_empty());
    }

    #[test]
    fn test_distribution_counts() {
        let members = vec![
            member("ana", 2, "strength", DifficultyLevel::Advanced),
            member("ben", 5, "endurance", DifficultyLevel::Beginner),
            member("cho", 5, "strength", DifficultyLevel::Beginner),
        ];

        let report = distribution(&members);
        assert_eq!(report.total_members, 3);
        assert_eq!(report.total_workouts, 12);
        assert_eq!(report.total_calories, 6000);
        assert_eq!(report.goal_distribution.get("strength"), 2);
        assert_eq!(report.goal_distribution.get("endurance"), 1);
        assert_eq!(report.level_distribution.get("beginner"), 2);
        assert_eq!(report.level_distribution.get("intermediate"), 0);
        assert_eq!(report.level_distribution.len(), 2);
        // first member with the top count wins
        assert_eq!(report.most_active_username, "ben");
    }

    #[test]
    fn test_distribution_empty() {
        let report = distribution(&[]);
        assert_eq!(report.most_active_username, NO_MEMBER);
        assert_eq!(report.total_members, 0);
        assert_eq!(report.total_workouts, 0);
        assert_eq!(report.total_calories, 0);
        assert!(report.goal_distribution.is_empty());
        assert!(report.level_distribution.is_empty());
    }

    #[test]
    fn test_members_without_workouts_still_pick_most_active() {
        let members = vec![
            member("ana", 0, "strength", DifficultyLevel::Advanced),
            member("ben", 0, "endurance", DifficultyLevel::Beginner),
        ];
        assert_eq!(distribution(&members).most_active_username, "ana");
    }

    #[test]
    fn test_tally_reads_do_not_insert() {
        let mut tally = Tally::default();
        assert_eq!(tally.get("athletic"), 0);
        assert!(tally.is_empty());

        tally.increment("athletic");
        tally.increment("athletic");
        assert_eq!(tally.get("athletic"), 2);
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("athletic", 2)]);

        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"athletic":2}"#);
    }
}
