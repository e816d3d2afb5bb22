//! Fitness goal → target category mapping.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Categories used when a goal is not recognised
pub const FALLBACK_CATEGORIES: [&str; 2] = ["cardio", "core"];

/// Goal assigned to members who do not pick one
pub const DEFAULT_GOAL: &str = "general_fitness";

static DEFAULT_GOALS: Lazy<GoalMap> = Lazy::new(GoalMap::default);

const GOALS: &[(&str, &[&str])] = &[
    ("weight_loss", &["cardio", "legs", "core"]),
    ("muscle_gain", &["chest", "back", "legs", "shoulders", "arms"]),
    ("endurance", &["cardio", "core", "legs", "full_body"]),
    ("flexibility", &["core", "legs", "shoulders"]),
    ("general_fitness", &["chest", "back", "legs", "core", "cardio"]),
    ("strength", &["legs", "back", "chest", "full_body"]),
    ("athletic", &["full_body", "cardio", "legs", "core"]),
];

/// Get a reference to the built-in goal map
pub fn get_default_goals() -> &'static GoalMap {
    &DEFAULT_GOALS
}

/// Static mapping from goal to an ordered list of categories
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalMap {
    goals: HashMap<String, Vec<String>>,
    fallback: Vec<String>,
}

impl Default for GoalMap {
    fn default() -> Self {
        let goals = GOALS
            .iter()
            .map(|(goal, categories)| {
                (
                    (*goal).to_string(),
                    categories.iter().map(|c| (*c).to_string()).collect(),
                )
            })
            .collect();

        Self {
            goals,
            fallback: FALLBACK_CATEGORIES.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

impl GoalMap {
    /// Built-in goals with extra or replacement entries and an optional
    /// replacement fallback list
    pub fn with_overrides(overrides: &HashMap<String, Vec<String>>, fallback: Option<&[String]>) -> Self {
        let mut map = Self::default();
        for (goal, categories) in overrides {
            map.goals.insert(goal.clone(), categories.clone());
        }
        if let Some(fallback) = fallback {
            map.fallback = fallback.to_vec();
        }
        map
    }

    /// Categories configured for a goal, exactly as written (may repeat)
    pub fn get(&self, goal: &str) -> Option<&[String]> {
        self.goals.get(goal).map(Vec::as_slice)
    }

    pub fn is_known(&self, goal: &str) -> bool {
        self.goals.contains_key(goal)
    }

    /// Categories to train for a goal: the fallback list for unknown goals,
    /// duplicates removed keeping the first occurrence
    pub fn categories_for(&self, goal: &str) -> Vec<&str> {
        let source: &[String] = match self.get(goal) {
            Some(categories) => categories,
            None => {
                tracing::warn!("Unknown goal '{}', using fallback categories", goal);
                self.fallback.as_slice()
            }
        };

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(source.len());
        for category in source {
            if seen.insert(category.as_str()) {
                categories.push(category.as_str());
            }
        }
        categories
    }

    /// Known goal names, sorted
    pub fn goals(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.goals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
