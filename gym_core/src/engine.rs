//! Recommendation engine for building workout plans.
//!
//! For a (goal, level) pair the engine:
//! - Resolves the goal's categories (fallback list for unknown goals)
//! - Picks the highest-calorie exercise per category at the requested level,
//!   dropping back to beginner when the level has no entries
//! - Orders the picks by calories, highest first

use crate::goals::{get_default_goals, GoalMap};
use crate::index::{get_default_index, ExerciseIndex};
use crate::{DifficultyLevel, ExerciseDefinition, WorkoutPlan};
use std::cmp::Reverse;

/// Recommend a plan using the default index and goal map
pub fn recommend(goal: &str, level: DifficultyLevel) -> WorkoutPlan {
    RecommendationEngine::new(get_default_index(), get_default_goals()).recommend(goal, level)
}

/// Plan builder over a shared, read-only index and goal map
#[derive(Clone, Copy, Debug)]
pub struct RecommendationEngine<'a> {
    index: &'a ExerciseIndex,
    goals: &'a GoalMap,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(index: &'a ExerciseIndex, goals: &'a GoalMap) -> Self {
        Self { index, goals }
    }

    /// Build the plan for a goal at a level
    ///
    /// Never fails: unknown goals use the fallback categories and a category
    /// with no usable bucket is left out of the plan.
    pub fn recommend(&self, goal: &str, level: DifficultyLevel) -> WorkoutPlan {
        let categories = self.goals.categories_for(goal);

        let mut picks: Vec<&ExerciseDefinition> = categories
            .iter()
            .filter_map(|category| {
                let pick = pick_best(self.candidates(category, level));
                if pick.is_none() {
                    tracing::debug!("No exercises for category '{}', skipping", category);
                }
                pick
            })
            .collect();

        // Stable: equal calories keep catalog order of their categories
        picks.sort_by_key(|e| {
            (
                Reverse(e.calories),
                self.index.category_rank(&e.category).unwrap_or(usize::MAX),
            )
        });

        let plan = WorkoutPlan::new(picks.into_iter().cloned().collect());
        tracing::info!(
            "Recommended {} exercises ({} kcal) for goal '{}' at {} level",
            plan.exercises.len(),
            plan.total_calories,
            goal,
            level
        );
        plan
    }

    /// Exercises to choose from: the requested level, else beginner
    fn candidates(&self, category: &str, level: DifficultyLevel) -> &'a [ExerciseDefinition] {
        let found = self.index.lookup(category, level);
        if found.is_empty() && level != DifficultyLevel::Beginner {
            tracing::debug!(
                "No {} exercises for '{}', falling back to beginner",
                level,
                category
            );
            return self.index.lookup(category, DifficultyLevel::Beginner);
        }
        found
    }
}

/// Highest-calorie exercise; the first one in catalog order on ties
fn pick_best(candidates: &[ExerciseDefinition]) -> Option<&ExerciseDefinition> {
    candidates
        .iter()
        .reduce(|best, e| if e.calories > best.calories { e } else { best })
}
