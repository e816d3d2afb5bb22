//! Core domain types for the IronCore gym tracker.
//!
//! This module defines the fundamental types shared across the crate:
//! - Difficulty levels and exercise definitions
//! - Workout plans produced by the recommendation engine
//! - Member records and workout history as stored by the database
//! - Member summaries consumed by the aggregation reports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

// ============================================================================
// Exercise Types
// ============================================================================

/// Difficulty level of an exercise or a member
///
/// Ordering follows progression: beginner < intermediate < advanced.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(Error::InvalidInput(format!(
                "unknown difficulty level '{}'",
                other
            ))),
        }
    }
}

/// A single exercise from the catalog (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDefinition {
    pub name: String,
    pub category: String,
    pub level: DifficultyLevel,
    pub calories: u32,
    pub sets: u32,
    pub reps: u32,
}

// ============================================================================
// Plan Types
// ============================================================================

/// A recommended workout: one exercise per category, highest calories first
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WorkoutPlan {
    pub exercises: Vec<ExerciseDefinition>,
    pub total_calories: u32,
}

impl WorkoutPlan {
    /// Build a plan from already ordered exercises, deriving the calorie total
    pub fn new(exercises: Vec<ExerciseDefinition>) -> Self {
        let total_calories = exercises.iter().map(|e| e.calories).sum();
        Self {
            exercises,
            total_calories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

// ============================================================================
// Member Types
// ============================================================================

/// A logged workout in a member's history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    pub goal: String,
    pub level: DifficultyLevel,
    pub total_calories: u32,
    #[serde(default)]
    pub exercises: Vec<ExerciseDefinition>,
}

impl WorkoutRecord {
    /// Record a recommended plan as performed on `date`
    pub fn from_plan(plan: &WorkoutPlan, goal: &str, level: DifficultyLevel, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            goal: goal.to_string(),
            level,
            total_calories: plan.total_calories,
            exercises: plan.exercises.clone(),
        }
    }
}

/// A registered gym member as held by the database
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MemberRecord {
    pub username: String,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub goal: String,
    pub level: DifficultyLevel,
    pub joined: NaiveDate,
    /// Workout history, newest first
    #[serde(default)]
    pub history: Vec<WorkoutRecord>,
}

impl MemberRecord {
    pub fn workout_count(&self) -> usize {
        self.history.len()
    }

    pub fn total_calories(&self) -> u64 {
        self.history.iter().map(|h| u64::from(h.total_calories)).sum()
    }

    /// Push a workout onto the top of the history stack
    pub fn push_workout(&mut self, record: WorkoutRecord) {
        self.history.insert(0, record);
    }
}

/// The fields of a member that the aggregation reports read
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberSummary {
    pub username: String,
    pub workout_count: usize,
    pub total_calories: u64,
    pub goal: String,
    pub level: DifficultyLevel,
}

impl From<&MemberRecord> for MemberSummary {
    fn from(member: &MemberRecord) -> Self {
        Self {
            username: member.username.clone(),
            workout_count: member.workout_count(),
            total_calories: member.total_calories(),
            goal: member.goal.clone(),
            level: member.level,
        }
    }
}
