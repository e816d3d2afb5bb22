//! Member registration, profile updates and the admin member listing.

use crate::goals::DEFAULT_GOAL;
use crate::store::EQUIPMENT_KEY;
use crate::{DifficultyLevel, Error, MemberRecord, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// Body-mass index from kilograms and centimetres, rounded to one decimal
pub fn calc_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let h = height_cm / 100.0;
    (weight_kg / (h * h) * 10.0).round() / 10.0
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        };
        f.write_str(label)
    }
}

/// Registration details for a new member
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewMember {
    pub username: String,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    #[serde(default = "default_goal")]
    pub goal: String,
    #[serde(default = "default_level")]
    pub level: DifficultyLevel,
}

fn default_goal() -> String {
    DEFAULT_GOAL.to_string()
}

fn default_level() -> DifficultyLevel {
    DifficultyLevel::Beginner
}

impl NewMember {
    /// Reject empty or reserved usernames and non-positive body measurements
    pub fn validate(&self) -> Result<()> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("username is required".into()));
        }
        if username == EQUIPMENT_KEY {
            return Err(Error::MemberExists(username.to_string()));
        }
        if self.age == 0 {
            return Err(Error::InvalidInput("age must be positive".into()));
        }
        check_measurements(self.weight, self.height)
    }

    /// Turn the registration into a stored record with an empty history
    pub fn into_record(self, joined: NaiveDate) -> MemberRecord {
        MemberRecord {
            username: self.username.trim().to_string(),
            age: self.age,
            weight: self.weight,
            height: self.height,
            goal: self.goal,
            level: self.level,
            joined,
            history: Vec::new(),
        }
    }
}

fn check_measurements(weight: f64, height: f64) -> Result<()> {
    if weight.is_nan() || weight <= 0.0 {
        return Err(Error::InvalidInput("weight must be positive".into()));
    }
    if height.is_nan() || height <= 0.0 {
        return Err(Error::InvalidInput("height must be positive".into()));
    }
    Ok(())
}

/// Partial profile change; `None` keeps the current value
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub goal: Option<String>,
    pub level: Option<DifficultyLevel>,
}

impl ProfileUpdate {
    pub fn apply(&self, member: &mut MemberRecord) -> Result<()> {
        let weight = self.weight.unwrap_or(member.weight);
        let height = self.height.unwrap_or(member.height);
        check_measurements(weight, height)?;

        member.weight = weight;
        member.height = height;
        if let Some(goal) = &self.goal {
            member.goal = goal.clone();
        }
        if let Some(level) = self.level {
            member.level = level;
        }
        Ok(())
    }
}

/// One row of the admin member listing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MemberOverview {
    pub username: String,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub goal: String,
    pub level: DifficultyLevel,
    pub workout_count: usize,
    pub total_calories: u64,
    pub joined: NaiveDate,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
}

impl From<&MemberRecord> for MemberOverview {
    fn from(member: &MemberRecord) -> Self {
        let bmi = calc_bmi(member.weight, member.height);
        Self {
            username: member.username.clone(),
            age: member.age,
            weight: member.weight,
            height: member.height,
            goal: member.goal.clone(),
            level: member.level,
            workout_count: member.workout_count(),
            total_calories: member.total_calories(),
            joined: member.joined,
            bmi,
            bmi_category: BmiCategory::from_bmi(bmi),
        }
    }
}

/// Member listing, most workouts first (stable on ties)
pub fn member_overviews(members: &[MemberRecord]) -> Vec<MemberOverview> {
    let mut rows: Vec<MemberOverview> = members.iter().map(MemberOverview::from).collect();
    rows.sort_by_key(|row| Reverse(row.workout_count));
    rows
}
