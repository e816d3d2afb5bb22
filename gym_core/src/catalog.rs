//! Default exercise catalog.
//!
//! The catalog is the raw, category-ordered list of exercises. Levels are kept
//! as strings here so that a catalog loaded from a file can be checked when the
//! [`ExerciseIndex`](crate::index::ExerciseIndex) is built.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// One exercise as written in a catalog source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub level: String,
    pub calories: u32,
    pub sets: u32,
    pub reps: u32,
}

/// A category and its exercises, in catalog order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogCategory {
    pub name: String,
    pub exercises: Vec<CatalogEntry>,
}

/// The complete exercise catalog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub categories: Vec<CatalogCategory>,
}

type Row = (&'static str, &'static str, u32, u32, u32);

const CHEST: &[Row] = &[
    ("Bench Press", "intermediate", 250, 4, 8),
    ("Push-Up", "beginner", 150, 3, 15),
    ("Incline Dumbbell Press", "intermediate", 220, 4, 10),
    ("Cable Fly", "advanced", 200, 3, 12),
    ("Chest Dip", "intermediate", 210, 3, 10),
    ("Pec Deck Machine", "beginner", 160, 3, 12),
    ("Decline Bench Press", "advanced", 260, 4, 8),
];

const BACK: &[Row] = &[
    ("Pull-Up", "intermediate", 200, 4, 8),
    ("Bent-Over Row", "intermediate", 230, 4, 10),
    ("Lat Pulldown", "beginner", 180, 3, 12),
    ("Deadlift", "advanced", 400, 3, 5),
    ("Seated Cable Row", "beginner", 170, 3, 12),
    ("T-Bar Row", "intermediate", 240, 4, 8),
    ("Single Arm Dumbbell Row", "intermediate", 210, 3, 10),
    ("Hyperextension", "beginner", 130, 3, 15),
];

const LEGS: &[Row] = &[
    ("Squat", "intermediate", 350, 4, 8),
    ("Leg Press", "beginner", 280, 3, 12),
    ("Romanian Deadlift", "intermediate", 300, 3, 10),
    ("Bulgarian Split Squat", "advanced", 320, 3, 10),
    ("Leg Curl", "beginner", 160, 3, 12),
    ("Leg Extension", "beginner", 150, 3, 12),
    ("Walking Lunges", "intermediate", 260, 3, 12),
    ("Calf Raises", "beginner", 120, 4, 20),
    ("Box Jump", "advanced", 340, 4, 8),
    ("Sumo Squat", "intermediate", 280, 3, 12),
];

const SHOULDERS: &[Row] = &[
    ("Overhead Press", "intermediate", 220, 4, 8),
    ("Lateral Raise", "beginner", 130, 3, 15),
    ("Arnold Press", "advanced", 200, 4, 10),
    ("Face Pull", "beginner", 120, 3, 15),
    ("Front Raise", "beginner", 125, 3, 12),
    ("Upright Row", "intermediate", 190, 3, 10),
    ("Reverse Pec Deck", "intermediate", 150, 3, 12),
    ("Shrugs", "beginner", 140, 3, 15),
];

const ARMS: &[Row] = &[
    ("Bicep Curl", "beginner", 140, 3, 12),
    ("Tricep Dip", "intermediate", 160, 3, 10),
    ("Hammer Curl", "beginner", 130, 3, 12),
    ("Skull Crusher", "intermediate", 150, 3, 12),
    ("Concentration Curl", "beginner", 120, 3, 12),
    ("Cable Tricep Pushdown", "beginner", 130, 3, 15),
    ("Preacher Curl", "intermediate", 145, 3, 10),
    ("Overhead Tricep Ext", "intermediate", 140, 3, 12),
    ("Chin-Up", "advanced", 180, 3, 8),
];

const CORE: &[Row] = &[
    ("Plank", "beginner", 100, 3, 60),
    ("Hanging Leg Raise", "advanced", 150, 3, 12),
    ("Cable Crunch", "intermediate", 120, 3, 15),
    ("Ab Wheel Rollout", "advanced", 140, 3, 10),
    ("Russian Twist", "beginner", 110, 3, 20),
    ("Mountain Climbers", "intermediate", 180, 3, 30),
    ("Bicycle Crunch", "beginner", 115, 3, 20),
    ("Dragon Flag", "advanced", 160, 3, 8),
    ("Side Plank", "beginner", 90, 3, 45),
    ("Decline Sit-Up", "intermediate", 130, 3, 15),
];

const CARDIO: &[Row] = &[
    ("Treadmill Run", "beginner", 400, 1, 30),
    ("Cycling", "beginner", 350, 1, 30),
    ("Jump Rope", "intermediate", 450, 5, 2),
    ("HIIT Sprints", "advanced", 500, 8, 1),
    ("Rowing Machine", "intermediate", 420, 1, 20),
    ("Stair Climber", "intermediate", 380, 1, 20),
    ("Battle Ropes", "advanced", 480, 6, 1),
    ("Burpees", "intermediate", 460, 5, 10),
    ("Box Step-Up", "beginner", 300, 3, 15),
    ("Shadow Boxing", "beginner", 320, 3, 3),
];

const FULL_BODY: &[Row] = &[
    ("Clean and Press", "advanced", 420, 4, 5),
    ("Kettlebell Swing", "intermediate", 350, 4, 15),
    ("Thruster", "advanced", 400, 4, 8),
    ("Man Maker", "advanced", 380, 3, 8),
    ("Turkish Get-Up", "intermediate", 300, 3, 5),
    ("Dumbbell Complex", "intermediate", 340, 3, 8),
];

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    let sections: [(&str, &[Row]); 8] = [
        ("chest", CHEST),
        ("back", BACK),
        ("legs", LEGS),
        ("shoulders", SHOULDERS),
        ("arms", ARMS),
        ("core", CORE),
        ("cardio", CARDIO),
        ("full_body", FULL_BODY),
    ];

    let categories = sections
        .iter()
        .map(|(name, rows)| CatalogCategory {
            name: (*name).into(),
            exercises: rows
                .iter()
                .map(|&(name, level, calories, sets, reps)| CatalogEntry {
                    name: name.into(),
                    level: level.into(),
                    calories,
                    sets,
                    reps,
                })
                .collect(),
        })
        .collect();

    Catalog { categories }
}

impl Catalog {
    /// Parse a catalog from a JSON object mapping category → list of exercises
    ///
    /// Category order is the order of keys in the document.
    pub fn from_json(contents: &str) -> Result<Self> {
        let document: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(contents)?;

        let mut categories = Vec::with_capacity(document.len());
        for (name, exercises) in document {
            let exercises: Vec<CatalogEntry> = serde_json::from_value(exercises)?;
            categories.push(CatalogCategory { name, exercises });
        }

        Ok(Catalog { categories })
    }

    /// Load a catalog from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded catalog with {} categories from {:?}",
            catalog.categories.len(),
            path
        );
        Ok(catalog)
    }

    /// Total number of exercises across all categories
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.exercises.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate the catalog for structural consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid. Unknown
    /// levels are reported by `ExerciseIndex::build` instead.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for category in &self.categories {
            if category.name.is_empty() {
                errors.push("Category has empty name".to_string());
            }
            if !seen.insert(category.name.as_str()) {
                errors.push(format!("Duplicate category '{}'", category.name));
            }
            if category.exercises.is_empty() {
                errors.push(format!("Category '{}' has no exercises", category.name));
            }

            for entry in &category.exercises {
                if entry.name.is_empty() {
                    errors.push(format!(
                        "Category '{}' has an exercise with empty name",
                        category.name
                    ));
                }
                if entry.sets == 0 {
                    errors.push(format!("Exercise '{}': sets must be at least 1", entry.name));
                }
                if entry.reps == 0 {
                    errors.push(format!("Exercise '{}': reps must be at least 1", entry.name));
                }
            }
        }

        errors
    }

    /// Validate and turn the error list into a single error
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CatalogValidation(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.categories.len(), 8);
        assert_eq!(catalog.len(), 68);
    }

    #[test]
    fn test_category_order_is_preserved() {
        let catalog = get_default_catalog();
        let names: Vec<_> = catalog.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["chest", "back", "legs", "shoulders", "arms", "core", "cardio", "full_body"]
        );
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_validate_reports_problems() {
        let catalog = Catalog {
            categories: vec![
                CatalogCategory {
                    name: "legs".into(),
                    exercises: vec![CatalogEntry {
                        name: "".into(),
                        level: "beginner".into(),
                        calories: 100,
                        sets: 0,
                        reps: 10,
                    }],
                },
                CatalogCategory {
                    name: "legs".into(),
                    exercises: vec![],
                },
            ],
        };

        let errors = catalog.validate();
        assert_eq!(errors.len(), 4, "{:?}", errors);
        assert!(catalog.ensure_valid().is_err());
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let json = r#"{
            "yoga": [{"name": "Sun Salutation", "level": "beginner", "calories": 90, "sets": 2, "reps": 5}],
            "boxing": [{"name": "Heavy Bag", "level": "advanced", "calories": 420, "sets": 5, "reps": 3}]
        }"#;

        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.categories[0].name, "yoga");
        assert_eq!(catalog.categories[1].name, "boxing");
        assert_eq!(catalog.categories[1].exercises[0].calories, 420);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"core": [{"name": "Plank", "level": "beginner", "calories": 100, "sets": 3, "reps": 60}]}"#,
        )
        .unwrap();

        let catalog = Catalog::load_from(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(Catalog::load_from(&temp_dir.path().join("missing.json")).is_err());
    }
}
