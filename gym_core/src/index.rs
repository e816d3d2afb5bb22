//! Category → level → exercises index over the catalog.

use crate::catalog::{get_default_catalog, Catalog};
use crate::{DifficultyLevel, Error, ExerciseDefinition, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached index over the default catalog
static DEFAULT_INDEX: Lazy<ExerciseIndex> = Lazy::new(|| {
    ExerciseIndex::build(get_default_catalog()).unwrap_or_else(|e| {
        tracing::error!("Built-in exercise catalog failed to index: {}", e);
        ExerciseIndex::default()
    })
});

/// Get a reference to the index built from the default catalog
pub fn get_default_index() -> &'static ExerciseIndex {
    &DEFAULT_INDEX
}

/// Read-only lookup structure built once from a [`Catalog`]
///
/// Every catalog exercise lives in exactly one (category, level) bucket, and
/// each bucket keeps catalog order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExerciseIndex {
    buckets: HashMap<String, HashMap<DifficultyLevel, Vec<ExerciseDefinition>>>,
    /// Category names in catalog order
    category_order: Vec<String>,
}

impl ExerciseIndex {
    /// Build the index from a catalog
    ///
    /// Fails with [`Error::Config`] if an exercise carries an unknown level.
    pub fn build(catalog: &Catalog) -> Result<Self> {
        let mut buckets: HashMap<String, HashMap<DifficultyLevel, Vec<ExerciseDefinition>>> =
            HashMap::new();
        let mut category_order = Vec::new();

        for category in &catalog.categories {
            if !buckets.contains_key(&category.name) {
                category_order.push(category.name.clone());
            }
            let levels = buckets.entry(category.name.clone()).or_default();

            for entry in &category.exercises {
                let level: DifficultyLevel = entry.level.parse().map_err(|_| {
                    Error::Config(format!(
                        "exercise '{}' in category '{}' has unknown level '{}'",
                        entry.name, category.name, entry.level
                    ))
                })?;

                levels.entry(level).or_default().push(ExerciseDefinition {
                    name: entry.name.clone(),
                    category: category.name.clone(),
                    level,
                    calories: entry.calories,
                    sets: entry.sets,
                    reps: entry.reps,
                });
            }
        }

        tracing::debug!(
            "Built exercise index: {} categories, {} exercises",
            category_order.len(),
            catalog.len()
        );

        Ok(Self {
            buckets,
            category_order,
        })
    }

    /// Exercises for a (category, level) pair; empty when there are none
    pub fn lookup(&self, category: &str, level: DifficultyLevel) -> &[ExerciseDefinition] {
        self.buckets
            .get(category)
            .and_then(|levels| levels.get(&level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.buckets.contains_key(category)
    }

    /// Position of a category in catalog order
    pub fn category_rank(&self, category: &str) -> Option<usize> {
        self.category_order.iter().position(|c| c == category)
    }

    /// Category names, sorted alphabetically
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.category_order.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Browse exercises, optionally restricted to one category and filtered by
    /// a case-insensitive keyword over name, category and level
    ///
    /// Results are sorted by level (beginner first), then calories descending.
    pub fn browse(&self, category: Option<&str>, keyword: Option<&str>) -> Vec<ExerciseDefinition> {
        let categories: Vec<&str> = match category {
            Some(c) => vec![c],
            None => self.category_order.iter().map(String::as_str).collect(),
        };

        let keyword = keyword
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());

        let mut results: Vec<ExerciseDefinition> = categories
            .into_iter()
            .flat_map(|c| DifficultyLevel::ALL.iter().map(move |&level| (c, level)))
            .flat_map(|(c, level)| self.lookup(c, level).iter())
            .filter(|e| match &keyword {
                Some(k) => {
                    e.name.to_lowercase().contains(k.as_str())
                        || e.category.to_lowercase().contains(k.as_str())
                        || e.level.as_str().contains(k.as_str())
                }
                None => true,
            })
            .cloned()
            .collect();

        results.sort_by(|a, b| a.level.cmp(&b.level).then(b.calories.cmp(&a.calories)));
        results
    }

    /// Total number of indexed exercises
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|levels| levels.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
