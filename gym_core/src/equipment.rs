//! Equipment inventory records.
//!
//! The inventory lives under the reserved key of the member database; until
//! an admin changes it, the built-in list below is reported.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A piece of gym equipment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Equipment {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub condition: String,
    pub status: String,
    pub last_service: Option<NaiveDate>,
    #[serde(default)]
    pub next_service: Option<NaiveDate>,
}

/// Fields for a new inventory item
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewEquipment {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub condition: String,
    pub status: String,
    pub last_service: Option<NaiveDate>,
    pub next_service: Option<NaiveDate>,
}

impl NewEquipment {
    pub fn into_equipment(self, id: u32) -> Result<Equipment> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("equipment name is required".into()));
        }
        Ok(Equipment {
            id,
            name,
            category: self.category,
            quantity: self.quantity,
            condition: self.condition,
            status: self.status,
            last_service: self.last_service,
            next_service: self.next_service,
        })
    }
}

/// Partial change to an inventory item; `None` keeps the current value
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub last_service: Option<NaiveDate>,
    pub next_service: Option<NaiveDate>,
}

impl EquipmentPatch {
    pub fn apply(&self, item: &mut Equipment) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(condition) = &self.condition {
            item.condition = condition.clone();
        }
        if let Some(status) = &self.status {
            item.status = status.clone();
        }
        if self.last_service.is_some() {
            item.last_service = self.last_service;
        }
        if self.next_service.is_some() {
            item.next_service = self.next_service;
        }
    }
}

/// Next free id: one past the highest in use
pub fn next_id(items: &[Equipment]) -> u32 {
    items.iter().map(|e| e.id).max().unwrap_or(0) + 1
}

/// Copy of the inventory sorted by name
pub fn sorted_by_name(items: &[Equipment]) -> Vec<Equipment> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

/// Inventory reported before any admin change
pub fn default_equipment() -> Vec<Equipment> {
    type Ymd = (i32, u32, u32);
    type Row = (u32, &'static str, &'static str, u32, &'static str, &'static str, Ymd, Ymd);

    const ITEMS: &[Row] = &[
        (1, "Treadmill", "Cardio", 5, "Good", "Operational", (2026, 1, 15), (2026, 4, 15)),
        (2, "Barbell Set", "Free Weights", 10, "Excellent", "Operational", (2025, 12, 1), (2026, 6, 1)),
        (3, "Smith Machine", "Strength", 2, "Fair", "Service Due", (2025, 11, 20), (2026, 2, 20)),
        (4, "Lat Pulldown", "Cable Machine", 3, "Good", "Operational", (2026, 1, 5), (2026, 4, 5)),
        (5, "Stationary Bike", "Cardio", 4, "Poor", "Needs Repair", (2025, 10, 10), (2026, 1, 10)),
        (6, "Dumbbell Rack", "Free Weights", 1, "Excellent", "Operational", (2025, 12, 15), (2026, 6, 15)),
        (7, "Pull-Up Station", "Bodyweight", 2, "Good", "Operational", (2026, 1, 20), (2026, 7, 20)),
        (8, "Rowing Machine", "Cardio", 3, "Good", "Operational", (2026, 1, 10), (2026, 4, 10)),
        (9, "Cable Machine", "Cable Machine", 2, "Good", "Operational", (2025, 12, 20), (2026, 3, 20)),
        (10, "Leg Press", "Strength", 2, "Good", "Operational", (2026, 1, 8), (2026, 4, 8)),
    ];

    let date = |(y, m, d): Ymd| NaiveDate::from_ymd_opt(y, m, d);

    ITEMS
        .iter()
        .map(|&(id, name, category, quantity, condition, status, last, next)| Equipment {
            id,
            name: name.into(),
            category: category.into(),
            quantity,
            condition: condition.into(),
            status: status.into(),
            last_service: date(last),
            next_service: date(next),
        })
        .collect()
}
