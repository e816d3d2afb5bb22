//! JSON database persistence with file locking.
//!
//! The database file is one JSON object mapping username → member record,
//! with the inventory under the reserved [`EQUIPMENT_KEY`]. Member order in
//! the file is kept. Writes go through a temp file that is renamed over the
//! original; load-modify-save cycles hold an exclusive lock on a sidecar
//! `.lock` file.

use crate::equipment::{self, Equipment, EquipmentPatch, NewEquipment};
use crate::members::{NewMember, ProfileUpdate};
use crate::occupancy::OccupancyTracker;
use crate::{Error, MemberRecord, MemberSummary, Result, WorkoutRecord};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reserved database key holding the equipment inventory
pub const EQUIPMENT_KEY: &str = "__equipment__";

/// Members and equipment as held in the database file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Database {
    members: Vec<MemberRecord>,
    /// `None` until the inventory is first changed
    equipment: Option<Vec<Equipment>>,
}

impl Serialize for Database {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.members.len() + usize::from(self.equipment.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for member in &self.members {
            map.serialize_entry(&member.username, member)?;
        }
        if let Some(items) = &self.equipment {
            map.serialize_entry(EQUIPMENT_KEY, items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Database {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;

        let mut db = Database::default();
        for (key, value) in document {
            if key == EQUIPMENT_KEY {
                db.equipment = Some(
                    serde_json::from_value(value).map_err(<D::Error as de::Error>::custom)?,
                );
                continue;
            }
            let mut member: MemberRecord = serde_json::from_value(value)
                .map_err(|e| <D::Error as de::Error>::custom(format!("member '{}': {}", key, e)))?;
            // The key is the username
            if member.username != key {
                tracing::warn!(
                    "Member record under '{}' names itself '{}', using the key",
                    key,
                    member.username
                );
                member.username = key;
            }
            db.members.push(member);
        }
        Ok(db)
    }
}

impl Database {
    /// Load the database with a shared lock
    ///
    /// A missing file is an empty database. Unlike the occupancy snapshot, a
    /// corrupted database is an error: saving defaults over it would drop
    /// every member.
    pub fn load(path: &Path) -> Result<Self> {
        match read_locked(path)? {
            None => {
                tracing::info!("No database found at {:?}, starting empty", path);
                Ok(Self::default())
            }
            Some(contents) => {
                let db: Database = serde_json::from_str(&contents).map_err(|e| {
                    Error::State(format!("Failed to parse database {:?}: {}", path, e))
                })?;
                tracing::debug!("Loaded {} members from {:?}", db.members.len(), path);
                Ok(db)
            }
        }
    }

    /// Save atomically (pretty-printed)
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        write_atomic(path, contents.as_bytes())?;
        tracing::info!("Saved database ({} members) to {:?}", self.members.len(), path);
        Ok(())
    }

    /// Load, modify and save under an exclusive lock
    ///
    /// Nothing is written when `f` fails.
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T>,
    {
        with_exclusive_lock(path, || {
            let mut db = Self::load(path)?;
            let value = f(&mut db)?;
            db.save(path)?;
            Ok(value)
        })
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    /// Members in file order
    pub fn members(&self) -> &[MemberRecord] {
        &self.members
    }

    pub fn member(&self, username: &str) -> Result<&MemberRecord> {
        self.members
            .iter()
            .find(|m| m.username == username)
            .ok_or_else(|| Error::MemberNotFound(username.to_string()))
    }

    fn member_mut(&mut self, username: &str) -> Result<&mut MemberRecord> {
        self.members
            .iter_mut()
            .find(|m| m.username == username)
            .ok_or_else(|| Error::MemberNotFound(username.to_string()))
    }

    /// Register a member; usernames are unique and the reserved key is taken
    pub fn add_member(&mut self, new_member: NewMember, joined: NaiveDate) -> Result<&MemberRecord> {
        new_member.validate()?;
        let username = new_member.username.trim();
        if self.members.iter().any(|m| m.username == username) {
            return Err(Error::MemberExists(username.to_string()));
        }

        let record = new_member.into_record(joined);
        tracing::info!("Registered member '{}'", record.username);
        self.members.push(record);
        let last = self.members.len() - 1;
        Ok(&self.members[last])
    }

    pub fn remove_member(&mut self, username: &str) -> Result<MemberRecord> {
        let pos = self
            .members
            .iter()
            .position(|m| m.username == username)
            .ok_or_else(|| Error::MemberNotFound(username.to_string()))?;
        tracing::info!("Removed member '{}'", username);
        Ok(self.members.remove(pos))
    }

    pub fn update_profile(&mut self, username: &str, update: &ProfileUpdate) -> Result<&MemberRecord> {
        let member = self.member_mut(username)?;
        update.apply(member)?;
        Ok(&*member)
    }

    /// Push a workout onto a member's history (newest first)
    pub fn record_workout(&mut self, username: &str, record: WorkoutRecord) -> Result<()> {
        let member = self.member_mut(username)?;
        member.push_workout(record);
        tracing::info!(
            "Logged workout for '{}' ({} total)",
            username,
            member.workout_count()
        );
        Ok(())
    }

    /// Empty a member's history, returning how many workouts were dropped
    pub fn clear_history(&mut self, username: &str) -> Result<usize> {
        let member = self.member_mut(username)?;
        let cleared = member.history.len();
        member.history.clear();
        Ok(cleared)
    }

    /// Report inputs for every member, in file order
    pub fn summaries(&self) -> Vec<MemberSummary> {
        self.members.iter().map(MemberSummary::from).collect()
    }

    // ------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------

    /// Current inventory (the built-in list until first changed)
    pub fn equipment(&self) -> Vec<Equipment> {
        match &self.equipment {
            Some(items) => items.clone(),
            None => equipment::default_equipment(),
        }
    }

    fn equipment_mut(&mut self) -> &mut Vec<Equipment> {
        self.equipment.get_or_insert_with(equipment::default_equipment)
    }

    pub fn add_equipment(&mut self, item: NewEquipment) -> Result<Equipment> {
        let items = self.equipment_mut();
        let item = item.into_equipment(equipment::next_id(items))?;
        tracing::info!("Added equipment #{} '{}'", item.id, item.name);
        items.push(item.clone());
        Ok(item)
    }

    pub fn update_equipment(&mut self, id: u32, patch: &EquipmentPatch) -> Result<Equipment> {
        let item = self
            .equipment_mut()
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Error::EquipmentNotFound(id))?;
        patch.apply(item);
        Ok(item.clone())
    }

    pub fn remove_equipment(&mut self, id: u32) -> Result<Equipment> {
        let items = self.equipment_mut();
        let pos = items
            .iter()
            .position(|e| e.id == id)
            .ok_or(Error::EquipmentNotFound(id))?;
        Ok(items.remove(pos))
    }
}

// ============================================================================
// Occupancy snapshot
// ============================================================================

/// Load the occupancy tracker snapshot
///
/// Returns a fresh tracker if the file doesn't exist or can't be read or parsed.
pub fn load_occupancy(path: &Path) -> Result<OccupancyTracker> {
    let contents = match read_locked(path) {
        Ok(Some(contents)) => contents,
        Ok(None) => return Ok(OccupancyTracker::new()),
        Err(e) => {
            tracing::warn!(
                "Failed to read occupancy file {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(OccupancyTracker::new());
        }
    };

    match serde_json::from_str::<OccupancyTracker>(&contents) {
        Ok(tracker) => Ok(tracker),
        Err(e) => {
            tracing::warn!(
                "Failed to parse occupancy file {:?}: {}. Starting empty.",
                path,
                e
            );
            Ok(OccupancyTracker::new())
        }
    }
}

pub fn save_occupancy(tracker: &OccupancyTracker, path: &Path) -> Result<()> {
    let contents = serde_json::to_string(tracker)?;
    write_atomic(path, contents.as_bytes())?;
    tracing::debug!("Saved occupancy to {:?}", path);
    Ok(())
}

/// Load, modify and save the occupancy snapshot under an exclusive lock
pub fn update_occupancy<F, T>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut OccupancyTracker) -> T,
{
    with_exclusive_lock(path, || {
        let mut tracker = load_occupancy(path)?;
        let value = f(&mut tracker);
        save_occupancy(&tracker, path)?;
        Ok(value)
    })
}

// ============================================================================
// File helpers
// ============================================================================

/// Read a whole file under a shared lock; `None` if it doesn't exist
fn read_locked(path: &Path) -> Result<Option<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(Some(contents))
}

/// Write via a temp file in the same directory, then rename over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = parent_dir(path)?;
    std::fs::create_dir_all(&parent)?;

    let temp = NamedTempFile::new_in(&parent)?;
    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Run `f` while holding an exclusive lock on `<path>.lock`
fn with_exclusive_lock<T>(path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
    std::fs::create_dir_all(parent_dir(path)?)?;

    let mut lock_path = path.as_os_str().to_owned();
    lock_path.push(".lock");
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(PathBuf::from(lock_path))?;

    lock.lock_exclusive()?;
    let result = f();
    lock.unlock()?;
    result
}

fn parent_dir(path: &Path) -> Result<PathBuf> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(p) => Ok(p.to_path_buf()),
        None => Err(Error::State(format!("{:?} has no parent directory", path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DifficultyLevel, WorkoutPlan};
    use chrono::Utc;

    fn new_member(username: &str) -> NewMember {
        NewMember {
            username: username.into(),
            age: 31,
            weight: 68.0,
            height: 170.0,
            goal: "endurance".into(),
            level: DifficultyLevel::Beginner,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn workout(calories: u32) -> WorkoutRecord {
        WorkoutRecord {
            id: uuid::Uuid::new_v4(),
            date: today(),
            goal: "endurance".into(),
            level: DifficultyLevel::Beginner,
            total_calories: calories,
            exercises: vec![],
        }
    }

    #[test]
    fn test_save_and_load_roundtrip_keeps_member_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gym_database.json");

        let mut db = Database::default();
        for name in ["zoe", "adam", "mia"] {
            db.add_member(new_member(name), today()).unwrap();
        }
        db.record_workout("adam", workout(400)).unwrap();
        db.save(&path).unwrap();

        let loaded = Database::load(&path).unwrap();
        assert_eq!(loaded, db);
        let order: Vec<_> = loaded.members().iter().map(|m| m.username.as_str()).collect();
        assert_eq!(order, vec!["zoe", "adam", "mia"]);
    }

    #[test]
    fn test_equipment_stored_under_reserved_key() {
        let mut db = Database::default();
        db.add_member(new_member("sam"), today()).unwrap();
        let value = serde_json::to_value(&db).unwrap();
        assert!(value.get(EQUIPMENT_KEY).is_none());

        db.remove_equipment(3).unwrap();
        let value = serde_json::to_value(&db).unwrap();
        assert_eq!(value[EQUIPMENT_KEY].as_array().unwrap().len(), 9);
        assert_eq!(value["sam"]["goal"], "endurance");

        let back: Database = serde_json::from_value(value).unwrap();
        assert_eq!(back.members().len(), 1);
        assert_eq!(back.equipment().len(), 9);
    }

    #[test]
    fn test_member_key_wins_over_record_username() {
        let mut db = Database::default();
        db.add_member(new_member("bob"), today()).unwrap();
        let record = serde_json::to_value(&db.members()[0]).unwrap();

        let mut document = serde_json::Map::new();
        document.insert("a".into(), record.clone());
        document.insert("bob".into(), record);

        let loaded: Database = serde_json::from_value(document.into()).unwrap();
        let names: Vec<_> = loaded.members().iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["a", "bob"]);
        assert!(loaded.member("a").is_ok());

        // Survives a save/load cycle without losing a member
        let reparsed: Database =
            serde_json::from_str(&serde_json::to_string(&loaded).unwrap()).unwrap();
        assert_eq!(reparsed.members().len(), 2);
        assert_eq!(reparsed.summaries().len(), 2);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = Database::load(&temp_dir.path().join("none.json")).unwrap();
        assert!(db.members().is_empty());
        assert_eq!(db.equipment().len(), 10);
    }

    #[test]
    fn test_corrupted_database_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gym_database.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Database::load(&path), Err(Error::State(_))));
    }

    #[test]
    fn test_member_operations() {
        let mut db = Database::default();
        db.add_member(new_member("sam"), today()).unwrap();

        assert!(matches!(
            db.add_member(new_member("sam"), today()),
            Err(Error::MemberExists(_))
        ));
        assert!(matches!(
            db.add_member(new_member(EQUIPMENT_KEY), today()),
            Err(Error::MemberExists(_))
        ));

        db.record_workout("sam", workout(300)).unwrap();
        db.record_workout("sam", workout(500)).unwrap();
        assert_eq!(db.member("sam").unwrap().history[0].total_calories, 500);

        let update = ProfileUpdate {
            goal: Some("strength".into()),
            ..Default::default()
        };
        assert_eq!(db.update_profile("sam", &update).unwrap().goal, "strength");

        assert_eq!(db.clear_history("sam").unwrap(), 2);
        assert!(matches!(db.record_workout("nobody", workout(1)), Err(Error::MemberNotFound(_))));
        assert_eq!(db.remove_member("sam").unwrap().username, "sam");
        assert!(db.member("sam").is_err());
    }

    #[test]
    fn test_equipment_operations() {
        let mut db = Database::default();
        let added = db
            .add_equipment(NewEquipment {
                name: "Assault Bike".into(),
                category: "Cardio".into(),
                quantity: 2,
                condition: "Excellent".into(),
                status: "Operational".into(),
                last_service: Some(today()),
                next_service: None,
            })
            .unwrap();
        assert_eq!(added.id, 11);

        let patch = EquipmentPatch {
            quantity: Some(3),
            ..Default::default()
        };
        assert_eq!(db.update_equipment(11, &patch).unwrap().quantity, 3);
        assert!(matches!(db.update_equipment(99, &patch), Err(Error::EquipmentNotFound(99))));

        db.remove_equipment(11).unwrap();
        assert_eq!(db.equipment().len(), 10);
        assert!(db.remove_equipment(11).is_err());
    }

    #[test]
    fn test_update_does_not_save_on_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gym_database.json");

        Database::update(&path, |db| db.add_member(new_member("sam"), today()).map(|_| ())).unwrap();
        let result = Database::update(&path, |db| {
            db.remove_member("sam")?;
            db.remove_member("ghost")?;
            Ok(())
        });
        assert!(result.is_err());
        assert!(Database::load(&path).unwrap().member("sam").is_ok());
    }

    #[test]
    fn test_occupancy_snapshot_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("occupancy.json");

        assert_eq!(load_occupancy(&path).unwrap(), OccupancyTracker::new());

        let state = update_occupancy(&path, |t| t.record_event(120, "rush", Utc::now())).unwrap();
        assert_eq!(state.current_count, 50);

        let tracker = load_occupancy(&path).unwrap();
        assert_eq!(tracker.current_count(), 50);
        assert_eq!(tracker.log_len(), 1);

        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(load_occupancy(&path).unwrap(), OccupancyTracker::new());
    }

    #[test]
    fn test_unreadable_occupancy_starts_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("occupancy.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let loaded = load_occupancy(&path).unwrap();
        assert_eq!(loaded.current_count(), 0);
        assert_eq!(loaded.log_len(), 0);

        let state = update_occupancy(&path, |t| t.record_event(7, "reset", Utc::now())).unwrap();
        assert_eq!(state.current_count, 7);
        assert_eq!(load_occupancy(&path).unwrap().current_count(), 7);
    }

    #[test]
    fn test_summaries_follow_file_order() {
        let mut db = Database::default();
        db.add_member(new_member("b"), today()).unwrap();
        db.add_member(new_member("a"), today()).unwrap();
        let plan = WorkoutPlan::default();
        db.record_workout("a", WorkoutRecord::from_plan(&plan, "x", DifficultyLevel::Beginner, today()))
            .unwrap();

        let summaries = db.summaries();
        assert_eq!(summaries[0].username, "b");
        assert_eq!(summaries[1].workout_count, 1);
    }
}
