use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{Collection, DocumentStore, StoreError};

/// File-name prefix shared with the hosted deployment's local fallback.
const STORAGE_PREFIX: &str = "robotics_team_";

/// Local JSON-file document store: one pretty-printed array per collection in
/// the platform data directory. The fallback backend when no hosted database
/// is configured, and the only backend this build ships.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the store in the platform data directory, creating it if needed.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = directories::ProjectDirs::from("", "", "teamline")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::open_at(dir)
    }

    pub fn open_at(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.dir
            .join(format!("{STORAGE_PREFIX}{}.json", collection.name()))
    }

    fn read_collection(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_collection(&self, collection: Collection, docs: &[Value]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(docs)?;
        fs::write(self.collection_path(collection), json)?;
        Ok(())
    }

    /// Seed sample robotics-team data on first run so the timeline is not a
    /// blank wall. Only runs when both collections are empty; returns whether
    /// anything was written.
    pub fn seed_if_empty(&self) -> Result<bool, StoreError> {
        if !self.get_all(Collection::Tasks)?.is_empty()
            || !self.get_all(Collection::Milestones)?.is_empty()
        {
            return Ok(false);
        }

        let today = Utc::now();
        let iso = |days: i64| (today + Duration::days(days)).to_rfc3339();

        let chassis = self.create(
            Collection::Milestones,
            json!({
                "name": "Chassis & Drivetrain",
                "category": "FRC",
                "color": "#4285f4",
                "status": "In Progress",
                "start_date": iso(-5),
                "end_date": iso(16),
            }),
        )?;
        let auton = self.create(
            Collection::Milestones,
            json!({
                "name": "Autonomous Routines",
                "category": "FRC",
                "color": "#ab47bc",
                "status": "Not Started",
                "start_date": iso(10),
                "end_date": iso(32),
            }),
        )?;
        self.create(
            Collection::Milestones,
            json!({
                "name": "Outreach Season",
                "category": "FTC",
                "color": "#34a853",
                "status": "In Progress",
                "start_date": iso(-14),
                "end_date": iso(45),
            }),
        )?;

        let chassis_id = chassis["id"].as_str().unwrap_or_default();
        let auton_id = auton["id"].as_str().unwrap_or_default();

        let tasks = [
            json!({
                "title": "Build chassis prototype",
                "description": "Construct initial chassis design",
                "category": "FRC",
                "milestone_id": chassis_id,
                "assigned_to": "Alex",
                "status": "In Progress",
                "priority": "High",
                "start_date": iso(-5),
                "due_date": iso(9),
            }),
            json!({
                "title": "Test drivetrain",
                "description": "Verify drivetrain performance under load",
                "category": "FRC",
                "milestone_id": chassis_id,
                "assigned_to": "Casey",
                "status": "Not Started",
                "priority": "Medium",
                "start_date": iso(7),
                "due_date": iso(14),
            }),
            json!({
                "title": "Wire electrical panel",
                "description": "Complete wiring for the control panel",
                "category": "FRC",
                "milestone_id": chassis_id,
                "assigned_to": "Taylor",
                "status": "Blocked",
                "priority": "Critical",
                "start_date": iso(2),
                "due_date": iso(12),
            }),
            json!({
                "title": "Program autonomous mode",
                "description": "Implement autonomous navigation",
                "category": "FRC",
                "milestone_id": auton_id,
                "assigned_to": "Jordan",
                "status": "Not Started",
                "priority": "High",
                "start_date": iso(10),
            }),
            json!({
                "title": "Practice driver skills",
                "description": "Driver practice sessions",
                "category": "FTC",
                "assigned_to": "Jamie",
                "status": "Not Started",
                "priority": "Low",
                "start_date": iso(1),
                "due_date": iso(20),
            }),
        ];
        for task in tasks {
            self.create(Collection::Tasks, task)?;
        }
        Ok(true)
    }
}

impl DocumentStore for LocalStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        self.read_collection(collection)
    }

    fn query(
        &self,
        collection: Collection,
        filters: &[(String, Value)],
    ) -> Result<Vec<Value>, StoreError> {
        let docs = self.read_collection(collection)?;
        Ok(docs
            .into_iter()
            .filter(|doc| {
                filters
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .all(|(field, value)| doc.get(field) == Some(value))
            })
            .collect())
    }

    fn create(&self, collection: Collection, mut data: Value) -> Result<Value, StoreError> {
        let mut docs = self.read_collection(collection)?;
        let now = Utc::now().to_rfc3339();
        if let Some(obj) = data.as_object_mut() {
            obj.insert("id".into(), json!(Uuid::new_v4().to_string()));
            obj.insert("created_at".into(), json!(now));
            obj.insert("updated_at".into(), json!(now));
        }
        docs.push(data.clone());
        self.write_collection(collection, &docs)?;
        Ok(data)
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<Value, StoreError> {
        let mut docs = self.read_collection(collection)?;
        let doc = docs
            .iter_mut()
            .find(|d| d.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.name(),
                id: id.to_string(),
            })?;

        if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
            for (field, value) in fields {
                target.insert(field.clone(), value.clone());
            }
            target.insert("updated_at".into(), json!(Utc::now().to_rfc3339()));
        }
        let updated = doc.clone();
        self.write_collection(collection, &docs)?;
        Ok(updated)
    }

    fn remove(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let mut docs = self.read_collection(collection)?;
        let before = docs.len();
        docs.retain(|d| d.get("id").and_then(Value::as_str) != Some(id));
        if docs.len() == before {
            return Ok(false);
        }
        self.write_collection(collection, &docs)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn create_mints_id_and_stamps_timestamps() {
        let (_dir, store) = store();
        let doc = store
            .create(Collection::Tasks, json!({"title": "Build intake"}))
            .unwrap();

        assert!(doc["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(doc["created_at"].as_str().is_some());
        assert_eq!(doc["created_at"], doc["updated_at"]);

        let all = store.get_all(Collection::Tasks).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["title"], "Build intake");
    }

    #[test]
    fn update_merges_only_the_patched_fields() {
        let (_dir, store) = store();
        let doc = store
            .create(
                Collection::Tasks,
                json!({"title": "Build intake", "status": "Not Started", "priority": "High"}),
            )
            .unwrap();
        let id = doc["id"].as_str().unwrap();

        let updated = store
            .update(Collection::Tasks, id, json!({"status": "In Progress"}))
            .unwrap();

        assert_eq!(updated["status"], "In Progress");
        assert_eq!(updated["title"], "Build intake");
        assert_eq!(updated["priority"], "High");
        assert_eq!(updated["created_at"], doc["created_at"]);
    }

    #[test]
    fn update_missing_document_is_not_found() {
        let (_dir, store) = store();
        let err = store
            .update(Collection::Tasks, "nope", json!({"status": "Completed"}))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn query_filters_by_field_equality_and_skips_null_filters() {
        let (_dir, store) = store();
        store
            .create(Collection::Tasks, json!({"title": "a", "category": "FRC"}))
            .unwrap();
        store
            .create(Collection::Tasks, json!({"title": "b", "category": "FTC"}))
            .unwrap();

        let frc = store
            .query(
                Collection::Tasks,
                &[("category".to_string(), json!("FRC"))],
            )
            .unwrap();
        assert_eq!(frc.len(), 1);
        assert_eq!(frc[0]["title"], "a");

        let all = store
            .query(Collection::Tasks, &[("category".to_string(), Value::Null)])
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let (_dir, store) = store();
        let doc = store
            .create(Collection::Milestones, json!({"name": "Kickoff"}))
            .unwrap();
        let id = doc["id"].as_str().unwrap();

        assert!(store.remove(Collection::Milestones, id).unwrap());
        assert!(!store.remove(Collection::Milestones, id).unwrap());
        assert!(store.get_all(Collection::Milestones).unwrap().is_empty());
    }

    #[test]
    fn seed_runs_once_and_parses_into_models() {
        let (_dir, store) = store();
        assert!(store.seed_if_empty().unwrap());
        assert!(!store.seed_if_empty().unwrap());

        let tasks = store.get_all(Collection::Tasks).unwrap();
        let milestones = store.get_all(Collection::Milestones).unwrap();
        assert!(!tasks.is_empty());
        assert!(!milestones.is_empty());

        for doc in tasks {
            serde_json::from_value::<crate::model::Task>(doc).unwrap();
        }
        for doc in milestones {
            serde_json::from_value::<crate::model::Milestone>(doc).unwrap();
        }
    }
}
