//! Todo store over a flat JSON file

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoItem {
    pub id: i64,
    pub title: String,
    #[serde(rename = "done")]
    pub is_done: bool,
}

impl ToDoItem {
    pub fn new(id: i64, title: impl Into<String>, is_done: bool) -> Self {
        Self {
            id,
            title: title.into(),
            is_done,
        }
    }
}

/// Handle on a todo file. Holds no items between calls; concurrent writers
/// race with last-writer-wins.
#[derive(Debug, Clone)]
pub struct TodoDb {
    path: PathBuf,
}

impl TodoDb {
    /// Open `path`, creating it as an empty list (`[]`) if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            fs::write(&path, "[]")?;
            tracing::debug!(path = %path.display(), "created todo file");
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<i64, ToDoItem>> {
        let data = fs::read_to_string(&self.path)?;
        let items: Vec<ToDoItem> = serde_json::from_str(&data)?;
        Ok(items.into_iter().map(|item| (item.id, item)).collect())
    }

    fn save(&self, items: &BTreeMap<i64, ToDoItem>) -> Result<()> {
        let list: Vec<&ToDoItem> = items.values().collect();
        fs::write(&self.path, serde_json::to_string_pretty(&list)?)?;
        Ok(())
    }

    pub fn add_item(&self, item: ToDoItem) -> Result<()> {
        let mut items = self.load()?;
        if items.contains_key(&item.id) {
            return Err(Error::already_exists("todo item", item.id));
        }
        items.insert(item.id, item);
        self.save(&items)
    }

    pub fn delete_item(&self, id: i64) -> Result<()> {
        let mut items = self.load()?;
        if items.remove(&id).is_none() {
            return Err(Error::not_found("todo item", id));
        }
        self.save(&items)
    }

    pub fn update_item(&self, item: ToDoItem) -> Result<()> {
        let mut items = self.load()?;
        match items.get_mut(&item.id) {
            Some(existing) => *existing = item,
            None => return Err(Error::not_found("todo item", item.id)),
        }
        self.save(&items)
    }

    pub fn get_item(&self, id: i64) -> Result<ToDoItem> {
        self.load()?
            .remove(&id)
            .ok_or_else(|| Error::not_found("todo item", id))
    }

    /// All items, ordered by id.
    pub fn get_all_items(&self) -> Result<Vec<ToDoItem>> {
        Ok(self.load()?.into_values().collect())
    }

    /// Read, flip, write back. Two full passes over the file.
    pub fn change_item_done_status(&self, id: i64, done: bool) -> Result<()> {
        let mut item = self.get_item(id)?;
        item.is_done = done;
        self.update_item(item)
    }

    pub fn json_to_item(json: &str) -> Result<ToDoItem> {
        serde_json::from_str(json)
            .map_err(|e| Error::Validation(format!("invalid todo item {:?}: {}", json, e)))
    }

    pub fn print_item(item: &ToDoItem) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(item)?);
        Ok(())
    }

    pub fn print_all_items(items: &[ToDoItem]) -> Result<()> {
        for item in items {
            Self::print_item(item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, TodoDb) {
        let dir = TempDir::new().unwrap();
        let db = TodoDb::open(dir.path().join("todo.json")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_open_creates_empty_list() {
        let (_dir, db) = open_temp();
        assert_eq!(fs::read_to_string(db.path()).unwrap(), "[]");
        assert!(db.get_all_items().unwrap().is_empty());
    }

    #[test]
    fn test_open_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        fs::write(&path, r#"[{"id": 3, "title": "kept", "done": false}]"#).unwrap();

        let db = TodoDb::open(&path).unwrap();
        assert_eq!(db.get_item(3).unwrap().title, "kept");
    }

    #[test]
    fn test_add_and_change_status() {
        let (_dir, db) = open_temp();
        db.add_item(ToDoItem::new(99, "sample item", true)).unwrap();
        assert_eq!(
            db.get_all_items().unwrap(),
            vec![ToDoItem::new(99, "sample item", true)]
        );

        db.change_item_done_status(99, false).unwrap();
        assert!(!db.get_item(99).unwrap().is_done);
    }

    #[test]
    fn test_duplicate_and_missing_items() {
        let (_dir, db) = open_temp();
        db.add_item(ToDoItem::new(1, "a", false)).unwrap();

        assert!(matches!(
            db.add_item(ToDoItem::new(1, "b", false)).unwrap_err(),
            Error::AlreadyExists(_)
        ));
        assert!(db.get_item(2).unwrap_err().is_not_found());
        assert!(db.delete_item(2).unwrap_err().is_not_found());
        assert!(db
            .update_item(ToDoItem::new(2, "x", true))
            .unwrap_err()
            .is_not_found());
        assert!(db.change_item_done_status(2, true).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_delete_and_ordering() {
        let (_dir, db) = open_temp();
        for id in [5, 1, 3] {
            db.add_item(ToDoItem::new(id, format!("item {}", id), false))
                .unwrap();
        }
        let ids: Vec<i64> = db.get_all_items().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);

        db.update_item(ToDoItem::new(3, "renamed", true)).unwrap();
        assert_eq!(db.get_item(3).unwrap(), ToDoItem::new(3, "renamed", true));

        db.delete_item(1).unwrap();
        assert_eq!(db.get_all_items().unwrap().len(), 2);
    }

    #[test]
    fn test_file_is_a_pretty_json_array() {
        let (_dir, db) = open_temp();
        db.add_item(ToDoItem::new(7, "ünïcode", true)).unwrap();

        let raw = fs::read_to_string(db.path()).unwrap();
        assert!(raw.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"id": 7, "title": "ünïcode", "done": true}])
        );
    }

    #[test]
    fn test_json_to_item() {
        let item = TodoDb::json_to_item(r#"{"id": 4, "title": "t", "done": true}"#).unwrap();
        assert_eq!(item, ToDoItem::new(4, "t", true));
        assert!(matches!(
            TodoDb::json_to_item("{not json").unwrap_err(),
            Error::Validation(_)
        ));
    }
}
