//! Runs the `votekv-todo` binary against a temp file

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

fn todo(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_votekv-todo"))
        .arg("--db")
        .arg(db)
        .args(args)
        .output()
        .unwrap()
}

fn file_contents(db: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(db).unwrap()).unwrap()
}

#[test]
fn test_add_then_change_status() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("todo.json");

    let out = todo(&db, &["add", r#"{"id": 99, "title": "sample item", "done": true}"#]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        file_contents(&db),
        json!([{"id": 99, "title": "sample item", "done": true}])
    );

    let out = todo(&db, &["status", "99", "--done", "false"]);
    assert!(out.status.success());

    let out = todo(&db, &["get", "99"]);
    assert!(out.status.success());
    let item: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(item["done"], false);
}

#[test]
fn test_missing_item_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("todo.json");

    let out = todo(&db, &["delete", "4"]);
    assert!(!out.status.success());
    assert_eq!(std::fs::read_to_string(&db).unwrap(), "[]");

    let out = todo(&db, &["add", "not json"]);
    assert!(!out.status.success());
}

#[test]
fn test_list_prints_items_in_id_order() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("todo.json");

    todo(&db, &["add", r#"{"id": 2, "title": "second", "done": false}"#]);
    todo(&db, &["add", r#"{"id": 1, "title": "first", "done": false}"#]);

    let out = todo(&db, &["list"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let first = stdout.find("\"first\"").unwrap();
    let second = stdout.find("\"second\"").unwrap();
    assert!(first < second);
}
