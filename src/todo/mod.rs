//! File-backed todo list
//!
//! A single JSON array on disk, loaded in full for every operation and
//! rewritten in full after every change. Used by the `votekv-todo` binary.

pub mod db;

pub use db::{ToDoItem, TodoDb};
