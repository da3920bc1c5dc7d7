//! Todo list CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use votekv::common::cli::init_tracing;
use votekv::todo::TodoDb;

#[derive(Parser)]
#[command(name = "votekv-todo")]
#[command(about = "File-backed todo list")]
#[command(version)]
struct Cli {
    /// Todo file (created as `[]` if missing)
    #[arg(long, default_value = "./data/todo.json")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item given as JSON, e.g. '{"id": 1, "title": "x", "done": false}'
    Add { json: String },

    /// Replace an existing item given as JSON
    Update { json: String },

    /// Delete an item
    Delete { id: i64 },

    /// Print one item
    Get { id: i64 },

    /// Print every item
    List,

    /// Set an item's done flag
    Status {
        id: i64,

        #[arg(long, action = clap::ArgAction::Set)]
        done: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();

    if let Some(dir) = cli.db.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let db = TodoDb::open(&cli.db)?;

    match cli.command {
        Commands::Add { json } => {
            let item = TodoDb::json_to_item(&json)?;
            db.add_item(item)?;
            println!("Item added");
        }
        Commands::Update { json } => {
            let item = TodoDb::json_to_item(&json)?;
            db.update_item(item)?;
            println!("Item updated");
        }
        Commands::Delete { id } => {
            db.delete_item(id)?;
            println!("Item {} deleted", id);
        }
        Commands::Get { id } => {
            TodoDb::print_item(&db.get_item(id)?)?;
        }
        Commands::List => {
            TodoDb::print_all_items(&db.get_all_items()?)?;
        }
        Commands::Status { id, done } => {
            db.change_item_done_status(id, done)?;
            println!("Item {} marked done={}", id, done);
        }
    }

    Ok(())
}
