//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `ranklist_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use ranklist_core::db::open_db_in_memory;
use ranklist_core::{SqliteTaskRepository, TaskService};

fn main() {
    if let Err(err) = run() {
        eprintln!("ranklist smoke run failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("ranklist_core version={}", ranklist_core::core_version());

    let conn = open_db_in_memory()?;
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);

    service.add_task("write release notes")?;
    service.add_task("review release notes")?;
    let shipped = service.add_task("publish release")?;
    service.move_task(shipped.uuid, 0)?;

    for task in service.list_tasks()? {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        println!("{} {} {}", task.order_key, mark, task.title);
    }

    Ok(())
}
