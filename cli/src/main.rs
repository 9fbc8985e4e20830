//! Terminal front end for the task service.
//!
//! Each invocation loads the list, performs one action through
//! `TaskManager`, then prints notifications, the rendered list and progress.

mod transport;
mod view;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::thread;

use clap::{Parser, Subcommand};
use task_core::{NotificationKind, Outgoing, Task, TaskClient, TaskManager, ViewFilter};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use transport::{drive, Transport};

#[derive(Parser)]
#[command(name = "tasks")]
#[command(about = "Manage tasks on a task server")]
struct Cli {
    /// Base URL of the task server.
    #[arg(long, global = true, env = "TASKS_API_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,
    /// Which tasks to show after the action.
    #[arg(long, global = true, default_value_t = ViewFilter::All)]
    filter: ViewFilter,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the task list (the default).
    List,
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "personal")]
        category: String,
    },
    /// Flip a task between pending and completed.
    Toggle { id: Uuid },
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Print aggregate counts from the server.
    Stats,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn confirm_delete(task: &Task) -> bool {
    print!("Delete {:?}? [y/N] ", task.title);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn known(manager: &TaskManager, id: Uuid) -> Result<(), String> {
    if manager.tasks().iter().any(|t| t.id == id) {
        Ok(())
    } else {
        Err(format!("no task with id {id}"))
    }
}

/// Turn the subcommand into at most one request. Ids that are not in the
/// loaded list are errors; a declined delete sends nothing.
fn dispatch(
    manager: &mut TaskManager,
    command: Option<Command>,
    confirm: impl FnOnce(&Task) -> bool,
) -> Result<Option<Outgoing>, String> {
    let outgoing = match command {
        None | Some(Command::List) | Some(Command::Stats) => None,
        Some(Command::Add {
            title,
            description,
            category,
        }) => manager.add(&title, &description, &category),
        Some(Command::Toggle { id }) => {
            known(manager, id)?;
            manager.toggle(id)
        }
        Some(Command::Edit {
            id,
            title,
            description,
            category,
        }) => {
            known(manager, id)?;
            manager.edit(id);
            if let Some(buffer) = manager.edit_buffer_mut() {
                if let Some(title) = title {
                    buffer.title = title;
                }
                if let Some(description) = description {
                    buffer.description = description;
                }
                if let Some(category) = category {
                    buffer.category = category;
                }
            }
            manager.save_edit()
        }
        Some(Command::Delete { id, yes }) => {
            known(manager, id)?;
            manager.delete(id, |task| yes || confirm(task))
        }
    };
    Ok(outgoing)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let transport = Transport::new();
    let client = TaskClient::new(&cli.base_url);

    if let Some(Command::Stats) = cli.command {
        return match client.parse_task_stats(transport.execute(client.build_task_stats())) {
            Ok(stats) => {
                print!("{}", view::stats(&stats));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut manager = TaskManager::new(client);
    manager.set_filter(cli.filter);
    let run = |manager: &mut TaskManager, outgoing| {
        drive(manager, outgoing, |req| transport.execute(req), thread::sleep)
    };

    let load = manager.load();
    run(&mut manager, load);

    let outgoing = match dispatch(&mut manager, cli.command, confirm_delete) {
        Ok(outgoing) => outgoing,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(outgoing) = outgoing {
        run(&mut manager, outgoing);
    }

    let mut failed = false;
    for note in manager.take_notifications() {
        failed |= note.kind == NotificationKind::Error;
        eprintln!("{}", view::notification(&note));
    }
    print!("{}", view::list(&manager.render(), manager.current_filter()));
    println!("{}", view::progress(&manager.progress()));

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
