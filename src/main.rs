//! Terminal front-end for the sleuth game engine.
//!
//! Stands in for the graphical UI collaborator: a read-eval-print loop that
//! shows the active case, runs whatever SQL the player types, and prints the
//! verdict. Dot-commands cover the non-query actions.

use std::io::{self, BufRead, Write};

use tracing::info;
use tracing_subscriber::EnvFilter;

use sleuth::error::Result;
use sleuth::gateway::QueryResult;
use sleuth::session::Session;
use sleuth::settings::Settings;
use sleuth::storage::{MemorySlots, SqliteSlots};

fn main() {
    if let Err(error) = run() {
        eprintln!("sleuth: {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Settings::load().unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut session = match &settings.storage_path {
        Some(path) => {
            info!(%path, "opening file-backed slots");
            Session::open(SqliteSlots::open(path)?)?
        }
        None => Session::open(MemorySlots::new())?,
    };

    println!("sleuth – an investigation in SQL");
    println!("type .help for commands, or a query to get to work");
    print_case(&session);

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => (),
            Err(error) => {
                eprintln!("input error: {}", error);
                break;
            }
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            ".quit" | ".exit" => break,
            ".help" => print_help(),
            ".case" => print_case(&session),
            ".tables" => println!("unlocked: {}", session.unlocked_tables().join(", ")),
            ".board" => print_board(&session),
            ".reset" => {
                session.hard_reset()?;
                println!("everything wiped, back to the first case");
                print_case(&session);
            }
            sql => match session.run_query(sql) {
                Ok(report) => {
                    print_result(&report.result);
                    if let Some(outcome) = report.outcome {
                        let solved = outcome.is_solved();
                        println!("{}", outcome);
                        if solved {
                            print_case(&session);
                        }
                    }
                }
                Err(error) => println!("{}", error),
            },
        }
    }
    Ok(())
}

fn print_help() {
    println!(".case    show the active case");
    println!(".tables  list unlocked tables");
    println!(".board   show the evidence board");
    println!(".reset   wipe all progress");
    println!(".quit    leave");
    println!("anything else is run as SQL");
}

fn print_case(session: &Session) {
    match session.active_case() {
        Some(case) => {
            println!();
            println!("Case {}: {}", case.id, case.title);
            println!("{}", case.story);
            println!("Task: {}", case.task);
        }
        None => println!("All cases are closed. The city sleeps a little easier."),
    }
}

fn print_board(session: &Session) {
    let entries = session.history_entries();
    if entries.is_empty() {
        println!("the board is empty");
        return;
    }
    for entry in entries {
        let context = match entry.case_id {
            Some(case_id) => format!("case {}", case_id),
            None => "no case".to_string(),
        };
        println!(
            "[{}] ({}, {} rows) {}",
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            context,
            entry.row_count,
            entry.query
        );
    }
}

fn print_result(result: &QueryResult) {
    if result.columns.is_empty() {
        println!("(no columns)");
        return;
    }
    println!("{}", result.columns.join(" | "));
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        println!("{}", cells.join(" | "));
    }
    println!("({} rows)", result.row_count());
}
