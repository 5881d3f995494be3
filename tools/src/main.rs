//! chat-runner: headless dialogue runner for the support desk.
//!
//! Usage:
//!   chat-runner --db chat.db
//!   chat-runner --script "2|9876543210|1234|1|no|yes"
//!   chat-runner --script "..." --json
//!   chat-runner --config desk.json

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use supportdesk_core::{
    config::SupportConfig,
    machine::{SupportDesk, Turn},
    policy::StaticPolicyStore,
    store::SupportStore,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let script = args
        .windows(2)
        .find(|w| w[0] == "--script")
        .map(|w| w[1].clone());
    let json = args.iter().any(|a| a == "--json");
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => SupportConfig::from_json_file(Path::new(&w[1]))?,
        None => SupportConfig::default(),
    };

    // For :memory: use a SQLite shared-memory URI so the desk's
    // directory connection and the trace writer share one database.
    let db_effective: String = if db == ":memory:" {
        format!(
            "file:chat_{}?mode=memory&cache=shared",
            chrono::Utc::now().timestamp_millis()
        )
    } else {
        db.to_string()
    };

    let store = SupportStore::open(&db_effective)?
        .with_suspicious_threshold(config.suspicious_score_threshold);
    store.migrate()?;
    if store.customer_count()? == 0 {
        store.seed_demo_data()?;
    }

    // Separate connection for persisting traces; the desk owns the
    // directory connection.
    let trace_store = store.reopen()?;
    let mut desk = SupportDesk::new(
        config,
        Box::new(store),
        Box::new(StaticPolicyStore::default()),
    );
    let session_id = desk.session().session_id.clone();
    log::info!("session {session_id} started against {db_effective}");

    println!("Welcome to card support!\n");
    println!("Please select an option:");
    println!("1. General Enquiry (Reward points, Statement, Credit limit, etc.)");
    println!("2. Fraud Transaction (Report suspicious transaction)\n");
    println!("Type **1** or **2** to continue. Type 'quit' to leave.\n");

    match script {
        Some(script) => run_script(&mut desk, &trace_store, &session_id, &script, json)?,
        None => run_interactive(&mut desk, &trace_store, &session_id, json)?,
    }

    let recorded = trace_store.trace_count(&session_id)?;
    println!("\n[{recorded} trace entries recorded for session {session_id}]");
    Ok(())
}

/// Pipe-separated scripted turns, printed as a transcript.
fn run_script(
    desk: &mut SupportDesk,
    trace_store: &SupportStore,
    session_id: &str,
    script: &str,
    json: bool,
) -> Result<()> {
    for input in script.split('|') {
        let input = input.trim();
        println!("> {input}");
        let turn = desk.process(input)?;
        print_turn(trace_store, session_id, &turn, json)?;
    }
    Ok(())
}

fn run_interactive(
    desk: &mut SupportDesk,
    trace_store: &SupportStore,
    session_id: &str,
    json: bool,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") {
            break;
        }
        let turn = desk.process(input)?;
        print_turn(trace_store, session_id, &turn, json)?;
    }
    Ok(())
}

fn print_turn(
    trace_store: &SupportStore,
    session_id: &str,
    turn: &Turn,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&turn.trace)?);
    } else {
        println!("{}\n", turn.response);
    }
    trace_store.append_trace(session_id, &turn.trace)?;
    Ok(())
}
