//! shiver-runner: headless roster tool for the Planet Shark Shiver Builder.
//!
//! Usage:
//!   shiver-runner --validate my_shiver.shiver.json
//!   shiver-runner --summary my_shiver.shiver.json --data-dir ./data
//!   shiver-runner --export-name my_shiver.shiver.json
//!   shiver-runner --ipc-mode

use anyhow::{bail, Context, Result};
use shiver_core::{
    command::{CommandOutcome, RosterCommand},
    config::Catalog,
    engine::RosterEngine,
    roster::Roster,
    snapshot::export_file_name,
    summary::ShiverSummary,
    types::Points,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Command { command: RosterCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    roster: &'a Roster,
    points_remaining: Points,
    selected: Option<usize>,
    export_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CommandOutcome>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let catalog = Arc::new(Catalog::load(data_dir)?);
    let mut engine = RosterEngine::new(catalog);

    if args.iter().any(|a| a == "--ipc-mode") {
        return run_ipc_loop(&mut engine);
    }

    if let Some(path) = flag_value(&args, "--validate") {
        load_roster(&mut engine, path)?;
        return validate(&engine, path);
    }

    if let Some(path) = flag_value(&args, "--summary") {
        load_roster(&mut engine, path)?;
        let summary = ShiverSummary::build(&engine)?;
        print!("{summary}");
        return Ok(());
    }

    if let Some(path) = flag_value(&args, "--export-name") {
        load_roster(&mut engine, path)?;
        println!("{}", export_file_name(&engine.roster().shiver_name));
        return Ok(());
    }

    println!("shiver-runner: nothing to do");
    println!("  --validate FILE | --summary FILE | --export-name FILE | --ipc-mode");
    println!("  [--data-dir DIR]  (default ./data)");
    Ok(())
}

fn load_roster(engine: &mut RosterEngine, path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    engine.import_json(&text)?;
    Ok(())
}

fn validate(engine: &RosterEngine, path: &str) -> Result<()> {
    let roster = engine.roster();
    println!("=== {path} ===");
    println!("  shiver:   {}", roster.shiver_name);
    println!("  units:    {}", roster.units.len());
    println!("  points:   {}/{}", roster.points_used, roster.total_points);

    let export_errors = engine.validate_for_export().err().unwrap_or_default();
    let violations = engine.check_invariants();

    for e in &export_errors {
        println!("  ERROR     {e}");
    }
    for v in &violations {
        println!("  VIOLATION {v}");
    }

    let problems = export_errors.len() + violations.len();
    if problems > 0 {
        bail!("{path}: {problems} problem(s) found");
    }
    println!("  OK");
    Ok(())
}

fn run_ipc_loop(engine: &mut RosterEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let state = build_ui_state(engine, None);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::Command { command } => match engine.apply(command) {
                Ok(outcome) => {
                    let state = build_ui_state(engine, Some(outcome));
                    writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
                }
                Err(e) => {
                    log::debug!("command rejected: {e}");
                    write_error(&mut stdout, &e.to_string())?;
                }
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &RosterEngine, outcome: Option<CommandOutcome>) -> UiState<'_> {
    let export_errors = engine
        .validate_for_export()
        .err()
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect();

    UiState {
        roster: engine.roster(),
        points_remaining: engine.points_remaining(),
        selected: engine.selected_index(),
        export_errors,
        outcome,
    }
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
