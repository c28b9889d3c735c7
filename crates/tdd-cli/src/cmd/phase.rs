use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;
use tdd_core::types::{Phase, TestResult};
use tdd_core::workflow;

#[derive(Subcommand)]
pub enum PhaseSubcommand {
    /// Advance to the next phase of the cycle
    Next {
        /// Test outcome to use instead of the recorded one
        #[arg(long)]
        test_result: Option<TestResult>,
    },
    /// Jump to a phase, bypassing the normal progression
    Set { phase: Phase },
}

pub fn run(root: &Path, subcmd: Option<PhaseSubcommand>, json: bool) -> anyhow::Result<()> {
    match subcmd {
        None => show(root, json),
        Some(PhaseSubcommand::Next { test_result }) => next(root, test_result, json),
        Some(PhaseSubcommand::Set { phase }) => set(root, phase, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, session) = super::load_session(root)?;
    if json {
        print_json(&serde_json::json!({ "phase": session.phase, "mode": session.mode }))?;
    } else {
        println!("{}", session.phase);
    }
    Ok(())
}

fn next(root: &Path, test_result: Option<TestResult>, json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    if test_result.is_none() {
        if let Some(stored) = session.last_test_result {
            tracing::debug!(result = %stored, "using recorded test result");
        }
    }

    let outcome = workflow::advance(&mut session, test_result)?;
    super::save_session(&store, &session)?;

    if json {
        return print_json(&outcome);
    }
    println!("Phase: {} -> {}", outcome.from, outcome.to);
    if let Some(id) = outcome.completed_spec {
        println!("Completed spec [{id}] (iteration {})", outcome.iteration);
    }
    if outcome.reflections_loaded {
        println!("Answer the reflection questions before leaving refactor: tdd-ai refactor status");
    }
    match outcome.to {
        Phase::Done => println!("Cycle complete. Add more specs to continue, or 'tdd-ai reset' to start over."),
        Phase::Red if session.current_spec_id.is_none() => {
            if let Some(spec) = session.active_specs().first() {
                println!("Next: pick the next spec, e.g. 'tdd-ai spec pick {}'", spec.id);
            }
        }
        _ => println!("Next: run 'tdd-ai guide' for phase instructions"),
    }
    Ok(())
}

fn set(root: &Path, phase: Phase, json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    let outcome = workflow::set_phase(&mut session, phase)?;
    if !outcome.follows_table {
        tracing::warn!(
            from = %outcome.from,
            to = %outcome.to,
            "manual phase override outside the normal progression"
        );
    }
    super::save_session(&store, &session)?;

    if json {
        return print_json(&outcome);
    }
    println!("Phase set to: {}", outcome.to);
    println!("Next: run 'tdd-ai guide' for phase instructions");
    Ok(())
}
