use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;
use tdd_core::session::Session;
use tdd_core::types::Phase;
use tdd_core::{workflow, TddError};

#[derive(Subcommand)]
pub enum RefactorSubcommand {
    /// Show every reflection question with its answer
    Status,
    /// Answer a reflection question
    Reflect {
        /// Question number (1-7)
        id: u32,
        /// At least five words
        #[arg(long)]
        answer: String,
    },
}

pub fn run(root: &Path, subcmd: Option<RefactorSubcommand>, json: bool) -> anyhow::Result<()> {
    match subcmd {
        None => summary(root, json),
        Some(RefactorSubcommand::Status) => status(root, json),
        Some(RefactorSubcommand::Reflect { id, answer }) => reflect(root, id, &answer, json),
    }
}

fn load_in_refactor(root: &Path) -> anyhow::Result<Session> {
    let (_, session) = super::load_session(root)?;
    if session.phase != Phase::Refactor {
        return Err(TddError::NotInRefactor(session.phase.to_string()).into());
    }
    Ok(session)
}

fn progress(session: &Session) -> serde_json::Value {
    let total = session.reflections.len();
    let pending = session.pending_reflections().len();
    serde_json::json!({
        "total": total,
        "answered": total - pending,
        "pending": pending,
        "all_answered": session.all_reflections_answered(),
    })
}

fn summary(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = load_in_refactor(root)?;
    if json {
        return print_json(&progress(&session));
    }

    let total = session.reflections.len();
    if total == 0 {
        println!("No reflection questions loaded.");
        return Ok(());
    }
    let pending = session.pending_reflections().len();
    println!("Reflections: {}/{total} answered", total - pending);
    if pending > 0 {
        println!("Run 'tdd-ai refactor status' to see all questions");
    } else {
        println!("All reflection questions answered. Ready to advance.");
    }
    Ok(())
}

fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = load_in_refactor(root)?;
    if json {
        let mut value = progress(&session);
        value["reflections"] = serde_json::to_value(&session.reflections)?;
        return print_json(&value);
    }

    let total = session.reflections.len();
    let pending = session.pending_reflections().len();
    println!("Reflections ({}/{total} answered):", total - pending);
    for r in &session.reflections {
        let state = if r.is_answered() { "answered" } else { "pending" };
        println!("  [{}] ({state}) {}", r.id, r.question);
        if r.is_answered() {
            println!("      -> {:?}", r.answer);
        }
    }
    if pending > 0 {
        println!("\nAnswer with: tdd-ai refactor reflect <number> --answer \"your response\"");
    }
    Ok(())
}

fn reflect(root: &Path, id: u32, answer: &str, json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    workflow::answer_reflection(&mut session, id, answer)?;
    super::save_session(&store, &session)?;

    let pending = session.pending_reflections().len();
    if json {
        print_json(&serde_json::json!({ "answered": id, "remaining": pending }))?;
    } else {
        println!("Answered question {id}. {pending} remaining.");
    }
    Ok(())
}
