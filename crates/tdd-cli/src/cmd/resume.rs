use crate::output::{print_json, print_section};
use std::path::Path;
use tdd_core::guidance;
use tdd_core::types::Phase;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, session) = super::load_session(root)?;
    let cp = guidance::checkpoint(&session);

    if json {
        return print_json(&cp);
    }

    println!("=== TDD Session Checkpoint ===");
    let mut header = format!(
        "Phase: {} | Mode: {}",
        cp.phase.as_str().to_uppercase(),
        cp.mode
    );
    if cp.iteration > 0 {
        header.push_str(&format!(" | Iteration: {}", cp.iteration));
    }
    println!("{header}");
    match &cp.current_spec {
        Some(spec) => println!("Working on: [{}] {}", spec.id, spec.description),
        None if cp.phase == Phase::Red && !session.active_specs().is_empty() => {
            println!("Working on: (no spec selected)")
        }
        None => {}
    }
    if cp.remaining_specs > 0 {
        println!("Remaining specs: {}", cp.remaining_specs);
    }
    println!();

    print_section("BLOCKERS", &cp.blockers);
    println!("NEXT ACTION:\n  {}", cp.next_action);

    if !cp.recent_events.is_empty() {
        println!("\nRecent events:");
        for event in &cp.recent_events {
            println!("  {}", event.summary());
        }
    }
    Ok(())
}
