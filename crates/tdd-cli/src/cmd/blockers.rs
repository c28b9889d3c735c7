use crate::output::print_json;
use std::path::Path;
use tdd_core::blockers::get_blockers;
use tdd_core::machine;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, session) = super::load_session(root)?;
    let blockers = get_blockers(&session);
    let can_advance = blockers.is_empty();
    let expected = machine::expected_result(session.phase, session.mode);

    if json {
        return print_json(&serde_json::json!({
            "phase": session.phase,
            "can_advance": can_advance,
            "expected_test_result": expected,
            "blockers": blockers,
        }));
    }

    if can_advance {
        println!("No blockers. Ready to advance: tdd-ai phase next");
        return Ok(());
    }
    println!("Blockers ({}):", session.phase.as_str().to_uppercase());
    for b in &blockers {
        println!("  - {b}");
    }
    Ok(())
}
