use crate::output::{print_json, print_section};
use std::path::Path;
use tdd_core::guidance;
use tdd_core::spec::sorted_by_id;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, session) = super::load_session(root)?;
    let g = guidance::generate(&session);

    if json {
        return print_json(&g);
    }

    println!("Phase: {}", g.phase.as_str().to_uppercase());
    println!("Mode: {}", g.mode);
    if let Some(next) = g.next_phase {
        println!("Next Phase: {}", next.as_str().to_uppercase());
    }
    if let Some(cmd) = &g.test_cmd {
        println!("Test Command: {cmd}");
    }
    if let Some(spec) = &g.current_spec {
        println!("Current Spec: [{}] {}", spec.id, spec.description);
    }
    if g.iteration > 0 {
        println!("Iteration: {}", g.iteration);
    }
    if let Some(expected) = g.expected_test_result {
        println!("Expected Test Result: {expected}");
    }
    println!();

    let specs: Vec<String> = sorted_by_id(&g.specs)
        .into_iter()
        .map(|s| format!("[{}] {}", s.id, s.description))
        .collect();
    print_section("Active Specs", &specs);
    print_section("Instructions", &g.instructions);
    print_section("Rules", &g.rules);
    print_section("Blockers", &g.blockers);

    if !g.reflections.is_empty() {
        let answered = g.reflections.iter().filter(|r| r.is_answered()).count();
        println!("Reflections ({answered}/{} answered):", g.reflections.len());
        for r in &g.reflections {
            let state = if r.is_answered() { "answered" } else { "pending" };
            println!("  [{}] ({state}) {}", r.id, r.question);
        }
        println!();
    }
    Ok(())
}
