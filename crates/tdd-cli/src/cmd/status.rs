use crate::output::{print_json, print_table};
use serde::Serialize;
use std::path::Path;
use tdd_core::event::Event;
use tdd_core::spec::{self as spec_ops, Spec};
use tdd_core::types::{Mode, Phase};

#[derive(Serialize)]
struct StatusReport<'a> {
    phase: Phase,
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_cmd: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_spec_id: Option<u32>,
    iteration: u32,
    total_specs: usize,
    active_specs: usize,
    done_specs: usize,
    specs: Vec<&'a Spec>,
    #[serde(skip_serializing_if = "no_events")]
    history: &'a [Event],
}

fn no_events(history: &&[Event]) -> bool {
    history.is_empty()
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, session) = super::load_session(root)?;
    let active = session.active_specs().len();

    if json {
        return print_json(&StatusReport {
            phase: session.phase,
            mode: session.mode,
            test_cmd: session.test_cmd.as_deref(),
            current_spec_id: session.current_spec_id,
            iteration: session.iteration,
            total_specs: session.specs.len(),
            active_specs: active,
            done_specs: session.specs.len() - active,
            specs: spec_ops::sorted_by_id(&session.specs),
            history: &session.history,
        });
    }

    println!("Phase: {}", session.phase.as_str().to_uppercase());
    println!("Mode: {}", session.mode);
    if let Some(cmd) = &session.test_cmd {
        println!("Test Command: {cmd}");
    }
    if let Some(spec) = session.current_spec() {
        println!("Current Spec: [{}] {}", spec.id, spec.description);
    }
    if session.iteration > 0 {
        println!("Iteration: {}", session.iteration);
    }
    println!("Specs: {}", spec_ops::summarize(&session.specs));

    if !session.specs.is_empty() {
        println!();
        let rows = spec_ops::sorted_by_id(&session.specs)
            .into_iter()
            .map(|s| {
                let status = if s.is_active() { "active" } else { "done" };
                vec![s.id.to_string(), status.to_string(), s.description.clone()]
            })
            .collect();
        print_table(&["ID", "STATUS", "DESCRIPTION"], rows);
    }

    if !session.history.is_empty() {
        println!("\nHistory:");
        for event in &session.history {
            println!("  {}: {}", event.at.to_rfc3339(), event.summary());
        }
    }
    Ok(())
}
