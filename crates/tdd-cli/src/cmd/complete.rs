use crate::output::print_json;
use std::path::Path;
use tdd_core::types::TestResult;
use tdd_core::workflow;

pub fn run(root: &Path, test_result: Option<TestResult>, json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    let outcome = workflow::complete_cycle(&mut session, test_result)?;
    super::save_session(&store, &session)?;

    if json {
        return print_json(&outcome);
    }

    let mut from = outcome.from;
    for to in &outcome.path {
        println!("Phase: {from} -> {to}");
        from = *to;
    }
    println!(
        "\nCycle complete: advanced {} phase(s), marked {} spec(s) as done",
        outcome.path.len(),
        outcome.specs_completed
    );
    println!("Next: add more specs or run 'tdd-ai reset' to start over");
    Ok(())
}
