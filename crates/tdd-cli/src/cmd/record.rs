use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use tdd_core::config::Config;
use tdd_core::types::TestResult;
use tdd_core::{testrun, workflow};

pub fn run(
    root: &Path,
    result: Option<TestResult>,
    exit_code: Option<i32>,
    log: Option<&Path>,
    summary: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;

    let mut output = None;
    let result = match (result, exit_code) {
        (Some(r), _) => r,
        (None, Some(code)) => {
            let config = Config::load(root).context("failed to load config")?;
            let text = match log {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read test log {}", path.display()))?,
                None => String::new(),
            };
            let classified =
                testrun::classify(code, &text, config.classify.infra_patterns.as_slice());
            tracing::debug!(exit_code = code, result = %classified, "classified test run");
            if summary {
                output = Some(testrun::summarize(&text, config.classify.summary_lines));
            }
            classified
        }
        (None, None) => anyhow::bail!("provide a test result or --exit-code"),
    };

    workflow::record_test_result(&mut session, result);
    super::save_session(&store, &session)?;

    if json {
        return print_json(&serde_json::json!({
            "result": result,
            "phase": session.phase,
            "output": output,
        }));
    }

    if let Some(text) = &output {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
        println!();
    }
    println!("Test result: {}", result.as_str().to_uppercase());
    if result == TestResult::Error {
        println!("This looks like an infrastructure/environment error, not a test failure.");
        println!("Fix the environment and record a new result.");
    } else {
        println!("Next: run 'tdd-ai phase next' (the recorded result is used automatically)");
    }
    Ok(())
}
