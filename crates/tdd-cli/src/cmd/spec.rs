use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use tdd_core::{spec as spec_ops, workflow};

#[derive(Subcommand)]
pub enum SpecSubcommand {
    /// Add one spec per argument
    Add {
        #[arg(required = true)]
        descriptions: Vec<String>,
    },
    /// List all specs, marking the current one
    List,
    /// Select the spec to work on
    Pick { id: u32 },
    /// Mark specs as completed
    Done {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<u32>,
        /// Complete every active spec
        #[arg(long)]
        all: bool,
    },
}

pub fn run(root: &Path, subcmd: SpecSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SpecSubcommand::Add { descriptions } => add(root, &descriptions, json),
        SpecSubcommand::List => list(root, json),
        SpecSubcommand::Pick { id } => pick(root, id, json),
        SpecSubcommand::Done { ids, all } => done(root, &ids, all, json),
    }
}

fn add(root: &Path, descriptions: &[String], json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    let ids = workflow::add_specs(&mut session, descriptions)?;
    super::save_session(&store, &session)?;

    if json {
        let added: Vec<_> = ids
            .iter()
            .filter_map(|id| session.specs.iter().find(|s| s.id == *id))
            .collect();
        print_json(&serde_json::json!({ "added": added }))?;
    } else {
        for spec in session.specs.iter().filter(|s| ids.contains(&s.id)) {
            println!("Added spec [{}]: {}", spec.id, spec.description);
        }
        if session.current_spec_id.is_none() {
            println!("Next: pick one with 'tdd-ai spec pick {}'", ids[0]);
        }
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, session) = super::load_session(root)?;

    if json {
        print_json(&serde_json::json!({
            "current_spec_id": session.current_spec_id,
            "specs": spec_ops::sorted_by_id(&session.specs),
        }))?;
        return Ok(());
    }

    if session.specs.is_empty() {
        println!("No specs. Add some with 'tdd-ai spec add \"description\"'.");
        return Ok(());
    }

    let rows = spec_ops::sorted_by_id(&session.specs)
        .into_iter()
        .map(|s| {
            let marker = if Some(s.id) == session.current_spec_id {
                "*"
            } else {
                ""
            };
            vec![
                marker.to_string(),
                s.id.to_string(),
                s.status.to_string(),
                s.description.clone(),
            ]
        })
        .collect();
    print_table(&["", "ID", "STATUS", "DESCRIPTION"], rows);
    println!("\nSpecs: {}", spec_ops::summarize(&session.specs));
    Ok(())
}

fn pick(root: &Path, id: u32, json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    workflow::pick_spec(&mut session, id)?;
    super::save_session(&store, &session)?;

    let spec = session.current_spec();
    if json {
        print_json(&serde_json::json!({ "current_spec": spec }))?;
    } else if let Some(spec) = spec {
        println!("Current spec: [{}] {}", spec.id, spec.description);
        println!("Next: run 'tdd-ai guide' for phase instructions");
    }
    Ok(())
}

fn done(root: &Path, ids: &[u32], all: bool, json: bool) -> anyhow::Result<()> {
    let (store, mut session) = super::load_session(root)?;
    let completed = if all {
        let active: Vec<u32> = session.active_specs().iter().map(|s| s.id).collect();
        workflow::complete_all(&mut session)?;
        active
    } else {
        workflow::complete_specs(&mut session, ids)?
    };
    super::save_session(&store, &session)?;

    if json {
        print_json(&serde_json::json!({
            "completed": completed,
            "remaining": session.active_specs().len(),
        }))?;
    } else {
        for id in &completed {
            println!("Completed spec [{id}]");
        }
        println!("Specs: {}", spec_ops::summarize(&session.specs));
    }
    Ok(())
}
