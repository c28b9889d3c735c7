use crate::output::print_json;
use clap::{Arg, ArgAction, Command, CommandFactory};
use serde::Serialize;
use std::path::Path;
use tdd_core::store::{JsonFileStore, SessionStore};
use tdd_core::types::{Mode, Phase};

const WORKFLOW: [&str; 9] = [
    r#"1. tdd-ai init [--retrofit] [--test-cmd "..."]"#,
    r#"2. tdd-ai spec add "desc1" "desc2" ..."#,
    "3. tdd-ai spec pick <id>",
    "4. tdd-ai guide (phase instructions and rules)",
    "5. Write code following the instructions, then run the tests yourself",
    "6. tdd-ai record <pass|fail|error> (or --exit-code N --log FILE)",
    "7. tdd-ai phase next (advance when the phase criteria are met)",
    r#"8. In refactor: tdd-ai refactor reflect <n> --answer "..." for every question"#,
    "9. tdd-ai complete (finish the cycle and mark all specs done)",
];

#[derive(Serialize)]
struct FlagEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<String>,
    description: String,
}

#[derive(Serialize)]
struct CommandEntry {
    name: String,
    description: String,
    usage: String,
    flags: Vec<FlagEntry>,
}

#[derive(Serialize)]
struct SessionSummary {
    phase: Phase,
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_cmd: Option<String>,
    total_specs: usize,
    active_specs: usize,
    done_specs: usize,
}

#[derive(Serialize)]
struct Reference {
    version: &'static str,
    workflow: Vec<&'static str>,
    commands: Vec<CommandEntry>,
    global_flags: Vec<FlagEntry>,
    session: Option<SessionSummary>,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let reference = build(root);
    if json {
        return print_json(&reference);
    }
    print_text(&reference);
    Ok(())
}

fn build(root: &Path) -> Reference {
    let mut cli = crate::Cli::command();
    // Building propagates global args and fills in arities and defaults.
    cli.build();

    Reference {
        version: env!("CARGO_PKG_VERSION"),
        workflow: WORKFLOW.to_vec(),
        commands: command_entries(&cli),
        global_flags: cli
            .get_arguments()
            .filter(|a| documented(a))
            .map(flag_entry)
            .collect(),
        session: session_summary(root),
    }
}

/// One entry per leaf command. Parents whose subcommand is optional (such
/// as `phase`) also get an entry of their own.
fn command_entries(cli: &Command) -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    for cmd in cli.get_subcommands().filter(|c| listed(c)) {
        let name = cmd.get_name();
        if !cmd.has_subcommands() {
            entries.push(entry(name.to_string(), cmd));
            continue;
        }
        if !cmd.is_subcommand_required_set() {
            entries.push(entry(name.to_string(), cmd));
        }
        for sub in cmd.get_subcommands().filter(|c| listed(c)) {
            entries.push(entry(format!("{name} {}", sub.get_name()), sub));
        }
    }
    entries
}

fn listed(cmd: &Command) -> bool {
    !cmd.is_hide_set() && !matches!(cmd.get_name(), "help" | "commands")
}

fn documented(arg: &Arg) -> bool {
    !arg.is_hide_set() && !matches!(arg.get_id().as_str(), "help" | "version")
}

fn entry(name: String, cmd: &Command) -> CommandEntry {
    let args: Vec<&Arg> = cmd
        .get_arguments()
        .filter(|a| documented(a) && !a.is_global_set())
        .collect();

    let mut usage = format!("tdd-ai {name}");
    for arg in args.iter().filter(|a| a.is_positional()) {
        usage.push(' ');
        usage.push_str(&positional_usage(arg));
    }

    CommandEntry {
        name,
        description: cmd.get_about().map(ToString::to_string).unwrap_or_default(),
        usage,
        flags: args
            .into_iter()
            .filter(|a| !a.is_positional())
            .map(flag_entry)
            .collect(),
    }
}

fn value_name(arg: &Arg) -> String {
    arg.get_value_names()
        .and_then(|names| names.first())
        .map(ToString::to_string)
        .unwrap_or_else(|| arg.get_id().as_str().to_uppercase())
}

fn positional_usage(arg: &Arg) -> String {
    let mut usage = format!("<{}>", value_name(arg));
    let repeated = matches!(arg.get_action(), ArgAction::Append)
        || arg.get_num_args().is_some_and(|n| n.max_values() > 1);
    if repeated {
        usage.push_str("...");
    }
    if arg.is_required_set() {
        usage
    } else {
        format!("[{usage}]")
    }
}

fn flag_entry(arg: &Arg) -> FlagEntry {
    let name = match (arg.get_long(), arg.get_short()) {
        (Some(long), _) => format!("--{long}"),
        (None, Some(short)) => format!("-{short}"),
        (None, None) => arg.get_id().to_string(),
    };
    let takes_value = arg.get_action().takes_values();
    FlagEntry {
        name,
        value: takes_value.then(|| value_name(arg)),
        default: arg
            .get_default_values()
            .first()
            .filter(|_| takes_value)
            .map(|v| v.to_string_lossy().into_owned()),
        env: arg.get_env().map(|v| v.to_string_lossy().into_owned()),
        description: arg.get_help().map(ToString::to_string).unwrap_or_default(),
    }
}

/// Summary of the session under `root`. A missing or unreadable document is
/// reported as no session rather than an error.
fn session_summary(root: &Path) -> Option<SessionSummary> {
    let store = JsonFileStore::new(root);
    if !store.exists() {
        return None;
    }
    let session = match store.load() {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable session document");
            return None;
        }
    };
    let active = session.active_specs().len();
    Some(SessionSummary {
        phase: session.phase,
        mode: session.mode,
        test_cmd: session.test_cmd.clone(),
        total_specs: session.specs.len(),
        active_specs: active,
        done_specs: session.specs.len() - active,
    })
}

fn flag_display(flag: &FlagEntry) -> String {
    match &flag.value {
        Some(value) => format!("{} <{value}>", flag.name),
        None => flag.name.clone(),
    }
}

fn print_text(reference: &Reference) {
    println!(
        "tdd-ai {}: red-green-refactor guardrails for AI coding agents\n",
        reference.version
    );

    println!("Workflow:");
    for step in &reference.workflow {
        println!("  {step}");
    }

    println!("\nCommands:");
    for cmd in &reference.commands {
        println!("  {:<18}{}", cmd.name, cmd.description);
        for flag in &cmd.flags {
            println!("  {:<18}  {:<24}{}", "", flag_display(flag), flag.description);
        }
    }

    println!("\nGlobal flags:");
    for flag in &reference.global_flags {
        let mut line = format!("  {:<24}{}", flag_display(flag), flag.description);
        if let Some(env) = &flag.env {
            line.push_str(&format!(" [env: {env}]"));
        }
        println!("{line}");
    }

    println!();
    match &reference.session {
        Some(s) => println!(
            "Session: {} phase, {} mode, {}/{} specs active",
            s.phase, s.mode, s.active_specs, s.total_specs
        ),
        None => println!("Session: none (run 'tdd-ai init' to start)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn find<'a>(entries: &'a [CommandEntry], name: &str) -> &'a CommandEntry {
        entries
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("missing command {name}"))
    }

    #[test]
    fn lists_leaf_commands_and_optional_parents() {
        let dir = TempDir::new().unwrap();
        let reference = build(dir.path());
        let names: Vec<&str> = reference.commands.iter().map(|c| c.name.as_str()).collect();

        assert!(names.contains(&"spec add"));
        assert!(names.contains(&"phase"));
        assert!(names.contains(&"phase next"));
        assert!(names.contains(&"refactor reflect"));
        assert!(names.contains(&"config init"));
        assert!(!names.contains(&"spec"));
        assert!(!names.contains(&"commands"));
        assert!(!names.iter().any(|n| n.ends_with("help")));
        assert!(reference.session.is_none());
    }

    #[test]
    fn usage_and_flags_come_from_the_parser() {
        let dir = TempDir::new().unwrap();
        let reference = build(dir.path());

        let add = find(&reference.commands, "spec add");
        assert_eq!(add.usage, "tdd-ai spec add <DESCRIPTIONS>...");
        assert!(add.flags.is_empty());

        let record = find(&reference.commands, "record");
        assert!(record.usage.starts_with("tdd-ai record [<RESULT>]"));
        let exit_code = record.flags.iter().find(|f| f.name == "--exit-code").unwrap();
        assert!(exit_code.value.is_some());
        let summary = record.flags.iter().find(|f| f.name == "--summary").unwrap();
        assert!(summary.value.is_none());

        let globals: Vec<&str> = reference.global_flags.iter().map(|f| f.name.as_str()).collect();
        assert!(globals.contains(&"--root"));
        assert!(globals.contains(&"--json"));
        assert!(globals.contains(&"--format"));
        assert!(!globals.contains(&"--help"));
        // Global flags are listed once, not under every command.
        assert!(!add.flags.iter().any(|f| f.name == "--root"));
    }
}
