use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// `--json` wins, then an explicit `--format`. Without either, agents
/// reading through a pipe get JSON and people at a terminal get text.
pub fn wants_json(json_flag: bool, format: Option<Format>, stdout_is_terminal: bool) -> bool {
    if json_flag {
        return true;
    }
    match format {
        Some(format) => format == Format::Json,
        None => !stdout_is_terminal,
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Left-aligned columns separated by two spaces. The last column is not
/// padded so long descriptions don't leave trailing whitespace.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render = |cells: Vec<String>| {
        let last = cells.len().saturating_sub(1);
        let padded: Vec<String> = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == last {
                    cell
                } else {
                    let w = widths.get(i).copied().unwrap_or(0);
                    format!("{cell:w$}")
                }
            })
            .collect();
        padded.join("  ")
    };

    println!("{}", render(headers.iter().map(|h| h.to_string()).collect()));
    println!(
        "{}",
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!("{}", render(row));
    }
}

/// A titled bullet list followed by a blank line. Prints nothing when empty.
pub fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{title}:");
    for item in items {
        println!("  - {item}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piped_output_defaults_to_json() {
        assert!(wants_json(false, None, false));
        assert!(!wants_json(false, None, true));
    }

    #[test]
    fn explicit_choice_overrides_detection() {
        assert!(!wants_json(false, Some(Format::Text), false));
        assert!(wants_json(false, Some(Format::Json), true));
        assert!(wants_json(true, Some(Format::Text), true));
    }
}
