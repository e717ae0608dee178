//! Turn a dispatch result into the text printed on stdout.

use super::dispatch::{Dispatched, Output};
use super::format::{
    BoxStyle, Role, StyleOptions, TableOpts, box_header, color, emoji, table,
};
use crate::collections::Outcome;

/// JSON when requested, otherwise boxed headers and tables.
pub fn render(result: &Dispatched, style: &StyleOptions) -> serde_json::Result<String> {
    match (&result.output, result.json) {
        (Output::Version(report), true) => serde_json::to_string_pretty(report),
        (Output::Version(report), false) => Ok(report.to_string()),
        (Output::Outcome(outcome), true) => serde_json::to_string_pretty(outcome),
        (Output::Outcome(outcome), false) => Ok(human(outcome, style)),
    }
}

fn human(outcome: &Outcome, style: &StyleOptions) -> String {
    match outcome {
        Outcome::Resources {
            title,
            columns,
            items,
        } => {
            let line = format!("{} {title} ({})", emoji("list", style), items.len());
            let header = box_header(line.trim_start(), None, style);
            let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|item| columns.iter().map(|c| item.text(c)).collect())
                .collect();
            format!("{header}\n{}", table(&headers, &rows, TableOpts::default(), style))
        }
        Outcome::Task { id, message } => {
            let rounded = StyleOptions {
                box_style: BoxStyle::Rounded,
                ..style.clone()
            };
            let line = format!("{} {message}", emoji("task", style));
            format!(
                "{}\n{} {}",
                box_header(line.trim_start(), None, &rounded),
                color(Role::Dim, "task id:", style),
                color(Role::Success, id, style)
            )
        }
        Outcome::Created { ids, message } => {
            let line = format!("{} {message}", emoji("success", style));
            let mut out = color(Role::Success, line.trim_start(), style);
            for id in ids {
                out.push_str(&format!("\n  id: {id}"));
            }
            out
        }
    }
}
