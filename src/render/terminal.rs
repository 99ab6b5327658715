//! Coloured terminal adapter used by the interactive shell.
//!
//! Functions return strings rather than printing so callers decide where
//! output goes. Colour follows `colored`'s global override, which the shell
//! turns off when stdout is not a terminal.

use colored::{ColoredString, Colorize};

use super::{CardView, appointment_view, doctor_options, inventory_view, prescription_view};
use crate::chat::format::{Block, Inline, ListEntry, format_reply};
use crate::chat::{ChatEntry, EntryKind};
use crate::notify::{Notification, Severity};
use crate::state::{AppState, Region, RegionContent};

fn inlines(nodes: &[Inline], indent: &str) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Inline::Text(t) => out.push_str(t),
            Inline::Bold(t) => out.push_str(&t.bold().to_string()),
            Inline::Italic(t) => out.push_str(&t.italic().to_string()),
            Inline::LineBreak => {
                out.push('\n');
                out.push_str(indent);
            }
        }
    }
    out
}

pub fn blocks(blocks: &[Block], indent: &str) -> String {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph(content) => lines.push(format!("{indent}{}", inlines(content, indent))),
            Block::List { ordered, entries } => {
                let mut number = 0;
                for entry in entries {
                    match entry {
                        ListEntry::Item(content) => {
                            number += 1;
                            let marker = if *ordered {
                                format!("{number}.")
                            } else {
                                "•".to_string()
                            };
                            lines.push(format!("{indent}  {marker} {}", inlines(content, indent)));
                        }
                        ListEntry::Loose(content) => {
                            lines.push(format!("{indent}    {}", inlines(content, indent)));
                        }
                    }
                }
            }
        }
    }
    lines.join("\n")
}

pub fn chat_entry(entry: &ChatEntry) -> String {
    match entry.kind {
        EntryKind::User => format!("{} {}", "you ›".cyan().bold(), entry.text),
        EntryKind::Assistant => format!(
            "{}\n{}",
            "assistant ›".green().bold(),
            blocks(&format_reply(&entry.text), "  ")
        ),
        EntryKind::Error => format!("{} {}", "✗".red().bold(), entry.text.red()),
    }
}

pub fn card(view: &CardView) -> String {
    let mut out = format!("  {}", view.title.bold());
    if let Some(badge) = &view.badge {
        out.push_str(&format!("  [{}]", status_color(&badge.class, &badge.text)));
    }
    for fact in &view.facts {
        out.push_str(&format!("\n    {} {}", format!("{}:", fact.label).dimmed(), fact.value));
    }
    if !view.actions.is_empty() {
        let actions: Vec<String> = view
            .actions
            .iter()
            .map(|(action, id)| format!("{} {id}", action.label().to_ascii_lowercase()))
            .collect();
        out.push_str(&format!("\n    {} {}", "actions:".dimmed(), actions.join(" | ").yellow()));
    }
    out
}

fn status_color(class: &str, text: &str) -> ColoredString {
    match class {
        "scheduled" | "pending" => text.yellow(),
        "confirmed" | "active" | "approved" => text.cyan(),
        "completed" | "dispensed" | "fulfilled" => text.green(),
        "cancelled" => text.red(),
        _ => text.normal(),
    }
}

pub fn region(region: Region, content: Option<&RegionContent>) -> String {
    let mut out = format!("{}", region.title().bold().cyan());
    let Some(content) = content else {
        out.push_str(&format!("\n  {}", "(not loaded)".dimmed()));
        return out;
    };
    let cards: Vec<String> = match content {
        RegionContent::Empty(empty) => vec![format!("  {}", empty.message.dimmed())],
        RegionContent::Appointments(cards) => cards.iter().map(|c| card(&appointment_view(c))).collect(),
        RegionContent::Prescriptions(cards) => cards.iter().map(|c| card(&prescription_view(c))).collect(),
        RegionContent::Inventory(items) => items.iter().map(|i| card(&inventory_view(i))).collect(),
        RegionContent::Doctors(doctors) => doctor_options(doctors)
            .into_iter()
            .map(|(id, label)| {
                if id.is_empty() {
                    format!("  {}", label.dimmed())
                } else {
                    format!("  {} {}", id.yellow(), label)
                }
            })
            .collect(),
    };
    out.push('\n');
    out.push_str(&cards.join("\n"));
    out
}

pub fn toast(notification: &Notification) -> String {
    match notification.severity {
        Severity::Success => format!("{} {}", "✓".green().bold(), notification.message),
        Severity::Error => format!("{} {}", "✗".red().bold(), notification.message),
        Severity::Info => format!("{} {}", "·".cyan().bold(), notification.message),
    }
}

pub fn page(state: &AppState) -> String {
    let page = state.page();
    let mut sections = Vec::new();

    let mut header = format!("{}", page.title().bold().cyan());
    if let Some(name) = state.nav_label() {
        header.push_str(&format!("  {}", format!("signed in as {name}").dimmed()));
    }
    if let Some(headline) = state.headline() {
        header.push_str(&format!("\n{}", headline.bold()));
    }
    sections.push(header);

    let stats = state.visible_stats();
    if !stats.is_empty() {
        let line: Vec<String> = stats
            .iter()
            .map(|(stat, value)| format!("{} {}", value.to_string().bold(), stat.label().dimmed()))
            .collect();
        sections.push(format!("  {}", line.join("   ")));
    }

    for (r, content) in state.visible_regions() {
        sections.push(region(r, content));
    }
    sections.join("\n\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
