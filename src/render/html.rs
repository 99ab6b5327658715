//! HTML fragment adapter.
//!
//! Every piece of text that came from the backend or the user passes through
//! [`escape_html`]; no raw markup is ever forwarded. Action buttons carry
//! `data-action` and `data-id` attributes for the host page to bind.

use std::fmt::Write;

use super::{CardView, appointment_view, doctor_options, inventory_view, prescription_view};
use crate::chat::format::{Block, Inline, ListEntry, format_reply};
use crate::chat::{ChatEntry, EntryKind};
use crate::notify::Notification;
use crate::state::{AppState, EmptyState, Region, RegionContent};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

fn inlines(nodes: &[Inline]) -> String {
    nodes
        .iter()
        .map(|node| match node {
            Inline::Text(t) => escape_html(t),
            Inline::Bold(t) => format!("<strong>{}</strong>", escape_html(t)),
            Inline::Italic(t) => format!("<em>{}</em>", escape_html(t)),
            Inline::LineBreak => "<br>".to_string(),
        })
        .collect()
}

pub fn blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Paragraph(content) => {
                let _ = write!(html, "<p>{}</p>", inlines(content));
            }
            Block::List { ordered, entries } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let _ = write!(html, "<{tag}>");
                for entry in entries {
                    match entry {
                        ListEntry::Item(content) => {
                            let _ = write!(html, "<li>{}</li>", inlines(content));
                        }
                        ListEntry::Loose(content) => {
                            let _ = write!(html, "<li class=\"loose\">{}</li>", inlines(content));
                        }
                    }
                }
                let _ = write!(html, "</{tag}>");
            }
        }
    }
    html
}

/// Assistant replies are formatted; user and error entries are shown
/// verbatim.
pub fn chat_entry(entry: &ChatEntry) -> String {
    let (class, icon, body) = match entry.kind {
        EntryKind::User => ("user-message", "fa-user", format!("<p>{}</p>", escape_html(&entry.text))),
        EntryKind::Assistant => ("bot-message", "fa-robot", blocks(&format_reply(&entry.text))),
        EntryKind::Error => (
            "error-message",
            "fa-exclamation-circle",
            format!("<p>{}</p>", escape_html(&entry.text)),
        ),
    };
    format!(
        "<div class=\"chatbot-message {class}\"><div class=\"message-avatar\"><i class=\"fas {icon}\"></i></div><div class=\"message-content\">{body}</div></div>"
    )
}

pub fn loading_indicator() -> &'static str {
    "<div class=\"chatbot-message bot-message\" id=\"loading-message\"><div class=\"message-avatar\"><i class=\"fas fa-robot\"></i></div><div class=\"message-content\"><div class=\"typing-indicator\"><span></span><span></span><span></span></div></div></div>"
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub fn empty_state(empty: &EmptyState) -> String {
    format!(
        "<div class=\"empty-state\"><i class=\"{}\"></i><p>{}</p></div>",
        escape_html(empty.icon),
        escape_html(empty.message)
    )
}

pub fn card(view: &CardView) -> String {
    let mut html = format!(
        "<div class=\"{}-item\"><h4>{}</h4>",
        view.kind,
        escape_html(&view.title)
    );
    for fact in &view.facts {
        let _ = write!(
            html,
            "<p><strong>{}:</strong> {}</p>",
            escape_html(fact.label),
            escape_html(&fact.value)
        );
    }
    if let Some(badge) = &view.badge {
        let _ = write!(
            html,
            "<span class=\"status-badge status-{}\">{}</span>",
            escape_html(&badge.class),
            escape_html(&badge.text)
        );
    }
    if !view.actions.is_empty() {
        html.push_str("<div class=\"appointment-actions\">");
        for (action, id) in &view.actions {
            let _ = write!(
                html,
                "<button class=\"btn btn-sm\" data-action=\"{}\" data-id=\"{}\">{}</button>",
                action.label().to_ascii_lowercase(),
                escape_html(id),
                action.label()
            );
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

pub fn region_content(content: &RegionContent) -> String {
    match content {
        RegionContent::Empty(empty) => empty_state(empty),
        RegionContent::Appointments(cards) => cards.iter().map(|c| card(&appointment_view(c))).collect(),
        RegionContent::Prescriptions(cards) => cards.iter().map(|c| card(&prescription_view(c))).collect(),
        RegionContent::Inventory(items) => items.iter().map(|i| card(&inventory_view(i))).collect(),
        RegionContent::Doctors(doctors) => {
            let options: String = doctor_options(doctors)
                .iter()
                .map(|(value, label)| {
                    format!(
                        "<option value=\"{}\">{}</option>",
                        escape_html(value),
                        escape_html(label)
                    )
                })
                .collect();
            format!("<select id=\"appointment-doctor\">{options}</select>")
        }
    }
}

/// A region that was never loaded renders as an empty container.
pub fn region(region: Region, content: Option<&RegionContent>) -> String {
    format!(
        "<section id=\"{}\"><h3>{}</h3>{}</section>",
        region.id(),
        escape_html(region.title()),
        content.map(region_content).unwrap_or_default()
    )
}

pub fn toast(notification: &Notification) -> String {
    format!(
        "<div class=\"notification {}\" data-id=\"{}\">{}</div>",
        notification.severity.class(),
        notification.id,
        escape_html(&notification.message)
    )
}

/// The visible page with its nav label, stats, regions and live toasts.
pub fn page(state: &AppState) -> String {
    let page = state.page();
    let mut html = String::from("<nav>");
    match state.nav_label() {
        Some(name) => {
            let _ = write!(
                html,
                "<span class=\"nav-user\">{}</span><button data-action=\"logout\">Logout</button>",
                escape_html(&name)
            );
        }
        None => html.push_str(
            "<button data-action=\"login\">Login</button><button data-action=\"register\">Register</button>",
        ),
    }
    html.push_str("</nav>");

    let _ = write!(html, "<main id=\"{}\" class=\"page active\"><h2>{}</h2>", page.id(), escape_html(page.title()));
    if let Some(headline) = state.headline() {
        let _ = write!(html, "<p class=\"headline\">{}</p>", escape_html(headline));
    }

    let stats = state.visible_stats();
    if !stats.is_empty() {
        html.push_str("<div class=\"stats\">");
        for (stat, value) in stats {
            let _ = write!(
                html,
                "<div class=\"stat-card\"><h3>{value}</h3><p>{}</p></div>",
                escape_html(stat.label())
            );
        }
        html.push_str("</div>");
    }

    for (r, content) in state.visible_regions() {
        html.push_str(&region(r, content));
    }
    html.push_str("</main>");

    for n in state.notifications.active() {
        html.push_str(&toast(n));
    }
    html
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
