//! Light formatting for assistant replies.
//!
//! [`format_reply`] turns plain reply text into a small block tree:
//! paragraphs, one list, and bold/italic spans. It does no escaping; the
//! view adapters escape every text node when they render.
//!
//! A list line starts with `- ` (bullet) or `<n>. ` (numbered) at column
//! zero. All bullet lines in a reply are coalesced into one unordered list
//! and all numbered lines into one ordered list. The list region runs from
//! the first list line to the last; ordinary lines caught inside it stay in
//! the list of the nearest list line above them as loose entries. Each list
//! is placed at its first line, so a reply with both kinds yields two lists.

use std::sync::LazyLock;

use regex::Regex;

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- (.*)$").expect("bullet regex must compile"));

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\. (.*)$").expect("numbered regex must compile"));

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*").expect("emphasis regex must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    Item(Vec<Inline>),
    /// A non-list line that fell between two list lines.
    Loose(Vec<Inline>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    List {
        ordered: bool,
        entries: Vec<ListEntry>,
    },
}

/// Split reply text into blocks.
pub fn format_reply(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let list_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| list_item(line).is_some())
        .map(|(i, _)| i)
        .collect();

    let mut blocks = Vec::new();
    match (list_lines.first(), list_lines.last()) {
        (Some(&first), Some(&last)) => {
            paragraphs(&lines[..first], &mut blocks);
            blocks.extend(coalesce(&lines[first..=last]));
            paragraphs(&lines[last + 1..], &mut blocks);
        }
        _ => paragraphs(&lines, &mut blocks),
    }

    if blocks.is_empty() {
        blocks.push(Block::Paragraph(inlines(text.trim())));
    }
    blocks
}

/// One list per kind, in order of first appearance. `lines` starts with a
/// list line.
fn coalesce(lines: &[&str]) -> Vec<Block> {
    let mut lists: Vec<(bool, Vec<ListEntry>)> = Vec::new();
    let mut current = None;
    for line in lines.iter().filter(|line| !line.trim().is_empty()) {
        let (ordered, entry) = match list_item(line) {
            Some((ordered, body)) => {
                current = Some(ordered);
                (ordered, ListEntry::Item(inlines(body)))
            }
            None => match current {
                Some(ordered) => (ordered, ListEntry::Loose(inlines(line.trim()))),
                None => continue,
            },
        };
        match lists.iter_mut().find(|(kind, _)| *kind == ordered) {
            Some((_, entries)) => entries.push(entry),
            None => lists.push((ordered, vec![entry])),
        }
    }
    lists
        .into_iter()
        .map(|(ordered, entries)| Block::List { ordered, entries })
        .collect()
}

/// `(ordered, body)` when `line` is a list line.
fn list_item(line: &str) -> Option<(bool, &str)> {
    if let Some(caps) = NUMBERED.captures(line) {
        return caps.get(1).map(|m| (true, m.as_str()));
    }
    BULLET
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| (false, m.as_str()))
}

/// Blank-line separated runs become paragraphs; single newlines inside a run
/// become line breaks.
fn paragraphs(lines: &[&str], out: &mut Vec<Block>) {
    for run in lines.split(|line| line.trim().is_empty()) {
        if run.is_empty() {
            continue;
        }
        let mut content = Vec::new();
        for (i, line) in run.iter().enumerate() {
            if i > 0 {
                content.push(Inline::LineBreak);
            }
            content.extend(inlines(line.trim()));
        }
        out.push(Block::Paragraph(content));
    }
}

fn inlines(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for caps in EMPHASIS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > cursor {
            out.push(Inline::Text(text[cursor..whole.start()].to_string()));
        }
        if let Some(bold) = caps.get(1) {
            out.push(Inline::Bold(bold.as_str().to_string()));
        } else if let Some(italic) = caps.get(2) {
            out.push(Inline::Italic(italic.as_str().to_string()));
        }
        cursor = whole.end();
    }
    if cursor < text.len() {
        out.push(Inline::Text(text[cursor..].to_string()));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
