//! This module provides the parser for machine configuration documents.
//!
//! The accepted language is a small indentation-structured subset of YAML: nested mappings,
//! sequences (including sequences of inline mappings), quoted or bare scalars, `null`/`~`,
//! `#` comments and `---` separators. Each significant line is classified with a `pest`
//! grammar, and nesting is resolved from indentation with a stack of open containers.

use crate::document::{Mapping, Node};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::fmt;
use thiserror::Error;

/// Derives a `PestParser` for the line grammar defined in `config.pest`.
#[derive(PestParser)]
#[grammar = "config.pest"]
pub struct ConfigLineParser;

/// Why a configuration line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// The line is indented with something other than spaces.
    InvalidIndentation,
    /// A `- item` line whose enclosing container is not a sequence.
    ItemOutsideSequence,
    /// A `key: value` line whose enclosing container is not a mapping.
    KeyOutsideMapping,
    /// The line matches none of the recognized shapes.
    UnrecognizedLine,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyntaxErrorKind::InvalidIndentation => "invalid indentation",
            SyntaxErrorKind::ItemOutsideSequence => "list item outside of a sequence",
            SyntaxErrorKind::KeyOutsideMapping => "key outside of a mapping",
            SyntaxErrorKind::UnrecognizedLine => "unrecognized line",
        })
    }
}

/// A malformed configuration line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}: {content}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// 1-based line number in the original text.
    pub line: usize,
    /// The offending line, comment and surrounding whitespace removed.
    pub content: String,
}

/// Parses configuration text into a document tree.
///
/// The root of the returned tree is always a mapping. Blank lines, comment-only lines and lines
/// starting with `---` are skipped.
///
/// # Arguments
///
/// * `text` - The configuration document.
///
/// # Returns
///
/// * `Ok(Node)` with the parsed tree.
/// * `Err(SyntaxError)` naming the first offending line.
pub fn parse(text: &str) -> Result<Node, SyntaxError> {
    let lines = significant_lines(text);
    let mut tree = Arena::new();
    let mut stack = vec![Frame {
        slot: ROOT,
        indent: None,
    }];

    for (i, line) in lines.iter().enumerate() {
        if line.tabbed {
            return Err(line.error(SyntaxErrorKind::InvalidIndentation));
        }

        while stack.last().is_some_and(|f| f.closed_by(line.indent)) {
            stack.pop();
        }
        // The root frame never pops, so a parent is always available.
        let parent = stack.last().map_or(ROOT, |f| f.slot);
        let next = lines.get(i + 1);

        match classify(line.content).ok_or_else(|| line.error(SyntaxErrorKind::UnrecognizedLine))? {
            Shape::Item(body) => {
                if !tree.is_sequence(parent) {
                    return Err(line.error(SyntaxErrorKind::ItemOutsideSequence));
                }

                match body {
                    None => tree.push(parent, Entry::Scalar(None)),
                    Some(ItemBody::Scalar(raw)) => tree.push(parent, Entry::Scalar(scalar(raw))),
                    Some(ItemBody::Entry(key, value)) => {
                        let object = tree.open(Slot::Mapping(Vec::new()));
                        tree.push(parent, Entry::Nested(object));
                        stack.push(Frame {
                            slot: object,
                            indent: Some(line.indent),
                        });

                        let anchor = line.indent + 2;
                        let entry = open_value(&mut tree, &mut stack, value, anchor, next);
                        tree.assign(object, key_of(key), entry);
                    }
                }
            }
            Shape::Entry(key, value) => {
                if !tree.is_mapping(parent) {
                    return Err(line.error(SyntaxErrorKind::KeyOutsideMapping));
                }

                let entry = open_value(&mut tree, &mut stack, value, line.indent, next);
                tree.assign(parent, key_of(key), entry);
            }
        }
    }

    tracing::debug!(lines = lines.len(), "parsed configuration document");

    Ok(tree.finish(ROOT))
}

/// Resolves the value of a `key: value` pair.
///
/// An empty value opens a nested container when the next significant line is indented past
/// `anchor`: a sequence if that line is a `-` item, a mapping otherwise. The new container is
/// pushed with `anchor` as its indentation. Otherwise the value is a scalar (or null).
fn open_value(
    tree: &mut Arena,
    stack: &mut Vec<Frame>,
    value: &str,
    anchor: usize,
    next: Option<&SourceLine>,
) -> Entry {
    let value = value.trim();
    if !value.is_empty() {
        return Entry::Scalar(scalar(value));
    }

    match next {
        Some(next) if next.indent > anchor => {
            let slot = if next.content.starts_with('-') {
                Slot::Sequence(Vec::new())
            } else {
                Slot::Mapping(Vec::new())
            };
            let nested = tree.open(slot);
            stack.push(Frame {
                slot: nested,
                indent: Some(anchor),
            });
            Entry::Nested(nested)
        }
        _ => Entry::Scalar(None),
    }
}

/// Interprets a raw scalar token.
///
/// Empty text, `null` and `~` (case-insensitive) are null. A value wrapped in matching single or
/// double quotes loses the quotes with no escape processing. Anything else is the trimmed text.
fn scalar(raw: &str) -> Option<String> {
    let v = raw.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("null") || v == "~" {
        return None;
    }

    for quote in ['\'', '"'] {
        if v.starts_with(quote) && v.ends_with(quote) {
            return Some(v.get(1..v.len() - 1).unwrap_or_default().to_string());
        }
    }

    Some(v.to_string())
}

fn key_of(raw: &str) -> String {
    scalar(raw).unwrap_or_default()
}

/// Removes a trailing `#` comment unless the `#` sits inside a quoted span.
fn strip_comment(line: &str) -> &str {
    let (mut in_single, mut in_double) = (false, false);

    for (i, c) in line.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => return &line[..i],
            _ => {}
        }
    }

    line
}

/// A line that takes part in parsing.
struct SourceLine<'a> {
    number: usize,
    indent: usize,
    tabbed: bool,
    content: &'a str,
}

impl SourceLine<'_> {
    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError {
            kind,
            line: self.number,
            content: self.content.to_string(),
        }
    }
}

fn significant_lines(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = strip_comment(raw).trim_end_matches('\r');
            let content = line.trim();
            if content.is_empty() || content.starts_with("---") {
                return None;
            }

            let leading = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
            Some(SourceLine {
                number: i + 1,
                indent: leading.len(),
                tabbed: leading.contains('\t'),
                content,
            })
        })
        .collect()
}

/// The recognized shapes of a significant line.
enum Shape<'a> {
    Item(Option<ItemBody<'a>>),
    Entry(&'a str, &'a str),
}

enum ItemBody<'a> {
    Entry(&'a str, &'a str),
    Scalar(&'a str),
}

fn classify(content: &str) -> Option<Shape<'_>> {
    let line = ConfigLineParser::parse(Rule::line, content).ok()?.next()?;
    let shape = line.into_inner().next()?;

    match shape.as_rule() {
        Rule::item => {
            let body = shape.into_inner().next().and_then(|inner| match inner.as_rule() {
                Rule::entry => split_entry(inner).map(|(k, v)| ItemBody::Entry(k, v)),
                Rule::bare => Some(ItemBody::Scalar(inner.as_str())),
                _ => None,
            });
            Some(Shape::Item(body))
        }
        Rule::entry => split_entry(shape).map(|(k, v)| Shape::Entry(k, v)),
        _ => None,
    }
}

fn split_entry(pair: Pair<'_, Rule>) -> Option<(&str, &str)> {
    let mut inner = pair.into_inner();
    let key = inner.next()?.as_str();
    let value = inner.next()?.as_str();
    Some((key, value))
}

const ROOT: usize = 0;

/// An open container on the indentation stack.
struct Frame {
    slot: usize,
    /// `None` for the root, which encloses every line.
    indent: Option<usize>,
}

impl Frame {
    /// A line at `indent` or shallower closes this frame.
    fn closed_by(&self, indent: usize) -> bool {
        self.indent.is_some_and(|own| indent <= own)
    }
}

enum Entry {
    Scalar(Option<String>),
    Nested(usize),
}

enum Slot {
    Mapping(Vec<(String, Entry)>),
    Sequence(Vec<Entry>),
}

/// Containers under construction, addressed by index so the stack can refer to them while
/// they are being filled.
struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    fn new() -> Self {
        Self {
            slots: vec![Slot::Mapping(Vec::new())],
        }
    }

    fn open(&mut self, slot: Slot) -> usize {
        self.slots.push(slot);
        self.slots.len() - 1
    }

    fn is_sequence(&self, slot: usize) -> bool {
        matches!(self.slots[slot], Slot::Sequence(_))
    }

    fn is_mapping(&self, slot: usize) -> bool {
        matches!(self.slots[slot], Slot::Mapping(_))
    }

    fn push(&mut self, slot: usize, entry: Entry) {
        if let Slot::Sequence(items) = &mut self.slots[slot] {
            items.push(entry);
        }
    }

    fn assign(&mut self, slot: usize, key: String, entry: Entry) {
        if let Slot::Mapping(entries) = &mut self.slots[slot] {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = entry,
                None => entries.push((key, entry)),
            }
        }
    }

    fn finish(&mut self, slot: usize) -> Node {
        match std::mem::replace(&mut self.slots[slot], Slot::Sequence(Vec::new())) {
            Slot::Mapping(entries) => {
                let mut mapping = Mapping::new();
                for (key, entry) in entries {
                    let value = self.resolve(entry);
                    mapping.insert(key, value);
                }
                Node::Mapping(mapping)
            }
            Slot::Sequence(items) => Node::Sequence(
                items
                    .into_iter()
                    .map(|entry| self.resolve(entry))
                    .collect(),
            ),
        }
    }

    fn resolve(&mut self, entry: Entry) -> Node {
        match entry {
            Entry::Scalar(value) => Node::from(value),
            Entry::Nested(slot) => self.finish(slot),
        }
    }
}
