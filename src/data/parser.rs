//! Tolerant scanner for the malformed contributors blob.
//!
//! Exports write the field as
//!
//! ```text
//! {"deep_sleep": 78  "efficiency": 81 "latency": 89 "rem_sleep": 76 ...}
//! ```
//!
//! which is not valid JSON (no commas). Rather than repairing the JSON, the
//! scanner looks for `key: number` pairs anywhere in the text:
//!
//! ```text
//! pair    := '"'? ident '"'? ws* ':' ws* number
//! ident   := [a-zA-Z_]+
//! number  := digit* ('.' digit*)?      (at least one digit, unsigned, no exponent)
//! ```
//!
//! Everything between pairs is skipped, so stray braces, missing commas or
//! unbalanced quotes never stop the scan.

use std::fmt;
use std::ops::Range;

/// Characters of offending text carried in a warning.
pub const SNIPPET_LEN: usize = 80;

// ---------------------------------------------------------------------------
// Parsed values
// ---------------------------------------------------------------------------

/// A metric value: integer when the literal had no decimal point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

/// Metric name → value, in first-seen order.
///
/// A repeated key keeps its first position but takes the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMetrics {
    entries: Vec<(String, MetricValue)>,
}

impl ParsedMetrics {
    pub fn insert(&mut self, key: String, value: MetricValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<MetricValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningReason {
    /// The blob held no `key: number` pair at all.
    NoPairs,
    /// An integer literal did not fit in `i64`; it was kept as a float.
    IntegerOutOfRange,
}

/// A non-fatal problem found while scanning one blob.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// Row of the input table, filled in by the flattener.
    pub row: Option<usize>,
    /// Byte span of the offending text within the trimmed blob.
    pub span: Range<usize>,
    pub reason: WarningReason,
    /// Leading characters of the offending text.
    pub snippet: String,
}

impl ParseWarning {
    fn new(text: &str, span: Range<usize>, reason: WarningReason) -> Self {
        let snippet = text[span.clone()].chars().take(SNIPPET_LEN).collect();
        Self {
            row: None,
            span,
            reason,
            snippet,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(row) = self.row {
            write!(f, "row {row}: ")?;
        }
        match self.reason {
            WarningReason::NoPairs => {
                write!(f, "no key-value pairs found in: {}...", self.snippet)
            }
            WarningReason::IntegerOutOfRange => {
                write!(f, "integer out of range, kept as float: {}", self.snippet)
            }
        }
    }
}

/// Result of scanning one blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub metrics: ParsedMetrics,
    pub warnings: Vec<ParseWarning>,
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Parse one raw blob. `None` (a null cell) yields an empty mapping and no warning.
pub fn parse(raw: Option<&str>) -> ParseOutcome {
    let Some(raw) = raw else {
        return ParseOutcome::default();
    };
    let text = raw.trim();

    let mut outcome = ParseOutcome::default();
    let mut pos = 0;
    while pos < text.len() {
        match match_pair(text, pos) {
            Some(pair) => {
                let value = convert_literal(text, pair.value.clone(), &mut outcome.warnings);
                outcome.metrics.insert(text[pair.key].to_string(), value);
                pos = pair.end;
            }
            None => pos += text[pos..].chars().next().map_or(1, char::len_utf8),
        }
    }

    if outcome.metrics.is_empty() {
        outcome
            .warnings
            .push(ParseWarning::new(text, 0..text.len(), WarningReason::NoPairs));
    }
    outcome
}

struct Pair {
    key: Range<usize>,
    value: Range<usize>,
    end: usize,
}

/// Try to match one pair starting exactly at `start`.
fn match_pair(text: &str, start: usize) -> Option<Pair> {
    let bytes = text.as_bytes();
    let mut i = start;

    if bytes.get(i) == Some(&b'"') {
        i += 1;
    }
    let key_start = i;
    while bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') {
        i += 1;
    }
    if i == key_start {
        return None;
    }
    let key = key_start..i;

    if bytes.get(i) == Some(&b'"') {
        i += 1;
    }
    i = skip_whitespace(text, i);
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    i = skip_whitespace(text, i + 1);

    let value_start = i;
    let mut digits = 0;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
        digits += 1;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    Some(Pair {
        key,
        value: value_start..i,
        end: i,
    })
}

fn skip_whitespace(text: &str, mut i: usize) -> usize {
    for c in text[i..].chars() {
        if !c.is_whitespace() {
            break;
        }
        i += c.len_utf8();
    }
    i
}

fn convert_literal(text: &str, span: Range<usize>, warnings: &mut Vec<ParseWarning>) -> MetricValue {
    let literal = &text[span.clone()];
    if literal.contains('.') {
        // The grammar guarantees a digit next to the point, which f64 accepts.
        return MetricValue::Float(literal.parse().unwrap_or(f64::NAN));
    }
    match literal.parse::<i64>() {
        Ok(i) => MetricValue::Integer(i),
        Err(_) => {
            warnings.push(ParseWarning::new(text, span, WarningReason::IntegerOutOfRange));
            MetricValue::Float(literal.parse().unwrap_or(f64::INFINITY))
        }
    }
}
