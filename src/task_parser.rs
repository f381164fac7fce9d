//! Quick-add task input parsing.
//!
//! Extracts an `@Company` mention and a natural-language date phrase from a
//! free-text task line, returning a cleaned title plus highlight spans so
//! the input field can re-render both in place. Shorthand tokens (`tmr`,
//! `tod`, `fri`, ...) are expanded before date extraction, with span
//! bookkeeping to map matches back onto the original text.
//!
//! Never fails: no mention and no date is a normal outcome, not an error.

use std::cmp::Reverse;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;

use crate::datetext;
use crate::types::{HighlightKind, HighlightRange, ParsedTaskInput};

/// A company the parser can link against.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRef {
    pub id: String,
    pub name: String,
}

/// Shorthand tokens expanded before date extraction.
const SHORTHANDS: &[(&str, &str)] = &[
    ("tmr", "tomorrow"),
    ("tom", "tomorrow"),
    ("tod", "today"),
    ("mon", "monday"),
    ("tue", "tuesday"),
    ("tues", "tuesday"),
    ("wed", "wednesday"),
    ("thu", "thursday"),
    ("thur", "thursday"),
    ("thurs", "thursday"),
    ("fri", "friday"),
    ("sat", "saturday"),
    ("sun", "sunday"),
];

/// A non-whitespace token with its span in both the original and the
/// shorthand-expanded text.
struct Token {
    orig_start: usize,
    orig_end: usize,
    exp_start: usize,
    exp_end: usize,
}

/// Parse a quick-add input line against the current company list.
pub fn parse_task_input(input: &str, companies: &[CompanyRef]) -> ParsedTaskInput {
    parse_task_input_at(input, companies, Local::now().naive_local())
}

/// Like [`parse_task_input`] with an explicit reference instant for
/// relative-date resolution.
pub fn parse_task_input_at(
    input: &str,
    companies: &[CompanyRef],
    now: NaiveDateTime,
) -> ParsedTaskInput {
    let mention = find_mention(input, companies);
    let (expanded, tokens) = expand_shorthand(input);

    let candidates = datetext::extract(&expanded, now);
    // Prefer the first hour-certain candidate, then the first overall.
    let chosen = candidates
        .iter()
        .find(|m| m.has_time)
        .or_else(|| candidates.first());

    let mut due_date = None;
    let mut has_time = false;
    let mut date_range: Option<(usize, usize)> = None;
    if let Some(m) = chosen {
        if let Some((start, end)) = map_span(&tokens, m.start, m.end) {
            let overlaps_mention = mention
                .as_ref()
                .is_some_and(|(_, ms, me)| start < *me && end > *ms);
            // A date phrase hiding inside the mention is not a due date.
            if !overlaps_mention {
                due_date = Some(m.resolved);
                has_time = m.has_time;
                date_range = Some((start, end));
            }
        }
    }

    let mut highlight_ranges = Vec::new();
    if let Some((_, ms, me)) = &mention {
        highlight_ranges.push(HighlightRange {
            start: *ms,
            end: *me,
            kind: HighlightKind::Mention,
        });
    }
    if let Some((start, end)) = date_range {
        highlight_ranges.push(HighlightRange {
            start,
            end,
            kind: HighlightKind::Date,
        });
    }
    highlight_ranges.sort_by_key(|r| r.start);

    ParsedTaskInput {
        clean_title: strip_ranges(input, &highlight_ranges),
        due_date,
        linked_company_id: mention.map(|(c, _, _)| c.id.clone()),
        has_time,
        highlight_ranges,
    }
}

/// Parse a single free-standing date string, as typed into a date picker.
///
/// No shorthand expansion and no mention logic; the first recognized
/// phrase wins.
pub fn parse_date_string(input: &str) -> Option<NaiveDateTime> {
    parse_date_string_at(input, Local::now().naive_local())
}

pub fn parse_date_string_at(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    datetext::extract(input, now).into_iter().next().map(|m| m.resolved)
}

/// Find the `@CompanyName` mention, if any.
///
/// Companies are tried longest name first so "Vercel Labs" beats "Vercel",
/// and only the first match is taken — one mention per input.
fn find_mention<'a>(
    input: &str,
    companies: &'a [CompanyRef],
) -> Option<(&'a CompanyRef, usize, usize)> {
    let mut ordered: Vec<&CompanyRef> = companies.iter().filter(|c| !c.name.is_empty()).collect();
    ordered.sort_by_key(|c| Reverse(c.name.len()));

    for company in ordered {
        // \b only works when the name ends in a word character.
        let tail = if company
            .name
            .chars()
            .last()
            .is_some_and(|c| c.is_alphanumeric())
        {
            r"\b"
        } else {
            ""
        };
        let pattern = format!("(?i)@{}{}", regex::escape(&company.name), tail);
        let Ok(re) = Regex::new(&pattern) else { continue };
        if let Some(m) = re.find(input) {
            return Some((company, m.start(), m.end()));
        }
    }
    None
}

/// Rebuild the input with shorthand tokens expanded, tracking every token's
/// span in both texts. Whitespace passes through verbatim so offsets stay
/// aligned between tokens.
fn expand_shorthand(input: &str) -> (String, Vec<Token>) {
    let mut expanded = String::with_capacity(input.len() + 16);
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let ws_len = rest.len() - rest.trim_start().len();
        expanded.push_str(&rest[..ws_len]);
        offset += ws_len;
        rest = &rest[ws_len..];
        if rest.is_empty() {
            break;
        }

        let tok_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let tok = &rest[..tok_len];
        let exp_start = expanded.len();
        match SHORTHANDS.iter().find(|(s, _)| tok.eq_ignore_ascii_case(s)) {
            Some((_, full)) => expanded.push_str(full),
            None => expanded.push_str(tok),
        }
        tokens.push(Token {
            orig_start: offset,
            orig_end: offset + tok_len,
            exp_start,
            exp_end: expanded.len(),
        });
        offset += tok_len;
        rest = &rest[tok_len..];
    }

    (expanded, tokens)
}

/// Map a span in the expanded text back onto the original text: the run
/// from the first to the last token whose expanded span overlaps it.
fn map_span(tokens: &[Token], start: usize, end: usize) -> Option<(usize, usize)> {
    let mut first: Option<&Token> = None;
    let mut last: Option<&Token> = None;
    for t in tokens {
        if t.exp_start < end && t.exp_end > start {
            if first.is_none() {
                first = Some(t);
            }
            last = Some(t);
        }
    }
    Some((first?.orig_start, last?.orig_end))
}

/// Remove highlighted spans from the input (descending start order so
/// earlier removals don't shift later offsets), then collapse whitespace.
fn strip_ranges(input: &str, ranges: &[HighlightRange]) -> String {
    let mut s = input.to_string();
    let mut sorted: Vec<&HighlightRange> = ranges.iter().collect();
    sorted.sort_by_key(|r| Reverse(r.start));
    for r in sorted {
        s.replace_range(r.start..r.end, "");
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
