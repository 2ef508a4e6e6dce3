//! Section Extractor: turns one raw LLM text blob into exactly N numbered sections.
//!
//! Three tiers, richest first:
//! 1. Structural patterns, tried in order; the first one with any match wins.
//! 2. Paragraph fallback: blank-line split, long paragraphs assigned in order.
//! 3. Completeness pass: every number in `1..=N` still missing gets a placeholder.
//!
//! There is no failure path. Malformed input only lowers how much real content survives.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::book::markdown::extract_title;
use crate::book::{generic_title, Choice, Section, SectionOrigin};

/// Body of every placeholder section.
pub const PLACEHOLDER_BODY: &str =
    "Cette section sera générée lors de la prochaine version du générateur.";

pub const CONTINUE_LABEL: &str = "Continuer l'aventure";
pub const ALTERNATIVE_LABEL: &str = "Approche alternative";

/// Paragraphs at or under this length are ignored by the fallback.
const MIN_PARAGRAPH_CHARS: usize = 100;
const MAX_PARAGRAPH_CHARS: usize = 2000;
/// A fallback paragraph's first line becomes its title only when shorter than this.
const MAX_TITLE_LINE_CHARS: usize = 80;

/// Sections keyed by number.
pub type SectionMap = BTreeMap<usize, Section>;

// ────────────────────────────────────────────────────────────────────────────
// Parse strategies
// ────────────────────────────────────────────────────────────────────────────

/// The structural formats recognised in LLM output, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `#01 **Titre**` (any whitespace between number and title)
    BoldHeading,
    /// `#01` then `**Titre**` on the next line
    BoldHeadingOnNextLine,
    /// `Section 1: Titre`
    SectionLabel,
    /// `1. Titre`
    NumberedList,
}

/// One candidate format: a header pattern capturing `(number, title)` and the
/// boundary pattern that ends the body.
pub struct ParseStrategy {
    kind: PatternKind,
    header: Regex,
    boundary: Regex,
}

/// A header match before range filtering.
#[derive(Debug, PartialEq, Eq)]
struct RawSection<'a> {
    number: Option<usize>,
    title: &'a str,
    body: &'a str,
}

impl ParseStrategy {
    pub fn new(kind: PatternKind, header: &str, boundary: &str) -> Self {
        Self {
            kind,
            header: Regex::new(header).expect("section header pattern must compile"),
            boundary: Regex::new(boundary).expect("section boundary pattern must compile"),
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Non-overlapping matches, left to right. A body runs from the end of its
    /// header to the next boundary or the end of input.
    fn find_all<'a>(&self, text: &'a str) -> Vec<RawSection<'a>> {
        let mut found = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(caps) = self.header.captures_at(text, pos) else {
                break;
            };
            let Some(header) = caps.get(0) else {
                break;
            };

            let body_start = header.end();
            let body_end = self
                .boundary
                .find_at(text, body_start)
                .map(|m| m.start())
                .unwrap_or(text.len());

            found.push(RawSection {
                number: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                title: caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
                body: text[body_start..body_end].trim(),
            });

            pos = body_end.max(header.end());
        }

        found
    }
}

/// Default cascade, in priority order.
pub fn default_strategies() -> &'static [ParseStrategy] {
    static STRATEGIES: LazyLock<Vec<ParseStrategy>> = LazyLock::new(|| {
        vec![
            ParseStrategy::new(
                PatternKind::BoldHeading,
                r"#([0-9]{1,2})\s+\*\*([^*]+)\*\*",
                r"#[0-9]",
            ),
            ParseStrategy::new(
                PatternKind::BoldHeadingOnNextLine,
                r"#([0-9]{1,2})\s*\n\*\*([^*]+)\*\*",
                r"#[0-9]",
            ),
            ParseStrategy::new(
                PatternKind::SectionLabel,
                r"Section\s+([0-9]+)[:\s]*([^\n]+)\n",
                r"Section\s+[0-9]+",
            ),
            ParseStrategy::new(
                PatternKind::NumberedList,
                r"([0-9]+)\.\s*([^\n]+)\n",
                r"[0-9]+\.",
            ),
        ]
    });
    &STRATEGIES
}

/// First strategy yielding at least one match, with its matches.
fn first_match<'s, 'a>(
    strategies: &'s [ParseStrategy],
    text: &'a str,
) -> Option<(&'s ParseStrategy, Vec<RawSection<'a>>)> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.find_all(text);
        (!found.is_empty()).then_some((strategy, found))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts exactly `total` sections (keys `1..=total`) from `raw_text` using the
/// default pattern cascade.
pub fn extract(raw_text: &str, total: usize) -> SectionMap {
    extract_with(default_strategies(), raw_text, total)
}

/// Same as [`extract`] with an explicit candidate list.
pub fn extract_with(strategies: &[ParseStrategy], raw_text: &str, total: usize) -> SectionMap {
    let text = normalize_newlines(raw_text);
    let mut sections = SectionMap::new();

    match first_match(strategies, &text) {
        Some((strategy, found)) => {
            info!(
                "Section pattern {:?} matched {} headers",
                strategy.kind(),
                found.len()
            );
            for raw in found {
                let Some(number) = raw.number.filter(|n| (1..=total).contains(n)) else {
                    debug!("Discarding out-of-range section header {:?}", raw.number);
                    continue;
                };
                let title = clean_title(raw.title).unwrap_or_else(|| generic_title(number));
                sections.entry(number).or_insert_with(|| {
                    Section::new(
                        number,
                        &title,
                        raw.body,
                        total,
                        SectionOrigin::Parsed {
                            pattern: strategy.kind(),
                        },
                    )
                });
            }
        }
        None => {
            warn!("No section pattern matched; splitting raw text into paragraphs");
            for (index, paragraph) in paragraphs(&text).take(total).enumerate() {
                let number = index + 1;
                sections.insert(number, paragraph_section(number, paragraph, total));
            }
        }
    }

    complete(&mut sections, total);
    sections
}

/// Extracts section `number` from a response prompted for that single section.
///
/// Falls back to the whole response as body (title recovered from its text), and
/// to a placeholder when the response is blank.
pub fn extract_single(raw_text: &str, number: usize, total: usize) -> Section {
    let text = normalize_newlines(raw_text);

    if let Some((strategy, found)) = first_match(default_strategies(), &text) {
        if let Some(raw) = found.iter().find(|raw| raw.number == Some(number)) {
            let title = clean_title(raw.title).unwrap_or_else(|| generic_title(number));
            return Section::new(
                number,
                &title,
                raw.body,
                total,
                SectionOrigin::Parsed {
                    pattern: strategy.kind(),
                },
            );
        }
    }

    let body = text.trim();
    if body.is_empty() {
        warn!("Section {number} response was blank; using placeholder");
        return Section::placeholder(number, total);
    }

    match extract_title(body) {
        Some(title) => {
            let rest = without_title_line(body, &title);
            Section::new(number, &title, &rest, total, SectionOrigin::Paragraph)
        }
        None => Section::new(number, &generic_title(number), body, total, SectionOrigin::Paragraph),
    }
}

/// Drops the line holding `title`, and a bare `#NN` marker right above it, so the
/// title is not repeated in the body. Keeps `body` whole if nothing else remains.
fn without_title_line(body: &str, title: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let Some(pos) = lines
        .iter()
        .position(|line| clean_title(line).as_deref() == Some(title))
    else {
        return body.to_string();
    };
    let start = match pos.checked_sub(1) {
        Some(above) if is_bare_marker(lines[above]) => above,
        _ => pos,
    };

    let rest = lines[..start]
        .iter()
        .chain(&lines[pos + 1..])
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let rest = rest.trim();
    if rest.is_empty() {
        body.to_string()
    } else {
        rest.to_string()
    }
}

fn is_bare_marker(line: &str) -> bool {
    line.trim()
        .strip_prefix('#')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Fills every missing number in `1..=total` with a placeholder.
pub fn complete(sections: &mut SectionMap, total: usize) {
    let mut filled = 0;
    for number in 1..=total {
        sections.entry(number).or_insert_with(|| {
            filled += 1;
            Section::placeholder(number, total)
        });
    }
    if filled > 0 {
        warn!("Filled {filled}/{total} sections with placeholders");
    }
}

/// Two choices to the next section, none for the last one.
///
/// Both choices lead to the same section; only the label differs.
pub fn section_choices(number: usize, total: usize) -> Vec<Choice> {
    if number >= total {
        return Vec::new();
    }
    let next = number + 1;
    vec![
        Choice::new(CONTINUE_LABEL, next),
        Choice::new(ALTERNATIVE_LABEL, next),
    ]
}

fn paragraph_section(number: usize, paragraph: &str, total: usize) -> Section {
    let truncated: String = paragraph.chars().take(MAX_PARAGRAPH_CHARS).collect();
    let (first_line, rest) = truncated
        .split_once('\n')
        .unwrap_or((truncated.as_str(), ""));

    if first_line.chars().count() < MAX_TITLE_LINE_CHARS {
        if let Some(title) = clean_title(first_line) {
            return Section::new(number, &title, rest.trim(), total, SectionOrigin::Paragraph);
        }
    }

    Section::new(
        number,
        &generic_title(number),
        truncated.trim(),
        total,
        SectionOrigin::Paragraph,
    )
}

fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
}

/// Strips bold markers and whitespace; `None` if nothing is left.
fn clean_title(raw: &str) -> Option<String> {
    let title = raw.trim().trim_matches('*').trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}
