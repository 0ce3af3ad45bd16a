//! Split a sections-mode completion into its six labeled parts
//!
//! Headings are located in canonical order. Matching ignores case, whitespace
//! and punctuation but respects word boundaries, so `SUGGESTIONS` still reads
//! as the suggestion heading while `DATA MOATING` does not. A heading line
//! (`## Data Moat`, `**UX Friction:**`, `SCENE-FIT:`) wins over a bullet or a
//! sentence that merely mentions the dimension. Whatever cannot be located is
//! reported as a [`StructuralWarning`] and the corresponding field stays
//! empty. Section bodies are kept verbatim apart from surrounding whitespace.

use tracing::{debug, warn};

use crate::analysis::{AnalysisResponse, SplitOutcome, StructuralWarning};
use crate::section::{Section, SectionHeadings};

/// Splits raw completions using a configurable set of headings
#[derive(Debug, Clone, Default)]
pub struct ResponseSplitter {
    headings: SectionHeadings,
}

/// Raw text reduced to lowercase alphanumerics, with byte offsets back into
/// the original for every kept char.
struct NormalizedText {
    chars: Vec<char>,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

/// Where a heading occurrence may sit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Starts a line and is closed by a separator, a closing marker or the
    /// end of the line
    HeadingLine,
    /// Starts a line, possibly as the first words of a bullet
    LineStart,
    Anywhere,
}

/// One occurrence of a heading in the raw text
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Normalized index of the first char
    index: usize,
    /// Normalized index just past the heading
    norm_end: usize,
    /// Byte offset of the first char
    start: usize,
    /// Byte offset just past the heading, plural suffix included
    end: usize,
}

/// A located heading
#[derive(Debug, Clone, Copy)]
struct HeadingMatch {
    section: Section,
    /// Byte offset where the previous section's body ends
    start: usize,
    /// Byte offset where this section's body starts
    body_start: usize,
    norm_end: usize,
}

impl NormalizedText {
    fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut starts = Vec::with_capacity(text.len());
        let mut ends = Vec::with_capacity(text.len());

        for (offset, c) in text.char_indices() {
            if !c.is_alphanumeric() {
                continue;
            }
            for lower in c.to_lowercase() {
                chars.push(lower);
                starts.push(offset);
                ends.push(offset + c.len_utf8());
            }
        }

        Self { chars, starts, ends }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    /// First occurrence of `needle` within `[from, to)` for which `f` yields
    /// a value.
    fn find_map<T>(
        &self,
        needle: &[char],
        from: usize,
        to: usize,
        f: impl Fn(usize) -> Option<T>,
    ) -> Option<T> {
        if needle.is_empty() || to > self.len() || from + needle.len() > to {
            return None;
        }
        (from..=to - needle.len())
            .filter(|&i| self.chars[i..i + needle.len()] == *needle)
            .find_map(f)
    }
}

fn normalize(heading: &str) -> Vec<char> {
    heading
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Characters that may precede a heading on its line
fn is_heading_marker(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_digit() || "#*-_>.)(|[【（".contains(c)
}

fn closing_bracket(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '（' => Some('）'),
        '[' => Some(']'),
        '【' => Some('】'),
        _ => None,
    }
}

impl ResponseSplitter {
    pub fn new(headings: SectionHeadings) -> Self {
        Self { headings }
    }

    pub fn headings(&self) -> &SectionHeadings {
        &self.headings
    }

    /// Split a completion into sections
    pub fn split(&self, raw: &str) -> SplitOutcome {
        let text = NormalizedText::new(raw);
        let needles: Vec<(Section, Vec<Vec<char>>)> = self
            .headings
            .iter()
            .map(|(section, aliases)| {
                (section, aliases.iter().map(|a| normalize(a)).collect())
            })
            .collect();

        let mut found: Vec<HeadingMatch> = Vec::new();
        let mut warnings = Vec::new();
        let mut cursor = 0;

        for (idx, (section, aliases)) in needles.iter().enumerate() {
            let later: Vec<&Vec<char>> = needles[idx + 1..]
                .iter()
                .flat_map(|(_, a)| a.iter())
                .collect();

            match locate(raw, &text, *section, aliases, &later, cursor) {
                Some(m) => {
                    cursor = m.norm_end;
                    found.push(m);
                }
                None => {
                    let seen_earlier =
                        earliest(raw, &text, aliases.iter(), 0, cursor, Placement::Anywhere)
                            .is_some();
                    let warning = if seen_earlier {
                        StructuralWarning::OutOfOrder(*section)
                    } else {
                        StructuralWarning::MissingSection(*section)
                    };
                    warn!(section = section.heading(), "{}", warning);
                    warnings.push(warning);
                }
            }
        }

        let mut response = AnalysisResponse::default();
        for (i, m) in found.iter().enumerate() {
            let end = found.get(i + 1).map_or(raw.len(), |next| next.start);
            let body = raw.get(m.body_start..end).unwrap_or_default().trim();
            response.set(m.section, body);
        }

        debug!(
            found = found.len(),
            warnings = warnings.len(),
            "split completion into sections"
        );

        SplitOutcome { response, warnings }
    }
}

/// Find the heading for `section` at or after `cursor`.
///
/// Heading lines anywhere ahead come first, then any line start. Otherwise a
/// mid-line match is accepted, but only before the next line-start heading
/// of a later section so a passing mention cannot swallow later sections.
fn locate(
    raw: &str,
    text: &NormalizedText,
    section: Section,
    aliases: &[Vec<char>],
    later: &[&Vec<char>],
    cursor: usize,
) -> Option<HeadingMatch> {
    let len = text.len();
    let hit = earliest(raw, text, aliases.iter(), cursor, len, Placement::HeadingLine)
        .or_else(|| earliest(raw, text, aliases.iter(), cursor, len, Placement::LineStart))
        .or_else(|| {
            let limit = earliest(raw, text, later.iter().copied(), cursor, len, Placement::HeadingLine)
                .or_else(|| {
                    earliest(raw, text, later.iter().copied(), cursor, len, Placement::LineStart)
                })
                .map_or(len, |c| c.index);
            earliest(raw, text, aliases.iter(), cursor, limit, Placement::Anywhere)
        })?;

    let (body_start, _) = heading_tail(raw, &hit);

    Some(HeadingMatch {
        section,
        start: if starts_line(raw, hit.start) {
            line_start(raw, hit.start)
        } else {
            hit.start
        },
        body_start,
        norm_end: hit.norm_end,
    })
}

/// Earliest occurrence of any needle in `[from, to)` with the given placement
fn earliest<'a>(
    raw: &str,
    text: &NormalizedText,
    needles: impl Iterator<Item = &'a Vec<char>>,
    from: usize,
    to: usize,
    placement: Placement,
) -> Option<Candidate> {
    needles
        .filter_map(|needle| {
            text.find_map(needle, from, to, |i| {
                candidate_at(raw, text, i, needle.len()).filter(|c| placed(raw, c, placement))
            })
        })
        .min_by_key(|c| c.index)
}

/// Accept a normalized match only on word boundaries. A trailing `s` or `es`
/// is taken as part of the heading.
fn candidate_at(raw: &str, text: &NormalizedText, index: usize, len: usize) -> Option<Candidate> {
    let is_word = |c: char| c.is_ascii_alphanumeric();
    let start = text.starts[index];
    let mut end = text.ends[index + len - 1];

    if raw[..start].chars().next_back().is_some_and(is_word) {
        return None;
    }

    for suffix in ["es", "s"] {
        let plural = raw
            .get(end..end + suffix.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(suffix));
        if plural && !raw[end + suffix.len()..].chars().next().is_some_and(is_word) {
            end += suffix.len();
            break;
        }
    }

    if raw[end..].chars().next().is_some_and(is_word) {
        return None;
    }

    Some(Candidate {
        index,
        norm_end: index + len,
        start,
        end,
    })
}

fn placed(raw: &str, candidate: &Candidate, placement: Placement) -> bool {
    match placement {
        Placement::Anywhere => true,
        Placement::LineStart => starts_line(raw, candidate.start),
        Placement::HeadingLine => starts_line(raw, candidate.start) && heading_tail(raw, candidate).1,
    }
}

/// Skip what closes a heading: bold or bracket markers opened before it on
/// its line, spaces, and at most one `:` or dash separator.
///
/// Returns where the body starts and whether the heading was closed off
/// (separator, closing marker or end of line) rather than running on into a
/// sentence.
fn heading_tail(raw: &str, candidate: &Candidate) -> (usize, bool) {
    let prefix = marker_prefix(raw, candidate.start);
    let mut stars = prefix.matches('*').count();
    let mut underscores = prefix.matches('_').count();
    let mut closers: Vec<char> = prefix.chars().filter_map(closing_bracket).collect();
    let mut separated = false;
    let mut closed = false;

    let tail = &raw[candidate.end..];
    for (offset, c) in tail.char_indices() {
        let next = tail[offset + c.len_utf8()..].chars().next();
        match c {
            '\n' | '\r' => return (candidate.end + offset, true),
            ' ' | '\t' => {}
            '*' if stars > 0 => {
                stars -= 1;
                closed = true;
            }
            '_' if underscores > 0 => {
                underscores -= 1;
                closed = true;
            }
            ':' | '：' if !separated => separated = true,
            '-' | '–' | '—' if !separated && next.is_none_or(char::is_whitespace) => {
                separated = true;
            }
            c if closers.contains(&c) => {
                if let Some(pos) = closers.iter().position(|&open| open == c) {
                    closers.remove(pos);
                }
                closed = true;
            }
            _ => return (candidate.end + offset, separated || closed),
        }
    }
    (raw.len(), true)
}

fn line_start(raw: &str, offset: usize) -> usize {
    raw[..offset].rfind('\n').map_or(0, |p| p + 1)
}

/// The run of heading markers directly before `offset` on its line
fn marker_prefix(raw: &str, offset: usize) -> &str {
    let from = raw[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| *c != '\n' && is_heading_marker(*c))
        .last()
        .map_or(offset, |(i, _)| i);
    &raw[from..offset]
}

/// True when only heading markers precede `offset` on its line
fn starts_line(raw: &str, offset: usize) -> bool {
    line_start(raw, offset) + marker_prefix(raw, offset).len() == offset
}

/// Split with the default headings
pub fn split_sections(raw: &str) -> SplitOutcome {
    ResponseSplitter::default().split(raw)
}
