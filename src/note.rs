//! Defines the [`Note`] type and the logic for parsing notes from their
//! source text. A note source file looks like this:
//!
//! ```text
//! # Hello, world!
//! tags: greet, intro
//! date: 2024-01-01
//! The first line of the body.
//!
//! The second paragraph.
//! ```
//!
//! There is exactly one parser; the file-based build paths and the client
//! renderer only differ in their [`ParseOptions`].

use std::str::FromStr;

/// The marker placed between body lines in [`BodyStyle::LineBreaks`] mode.
/// [`crate::render::fragment`] lets this one sequence through unescaped.
pub const LINE_BREAK: &str = "<br>";

const TITLE_PREFIX: &str = "# ";
const TAGS_PREFIX: &str = "tags:";
const DATE_PREFIX: &str = "date:";

/// A single blog entry parsed from a note source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Note {
    /// The text of the last `# ` line, trimmed. Empty if there was none.
    pub title: String,

    /// Free text from the `tags:` line.
    pub tags: String,

    /// Free text from the `date:` line.
    pub date: String,

    /// Every other line, joined according to [`BodyStyle`].
    pub body: String,
}

/// How body lines are joined together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyStyle {
    /// Lines are kept verbatim and joined with [`LINE_BREAK`] so blank lines
    /// show up as paragraph spacing. Leading and trailing blank lines are
    /// dropped.
    LineBreaks,

    /// Lines are trimmed, blank lines are dropped, and the rest are joined
    /// with single spaces.
    Flowed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Discard everything before the first title line.
    pub skip_preamble: bool,
    pub body: BodyStyle,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            skip_preamble: false,
            body: BodyStyle::LineBreaks,
        }
    }
}

impl ParseOptions {
    /// Options for the file-based build paths (insert and rebuild).
    pub fn build() -> Self {
        ParseOptions {
            skip_preamble: true,
            body: BodyStyle::LineBreaks,
        }
    }

    /// Options for the client renderer.
    pub fn client() -> Self {
        ParseOptions {
            skip_preamble: false,
            body: BodyStyle::Flowed,
        }
    }
}

impl Note {
    /// Parses a [`Note`] from raw source text. This never fails: missing
    /// fields are left empty and it's up to the caller to reject a note
    /// without a title (see [`Note::has_title`]).
    pub fn parse(input: &str, options: &ParseOptions) -> Note {
        let input = match options.skip_preamble {
            true => skip_preamble(input),
            false => input,
        };

        let mut note = Note::default();
        let mut body: Vec<&str> = Vec::new();
        for line in input.lines() {
            let trimmed = line.trim();
            if let Some(title) = trimmed.strip_prefix(TITLE_PREFIX) {
                note.title = title.trim().to_owned();
            } else if let Some(tags) = strip_prefix_ignore_case(trimmed, TAGS_PREFIX) {
                note.tags = tags.trim().to_owned();
            } else if let Some(date) = strip_prefix_ignore_case(trimmed, DATE_PREFIX) {
                note.date = date.trim().to_owned();
            } else {
                match options.body {
                    BodyStyle::LineBreaks => body.push(line),
                    BodyStyle::Flowed if !trimmed.is_empty() => body.push(trimmed),
                    BodyStyle::Flowed => {}
                }
            }
        }

        note.body = match options.body {
            BodyStyle::LineBreaks => trim_blank_lines(&body).join(LINE_BREAK),
            BodyStyle::Flowed => body.join(" "),
        };
        note
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

impl FromStr for Note {
    type Err = std::convert::Infallible;

    /// Parses a [`Note`] with the default [`ParseOptions`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Note::parse(s, &ParseOptions::default()))
    }
}

// Returns the slice of `input` starting at the first line whose trimmed form
// is a title line, or all of `input` if there is no such line.
fn skip_preamble(input: &str) -> &str {
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        if line.trim().starts_with(TITLE_PREFIX) {
            return &input[offset..];
        }
        offset += line.len();
    }
    input
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    // `get` returns `None` if `prefix.len()` isn't on a char boundary, which
    // can only happen when the line can't match an ASCII prefix anyway.
    match line.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&line[prefix.len()..]),
        _ => None,
    }
}

fn trim_blank_lines<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    &lines[start..end]
}
