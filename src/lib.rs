//! A unified-diff parser that turns hunks into numbered, normalized line records.
//!
//! `hunkfold` reads the body of a unified diff (one or more `@@ ... @@` hunks)
//! and produces a flat, ordered list of [`DiffLine`] records, each classified as
//! context, addition or deletion and carrying its old-file and new-file line
//! numbers.
//!
//! On top of plain classification it performs one normalization step: when a
//! block of changes deletes a line and adds back the *exact same text* at the
//! same position, the pair is folded into a single context line. Such "fake"
//! replacements are common when only a trailing newline changed, and showing
//! them as real edits is noise for anyone reading the diff.
//!
//! ## Getting Started
//!
//! ```rust
//! use hunkfold::{parse_diff, DiffLine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let diff = "\
//! --- a/notes.txt
//! +++ b/notes.txt
//! @@ -1,1 +1,2 @@
//! -old
//! +old
//! +new
//! ";
//!
//! let lines = parse_diff(diff)?;
//! assert_eq!(
//!     lines,
//!     vec![
//!         DiffLine::context("old", 1, 1),
//!         DiffLine::addition("new", 2),
//!     ]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### The Parsing Pipeline
//!
//! 1.  **Reading hunks:** the input is split on `\n`. Everything before the first
//!     `@@` header (file headers, `---`/`+++` lines, commit messages) is ignored.
//!     Each header starts a hunk that owns every following line up to the next
//!     header.
//! 2.  **Normalizing:** each hunk body is classified line by line. Consecutive
//!     `-`/`+` lines form a *change run*; within a run, deletions and additions
//!     are paired by position and identical pairs become context.
//!
//! Line counters are local to each hunk and seeded from its header, so hunks
//! can be normalized independently of each other.
//!
//! ### Error Handling
//!
//! Parsing never guesses. A header with unparsable numbers, or whose numbering
//! would run past `usize::MAX`, produces [`ParseError::MalformedHunkHeader`], and a body line that does not start with
//! ` `, `+` or `-` produces [`ParseError::UnrecognizedLineMarker`]. Both carry the
//! offending line and its position.
//!
//! ```rust
//! use hunkfold::{parse_diff, ParseError};
//!
//! let err = parse_diff("@@ -x,1 +1,1 @@\n-a\n+b\n").unwrap_err();
//! assert!(matches!(err, ParseError::MalformedHunkHeader { hunk_index: 1, .. }));
//! assert_eq!(err.line(), "@@ -x,1 +1,1 @@");
//! ```
//!
//! ### Hunk-by-Hunk Parsing with `HunkParser`
//!
//! [`parse_diff`] stops at the first error. When a caller prefers to show
//! whatever parses and report the rest, [`HunkParser`] yields one result per
//! hunk and keeps going after a failure.
//!
//! ```rust
//! use hunkfold::{HunkParser, ParseOptions};
//!
//! let diff = "@@ -1 +1 @@\n-a\n+b\n@@ -5 +5 @@\n?bogus\n@@ -9 +9 @@\n ctx\n";
//! let results: Vec<_> = HunkParser::new(diff, ParseOptions::default()).collect();
//!
//! assert_eq!(results.len(), 3);
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! assert!(results[2].is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! ### `parallel`
//!
//! - **Enabled by default.**
//! - Normalizes hunks in parallel with [`rayon`](https://crates.io/crates/rayon).
//!   Hunks share no state, so the output (and the error reported, if any) is
//!   identical to the sequential build.
//! - **To disable this feature**, specify `default-features = false` in your `Cargo.toml`:
//!   ```toml
//!   [dependencies]
//!   hunkfold = { version = "0.1.0", default-features = false }
//!   ```
use log::{debug, trace, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use std::iter::{Enumerate, Peekable};
use std::str::Split;
use thiserror::Error;

// --- Error Types ---

/// Represents errors that can occur while parsing a unified diff.
///
/// Positions are 1-based. `line_index` counts body lines within the hunk, with
/// `0` standing for the hunk's own `@@` header line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line starting with `@@` could not be parsed as
    /// `@@ -<start>[,<count>] +<start>[,<count>] @@`, or its line numbers
    /// cannot be carried through its body without overflowing.
    #[error("Malformed hunk header for hunk {hunk_index} on input line {input_line}: '{line}'")]
    MalformedHunkHeader {
        /// The 1-based index of the hunk in the input.
        hunk_index: usize,
        /// Always `0`: the header itself.
        line_index: usize,
        /// The 1-based line number in the whole input.
        input_line: usize,
        /// The raw header line.
        line: String,
    },
    /// A hunk body line started with something other than ` `, `+` or `-`.
    #[error("Unrecognized line marker in hunk {hunk_index}, line {line_index} (input line {input_line}): '{line}'")]
    UnrecognizedLineMarker {
        /// The 1-based index of the hunk in the input.
        hunk_index: usize,
        /// The 1-based index of the line within the hunk body.
        line_index: usize,
        /// The 1-based line number in the whole input.
        input_line: usize,
        /// The raw body line.
        line: String,
    },
}

impl ParseError {
    /// The 1-based index of the hunk that failed.
    pub fn hunk_index(&self) -> usize {
        match self {
            ParseError::MalformedHunkHeader { hunk_index, .. }
            | ParseError::UnrecognizedLineMarker { hunk_index, .. } => *hunk_index,
        }
    }

    /// The position of the offending line within its hunk (`0` for the header).
    pub fn line_index(&self) -> usize {
        match self {
            ParseError::MalformedHunkHeader { line_index, .. }
            | ParseError::UnrecognizedLineMarker { line_index, .. } => *line_index,
        }
    }

    /// The 1-based line number of the offending line in the whole input.
    pub fn input_line(&self) -> usize {
        match self {
            ParseError::MalformedHunkHeader { input_line, .. }
            | ParseError::UnrecognizedLineMarker { input_line, .. } => *input_line,
        }
    }

    /// The offending raw line, exactly as it appeared in the input.
    pub fn line(&self) -> &str {
        match self {
            ParseError::MalformedHunkHeader { line, .. }
            | ParseError::UnrecognizedLineMarker { line, .. } => line,
        }
    }
}

// --- Options ---

/// Options for configuring how a diff is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// If `true`, a deletion and an addition paired at the same position of a
    /// change run with byte-identical content are emitted as one context line.
    /// If `false`, every pair is emitted as a deletion followed by an addition.
    pub collapse_identical: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            collapse_identical: true,
        }
    }
}

impl ParseOptions {
    /// Creates a new builder for `ParseOptions`.
    ///
    /// # Example
    ///
    /// ```
    /// # use hunkfold::ParseOptions;
    /// let options = ParseOptions::builder()
    ///     .collapse_identical(false)
    ///     .build();
    ///
    /// assert_eq!(options.collapse_identical, false);
    /// ```
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }
}

/// A builder for creating `ParseOptions`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptionsBuilder {
    collapse_identical: Option<bool>,
}

impl ParseOptionsBuilder {
    /// Whether identical deletion/addition pairs are folded into context.
    pub fn collapse_identical(mut self, collapse_identical: bool) -> Self {
        self.collapse_identical = Some(collapse_identical);
        self
    }

    /// Builds the `ParseOptions`.
    pub fn build(self) -> ParseOptions {
        let default = ParseOptions::default();
        ParseOptions {
            collapse_identical: self
                .collapse_identical
                .unwrap_or(default.collapse_identical),
        }
    }
}

// --- Data Structures ---

/// The classification of a single [`DiffLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Present, unchanged, in both the old and the new file.
    Context,
    /// Present only in the new file.
    Addition,
    /// Present only in the old file.
    Deletion,
}

impl LineKind {
    /// The unified-diff marker character for this kind.
    pub fn marker(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Addition => '+',
            LineKind::Deletion => '-',
        }
    }

    fn from_marker(marker: char) -> Option<Self> {
        match marker {
            ' ' => Some(LineKind::Context),
            '+' => Some(LineKind::Addition),
            '-' => Some(LineKind::Deletion),
            _ => None,
        }
    }
}

/// One normalized line of a diff.
///
/// Context lines carry both line numbers, additions only the new one and
/// deletions only the old one. The constructors enforce this, and the parser
/// only ever builds records through them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    /// Whether the line is context, an addition or a deletion.
    pub kind: LineKind,
    /// The line text without its leading marker and without a newline.
    pub content: String,
    /// The 1-based line number in the old file. `None` for additions.
    pub old_line_number: Option<usize>,
    /// The 1-based line number in the new file. `None` for deletions.
    pub new_line_number: Option<usize>,
}

impl DiffLine {
    /// Creates a context line present at `old` in the old file and `new` in the new file.
    pub fn context(content: impl Into<String>, old: usize, new: usize) -> Self {
        Self {
            kind: LineKind::Context,
            content: content.into(),
            old_line_number: Some(old),
            new_line_number: Some(new),
        }
    }

    /// Creates a line added at `new` in the new file.
    pub fn addition(content: impl Into<String>, new: usize) -> Self {
        Self {
            kind: LineKind::Addition,
            content: content.into(),
            old_line_number: None,
            new_line_number: Some(new),
        }
    }

    /// Creates a line deleted from `old` in the old file.
    pub fn deletion(content: impl Into<String>, old: usize) -> Self {
        Self {
            kind: LineKind::Deletion,
            content: content.into(),
            old_line_number: Some(old),
            new_line_number: None,
        }
    }

    /// The unified-diff marker character for this line's kind.
    ///
    /// # Example
    ///
    /// ```
    /// # use hunkfold::DiffLine;
    /// let line = DiffLine::deletion("gone", 3);
    /// assert_eq!(format!("{}{}", line.marker(), line.content), "-gone");
    /// ```
    pub fn marker(&self) -> char {
        self.kind.marker()
    }
}

/// The numeric fields of a `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkHeader {
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
}

/// Where a hunk sits in the input, for error reporting.
#[derive(Debug, Clone, Copy)]
struct HunkOrigin<'a> {
    /// The 1-based position of this hunk in the input.
    index: usize,
    header_line: &'a str,
    /// The 1-based input line number of the header. Body line `i` (1-based)
    /// sits at `header_input_line + i`.
    header_input_line: usize,
}

impl HunkOrigin<'_> {
    fn header_error(&self) -> ParseError {
        ParseError::MalformedHunkHeader {
            hunk_index: self.index,
            line_index: 0,
            input_line: self.header_input_line,
            line: self.header_line.to_string(),
        }
    }

    fn marker_error(&self, line_index: usize, line: &str) -> ParseError {
        ParseError::UnrecognizedLineMarker {
            hunk_index: self.index,
            line_index,
            input_line: self.header_input_line + line_index,
            line: line.to_string(),
        }
    }
}

/// A single hunk as read from the input, before normalization.
#[derive(Debug)]
struct Hunk<'a> {
    origin: HunkOrigin<'a>,
    header: HunkHeader,
    /// The raw body lines, each still carrying its marker.
    lines: Vec<&'a str>,
}

impl Hunk<'_> {
    fn normalize(&self, options: &ParseOptions) -> Result<Vec<DiffLine>, ParseError> {
        trace!(
            "Normalizing hunk {} (-{},{} +{},{}) with {} body lines",
            self.origin.index,
            self.header.old_start,
            self.header.old_count,
            self.header.new_start,
            self.header.new_count,
            self.lines.len()
        );
        let normalized = run_normalizer(
            self.lines.as_slice(),
            self.header.old_start,
            self.header.new_start,
            options,
            &self.origin,
        )?;
        if normalized.old_consumed != self.header.old_count
            || normalized.new_consumed != self.header.new_count
        {
            warn!(
                "Hunk {} declares -{} +{} lines but its body covers -{} +{}",
                self.origin.index,
                self.header.old_count,
                self.header.new_count,
                normalized.old_consumed,
                normalized.new_consumed
            );
        }
        debug!(
            "Hunk {}: emitted {} lines, collapsed {} identical pairs",
            self.origin.index,
            normalized.lines.len(),
            normalized.collapsed
        );
        Ok(normalized.lines)
    }
}

// --- Hunk Reader ---

/// Reads hunks lazily from the input text.
///
/// Lines before the first header are skipped. A malformed header still
/// consumes its body, so the next call resumes at the following header.
#[derive(Debug)]
struct HunkReader<'a> {
    lines: Peekable<Enumerate<Split<'a, char>>>,
    hunk_count: usize,
}

impl<'a> HunkReader<'a> {
    fn new(content: &'a str) -> Self {
        // A single trailing newline terminates the last line; it is not an empty line of its own.
        let content = content.strip_suffix('\n').unwrap_or(content);
        Self {
            lines: content.split('\n').enumerate().peekable(),
            hunk_count: 0,
        }
    }
}

impl<'a> Iterator for HunkReader<'a> {
    type Item = Result<Hunk<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (header_index, header_line) = self
            .lines
            .by_ref()
            .find(|(_, line)| is_hunk_header(line))?;
        self.hunk_count += 1;

        let mut lines = Vec::new();
        while let Some((_, line)) = self.lines.next_if(|(_, line)| !is_hunk_header(line)) {
            lines.push(line);
        }

        let origin = HunkOrigin {
            index: self.hunk_count,
            header_line,
            header_input_line: header_index + 1,
        };
        let Some(header) = parse_hunk_header(header_line) else {
            return Some(Err(origin.header_error()));
        };

        Some(Ok(Hunk {
            origin,
            header,
            lines,
        }))
    }
}

fn is_hunk_header(line: &str) -> bool {
    line.starts_with("@@")
}

/// Parses a hunk header line such as `@@ -21,8 +21,9 @@ fn main() {`.
///
/// Anything after the closing `@@` is ignored. Returns `None` if the ranges
/// are missing, not plain decimal numbers, or end past `usize::MAX`.
fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, _section) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let (old_start, old_count) = parse_hunk_range(old)?;
    let (new_start, new_count) = parse_hunk_range(new)?;
    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
    })
}

/// Parses `start[,count]`. An omitted count means one line.
fn parse_hunk_range(range: &str) -> Option<(usize, usize)> {
    let (start, count) = match range.split_once(',') {
        Some((start, count)) => (parse_decimal(start)?, parse_decimal(count)?),
        None => (parse_decimal(range)?, 1),
    };
    // Start 0 is only meaningful for an empty range (e.g. a newly created file).
    if start == 0 && count != 0 {
        return None;
    }
    // The counter must still be representable one past the last covered line.
    start.checked_add(count)?;
    Some((start, count))
}

fn parse_decimal(field: &str) -> Option<usize> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

// --- Line Normalizer ---

/// Hunk-local old/new line counters.
///
/// Each method returns the record for the current position and advances the
/// counters it used, or `None` if a counter would overflow.
#[derive(Debug, Clone, Copy)]
struct LineCounters {
    old: usize,
    new: usize,
}

impl LineCounters {
    fn context(&mut self, content: &str) -> Option<DiffLine> {
        let line = DiffLine::context(content, self.old, self.new);
        self.old = self.old.checked_add(1)?;
        self.new = self.new.checked_add(1)?;
        Some(line)
    }

    fn deletion(&mut self, content: &str) -> Option<DiffLine> {
        let line = DiffLine::deletion(content, self.old);
        self.old = self.old.checked_add(1)?;
        Some(line)
    }

    fn addition(&mut self, content: &str) -> Option<DiffLine> {
        let line = DiffLine::addition(content, self.new);
        self.new = self.new.checked_add(1)?;
        Some(line)
    }
}

/// Deletions and additions of the current change run, each in original order.
#[derive(Debug, Default)]
struct ChangeRun<'a> {
    dels: Vec<&'a str>,
    adds: Vec<&'a str>,
}

impl ChangeRun<'_> {
    fn is_empty(&self) -> bool {
        self.dels.is_empty() && self.adds.is_empty()
    }

    /// Emits the run by pairing `dels[i]` with `adds[i]`, then the leftovers of
    /// the longer side. Returns the number of pairs folded into context, or
    /// `None` if the line counters overflow.
    fn flush(
        &mut self,
        counters: &mut LineCounters,
        out: &mut Vec<DiffLine>,
        collapse_identical: bool,
    ) -> Option<usize> {
        if self.is_empty() {
            return Some(0);
        }
        let paired = self.dels.len().min(self.adds.len());
        let mut collapsed = 0;
        for (del, add) in self.dels.iter().zip(&self.adds) {
            if collapse_identical && del == add {
                trace!("  Folding identical pair into context: '{}'", del);
                out.push(counters.context(del)?);
                collapsed += 1;
            } else {
                out.push(counters.deletion(del)?);
                out.push(counters.addition(add)?);
            }
        }
        for del in &self.dels[paired..] {
            out.push(counters.deletion(del)?);
        }
        for add in &self.adds[paired..] {
            out.push(counters.addition(add)?);
        }
        self.dels.clear();
        self.adds.clear();
        Some(collapsed)
    }
}

/// Why the normalizer rejected a body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyError {
    UnknownMarker,
    CounterOverflow,
}

/// The normalized body of one hunk.
#[derive(Debug)]
struct Normalized {
    lines: Vec<DiffLine>,
    collapsed: usize,
    /// Old-file lines covered by the body (context plus deletions).
    old_consumed: usize,
    /// New-file lines covered by the body (context plus additions).
    new_consumed: usize,
}

/// Single forward scan over one hunk body.
#[derive(Debug)]
struct Normalizer<'a> {
    start: LineCounters,
    counters: LineCounters,
    run: ChangeRun<'a>,
    out: Vec<DiffLine>,
    collapse_identical: bool,
    collapsed: usize,
}

impl<'a> Normalizer<'a> {
    fn new(old_start: usize, new_start: usize, options: &ParseOptions) -> Self {
        let start = LineCounters {
            old: old_start,
            new: new_start,
        };
        Self {
            start,
            counters: start,
            run: ChangeRun::default(),
            out: Vec::new(),
            collapse_identical: options.collapse_identical,
            collapsed: 0,
        }
    }

    /// Classifies one raw line.
    fn push(&mut self, raw: &'a str) -> Result<(), BodyError> {
        let marker = raw.chars().next().ok_or(BodyError::UnknownMarker)?;
        let kind = LineKind::from_marker(marker).ok_or(BodyError::UnknownMarker)?;
        let content = &raw[marker.len_utf8()..];
        match kind {
            LineKind::Context => {
                self.flush_run()?;
                let line = self
                    .counters
                    .context(content)
                    .ok_or(BodyError::CounterOverflow)?;
                self.out.push(line);
            }
            LineKind::Deletion => self.run.dels.push(content),
            LineKind::Addition => self.run.adds.push(content),
        }
        Ok(())
    }

    fn flush_run(&mut self) -> Result<(), BodyError> {
        let collapsed = self
            .run
            .flush(&mut self.counters, &mut self.out, self.collapse_identical)
            .ok_or(BodyError::CounterOverflow)?;
        self.collapsed += collapsed;
        Ok(())
    }

    /// Flushes the last change run.
    fn finish(mut self) -> Result<Normalized, BodyError> {
        self.flush_run()?;
        Ok(Normalized {
            old_consumed: self.counters.old - self.start.old,
            new_consumed: self.counters.new - self.start.new,
            lines: self.out,
            collapsed: self.collapsed,
        })
    }
}

/// Feeds every body line to a fresh normalizer, failing on the first unrecognized
/// marker. A body whose numbering overflows is blamed on the hunk's header.
fn run_normalizer<T: AsRef<str>>(
    lines: &[T],
    old_start: usize,
    new_start: usize,
    options: &ParseOptions,
    origin: &HunkOrigin<'_>,
) -> Result<Normalized, ParseError> {
    let to_parse_error = |err: BodyError, line_index: usize, raw: &str| match err {
        BodyError::UnknownMarker => origin.marker_error(line_index, raw),
        BodyError::CounterOverflow => origin.header_error(),
    };
    let mut normalizer = Normalizer::new(old_start, new_start, options);
    for (i, line) in lines.iter().enumerate() {
        let raw = line.as_ref();
        normalizer
            .push(raw)
            .map_err(|err| to_parse_error(err, i + 1, raw))?;
    }
    normalizer.finish().map_err(|_| origin.header_error())
}

// --- Core Logic ---

/// Normalizes the body of a single hunk whose header has already been parsed.
///
/// `lines` are the raw body lines, each still carrying its ` `, `+` or `-`
/// marker. `old_start` and `new_start` seed the hunk-local line counters.
/// This is useful when the caller has already split a diff into hunks.
///
/// # Errors
///
/// Returns [`ParseError::UnrecognizedLineMarker`] (with `hunk_index` 1) for the
/// first line with any other leading character, including empty lines. Body
/// line `i` is reported at `input_line` `i`.
///
/// Returns [`ParseError::MalformedHunkHeader`] if the body would number a line
/// past `usize::MAX`. Its `line` is the header implied by the two starts, as in
/// `@@ -10 +20 @@`, and its `input_line` is `0`.
///
/// # Example
///
/// ```
/// # use hunkfold::{normalize_hunk_lines, DiffLine, ParseOptions};
/// let body = [" keep", "-a", "-b", "+c"];
/// let lines = normalize_hunk_lines(&body, 10, 20, &ParseOptions::default()).unwrap();
/// assert_eq!(
///     lines,
///     vec![
///         DiffLine::context("keep", 10, 20),
///         DiffLine::deletion("a", 11),
///         DiffLine::addition("c", 21),
///         DiffLine::deletion("b", 12),
///     ]
/// );
/// ```
pub fn normalize_hunk_lines<T: AsRef<str>>(
    lines: &[T],
    old_start: usize,
    new_start: usize,
    options: &ParseOptions,
) -> Result<Vec<DiffLine>, ParseError> {
    let header_line = format!("@@ -{} +{} @@", old_start, new_start);
    let origin = HunkOrigin {
        index: 1,
        header_line: &header_line,
        header_input_line: 0,
    };
    let normalized = run_normalizer(lines, old_start, new_start, options, &origin)?;
    Ok(normalized.lines)
}

/// Parses a unified diff into normalized line records using default options.
///
/// See [`parse_diff_with_options`] for details.
///
/// # Example
///
/// ```
/// # use hunkfold::{parse_diff, DiffLine};
/// let lines = parse_diff("@@ -1,1 +1,1 @@\n-old\n+new\n").unwrap();
/// assert_eq!(lines, vec![DiffLine::deletion("old", 1), DiffLine::addition("new", 1)]);
/// ```
pub fn parse_diff(content: &str) -> Result<Vec<DiffLine>, ParseError> {
    parse_diff_with_options(content, &ParseOptions::default())
}

/// Parses a unified diff into normalized line records.
///
/// The records of all hunks are concatenated in hunk order. Input that contains
/// no hunk header at all yields an empty list.
///
/// # Errors
///
/// Returns the error of the first hunk (in input order) that fails to parse.
/// No partial output is returned.
pub fn parse_diff_with_options(
    content: &str,
    options: &ParseOptions,
) -> Result<Vec<DiffLine>, ParseError> {
    let hunks: Vec<Result<Hunk<'_>, ParseError>> = HunkReader::new(content).collect();
    debug!("Read {} hunk(s) from {} bytes of input", hunks.len(), content.len());

    #[cfg(feature = "parallel")]
    let iter = hunks.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = hunks.iter();

    let normalized: Vec<Result<Vec<DiffLine>, ParseError>> = iter
        .map(|hunk| match hunk {
            Ok(hunk) => hunk.normalize(options),
            Err(e) => Err(e.clone()),
        })
        .collect();

    let mut all_lines = Vec::new();
    for result in normalized {
        all_lines.extend(result?);
    }
    Ok(all_lines)
}

/// An iterator that parses and normalizes a diff one hunk at a time.
///
/// Each item is the result for one hunk, in input order. A failing hunk yields
/// its error and iteration continues with the next header, leaving the decision
/// to skip or abort to the caller.
#[derive(Debug)]
pub struct HunkParser<'a> {
    reader: HunkReader<'a>,
    options: ParseOptions,
}

impl<'a> HunkParser<'a> {
    /// Creates a new `HunkParser` over the given diff text.
    pub fn new(content: &'a str, options: ParseOptions) -> Self {
        Self {
            reader: HunkReader::new(content),
            options,
        }
    }
}

impl Iterator for HunkParser<'_> {
    type Item = Result<Vec<DiffLine>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let hunk = self.reader.next()?;
        Some(hunk.and_then(|hunk| hunk.normalize(&self.options)))
    }
}
