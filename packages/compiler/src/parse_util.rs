//! Parse Utilities
//!
//! Source spans, line/column translation and parse errors shared by every stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chars;

/// Half-open byte range `[start, end)` into the authored template text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        SourceSpan { start, end }
    }

    pub fn empty(at: usize) -> Self {
        SourceSpan { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Zero-width spans contain their own position so cursor queries at an
    /// empty expression still hit.
    pub fn contains(&self, offset: usize) -> bool {
        if self.is_empty() {
            offset == self.start
        } else {
            offset >= self.start && offset < self.end
        }
    }

    /// Same as `contains` but includes the end position (cursor after the last char).
    pub fn touches(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn covers(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn shift(&self, delta: usize) -> SourceSpan {
        SourceSpan::new(self.start + delta, self.end + delta)
    }

    pub fn cover(a: SourceSpan, b: SourceSpan) -> SourceSpan {
        SourceSpan::new(a.start.min(b.start), a.end.max(b.end))
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Maps byte offsets in decoded text (character references expanded) back to the
/// authored source. Offsets inside an expanded reference map to its `&`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffsetMap {
    origin: usize,
    skip: usize,
    /// `(decoded_start, decoded_end, source_start, source_end)` relative to `origin`, ascending.
    edits: Vec<(usize, usize, usize, usize)>,
}

impl OffsetMap {
    pub fn verbatim(origin: usize) -> Self {
        OffsetMap {
            origin,
            skip: 0,
            edits: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, decoded: (usize, usize), source: (usize, usize)) {
        self.edits.push((decoded.0, decoded.1, source.0, source.1));
    }

    pub fn is_verbatim(&self) -> bool {
        self.edits.is_empty()
    }

    /// The same map with decoded offset `from` as its zero.
    pub fn view(&self, from: usize) -> OffsetMap {
        OffsetMap {
            skip: self.skip + from,
            ..self.clone()
        }
    }

    /// Absolute source offset of decoded offset `offset`.
    pub fn source(&self, offset: usize) -> usize {
        let decoded = self.skip + offset;
        let mut relative = decoded;
        for &(dec_start, dec_end, src_start, src_end) in &self.edits {
            if decoded < dec_start {
                break;
            }
            if decoded < dec_end {
                return self.origin + src_start;
            }
            relative = src_end + (decoded - dec_end);
        }
        self.origin + relative
    }

    pub fn span(&self, start: usize, end: usize) -> SourceSpan {
        SourceSpan::new(self.source(start), self.source(end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Offset <-> line/column translation, 0-based on both axes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in text.char_indices() {
            if ch == chars::LF {
                line_starts.push(i + 1);
            }
        }
        LineIndex {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol {
            line,
            col: offset - self.line_starts[line],
        }
    }

    pub fn offset(&self, pos: LineCol) -> usize {
        match self.line_starts.get(pos.line) {
            Some(start) => (start + pos.col).min(self.len),
            None => self.len,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    pub span: SourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: SourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    pub fn warning(span: SourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Warning,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.msg, self.span)
    }
}
