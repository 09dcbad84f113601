//! SQL text normalization
//!
//! Template placeholders such as `{{PK}}` are resolved only at runtime, and
//! string literal contents may look like bind variables (`'HH24:MI'`), so
//! both are removed before anything scans or parses the text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Span;

/// Prefix a bind variable is rewritten to so the grammar sees a plain identifier
pub const BIND_VAR_PREFIX: &str = "bindvar_";

static TEMPLATE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{[a-z]{2}\}\}").expect("invalid built-in placeholder regex")
});

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[^']*'").expect("invalid built-in string literal regex"));

/// A leading extra colon marks a `::type` cast, which is not a bind variable.
pub(crate) static BIND_VAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<cast>:?):(?P<name>[A-Za-z0-9_]+)").expect("invalid built-in bind var regex")
});

/// Normalized SQL text that remembers where each byte came from in the raw text.
///
/// The rewrites change lengths, so parser positions must be mapped back
/// through [`NormalizedSql::raw_span`] before they are shown to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSql<'a> {
    raw: &'a str,
    text: String,
    /// Raw byte offset of every byte of `text`, plus one trailing entry for its end
    origins: Vec<usize>,
}

impl<'a> NormalizedSql<'a> {
    fn identity(raw: &'a str) -> Self {
        Self {
            raw,
            text: raw.to_string(),
            origins: (0..=raw.len()).collect(),
        }
    }

    /// Remove template placeholders and blank out string literal contents
    pub fn stripped(raw: &'a str) -> Self {
        Self::identity(raw)
            .replace_all(&TEMPLATE_PLACEHOLDER, |_| String::new())
            .replace_all(&STRING_LITERAL, |_| "''".to_string())
    }

    /// Strip, then rewrite `:name` bind variables into plain identifiers
    pub fn for_parser(raw: &'a str) -> Self {
        Self::stripped(raw).replace_all(&BIND_VAR_TOKEN, bind_var_identifier)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Identifier-like word ending right before a normalized position, if any
    pub fn word_before(&self, span: Span) -> Option<&str> {
        let offset = offset_of(&self.text, span.line, span.column)?;
        let before = self.text[..offset].trim_end();
        let start = before
            .char_indices()
            .rev()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &before[start..];
        (!word.is_empty()).then_some(word)
    }

    /// Map a 1-indexed line/column in the normalized text back to the raw text.
    ///
    /// Positions inside rewritten text land on the start of what it replaced.
    pub fn raw_span(&self, span: Span) -> Span {
        let Some(offset) = offset_of(&self.text, span.line, span.column) else {
            return span;
        };
        let raw_offset = self.origins[offset];
        let (line, column) = line_col_of(self.raw, raw_offset);
        Span::with_location(line, column, span.length)
    }

    fn replace_all(self, re: &Regex, mut replacement: impl FnMut(&Captures) -> String) -> Self {
        let mut text = String::with_capacity(self.text.len());
        let mut origins = Vec::with_capacity(self.origins.len());
        let mut last = 0;

        for caps in re.captures_iter(&self.text) {
            let Some(m) = caps.get(0) else { continue };
            text.push_str(&self.text[last..m.start()]);
            origins.extend_from_slice(&self.origins[last..m.start()]);

            let replaced = replacement(&caps);
            origins.extend(std::iter::repeat(self.origins[m.start()]).take(replaced.len()));
            text.push_str(&replaced);
            last = m.end();
        }
        text.push_str(&self.text[last..]);
        origins.extend_from_slice(&self.origins[last..]);

        Self {
            raw: self.raw,
            text,
            origins,
        }
    }
}

/// Byte offset of a 1-indexed line/column, counting columns in characters
fn offset_of(text: &str, line: usize, column: usize) -> Option<usize> {
    let (mut cur_line, mut cur_column) = (1, 1);
    for (offset, ch) in text.char_indices() {
        if cur_line == line && cur_column == column {
            return Some(offset);
        }
        if ch == '\n' {
            cur_line += 1;
            cur_column = 1;
        } else {
            cur_column += 1;
        }
    }
    (cur_line == line && cur_column == column).then_some(text.len())
}

/// 1-indexed line/column of a byte offset
fn line_col_of(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// Remove template placeholders and blank out string literal contents.
///
/// Idempotent: `strip_templates(strip_templates(s)) == strip_templates(s)`.
pub fn strip_templates(sql: &str) -> String {
    NormalizedSql::stripped(sql).into_string()
}

/// Rewrite `:name` bind variables into `bindvar_name` identifiers.
pub fn rewrite_bind_vars(sql: &str) -> String {
    BIND_VAR_TOKEN
        .replace_all(sql, bind_var_identifier)
        .into_owned()
}

fn bind_var_identifier(caps: &Captures) -> String {
    if caps["cast"].is_empty() {
        format!("{}{}", BIND_VAR_PREFIX, &caps["name"])
    } else {
        caps[0].to_string()
    }
}

/// Full normalization for the syntax validator and shape inferrer.
pub fn normalize_for_parser(sql: &str) -> String {
    NormalizedSql::for_parser(sql).into_string()
}
