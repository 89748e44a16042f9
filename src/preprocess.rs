//! Annotation preprocessing: compilable example source → template text.
//!
//! Template artifacts are written as ordinary Go (or Prisma) source so that
//! template authors can build and run them. Everything that only matters for
//! generation hides behind comment markers:
//!
//! ```text
//! // @alchemy replace package dao          ← marker: next line becomes `package dao`
//! package prisma                           ← placeholder, valid in the example
//!
//! import (
//!     // @alchemy statement "{{ .ModuleName }}/prisma/db"
//!     "github.com/struckchure/go-alchemy/prisma/db"
//! )
//!
//! // @alchemy block {{- if .Login }}       ← marker stripped, directive survives
//! func (u *UserDao) GetByEmail(email string) (*User, error) { ... }
//! // @alchemy block {{- end }}
//! ```
//!
//! | Marker | Effect |
//! |---|---|
//! | `// @alchemy block` | Stripped from the line; the rest of the line (a template directive) stays |
//! | `// @alchemy statement <payload>` | Marker line dropped; the next line is replaced by `<payload>` |
//! | `// @alchemy replace <payload>` | Marker line dropped; the next line is replaced by `<payload>` |
//!
//! Markers are recognised only at the start of a line once leading whitespace
//! is ignored. Statement and replace markers always consume the line directly
//! below them, so one of them on the last line is an error.
//!
//! The output is rebuilt line by line into a fresh buffer. Nothing is ever
//! removed from or inserted into the sequence being walked.

use thiserror::Error;

/// Stripped wherever it appears; it only hides a directive from the compiler.
pub const BLOCK_MARKER: &str = "// @alchemy block";
/// Replaces the following line with its payload (typically an import path).
pub const STATEMENT_MARKER: &str = "// @alchemy statement";
/// Replaces the following line with its payload (typically a declaration).
pub const REPLACE_MARKER: &str = "// @alchemy replace";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("`{marker}` on line {line} has no following line to replace")]
    MissingTarget { marker: &'static str, line: usize },
}

/// A directive found at the start of a trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive<'a> {
    Statement(&'a str),
    Replace(&'a str),
}

impl Directive<'_> {
    fn marker(&self) -> &'static str {
        match self {
            Directive::Statement(_) => STATEMENT_MARKER,
            Directive::Replace(_) => REPLACE_MARKER,
        }
    }

    fn payload(&self) -> &str {
        match self {
            Directive::Statement(p) | Directive::Replace(p) => p,
        }
    }
}

fn parse_directive(line: &str) -> Option<Directive<'_>> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix(STATEMENT_MARKER) {
        return Some(Directive::Statement(rest.trim()));
    }
    if let Some(rest) = trimmed.strip_prefix(REPLACE_MARKER) {
        return Some(Directive::Replace(rest.trim()));
    }
    None
}

/// Rewrite annotated source into template text.
///
/// Pure: the same input always produces the same output.
pub fn preprocess(input: &str) -> Result<String, PreprocessError> {
    let terminator = if input.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing = input.ends_with(terminator);

    let mut lines: Vec<&str> = input.split(terminator).collect();
    if trailing {
        // `split` yields an empty segment after the final terminator.
        lines.pop();
    }

    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    while cursor < lines.len() {
        let line = lines[cursor];
        match parse_directive(line) {
            Some(directive) => {
                if cursor + 1 >= lines.len() {
                    return Err(PreprocessError::MissingTarget {
                        marker: directive.marker(),
                        line: cursor + 1,
                    });
                }
                output.push(directive.payload().to_string());
                // The placeholder line below the marker is consumed too.
                cursor += 2;
            }
            None => {
                output.push(line.replace(BLOCK_MARKER, ""));
                cursor += 1;
            }
        }
    }

    let mut text = output.join(terminator);
    if trailing {
        text.push_str(terminator);
    }
    Ok(text)
}
