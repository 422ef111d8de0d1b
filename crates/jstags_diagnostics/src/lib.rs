//! jstags_diagnostics: Diagnostic messages and error reporting.
//!
//! The scanner and parser are tolerant: problems in the source are
//! collected here as diagnostics rather than aborting the pipeline. A
//! file whose collection contains error-category diagnostics after the
//! parse is treated as unparsable by the indexer.

use jstags_core::text::TextRange;
use std::fmt;

/// Diagnostic severity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1002, 2201).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}` placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The source byte range where this diagnostic occurred, if any.
    pub range: Option<TextRange>,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            range: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a new diagnostic with file and range info.
    pub fn with_location(
        file: String,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            range: Some(range),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(range) = self.range {
                write!(f, "({})", range.pos)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} JT{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, ... with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.range.map(|r| r.pos).unwrap_or(0);
            let b_pos = b.range.map(|r| r.pos).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        diag!(1002, Error, "Unterminated string literal.");
    pub const ASTERISK_SLASH_EXPECTED: DiagnosticMessage =
        diag!(1010, Error, "'*/' expected.");
    pub const INVALID_CHARACTER: DiagnosticMessage =
        diag!(1127, Error, "Invalid character.");
    pub const DIGIT_EXPECTED: DiagnosticMessage =
        diag!(1124, Error, "Digit expected.");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage =
        diag!(1103, Error, "Identifier expected.");
    pub const _0_EXPECTED: DiagnosticMessage =
        diag!(1105, Error, "'{0}' expected.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage =
        diag!(1112, Error, "Unexpected token.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage =
        diag!(1109, Error, "Expression expected.");
    pub const PROPERTY_NAME_EXPECTED: DiagnosticMessage =
        diag!(1136, Error, "Property name expected.");
    pub const VARIABLE_DECLARATION_EXPECTED: DiagnosticMessage =
        diag!(1134, Error, "Variable declaration expected.");
    pub const AN_ELEMENT_ACCESS_EXPRESSION_SHOULD_TAKE_AN_ARGUMENT: DiagnosticMessage =
        diag!(1011, Error, "An element access expression should take an argument.");

    // ========================================================================
    // Indexing errors (2200-2299)
    // ========================================================================
    pub const CANNOT_INDEX_FILE_WITH_SYNTAX_ERRORS: DiagnosticMessage =
        diag!(2201, Error, "Cannot index '{0}': the file has {1} syntax error(s).");
    pub const SCOPE_CLOSED_WITHOUT_MATCHING_OPEN: DiagnosticMessage =
        diag!(2202, Error, "Scope closed without a matching open at offset {0}.");
    pub const UNRESOLVED_NAME_IN_MEMBER_CHAIN: DiagnosticMessage =
        diag!(2210, Warning, "Name in member access chain could not be resolved.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(format_message("'{0}' expected.", &[";"]), "';' expected.");
        assert_eq!(
            format_message("Cannot index '{0}': the file has {1} syntax error(s).", &["a.js", "2"]),
            "Cannot index 'a.js': the file has 2 syntax error(s)."
        );
    }

    #[test]
    fn test_collection_error_count() {
        let mut diags = DiagnosticCollection::new();
        assert!(!diags.has_errors());
        diags.add(Diagnostic::new(&messages::IDENTIFIER_EXPECTED, &[]));
        diags.add(Diagnostic::new(&messages::UNRESOLVED_NAME_IN_MEMBER_CHAIN, &[]));
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_sort_by_position() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::with_location(
            "a.js".into(),
            TextRange::new(10, 12),
            &messages::UNEXPECTED_TOKEN,
            &[],
        ));
        diags.add(Diagnostic::with_location(
            "a.js".into(),
            TextRange::new(2, 4),
            &messages::UNEXPECTED_TOKEN,
            &[],
        ));
        diags.sort();
        assert_eq!(diags.diagnostics()[0].range.unwrap().pos, 2);
    }
}
