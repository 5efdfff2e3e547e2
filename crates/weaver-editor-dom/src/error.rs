//! Error types for tree mutation and markup reading.

use std::borrow::Cow;

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};

use crate::tree::NodeId;

/// Errors raised by structural tree operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum DomError {
    /// The insertion would break the tree shape.
    #[error("cannot insert {child} into {parent}: {reason}")]
    #[diagnostic(code(weaver::dom::hierarchy))]
    Hierarchy {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },

    /// A reference node passed to an insertion is not a child of the target.
    #[error("{reference} is not a child of {parent}")]
    #[diagnostic(code(weaver::dom::not_a_child))]
    NotAChild { parent: NodeId, reference: NodeId },

    /// Markup could not be read.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Markup(#[from] MarkupError),
}

/// Markup the HTML parser reported an error for, with the offending line.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("markup error on line {line}: {message}")]
#[diagnostic(code(weaver::dom::markup))]
pub struct MarkupError {
    message: Cow<'static, str>,
    line: usize,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
}

impl MarkupError {
    /// `line` is 1-based; the label covers that whole line.
    pub(crate) fn new(message: Cow<'static, str>, src: &str, line: usize) -> Self {
        let start = SourceOffset::from_location(src, line, 1)
            .offset()
            .min(src.len());
        let len = src[start..].find('\n').unwrap_or(src.len() - start);
        Self {
            message,
            line,
            src: NamedSource::new("markup", src.to_owned()),
            span: SourceSpan::new(start.into(), len),
        }
    }

    /// The parser's description of the error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line the parser was on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Byte offset of the start of that line.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}
