//! Per-parse state and the back-quote re-parse
//!
//! The grammar is stateless, so anything a parse must remember beyond its
//! output lives here, shared by every level of the grammar through an `Rc`.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use chumsky::error::Simple;
use tracing::{debug, trace};

use crate::ast::{Script, Word};
use crate::error::{ParseError, ParseResult};
use crate::word;

pub(crate) type Span = Range<usize>;

/// State of one call to [`crate::parse`].
#[derive(Debug)]
pub struct ParseState {
    limit: usize,
    /// Furthest offset at which the grammar tried to nest past the limit.
    nesting_exceeded: Cell<Option<usize>>,
    violation: RefCell<Option<ParseError>>,
    /// Offset of the last `)` in the text being parsed.
    last_close_paren: Cell<Option<usize>>,
}

impl ParseState {
    pub fn new(limit: usize, input: &str) -> Rc<Self> {
        Rc::new(Self {
            limit,
            nesting_exceeded: Cell::new(None),
            violation: RefCell::new(None),
            last_close_paren: Cell::new(last_close_paren(input)),
        })
    }

    /// Nested levels allowed below the top-level script.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record that the grammar tried to go one level past the limit.
    pub(crate) fn exceed_nesting(&self, span: Span) -> Simple<char> {
        self.mark_exceeded(span.start);
        Simple::custom(span, format!("nesting deeper than {} levels", self.limit))
    }

    fn mark_exceeded(&self, offset: usize) {
        let furthest = self.nesting_exceeded.get();
        if furthest.is_none() {
            debug!(limit = self.limit, offset, "nesting limit reached");
        }
        self.nesting_exceeded
            .set(Some(furthest.map_or(offset, |at| at.max(offset))));
    }

    /// Whether a `)` appears at or after `offset`. A nested script opened
    /// with `(` cannot close otherwise.
    pub(crate) fn can_close_at(&self, offset: usize) -> bool {
        self.last_close_paren
            .get()
            .is_some_and(|close| close >= offset)
    }

    /// Run a parse of `text`, a separate input nested at `span`. Offsets
    /// recorded inside it are not offsets of the enclosing input, so an
    /// inner failure at the nesting bound is recorded at `span` instead.
    pub(crate) fn reparse<T, E>(
        &self,
        text: &str,
        span: Span,
        parse: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let outer_exceeded = self.nesting_exceeded.take();
        let outer_close = self.last_close_paren.replace(last_close_paren(text));

        let result = parse();

        self.last_close_paren.set(outer_close);
        let inner_exceeded = self.nesting_exceeded.replace(outer_exceeded);
        if inner_exceeded.is_some() && result.is_err() {
            self.mark_exceeded(span.start);
        }
        result
    }

    /// Turn a builder result into a grammar result. A builder error is kept
    /// even if the grammar later backtracks past it.
    pub(crate) fn check<T>(&self, result: ParseResult<T>, span: Span) -> Result<T, Simple<char>> {
        result.map_err(|err| {
            let message = err.to_string();
            let mut violation = self.violation.borrow_mut();
            if violation.is_none() {
                debug!(error = %message, offset = span.start, "builder rejected grammar output");
                *violation = Some(err);
            }
            Simple::custom(span, message)
        })
    }

    /// Decide the outcome of a parse from the grammar's result and anything
    /// recorded along the way. The nesting bound is only blamed when it was
    /// hit at or beyond the furthest syntax error.
    pub(crate) fn finish(
        &self,
        result: Result<Script, Vec<Simple<char>>>,
    ) -> ParseResult<Script> {
        if let Some(violation) = self.violation.borrow_mut().take() {
            return Err(violation);
        }
        let errors = match result {
            Ok(script) => return Ok(script),
            Err(errors) => errors,
        };
        match (ParseError::from_syntax(errors), self.nesting_exceeded.get()) {
            (ParseError::Syntax { offset, .. }, Some(at)) if at >= offset => {
                Err(ParseError::MaxNestingExceeded { limit: self.limit })
            }
            (error, _) => Err(error),
        }
    }
}

/// Character offset of the last `)`, matching the offsets of grammar spans.
fn last_close_paren(text: &str) -> Option<usize> {
    text.chars()
        .enumerate()
        .filter(|(_, c)| *c == ')')
        .last()
        .map(|(offset, _)| offset)
}

/// Build the command substitution for back-quoted text by parsing the text
/// as a script of its own. `reparse` must parse one level deeper than the
/// word containing the back-quotes.
pub fn back_quote<F>(text: &str, depth: usize, reparse: F) -> Result<Word, String>
where
    F: FnOnce(&str) -> Result<Script, Vec<Simple<char>>>,
{
    trace!(depth, len = text.len(), "re-parsing back-quoted text");
    reparse(text)
        .map(word::command_substitution)
        .map_err(|errors| match ParseError::from_syntax(errors) {
            ParseError::Syntax { message, offset } => {
                format!("in back-quoted command at offset {offset}: {message}")
            }
            other => other.to_string(),
        })
}
