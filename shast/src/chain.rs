//! Statement chaining
//!
//! A chain is built as an append-only list of links while the grammar
//! matches left to right. The tail is always the last link, so attaching an
//! operator and the statement after it never walks or mutates a linked
//! structure; the owned [`Statement`] list is only produced once the chain
//! is complete.

use crate::ast::{ControlOperator, Script, Statement, StatementKind};
use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Link {
    kind: StatementKind,
    control: ControlOperator,
}

/// A statement chain under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    pub fn single(kind: StatementKind) -> Self {
        Self {
            links: vec![Link {
                kind,
                control: ControlOperator::Sequence,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Set the tail's operator to `op` and append `next` after it.
    pub fn thread(&mut self, op: ControlOperator, mut next: Self) -> ParseResult<()> {
        self.terminate(op)?;
        self.links.append(&mut next.links);
        Ok(())
    }

    /// Set the operator following the tail, with nothing after it.
    pub fn terminate(&mut self, op: ControlOperator) -> ParseResult<()> {
        let tail = self
            .links
            .last_mut()
            .ok_or_else(|| ParseError::invariant("control operator with no preceding statement"))?;
        tail.control = op;
        Ok(())
    }

    /// Fold the links into the owned linked list, head first.
    pub fn into_statement(self) -> Option<Statement> {
        let mut next: Option<Box<Statement>> = None;
        for link in self.links.into_iter().rev() {
            next = Some(Box::new(Statement {
                kind: link.kind,
                control: link.control,
                next,
            }));
        }
        next.map(|head| *head)
    }
}

/// Normalise an operator token. A newline separates statements exactly like
/// `;`.
pub fn control_operator(token: &str) -> ParseResult<ControlOperator> {
    ControlOperator::from_token(token)
        .ok_or_else(|| ParseError::invariant(format!("unknown control operator {token:?}")))
}

/// A statement, optionally followed by `&&`/`||` and the statement after it.
pub fn statement(
    kind: StatementKind,
    next: Option<(ControlOperator, Chain)>,
) -> ParseResult<Chain> {
    let mut chain = Chain::single(kind);
    if let Some((op, rest)) = next {
        chain.thread(op, rest)?;
    }
    Ok(chain)
}

/// An and-or list: `first`, then each `&&`/`||` with the statement after
/// it, threaded left to right.
pub fn and_or_list(first: StatementKind, rest: Vec<(&str, StatementKind)>) -> ParseResult<Chain> {
    let mut chain = statement(first, None)?;
    for (op, kind) in rest {
        let (op, next) = chained_statement(op, Chain::single(kind))?;
        chain.thread(op, next)?;
    }
    Ok(chain)
}

/// Pair an operator token with the statement that follows it.
pub fn chained_statement(op: &str, chain: Chain) -> ParseResult<(ControlOperator, Chain)> {
    Ok((control_operator(op)?, chain))
}

/// Thread a list of statements into one chain.
///
/// Each operator lands on the tail of everything built so far, which may
/// itself be a multi-statement chain (`a && b; c`). A trailing operator with
/// no statement after it is kept as the tail's control.
pub fn statement_list(
    first: Chain,
    tail: Vec<(ControlOperator, Chain)>,
    last: Option<ControlOperator>,
) -> ParseResult<Chain> {
    let mut chain = first;
    for (op, next) in tail {
        chain.thread(op, next)?;
    }
    if let Some(op) = last {
        chain.terminate(op)?;
    }
    Ok(chain)
}

/// A script holding the given chain, or nothing.
pub fn script(chain: Option<Chain>) -> Script {
    Script::new(chain.and_then(Chain::into_statement).into_iter().collect())
}
