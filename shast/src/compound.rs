//! Compound statement builders
//!
//! Each builder returns a [`StatementKind`], which chains exactly like a
//! simple command.

use crate::ast::{
    ConditionalLoop, ForLoop, IfElse, LoopKind, Script, StatementKind, Subshell, Time, Word,
};

pub fn subshell(statements: Script) -> StatementKind {
    StatementKind::Subshell(Subshell { statements })
}

/// `while test; do body; done` or `until test; do body; done`.
pub fn conditional_loop(kind: LoopKind, test: Script, body: Script) -> StatementKind {
    let inner = ConditionalLoop { test, body };
    match kind {
        LoopKind::While => StatementKind::WhileLoop(inner),
        LoopKind::Until => StatementKind::UntilLoop(inner),
    }
}

/// `for name [in subjects...]; do body; done`. Without an `in` clause the
/// subject list is empty.
pub fn for_loop(loop_variable: String, subjects: Option<Vec<Word>>, body: Script) -> StatementKind {
    StatementKind::ForLoop(ForLoop {
        loop_variable,
        subjects: subjects.unwrap_or_default(),
        body,
    })
}

/// `if`, with any `elif` arms and an optional `else`. No arms is recorded as
/// `None` rather than an empty list.
pub fn if_block(
    test: Script,
    body: Script,
    elif_blocks: Vec<IfElse>,
    else_body: Option<Script>,
) -> StatementKind {
    StatementKind::IfElse(IfElse {
        test,
        body,
        elif_blocks: (!elif_blocks.is_empty()).then_some(elif_blocks),
        else_body,
    })
}

/// One `elif test; then body` arm.
pub fn elif_block(test: Script, body: Script) -> IfElse {
    IfElse {
        test,
        body,
        elif_blocks: None,
        else_body: None,
    }
}

/// `time [-flags] statements`.
pub fn time(flags: Vec<String>, command: Script) -> StatementKind {
    StatementKind::Time(Time { flags, command })
}
