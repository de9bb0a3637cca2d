//! Simple command assembly
//!
//! Tokens around a command name are classified here: redirects keep their
//! order, assignments become the command's environment, and everything else
//! after the name is an argument.

use crate::ast::{Builtin, Command, CommandName, Redirect, Word};
use crate::redirect;

/// `NAME=value` in front of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: Word,
}

/// A token recognised before or after a command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandToken {
    Assignment(Assignment),
    Redirect(Redirect),
    Argument(Word),
}

/// The tokens of one pipeline stage, split around the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParts {
    pub pre: Vec<CommandToken>,
    pub name: Option<CommandName>,
    pub post: Vec<CommandToken>,
}

/// A missing value (`FOO=`) assigns the empty string.
pub fn variable_assignment(name: String, value: Option<Word>) -> Assignment {
    Assignment {
        name,
        value: value.unwrap_or_default(),
    }
}

pub fn builtin_command_name(name: &str) -> CommandName {
    CommandName::Builtin(Builtin {
        name: name.to_string(),
    })
}

/// Build one simple command.
///
/// `pre` holds the assignments and redirects before the name, `post` the
/// arguments and redirects after it. A pipe, when present, is appended to
/// the redirects after every classified token.
pub fn command(
    pre: Vec<CommandToken>,
    name: Option<CommandName>,
    post: Vec<CommandToken>,
    pipe: Option<Redirect>,
) -> Command {
    let mut command = Command::new(name);

    for token in pre.into_iter().chain(post) {
        match token {
            CommandToken::Redirect(redirect) => command.redirects.push(redirect),
            CommandToken::Assignment(Assignment { name, value }) => {
                command.env.insert(name, value);
            }
            CommandToken::Argument(word) => command.args.push(word),
        }
    }

    if let Some(pipe) = pipe {
        command.redirects.push(pipe);
    }

    command
}

/// Join pipeline stages, last first, so each stage ends with a pipe into
/// the one after it.
pub fn pipeline(first: CommandParts, rest: Vec<CommandParts>) -> Command {
    let downstream = rest.into_iter().rev().fold(None, |next, stage| {
        Some(redirect::pipe(command(stage.pre, stage.name, stage.post, next)))
    });
    command(first.pre, first.name, first.post, downstream)
}
