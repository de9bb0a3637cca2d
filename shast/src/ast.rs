//! Abstract Syntax Tree for parsed shell scripts
//!
//! These node shapes are the contract between the parser and any consumer
//! (executor, linter, formatter). Enums are internally tagged with a `type`
//! field, so the serialized form names every node the same way the builders
//! do: `literal`, `glob`, `redirectFd`, `forLoop`, and so on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An ordered sequence of statement chains.
///
/// A script parsed from text holds at most one chain: `;`, `&` and newlines
/// all thread statements into the same chain through [`Statement::next`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub statements: Vec<Statement>,
}

impl Script {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Walk every statement of every chain, head to tail.
    pub fn iter_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().flat_map(Statement::chain)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Operator joining a statement to the one after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlOperator {
    /// `;` or a newline: run next unconditionally
    #[default]
    #[serde(rename = ";")]
    Sequence,
    /// `&`: run in the background
    #[serde(rename = "&")]
    Background,
    /// `&&`: run next only if this one succeeded
    #[serde(rename = "&&")]
    And,
    /// `||`: run next only if this one failed
    #[serde(rename = "||")]
    Or,
}

impl ControlOperator {
    /// Map an operator token to its operator. A newline is a separator
    /// identical to `;`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ";" | "\n" => Some(Self::Sequence),
            "&" => Some(Self::Background),
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequence => ";",
            Self::Background => "&",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for ControlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a statement chain.
///
/// `next` is `None` only on the chain's last node; `control` is still set
/// there (to `;` unless a trailing operator such as `&` followed it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(flatten)]
    pub kind: StatementKind,
    pub control: ControlOperator,
    pub next: Option<Box<Statement>>,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            control: ControlOperator::Sequence,
            next: None,
        }
    }

    /// Iterate this statement and everything chained after it.
    pub fn chain(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    pub fn tail(&self) -> &Self {
        let mut current = self;
        while let Some(next) = current.next.as_deref() {
            current = next;
        }
        current
    }

    pub fn as_command(&self) -> Option<&Command> {
        match &self.kind {
            StatementKind::Command(command) => Some(command),
            _ => None,
        }
    }
}

impl Drop for Statement {
    // Chains can be arbitrarily long; unlink them iteratively.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut statement) = next {
            next = statement.next.take();
        }
    }
}

pub struct ChainIter<'a> {
    next: Option<&'a Statement>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Statement;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next.as_deref();
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatementKind {
    Command(Command),
    Subshell(Subshell),
    WhileLoop(ConditionalLoop),
    UntilLoop(ConditionalLoop),
    ForLoop(ForLoop),
    IfElse(IfElse),
    Time(Time),
}

/// A simple command: name, arguments, redirects and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// `None` for commands made only of assignments and/or redirects.
    pub command: Option<CommandName>,
    pub args: Vec<Word>,
    pub redirects: Vec<Redirect>,
    /// Leading `NAME=value` assignments; the last one for a name wins.
    pub env: BTreeMap<String, Word>,
}

impl Command {
    pub fn new(command: Option<CommandName>) -> Self {
        Self {
            command,
            args: Vec::new(),
            redirects: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// The command this one pipes its output into, if any.
    pub fn piped_to(&self) -> Option<&Self> {
        match self.redirects.last() {
            Some(Redirect::Pipe { command }) => Some(command),
            _ => None,
        }
    }

    fn take_pipe(&mut self) -> Option<Box<Self>> {
        if !matches!(self.redirects.last(), Some(Redirect::Pipe { .. })) {
            return None;
        }
        match self.redirects.pop() {
            Some(Redirect::Pipe { command }) => Some(command),
            _ => None,
        }
    }
}

impl Drop for Command {
    // Pipelines nest one command per stage; unlink them iteratively.
    fn drop(&mut self) {
        let mut next = self.take_pipe();
        while let Some(mut command) = next {
            next = command.take_pipe();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandName {
    Word(Word),
    Builtin(Builtin),
}

/// Command names the grammar recognises before word parsing (`[`, `[[`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "builtin")]
pub struct Builtin {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subshell {
    pub statements: Script,
}

/// Body of a `while` or `until` loop; the loop kind is the statement kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalLoop {
    pub test: Script,
    pub body: Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    While,
    Until,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForLoop {
    pub loop_variable: String,
    pub subjects: Vec<Word>,
    pub body: Script,
}

/// An `if` statement, or one `elif` arm of one.
///
/// `elif` arms never carry `elif_blocks` or `else_body` themselves; the
/// enclosing `if` collects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfElse {
    pub test: Script,
    pub body: Script,
    pub elif_blocks: Option<Vec<IfElse>>,
    pub else_body: Option<Script>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    pub flags: Vec<String>,
    pub command: Script,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Word {
    Literal {
        value: String,
    },
    /// Text containing unexpanded glob syntax.
    Glob {
        value: String,
    },
    Variable {
        name: String,
    },
    /// `${...}`, kept unevaluated.
    VariableSubstitution {
        expression: String,
    },
    /// Juxtaposed pieces; never two adjacent literal/glob pieces.
    Concatenation {
        pieces: Vec<Word>,
    },
    CommandSubstitution {
        commands: Script,
    },
    ProcessSubstitution {
        #[serde(rename = "readWrite")]
        read_write: ProcessDirection,
        commands: Script,
    },
}

impl Default for Word {
    fn default() -> Self {
        Self::Literal {
            value: String::new(),
        }
    }
}

impl Word {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn glob(value: impl Into<String>) -> Self {
        Self::Glob {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    /// Literal and glob pieces merge into each other when juxtaposed.
    pub fn is_mergeable(&self) -> bool {
        matches!(self, Self::Literal { .. } | Self::Glob { .. })
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal { value } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessDirection {
    /// `<(...)`
    #[serde(rename = "<")]
    Read,
    /// `>(...)`
    #[serde(rename = ">")]
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Redirect {
    /// `2>&3-`, `>&-`: `dest` is the text after the operator.
    MoveFd { fd: u32, op: String, dest: Word },
    /// `2>&1`
    DuplicateFd {
        #[serde(rename = "srcFd")]
        src_fd: u32,
        op: String,
        #[serde(rename = "destFd")]
        dest_fd: u32,
    },
    /// `2> file`, `< input`, `>> log`
    RedirectFd { fd: u32, op: String, filename: Word },
    /// `| command`: the command reading this one's output.
    Pipe { command: Box<Command> },
}
