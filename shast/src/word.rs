//! Word construction and concatenation flattening
//!
//! The grammar hands these builders the raw text it matched for each word
//! piece; juxtaposed pieces are then collapsed by [`flatten`] so that a word
//! never carries two adjacent literal or glob pieces.

use crate::ast::{ProcessDirection, Script, Word};

/// Unquoted text, escapes already resolved.
pub fn bareword(text: String) -> Word {
    Word::Literal { value: text }
}

/// Contents of `'...'`, taken verbatim.
pub fn single_quote(text: String) -> Word {
    Word::Literal { value: text }
}

/// A fragment with unexpanded glob syntax, kept as matched.
pub fn glob(text: String) -> Word {
    Word::Glob { value: text }
}

/// `$name` or a special parameter such as `$?`.
pub fn environment_variable(name: String) -> Word {
    Word::Variable { name }
}

/// `${...}`; the expression is stored without evaluation.
pub fn variable_substitution(expression: String) -> Word {
    Word::VariableSubstitution { expression }
}

/// `$(...)` or a back-quoted script.
pub fn command_substitution(commands: Script) -> Word {
    Word::CommandSubstitution { commands }
}

/// `<(...)` or `>(...)`.
pub fn process_substitution(read_write: ProcessDirection, commands: Script) -> Word {
    Word::ProcessSubstitution {
        read_write,
        commands,
    }
}

/// One run inside `"..."`: plain characters or a substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotedPart {
    Text(String),
    Word(Word),
}

/// Build a double-quoted word. Text runs become literals, so glob
/// characters inside quotes never produce a glob.
pub fn double_quote(parts: Vec<QuotedPart>) -> Word {
    flatten(parts.into_iter().map(|part| match part {
        QuotedPart::Text(text) => Word::Literal { value: text },
        QuotedPart::Word(word) => word,
    }))
}

/// A word made of juxtaposed pieces, e.g. `"a"$b'c'`.
pub fn concatenation(pieces: Vec<Word>) -> Word {
    flatten(pieces)
}

/// Collapse a sequence of word pieces into its minimal form.
///
/// Adjacent literal and glob pieces merge into one; the merge is a glob if
/// either side was. Nested concatenations are spliced in piece by piece, so
/// the result is the same however the pieces were grouped. A single
/// resulting piece is returned unwrapped and an empty sequence is the empty
/// literal.
pub fn flatten(pieces: impl IntoIterator<Item = Word>) -> Word {
    let mut out = Vec::new();
    for piece in pieces {
        push_piece(&mut out, piece);
    }

    match out.len() {
        0 => Word::Literal {
            value: String::new(),
        },
        1 => out.pop().unwrap_or_default(),
        _ => Word::Concatenation { pieces: out },
    }
}

fn push_piece(out: &mut Vec<Word>, piece: Word) {
    match piece {
        Word::Concatenation { pieces } => {
            for inner in pieces {
                push_piece(out, inner);
            }
        }
        Word::Literal { value } => append_text(out, value, false),
        Word::Glob { value } => append_text(out, value, true),
        other => out.push(other),
    }
}

fn append_text(out: &mut Vec<Word>, text: String, is_glob: bool) {
    if let Some(last) = out.last_mut() {
        let promote = is_glob && matches!(last, Word::Literal { .. });
        if let Word::Literal { value } | Word::Glob { value } = last {
            value.push_str(&text);
            if promote {
                let merged = std::mem::take(value);
                *last = Word::Glob { value: merged };
            }
            return;
        }
    }

    out.push(if is_glob {
        Word::Glob { value: text }
    } else {
        Word::Literal { value: text }
    });
}
