//! Character-level terminals shared by every level of the grammar
//!
//! The grammar is scannerless: these parsers recognise blanks, comments,
//! operators and names directly on the input characters.

use chumsky::prelude::*;

/// Words that cannot be used as a command name.
pub const RESERVED_WORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "do", "done", "while", "until", "for", "time",
];

/// Characters that end an unquoted run of text.
const META_CHARS: &str = "|&;<>()$`\"'\\*?[{";

/// Space, tab, or a backslash-newline line continuation.
pub fn blank() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    one_of(" \t").ignored().or(just("\\\n").ignored())
}

pub fn blanks() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    blank().repeated().ignored()
}

pub fn blanks1() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    blank().repeated().at_least(1).ignored()
}

/// `#` to end of line, newline excluded.
pub fn comment() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    just('#').then(filter(|c: &char| *c != '\n').repeated()).ignored()
}

/// Blanks, newlines and comments between statements.
pub fn space_nl() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    choice((blank(), just('\n').ignored(), comment()))
        .repeated()
        .ignored()
}

/// Blanks and an optional comment, before a control operator.
pub fn gap() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    blanks().then(comment().or_not()).ignored()
}

/// Succeed without consuming input when `parser` would not match here.
pub fn not_followed_by<O, P>(parser: P) -> impl Parser<char, (), Error = Simple<char>> + Clone
where
    P: Parser<char, O, Error = Simple<char>> + Clone,
{
    parser
        .or_not()
        .rewind()
        .try_map(|found, span| match found {
            Some(_) => Err(Simple::custom(span, "unexpected input")),
            None => Ok(()),
        })
}

pub fn keyword(word: &'static str) -> impl Parser<char, (), Error = Simple<char>> + Clone {
    text::keyword(word)
}

/// A reserved word standing alone as an unquoted word. Quoting or escaping
/// any part of it makes it an ordinary word.
pub fn reserved_word() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    text::ident()
        .try_map(|word: String, span| {
            if RESERVED_WORDS.contains(&word.as_str()) {
                Ok(word)
            } else {
                Err(Simple::custom(span, "not a reserved word"))
            }
        })
        .then_ignore(not_followed_by(filter(|c: &char| {
            !c.is_whitespace() && !"|&;<>()".contains(*c)
        })))
}

/// A variable name.
pub fn name() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    text::ident()
}

/// `$?`, `$#`, `$1` and the other one-character parameters.
pub fn special_parameter() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    one_of("0123456789?#@*$!-").map(|c: char| c.to_string())
}

pub fn file_descriptor() -> impl Parser<char, u32, Error = Simple<char>> + Clone {
    text::int(10).try_map(|digits: String, span| {
        digits
            .parse::<u32>()
            .map_err(|e| Simple::custom(span, format!("invalid file descriptor: {e}")))
    })
}

/// `;`, `&` or a newline. `&&` and `&>` are not control operators.
pub fn control_operator() -> impl Parser<char, &'static str, Error = Simple<char>> + Clone {
    choice((
        just(";"),
        just("&").then_ignore(not_followed_by(one_of("&>"))),
        just("\n"),
    ))
}

/// `|` but not `||`.
pub fn pipe_operator() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    just('|').then_ignore(not_followed_by(just('|'))).ignored()
}

/// `&&` or `||` between statements.
pub fn and_or_operator() -> impl Parser<char, &'static str, Error = Simple<char>> + Clone {
    just("&&").or(just("||"))
}

/// One character of unquoted text: a backslash escape yields the escaped
/// character, anything else must not be blank or a metacharacter.
pub fn bare_char() -> impl Parser<char, char, Error = Simple<char>> + Clone {
    just('\\')
        .ignore_then(filter(|c: &char| *c != '\n'))
        .or(filter(|c: &char| !c.is_whitespace() && !META_CHARS.contains(*c)))
}

/// Text between back-quotes. `` \` ``, `\\` and `\$` lose their backslash.
pub fn back_quoted_text() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    just('\\')
        .ignore_then(one_of("`\\$"))
        .or(filter(|c: &char| *c != '`'))
        .repeated()
        .collect::<String>()
        .delimited_by(just('`'), just('`'))
}
