//! Grammar for shell scripts
//!
//! Every rule's action hands its matches to one of the builders in
//! [`crate::word`], [`crate::redirect`], [`crate::command`],
//! [`crate::chain`] or [`crate::compound`]; the grammar never assembles a
//! node on its own.
//!
//! Nesting is bounded by building the grammar as a tower of levels. A level
//! parses nested scripts (subshells, compound bodies, substitutions) with
//! the level below it, and the level past the limit is a parser that always
//! fails and records why.

use std::rc::Rc;

use chumsky::prelude::*;

use crate::ast::{
    Command, CommandName, LoopKind, ProcessDirection, Redirect, Script, StatementKind, Word,
};
use crate::chain::{self, Chain};
use crate::command::{self, CommandParts, CommandToken};
use crate::compound;
use crate::lexer::{
    and_or_operator, back_quoted_text, bare_char, blanks, blanks1, control_operator,
    file_descriptor, gap, keyword, name, not_followed_by, pipe_operator, reserved_word, space_nl,
    special_parameter,
};
use crate::nested::{self, ParseState, Span};
use crate::redirect;
use crate::word::{self, QuotedPart};

pub type ScriptParser = BoxedParser<'static, char, Script, Simple<char>>;

type Boxed<O> = BoxedParser<'static, char, O, Simple<char>>;

/// Parser for a whole script, nesting bounded by `state`.
pub fn script_parser(state: &Rc<ParseState>) -> ScriptParser {
    let mut deeper = nesting_limit(state);
    for depth in (0..=state.limit()).rev() {
        deeper = script(depth, deeper, state);
    }
    deeper
}

fn nesting_limit(state: &Rc<ParseState>) -> ScriptParser {
    let state = Rc::clone(state);
    empty::<Simple<char>>()
        .try_map(move |(), span| Err::<Script, _>(state.exceed_nesting(span)))
        .boxed()
}

/// One level of the grammar. `deeper` parses the scripts nested inside it.
fn script(depth: usize, deeper: ScriptParser, state: &Rc<ParseState>) -> ScriptParser {
    let word = concatenation(depth, &deeper, state);
    let command = simple_command(&word);
    let statement = statement(compound_statement(&word, &deeper, state), command, state);

    space_nl()
        .ignore_then(statement_list(statement, state).or_not())
        .then_ignore(space_nl())
        .map(chain::script)
        .boxed()
}

/// Fails unless a `)` is still ahead, so an unclosed `(` is rejected
/// without descending into the levels below.
fn closable(state: &Rc<ParseState>) -> impl Parser<char, (), Error = Simple<char>> + Clone {
    let state = Rc::clone(state);
    empty::<Simple<char>>().try_map(move |(), span: Span| {
        if state.can_close_at(span.start) {
            Ok(())
        } else {
            Err(Simple::custom(span, "unclosed `(`"))
        }
    })
}

/// A word: juxtaposed pieces, not starting with `#`.
fn concatenation(depth: usize, deeper: &ScriptParser, state: &Rc<ParseState>) -> Boxed<Word> {
    let glob = choice((
        one_of("*?").map(|c: char| c.to_string()),
        filter(|c: &char| *c != ']' && !c.is_whitespace())
            .repeated()
            .at_least(1)
            .collect::<String>()
            .delimited_by(just('['), just(']'))
            .map(|class| format!("[{class}]")),
        filter(|c: &char| *c != '}' && !c.is_whitespace())
            .repeated()
            .at_least(1)
            .collect::<String>()
            .delimited_by(just('{'), just('}'))
            .try_map(|inner, span| {
                if inner.contains(',') || inner.contains("..") {
                    Ok(format!("{{{inner}}}"))
                } else {
                    Err(Simple::custom(span, "not a brace expansion"))
                }
            }),
    ))
    .map(word::glob);

    let bareword = bare_char()
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(word::bareword);

    let paren_substitution = just("$(")
        .ignore_then(closable(state))
        .ignore_then(deeper.clone())
        .then_ignore(just(')'))
        .map(word::command_substitution);

    let variable_substitution = just("${")
        .ignore_then(filter(|c: &char| *c != '}').repeated().collect::<String>())
        .then_ignore(just('}'))
        .map(word::variable_substitution);

    let environment_variable = just('$')
        .ignore_then(name().or(special_parameter()))
        .map(word::environment_variable);

    let back_quote = {
        let reparse = deeper.clone().then_ignore(end());
        let state = Rc::clone(state);
        back_quoted_text().try_map(move |text, span: Span| {
            state
                .reparse(&text, span.clone(), || {
                    nested::back_quote(&text, depth + 1, |inner| reparse.parse(inner))
                })
                .map_err(|message| Simple::custom(span, message))
        })
    };

    let process_substitution = choice((
        just('<').to(ProcessDirection::Read),
        just('>').to(ProcessDirection::Write),
    ))
    .then_ignore(just('('))
    .then_ignore(closable(state))
    .then(deeper.clone())
    .then_ignore(just(')'))
    .map(|(direction, commands)| word::process_substitution(direction, commands));

    let single_quote = filter(|c: &char| *c != '\'')
        .repeated()
        .collect::<String>()
        .delimited_by(just('\''), just('\''))
        .map(word::single_quote);

    let quoted_text = choice((
        just('\\').ignore_then(one_of("\"\\`$")).map(Some),
        just("\\\n").to(None),
        filter(|c: &char| !"\"\\$`".contains(*c)).map(Some),
        just('\\').to(Some('\\')),
    ))
    .repeated()
    .at_least(1)
    .map(|chars| QuotedPart::Text(chars.into_iter().flatten().collect()));

    let double_quote = choice((
        quoted_text,
        paren_substitution.clone().map(QuotedPart::Word),
        variable_substitution.clone().map(QuotedPart::Word),
        environment_variable.clone().map(QuotedPart::Word),
        back_quote.clone().map(QuotedPart::Word),
        just('$').to(QuotedPart::Text("$".to_string())),
    ))
    .repeated()
    .delimited_by(just('"'), just('"'))
    .map(word::double_quote);

    let lone = one_of("$[{").map(|c: char| word::bareword(c.to_string()));

    let piece = choice((
        glob,
        bareword,
        paren_substitution,
        variable_substitution,
        environment_variable,
        back_quote,
        process_substitution,
        single_quote,
        double_quote,
        lone,
    ));

    not_followed_by(just('#'))
        .ignore_then(piece.repeated().at_least(1))
        .map(word::concatenation)
        .boxed()
}

fn redirection(word: &Boxed<Word>) -> Boxed<Redirect> {
    let fd = file_descriptor().or_not();
    let dup_op = just("<&").or(just(">&"));

    let move_fd = fd
        .clone()
        .then(dup_op.clone())
        .then(
            filter(|c: &char| c.is_ascii_digit())
                .repeated()
                .chain(just('-'))
                .collect::<String>(),
        )
        .map(|((fd, op), dest)| redirect::move_fd(fd, op, dest));

    let duplicate_fd = fd
        .clone()
        .then(dup_op)
        .then_ignore(blanks())
        .then(file_descriptor())
        .map(|((src, op), dest)| redirect::duplicate_fd(src, op, dest));

    let redirect_fd = fd
        .then(choice((
            just("&>>"),
            just("&>"),
            just(">>"),
            just(">|"),
            just("<>"),
            just(">"),
            just("<"),
        )))
        .then_ignore(blanks())
        .then(word.clone())
        .map(|((fd, op), filename)| redirect::redirect_fd(fd, op, filename));

    choice((move_fd, duplicate_fd, redirect_fd)).boxed()
}

/// `[assignments/redirects] [name [args/redirects]] [| stage]...`
fn simple_command(word: &Boxed<Word>) -> Boxed<Command> {
    let redirect = redirection(word);

    let assignment = name()
        .then_ignore(just('='))
        .then(word.clone().or_not())
        .map(|(name, value)| {
            CommandToken::Assignment(command::variable_assignment(name, value))
        });

    let pre_token = assignment
        .or(redirect.clone().map(CommandToken::Redirect))
        .then_ignore(blanks());

    let post_token = blanks()
        .ignore_then(redirect.map(CommandToken::Redirect))
        .or(blanks1().ignore_then(word.clone().map(CommandToken::Argument)));

    let builtin = just("[[")
        .or(just("["))
        .then_ignore(blanks1().rewind())
        .map(command::builtin_command_name);

    let command_name = builtin.or(
        reserved_word()
            .or_not()
            .rewind()
            .then(word.clone())
            .try_map(|(reserved, word), span| match reserved {
                Some(text) => Err(Simple::custom(span, format!("reserved word `{text}`"))),
                None => Ok(CommandName::Word(word)),
            }),
    );

    let stage = pre_token
        .repeated()
        .then(command_name.then(post_token.repeated()).or_not())
        .try_map(|(pre, named), span| {
            if pre.is_empty() && named.is_none() {
                return Err(Simple::custom(span, "expected a command"));
            }
            let (name, post) = named.map_or((None, Vec::new()), |(n, p)| (Some(n), p));
            Ok(CommandParts { pre, name, post })
        });

    let pipe = blanks()
        .ignore_then(pipe_operator())
        .ignore_then(space_nl())
        .ignore_then(stage.clone());

    stage
        .then(pipe.repeated())
        .map(|(first, rest)| command::pipeline(first, rest))
        .boxed()
}

/// Subshells, conditionals, loops and `time`.
fn compound_statement(
    word: &Boxed<Word>,
    deeper: &ScriptParser,
    state: &Rc<ParseState>,
) -> Boxed<StatementKind> {
    let subshell = just('(')
        .ignore_then(closable(state))
        .ignore_then(deeper.clone())
        .then_ignore(just(')'))
        .map(compound::subshell);

    let elif_block = keyword("elif")
        .ignore_then(deeper.clone())
        .then_ignore(keyword("then"))
        .then(deeper.clone())
        .map(|(test, body)| compound::elif_block(test, body));

    let if_block = keyword("if")
        .ignore_then(deeper.clone())
        .then_ignore(keyword("then"))
        .then(deeper.clone())
        .then(elif_block.repeated())
        .then(keyword("else").ignore_then(deeper.clone()).or_not())
        .then_ignore(keyword("fi"))
        .map(|(((test, body), elifs), else_body)| {
            compound::if_block(test, body, elifs, else_body)
        });

    let conditional_loop = choice((
        keyword("while").to(LoopKind::While),
        keyword("until").to(LoopKind::Until),
    ))
    .then(deeper.clone())
    .then_ignore(keyword("do"))
    .then(deeper.clone())
    .then_ignore(keyword("done"))
    .map(|((kind, test), body)| compound::conditional_loop(kind, test, body));

    let subjects = space_nl()
        .ignore_then(keyword("in"))
        .ignore_then(blanks1().ignore_then(word.clone()).repeated());

    let for_loop = keyword("for")
        .ignore_then(blanks1())
        .ignore_then(name())
        .then(subjects.or_not())
        .then_ignore(blanks())
        .then_ignore(one_of(";\n").or_not())
        .then_ignore(space_nl())
        .then_ignore(keyword("do"))
        .then(deeper.clone())
        .then_ignore(keyword("done"))
        .map(|((variable, subjects), body)| compound::for_loop(variable, subjects, body));

    let flag = blanks1()
        .ignore_then(just('-'))
        .chain(filter(|c: &char| c.is_ascii_alphabetic()).repeated().at_least(1))
        .collect::<String>();

    let time = keyword("time")
        .ignore_then(flag.repeated())
        .then_ignore(blanks1())
        .then(deeper.clone())
        .map(|(flags, command)| compound::time(flags, command));

    choice((subshell, if_block, conditional_loop, for_loop, time)).boxed()
}

/// A compound or simple command, followed by any number of `&&`/`||` and
/// the statement after each.
fn statement(
    compound: Boxed<StatementKind>,
    command: Boxed<Command>,
    state: &Rc<ParseState>,
) -> Boxed<Chain> {
    let base = compound.or(command.map(StatementKind::Command));
    let and_or = blanks()
        .ignore_then(and_or_operator())
        .then_ignore(space_nl())
        .then(base.clone());

    let state = Rc::clone(state);
    base.then(and_or.repeated())
        .try_map(move |(first, rest), span| state.check(chain::and_or_list(first, rest), span))
        .boxed()
}

/// Statements joined by `;`, `&` or newlines, with an optional trailing
/// operator.
fn statement_list(statement: Boxed<Chain>, state: &Rc<ParseState>) -> Boxed<Chain> {
    let operator = {
        let state = Rc::clone(state);
        gap()
            .ignore_then(control_operator())
            .then_ignore(space_nl())
            .try_map(move |op, span| state.check(chain::control_operator(op), span))
    };

    let chained = {
        let state = Rc::clone(state);
        gap()
            .ignore_then(control_operator())
            .then_ignore(space_nl())
            .then(statement.clone())
            .try_map(move |(op, next), span| state.check(chain::chained_statement(op, next), span))
    };

    let state = Rc::clone(state);
    statement
        .then(chained.repeated())
        .then(operator.or_not())
        .try_map(move |((first, tail), last), span| {
            state.check(chain::statement_list(first, tail, last), span)
        })
        .boxed()
}
