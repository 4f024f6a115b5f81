//! Table-driven LALR(1) grammar engine.
//!
//! One deterministic bottom-up pass over the token slice: shift tokens,
//! reduce by the table, and let [`actions`] build one AST node per
//! reduction. The first token without a table entry aborts the parse.

mod actions;

use once_cell::sync::Lazy;

use crate::ast::ProgramScope;
use crate::config::ParseConfig;
use crate::error::SyntaxError;
use crate::grammar::table::{Action, ParseTable};
use crate::grammar::{self, Terminal};
use crate::lexer::{Position, Spanned, Token};

use actions::{Node, Value};

static TABLE: Lazy<ParseTable> = Lazy::new(|| match ParseTable::build(grammar::productions()) {
    Ok(table) => table,
    Err(e) => panic!("{}", e),
});

/// The shared, read-only parse table. Built on first use.
fn table() -> &'static ParseTable {
    &TABLE
}

/// Parse a token stream into a [`ProgramScope`].
///
/// A stream without a trailing [`Token::Eof`] is treated as if one followed
/// the last token.
pub fn parse(tokens: &[Spanned], config: &ParseConfig) -> Result<ProgramScope, SyntaxError> {
    let table = table();
    let end = Spanned::new(
        Token::Eof,
        tokens.last().map_or(Position::new(1, 1), |t| t.pos),
    );

    let mut states: Vec<usize> = vec![0];
    let mut nodes: Vec<Node> = Vec::new();
    let mut cursor = 0;

    loop {
        let lookahead = tokens.get(cursor).unwrap_or(&end);
        let terminal = Terminal::of(&lookahead.token);
        let state = states[states.len() - 1];

        match table.action(state, terminal) {
            Some(Action::Shift(next)) => {
                check_depth(&states, config, lookahead)?;
                log::trace!("state {}: shift {} -> {}", state, lookahead.token, next);
                nodes.push(Node {
                    value: Value::Token(lookahead.token.clone()),
                    pos: lookahead.pos,
                });
                states.push(next);
                cursor += 1;
            }
            Some(Action::Reduce(index)) => {
                let production = table.production(index);
                let arity = production.rhs.len();
                let children = nodes.split_off(nodes.len() - arity);
                states.truncate(states.len() - arity);
                let pos = children.first().map_or(lookahead.pos, |n| n.pos);
                log::trace!(
                    "state {}: reduce {:?} ({} symbols)",
                    state,
                    production.rule,
                    arity
                );
                let value = actions::reduce(production.rule, children, lookahead)?;
                let Some(next) = table.goto(states[states.len() - 1], production.lhs) else {
                    unreachable!("no goto for {:?} after reduction", production.lhs);
                };
                check_depth(&states, config, lookahead)?;
                nodes.push(Node { value, pos });
                states.push(next);
            }
            Some(Action::Accept) => {
                return match nodes.pop().map(|n| n.value) {
                    Some(Value::Program(program)) => {
                        log::debug!(
                            "parsed {} declaration(s) from {} token(s)",
                            program.declarations.len(),
                            tokens.len()
                        );
                        Ok(program)
                    }
                    other => unreachable!("accepted without a program: {:?}", other),
                };
            }
            None => {
                let expected = table
                    .expected(state)
                    .into_iter()
                    .map(|t| t.to_string())
                    .collect();
                return Err(SyntaxError::unexpected(
                    lookahead.pos,
                    lookahead.token.to_string(),
                    expected,
                ));
            }
        }
    }
}

fn check_depth(
    states: &[usize],
    config: &ParseConfig,
    lookahead: &Spanned,
) -> Result<(), SyntaxError> {
    if states.len() > config.max_stack_depth {
        return Err(SyntaxError::structural(
            lookahead.pos,
            lookahead.token.to_string(),
            Vec::new(),
            format!(
                "nesting exceeds the configured parse stack depth of {}",
                config.max_stack_depth
            ),
        ));
    }
    Ok(())
}
