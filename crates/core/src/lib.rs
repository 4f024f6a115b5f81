//! fsml-core: front end for the finite-state machine language.
//!
//! Turns a token stream into a [`ProgramScope`]: an ordered list of
//! alphabet, automaton and class declarations.
//!
//! # Public API
//!
//! - [`parse()`] -- run the LALR(1) grammar engine over a token slice
//! - [`parse_source()`] -- tokenize with the reference lexer, then parse
//! - [`ParseConfig`] -- options passed to every entry point
//! - [`SyntaxError`], [`LexError`], [`FrontendError`] -- structured failures
//! - AST types re-exported from [`ast`]
//!
//! Every AST node implements `Display` (see [`render`]) and
//! `serde::Serialize`.

pub mod ast;
pub mod config;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod render;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{
    Alphabet, AlphabetConstructor, Automaton, AutomatonBody, AutomatonState, ClassDefinition,
    ConcreteTerm, Declaration, ProgramScope, Term, Transition,
};
pub use config::ParseConfig;
pub use error::{FrontendError, LexError, SyntaxError};
pub use lexer::{Position, Spanned, Token};
pub use parser::parse;

/// Tokenize `src` with the reference lexer and parse the result.
pub fn parse_source(src: &str, config: &ParseConfig) -> Result<ProgramScope, FrontendError> {
    let tokens = lexer::lex(src)?;
    log::debug!("lexed {} token(s)", tokens.len());
    Ok(parse(&tokens, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_errors_are_reported_before_parsing() {
        let err = parse_source("def s : Alphabet = { # }", &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, FrontendError::Lex(_)));
        assert_eq!(err.position(), Position::new(1, 22));
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = parse_source("def s : Alphabet = { }", &ParseConfig::default()).unwrap_err();
        let FrontendError::Syntax(e) = &err else {
            panic!("expected syntax error, got {:?}", err);
        };
        assert_eq!(e.position, Position::new(1, 22));
        assert_eq!(e.found, "'}'");
    }
}
