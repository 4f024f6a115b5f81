use serde::Serialize;

use crate::lexer::Position;

/// The reference lexer met a character sequence it cannot tokenize.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{position}: {message}")]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl LexError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        LexError {
            position,
            message: message.into(),
        }
    }
}

/// The grammar engine reached a token for which no production applies.
///
/// `expected` lists the terminals the parser would have accepted in the
/// failing state, already rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{position}: {message}")]
pub struct SyntaxError {
    pub position: Position,
    pub found: String,
    pub expected: Vec<String>,
    pub message: String,
}

impl SyntaxError {
    /// An unexpected token; the message is derived from `found` and `expected`.
    pub fn unexpected(position: Position, found: String, expected: Vec<String>) -> Self {
        let message = match expected.as_slice() {
            [] => format!("unexpected {}", found),
            [only] => format!("unexpected {}, expected {}", found, only),
            many => format!("unexpected {}, expected one of {}", found, many.join(", ")),
        };
        SyntaxError {
            position,
            found,
            expected,
            message,
        }
    }

    /// A structural rule checked while reducing, e.g. a state without transitions.
    pub fn structural(
        position: Position,
        found: String,
        expected: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        SyntaxError {
            position,
            found,
            expected,
            message: message.into(),
        }
    }
}

/// Any failure of [`crate::parse_source`]: tokenizing or parsing.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrontendError {
    #[error("lex error at {0}")]
    Lex(#[from] LexError),
    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),
}

impl FrontendError {
    pub fn position(&self) -> Position {
        match self {
            FrontendError::Lex(e) => e.position,
            FrontendError::Syntax(e) => e.position,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FrontendError::Lex(e) => &e.message,
            FrontendError::Syntax(e) => &e.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_message_lists_expectations() {
        let e = SyntaxError::unexpected(
            Position::new(2, 4),
            "'}'".into(),
            vec!["'terminal'".into(), "identifier".into()],
        );
        assert_eq!(
            e.to_string(),
            "2:4: unexpected '}', expected one of 'terminal', identifier"
        );
    }

    #[test]
    fn frontend_error_serializes_with_kind_tag() {
        let e = FrontendError::from(LexError::new(Position::new(1, 3), "bad"));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "lex");
        assert_eq!(json["position"]["line"], 1);
        assert_eq!(json["message"], "bad");
    }
}
