//! Token contract consumed by the grammar engine, plus a reference lexer.
//!
//! The engine only depends on [`Token`] and [`Spanned`]; any producer that
//! honours the same contract can feed [`crate::parser::parse`].

use std::fmt;

use serde::Serialize;

use crate::ast::{CompareOp, LogicOp};
use crate::error::LexError;

/// 1-based source position of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Def,
    Class,
    Override,
    Fun,
    Return,
    Start,
    Terminal,
    Else,
    Deadend,
    Alphabet,
    Itself,
    From,
    /// Value identifier (state names, fields, declaration names)
    Ident(String),
    /// Type identifier (capitalized words)
    TypeIdent(String),
    // Literals
    Char(char),
    Int(i64),
    Str(String),
    // Punctuation
    Colon,
    Assign,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Arrow,
    Dot,
    CompareOp(CompareOp),
    LogicOp(LogicOp),
    // End of input
    Eof,
}

impl Token {
    fn keyword(word: &str) -> Option<Token> {
        let kw = match word {
            "def" => Token::Def,
            "class" => Token::Class,
            "override" => Token::Override,
            "fun" => Token::Fun,
            "return" => Token::Return,
            "start" => Token::Start,
            "terminal" => Token::Terminal,
            "else" => Token::Else,
            "deadend" => Token::Deadend,
            "alphabet" => Token::Alphabet,
            "itself" => Token::Itself,
            "from" => Token::From,
            _ => return None,
        };
        Some(kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Def => f.write_str("'def'"),
            Token::Class => f.write_str("'class'"),
            Token::Override => f.write_str("'override'"),
            Token::Fun => f.write_str("'fun'"),
            Token::Return => f.write_str("'return'"),
            Token::Start => f.write_str("'start'"),
            Token::Terminal => f.write_str("'terminal'"),
            Token::Else => f.write_str("'else'"),
            Token::Deadend => f.write_str("'deadend'"),
            Token::Alphabet => f.write_str("'alphabet'"),
            Token::Itself => f.write_str("'itself'"),
            Token::From => f.write_str("'from'"),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::TypeIdent(name) => write!(f, "type name '{}'", name),
            Token::Char(c) => write!(f, "character literal {:?}", c),
            Token::Int(n) => write!(f, "integer literal {}", n),
            Token::Str(s) => write!(f, "string literal {:?}", s),
            Token::Colon => f.write_str("':'"),
            Token::Assign => f.write_str("'='"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Arrow => f.write_str("'->'"),
            Token::Dot => f.write_str("'.'"),
            Token::CompareOp(op) => write!(f, "'{}'", op),
            Token::LogicOp(op) => write!(f, "'{}'", op),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: Position,
}

impl Spanned {
    pub fn new(token: Token, pos: Position) -> Self {
        Spanned { token, pos }
    }
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Reads one escape sequence after the backslash has been consumed.
    fn escape(&mut self, start: Position) -> Result<char, LexError> {
        let c = self
            .bump()
            .ok_or_else(|| LexError::new(start, "unterminated escape sequence"))?;
        let resolved = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            other => {
                return Err(LexError::new(
                    start,
                    format!("unknown escape sequence '\\{}'", other),
                ))
            }
        };
        Ok(resolved)
    }
}

/// Tokenize `src`. The returned stream always ends with [`Token::Eof`].
pub fn lex(src: &str) -> Result<Vec<Spanned>, LexError> {
    let mut tokens = Vec::new();
    let mut cur = Cursor {
        chars: src.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };

    while let Some(c) = cur.peek() {
        // Line comment
        if c == '/' && cur.peek_at(1) == Some('/') {
            while cur.peek().is_some_and(|c| c != '\n') {
                cur.bump();
            }
            continue;
        }

        // Block comment
        if c == '/' && cur.peek_at(1) == Some('*') {
            let start = cur.here();
            cur.bump();
            cur.bump();
            loop {
                match cur.peek() {
                    None => return Err(LexError::new(start, "unterminated block comment")),
                    Some('*') if cur.peek_at(1) == Some('/') => {
                        cur.bump();
                        cur.bump();
                        break;
                    }
                    Some(_) => {
                        cur.bump();
                    }
                }
            }
            continue;
        }

        if c.is_whitespace() {
            cur.bump();
            continue;
        }

        let start = cur.here();

        // Character literal
        if c == '\'' {
            cur.bump();
            let value = match cur.bump() {
                None | Some('\n') => {
                    return Err(LexError::new(start, "unterminated character literal"))
                }
                Some('\'') => return Err(LexError::new(start, "empty character literal")),
                Some('\\') => cur.escape(start)?,
                Some(other) => other,
            };
            if cur.bump() != Some('\'') {
                return Err(LexError::new(
                    start,
                    "character literal must contain exactly one character",
                ));
            }
            tokens.push(Spanned::new(Token::Char(value), start));
            continue;
        }

        // String literal
        if c == '"' {
            cur.bump();
            let mut s = String::new();
            loop {
                match cur.bump() {
                    None | Some('\n') => {
                        return Err(LexError::new(start, "unterminated string literal"))
                    }
                    Some('"') => break,
                    Some('\\') => s.push(cur.escape(start)?),
                    Some(other) => s.push(other),
                }
            }
            tokens.push(Spanned::new(Token::Str(s), start));
            continue;
        }

        // Integer
        if c.is_ascii_digit() || (c == '-' && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            let mut digits = String::new();
            if c == '-' {
                digits.push('-');
                cur.bump();
            }
            while let Some(d) = cur.peek().filter(char::is_ascii_digit) {
                digits.push(d);
                cur.bump();
            }
            let n: i64 = digits.parse().map_err(|_| {
                LexError::new(start, format!("integer literal '{}' out of range", digits))
            })?;
            tokens.push(Spanned::new(Token::Int(n), start));
            continue;
        }

        // Operators and punctuation
        let two = (c, cur.peek_at(1));
        let (token, width) = match two {
            ('-', Some('>')) => (Some(Token::Arrow), 2),
            ('=', Some('=')) => (Some(Token::CompareOp(CompareOp::Eq)), 2),
            ('!', Some('=')) => (Some(Token::CompareOp(CompareOp::Ne)), 2),
            ('<', Some('=')) => (Some(Token::CompareOp(CompareOp::Le)), 2),
            ('>', Some('=')) => (Some(Token::CompareOp(CompareOp::Ge)), 2),
            ('&', Some('&')) => (Some(Token::LogicOp(LogicOp::And)), 2),
            ('|', Some('|')) => (Some(Token::LogicOp(LogicOp::Or)), 2),
            ('<', _) => (Some(Token::CompareOp(CompareOp::Lt)), 1),
            ('>', _) => (Some(Token::CompareOp(CompareOp::Gt)), 1),
            ('=', _) => (Some(Token::Assign), 1),
            (':', _) => (Some(Token::Colon), 1),
            ('{', _) => (Some(Token::LBrace), 1),
            ('}', _) => (Some(Token::RBrace), 1),
            ('(', _) => (Some(Token::LParen), 1),
            (')', _) => (Some(Token::RParen), 1),
            (',', _) => (Some(Token::Comma), 1),
            ('.', _) => (Some(Token::Dot), 1),
            _ => (None, 0),
        };
        if let Some(token) = token {
            for _ in 0..width {
                cur.bump();
            }
            tokens.push(Spanned::new(token, start));
            continue;
        }

        // Identifier / keyword
        if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(w) = cur.peek().filter(|w| w.is_ascii_alphanumeric() || *w == '_') {
                word.push(w);
                cur.bump();
            }
            let token = match Token::keyword(&word) {
                Some(kw) => kw,
                None if c.is_ascii_uppercase() => Token::TypeIdent(word),
                None => Token::Ident(word),
            };
            tokens.push(Spanned::new(token, start));
            continue;
        }

        return Err(LexError::new(
            start,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned::new(Token::Eof, cur.here()));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn splits_identifier_classes_by_capitalization() {
        assert_eq!(
            kinds("def sigma : Alphabet"),
            vec![
                Token::Def,
                Token::Ident("sigma".into()),
                Token::Colon,
                Token::TypeIdent("Alphabet".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_lowercase_only() {
        assert_eq!(
            kinds("else Else"),
            vec![Token::Else, Token::TypeIdent("Else".into()), Token::Eof]
        );
    }

    #[test]
    fn lexes_literals() {
        assert_eq!(
            kinds(r#"'a' '\n' -12 "hi\"there""#),
            vec![
                Token::Char('a'),
                Token::Char('\n'),
                Token::Int(-12),
                Token::Str("hi\"there".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_arrow_assign_and_comparisons() {
        assert_eq!(
            kinds("-> = == != <= < >= > && ||"),
            vec![
                Token::Arrow,
                Token::Assign,
                Token::CompareOp(CompareOp::Eq),
                Token::CompareOp(CompareOp::Ne),
                Token::CompareOp(CompareOp::Le),
                Token::CompareOp(CompareOp::Lt),
                Token::CompareOp(CompareOp::Ge),
                Token::CompareOp(CompareOp::Gt),
                Token::LogicOp(LogicOp::And),
                Token::LogicOp(LogicOp::Or),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let toks = lex("def a\n  : B // note\n/* multi\nline */ =").unwrap();
        let positions: Vec<Position> = toks.iter().map(|s| s.pos).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 1),
                Position::new(1, 5),
                Position::new(2, 3),
                Position::new(2, 5),
                Position::new(4, 9),
                Position::new(4, 10),
            ]
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = lex("\"abc\n\"").unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn rejects_multi_character_char_literal() {
        let err = lex("  'ab'").unwrap_err();
        assert_eq!(err.position, Position::new(1, 3));
    }

    #[test]
    fn rejects_unknown_character() {
        let err = lex("def a @").unwrap_err();
        assert_eq!(err.position, Position::new(1, 7));
        assert!(err.message.contains('@'));
    }

    #[test]
    fn rejects_out_of_range_integer() {
        assert!(lex("99999999999999999999").is_err());
    }
}
