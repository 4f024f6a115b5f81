//! Grammar of the automaton language as data.
//!
//! Productions are plain values so the LALR(1) table in [`table`] can be
//! derived from them once at startup. Each production carries a [`Rule`]
//! naming the semantic action that builds its AST node.

pub mod table;

use std::fmt;

use crate::lexer::Token;

/// Terminal symbols: token kinds with payloads erased, plus end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    Def,
    Class,
    Override,
    Fun,
    Return,
    Start,
    TerminalKw,
    Else,
    Deadend,
    AlphabetKw,
    Itself,
    From,
    Ident,
    TypeIdent,
    Char,
    Int,
    Str,
    Colon,
    Assign,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Arrow,
    Dot,
    CompareOp,
    LogicOp,
    End,
}

impl Terminal {
    pub const ALL: [Terminal; 29] = [
        Terminal::Def,
        Terminal::Class,
        Terminal::Override,
        Terminal::Fun,
        Terminal::Return,
        Terminal::Start,
        Terminal::TerminalKw,
        Terminal::Else,
        Terminal::Deadend,
        Terminal::AlphabetKw,
        Terminal::Itself,
        Terminal::From,
        Terminal::Ident,
        Terminal::TypeIdent,
        Terminal::Char,
        Terminal::Int,
        Terminal::Str,
        Terminal::Colon,
        Terminal::Assign,
        Terminal::LBrace,
        Terminal::RBrace,
        Terminal::LParen,
        Terminal::RParen,
        Terminal::Comma,
        Terminal::Arrow,
        Terminal::Dot,
        Terminal::CompareOp,
        Terminal::LogicOp,
        Terminal::End,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn of(token: &Token) -> Terminal {
        match token {
            Token::Def => Terminal::Def,
            Token::Class => Terminal::Class,
            Token::Override => Terminal::Override,
            Token::Fun => Terminal::Fun,
            Token::Return => Terminal::Return,
            Token::Start => Terminal::Start,
            Token::Terminal => Terminal::TerminalKw,
            Token::Else => Terminal::Else,
            Token::Deadend => Terminal::Deadend,
            Token::Alphabet => Terminal::AlphabetKw,
            Token::Itself => Terminal::Itself,
            Token::From => Terminal::From,
            Token::Ident(_) => Terminal::Ident,
            Token::TypeIdent(_) => Terminal::TypeIdent,
            Token::Char(_) => Terminal::Char,
            Token::Int(_) => Terminal::Int,
            Token::Str(_) => Terminal::Str,
            Token::Colon => Terminal::Colon,
            Token::Assign => Terminal::Assign,
            Token::LBrace => Terminal::LBrace,
            Token::RBrace => Terminal::RBrace,
            Token::LParen => Terminal::LParen,
            Token::RParen => Terminal::RParen,
            Token::Comma => Terminal::Comma,
            Token::Arrow => Terminal::Arrow,
            Token::Dot => Terminal::Dot,
            Token::CompareOp(_) => Terminal::CompareOp,
            Token::LogicOp(_) => Terminal::LogicOp,
            Token::Eof => Terminal::End,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Terminal::Def => "'def'",
            Terminal::Class => "'class'",
            Terminal::Override => "'override'",
            Terminal::Fun => "'fun'",
            Terminal::Return => "'return'",
            Terminal::Start => "'start'",
            Terminal::TerminalKw => "'terminal'",
            Terminal::Else => "'else'",
            Terminal::Deadend => "'deadend'",
            Terminal::AlphabetKw => "'alphabet'",
            Terminal::Itself => "'itself'",
            Terminal::From => "'from'",
            Terminal::Ident => "identifier",
            Terminal::TypeIdent => "type name",
            Terminal::Char => "character literal",
            Terminal::Int => "integer literal",
            Terminal::Str => "string literal",
            Terminal::Colon => "':'",
            Terminal::Assign => "'='",
            Terminal::LBrace => "'{'",
            Terminal::RBrace => "'}'",
            Terminal::LParen => "'('",
            Terminal::RParen => "')'",
            Terminal::Comma => "','",
            Terminal::Arrow => "'->'",
            Terminal::Dot => "'.'",
            Terminal::CompareOp => "comparison operator",
            Terminal::LogicOp => "logic operator",
            Terminal::End => "end of input",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    Program,
    Declarations,
    Declaration,
    DeclHead,
    Name,
    Enumeration,
    Term,
    ConcreteTerm,
    DescribeBody,
    DescribePair,
    AutomatonHead,
    AutomatonBody,
    RegularBlock,
    TerminalBlock,
    StateItems,
    TerminalItems,
    StateItem,
    Transition,
    Keyword,
    Fields,
    Field,
    Methods,
    Method,
    LogicExpr,
    Compare,
}

impl NonTerminal {
    pub const COUNT: usize = NonTerminal::Compare as usize + 1;

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    T(Terminal),
    N(NonTerminal),
}

/// Semantic action attached to a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Program,
    DeclarationsFirst,
    DeclarationsNext,
    AlphabetEnumeration,
    AlphabetStrict,
    AlphabetDescribe,
    Automaton,
    ClassDef,
    DeclHead,
    Name,
    EnumerationFirst,
    EnumerationNext,
    TermLiteral,
    TermIdentifier,
    TermVariable,
    ConcreteLiteral,
    ConcreteVariable,
    DescribeFirst,
    DescribeNext,
    DescribePair,
    DescribePairParen,
    AutomatonHead,
    AutomatonBody,
    RegularBlock,
    TerminalBlock,
    StateItemsEmpty,
    StateItemsNext,
    TerminalItemsNext,
    StateItemName,
    StateItemTransition,
    TransitionOnTerm,
    TransitionOnKeyword,
    TransitionKeywordToKeyword,
    Keyword,
    FieldsFirst,
    FieldsNext,
    Field,
    FieldWithDefault,
    MethodsFirst,
    MethodsNext,
    Method,
    LogicCompare,
    LogicParen,
    LogicChain,
    Compare,
}

#[derive(Debug, Clone)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
    pub rule: Rule,
}

/// The start symbol of [`productions`].
pub const START: NonTerminal = NonTerminal::Program;

macro_rules! prod {
    ($lhs:ident => [$($sym:ident),*] : $rule:ident) => {
        Production {
            lhs: NonTerminal::$lhs,
            rhs: vec![$(sym::$sym),*],
            rule: Rule::$rule,
        }
    };
}

/// Short aliases so the production list reads like the EBNF.
#[allow(non_upper_case_globals)]
mod sym {
    use super::{NonTerminal as N, Symbol, Terminal as T};

    pub const DEF: Symbol = Symbol::T(T::Def);
    pub const CLASS: Symbol = Symbol::T(T::Class);
    pub const OVERRIDE: Symbol = Symbol::T(T::Override);
    pub const FUN: Symbol = Symbol::T(T::Fun);
    pub const RETURN: Symbol = Symbol::T(T::Return);
    pub const START: Symbol = Symbol::T(T::Start);
    pub const TERMINAL: Symbol = Symbol::T(T::TerminalKw);
    pub const ELSE: Symbol = Symbol::T(T::Else);
    pub const DEADEND: Symbol = Symbol::T(T::Deadend);
    pub const ALPHABET: Symbol = Symbol::T(T::AlphabetKw);
    pub const ITSELF: Symbol = Symbol::T(T::Itself);
    pub const FROM: Symbol = Symbol::T(T::From);
    pub const ID: Symbol = Symbol::T(T::Ident);
    pub const TYPE: Symbol = Symbol::T(T::TypeIdent);
    pub const CHAR: Symbol = Symbol::T(T::Char);
    pub const INT: Symbol = Symbol::T(T::Int);
    pub const STRING: Symbol = Symbol::T(T::Str);
    pub const COLON: Symbol = Symbol::T(T::Colon);
    pub const ASSIGN: Symbol = Symbol::T(T::Assign);
    pub const LBRACE: Symbol = Symbol::T(T::LBrace);
    pub const RBRACE: Symbol = Symbol::T(T::RBrace);
    pub const LPAREN: Symbol = Symbol::T(T::LParen);
    pub const RPAREN: Symbol = Symbol::T(T::RParen);
    pub const COMMA: Symbol = Symbol::T(T::Comma);
    pub const ARROW: Symbol = Symbol::T(T::Arrow);
    pub const DOT: Symbol = Symbol::T(T::Dot);
    pub const COMPAREOP: Symbol = Symbol::T(T::CompareOp);
    pub const LOGICOP: Symbol = Symbol::T(T::LogicOp);

    pub const Declarations: Symbol = Symbol::N(N::Declarations);
    pub const Declaration: Symbol = Symbol::N(N::Declaration);
    pub const DeclHead: Symbol = Symbol::N(N::DeclHead);
    pub const Name: Symbol = Symbol::N(N::Name);
    pub const Enumeration: Symbol = Symbol::N(N::Enumeration);
    pub const Term: Symbol = Symbol::N(N::Term);
    pub const ConcreteTerm: Symbol = Symbol::N(N::ConcreteTerm);
    pub const DescribeBody: Symbol = Symbol::N(N::DescribeBody);
    pub const DescribePair: Symbol = Symbol::N(N::DescribePair);
    pub const AutomatonHead: Symbol = Symbol::N(N::AutomatonHead);
    pub const AutomatonBody: Symbol = Symbol::N(N::AutomatonBody);
    pub const RegularBlock: Symbol = Symbol::N(N::RegularBlock);
    pub const TerminalBlock: Symbol = Symbol::N(N::TerminalBlock);
    pub const StateItems: Symbol = Symbol::N(N::StateItems);
    pub const TerminalItems: Symbol = Symbol::N(N::TerminalItems);
    pub const StateItem: Symbol = Symbol::N(N::StateItem);
    pub const Transition: Symbol = Symbol::N(N::Transition);
    pub const Keyword: Symbol = Symbol::N(N::Keyword);
    pub const Fields: Symbol = Symbol::N(N::Fields);
    pub const Field: Symbol = Symbol::N(N::Field);
    pub const Methods: Symbol = Symbol::N(N::Methods);
    pub const Method: Symbol = Symbol::N(N::Method);
    pub const LogicExpr: Symbol = Symbol::N(N::LogicExpr);
    pub const Compare: Symbol = Symbol::N(N::Compare);
}

/// The full production list. Index 0 is the first `Program` production.
///
/// Lists are left-recursive so each reduction appends to an accumulator in
/// source order. Automaton bodies are a flat sequence of state names and
/// transitions; grouping into states happens in the semantic actions, which
/// lets a capitalized state name and a `Type(...)` transition symbol share a
/// first token without an LR(1) conflict.
///
/// The automaton header and each state block are nonterminals of their own so
/// their checks run as soon as the block closes, before any later token.
pub fn productions() -> Vec<Production> {
    vec![
        prod!(Program => [Declarations] : Program),
        prod!(Declarations => [Declaration] : DeclarationsFirst),
        prod!(Declarations => [Declarations, Declaration] : DeclarationsNext),
        // def S : Alphabet = { ... }
        prod!(Declaration => [DeclHead, LBRACE, Enumeration, RBRACE] : AlphabetEnumeration),
        // def S : Alphabet = Gen.( ... )
        prod!(Declaration => [DeclHead, TYPE, DOT, LPAREN, Enumeration, RPAREN] : AlphabetStrict),
        // def S : Alphabet = Gen.{ ... from x, ... }
        prod!(Declaration => [DeclHead, TYPE, DOT, LBRACE, DescribeBody, RBRACE] : AlphabetDescribe),
        // def A : Automaton = Gen.(S).{ ... }
        prod!(Declaration => [AutomatonHead, LBRACE, AutomatonBody, RBRACE] : Automaton),
        prod!(Declaration => [CLASS, TYPE, LPAREN, Fields, RPAREN, COLON, TYPE, LBRACE, Methods, RBRACE] : ClassDef),
        prod!(DeclHead => [DEF, Name, COLON, TYPE, ASSIGN] : DeclHead),
        prod!(Name => [ID] : Name),
        prod!(Name => [TYPE] : Name),
        prod!(Enumeration => [Term] : EnumerationFirst),
        prod!(Enumeration => [Enumeration, COMMA, Term] : EnumerationNext),
        prod!(Term => [CHAR] : TermLiteral),
        prod!(Term => [INT] : TermLiteral),
        prod!(Term => [STRING] : TermLiteral),
        prod!(Term => [ID] : TermIdentifier),
        prod!(Term => [TYPE] : TermIdentifier),
        prod!(Term => [TYPE, LPAREN, Enumeration, RPAREN] : TermVariable),
        prod!(ConcreteTerm => [CHAR] : ConcreteLiteral),
        prod!(ConcreteTerm => [INT] : ConcreteLiteral),
        prod!(ConcreteTerm => [STRING] : ConcreteLiteral),
        prod!(ConcreteTerm => [TYPE, LPAREN, Enumeration, RPAREN] : ConcreteVariable),
        prod!(DescribeBody => [DescribePair] : DescribeFirst),
        prod!(DescribeBody => [DescribeBody, COMMA, DescribePair] : DescribeNext),
        prod!(DescribePair => [Enumeration, FROM, ID] : DescribePair),
        prod!(DescribePair => [LPAREN, Enumeration, RPAREN, FROM, ID] : DescribePairParen),
        prod!(AutomatonHead => [DeclHead, TYPE, DOT, LPAREN, Enumeration, RPAREN, DOT] : AutomatonHead),
        prod!(AutomatonBody => [START, Transition, RegularBlock, TERMINAL, LBRACE, TerminalBlock, RBRACE] : AutomatonBody),
        prod!(RegularBlock => [StateItems] : RegularBlock),
        prod!(TerminalBlock => [TerminalItems] : TerminalBlock),
        prod!(StateItems => [] : StateItemsEmpty),
        prod!(StateItems => [StateItems, StateItem] : StateItemsNext),
        prod!(TerminalItems => [] : StateItemsEmpty),
        prod!(TerminalItems => [TerminalItems, StateItem] : TerminalItemsNext),
        prod!(StateItem => [Name] : StateItemName),
        prod!(StateItem => [Transition] : StateItemTransition),
        prod!(Transition => [ConcreteTerm, ARROW, Name] : TransitionOnTerm),
        prod!(Transition => [Keyword, ARROW, Name] : TransitionOnKeyword),
        prod!(Transition => [Keyword, ARROW, Keyword] : TransitionKeywordToKeyword),
        prod!(Keyword => [ELSE] : Keyword),
        prod!(Keyword => [DEADEND] : Keyword),
        prod!(Keyword => [ALPHABET] : Keyword),
        prod!(Keyword => [ITSELF] : Keyword),
        prod!(Fields => [Field] : FieldsFirst),
        prod!(Fields => [Fields, COMMA, Field] : FieldsNext),
        prod!(Field => [ID, COLON, TYPE] : Field),
        prod!(Field => [ID, COLON, TYPE, ASSIGN, ConcreteTerm] : FieldWithDefault),
        prod!(Methods => [Method] : MethodsFirst),
        prod!(Methods => [Methods, Method] : MethodsNext),
        prod!(Method => [OVERRIDE, FUN, ID, LPAREN, Fields, RPAREN, COLON, TYPE, LBRACE, RETURN, LPAREN, LogicExpr, RPAREN, RBRACE] : Method),
        prod!(LogicExpr => [Compare] : LogicCompare),
        prod!(LogicExpr => [LPAREN, LogicExpr, RPAREN] : LogicParen),
        prod!(LogicExpr => [LogicExpr, LOGICOP, LPAREN, Compare, RPAREN] : LogicChain),
        prod!(Compare => [ID, DOT, ID, COMPAREOP, ID, DOT, ID] : Compare),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn terminal_indices_are_dense() {
        for (i, t) in Terminal::ALL.iter().enumerate() {
            assert_eq!(t.index(), i, "{:?}", t);
        }
    }

    #[test]
    fn every_nonterminal_has_a_production() {
        let prods = productions();
        let lhs: HashSet<NonTerminal> = prods.iter().map(|p| p.lhs).collect();
        assert_eq!(lhs.len(), NonTerminal::COUNT);
    }

    #[test]
    fn start_symbol_heads_the_list() {
        assert_eq!(productions()[0].lhs, START);
    }
}
