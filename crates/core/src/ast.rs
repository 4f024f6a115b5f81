//! AST produced by the grammar engine.
//!
//! Every node is an immutable value tree. Names that refer to other
//! declarations (alphabets, parent classes, fields) are kept as raw text;
//! resolving them is a later stage's job.

use std::fmt;

use serde::Serialize;

/// Reserved name of the synthesized start state.
pub const START_STATE_NAME: &str = "start";

// ──────────────────────────────────────────────
// Program
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgramScope {
    pub declarations: Vec<Declaration>,
}

impl ProgramScope {
    pub fn alphabets(&self) -> impl Iterator<Item = &Alphabet> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Alphabet(a) => Some(a),
            _ => None,
        })
    }

    pub fn automata(&self) -> impl Iterator<Item = &Automaton> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Automaton(a) => Some(a),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Class(c) => Some(c),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Alphabet(Alphabet),
    Automaton(Automaton),
    Class(ClassDefinition),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Alphabet(a) => &a.name,
            Declaration::Automaton(a) => &a.name,
            Declaration::Class(c) => &c.class_name,
        }
    }
}

// ──────────────────────────────────────────────
// Terms
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Char(char),
    Int(i64),
    Str(String),
}

/// A constructor application `TypeName(arg, ...)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub vartype: String,
    pub args: Vec<Term>,
}

/// Term accepted in alphabet and constructor-argument positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Literal(Literal),
    Identifier(String),
    Variable(Variable),
}

/// Term accepted on a transition's left-hand side and as a field default.
///
/// Unlike [`Term`] it can never be a bare identifier: inside an automaton
/// body an identifier at that position is the next state's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcreteTerm {
    Literal(Literal),
    Variable(Variable),
}

impl From<ConcreteTerm> for Term {
    fn from(t: ConcreteTerm) -> Self {
        match t {
            ConcreteTerm::Literal(l) => Term::Literal(l),
            ConcreteTerm::Variable(v) => Term::Variable(v),
        }
    }
}

// ──────────────────────────────────────────────
// Alphabets
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorType {
    Enumeration,
    Strict,
    Describe,
}

/// One `values from source` entry of a describe alphabet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeParam {
    pub values: Vec<Term>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "constructor_type", rename_all = "snake_case")]
pub enum AlphabetConstructor {
    /// `{ t, t, ... }`
    Enumeration { params: Vec<Term> },
    /// `Gen.(t, t, ...)`
    Strict { generator: String, params: Vec<Term> },
    /// `Gen.{ t, ... from source, ... }`
    Describe {
        generator: String,
        params: Vec<DescribeParam>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alphabet {
    pub name: String,
    pub constructor: AlphabetConstructor,
}

impl Alphabet {
    pub fn constructor_type(&self) -> ConstructorType {
        match self.constructor {
            AlphabetConstructor::Enumeration { .. } => ConstructorType::Enumeration,
            AlphabetConstructor::Strict { .. } => ConstructorType::Strict,
            AlphabetConstructor::Describe { .. } => ConstructorType::Describe,
        }
    }
}

// ──────────────────────────────────────────────
// Automata
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKeyword {
    Else,
    Deadend,
    Alphabet,
    Itself,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTarget {
    State(String),
    Keyword(TransitionKeyword),
}

/// An edge out of the state being described.
///
/// A keyword target is only representable when the symbol is itself a keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum Transition {
    Term {
        symbol_by: ConcreteTerm,
        state_to: String,
    },
    Keyword {
        symbol_by: TransitionKeyword,
        state_to: TransitionTarget,
    },
}

impl Transition {
    /// Destination state name, if the target is not a keyword.
    pub fn target_state(&self) -> Option<&str> {
        match self {
            Transition::Term { state_to, .. } => Some(state_to),
            Transition::Keyword {
                state_to: TransitionTarget::State(name),
                ..
            } => Some(name),
            Transition::Keyword { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Start,
    Regular,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomatonState {
    pub name: String,
    pub kind: StateKind,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomatonBody {
    pub start_state: AutomatonState,
    pub regular_states: Vec<AutomatonState>,
    pub terminal_states: Vec<AutomatonState>,
}

impl AutomatonBody {
    /// All states in declaration order, start state first.
    pub fn states(&self) -> impl Iterator<Item = &AutomatonState> {
        std::iter::once(&self.start_state)
            .chain(self.regular_states.iter())
            .chain(self.terminal_states.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Automaton {
    pub name: String,
    pub alphabet_name: String,
    pub body: AutomatonBody,
}

// ──────────────────────────────────────────────
// Classes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassField {
    pub name: String,
    pub field_type: String,
    pub default_value: Option<ConcreteTerm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOp {
    And,
    Or,
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        })
    }
}

/// `belongs_to.name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAccess {
    pub belongs_to: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareOperation {
    pub left: FieldAccess,
    pub operator: CompareOp,
    pub right: FieldAccess,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicItem {
    Compare(CompareOperation),
    Operator(LogicOp),
}

/// Flat left-to-right chain `cmp op cmp op cmp ...`.
///
/// Consumers evaluate strictly left to right; there is no precedence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicOperations {
    pub items: Vec<LogicItem>,
}

impl LogicOperations {
    pub fn single(op: CompareOperation) -> Self {
        LogicOperations {
            items: vec![LogicItem::Compare(op)],
        }
    }

    pub fn push(&mut self, op: LogicOp, rhs: CompareOperation) {
        self.items.push(LogicItem::Operator(op));
        self.items.push(LogicItem::Compare(rhs));
    }

    pub fn comparisons(&self) -> impl Iterator<Item = &CompareOperation> {
        self.items.iter().filter_map(|i| match i {
            LogicItem::Compare(c) => Some(c),
            LogicItem::Operator(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMethod {
    pub name: String,
    pub fields: Vec<ClassField>,
    pub return_type: String,
    pub operations: LogicOperations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDefinition {
    pub class_name: String,
    pub inherited_from: String,
    pub params: Vec<ClassField>,
    pub methods: Vec<ClassMethod>,
}
