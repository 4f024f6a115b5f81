//! Semantic actions: one AST-building step per grammar [`Rule`].

use crate::ast::*;
use crate::error::SyntaxError;
use crate::grammar::{Rule, Terminal};
use crate::lexer::{Position, Spanned, Token};

/// A grammar symbol on the parse stack together with its first position.
#[derive(Debug)]
pub(crate) struct Node {
    pub value: Value,
    pub pos: Position,
}

#[derive(Debug)]
pub(crate) enum Value {
    Token(Token),
    Program(ProgramScope),
    Declarations(Vec<Declaration>),
    Declaration(Declaration),
    DeclHead(String),
    Name(String),
    Terms(Vec<Term>),
    Term(Term),
    Concrete(ConcreteTerm),
    DescribeParams(Vec<DescribeParam>),
    DescribeParam(DescribeParam),
    Head(AutomatonHead),
    Body(AutomatonBody),
    Regular(RegularBlock),
    States(Vec<AutomatonState>),
    StateItems(StateList),
    StateItem(StateItem),
    Transition(Transition),
    Keyword(TransitionKeyword),
    Fields(Vec<ClassField>),
    Field(ClassField),
    Methods(Vec<ClassMethod>),
    Method(ClassMethod),
    Logic(LogicOperations),
    Compare(CompareOperation),
}

#[derive(Debug)]
pub(crate) enum StateItem {
    Name(String),
    Transition(Transition),
}

/// `def name : T = Gen.(alphabet).`, checked before the body is read.
#[derive(Debug)]
pub(crate) struct AutomatonHead {
    name: String,
    alphabet_name: String,
}

/// Closed regular block: transitions that continue the start state, then
/// the regular states.
#[derive(Debug)]
pub(crate) struct RegularBlock {
    leading: Vec<Transition>,
    states: Vec<AutomatonState>,
}

#[derive(Debug)]
struct PendingState {
    name: String,
    transitions: Vec<Transition>,
}

/// Flat run of state names and transitions, grouped as it grows.
///
/// Transitions seen before the first name are kept apart in `leading`;
/// they belong to the start state.
#[derive(Debug, Default)]
pub(crate) struct StateList {
    leading: Vec<Transition>,
    states: Vec<PendingState>,
}

impl StateList {
    fn push(&mut self, item: StateItem, pos: Position) -> Result<(), SyntaxError> {
        match item {
            StateItem::Transition(t) => match self.states.last_mut() {
                Some(state) => state.transitions.push(t),
                None => self.leading.push(t),
            },
            StateItem::Name(name) => {
                if let Some(prev) = self.states.last() {
                    if prev.transitions.is_empty() {
                        return Err(empty_state(&prev.name, pos, format!("state name '{}'", name)));
                    }
                }
                self.states.push(PendingState {
                    name,
                    transitions: Vec::new(),
                });
            }
        }
        Ok(())
    }

    /// Close the list at `end`, the token that follows it.
    fn finish(
        self,
        kind: StateKind,
        end: &Spanned,
    ) -> Result<(Vec<Transition>, Vec<AutomatonState>), SyntaxError> {
        if let Some(last) = self.states.last() {
            if last.transitions.is_empty() {
                return Err(empty_state(&last.name, end.pos, end.token.to_string()));
            }
        }
        let states = self
            .states
            .into_iter()
            .map(|s| AutomatonState {
                name: s.name,
                kind,
                transitions: s.transitions,
            })
            .collect();
        Ok((self.leading, states))
    }
}

fn empty_state(name: &str, pos: Position, found: String) -> SyntaxError {
    let expected = [
        Terminal::Char,
        Terminal::Int,
        Terminal::Str,
        Terminal::TypeIdent,
        Terminal::Else,
        Terminal::Deadend,
        Terminal::AlphabetKw,
        Terminal::Itself,
    ]
    .iter()
    .map(|t| t.to_string())
    .collect();
    SyntaxError::structural(
        pos,
        found,
        expected,
        format!("state '{}' has no transitions", name),
    )
}

fn mismatch(expected: &str, found: &Value) -> ! {
    unreachable!(
        "semantic value mismatch: expected {}, found {:?}",
        expected, found
    )
}

struct Children {
    nodes: std::vec::IntoIter<Node>,
}

macro_rules! take {
    ($children:expr, $variant:ident) => {
        match $children.node().value {
            Value::$variant(v) => v,
            other => mismatch(stringify!($variant), &other),
        }
    };
}

impl Children {
    fn node(&mut self) -> Node {
        match self.nodes.next() {
            Some(n) => n,
            None => unreachable!("production arity mismatch"),
        }
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.node();
        }
    }

    fn token(&mut self) -> Token {
        take!(self, Token)
    }

    /// Text of an identifier or type-name token.
    fn word(&mut self) -> String {
        match self.token() {
            Token::Ident(s) | Token::TypeIdent(s) => s,
            other => mismatch("identifier", &Value::Token(other)),
        }
    }
}

fn literal(token: Token) -> Literal {
    match token {
        Token::Char(c) => Literal::Char(c),
        Token::Int(n) => Literal::Int(n),
        Token::Str(s) => Literal::Str(s),
        other => mismatch("literal", &Value::Token(other)),
    }
}

fn keyword(token: Token) -> TransitionKeyword {
    match token {
        Token::Else => TransitionKeyword::Else,
        Token::Deadend => TransitionKeyword::Deadend,
        Token::Alphabet => TransitionKeyword::Alphabet,
        Token::Itself => TransitionKeyword::Itself,
        other => mismatch("transition keyword", &Value::Token(other)),
    }
}

fn describe_term(term: &Term) -> String {
    match term {
        Term::Literal(Literal::Char(c)) => format!("character literal {:?}", c),
        Term::Literal(Literal::Int(n)) => format!("integer literal {}", n),
        Term::Literal(Literal::Str(s)) => format!("string literal {:?}", s),
        Term::Identifier(name) => format!("identifier '{}'", name),
        Term::Variable(v) => format!("constructor '{}(...)'", v.vartype),
    }
}

/// The alphabet reference of an automaton header: exactly one identifier.
fn alphabet_reference(terms: Vec<Term>, pos: Position) -> Result<String, SyntaxError> {
    let found = match terms.as_slice() {
        [Term::Identifier(_)] => None,
        [single] => Some(describe_term(single)),
        many => Some(format!("{} arguments", many.len())),
    };
    if let Some(found) = found {
        return Err(SyntaxError::structural(
            pos,
            found,
            vec![Terminal::Ident.to_string()],
            "automaton alphabet reference must be a single identifier",
        ));
    }
    match terms.into_iter().next() {
        Some(Term::Identifier(name)) => Ok(name),
        _ => unreachable!("checked above"),
    }
}

/// Build the semantic value for a reduction of `rule` over `children`.
///
/// `lookahead` is the token that triggered the reduction.
pub(crate) fn reduce(
    rule: Rule,
    children: Vec<Node>,
    lookahead: &Spanned,
) -> Result<Value, SyntaxError> {
    let mut c = Children {
        nodes: children.into_iter(),
    };

    let value = match rule {
        Rule::Program => Value::Program(ProgramScope {
            declarations: take!(c, Declarations),
        }),
        Rule::DeclarationsFirst => Value::Declarations(vec![take!(c, Declaration)]),
        Rule::DeclarationsNext => {
            let mut list = take!(c, Declarations);
            list.push(take!(c, Declaration));
            Value::Declarations(list)
        }

        Rule::AlphabetEnumeration => {
            let name = take!(c, DeclHead);
            c.skip(1);
            let params = take!(c, Terms);
            Value::Declaration(Declaration::Alphabet(Alphabet {
                name,
                constructor: AlphabetConstructor::Enumeration { params },
            }))
        }
        Rule::AlphabetStrict => {
            let name = take!(c, DeclHead);
            let generator = c.word();
            c.skip(2);
            let params = take!(c, Terms);
            Value::Declaration(Declaration::Alphabet(Alphabet {
                name,
                constructor: AlphabetConstructor::Strict { generator, params },
            }))
        }
        Rule::AlphabetDescribe => {
            let name = take!(c, DeclHead);
            let generator = c.word();
            c.skip(2);
            let params = take!(c, DescribeParams);
            Value::Declaration(Declaration::Alphabet(Alphabet {
                name,
                constructor: AlphabetConstructor::Describe { generator, params },
            }))
        }
        Rule::Automaton => {
            let head = take!(c, Head);
            c.skip(1);
            let body = take!(c, Body);
            log::debug!(
                "automaton '{}' over alphabet '{}'",
                head.name,
                head.alphabet_name
            );
            Value::Declaration(Declaration::Automaton(Automaton {
                name: head.name,
                alphabet_name: head.alphabet_name,
                body,
            }))
        }
        Rule::AutomatonHead => {
            let name = take!(c, DeclHead);
            c.skip(3);
            let terms = c.node();
            let alphabet_name = match terms.value {
                Value::Terms(list) => alphabet_reference(list, terms.pos)?,
                other => mismatch("Terms", &other),
            };
            Value::Head(AutomatonHead {
                name,
                alphabet_name,
            })
        }
        Rule::ClassDef => {
            c.skip(1);
            let class_name = c.word();
            c.skip(1);
            let params = take!(c, Fields);
            c.skip(2);
            let inherited_from = c.word();
            c.skip(1);
            let methods = take!(c, Methods);
            Value::Declaration(Declaration::Class(ClassDefinition {
                class_name,
                inherited_from,
                params,
                methods,
            }))
        }
        Rule::DeclHead => {
            c.skip(1);
            Value::DeclHead(take!(c, Name))
        }
        Rule::Name => Value::Name(c.word()),

        Rule::EnumerationFirst => Value::Terms(vec![take!(c, Term)]),
        Rule::EnumerationNext => {
            let mut list = take!(c, Terms);
            c.skip(1);
            list.push(take!(c, Term));
            Value::Terms(list)
        }
        Rule::TermLiteral => Value::Term(Term::Literal(literal(c.token()))),
        Rule::TermIdentifier => Value::Term(Term::Identifier(c.word())),
        Rule::TermVariable => {
            let vartype = c.word();
            c.skip(1);
            let args = take!(c, Terms);
            Value::Term(Term::Variable(Variable { vartype, args }))
        }
        Rule::ConcreteLiteral => Value::Concrete(ConcreteTerm::Literal(literal(c.token()))),
        Rule::ConcreteVariable => {
            let vartype = c.word();
            c.skip(1);
            let args = take!(c, Terms);
            Value::Concrete(ConcreteTerm::Variable(Variable { vartype, args }))
        }

        Rule::DescribeFirst => Value::DescribeParams(vec![take!(c, DescribeParam)]),
        Rule::DescribeNext => {
            let mut list = take!(c, DescribeParams);
            c.skip(1);
            list.push(take!(c, DescribeParam));
            Value::DescribeParams(list)
        }
        Rule::DescribePair => {
            let values = take!(c, Terms);
            c.skip(1);
            Value::DescribeParam(DescribeParam {
                values,
                source: c.word(),
            })
        }
        Rule::DescribePairParen => {
            c.skip(1);
            let values = take!(c, Terms);
            c.skip(2);
            Value::DescribeParam(DescribeParam {
                values,
                source: c.word(),
            })
        }

        Rule::AutomatonBody => {
            c.skip(1);
            let first = take!(c, Transition);
            let mut regular = take!(c, Regular);
            c.skip(2);
            let terminal_states = take!(c, States);

            let mut start_transitions = vec![first];
            start_transitions.append(&mut regular.leading);
            Value::Body(AutomatonBody {
                start_state: AutomatonState {
                    name: START_STATE_NAME.to_string(),
                    kind: StateKind::Start,
                    transitions: start_transitions,
                },
                regular_states: regular.states,
                terminal_states,
            })
        }
        // Reduced on `terminal`.
        Rule::RegularBlock => {
            let (leading, states) = take!(c, StateItems).finish(StateKind::Regular, lookahead)?;
            Value::Regular(RegularBlock { leading, states })
        }
        // Reduced on the block's `}`; leading transitions were rejected on entry.
        Rule::TerminalBlock => {
            let (_, states) = take!(c, StateItems).finish(StateKind::Terminal, lookahead)?;
            Value::States(states)
        }
        Rule::StateItemsEmpty => Value::StateItems(StateList::default()),
        Rule::StateItemsNext => {
            let mut list = take!(c, StateItems);
            let item = c.node();
            match item.value {
                Value::StateItem(i) => list.push(i, item.pos)?,
                other => mismatch("StateItem", &other),
            }
            Value::StateItems(list)
        }
        Rule::TerminalItemsNext => {
            let mut list = take!(c, StateItems);
            let item = c.node();
            match item.value {
                Value::StateItem(StateItem::Transition(_)) if list.states.is_empty() => {
                    return Err(SyntaxError::structural(
                        item.pos,
                        "transition".into(),
                        vec![Terminal::Ident.to_string(), Terminal::TypeIdent.to_string()],
                        "terminal block must start with a state name",
                    ));
                }
                Value::StateItem(i) => list.push(i, item.pos)?,
                other => mismatch("StateItem", &other),
            }
            Value::StateItems(list)
        }
        Rule::StateItemName => Value::StateItem(StateItem::Name(take!(c, Name))),
        Rule::StateItemTransition => {
            Value::StateItem(StateItem::Transition(take!(c, Transition)))
        }

        Rule::TransitionOnTerm => {
            let symbol_by = take!(c, Concrete);
            c.skip(1);
            Value::Transition(Transition::Term {
                symbol_by,
                state_to: take!(c, Name),
            })
        }
        Rule::TransitionOnKeyword => {
            let symbol_by = take!(c, Keyword);
            c.skip(1);
            Value::Transition(Transition::Keyword {
                symbol_by,
                state_to: TransitionTarget::State(take!(c, Name)),
            })
        }
        Rule::TransitionKeywordToKeyword => {
            let symbol_by = take!(c, Keyword);
            c.skip(1);
            Value::Transition(Transition::Keyword {
                symbol_by,
                state_to: TransitionTarget::Keyword(take!(c, Keyword)),
            })
        }
        Rule::Keyword => Value::Keyword(keyword(c.token())),

        Rule::FieldsFirst => Value::Fields(vec![take!(c, Field)]),
        Rule::FieldsNext => {
            let mut list = take!(c, Fields);
            c.skip(1);
            list.push(take!(c, Field));
            Value::Fields(list)
        }
        Rule::Field | Rule::FieldWithDefault => {
            let name = c.word();
            c.skip(1);
            let field_type = c.word();
            let default_value = if rule == Rule::FieldWithDefault {
                c.skip(1);
                Some(take!(c, Concrete))
            } else {
                None
            };
            Value::Field(ClassField {
                name,
                field_type,
                default_value,
            })
        }
        Rule::MethodsFirst => Value::Methods(vec![take!(c, Method)]),
        Rule::MethodsNext => {
            let mut list = take!(c, Methods);
            list.push(take!(c, Method));
            Value::Methods(list)
        }
        Rule::Method => {
            c.skip(2);
            let name = c.word();
            c.skip(1);
            let fields = take!(c, Fields);
            c.skip(2);
            let return_type = c.word();
            c.skip(3);
            let operations = take!(c, Logic);
            Value::Method(ClassMethod {
                name,
                fields,
                return_type,
                operations,
            })
        }

        Rule::LogicCompare => Value::Logic(LogicOperations::single(take!(c, Compare))),
        Rule::LogicParen => {
            c.skip(1);
            Value::Logic(take!(c, Logic))
        }
        Rule::LogicChain => {
            let mut chain = take!(c, Logic);
            let op = match c.token() {
                Token::LogicOp(op) => op,
                other => mismatch("logic operator", &Value::Token(other)),
            };
            c.skip(1);
            chain.push(op, take!(c, Compare));
            Value::Logic(chain)
        }
        Rule::Compare => {
            let left = field_access(&mut c);
            let operator = match c.token() {
                Token::CompareOp(op) => op,
                other => mismatch("comparison operator", &Value::Token(other)),
            };
            let right = field_access(&mut c);
            Value::Compare(CompareOperation {
                left,
                operator,
                right,
            })
        }
    };

    log::trace!("reduced {:?} before {}", rule, lookahead.token);
    Ok(value)
}

fn field_access(c: &mut Children) -> FieldAccess {
    let belongs_to = c.word();
    c.skip(1);
    FieldAccess {
        belongs_to,
        name: c.word(),
    }
}
