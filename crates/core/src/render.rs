//! Human-readable dump of a parsed program.
//!
//! Leaf nodes render in source syntax (`'a'`, `Pair(1, x)`, `else -> s1`,
//! `(a.x == b.y) && (a.y < b.x)`); declarations render as indented blocks.
//! This is the text the CLI writes to `<input>.out`.

use std::fmt::{self, Display, Formatter};

use crate::ast::*;

const INDENT: &str = "  ";

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn line(f: &mut Formatter<'_>, depth: usize, text: impl Display) -> fmt::Result {
    writeln!(f, "{}{}", INDENT.repeat(depth), text)
}

// ── Leaves ───────────────────────────────────

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.vartype)?;
        join(f, &self.args, ", ")?;
        f.write_str(")")
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::Literal(l) => l.fmt(f),
            Term::Identifier(name) => f.write_str(name),
            Term::Variable(v) => v.fmt(f),
        }
    }
}

impl Display for ConcreteTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConcreteTerm::Literal(l) => l.fmt(f),
            ConcreteTerm::Variable(v) => v.fmt(f),
        }
    }
}

impl Display for DescribeParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        join(f, &self.values, ", ")?;
        write!(f, " from {}", self.source)
    }
}

impl Display for ConstructorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstructorType::Enumeration => "enumeration",
            ConstructorType::Strict => "strict",
            ConstructorType::Describe => "describe",
        })
    }
}

impl Display for TransitionKeyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransitionKeyword::Else => "else",
            TransitionKeyword::Deadend => "deadend",
            TransitionKeyword::Alphabet => "alphabet",
            TransitionKeyword::Itself => "itself",
        })
    }
}

impl Display for TransitionTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransitionTarget::State(name) => f.write_str(name),
            TransitionTarget::Keyword(k) => k.fmt(f),
        }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Term {
                symbol_by,
                state_to,
            } => write!(f, "{} -> {}", symbol_by, state_to),
            Transition::Keyword {
                symbol_by,
                state_to,
            } => write!(f, "{} -> {}", symbol_by, state_to),
        }
    }
}

impl Display for StateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateKind::Start => "start",
            StateKind::Regular => "regular",
            StateKind::Terminal => "terminal",
        })
    }
}

impl Display for ClassField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.field_type)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

impl Display for FieldAccess {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.belongs_to, self.name)
    }
}

impl Display for CompareOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

impl Display for LogicOperations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match item {
                LogicItem::Compare(c) => write!(f, "({})", c)?,
                LogicItem::Operator(op) => write!(f, "{}", op)?,
            }
        }
        Ok(())
    }
}

// ── Blocks ───────────────────────────────────

impl Display for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        line(f, 0, format_args!("Alphabet {}", self.name))?;
        line(f, 1, format_args!("constructor: {}", self.constructor_type()))?;
        match &self.constructor {
            AlphabetConstructor::Enumeration { params } => {
                line(f, 1, "params:")?;
                for p in params {
                    line(f, 2, p)?;
                }
            }
            AlphabetConstructor::Strict { generator, params } => {
                line(f, 1, format_args!("generator: {}", generator))?;
                line(f, 1, "params:")?;
                for p in params {
                    line(f, 2, p)?;
                }
            }
            AlphabetConstructor::Describe { generator, params } => {
                line(f, 1, format_args!("generator: {}", generator))?;
                line(f, 1, "params:")?;
                for p in params {
                    line(f, 2, p)?;
                }
            }
        }
        Ok(())
    }
}

fn states(f: &mut Formatter<'_>, title: &str, states: &[AutomatonState]) -> fmt::Result {
    if states.is_empty() {
        return line(f, 1, format_args!("{}: (none)", title));
    }
    line(f, 1, format_args!("{}:", title))?;
    for state in states {
        line(f, 2, &state.name)?;
        for t in &state.transitions {
            line(f, 3, t)?;
        }
    }
    Ok(())
}

impl Display for Automaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        line(f, 0, format_args!("Automaton {}", self.name))?;
        line(f, 1, format_args!("alphabet: {}", self.alphabet_name))?;
        line(f, 1, format_args!("{}:", self.body.start_state.name))?;
        for t in &self.body.start_state.transitions {
            line(f, 2, t)?;
        }
        states(f, "regular", &self.body.regular_states)?;
        states(f, "terminal", &self.body.terminal_states)
    }
}

impl Display for ClassMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        join(f, &self.fields, ", ")?;
        write!(f, ") : {} = {}", self.return_type, self.operations)
    }
}

impl Display for ClassDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        line(
            f,
            0,
            format_args!("Class {} : {}", self.class_name, self.inherited_from),
        )?;
        line(f, 1, "params:")?;
        for p in &self.params {
            line(f, 2, p)?;
        }
        line(f, 1, "methods:")?;
        for m in &self.methods {
            line(f, 2, m)?;
        }
        Ok(())
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Alphabet(a) => a.fmt(f),
            Declaration::Automaton(a) => a.fmt(f),
            Declaration::Class(c) => c.fmt(f),
        }
    }
}

/// Declarations in source order, separated by blank lines.
impl Display for ProgramScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, d) in self.declarations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            d.fmt(f)?;
        }
        Ok(())
    }
}
