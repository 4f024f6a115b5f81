//! LALR(1) action/goto tables.
//!
//! Built from the canonical LR(1) collection by merging states that share
//! an LR(0) core. Any shift/reduce or reduce/reduce conflict fails the build,
//! so a table that exists is deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use super::{NonTerminal, Production, Symbol, Terminal, START};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(s) => write!(f, "shift {}", s),
            Action::Reduce(p) => write!(f, "reduce {}", p),
            Action::Accept => f.write_str("accept"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub lookahead: Terminal,
    pub existing: Action,
    pub incoming: Action,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state {} on {}: {} vs {}",
            self.state, self.lookahead, self.existing, self.incoming
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("grammar is not LALR(1): {}", describe_conflicts(.conflicts))]
pub struct GrammarError {
    pub conflicts: Vec<Conflict>,
}

fn describe_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(Conflict::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An LR(1) item `lhs -> rhs[..dot] . rhs[dot..], lookahead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    prod: usize,
    dot: usize,
    lookahead: Terminal,
}

type ItemSet = BTreeSet<Item>;

struct Builder<'g> {
    productions: &'g [Production],
    augmented: Vec<Symbol>,
    by_lhs: Vec<Vec<usize>>,
    nullable: Vec<bool>,
    first: Vec<BTreeSet<Terminal>>,
}

impl<'g> Builder<'g> {
    fn new(productions: &'g [Production]) -> Self {
        let mut by_lhs = vec![Vec::new(); NonTerminal::COUNT];
        for (i, p) in productions.iter().enumerate() {
            by_lhs[p.lhs.index()].push(i);
        }
        let mut b = Builder {
            productions,
            augmented: vec![Symbol::N(START)],
            by_lhs,
            nullable: vec![false; NonTerminal::COUNT],
            first: vec![BTreeSet::new(); NonTerminal::COUNT],
        };
        b.compute_first_sets();
        b
    }

    /// Index of the implicit `S' -> Program` production.
    fn augmented_index(&self) -> usize {
        self.productions.len()
    }

    fn rhs(&self, prod: usize) -> &[Symbol] {
        if prod == self.augmented_index() {
            &self.augmented
        } else {
            &self.productions[prod].rhs
        }
    }

    fn compute_first_sets(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for p in self.productions {
                let lhs = p.lhs.index();
                let mut all_nullable = true;
                for sym in &p.rhs {
                    match *sym {
                        Symbol::T(t) => {
                            changed |= self.first[lhs].insert(t);
                            all_nullable = false;
                        }
                        Symbol::N(n) => {
                            let add: Vec<Terminal> = self.first[n.index()].iter().copied().collect();
                            for t in add {
                                changed |= self.first[lhs].insert(t);
                            }
                            if !self.nullable[n.index()] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    /// FIRST(symbols lookahead).
    fn first_of(&self, symbols: &[Symbol], lookahead: Terminal) -> BTreeSet<Terminal> {
        let mut out = BTreeSet::new();
        for sym in symbols {
            match *sym {
                Symbol::T(t) => {
                    out.insert(t);
                    return out;
                }
                Symbol::N(n) => {
                    out.extend(self.first[n.index()].iter().copied());
                    if !self.nullable[n.index()] {
                        return out;
                    }
                }
            }
        }
        out.insert(lookahead);
        out
    }

    fn closure(&self, kernel: &ItemSet) -> ItemSet {
        let mut set = kernel.clone();
        let mut work: Vec<Item> = kernel.iter().copied().collect();
        while let Some(item) = work.pop() {
            let rhs = self.rhs(item.prod);
            let Some(Symbol::N(next)) = rhs.get(item.dot).copied() else {
                continue;
            };
            let lookaheads = self.first_of(&rhs[item.dot + 1..], item.lookahead);
            for &prod in &self.by_lhs[next.index()] {
                for &lookahead in &lookaheads {
                    let new = Item {
                        prod,
                        dot: 0,
                        lookahead,
                    };
                    if set.insert(new) {
                        work.push(new);
                    }
                }
            }
        }
        set
    }
}

/// Per canonical LR(1) state: outgoing edges and reductions.
struct CanonicalState {
    kernel: ItemSet,
    edges: BTreeMap<Symbol, usize>,
    reductions: Vec<(Terminal, usize)>,
}

#[derive(Debug)]
pub struct ParseTable {
    actions: Vec<Vec<Option<Action>>>,
    gotos: Vec<Vec<Option<usize>>>,
    productions: Vec<Production>,
}

impl ParseTable {
    pub fn build(productions: Vec<Production>) -> Result<ParseTable, GrammarError> {
        let builder = Builder::new(&productions);
        let augmented = builder.augmented_index();

        // Canonical LR(1) collection, keyed by kernel.
        let start_kernel: ItemSet = [Item {
            prod: augmented,
            dot: 0,
            lookahead: Terminal::End,
        }]
        .into_iter()
        .collect();
        let mut states: Vec<CanonicalState> = Vec::new();
        let mut index: HashMap<ItemSet, usize> = HashMap::new();
        index.insert(start_kernel.clone(), 0);
        states.push(CanonicalState {
            kernel: start_kernel,
            edges: BTreeMap::new(),
            reductions: Vec::new(),
        });

        let mut next = 0;
        while next < states.len() {
            let closure = builder.closure(&states[next].kernel);
            let mut kernels: BTreeMap<Symbol, ItemSet> = BTreeMap::new();
            let mut reductions = Vec::new();
            for item in &closure {
                match builder.rhs(item.prod).get(item.dot) {
                    Some(&sym) => {
                        kernels.entry(sym).or_default().insert(Item {
                            dot: item.dot + 1,
                            ..*item
                        });
                    }
                    None => reductions.push((item.lookahead, item.prod)),
                }
            }
            let mut edges = BTreeMap::new();
            for (sym, kernel) in kernels {
                let target = match index.get(&kernel) {
                    Some(&t) => t,
                    None => {
                        let t = states.len();
                        index.insert(kernel.clone(), t);
                        states.push(CanonicalState {
                            kernel,
                            edges: BTreeMap::new(),
                            reductions: Vec::new(),
                        });
                        t
                    }
                };
                edges.insert(sym, target);
            }
            states[next].edges = edges;
            states[next].reductions = reductions;
            next += 1;
        }

        // Merge states with identical LR(0) cores.
        let mut core_index: HashMap<BTreeSet<(usize, usize)>, usize> = HashMap::new();
        let mut merged = Vec::with_capacity(states.len());
        for state in &states {
            let core: BTreeSet<(usize, usize)> =
                state.kernel.iter().map(|i| (i.prod, i.dot)).collect();
            let fresh = core_index.len();
            merged.push(*core_index.entry(core).or_insert(fresh));
        }
        let count = core_index.len();

        let mut actions = vec![vec![None; Terminal::COUNT]; count];
        let mut gotos = vec![vec![None; NonTerminal::COUNT]; count];
        let mut conflicts = Vec::new();

        for (i, state) in states.iter().enumerate() {
            let from = merged[i];
            for (&sym, &to) in &state.edges {
                match sym {
                    Symbol::T(t) => set_action(
                        &mut actions,
                        &mut conflicts,
                        from,
                        t,
                        Action::Shift(merged[to]),
                    ),
                    Symbol::N(n) => gotos[from][n.index()] = Some(merged[to]),
                }
            }
            for &(lookahead, prod) in &state.reductions {
                let action = if prod == augmented {
                    Action::Accept
                } else {
                    Action::Reduce(prod)
                };
                set_action(&mut actions, &mut conflicts, from, lookahead, action);
            }
        }

        log::debug!(
            "built LALR(1) table: {} productions, {} LR(1) states merged into {}",
            productions.len(),
            states.len(),
            count
        );

        if !conflicts.is_empty() {
            return Err(GrammarError { conflicts });
        }
        Ok(ParseTable {
            actions,
            gotos,
            productions,
        })
    }

    pub fn action(&self, state: usize, lookahead: Terminal) -> Option<Action> {
        self.actions[state][lookahead.index()]
    }

    pub fn goto(&self, state: usize, lhs: NonTerminal) -> Option<usize> {
        self.gotos[state][lhs.index()]
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// Terminals with an action in `state`, in declaration order.
    pub fn expected(&self, state: usize) -> Vec<Terminal> {
        Terminal::ALL
            .iter()
            .copied()
            .filter(|t| self.actions[state][t.index()].is_some())
            .collect()
    }
}

fn set_action(
    actions: &mut [Vec<Option<Action>>],
    conflicts: &mut Vec<Conflict>,
    state: usize,
    lookahead: Terminal,
    action: Action,
) {
    let slot = &mut actions[state][lookahead.index()];
    match *slot {
        None => *slot = Some(action),
        Some(existing) if existing == action => {}
        Some(existing) => conflicts.push(Conflict {
            state,
            lookahead,
            existing,
            incoming: action,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{productions, Rule};

    fn expr_grammar() -> Vec<Production> {
        // Program -> Program LogicOp Compare | Compare ; Compare -> Ident
        vec![
            Production {
                lhs: NonTerminal::Program,
                rhs: vec![
                    Symbol::N(NonTerminal::Program),
                    Symbol::T(Terminal::LogicOp),
                    Symbol::N(NonTerminal::Compare),
                ],
                rule: Rule::LogicChain,
            },
            Production {
                lhs: NonTerminal::Program,
                rhs: vec![Symbol::N(NonTerminal::Compare)],
                rule: Rule::LogicCompare,
            },
            Production {
                lhs: NonTerminal::Compare,
                rhs: vec![Symbol::T(Terminal::Ident)],
                rule: Rule::Compare,
            },
        ]
    }

    #[test]
    fn language_grammar_is_conflict_free() {
        let table = ParseTable::build(productions());
        assert!(table.is_ok(), "{}", table.unwrap_err());
    }

    #[test]
    fn initial_state_expects_declaration_keywords() {
        let table = ParseTable::build(productions()).unwrap();
        assert_eq!(table.expected(0), vec![Terminal::Def, Terminal::Class]);
    }

    #[test]
    fn small_left_recursive_grammar_accepts() {
        let table = ParseTable::build(expr_grammar()).unwrap();
        // state 0 must shift an identifier and accept only after a Program
        assert!(matches!(
            table.action(0, Terminal::Ident),
            Some(Action::Shift(_))
        ));
        assert_eq!(table.action(0, Terminal::End), None);
        let after_program = table.goto(0, NonTerminal::Program).unwrap();
        assert_eq!(
            table.action(after_program, Terminal::End),
            Some(Action::Accept)
        );
    }

    #[test]
    fn ambiguous_grammar_reports_conflict() {
        // Program -> Program Program | Ident
        let ambiguous = vec![
            Production {
                lhs: NonTerminal::Program,
                rhs: vec![
                    Symbol::N(NonTerminal::Program),
                    Symbol::N(NonTerminal::Program),
                ],
                rule: Rule::DeclarationsNext,
            },
            Production {
                lhs: NonTerminal::Program,
                rhs: vec![Symbol::T(Terminal::Ident)],
                rule: Rule::Name,
            },
        ];
        let err = ParseTable::build(ambiguous).unwrap_err();
        assert!(!err.conflicts.is_empty());
        assert!(err.to_string().contains("not LALR(1)"));
    }

    #[test]
    fn every_production_is_reducible() {
        let table = ParseTable::build(productions()).unwrap();
        // Every production index is reachable through some reduce action.
        let mut reduced = vec![false; productions().len()];
        for state in 0..table.state_count() {
            for t in Terminal::ALL {
                if let Some(Action::Reduce(p)) = table.action(state, t) {
                    reduced[p] = true;
                }
            }
        }
        assert!(reduced.iter().all(|r| *r));
    }
}
