/// Default bound on the parse stack.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 10_000;

/// Options passed explicitly to every parse entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Upper bound on the shift/reduce stack. Deeper nesting is reported as
    /// a syntax error at the token that would exceed it.
    pub max_stack_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
        }
    }
}

impl ParseConfig {
    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }
}
