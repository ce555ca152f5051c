use std::fmt;

pub type Var = u32;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Lit {
    var: Var,
    negated: bool,
}

impl Lit {
    pub fn new(var: Var, negated: bool) -> Self {
        Lit { var, negated }
    }

    pub fn pos(var: Var) -> Self {
        Lit::new(var, false)
    }

    pub fn var(&self) -> Var {
        self.var
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn not(&self) -> Lit {
        Lit {
            var: self.var,
            negated: !self.negated,
        }
    }

    /// The truth value this literal takes when its variable is set to `value`.
    pub fn eval(&self, value: bool) -> bool {
        value != self.negated
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", if self.negated { "!" } else { "" }, self.var)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new(lits: Vec<Lit>) -> Self {
        Clause { lits }
    }

    pub fn unit(lit: Lit) -> Self {
        Clause { lits: vec![lit] }
    }

    pub fn add(&mut self, lit: Lit) {
        self.lits.push(lit);
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lits: Vec<String> = self.lits.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", lits.join(", "))
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClauseSet {
    clauses: Vec<Clause>,
    num_vars: u32,
}

impl ClauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, c: Clause) {
        for l in c.lits() {
            self.num_vars = self.num_vars.max(l.var() + 1);
        }
        self.clauses.push(c)
    }

    pub fn size(&self) -> usize {
        self.clauses.len()
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }
}

impl fmt::Display for ClauseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        write!(f, "{}", clauses.join(", "))
    }
}
