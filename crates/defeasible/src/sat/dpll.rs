use crate::{
    clause::{Clause, ClauseSet, Lit, Var},
    kb::KnowledgeBase,
    logic::tseytin_cnf::TseytinCNF,
    params::ReasonerParams,
};

use super::{OracleError, OracleResult, SatOracle};

/// Oracle backed by a plain DPLL search with unit propagation over the
/// Tseytin encoding of the formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpllOracle {
    max_decisions: Option<u64>,
}

impl DpllOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up with [`OracleError::Undecided`] after `max` branching decisions.
    pub fn with_max_decisions(max: u64) -> Self {
        Self {
            max_decisions: Some(max),
        }
    }

    pub fn from_params(params: &ReasonerParams) -> Self {
        Self {
            max_decisions: params.max_decisions,
        }
    }
}

impl SatOracle for DpllOracle {
    fn consistent(&self, formulas: &KnowledgeBase) -> OracleResult<bool> {
        let mut cnf = TseytinCNF::new();
        for f in formulas {
            cnf.assert(f);
        }
        if cnf.clause_set.has_empty_clause() {
            return Ok(false);
        }
        Solver::new(&cnf.clause_set, self.max_decisions).search()
    }
}

enum ClauseStatus {
    Satisfied,
    Conflict,
    Unit(Lit),
    Open,
}

struct Solver<'c> {
    clauses: &'c [Clause],
    assignment: Vec<Option<bool>>,
    trail: Vec<Var>,
    decisions: u64,
    max_decisions: Option<u64>,
}

impl<'c> Solver<'c> {
    fn new(cs: &'c ClauseSet, max_decisions: Option<u64>) -> Self {
        Self {
            clauses: cs.clauses(),
            assignment: vec![None; cs.num_vars() as usize],
            trail: Vec::new(),
            decisions: 0,
            max_decisions,
        }
    }

    fn search(&mut self) -> OracleResult<bool> {
        let mark = self.trail.len();

        if !self.propagate() {
            self.undo(mark);
            return Ok(false);
        }

        let var = match self.pick_branch() {
            Some(v) => v,
            None => return Ok(true),
        };

        for value in [true, false] {
            self.decide()?;
            let inner = self.trail.len();
            self.assign(var, value);
            if self.search()? {
                return Ok(true);
            }
            self.undo(inner);
        }

        self.undo(mark);
        Ok(false)
    }

    fn decide(&mut self) -> OracleResult<()> {
        if let Some(max) = self.max_decisions {
            if self.decisions >= max {
                return Err(OracleError::Undecided(self.decisions));
            }
        }
        self.decisions += 1;
        Ok(())
    }

    fn propagate(&mut self) -> bool {
        let clauses = self.clauses;
        loop {
            let mut changed = false;
            for c in clauses {
                match self.status(c) {
                    ClauseStatus::Satisfied | ClauseStatus::Open => {}
                    ClauseStatus::Conflict => return false,
                    ClauseStatus::Unit(l) => {
                        self.assign(l.var(), !l.negated());
                        changed = true;
                    }
                }
            }
            if !changed {
                return true;
            }
        }
    }

    fn status(&self, c: &Clause) -> ClauseStatus {
        let mut unassigned = None;
        let mut open = 0;

        for l in c.lits() {
            match self.assignment[l.var() as usize] {
                Some(v) if l.eval(v) => return ClauseStatus::Satisfied,
                Some(_) => {}
                None => {
                    open += 1;
                    unassigned = Some(*l);
                }
            }
        }

        match (open, unassigned) {
            (0, _) => ClauseStatus::Conflict,
            (1, Some(l)) => ClauseStatus::Unit(l),
            _ => ClauseStatus::Open,
        }
    }

    fn pick_branch(&self) -> Option<Var> {
        self.clauses
            .iter()
            .filter(|c| !matches!(self.status(c), ClauseStatus::Satisfied))
            .flat_map(|c| c.lits())
            .find(|l| self.assignment[l.var() as usize].is_none())
            .map(Lit::var)
    }

    fn assign(&mut self, var: Var, value: bool) {
        self.assignment[var as usize] = Some(value);
        self.trail.push(var);
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(v) = self.trail.pop() {
                self.assignment[v as usize] = None;
            }
        }
    }
}
