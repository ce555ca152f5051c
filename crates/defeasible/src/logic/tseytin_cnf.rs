use std::{collections::HashMap, sync::Arc};

use crate::clause::{Clause, ClauseSet, Lit, Var};

use super::{visitor::FormulaVisitor, Formula};

/// Equisatisfiable CNF encoding of a set of formulas.
///
/// Atoms keep one variable across all asserted formulas; every compound
/// subformula gets a fresh variable defined by its Tseytin clauses.
pub struct TseytinCNF {
    pub clause_set: ClauseSet,
    atoms: HashMap<Arc<str>, Var>,
    idx: Var,
}

impl TseytinCNF {
    pub fn new() -> Self {
        Self {
            clause_set: ClauseSet::new(),
            atoms: HashMap::new(),
            idx: 0,
        }
    }

    pub fn assert(&mut self, f: &Formula) {
        let lit = self.visit(f);
        self.clause_set.add(Clause::unit(lit));
    }

    pub fn atom_var(&self, name: &str) -> Option<Var> {
        self.atoms.get(name).copied()
    }

    #[inline]
    fn fresh(&mut self) -> Lit {
        let v = self.idx;
        self.idx += 1;
        Lit::pos(v)
    }

    fn encode_and(&mut self, children: &[Lit]) -> Lit {
        let self_lit = self.fresh();

        let mut back = Clause::unit(self_lit);
        for c in children {
            self.clause_set.add(Clause::new(vec![self_lit.not(), *c]));
            back.add(c.not());
        }
        self.clause_set.add(back);

        self_lit
    }

    fn encode_or(&mut self, children: &[Lit]) -> Lit {
        let self_lit = self.fresh();

        let mut forth = Clause::unit(self_lit.not());
        for c in children {
            self.clause_set.add(Clause::new(vec![self_lit, c.not()]));
            forth.add(*c);
        }
        self.clause_set.add(forth);

        self_lit
    }
}

impl Default for TseytinCNF {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaVisitor for TseytinCNF {
    type Ret = Lit;

    fn visit_prop(&mut self, name: &Arc<str>) -> Self::Ret {
        if let Some(v) = self.atoms.get(name) {
            return Lit::pos(*v);
        }
        let lit = self.fresh();
        self.atoms.insert(name.clone(), lit.var());
        lit
    }

    fn visit_not(&mut self, child: &Formula) -> Self::Ret {
        self.visit(child).not()
    }

    fn visit_and(&mut self, children: &[Formula]) -> Self::Ret {
        let lits: Vec<Lit> = children.iter().map(|c| self.visit(c)).collect();
        self.encode_and(&lits)
    }

    fn visit_or(&mut self, children: &[Formula]) -> Self::Ret {
        let lits: Vec<Lit> = children.iter().map(|c| self.visit(c)).collect();
        self.encode_or(&lits)
    }

    fn visit_impl(&mut self, left: &Formula, right: &Formula) -> Self::Ret {
        let left = self.visit(left);
        let right = self.visit(right);
        self.encode_or(&[left.not(), right])
    }
}
