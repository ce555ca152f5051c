use std::{collections::BTreeSet, sync::Arc};

use super::{visitor::FormulaVisitor, Formula};

pub fn collect_atoms(n: &Formula) -> BTreeSet<Arc<str>> {
    let mut c = AtomCollector::new();
    c.visit(n);
    c.0
}

pub struct AtomCollector(BTreeSet<Arc<str>>);

impl AtomCollector {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn into_atoms(self) -> BTreeSet<Arc<str>> {
        self.0
    }
}

impl Default for AtomCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaVisitor for AtomCollector {
    type Ret = ();

    fn visit_prop(&mut self, name: &Arc<str>) -> Self::Ret {
        self.0.insert(name.clone());
    }

    fn visit_not(&mut self, child: &Formula) -> Self::Ret {
        self.visit(child)
    }

    fn visit_and(&mut self, children: &[Formula]) -> Self::Ret {
        for c in children {
            self.visit(c);
        }
    }

    fn visit_or(&mut self, children: &[Formula]) -> Self::Ret {
        for c in children {
            self.visit(c);
        }
    }

    fn visit_impl(&mut self, left: &Formula, right: &Formula) -> Self::Ret {
        self.visit(left);
        self.visit(right)
    }
}
