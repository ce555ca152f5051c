use std::sync::Arc;

use super::Formula;

pub trait FormulaVisitor {
    type Ret;

    fn visit(&mut self, node: &Formula) -> Self::Ret {
        match node {
            Formula::Prop(name) => self.visit_prop(name),
            Formula::Not(c) => self.visit_not(c),
            Formula::And(cs) => self.visit_and(cs),
            Formula::Or(cs) => self.visit_or(cs),
            Formula::Impl(left, right) => self.visit_impl(left, right),
            Formula::DImpl(left, right) => self.visit_dimpl(left, right),
        }
    }

    fn visit_prop(&mut self, name: &Arc<str>) -> Self::Ret;

    fn visit_not(&mut self, child: &Formula) -> Self::Ret;

    fn visit_and(&mut self, children: &[Formula]) -> Self::Ret;

    fn visit_or(&mut self, children: &[Formula]) -> Self::Ret;

    fn visit_impl(&mut self, left: &Formula, right: &Formula) -> Self::Ret;

    /// Defeasible implications are treated as their material counterpart
    /// unless a visitor says otherwise.
    fn visit_dimpl(&mut self, left: &Formula, right: &Formula) -> Self::Ret {
        self.visit_impl(left, right)
    }
}
