use std::{collections::BTreeSet, fmt, sync::Arc};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::logic::{collectors::AtomCollector, visitor::FormulaVisitor, Formula};

/// A set of formulas. Iteration follows insertion order so that every
/// algorithm working on it is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    formulas: IndexSet<Formula>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, f: Formula) -> bool {
        self.formulas.insert(f)
    }

    pub fn extend<I: IntoIterator<Item = Formula>>(&mut self, formulas: I) {
        self.formulas.extend(formulas);
    }

    pub fn contains(&self, f: &Formula) -> bool {
        self.formulas.contains(f)
    }

    pub fn contains_any_form(&self, f: &Formula) -> bool {
        self.find_any_form(f).is_some()
    }

    fn find_any_form(&self, f: &Formula) -> Option<Formula> {
        [f.clone(), f.materialise(), f.dematerialise()]
            .into_iter()
            .find(|g| self.formulas.contains(g))
    }

    pub fn remove(&mut self, f: &Formula) -> bool {
        self.formulas.shift_remove(f)
    }

    /// Removes whichever of the three representations of `f` is present.
    pub fn remove_any_form(&mut self, f: &Formula) -> bool {
        match self.find_any_form(f) {
            Some(g) => self.remove(&g),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Formula> {
        self.formulas.iter()
    }

    pub fn defeasible(&self) -> KnowledgeBase {
        self.iter().filter(|f| f.is_defeasible()).cloned().collect()
    }

    pub fn classical(&self) -> KnowledgeBase {
        self.iter().filter(|f| !f.is_defeasible()).cloned().collect()
    }

    pub fn materialise(&self) -> KnowledgeBase {
        self.iter().map(Formula::materialise).collect()
    }

    pub fn dematerialise(&self) -> KnowledgeBase {
        self.iter().map(Formula::dematerialise).collect()
    }

    pub fn antecedents(&self) -> KnowledgeBase {
        self.iter()
            .filter_map(Formula::antecedent)
            .cloned()
            .collect()
    }

    pub fn atoms(&self) -> BTreeSet<Arc<str>> {
        let mut c = AtomCollector::new();
        for f in self.iter() {
            c.visit(f);
        }
        c.into_atoms()
    }

    pub fn union(&self, other: &KnowledgeBase) -> KnowledgeBase {
        self.formulas.union(&other.formulas).cloned().collect()
    }

    pub fn intersection(&self, other: &KnowledgeBase) -> KnowledgeBase {
        self.formulas.intersection(&other.formulas).cloned().collect()
    }

    pub fn difference(&self, other: &KnowledgeBase) -> KnowledgeBase {
        self.formulas.difference(&other.formulas).cloned().collect()
    }

    pub fn is_subset(&self, other: &KnowledgeBase) -> bool {
        self.formulas.is_subset(&other.formulas)
    }

    pub fn is_disjoint(&self, other: &KnowledgeBase) -> bool {
        self.formulas.is_disjoint(&other.formulas)
    }

    pub fn without(&self, f: &Formula) -> KnowledgeBase {
        let mut kb = self.clone();
        kb.remove(f);
        kb
    }

    pub fn with(&self, f: Formula) -> KnowledgeBase {
        let mut kb = self.clone();
        kb.insert(f);
        kb
    }

    /// Splits the set into the first `len / 2` formulas and the rest.
    pub fn halves(&self) -> (KnowledgeBase, KnowledgeBase) {
        let mid = self.len() / 2;
        let left = self.iter().take(mid).cloned().collect();
        let right = self.iter().skip(mid).cloned().collect();
        (left, right)
    }

    /// Order-independent key, for using knowledge bases as set elements.
    pub fn canonical(&self) -> Vec<Formula> {
        let mut v: Vec<Formula> = self.iter().cloned().collect();
        v.sort();
        v
    }
}

impl FromIterator<Formula> for KnowledgeBase {
    fn from_iter<T: IntoIterator<Item = Formula>>(iter: T) -> Self {
        KnowledgeBase {
            formulas: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for KnowledgeBase {
    type Item = Formula;
    type IntoIter = indexmap::set::IntoIter<Formula>;

    fn into_iter(self) -> Self::IntoIter {
        self.formulas.into_iter()
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a Formula;
    type IntoIter = indexmap::set::Iter<'a, Formula>;

    fn into_iter(self) -> Self::IntoIter {
        self.formulas.iter()
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formulas: Vec<String> = self.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", formulas.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::KnowledgeBase;
    use crate::parse::{parse_formula, parse_knowledge_base};

    fn kb(s: &str) -> KnowledgeBase {
        parse_knowledge_base(s).unwrap()
    }

    #[test]
    fn partitions() {
        let k = kb("p => b; b ~> f; b ~> w; p ~> !f");
        assert_eq!(kb("p => b"), k.classical());
        assert_eq!(kb("b ~> f; b ~> w; p ~> !f"), k.defeasible());
        assert_eq!(k, k.classical().union(&k.defeasible()));
    }

    #[test]
    fn materialise_and_back() {
        let k = kb("b ~> f; p ~> !f");
        let m = k.materialise();
        assert_eq!(kb("b => f; p => !f"), m);
        assert_eq!(k, m.dematerialise());
    }

    #[test]
    fn equality_ignores_order() {
        assert_eq!(kb("a; b; c"), kb("c; a; b"));
        assert_ne!(kb("a; b"), kb("a; b; c"));
    }

    #[test]
    fn set_algebra() {
        let a = kb("a; b; c");
        let b = kb("b; c; d");
        assert_eq!(kb("a; b; c; d"), a.union(&b));
        assert_eq!(kb("b; c"), a.intersection(&b));
        assert_eq!(kb("a"), a.difference(&b));
        assert!(kb("b").is_subset(&a));
        assert!(kb("a").is_disjoint(&b));
    }

    #[test]
    fn remove_under_any_representation() {
        let mut k = kb("b ~> f; p => b");
        assert!(k.contains_any_form(&parse_formula("b => f").unwrap()));
        assert!(k.remove_any_form(&parse_formula("p ~> b").unwrap()));
        assert!(k.remove_any_form(&parse_formula("b => f").unwrap()));
        assert!(k.is_empty());
        assert!(!k.remove_any_form(&parse_formula("x").unwrap()));
    }

    #[test]
    fn remove_keeps_order() {
        let mut k = kb("a; b; c; d");
        k.remove(&parse_formula("b").unwrap());
        let names: Vec<String> = k.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["a", "c", "d"], names);
    }

    #[test]
    fn antecedents_are_deduplicated() {
        assert_eq!(kb("b; p"), kb("b ~> f; b ~> w; p ~> !f; q").antecedents());
    }

    #[test]
    fn halves() {
        let (l, r) = kb("a; b; c").halves();
        assert_eq!(kb("a"), l);
        assert_eq!(kb("b; c"), r);
    }
}
