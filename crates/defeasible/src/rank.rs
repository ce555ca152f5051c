use std::{fmt, ops::Range};

use serde::{Serialize, Serializer};

use crate::{kb::KnowledgeBase, logic::Formula};

/// Position of a rank. `Infinity` sorts after every finite rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankNumber {
    Finite(usize),
    Infinity,
}

impl RankNumber {
    pub fn is_infinity(&self) -> bool {
        matches!(self, RankNumber::Infinity)
    }
}

impl fmt::Display for RankNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankNumber::Finite(n) => write!(f, "{}", n),
            RankNumber::Infinity => write!(f, "∞"),
        }
    }
}

impl Serialize for RankNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RankNumber::Finite(n) => serializer.serialize_u64(*n as u64),
            RankNumber::Infinity => serializer.serialize_str("∞"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rank {
    #[serde(rename = "rankNumber")]
    number: RankNumber,
    formulas: KnowledgeBase,
}

impl Rank {
    pub fn new(number: RankNumber, formulas: KnowledgeBase) -> Self {
        Rank { number, formulas }
    }

    pub fn finite(n: usize, formulas: KnowledgeBase) -> Self {
        Rank::new(RankNumber::Finite(n), formulas)
    }

    pub fn infinity(formulas: KnowledgeBase) -> Self {
        Rank::new(RankNumber::Infinity, formulas)
    }

    pub fn number(&self) -> RankNumber {
        self.number
    }

    pub fn formulas(&self) -> &KnowledgeBase {
        &self.formulas
    }

    pub fn is_infinity(&self) -> bool {
        self.number.is_infinity()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.number, self.formulas)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RankErr {
    DuplicateNumber(RankNumber),
    DuplicateFormula(Formula),
}

impl fmt::Display for RankErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankErr::DuplicateNumber(n) => write!(f, "Rank {} is already present", n),
            RankErr::DuplicateFormula(formula) => {
                write!(f, "Formula {} already belongs to another rank", formula)
            }
        }
    }
}

/// Ordered list of ranks with unique numbers and pairwise disjoint formulas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankCollection {
    ranks: Vec<Rank>,
}

impl RankCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rank`, rejecting it when its number or one of its formulas
    /// is already taken.
    pub fn try_push(&mut self, rank: Rank) -> Result<(), RankErr> {
        if self.get(rank.number).is_some() {
            return Err(RankErr::DuplicateNumber(rank.number));
        }
        for r in &self.ranks {
            if let Some(f) = rank.formulas.iter().find(|f| r.formulas.contains(f)) {
                return Err(RankErr::DuplicateFormula(f.clone()));
            }
        }
        self.ranks.push(rank);
        Ok(())
    }

    pub(crate) fn push(&mut self, rank: Rank) {
        debug_assert!(self.get(rank.number).is_none(), "duplicate rank {}", rank.number);
        self.ranks.push(rank);
    }

    pub fn get(&self, number: RankNumber) -> Option<&Rank> {
        self.ranks.iter().find(|r| r.number == number)
    }

    pub fn infinity_rank(&self) -> Option<&Rank> {
        self.get(RankNumber::Infinity)
    }

    pub fn except_infinity(&self) -> RankCollection {
        self.ranks
            .iter()
            .filter(|r| !r.is_infinity())
            .cloned()
            .collect()
    }

    pub fn sorted_ascending(&self) -> RankCollection {
        let mut ranks = self.ranks.clone();
        ranks.sort_by_key(Rank::number);
        RankCollection { ranks }
    }

    pub fn sorted_descending(&self) -> RankCollection {
        let mut ranks = self.ranks.clone();
        ranks.sort_by_key(|r| std::cmp::Reverse(r.number));
        RankCollection { ranks }
    }

    pub fn slice(&self, range: Range<usize>) -> RankCollection {
        RankCollection {
            ranks: self.ranks[range].to_vec(),
        }
    }

    pub fn knowledge_base(&self) -> KnowledgeBase {
        self.ranks
            .iter()
            .flat_map(|r| r.formulas.iter().cloned())
            .collect()
    }

    /// Number of the rank holding `f`, under any of its representations.
    pub fn rank_of(&self, f: &Formula) -> Option<RankNumber> {
        self.ranks
            .iter()
            .find(|r| r.formulas.contains_any_form(f))
            .map(Rank::number)
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rank> {
        self.ranks.iter()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn formula_count(&self) -> usize {
        self.ranks.iter().map(Rank::len).sum()
    }
}

impl FromIterator<Rank> for RankCollection {
    fn from_iter<T: IntoIterator<Item = Rank>>(iter: T) -> Self {
        RankCollection {
            ranks: iter.into_iter().collect(),
        }
    }
}

impl Extend<Rank> for RankCollection {
    fn extend<T: IntoIterator<Item = Rank>>(&mut self, iter: T) {
        for r in iter {
            self.push(r);
        }
    }
}

impl<'a> IntoIterator for &'a RankCollection {
    type Item = &'a Rank;
    type IntoIter = std::slice::Iter<'a, Rank>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranks.iter()
    }
}

impl fmt::Display for RankCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.ranks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", r)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_knowledge_base;

    fn kb(s: &str) -> KnowledgeBase {
        parse_knowledge_base(s).unwrap()
    }

    fn collection() -> RankCollection {
        let mut c = RankCollection::new();
        c.try_push(Rank::finite(1, kb("p ~> !f"))).unwrap();
        c.try_push(Rank::infinity(kb("p => b"))).unwrap();
        c.try_push(Rank::finite(0, kb("b ~> f; b ~> w"))).unwrap();
        c
    }

    #[test]
    fn infinity_is_last() {
        assert!(RankNumber::Finite(usize::MAX) < RankNumber::Infinity);
        let numbers: Vec<String> = collection()
            .sorted_ascending()
            .iter()
            .map(|r| r.number().to_string())
            .collect();
        assert_eq!(vec!["0", "1", "∞"], numbers);
    }

    #[test]
    fn sorted_descending() {
        let numbers: Vec<RankNumber> = collection()
            .sorted_descending()
            .iter()
            .map(Rank::number)
            .collect();
        assert_eq!(
            vec![
                RankNumber::Infinity,
                RankNumber::Finite(1),
                RankNumber::Finite(0)
            ],
            numbers
        );
    }

    #[test]
    fn rejects_duplicates() {
        let mut c = collection();
        assert_eq!(
            Err(RankErr::DuplicateNumber(RankNumber::Infinity)),
            c.try_push(Rank::infinity(kb("x")))
        );
        assert!(matches!(
            c.try_push(Rank::finite(5, kb("x; b ~> w"))),
            Err(RankErr::DuplicateFormula(_))
        ));
        assert_eq!(3, c.len());
    }

    #[test]
    fn knowledge_base_is_union() {
        let c = collection();
        assert_eq!(kb("p => b; b ~> f; b ~> w; p ~> !f"), c.knowledge_base());
        assert_eq!(4, c.formula_count());
    }

    #[test]
    fn infinity_lookup() {
        let c = collection();
        assert_eq!(kb("p => b"), *c.infinity_rank().unwrap().formulas());
        assert_eq!(2, c.except_infinity().len());
        assert!(c.except_infinity().infinity_rank().is_none());
    }

    #[test]
    fn rank_of_any_form() {
        let c = collection();
        let f = crate::parse::parse_formula("b => w").unwrap();
        assert_eq!(Some(RankNumber::Finite(0)), c.rank_of(&f));
    }

    #[test]
    fn serializes_infinity() {
        let json = serde_json::to_string(&Rank::infinity(kb("a"))).unwrap();
        assert_eq!(r#"{"rankNumber":"∞","formulas":["a"]}"#, json);
    }
}
