use std::time::Instant;

use log::{debug, info};

use crate::{
    kb::KnowledgeBase,
    logic::Formula,
    params::ReasonerParams,
    rank::{Rank, RankCollection},
    ranking::BaseRank,
    sat::SatOracle,
    Result,
};

use super::{
    infinity_fallback, materialise_ranks, query_antecedent, subsets::subsets_of_size,
    ClosureDetails, EntailmentResult, Reasoner, ReasonerKind,
};

/// Lexicographic closure. A rank that refutes the antecedent of the query
/// is first cut down to its largest subset that does not, and only dropped
/// when no such subset exists.
pub struct LexicographicClosure<'o, O: ?Sized> {
    oracle: &'o O,
    params: ReasonerParams,
}

impl<'o, O: SatOracle + ?Sized> LexicographicClosure<'o, O> {
    pub fn new(oracle: &'o O, params: &ReasonerParams) -> Self {
        Self {
            oracle,
            params: *params,
        }
    }

    /// The first non-empty proper subset of `rank` that, together with
    /// `above`, leaves `negated` unentailed. Larger subsets come first.
    fn weaken(
        &self,
        rank: &Rank,
        above: &KnowledgeBase,
        negated: &Formula,
        tried: &mut Vec<Rank>,
    ) -> Result<Option<KnowledgeBase>> {
        self.params.check_subsets(rank.len())?;

        for size in (1..rank.len()).rev() {
            for subset in subsets_of_size(rank.formulas(), size) {
                tried.push(Rank::new(rank.number(), subset.clone()));
                if !self
                    .oracle
                    .entails(&above.union(&subset.materialise()), negated)?
                {
                    return Ok(Some(subset));
                }
            }
        }
        Ok(None)
    }
}

impl<'o, O: SatOracle + ?Sized> Reasoner for LexicographicClosure<'o, O> {
    fn kind(&self) -> ReasonerKind {
        ReasonerKind::Lexicographic
    }

    fn entail(&self, base_rank: &BaseRank, query: &Formula) -> Result<EntailmentResult> {
        let start = Instant::now();
        let negated = query_antecedent(query)?.negate();

        let ranking = base_rank.ranking().sorted_ascending();
        let ranks = ranking.ranks();

        let mut removed = RankCollection::new();
        let mut remaining = RankCollection::new();
        let mut weakened = RankCollection::new();
        let mut mini_base_ranking = Vec::new();

        let mut boundary = 0;
        while boundary < ranks.len() {
            let rank = &ranks[boundary];
            if rank.is_infinity()
                || !self
                    .oracle
                    .entails(&materialise_ranks(&ranks[boundary..]), &negated)?
            {
                break;
            }

            let above = materialise_ranks(&ranks[boundary + 1..]);
            if let Some(kept) = self.weaken(rank, &above, &negated, &mut mini_base_ranking)? {
                debug!("Rank {} weakened to {}", rank.number(), kept);
                removed.push(Rank::new(rank.number(), rank.formulas().difference(&kept)));
                remaining.push(Rank::new(rank.number(), kept));
                weakened.push(rank.clone());
                boundary += 1;
                break;
            }

            debug!("Rank {} refutes {}", rank.number(), negated);
            removed.push(rank.clone());
            boundary += 1;
        }

        for r in &ranks[boundary..] {
            remaining.push(r.clone());
        }

        let materialised = query.materialise();
        let mut entailed = self
            .oracle
            .entails(&materialise_ranks(remaining.ranks()), &materialised)?;

        if !entailed {
            if let Some((r, rest)) = infinity_fallback(self.oracle, &ranking, &materialised)? {
                removed = r;
                remaining = rest;
                entailed = true;
            }
        }

        let elapsed = start.elapsed();
        info!(
            "Lexicographic closure: {} {} after weakening {} and removing {} ranks ({:?})",
            if entailed { "entails" } else { "does not entail" },
            query,
            weakened.len(),
            removed.len(),
            elapsed
        );

        Ok(EntailmentResult::builder(self.kind(), base_rank, query)
            .removed(removed)
            .remaining(remaining)
            .entailed(entailed)
            .details(ClosureDetails::Lexicographic {
                weakened_ranking: weakened,
                mini_base_ranking,
            })
            .build(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        closure::tests::{base_rank, entail, PENGUINS},
        parse::{parse_formula, parse_knowledge_base},
        rank::RankNumber,
        sat::DpllOracle,
        Error,
    };

    const BIRDS: &str = "p => b; b ~> f; b ~> w; p ~> !f";

    fn kb(s: &str) -> KnowledgeBase {
        parse_knowledge_base(s).unwrap()
    }

    #[test]
    fn keeps_the_wings() {
        assert!(!entail(ReasonerKind::Rational, BIRDS, "p ~> w").entailed());

        let res = entail(ReasonerKind::Lexicographic, BIRDS, "p ~> w");
        assert!(res.entailed());
        assert!(res
            .entailment_knowledge_base()
            .contains(&parse_formula("b => w").unwrap()));

        let removed = res.removed_ranking();
        assert_eq!(1, removed.len());
        assert_eq!(kb("b ~> f"), *removed.get(RankNumber::Finite(0)).unwrap().formulas());

        match res.details() {
            ClosureDetails::Lexicographic {
                weakened_ranking,
                mini_base_ranking,
            } => {
                assert_eq!(
                    kb("b ~> f; b ~> w"),
                    *weakened_ranking.get(RankNumber::Finite(0)).unwrap().formulas()
                );
                let tried: Vec<_> = mini_base_ranking.iter().map(|r| r.formulas().clone()).collect();
                assert_eq!(vec![kb("b ~> f"), kb("b ~> w")], tried);
            }
            d => panic!("Unexpected details {:?}", d),
        }
    }

    #[test]
    fn singleton_rank_is_dropped() {
        let res = entail(ReasonerKind::Lexicographic, PENGUINS, "penguin ~> flies");
        assert!(!res.entailed());
        match res.details() {
            ClosureDetails::Lexicographic {
                weakened_ranking,
                mini_base_ranking,
            } => {
                assert!(weakened_ranking.is_empty());
                assert!(mini_base_ranking.is_empty());
            }
            d => panic!("Unexpected details {:?}", d),
        }
    }

    #[test]
    fn unaffected_queries_match_rational() {
        for q in ["b ~> f", "p ~> !f", "p ~> f", "b ~> w"] {
            assert_eq!(
                entail(ReasonerKind::Rational, BIRDS, q).entailed(),
                entail(ReasonerKind::Lexicographic, BIRDS, q).entailed(),
                "{}",
                q
            );
        }
    }

    #[test]
    fn subset_limit() {
        let params = ReasonerParams {
            subset_limit: 1,
            ..Default::default()
        };
        let res = LexicographicClosure::new(&DpllOracle::new(), &params)
            .entail(&base_rank(BIRDS), &parse_formula("p ~> w").unwrap());
        assert!(matches!(res, Err(Error::SubsetBlowup { size: 2, limit: 1 })));
    }
}
