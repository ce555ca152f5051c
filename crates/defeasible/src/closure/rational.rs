use std::time::Instant;

use log::{debug, info};

use crate::{logic::Formula, ranking::BaseRank, sat::SatOracle, Result};

use super::{
    infinity_fallback, materialise_ranks, query_antecedent, ClosureDetails, EntailmentResult,
    Reasoner, ReasonerKind,
};

/// Rational closure: drops whole ranks, most normal first, until the
/// antecedent of the query is no longer refuted.
pub struct RationalClosure<'o, O: ?Sized> {
    oracle: &'o O,
}

impl<'o, O: SatOracle + ?Sized> RationalClosure<'o, O> {
    pub fn new(oracle: &'o O) -> Self {
        Self { oracle }
    }
}

impl<'o, O: SatOracle + ?Sized> Reasoner for RationalClosure<'o, O> {
    fn kind(&self) -> ReasonerKind {
        ReasonerKind::Rational
    }

    fn entail(&self, base_rank: &BaseRank, query: &Formula) -> Result<EntailmentResult> {
        let start = Instant::now();
        let negated = query_antecedent(query)?.negate();

        let ranking = base_rank.ranking().sorted_ascending();
        let ranks = ranking.ranks();

        let mut boundary = 0;
        while boundary < ranks.len()
            && !ranks[boundary].is_infinity()
            && self
                .oracle
                .entails(&materialise_ranks(&ranks[boundary..]), &negated)?
        {
            debug!("Rank {} refutes {}", ranks[boundary].number(), negated);
            boundary += 1;
        }

        let mut removed = ranking.slice(0..boundary);
        let mut remaining = ranking.slice(boundary..ranks.len());

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
            "Rational closure: {} {} after removing {} ranks ({:?})",
            if entailed { "entails" } else { "does not entail" },
            query,
            removed.len(),
            elapsed
        );

        Ok(EntailmentResult::builder(self.kind(), base_rank, query)
            .removed(removed)
            .remaining(remaining)
            .entailed(entailed)
            .details(ClosureDetails::Rational)
            .build(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        closure::tests::{entail, PENGUINS},
        parse::parse_formula,
        rank::RankNumber,
    };

    fn numbers(rc: &crate::rank::RankCollection) -> Vec<RankNumber> {
        rc.iter().map(|r| r.number()).collect()
    }

    #[test]
    fn birds_fly() {
        let res = entail(
            ReasonerKind::Rational,
            "p => b; b ~> f; b ~> w; p ~> !f",
            "b ~> f",
        );
        assert!(res.entailed());
        assert!(res
            .entailment_knowledge_base()
            .contains_any_form(&parse_formula("b ~> f").unwrap()));
        assert!(res.removed_ranking().is_empty());
        assert_eq!(
            vec![RankNumber::Infinity, RankNumber::Finite(1), RankNumber::Finite(0)],
            numbers(res.remaining_ranking())
        );
    }

    #[test]
    fn penguins_lose_the_bird_rank() {
        let res = entail(ReasonerKind::Rational, PENGUINS, "penguin ~> flies");
        assert!(!res.entailed());
        assert!(res.entailment_knowledge_base().is_empty());
        assert_eq!(vec![RankNumber::Finite(0)], numbers(res.removed_ranking()));
        assert_eq!(
            vec![RankNumber::Infinity, RankNumber::Finite(1)],
            numbers(res.remaining_ranking())
        );
    }

    #[test]
    fn drops_the_whole_rank() {
        // Rank 0 holds both bird defaults, and losing flight costs wings too
        let res = entail(
            ReasonerKind::Rational,
            "p => b; b ~> f; b ~> w; p ~> !f",
            "p ~> w",
        );
        assert!(!res.entailed());
    }

    #[test]
    fn infinite_rank_is_never_removed() {
        let res = entail(ReasonerKind::Rational, "a ~> b; a ~> !b", "a ~> c");
        assert!(res.entailed());
        assert!(res.removed_ranking().is_empty());
        assert_eq!(vec![RankNumber::Infinity], numbers(res.remaining_ranking()));
    }
}
