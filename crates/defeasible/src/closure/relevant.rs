use std::time::Instant;

use log::{debug, info};

use crate::{
    explain::compute_all_justifications,
    kb::KnowledgeBase,
    logic::Formula,
    params::ReasonerParams,
    rank::{Rank, RankCollection},
    ranking::BaseRank,
    sat::SatOracle,
    Result,
};

use super::{
    infinity_fallback, query_antecedent, subsets::subsets_of_size, ClosureDetails,
    EntailmentResult, Reasoner, ReasonerKind,
};

/// Basic relevant closure: every finite-rank formula taking part in a
/// justification of the negated antecedent may be given up.
pub struct BasicRelevantClosure<'o, O: ?Sized> {
    oracle: &'o O,
    params: ReasonerParams,
}

impl<'o, O: SatOracle + ?Sized> BasicRelevantClosure<'o, O> {
    pub fn new(oracle: &'o O, params: &ReasonerParams) -> Self {
        Self {
            oracle,
            params: *params,
        }
    }
}

impl<'o, O: SatOracle + ?Sized> Reasoner for BasicRelevantClosure<'o, O> {
    fn kind(&self) -> ReasonerKind {
        ReasonerKind::BasicRelevant
    }

    fn entail(&self, base_rank: &BaseRank, query: &Formula) -> Result<EntailmentResult> {
        relevant_entail(self.oracle, &self.params, self.kind(), base_rank, query)
    }
}

/// Minimal relevant closure: of each justification, only the formulas on
/// its most normal rank may be given up.
pub struct MinimalRelevantClosure<'o, O: ?Sized> {
    oracle: &'o O,
    params: ReasonerParams,
}

impl<'o, O: SatOracle + ?Sized> MinimalRelevantClosure<'o, O> {
    pub fn new(oracle: &'o O, params: &ReasonerParams) -> Self {
        Self {
            oracle,
            params: *params,
        }
    }
}

impl<'o, O: SatOracle + ?Sized> Reasoner for MinimalRelevantClosure<'o, O> {
    fn kind(&self) -> ReasonerKind {
        ReasonerKind::MinimalRelevant
    }

    fn entail(&self, base_rank: &BaseRank, query: &Formula) -> Result<EntailmentResult> {
        relevant_entail(self.oracle, &self.params, self.kind(), base_rank, query)
    }
}

/// Finite-rank formulas the closure may give up. `ranking` must be sorted
/// ascending.
fn relevant_formulas(
    ranking: &RankCollection,
    justifications: &[KnowledgeBase],
    minimal: bool,
) -> KnowledgeBase {
    let finite = ranking.except_infinity();

    if !minimal {
        let culprits = justifications
            .iter()
            .fold(KnowledgeBase::new(), |acc, j| acc.union(j));
        return finite
            .knowledge_base()
            .into_iter()
            .filter(|f| culprits.contains_any_form(f))
            .collect();
    }

    let mut relevant = KnowledgeBase::new();
    for j in justifications {
        let lowest = finite
            .iter()
            .find(|r| r.formulas().iter().any(|f| j.contains_any_form(f)));
        if let Some(r) = lowest {
            relevant.extend(r.formulas().iter().filter(|f| j.contains_any_form(f)).cloned());
        }
    }
    relevant
}

/// Candidate sets of relevant formulas to keep, from all of them down to
/// none. Formulas of more normal ranks are given up first: every subset of
/// the lowest rank, largest first, is tried with all higher ranks before
/// the next rank is touched.
fn candidates(relevant: &RankCollection) -> impl Iterator<Item = KnowledgeBase> + '_ {
    let ranks = relevant.ranks();
    std::iter::once(relevant.knowledge_base()).chain((0..ranks.len()).flat_map(move |j| {
        let rank = &ranks[j];
        let higher: KnowledgeBase = ranks[j + 1..]
            .iter()
            .flat_map(|r| r.formulas().iter().cloned())
            .collect();
        (0..rank.len()).rev().flat_map(move |keep| {
            let higher = higher.clone();
            subsets_of_size(rank.formulas(), keep).map(move |s| s.union(&higher))
        })
    }))
}

fn split(rank: &Rank, keep: impl Fn(&Formula) -> bool) -> (Option<Rank>, Option<Rank>) {
    let mut kept = KnowledgeBase::new();
    let mut dropped = KnowledgeBase::new();
    for f in rank.formulas() {
        if keep(f) {
            kept.insert(f.clone());
        } else {
            dropped.insert(f.clone());
        }
    }

    let wrap = |kb: KnowledgeBase| (!kb.is_empty()).then(|| Rank::new(rank.number(), kb));
    (wrap(kept), wrap(dropped))
}

fn relevant_entail<O: SatOracle + ?Sized>(
    oracle: &O,
    params: &ReasonerParams,
    kind: ReasonerKind,
    base_rank: &BaseRank,
    query: &Formula,
) -> Result<EntailmentResult> {
    let start = Instant::now();
    let negated = query_antecedent(query)?.negate();
    let materialised = query.materialise();

    let ranking = base_rank.ranking().sorted_ascending();
    let full = ranking.knowledge_base().materialise();

    let justifications = compute_all_justifications(oracle, &full, &negated)?;
    let relevant_set = relevant_formulas(
        &ranking,
        &justifications,
        kind == ReasonerKind::MinimalRelevant,
    );

    let mut relevant = RankCollection::new();
    let mut irrelevant = RankCollection::new();
    for r in &ranking.except_infinity() {
        let (irr, rel) = split(r, |f| !relevant_set.contains(f));
        relevant.extend(rel);
        irrelevant.extend(irr);
    }
    debug!(
        "{} justifications of {}, {} relevant formulas",
        justifications.len(),
        negated,
        relevant_set.len()
    );

    let builder = EntailmentResult::builder(kind, base_rank, query);

    if !oracle.entails(&full, &negated)? {
        let entailed = oracle.entails(&full, &materialised)?;
        let elapsed = start.elapsed();
        info!(
            "{} closure: {} {} without removing anything ({:?})",
            kind,
            if entailed { "entails" } else { "does not entail" },
            query,
            elapsed
        );
        return Ok(builder
            .remaining(ranking)
            .entailed(entailed)
            .details(ClosureDetails::Relevant {
                relevant_ranking: relevant,
                irrelevant_ranking: irrelevant,
                powerset_ranking: Vec::new(),
                consistent_rank_index: 0,
            })
            .build(elapsed));
    }

    let largest = relevant.iter().map(Rank::len).max().unwrap_or(0);
    params.check_subsets(largest)?;

    let infinity = ranking
        .infinity_rank()
        .map(|r| r.formulas().materialise())
        .unwrap_or_default();
    let background = irrelevant.knowledge_base().materialise().union(&infinity);

    let mut powerset_ranking = Vec::new();
    let mut chosen = None;
    for candidate in candidates(&relevant) {
        powerset_ranking.push(candidate.clone());
        if !oracle.entails(&background.union(&candidate.materialise()), &negated)? {
            chosen = Some(candidate);
            break;
        }
    }
    let chosen_index = powerset_ranking.len().saturating_sub(1);
    // Only the empty candidate is left if every other one refutes the antecedent
    let kept = chosen.unwrap_or_default();

    let mut entailed = oracle.entails(&background.union(&kept.materialise()), &materialised)?;
    let mut consistent_rank_index = if entailed { chosen_index } else { 0 };

    let mut removed = RankCollection::new();
    let mut remaining = RankCollection::new();
    for r in &ranking {
        if r.is_infinity() {
            remaining.push(r.clone());
            continue;
        }
        let (stay, gone) = split(r, |f| !relevant_set.contains(f) || kept.contains(f));
        remaining.extend(stay);
        removed.extend(gone);
    }

    if !entailed {
        if let Some((r, rest)) = infinity_fallback(oracle, &ranking, &materialised)? {
            removed = r;
            remaining = rest;
            entailed = true;
            consistent_rank_index = powerset_ranking.len();
        }
    }

    let elapsed = start.elapsed();
    info!(
        "{} closure: {} {} after trying {} candidates ({:?})",
        kind,
        if entailed { "entails" } else { "does not entail" },
        query,
        powerset_ranking.len(),
        elapsed
    );

    Ok(builder
        .removed(removed)
        .remaining(remaining)
        .entailed(entailed)
        .details(ClosureDetails::Relevant {
            relevant_ranking: relevant,
            irrelevant_ranking: irrelevant,
            powerset_ranking,
            consistent_rank_index,
        })
        .build(elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        closure::tests::{base_rank, entail},
        parse::{parse_formula, parse_knowledge_base},
        rank::RankNumber,
        sat::DpllOracle,
    };

    const BIRDS: &str = "p => b; b ~> f; b ~> w; p ~> !f";
    const CHAIN: &str = "b ~> f; p ~> !f; p => b; s ~> f; s => p";

    fn kb(s: &str) -> KnowledgeBase {
        parse_knowledge_base(s).unwrap()
    }

    struct Relevance<'r> {
        relevant: &'r RankCollection,
        irrelevant: &'r RankCollection,
        powerset: &'r [KnowledgeBase],
        index: usize,
    }

    fn relevance(res: &EntailmentResult) -> Relevance<'_> {
        match res.details() {
            ClosureDetails::Relevant {
                relevant_ranking,
                irrelevant_ranking,
                powerset_ranking,
                consistent_rank_index,
            } => Relevance {
                relevant: relevant_ranking,
                irrelevant: irrelevant_ranking,
                powerset: powerset_ranking,
                index: *consistent_rank_index,
            },
            d => panic!("Unexpected details {:?}", d),
        }
    }

    #[test]
    fn unrefuted_antecedent_skips_the_search() {
        let res = entail(ReasonerKind::BasicRelevant, BIRDS, "b ~> f");
        assert!(res.entailed());
        let r = relevance(&res);
        assert!(r.relevant.is_empty());
        assert!(r.powerset.is_empty());
        assert_eq!(0, r.index);
        assert!(res.removed_ranking().is_empty());
    }

    #[test]
    fn keeps_irrelevant_defaults() {
        let res = entail(ReasonerKind::BasicRelevant, BIRDS, "p ~> w");
        assert!(res.entailed());

        let r = relevance(&res);
        assert_eq!(kb("b ~> f; p ~> !f"), r.relevant.knowledge_base());
        assert_eq!(kb("b ~> w"), r.irrelevant.knowledge_base());
        assert_eq!(vec![kb("b ~> f; p ~> !f"), kb("p ~> !f")], r.powerset);
        assert_eq!(1, r.index);
        assert_eq!(kb("b ~> f"), res.removed_ranking().knowledge_base());
    }

    #[test]
    fn minimal_narrows_relevance() {
        let basic = entail(ReasonerKind::BasicRelevant, CHAIN, "s ~> f");
        let minimal = entail(ReasonerKind::MinimalRelevant, CHAIN, "s ~> f");
        assert!(basic.entailed());
        assert!(minimal.entailed());

        assert_eq!(kb("b ~> f; p ~> !f; s ~> f"), relevance(&basic).relevant.knowledge_base());
        assert_eq!(kb("b ~> f; p ~> !f"), relevance(&minimal).relevant.knowledge_base());
        assert_eq!(kb("s ~> f"), relevance(&minimal).irrelevant.knowledge_base());
        assert_eq!(2, relevance(&basic).index);
        assert_eq!(2, relevance(&minimal).index);
    }

    #[test]
    fn ranks_keep_their_numbers() {
        let res = entail(ReasonerKind::MinimalRelevant, CHAIN, "s ~> f");
        let removed: Vec<_> = res.removed_ranking().iter().map(Rank::number).collect();
        assert_eq!(vec![RankNumber::Finite(1), RankNumber::Finite(0)], removed);
        assert!(res
            .remaining_ranking()
            .get(RankNumber::Finite(2))
            .is_some());
    }

    #[test]
    fn candidate_order() {
        let rc: RankCollection = [
            Rank::finite(0, kb("a; b")),
            Rank::finite(1, kb("c")),
        ]
        .into_iter()
        .collect();
        let all: Vec<_> = candidates(&rc).collect();
        assert_eq!(
            vec![
                kb("a; b; c"),
                kb("a; c"),
                kb("b; c"),
                kb("c"),
                kb(""),
            ],
            all
        );
    }

    #[test]
    fn subset_limit() {
        let params = ReasonerParams {
            subset_limit: 0,
            ..Default::default()
        };
        let res = BasicRelevantClosure::new(&DpllOracle::new(), &params)
            .entail(&base_rank(BIRDS), &parse_formula("p ~> w").unwrap());
        assert!(matches!(res, Err(crate::Error::SubsetBlowup { .. })));
    }
}
