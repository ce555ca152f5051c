use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    kb::KnowledgeBase,
    logic::Formula,
    params::ReasonerParams,
    rank::{Rank, RankCollection},
    ranking::BaseRank,
    sat::{OracleResult, SatOracle},
    Error, Result,
};

pub mod lexicographic;
pub mod rational;
pub mod relevant;
mod subsets;

pub use lexicographic::LexicographicClosure;
pub use rational::RationalClosure;
pub use relevant::{BasicRelevantClosure, MinimalRelevantClosure};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum ReasonerKind {
    Rational,
    Lexicographic,
    BasicRelevant,
    MinimalRelevant,
}

impl ReasonerKind {
    pub const ALL: [ReasonerKind; 4] = [
        ReasonerKind::Rational,
        ReasonerKind::Lexicographic,
        ReasonerKind::BasicRelevant,
        ReasonerKind::MinimalRelevant,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            ReasonerKind::Rational => "rational",
            ReasonerKind::Lexicographic => "lexicographic",
            ReasonerKind::BasicRelevant => "basic-relevant",
            ReasonerKind::MinimalRelevant => "minimal-relevant",
        }
    }

    pub fn entail<O: SatOracle + ?Sized>(
        self,
        oracle: &O,
        params: &ReasonerParams,
        base_rank: &BaseRank,
        query: &Formula,
    ) -> Result<EntailmentResult> {
        match self {
            ReasonerKind::Rational => RationalClosure::new(oracle).entail(base_rank, query),
            ReasonerKind::Lexicographic => {
                LexicographicClosure::new(oracle, params).entail(base_rank, query)
            }
            ReasonerKind::BasicRelevant => {
                BasicRelevantClosure::new(oracle, params).entail(base_rank, query)
            }
            ReasonerKind::MinimalRelevant => {
                MinimalRelevantClosure::new(oracle, params).entail(base_rank, query)
            }
        }
    }
}

impl fmt::Display for ReasonerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl<'a> TryFrom<&'a str> for ReasonerKind {
    type Error = &'static str;

    fn try_from(s: &'a str) -> std::result::Result<Self, Self::Error> {
        match s {
            "rational" => Ok(ReasonerKind::Rational),
            "lexicographic" => Ok(ReasonerKind::Lexicographic),
            "basic-relevant" => Ok(ReasonerKind::BasicRelevant),
            "minimal-relevant" => Ok(ReasonerKind::MinimalRelevant),
            _ => Err("Unknown reasoner"),
        }
    }
}

impl TryFrom<String> for ReasonerKind {
    type Error = &'static str;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        ReasonerKind::try_from(s.as_str())
    }
}

impl Serialize for ReasonerKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_str())
    }
}

pub trait Reasoner {
    fn kind(&self) -> ReasonerKind;

    /// Decides whether `query`, which has to be a defeasible implication,
    /// follows from the ranked knowledge base.
    fn entail(&self, base_rank: &BaseRank, query: &Formula) -> Result<EntailmentResult>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClosureDetails {
    Rational,
    #[serde(rename_all = "camelCase")]
    Lexicographic {
        /// The original form of every rank that was cut down to a subset.
        weakened_ranking: RankCollection,
        /// Every subset tried while looking for a rank to keep.
        mini_base_ranking: Vec<Rank>,
    },
    #[serde(rename_all = "camelCase")]
    Relevant {
        relevant_ranking: RankCollection,
        irrelevant_ranking: RankCollection,
        /// Candidate sets of relevant formulas in the order they were tried.
        powerset_ranking: Vec<KnowledgeBase>,
        consistent_rank_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntailmentResult {
    reasoner: ReasonerKind,
    knowledge_base: KnowledgeBase,
    query_formula: Formula,
    base_ranking: RankCollection,
    removed_ranking: RankCollection,
    remaining_ranking: RankCollection,
    entailment_knowledge_base: KnowledgeBase,
    entailed: bool,
    time_taken: Duration,
    justification: Vec<KnowledgeBase>,
    justification_time: Duration,
    details: ClosureDetails,
}

impl EntailmentResult {
    pub fn builder(
        reasoner: ReasonerKind,
        base_rank: &BaseRank,
        query: &Formula,
    ) -> EntailmentResultBuilder {
        EntailmentResultBuilder {
            reasoner,
            knowledge_base: base_rank.knowledge_base().clone(),
            query: query.clone(),
            base_ranking: base_rank.ranking().clone(),
            removed: RankCollection::new(),
            remaining: RankCollection::new(),
            entailed: false,
            details: ClosureDetails::Rational,
        }
    }

    pub fn attach_justification(
        self,
        justification: Vec<KnowledgeBase>,
        justification_time: Duration,
    ) -> Self {
        Self {
            justification,
            justification_time,
            ..self
        }
    }

    pub fn reasoner(&self) -> ReasonerKind {
        self.reasoner
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn query(&self) -> &Formula {
        &self.query_formula
    }

    pub fn base_ranking(&self) -> &RankCollection {
        &self.base_ranking
    }

    pub fn removed_ranking(&self) -> &RankCollection {
        &self.removed_ranking
    }

    pub fn remaining_ranking(&self) -> &RankCollection {
        &self.remaining_ranking
    }

    /// Materialised formulas the query was entailed from; empty if it was not.
    pub fn entailment_knowledge_base(&self) -> &KnowledgeBase {
        &self.entailment_knowledge_base
    }

    pub fn entailed(&self) -> bool {
        self.entailed
    }

    pub fn time_taken(&self) -> Duration {
        self.time_taken
    }

    pub fn justification(&self) -> &[KnowledgeBase] {
        &self.justification
    }

    pub fn justification_time(&self) -> Duration {
        self.justification_time
    }

    pub fn details(&self) -> &ClosureDetails {
        &self.details
    }
}

pub struct EntailmentResultBuilder {
    reasoner: ReasonerKind,
    knowledge_base: KnowledgeBase,
    query: Formula,
    base_ranking: RankCollection,
    removed: RankCollection,
    remaining: RankCollection,
    entailed: bool,
    details: ClosureDetails,
}

impl EntailmentResultBuilder {
    pub fn removed(mut self, removed: RankCollection) -> Self {
        self.removed = removed;
        self
    }

    pub fn remaining(mut self, remaining: RankCollection) -> Self {
        self.remaining = remaining;
        self
    }

    pub fn entailed(mut self, entailed: bool) -> Self {
        self.entailed = entailed;
        self
    }

    pub fn details(mut self, details: ClosureDetails) -> Self {
        self.details = details;
        self
    }

    pub fn build(self, time_taken: Duration) -> EntailmentResult {
        let entailment_knowledge_base = if self.entailed {
            self.remaining.knowledge_base().materialise()
        } else {
            KnowledgeBase::new()
        };

        EntailmentResult {
            reasoner: self.reasoner,
            knowledge_base: self.knowledge_base,
            query_formula: self.query,
            base_ranking: self.base_ranking,
            removed_ranking: self.removed.sorted_descending(),
            remaining_ranking: self.remaining.sorted_descending(),
            entailment_knowledge_base,
            entailed: self.entailed,
            time_taken,
            justification: Vec::new(),
            justification_time: Duration::ZERO,
            details: self.details,
        }
    }
}

pub(crate) fn query_antecedent(query: &Formula) -> Result<&Formula> {
    match query {
        Formula::DImpl(a, _) => Ok(a),
        _ => Err(Error::InvalidQuery(query.clone())),
    }
}

pub(crate) fn materialise_ranks(ranks: &[Rank]) -> KnowledgeBase {
    ranks
        .iter()
        .flat_map(|r| r.formulas().iter().map(Formula::materialise))
        .collect()
}

/// If the infinite rank alone entails the query, the closure answers yes
/// with only that rank remaining. Returns the new removed and remaining
/// rankings in that case.
pub(crate) fn infinity_fallback<O: SatOracle + ?Sized>(
    oracle: &O,
    ranking: &RankCollection,
    materialised_query: &Formula,
) -> OracleResult<Option<(RankCollection, RankCollection)>> {
    let infinity = match ranking.infinity_rank() {
        Some(r) => r,
        None => return Ok(None),
    };

    if !oracle.entails(&infinity.formulas().materialise(), materialised_query)? {
        return Ok(None);
    }

    let remaining = std::iter::once(infinity.clone()).collect();
    Ok(Some((ranking.except_infinity(), remaining)))
}
