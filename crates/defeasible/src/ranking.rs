use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    kb::KnowledgeBase,
    logic::Formula,
    params::ReasonerParams,
    rank::{Rank, RankCollection, RankNumber},
    sat::{OracleResult, SatOracle},
    Result,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRank {
    knowledge_base: KnowledgeBase,
    /// The defeasible formulas still unranked at the start of each pass.
    sequence: Vec<Rank>,
    ranking: RankCollection,
    time_taken: Duration,
}

impl BaseRank {
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn sequence(&self) -> &[Rank] {
        &self.sequence
    }

    pub fn ranking(&self) -> &RankCollection {
        &self.ranking
    }

    pub fn time_taken(&self) -> Duration {
        self.time_taken
    }
}

/// Computes the base ranking of `kb`.
///
/// Each pass moves the defeasible formulas whose antecedent is refuted by
/// the materialisation of the remaining defeasible formulas (together with
/// the classical ones) up to the next pass. Everything else lands in the
/// rank of the current pass. Once a pass leaves the remaining set
/// unchanged, that set joins the classical formulas in the infinite rank.
pub fn stratify<O: SatOracle + ?Sized>(
    kb: &KnowledgeBase,
    oracle: &O,
    params: &ReasonerParams,
) -> Result<BaseRank> {
    let start = Instant::now();

    let classical = kb.classical();
    let mut current = kb.defeasible();
    let mut ranking = RankCollection::new();
    let mut sequence = Vec::new();
    let mut i = 0;

    loop {
        let previous = std::mem::take(&mut current);
        let background = previous.materialise().union(&classical);
        let exceptional = exceptional_antecedents(
            oracle,
            &background,
            &previous.antecedents(),
            params.parallel,
        )?;

        let mut rank = KnowledgeBase::new();
        for f in previous.iter() {
            match f.antecedent() {
                Some(a) if exceptional.contains(a) => current.insert(f.clone()),
                _ => rank.insert(f.clone()),
            };
        }

        debug!(
            "Pass {}: {} ranked, {} exceptional",
            i,
            rank.len(),
            current.len()
        );

        if !rank.is_empty() {
            ranking.try_push(Rank::finite(i, rank))?;
        }

        let fixpoint = previous == current;
        let number = if fixpoint {
            RankNumber::Infinity
        } else {
            RankNumber::Finite(i)
        };
        sequence.push(Rank::new(number, previous));

        i += 1;
        if fixpoint {
            break;
        }
    }

    ranking.try_push(Rank::infinity(classical.union(&current)))?;

    let time_taken = start.elapsed();
    info!(
        "Ranked {} formulas into {} ranks in {:?}",
        kb.len(),
        ranking.len(),
        time_taken
    );

    Ok(BaseRank {
        knowledge_base: kb.clone(),
        sequence,
        ranking,
        time_taken,
    })
}

/// The antecedents whose negation follows from `background`. Each check is
/// independent, so they may run in parallel; the result keeps the order of
/// `antecedents` either way.
fn exceptional_antecedents<O: SatOracle + ?Sized>(
    oracle: &O,
    background: &KnowledgeBase,
    antecedents: &KnowledgeBase,
    parallel: bool,
) -> Result<KnowledgeBase> {
    let check = |a: &Formula| -> OracleResult<Option<Formula>> {
        Ok(oracle.entails(background, &a.negate())?.then(|| a.clone()))
    };

    let found: Vec<Option<Formula>> = if parallel {
        antecedents
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(check)
            .collect::<OracleResult<_>>()?
    } else {
        antecedents.iter().map(check).collect::<OracleResult<_>>()?
    };

    Ok(found.into_iter().flatten().collect())
}
