pub mod hitting_set;

use std::time::Instant;

use log::{debug, info};

use crate::{
    closure::EntailmentResult,
    kb::KnowledgeBase,
    logic::Formula,
    sat::{OracleResult, SatOracle},
};

pub use hitting_set::{HittingSetNode, HittingSetTree};

/// One irreducible subset of `kb` entailing `query`. The result is empty
/// when `kb` does not entail `query`, and also when `query` is valid, since
/// the empty set is then its only justification.
///
/// The candidate is first grown outwards from the atoms of the query, then
/// shrunk by bisection. Removing any formula of the result breaks the
/// entailment, but a smaller justification may still exist elsewhere.
pub fn compute_single_justification<O: SatOracle + ?Sized>(
    oracle: &O,
    kb: &KnowledgeBase,
    query: &Formula,
) -> OracleResult<KnowledgeBase> {
    if kb.contains(query) {
        return Ok(std::iter::once(query.clone()).collect());
    }
    if !oracle.entails(kb, query)? {
        return Ok(KnowledgeBase::new());
    }

    let sufficient = expand(oracle, kb, query)?;
    let justification = contract(oracle, &KnowledgeBase::new(), &sufficient, query)?;
    debug!(
        "Justification of {} shrunk from {} to {} formulas",
        query,
        sufficient.len(),
        justification.len()
    );
    Ok(justification)
}

/// Grows a subset of `kb` that entails `query` by following shared atoms,
/// starting from the atoms of the query. Falls back to `kb` itself if the
/// connected part alone does not suffice, e.g. when `kb` is inconsistent on
/// unrelated atoms.
fn expand<O: SatOracle + ?Sized>(
    oracle: &O,
    kb: &KnowledgeBase,
    query: &Formula,
) -> OracleResult<KnowledgeBase> {
    let mut candidate = KnowledgeBase::new();
    let mut signature = query.atoms();

    loop {
        let before = candidate.len();
        for f in kb {
            if !candidate.contains(f) && f.atoms().iter().any(|a| signature.contains(a)) {
                candidate.insert(f.clone());
            }
        }

        if oracle.entails(&candidate, query)? {
            return Ok(candidate);
        }
        if candidate.len() == before {
            return Ok(kb.clone());
        }
        signature = candidate.atoms();
    }
}

/// Divide and conquer minimisation of `w` relative to `support`.
///
/// Expects `support ∪ w` to entail `query` while `support` alone does not.
fn contract<O: SatOracle + ?Sized>(
    oracle: &O,
    support: &KnowledgeBase,
    w: &KnowledgeBase,
    query: &Formula,
) -> OracleResult<KnowledgeBase> {
    if w.len() <= 1 {
        return Ok(w.clone());
    }

    let (left, right) = w.halves();

    if oracle.entails(&support.union(&left), query)? {
        return contract(oracle, support, &left, query);
    }
    if oracle.entails(&support.union(&right), query)? {
        return contract(oracle, support, &right, query);
    }

    let left = contract(oracle, &support.union(&right), &left, query)?;
    let right = contract(oracle, &support.union(&left), &right, query)?;
    Ok(left.union(&right))
}

/// Every justification of `query` in `kb`, in the order the hitting-set
/// tree discovers them.
pub fn compute_all_justifications<O: SatOracle + ?Sized>(
    oracle: &O,
    kb: &KnowledgeBase,
    query: &Formula,
) -> OracleResult<Vec<KnowledgeBase>> {
    Ok(HittingSetTree::build(oracle, kb, query)?.justifications())
}

/// Second phase of an entailment check: attaches the justifications of the
/// materialised query with respect to the knowledge base the result was
/// decided on. Results that are not entailed get an empty list.
pub fn explain<O: SatOracle + ?Sized>(
    oracle: &O,
    result: EntailmentResult,
) -> OracleResult<EntailmentResult> {
    let start = Instant::now();

    let justification = if result.entailed() {
        compute_all_justifications(
            oracle,
            result.entailment_knowledge_base(),
            &result.query().materialise(),
        )?
    } else {
        Vec::new()
    };

    let elapsed = start.elapsed();
    info!(
        "Found {} justifications for {} in {:?}",
        justification.len(),
        result.query(),
        elapsed
    );
    Ok(result.attach_justification(justification, elapsed))
}
