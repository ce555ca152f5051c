use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::{
    kb::KnowledgeBase,
    logic::Formula,
    sat::{OracleResult, SatOracle},
};

use super::compute_single_justification;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HittingSetNode {
    parent: Option<usize>,
    knowledge_base: KnowledgeBase,
    justification: KnowledgeBase,
    /// Set if another node already covers the same removed formulas.
    closed: bool,
    #[serde(skip)]
    children: IndexMap<Formula, usize>,
}

impl HittingSetNode {
    fn new(
        parent: Option<usize>,
        knowledge_base: KnowledgeBase,
        justification: KnowledgeBase,
        closed: bool,
    ) -> Self {
        Self {
            parent,
            knowledge_base,
            justification,
            closed,
            children: IndexMap::new(),
        }
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn justification(&self) -> &KnowledgeBase {
        &self.justification
    }

    pub fn children(&self) -> impl Iterator<Item = (&Formula, usize)> {
        self.children.iter().map(|(f, c)| (f, *c))
    }

    pub fn child(&self, removed: &Formula) -> Option<usize> {
        self.children.get(removed).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Reiter-style hitting-set tree, stored as an arena of nodes.
///
/// Each node pairs a knowledge base with one of its justifications; every
/// child drops one formula of that justification. Nodes without a
/// justification are leaves. Two standard prunings apply: a justification
/// already found that survives in a child's knowledge base is reused
/// without asking the oracle, and a child whose set of removed formulas was
/// reached before is closed instead of expanded again.
#[derive(Debug, Clone, Serialize)]
pub struct HittingSetTree {
    nodes: Vec<HittingSetNode>,
}

impl HittingSetTree {
    pub fn build<O: SatOracle + ?Sized>(
        oracle: &O,
        kb: &KnowledgeBase,
        query: &Formula,
    ) -> OracleResult<Self> {
        let root = compute_single_justification(oracle, kb, query)?;
        let mut found: Vec<KnowledgeBase> = Vec::new();
        let mut queue = VecDeque::new();

        if !root.is_empty() {
            found.push(root.clone());
            queue.push_back(0);
        }

        let mut tree = Self {
            nodes: vec![HittingSetNode::new(None, kb.clone(), root, false)],
        };
        let mut paths: HashSet<Vec<Formula>> = HashSet::new();
        let mut oracle_calls = 0;

        while let Some(idx) = queue.pop_front() {
            let node_kb = tree.nodes[idx].knowledge_base.clone();
            let justification = tree.nodes[idx].justification.clone();

            for f in justification {
                let child_kb = node_kb.without(&f);
                let path = kb.difference(&child_kb).canonical();

                let child = if !paths.insert(path) {
                    HittingSetNode::new(Some(idx), child_kb, KnowledgeBase::new(), true)
                } else {
                    let j = match found.iter().find(|j| j.is_subset(&child_kb)) {
                        Some(j) => j.clone(),
                        None => {
                            oracle_calls += 1;
                            compute_single_justification(oracle, &child_kb, query)?
                        }
                    };
                    HittingSetNode::new(Some(idx), child_kb, j, false)
                };

                let child_idx = tree.nodes.len();
                if !child.closed && !child.justification.is_empty() {
                    if !found.contains(&child.justification) {
                        found.push(child.justification.clone());
                    }
                    queue.push_back(child_idx);
                }
                tree.nodes.push(child);
                tree.nodes[idx].children.insert(f, child_idx);
            }
        }

        debug!(
            "Hitting-set tree for {}: {} nodes, {} justifications, {} recomputed",
            query,
            tree.nodes.len(),
            found.len(),
            oracle_calls
        );

        Ok(tree)
    }

    pub fn root(&self) -> &HittingSetNode {
        &self.nodes[0]
    }

    pub fn node(&self, idx: usize) -> Option<&HittingSetNode> {
        self.nodes.get(idx)
    }

    pub fn nodes(&self) -> &[HittingSetNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn justifications(&self) -> Vec<KnowledgeBase> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|n| &n.justification)
            .filter(|j| !j.is_empty() && seen.insert(j.canonical()))
            .cloned()
            .collect()
    }
}
