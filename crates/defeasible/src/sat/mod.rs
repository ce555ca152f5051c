pub mod dpll;

use log::trace;
use thiserror::Error;

use crate::{kb::KnowledgeBase, logic::Formula};

pub use dpll::DpllOracle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("Satisfiability check gave up after {0} decisions")]
    Undecided(u64),
}

pub type OracleResult<T> = Result<T, OracleError>;

pub trait SatOracle: Send + Sync {
    fn consistent(&self, formulas: &KnowledgeBase) -> OracleResult<bool>;

    fn entails(&self, formulas: &KnowledgeBase, query: &Formula) -> OracleResult<bool> {
        let res = !self.consistent(&formulas.with(query.negate()))?;
        trace!("{} |= {}: {}", formulas, query, res);
        Ok(res)
    }
}

impl<O: SatOracle + ?Sized> SatOracle for &O {
    fn consistent(&self, formulas: &KnowledgeBase) -> OracleResult<bool> {
        (**self).consistent(formulas)
    }

    fn entails(&self, formulas: &KnowledgeBase, query: &Formula) -> OracleResult<bool> {
        (**self).entails(formulas, query)
    }
}
