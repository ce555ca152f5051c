use thiserror::Error;

use crate::{logic::Formula, parse::ParseErr, rank::RankErr, sat::OracleError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Query '{0}' is not a defeasible implication")]
    InvalidQuery(Formula),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("{0}")]
    Parse(#[from] ParseErr),

    #[error("{0}")]
    Rank(RankErr),

    #[error("Enumerating subsets of {size} formulas exceeds the limit of {limit}")]
    SubsetBlowup { size: usize, limit: u32 },
}

impl From<RankErr> for Error {
    fn from(e: RankErr) -> Self {
        Self::Rank(e)
    }
}
