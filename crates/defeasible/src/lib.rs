pub mod clause;
pub mod closure;
mod consts;
pub mod error;
pub mod explain;
pub mod kb;
pub mod logic;
pub mod params;
pub mod parse;
pub mod rank;
pub mod ranking;
pub mod sat;


pub use consts::SUBSET_BLOWUP_LIMIT;
pub use error::{Error, Result};

pub use closure::{EntailmentResult, Reasoner, ReasonerKind};
pub use explain::{compute_all_justifications, compute_single_justification, explain};
pub use kb::KnowledgeBase;
pub use logic::Formula;
pub use params::ReasonerParams;
pub use rank::{Rank, RankCollection, RankNumber};
pub use ranking::{stratify, BaseRank};
pub use sat::{DpllOracle, SatOracle};
