use serde::Deserialize;

use crate::consts::SUBSET_BLOWUP_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReasonerParams {
    /// Fan the exceptionality checks of a stratification pass out over
    /// the rayon thread pool.
    pub parallel: bool,
    pub subset_limit: u32,
    pub max_decisions: Option<u64>,
}

impl Default for ReasonerParams {
    fn default() -> Self {
        Self {
            parallel: true,
            subset_limit: SUBSET_BLOWUP_LIMIT,
            max_decisions: None,
        }
    }
}

impl ReasonerParams {
    pub(crate) fn check_subsets(&self, size: usize) -> crate::Result<()> {
        if size > self.subset_limit as usize {
            Err(crate::Error::SubsetBlowup {
                size,
                limit: self.subset_limit,
            })
        } else {
            Ok(())
        }
    }
}
