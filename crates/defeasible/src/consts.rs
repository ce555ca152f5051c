/// Largest number of formulas whose subsets the lexicographic and relevant
/// closures are allowed to enumerate.
pub const SUBSET_BLOWUP_LIMIT: u32 = 20;
