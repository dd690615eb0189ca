/// Aggregated view of answering progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub answered: usize,
    pub total: usize,
}
