//! Result surface of a compare run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostError;

/// Outcome of [`compare_views`](crate::compare_views).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareResult {
    Match,
    Mismatch,
    Cancelled,
    Error,
}

/// One side of an alignment anchor: the buffer line the UI should pin and the
/// block-diff mask active there (0 for a matched anchor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentViewData {
    pub line: usize,
    pub diff_mask: u32,
}

/// A visual anchor row: corresponding lines on the two views that should
/// render level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentPair {
    pub main: AlignmentViewData,
    pub sub: AlignmentViewData,
}

pub type AlignmentInfo = Vec<AlignmentPair>;

/// Internal failure channel; only [`compare_views`](crate::compare_views)
/// converts it to a [`CompareResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("compare cancelled")]
    Cancelled,
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("internal invariant violated: {0}")]
    Logic(&'static str),
}
