//! Configuration for a compare run.
//!
//! `CompareOptions` centralizes every behavioral knob so that no component
//! consults global state; the record is passed by reference through the whole
//! call chain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::ViewId;

/// Inclusive line range of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

/// Per-view selections for a restricted compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPair {
    pub main: LineRange,
    pub sub: LineRange,
}

impl SelectionPair {
    pub fn for_view(&self, view: ViewId) -> LineRange {
        match view {
            ViewId::Main => self.main,
            ViewId::Sub => self.sub,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Skip the diff entirely and only mark lines unique to each side.
    pub find_unique_mode: bool,
    /// Reinterpret matching removed/added regions as moves.
    pub detect_moves: bool,
    /// Case-fold text before hashing and tokenizing.
    pub ignore_case: bool,
    /// Drop space and tab bytes from hashing and token streams.
    pub ignore_spaces: bool,
    /// Drop lines that hash empty from the line stream.
    pub ignore_empty_lines: bool,
    /// Refine word-level changes to character granularity.
    pub char_precision: bool,
    /// Similarity gate, in percent, used throughout block comparison.
    pub match_percent_threshold: u32,
    /// When set, each side is restricted to its selection.
    pub selections: Option<SelectionPair>,
    /// Which view holds the "old" text; governs add/remove mask assignment.
    pub old_file_view: ViewId,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            find_unique_mode: false,
            detect_moves: false,
            ignore_case: false,
            ignore_spaces: false,
            ignore_empty_lines: false,
            char_precision: false,
            match_percent_threshold: 0,
            selections: None,
            old_file_view: ViewId::Main,
        }
    }
}

impl CompareOptions {
    pub fn selection_compare(&self) -> bool {
        self.selections.is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_percent_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange {
                value: self.match_percent_threshold,
            });
        }

        if let Some(selections) = &self.selections {
            for view in [ViewId::Main, ViewId::Sub] {
                let range = selections.for_view(view);
                if range.first > range.last {
                    return Err(ConfigError::InvalidSelection {
                        view,
                        first: range.first,
                        last: range.last,
                    });
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("match_percent_threshold must be within 0..=100, got {value}")]
    ThresholdOutOfRange { value: u32 },
    #[error("selection for {view:?} is inverted ({first} > {last})")]
    InvalidSelection {
        view: ViewId,
        first: usize,
        last: usize,
    },
}
