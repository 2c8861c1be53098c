//! Trailing growth windows and the ratios computed over them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trailing lag measured in quarterly report periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowthWindow(pub usize);

impl GrowthWindow {
    pub const SIX_MONTHS: Self = Self(2);
    pub const ONE_YEAR: Self = Self(4);
    pub const TWO_YEARS: Self = Self(8);
    pub const THREE_YEARS: Self = Self(12);

    /// Number of periods to look back.
    pub fn lag(self) -> usize {
        self.0
    }
}

impl fmt::Display for GrowthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}q", self.0)
    }
}

/// Growth ratios for one row, one entry per configured window.
///
/// Windows keep the order they were configured in. A `None` value means the
/// ratio is undefined for that row (not enough history, or a zero/undefined
/// base value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRatios {
    entries: Vec<(GrowthWindow, Option<f64>)>,
}

impl GrowthRatios {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, window: GrowthWindow, value: Option<f64>) {
        match self.entries.iter_mut().find(|(w, _)| *w == window) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((window, value)),
        }
    }

    /// Ratio for `window`; `None` if undefined or never computed.
    pub fn get(&self, window: GrowthWindow) -> Option<f64> {
        self.entries
            .iter()
            .find(|(w, _)| *w == window)
            .and_then(|(_, v)| *v)
    }

    pub fn windows(&self) -> impl Iterator<Item = GrowthWindow> + '_ {
        self.entries.iter().map(|(w, _)| *w)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
