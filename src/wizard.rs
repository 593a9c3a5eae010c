//! Wizard step state
//!
//! `WizardState` is a small `Copy` value holding the current step index.
//! Navigation returns a new value instead of mutating shared state, so
//! several forms can coexist and every transition is testable without a
//! screen.
//!
//! # Bounds
//!
//! Under [`NavigationBounds::Unbounded`] the index moves freely: stepping
//! back from the first section goes below zero and stepping forward from the
//! last section leaves the section list, in which case no section is shown.
//! [`NavigationBounds::Clamped`] keeps the index within `0..total`.
//!
//! ```
//! use stepform::types::NavigationBounds;
//! use stepform::wizard::WizardState;
//!
//! let state = WizardState::new(5, NavigationBounds::Clamped);
//! let state = state.previous();
//! assert_eq!(state.current(), 0);
//!
//! let state = state.next().next();
//! assert_eq!(state.progress().percent, 50.0);
//! ```

use crate::effect::Effect;
use crate::types::NavigationBounds;

/// Derived progress display
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// One marker per section; true when its index is <= the current step
    pub completed: Vec<bool>,
    /// `current / (total - 1) * 100`, not clamped
    pub percent: f64,
}

impl Progress {
    pub fn of(current: i32, total: usize) -> Self {
        let completed = (0..total).map(|i| i as i64 <= current as i64).collect();
        let percent = if total <= 1 {
            if current >= 0 { 100.0 } else { 0.0 }
        } else {
            current as f64 / (total - 1) as f64 * 100.0
        };
        Self { completed, percent }
    }

    /// Number of completed markers
    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|c| **c).count()
    }

    /// Fill ratio for a gauge widget, clamped to `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        (self.percent / 100.0).clamp(0.0, 1.0)
    }
}

/// Current step of a form with `total` sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    current: i32,
    total: usize,
    bounds: NavigationBounds,
}

impl WizardState {
    /// Start at the first section
    pub fn new(total: usize, bounds: NavigationBounds) -> Self {
        Self {
            current: 0,
            total,
            bounds,
        }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn bounds(&self) -> NavigationBounds {
        self.bounds
    }

    /// Index of the visible section, if the current step has one
    pub fn active_section(&self) -> Option<usize> {
        usize::try_from(self.current)
            .ok()
            .filter(|i| *i < self.total)
    }

    fn last_index(&self) -> i32 {
        (self.total as i32 - 1).max(0)
    }

    /// Step forward. Validation is the caller's concern.
    pub fn next(self) -> Self {
        let current = match self.bounds {
            NavigationBounds::Unbounded => self.current.saturating_add(1),
            NavigationBounds::Clamped => (self.current + 1).min(self.last_index()),
        };
        Self { current, ..self }
    }

    /// Step back
    pub fn previous(self) -> Self {
        let current = match self.bounds {
            NavigationBounds::Unbounded => self.current.saturating_sub(1),
            NavigationBounds::Clamped => (self.current - 1).max(0),
        };
        Self { current, ..self }
    }

    /// Go straight to a step
    pub fn jump(self, index: i32) -> Self {
        let current = match self.bounds {
            NavigationBounds::Unbounded => index,
            NavigationBounds::Clamped => index.clamp(0, self.last_index()),
        };
        Self { current, ..self }
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.current, self.total)
    }

    /// Effects that re-render section visibility and progress
    pub fn render(&self) -> Vec<Effect> {
        vec![
            Effect::ShowSection {
                index: self.active_section(),
            },
            Effect::ScrollToTop,
            Effect::Progress(self.progress()),
        ]
    }
}
