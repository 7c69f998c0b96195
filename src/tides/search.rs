//! Expanding-radius station search state

/// Bounded search over radii `min, 2*min, ..., multiplier*min`.
///
/// The search holds the current radius, how many discovery attempts were
/// made, and the candidates once a non-empty result arrives. Call
/// [`StationSearch::next_radius`] before each discovery query and feed the
/// result back through [`StationSearch::record`].
#[derive(Debug, Clone)]
pub struct StationSearch<T> {
    min_radius: u32,
    max_radius: u32,
    radius: u32,
    attempts: u32,
    max_candidates: usize,
    candidates: Vec<T>,
}

impl<T> StationSearch<T> {
    /// `min_radius` is both the first radius and the increment
    #[must_use]
    pub fn new(min_radius: u32, multiplier: u32, max_candidates: usize) -> Self {
        Self {
            min_radius,
            max_radius: min_radius.saturating_mul(multiplier),
            radius: 0,
            attempts: 0,
            max_candidates,
            candidates: Vec::new(),
        }
    }

    /// Advance to the next radius, or `None` once the budget is spent or
    /// candidates were found
    pub fn next_radius(&mut self) -> Option<u32> {
        if self.is_resolved() || self.min_radius == 0 {
            return None;
        }
        let next = self.radius.checked_add(self.min_radius)?;
        if next > self.max_radius {
            return None;
        }
        self.radius = next;
        self.attempts += 1;
        Some(next)
    }

    /// Record the stations returned for the current radius, nearest first.
    /// Returns `true` when the search is resolved.
    pub fn record(&mut self, stations: Vec<T>) -> bool {
        if !stations.is_empty() {
            self.candidates = stations.into_iter().take(self.max_candidates).collect();
        }
        self.is_resolved()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.candidates.is_empty()
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn max_radius(&self) -> u32 {
        self.max_radius
    }

    #[must_use]
    pub fn into_candidates(self) -> Vec<T> {
        self.candidates
    }
}
