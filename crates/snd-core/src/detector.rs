//! Change detection
//!
//! Pure decisions about whether a freshly observed value deserves a new
//! history record. Persistence is the engine's job.

use crate::rank;

/// Name rule: record whenever the observed name differs from the last one
///
/// Comparison is exact; names differing only by case are different names.
/// With no prior record the first observation is always recorded.
pub fn name_changed(current: &str, last: Option<&str>) -> bool {
    match last {
        Some(last) => current != last,
        None => true,
    }
}

/// Rank rule: record only strict improvements over the last recorded peak
///
/// Ties and regressions are never recorded, so the rank history is a
/// monotonic peak ladder. With no prior record the first observation is
/// treated as an improvement over an implicit worst baseline.
pub fn rank_improved(current: &str, last: Option<&str>) -> bool {
    match last {
        Some(last) => rank::is_higher(current, last),
        None => true,
    }
}

/// Which attributes of an entity changed in one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    pub name: bool,
    pub rank: bool,
}

impl Changes {
    /// Evaluate both rules for one observation
    pub fn detect(
        current_name: &str,
        last_name: Option<&str>,
        current_rank: &str,
        last_rank: Option<&str>,
    ) -> Self {
        Self {
            name: name_changed(current_name, last_name),
            rank: rank_improved(current_rank, last_rank),
        }
    }

    /// Whether anything needs to be written
    pub fn any(&self) -> bool {
        self.name || self.rank
    }
}
