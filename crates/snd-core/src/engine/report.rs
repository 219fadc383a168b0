//! Outcomes of engine batches

use crate::config::Region;
use crate::traits::EntityHandle;

/// What happened to one entity during an update cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// A new name record was appended
    NameUpdated,
    /// A new rank peak was appended
    RankUpdated,
    /// Both a name and a rank record were appended
    BothUpdated,
    /// Nothing was appended
    NoChange,
    /// The entity could not be processed
    Failed(String),
}

impl EntityOutcome {
    pub(crate) fn from_flags(name: bool, rank: bool) -> Self {
        match (name, rank) {
            (true, true) => EntityOutcome::BothUpdated,
            (true, false) => EntityOutcome::NameUpdated,
            (false, true) => EntityOutcome::RankUpdated,
            (false, false) => EntityOutcome::NoChange,
        }
    }

    /// Whether a name record was appended
    pub fn name_updated(&self) -> bool {
        matches!(self, EntityOutcome::NameUpdated | EntityOutcome::BothUpdated)
    }

    /// Whether a rank record was appended
    pub fn rank_updated(&self) -> bool {
        matches!(self, EntityOutcome::RankUpdated | EntityOutcome::BothUpdated)
    }

    /// Whether processing failed
    pub fn is_failed(&self) -> bool {
        matches!(self, EntityOutcome::Failed(_))
    }
}

/// Result of one update cycle
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Region the cycle ran against
    pub region: Region,
    /// Per-entity outcomes keyed by external id, in processing order
    pub entries: Vec<(String, EntityOutcome)>,
}

impl UpdateReport {
    pub(crate) fn new(region: Region) -> Self {
        Self {
            region,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, external_id: String, outcome: EntityOutcome) {
        self.entries.push((external_id, outcome));
    }

    /// Outcome for one external id
    pub fn outcome(&self, external_id: &str) -> Option<&EntityOutcome> {
        self.entries
            .iter()
            .find(|(id, _)| id == external_id)
            .map(|(_, outcome)| outcome)
    }

    /// Number of entities processed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entity was processed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names_updated(&self) -> usize {
        self.count(EntityOutcome::name_updated)
    }

    pub fn ranks_updated(&self) -> usize {
        self.count(EntityOutcome::rank_updated)
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| *o == EntityOutcome::NoChange)
    }

    pub fn failed(&self) -> usize {
        self.count(EntityOutcome::is_failed)
    }

    fn count(&self, predicate: impl Fn(&EntityOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Result of a batch add
#[derive(Debug, Clone, Default)]
pub struct AddReport {
    /// Entities created
    pub added: Vec<EntityHandle>,
    /// Inputs that could not be added, with the reason
    pub failed: Vec<(String, String)>,
}
