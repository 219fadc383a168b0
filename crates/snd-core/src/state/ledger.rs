// # History Ledger
//
// The in-memory shape shared by every HistoryStore implementation: a list
// of entities, each owning its name and rank histories. Stores wrap a
// ledger in a lock and decide how (or whether) to persist it.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::traits::history_store::{EntityHandle, EntityId, NameRecord, RankRecord};

/// One tracked entity and the histories it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EntityRow {
    pub id: EntityId,
    pub external_id: String,
    #[serde(default)]
    pub names: Vec<NameRecord>,
    #[serde(default)]
    pub ranks: Vec<RankRecord>,
}

impl EntityRow {
    fn handle(&self) -> EntityHandle {
        EntityHandle {
            id: self.id,
            external_id: self.external_id.clone(),
        }
    }
}

/// All entities of one store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Ledger {
    /// Last surrogate id handed out
    #[serde(default)]
    pub last_id: u64,
    #[serde(default)]
    pub entities: Vec<EntityRow>,
}

impl Ledger {
    pub fn create(&mut self, external_id: &str) -> Result<EntityHandle, Error> {
        if external_id.is_empty() {
            return Err(Error::invalid_input("External id cannot be empty"));
        }
        if self.entities.iter().any(|e| e.external_id == external_id) {
            return Err(Error::duplicate(external_id));
        }

        self.last_id += 1;
        let row = EntityRow {
            id: EntityId(self.last_id),
            external_id: external_id.to_string(),
            names: Vec::new(),
            ranks: Vec::new(),
        };
        let handle = row.handle();
        self.entities.push(row);
        Ok(handle)
    }

    pub fn append_name(
        &mut self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.row_mut(handle)?.names.push(NameRecord {
            value: value.to_string(),
            observed_at,
        });
        Ok(())
    }

    pub fn append_rank(
        &mut self,
        handle: &EntityHandle,
        value: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.row_mut(handle)?.ranks.push(RankRecord {
            value: value.to_string(),
            observed_at,
        });
        Ok(())
    }

    pub fn handles(&self) -> Vec<EntityHandle> {
        self.entities.iter().map(EntityRow::handle).collect()
    }

    pub fn find(&self, external_id: &str) -> Option<EntityHandle> {
        self.entities
            .iter()
            .find(|e| e.external_id == external_id)
            .map(EntityRow::handle)
    }

    pub fn latest_name(&self, handle: &EntityHandle) -> Result<Option<NameRecord>, Error> {
        Ok(self.row(handle)?.names.last().cloned())
    }

    pub fn latest_rank(&self, handle: &EntityHandle) -> Result<Option<RankRecord>, Error> {
        Ok(self.row(handle)?.ranks.last().cloned())
    }

    pub fn name_history(&self, handle: &EntityHandle) -> Result<Vec<NameRecord>, Error> {
        Ok(self.row(handle)?.names.clone())
    }

    pub fn rank_history(&self, handle: &EntityHandle) -> Result<Vec<RankRecord>, Error> {
        Ok(self.row(handle)?.ranks.clone())
    }

    pub fn names_matching(&self, pattern: &Regex) -> Vec<(EntityHandle, NameRecord)> {
        self.entities
            .iter()
            .flat_map(|row| {
                row.names
                    .iter()
                    .filter(|name| pattern.is_match(&name.value))
                    .map(move |name| (row.handle(), name.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    fn row(&self, handle: &EntityHandle) -> Result<&EntityRow, Error> {
        self.entities
            .iter()
            .find(|e| e.id == handle.id)
            .ok_or_else(|| Error::not_found(format!("Entity {} ({})", handle.id, handle.external_id)))
    }

    fn row_mut(&mut self, handle: &EntityHandle) -> Result<&mut EntityRow, Error> {
        self.entities
            .iter_mut()
            .find(|e| e.id == handle.id)
            .ok_or_else(|| Error::not_found(format!("Entity {} ({})", handle.id, handle.external_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_assigned_in_order() {
        let mut ledger = Ledger::default();
        let a = ledger.create("a").unwrap();
        let b = ledger.create("b").unwrap();
        assert_eq!(a.id, EntityId(1));
        assert_eq!(b.id, EntityId(2));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_duplicate_and_empty_ids_are_rejected() {
        let mut ledger = Ledger::default();
        ledger.create("a").unwrap();
        assert!(matches!(ledger.create("a"), Err(Error::DuplicateEntity(_))));
        assert!(matches!(ledger.create(""), Err(Error::InvalidInput(_))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_append_to_unknown_handle_fails() {
        let mut ledger = Ledger::default();
        let ghost = EntityHandle {
            id: EntityId(7),
            external_id: "ghost".to_string(),
        };
        let result = ledger.append_name(&ghost, "Boo", Utc::now());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_names_matching_scans_whole_history() {
        let mut ledger = Ledger::default();
        let a = ledger.create("a").unwrap();
        let b = ledger.create("b").unwrap();
        ledger.append_name(&a, "OldFaker", Utc::now()).unwrap();
        ledger.append_name(&a, "Hide on bush", Utc::now()).unwrap();
        ledger.append_name(&b, "Someone", Utc::now()).unwrap();

        let pattern = Regex::new("(?i)faker").unwrap();
        let matches = ledger.names_matching(&pattern);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, a);
        assert_eq!(matches[0].1.value, "OldFaker");
    }
}
