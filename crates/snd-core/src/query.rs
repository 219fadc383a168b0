//! Read-only history queries
//!
//! These back the `list`, `find` and `find_id` commands. Lookups that match
//! nothing return [`Error::NotFound`] rather than an empty result, so the
//! caller can abort with a message.

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::traits::{EntityHandle, HistoryStore, NameRecord, RankRecord};

/// Name and peak-rank history of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub handle: EntityHandle,
    /// Every recorded name, newest first
    pub names: Vec<NameRecord>,
    /// Latest rank record (the current peak), if any
    pub peak_rank: Option<RankRecord>,
}

impl Timeline {
    /// The current known name
    pub fn current_name(&self) -> Option<&str> {
        self.names.first().map(|n| n.value.as_str())
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "---History: {} [{}]",
            self.current_name().unwrap_or("<unnamed>"),
            self.handle.external_id
        )?;
        if let Some(rank) = &self.peak_rank {
            write!(f, " (Peak rank: {})", rank.value)?;
        }
        writeln!(f)?;
        for name in &self.names {
            writeln!(f, "{} {}", name.observed_at.format("%Y-%m-%d"), name.value)?;
        }
        Ok(())
    }
}

/// Query helper over a history store
pub struct HistoryQuery<'a> {
    store: &'a dyn HistoryStore,
}

impl<'a> HistoryQuery<'a> {
    pub fn new(store: &'a dyn HistoryStore) -> Self {
        Self { store }
    }

    /// Current name of every entity, sorted
    pub async fn list_current_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for handle in self.store.all_entities().await? {
            if let Some(name) = self.store.latest_name(&handle).await? {
                names.push(name.value);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Timelines of every entity that ever carried a matching name
    ///
    /// `pattern` is a case-insensitive regular expression; if it does not
    /// compile it is matched as a literal substring instead.
    pub async fn find_by_name_substring(&self, pattern: &str) -> Result<Vec<Timeline>> {
        let regex = name_pattern(pattern)?;
        let matches = self.store.names_matching(&regex).await?;

        // One timeline per owning entity, in entity order
        let owners: BTreeMap<_, _> = matches
            .into_iter()
            .map(|(handle, _)| (handle.id, handle))
            .collect();

        if owners.is_empty() {
            return Err(Error::not_found(format!("Summoner not found: {}", pattern)));
        }

        let mut timelines = Vec::with_capacity(owners.len());
        for handle in owners.into_values() {
            timelines.push(self.timeline(handle).await?);
        }
        Ok(timelines)
    }

    /// Timeline of the entity with this external id
    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Timeline> {
        let handle = self
            .store
            .find_entity(external_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Summoner not found: {}", external_id)))?;
        self.timeline(handle).await
    }

    async fn timeline(&self, handle: EntityHandle) -> Result<Timeline> {
        let mut names = self.store.name_history(&handle).await?;
        names.reverse();
        let peak_rank = self.store.latest_rank(&handle).await?;
        Ok(Timeline {
            handle,
            names,
            peak_rank,
        })
    }
}

fn name_pattern(pattern: &str) -> Result<Regex> {
    let compiled = RegexBuilder::new(pattern).case_insensitive(true).build();
    match compiled {
        Ok(regex) => Ok(regex),
        Err(e) => {
            tracing::debug!("Pattern {:?} is not a valid regex ({}), matching literally", pattern, e);
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::invalid_input(format!("Invalid pattern {:?}: {}", pattern, e)))
        }
    }
}
