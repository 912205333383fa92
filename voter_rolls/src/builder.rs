pub use crate::config::*;
use crate::run_registry_view;

use std::collections::HashSet;

/// A builder for assembling a record batch.
///
/// The builder enforces the one invariant the engine relies on: record ids
/// are unique within a batch.
///
/// ```
/// use voter_rolls::builder::Builder;
/// use voter_rolls::{RawRecord, ViewRules};
/// # use voter_rolls::RegistryErrors;
///
/// let mut builder = Builder::new(&ViewRules::default())?;
///
/// let mut record = RawRecord::new("epic-001");
/// record.full_name = Some("Raj Kumar".to_string());
/// builder.add_record(record)?;
///
/// let view = builder.view();
/// assert_eq!(view.len(), 1);
///
/// # Ok::<(), RegistryErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ViewRules,
    pub(crate) _records: Vec<RawRecord>,
    pub(crate) _seen_ids: HashSet<String>,
}

impl Builder {
    pub fn new(rules: &ViewRules) -> Result<Builder, RegistryErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _records: Vec::new(),
            _seen_ids: HashSet::new(),
        })
    }

    /// Adds one raw record to the batch.
    ///
    /// Fails when the record's id has already been added.
    pub fn add_record(&mut self, record: RawRecord) -> Result<(), RegistryErrors> {
        if !self._seen_ids.insert(record.id.clone()) {
            return Err(RegistryErrors::DuplicateRecordId(record.id));
        }
        self._records.push(record);
        Ok(())
    }

    pub fn add_records(&mut self, records: Vec<RawRecord>) -> Result<(), RegistryErrors> {
        for record in records {
            self.add_record(record)?;
        }
        Ok(())
    }

    /// Computes the view for the accumulated batch under the builder's rules.
    pub fn view(&self) -> RegistryView {
        run_registry_view(&self._records, &self._rules)
    }

    /// Computes a view with different rules over the same batch. Used when
    /// filter or sort parameters change without a fresh fetch.
    pub fn view_with(&self, rules: &ViewRules) -> RegistryView {
        run_registry_view(&self._records, rules)
    }
}
