use crate::core::{Outcome, PolicyDraft, PolicyError, PolicyRecord, RecordId, Result};
use crate::storage::{NullGateway, PersistenceGateway};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Aggregate figures over the whole collection (not the filtered view).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreStats {
    pub record_count: usize,
    pub total_amount: f64,
}

/// Authoritative, insertion-ordered record collection.
///
/// Every mutation writes the full collection through the gateway. A failed
/// write never rolls back the in-memory change; it comes back as a
/// `PersistenceWarning` on the returned [`Outcome`].
pub struct RecordStore {
    records: Vec<PolicyRecord>,
    index: HashMap<RecordId, usize>,
    gateway: Box<dyn PersistenceGateway>,
}

impl RecordStore {
    /// Loads the persisted collection. Duplicate ids found in storage are
    /// re-keyed so that ids stay unique.
    pub fn open(gateway: Box<dyn PersistenceGateway>) -> Outcome<Self> {
        let Outcome {
            value: loaded,
            mut warnings,
        } = gateway.load();

        let mut store = Self {
            records: Vec::with_capacity(loaded.len()),
            index: HashMap::with_capacity(loaded.len()),
            gateway,
        };

        for mut record in loaded {
            if store.index.contains_key(record.id()) {
                let fresh = store.fresh_id();
                warn!(old = %record.id(), new = %fresh, "duplicate stored id re-keyed");
                warnings.push(PolicyError::PersistenceWarning(format!(
                    "duplicate stored id '{}' re-keyed as '{}'",
                    record.id(),
                    fresh
                )));
                record.rekey(fresh);
            }
            store.push(record);
        }

        info!(records = store.len(), "record store opened");
        Outcome::with_warnings(store, warnings)
    }

    /// Store that keeps nothing beyond the process.
    pub fn in_memory() -> Self {
        Self::open(Box::new(NullGateway)).into_value()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot in insertion order, independent of any view state.
    pub fn all(&self) -> &[PolicyRecord] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&PolicyRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            record_count: self.records.len(),
            total_amount: self.records.iter().map(PolicyRecord::total_amount).sum(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn create(&mut self, draft: PolicyDraft) -> Result<Outcome<PolicyRecord>> {
        let record = self.admit(draft)?;
        debug!(id = %record.id(), "record created");
        Ok(self.persisted(record))
    }

    /// Replaces the whole record under `id`, keeping its id and creation
    /// time and capturing a new total.
    pub fn update(&mut self, id: &RecordId, draft: PolicyDraft) -> Result<Outcome<PolicyRecord>> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| PolicyError::NotFound(id.clone()))?;
        let draft = Self::checked(draft)?;

        let created_at = self.records[pos].created_at();
        let record = PolicyRecord::new(id.clone(), created_at, draft);
        self.records[pos] = record.clone();
        debug!(id = %id, "record updated");
        Ok(self.persisted(record))
    }

    /// Removes and returns the record. Deleting an id twice fails the
    /// second time.
    pub fn delete(&mut self, id: &RecordId) -> Result<Outcome<PolicyRecord>> {
        let pos = self
            .index
            .remove(id)
            .ok_or_else(|| PolicyError::NotFound(id.clone()))?;
        let removed = self.records.remove(pos);
        for (offset, record) in self.records[pos..].iter().enumerate() {
            self.index.insert(record.id().clone(), pos + offset);
        }
        debug!(id = %id, "record deleted");
        Ok(self.persisted(removed))
    }

    /// Applies `create` to each draft in order. Malformed drafts are skipped
    /// and reported as `ImportRowSkipped` (1-based row numbers); the batch is
    /// saved once.
    pub fn bulk_insert(&mut self, drafts: Vec<PolicyDraft>) -> Outcome<Vec<PolicyRecord>> {
        self.insert_rows(drafts.into_iter().enumerate().map(|(i, d)| (i + 1, d)))
    }

    pub(crate) fn insert_rows<I>(&mut self, rows: I) -> Outcome<Vec<PolicyRecord>>
    where
        I: IntoIterator<Item = (usize, PolicyDraft)>,
    {
        let mut outcome = Outcome::clean(Vec::new());
        for (row, draft) in rows {
            match self.admit(draft) {
                Ok(record) => outcome.value.push(record),
                Err(e) => {
                    warn!(row, error = %e, "bulk row skipped");
                    outcome.push_warning(PolicyError::ImportRowSkipped {
                        row,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !outcome.value.is_empty()
            && let Err(warning) = self.gateway.save(&self.records)
        {
            outcome.push_warning(warning);
        }
        debug!(
            inserted = outcome.value.len(),
            skipped = outcome.warnings.len(),
            "bulk insert finished"
        );
        outcome
    }

    /// Removes every record and returns how many were removed.
    pub fn clear_all(&mut self) -> Outcome<usize> {
        let removed = self.records.len();
        self.records.clear();
        self.index.clear();
        info!(removed, "collection cleared");
        self.persisted(removed)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn checked(mut draft: PolicyDraft) -> Result<PolicyDraft> {
        draft.validate()?;
        draft.normalize();
        Ok(draft)
    }

    /// Validates, assigns identity and appends without saving.
    fn admit(&mut self, draft: PolicyDraft) -> Result<PolicyRecord> {
        let draft = Self::checked(draft)?;
        let record = PolicyRecord::new(self.fresh_id(), Utc::now(), draft);
        self.push(record.clone());
        Ok(record)
    }

    fn push(&mut self, record: PolicyRecord) {
        self.index.insert(record.id().clone(), self.records.len());
        self.records.push(record);
    }

    fn fresh_id(&self) -> RecordId {
        loop {
            let id = RecordId::generate();
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    fn persisted<T>(&self, value: T) -> Outcome<T> {
        match self.gateway.save(&self.records) {
            Ok(()) => Outcome::clean(value),
            Err(warning) => Outcome::with_warnings(value, vec![warning]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InsuranceType, PaymentPlan};

    fn draft(name: &str, premium: f64) -> PolicyDraft {
        let mut draft = PolicyDraft::default();
        draft.customer.name = name.to_string();
        draft.customer.phone = "0812345678".to_string();
        draft.vehicle.plate = " ab-1234 ".to_string();
        draft.vehicle.model = "Honda City".to_string();
        draft.vehicle.year = "2019".to_string();
        draft.policy.insurance_type = InsuranceType::Voluntary;
        draft.policy.voluntary.premium = premium;
        draft
    }

    #[test]
    fn test_create_assigns_identity_and_normalizes_plate() {
        let mut store = RecordStore::in_memory();
        let record = store.create(draft("a", 100.0)).unwrap().into_value();
        assert_eq!(record.vehicle().plate, "AB-1234");
        assert_eq!(store.get(record.id()), Some(&record));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_id_and_created_at() {
        let mut store = RecordStore::in_memory();
        let original = store.create(draft("a", 100.0)).unwrap().into_value();
        let mut edited = original.to_draft();
        edited.policy.voluntary.premium = 250.0;
        edited.policy.payment_plan = PaymentPlan::installment(3);
        let updated = store.update(original.id(), edited).unwrap().into_value();
        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.created_at(), original.created_at());
        assert_eq!(updated.total_amount(), 250.0);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = RecordStore::in_memory();
        let err = store
            .update(&RecordId::from("missing"), draft("a", 1.0))
            .unwrap_err();
        assert_eq!(err, PolicyError::NotFound(RecordId::from("missing")));
    }

    #[test]
    fn test_delete_reindexes_tail() {
        let mut store = RecordStore::in_memory();
        let a = store.create(draft("a", 1.0)).unwrap().into_value();
        let b = store.create(draft("b", 2.0)).unwrap().into_value();
        let c = store.create(draft("c", 3.0)).unwrap().into_value();
        store.delete(a.id()).unwrap();
        assert_eq!(store.get(b.id()).unwrap().customer().name, "b");
        assert_eq!(store.get(c.id()).unwrap().customer().name, "c");
        assert!(matches!(
            store.delete(a.id()),
            Err(PolicyError::NotFound(_))
        ));
    }

    #[test]
    fn test_bulk_insert_skips_malformed_rows() {
        let mut store = RecordStore::in_memory();
        let mut bad = draft("bad", 1.0);
        bad.policy.compulsory.discount = f64::INFINITY;
        let outcome = store.bulk_insert(vec![draft("a", 1.0), bad, draft("c", 3.0)]);
        assert_eq!(outcome.value.len(), 2);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [PolicyError::ImportRowSkipped { row: 2, .. }]
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_stats_sum_captured_totals() {
        let mut store = RecordStore::in_memory();
        store.create(draft("a", 100.5)).unwrap();
        store.create(draft("b", 200.25)).unwrap();
        let stats = store.stats();
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.total_amount, 300.75);
    }

    #[test]
    fn test_clear_all() {
        let mut store = RecordStore::in_memory();
        store.create(draft("a", 1.0)).unwrap();
        assert_eq!(store.clear_all().into_value(), 1);
        assert!(store.is_empty());
    }
}
