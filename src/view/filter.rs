use crate::core::PolicyRecord;

/// Free-text search over the columns shown in the table.
///
/// The term is trimmed and lowercased once. Name, plate, model, insurance
/// type and both coverage companies match case-insensitively; the phone
/// number is matched as a plain substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    term: String,
}

impl SearchFilter {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.trim().to_lowercase(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn matches(&self, record: &PolicyRecord) -> bool {
        if self.term.is_empty() {
            return true;
        }

        let term = self.term.as_str();
        let policy = record.policy();
        let contains = |text: &str| text.to_lowercase().contains(term);

        contains(&record.customer().name)
            || record.customer().phone.contains(term)
            || contains(&record.vehicle().plate)
            || contains(&record.vehicle().model)
            || contains(policy.insurance_type.as_str())
            || contains(&policy.compulsory.company)
            || contains(&policy.voluntary.company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InsuranceType, PolicyDraft};
    use crate::store::RecordStore;

    fn record() -> PolicyRecord {
        let mut draft = PolicyDraft::default();
        draft.customer.name = "Somchai Jaidee".to_string();
        draft.customer.phone = "0812345678".to_string();
        draft.vehicle.plate = "kk-1234".to_string();
        draft.vehicle.model = "Toyota Vios".to_string();
        draft.policy.insurance_type = InsuranceType::Compulsory;
        draft.policy.voluntary.company = "Viriyah".to_string();
        let mut store = RecordStore::in_memory();
        store.create(draft).unwrap().into_value()
    }

    #[test]
    fn test_empty_term_matches_everything() {
        assert!(SearchFilter::new("   ").matches(&record()));
    }

    #[test]
    fn test_case_insensitive_columns() {
        let record = record();
        assert!(SearchFilter::new("SOMCHAI").matches(&record));
        assert!(SearchFilter::new("KK-12").matches(&record));
        assert!(SearchFilter::new("vios").matches(&record));
        assert!(SearchFilter::new("พรบ").matches(&record));
        assert!(SearchFilter::new("viriyah").matches(&record));
    }

    #[test]
    fn test_phone_substring() {
        assert!(SearchFilter::new("2345").matches(&record()));
    }

    #[test]
    fn test_non_searched_column_does_not_match() {
        // year is displayed but not searched
        let mut draft = record().to_draft();
        draft.vehicle.year = "2020".to_string();
        let mut store = RecordStore::in_memory();
        let record = store.create(draft).unwrap().into_value();
        assert!(!SearchFilter::new("2020").matches(&record));
    }
}
