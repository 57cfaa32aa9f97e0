use super::table::{Cell, Table};
use crate::core::{EXPORT_FIELDS, FieldValue, PolicyRecord};
use chrono::SecondsFormat;

/// Lays records out under the interchange labels, one row per record in
/// collection order. Ids are not exported.
pub fn to_table(records: &[PolicyRecord]) -> Table {
    let mut table = Table::new(EXPORT_FIELDS.iter().map(|f| f.label()));
    for record in records {
        table.push_row(to_row(record));
    }
    table
}

pub fn to_row(record: &PolicyRecord) -> Vec<Cell> {
    EXPORT_FIELDS
        .iter()
        .map(|&field| match record.value(field) {
            FieldValue::Text(text) => Cell::Text(text.into_owned()),
            FieldValue::Money(amount) => Cell::Number(amount),
            FieldValue::Date(Some(date)) => Cell::Text(date.to_string()),
            FieldValue::Date(None) => Cell::Text(String::new()),
            FieldValue::Timestamp(ts) => Cell::Text(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, PaymentPlan, PolicyDraft};
    use crate::store::RecordStore;
    use chrono::NaiveDate;

    #[test]
    fn test_row_layout() {
        let mut draft = PolicyDraft::default();
        draft.customer.name = "ก".to_string();
        draft.policy.compulsory.premium = 645.21;
        draft.policy.voluntary.start = NaiveDate::from_ymd_opt(2024, 2, 29);
        draft.policy.payment_plan = PaymentPlan::installment(10);
        let mut store = RecordStore::in_memory();
        store.create(draft).unwrap();

        let table = to_table(store.all());
        assert_eq!(table.columns().len(), 31);
        let row = &table.rows()[0];
        let at = |field: Field| &row[table.column_index(field.label()).unwrap()];

        assert_eq!(at(Field::CustomerName), &Cell::text("ก"));
        assert_eq!(at(Field::CompulsoryPremium), &Cell::Number(645.21));
        assert_eq!(at(Field::TotalAmount), &Cell::Number(645.21));
        assert_eq!(at(Field::VoluntaryStart), &Cell::text("2024-02-29"));
        assert_eq!(at(Field::VoluntaryEnd), &Cell::text(""));
        assert_eq!(at(Field::PaymentPlan), &Cell::text("ผ่อน 10 เดือน"));
        assert!(matches!(at(Field::CreatedAt), Cell::Text(ts) if ts.ends_with('Z')));
    }

    #[test]
    fn test_empty_collection_has_header_only() {
        let table = to_table(&[]);
        assert!(table.is_empty());
        assert_eq!(table.columns()[0], "ชื่อลูกค้า");
    }
}
