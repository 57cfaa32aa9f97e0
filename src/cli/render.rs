use policybook::{EXPORT_FIELDS, FieldValue, PolicyRecord, ViewPage, format_currency, format_date};
use std::fmt::Write;

/// One line per field, labelled the way exported files label them.
pub fn record_details(record: &PolicyRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<22} {}", "id", record.id());
    for field in EXPORT_FIELDS {
        let value = match record.value(field) {
            FieldValue::Text(text) => text.into_owned(),
            FieldValue::Money(amount) => format_currency(amount),
            FieldValue::Date(Some(date)) => format_date(date),
            FieldValue::Date(None) => "-".to_string(),
            FieldValue::Timestamp(ts) => format_date(ts.date_naive()),
        };
        let _ = writeln!(out, "{:<22} {}", field.label(), value);
    }
    out
}

pub fn page(page: &ViewPage<'_>) -> String {
    let meta = &page.meta;
    let mut out = String::new();

    for record in &page.rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            record.id(),
            record.vehicle().plate,
            record.customer().name,
            record.policy().insurance_type,
            format_currency(record.total_amount()),
            format_date(record.created_at().date_naive()),
        );
    }

    let pages: Vec<String> = meta
        .page_numbers()
        .map(|n| if n == meta.page { format!("[{}]", n) } else { n.to_string() })
        .collect();
    let _ = writeln!(
        out,
        "Showing {}-{} of {} (page {}/{}) {}",
        meta.first_visible_index,
        meta.last_visible_index,
        meta.total_filtered,
        meta.page,
        meta.total_pages.max(1),
        pages.join(" ")
    );
    out
}
