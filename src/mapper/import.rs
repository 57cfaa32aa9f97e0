// ============================================================================
// Interchange rows -> drafts
// ============================================================================
//
// A row is never rejected for a bad cell: blank cells take the field
// default, bad numbers read as zero and bad dates read as unset. The only
// row-level rejection is a native-shape row that lacks a required key.

use super::table::{Cell, Table};
use crate::core::{
    CoverageLine, Customer, DocumentAddress, EXPORT_FIELDS, Field, InsuranceType, NON_MEMBER,
    Outcome, PaymentPlan, Policy, PolicyDraft, PolicyError, UseType, Vehicle,
};
use crate::core::record::iso_date;
use chrono::NaiveDate;
use tracing::{debug, warn};

static EMPTY: Cell = Cell::Empty;

/// How the columns of an incoming table are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnNaming {
    /// Interchange labels, as written by export.
    Label,
    /// Persisted JSON keys, as found in a copy of the stored collection.
    Key,
}

impl ColumnNaming {
    pub fn name(self, field: Field) -> &'static str {
        match self {
            Self::Label => field.label(),
            Self::Key => field.key(),
        }
    }

    /// Labels win whenever any label column is present.
    pub fn detect(table: &Table) -> Self {
        let has = |naming: Self| EXPORT_FIELDS.iter().any(|&f| table.has_column(naming.name(f)));
        if !has(Self::Label) && has(Self::Key) {
            Self::Key
        } else {
            Self::Label
        }
    }
}

/// Maps every non-blank row of `table` to a draft, tagged with its 1-based
/// data row number. Rejected rows come back as `ImportRowSkipped` warnings.
pub fn from_table(table: &Table) -> Outcome<Vec<(usize, PolicyDraft)>> {
    let naming = ColumnNaming::detect(table);
    let columns: Vec<Option<usize>> = EXPORT_FIELDS
        .iter()
        .map(|&f| table.column_index(naming.name(f)))
        .collect();
    debug!(?naming, rows = table.len(), "mapping import table");

    let mut outcome = Outcome::clean(Vec::with_capacity(table.len()));
    for (i, cells) in table.rows().iter().enumerate() {
        let row_no = i + 1;
        if cells.iter().all(Cell::is_blank) {
            debug!(row = row_no, "blank import row ignored");
            continue;
        }

        let row = RowReader {
            cells,
            columns: &columns,
        };

        if naming == ColumnNaming::Key {
            let missing = row.missing_required();
            if !missing.is_empty() {
                let reason = format!("missing required field(s): {}", missing.join(", "));
                warn!(row = row_no, %reason, "import row skipped");
                outcome.push_warning(PolicyError::ImportRowSkipped { row: row_no, reason });
                continue;
            }
        }

        outcome.value.push((row_no, row.to_draft()));
    }
    outcome
}

/// Field-addressed view of one positional row.
struct RowReader<'a> {
    cells: &'a [Cell],
    columns: &'a [Option<usize>],
}

impl RowReader<'_> {
    fn cell(&self, field: Field) -> &Cell {
        EXPORT_FIELDS
            .iter()
            .position(|&f| f == field)
            .and_then(|slot| self.columns[slot])
            .and_then(|col| self.cells.get(col))
            .unwrap_or(&EMPTY)
    }

    fn missing_required(&self) -> Vec<&'static str> {
        EXPORT_FIELDS
            .iter()
            .filter(|f| f.is_required())
            .filter(|&&f| self.cell(f) == &Cell::Empty)
            .map(|f| f.key())
            .collect()
    }

    /// Cell text exactly as written, whitespace included. Only fields with a
    /// documented default treat blank text as absent.
    fn text(&self, field: Field) -> String {
        match self.cell(field) {
            Cell::Text(text) => text.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    fn text_or(&self, field: Field, default: &str) -> String {
        self.cell(field)
            .as_text()
            .map_or_else(|| default.to_string(), |t| t.into_owned())
    }

    fn parsed<T: From<String> + Default>(&self, field: Field) -> T {
        self.cell(field)
            .as_text()
            .map_or_else(T::default, |t| T::from(t.into_owned()))
    }

    fn money(&self, field: Field) -> f64 {
        let amount = match self.cell(field) {
            Cell::Number(n) => *n,
            Cell::Text(text) => text.trim().replace(',', "").parse::<f64>().unwrap_or(0.0),
            Cell::Empty => 0.0,
        };
        if amount.is_finite() { amount } else { 0.0 }
    }

    fn date(&self, field: Field) -> Option<NaiveDate> {
        match self.cell(field) {
            Cell::Text(text) => iso_date::parse(text),
            Cell::Number(serial) => iso_date::from_serial(*serial),
            Cell::Empty => None,
        }
    }

    fn to_draft(&self) -> PolicyDraft {
        PolicyDraft {
            customer: Customer {
                name: self.text(Field::CustomerName),
                member_tier: self.text_or(Field::MemberTier, NON_MEMBER),
                member_code: self.text(Field::MemberCode),
                phone: self.text(Field::Phone),
                address: self.text(Field::Address),
                document_address: self.parsed::<DocumentAddress>(Field::DocumentAddress),
            },
            vehicle: Vehicle {
                plate: self.text(Field::Plate).to_uppercase(),
                model: self.text(Field::Model),
                year: self.text(Field::Year),
                engine_no: self.text(Field::EngineNo),
                vin: self.text(Field::Vin),
                displacement: self.text(Field::Displacement),
                seats: self.text(Field::Seats),
                color: self.text(Field::Color),
                accessories: self.text(Field::Accessories),
                use_type: self.parsed::<UseType>(Field::UseType),
            },
            policy: Policy {
                insurance_type: self.parsed::<InsuranceType>(Field::InsuranceType),
                sub_type: self.text(Field::PolicySubType),
                compulsory: CoverageLine {
                    company: self.text(Field::CompulsoryCompany),
                    premium: self.money(Field::CompulsoryPremium),
                    discount: self.money(Field::CompulsoryDiscount),
                    start: self.date(Field::CompulsoryStart),
                    end: self.date(Field::CompulsoryEnd),
                },
                voluntary: CoverageLine {
                    company: self.text(Field::VoluntaryCompany),
                    premium: self.money(Field::VoluntaryPremium),
                    discount: self.money(Field::VoluntaryDiscount),
                    start: self.date(Field::VoluntaryStart),
                    end: self.date(Field::VoluntaryEnd),
                },
                payment_plan: self.parsed::<PaymentPlan>(Field::PaymentPlan),
            },
        }
    }
}
