pub mod error;
pub mod fields;
pub mod kinds;
pub mod record;

pub use error::{Outcome, PolicyError, Result};
pub use fields::{EXPORT_FIELDS, Field, FieldKind, FieldValue};
pub use kinds::{
    DocumentAddress, InstallmentMonths, InsuranceType, NON_MEMBER, PaymentPlan, SAME_AS_ID_CARD,
    UseType,
};
pub use record::{CoverageLine, Customer, Policy, PolicyDraft, PolicyRecord, RecordId, Vehicle};
