// ============================================================================
// Policy record schema
// ============================================================================
//
// The persisted shape is a flat JSON object with the camelCase keys the
// register has always used (`custName`, `premiumPRB`, `timestamp`, ...).
// In Rust the record is grouped into customer / vehicle / policy parts and
// flattened back on the wire.

use crate::core::error::{PolicyError, Result};
use crate::core::fields::EXPORT_FIELDS;
use crate::core::kinds::{
    DocumentAddress, InstallmentMonths, InsuranceType, NON_MEMBER, PaymentPlan, UseType,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Identity
// ============================================================================

/// Opaque record identifier.
///
/// New ids are UUID v4 strings. Older stores used millisecond timestamps
/// written as JSON numbers; those load as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordIdVisitor;

        impl Visitor<'_> for RecordIdVisitor {
            type Value = RecordId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a record id string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<RecordId, E> {
                Ok(RecordId(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<RecordId, E> {
                Ok(RecordId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<RecordId, E> {
                Ok(RecordId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<RecordId, E> {
                Ok(RecordId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<RecordId, E> {
                Ok(RecordId(v.to_string()))
            }
        }

        deserializer.deserialize_any(RecordIdVisitor)
    }
}

// ============================================================================
// Record parts
// ============================================================================

fn default_member_tier() -> String {
    NON_MEMBER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "custName", deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(
        rename = "memberLevel",
        default = "default_member_tier",
        deserialize_with = "lenient::text"
    )]
    pub member_tier: String,
    #[serde(rename = "memberCode", default, deserialize_with = "lenient::text")]
    pub member_code: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: String,
    #[serde(rename = "docAddress", default, deserialize_with = "lenient::parsed")]
    pub document_address: DocumentAddress,
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            name: String::new(),
            member_tier: default_member_tier(),
            member_code: String::new(),
            phone: String::new(),
            address: String::new(),
            document_address: DocumentAddress::SameAsIdCard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(deserialize_with = "lenient::text")]
    pub plate: String,
    #[serde(deserialize_with = "lenient::text")]
    pub model: String,
    #[serde(deserialize_with = "lenient::text")]
    pub year: String,
    #[serde(rename = "engineNo", default, deserialize_with = "lenient::text")]
    pub engine_no: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub vin: String,
    #[serde(rename = "cc", default, deserialize_with = "lenient::text")]
    pub displacement: String,
    #[serde(rename = "seat", default, deserialize_with = "lenient::text")]
    pub seats: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub color: String,
    #[serde(rename = "accessory", default, deserialize_with = "lenient::text")]
    pub accessories: String,
    #[serde(rename = "useType", default, deserialize_with = "lenient::parsed")]
    pub use_type: UseType,
}

/// One premium/discount/date group. A policy carries two: the compulsory
/// line and the voluntary line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverageLine {
    pub company: String,
    pub premium: f64,
    pub discount: f64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl CoverageLine {
    pub fn net(&self) -> f64 {
        self.premium - self.discount
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "FlatPolicy", into = "FlatPolicy")]
pub struct Policy {
    pub insurance_type: InsuranceType,
    pub sub_type: String,
    pub compulsory: CoverageLine,
    pub voluntary: CoverageLine,
    pub payment_plan: PaymentPlan,
}

/// Wire layout of [`Policy`]: both coverage lines flattened with the
/// `PRB` (compulsory) and `VOL` (voluntary) key suffixes.
#[derive(Serialize, Deserialize)]
struct FlatPolicy {
    #[serde(rename = "insuranceType", deserialize_with = "lenient::parsed")]
    insurance_type: InsuranceType,
    #[serde(rename = "policySubType", default, deserialize_with = "lenient::text")]
    policy_sub_type: String,
    #[serde(rename = "companyPRB", default, deserialize_with = "lenient::text")]
    company_prb: String,
    #[serde(rename = "premiumPRB", default, deserialize_with = "lenient::money")]
    premium_prb: f64,
    #[serde(rename = "discountPRB", default, deserialize_with = "lenient::money")]
    discount_prb: f64,
    #[serde(rename = "companyVOL", default, deserialize_with = "lenient::text")]
    company_vol: String,
    #[serde(rename = "premiumVOL", default, deserialize_with = "lenient::money")]
    premium_vol: f64,
    #[serde(rename = "discountVOL", default, deserialize_with = "lenient::money")]
    discount_vol: f64,
    #[serde(rename = "startPRB", default, with = "iso_date")]
    start_prb: Option<NaiveDate>,
    #[serde(rename = "endPRB", default, with = "iso_date")]
    end_prb: Option<NaiveDate>,
    #[serde(rename = "startVOL", default, with = "iso_date")]
    start_vol: Option<NaiveDate>,
    #[serde(rename = "endVOL", default, with = "iso_date")]
    end_vol: Option<NaiveDate>,
    #[serde(rename = "paymentType", default, deserialize_with = "lenient::parsed")]
    payment_plan: PaymentPlan,
}

impl From<FlatPolicy> for Policy {
    fn from(flat: FlatPolicy) -> Self {
        Self {
            insurance_type: flat.insurance_type,
            sub_type: flat.policy_sub_type,
            compulsory: CoverageLine {
                company: flat.company_prb,
                premium: flat.premium_prb,
                discount: flat.discount_prb,
                start: flat.start_prb,
                end: flat.end_prb,
            },
            voluntary: CoverageLine {
                company: flat.company_vol,
                premium: flat.premium_vol,
                discount: flat.discount_vol,
                start: flat.start_vol,
                end: flat.end_vol,
            },
            payment_plan: flat.payment_plan,
        }
    }
}

impl From<Policy> for FlatPolicy {
    fn from(policy: Policy) -> Self {
        Self {
            insurance_type: policy.insurance_type,
            policy_sub_type: policy.sub_type,
            company_prb: policy.compulsory.company,
            premium_prb: policy.compulsory.premium,
            discount_prb: policy.compulsory.discount,
            company_vol: policy.voluntary.company,
            premium_vol: policy.voluntary.premium,
            discount_vol: policy.voluntary.discount,
            start_prb: policy.compulsory.start,
            end_prb: policy.compulsory.end,
            start_vol: policy.voluntary.start,
            end_vol: policy.voluntary.end,
            payment_plan: policy.payment_plan,
        }
    }
}

/// Coverage dates persist as `YYYY-MM-DD`, with the empty string for unset.
///
/// Reading is lenient: a trailing time part is ignored, spreadsheet serial
/// day numbers are converted, and anything else reads as unset.
pub(crate) mod iso_date {
    use chrono::{Days, NaiveDate};
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub const FORMAT: &str = "%Y-%m-%d";

    /// Last serial day a spreadsheet can hold (9999-12-31).
    const MAX_SERIAL_DAY: f64 = 2_958_465.0;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format(FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        d.deserialize_any(DateVisitor)
    }

    /// `YYYY-MM-DD`, optionally followed by a `T` or space and a time part.
    pub fn parse(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(text, FORMAT) {
            return Some(date);
        }
        let (day, rest) = text.split_at_checked(10)?;
        if rest.starts_with('T') || rest.starts_with(' ') {
            NaiveDate::parse_from_str(day, FORMAT).ok()
        } else {
            None
        }
    }

    /// Spreadsheet serial day number, counted from 1899-12-30 as spreadsheets
    /// do for every date after February 1900. The fraction (time of day) is
    /// dropped.
    pub fn from_serial(serial: f64) -> Option<NaiveDate> {
        if !(1.0..=MAX_SERIAL_DAY).contains(&serial) {
            return None;
        }
        NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
    }

    struct DateVisitor;

    impl<'de> Visitor<'de> for DateVisitor {
        type Value = Option<NaiveDate>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an ISO date string or a serial day number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(parse(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(from_serial(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(from_serial(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(from_serial(v as f64))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }
}

/// Readers for stored values that older versions wrote loosely: spreadsheet
/// cells were kept as-is, so text fields may hold numbers or booleans and
/// money fields may hold strings.
pub(crate) mod lenient {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        d.deserialize_any(TextVisitor)
    }

    pub fn parsed<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String>,
    {
        text(d).map(T::from)
    }

    /// Numbers as-is; numeric text with thousands separators is parsed;
    /// anything else is zero.
    pub fn money<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        d.deserialize_any(MoneyVisitor)
    }

    /// RFC 3339 text or epoch milliseconds. An unreadable creation time
    /// is replaced by the load time rather than losing the record.
    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let parsed = match serde_json::Value::deserialize(d)? {
            serde_json::Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
            _ => None,
        };
        Ok(parsed.unwrap_or_else(Utc::now))
    }

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("text, a number or a boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        // Whole numbers print without a fraction: 2020.0 -> "2020"
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    struct MoneyVisitor;

    impl<'de> Visitor<'de> for MoneyVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an amount")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(if v.is_finite() { v } else { 0.0 })
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            let amount = v.trim().replace(',', "").parse::<f64>().unwrap_or(0.0);
            self.visit_f64(amount)
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }
    }
}

// ============================================================================
// Draft (record without identity)
// ============================================================================

/// Everything a caller supplies for a record. Identity, creation time and
/// the captured total are assigned by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyDraft {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(flatten)]
    pub vehicle: Vehicle,
    #[serde(flatten)]
    pub policy: Policy,
}

impl PolicyDraft {
    /// Build a draft from a loosely-typed JSON object, as handed over by a
    /// form or found in a native-shape import file.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| PolicyError::MalformedRecord("expected a JSON object".into()))?;

        let missing: Vec<&str> = EXPORT_FIELDS
            .iter()
            .filter(|field| field.is_required())
            .map(|field| field.key())
            .filter(|key| obj.get(*key).is_none_or(|v| v.is_null()))
            .collect();
        if !missing.is_empty() {
            return Err(PolicyError::MalformedRecord(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        serde_json::from_value(value).map_err(|e| PolicyError::MalformedRecord(e.to_string()))
    }

    /// `(premium_A - discount_A) + (premium_B - discount_B)`, to the cent.
    pub fn total_amount(&self) -> f64 {
        round_cents(self.policy.compulsory.net() + self.policy.voluntary.net())
    }

    /// Structural checks the store enforces. Business rules (phone format,
    /// plausible year, ...) belong to whoever builds the draft.
    pub fn validate(&self) -> Result<()> {
        let money = [
            ("premiumPRB", self.policy.compulsory.premium),
            ("discountPRB", self.policy.compulsory.discount),
            ("premiumVOL", self.policy.voluntary.premium),
            ("discountVOL", self.policy.voluntary.discount),
        ];
        for (key, amount) in money {
            if !amount.is_finite() {
                return Err(PolicyError::MalformedRecord(format!(
                    "field '{}' must be a finite number",
                    key
                )));
            }
        }

        if let PaymentPlan::Installment(InstallmentMonths::Custom(text)) = &self.policy.payment_plan
            && text.trim().is_empty()
        {
            return Err(PolicyError::MalformedRecord(
                "installment plan needs a month count".to_string(),
            ));
        }

        Ok(())
    }

    pub(crate) fn normalize(&mut self) {
        self.vehicle.plate = self.vehicle.plate.trim().to_uppercase();
    }
}

pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

// ============================================================================
// Stored record
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    #[serde(default = "RecordId::generate")]
    id: RecordId,
    #[serde(rename = "timestamp", default = "Utc::now", deserialize_with = "lenient::timestamp")]
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    details: PolicyDraft,
    #[serde(rename = "totalAmount", default, deserialize_with = "lenient::money")]
    total_amount: f64,
}

impl PolicyRecord {
    /// Captures the total from the draft as it is right now.
    pub(crate) fn new(id: RecordId, created_at: DateTime<Utc>, details: PolicyDraft) -> Self {
        let total_amount = details.total_amount();
        Self {
            id,
            created_at,
            details,
            total_amount,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn details(&self) -> &PolicyDraft {
        &self.details
    }

    pub fn customer(&self) -> &Customer {
        &self.details.customer
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.details.vehicle
    }

    pub fn policy(&self) -> &Policy {
        &self.details.policy
    }

    /// Total captured when the record was last saved.
    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    /// Copy of the caller-editable part, e.g. to prefill an edit form.
    pub fn to_draft(&self) -> PolicyDraft {
        self.details.clone()
    }

    pub(crate) fn rekey(&mut self, id: RecordId) {
        self.id = id;
    }
}
