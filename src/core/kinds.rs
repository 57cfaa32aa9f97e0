// ============================================================================
// Open enumerations used by policy records
// ============================================================================
//
// Every kind here persists as the plain display string the register has
// always stored, so blobs written by earlier versions load unchanged. Values
// outside the fixed set survive through an `Other` fallback.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Member tier value for customers without a membership.
pub const NON_MEMBER: &str = "ไม่เป็นสมาชิก";

/// Document-delivery sentinel: send documents to the ID-card address.
pub const SAME_AS_ID_CARD: &str = "ตามบัตรประชาชน";

const USE_PERSONAL: &str = "ใช้ส่วนบุคคล";
const USE_FOR_HIRE: &str = "รับจ้าง";

const INSURANCE_COMPULSORY: &str = "พรบ";
const INSURANCE_VOLUNTARY: &str = "สมัครใจ";
const INSURANCE_COMBINED: &str = "พรบ+สมัครใจ";

const PAY_LUMP_SUM: &str = "เต็มจำนวน";
const PAY_INSTALLMENT_PREFIX: &str = "ผ่อน";
const PAY_MONTHS_SUFFIX: &str = "เดือน";

/// Month counts offered by the installment selector.
pub const PRESET_INSTALLMENT_MONTHS: [u32; 3] = [3, 6, 10];

lazy_static! {
    static ref INSTALLMENT_MONTHS: Regex =
        Regex::new(r"^ผ่อน\s*(\d+)\s*เดือน$").expect("installment pattern is valid");
}

// ============================================================================
// Use type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UseType {
    #[default]
    Personal,
    ForHire,
    Other(String),
}

impl UseType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Personal => USE_PERSONAL,
            Self::ForHire => USE_FOR_HIRE,
            Self::Other(text) => text,
        }
    }
}

impl From<String> for UseType {
    fn from(value: String) -> Self {
        match value.as_str() {
            USE_PERSONAL => Self::Personal,
            USE_FOR_HIRE => Self::ForHire,
            _ => Self::Other(value),
        }
    }
}

impl From<UseType> for String {
    fn from(value: UseType) -> Self {
        match value {
            UseType::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Insurance type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InsuranceType {
    Compulsory,
    Voluntary,
    CompulsoryAndVoluntary,
    Other(String),
}

impl InsuranceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Compulsory => INSURANCE_COMPULSORY,
            Self::Voluntary => INSURANCE_VOLUNTARY,
            Self::CompulsoryAndVoluntary => INSURANCE_COMBINED,
            Self::Other(text) => text,
        }
    }

    /// Only policies carrying the voluntary line have a sub-type (class).
    pub fn supports_sub_type(&self) -> bool {
        self.as_str().contains(INSURANCE_VOLUNTARY)
    }
}

impl Default for InsuranceType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for InsuranceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            INSURANCE_COMPULSORY => Self::Compulsory,
            INSURANCE_VOLUNTARY => Self::Voluntary,
            INSURANCE_COMBINED => Self::CompulsoryAndVoluntary,
            _ => Self::Other(value),
        }
    }
}

impl From<InsuranceType> for String {
    fn from(value: InsuranceType) -> Self {
        match value {
            InsuranceType::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Document delivery address
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentAddress {
    #[default]
    SameAsIdCard,
    Other(String),
}

impl DocumentAddress {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SameAsIdCard => SAME_AS_ID_CARD,
            Self::Other(text) => text,
        }
    }
}

impl From<String> for DocumentAddress {
    fn from(value: String) -> Self {
        if value.is_empty() || value == SAME_AS_ID_CARD {
            Self::SameAsIdCard
        } else {
            Self::Other(value)
        }
    }
}

impl From<DocumentAddress> for String {
    fn from(value: DocumentAddress) -> Self {
        match value {
            DocumentAddress::SameAsIdCard => SAME_AS_ID_CARD.to_string(),
            DocumentAddress::Other(text) => text,
        }
    }
}

// ============================================================================
// Payment plan
// ============================================================================

/// Month count of an installment plan: one of the selector presets, or the
/// free-text override typed next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallmentMonths {
    Preset(u32),
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentPlan {
    #[default]
    LumpSum,
    Installment(InstallmentMonths),
}

impl PaymentPlan {
    pub fn installment(months: u32) -> Self {
        if PRESET_INSTALLMENT_MONTHS.contains(&months) {
            Self::Installment(InstallmentMonths::Preset(months))
        } else {
            Self::Installment(InstallmentMonths::Custom(months.to_string()))
        }
    }

    /// Composed display string, e.g. `ผ่อน 6 เดือน`. This is the only form
    /// that is persisted and exported.
    pub fn compose(&self) -> String {
        match self {
            Self::LumpSum => PAY_LUMP_SUM.to_string(),
            Self::Installment(InstallmentMonths::Preset(months)) => {
                format!("{} {} {}", PAY_INSTALLMENT_PREFIX, months, PAY_MONTHS_SUFFIX)
            }
            Self::Installment(InstallmentMonths::Custom(text)) => {
                format!("{} {} {}", PAY_INSTALLMENT_PREFIX, text, PAY_MONTHS_SUFFIX)
            }
        }
    }

    /// Best-effort inverse of [`compose`](Self::compose). Whether the month
    /// count came from the selector or the override is not recoverable: a
    /// preset count always parses back as `Preset`.
    /// Installment text without a month count reads as a lump sum.
    pub fn parse(composed: &str) -> Self {
        let composed = composed.trim();
        if !composed.contains(PAY_INSTALLMENT_PREFIX) {
            return Self::LumpSum;
        }

        if let Some(months) = INSTALLMENT_MONTHS
            .captures(composed)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return Self::installment(months);
        }

        let text = composed
            .trim_start_matches(PAY_INSTALLMENT_PREFIX)
            .trim_end_matches(PAY_MONTHS_SUFFIX)
            .trim();
        if text.is_empty() {
            return Self::LumpSum;
        }
        Self::Installment(InstallmentMonths::Custom(text.to_string()))
    }

    pub fn is_installment(&self) -> bool {
        matches!(self, Self::Installment(_))
    }
}

impl From<String> for PaymentPlan {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PaymentPlan> for String {
    fn from(value: PaymentPlan) -> Self {
        value.compose()
    }
}

impl fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}
