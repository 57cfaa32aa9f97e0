// ============================================================================
// Schema field table
// ============================================================================
//
// One entry per record field: its persisted key, its interchange column
// label and its value kind. The label set and its order are the on-disk
// contract of exported files; never rename a label.

use crate::core::record::PolicyRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Money,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CustomerName,
    MemberTier,
    MemberCode,
    Phone,
    Address,
    DocumentAddress,
    Plate,
    Model,
    Year,
    EngineNo,
    Vin,
    Displacement,
    Seats,
    Color,
    Accessories,
    UseType,
    InsuranceType,
    PolicySubType,
    CompulsoryCompany,
    CompulsoryPremium,
    CompulsoryDiscount,
    VoluntaryCompany,
    VoluntaryPremium,
    VoluntaryDiscount,
    TotalAmount,
    CompulsoryStart,
    CompulsoryEnd,
    VoluntaryStart,
    VoluntaryEnd,
    PaymentPlan,
    CreatedAt,
}

/// Exported columns, in file order.
pub const EXPORT_FIELDS: [Field; 31] = [
    Field::CustomerName,
    Field::MemberTier,
    Field::MemberCode,
    Field::Phone,
    Field::Address,
    Field::DocumentAddress,
    Field::Plate,
    Field::Model,
    Field::Year,
    Field::EngineNo,
    Field::Vin,
    Field::Displacement,
    Field::Seats,
    Field::Color,
    Field::Accessories,
    Field::UseType,
    Field::InsuranceType,
    Field::PolicySubType,
    Field::CompulsoryCompany,
    Field::CompulsoryPremium,
    Field::CompulsoryDiscount,
    Field::VoluntaryCompany,
    Field::VoluntaryPremium,
    Field::VoluntaryDiscount,
    Field::TotalAmount,
    Field::CompulsoryStart,
    Field::CompulsoryEnd,
    Field::VoluntaryStart,
    Field::VoluntaryEnd,
    Field::PaymentPlan,
    Field::CreatedAt,
];

impl Field {
    /// Persisted JSON key; also the column name accepted by sorting.
    pub fn key(self) -> &'static str {
        match self {
            Self::CustomerName => "custName",
            Self::MemberTier => "memberLevel",
            Self::MemberCode => "memberCode",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::DocumentAddress => "docAddress",
            Self::Plate => "plate",
            Self::Model => "model",
            Self::Year => "year",
            Self::EngineNo => "engineNo",
            Self::Vin => "vin",
            Self::Displacement => "cc",
            Self::Seats => "seat",
            Self::Color => "color",
            Self::Accessories => "accessory",
            Self::UseType => "useType",
            Self::InsuranceType => "insuranceType",
            Self::PolicySubType => "policySubType",
            Self::CompulsoryCompany => "companyPRB",
            Self::CompulsoryPremium => "premiumPRB",
            Self::CompulsoryDiscount => "discountPRB",
            Self::VoluntaryCompany => "companyVOL",
            Self::VoluntaryPremium => "premiumVOL",
            Self::VoluntaryDiscount => "discountVOL",
            Self::TotalAmount => "totalAmount",
            Self::CompulsoryStart => "startPRB",
            Self::CompulsoryEnd => "endPRB",
            Self::VoluntaryStart => "startVOL",
            Self::VoluntaryEnd => "endVOL",
            Self::PaymentPlan => "paymentType",
            Self::CreatedAt => "timestamp",
        }
    }

    /// Interchange column label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CustomerName => "ชื่อลูกค้า",
            Self::MemberTier => "ระดับสมาชิก",
            Self::MemberCode => "รหัสสมาชิก",
            Self::Phone => "เบอร์โทร",
            Self::Address => "ที่อยู่",
            Self::DocumentAddress => "ที่อยู่จัดส่งเอกสาร",
            Self::Plate => "ทะเบียนรถ",
            Self::Model => "รุ่นรถ",
            Self::Year => "ปีรถ",
            Self::EngineNo => "เลขเครื่องยนต์",
            Self::Vin => "VIN",
            Self::Displacement => "ซีซี",
            Self::Seats => "จำนวนที่นั่ง",
            Self::Color => "สีรถ",
            Self::Accessories => "อุปกรณ์ตกแต่ง",
            Self::UseType => "ลักษณะการใช้งาน",
            Self::InsuranceType => "ประเภทประกัน",
            Self::PolicySubType => "ประเภทสมัครใจ",
            Self::CompulsoryCompany => "บริษัทพรบ",
            Self::CompulsoryPremium => "เบี้ยพรบ",
            Self::CompulsoryDiscount => "ส่วนลดพรบ",
            Self::VoluntaryCompany => "บริษัทสมัครใจ",
            Self::VoluntaryPremium => "เบี้ยสมัครใจ",
            Self::VoluntaryDiscount => "ส่วนลดสมัครใจ",
            Self::TotalAmount => "ยอดรวม",
            Self::CompulsoryStart => "พรบ เริ่ม",
            Self::CompulsoryEnd => "พรบ หมด",
            Self::VoluntaryStart => "สมัครใจ เริ่ม",
            Self::VoluntaryEnd => "สมัครใจ หมด",
            Self::PaymentPlan => "การชำระเงิน",
            Self::CreatedAt => "วันที่บันทึก",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::CompulsoryPremium
            | Self::CompulsoryDiscount
            | Self::VoluntaryPremium
            | Self::VoluntaryDiscount
            | Self::TotalAmount => FieldKind::Money,
            Self::CompulsoryStart | Self::CompulsoryEnd | Self::VoluntaryStart | Self::VoluntaryEnd => {
                FieldKind::Date
            }
            Self::CreatedAt => FieldKind::Timestamp,
            _ => FieldKind::Text,
        }
    }

    /// Keys a loosely-typed draft must carry.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::CustomerName
                | Self::Phone
                | Self::Plate
                | Self::Model
                | Self::Year
                | Self::InsuranceType
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        EXPORT_FIELDS.iter().copied().find(|f| f.key() == key)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        EXPORT_FIELDS.iter().copied().find(|f| f.label() == label)
    }
}

/// A single field read off a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Money(f64),
    Date(Option<NaiveDate>),
    Timestamp(DateTime<Utc>),
}

impl PolicyRecord {
    pub fn value(&self, field: Field) -> FieldValue<'_> {
        let customer = self.customer();
        let vehicle = self.vehicle();
        let policy = self.policy();

        match field {
            Field::CustomerName => FieldValue::Text(Cow::Borrowed(&customer.name)),
            Field::MemberTier => FieldValue::Text(Cow::Borrowed(&customer.member_tier)),
            Field::MemberCode => FieldValue::Text(Cow::Borrowed(&customer.member_code)),
            Field::Phone => FieldValue::Text(Cow::Borrowed(&customer.phone)),
            Field::Address => FieldValue::Text(Cow::Borrowed(&customer.address)),
            Field::DocumentAddress => FieldValue::Text(Cow::Borrowed(customer.document_address.as_str())),
            Field::Plate => FieldValue::Text(Cow::Borrowed(&vehicle.plate)),
            Field::Model => FieldValue::Text(Cow::Borrowed(&vehicle.model)),
            Field::Year => FieldValue::Text(Cow::Borrowed(&vehicle.year)),
            Field::EngineNo => FieldValue::Text(Cow::Borrowed(&vehicle.engine_no)),
            Field::Vin => FieldValue::Text(Cow::Borrowed(&vehicle.vin)),
            Field::Displacement => FieldValue::Text(Cow::Borrowed(&vehicle.displacement)),
            Field::Seats => FieldValue::Text(Cow::Borrowed(&vehicle.seats)),
            Field::Color => FieldValue::Text(Cow::Borrowed(&vehicle.color)),
            Field::Accessories => FieldValue::Text(Cow::Borrowed(&vehicle.accessories)),
            Field::UseType => FieldValue::Text(Cow::Borrowed(vehicle.use_type.as_str())),
            Field::InsuranceType => FieldValue::Text(Cow::Borrowed(policy.insurance_type.as_str())),
            Field::PolicySubType => FieldValue::Text(Cow::Borrowed(&policy.sub_type)),
            Field::CompulsoryCompany => FieldValue::Text(Cow::Borrowed(&policy.compulsory.company)),
            Field::CompulsoryPremium => FieldValue::Money(policy.compulsory.premium),
            Field::CompulsoryDiscount => FieldValue::Money(policy.compulsory.discount),
            Field::VoluntaryCompany => FieldValue::Text(Cow::Borrowed(&policy.voluntary.company)),
            Field::VoluntaryPremium => FieldValue::Money(policy.voluntary.premium),
            Field::VoluntaryDiscount => FieldValue::Money(policy.voluntary.discount),
            Field::TotalAmount => FieldValue::Money(self.total_amount()),
            Field::CompulsoryStart => FieldValue::Date(policy.compulsory.start),
            Field::CompulsoryEnd => FieldValue::Date(policy.compulsory.end),
            Field::VoluntaryStart => FieldValue::Date(policy.voluntary.start),
            Field::VoluntaryEnd => FieldValue::Date(policy.voluntary.end),
            Field::PaymentPlan => FieldValue::Text(Cow::Owned(policy.payment_plan.compose())),
            Field::CreatedAt => FieldValue::Timestamp(self.created_at()),
        }
    }
}
