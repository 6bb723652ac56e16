//! Known templates, their display titles and the fields each category expects.
//!
//! The per-category field tables drive the synthetic fallback document when a
//! template's PDF is not available.

use serde::Serialize;
use utoipa::ToSchema;

use crate::mapping::keys::*;

/// Ordered `(canonical key, printed label)` pairs.
pub type FieldTable = &'static [(&'static str, &'static str)];

const CUSTOMER_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (LAST_NAME, "Last Name"),
    (ADDRESS, "Address"),
    (CITY, "City"),
    (STATE, "State"),
    (ZIP_CODE, "ZIP Code"),
];

const CREDIT_APPLICATION_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (MIDDLE_NAME, "Middle Name"),
    (LAST_NAME, "Last Name"),
    (DATE_OF_BIRTH, "Date of Birth"),
    (ADDRESS, "Address"),
    (CITY, "City"),
    (STATE, "State"),
    (ZIP_CODE, "ZIP Code"),
    (PHONE, "Phone"),
    (EMAIL, "Email"),
    (LICENSE_NUMBER, "Driver's License Number"),
    (LICENSE_STATE, "License State"),
    (LICENSE_EXPIRATION, "License Expiration"),
    (CURRENT_DATE, "Date"),
];

const BUYERS_ORDER_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (LAST_NAME, "Last Name"),
    (ADDRESS, "Address"),
    (PHONE, "Phone"),
    (NEW_CAR_YEAR, "Vehicle Year"),
    (NEW_CAR_MAKE, "Vehicle Make"),
    (NEW_CAR_MODEL, "Vehicle Model"),
    (NEW_CAR_VIN, "Vehicle VIN"),
    (NEW_CAR_ODOMETER, "Odometer"),
    (TRADE_IN_YEAR, "Trade-In Year"),
    (TRADE_IN_MAKE, "Trade-In Make"),
    (TRADE_IN_MODEL, "Trade-In Model"),
    (TRADE_IN_VIN, "Trade-In VIN"),
    (TRADE_IN_ODOMETER, "Trade-In Odometer"),
    (CURRENT_DATE, "Date"),
];

const ODOMETER_DISCLOSURE_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (LAST_NAME, "Last Name"),
    (ADDRESS, "Address"),
    (NEW_CAR_YEAR, "Vehicle Year"),
    (NEW_CAR_MAKE, "Vehicle Make"),
    (NEW_CAR_MODEL, "Vehicle Model"),
    (NEW_CAR_VIN, "Vehicle VIN"),
    (NEW_CAR_ODOMETER, "Odometer Reading"),
    (CURRENT_DATE, "Date"),
];

const INSURANCE_VERIFICATION_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (LAST_NAME, "Last Name"),
    (INSURANCE_COMPANY, "Insurance Company"),
    (POLICY_NUMBER, "Policy Number"),
    (INSURANCE_EXPIRATION, "Policy Expiration"),
    (AGENT_NAME, "Agent Name"),
    (AGENT_PHONE, "Agent Phone"),
    (NEW_CAR_VIN, "Vehicle VIN"),
    (CURRENT_DATE, "Date"),
];

const TRADE_IN_APPRAISAL_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (LAST_NAME, "Last Name"),
    (TRADE_IN_YEAR, "Trade-In Year"),
    (TRADE_IN_MAKE, "Trade-In Make"),
    (TRADE_IN_MODEL, "Trade-In Model"),
    (TRADE_IN_VIN, "Trade-In VIN"),
    (TRADE_IN_ODOMETER, "Trade-In Odometer"),
    (CURRENT_DATE, "Date"),
];

const TITLE_APPLICATION_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (MIDDLE_NAME, "Middle Name"),
    (LAST_NAME, "Last Name"),
    (ADDRESS, "Address"),
    (CITY, "City"),
    (STATE, "State"),
    (ZIP_CODE, "ZIP Code"),
    (LICENSE_NUMBER, "Driver's License Number"),
    (NEW_CAR_YEAR, "Vehicle Year"),
    (NEW_CAR_MAKE, "Vehicle Make"),
    (NEW_CAR_MODEL, "Vehicle Model"),
    (NEW_CAR_VIN, "Vehicle VIN"),
    (NEW_CAR_ODOMETER, "Odometer"),
    (INSURANCE_COMPANY, "Insurance Company"),
    (POLICY_NUMBER, "Policy Number"),
    (CURRENT_DATE, "Date"),
];

const GENERIC_FIELDS: FieldTable = &[
    (FIRST_NAME, "First Name"),
    (LAST_NAME, "Last Name"),
    (ADDRESS, "Address"),
    (CITY, "City"),
    (STATE, "State"),
    (ZIP_CODE, "ZIP Code"),
    (PHONE, "Phone"),
    (LICENSE_NUMBER, "Driver's License Number"),
    (LICENSE_EXPIRATION, "License Expiration"),
    (NEW_CAR_VIN, "Vehicle VIN"),
    (NEW_CAR_ODOMETER, "Odometer"),
    (TRADE_IN_YEAR, "Trade-In Year"),
    (TRADE_IN_MAKE, "Trade-In Make"),
    (TRADE_IN_MODEL, "Trade-In Model"),
    (TRADE_IN_ODOMETER, "Trade-In Odometer"),
    (INSURANCE_COMPANY, "Insurance Company"),
    (POLICY_NUMBER, "Policy Number"),
    (CURRENT_DATE, "Date"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    CustomerInformation,
    CreditApplication,
    BuyersOrder,
    OdometerDisclosure,
    InsuranceVerification,
    TradeInAppraisal,
    TitleApplication,
    Generic,
}

impl TemplateCategory {
    pub fn fields(&self) -> FieldTable {
        match self {
            Self::CustomerInformation => CUSTOMER_FIELDS,
            Self::CreditApplication => CREDIT_APPLICATION_FIELDS,
            Self::BuyersOrder => BUYERS_ORDER_FIELDS,
            Self::OdometerDisclosure => ODOMETER_DISCLOSURE_FIELDS,
            Self::InsuranceVerification => INSURANCE_VERIFICATION_FIELDS,
            Self::TradeInAppraisal => TRADE_IN_APPRAISAL_FIELDS,
            Self::TitleApplication => TITLE_APPLICATION_FIELDS,
            Self::Generic => GENERIC_FIELDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateDescriptor {
    pub id: String,
    pub title: String,
    pub category: TemplateCategory,
}

impl TemplateDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: TemplateCategory) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<TemplateDescriptor>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<TemplateDescriptor>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    pub fn find(&self, template_id: &str) -> Option<&TemplateDescriptor> {
        self.templates.iter().find(|t| t.id == template_id)
    }

    /// Descriptor for `template_id`; unknown ids get a title derived from the
    /// id and the generic field table.
    pub fn describe(&self, template_id: &str) -> TemplateDescriptor {
        self.find(template_id).cloned().unwrap_or_else(|| {
            TemplateDescriptor::new(
                template_id,
                title_from_id(template_id),
                TemplateCategory::Generic,
            )
        })
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        use TemplateCategory::*;
        Self::new(vec![
            TemplateDescriptor::new("customer-information", "Customer Information", CustomerInformation),
            TemplateDescriptor::new("credit-application", "Credit Application", CreditApplication),
            TemplateDescriptor::new("buyers-order", "Buyers Order", BuyersOrder),
            TemplateDescriptor::new("odometer-disclosure", "Odometer Disclosure", OdometerDisclosure),
            TemplateDescriptor::new(
                "insurance-verification",
                "Insurance Verification",
                InsuranceVerification,
            ),
            TemplateDescriptor::new("trade-in-appraisal", "Trade In Appraisal", TradeInAppraisal),
            TemplateDescriptor::new("title-application", "Title Application", TitleApplication),
        ])
    }
}

/// `trade-in_form` -> `Trade In Form`.
pub fn title_from_id(template_id: &str) -> String {
    let words: Vec<String> = template_id
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "Document".to_string()
    } else {
        words.join(" ")
    }
}
