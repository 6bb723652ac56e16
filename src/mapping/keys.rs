//! Canonical data keys shared by extraction output, templates and fallbacks.

pub const FIRST_NAME: &str = "firstName";
pub const MIDDLE_NAME: &str = "middleName";
pub const LAST_NAME: &str = "lastName";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";
pub const ADDRESS: &str = "address";
pub const CITY: &str = "city";
pub const STATE: &str = "state";
pub const ZIP_CODE: &str = "zipCode";
pub const PHONE: &str = "phone";
pub const EMAIL: &str = "email";

pub const LICENSE_NUMBER: &str = "licenseNumber";
pub const LICENSE_STATE: &str = "licenseState";
pub const LICENSE_EXPIRATION: &str = "licenseExpiration";

pub const NEW_CAR_VIN: &str = "newCarVin";
pub const NEW_CAR_YEAR: &str = "newCarYear";
pub const NEW_CAR_MAKE: &str = "newCarMake";
pub const NEW_CAR_MODEL: &str = "newCarModel";
pub const NEW_CAR_ODOMETER: &str = "newCarOdometer";

pub const TRADE_IN_VIN: &str = "tradeInVin";
pub const TRADE_IN_YEAR: &str = "tradeInYear";
pub const TRADE_IN_MAKE: &str = "tradeInMake";
pub const TRADE_IN_MODEL: &str = "tradeInModel";
pub const TRADE_IN_ODOMETER: &str = "tradeInOdometer";

pub const INSURANCE_COMPANY: &str = "insuranceCompany";
pub const POLICY_NUMBER: &str = "policyNumber";
pub const INSURANCE_EXPIRATION: &str = "insuranceExpiration";
pub const AGENT_NAME: &str = "agentName";
pub const AGENT_PHONE: &str = "agentPhone";

pub const CURRENT_DATE: &str = "currentDate";
pub const TODAY_DATE: &str = "todayDate";
pub const DATE: &str = "date";

/// Keys that receive today's date before a fill.
pub const CURRENT_DATE_KEYS: [&str; 3] = [CURRENT_DATE, TODAY_DATE, DATE];
