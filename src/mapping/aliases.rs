//! Built-in alias table for the dealership form set.
//!
//! Every alias is already in normalized form (lower-case ASCII letters and
//! digits only). Adding support for a new template means adding rows here.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::keys::*;

pub(crate) const DEFAULT_ALIASES: &[(&str, &str)] = &[
    // Customer identity
    ("firstname", FIRST_NAME),
    ("fname", FIRST_NAME),
    ("givenname", FIRST_NAME),
    ("customerfirstname", FIRST_NAME),
    ("buyerfirstname", FIRST_NAME),
    ("applicantfirstname", FIRST_NAME),
    ("middlename", MIDDLE_NAME),
    ("middleinitial", MIDDLE_NAME),
    ("buyermiddlename", MIDDLE_NAME),
    ("lastname", LAST_NAME),
    ("lname", LAST_NAME),
    ("surname", LAST_NAME),
    ("familyname", LAST_NAME),
    ("customerlastname", LAST_NAME),
    ("buyerlastname", LAST_NAME),
    ("applicantlastname", LAST_NAME),
    ("dob", DATE_OF_BIRTH),
    ("dateofbirth", DATE_OF_BIRTH),
    ("birthdate", DATE_OF_BIRTH),
    ("buyerdob", DATE_OF_BIRTH),
    // Contact
    ("address", ADDRESS),
    ("streetaddress", ADDRESS),
    ("address1", ADDRESS),
    ("customeraddress", ADDRESS),
    ("buyeraddress", ADDRESS),
    ("homeaddress", ADDRESS),
    ("city", CITY),
    ("buyercity", CITY),
    ("state", STATE),
    ("buyerstate", STATE),
    ("zip", ZIP_CODE),
    ("zipcode", ZIP_CODE),
    ("postalcode", ZIP_CODE),
    ("buyerzip", ZIP_CODE),
    ("phone", PHONE),
    ("phonenumber", PHONE),
    ("cellphone", PHONE),
    ("homephone", PHONE),
    ("buyerphone", PHONE),
    ("email", EMAIL),
    ("emailaddress", EMAIL),
    ("buyeremail", EMAIL),
    // Driver's license
    ("dl", LICENSE_NUMBER),
    ("dlnumber", LICENSE_NUMBER),
    ("licensenumber", LICENSE_NUMBER),
    ("licenseno", LICENSE_NUMBER),
    ("driverslicense", LICENSE_NUMBER),
    ("driverslicensenumber", LICENSE_NUMBER),
    ("driverlicensenumber", LICENSE_NUMBER),
    ("dlstate", LICENSE_STATE),
    ("licensestate", LICENSE_STATE),
    ("driverslicensestate", LICENSE_STATE),
    ("dlexp", LICENSE_EXPIRATION),
    ("dlexpiration", LICENSE_EXPIRATION),
    ("licenseexpiration", LICENSE_EXPIRATION),
    ("licenseexpirationdate", LICENSE_EXPIRATION),
    ("expirationdate", LICENSE_EXPIRATION),
    // Vehicle being purchased
    ("vin", NEW_CAR_VIN),
    ("vehiclevin", NEW_CAR_VIN),
    ("newcarvin", NEW_CAR_VIN),
    ("newvehiclevin", NEW_CAR_VIN),
    ("year", NEW_CAR_YEAR),
    ("vehicleyear", NEW_CAR_YEAR),
    ("newcaryear", NEW_CAR_YEAR),
    ("make", NEW_CAR_MAKE),
    ("vehiclemake", NEW_CAR_MAKE),
    ("newcarmake", NEW_CAR_MAKE),
    ("model", NEW_CAR_MODEL),
    ("vehiclemodel", NEW_CAR_MODEL),
    ("newcarmodel", NEW_CAR_MODEL),
    ("odometer", NEW_CAR_ODOMETER),
    ("mileage", NEW_CAR_ODOMETER),
    ("odometerreading", NEW_CAR_ODOMETER),
    ("newcarodometer", NEW_CAR_ODOMETER),
    ("newcarmileage", NEW_CAR_ODOMETER),
    // Trade-in
    ("tradevin", TRADE_IN_VIN),
    ("tradeinvin", TRADE_IN_VIN),
    ("tradeyear", TRADE_IN_YEAR),
    ("tradeinyear", TRADE_IN_YEAR),
    ("trademake", TRADE_IN_MAKE),
    ("tradeinmake", TRADE_IN_MAKE),
    ("trademodel", TRADE_IN_MODEL),
    ("tradeinmodel", TRADE_IN_MODEL),
    ("tradeodometer", TRADE_IN_ODOMETER),
    ("tradeinodometer", TRADE_IN_ODOMETER),
    ("trademileage", TRADE_IN_ODOMETER),
    ("tradeinmileage", TRADE_IN_ODOMETER),
    // Insurance
    ("insurance", INSURANCE_COMPANY),
    ("insurer", INSURANCE_COMPANY),
    ("insurancecompany", INSURANCE_COMPANY),
    ("insurancecarrier", INSURANCE_COMPANY),
    ("insuranceprovider", INSURANCE_COMPANY),
    ("policy", POLICY_NUMBER),
    ("policynumber", POLICY_NUMBER),
    ("policyno", POLICY_NUMBER),
    ("insurancepolicynumber", POLICY_NUMBER),
    ("policyexpiration", INSURANCE_EXPIRATION),
    ("insuranceexpiration", INSURANCE_EXPIRATION),
    ("policyexpirationdate", INSURANCE_EXPIRATION),
    ("agent", AGENT_NAME),
    ("agentname", AGENT_NAME),
    ("insuranceagent", AGENT_NAME),
    ("agentphone", AGENT_PHONE),
    ("insuranceagentphone", AGENT_PHONE),
    // Dates
    ("date", DATE),
    ("currentdate", CURRENT_DATE),
    ("todaysdate", TODAY_DATE),
    ("todaydate", TODAY_DATE),
    ("datesigned", CURRENT_DATE),
    ("signaturedate", CURRENT_DATE),
    ("saledate", CURRENT_DATE),
];

lazy_static! {
    pub(crate) static ref DEFAULT_ALIAS_MAP: HashMap<&'static str, &'static str> =
        DEFAULT_ALIASES.iter().copied().collect();
}
