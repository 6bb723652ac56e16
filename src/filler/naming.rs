//! Output filenames.

use chrono::NaiveDate;

use crate::models::DataRecord;

const PACKET_PREFIX: &str = "Deal_Packet";
const ANONYMOUS_CUSTOMER: &str = "Customer";

/// `<Title>_<Given>_<Family>_<YYYYMMDD>.pdf`, or `<Title>_<YYYYMMDD>.pdf`
/// unless both names are known.
pub fn document_filename(title: &str, data: &DataRecord, date: NaiveDate) -> String {
    let title = filename_component(title, "Document");
    let stamp = date.format("%Y%m%d");
    match customer_names(data) {
        Some((given, family)) => format!("{}_{}_{}_{}.pdf", title, given, family, stamp),
        None => format!("{}_{}.pdf", title, stamp),
    }
}

/// `Deal_Packet_<Given>_<Family>_<YYYYMMDD>.pdf`; `Customer` stands in for
/// missing names.
pub fn packet_filename(data: &DataRecord, date: NaiveDate) -> String {
    let stamp = date.format("%Y%m%d");
    match customer_names(data) {
        Some((given, family)) => format!("{}_{}_{}_{}.pdf", PACKET_PREFIX, given, family, stamp),
        None => format!("{}_{}_{}.pdf", PACKET_PREFIX, ANONYMOUS_CUSTOMER, stamp),
    }
}

fn customer_names(data: &DataRecord) -> Option<(String, String)> {
    let given = filename_component(data.given_name()?, "");
    let family = filename_component(data.family_name()?, "");
    (!given.is_empty() && !family.is_empty()).then_some((given, family))
}

/// Keep letters and digits, collapse every other run into one `_`.
pub fn filename_component(value: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut pending_separator = false;

    for ch in value.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            pending_separator = false;
        } else {
            pending_separator = true;
        }
    }

    if result.is_empty() {
        fallback.to_string()
    } else {
        result
    }
}
