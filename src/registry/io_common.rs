// Shared primitives for the import readers.
//
// All providers funnel through `record_from_fields`, which maps the fixed
// import header keys onto the raw record. This keeps imported and fetched
// data aligned field-for-field, so both normalize identically.

use std::collections::HashMap;

use voter_rolls::RawRecord;

pub fn record_from_fields(
    fields: &HashMap<String, String>,
    default_id: impl FnOnce() -> String,
) -> RawRecord {
    let field = |key: &str| fields.get(key).and_then(|v| non_empty(v));

    let mut record = RawRecord::new(field("id").unwrap_or_else(default_id));
    record.constituency_no = field("ac_no");
    record.part_no = field("part_no");
    record.serial_in_part = field("slnoinpart");
    record.section_no = field("section_no");
    record.house_number = field("house_number");
    record.full_name = field("applicant_full_name");
    record.full_name_alt = field("applicant_full_name_l1");
    record.first_name = field("applicant_first_name");
    record.first_name_alt = field("applicant_first_name_l1");
    record.last_name = field("applicant_last_name");
    record.last_name_alt = field("applicant_last_name_l1");
    record.age = fields.get("age").and_then(|v| parse_age(v));
    record.gender = field("gender");
    record.epic_number = field("epic_number");
    record.residential_address = field("v_address");
    record.residential_address_alt = field("v_address_l1");
    record.booth_address = field("booth_address");
    record.booth_address_alt = field("booth_address_l1");
    record.relation_type = field("relation_type");
    record.relation_name = field("relation_full_name");
    record.relation_name_alt = field("relation_full_name_l1");
    record
}

pub fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// Ages come in as "45" from CSV and as "45.0" from spreadsheet cells.
// Anything else is treated as absent.
pub fn parse_age(s: &str) -> Option<u32> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(age) = trimmed.parse::<u32>() {
        return Some(age);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as u32)
}

pub fn simplify_file_name(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Fallback ids for rows without an id column.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}
