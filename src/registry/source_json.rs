// Reader for snapshots of the hosted record store.

use std::fs;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use voter_rolls::RawRecord;

use crate::registry::{OpeningStoreSnafu, ParsingStoreSnafu, RegResult};

/// One row of the store's voters table. Field names follow the store schema,
/// so a dumped snapshot deserializes directly; columns the engine does not
/// consume are ignored.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: String,
    pub ac_no: Option<String>,
    pub part_no: Option<String>,
    pub slnoinpart: Option<String>,
    pub section_no: Option<String>,
    pub house_number: Option<String>,
    pub applicant_full_name: Option<String>,
    pub applicant_full_name_l1: Option<String>,
    pub applicant_first_name: Option<String>,
    pub applicant_first_name_l1: Option<String>,
    pub applicant_last_name: Option<String>,
    pub applicant_last_name_l1: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub epic_number: Option<String>,
    pub v_address: Option<String>,
    pub v_address_l1: Option<String>,
    pub booth_address: Option<String>,
    pub booth_address_l1: Option<String>,
    pub relation_type: Option<String>,
    pub relation_full_name: Option<String>,
    pub relation_full_name_l1: Option<String>,
}

impl StoreRecord {
    pub fn into_raw(self) -> RawRecord {
        let mut record = RawRecord::new(self.id);
        record.constituency_no = self.ac_no;
        record.part_no = self.part_no;
        record.serial_in_part = self.slnoinpart;
        record.section_no = self.section_no;
        record.house_number = self.house_number;
        record.full_name = self.applicant_full_name;
        record.full_name_alt = self.applicant_full_name_l1;
        record.first_name = self.applicant_first_name;
        record.first_name_alt = self.applicant_first_name_l1;
        record.last_name = self.applicant_last_name;
        record.last_name_alt = self.applicant_last_name_l1;
        record.age = self.age;
        record.gender = self.gender;
        record.epic_number = self.epic_number;
        record.residential_address = self.v_address;
        record.residential_address_alt = self.v_address_l1;
        record.booth_address = self.booth_address;
        record.booth_address_alt = self.booth_address_l1;
        record.relation_type = self.relation_type;
        record.relation_name = self.relation_full_name;
        record.relation_name_alt = self.relation_full_name_l1;
        record
    }
}

/// Single-shot batch read from a store snapshot.
pub fn fetch_records(path: &str, limit: usize) -> RegResult<Vec<RawRecord>> {
    info!("Attempting to read store snapshot {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningStoreSnafu { path })?;
    let rows: Vec<StoreRecord> =
        serde_json::from_str(contents.as_str()).context(ParsingStoreSnafu { path })?;
    let mut records: Vec<RawRecord> = rows.into_iter().map(StoreRecord::into_raw).collect();
    if records.len() > limit {
        debug!(
            "fetch_records: truncating batch of {:?} records to {:?}",
            records.len(),
            limit
        );
        records.truncate(limit);
    }
    Ok(records)
}
