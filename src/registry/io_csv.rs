// Primitives for reading CSV roll extracts.

use std::collections::HashMap;

use log::debug;
use snafu::prelude::*;
use voter_rolls::RawRecord;

use crate::registry::io_common::{make_default_id, record_from_fields};
use crate::registry::{CsvLineParseSnafu, CsvOpenSnafu, RegResult};

pub fn read_csv_rolls(path: &str) -> RegResult<Vec<RawRecord>> {
    let default_id = make_default_id(path);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu {})?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    debug!("read_csv_rolls: headers: {:?}", headers);

    let mut res: Vec<RawRecord> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // Row 1 holds the headers, so data starts at line 2.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(line.iter().map(|cell| cell.to_string()))
            .collect();
        res.push(record_from_fields(&fields, || default_id(lineno)));
    }
    Ok(res)
}
