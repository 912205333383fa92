// Primitives for reading Excel roll extracts.

use std::collections::HashMap;

use calamine::{open_workbook, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;
use voter_rolls::RawRecord;

use crate::registry::io_common::{make_default_id, record_from_fields};
use crate::registry::{EmptyExcelSnafu, MissingWorksheetSnafu, OpeningExcelSnafu, RegResult};

pub fn read_excel_rolls(path: &str, worksheet: Option<&str>) -> RegResult<Vec<RawRecord>> {
    let default_id = make_default_id(path);

    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu {})?;
    let headers: Vec<String> = header
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_lowercase())
        .collect();
    debug!("read_excel_rolls: headers: {:?}", headers);

    let mut res: Vec<RawRecord> = Vec::new();
    for (idx, row) in rows.enumerate() {
        // Row 1 holds the headers, so data starts at line 2.
        let lineno = idx + 2;
        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(row.iter().map(cell_to_string))
            .collect();
        res.push(record_from_fields(&fields, || default_id(lineno)));
    }
    Ok(res)
}

// Numeric cells render without a trailing ".0" so that part and constituency
// numbers read back as the same strings the CSV input produces.
fn cell_to_string(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.clone(),
        calamine::DataType::Int(i) => i.to_string(),
        calamine::DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        calamine::DataType::Float(f) => f.to_string(),
        calamine::DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_lose_the_float_suffix() {
        assert_eq!(cell_to_string(&calamine::DataType::Float(45.0)), "45");
        assert_eq!(cell_to_string(&calamine::DataType::Float(4.5)), "4.5");
        assert_eq!(cell_to_string(&calamine::DataType::Int(7)), "7");
        assert_eq!(cell_to_string(&calamine::DataType::Empty), "");
    }

    #[test]
    fn a_missing_file_is_an_error() {
        assert!(read_excel_rolls("/nonexistent/rolls.xlsx", None).is_err());
    }
}
