use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;

use crate::registry::{OpeningJsonSnafu, ParsingJsonSnafu, RegResult};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub kind: String,
    pub query: Option<String>,
    pub booth: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "ageRange")]
    pub age_range: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "tieBreak")]
    pub tie_break: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "reportTitle")]
    pub report_title: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub source: SourceSettings,
    pub report: ReportSettings,
    pub output: Option<OutputSettings>,
}

pub fn read_config(path: &str) -> RegResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}
