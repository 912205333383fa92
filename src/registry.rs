use log::{info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;
use voter_rolls::*;

use crate::args::Args;
use crate::registry::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod source_json;

#[derive(Debug, Snafu)]
pub enum RegError {
    #[snafu(display("Error opening store snapshot {path}"))]
    OpeningStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing store snapshot {path}"))]
    ParsingStore {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display(""))]
    EmptyExcel {},
    #[snafu(display("Missing worksheet {name}"))]
    MissingWorksheet { name: String },
    #[snafu(display(""))]
    CsvOpen { source: csv::Error },
    #[snafu(display("CSV parse error at line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display(""))]
    OpeningJson { source: std::io::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display(""))]
    WritingSummary { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RegResult<T> = Result<T, RegError>;

pub const DEFAULT_FETCH_LIMIT: usize = 50_000;

/// The report kinds, one per screen of the original front end.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReportKind {
    Search,
    NameWise,
    AgeWise,
    BoothWise,
    AddressWise,
    GenderWise,
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Search => "search",
            ReportKind::NameWise => "nameWise",
            ReportKind::AgeWise => "ageWise",
            ReportKind::BoothWise => "boothWise",
            ReportKind::AddressWise => "addressWise",
            ReportKind::GenderWise => "genderWise",
        }
    }

    fn default_sort(&self) -> SortMode {
        match self {
            ReportKind::NameWise => SortMode::Alphabetical,
            _ => SortMode::Insertion,
        }
    }
}

fn validate_report_kind(s: &str) -> RegResult<ReportKind> {
    match s {
        "search" => Ok(ReportKind::Search),
        "nameWise" => Ok(ReportKind::NameWise),
        "ageWise" => Ok(ReportKind::AgeWise),
        "boothWise" => Ok(ReportKind::BoothWise),
        "addressWise" => Ok(ReportKind::AddressWise),
        "genderWise" => Ok(ReportKind::GenderWise),
        x => whatever!("Unknown report kind {:?}", x),
    }
}

fn validate_sort(s: &str) -> RegResult<SortMode> {
    match s {
        "insertion" => Ok(SortMode::Insertion),
        "alphabetical" => Ok(SortMode::Alphabetical),
        x => whatever!("Unknown sort mode {:?}", x),
    }
}

fn validate_tie_break(s: &str) -> RegResult<TieBreak> {
    match s {
        "firstSeen" => Ok(TieBreak::FirstSeen),
        "lexicographic" => Ok(TieBreak::Lexicographic),
        x => whatever!("Unknown tie break {:?}", x),
    }
}

fn validate_provider(s: &str) -> RegResult<String> {
    match s {
        "json" | "csv" | "xlsx" => Ok(s.to_string()),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn infer_provider(path: &str) -> String {
    let lowered = path.to_lowercase();
    if lowered.ends_with(".csv") {
        "csv".to_string()
    } else if lowered.ends_with(".xlsx") {
        "xlsx".to_string()
    } else {
        "json".to_string()
    }
}

/// The fully resolved options for one report run, merged from the
/// configuration file and the command line (flags win).
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub provider: String,
    pub input_path: String,
    pub worksheet: Option<String>,
    pub limit: usize,
    pub kind: ReportKind,
    pub query: Option<String>,
    pub booth: Option<String>,
    pub gender: Option<String>,
    pub age_band: Option<String>,
    pub sort_mode: SortMode,
    pub tie_break: TieBreak,
    pub title: Option<String>,
    pub output_path: Option<String>,
    pub reference: Option<String>,
}

impl ReportOptions {
    pub fn assemble(config: Option<&ReportConfig>, args: &Args) -> RegResult<ReportOptions> {
        let source = config.map(|c| &c.source);
        let report = config.map(|c| &c.report);
        let output = config.and_then(|c| c.output.as_ref());

        let input_path = match args
            .input
            .clone()
            .or_else(|| source.map(|s| s.file_path.clone()))
        {
            Some(p) => p,
            None => whatever!("No input given: use --input or a configuration file"),
        };

        let provider = match args
            .input_type
            .clone()
            .or_else(|| source.map(|s| s.provider.clone()))
        {
            Some(p) => validate_provider(&p)?,
            None => infer_provider(&input_path),
        };

        let kind_name = args
            .report
            .clone()
            .or_else(|| report.map(|r| r.kind.clone()))
            .unwrap_or_else(|| "search".to_string());
        let kind = validate_report_kind(&kind_name)?;

        let sort_mode = match args
            .sort
            .clone()
            .or_else(|| report.and_then(|r| r.sort.clone()))
        {
            Some(s) => validate_sort(&s)?,
            None => kind.default_sort(),
        };

        let tie_break = match report.and_then(|r| r.tie_break.clone()) {
            Some(s) => validate_tie_break(&s)?,
            None => TieBreak::FirstSeen,
        };

        Ok(ReportOptions {
            provider,
            input_path,
            worksheet: args
                .excel_worksheet_name
                .clone()
                .or_else(|| source.and_then(|s| s.excel_worksheet_name.clone())),
            limit: args
                .limit
                .or_else(|| source.and_then(|s| s.limit))
                .unwrap_or(DEFAULT_FETCH_LIMIT),
            kind,
            query: args
                .query
                .clone()
                .or_else(|| report.and_then(|r| r.query.clone())),
            booth: args
                .booth
                .clone()
                .or_else(|| report.and_then(|r| r.booth.clone())),
            gender: args
                .gender
                .clone()
                .or_else(|| report.and_then(|r| r.gender.clone())),
            age_band: args
                .age
                .clone()
                .or_else(|| report.and_then(|r| r.age_range.clone())),
            sort_mode,
            tie_break,
            title: output.and_then(|o| o.report_title.clone()),
            output_path: args
                .out
                .clone()
                .or_else(|| output.and_then(|o| o.output_path.clone())),
            reference: args.reference.clone(),
        })
    }

    /// Translates the resolved options into engine rules.
    pub fn view_rules(&self) -> ViewRules {
        let mut filter = FilterSpec {
            text: self.query.clone(),
            ..FilterSpec::EMPTY
        };

        let booth_clause = self
            .booth
            .as_deref()
            .filter(|b| !b.is_empty() && *b != ALL_SENTINEL);
        let gender_clause = self
            .gender
            .as_deref()
            .filter(|g| !g.is_empty() && *g != ALL_SENTINEL);
        filter.categorical = match (booth_clause, gender_clause) {
            (Some(b), g) => {
                if g.is_some() {
                    warn!("view_rules: both booth and gender selectors given, keeping booth");
                }
                Some(CategoricalFilter {
                    field: CategoricalField::BoothKey,
                    value: b.to_string(),
                })
            }
            (None, Some(g)) => Some(CategoricalFilter {
                field: CategoricalField::Gender,
                value: g.to_string(),
            }),
            (None, None) => None,
        };

        if let Some(band) = self.age_band.as_deref().filter(|b| !b.trim().is_empty()) {
            match AgeRange::parse(band) {
                Some(range) => filter.age_range = Some(range),
                // A bad band disables the clause, it never fails the run.
                None => warn!("view_rules: ignoring malformed age band {:?}", band),
            }
        }

        let grouping = match self.kind {
            ReportKind::BoothWise => Some(Grouping {
                key: GroupKey::Booth,
                tie_break: self.tie_break,
            }),
            ReportKind::AddressWise => Some(Grouping {
                key: GroupKey::Address,
                tie_break: self.tie_break,
            }),
            ReportKind::GenderWise => Some(Grouping {
                key: GroupKey::Gender,
                tie_break: self.tie_break,
            }),
            _ => None,
        };

        ViewRules {
            filter,
            grouping,
            sort_mode: self.sort_mode,
        }
    }
}

fn fetch_batch(opts: &ReportOptions) -> RegResult<Vec<RawRecord>> {
    info!(
        "Attempting to read roll extract {:?} (provider {:?})",
        opts.input_path, opts.provider
    );
    let mut batch = match opts.provider.as_str() {
        "json" => source_json::fetch_records(&opts.input_path, opts.limit)?,
        "csv" => io_csv::read_csv_rolls(&opts.input_path)?,
        "xlsx" => io_xlsx::read_excel_rolls(&opts.input_path, opts.worksheet.as_deref())?,
        x => whatever!("Provider not implemented {:?}", x),
    };
    if batch.len() > opts.limit {
        batch.truncate(opts.limit);
    }
    Ok(batch)
}

fn view_to_json(view: &RegistryView) -> Vec<JSValue> {
    match view {
        RegistryView::Groups(groups) => groups
            .iter()
            .map(|g| {
                json!({
                    "key": g.key,
                    "address": g.representative_address,
                    "count": g.count.to_string()
                })
            })
            .collect(),
        RegistryView::Records(records) => records
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "name": r.display_name,
                    "age": r.age.map(|a| a.to_string()).unwrap_or_default(),
                    "gender": r.gender,
                    "booth": r.booth_key,
                    "address": r.address,
                    "cardNumber": r.card_number
                })
            })
            .collect(),
    }
}

fn build_summary_js(opts: &ReportOptions, view: &RegistryView) -> JSValue {
    json!({
        "config": {
            "report": opts.kind.name(),
            "title": opts.title.clone().unwrap_or_default(),
        },
        "total": view.len(),
        "results": view_to_json(view)
    })
}

pub fn read_summary(path: &str) -> RegResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_report(args: &Args) -> RegResult<()> {
    let config: Option<ReportConfig> = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };
    let opts = ReportOptions::assemble(config.as_ref(), args)?;
    info!("Resolved report options: {:?}", opts);

    // The fetch is the only boundary allowed to fail. A failure is converted
    // once, here, into an empty batch and a notice; the transforms downstream
    // never see it.
    let batch = match fetch_batch(&opts) {
        Ok(batch) => batch,
        Err(e) => {
            warn!("Record source unavailable: {}", e);
            eprintln!("Record source unavailable ({}). Continuing with an empty batch.", e);
            Vec::new()
        }
    };

    let view = run_registry_view(&batch, &opts.view_rules());
    let summary = build_summary_js(&opts, &view);
    let pretty_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match opts.output_path.as_deref() {
        Some(path) if path != "stdout" => {
            fs::write(path, &pretty_summary).context(WritingSummarySnafu {})?;
            info!("Summary written to {:?}", path);
        }
        _ => println!("{}", pretty_summary),
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &opts.reference {
        let summary_ref = read_summary(reference_path)?;
        let pretty_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_summary_ref != pretty_summary {
            warn!("Found differences with the reference summary");
            print_diff(pretty_summary_ref.as_str(), pretty_summary.as_ref(), "\n");
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}
