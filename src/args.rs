use clap::Parser;

/// This is a reporting and search program for electoral roll extracts.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration describing the source, the report and the
    /// output. Command-line flags override the corresponding configuration entries.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The roll extract to read.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (json, csv or xlsx) The provider of the input. If not specified, it is inferred from the
    /// file extension and defaults to json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default search) The report to run: search, nameWise, ageWise, boothWise, addressWise
    /// or genderWise.
    #[clap(long, value_parser)]
    pub report: Option<String>,

    /// Free-text query, matched case-insensitively against the name, address, card number and
    /// booth key of every record.
    #[clap(short, long, value_parser)]
    pub query: Option<String>,

    /// Booth selector such as 12-7, or 'all' to disable the clause.
    #[clap(long, value_parser)]
    pub booth: Option<String>,

    /// Gender selector, or 'all' to disable the clause.
    #[clap(long, value_parser)]
    pub gender: Option<String>,

    /// Inclusive age band in min-max notation, such as 18-25. A malformed band is ignored with
    /// a warning.
    #[clap(long, value_parser)]
    pub age: Option<String>,

    /// (insertion or alphabetical) Ordering of record reports. Grouped reports are always
    /// ordered by descending count.
    #[clap(long, value_parser)]
    pub sort: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the report summary will be written in JSON
    /// format to the given location. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a report summary in JSON format. If provided,
    /// votereg will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 50000) Maximum number of records read from the source.
    #[clap(long, value_parser)]
    pub limit: Option<usize>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first
    /// worksheet is used if not specified.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
