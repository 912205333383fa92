// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One roll record as handed over by the record store or an import reader.
///
/// Every field except `id` may be absent: the rolls are aggregated from
/// heterogeneous sources and any attribute can be missing for any record.
/// The engine never fails on absence, it substitutes explicit empty values
/// during normalization.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawRecord {
    /// Unique within a batch.
    pub id: String,
    pub full_name: Option<String>,
    /// Second script variant of the full name (usually the local script).
    pub full_name_alt: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub first_name_alt: Option<String>,
    pub last_name_alt: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub constituency_no: Option<String>,
    pub part_no: Option<String>,
    pub section_no: Option<String>,
    pub serial_in_part: Option<String>,
    pub house_number: Option<String>,
    pub residential_address: Option<String>,
    pub residential_address_alt: Option<String>,
    pub booth_address: Option<String>,
    pub booth_address_alt: Option<String>,
    pub epic_number: Option<String>,
    // Relation fields are carried for family linkage but never interpreted.
    pub relation_type: Option<String>,
    pub relation_name: Option<String>,
    pub relation_name_alt: Option<String>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> RawRecord {
        RawRecord {
            id: id.into(),
            ..RawRecord::default()
        }
    }
}

// ******** Output data structures *********

/// The normalized, display-ready projection of one roll record.
///
/// Built once per batch by the normalizer and never mutated afterwards.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CanonicalRecord {
    pub id: String,
    /// First non-blank of: full name, alternate full name, "first last",
    /// or the literal "Unknown".
    pub display_name: String,
    pub age: Option<u32>,
    pub gender: String,
    /// `"{constituency}-{part}"`, separator kept even when both sides are
    /// empty so that unknown-booth records share one key.
    pub booth_key: String,
    pub address: String,
    pub card_number: String,
}

/// An aggregate over the records sharing one grouping key.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupSummary {
    pub key: String,
    /// First non-empty address seen among the members of this key.
    pub representative_address: String,
    pub count: u64,
}

/// The outcome of a view computation, handed to the presentation layer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RegistryView {
    Records(Vec<CanonicalRecord>),
    Groups(Vec<GroupSummary>),
}

impl RegistryView {
    pub fn len(&self) -> usize {
        match self {
            RegistryView::Records(rs) => rs.len(),
            RegistryView::Groups(gs) => gs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors surfaced by the batch builder.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RegistryErrors {
    /// A record id occured twice within one batch.
    DuplicateRecordId(String),
}

impl Error for RegistryErrors {}

impl Display for RegistryErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryErrors::DuplicateRecordId(id) => {
                write!(f, "duplicate record id in batch: {}", id)
            }
        }
    }
}

// ********* Configuration **********

/// The categorical value that disables a categorical clause instead of being
/// matched against the data.
pub const ALL_SENTINEL: &str = "all";

/// The fields a categorical (exact equality) clause can target.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CategoricalField {
    Gender,
    BoothKey,
    Address,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoricalFilter {
    pub field: CategoricalField,
    pub value: String,
}

/// Inclusive age band. Records with an unknown age never satisfy a band.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    /// Parses the `"18-25"` notation used by the selection widgets.
    ///
    /// Parsing is defensive: anything that is not two non-negative integers
    /// around a dash yields `None`, which disables the clause.
    pub fn parse(s: &str) -> Option<AgeRange> {
        let (lo, hi) = s.trim().split_once('-')?;
        let min = lo.trim().parse::<u32>().ok()?;
        let max = hi.trim().parse::<u32>().ok()?;
        if min > max {
            return None;
        }
        Some(AgeRange { min, max })
    }

    pub fn contains(&self, age: u32) -> bool {
        self.min <= age && age <= self.max
    }
}

/// A compound filter. All present clauses must match (logical AND); absent
/// clauses pass everything.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FilterSpec {
    /// Case-insensitive substring, OR-combined over name, address, card
    /// number and booth key.
    pub text: Option<String>,
    pub categorical: Option<CategoricalFilter>,
    pub age_range: Option<AgeRange>,
}

impl FilterSpec {
    pub const EMPTY: FilterSpec = FilterSpec {
        text: None,
        categorical: None,
        age_range: None,
    };
}

/// The composite keys the grouping reports are built on.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum GroupKey {
    /// `"{constituency}-{part}"`, one key per polling booth.
    Booth,
    /// The normalized residential address.
    Address,
    /// The gender attribute, for the distribution dashboard.
    Gender,
}

impl GroupKey {
    pub fn key_of(&self, record: &CanonicalRecord) -> String {
        match self {
            GroupKey::Booth => record.booth_key.clone(),
            GroupKey::Address => record.address.clone(),
            GroupKey::Gender => record.gender.clone(),
        }
    }
}

/// How groups with equal counts are ordered.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreak {
    /// Keys keep the relative position of their first encounter in the input.
    FirstSeen,
    /// Keys are ordered by ascending lexicographic comparison.
    Lexicographic,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Grouping {
    pub key: GroupKey,
    pub tie_break: TieBreak,
}

impl Grouping {
    pub fn by(key: GroupKey) -> Grouping {
        Grouping {
            key,
            tie_break: TieBreak::FirstSeen,
        }
    }
}

/// Final ordering applied to record views.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortMode {
    /// Identity. Keeps the post-filter order.
    Insertion,
    /// Ascending on the display name with locale-aware collation. The rolls
    /// mix scripts, so code-point comparison would misplace most names.
    Alphabetical,
}

/// Everything that governs one view computation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ViewRules {
    pub filter: FilterSpec,
    pub grouping: Option<Grouping>,
    pub sort_mode: SortMode,
}

impl Default for ViewRules {
    fn default() -> ViewRules {
        ViewRules {
            filter: FilterSpec::EMPTY,
            grouping: None,
            sort_mode: SortMode::Insertion,
        }
    }
}
