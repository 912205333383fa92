mod config;
pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::cmp::Reverse;
use std::collections::HashMap;

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::Locale;

pub use crate::config::*;

/// The display name substituted when every name candidate is blank.
pub const UNKNOWN_NAME: &str = "Unknown";

// **** Normalizer ****

/// Projects one raw roll record onto its canonical display shape.
///
/// Total function: any combination of absent fields resolves through the
/// documented fallback chains, it never fails.
pub fn normalize(raw: &RawRecord) -> CanonicalRecord {
    CanonicalRecord {
        id: raw.id.clone(),
        display_name: resolve_display_name(raw),
        age: raw.age,
        gender: raw.gender.clone().unwrap_or_default(),
        booth_key: booth_key(raw),
        address: resolve_address(raw),
        card_number: raw.epic_number.clone().unwrap_or_default(),
    }
}

pub fn normalize_batch(batch: &[RawRecord]) -> Vec<CanonicalRecord> {
    batch.iter().map(normalize).collect()
}

// Name fallback chain: full name -> alternate full name -> "first last"
// composed from the primary variant -> "Unknown". Blank candidates are
// skipped.
fn resolve_display_name(raw: &RawRecord) -> String {
    for candidate in [raw.full_name.as_deref(), raw.full_name_alt.as_deref()]
        .into_iter()
        .flatten()
    {
        if !candidate.trim().is_empty() {
            return candidate.to_string();
        }
    }
    let composed = collapse_whitespace(&format!(
        "{} {}",
        raw.first_name.as_deref().unwrap_or(""),
        raw.last_name.as_deref().unwrap_or("")
    ));
    if !composed.is_empty() {
        return composed;
    }
    UNKNOWN_NAME.to_string()
}

fn resolve_address(raw: &RawRecord) -> String {
    [
        raw.residential_address.as_deref(),
        raw.residential_address_alt.as_deref(),
        raw.booth_address.as_deref(),
        raw.booth_address_alt.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| !candidate.trim().is_empty())
    .unwrap_or("")
    .to_string()
}

// The separator is emitted even when both sides are absent. The literal "-"
// key is the fallback bucket that collects all unknown-booth records.
fn booth_key(raw: &RawRecord) -> String {
    format!(
        "{}-{}",
        raw.constituency_no.as_deref().unwrap_or(""),
        raw.part_no.as_deref().unwrap_or("")
    )
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

// **** Grouping engine ****

struct GroupAccumulator {
    representative: String,
    count: u64,
}

/// Aggregates records sharing a key into ordered summaries.
///
/// One pass over the input builds a per-key count and keeps the first
/// non-empty address among the members; summaries come out descending by
/// count with ties resolved per `tie_break`.
pub fn group_records<F>(
    records: &[CanonicalRecord],
    key_fn: F,
    tie_break: TieBreak,
) -> Vec<GroupSummary>
where
    F: Fn(&CanonicalRecord) -> String,
{
    let mut first_seen: Vec<String> = Vec::new();
    let mut accumulators: HashMap<String, GroupAccumulator> = HashMap::new();

    for record in records {
        let key = key_fn(record);
        let acc = accumulators.entry(key.clone()).or_insert_with(|| {
            first_seen.push(key);
            GroupAccumulator {
                representative: String::new(),
                count: 0,
            }
        });
        acc.count += 1;
        if acc.representative.is_empty() && !record.address.is_empty() {
            acc.representative = record.address.clone();
        }
    }

    let mut summaries: Vec<GroupSummary> = first_seen
        .iter()
        .map(|key| {
            let acc = &accumulators[key];
            GroupSummary {
                key: key.clone(),
                representative_address: acc.representative.clone(),
                count: acc.count,
            }
        })
        .collect();

    match tie_break {
        // Stable sort over the insertion-ordered keys: equal counts keep
        // their first-encounter order.
        TieBreak::FirstSeen => summaries.sort_by_key(|g| Reverse(g.count)),
        TieBreak::Lexicographic => {
            summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
        }
    }
    debug!(
        "group_records: {:?} records -> {:?} groups",
        records.len(),
        summaries.len()
    );
    summaries
}

// **** Filter engine ****

/// Applies a compound filter, preserving the relative input order.
pub fn filter_records(records: &[CanonicalRecord], spec: &FilterSpec) -> Vec<CanonicalRecord> {
    // The query is prepared once; a blank query is the same as no clause.
    let query: Option<String> = spec
        .text
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    records
        .iter()
        .filter(|r| record_matches(r, query.as_deref(), spec))
        .cloned()
        .collect()
}

fn record_matches(record: &CanonicalRecord, query: Option<&str>, spec: &FilterSpec) -> bool {
    if let Some(q) = query {
        if !text_matches(record, q) {
            return false;
        }
    }
    if let Some(categorical) = &spec.categorical {
        if !categorical_matches(record, categorical) {
            return false;
        }
    }
    match (&spec.age_range, record.age) {
        (None, _) => true,
        (Some(range), Some(age)) => range.contains(age),
        // An unknown age never satisfies an active band: a "60+" report must
        // not include records whose age was simply missing.
        (Some(_), None) => false,
    }
}

fn text_matches(record: &CanonicalRecord, lowered_query: &str) -> bool {
    record.display_name.to_lowercase().contains(lowered_query)
        || record.address.to_lowercase().contains(lowered_query)
        || record.card_number.to_lowercase().contains(lowered_query)
        || record.booth_key.to_lowercase().contains(lowered_query)
}

fn categorical_matches(record: &CanonicalRecord, filter: &CategoricalFilter) -> bool {
    if filter.value == ALL_SENTINEL {
        return true;
    }
    let value = match filter.field {
        CategoricalField::Gender => &record.gender,
        CategoricalField::BoothKey => &record.booth_key,
        CategoricalField::Address => &record.address,
    };
    *value == filter.value
}

// **** Sort policy ****

/// Orders a record view. `Insertion` is the identity; `Alphabetical` collates
/// on the display name.
pub fn sort_records(mut records: Vec<CanonicalRecord>, mode: SortMode) -> Vec<CanonicalRecord> {
    match mode {
        SortMode::Insertion => records,
        SortMode::Alphabetical => {
            match display_name_collator() {
                Some(collator) => records.sort_by(|a, b| {
                    collator.compare(a.display_name.as_str(), b.display_name.as_str())
                }),
                None => {
                    // Collation data should always be available with the
                    // compiled provider; keep the view usable if it is not.
                    warn!("sort_records: collator unavailable, falling back to code points");
                    records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
                }
            }
            records
        }
    }
}

fn display_name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(&Locale::default().into(), options).ok()
}

// **** View orchestration ****

/// Runs the full pipeline for one screen activation: normalize, filter, then
/// group or sort depending on the rules.
///
/// The presentation layer only ever sees the output of this function, never
/// the raw batch.
pub fn run_registry_view(batch: &[RawRecord], rules: &ViewRules) -> RegistryView {
    info!(
        "run_registry_view: processing {:?} raw records, grouping: {:?}, sort: {:?}",
        batch.len(),
        rules.grouping,
        rules.sort_mode
    );
    let canonical = normalize_batch(batch);
    let filtered = filter_records(&canonical, &rules.filter);
    debug!(
        "run_registry_view: {:?} of {:?} records pass the filter",
        filtered.len(),
        canonical.len()
    );
    match &rules.grouping {
        Some(grouping) => {
            let key = grouping.key;
            let groups = group_records(&filtered, |r| key.key_of(r), grouping.tie_break);
            info!("run_registry_view: {:?} groups", groups.len());
            RegistryView::Groups(groups)
        }
        None => RegistryView::Records(sort_records(filtered, rules.sort_mode)),
    }
}

/// Expands a selected group back into its member records.
///
/// The resident batch is re-filtered with an exact-match clause on the
/// group's key; no second trip to the record store is made.
pub fn drill_down(
    records: &[CanonicalRecord],
    group: &GroupSummary,
    key: GroupKey,
) -> Vec<CanonicalRecord> {
    let field = match key {
        GroupKey::Booth => CategoricalField::BoothKey,
        GroupKey::Address => CategoricalField::Address,
        GroupKey::Gender => CategoricalField::Gender,
    };
    filter_records(
        records,
        &FilterSpec {
            categorical: Some(CategoricalFilter {
                field,
                value: group.key.clone(),
            }),
            ..FilterSpec::EMPTY
        },
    )
}

// **** Fetch sequencing ****

/// Ticket for one in-flight batch fetch.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct FetchTicket(u64);

/// Keeps screen state consistent when fetches overlap: a new fetch supersedes
/// every earlier one, and only the latest ticket may deliver its batch.
#[derive(Debug, Default)]
pub struct FetchSequence {
    latest: u64,
}

impl FetchSequence {
    pub fn new() -> FetchSequence {
        FetchSequence { latest: 0 }
    }

    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Returns the batch when the ticket is still current, discards it (not
    /// merges it) otherwise.
    pub fn admit(&self, ticket: FetchTicket, batch: Vec<RawRecord>) -> Option<Vec<RawRecord>> {
        if self.is_current(ticket) {
            Some(batch)
        } else {
            debug!(
                "admit: discarding stale batch of {:?} records for {:?}",
                batch.len(),
                ticket
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(id: &str, name: &str, booth: &str, address: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: id.to_string(),
            display_name: name.to_string(),
            age: None,
            gender: String::new(),
            booth_key: booth.to_string(),
            address: address.to_string(),
            card_number: String::new(),
        }
    }

    fn booth_batch(keys: &[&str]) -> Vec<CanonicalRecord> {
        keys.iter()
            .enumerate()
            .map(|(idx, key)| canonical(&format!("r{}", idx), "x", key, ""))
            .collect()
    }

    #[test]
    fn display_name_falls_back_through_the_chain() {
        let mut raw = RawRecord::new("1");
        raw.full_name_alt = Some("सुनीता देवी".to_string());
        assert_eq!(normalize(&raw).display_name, "सुनीता देवी");

        let mut raw = RawRecord::new("2");
        raw.first_name = Some(" Amit ".to_string());
        raw.last_name = Some("Verma".to_string());
        assert_eq!(normalize(&raw).display_name, "Amit Verma");

        let raw = RawRecord::new("3");
        assert_eq!(normalize(&raw).display_name, UNKNOWN_NAME);
    }

    #[test]
    fn whitespace_only_names_are_skipped() {
        let mut raw = RawRecord::new("1");
        raw.full_name = Some("   ".to_string());
        raw.full_name_alt = Some("Raj Kumar".to_string());
        assert_eq!(normalize(&raw).display_name, "Raj Kumar");
    }

    #[test]
    fn booth_key_keeps_the_separator() {
        let mut raw = RawRecord::new("1");
        raw.constituency_no = Some("12".to_string());
        raw.part_no = Some("7".to_string());
        assert_eq!(normalize(&raw).booth_key, "12-7");

        let empty_a = normalize(&RawRecord::new("2"));
        let empty_b = normalize(&RawRecord::new("3"));
        assert_eq!(empty_a.booth_key, "-");

        let groups = group_records(&[empty_a, empty_b], |r| r.booth_key.clone(), TieBreak::FirstSeen);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "-");
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn address_falls_back_to_booth_addresses() {
        let mut raw = RawRecord::new("1");
        raw.booth_address_alt = Some("Primary School, Rampur".to_string());
        assert_eq!(normalize(&raw).address, "Primary School, Rampur");
        assert_eq!(normalize(&RawRecord::new("2")).address, "");
    }

    #[test]
    fn grouping_sorts_by_descending_count() {
        let records = booth_batch(&["1-1", "1-1", "2-3", "2-3", "2-3"]);
        let groups = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        let ordered: Vec<(&str, u64)> = groups.iter().map(|g| (g.key.as_str(), g.count)).collect();
        assert_eq!(ordered, vec![("2-3", 3), ("1-1", 2)]);
    }

    #[test]
    fn grouping_is_deterministic() {
        let records = booth_batch(&["5-2", "1-1", "5-2", "9-9", "1-1", "3-3"]);
        let first = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        let second = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        assert_eq!(first, second);
    }

    #[test]
    fn grouping_counts_cover_the_batch() {
        let records = booth_batch(&["1-1", "-", "2-3", "-", "2-3", "1-1", "7-7"]);
        let groups = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        let total: u64 = groups.iter().map(|g| g.count).sum();
        assert_eq!(total as usize, records.len());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let records = booth_batch(&["9-1", "3-4", "9-1", "3-4", "0-2"]);
        let groups = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["9-1", "3-4", "0-2"]);
    }

    #[test]
    fn lexicographic_ties_reorder_by_key() {
        let records = booth_batch(&["9-1", "3-4", "9-1", "3-4"]);
        let groups = group_records(&records, |r| r.booth_key.clone(), TieBreak::Lexicographic);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["3-4", "9-1"]);
    }

    #[test]
    fn representative_address_is_first_non_empty() {
        let records = vec![
            canonical("1", "a", "1-1", ""),
            canonical("2", "b", "1-1", "Ward 4, Gandhi Nagar"),
            canonical("3", "c", "1-1", "Some other street"),
        ];
        let groups = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        assert_eq!(groups[0].representative_address, "Ward 4, Gandhi Nagar");
    }

    #[test]
    fn grouping_empty_input_yields_empty_output() {
        let groups = group_records(&[], |r| r.booth_key.clone(), TieBreak::FirstSeen);
        assert!(groups.is_empty());
    }

    #[test]
    fn empty_filter_returns_all_records_in_order() {
        let records = booth_batch(&["1-1", "2-2", "3-3"]);
        let filtered = filter_records(&records, &FilterSpec::EMPTY);
        assert_eq!(filtered, records);
    }

    #[test]
    fn filter_output_is_a_subset() {
        let mut records = booth_batch(&["1-1", "2-2", "3-3", "1-1"]);
        records[2].card_number = "ABC1234567".to_string();
        let spec = FilterSpec {
            text: Some("abc12".to_string()),
            ..FilterSpec::EMPTY
        };
        let filtered = filter_records(&records, &spec);
        assert!(filtered.iter().all(|f| records.iter().any(|r| r.id == f.id)));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "r2");
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let records = vec![canonical("1", "Raj Kumar", "1-1", "")];
        for query in ["raj", "RAJ", "rAj kUm"] {
            let spec = FilterSpec {
                text: Some(query.to_string()),
                ..FilterSpec::EMPTY
            };
            assert_eq!(filter_records(&records, &spec).len(), 1, "query {:?}", query);
        }
    }

    #[test]
    fn blank_query_matches_everything() {
        let records = booth_batch(&["1-1", "2-2"]);
        let spec = FilterSpec {
            text: Some("   ".to_string()),
            ..FilterSpec::EMPTY
        };
        assert_eq!(filter_records(&records, &spec).len(), 2);
    }

    #[test]
    fn text_filter_reaches_the_booth_key() {
        let records = booth_batch(&["12-7", "3-3"]);
        let spec = FilterSpec {
            text: Some("12-7".to_string()),
            ..FilterSpec::EMPTY
        };
        assert_eq!(filter_records(&records, &spec).len(), 1);
    }

    #[test]
    fn age_band_excludes_unknown_ages() {
        let mut young = canonical("1", "a", "1-1", "");
        young.age = Some(21);
        let unknown = canonical("2", "b", "1-1", "");
        let spec = FilterSpec {
            age_range: Some(AgeRange { min: 18, max: 25 }),
            ..FilterSpec::EMPTY
        };
        let filtered = filter_records(&[young, unknown], &spec);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn age_band_bounds_are_inclusive() {
        let mut lo = canonical("1", "a", "1-1", "");
        lo.age = Some(18);
        let mut hi = canonical("2", "b", "1-1", "");
        hi.age = Some(25);
        let mut out = canonical("3", "c", "1-1", "");
        out.age = Some(26);
        let spec = FilterSpec {
            age_range: Some(AgeRange { min: 18, max: 25 }),
            ..FilterSpec::EMPTY
        };
        assert_eq!(filter_records(&[lo, hi, out], &spec).len(), 2);
    }

    #[test]
    fn malformed_age_ranges_are_rejected() {
        assert_eq!(AgeRange::parse("18-25"), Some(AgeRange { min: 18, max: 25 }));
        assert_eq!(AgeRange::parse(" 60 - 100 "), Some(AgeRange { min: 60, max: 100 }));
        assert_eq!(AgeRange::parse("sixty plus"), None);
        assert_eq!(AgeRange::parse("25-18"), None);
        assert_eq!(AgeRange::parse("18-"), None);
        assert_eq!(AgeRange::parse(""), None);
    }

    #[test]
    fn all_sentinel_bypasses_the_categorical_clause() {
        let mut records = booth_batch(&["1-1", "2-2"]);
        records[0].gender = "Female".to_string();
        let spec = FilterSpec {
            categorical: Some(CategoricalFilter {
                field: CategoricalField::Gender,
                value: ALL_SENTINEL.to_string(),
            }),
            ..FilterSpec::EMPTY
        };
        assert_eq!(filter_records(&records, &spec).len(), 2);
    }

    #[test]
    fn categorical_clause_is_exact() {
        let mut records = booth_batch(&["12-7", "12-70"]);
        records[0].gender = "Male".to_string();
        let spec = FilterSpec {
            categorical: Some(CategoricalFilter {
                field: CategoricalField::BoothKey,
                value: "12-7".to_string(),
            }),
            ..FilterSpec::EMPTY
        };
        let filtered = filter_records(&records, &spec);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].booth_key, "12-7");
    }

    #[test]
    fn alphabetical_sort_uses_collation_not_code_points() {
        let records = vec![
            canonical("1", "Bharat", "1-1", ""),
            canonical("2", "amit", "1-1", ""),
        ];
        let sorted = sort_records(records, SortMode::Alphabetical);
        // Byte order would put "Bharat" first.
        assert_eq!(sorted[0].display_name, "amit");
        assert_eq!(sorted[1].display_name, "Bharat");
    }

    #[test]
    fn alphabetical_sort_handles_devanagari() {
        let records = vec![
            canonical("1", "राजेश कुमार", "1-1", ""),
            canonical("2", "अमित वर्मा", "1-1", ""),
        ];
        let sorted = sort_records(records, SortMode::Alphabetical);
        assert_eq!(sorted[0].display_name, "अमित वर्मा");
    }

    #[test]
    fn insertion_sort_is_the_identity() {
        let records = vec![
            canonical("1", "zz", "1-1", ""),
            canonical("2", "aa", "1-1", ""),
        ];
        let sorted = sort_records(records.clone(), SortMode::Insertion);
        assert_eq!(sorted, records);
    }

    #[test]
    fn end_to_end_booth_view() {
        let mut batch = Vec::new();
        for (idx, (ac, part)) in [("1", "1"), ("1", "1"), ("2", "3"), ("2", "3"), ("2", "3")]
            .iter()
            .enumerate()
        {
            let mut raw = RawRecord::new(format!("v{}", idx));
            raw.constituency_no = Some(ac.to_string());
            raw.part_no = Some(part.to_string());
            batch.push(raw);
        }
        let rules = ViewRules {
            grouping: Some(Grouping::by(GroupKey::Booth)),
            ..ViewRules::default()
        };
        match run_registry_view(&batch, &rules) {
            RegistryView::Groups(groups) => {
                let ordered: Vec<(&str, u64)> =
                    groups.iter().map(|g| (g.key.as_str(), g.count)).collect();
                assert_eq!(ordered, vec![("2-3", 3), ("1-1", 2)]);
            }
            RegistryView::Records(_) => panic!("expected a grouped view"),
        }
    }

    #[test]
    fn drill_down_scopes_to_the_group_key() {
        let records = booth_batch(&["1-1", "2-3", "2-3"]);
        let groups = group_records(&records, |r| r.booth_key.clone(), TieBreak::FirstSeen);
        let members = drill_down(&records, &groups[0], GroupKey::Booth);
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|r| r.booth_key == "2-3"));
    }

    #[test]
    fn stale_fetches_are_discarded() {
        let mut seq = FetchSequence::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.admit(first, vec![RawRecord::new("1")]).is_none());
        let batch = seq.admit(second, vec![RawRecord::new("2")]);
        assert_eq!(batch.map(|b| b.len()), Some(1));
    }
}
