/*!

This is the long-form manual for `voter_rolls` and `votereg`.

## Input formats

The following providers are supported:
* `json` a JSON array exported from the hosted record store
* `csv` one voter per row, headers in the first row
* `xlsx` Excel spreadsheet, same columns as the CSV input

All three map the same fixed header keys onto the raw record, so imported and
fetched data normalize identically:

|  key                        | content                                    |
|-----------------------------|--------------------------------------------|
| `id`                        | unique record identifier (required)        |
| `ac_no`, `part_no`          | constituency and part number (booth key)   |
| `slnoinpart`, `section_no`  | serial within part, section number         |
| `house_number`              | house number                               |
| `applicant_full_name`       | full name, primary script                  |
| `applicant_full_name_l1`    | full name, local script                    |
| `applicant_first_name` / `applicant_last_name` (+ `_l1`) | split name fields |
| `age`, `gender`             | demographics                               |
| `epic_number`               | voter card identifier                      |
| `v_address`, `v_address_l1` | residential address variants               |
| `booth_address`, `booth_address_l1` | polling location address variants  |
| `relation_type`, `relation_full_name` (+ `_l1`) | family linkage, passed through |

Missing columns and empty cells become absent values; the normalizer resolves
them through its fallback chains and never fails a row.

## Reports

* `search` filtered records in roll order
* `nameWise` filtered records, alphabetized with locale-aware collation
* `ageWise` records restricted to an age band (`--age 18-25`)
* `boothWise` one summary per `{ac}-{part}` key, descending by count
* `addressWise` one summary per residential address, descending by count
* `genderWise` distribution over the gender attribute

Records with no constituency or part number share the literal `"-"` booth key
on purpose: they surface as a single unknown-booth bucket instead of being
dropped.

## Configuration

`votereg` accepts a configuration file in JSON for the options that do not fit
on the command line. Command-line flags override the file.

```json
{
    "source": {
        "provider": "xlsx",
        "filePath": "rolls.xlsx",
        "excelWorksheetName": "Sheet1",
        "limit": 50000
    },
    "report": {
        "kind": "boothWise",
        "query": "",
        "booth": "all",
        "gender": "all",
        "ageRange": "",
        "sort": "insertion",
        "tieBreak": "firstSeen"
    },
    "output": {
        "reportTitle": "Ward 4 booths",
        "outputPath": "report.json"
    }
}
```

Notes:
- `booth` and `gender` accept the sentinel `"all"`, which disables the clause.
- `ageRange` uses the `"min-max"` notation; a malformed value disables the
  band with a warning instead of failing the run.
- `tieBreak` may be `firstSeen` (default) or `lexicographic`. Both grouped
  reports use `firstSeen` unless told otherwise, so equal counts keep their
  roll order.

*/
