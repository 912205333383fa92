/*!

# Quick start

This example walks through a booth-wise report end to end, starting from a
spreadsheet export of an electoral roll.

**Getting the data** Most roll extracts circulate as Excel files with one row
per voter and a fixed set of column headers (`ac_no`, `part_no`,
`applicant_full_name`, `epic_number`, `v_address` and so on). Save such a file
on your computer, for instance as `rolls.xlsx`.

**Running a report** The `votereg` binary reads the file, normalizes every
row and prints a report summary in JSON:

```bash
votereg --input rolls.xlsx --input-type xlsx --report boothWise
```

You should see the booths ordered by descending member count:

```text
[2024-03-02T10:12:41Z INFO  voter_rolls] run_registry_view: processing 4213 raw records, grouping: Some(Grouping { key: Booth, tie_break: FirstSeen }), sort: Insertion
[2024-03-02T10:12:41Z INFO  voter_rolls] run_registry_view: 17 groups
```

together with the JSON summary on the standard output. Pass `--out report.json`
to write it to a file instead.

**Searching** The same input feeds the search reports. The query is matched
case-insensitively against the name, address, card number and booth key:

```bash
votereg --input rolls.xlsx --input-type xlsx --report search --query "raj"
```

Add `--booth 12-7` to scope the search to one booth, or `--age 18-25` to keep
an age band. Malformed bands are ignored rather than refused.

**Library use** The same pipeline is available programmatically through
[`run_registry_view`](../fn.run_registry_view.html) or the
[builder](../builder/struct.Builder.html); see the [manual](../manual/index.html)
for the input formats and the configuration file.

*/
