//! End-to-end curation: raw CSV corpus -> curated examples -> splits on disk.

use brainbug_core::{
    read_corpus, read_examples, split, write_splits, CuratedExample, CurationProfile,
    DatasetCurator, PipelineVariant, SplitRunInfo, DEFAULT_SEED, REQUIRED_COLUMNS,
};
use std::path::Path;

const ACRONYMS: [&str; 10] = [
    "WPFV", "MFC", "MVAV", "WVAV", "MVIV", "MLPA", "MIFS", "MIA", "WAEP", "WAV",
];

/// Ten rows; rows 3 and 7 have no usable fixed code.
fn write_corpus(path: &Path) {
    let mut wtr = csv::Writer::from_path(path).expect("create csv");
    wtr.write_record(REQUIRED_COLUMNS).expect("write header");
    for (i, acronym) in ACRONYMS.iter().enumerate() {
        let fixed = match i {
            3 => String::new(),
            7 => "   ".to_string(),
            _ => format!("def f{i}(x):\n    return x + {i}"),
        };
        wtr.write_record([
            format!("def f{i}(x):\n    return x"),
            fixed,
            acronym.to_string(),
            format!("missing addition in f{i}"),
            format!("bug #{i}, with \"quotes\""),
            "demo-project".to_string(),
            format!("-    return x\n+    return x + {i}"),
        ])
        .expect("write row");
    }
    wtr.flush().expect("flush");
}

#[test]
fn detection_corpus_curates_and_splits_into_expected_sizes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("bugs.csv");
    write_corpus(&corpus);

    let records = read_corpus(&corpus).expect("read corpus");
    assert_eq!(records.len(), 10);

    let output = DatasetCurator::new(PipelineVariant::Detection).curate(&records);
    assert_eq!(output.summary.usable_records, 8);
    assert_eq!(output.summary.dropped_records, 2);
    assert_eq!(output.examples.len(), 16);

    let profile = CurationProfile::detection();
    let splits = split(&output.examples, profile.ratios, DEFAULT_SEED).expect("split");
    assert_eq!(
        (splits.train.len(), splits.val.len(), splits.test.len()),
        (11, 2, 3)
    );

    let out_dir = dir.path().join("processed");
    let manifest = write_splits(
        &out_dir,
        &splits,
        &SplitRunInfo {
            profile: "detection".to_string(),
            variant: PipelineVariant::Detection,
            seed: DEFAULT_SEED,
            ratios: profile.ratios,
            summary: output.summary,
        },
    )
    .expect("write splits");

    let counts: Vec<usize> = manifest.splits.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![11, 2, 3]);

    let test_back = read_examples(&out_dir.join("test.json")).expect("read test split");
    assert_eq!(test_back, splits.test.examples());
}

#[test]
fn repair_corpus_carries_taxonomy_and_escaped_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("bugs.csv");
    write_corpus(&corpus);

    let records = read_corpus(&corpus).expect("read corpus");
    let output = DatasetCurator::new(PipelineVariant::Repair).curate(&records);
    assert_eq!(output.examples.len(), 8);

    let first = output.examples[0].as_repair().expect("repair example");
    assert_eq!(first.fault_acronym, "WPFV");
    assert_eq!(first.error_type, "Wrong Parameter/Variable Used");
    assert_eq!(first.bug_description, "bug #0, with \"quotes\"");
    assert!(first.faulty_code.contains('\n'));

    // Row 3 (WVAV) was dropped, so the fourth example is row 4.
    let fourth = output.examples[3].as_repair().expect("repair example");
    assert_eq!(fourth.fault_acronym, "MVIV");
    assert!(output
        .examples
        .iter()
        .all(|e| matches!(e, CuratedExample::Repair(_))));
}

#[test]
fn missing_required_column_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("bad.csv");
    std::fs::write(&corpus, "Faulty Code,Fault Free Code\nx,y\n").expect("write");

    let err = read_corpus(&corpus).expect_err("should reject");
    assert!(err.to_string().contains("Fault_Acronym"));
}

#[test]
fn json_corpus_reads_like_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corpus = dir.path().join("bugs.json");
    let rows = serde_json::json!([{
        "Faulty Code": "a = 1",
        "Fault Free Code": "a = 2",
        "Fault_Acronym": "WAV",
        "Implementation-Level Description": "wrong constant",
        "Bug_Description": "",
        "Project": "p",
        "Diff_patch": ""
    }]);
    std::fs::write(&corpus, rows.to_string()).expect("write");

    let records = read_corpus(&corpus).expect("read json corpus");
    let output = DatasetCurator::new(PipelineVariant::Repair).curate(&records);
    let ex = output.examples[0].as_repair().expect("repair");
    assert_eq!(ex.error_type, "Wrong Assigned Value");
    assert_eq!(ex.fixed_code, "a = 2");
}
