//! End-to-end tests of the `bactools` binary
//!
//! Each test builds its inputs in a scratch directory and runs one subcommand.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

use bactools::analysis::aggregate::BreseqCollection;
use bactools::parsing::tables::{read_table, read_workbook};
use bactools::Cell;

const REPORT: &str = include_str!("data/index.html");

fn bactools() -> Command {
    Command::cargo_bin("bactools").unwrap()
}

/// A folder of breseq sample folders; `empty` has no report
fn breseq_runs(root: &Path) -> PathBuf {
    let runs = root.join("runs");
    for sample in ["AU1234", "AU5678"] {
        let output = runs.join(sample).join("output");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("index.html"), REPORT).unwrap();
    }
    fs::create_dir_all(runs.join("empty")).unwrap();
    runs
}

fn column_set(columns: &[String]) -> BTreeSet<String> {
    columns.iter().cloned().collect()
}

#[test]
fn test_breseq_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let runs = breseq_runs(dir.path());

    bactools()
        .args(["breseq", "-d"])
        .arg(&runs)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping folder"));

    let workbook = dir.path().join("breseq_output.xlsx");
    let snps = read_workbook(&workbook, Some("snps")).unwrap();
    assert_eq!(snps.len(), 6);
    assert_eq!(snps.columns()[0], "Sample");

    let coverage = read_workbook(&workbook, Some("coverage")).unwrap();
    assert_eq!(coverage.len(), 4);

    // Both samples carry every position, so nothing is unique
    let comparison = read_workbook(&workbook, Some("snp comparison")).unwrap();
    assert_eq!(comparison.len(), 3);
    assert_eq!(
        comparison.columns(),
        &["seq id", "position", "AU1234", "AU5678", "all"]
    );
    for i in 0..comparison.len() {
        assert_eq!(comparison.value(i, "AU1234"), &Cell::text("."));
        assert_eq!(comparison.value(i, "all"), &Cell::text("."));
    }
}

#[test]
fn test_breseq_workbook_without_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let runs = dir.path().join("runs");
    let output = runs.join("AU1234").join("output");
    fs::create_dir_all(&output).unwrap();
    // The mutation table comes first, so only its header loses `seq id`
    fs::write(output.join("index.html"), REPORT.replacen("seq&nbsp;id", "seq_id", 1)).unwrap();

    bactools()
        .args(["breseq", "-d"])
        .arg(&runs)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Omitting the snp comparison sheet"));

    let workbook = dir.path().join("breseq_output.xlsx");
    let snps = read_workbook(&workbook, Some("snps")).unwrap();
    assert_eq!(snps.len(), 3);
    assert!(snps.columns().iter().any(|c| c == "seq_id"));
    assert_eq!(read_workbook(&workbook, Some("coverage")).unwrap().len(), 2);
    assert_eq!(read_workbook(&workbook, Some("junctions")).unwrap().len(), 4);
    assert!(read_workbook(&workbook, Some("snp comparison")).is_err());
}

#[test]
fn test_breseq_tsv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let runs = breseq_runs(dir.path());
    let base = dir.path().join("combined");

    bactools()
        .args(["breseq", "-f", "tsv", "-d"])
        .arg(&runs)
        .arg("-o")
        .arg(&base)
        .assert()
        .success();

    let collection = BreseqCollection::collect(&runs).unwrap();
    assert_eq!(collection.samples, vec!["AU1234", "AU5678"]);

    let written = [
        ("combined.snp.tsv", &collection.mutations),
        ("combined.coverage.tsv", &collection.coverage),
        ("combined.junction.tsv", &collection.junctions),
    ];
    for (name, expected) in written {
        let table = read_table(&dir.path().join(name), None).unwrap();
        assert_eq!(table.len(), expected.len(), "{name}");
        assert_eq!(column_set(table.columns()), column_set(expected.columns()), "{name}");
    }

    let snps = read_table(&dir.path().join("combined.snp.tsv"), None).unwrap();
    assert_eq!(snps.value(0, "position"), &Cell::Int(1234));
    assert!(!dir.path().join("combined.xlsx").exists());
}

#[test]
fn test_breseq_missing_directory() {
    let dir = tempfile::tempdir().unwrap();

    bactools()
        .args(["breseq", "-d"])
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid directory"));
}

#[test]
fn test_filter_contigs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("contigs.fasta");
    let output = dir.path().join("filtered.fasta");
    fs::write(
        &input,
        format!(">long\n{}\n>short\nACGT\n", "A".repeat(1500)),
    )
    .unwrap();

    bactools()
        .args(["filter-contigs", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let filtered = fs::read_to_string(&output).unwrap();
    assert!(filtered.starts_with(">long\n"));
    assert!(!filtered.contains(">short"));

    bactools()
        .args(["filter-contigs", "--cutoff", "1", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert!(fs::read_to_string(&output).unwrap().contains(">short"));
}

#[test]
fn test_merge_tables() {
    let dir = tempfile::tempdir().unwrap();
    let left = dir.path().join("isolates.csv");
    let right = dir.path().join("patients.tsv");
    let output = dir.path().join("merged.csv");
    fs::write(&left, "SampleID,City\nAU1234,Philadelphia\nAU5678,Long Beach\n").unwrap();
    fs::write(&right, "SampleID\tCity\tPatientID\nAU1234\tPhila\t273\n").unwrap();

    bactools()
        .args(["merge-tables", "-c", "SampleID", "-l"])
        .arg(&left)
        .arg("-r")
        .arg(&right)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let merged = read_table(&output, None).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.value(0, "City_isolates.csv"), &Cell::text("Philadelphia"));
    assert_eq!(merged.value(0, "City_patients.tsv"), &Cell::text("Phila"));
    assert_eq!(merged.value(0, "PatientID"), &Cell::Int(273));
}

#[test]
fn test_merge_tables_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let left = dir.path().join("isolates.csv");
    fs::write(&left, "SampleID,City\nAU1234,Philadelphia\n").unwrap();

    bactools()
        .args(["merge-tables", "-c", "Patient", "-l"])
        .arg(&left)
        .arg("-o")
        .arg(dir.path().join("merged.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Patient"));
}

#[test]
fn test_annotate_tree() {
    let dir = tempfile::tempdir().unwrap();
    let tree = dir.path().join("tree.newick");
    let table = dir.path().join("annotations.csv");
    let colors = dir.path().join("colors.json");
    fs::write(&tree, "((AU1234_S1:0.1,AU5678_S2:0.2):0.05,AU9999_S3:0.3);").unwrap();
    fs::write(
        &table,
        "RepositoryNumber,PatientID,City\nAU1234,273,Philadelphia\nAU5678,62,Long Beach\nAU9999,1,\n",
    )
    .unwrap();
    fs::write(&colors, r##"{"column": "PatientID", "colors": {"273": "#1d91c0"}}"##).unwrap();

    bactools()
        .args(["annotate-tree", "-k", "RepositoryNumber", "-l", "{PatientID}|{City}"])
        .args(["-p", r"{key}_S\d+", "-t"])
        .arg(&tree)
        .arg("-a")
        .arg(&table)
        .arg("--colors")
        .arg(&colors)
        .assert()
        .success();

    let annotated = fs::read_to_string(dir.path().join("tree.annotated.newick")).unwrap();
    assert_eq!(
        annotated,
        "((273|Philadelphia:0.1,62|Long Beach:0.2):0.05,AU9999_S3:0.3);"
    );

    let itol = fs::read_to_string(dir.path().join("tree.colors.txt")).unwrap();
    assert!(itol.starts_with("TREE_COLORS\n"));
    assert!(itol.contains("273|Philadelphia\trange\t#1d91c0\t273"));
    assert!(!itol.contains("Long Beach"));
}

#[test]
fn test_combine_runs() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("181018");
    let second = dir.path().join("181020");
    let output = dir.path().join("combined");
    fs::create_dir_all(first.join("Cystic/AU1234")).unwrap();
    fs::create_dir_all(second.join("AU1234")).unwrap();
    fs::write(first.join("Cystic/AU1234/AU1234_R1.fastq.gz"), "first").unwrap();
    fs::write(second.join("AU1234/AU1234_R1.fastq.gz"), "second").unwrap();

    bactools()
        .arg("combine-runs")
        .arg(&first)
        .arg(&second)
        .arg("-o")
        .arg(&output)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("AU1234_R1.fastq.gz"));
    assert!(!output.exists());

    bactools()
        .arg("combine-runs")
        .arg(&first)
        .arg(&second)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(output.join("Cystic/AU1234/AU1234_R1.fastq.gz")).unwrap(),
        "firstsecond"
    );
}

#[test]
fn test_combine_runs_unpaired() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a");
    let second = dir.path().join("b");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();
    fs::write(first.join("S1_R1.fastq.gz"), "x").unwrap();

    bactools()
        .arg("combine-runs")
        .arg(&first)
        .arg(&second)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("S1_R1.fastq.gz"));
}

#[test]
fn test_sample_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let dmux = dir.path().join("dmux");
    let run = dmux.join("181018");
    let output = dir.path().join("reports");
    fs::create_dir_all(run.join("Cystic/101818_AU1234")).unwrap();
    fs::write(
        run.join("SampleSheet.csv"),
        "[Header],,,\nIEMFileVersion,4,,\n\n[Data],,,\nSample_ID,Sample_Name,Project,index\n101818_AU1234,AU1234,Cystic,ACGT\n101818_AU5678,AU5678,Cystic,TTGA\n",
    )
    .unwrap();
    fs::write(run.join("Cystic/101818_AU1234/AU1234_R1.fastq.gz"), "").unwrap();

    bactools()
        .arg("sample-sheets")
        .arg("--dmux-dir")
        .arg(&dmux)
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success();

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
    let combined = read_table(&output.join(format!("combined_sample_sheet.{today}.tsv")), None).unwrap();
    assert_eq!(combined.len(), 2);
    assert_eq!(combined.value(0, "date"), &Cell::text("2018-10-18"));

    let billing = output.join(format!("billing.{today}.xlsx"));
    let projects = read_workbook(&billing, Some("projects")).unwrap();
    assert_eq!(projects.value(0, "projectName"), &Cell::text("Cystic"));
    assert_eq!(projects.value(0, "expectedSamples"), &Cell::Int(2));
    assert_eq!(projects.value(0, "foundSamples"), &Cell::Int(1));
    assert_eq!(projects.value(0, "missingSamples"), &Cell::Int(1));

    let files = read_workbook(&billing, Some("files")).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files.value(0, "sampleDate"), &Cell::text("2018-10-18"));
}
