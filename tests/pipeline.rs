//! End-to-end tests: dataset filtering through the library, and the
//! real binary driven in both roles via a scratch CSV and artifact.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pbc_stage_trainer::config::TrainingConfig;
use pbc_stage_trainer::worker::ipc::{decode_line, WorkerMessage};
use pbc_stage_trainer::{dataset, RandomForest};

const BIN: &str = env!("CARGO_BIN_EXE_pbc_stage_trainer");

/// Write a PBC-shaped CSV: `valid` numeric rows followed by `invalid`
/// rows with a non-numeric Bilirubin field.
fn write_dataset(dir: &Path, valid: usize, invalid: usize) -> PathBuf {
    let path = dir.join("pbc.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "ID,Bilirubin,Albumin,Copper,Platelets,Prothrombin,Stage").unwrap();
    for i in 0..valid {
        writeln!(
            file,
            "{i},{:.1},{:.1},{},{},{:.1},{}",
            0.5 + (i % 30) as f64 * 0.3,
            2.0 + (i % 20) as f64 * 0.1,
            20 + i % 200,
            100 + i % 300,
            9.0 + (i % 40) as f64 * 0.2,
            i % 4 + 1,
        )
        .unwrap();
    }
    for i in 0..invalid {
        writeln!(file, "x{i},NA,3.1,54,221,10.6,3").unwrap();
    }
    path
}

fn run_binary(worker: bool, data: &Path, model: &Path, estimators: usize) -> Output {
    let mut cmd = Command::new(BIN);
    if worker {
        cmd.env("PBC_WORKER", "1");
    } else {
        cmd.env_remove("PBC_WORKER");
    }
    cmd.env("N_ESTIMATORS", estimators.to_string())
        .env("PBC_DATA_PATH", data)
        .env("PBC_MODEL_PATH", model)
        .output()
        .unwrap()
}

#[test]
fn test_invalid_rows_are_filtered_out() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_dataset(dir.path(), 400, 10);

    let loaded = dataset::load(&csv).unwrap();
    assert_eq!(loaded.len(), 400);

    let model =
        RandomForest::train(&loaded.features, &loaded.labels, &TrainingConfig::with_estimators(15))
            .unwrap();
    let predicted = model.predict_row(&loaded.features[0]);
    assert!(loaded.labels.contains(&predicted));
}

#[test]
fn test_worker_role_trains_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_dataset(dir.path(), 60, 3);
    let model_path = dir.path().join("model.json");

    let output = run_binary(true, &csv, &model_path, 5);
    assert!(output.status.success(), "worker failed: {output:?}");

    // Exactly one structured message on stdout.
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 1, "unexpected stdout: {stdout}");
    match decode_line(lines[0]).unwrap() {
        WorkerMessage::Done { time } => assert!(time >= 0.0),
        other => panic!("expected done, got {other:?}"),
    }

    // Artifact is a complete, loadable forest.
    let raw = std::fs::read_to_string(&model_path).unwrap();
    let model = RandomForest::from_json(&raw).unwrap();
    assert_eq!(model.estimator_count, 5);
    assert!(!model_path.with_extension("json.tmp").exists());
}

#[test]
fn test_worker_reproducibility_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_dataset(dir.path(), 60, 0);
    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");

    assert!(run_binary(true, &csv, &first, 5).status.success());
    assert!(run_binary(true, &csv, &second, 5).status.success());

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn test_worker_reports_failure_without_touching_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such.csv");
    let model_path = dir.path().join("model.json");

    let output = run_binary(true, &missing, &model_path, 5);
    assert!(!output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.lines().find(|l| !l.trim().is_empty()).unwrap();
    match decode_line(line).unwrap() {
        WorkerMessage::Failed { error } => assert!(error.contains("unavailable")),
        other => panic!("expected failure message, got {other:?}"),
    }
    assert!(!model_path.exists());
}

#[test]
fn test_controller_supervises_worker_to_success() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_dataset(dir.path(), 80, 5);
    let model_path = dir.path().join("model.json");

    // The controller re-execs itself for the worker; the path
    // overrides travel through the inherited environment.
    let output = run_binary(false, &csv, &model_path, 5);
    assert!(output.status.success(), "controller failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(
        stdout.contains("Worker finished training"),
        "missing summary: {stdout}"
    );
    assert!(model_path.exists());
}

#[test]
fn test_controller_fails_cleanly_on_missing_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such.csv");
    let model_path = dir.path().join("model.json");

    let output = run_binary(false, &missing, &model_path, 5);
    assert!(!output.status.success());
    assert!(!model_path.exists());
}
