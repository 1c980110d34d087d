#![allow(missing_docs)]

use std::path::PathBuf;
use std::process::Command;

use matdoc_testkit::{complex_matrix, compressed, double_matrix, mat_file, sparse_matrix, write_temp};
use serde_json::Value;

#[test]
fn list_json_output_describes_each_root() {
	let path = sample_path();
	let json = run_json(&["list", &path.display().to_string(), "--json"]);

	assert_eq!(json["count"], 3);
	let roots = json["roots"].as_array().expect("roots array");
	assert_eq!(roots[0]["name"], "z");
	assert_eq!(roots[0]["class"], "double");
	assert_eq!(roots[0]["shape"], "1x2");
	assert_eq!(roots[0]["flags"], "complex");
	assert_eq!(roots[1]["kind"], "sparse");
	assert_eq!(roots[2]["name"], "packed");
}

#[test]
fn show_json_output_contains_sparse_entries() {
	let path = sample_path();
	let json = run_json(&["show", &path.display().to_string(), "--name", "sp", "--json"]);

	let sparse = &json["roots"][0];
	assert_eq!(sparse["nnz"], 3);
	assert_eq!(sparse["entries"][2], serde_json::json!([1, 2, 3.0]));
}

#[test]
fn invalid_file_reports_error_and_fails() {
	let path = write_temp("invalid", b"not a mat file");
	let output = Command::new(env!("CARGO_BIN_EXE_matdoc"))
		.args(["info", &path.display().to_string()])
		.output()
		.expect("command executes");

	assert!(!output.status.success(), "command should fail");
	assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "error: not a MATLAB 5.0 MAT-file");
}

fn sample_path() -> PathBuf {
	write_temp(
		"cli-json",
		&mat_file(&[
			complex_matrix("z", &[1, 2], &[1.0, 2.0], &[0.0, -1.0]),
			sparse_matrix("sp", &[3, 3], &[0, 2, 1], &[0, 2, 2, 3], &[1.0, 2.0, 3.0]),
			compressed(&double_matrix("packed", &[2, 1], &[5.0, 6.0])),
		]),
	)
}

fn run_json(args: &[&str]) -> Value {
	let output = Command::new(env!("CARGO_BIN_EXE_matdoc")).args(args).output().expect("command executes");

	assert!(output.status.success(), "command should succeed");
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
