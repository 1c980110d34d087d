use crate::cmd::test_support::{run_matdoc, run_matdoc_json, sample_file};

#[test]
fn info_json_reports_preamble_and_roots() {
	let path = sample_file();
	let path = path.to_string_lossy().into_owned();
	let json = run_matdoc_json(&["info", &path, "--json"]);

	assert_eq!(json["kind"], "regular");
	assert_eq!(json["endianness"], "little");
	assert_eq!(json["version"], 0x0100);
	assert_eq!(json["root_count"], 3);
	assert_eq!(json["object_roots"], 1);
	assert!(json["description"].as_str().is_some_and(|item| item.starts_with("MATLAB 5.0 MAT-file")));
}

#[test]
fn info_fails_on_missing_file() {
	let output = run_matdoc(&["info", "/nonexistent/matdoc/missing.mat"]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: io:"));
}
