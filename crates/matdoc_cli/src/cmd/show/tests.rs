use crate::cmd::test_support::{run_matdoc, run_matdoc_json, sample_file};

#[test]
fn show_json_resolves_mcos_properties() {
	let path = sample_file();
	let path = path.to_string_lossy().into_owned();
	let json = run_matdoc_json(&["show", &path, "--name", "p", "--json"]);

	let roots = json["roots"].as_array().expect("roots array");
	assert_eq!(roots.len(), 1);

	let point = &roots[0];
	assert_eq!(point["name"], "p");
	assert_eq!(point["kind"], "object");
	assert_eq!(point["class"], "Point");
	assert_eq!(point["class_id"], 1);

	let fields = point["elements"][0].as_array().expect("element 0 fields");
	assert_eq!(fields[0]["field"], "x");
	assert_eq!(fields[0]["value"]["real"], serde_json::json!([4.0]));
	assert_eq!(fields[1]["field"], "label");
	assert_eq!(fields[1]["value"]["text"], "origin");
}

#[test]
fn show_json_without_mcos_keeps_carrier() {
	let path = sample_file();
	let path = path.to_string_lossy().into_owned();
	let json = run_matdoc_json(&["show", &path, "--no-mcos", "--json"]);

	let names: Vec<&str> = json["roots"]
		.as_array()
		.expect("roots array")
		.iter()
		.filter_map(|root| root["name"].as_str())
		.collect();
	assert_eq!(names, vec!["x", "greeting", "p", ""]);
}

#[test]
fn show_text_prints_values() {
	let path = sample_file();
	let path = path.to_string_lossy().into_owned();
	let output = run_matdoc(&["show", &path, "--name", "x", "--name", "greeting"]);
	assert!(output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("x:\n  double 1x3 [1, 2, 3]"));
	assert!(stdout.contains("greeting:\n  \"hello\""));
	assert!(!stdout.contains("p:"));
}

#[test]
fn max_depth_limits_decoding() {
	let path = sample_file();
	let path = path.to_string_lossy().into_owned();
	let output = run_matdoc(&["show", &path, "--name", "p", "--max-depth", "1"]);

	assert!(!output.status.success());
	assert_eq!(
		String::from_utf8_lossy(&output.stderr).trim(),
		"error: decode depth exceeded (max=1)"
	);
}

#[test]
fn print_depth_truncates_json_tree() {
	let path = sample_file();
	let path = path.to_string_lossy().into_owned();
	let json = run_matdoc_json(&["show", &path, "--name", "p", "--print-depth", "0", "--json"]);

	let point = &json["roots"][0];
	assert_eq!(point["class"], "Point");
	assert_eq!(point["truncated"], true);
	assert!(point.get("elements").is_none());
}
