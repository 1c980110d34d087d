use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use matdoc_testkit::{McosBlob, char_matrix, double_matrix, empty_element, mat_file, mcos_carrier, mcos_object, write_temp};

static MATDOC_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Sample file: a row vector, a char array and one resolved `Point` object.
pub(crate) fn sample_file() -> PathBuf {
	let mut blob = McosBlob::new();
	let point = blob.class("Point");
	let x = blob.heap_property("x", 0);
	let label = blob.text_property("label", "origin");
	let set = blob.property_set(vec![x, label]);
	let id = blob.object(point, set);

	let bytes = mat_file(&[
		double_matrix("x", &[1, 3], &[1.0, 2.0, 3.0]),
		char_matrix("greeting", "hello"),
		mcos_object("p", "Point", [1, 1], &[id], point),
		mcos_carrier(&blob.build(), &[double_matrix("", &[1, 1], &[4.0])], &[empty_element()]),
	]);
	write_temp("cli", &bytes)
}

pub(crate) fn run_matdoc(args: &[&str]) -> Output {
	Command::new(matdoc_bin()).args(args).output().expect("matdoc command executes")
}

pub(crate) fn run_matdoc_json(args: &[&str]) -> serde_json::Value {
	let output = run_matdoc(args);
	assert!(
		output.status.success(),
		"matdoc command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn matdoc_bin() -> &'static PathBuf {
	MATDOC_BIN.get_or_init(resolve_matdoc_bin)
}

fn resolve_matdoc_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_matdoc") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let mut bin = matdoc_testkit::target_dir().join("debug");
	bin.push(if cfg!(windows) { "matdoc.exe" } else { "matdoc" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "matdoc"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build matdoc binary at {}", bin.display());

	bin
}
