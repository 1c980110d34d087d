use matdoc_testkit::{
	McosBlob, McosProperty, cell_matrix, char_matrix, double_matrix, empty_element, mat_file, mcos_carrier, mcos_header_words, mcos_object,
	struct_matrix, uint32_matrix,
};

use super::{PLACEHOLDER_MAGIC, Placeholder};
use crate::mat::{Array, MatError, MatFile, ReadOptions};

fn point_defaults() -> Vec<Vec<u8>> {
	vec![
		empty_element(),
		struct_matrix(
			"",
			&[1, 1],
			&["x", "color"],
			&[double_matrix("", &[1, 1], &[0.0]), char_matrix("", "red")],
		),
	]
}

/// One `Point` object with `x` on the heap and `label` in the string pool.
fn point_blob() -> McosBlob {
	let mut blob = McosBlob::new();
	let point = blob.class("Point");
	let x = blob.heap_property("x", 0);
	let label = blob.text_property("label", "origin");
	let set = blob.property_set(vec![x, label]);
	blob.object(point, set);
	blob
}

fn file_with(blob: &[u8], placeholder: Vec<u8>) -> Vec<u8> {
	let heap = vec![double_matrix("", &[1, 1], &[3.0])];
	mat_file(&[placeholder, mcos_carrier(blob, &heap, &point_defaults())])
}

fn char_text(array: &Array) -> Option<String> {
	array.as_char().and_then(|chars| chars.as_string())
}

#[test]
fn placeholder_parses_header_words() {
	let words = mcos_header_words([1, 3], &[7, 8, 9], 2);
	let placeholder = Placeholder::from_words("p".to_owned(), &words).expect("placeholder parses");

	assert_eq!(placeholder.dims, vec![1, 3]);
	assert_eq!(placeholder.object_ids, vec![7, 8, 9]);
	assert_eq!(placeholder.class_id, 2);
	assert_eq!(words[..2], PLACEHOLDER_MAGIC);
}

#[test]
fn placeholder_rejects_short_header() {
	let err = Placeholder::from_words(String::new(), &[0xdd00_0000, 2, 1, 1]).expect_err("four words");
	assert!(matches!(err, MatError::BadPlaceholderHeader { .. }));
}

#[test]
fn resolves_properties_and_class_defaults() {
	let bytes = file_with(&point_blob().build(), mcos_object("p", "Point", [1, 1], &[1], 1));
	let file = MatFile::from_bytes(&bytes).expect("file resolves");

	assert_eq!(file.names().collect::<Vec<_>>(), vec!["p"]);
	let object = file.get("p").and_then(Array::as_object).expect("object root");
	assert_eq!(object.class_name, "Point");
	assert_eq!(
		object.field_names(),
		vec![Box::<str>::from("x"), Box::<str>::from("label"), Box::<str>::from("color")]
	);

	let x = object.field(0, "x").expect("x");
	assert_eq!(x.name(), "x");
	assert_eq!(x.as_numeric().and_then(|n| n.get(0, 0)), Some(3.0));
	assert_eq!(object.field(0, "label").as_ref().and_then(char_text).as_deref(), Some("origin"));
	assert_eq!(object.field(0, "color").as_ref().and_then(char_text).as_deref(), Some("red"));
}

#[test]
fn class_name_comes_from_class_table() {
	let bytes = mat_file(&[
		mcos_object("p", "NotPoint", [1, 1], &[1], 1),
		cell_matrix("holder", &[1, 1], &[mcos_object("", "Stale", [1, 1], &[1], 1)]),
		mcos_carrier(&point_blob().build(), &[double_matrix("", &[1, 1], &[3.0])], &point_defaults()),
	]);
	let file = MatFile::from_bytes(&bytes).expect("file resolves");

	let p = file.get("p").and_then(Array::as_object).expect("p");
	assert_eq!(p.class_name, "Point");
	let held = file
		.get("holder")
		.and_then(Array::as_cell)
		.and_then(|cell| cell.get(0, 0))
		.and_then(Array::as_object)
		.expect("object in cell");
	assert_eq!(held.class_name, "Point");
	assert!(held.fields.shares_element(0, &p.fields, 0));
}

#[test]
fn nested_object_property_shares_resolved_slot() {
	let mut blob = McosBlob::new();
	let point = blob.class("Point");
	let next = blob.heap_property("next", 0);
	let outer = blob.property_set(vec![next]);
	let tag = blob.text_property("tag", "inner");
	let inner = blob.property_set(vec![tag]);
	blob.object(point, outer);
	blob.object(point, inner);

	let words = mcos_header_words([1, 1], &[2], point);
	let heap = vec![uint32_matrix("", &[words.len(), 1], &words)];
	let bytes = mat_file(&[
		mcos_object("p", "Point", [1, 1], &[1], 1),
		mcos_object("q", "Point", [1, 1], &[2], 1),
		mcos_carrier(&blob.build(), &heap, &[empty_element()]),
	]);
	let file = MatFile::from_bytes(&bytes).expect("file resolves");

	let p = file.get("p").and_then(Array::as_object).expect("p");
	let q = file.get("q").and_then(Array::as_object).expect("q");
	let next = p.field(0, "next").expect("next property");
	let next = next.as_object().expect("nested object");

	assert_eq!(next.class_name, "Point");
	assert_eq!(next.header.name, "next");
	assert!(next.fields.shares_element(0, &q.fields, 0));
	assert_eq!(next.field(0, "tag").as_ref().and_then(char_text).as_deref(), Some("inner"));
}

#[test]
fn rejects_unsupported_version() {
	let mut blob = point_blob();
	blob.version = 3;
	let err = MatFile::from_bytes(&file_with(&blob.build(), mcos_object("p", "Point", [1, 1], &[1], 1)))
		.expect_err("version 3");
	assert!(matches!(err, MatError::McosUnsupportedVersion { version: 3 }));
}

#[test]
fn rejects_non_zero_reserved_bytes() {
	let mut blob = point_blob().build();
	blob[33] = 1;
	let err = MatFile::from_bytes(&file_with(&blob, mcos_object("p", "Point", [1, 1], &[1], 1))).expect_err("dirty header");
	assert!(matches!(err, MatError::McosNonZeroField { section: "header", at: 32 }));
}

#[test]
fn rejects_class_id_mismatch() {
	let mut blob = point_blob();
	blob.class("Line");
	let err = MatFile::from_bytes(&file_with(&blob.build(), mcos_object("p", "Line", [1, 1], &[1], 2)))
		.expect_err("object 1 is a Point");
	assert!(matches!(
		err,
		MatError::McosClassIdMismatch {
			object_id: 1,
			expected: 2,
			actual: 1
		}
	));
}

#[test]
fn rejects_unknown_object_id() {
	let err = MatFile::from_bytes(&file_with(&point_blob().build(), mcos_object("p", "Point", [1, 1], &[5], 1)))
		.expect_err("one object in table");
	assert!(matches!(err, MatError::McosUnknownObject { object_id: 5, count: 1 }));
}

#[test]
fn rejects_unsupported_property_kind() {
	let mut blob = McosBlob::new();
	let point = blob.class("Point");
	let name = blob.string("x");
	let set = blob.property_set(vec![McosProperty {
		name,
		kind: 2,
		value: 0,
	}]);
	blob.object(point, set);

	let err = MatFile::from_bytes(&file_with(&blob.build(), mcos_object("p", "Point", [1, 1], &[1], 1))).expect_err("kind 2");
	assert!(matches!(err, MatError::McosUnsupportedPropertyKind { kind: 2 }));
}

#[test]
fn placeholder_without_carrier_fails() {
	let bytes = mat_file(&[mcos_object("p", "Point", [1, 1], &[1], 1)]);
	let err = MatFile::from_bytes(&bytes).expect_err("no carrier");
	assert!(matches!(err, MatError::McosDataMissing));
}

#[test]
fn resolution_can_be_disabled() {
	let bytes = file_with(&point_blob().build(), mcos_object("p", "Point", [1, 1], &[1], 1));
	let options = ReadOptions {
		resolve_mcos: false,
		..ReadOptions::default()
	};
	let file = MatFile::read_with(&bytes, &options).expect("file decodes");

	assert_eq!(file.names().collect::<Vec<_>>(), vec!["p", "@0"]);
	let object = file.get("p").and_then(Array::as_object).expect("object root");
	assert!(object.field_names().is_empty());
}
