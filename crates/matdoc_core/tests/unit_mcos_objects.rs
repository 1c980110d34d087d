#![allow(missing_docs)]

use matdoc::mat::{Array, MatFile, ObjectArray};
use matdoc_testkit::{
	McosBlob, cell_matrix, char_matrix, compressed, double_matrix, empty_element, mat_file, mcos_carrier, mcos_object, struct_matrix,
};

#[test]
fn equal_object_ids_share_one_property_map() {
	let mut blob = McosBlob::new();
	let counter = blob.class("Counter");
	let count = blob.heap_property("count", 0);
	let set = blob.property_set(vec![count]);
	blob.object(counter, set);

	let bytes = mat_file(&[
		mcos_object("a", "Counter", [1, 1], &[1], counter),
		mcos_object("b", "Counter", [1, 1], &[1], counter),
		mcos_carrier(&blob.build(), &[double_matrix("", &[1, 1], &[41.0])], &[empty_element()]),
	]);
	let file = MatFile::from_bytes(&bytes).expect("file resolves");

	let a = object(&file, "a");
	let b = object(&file, "b");
	assert!(a.fields.shares_element(0, &b.fields, 0));

	let shared = a.fields.element(0).expect("element 0");
	shared.borrow_mut().insert("count", double_matrix_value(42.0));
	assert_eq!(count_of(b), Some(42.0));
}

#[test]
fn class_defaults_fill_missing_properties_only() {
	let mut blob = McosBlob::new();
	let config = blob.class("Config");
	let mode = blob.text_property("mode", "fast");
	let with_mode = blob.property_set(vec![mode]);
	let bare = blob.property_set(Vec::new());
	let first = blob.object(config, with_mode);
	let second = blob.object(config, bare);

	let defaults = vec![
		empty_element(),
		struct_matrix(
			"",
			&[1, 1],
			&["mode", "retries"],
			&[char_matrix("", "safe"), double_matrix("", &[1, 1], &[3.0])],
		),
	];
	let bytes = mat_file(&[
		mcos_object("configs", "Config", [1, 2], &[first, second], config),
		mcos_carrier(&blob.build(), &[], &defaults),
	]);
	let file = MatFile::from_bytes(&bytes).expect("file resolves");
	let configs = object(&file, "configs");

	assert_eq!(configs.header.dims, vec![1, 2]);
	assert_eq!(text(configs, 0, "mode").as_deref(), Some("fast"));
	assert_eq!(text(configs, 1, "mode").as_deref(), Some("safe"));
	assert_eq!(
		configs.field(1, "retries").and_then(|value| value.as_numeric().and_then(|n| n.get(0, 0))),
		Some(3.0)
	);
	assert!(!configs.fields.shares_element(0, &configs.fields, 1));
}

#[test]
fn objects_inside_cells_and_compressed_elements_resolve() {
	let mut blob = McosBlob::new();
	let point = blob.class("Point");
	let label = blob.text_property("label", "p1");
	let set = blob.property_set(vec![label]);
	let id = blob.object(point, set);

	let holder = cell_matrix("holder", &[1, 1], &[mcos_object("", "Point", [1, 1], &[id], point)]);
	let bytes = mat_file(&[
		compressed(&holder),
		compressed(&mcos_carrier(&blob.build(), &[], &[empty_element()])),
	]);
	let file = MatFile::from_bytes(&bytes).expect("file resolves");

	assert_eq!(file.names().collect::<Vec<_>>(), vec!["holder"]);
	let cell = file.get("holder").and_then(Array::as_cell).expect("cell root");
	let point = cell.get(0, 0).and_then(Array::as_object).expect("object in cell");
	assert_eq!(point.class_name, "Point");
	assert_eq!(text(point, 0, "label").as_deref(), Some("p1"));
}

fn object<'f>(file: &'f MatFile, name: &str) -> &'f ObjectArray {
	file.get(name).and_then(Array::as_object).expect("object root")
}

fn text(object: &ObjectArray, index: usize, name: &str) -> Option<String> {
	object.field(index, name)?.as_char()?.as_string()
}

fn count_of(object: &ObjectArray) -> Option<f64> {
	object.field(0, "count")?.as_numeric()?.get(0, 0)
}

fn double_matrix_value(value: f64) -> Array {
	let bytes = mat_file(&[double_matrix("count", &[1, 1], &[value])]);
	let file = MatFile::from_bytes(&bytes).expect("value decodes");
	file.into_content().remove("count").expect("count root")
}
