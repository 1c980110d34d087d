#![allow(missing_docs)]

use matdoc::mat::{Array, ArrayClass, ArrayFilter, MatFile, ReadOptions};
use matdoc_testkit::{
	MI_UINT8, MX_UINT8, cell_matrix, char_matrix, compressed, double_matrix, element, mat_file, matrix, object_matrix,
	sparse_matrix, struct_matrix, write_temp,
};

#[test]
fn mixed_file_decodes_every_root_in_order() {
	let bytes = mat_file(&[
		double_matrix("x", &[1, 3], &[1.0, 2.0, 3.0]),
		sparse_matrix("sp", &[3, 3], &[0, 2, 1], &[0, 2, 2, 3], &[1.0, 2.0, 3.0]),
		compressed(&cell_matrix(
			"c",
			&[2, 1],
			&[char_matrix("", "alpha"), struct_matrix("", &[1, 1], &["v"], &[double_matrix("", &[1, 1], &[7.0])])],
		)),
		object_matrix("legacy", "Polynom", &[1, 1], &["coef"], &[double_matrix("", &[1, 2], &[1.0, -1.0])]),
	]);
	let file = MatFile::from_bytes(&bytes).expect("file decodes");

	assert_eq!(file.names().collect::<Vec<_>>(), vec!["x", "sp", "c", "legacy"]);

	let sparse = file.get("sp").and_then(Array::as_sparse).expect("sparse root");
	assert_eq!(sparse.get(2, 0), 2.0);
	assert_eq!(sparse.get(1, 2), 3.0);
	assert_eq!(sparse.nzmax(), 3);

	let cell = file.get("c").and_then(Array::as_cell).expect("cell root");
	assert_eq!(cell.get(0, 0).and_then(Array::as_char).and_then(|c| c.as_string()).as_deref(), Some("alpha"));
	let inner = cell.get(1, 0).and_then(Array::as_struct).expect("struct in cell");
	assert_eq!(inner.field(0, "v").and_then(|v| v.as_numeric().and_then(|n| n.get(0, 0))), Some(7.0));

	let legacy = file.get("legacy").and_then(Array::as_object).expect("legacy object");
	assert_eq!(legacy.class_name, "Polynom");
	assert_eq!(legacy.class_id, None);
	assert_eq!(legacy.field(0, "coef").map(|coef| coef.dims().to_vec()), Some(vec![1, 2]));
}

#[test]
fn logical_flag_is_reported() {
	let bytes = mat_file(&[matrix(MX_UINT8, 0x0200, &[1, 2], "mask", &element(MI_UINT8, &[1, 0]))]);
	let file = MatFile::from_bytes(&bytes).expect("file decodes");
	let mask = file.get("mask").expect("mask root");

	assert!(mask.flags().is_logical());
	assert_eq!(mask.class(), ArrayClass::UInt8);
}

#[test]
fn open_reads_from_disk_with_filter() {
	let path = write_temp("roots", &mat_file(&[
		double_matrix("a", &[1, 1], &[1.0]),
		double_matrix("b", &[1, 1], &[2.0]),
	]));

	let options = ReadOptions::with_filter(ArrayFilter::from_names(["b"]));
	let file = MatFile::open_with(&path, &options).expect("file opens");
	assert_eq!(file.names().collect::<Vec<_>>(), vec!["b"]);

	let all = MatFile::open(&path).expect("file opens");
	assert_eq!(all.len(), 2);
	let _ = std::fs::remove_file(path);
}
