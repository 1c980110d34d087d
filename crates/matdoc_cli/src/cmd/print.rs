use matdoc::mat::{Array, CharArray, FieldTable, NumericArray};
use serde_json::{Value, json};

use crate::cmd::util::{class_label, shape_label};

/// Output truncation limits for decoded arrays.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of values, cells or struct elements printed per array.
	pub max_items: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum recursive print depth for nested arrays.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_items: 16,
			max_string_len: 200,
			max_print_depth: 6,
		}
	}
}

/// Print one decoded array tree.
pub fn print_array(array: &Array, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	let head = format!("{} {}", class_label(array), shape_label(array));

	match array {
		Array::Empty(_) => println!("{pad}[]"),
		Array::Numeric(numeric) => println!("{pad}{head} {}", numeric_values(numeric, options.max_items)),
		Array::Char(chars) if chars.header.rows() <= 1 => {
			println!("{pad}\"{}\"", truncate(chars.row_chars(0), options.max_string_len));
		}
		Array::Char(chars) => {
			println!("{pad}{head}");
			for m in 0..chars.header.rows().min(options.max_items) {
				println!("{pad}  \"{}\"", truncate(chars.row_chars(m), options.max_string_len));
			}
		}
		Array::Java(java) => println!("{pad}{head} bytes[{}]", java.bytes.len()),
		_ if depth >= options.max_print_depth => println!("{pad}{head} {{ ... }}"),
		Array::Cell(cell) => {
			println!("{pad}{head} {{");
			print_items(&cell.cells, indent, depth, options);
			println!("{pad}}}");
		}
		Array::Handle(handle) => {
			println!("{pad}{head} {{");
			print_items(&handle.content.cells, indent, depth, options);
			println!("{pad}}}");
		}
		Array::Struct(structure) => print_fields(&head, &structure.fields, indent, depth, options),
		Array::Object(object) => print_fields(&head, &object.fields, indent, depth, options),
		Array::Sparse(sparse) => {
			println!("{pad}{head} nnz={} {{", sparse.nnz());
			for (row, col, value) in sparse.entries().take(options.max_items) {
				println!("{pad}  ({row}, {col}) = {value}");
			}
			if sparse.nnz() > options.max_items {
				println!("{pad}  ... {} more", sparse.nnz() - options.max_items);
			}
			println!("{pad}}}");
		}
	}
}

fn print_items(items: &[Array], indent: usize, depth: u32, options: PrintOptions) {
	for item in items.iter().take(options.max_items) {
		print_array(item, indent + 2, depth + 1, options);
	}
	if items.len() > options.max_items {
		println!("{}  ... {} more", " ".repeat(indent), items.len() - options.max_items);
	}
}

fn print_fields(head: &str, fields: &FieldTable, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	println!("{pad}{head} {{");
	let inner = if fields.len() > 1 { indent + 2 } else { indent };
	for index in 0..fields.len().min(options.max_items) {
		if fields.len() > 1 {
			println!("{pad}  [{index}]");
		}
		for (name, value) in fields.ordered_entries(index) {
			print!("{}  {} = ", " ".repeat(inner), name);
			if is_inline(&value) {
				print_array(&value, 0, depth + 1, options);
			} else {
				println!();
				print_array(&value, inner + 4, depth + 1, options);
			}
		}
	}
	if fields.len() > options.max_items {
		println!("{pad}  ... {} more", fields.len() - options.max_items);
	}
	println!("{pad}}}");
}

fn is_inline(array: &Array) -> bool {
	match array {
		Array::Empty(_) | Array::Numeric(_) | Array::Java(_) => true,
		Array::Char(chars) => chars.header.rows() <= 1,
		_ => false,
	}
}

fn numeric_values(numeric: &NumericArray, max_items: usize) -> String {
	let real = numeric.real.to_f64_vec();
	let imag = numeric.imag.as_ref().map(|imag| imag.to_f64_vec());

	let mut items: Vec<String> = real
		.iter()
		.enumerate()
		.take(max_items)
		.map(|(index, re)| match imag.as_ref().and_then(|imag| imag.get(index)) {
			Some(im) if *im < 0.0 => format!("{re}-{}i", -im),
			Some(im) => format!("{re}+{im}i"),
			None => format!("{re}"),
		})
		.collect();
	if real.len() > max_items {
		items.push(format!("... {} more", real.len() - max_items));
	}
	format!("[{}]", items.join(", "))
}

fn truncate(mut input: impl Iterator<Item = char>, max_len: usize) -> String {
	let mut out: String = input.by_ref().take(max_len).collect();
	if input.next().is_some() {
		out.push_str("...");
	}
	out
}

/// Render one decoded array tree as JSON.
pub fn array_json(array: &Array, depth: u32, options: PrintOptions) -> Value {
	let mut out = json!({
		"name": array.name(),
		"kind": array.kind(),
		"class": class_label(array),
		"dims": array.dims(),
	});

	let body = match array {
		Array::Empty(_) => None,
		Array::Numeric(numeric) => Some(json!({
			"real": numeric.real.to_f64_vec(),
			"imag": numeric.imag.as_ref().map(|imag| imag.to_f64_vec()),
		})),
		Array::Char(chars) => Some(json!({ "text": char_json(chars) })),
		Array::Java(java) => Some(json!({ "bytes": java.bytes.len() })),
		_ if depth >= options.max_print_depth => Some(json!({ "truncated": true })),
		Array::Cell(cell) => Some(json!({ "cells": items_json(&cell.cells, depth, options) })),
		Array::Handle(handle) => Some(json!({ "cells": items_json(&handle.content.cells, depth, options) })),
		Array::Struct(structure) => Some(json!({ "elements": fields_json(&structure.fields, depth, options) })),
		Array::Object(object) => Some(json!({
			"class_id": object.class_id,
			"elements": fields_json(&object.fields, depth, options),
		})),
		Array::Sparse(sparse) => Some(json!({
			"nnz": sparse.nnz(),
			"entries": sparse.entries().map(|(row, col, value)| json!([row, col, value])).collect::<Vec<_>>(),
		})),
	};

	if let (Value::Object(map), Some(Value::Object(body))) = (&mut out, body) {
		map.extend(body);
	}
	out
}

fn char_json(chars: &CharArray) -> Value {
	match chars.as_string() {
		Some(text) => Value::String(text),
		None => json!(chars.rows_as_strings()),
	}
}

fn items_json(items: &[Array], depth: u32, options: PrintOptions) -> Vec<Value> {
	items.iter().map(|item| array_json(item, depth + 1, options)).collect()
}

/// Struct elements as ordered `{name, value}` lists.
fn fields_json(fields: &FieldTable, depth: u32, options: PrintOptions) -> Vec<Value> {
	(0..fields.len().min(options.max_items))
		.map(|index| {
			let entries: Vec<Value> = fields
				.ordered_entries(index)
				.iter()
				.map(|(name, value)| json!({ "field": &**name, "value": array_json(value, depth + 1, options) }))
				.collect();
			Value::Array(entries)
		})
		.collect()
}
