//! MATLAB Class Object System (MCOS) placeholders and their second-pass resolution.
//!
//! Object arrays decoded in the main pass reference per-object slots in an
//! [`ObjectArena`]. Equal object ids share one slot, so every alias of a handle
//! object observes the same property map once [`resolve`] fills the slots from
//! the carrier blob.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use crate::mat::bytes::{Cursor, align8};
use crate::mat::fields::{FieldMap, FieldTable, SharedFields, refresh_order};
use crate::mat::file::read_content;
use crate::mat::matrix::{DecodeContext, placeholder_words};
use crate::mat::{
	Array, ArrayClass, ArrayHeader, CellArray, CharArray, Endianness, MatError, MatFileKind, ObjectArray, ReadOptions, Result,
};

/// Leading words of every MCOS per-object header.
pub const PLACEHOLDER_MAGIC: [u32; 2] = [0xdd00_0000, 2];
/// Internal class whose opaque payload is the MCOS cell itself.
pub const FILE_WRAPPER_CLASS: &str = "FileWrapper__";

const SUPPORTED_VERSION: u32 = 2;

/// Object ids, shape and class id read from an MCOS per-object header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placeholder {
	pub name: String,
	pub class_id: u32,
	pub object_ids: Vec<u32>,
	pub dims: Vec<usize>,
}

impl Placeholder {
	/// Parse `[0xdd000000, 2, rows, cols, ids.., class_id]`.
	pub(crate) fn from_words(name: String, words: &[u32]) -> Result<Self> {
		if words.len() < 5 || words[..2] != PLACEHOLDER_MAGIC {
			return Err(MatError::BadPlaceholderHeader {
				words: words.iter().take(4).copied().collect(),
			});
		}

		let dims = vec![words[2] as usize, words[3] as usize];
		let object_ids = words[4..words.len() - 1].to_vec();
		let expected = dims[0].saturating_mul(dims[1]);
		if object_ids.len() != expected {
			return Err(MatError::ElementCountMismatch {
				what: "MCOS object ids",
				expected,
				got: object_ids.len(),
			});
		}

		Ok(Self {
			name,
			class_id: words[words.len() - 1],
			object_ids,
			dims,
		})
	}
}

/// Placeholder already turned into an object array, awaiting verification.
struct Bound {
	placeholder: Placeholder,
	order: Rc<RefCell<Vec<Box<str>>>>,
}

/// Object id to shared property map, plus every bound placeholder.
#[derive(Default)]
pub(crate) struct ObjectArena {
	slots: HashMap<u32, SharedFields>,
	bound: Vec<Bound>,
}

impl ObjectArena {
	/// Shared slot for one object id, created empty on first use.
	pub(crate) fn slot(&mut self, object_id: u32) -> SharedFields {
		Rc::clone(self.slots.entry(object_id).or_default())
	}

	/// Whether any placeholder was seen.
	pub(crate) fn has_placeholders(&self) -> bool {
		!self.bound.is_empty()
	}

	/// Build the object array for a placeholder over shared slots.
	pub(crate) fn bind(&mut self, placeholder: Placeholder, mut header: ArrayHeader, class_name: String) -> ObjectArray {
		let slots = placeholder.object_ids.iter().map(|id| self.slot(*id)).collect();
		let fields = FieldTable::from_shared(slots);

		header.dims = placeholder.dims.clone();
		header.class = ArrayClass::Object;
		let class_id = placeholder.class_id;
		trace!(
			"MCOS placeholder '{}' class {} objects {:?}",
			placeholder.name, class_id, placeholder.object_ids
		);
		self.bound.push(Bound {
			placeholder,
			order: fields.order_handle(),
		});

		ObjectArray {
			header,
			class_name,
			class_id: Some(class_id),
			fields,
		}
	}
}

/// One row of the object table.
#[derive(Debug, Clone, Copy)]
struct ObjectRecord {
	class_id: u32,
	properties: u32,
}

/// Bind every registered placeholder to its properties from the carrier bytes.
///
/// Resolved objects in `content` take their class name from the class table.
pub(crate) fn resolve(carrier: &[u8], ctx: &mut DecodeContext<'_>, content: &mut FieldMap) -> Result<()> {
	let options = ReadOptions::for_mcos_carrier(ctx.options);
	let (_, carrier_content) = read_content(carrier, MatFileKind::ReducedHeader, &options)?;
	let mcos = find_mcos_cell(carrier_content)?;

	let blob = match mcos.cells.first() {
		Some(Array::Numeric(numeric)) if numeric.header.class == ArrayClass::UInt8 => numeric.real.to_bytes(ctx.endianness),
		_ => {
			return Err(MatError::McosMalformed {
				detail: "first MCOS cell is not a uint8 array".to_owned(),
			});
		}
	};

	let mut reader = SegmentReader {
		cursor: Cursor::new(&blob),
		endianness: ctx.endianness,
	};

	let version = reader.u32()?;
	if version != SUPPORTED_VERSION {
		return Err(MatError::McosUnsupportedVersion { version });
	}
	let string_count = reader.u32()? as usize;
	let mut offsets = [0_usize; 6];
	for offset in &mut offsets {
		*offset = reader.u32()? as usize;
	}
	reader.zeros("header", 8)?;

	let mut strings = Vec::with_capacity(string_count.min(blob.len()));
	for _ in 0..string_count {
		strings.push(String::from_utf8_lossy(reader.cursor.read_cstring_bytes()?).into_owned());
	}
	let strings_end = align8(reader.cursor.pos());
	if strings_end != offsets[0] {
		return Err(MatError::McosSegmentMismatch {
			section: "strings",
			at: strings_end,
			expected: offsets[0],
		});
	}
	debug!("MCOS: {} strings, segments {:?}", strings.len(), offsets);

	let classes = read_classes(&mut reader, &strings, &offsets)?;
	reader.cursor.seek(offsets[2])?;
	let objects = read_objects(&mut reader, classes.len(), &offsets)?;
	let property_sets = read_property_sets(&mut reader, ctx, &strings, &classes, &mcos, &offsets)?;
	debug!(
		"MCOS: {} classes, {} objects, {} property sets",
		classes.len(),
		objects.len(),
		property_sets.len()
	);

	let defaults = match mcos.cells.last() {
		Some(Array::Cell(defaults)) => defaults,
		_ => {
			return Err(MatError::McosMalformed {
				detail: "last MCOS cell is not a cell of class defaults".to_owned(),
			});
		}
	};

	for (index, record) in objects.iter().enumerate() {
		let object_id = index as u32 + 1;
		let mut map = record
			.properties
			.checked_sub(1)
			.and_then(|set| property_sets.get(set as usize))
			.cloned()
			.ok_or(MatError::McosPropertiesNotFound { object_id })?;

		merge_class_defaults(&mut map, defaults, record.class_id)?;
		*ctx.objects.slot(object_id).borrow_mut() = map;
	}

	for bound in std::mem::take(&mut ctx.objects.bound) {
		let placeholder = &bound.placeholder;
		let mut slots = Vec::with_capacity(placeholder.object_ids.len());
		for object_id in &placeholder.object_ids {
			let record = object_id
				.checked_sub(1)
				.and_then(|index| objects.get(index as usize))
				.ok_or(MatError::McosUnknownObject {
					object_id: *object_id,
					count: objects.len(),
				})?;
			if record.class_id != placeholder.class_id {
				return Err(MatError::McosClassIdMismatch {
					object_id: *object_id,
					expected: placeholder.class_id,
					actual: record.class_id,
				});
			}
			slots.push(ctx.objects.slot(*object_id));
		}
		refresh_order(&bound.order, &slots);
	}

	for array in content.values_mut() {
		apply_class_names(array, &classes);
	}
	Ok(())
}

/// Rename resolved objects after their class-table entry.
///
/// Property maps of resolved objects are not entered; nested objects there were
/// already named from the table.
fn apply_class_names(array: &mut Array, classes: &[String]) {
	match array {
		Array::Object(object) => match object.class_id {
			Some(class_id) => {
				let Some(name) = class_id.checked_sub(1).and_then(|index| classes.get(index as usize)) else {
					return;
				};
				if object.class_name != *name {
					trace!("MCOS object '{}' renamed from {} to {}", object.header.name, object.class_name, name);
					object.class_name = name.clone();
				}
			}
			None => apply_in_table(&object.fields, classes),
		},
		Array::Struct(structure) => apply_in_table(&structure.fields, classes),
		Array::Cell(cell) => {
			for item in &mut cell.cells {
				apply_class_names(item, classes);
			}
		}
		Array::Handle(handle) => {
			for item in &mut handle.content.cells {
				apply_class_names(item, classes);
			}
		}
		_ => {}
	}
}

fn apply_in_table(fields: &FieldTable, classes: &[String]) {
	for element in fields.created_elements() {
		for value in element.borrow_mut().values_mut() {
			apply_class_names(value, classes);
		}
	}
}

fn find_mcos_cell(content: FieldMap) -> Result<CellArray> {
	for (_, array) in content {
		let Array::Struct(structure) = array else {
			continue;
		};
		if let Some(Array::Cell(cell)) = structure.field(0, "MCOS") {
			return Ok(cell);
		}
	}
	Err(MatError::McosMalformed {
		detail: "carrier has no struct with an MCOS cell".to_owned(),
	})
}

fn merge_class_defaults(map: &mut FieldMap, defaults: &CellArray, class_id: u32) -> Result<()> {
	match defaults.cells.get(class_id as usize) {
		Some(Array::Struct(structure)) => {
			for (name, value) in structure.fields.ordered_entries(0) {
				if !map.contains(&name) {
					map.insert(name, value);
				}
			}
			Ok(())
		}
		Some(Array::Empty(_)) | None => Ok(()),
		Some(other) => Err(MatError::McosMalformed {
			detail: format!("class {} defaults are a {} array", class_id, other.kind()),
		}),
	}
}

struct SegmentReader<'a> {
	cursor: Cursor<'a>,
	endianness: Endianness,
}

impl SegmentReader<'_> {
	fn u32(&mut self) -> Result<u32> {
		self.cursor.read_u32(self.endianness)
	}

	fn zeros(&mut self, section: &'static str, len: usize) -> Result<()> {
		let at = self.cursor.pos();
		if self.cursor.read_exact(len)?.iter().any(|byte| *byte != 0) {
			return Err(MatError::McosNonZeroField { section, at });
		}
		Ok(())
	}

	fn expect_at(&self, section: &'static str, expected: usize) -> Result<()> {
		let at = self.cursor.pos();
		if at != expected {
			return Err(MatError::McosSegmentMismatch { section, at, expected });
		}
		Ok(())
	}
}

fn lookup<'s>(strings: &'s [String], index: u32) -> Result<&'s str> {
	index
		.checked_sub(1)
		.and_then(|index| strings.get(index as usize))
		.map(String::as_str)
		.ok_or(MatError::McosStringIndex {
			index,
			count: strings.len(),
		})
}

fn read_classes(reader: &mut SegmentReader<'_>, strings: &[String], offsets: &[usize; 6]) -> Result<Vec<String>> {
	reader.cursor.seek(offsets[0])?;
	reader.zeros("class", 16)?;

	let mut classes = Vec::new();
	while reader.cursor.pos() < offsets[1] {
		let _package = reader.u32()?;
		let name = lookup(strings, reader.u32()?)?;
		classes.push(name.to_owned());
		reader.zeros("class", 8)?;
	}
	reader.expect_at("class", offsets[1])?;
	Ok(classes)
}

fn read_objects(reader: &mut SegmentReader<'_>, class_count: usize, offsets: &[usize; 6]) -> Result<Vec<ObjectRecord>> {
	reader.zeros("object", 24)?;

	let mut objects = Vec::new();
	while reader.cursor.pos() < offsets[3] {
		let class_id = reader.u32()?;
		if class_id == 0 || class_id as usize > class_count {
			return Err(MatError::McosClassIndex {
				index: class_id,
				count: class_count,
			});
		}
		reader.zeros("object", 8)?;
		let _segment2 = reader.u32()?;
		let properties = reader.u32()?;
		// Per-save value with no known meaning.
		reader.cursor.skip(4)?;
		objects.push(ObjectRecord { class_id, properties });
	}
	reader.expect_at("object", offsets[3])?;
	Ok(objects)
}

fn read_property_sets(
	reader: &mut SegmentReader<'_>,
	ctx: &mut DecodeContext<'_>,
	strings: &[String],
	classes: &[String],
	mcos: &CellArray,
	offsets: &[usize; 6],
) -> Result<Vec<FieldMap>> {
	reader.zeros("property", 8)?;

	let mut sets = Vec::new();
	while reader.cursor.pos() < offsets[4] {
		let count = reader.u32()?;
		let mut set = FieldMap::new();
		for _ in 0..count {
			let name = lookup(strings, reader.u32()?)?;
			let kind = reader.u32()?;
			let heap_index = reader.u32()?;

			let value = match kind {
				0 => Array::Char(CharArray::from_text(name, lookup(strings, heap_index)?)),
				1 => heap_value(ctx, mcos, classes, name, heap_index)?,
				other => return Err(MatError::McosUnsupportedPropertyKind { kind: other }),
			};
			set.insert(name, value);
		}
		sets.push(set);
		reader.cursor.align8()?;
	}
	reader.expect_at("property", offsets[4])?;
	Ok(sets)
}

/// Property stored in the MCOS cell; nested object headers become bound objects.
fn heap_value(ctx: &mut DecodeContext<'_>, mcos: &CellArray, classes: &[String], name: &str, heap_index: u32) -> Result<Array> {
	let mut value = mcos
		.cells
		.get(heap_index as usize + 2)
		.cloned()
		.ok_or_else(|| MatError::McosMalformed {
			detail: format!("property '{}' heap index {} out of range", name, heap_index),
		})?;

	if let Some(words) = placeholder_words(&value).filter(|words| words.starts_with(&PLACEHOLDER_MAGIC)) {
		let placeholder = Placeholder::from_words(name.to_owned(), words)?;
		let class_name = placeholder
			.class_id
			.checked_sub(1)
			.and_then(|index| classes.get(index as usize))
			.cloned()
			.ok_or(MatError::McosClassIndex {
				index: placeholder.class_id,
				count: classes.len(),
			})?;
		let header = ArrayHeader::new(name, Vec::new(), ArrayClass::Object);
		return Ok(Array::Object(ctx.objects.bind(placeholder, header, class_name)));
	}

	value.set_name(name);
	Ok(value)
}

#[cfg(test)]
mod tests;
