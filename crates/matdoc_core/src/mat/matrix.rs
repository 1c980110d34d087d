use std::collections::BTreeMap;

use log::{trace, warn};

use crate::mat::array::checked_product;
use crate::mat::bytes::Cursor;
use crate::mat::fields::FieldTable;
use crate::mat::mcos::{FILE_WRAPPER_CLASS, ObjectArena, Placeholder};
use crate::mat::primitive::{decode_text, read_text, read_values};
use crate::mat::tag::{DataType, Tag};
use crate::mat::{
	Array, ArrayClass, ArrayFlags, ArrayHeader, CellArray, CharArray, EmptyArray, Endianness, HandleObject, JavaObject, MatError,
	NumericArray, NumericData, ObjectArray, ReadOptions, Result, SparseArray, SparseIndex, StructArray,
};

/// Per-read state threaded through the recursive decoder.
pub(crate) struct DecodeContext<'o> {
	/// Byte order of the stream being decoded.
	pub endianness: Endianness,
	/// Options for this read.
	pub options: &'o ReadOptions,
	/// Object slots and placeholders awaiting MCOS resolution.
	pub objects: ObjectArena,
	/// Synthetic root name of the latest anonymous `uint8` root, the MCOS carrier candidate.
	pub carrier: Option<String>,
	depth: u32,
}

impl<'o> DecodeContext<'o> {
	pub(crate) fn new(endianness: Endianness, options: &'o ReadOptions) -> Self {
		Self {
			endianness,
			options,
			objects: ObjectArena::default(),
			carrier: None,
			depth: 0,
		}
	}
}

/// Flags, dimensions and name that open every matrix element.
struct Prelude {
	attributes: u32,
	nzmax: usize,
	dims: Vec<i32>,
	name: String,
}

impl Prelude {
	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let flags = read_values::<u32>(cursor, endianness)?;
		let dims = read_values::<i32>(cursor, endianness)?;
		let name = read_text(cursor, endianness)?;
		Ok(Self {
			attributes: flags.first().copied().unwrap_or(0),
			nzmax: flags.get(1).copied().unwrap_or(0) as usize,
			dims,
			name,
		})
	}

	fn class_code(&self) -> u8 {
		(self.attributes & 0xff) as u8
	}

	/// Opaque elements store the variable name in the dimensions slot.
	fn opaque_name(&self) -> String {
		let bytes: Vec<u8> = self.dims.iter().map(|value| *value as u8).collect();
		String::from_utf8_lossy(&bytes).into_owned()
	}

	/// Name matched against the root filter.
	fn variable_name(&self) -> String {
		if self.class_code() == ArrayClass::Opaque.code() {
			self.opaque_name()
		} else {
			self.name.clone()
		}
	}
}

/// Decode one top-level matrix element body, or `None` when the filter excludes it.
///
/// Anonymous `uint8` roots are always decoded since they may carry MCOS data.
pub(crate) fn read_root_matrix(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>) -> Result<Option<Array>> {
	let prelude = Prelude::read(cursor, ctx.endianness)?;
	let name = prelude.variable_name();
	let carrier_candidate = name.is_empty() && prelude.class_code() == ArrayClass::UInt8.code();
	if !carrier_candidate && !ctx.options.filter.matches(&name) {
		trace!("skipping filtered root '{}'", name);
		return Ok(None);
	}
	decode_body(cursor, ctx, prelude).map(Some)
}

/// Decode one nested matrix element body.
pub(crate) fn read_matrix(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>) -> Result<Array> {
	let prelude = Prelude::read(cursor, ctx.endianness)?;
	decode_body(cursor, ctx, prelude)
}

fn decode_body(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, prelude: Prelude) -> Result<Array> {
	let max_depth = ctx.options.max_depth;
	if ctx.depth >= max_depth {
		return Err(MatError::DecodeDepthExceeded { max_depth });
	}

	ctx.depth += 1;
	let out = dispatch(cursor, ctx, prelude);
	ctx.depth -= 1;
	out
}

fn dispatch(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, prelude: Prelude) -> Result<Array> {
	let code = prelude.class_code();
	let class = ArrayClass::from_code(code).ok_or(MatError::UnsupportedClass { class: code })?;
	let flags = ArrayFlags(prelude.attributes);

	if class == ArrayClass::Opaque {
		let var_name = prelude.opaque_name();
		return read_opaque(cursor, ctx, &prelude.name, var_name, flags);
	}

	let header = ArrayHeader {
		name: prelude.name,
		dims: checked_dims(&prelude.dims)?,
		class,
		flags,
	};
	trace!("matrix '{}' {} {}", header.name, class.as_str(), header.shape());

	match class {
		ArrayClass::Cell => read_cell(cursor, ctx, header).map(Array::Cell),
		ArrayClass::Struct => {
			let fields = read_fields(cursor, ctx, header.element_count())?;
			Ok(Array::Struct(StructArray { header, fields }))
		}
		ArrayClass::Object => {
			let class_name = read_text(cursor, ctx.endianness)?;
			let fields = read_fields(cursor, ctx, header.element_count())?;
			Ok(Array::Object(ObjectArray {
				header,
				class_name,
				class_id: None,
				fields,
			}))
		}
		ArrayClass::Char => read_char(cursor, ctx.endianness, header).map(Array::Char),
		ArrayClass::Sparse => read_sparse(cursor, ctx.endianness, header, prelude.nzmax).map(Array::Sparse),
		ArrayClass::Function | ArrayClass::Opaque => Err(MatError::UnsupportedClass { class: code }),
		_ => read_numeric(cursor, ctx.endianness, header).map(Array::Numeric),
	}
}

fn checked_dims(raw: &[i32]) -> Result<Vec<usize>> {
	let invalid = || MatError::InvalidDimensions {
		dims: raw.iter().map(|dim| i64::from(*dim)).collect(),
	};
	if raw.len() < 2 || raw.iter().any(|dim| *dim < 0) {
		return Err(invalid());
	}

	let dims: Vec<usize> = raw.iter().map(|dim| *dim as usize).collect();
	if checked_product(&dims).is_none() {
		return Err(invalid());
	}
	Ok(dims)
}

fn read_numeric_data(cursor: &mut Cursor<'_>, endianness: Endianness, class: ArrayClass) -> Result<NumericData> {
	Ok(match class {
		ArrayClass::Int8 => NumericData::Int8(read_values(cursor, endianness)?),
		ArrayClass::UInt8 => NumericData::UInt8(read_values(cursor, endianness)?),
		ArrayClass::Int16 => NumericData::Int16(read_values(cursor, endianness)?),
		ArrayClass::UInt16 => NumericData::UInt16(read_values(cursor, endianness)?),
		ArrayClass::Int32 => NumericData::Int32(read_values(cursor, endianness)?),
		ArrayClass::UInt32 => NumericData::UInt32(read_values(cursor, endianness)?),
		ArrayClass::Int64 => NumericData::Int64(read_values(cursor, endianness)?),
		ArrayClass::UInt64 => NumericData::UInt64(read_values(cursor, endianness)?),
		ArrayClass::Single => NumericData::Single(read_values(cursor, endianness)?),
		ArrayClass::Double => NumericData::Double(read_values(cursor, endianness)?),
		other => return Err(MatError::UnsupportedClass { class: other.code() }),
	})
}

fn read_numeric(cursor: &mut Cursor<'_>, endianness: Endianness, header: ArrayHeader) -> Result<NumericArray> {
	let expected = header.element_count();

	let real = read_numeric_data(cursor, endianness, header.class)?;
	check_count("real part", expected, real.len())?;

	let imag = if header.flags.is_complex() {
		let imag = read_numeric_data(cursor, endianness, header.class)?;
		check_count("imaginary part", expected, imag.len())?;
		Some(imag)
	} else {
		None
	};

	Ok(NumericArray { header, real, imag })
}

fn check_count(what: &'static str, expected: usize, got: usize) -> Result<()> {
	if expected != got {
		return Err(MatError::ElementCountMismatch { what, expected, got });
	}
	Ok(())
}

fn read_char(cursor: &mut Cursor<'_>, endianness: Endianness, header: ArrayHeader) -> Result<CharArray> {
	let tag = Tag::read(cursor, endianness)?;
	let payload = tag.read_payload(cursor)?;
	let chars = decode_text(payload, tag.data_type, endianness);

	let expected = header.element_count();
	if chars.len() > expected {
		return Err(MatError::ElementCountMismatch {
			what: "char data",
			expected,
			got: chars.len(),
		});
	}

	Ok(CharArray { header, chars })
}

/// Read the tag of one nested element and decode it; a zero-size element is empty.
fn read_child(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>) -> Result<Array> {
	let tag = Tag::read(cursor, ctx.endianness)?;
	if tag.size == 0 {
		cursor.skip(tag.padding())?;
		return Ok(Array::Empty(EmptyArray::default()));
	}
	tag.expect(DataType::Matrix)?;
	read_tagged_matrix(cursor, ctx, &tag)
}

/// Decode the matrix body framed by an already-read `miMATRIX` tag.
fn read_tagged_matrix(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, tag: &Tag) -> Result<Array> {
	let body = tag.read_payload(cursor)?;
	let mut inner = Cursor::new(body);
	let array = read_matrix(&mut inner, ctx)?;
	if inner.remaining() != 0 {
		warn!("nested matrix '{}' left {} bytes unread", array.name(), inner.remaining());
	}
	Ok(array)
}

fn read_cell(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, header: ArrayHeader) -> Result<CellArray> {
	let count = header.element_count();
	// Every cell costs at least one tag.
	let mut cells = Vec::with_capacity(count.min(cursor.remaining() / 8));
	for _ in 0..count {
		cells.push(read_child(cursor, ctx)?);
	}
	Ok(CellArray { header, cells })
}

fn read_fields(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, count: usize) -> Result<FieldTable> {
	let endianness = ctx.endianness;
	let max_len = read_values::<i32>(cursor, endianness)?.first().copied().unwrap_or(0);

	let names_tag = Tag::read(cursor, endianness)?;
	let table = names_tag.read_payload(cursor)?;
	let invalid = || MatError::InvalidFieldNames {
		max_len: i64::from(max_len),
		size: table.len(),
	};

	let names: Vec<String> = match usize::try_from(max_len) {
		Ok(0) if table.is_empty() => Vec::new(),
		Ok(width) if width > 0 && table.len() % width == 0 => table
			.chunks_exact(width)
			.map(|slot| {
				let end = slot.iter().position(|byte| *byte == 0).unwrap_or(slot.len());
				String::from_utf8_lossy(&slot[..end]).into_owned()
			})
			.collect(),
		_ => return Err(invalid()),
	};

	let fields = FieldTable::with_len(count);
	if names.is_empty() {
		return Ok(fields);
	}
	for index in 0..count {
		for name in &names {
			let mut value = read_child(cursor, ctx)?;
			value.set_name(name.as_str());
			fields.set_field(index, name, value);
		}
	}
	Ok(fields)
}

fn read_sparse(cursor: &mut Cursor<'_>, endianness: Endianness, header: ArrayHeader, nzmax: usize) -> Result<SparseArray> {
	let ir = read_values::<i32>(cursor, endianness)?;
	let jc = read_values::<i32>(cursor, endianness)?;
	let cols = header.cols();
	if jc.len() < cols + 1 {
		return Err(MatError::ElementCountMismatch {
			what: "sparse column pointers",
			expected: cols + 1,
			got: jc.len(),
		});
	}

	let pr = read_values::<f64>(cursor, endianness)?;
	let real = scatter_sparse(&pr, &ir, &jc, header.rows(), cols)?;
	let imag = if header.flags.is_complex() {
		let pi = read_values::<f64>(cursor, endianness)?;
		Some(scatter_sparse(&pi, &ir, &jc, header.rows(), cols)?)
	} else {
		None
	};

	Ok(SparseArray { header, nzmax, real, imag })
}

/// Place compressed-column values: entry `k` belongs to column `c` while `k < jc[c + 1]`.
fn scatter_sparse(values: &[f64], ir: &[i32], jc: &[i32], rows: usize, cols: usize) -> Result<BTreeMap<SparseIndex, f64>> {
	let mut out = BTreeMap::new();
	let mut k = 0_usize;
	for col in 0..cols {
		let end = jc[col + 1];
		let end = usize::try_from(end).map_err(|_| MatError::SparseIndexOutOfRange {
			what: "jc",
			value: i64::from(end),
			limit: ir.len() + 1,
		})?;

		while k < end {
			let row = *ir.get(k).ok_or(MatError::SparseIndexOutOfRange {
				what: "jc",
				value: end as i64,
				limit: ir.len() + 1,
			})?;
			let row = usize::try_from(row)
				.ok()
				.filter(|row| *row < rows)
				.ok_or(MatError::SparseIndexOutOfRange {
					what: "ir",
					value: i64::from(row),
					limit: rows,
				})?;
			let value = *values.get(k).ok_or(MatError::ElementCountMismatch {
				what: "sparse values",
				expected: end,
				got: values.len(),
			})?;
			out.insert(SparseIndex { col, row }, value);
			k += 1;
		}
	}
	Ok(out)
}

fn read_opaque(
	cursor: &mut Cursor<'_>,
	ctx: &mut DecodeContext<'_>,
	type_system: &str,
	var_name: String,
	flags: ArrayFlags,
) -> Result<Array> {
	let class_name = read_text(cursor, ctx.endianness)?;
	let kind = match type_system {
		"java" => "java",
		"MCOS" => "MCOS",
		"handle" => "handle",
		other => {
			return Err(MatError::UnknownObjectType { kind: other.to_owned() });
		}
	};

	let tag = Tag::read(cursor, ctx.endianness)?;
	if tag.data_type != DataType::Matrix {
		return Err(MatError::UnexpectedObjectContent {
			kind,
			detail: format!("{} element instead of miMATRIX", tag.data_type.as_str()),
		});
	}
	let content = read_tagged_matrix(cursor, ctx, &tag)?;
	trace!("opaque '{}' {} class {}", var_name, kind, class_name);

	let header = ArrayHeader {
		name: var_name,
		dims: vec![1, 1],
		class: ArrayClass::Opaque,
		flags,
	};

	match kind {
		"java" => {
			let Some(payload) = first_numeric(&content) else {
				return Err(MatError::UnexpectedObjectContent {
					kind,
					detail: format!("no numeric payload in {} array", content.kind()),
				});
			};
			Ok(Array::Java(JavaObject {
				header,
				class_name,
				bytes: payload.real.to_bytes(ctx.endianness),
			}))
		}
		"MCOS" if class_name == FILE_WRAPPER_CLASS => {
			let mut content = content;
			content.set_name(header.name);
			Ok(content)
		}
		"MCOS" => {
			let words = placeholder_words(&content).ok_or_else(|| MatError::UnexpectedObjectContent {
				kind,
				detail: format!("{} {} array instead of uint32 header", content.kind(), content.class().as_str()),
			})?;
			let placeholder = Placeholder::from_words(header.name.clone(), words)?;
			Ok(Array::Object(ctx.objects.bind(placeholder, header, class_name)))
		}
		_ => match content {
			Array::Cell(content) => Ok(Array::Handle(HandleObject {
				header,
				class_name,
				content,
			})),
			other => Err(MatError::UnexpectedObjectContent {
				kind,
				detail: format!("{} array instead of cell", other.kind()),
			}),
		},
	}
}

/// `uint32` words of a numeric array, the shape of an MCOS object header.
pub(crate) fn placeholder_words(array: &Array) -> Option<&[u32]> {
	match array {
		Array::Numeric(NumericArray {
			real: NumericData::UInt32(words),
			..
		}) => Some(words),
		_ => None,
	}
}

/// First numeric array found depth-first through cell and struct wrapping.
fn first_numeric(array: &Array) -> Option<NumericArray> {
	match array {
		Array::Numeric(numeric) => Some(numeric.clone()),
		Array::Cell(cell) => cell.cells.iter().find_map(first_numeric),
		Array::Struct(structure) => (0..structure.fields.len())
			.flat_map(|index| structure.fields.ordered_entries(index))
			.find_map(|(_, value)| first_numeric(&value)),
		_ => None,
	}
}
