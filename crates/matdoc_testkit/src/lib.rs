//! Shared test helpers for workspace crates.
//!
//! Builders emit little-endian MAT-file bytes in memory so tests never depend on
//! checked-in binary fixtures.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::ZlibEncoder;

/// `miINT8` type code.
pub const MI_INT8: u32 = 1;
/// `miUINT8` type code.
pub const MI_UINT8: u32 = 2;
/// `miINT32` type code.
pub const MI_INT32: u32 = 5;
/// `miUINT32` type code.
pub const MI_UINT32: u32 = 6;
/// `miDOUBLE` type code.
pub const MI_DOUBLE: u32 = 9;
/// `miMATRIX` type code.
pub const MI_MATRIX: u32 = 14;
/// `miCOMPRESSED` type code.
pub const MI_COMPRESSED: u32 = 15;
/// `miUTF8` type code.
pub const MI_UTF8: u32 = 16;

/// `mxCELL_CLASS`.
pub const MX_CELL: u8 = 1;
/// `mxSTRUCT_CLASS`.
pub const MX_STRUCT: u8 = 2;
/// `mxOBJECT_CLASS`.
pub const MX_OBJECT: u8 = 3;
/// `mxCHAR_CLASS`.
pub const MX_CHAR: u8 = 4;
/// `mxSPARSE_CLASS`.
pub const MX_SPARSE: u8 = 5;
/// `mxDOUBLE_CLASS`.
pub const MX_DOUBLE: u8 = 6;
/// `mxUINT8_CLASS`.
pub const MX_UINT8: u8 = 9;
/// `mxUINT32_CLASS`.
pub const MX_UINT32: u8 = 13;
/// `mxOPAQUE_CLASS`.
pub const MX_OPAQUE: u8 = 17;

/// Complex attribute bit.
pub const FLAG_COMPLEX: u32 = 0x0800;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Write bytes to a fresh file under the system temp directory.
pub fn write_temp(stem: &str, bytes: &[u8]) -> PathBuf {
	static COUNTER: AtomicUsize = AtomicUsize::new(0);
	let index = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = std::env::temp_dir().join(format!("matdoc-{}-{}-{}.mat", stem, std::process::id(), index));
	std::fs::write(&path, bytes).expect("temp file is writable");
	path
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
	out.extend_from_slice(&value.to_le_bytes());
}

fn pad_to(out: &mut Vec<u8>, align: usize) {
	while out.len() % align != 0 {
		out.push(0);
	}
}

/// Long-form tag with its payload and 8-byte padding.
pub fn element(data_type: u32, payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(8 + payload.len() + 7);
	put_u32(&mut out, data_type);
	put_u32(&mut out, payload.len() as u32);
	out.extend_from_slice(payload);
	pad_to(&mut out, 8);
	out
}

/// Packed (small element) tag with at most four payload bytes.
pub fn packed_element(data_type: u32, payload: &[u8]) -> Vec<u8> {
	assert!(payload.len() <= 4, "packed payload holds at most 4 bytes");
	let mut out = Vec::with_capacity(8);
	put_u32(&mut out, ((payload.len() as u32) << 16) | data_type);
	out.extend_from_slice(payload);
	pad_to(&mut out, 8);
	out
}

/// 128-byte little-endian preamble with the given description.
pub fn preamble(description: &str) -> Vec<u8> {
	let mut out = vec![b' '; 116];
	out[..description.len()].copy_from_slice(description.as_bytes());
	out.extend_from_slice(&[0_u8; 8]);
	out.extend_from_slice(&0x0100_u16.to_le_bytes());
	out.extend_from_slice(b"IM");
	out
}

/// Reduced little-endian header padded to 8 bytes.
pub fn reduced_header() -> Vec<u8> {
	let mut out = 0x0100_u16.to_le_bytes().to_vec();
	out.extend_from_slice(b"IM");
	out.extend_from_slice(&[0_u8; 4]);
	out
}

/// Regular MAT-file holding the given top-level elements.
pub fn mat_file(elements: &[Vec<u8>]) -> Vec<u8> {
	let mut out = preamble("MATLAB 5.0 MAT-file, Platform: GLNXA64, Created on: Mon Jan  1 00:00:00 2024");
	for item in elements {
		out.extend_from_slice(item);
	}
	out
}

/// `miCOMPRESSED` element wrapping already-framed elements.
pub fn compressed(inner: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(inner).expect("zlib write");
	let payload = encoder.finish().expect("zlib finish");

	let mut out = Vec::with_capacity(8 + payload.len());
	put_u32(&mut out, MI_COMPRESSED);
	put_u32(&mut out, payload.len() as u32);
	out.extend_from_slice(&payload);
	out
}

/// Zero-size `miMATRIX` element, decoded as an empty array.
pub fn empty_element() -> Vec<u8> {
	element(MI_MATRIX, &[])
}

fn flags_element(class: u8, attributes: u32, nzmax: u32) -> Vec<u8> {
	let mut payload = Vec::with_capacity(8);
	put_u32(&mut payload, attributes | u32::from(class));
	put_u32(&mut payload, nzmax);
	element(MI_UINT32, &payload)
}

fn dims_element(dims: &[usize]) -> Vec<u8> {
	let payload: Vec<u8> = dims.iter().flat_map(|dim| (*dim as i32).to_le_bytes()).collect();
	element(MI_INT32, &payload)
}

fn text_element(text: &str) -> Vec<u8> {
	element(MI_INT8, text.as_bytes())
}

/// Full `miMATRIX` element from flags, dims, name and pre-framed body elements.
pub fn matrix(class: u8, attributes: u32, dims: &[usize], name: &str, body: &[u8]) -> Vec<u8> {
	let mut inner = flags_element(class, attributes, 0);
	inner.extend_from_slice(&dims_element(dims));
	inner.extend_from_slice(&text_element(name));
	inner.extend_from_slice(body);
	element(MI_MATRIX, &inner)
}

/// Real double array.
pub fn double_matrix(name: &str, dims: &[usize], values: &[f64]) -> Vec<u8> {
	let payload: Vec<u8> = values.iter().flat_map(|value| value.to_le_bytes()).collect();
	matrix(MX_DOUBLE, 0, dims, name, &element(MI_DOUBLE, &payload))
}

/// Complex double array.
pub fn complex_matrix(name: &str, dims: &[usize], real: &[f64], imag: &[f64]) -> Vec<u8> {
	let real: Vec<u8> = real.iter().flat_map(|value| value.to_le_bytes()).collect();
	let imag: Vec<u8> = imag.iter().flat_map(|value| value.to_le_bytes()).collect();
	let mut body = element(MI_DOUBLE, &real);
	body.extend_from_slice(&element(MI_DOUBLE, &imag));
	matrix(MX_DOUBLE, FLAG_COMPLEX, dims, name, &body)
}

/// `uint8` array.
pub fn uint8_matrix(name: &str, dims: &[usize], values: &[u8]) -> Vec<u8> {
	matrix(MX_UINT8, 0, dims, name, &element(MI_UINT8, values))
}

/// `uint32` array.
pub fn uint32_matrix(name: &str, dims: &[usize], values: &[u32]) -> Vec<u8> {
	let payload: Vec<u8> = values.iter().flat_map(|value| value.to_le_bytes()).collect();
	matrix(MX_UINT32, 0, dims, name, &element(MI_UINT32, &payload))
}

/// `1xN` char array stored as UTF-8.
pub fn char_matrix(name: &str, text: &str) -> Vec<u8> {
	matrix(MX_CHAR, 0, &[1, text.chars().count()], name, &element(MI_UTF8, text.as_bytes()))
}

/// Cell array over pre-framed child elements in column-major order.
pub fn cell_matrix(name: &str, dims: &[usize], cells: &[Vec<u8>]) -> Vec<u8> {
	matrix(MX_CELL, 0, dims, name, &cells.concat())
}

fn field_table(fields: &[&str]) -> Vec<u8> {
	let width = fields.iter().map(|field| field.len() + 1).max().unwrap_or(0);
	let mut out = packed_element(MI_INT32, &(width as i32).to_le_bytes());
	let mut names = Vec::with_capacity(width * fields.len());
	for field in fields {
		let start = names.len();
		names.extend_from_slice(field.as_bytes());
		names.resize(start + width, 0);
	}
	out.extend_from_slice(&element(MI_INT8, &names));
	out
}

/// Struct array; `values` holds each element's fields in declaration order, element by element.
pub fn struct_matrix(name: &str, dims: &[usize], fields: &[&str], values: &[Vec<u8>]) -> Vec<u8> {
	let mut body = field_table(fields);
	body.extend_from_slice(&values.concat());
	matrix(MX_STRUCT, 0, dims, name, &body)
}

/// Legacy object array: class name then the struct layout.
pub fn object_matrix(name: &str, class_name: &str, dims: &[usize], fields: &[&str], values: &[Vec<u8>]) -> Vec<u8> {
	let mut body = text_element(class_name);
	body.extend_from_slice(&field_table(fields));
	body.extend_from_slice(&values.concat());
	matrix(MX_OBJECT, 0, dims, name, &body)
}

/// Real sparse array from compressed-column tables.
pub fn sparse_matrix(name: &str, dims: &[usize], ir: &[i32], jc: &[i32], pr: &[f64]) -> Vec<u8> {
	let ir_bytes: Vec<u8> = ir.iter().flat_map(|value| value.to_le_bytes()).collect();
	let jc_bytes: Vec<u8> = jc.iter().flat_map(|value| value.to_le_bytes()).collect();
	let pr_bytes: Vec<u8> = pr.iter().flat_map(|value| value.to_le_bytes()).collect();

	let mut body = element(MI_INT32, &ir_bytes);
	body.extend_from_slice(&element(MI_INT32, &jc_bytes));
	body.extend_from_slice(&element(MI_DOUBLE, &pr_bytes));

	let mut inner = flags_element(MX_SPARSE, 0, pr.len() as u32);
	inner.extend_from_slice(&dims_element(dims));
	inner.extend_from_slice(&text_element(name));
	inner.extend_from_slice(&body);
	element(MI_MATRIX, &inner)
}

/// Opaque element: variable name in the dims slot, type system, class name, one nested matrix.
pub fn opaque_matrix(var_name: &str, type_system: &str, class_name: &str, content: &[u8]) -> Vec<u8> {
	let mut inner = flags_element(MX_OPAQUE, 0, 0);
	inner.extend_from_slice(&element(MI_INT8, var_name.as_bytes()));
	inner.extend_from_slice(&text_element(type_system));
	inner.extend_from_slice(&text_element(class_name));
	inner.extend_from_slice(content);
	element(MI_MATRIX, &inner)
}

/// MCOS per-object header words for `dims[0] x dims[1]` objects.
pub fn mcos_header_words(dims: [u32; 2], object_ids: &[u32], class_id: u32) -> Vec<u32> {
	let mut words = vec![0xdd00_0000, 2, dims[0], dims[1]];
	words.extend_from_slice(object_ids);
	words.push(class_id);
	words
}

/// MCOS object placeholder as written for a root variable or field.
pub fn mcos_object(var_name: &str, class_name: &str, dims: [u32; 2], object_ids: &[u32], class_id: u32) -> Vec<u8> {
	let words = mcos_header_words(dims, object_ids, class_id);
	let content = uint32_matrix("", &[words.len(), 1], &words);
	opaque_matrix(var_name, "MCOS", class_name, &content)
}

/// One property record of an MCOS property set.
#[derive(Debug, Clone, Copy)]
pub struct McosProperty {
	/// 1-based name index into the string pool.
	pub name: u32,
	/// Property kind (0 = pooled string, 1 = heap cell).
	pub kind: u32,
	/// String index (kind 0) or heap index (kind 1).
	pub value: u32,
}

/// Builder for the MCOS property blob stored in cell 0 of the carrier.
#[derive(Debug, Clone)]
pub struct McosBlob {
	/// Blob version word.
	pub version: u32,
	strings: Vec<String>,
	classes: Vec<u32>,
	objects: Vec<(u32, u32)>,
	sets: Vec<Vec<McosProperty>>,
}

impl Default for McosBlob {
	fn default() -> Self {
		Self {
			version: 2,
			strings: Vec::new(),
			classes: Vec::new(),
			objects: Vec::new(),
			sets: Vec::new(),
		}
	}
}

impl McosBlob {
	/// Empty version-2 blob.
	pub fn new() -> Self {
		Self::default()
	}

	/// Intern a pool string and return its 1-based index.
	pub fn string(&mut self, text: &str) -> u32 {
		if let Some(index) = self.strings.iter().position(|item| item == text) {
			return index as u32 + 1;
		}
		self.strings.push(text.to_owned());
		self.strings.len() as u32
	}

	/// Add a class and return its 1-based class id.
	pub fn class(&mut self, name: &str) -> u32 {
		let name = self.string(name);
		self.classes.push(name);
		self.classes.len() as u32
	}

	/// Property whose value is a pooled string.
	pub fn text_property(&mut self, name: &str, value: &str) -> McosProperty {
		McosProperty {
			name: self.string(name),
			kind: 0,
			value: self.string(value),
		}
	}

	/// Property whose value is heap cell `index + 2` of the MCOS cell.
	pub fn heap_property(&mut self, name: &str, heap_index: u32) -> McosProperty {
		McosProperty {
			name: self.string(name),
			kind: 1,
			value: heap_index,
		}
	}

	/// Add a property set and return its 1-based index.
	pub fn property_set(&mut self, properties: Vec<McosProperty>) -> u32 {
		self.sets.push(properties);
		self.sets.len() as u32
	}

	/// Add an object record and return its 1-based object id.
	pub fn object(&mut self, class_id: u32, property_set: u32) -> u32 {
		self.objects.push((class_id, property_set));
		self.objects.len() as u32
	}

	/// Serialize the blob with segment offsets filled in.
	pub fn build(&self) -> Vec<u8> {
		let mut out = Vec::new();
		put_u32(&mut out, self.version);
		put_u32(&mut out, self.strings.len() as u32);
		let offsets_at = out.len();
		out.extend_from_slice(&[0_u8; 24]);
		out.extend_from_slice(&[0_u8; 8]);

		for text in &self.strings {
			out.extend_from_slice(text.as_bytes());
			out.push(0);
		}
		pad_to(&mut out, 8);

		let mut offsets = [0_u32; 6];
		offsets[0] = out.len() as u32;
		out.extend_from_slice(&[0_u8; 16]);
		for name in &self.classes {
			put_u32(&mut out, 0);
			put_u32(&mut out, *name);
			out.extend_from_slice(&[0_u8; 8]);
		}

		offsets[1] = out.len() as u32;
		offsets[2] = out.len() as u32;
		out.extend_from_slice(&[0_u8; 24]);
		for (class_id, set) in &self.objects {
			put_u32(&mut out, *class_id);
			out.extend_from_slice(&[0_u8; 8]);
			put_u32(&mut out, 0);
			put_u32(&mut out, *set);
			put_u32(&mut out, 0x5eed_0001);
		}

		offsets[3] = out.len() as u32;
		out.extend_from_slice(&[0_u8; 8]);
		for set in &self.sets {
			put_u32(&mut out, set.len() as u32);
			for property in set {
				put_u32(&mut out, property.name);
				put_u32(&mut out, property.kind);
				put_u32(&mut out, property.value);
			}
			pad_to(&mut out, 8);
		}
		offsets[4] = out.len() as u32;
		offsets[5] = out.len() as u32;

		for (index, offset) in offsets.iter().enumerate() {
			let at = offsets_at + index * 4;
			out[at..at + 4].copy_from_slice(&offset.to_le_bytes());
		}
		out
	}
}

/// Anonymous `uint8` root element carrying the MCOS sub-file.
///
/// The MCOS cell is `[blob, <unused>, heap.., class defaults]`; `defaults` is
/// indexed by class id, so slot 0 is normally an empty element.
pub fn mcos_carrier(blob: &[u8], heap: &[Vec<u8>], defaults: &[Vec<u8>]) -> Vec<u8> {
	let mut cells = vec![uint8_matrix("", &[blob.len(), 1], blob), empty_element()];
	cells.extend(heap.iter().cloned());
	cells.push(cell_matrix("", &[1, defaults.len()], defaults));

	let mcos_cell = cell_matrix("", &[1, cells.len()], &cells);
	let wrapper = opaque_matrix("MCOS", "MCOS", "FileWrapper__", &mcos_cell);
	let holder = struct_matrix("", &[1, 1], &["MCOS"], &[wrapper]);

	let mut sub_file = reduced_header();
	sub_file.extend_from_slice(&holder);
	uint8_matrix("", &[sub_file.len(), 1], &sub_file)
}

/// Encode bytes with Simulink's 6-bit text alphabet.
pub fn simulink_text(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len() / 3 * 4 + 4);
	for group in bytes.chunks(3) {
		let mut bits = 0_u32;
		for byte in group {
			bits = (bits << 8) | u32::from(*byte);
		}
		bits <<= 8 * (3 - group.len() as u32);
		for index in 0..=group.len() {
			let value = (bits >> (18 - 6 * index)) & 0x3f;
			out.push(char::from(b' ' + value as u8));
		}
	}
	out
}
