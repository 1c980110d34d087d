use std::fs;
use std::path::Path;

use log::{trace, warn};

use crate::mat::bytes::Cursor;
use crate::mat::compression::inflate;
use crate::mat::matrix::{DecodeContext, read_root_matrix};
use crate::mat::mcos;
use crate::mat::simulink::decode_simulink_text;
use crate::mat::tag::{DataType, Tag};
use crate::mat::{Array, ArrayClass, EmptyArray, Endianness, FieldMap, MatError, MatFileKind, MatHeader, ReadOptions, Result};

/// Decoded MAT-file: preamble plus root variables in file order.
#[derive(Debug, Clone)]
pub struct MatFile {
	header: MatHeader,
	content: FieldMap,
}

impl MatFile {
	/// Read and decode a MAT-file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_with(path, &ReadOptions::default())
	}

	/// Read and decode a MAT-file from disk with explicit options.
	pub fn open_with(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Self> {
		let bytes = fs::read(path)?;
		Self::read_with(&bytes, options)
	}

	/// Decode a regular MAT-file held in memory.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Self::read_with(bytes, &ReadOptions::default())
	}

	/// Decode a regular MAT-file held in memory with explicit options.
	pub fn read_with(bytes: &[u8], options: &ReadOptions) -> Result<Self> {
		Self::read_kind(bytes, MatFileKind::Regular, options)
	}

	/// Decode a stream with the given preamble layout.
	pub fn read_kind(bytes: &[u8], kind: MatFileKind, options: &ReadOptions) -> Result<Self> {
		let (header, content) = read_content(bytes, kind, options)?;
		Ok(Self { header, content })
	}

	/// Decode MAT data embedded as Simulink model text.
	pub fn from_simulink_text(text: &str, options: &ReadOptions) -> Result<Self> {
		let bytes = decode_simulink_text(text)?;
		Self::read_kind(&bytes, MatFileKind::ReducedHeader, options)
	}

	/// Parsed preamble.
	pub fn header(&self) -> &MatHeader {
		&self.header
	}

	/// Byte order of the file.
	pub fn endianness(&self) -> Endianness {
		self.header.endianness
	}

	/// Format version from the preamble.
	pub fn version(&self) -> u16 {
		self.header.version
	}

	/// Description text from the preamble.
	pub fn description(&self) -> &str {
		&self.header.description
	}

	/// Root variable by name.
	pub fn get(&self, name: &str) -> Option<&Array> {
		self.content.get(name)
	}

	/// Root variable names in file order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.content.names()
	}

	/// Root variables in file order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Array)> {
		self.content.iter()
	}

	/// Number of root variables.
	pub fn len(&self) -> usize {
		self.content.len()
	}

	/// Whether the file holds no root variables.
	pub fn is_empty(&self) -> bool {
		self.content.is_empty()
	}

	/// Take ownership of the root variables.
	pub fn into_content(self) -> FieldMap {
		self.content
	}
}

/// Parse the preamble, decode every root element, then resolve MCOS objects.
pub(crate) fn read_content(bytes: &[u8], kind: MatFileKind, options: &ReadOptions) -> Result<(MatHeader, FieldMap)> {
	let header = MatHeader::parse(bytes, kind)?;
	let mut cursor = Cursor::new(bytes);
	cursor.seek(header.data_offset.min(bytes.len()))?;

	let mut ctx = DecodeContext::new(header.endianness, options);
	let mut content = FieldMap::new();
	read_elements(&mut cursor, &mut ctx, &mut content)?;

	let carrier_name = ctx.carrier.take();
	if ctx.objects.has_placeholders() && options.resolve_mcos {
		let carrier_name = carrier_name.ok_or(MatError::McosDataMissing)?;
		let carrier = match content.get(&carrier_name) {
			Some(Array::Numeric(numeric)) => numeric.real.to_bytes(header.endianness),
			_ => return Err(MatError::McosDataMissing),
		};
		mcos::resolve(&carrier, &mut ctx, &mut content)?;
		content.remove(&carrier_name);
	} else if let Some(carrier_name) = carrier_name.filter(|_| !options.filter.is_empty()) {
		// Decoded past the filter only as a carrier candidate.
		content.remove(&carrier_name);
	}

	Ok((header, content))
}

fn read_elements(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, content: &mut FieldMap) -> Result<()> {
	while cursor.remaining() > 0 {
		read_element(cursor, ctx, content)?;
	}
	Ok(())
}

fn read_element(cursor: &mut Cursor<'_>, ctx: &mut DecodeContext<'_>, content: &mut FieldMap) -> Result<()> {
	let tag = Tag::read(cursor, ctx.endianness)?;
	match tag.data_type {
		DataType::Compressed => {
			let rem = cursor.remaining();
			if tag.size > rem {
				return Err(MatError::CompressedLengthMismatch {
					at: tag.offset,
					declared: tag.size,
					rem,
				});
			}
			let payload = tag.read_payload(cursor)?;
			let inflated = inflate(payload, ctx.options.max_inflated_bytes)?;
			read_elements(&mut Cursor::new(&inflated), ctx, content)
		}
		DataType::Matrix if tag.size == 0 => {
			tag.read_payload(cursor)?;
			insert_root(ctx, content, Array::Empty(EmptyArray::default()));
			Ok(())
		}
		DataType::Matrix => {
			let body = tag.read_payload(cursor)?;
			let mut inner = Cursor::new(body);
			match read_root_matrix(&mut inner, ctx)? {
				Some(array) => {
					if inner.remaining() != 0 {
						return Err(MatError::MatrixNotFullyRead {
							size: tag.size,
							remaining: inner.remaining(),
						});
					}
					insert_root(ctx, content, array);
				}
				None => trace!("skipped {} bytes at {}", tag.size, tag.offset),
			}
			Ok(())
		}
		other => Err(MatError::UnexpectedTag {
			at: tag.offset,
			expected: DataType::Matrix.as_str(),
			got: other.as_str(),
		}),
	}
}

/// Add a root array: anonymous roots take the next free `@N`, a repeated name keeps the first.
fn insert_root(ctx: &mut DecodeContext<'_>, content: &mut FieldMap, array: Array) {
	if !array.name().is_empty() {
		if content.contains(array.name()) {
			warn!("duplicate root variable '{}' ignored", array.name());
			return;
		}
		content.insert(array.name().to_owned(), array);
		return;
	}

	let name = (0..)
		.map(|index| format!("@{}", index))
		.find(|name| !content.contains(name))
		.unwrap_or_default();
	if array.class() == ArrayClass::UInt8 {
		ctx.carrier = Some(name.clone());
	}
	content.insert(name, array);
}
