use log::trace;

use crate::mat::bytes::Cursor;
use crate::mat::{Endianness, MatError, Result};

/// Storage data type code carried by an element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
	/// `miINT8`.
	Int8,
	/// `miUINT8`.
	UInt8,
	/// `miINT16`.
	Int16,
	/// `miUINT16`.
	UInt16,
	/// `miINT32`.
	Int32,
	/// `miUINT32`.
	UInt32,
	/// `miSINGLE`.
	Single,
	/// `miDOUBLE`.
	Double,
	/// `miINT64`.
	Int64,
	/// `miUINT64`.
	UInt64,
	/// `miMATRIX`: a nested array element.
	Matrix,
	/// `miCOMPRESSED`: zlib stream wrapping further elements.
	Compressed,
	/// `miUTF8` text.
	Utf8,
	/// `miUTF16` text.
	Utf16,
	/// `miUTF32` text.
	Utf32,
}

impl DataType {
	/// Map a raw type code to a data type.
	pub fn from_code(code: u32) -> Option<Self> {
		Some(match code {
			1 => Self::Int8,
			2 => Self::UInt8,
			3 => Self::Int16,
			4 => Self::UInt16,
			5 => Self::Int32,
			6 => Self::UInt32,
			7 => Self::Single,
			9 => Self::Double,
			12 => Self::Int64,
			13 => Self::UInt64,
			14 => Self::Matrix,
			15 => Self::Compressed,
			16 => Self::Utf8,
			17 => Self::Utf16,
			18 => Self::Utf32,
			_ => return None,
		})
	}

	/// Raw type code as written in tags.
	pub fn code(self) -> u32 {
		match self {
			Self::Int8 => 1,
			Self::UInt8 => 2,
			Self::Int16 => 3,
			Self::UInt16 => 4,
			Self::Int32 => 5,
			Self::UInt32 => 6,
			Self::Single => 7,
			Self::Double => 9,
			Self::Int64 => 12,
			Self::UInt64 => 13,
			Self::Matrix => 14,
			Self::Compressed => 15,
			Self::Utf8 => 16,
			Self::Utf16 => 17,
			Self::Utf32 => 18,
		}
	}

	/// Width of one stored element in bytes.
	pub fn width(self) -> usize {
		match self {
			Self::Int8 | Self::UInt8 | Self::Utf8 | Self::Matrix | Self::Compressed => 1,
			Self::Int16 | Self::UInt16 | Self::Utf16 => 2,
			Self::Int32 | Self::UInt32 | Self::Single | Self::Utf32 => 4,
			Self::Int64 | Self::UInt64 | Self::Double => 8,
		}
	}

	/// Stable `mi*` label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Int8 => "miINT8",
			Self::UInt8 => "miUINT8",
			Self::Int16 => "miINT16",
			Self::UInt16 => "miUINT16",
			Self::Int32 => "miINT32",
			Self::UInt32 => "miUINT32",
			Self::Single => "miSINGLE",
			Self::Double => "miDOUBLE",
			Self::Int64 => "miINT64",
			Self::UInt64 => "miUINT64",
			Self::Matrix => "miMATRIX",
			Self::Compressed => "miCOMPRESSED",
			Self::Utf8 => "miUTF8",
			Self::Utf16 => "miUTF16",
			Self::Utf32 => "miUTF32",
		}
	}
}

/// Parsed element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
	/// Storage type of the payload.
	pub data_type: DataType,
	/// Payload size in bytes, excluding padding.
	pub size: usize,
	/// Whether the payload is packed into the tag word (small element form).
	pub packed: bool,
	/// Offset of the tag's first byte in its buffer.
	pub offset: usize,
}

impl Tag {
	/// Read a long or packed tag at the cursor.
	pub fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let offset = cursor.pos();
		let word = cursor.read_u32(endianness)?;

		let (code, size, packed) = if word >> 16 == 0 {
			let size = cursor.read_u32(endianness)? as usize;
			(word, size, false)
		} else {
			let size = (word >> 16) as usize;
			if size > 4 {
				return Err(MatError::PackedTagTooLarge { at: offset, size });
			}
			(word & 0xffff, size, true)
		};

		let data_type = DataType::from_code(code).ok_or(MatError::UnknownDataType { code, at: offset })?;
		let width = data_type.width();
		if size % width != 0 {
			return Err(MatError::TagSizeMisaligned { at: offset, size, width });
		}

		trace!("tag {} size={} packed={} at {}", data_type.as_str(), size, packed, offset);
		Ok(Self {
			data_type,
			size,
			packed,
			offset,
		})
	}

	/// Number of storage elements in the payload.
	pub fn element_count(&self) -> usize {
		self.size / self.data_type.width()
	}

	/// Bytes of padding that follow the payload.
	///
	/// Long-form payloads pad to 8 bytes and packed payloads to 4. Compressed
	/// payloads are never padded.
	pub fn padding(&self) -> usize {
		if self.data_type == DataType::Compressed {
			return 0;
		}
		let align = if self.packed { 4 } else { 8 };
		(align - self.size % align) % align
	}

	/// Read the payload and skip the trailing padding.
	pub fn read_payload<'a>(&self, cursor: &mut Cursor<'a>) -> Result<&'a [u8]> {
		let payload = cursor.read_exact(self.size)?;
		cursor.skip(self.padding())?;
		Ok(payload)
	}

	/// Fail unless this tag carries the expected data type.
	pub fn expect(&self, expected: DataType) -> Result<()> {
		if self.data_type != expected {
			return Err(MatError::UnexpectedTag {
				at: self.offset,
				expected: expected.as_str(),
				got: self.data_type.as_str(),
			});
		}
		Ok(())
	}
}
