use crate::mat::bytes::Cursor;
use crate::mat::tag::{DataType, Tag};
use crate::mat::{Endianness, MatError, Result};

/// One stored value widened to a lossless-enough intermediate form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
	/// Signed integer storage.
	Int(i64),
	/// Unsigned integer storage.
	UInt(u64),
	/// Floating-point storage.
	Float(f64),
}

/// Fixed-width numeric storage shared by the eight numeric array subtypes.
pub trait Element: Copy + Default + PartialEq + std::fmt::Debug {
	/// Stored width in bytes.
	const WIDTH: usize;
	/// Storage type that holds this element without conversion.
	const DATA_TYPE: DataType;

	/// Decode one value from exactly `WIDTH` bytes.
	fn from_bytes(raw: &[u8], endianness: Endianness) -> Self;
	/// Append this value's bytes in the given order.
	fn write_bytes(self, endianness: Endianness, out: &mut Vec<u8>);
	/// Convert a value stored under a different type, with `as` cast semantics.
	fn from_scalar(value: Scalar) -> Self;
	/// Widen to `f64`.
	fn to_f64(self) -> f64;
}

macro_rules! impl_element {
	($ty:ty, $data_type:expr) => {
		impl Element for $ty {
			const WIDTH: usize = std::mem::size_of::<$ty>();
			const DATA_TYPE: DataType = $data_type;

			fn from_bytes(raw: &[u8], endianness: Endianness) -> Self {
				let mut buf = [0_u8; std::mem::size_of::<$ty>()];
				buf.copy_from_slice(raw);
				match endianness {
					Endianness::Little => <$ty>::from_le_bytes(buf),
					Endianness::Big => <$ty>::from_be_bytes(buf),
				}
			}

			fn write_bytes(self, endianness: Endianness, out: &mut Vec<u8>) {
				match endianness {
					Endianness::Little => out.extend_from_slice(&self.to_le_bytes()),
					Endianness::Big => out.extend_from_slice(&self.to_be_bytes()),
				}
			}

			fn from_scalar(value: Scalar) -> Self {
				match value {
					Scalar::Int(v) => v as $ty,
					Scalar::UInt(v) => v as $ty,
					Scalar::Float(v) => v as $ty,
				}
			}

			fn to_f64(self) -> f64 {
				self as f64
			}
		}
	};
}

impl_element!(i8, DataType::Int8);
impl_element!(u8, DataType::UInt8);
impl_element!(i16, DataType::Int16);
impl_element!(u16, DataType::UInt16);
impl_element!(i32, DataType::Int32);
impl_element!(u32, DataType::UInt32);
impl_element!(i64, DataType::Int64);
impl_element!(u64, DataType::UInt64);
impl_element!(f32, DataType::Single);
impl_element!(f64, DataType::Double);

/// Read one stored value of `data_type` as a [`Scalar`].
fn read_scalar(raw: &[u8], data_type: DataType, endianness: Endianness) -> Option<Scalar> {
	Some(match data_type {
		DataType::Int8 => Scalar::Int(i8::from_bytes(raw, endianness).into()),
		DataType::UInt8 => Scalar::UInt(u8::from_bytes(raw, endianness).into()),
		DataType::Int16 => Scalar::Int(i16::from_bytes(raw, endianness).into()),
		DataType::UInt16 => Scalar::UInt(u16::from_bytes(raw, endianness).into()),
		DataType::Int32 => Scalar::Int(i32::from_bytes(raw, endianness).into()),
		DataType::UInt32 => Scalar::UInt(u32::from_bytes(raw, endianness).into()),
		DataType::Int64 => Scalar::Int(i64::from_bytes(raw, endianness)),
		DataType::UInt64 => Scalar::UInt(u64::from_bytes(raw, endianness)),
		DataType::Single => Scalar::Float(f32::from_bytes(raw, endianness).into()),
		DataType::Double => Scalar::Float(f64::from_bytes(raw, endianness)),
		_ => return None,
	})
}

fn is_numeric(data_type: DataType) -> bool {
	!matches!(
		data_type,
		DataType::Matrix | DataType::Compressed | DataType::Utf8 | DataType::Utf16 | DataType::Utf32
	)
}

/// Decode a payload stored as `data_type` into values of `T`.
///
/// The storage width comes from `data_type`, which may be narrower than `T`.
pub fn decode_values<T: Element>(payload: &[u8], data_type: DataType, endianness: Endianness) -> Result<Vec<T>> {
	if !is_numeric(data_type) {
		return Err(MatError::UnexpectedTag {
			at: 0,
			expected: T::DATA_TYPE.as_str(),
			got: data_type.as_str(),
		});
	}

	let width = data_type.width();
	let chunks = payload.chunks_exact(width);
	if data_type == T::DATA_TYPE {
		return Ok(chunks.map(|raw| T::from_bytes(raw, endianness)).collect());
	}

	Ok(chunks
		.filter_map(|raw| read_scalar(raw, data_type, endianness))
		.map(T::from_scalar)
		.collect())
}

/// Encode values back into storage bytes of their native type.
pub fn encode_values<T: Element>(values: &[T], endianness: Endianness) -> Vec<u8> {
	let mut out = Vec::with_capacity(values.len() * T::WIDTH);
	for value in values {
		value.write_bytes(endianness, &mut out);
	}
	out
}

/// Read the next tagged element at the cursor as values of `T`.
pub fn read_values<T: Element>(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Vec<T>> {
	let tag = Tag::read(cursor, endianness)?;
	let payload = tag.read_payload(cursor)?;
	decode_values(payload, tag.data_type, endianness).map_err(|err| match err {
		MatError::UnexpectedTag { expected, got, .. } => MatError::UnexpectedTag {
			at: tag.offset,
			expected,
			got,
		},
		other => other,
	})
}

/// Decode a text payload into code points.
///
/// `miUTF8`, `miUTF16` and `miUTF32` decode as Unicode; `miUINT16` is treated as
/// UTF-16 code units. Any other storage type is read element-wise as 7-bit ASCII.
pub fn decode_text(payload: &[u8], data_type: DataType, endianness: Endianness) -> Vec<char> {
	match data_type {
		DataType::Utf8 => String::from_utf8_lossy(payload).chars().collect(),
		DataType::Utf16 | DataType::UInt16 => {
			let units = payload.chunks_exact(2).map(|raw| u16::from_bytes(raw, endianness));
			char::decode_utf16(units)
				.map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
				.collect()
		}
		DataType::Utf32 => payload
			.chunks_exact(4)
			.map(|raw| char::from_u32(u32::from_bytes(raw, endianness)).unwrap_or(char::REPLACEMENT_CHARACTER))
			.collect(),
		other => {
			let width = other.width();
			payload
				.chunks_exact(width)
				.map(|raw| {
					// Low byte of the stored value in its declared order.
					let byte = match endianness {
						Endianness::Little => raw[0],
						Endianness::Big => raw[width - 1],
					};
					if byte.is_ascii() {
						char::from(byte)
					} else {
						char::REPLACEMENT_CHARACTER
					}
				})
				.collect()
		}
	}
}

/// Read the next tagged element at the cursor as a string.
pub fn read_text(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<String> {
	let tag = Tag::read(cursor, endianness)?;
	let payload = tag.read_payload(cursor)?;
	Ok(decode_text(payload, tag.data_type, endianness).into_iter().collect())
}

#[cfg(test)]
mod tests;
