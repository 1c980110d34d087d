use crate::mat::Endianness;
use crate::mat::bytes::Cursor;
use crate::mat::primitive::{Element, decode_text, decode_values, encode_values, read_text, read_values};
use crate::mat::tag::DataType;

#[test]
fn native_storage_reencodes_to_identical_bytes() {
	let raw: Vec<u8> = (0_u8..24).collect();

	let values = decode_values::<i16>(&raw, DataType::Int16, Endianness::Big).expect("int16 decode");
	assert_eq!(values.len(), 12);
	assert_eq!(encode_values(&values, Endianness::Big), raw);

	let values = decode_values::<f64>(&raw, DataType::Double, Endianness::Little).expect("double decode");
	assert_eq!(values.len(), 3);
	assert_eq!(encode_values(&values, Endianness::Little), raw);
}

fn reencodes<T: Element>(raw: &[u8], endianness: Endianness) -> bool {
	let values = decode_values::<T>(raw, T::DATA_TYPE, endianness).expect("native decode");
	values.len() == raw.len() / T::WIDTH && encode_values(&values, endianness) == raw
}

#[test]
fn every_numeric_subtype_reencodes() {
	// Small byte values keep every float pattern finite.
	let raw: Vec<u8> = (1_u8..=16).collect();
	for endianness in [Endianness::Little, Endianness::Big] {
		assert!(reencodes::<i8>(&raw, endianness));
		assert!(reencodes::<u8>(&raw, endianness));
		assert!(reencodes::<i16>(&raw, endianness));
		assert!(reencodes::<u16>(&raw, endianness));
		assert!(reencodes::<i32>(&raw, endianness));
		assert!(reencodes::<u32>(&raw, endianness));
		assert!(reencodes::<i64>(&raw, endianness));
		assert!(reencodes::<u64>(&raw, endianness));
		assert!(reencodes::<f32>(&raw, endianness));
		assert!(reencodes::<f64>(&raw, endianness));
	}
}

#[test]
fn narrow_storage_widens_to_logical_type() {
	// Doubles stored as uint8 when every value fits.
	let values = decode_values::<f64>(&[1, 2, 255], DataType::UInt8, Endianness::Little).expect("widen");
	assert_eq!(values, vec![1.0, 2.0, 255.0]);

	let mut raw = Vec::new();
	raw.extend_from_slice(&(-3_i16).to_le_bytes());
	raw.extend_from_slice(&7_i16.to_le_bytes());
	let values = decode_values::<i32>(&raw, DataType::Int16, Endianness::Little).expect("int16 to int32");
	assert_eq!(values, vec![-3, 7]);
}

#[test]
fn text_storage_is_not_numeric() {
	assert!(decode_values::<f64>(b"ab", DataType::Utf8, Endianness::Little).is_err());
}

#[test]
fn decodes_unicode_text_variants() {
	assert_eq!(decode_text("héllo".as_bytes(), DataType::Utf8, Endianness::Little), "héllo".chars().collect::<Vec<_>>());

	let utf16: Vec<u8> = "hé".encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect();
	assert_eq!(decode_text(&utf16, DataType::Utf16, Endianness::Big), vec!['h', 'é']);
	assert_eq!(decode_text(&utf16, DataType::UInt16, Endianness::Big), vec!['h', 'é']);

	let utf32: Vec<u8> = ['a', '€'].iter().flat_map(|ch| (*ch as u32).to_le_bytes()).collect();
	assert_eq!(decode_text(&utf32, DataType::Utf32, Endianness::Little), vec!['a', '€']);
}

#[test]
fn other_storage_decodes_as_ascii() {
	assert_eq!(decode_text(&[b'o', b'k', 0xe9], DataType::UInt8, Endianness::Little), vec!['o', 'k', char::REPLACEMENT_CHARACTER]);
}

#[test]
fn reads_tagged_values_and_text() {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(&6_u32.to_le_bytes());
	bytes.extend_from_slice(&8_u32.to_le_bytes());
	bytes.extend_from_slice(&10_u32.to_le_bytes());
	bytes.extend_from_slice(&20_u32.to_le_bytes());
	// Packed miINT8 "ab".
	bytes.extend_from_slice(&((2_u32 << 16) | 1).to_le_bytes());
	bytes.extend_from_slice(b"ab\0\0");

	let mut cursor = Cursor::new(&bytes);
	let values = read_values::<u32>(&mut cursor, Endianness::Little).expect("uint32 element");
	assert_eq!(values, vec![10, 20]);
	assert_eq!(read_text(&mut cursor, Endianness::Little).expect("text element"), "ab");
	assert_eq!(cursor.remaining(), 0);
}
