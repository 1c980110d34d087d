use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, MatError>;

/// Errors produced while reading and decoding `.mat` data.
#[derive(Debug, Error)]
pub enum MatError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Preamble is missing or does not carry the MAT-file identification text.
	#[error("not a MATLAB 5.0 MAT-file")]
	InvalidHeader,
	/// Endian indicator is neither `IM` nor `MI`.
	#[error("unknown endian indicator {indicator:?}")]
	UnknownEndianIndicator {
		/// Raw two indicator bytes.
		indicator: [u8; 2],
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Element tag carried an unrecognized data type code.
	#[error("unknown data type {code} in tag at offset {at}")]
	UnknownDataType {
		/// Raw type code.
		code: u32,
		/// Tag offset.
		at: usize,
	},
	/// Packed tag declared more than four payload bytes.
	#[error("packed tag at offset {at} declares {size} bytes (max 4)")]
	PackedTagTooLarge {
		/// Tag offset.
		at: usize,
		/// Declared payload size.
		size: usize,
	},
	/// Tag size is not a whole number of storage elements.
	#[error("tag at offset {at}: size {size} is not a multiple of element width {width}")]
	TagSizeMisaligned {
		/// Tag offset.
		at: usize,
		/// Declared payload size.
		size: usize,
		/// Storage element width.
		width: usize,
	},
	/// A tag of the wrong data type appeared where another was required.
	#[error("unexpected {got} tag at offset {at}, expected {expected}")]
	UnexpectedTag {
		/// Tag offset.
		at: usize,
		/// Expected data type label.
		expected: &'static str,
		/// Actual data type label.
		got: &'static str,
	},
	/// Compressed element length exceeds the remaining buffer.
	#[error("compressed length mismatch at offset {at}: declared {declared}, remaining {rem}")]
	CompressedLengthMismatch {
		/// Tag offset.
		at: usize,
		/// Declared compressed length.
		declared: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// zlib stream could not be inflated.
	#[error("could not decompress element: {reason}")]
	Decompress {
		/// Inflater error text.
		reason: String,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Top-level matrix decode did not consume its declared length.
	#[error("matrix was not read fully: {remaining} bytes left of {size}")]
	MatrixNotFullyRead {
		/// Declared element size.
		size: usize,
		/// Unconsumed bytes.
		remaining: usize,
	},
	/// Array class byte is not decodable.
	#[error("unsupported array class {class}")]
	UnsupportedClass {
		/// Raw class byte.
		class: u8,
	},
	/// Dimensions element is malformed.
	#[error("invalid dimensions {dims:?}")]
	InvalidDimensions {
		/// Raw dimension values.
		dims: Vec<i64>,
	},
	/// Decoded element count disagrees with the dimensions.
	#[error("{what}: dimensions require {expected} elements, data has {got}")]
	ElementCountMismatch {
		/// Part being decoded.
		what: &'static str,
		/// Count implied by dimensions.
		expected: usize,
		/// Count found in the data element.
		got: usize,
	},
	/// Struct/object field-name table is malformed.
	#[error("invalid field name table: max_len={max_len}, size={size}")]
	InvalidFieldNames {
		/// Declared maximum name width.
		max_len: i64,
		/// Size of the name table element.
		size: usize,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Sparse row index or column pointer is out of range.
	#[error("sparse index out of range: {what}={value}, limit={limit}")]
	SparseIndexOutOfRange {
		/// Which index table failed.
		what: &'static str,
		/// Offending value.
		value: i64,
		/// Exclusive upper bound.
		limit: usize,
	},
	/// Opaque array carried an unknown type-system name.
	#[error("unknown object type ({kind}) found")]
	UnknownObjectType {
		/// Type-system name read from the element.
		kind: String,
	},
	/// Opaque array content was not of the expected shape.
	#[error("unexpected {kind} object content: {detail}")]
	UnexpectedObjectContent {
		/// Type-system name.
		kind: &'static str,
		/// What was found instead.
		detail: String,
	},
	/// MCOS per-object header did not start with the placeholder magic.
	#[error("MCOS per-object header was different than expected: {words:?}")]
	BadPlaceholderHeader {
		/// Leading header words.
		words: Vec<u32>,
	},
	/// Placeholders were found but no MCOS carrier blob exists.
	#[error("MCOS objects found but no MCOS data carrier in file")]
	McosDataMissing,
	/// MCOS blob version is not 2.
	#[error("MCOS data has version {version}, wanted 2")]
	McosUnsupportedVersion {
		/// Parsed version.
		version: u32,
	},
	/// A must-be-zero MCOS field held data.
	#[error("MCOS {section}: non-zero bytes in reserved field at offset {at}")]
	McosNonZeroField {
		/// Segment being parsed.
		section: &'static str,
		/// Offset of the reserved field.
		at: usize,
	},
	/// Segment parse did not land exactly on the next segment offset.
	#[error("MCOS {section} section not fully consumed: at {at}, wanted {expected}")]
	McosSegmentMismatch {
		/// Segment being parsed.
		section: &'static str,
		/// Cursor offset after parsing.
		at: usize,
		/// Expected segment boundary.
		expected: usize,
	},
	/// String pool index out of range.
	#[error("MCOS string index {index} out of range (count={count})")]
	McosStringIndex {
		/// 1-based index.
		index: u32,
		/// Number of strings in the pool.
		count: usize,
	},
	/// Class table index out of range.
	#[error("MCOS class index {index} out of range (count={count})")]
	McosClassIndex {
		/// 1-based index.
		index: u32,
		/// Number of classes.
		count: usize,
	},
	/// Property kind is not supported.
	#[error("MCOS property kind {kind} is not supported")]
	McosUnsupportedPropertyKind {
		/// Raw kind value.
		kind: u32,
	},
	/// Object record has no segment-4 property set.
	#[error("MCOS properties not found for object {object_id}")]
	McosPropertiesNotFound {
		/// 1-based object id.
		object_id: u32,
	},
	/// Placeholder referenced an object id missing from the object table.
	#[error("MCOS object {object_id} not found (count={count})")]
	McosUnknownObject {
		/// 1-based object id.
		object_id: u32,
		/// Number of object records.
		count: usize,
	},
	/// Placeholder class id disagrees with the object record.
	#[error("MCOS class id mismatch for object {object_id}: expected {expected}, actual {actual}")]
	McosClassIdMismatch {
		/// 1-based object id.
		object_id: u32,
		/// Class id declared by the placeholder.
		expected: u32,
		/// Class id stored in the object table.
		actual: u32,
	},
	/// MCOS carrier or blob structure is malformed.
	#[error("malformed MCOS data: {detail}")]
	McosMalformed {
		/// What was wrong.
		detail: String,
	},
	/// Simulink text payload contained an invalid symbol or length.
	#[error("invalid simulink payload at symbol {at}")]
	InvalidSimulinkText {
		/// Symbol offset.
		at: usize,
	},
}
