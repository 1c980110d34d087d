use std::collections::BTreeMap;

use crate::mat::Endianness;
use crate::mat::fields::FieldTable;
use crate::mat::primitive::{Element, encode_values};

/// MATLAB array class carried in the array flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayClass {
	/// `mxCELL_CLASS`.
	Cell,
	/// `mxSTRUCT_CLASS`.
	Struct,
	/// `mxOBJECT_CLASS`.
	Object,
	/// `mxCHAR_CLASS`.
	Char,
	/// `mxSPARSE_CLASS`.
	Sparse,
	/// `mxDOUBLE_CLASS`.
	Double,
	/// `mxSINGLE_CLASS`.
	Single,
	/// `mxINT8_CLASS`.
	Int8,
	/// `mxUINT8_CLASS`.
	UInt8,
	/// `mxINT16_CLASS`.
	Int16,
	/// `mxUINT16_CLASS`.
	UInt16,
	/// `mxINT32_CLASS`.
	Int32,
	/// `mxUINT32_CLASS`.
	UInt32,
	/// `mxINT64_CLASS`.
	Int64,
	/// `mxUINT64_CLASS`.
	UInt64,
	/// `mxFUNCTION_CLASS`; recognised but not decodable.
	Function,
	/// `mxOPAQUE_CLASS`.
	Opaque,
}

impl ArrayClass {
	/// Map the class byte of the flags word.
	pub fn from_code(code: u8) -> Option<Self> {
		Some(match code {
			1 => Self::Cell,
			2 => Self::Struct,
			3 => Self::Object,
			4 => Self::Char,
			5 => Self::Sparse,
			6 => Self::Double,
			7 => Self::Single,
			8 => Self::Int8,
			9 => Self::UInt8,
			10 => Self::Int16,
			11 => Self::UInt16,
			12 => Self::Int32,
			13 => Self::UInt32,
			14 => Self::Int64,
			15 => Self::UInt64,
			16 => Self::Function,
			17 => Self::Opaque,
			_ => return None,
		})
	}

	/// Class byte as written in the flags word.
	pub fn code(self) -> u8 {
		match self {
			Self::Cell => 1,
			Self::Struct => 2,
			Self::Object => 3,
			Self::Char => 4,
			Self::Sparse => 5,
			Self::Double => 6,
			Self::Single => 7,
			Self::Int8 => 8,
			Self::UInt8 => 9,
			Self::Int16 => 10,
			Self::UInt16 => 11,
			Self::Int32 => 12,
			Self::UInt32 => 13,
			Self::Int64 => 14,
			Self::UInt64 => 15,
			Self::Function => 16,
			Self::Opaque => 17,
		}
	}

	/// MATLAB class name as shown by `class(x)`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Cell => "cell",
			Self::Struct => "struct",
			Self::Object => "object",
			Self::Char => "char",
			Self::Sparse => "sparse",
			Self::Double => "double",
			Self::Single => "single",
			Self::Int8 => "int8",
			Self::UInt8 => "uint8",
			Self::Int16 => "int16",
			Self::UInt16 => "uint16",
			Self::Int32 => "int32",
			Self::UInt32 => "uint32",
			Self::Int64 => "int64",
			Self::UInt64 => "uint64",
			Self::Function => "function_handle",
			Self::Opaque => "opaque",
		}
	}

	/// Whether arrays of this class hold plain numeric data.
	pub fn is_numeric(self) -> bool {
		matches!(
			self,
			Self::Double
				| Self::Single
				| Self::Int8
				| Self::UInt8
				| Self::Int16
				| Self::UInt16
				| Self::Int32
				| Self::UInt32
				| Self::Int64
				| Self::UInt64
		)
	}
}

/// Attribute bits of the array flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayFlags(pub u32);

impl ArrayFlags {
	/// Complex attribute bit.
	pub const COMPLEX: u32 = 0x0800;
	/// Global attribute bit.
	pub const GLOBAL: u32 = 0x0400;
	/// Logical attribute bit.
	pub const LOGICAL: u32 = 0x0200;

	/// Whether the array carries an imaginary part.
	pub fn is_complex(self) -> bool {
		self.0 & Self::COMPLEX != 0
	}

	/// Whether the variable was declared global.
	pub fn is_global(self) -> bool {
		self.0 & Self::GLOBAL != 0
	}

	/// Whether the array is a logical (boolean) array.
	pub fn is_logical(self) -> bool {
		self.0 & Self::LOGICAL != 0
	}
}

/// Name, shape, class and attributes common to every array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayHeader {
	/// Variable or field name; empty for anonymous cell contents.
	pub name: String,
	/// Dimensions, at least two.
	pub dims: Vec<usize>,
	/// Array class.
	pub class: ArrayClass,
	/// Attribute bits.
	pub flags: ArrayFlags,
}

impl ArrayHeader {
	/// Header with no attribute bits.
	pub fn new(name: impl Into<String>, dims: Vec<usize>, class: ArrayClass) -> Self {
		Self {
			name: name.into(),
			dims,
			class,
			flags: ArrayFlags::default(),
		}
	}

	/// First dimension.
	pub fn rows(&self) -> usize {
		self.dims.first().copied().unwrap_or(0)
	}

	/// Product of every trailing dimension, saturating at `usize::MAX`.
	pub fn cols(&self) -> usize {
		checked_product(self.dims.get(1..).unwrap_or_default()).unwrap_or(usize::MAX)
	}

	/// Product of all dimensions, saturating at `usize::MAX`.
	pub fn element_count(&self) -> usize {
		checked_product(&self.dims).unwrap_or(usize::MAX)
	}

	/// Column-major linear index of `(m, n)`, if inside the first two dimensions.
	pub fn index(&self, m: usize, n: usize) -> Option<usize> {
		let rows = self.rows();
		if m >= rows || n >= self.cols() {
			return None;
		}
		Some(m + n * rows)
	}

	/// `RxC` or `AxBxC` shape label.
	pub fn shape(&self) -> String {
		self.dims.iter().map(usize::to_string).collect::<Vec<_>>().join("x")
	}
}

/// Product of `dims`, or `None` when it overflows `usize`.
pub(crate) fn checked_product(dims: &[usize]) -> Option<usize> {
	dims.iter().try_fold(1_usize, |acc, dim| acc.checked_mul(*dim))
}

/// Decoded array value.
#[derive(Debug, Clone)]
pub enum Array {
	/// Zero-size placeholder for an empty cell slot or field.
	Empty(EmptyArray),
	/// Numeric array of one of the eight numeric subtypes.
	Numeric(NumericArray),
	/// Character array.
	Char(CharArray),
	/// Cell array.
	Cell(CellArray),
	/// Struct array.
	Struct(StructArray),
	/// Object array, either legacy class objects or resolved MCOS objects.
	Object(ObjectArray),
	/// Sparse double matrix.
	Sparse(SparseArray),
	/// Serialized Java object.
	Java(JavaObject),
	/// Handle-class object wrapping a cell array.
	Handle(HandleObject),
}

impl Array {
	/// Common header of any variant.
	pub fn header(&self) -> &ArrayHeader {
		match self {
			Self::Empty(array) => &array.header,
			Self::Numeric(array) => &array.header,
			Self::Char(array) => &array.header,
			Self::Cell(array) => &array.header,
			Self::Struct(array) => &array.header,
			Self::Object(array) => &array.header,
			Self::Sparse(array) => &array.header,
			Self::Java(array) => &array.header,
			Self::Handle(array) => &array.header,
		}
	}

	fn header_mut(&mut self) -> &mut ArrayHeader {
		match self {
			Self::Empty(array) => &mut array.header,
			Self::Numeric(array) => &mut array.header,
			Self::Char(array) => &mut array.header,
			Self::Cell(array) => &mut array.header,
			Self::Struct(array) => &mut array.header,
			Self::Object(array) => &mut array.header,
			Self::Sparse(array) => &mut array.header,
			Self::Java(array) => &mut array.header,
			Self::Handle(array) => &mut array.header,
		}
	}

	/// Array name.
	pub fn name(&self) -> &str {
		&self.header().name
	}

	/// Replace the array name.
	pub fn set_name(&mut self, name: impl Into<String>) {
		self.header_mut().name = name.into();
	}

	/// Array dimensions.
	pub fn dims(&self) -> &[usize] {
		&self.header().dims
	}

	/// Array class.
	pub fn class(&self) -> ArrayClass {
		self.header().class
	}

	/// Attribute bits.
	pub fn flags(&self) -> ArrayFlags {
		self.header().flags
	}

	/// Stable variant label.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Empty(_) => "empty",
			Self::Numeric(_) => "numeric",
			Self::Char(_) => "char",
			Self::Cell(_) => "cell",
			Self::Struct(_) => "struct",
			Self::Object(_) => "object",
			Self::Sparse(_) => "sparse",
			Self::Java(_) => "java",
			Self::Handle(_) => "handle",
		}
	}

	/// Numeric payload, if this is a numeric array.
	pub fn as_numeric(&self) -> Option<&NumericArray> {
		match self {
			Self::Numeric(array) => Some(array),
			_ => None,
		}
	}

	/// Character payload, if this is a char array.
	pub fn as_char(&self) -> Option<&CharArray> {
		match self {
			Self::Char(array) => Some(array),
			_ => None,
		}
	}

	/// Cell payload, if this is a cell array.
	pub fn as_cell(&self) -> Option<&CellArray> {
		match self {
			Self::Cell(array) => Some(array),
			_ => None,
		}
	}

	/// Struct payload, if this is a struct array.
	pub fn as_struct(&self) -> Option<&StructArray> {
		match self {
			Self::Struct(array) => Some(array),
			_ => None,
		}
	}

	/// Object payload, if this is an object array.
	pub fn as_object(&self) -> Option<&ObjectArray> {
		match self {
			Self::Object(array) => Some(array),
			_ => None,
		}
	}

	/// Sparse payload, if this is a sparse array.
	pub fn as_sparse(&self) -> Option<&SparseArray> {
		match self {
			Self::Sparse(array) => Some(array),
			_ => None,
		}
	}

	/// Field table for struct and object arrays.
	pub fn fields(&self) -> Option<&FieldTable> {
		match self {
			Self::Struct(array) => Some(&array.fields),
			Self::Object(array) => Some(&array.fields),
			_ => None,
		}
	}
}

/// Empty value for a zero-size element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyArray {
	/// Header: an anonymous `0x0` double.
	pub header: ArrayHeader,
}

impl EmptyArray {
	/// Empty value carrying `name`.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			header: ArrayHeader::new(name, vec![0, 0], ArrayClass::Double),
		}
	}
}

impl Default for EmptyArray {
	fn default() -> Self {
		Self::named("")
	}
}

/// Typed numeric storage.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
	/// `int8` values.
	Int8(Vec<i8>),
	/// `uint8` values.
	UInt8(Vec<u8>),
	/// `int16` values.
	Int16(Vec<i16>),
	/// `uint16` values.
	UInt16(Vec<u16>),
	/// `int32` values.
	Int32(Vec<i32>),
	/// `uint32` values.
	UInt32(Vec<u32>),
	/// `int64` values.
	Int64(Vec<i64>),
	/// `uint64` values.
	UInt64(Vec<u64>),
	/// `single` values.
	Single(Vec<f32>),
	/// `double` values.
	Double(Vec<f64>),
}

macro_rules! for_each_numeric {
	($data:expr, $values:ident => $body:expr) => {
		match $data {
			NumericData::Int8($values) => $body,
			NumericData::UInt8($values) => $body,
			NumericData::Int16($values) => $body,
			NumericData::UInt16($values) => $body,
			NumericData::Int32($values) => $body,
			NumericData::UInt32($values) => $body,
			NumericData::Int64($values) => $body,
			NumericData::UInt64($values) => $body,
			NumericData::Single($values) => $body,
			NumericData::Double($values) => $body,
		}
	};
}

impl NumericData {
	/// Number of stored values.
	pub fn len(&self) -> usize {
		for_each_numeric!(self, values => values.len())
	}

	/// Whether no values are stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Array class matching the storage.
	pub fn class(&self) -> ArrayClass {
		match self {
			Self::Int8(_) => ArrayClass::Int8,
			Self::UInt8(_) => ArrayClass::UInt8,
			Self::Int16(_) => ArrayClass::Int16,
			Self::UInt16(_) => ArrayClass::UInt16,
			Self::Int32(_) => ArrayClass::Int32,
			Self::UInt32(_) => ArrayClass::UInt32,
			Self::Int64(_) => ArrayClass::Int64,
			Self::UInt64(_) => ArrayClass::UInt64,
			Self::Single(_) => ArrayClass::Single,
			Self::Double(_) => ArrayClass::Double,
		}
	}

	/// One value widened to `f64`.
	pub fn get_f64(&self, index: usize) -> Option<f64> {
		for_each_numeric!(self, values => values.get(index).map(|value| Element::to_f64(*value)))
	}

	/// Every value widened to `f64`.
	pub fn to_f64_vec(&self) -> Vec<f64> {
		for_each_numeric!(self, values => values.iter().map(|value| Element::to_f64(*value)).collect())
	}

	/// Native-width bytes of every value in the given order.
	pub fn to_bytes(&self, endianness: Endianness) -> Vec<u8> {
		for_each_numeric!(self, values => encode_values(values, endianness))
	}
}

/// Numeric array with optional imaginary part.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
	/// Common header.
	pub header: ArrayHeader,
	/// Real part, column-major.
	pub real: NumericData,
	/// Imaginary part for complex arrays, same length as `real`.
	pub imag: Option<NumericData>,
}

impl NumericArray {
	/// Real value at column-major `(m, n)` widened to `f64`.
	pub fn get(&self, m: usize, n: usize) -> Option<f64> {
		self.real.get_f64(self.header.index(m, n)?)
	}

	/// Imaginary value at `(m, n)`; zero for real arrays.
	pub fn get_imaginary(&self, m: usize, n: usize) -> Option<f64> {
		let index = self.header.index(m, n)?;
		match &self.imag {
			Some(imag) => imag.get_f64(index),
			None => Some(0.0),
		}
	}

	/// Whether the array carries an imaginary part.
	pub fn is_complex(&self) -> bool {
		self.imag.is_some()
	}
}

/// Character array stored column-major.
///
/// Char data may be shorter than the dimensions; positions past the stored code
/// points read as `'\0'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharArray {
	/// Common header.
	pub header: ArrayHeader,
	/// Stored code points, column-major.
	pub chars: Vec<char>,
}

impl CharArray {
	/// Build a `1xN` char array from text.
	pub fn from_text(name: impl Into<String>, text: &str) -> Self {
		let chars: Vec<char> = text.chars().collect();
		Self {
			header: ArrayHeader::new(name, vec![1, chars.len()], ArrayClass::Char),
			chars,
		}
	}

	/// Character at `(m, n)`.
	pub fn get(&self, m: usize, n: usize) -> Option<char> {
		let index = self.header.index(m, n)?;
		Some(self.chars.get(index).copied().unwrap_or('\0'))
	}

	/// Characters of row `m`, padded out to the declared column count.
	pub fn row_chars(&self, m: usize) -> impl Iterator<Item = char> + '_ {
		let rows = self.header.rows();
		let cols = if m < rows { self.header.cols() } else { 0 };
		(0..cols).map(move |n| self.chars.get(m + n * rows).copied().unwrap_or('\0'))
	}

	/// Row `m` as a string.
	pub fn row(&self, m: usize) -> Option<String> {
		if m >= self.header.rows() {
			return None;
		}
		Some(self.row_chars(m).collect())
	}

	/// Every row as a string.
	pub fn rows_as_strings(&self) -> Vec<String> {
		(0..self.header.rows()).filter_map(|m| self.row(m)).collect()
	}

	/// Whole array as one string when it has at most one row.
	pub fn as_string(&self) -> Option<String> {
		match self.header.rows() {
			0 => Some(String::new()),
			1 => self.row(0),
			_ => None,
		}
	}
}

/// Cell array stored column-major.
#[derive(Debug, Clone)]
pub struct CellArray {
	/// Common header.
	pub header: ArrayHeader,
	/// Cell contents, column-major.
	pub cells: Vec<Array>,
}

impl CellArray {
	/// Cell at `(m, n)`.
	pub fn get(&self, m: usize, n: usize) -> Option<&Array> {
		self.cells.get(self.header.index(m, n)?)
	}
}

/// Struct array.
#[derive(Debug, Clone)]
pub struct StructArray {
	/// Common header.
	pub header: ArrayHeader,
	/// Per-element field maps with array-wide order.
	pub fields: FieldTable,
}

impl StructArray {
	/// Field value of element `index`.
	pub fn field(&self, index: usize, name: &str) -> Option<Array> {
		self.fields.field(index, name)
	}

	/// Array-wide field names in first-seen order.
	pub fn field_names(&self) -> Vec<Box<str>> {
		self.fields.field_names()
	}
}

/// Object array: legacy class objects or resolved MCOS objects.
#[derive(Debug, Clone)]
pub struct ObjectArray {
	/// Common header.
	pub header: ArrayHeader,
	/// Class name.
	pub class_name: String,
	/// MCOS class id, absent for legacy objects.
	pub class_id: Option<u32>,
	/// Per-element property maps; shared between aliases of one MCOS object.
	pub fields: FieldTable,
}

impl ObjectArray {
	/// Property value of element `index`.
	pub fn field(&self, index: usize, name: &str) -> Option<Array> {
		self.fields.field(index, name)
	}

	/// Array-wide property names in first-seen order.
	pub fn field_names(&self) -> Vec<Box<str>> {
		self.fields.field_names()
	}
}

/// Sparse entry key, ordered column first then row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SparseIndex {
	/// Column index.
	pub col: usize,
	/// Row index.
	pub row: usize,
}

/// Sparse double matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray {
	/// Common header.
	pub header: ArrayHeader,
	/// Declared maximum non-zero count.
	pub nzmax: usize,
	/// Real non-zero entries.
	pub real: BTreeMap<SparseIndex, f64>,
	/// Imaginary entries for complex arrays.
	pub imag: Option<BTreeMap<SparseIndex, f64>>,
}

impl SparseArray {
	/// Real value at `(m, n)`; zero when absent.
	pub fn get(&self, m: usize, n: usize) -> f64 {
		self.real.get(&SparseIndex { col: n, row: m }).copied().unwrap_or(0.0)
	}

	/// Imaginary value at `(m, n)`; zero when absent.
	pub fn get_imaginary(&self, m: usize, n: usize) -> f64 {
		self.imag
			.as_ref()
			.and_then(|imag| imag.get(&SparseIndex { col: n, row: m }).copied())
			.unwrap_or(0.0)
	}

	/// Number of stored real entries.
	pub fn nnz(&self) -> usize {
		self.real.len()
	}

	/// Declared maximum non-zero count.
	pub fn nzmax(&self) -> usize {
		self.nzmax
	}

	/// Real entries as `(row, col, value)` in column-major order.
	pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
		self.real.iter().map(|(index, value)| (index.row, index.col, *value))
	}
}

/// Serialized Java object carried by an opaque element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaObject {
	/// Common header.
	pub header: ArrayHeader,
	/// Java class name.
	pub class_name: String,
	/// Java serialization stream bytes.
	pub bytes: Vec<u8>,
}

/// Handle-class object whose state is a cell array.
#[derive(Debug, Clone)]
pub struct HandleObject {
	/// Common header.
	pub header: ArrayHeader,
	/// Class name.
	pub class_name: String,
	/// Wrapped content.
	pub content: CellArray,
}
