mod array;
/// Bounded byte cursor used by every decoder.
pub mod bytes;
/// zlib inflation for `miCOMPRESSED` elements.
pub mod compression;
mod error;
mod fields;
mod file;
mod header;
mod matrix;
/// MCOS object placeholders and second-pass resolution.
pub mod mcos;
mod options;
/// Typed decoding of tag payloads.
pub mod primitive;
/// Simulink text payload decoding.
pub mod simulink;
/// Element tag reader.
pub mod tag;

/// Array model: classes, flags, headers and every array variant.
pub use array::{
	Array, ArrayClass, ArrayFlags, ArrayHeader, CellArray, CharArray, EmptyArray, HandleObject, JavaObject, NumericArray,
	NumericData, ObjectArray, SparseArray, SparseIndex, StructArray,
};
/// Error type and result alias.
pub use error::{MatError, Result};
/// Ordered field containers for structs, objects and root variables.
pub use fields::{FieldMap, FieldTable, SharedFields};
/// Decoded file and its root-variable API.
pub use file::MatFile;
/// Preamble parsing and byte order.
pub use header::{Endianness, MatFileKind, MatHeader};
/// Read configuration.
pub use options::{ArrayFilter, ReadOptions};
/// Element tag model.
pub use tag::{DataType, Tag};
