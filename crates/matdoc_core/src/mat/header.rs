use crate::mat::bytes::align8;
use crate::mat::{MatError, Result};

/// Byte order declared by the MAT-file endian indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
	/// Little-endian byte order (`IM` indicator).
	Little,
	/// Big-endian byte order (`MI` indicator).
	Big,
}

impl Endianness {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}
}

/// Preamble layout of a MAT stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatFileKind {
	/// Full 128-byte preamble with description text.
	Regular,
	/// Version and endian indicator only, as used by embedded MCOS and Simulink payloads.
	ReducedHeader,
}

/// Parsed MAT-file preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatHeader {
	/// Preamble layout.
	pub kind: MatFileKind,
	/// Free-text description (empty for reduced headers).
	pub description: String,
	/// Raw subsystem data offset bytes (zero for reduced headers).
	pub subsystem_offset: [u8; 8],
	/// Format version, normally `0x0100`.
	pub version: u16,
	/// Byte order of every multi-byte value in the file.
	pub endianness: Endianness,
	/// Offset of the first data element.
	pub data_offset: usize,
}

impl MatHeader {
	/// Size of the regular preamble.
	pub const PREAMBLE_SIZE: usize = 128;
	/// Width of the description text field.
	pub const DESCRIPTION_SIZE: usize = 116;
	/// Required description prefix for regular files.
	pub const DESCRIPTION_PREFIX: &'static str = "MATLAB 5.0 MAT-file";

	/// Parse a preamble of the given kind from the beginning of `bytes`.
	pub fn parse(bytes: &[u8], kind: MatFileKind) -> Result<Self> {
		match kind {
			MatFileKind::Regular => Self::parse_regular(bytes),
			MatFileKind::ReducedHeader => Self::parse_reduced(bytes),
		}
	}

	fn parse_regular(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..Self::PREAMBLE_SIZE).ok_or(MatError::InvalidHeader)?;

		let text = &header[..Self::DESCRIPTION_SIZE];
		let text_len = text.iter().position(|byte| *byte == 0).unwrap_or(text.len());
		let description = String::from_utf8_lossy(&text[..text_len]).into_owned();
		if !description.starts_with(Self::DESCRIPTION_PREFIX) {
			return Err(MatError::InvalidHeader);
		}

		let mut subsystem_offset = [0_u8; 8];
		subsystem_offset.copy_from_slice(&header[116..124]);

		let (version, endianness) = parse_version_and_indicator(&header[124..128])?;

		Ok(Self {
			kind: MatFileKind::Regular,
			description: description.trim_end().to_owned(),
			subsystem_offset,
			version,
			endianness,
			data_offset: align8(Self::PREAMBLE_SIZE),
		})
	}

	fn parse_reduced(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..4).ok_or(MatError::InvalidHeader)?;
		let (version, endianness) = parse_version_and_indicator(header)?;

		Ok(Self {
			kind: MatFileKind::ReducedHeader,
			description: String::new(),
			subsystem_offset: [0_u8; 8],
			version,
			endianness,
			data_offset: align8(4),
		})
	}
}

fn parse_version_and_indicator(bytes: &[u8]) -> Result<(u16, Endianness)> {
	let indicator = [bytes[2], bytes[3]];
	let endianness = match &indicator {
		b"IM" => Endianness::Little,
		b"MI" => Endianness::Big,
		_ => return Err(MatError::UnknownEndianIndicator { indicator }),
	};

	let raw = [bytes[0], bytes[1]];
	let version = match endianness {
		Endianness::Little => u16::from_le_bytes(raw),
		Endianness::Big => u16::from_be_bytes(raw),
	};
	Ok((version, endianness))
}
