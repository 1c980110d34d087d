use std::io::{ErrorKind, Read};

use flate2::read::ZlibDecoder;
use log::{trace, warn};

use crate::mat::{MatError, Result};

/// Default ceiling for bytes produced by one compressed element.
pub const DEFAULT_MAX_INFLATED_BYTES: usize = 1024 * 1024 * 1024;

/// Inflate one `miCOMPRESSED` payload (a zlib stream) into a new buffer.
///
/// A stream that ends early keeps whatever was produced before the cut.
pub fn inflate(payload: &[u8], limit: usize) -> Result<Vec<u8>> {
	let mut decoder = ZlibDecoder::new(payload);
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = match decoder.read(&mut buf) {
			Ok(read) => read,
			Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
				warn!("compressed stream ended early after {} bytes", out.len());
				break;
			}
			Err(err) => {
				return Err(MatError::Decompress { reason: err.to_string() });
			}
		};
		if read == 0 {
			break;
		}

		if out.len() + read > limit {
			return Err(MatError::DecompressedTooLarge { limit });
		}

		out.extend_from_slice(&buf[..read]);
	}

	trace!("inflated {} bytes into {}", payload.len(), out.len());
	Ok(out)
}
