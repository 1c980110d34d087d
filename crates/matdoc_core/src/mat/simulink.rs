use crate::mat::{MatError, Result};

/// First symbol of the 64-symbol alphabet used by Simulink to embed MAT data.
const FIRST_SYMBOL: u8 = b' ';

fn symbol_value(symbol: u8, at: usize) -> Result<u32> {
	match symbol.checked_sub(FIRST_SYMBOL) {
		Some(value) if value < 64 => Ok(u32::from(value)),
		_ => Err(MatError::InvalidSimulinkText { at }),
	}
}

/// Decode Simulink's 6-bit text encoding back into bytes.
///
/// Every four symbols carry three bytes; a trailing group of two or three
/// symbols carries one or two bytes.
pub fn decode_simulink_text(text: &str) -> Result<Vec<u8>> {
	let symbols = text.as_bytes();
	let mut out = Vec::with_capacity(symbols.len() / 4 * 3 + 2);

	for (group_index, group) in symbols.chunks(4).enumerate() {
		let base = group_index * 4;
		if group.len() == 1 {
			return Err(MatError::InvalidSimulinkText { at: base });
		}

		let mut bits = 0_u32;
		for (offset, symbol) in group.iter().enumerate() {
			bits = (bits << 6) | symbol_value(*symbol, base + offset)?;
		}
		// Left-align a short group to a full 24-bit word.
		bits <<= 6 * (4 - group.len() as u32);

		let produced = group.len() - 1;
		out.extend_from_slice(&bits.to_be_bytes()[1..1 + produced]);
	}

	Ok(out)
}

#[cfg(test)]
mod tests;
