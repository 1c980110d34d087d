use matdoc_testkit::simulink_text;

use crate::mat::MatError;
use crate::mat::simulink::decode_simulink_text;

#[test]
fn decodes_full_groups() {
	assert_eq!(decode_simulink_text("  $\"").expect("decode"), vec![0x00, 0x01, 0x02]);
}

#[test]
fn decodes_short_trailing_groups() {
	let raw = b"MATLAB";
	assert_eq!(decode_simulink_text(&simulink_text(raw)).expect("six bytes"), raw);
	assert_eq!(decode_simulink_text(&simulink_text(&raw[..4])).expect("four bytes"), &raw[..4]);
	assert_eq!(decode_simulink_text(&simulink_text(&raw[..5])).expect("five bytes"), &raw[..5]);
}

#[test]
fn rejects_symbols_outside_alphabet() {
	let err = decode_simulink_text("  a ").expect_err("'a' is past the alphabet");
	assert!(matches!(err, MatError::InvalidSimulinkText { at: 2 }));
}

#[test]
fn rejects_dangling_symbol() {
	let err = decode_simulink_text("     ").expect_err("one symbol cannot carry a byte");
	assert!(matches!(err, MatError::InvalidSimulinkText { at: 4 }));
}
