use matdoc::mat::{Array, ArrayFlags};

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: could not encode json: {err}"),
	}
}

/// Attribute names set in `flags`, or `-` when none are.
pub(crate) fn flags_label(flags: ArrayFlags) -> String {
	let names: Vec<&str> = [
		(flags.is_complex(), "complex"),
		(flags.is_global(), "global"),
		(flags.is_logical(), "logical"),
	]
	.into_iter()
	.filter_map(|(set, name)| set.then_some(name))
	.collect();

	if names.is_empty() { "-".to_owned() } else { names.join(",") }
}

/// Class label: the array class, or the class name for object-like arrays.
pub(crate) fn class_label(array: &Array) -> String {
	match array {
		Array::Object(object) => object.class_name.clone(),
		Array::Java(java) => format!("java:{}", java.class_name),
		Array::Handle(handle) => format!("handle:{}", handle.class_name),
		other => other.class().as_str().to_owned(),
	}
}

/// `RxC` shape label of an array.
pub(crate) fn shape_label(array: &Array) -> String {
	array.header().shape()
}
