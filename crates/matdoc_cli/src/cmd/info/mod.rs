use std::path::PathBuf;

use matdoc::mat::{MatFile, MatFileKind, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print preamble fields and root variable counts.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let file = MatFile::open(&path)?;
	let header = file.header();
	let objects = file.iter().filter(|(_, array)| array.as_object().is_some()).count();

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			kind: kind_label(header.kind),
			description: header.description.clone(),
			version: header.version,
			endianness: header.endianness.as_str(),
			subsystem_offset: subsystem_hex(header.subsystem_offset),
			root_count: file.len(),
			object_roots: objects,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("kind: {}", kind_label(header.kind));
	println!("description: {}", header.description);
	println!("version: 0x{:04x}", header.version);
	println!("endianness: {}", header.endianness.as_str());
	println!("subsystem_offset: {}", subsystem_hex(header.subsystem_offset));
	println!("root_count: {}", file.len());
	println!("object_roots: {objects}");

	Ok(())
}

fn kind_label(kind: MatFileKind) -> &'static str {
	match kind {
		MatFileKind::Regular => "regular",
		MatFileKind::ReducedHeader => "reduced",
	}
}

fn subsystem_hex(bytes: [u8; 8]) -> String {
	let mut out = String::from("0x");
	for byte in bytes {
		out.push_str(&format!("{byte:02x}"));
	}
	out
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	kind: &'static str,
	description: String,
	version: u16,
	endianness: &'static str,
	subsystem_offset: String,
	root_count: usize,
	object_roots: usize,
}

#[cfg(test)]
mod tests;
