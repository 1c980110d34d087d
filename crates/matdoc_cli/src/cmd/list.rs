use std::path::PathBuf;

use matdoc::mat::{MatFile, ReadOptions, Result};

use crate::cmd::util::{class_label, emit_json, flags_label, shape_label};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "no-mcos")]
	pub no_mcos: bool,
}

/// List root variables with class, shape and attribute flags.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json, no_mcos } = args;

	let options = ReadOptions {
		resolve_mcos: !no_mcos,
		..ReadOptions::default()
	};
	let file = MatFile::open_with(&path, &options)?;

	let rows: Vec<RootJson> = file
		.iter()
		.map(|(name, array)| RootJson {
			name: name.to_owned(),
			kind: array.kind(),
			class: class_label(array),
			shape: shape_label(array),
			flags: flags_label(array.flags()),
		})
		.collect();

	if json {
		let payload = ListJson {
			path: path.display().to_string(),
			count: rows.len(),
			roots: rows,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("roots: {}", rows.len());
	for row in &rows {
		println!("  {} {} {} {} {}", row.name, row.kind, row.class, row.shape, row.flags);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct ListJson {
	path: String,
	count: usize,
	roots: Vec<RootJson>,
}

#[derive(serde::Serialize)]
struct RootJson {
	name: String,
	kind: &'static str,
	class: String,
	shape: String,
	flags: String,
}
