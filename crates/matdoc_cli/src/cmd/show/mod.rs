use std::path::PathBuf;

use matdoc::mat::{ArrayFilter, MatFile, ReadOptions, Result};

use crate::cmd::print::{PrintOptions, array_json, print_array};
use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long = "name")]
	pub names: Vec<String>,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "no-mcos")]
	pub no_mcos: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "print-depth")]
	pub print_depth: Option<u32>,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
}

/// Decode root variables, optionally filtered by name, and print their contents.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		names,
		json,
		no_mcos,
		max_depth,
		print_depth,
		max_items,
	} = args;

	let mut options = ReadOptions {
		filter: ArrayFilter::from_names(names),
		resolve_mcos: !no_mcos,
		..ReadOptions::default()
	};
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}
	let file = MatFile::open_with(&path, &options)?;

	let mut print = PrintOptions::default();
	if let Some(print_depth) = print_depth {
		print.max_print_depth = print_depth;
	}
	if let Some(max_items) = max_items {
		print.max_items = max_items;
	}

	if json {
		let payload = ShowJson {
			path: path.display().to_string(),
			roots: file.iter().map(|(_, array)| array_json(array, 0, print)).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	for (name, array) in file.iter() {
		println!("{name}:");
		print_array(array, 2, 0, print);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct ShowJson {
	path: String,
	roots: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests;
