use std::collections::HashSet;

use crate::mat::compression::DEFAULT_MAX_INFLATED_BYTES;

/// Set of root variable names to decode; empty means every variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayFilter {
	names: HashSet<String>,
}

impl ArrayFilter {
	/// Filter that matches every name.
	pub fn new() -> Self {
		Self::default()
	}

	/// Filter matching exactly the given names.
	pub fn from_names<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			names: names.into_iter().map(Into::into).collect(),
		}
	}

	/// Add one name to the inclusion set.
	pub fn add(&mut self, name: impl Into<String>) {
		self.names.insert(name.into());
	}

	/// Whether a root variable with this name should be decoded.
	pub fn matches(&self, name: &str) -> bool {
		self.names.is_empty() || self.names.contains(name)
	}

	/// Whether the filter matches every name.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

/// Knobs controlling one read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
	/// Root variable inclusion filter.
	pub filter: ArrayFilter,
	/// Maximum nested array depth.
	pub max_depth: u32,
	/// Maximum bytes produced by a single compressed element.
	pub max_inflated_bytes: usize,
	/// Bind MCOS object placeholders to their properties after the main pass.
	pub resolve_mcos: bool,
}

impl Default for ReadOptions {
	fn default() -> Self {
		Self {
			filter: ArrayFilter::new(),
			max_depth: 64,
			max_inflated_bytes: DEFAULT_MAX_INFLATED_BYTES,
			resolve_mcos: true,
		}
	}
}

impl ReadOptions {
	/// Default options restricted to the given root names.
	pub fn with_filter(filter: ArrayFilter) -> Self {
		Self {
			filter,
			..Self::default()
		}
	}

	/// Options for the embedded MCOS carrier sub-file.
	pub(crate) fn for_mcos_carrier(parent: &ReadOptions) -> Self {
		Self {
			filter: ArrayFilter::new(),
			max_depth: parent.max_depth,
			max_inflated_bytes: parent.max_inflated_bytes,
			resolve_mcos: false,
		}
	}
}
