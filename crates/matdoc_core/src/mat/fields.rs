use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::mat::Array;

/// Insertion-ordered name to array mapping.
///
/// Used for one struct/object element and for the decoded root variables.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
	entries: Vec<(Box<str>, Array)>,
}

impl FieldMap {
	/// Create an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the map holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Look up an entry by name.
	pub fn get(&self, name: &str) -> Option<&Array> {
		self.entries.iter().find(|(key, _)| &**key == name).map(|(_, value)| value)
	}

	/// Look up an entry by name for mutation.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Array> {
		self.entries.iter_mut().find(|(key, _)| &**key == name).map(|(_, value)| value)
	}

	/// Whether an entry with this name exists.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Insert or replace an entry; replacing keeps the original position.
	pub fn insert(&mut self, name: impl Into<Box<str>>, value: Array) -> Option<Array> {
		let name = name.into();
		if let Some(existing) = self.get_mut(&name) {
			return Some(std::mem::replace(existing, value));
		}
		self.entries.push((name, value));
		None
	}

	/// Remove an entry, preserving the order of the rest.
	pub fn remove(&mut self, name: &str) -> Option<Array> {
		let index = self.entries.iter().position(|(key, _)| &**key == name)?;
		Some(self.entries.remove(index).1)
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Array)> {
		self.entries.iter().map(|(key, value)| (&**key, value))
	}

	/// Iterate values mutably in insertion order.
	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Array> {
		self.entries.iter_mut().map(|(_, value)| value)
	}

	/// Iterate names in insertion order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(key, _)| &**key)
	}
}

impl IntoIterator for FieldMap {
	type Item = (Box<str>, Array);
	type IntoIter = std::vec::IntoIter<(Box<str>, Array)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

/// Field map shared between every array that references the same element.
pub type SharedFields = Rc<RefCell<FieldMap>>;

/// Per-element field maps of a struct or object array plus the array-wide key order.
///
/// Element maps are created on first use, so the table costs nothing per element
/// until a field is set. Cloning shares the underlying maps, so MCOS objects that
/// alias one another stay aliased after a clone.
#[derive(Clone, Default)]
pub struct FieldTable {
	order: Rc<RefCell<Vec<Box<str>>>>,
	len: usize,
	elements: Rc<RefCell<BTreeMap<usize, SharedFields>>>,
}

impl FieldTable {
	/// Create `len` empty elements.
	pub fn with_len(len: usize) -> Self {
		Self {
			order: Rc::default(),
			len,
			elements: Rc::default(),
		}
	}

	/// Build a table over existing shared element maps.
	pub(crate) fn from_shared(elements: Vec<SharedFields>) -> Self {
		Self {
			order: Rc::default(),
			len: elements.len(),
			elements: Rc::new(RefCell::new(elements.into_iter().enumerate().collect())),
		}
	}

	/// Handle used to refresh the key order after the element maps change.
	pub(crate) fn order_handle(&self) -> Rc<RefCell<Vec<Box<str>>>> {
		Rc::clone(&self.order)
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Whether the table has no elements.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Assign `value` to `name` in element `index`, recording first-seen order.
	///
	/// Returns `false` when `index` is out of range.
	pub fn set_field(&self, index: usize, name: &str, value: Array) -> bool {
		let Some(element) = self.element(index) else {
			return false;
		};
		element.borrow_mut().insert(name, value);

		let mut order = self.order.borrow_mut();
		if !order.iter().any(|key| &**key == name) {
			order.push(name.into());
		}
		true
	}

	/// Array-wide field names in first-seen order.
	pub fn field_names(&self) -> Vec<Box<str>> {
		self.order.borrow().clone()
	}

	/// Shared map of one element, created empty on first access.
	pub fn element(&self, index: usize) -> Option<SharedFields> {
		if index >= self.len {
			return None;
		}
		let mut elements = self.elements.borrow_mut();
		Some(Rc::clone(elements.entry(index).or_default()))
	}

	/// Element maps created so far, in index order.
	pub(crate) fn created_elements(&self) -> Vec<SharedFields> {
		self.elements.borrow().values().map(Rc::clone).collect()
	}

	fn existing(&self, index: usize) -> Option<SharedFields> {
		self.elements.borrow().get(&index).map(Rc::clone)
	}

	/// Clone of one field value.
	pub fn field(&self, index: usize, name: &str) -> Option<Array> {
		self.existing(index)?.borrow().get(name).cloned()
	}

	/// Entries of one element, iterated through the array-wide order.
	pub fn ordered_entries(&self, index: usize) -> Vec<(Box<str>, Array)> {
		let Some(element) = self.existing(index) else {
			return Vec::new();
		};
		let element = element.borrow();
		self.order
			.borrow()
			.iter()
			.filter_map(|name| element.get(name).map(|value| (name.clone(), value.clone())))
			.collect()
	}

	/// Whether two tables hold the same map instance at the given indices.
	pub fn shares_element(&self, index: usize, other: &FieldTable, other_index: usize) -> bool {
		match (self.element(index), other.element(other_index)) {
			(Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
			_ => false,
		}
	}
}

/// Extend `order` with names from `elements` that it does not hold yet.
pub(crate) fn refresh_order(order: &RefCell<Vec<Box<str>>>, elements: &[SharedFields]) {
	let mut order = order.borrow_mut();
	for element in elements {
		for name in element.borrow().names() {
			if !order.iter().any(|key| &**key == name) {
				order.push(name.into());
			}
		}
	}
}

impl fmt::Debug for FieldTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Element maps may form cycles through MCOS references.
		f.debug_struct("FieldTable")
			.field("fields", &self.order.borrow())
			.field("len", &self.len)
			.finish()
	}
}

#[cfg(test)]
mod tests;
