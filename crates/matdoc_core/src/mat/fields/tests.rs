use crate::mat::fields::{FieldMap, FieldTable, refresh_order};
use crate::mat::{Array, CharArray, EmptyArray};

fn text(value: &str) -> Array {
	Array::Char(CharArray::from_text("", value))
}

#[test]
fn field_map_keeps_insertion_order_on_replace() {
	let mut map = FieldMap::new();
	map.insert("b", text("1"));
	map.insert("a", text("2"));
	let old = map.insert("b", text("3"));

	assert!(old.is_some());
	assert_eq!(map.names().collect::<Vec<_>>(), vec!["b", "a"]);
	assert_eq!(map.get("b").and_then(Array::as_char).and_then(|c| c.as_string()).as_deref(), Some("3"));

	map.remove("b");
	assert_eq!(map.names().collect::<Vec<_>>(), vec!["a"]);
	assert!(!map.contains("b"));
}

#[test]
fn array_wide_order_spans_elements() {
	let table = FieldTable::with_len(2);
	assert!(table.set_field(0, "a", text("x")));
	assert!(table.set_field(0, "b", text("y")));
	assert!(table.set_field(1, "c", text("z")));
	assert!(!table.set_field(2, "d", text("w")));

	let names: Vec<_> = table.field_names().iter().map(|name| name.to_string()).collect();
	assert_eq!(names, vec!["a", "b", "c"]);

	let entries = table.ordered_entries(1);
	assert_eq!(entries.len(), 1);
	assert_eq!(&*entries[0].0, "c");
	assert!(table.field(1, "a").is_none());
}

#[test]
fn clones_share_element_maps() {
	let table = FieldTable::with_len(1);
	let copy = table.clone();
	copy.set_field(0, "p", Array::Empty(EmptyArray::named("p")));

	assert!(table.field(0, "p").is_some());
	assert!(table.shares_element(0, &copy, 0));
	assert!(!table.shares_element(0, &FieldTable::with_len(1), 0));
}

#[test]
fn refresh_order_appends_late_names() {
	let table = FieldTable::with_len(1);
	table.set_field(0, "a", text("1"));
	if let Some(element) = table.element(0) {
		element.borrow_mut().insert("late", text("2"));
	}
	refresh_order(&table.order_handle(), &[table.element(0).expect("element")]);

	let names: Vec<_> = table.field_names().iter().map(|name| name.to_string()).collect();
	assert_eq!(names, vec!["a", "late"]);
}
