//! Form engine property-based tests
//!
//! Invariants of the form state engine under arbitrary input sequences.

use formkit_forms::validators::{self, RuleSet};
use formkit_forms::Form;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

type Record = Map<String, Value>;

const FIELDS: [&str; 3] = ["name", "email", "bio"];

fn blank_record() -> Record {
	FIELDS
		.iter()
		.map(|field| ((*field).to_string(), json!("")))
		.collect()
}

fn contact_form() -> Form<Record> {
	let rules = RuleSet::new()
		.required("name", "Name is required")
		.rule("name", validators::max_length(8, "Too long"))
		.rule("email", validators::email("Invalid email"))
		.rule("bio", validators::min_length(3, "Too short"));
	Form::new(blank_record(), rules)
}

#[derive(Debug, Clone)]
enum Event {
	Change(usize, String),
	Blur(usize),
	ValidateAll,
}

fn event() -> impl Strategy<Value = Event> {
	prop_oneof![
		(0..FIELDS.len(), "[a-z@. ]{0,12}").prop_map(|(i, v)| Event::Change(i, v)),
		(0..FIELDS.len()).prop_map(Event::Blur),
		Just(Event::ValidateAll),
	]
}

fn apply(form: &Form<Record>, event: &Event) {
	match event {
		Event::Change(i, value) => form.handle_change(FIELDS[*i], value.as_str()).unwrap(),
		Event::Blur(i) => form.handle_blur(FIELDS[*i]),
		Event::ValidateAll => {
			form.validate_all();
		}
	}
}

// ============================================================================
// Property-Based Tests: Form
// ============================================================================

proptest! {
	/// Test: validate_all agrees with the error map
	///
	/// Category: Property
	/// The return value of validate_all is true iff no errors remain.
	#[test]
	fn prop_validate_all_matches_errors(events in prop::collection::vec(event(), 0..20)) {
		let form = contact_form();
		for event in &events {
			apply(&form, event);
		}

		let valid = form.validate_all();

		prop_assert_eq!(valid, form.errors().is_empty());
		prop_assert_eq!(valid, form.is_valid());
	}

	/// Test: a change clears the field's error
	///
	/// Category: Property
	/// Right after handle_change the changed field carries no error.
	#[test]
	fn prop_change_clears_error(
		events in prop::collection::vec(event(), 0..20),
		field in 0..FIELDS.len(),
		value in "[a-z]{0,12}",
	) {
		let form = contact_form();
		for event in &events {
			apply(&form, event);
		}
		form.validate_all();

		form.handle_change(FIELDS[field], value).unwrap();

		prop_assert!(form.error(FIELDS[field]).is_none());
		prop_assert!(form.is_touched(FIELDS[field]));
		prop_assert!(form.is_dirty());
	}

	/// Test: reset is idempotent
	///
	/// Category: Property
	/// Two consecutive resets yield the same state as one.
	#[test]
	fn prop_reset_idempotent(events in prop::collection::vec(event(), 0..20)) {
		let form = contact_form();
		for event in &events {
			apply(&form, event);
		}

		form.reset(None);
		let once = form.snapshot();
		form.reset(None);
		let twice = form.snapshot();

		prop_assert_eq!(&once, &twice);
		prop_assert_eq!(once.values, blank_record());
		prop_assert!(once.errors.is_empty());
		prop_assert!(once.touched.is_empty());
		prop_assert!(!once.is_dirty);
	}

	/// Test: set_field_values round trip
	///
	/// Category: Property
	/// Every written field reads back and exactly the named fields are touched.
	#[test]
	fn prop_set_field_values_roundtrip(
		partial in prop::collection::hash_map(
			prop::sample::select(FIELDS.to_vec()),
			"[a-z]{0,12}",
			0..=FIELDS.len(),
		)
	) {
		let form = contact_form();
		let values: Record = partial
			.iter()
			.map(|(field, value)| ((*field).to_string(), json!(value)))
			.collect();

		form.set_field_values(values).unwrap();

		for (field, value) in &partial {
			prop_assert_eq!(form.field_value(field), Some(json!(value)));
		}
		let touched = form.touched();
		prop_assert_eq!(touched.len(), partial.len());
		for field in partial.keys() {
			prop_assert!(touched.contains(*field));
		}
	}
}
