use super::Property;
use crate::{
	sdf::{self, FIELD_KEYS},
	tf, usd,
	vt::{self, ValueType},
};

/// Scenegraph object for authoring and retrieving numeric, string, and array valued data.
#[derive(Clone, PartialEq)]
pub struct Attribute<'a>(Property<'a>);

impl<'a> Attribute<'a> {
	pub(crate) fn new(stage: &'a usd::Stage, path: sdf::Path) -> Self {
		Attribute(Property::new(stage, path))
	}

	pub fn is_valid(&self) -> bool {
		self.spec_type() == Some(sdf::SpecType::Attribute)
	}

	pub fn type_name(&self) -> tf::Token {
		self.metadata(&FIELD_KEYS.type_name).unwrap_or_default()
	}

	pub fn variability(&self) -> sdf::Variability {
		self.metadata(&FIELD_KEYS.variability).unwrap_or_default()
	}

	/// Return the resolved value, if it holds a `T`.
	pub fn get<T: ValueType>(&self) -> Option<T> {
		self.get_value().and_then(|v| v.get::<T>())
	}

	/// Return the resolved value. A blocked value resolves to `None`.
	pub fn get_value(&self) -> Option<vt::Value> {
		self.stage().resolve_value(self.path(), &FIELD_KEYS.default)
	}

	/// Author `value` as the default value at the edit target.
	pub fn set(&self, value: impl Into<vt::Value>) -> bool {
		self.set_metadata(&FIELD_KEYS.default, value)
	}

	/// Return true if a value resolves for this attribute.
	pub fn has_value(&self) -> bool {
		self.get_value().is_some()
	}

	/// Return true if a non-blocked opinion is authored for this attribute's value.
	pub fn has_authored_value(&self) -> bool {
		self.stage()
			.opinions(self.path(), &FIELD_KEYS.default)
			.first()
			.is_some_and(|opinion| !opinion.value.is_block())
	}

	/// Return true if the edit target holds an opinion for the value.
	pub fn has_authored_value_at_edit_target(&self) -> bool {
		self.stage()
			.edit_target()
			.has_field(self.path(), &FIELD_KEYS.default)
	}

	/// Remove the value opinion from the edit target.
	pub fn clear(&self) -> bool {
		self.clear_metadata(&FIELD_KEYS.default)
	}

	/// Author a value block, hiding all weaker values.
	pub fn block(&self) -> bool {
		self.set_metadata(&FIELD_KEYS.default, vt::Value::block())
	}
}

/// Connections
impl<'a> Attribute<'a> {
	/// Return the composed connection targets, in stage namespace.
	pub fn connections(&self) -> Vec<sdf::Path> {
		self.metadata::<sdf::PathListOp>(&FIELD_KEYS.connection_paths)
			.map(|op| op.ordered_elements())
			.unwrap_or_default()
	}

	pub fn has_authored_connections(&self) -> bool {
		!self.connections().is_empty()
	}

	/// Author an explicit list of connections at the edit target.
	pub fn set_connections(&self, sources: Vec<sdf::Path>) -> bool {
		self.set_metadata(&FIELD_KEYS.connection_paths, sdf::PathListOp::explicit(sources))
	}

	/// Remove the connection opinion from the edit target.
	pub fn clear_connections(&self) -> bool {
		self.clear_metadata(&FIELD_KEYS.connection_paths)
	}
}

impl<'a> std::ops::Deref for Attribute<'a> {
	type Target = Property<'a>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl std::fmt::Debug for Attribute<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Attribute{:?}", *self.0)
	}
}
