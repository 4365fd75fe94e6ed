use crate::{
	sdf, tf, usd,
	vt::{self, ValueType},
};

/// Base class for Usd scenegraph objects, providing common API.
///
/// The commonality between the three types of scenegraph objects in Usd
/// ([`usd::Prim`], [`usd::Attribute`], [`usd::Relationship`]) is that they
/// can all have metadata. Other objects in the API simply are kinds of metadata.
///
/// **Inheritance hierarchy:**
/// - [`usd::Object`]
///   - [`usd::Prim`]
///   - [`usd::Property`]
///     - [`usd::Attribute`]
///     - [`usd::Relationship`]
#[derive(Clone)]
pub struct Object<'a> {
	stage: &'a usd::Stage,
	path: sdf::Path,
}

impl<'a> Object<'a> {
	pub(crate) fn new(stage: &'a usd::Stage, path: sdf::Path) -> Self {
		Object { stage, path }
	}

	pub fn stage(&self) -> &'a usd::Stage {
		self.stage
	}

	pub fn path(&self) -> &sdf::Path {
		&self.path
	}

	pub fn name(&self) -> tf::Token {
		self.path.name_token()
	}

	/// Return the composed value of the metadata field `key`.
	pub fn metadata<T: ValueType>(&self, key: &tf::Token) -> Option<T> {
		self.stage.resolve_value(&self.path, key).and_then(|v| v.get::<T>())
	}

	pub fn has_authored_metadata(&self, key: &tf::Token) -> bool {
		!self.stage.opinions(&self.path, key).is_empty()
	}

	/// Author the metadata field `key` at the edit target.
	pub fn set_metadata(&self, key: &tf::Token, value: impl Into<vt::Value>) -> bool {
		let Ok(layer) = self.stage.editable_target() else {
			return false;
		};
		self.ensure_spec(&layer) && layer.set_field(&self.path, key, value)
	}

	/// Remove the opinion for `key` from the edit target.
	pub fn clear_metadata(&self, key: &tf::Token) -> bool {
		let Ok(layer) = self.stage.editable_target() else {
			return false;
		};
		layer.erase_field(&self.path, key);
		true
	}

	/// Return this object's documentation (metadata).
	///
	/// This returns the empty string if no documentation has been set.
	pub fn documentation(&self) -> String {
		self.metadata(&sdf::FIELD_KEYS.documentation).unwrap_or_default()
	}

	pub fn set_documentation(&self, documentation: &str) -> bool {
		self.set_metadata(&sdf::FIELD_KEYS.documentation, documentation.to_string())
	}

	/// Return this object's composed customData dictionary.
	pub fn custom_data(&self) -> vt::Dictionary {
		self.metadata(&sdf::FIELD_KEYS.custom_data).unwrap_or_default()
	}

	pub fn set_custom_data_by_key(&self, key: &str, value: impl Into<vt::Value>) -> bool {
		let mut data = self
			.stage
			.edit_target()
			.field_as::<vt::Dictionary>(&self.path, &sdf::FIELD_KEYS.custom_data)
			.unwrap_or_default();
		data.insert(key.to_string(), value.into());
		self.set_metadata(&sdf::FIELD_KEYS.custom_data, data)
	}

	#[doc(hidden)]
	pub fn spec_type(&self) -> Option<sdf::SpecType> {
		self.stage.spec_type(&self.path)
	}

	/// Make sure the edit target holds a spec for this object.
	pub(crate) fn ensure_spec(&self, layer: &sdf::Layer) -> bool {
		if layer.has_spec(&self.path) {
			return true;
		}
		if self.path.is_absolute_root() {
			return true;
		}
		if self.path.is_prim_property_path() {
			let spec_type = self.spec_type().unwrap_or(sdf::SpecType::Attribute);
			let type_name = self.stage.resolve_value(&self.path, &sdf::FIELD_KEYS.type_name);
			let type_name = type_name.and_then(|v| v.get::<tf::Token>());
			let custom = self.metadata::<bool>(&sdf::FIELD_KEYS.custom).unwrap_or(false);
			layer.create_property_spec(&self.path, spec_type, type_name.as_ref(), custom)
		} else {
			layer.ensure_prim_spec(&self.path)
		}
	}
}

impl PartialEq for Object<'_> {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.stage, other.stage) && self.path == other.path
	}
}

impl std::fmt::Debug for Object<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "<{}>", self.path)
	}
}
