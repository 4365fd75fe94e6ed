//! Layer authoring metadata.

use crate::{sdf, vt};

/// Key of the authoring metadata in a layer's `customLayerData`.
pub const AUTHORING_METADATA_KEY: &str = "creator";

/// Return the authoring metadata stamped by this crate, e.g. `openusd-exchange 0.1.0`.
pub fn default_authoring_metadata() -> String {
	concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")).to_string()
}

/// Return true if `layer` records which application authored it.
pub fn has_layer_authoring_metadata(layer: &sdf::Layer) -> bool {
	layer.custom_layer_data().contains_key(AUTHORING_METADATA_KEY)
}

/// Return the authoring metadata of `layer`, empty when none is recorded.
pub fn layer_authoring_metadata(layer: &sdf::Layer) -> String {
	layer
		.custom_layer_data()
		.get(AUTHORING_METADATA_KEY)
		.and_then(|value| value.get::<String>())
		.unwrap_or_default()
}

/// Record `value` as the application that authored `layer`, keeping any
/// other custom layer data.
pub fn set_layer_authoring_metadata(layer: &sdf::Layer, value: &str) {
	let mut data = layer.custom_layer_data();
	data.insert(AUTHORING_METADATA_KEY.to_string(), vt::Value::new(value.to_string()));
	layer.set_custom_layer_data(data);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn metadata_lives_beside_other_custom_data() {
		let layer = sdf::Layer::create_anonymous("metadata");
		assert!(!has_layer_authoring_metadata(&layer));
		assert_eq!(layer_authoring_metadata(&layer), "");

		let mut data = vt::Dictionary::new();
		data.insert("project".to_string(), vt::Value::new("car".to_string()));
		layer.set_custom_layer_data(data);

		set_layer_authoring_metadata(&layer, "MyApp 1.0");
		assert!(has_layer_authoring_metadata(&layer));
		assert_eq!(layer_authoring_metadata(&layer), "MyApp 1.0");
		assert!(layer.custom_layer_data().contains_key("project"));
	}

	#[test]
	fn default_names_the_crate() {
		assert!(default_authoring_metadata().starts_with("openusd-exchange "));
	}
}
