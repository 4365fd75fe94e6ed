use crate::sdf;
use std::sync::Arc;

/// Represents a stack of layers that contribute opinions to composition.
#[derive(Debug)]
pub struct LayerStack {
	/// Layers in the stack, ordered from strongest (index 0) to weakest (last index).
	pub layers: Vec<Arc<sdf::Layer>>,
}

impl LayerStack {
	pub fn new(root_layer: Arc<sdf::Layer>) -> Self {
		let mut stack = Self { layers: Vec::new() };
		stack.build(root_layer);
		stack
	}

	pub fn root_layer(&self) -> &Arc<sdf::Layer> {
		&self.layers[0]
	}

	pub fn identifier(&self) -> &str {
		self.layers[0].identifier()
	}

	pub fn contains(&self, layer: &sdf::Layer) -> bool {
		self.layers.iter().any(|l| l.identifier() == layer.identifier())
	}

	/// Return the strongest layer holding `field` on the spec at `path`.
	pub fn strongest_layer_with_field(&self, path: &sdf::Path, field: &crate::tf::Token) -> Option<&Arc<sdf::Layer>> {
		self.layers.iter().find(|layer| layer.has_field(path, field))
	}

	fn build(&mut self, layer: Arc<sdf::Layer>) {
		if self.contains(&layer) {
			log::warn!("sublayer cycle detected at {}", layer.identifier());
			return;
		}
		self.layers.push(layer.clone());

		for sub_layer_path in layer.sub_layer_paths() {
			let resolved_path = layer.resolve_path(&sub_layer_path);
			match sdf::Layer::find(&resolved_path) {
				Some(sub_layer) => self.build(sub_layer),
				None => log::debug!("unresolved sublayer @{}@ in {}", sub_layer_path, layer.identifier()),
			}
		}
	}
}
