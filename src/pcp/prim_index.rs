use super::ArcType;
use super::graph::{MapFunction, Node};
use super::layer_stack::LayerStack;
use crate::sdf::{self, FIELD_KEYS};
use std::sync::Arc;

/// An index of all the sites of scene description that contribute
/// opinions to a specific prim, under composition semantics.
///
/// Nodes are stored in strength order: the local node first, then each
/// arc's subtree before its weaker siblings.
#[derive(Debug)]
pub struct PrimIndex {
	nodes: Vec<Node>,
}

impl PrimIndex {
	pub fn new(root_layer_stack: Arc<LayerStack>, path: sdf::Path) -> Self {
		let mut index = Self { nodes: Vec::new() };
		if path.is_absolute_prim_path() || path.is_absolute_root() {
			index.nodes.push(Node {
				arc_type: ArcType::Local,
				layer_stack: root_layer_stack.clone(),
				site_path: path.clone(),
				map_to_parent: MapFunction::identity(),
				parent_index: None,
			});
			let mut visiting = vec![(root_layer_stack.identifier().to_string(), path)];
			index.compose_subtree(0, &mut visiting);
		}
		index
	}

	pub fn is_valid(&self) -> bool {
		!self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn root_node(&self) -> Option<&Node> {
		self.nodes.first()
	}

	/// Return every (layer, path) site in strength order.
	pub fn sites(&self) -> impl Iterator<Item = (usize, &Arc<sdf::Layer>, &sdf::Path)> {
		self.nodes.iter().enumerate().flat_map(|(idx, node)| {
			node.layer_stack
				.layers
				.iter()
				.map(move |layer| (idx, layer, &node.site_path))
		})
	}

	/// Return true if any site holds a spec for this prim.
	pub fn has_specs(&self) -> bool {
		self.sites().any(|(_, layer, path)| layer.has_spec(path))
	}

	/// Return the (layer, path) sites that hold a spec, strongest first.
	pub fn prim_stack(&self) -> Vec<(Arc<sdf::Layer>, sdf::Path)> {
		self.sites()
			.filter(|(_, layer, path)| layer.has_spec(path))
			.map(|(_, layer, path)| (layer.clone(), path.clone()))
			.collect()
	}

	/// Map `path` from the namespace of node `node_idx` to the namespace of
	/// the root node.
	pub fn map_to_root(&self, node_idx: usize, path: &sdf::Path) -> Option<sdf::Path> {
		let mut current = path.clone();
		let mut idx = node_idx;
		loop {
			let node = self.nodes.get(idx)?;
			let Some(parent) = node.parent_index else {
				return Some(current);
			};
			current = node.map_to_parent.map_source_to_target(&current)?;
			idx = parent;
		}
	}

	fn compose_subtree(&mut self, node_idx: usize, visiting: &mut Vec<(String, sdf::Path)>) {
		let (layer_stack, site_path) = {
			let node = &self.nodes[node_idx];
			(node.layer_stack.clone(), node.site_path.clone())
		};

		for arc_type in [ArcType::Reference, ArcType::Payload] {
			for check_path in site_path.ancestors_range() {
				self.eval_arcs(arc_type, &layer_stack, &check_path, &site_path, node_idx, visiting);
			}
		}
	}

	fn eval_arcs(
		&mut self,
		arc_type: ArcType,
		layer_stack: &Arc<LayerStack>,
		check_path: &sdf::Path,
		site_path: &sdf::Path,
		node_idx: usize,
		visiting: &mut Vec<(String, sdf::Path)>,
	) {
		for (asset_path, prim_path) in compose_site_arcs(layer_stack, check_path, arc_type) {
			let internal = asset_path.is_empty();
			let target_layer_stack = if internal {
				layer_stack.clone()
			} else {
				match sdf::Layer::find(&asset_path) {
					Some(layer) => Arc::new(LayerStack::new(layer)),
					None => {
						log::debug!("unresolved {:?} @{}@ at {}", arc_type, asset_path, check_path);
						continue;
					}
				}
			};

			let base_target = if prim_path.is_empty() {
				target_layer_stack.root_layer().default_prim_as_path()
			} else {
				prim_path
			};
			if base_target.is_empty() {
				log::warn!(
					"{:?} at {} targets @{}@ which has no default prim",
					arc_type,
					check_path,
					target_layer_stack.identifier()
				);
				continue;
			}

			let target_path = site_path.replace_prefix(check_path, &base_target);
			let key = (target_layer_stack.identifier().to_string(), target_path.clone());
			if visiting.contains(&key) {
				log::warn!("composition cycle at <{}> in @{}@", target_path, key.0);
				continue;
			}

			let mut map_to_parent = MapFunction::new(base_target, check_path.clone());
			if internal {
				map_to_parent.add(sdf::Path::absolute_root_path(), sdf::Path::absolute_root_path());
			}

			self.nodes.push(Node {
				arc_type,
				layer_stack: target_layer_stack,
				site_path: target_path,
				map_to_parent,
				parent_index: Some(node_idx),
			});
			let child_idx = self.nodes.len() - 1;

			visiting.push(key);
			self.compose_subtree(child_idx, visiting);
			visiting.pop();
		}
	}
}

/// Compose the reference or payload list ops authored at `path` across the
/// layer stack. Asset paths come back resolved against their authoring layer.
fn compose_site_arcs(layer_stack: &LayerStack, path: &sdf::Path, arc_type: ArcType) -> Vec<(String, sdf::Path)> {
	let resolve = |layer: &sdf::Layer, asset_path: &str| {
		if asset_path.is_empty() {
			String::new()
		} else {
			layer.resolve_path(asset_path)
		}
	};

	match arc_type {
		ArcType::Reference => {
			let ops: Vec<sdf::ReferenceListOp> = layer_stack
				.layers
				.iter()
				.filter_map(|layer| {
					let op = layer.field_as::<sdf::ReferenceListOp>(path, &FIELD_KEYS.references)?;
					Some(op.map(|r| sdf::Reference {
						asset_path: resolve(layer, &r.asset_path),
						..r.clone()
					}))
				})
				.collect();
			sdf::ListOp::compose(ops.iter())
				.into_iter()
				.map(|r| (r.asset_path, r.prim_path))
				.collect()
		}
		ArcType::Payload => {
			let ops: Vec<sdf::PayloadListOp> = layer_stack
				.layers
				.iter()
				.filter_map(|layer| {
					let op = layer.field_as::<sdf::PayloadListOp>(path, &FIELD_KEYS.payload)?;
					Some(op.map(|p| sdf::Payload {
						asset_path: resolve(layer, &p.asset_path),
						prim_path: p.prim_path.clone(),
					}))
				})
				.collect();
			sdf::ListOp::compose(ops.iter())
				.into_iter()
				.map(|p| (p.asset_path, p.prim_path))
				.collect()
		}
		ArcType::Local => Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tf;

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	#[test]
	fn references_and_payloads_in_strength_order() {
		let asset = sdf::Layer::create_anonymous("asset");
		asset.create_prim_spec(&p("/Model"), sdf::Specifier::Def, &t("Xform"));
		asset.create_prim_spec(&p("/Model/Body"), sdf::Specifier::Def, &t("Mesh"));
		asset.set_default_prim(&t("Model"));

		let contents = sdf::Layer::create_anonymous("contents");
		contents.create_prim_spec(&p("/Model"), sdf::Specifier::Def, &t("Xform"));

		let root = sdf::Layer::create_anonymous("root");
		root.create_prim_spec(&p("/World/Car"), sdf::Specifier::Def, &t("Xform"));
		let mut refs = sdf::ReferenceListOp::default();
		refs.prepend(sdf::Reference::new(asset.identifier(), sdf::Path::empty_path()));
		root.set_field(&p("/World/Car"), &FIELD_KEYS.references, refs);
		let mut payloads = sdf::PayloadListOp::default();
		payloads.prepend(sdf::Payload::new(contents.identifier(), p("/Model")));
		root.set_field(&p("/World/Car"), &FIELD_KEYS.payload, payloads);

		let stack = Arc::new(LayerStack::new(root));
		let index = PrimIndex::new(stack.clone(), p("/World/Car/Body"));
		let arcs: Vec<(ArcType, String)> = index
			.nodes()
			.iter()
			.map(|n| (n.arc_type, n.site_path.to_string()))
			.collect();
		assert_eq!(
			arcs,
			vec![
				(ArcType::Local, "/World/Car/Body".to_string()),
				(ArcType::Reference, "/Model/Body".to_string()),
				(ArcType::Payload, "/Model/Body".to_string()),
			]
		);
		assert!(index.has_specs());
		assert_eq!(index.map_to_root(1, &p("/Model/Body.points")), Some(p("/World/Car/Body.points")));
	}

	#[test]
	fn internal_reference_cycle_is_cut() {
		let root = sdf::Layer::create_anonymous("cycle");
		root.create_prim_spec(&p("/A"), sdf::Specifier::Def, &t(""));
		root.create_prim_spec(&p("/B"), sdf::Specifier::Def, &t(""));
		let mut to_b = sdf::ReferenceListOp::default();
		to_b.prepend(sdf::Reference::new("", p("/B")));
		root.set_field(&p("/A"), &FIELD_KEYS.references, to_b);
		let mut to_a = sdf::ReferenceListOp::default();
		to_a.prepend(sdf::Reference::new("", p("/A")));
		root.set_field(&p("/B"), &FIELD_KEYS.references, to_a);

		let index = PrimIndex::new(Arc::new(LayerStack::new(root)), p("/A"));
		assert_eq!(index.nodes().len(), 2);
		assert_eq!(index.map_to_root(1, &p("/Looks")), Some(p("/Looks")));
	}
}
