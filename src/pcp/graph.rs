use super::ArcType;
use super::layer_stack::LayerStack;
use crate::sdf;
use std::sync::Arc;

/// Maps paths from the namespace of a node to the namespace of its parent.
///
/// Each pair maps a source prefix to a target prefix; the longest matching
/// source prefix wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFunction {
	pairs: Vec<(sdf::Path, sdf::Path)>,
}

impl MapFunction {
	pub fn identity() -> Self {
		Self {
			pairs: vec![(sdf::Path::absolute_root_path(), sdf::Path::absolute_root_path())],
		}
	}

	pub fn new(source: sdf::Path, target: sdf::Path) -> Self {
		Self {
			pairs: vec![(source, target)],
		}
	}

	pub fn add(&mut self, source: sdf::Path, target: sdf::Path) {
		if !self.pairs.iter().any(|(s, _)| *s == source) {
			self.pairs.push((source, target));
		}
	}

	/// Map `path` from source to target namespace, or `None` when no source
	/// prefix covers it.
	pub fn map_source_to_target(&self, path: &sdf::Path) -> Option<sdf::Path> {
		let (source, target) = self
			.pairs
			.iter()
			.filter(|(source, _)| path.has_prefix(source))
			.max_by_key(|(source, _)| source.as_str().len())?;
		let mapped = path.replace_prefix(source, target);
		(!mapped.is_empty()).then_some(mapped)
	}

	/// Map `path` from target back to source namespace.
	pub fn map_target_to_source(&self, path: &sdf::Path) -> Option<sdf::Path> {
		let (source, target) = self
			.pairs
			.iter()
			.filter(|(_, target)| path.has_prefix(target))
			.max_by_key(|(_, target)| target.as_str().len())?;
		let mapped = path.replace_prefix(target, source);
		(!mapped.is_empty()).then_some(mapped)
	}
}

/// A site of scene description contributing opinions to a prim.
#[derive(Debug, Clone)]
pub struct Node {
	pub arc_type: ArcType,
	pub layer_stack: Arc<LayerStack>,
	pub site_path: sdf::Path,
	pub map_to_parent: MapFunction,
	pub parent_index: Option<usize>,
}

impl Node {
	pub fn is_root(&self) -> bool {
		self.parent_index.is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	#[test]
	fn longest_prefix_wins() {
		let mut map = MapFunction::new(p("/Model"), p("/World/Car"));
		map.add(p("/"), p("/"));

		assert_eq!(map.map_source_to_target(&p("/Model/Body.size")), Some(p("/World/Car/Body.size")));
		assert_eq!(map.map_source_to_target(&p("/Looks/Red")), Some(p("/Looks/Red")));
		assert_eq!(map.map_target_to_source(&p("/World/Car/Body")), Some(p("/Model/Body")));

		let map = MapFunction::new(p("/Model"), p("/World/Car"));
		assert_eq!(map.map_source_to_target(&p("/Other")), None);
	}
}
