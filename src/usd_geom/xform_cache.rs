use super::Xformable;
use crate::{gf, sdf, usd, usd::SchemaBase};
use std::collections::HashMap;

/// A caching mechanism for transform matrices.
///
/// The cache holds world transforms of every prim it has visited, so
/// computing the transforms of siblings shares their ancestors' work.
/// Clear it after authoring transforms.
#[derive(Debug, Default)]
pub struct XformCache {
	world: HashMap<sdf::Path, gf::Matrix4d>,
}

impl XformCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn clear(&mut self) {
		self.world.clear();
	}

	/// Compute the transformation from the local space of `prim` to world space.
	pub fn local_to_world(&mut self, prim: &usd::Prim) -> gf::Matrix4d {
		if !prim.is_valid() || prim.is_pseudo_root() {
			return gf::Matrix4d::identity();
		}
		if let Some(cached) = self.world.get(prim.path()) {
			return *cached;
		}

		let (local, resets) = match Xformable::from_prim(prim.clone()) {
			Some(xformable) => (xformable.local_transformation(), xformable.resets_xform_stack()),
			None => (gf::Matrix4d::identity(), false),
		};
		let world = if resets {
			local
		} else {
			local * self.local_to_world(&prim.parent())
		};
		self.world.insert(prim.path().clone(), world);
		world
	}

	/// Compute the transformation of the parent of `prim` to world space.
	pub fn parent_to_world(&mut self, prim: &usd::Prim) -> gf::Matrix4d {
		self.local_to_world(&prim.parent())
	}

	/// Compute the local transformation of `prim`, and whether it resets the
	/// transform stack.
	pub fn local_transformation(&self, prim: &usd::Prim) -> (gf::Matrix4d, bool) {
		match Xformable::from_prim(prim.clone()) {
			Some(xformable) => (xformable.local_transformation(), xformable.resets_xform_stack()),
			None => (gf::Matrix4d::identity(), false),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{tf, usd_geom::Precision, usd_geom::Xform};

	#[test]
	fn world_transforms_accumulate() {
		let stage = usd::Stage::create_in_memory();
		let world = Xform::define(&stage, "/World").unwrap().xformable();
		world
			.add_translate_op(Precision::Double, None)
			.unwrap()
			.set(gf::Vec3d::new(0.0, 10.0, 0.0));
		let child = Xform::define(&stage, "/World/Child").unwrap().xformable();
		child
			.add_translate_op(Precision::Double, None)
			.unwrap()
			.set(gf::Vec3d::new(1.0, 0.0, 0.0));
		stage.define_prim("/World/Child/Scope", &tf::Token::new("Scope")).unwrap();

		let mut cache = XformCache::new();
		let leaf = stage.prim_at_path("/World/Child/Scope");
		assert_eq!(cache.local_to_world(&leaf).extract_translation(), gf::Vec3d::new(1.0, 10.0, 0.0));
		assert_eq!(
			cache.parent_to_world(&stage.prim_at_path("/World/Child")).extract_translation(),
			gf::Vec3d::new(0.0, 10.0, 0.0)
		);

		let op = child.ordered_xform_ops();
		child.set_xform_op_order(&op, true);
		cache.clear();
		assert_eq!(cache.local_to_world(&leaf).extract_translation(), gf::Vec3d::new(1.0, 0.0, 0.0));
	}
}
