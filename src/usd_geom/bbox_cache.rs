use super::{XformCache, compute_extent, compute_purpose, compute_visibility, TOKENS};
use crate::{gf, tf, tf_warn, usd};

/// Computes bounds of prims, accumulating the extents of the boundable
/// prims beneath them.
///
/// Only prims whose computed purpose is one of the included purposes and
/// which are visible contribute.
#[derive(Debug)]
pub struct BBoxCache {
	purposes: Vec<tf::Token>,
	xform_cache: XformCache,
}

impl BBoxCache {
	pub fn new(included_purposes: impl IntoIterator<Item = tf::Token>) -> Self {
		Self {
			purposes: included_purposes.into_iter().collect(),
			xform_cache: XformCache::new(),
		}
	}

	pub fn included_purposes(&self) -> &[tf::Token] {
		&self.purposes
	}

	pub fn set_included_purposes(&mut self, purposes: impl IntoIterator<Item = tf::Token>) {
		self.purposes = purposes.into_iter().collect();
	}

	pub fn clear(&mut self) {
		self.xform_cache.clear();
	}

	/// Compute the bound of `prim` and its descendants in world space.
	pub fn compute_world_bound(&mut self, prim: &usd::Prim) -> gf::Range3d {
		self.accumulate(prim, None)
	}

	/// Compute the bound of `prim` and its descendants in the local space of
	/// `prim`, ignoring the transform of `prim` itself.
	pub fn compute_untransformed_bound(&mut self, prim: &usd::Prim) -> gf::Range3d {
		let to_local = match self.xform_cache.local_to_world(prim).inverse() {
			Some(inverse) => inverse,
			None => {
				tf_warn!(
					"The local to world transform of <{}> is singular, computing its bound without removing it",
					prim.path()
				);
				gf::Matrix4d::identity()
			}
		};
		self.accumulate(prim, Some(to_local))
	}

	fn accumulate(&mut self, root: &usd::Prim, to_local: Option<gf::Matrix4d>) -> gf::Range3d {
		let mut bound = gf::Range3d::empty();
		if !root.is_valid() {
			return bound;
		}

		let mut range = usd::PrimRange::new(root.clone());
		while let Some(prim) = range.next() {
			if compute_visibility(&prim) == TOKENS.invisible {
				range.prune_children();
				continue;
			}
			if !self.purposes.contains(&compute_purpose(&prim)) {
				continue;
			}
			let Some(extent) = compute_extent(&prim) else {
				continue;
			};
			let world = self.xform_cache.local_to_world(&prim);
			let transform = match to_local {
				Some(to_local) => world * to_local,
				None => world,
			};
			bound.union_with(&extent.transformed(&transform));
		}
		bound
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::usd::SchemaBase;
	use crate::usd_geom::{Cube, Imageable, Precision, Xform, ordered_purpose_tokens};
	use approx::assert_abs_diff_eq;

	#[test]
	fn bounds_follow_transforms_and_purposes() {
		let stage = usd::Stage::create_in_memory();
		let world = Xform::define(&stage, "/World").unwrap().xformable();
		world
			.add_translate_op(Precision::Double, None)
			.unwrap()
			.set(gf::Vec3d::new(100.0, 0.0, 0.0));
		let cube = Cube::define(&stage, "/World/Cube").unwrap();
		cube.create_size_attr().set(4.0f64);
		let guide = Cube::define(&stage, "/World/Guide").unwrap();
		Imageable::from_prim(guide.prim().clone())
			.unwrap()
			.create_purpose_attr()
			.set(TOKENS.guide.clone());
		let hidden = Cube::define(&stage, "/World/Hidden").unwrap();
		Imageable::from_prim(hidden.prim().clone()).unwrap().make_invisible();
		hidden.create_size_attr().set(1000.0f64);

		let mut cache = BBoxCache::new([TOKENS.default_.clone()]);
		let world_prim = stage.prim_at_path("/World");
		let bound = cache.compute_world_bound(&world_prim);
		assert_abs_diff_eq!(bound.min.x, 98.0, epsilon = 1e-9);
		assert_abs_diff_eq!(bound.max.x, 102.0, epsilon = 1e-9);

		let local = cache.compute_untransformed_bound(&world_prim);
		assert_abs_diff_eq!(local.min.x, -2.0, epsilon = 1e-9);
		assert_abs_diff_eq!(local.max.y, 2.0, epsilon = 1e-9);

		let mut all = BBoxCache::new(ordered_purpose_tokens());
		assert_eq!(all.included_purposes().len(), 4);
		let local = all.compute_untransformed_bound(&world_prim);
		assert_abs_diff_eq!(local.max.x, 2.0, epsilon = 1e-9);

		let mut guides = BBoxCache::new([TOKENS.guide.clone()]);
		let local = guides.compute_untransformed_bound(&world_prim);
		assert_abs_diff_eq!(local.max.x, 1.0, epsilon = 1e-9);
		let empty = BBoxCache::new([TOKENS.proxy.clone()]).compute_world_bound(&world_prim);
		assert!(empty.is_empty());
	}

	#[test]
	fn singular_transforms_are_reported() {
		let stage = usd::Stage::create_in_memory();
		let world = Xform::define(&stage, "/World").unwrap().xformable();
		world
			.add_scale_op(Precision::Double, None)
			.unwrap()
			.set(gf::Vec3d::new(0.0, 1.0, 1.0));
		Cube::define(&stage, "/World/Cube").unwrap();

		let capture = tf::DiagnosticCapture::begin();
		let mut cache = BBoxCache::new([TOKENS.default_.clone()]);
		let local = cache.compute_untransformed_bound(&stage.prim_at_path("/World"));
		assert!(capture.has(tf::DiagnosticKind::Warning, "is singular"));
		assert_abs_diff_eq!(local.max.x, 0.0, epsilon = 1e-9);
		assert_abs_diff_eq!(local.max.y, 1.0, epsilon = 1e-9);
	}
}
