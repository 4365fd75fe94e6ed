use super::{BBoxCache, TOKENS, ordered_purpose_tokens};
use crate::{gf, sdf::VALUE_TYPE_NAMES, usd, vt};

/// API schema which provides extents hints for models, so that bounds of
/// payloaded assets are known without loading them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeomModelApi<'a> {
	prim: usd::Prim<'a>,
}

impl<'a> GeomModelApi<'a> {
	pub fn new(prim: usd::Prim<'a>) -> Self {
		Self { prim }
	}

	/// Apply the schema to `prim` at the edit target.
	pub fn apply(prim: &usd::Prim<'a>) -> Option<Self> {
		prim.apply_api(&TOKENS.geom_model_api).then(|| Self::new(prim.clone()))
	}

	pub fn prim(&self) -> &usd::Prim<'a> {
		&self.prim
	}

	pub fn extents_hint_attr(&self) -> usd::Attribute<'a> {
		self.prim.attribute(&TOKENS.extents_hint)
	}

	pub fn create_extents_hint_attr(&self) -> usd::Attribute<'a> {
		self.prim
			.create_attribute(&TOKENS.extents_hint, &VALUE_TYPE_NAMES.float3_array, false)
	}

	/// Return the authored extents hint.
	pub fn extents_hint(&self) -> Option<vt::Array<gf::Vec3f>> {
		self.extents_hint_attr().get::<vt::Array<gf::Vec3f>>()
	}

	/// Author `extents` as the extents hint. It must hold `[min, max]` pairs.
	pub fn set_extents_hint(&self, extents: vt::Array<gf::Vec3f>) -> bool {
		if extents.len() % 2 != 0 {
			log::warn!("extentsHint of <{}> must hold an even number of elements", self.prim.path());
			return false;
		}
		self.create_extents_hint_attr().set(extents)
	}

	/// Compute an extents hint, one `[min, max]` pair per purpose in
	/// [`ordered_purpose_tokens`] order.
	///
	/// Empty pairs are written as `(+MAX, -MAX)`. Trailing empty pairs are
	/// dropped, but the pair of the default purpose is always kept.
	pub fn compute_extents_hint(&self, cache: &mut BBoxCache) -> vt::Array<gf::Vec3f> {
		let saved: Vec<_> = cache.included_purposes().to_vec();
		let mut extents = Vec::with_capacity(8);
		for purpose in ordered_purpose_tokens() {
			cache.set_included_purposes([purpose]);
			let bound = cache.compute_untransformed_bound(&self.prim);
			if bound.is_empty() {
				extents.push(gf::Vec3f::new(f32::MAX, f32::MAX, f32::MAX));
				extents.push(gf::Vec3f::new(-f32::MAX, -f32::MAX, -f32::MAX));
			} else {
				extents.push(bound.min.into());
				extents.push(bound.max.into());
			}
		}
		cache.set_included_purposes(saved);

		let is_empty_pair = |pair: &[gf::Vec3f]| pair[0].x > pair[1].x || pair[0].y > pair[1].y || pair[0].z > pair[1].z;
		let keep = extents
			.chunks(2)
			.rposition(|pair| !is_empty_pair(pair))
			.map_or(1, |last| last + 1);
		extents.truncate(keep * 2);
		extents
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::usd::SchemaBase;
	use crate::usd_geom::{Cube, Imageable};

	#[test]
	fn extents_hint_per_purpose() {
		let stage = usd::Stage::create_in_memory();
		let world = stage.define_prim("/World", &crate::tf::Token::new("Xform")).unwrap();
		let model = GeomModelApi::apply(&world).unwrap();
		assert!(world.has_api(&TOKENS.geom_model_api));

		let mut cache = BBoxCache::new(ordered_purpose_tokens());
		let hint = model.compute_extents_hint(&mut cache);
		assert_eq!(
			hint,
			vec![gf::Vec3f::new(f32::MAX, f32::MAX, f32::MAX), gf::Vec3f::new(-f32::MAX, -f32::MAX, -f32::MAX)]
		);

		Cube::define(&stage, "/World/Cube").unwrap();
		let proxy = Cube::define(&stage, "/World/Proxy").unwrap();
		proxy.create_size_attr().set(4.0f64);
		Imageable::from_prim(proxy.prim().clone())
			.unwrap()
			.create_purpose_attr()
			.set(TOKENS.proxy.clone());

		let hint = model.compute_extents_hint(&mut cache);
		assert_eq!(hint.len(), 6);
		assert_eq!(hint[0], gf::Vec3f::new(-1.0, -1.0, -1.0));
		assert_eq!(hint[2], gf::Vec3f::new(f32::MAX, f32::MAX, f32::MAX));
		assert_eq!(hint[5], gf::Vec3f::new(2.0, 2.0, 2.0));
		assert_eq!(cache.included_purposes().len(), 4);

		assert!(model.set_extents_hint(hint.clone()));
		assert_eq!(model.extents_hint(), Some(hint));
		assert!(!model.set_extents_hint(vec![gf::Vec3f::default()]));
	}
}
