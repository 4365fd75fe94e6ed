use super::TOKENS;
use crate::{sdf::VALUE_TYPE_NAMES, usd};

/// API schema adding friction, restitution and density to a material, used
/// when the material is bound with the `physics` purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialApi<'a> {
	prim: usd::Prim<'a>,
}

macro_rules! float_attr {
	($get:ident, $create:ident, $value:ident, $token:ident) => {
		pub fn $get(&self) -> usd::Attribute<'a> {
			self.prim.attribute(&TOKENS.$token)
		}

		pub fn $create(&self) -> usd::Attribute<'a> {
			self.prim.create_attribute(&TOKENS.$token, &VALUE_TYPE_NAMES.float, false)
		}

		pub fn $value(&self) -> Option<f32> {
			self.$get().get()
		}
	};
}

impl<'a> MaterialApi<'a> {
	pub fn new(prim: usd::Prim<'a>) -> Self {
		Self { prim }
	}

	/// Apply the schema to `prim` at the edit target.
	pub fn apply(prim: &usd::Prim<'a>) -> Option<Self> {
		prim.apply_api(&TOKENS.material_api).then(|| Self::new(prim.clone()))
	}

	/// Wrap `prim` if the schema is applied to it.
	pub fn from_prim(prim: usd::Prim<'a>) -> Option<Self> {
		prim.has_api(&TOKENS.material_api).then(|| Self::new(prim))
	}

	pub fn prim(&self) -> &usd::Prim<'a> {
		&self.prim
	}

	float_attr!(dynamic_friction_attr, create_dynamic_friction_attr, dynamic_friction, dynamic_friction);
	float_attr!(static_friction_attr, create_static_friction_attr, static_friction, static_friction);
	float_attr!(restitution_attr, create_restitution_attr, restitution, restitution);
	float_attr!(density_attr, create_density_attr, density, density);
}
