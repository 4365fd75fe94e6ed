use super::{Material, TOKENS};
use crate::{sdf, tf, usd, usd::SchemaBase};

/// API schema for binding materials to prims through the
/// `material:binding` relationship, or `material:binding:<purpose>` for a
/// purpose such as `physics`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialBindingApi<'a> {
	prim: usd::Prim<'a>,
}

impl<'a> MaterialBindingApi<'a> {
	pub fn new(prim: usd::Prim<'a>) -> Self {
		Self { prim }
	}

	/// Apply the schema to `prim` at the edit target.
	pub fn apply(prim: &usd::Prim<'a>) -> Option<Self> {
		prim.apply_api(&TOKENS.material_binding_api)
			.then(|| Self::new(prim.clone()))
	}

	pub fn prim(&self) -> &usd::Prim<'a> {
		&self.prim
	}

	pub fn direct_binding_rel(&self) -> usd::Relationship<'a> {
		self.prim.relationship(&TOKENS.material_binding)
	}

	/// Author a direct binding to `material`.
	pub fn bind(&self, material: &Material) -> bool {
		let rel = self.prim.create_relationship(&TOKENS.material_binding, false);
		rel.set_targets(vec![material.path().clone()])
	}

	pub fn unbind_direct_binding(&self) -> bool {
		self.direct_binding_rel().set_targets(Vec::new())
	}

	/// Return the path of the directly bound material.
	pub fn direct_binding(&self) -> Option<sdf::Path> {
		self.direct_binding_rel().targets().into_iter().next()
	}

	fn binding_name(purpose: &tf::Token) -> tf::Token {
		if *purpose == TOKENS.all_purpose {
			return TOKENS.material_binding.clone();
		}
		tf::Token::new(format!("{}:{}", TOKENS.material_binding, purpose))
	}

	pub fn direct_binding_rel_for(&self, purpose: &tf::Token) -> usd::Relationship<'a> {
		self.prim.relationship(&Self::binding_name(purpose))
	}

	/// Author a direct binding to `material` restricted to `purpose`.
	pub fn bind_for(&self, material: &Material, purpose: &tf::Token) -> bool {
		let rel = self.prim.create_relationship(&Self::binding_name(purpose), false);
		rel.set_targets(vec![material.path().clone()])
	}

	/// Return the path of the material directly bound for `purpose`.
	pub fn direct_binding_for(&self, purpose: &tf::Token) -> Option<sdf::Path> {
		self.direct_binding_rel_for(purpose).targets().into_iter().next()
	}

	/// Compute the material bound to this prim, inherited from the nearest
	/// ancestor with a direct binding.
	pub fn compute_bound_material(&self) -> Option<Material<'a>> {
		let stage = self.prim.stage();
		let mut current = self.prim.clone();
		while !current.path().is_empty() && !current.is_pseudo_root() {
			if let Some(target) = MaterialBindingApi::new(current.clone()).direct_binding() {
				return Material::get(stage, target);
			}
			current = current.parent();
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tf;

	#[test]
	fn bindings_are_inherited() {
		let stage = usd::Stage::create_in_memory();
		let material = Material::define(&stage, "/World/Looks/Red").unwrap();
		let geo = stage.define_prim("/World/Geo/Cube", &tf::Token::new("Cube")).unwrap();

		let api = MaterialBindingApi::apply(&stage.prim_at_path("/World/Geo")).unwrap();
		assert!(api.bind(&material));
		assert_eq!(api.direct_binding(), Some(sdf::Path::from("/World/Looks/Red")));
		assert_eq!(MaterialBindingApi::new(geo).compute_bound_material(), Some(material));

		assert!(api.unbind_direct_binding());
		assert_eq!(api.direct_binding(), None);
	}

	#[test]
	fn purpose_bindings_use_their_own_relationship() {
		let stage = usd::Stage::create_in_memory();
		let material = Material::define(&stage, "/World/Looks/Rubber").unwrap();
		let geo = stage.define_prim("/World/Geo", &tf::Token::new("Cube")).unwrap();

		let api = MaterialBindingApi::apply(&geo).unwrap();
		assert!(api.bind_for(&material, &TOKENS.physics));
		assert!(geo.has_relationship(&tf::Token::new("material:binding:physics")));
		assert_eq!(api.direct_binding_for(&TOKENS.physics), Some(sdf::Path::from("/World/Looks/Rubber")));
		assert_eq!(api.direct_binding(), None);
		assert_eq!(api.direct_binding_for(&TOKENS.all_purpose), None);
	}
}
