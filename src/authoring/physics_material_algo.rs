//! Physics materials: friction, restitution and density on a `Material`,
//! bound to geometry with the `physics` purpose.

use super::material_algo::validate_binding;
use super::{is_editable_prim, is_editable_prim_location, is_editable_prim_location_in};
use crate::{
	Error, Result, sdf, tf, tf_runtime_error, tf_warn, usd,
	usd::SchemaBase,
	usd_physics,
	usd_shade::{self, Material},
};

fn invalid_location(reason: &str) -> Error {
	let message = format!("Unable to define UsdShadeMaterial due to an invalid location: {}", reason);
	tf_runtime_error!("{}", message);
	Error::InvalidArgument(message)
}

/// Define a material carrying only physical properties.
///
/// Optional properties are left unauthored, so simulators use their
/// defaults for them.
pub fn define_physics_material<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	dynamic_friction: f32,
	static_friction: Option<f32>,
	restitution: Option<f32>,
	density: Option<f32>,
) -> Result<Material<'a>> {
	is_editable_prim_location(stage, path).map_err(|reason| invalid_location(&reason))?;

	let material = Material::define(stage, path.clone()).inspect_err(|err| {
		tf_runtime_error!("Unable to define UsdShadeMaterial at \"{}\": {}", path, err);
	})?;
	add_physics_to_material(&material, dynamic_friction, static_friction, restitution, density)?;
	Ok(material)
}

pub fn define_physics_material_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	dynamic_friction: f32,
	static_friction: Option<f32>,
	restitution: Option<f32>,
	density: Option<f32>,
) -> Result<Material<'a>> {
	is_editable_prim_location_in(parent, name).map_err(|reason| invalid_location(&reason))?;
	let path = parent.path().append_child(&tf::Token::new(name));
	define_physics_material(parent.stage(), &path, dynamic_friction, static_friction, restitution, density)
}

/// Turn `prim` into a physics material. Its type becomes `Material`.
pub fn define_physics_material_on<'a>(
	prim: &usd::Prim<'a>,
	dynamic_friction: f32,
	static_friction: Option<f32>,
	restitution: Option<f32>,
	density: Option<f32>,
) -> Result<Material<'a>> {
	if !prim.is_valid() {
		let message = "Unable to define UsdShadeMaterial on invalid prim".to_string();
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	is_editable_prim(prim).map_err(|reason| invalid_location(&reason))?;
	define_physics_material(prim.stage(), prim.path(), dynamic_friction, static_friction, restitution, density)
}

/// Add physical properties to an existing material, e.g. a preview
/// material, so one material serves rendering and simulation.
///
/// Bind it with both [`bind_material`](super::bind_material) and
/// [`bind_physics_material`].
pub fn add_physics_to_material(
	material: &Material,
	dynamic_friction: f32,
	static_friction: Option<f32>,
	restitution: Option<f32>,
	density: Option<f32>,
) -> Result<()> {
	if !material.is_valid() {
		let message = format!("Unable to add physics to invalid material <{}>", material.path());
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let api = usd_physics::MaterialApi::apply(material.prim()).ok_or_else(|| {
		let message = format!("Unable to apply PhysicsMaterialAPI to <{}>", material.path());
		tf_runtime_error!("{}", message);
		Error::Authority(message)
	})?;

	api.create_dynamic_friction_attr().set(dynamic_friction);
	if let Some(value) = static_friction {
		api.create_static_friction_attr().set(value);
	}
	if let Some(value) = restitution {
		api.create_restitution_attr().set(value);
	}
	if let Some(value) = density {
		api.create_density_attr().set(value);
	}
	Ok(())
}

/// Bind `material` to a rigid body or collider with the `physics` purpose.
///
/// The binding has the default strength, so descendants may bind another
/// physics material.
pub fn bind_physics_material(prim: &usd::Prim, material: &Material) -> Result<()> {
	validate_binding(prim, material)?;
	let bound = usd_shade::MaterialBindingApi::apply(prim)
		.is_some_and(|binding| binding.bind_for(material, &usd_shade::TOKENS.physics));
	if !bound {
		let message = format!("Unable to bind physics material <{}> to <{}>", material.path(), prim.path());
		tf_runtime_error!("{}", message);
		return Err(Error::Authority(message));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		authoring::{bind_material, define_preview_material},
		gf,
		tf::DiagnosticKind,
	};

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	#[test]
	fn only_given_properties_are_authored() {
		let stage = usd::Stage::create_in_memory();
		let path = p("/World/Physics/Rubber");
		let rubber = define_physics_material(&stage, &path, 0.8, Some(0.9), None, Some(1100.0)).unwrap();

		let api = usd_physics::MaterialApi::from_prim(rubber.prim().clone()).unwrap();
		assert_eq!(api.dynamic_friction(), Some(0.8));
		assert_eq!(api.static_friction(), Some(0.9));
		assert_eq!(api.restitution(), None);
		assert!(!api.restitution_attr().has_authored_value());
		assert_eq!(api.density(), Some(1100.0));
		assert!(rubber.prim().has_api(&usd_physics::TOKENS.material_api));
	}

	#[test]
	fn children_and_existing_prims() {
		let stage = usd::Stage::create_in_memory();
		let scope = stage.define_prim("/World/Physics", &tf::Token::new("Scope")).unwrap();

		let steel = define_physics_material_in(&scope, "Steel", 0.4, None, Some(0.1), None).unwrap();
		assert_eq!(steel.path(), &p("/World/Physics/Steel"));

		let ice = stage.define_prim("/World/Physics/Ice", &tf::Token::new("Scope")).unwrap();
		let ice = define_physics_material_on(&ice, 0.02, None, None, None).unwrap();
		assert_eq!(ice.type_name(), Material::schema_type());

		let capture = tf::DiagnosticCapture::begin();
		assert!(define_physics_material_in(&scope, "Bad Name", 0.5, None, None, None).is_err());
		assert!(capture.has(
			DiagnosticKind::RuntimeError,
			"Unable to define UsdShadeMaterial due to an invalid location: \"Bad Name\" is not a valid prim name"
		));
		assert!(define_physics_material_on(&stage.prim_at_path("/World/Missing"), 0.5, None, None, None).is_err());
		assert!(capture.has(DiagnosticKind::RuntimeError, "on invalid prim"));
	}

	#[test]
	fn visual_materials_gain_physics() {
		let stage = usd::Stage::create_in_memory();
		let material = define_preview_material(
			&stage,
			&p("/World/Looks/Tire"),
			gf::Vec3f::new(0.1, 0.1, 0.1),
			1.0,
			0.9,
			0.0,
		)
		.unwrap();
		add_physics_to_material(&material, 1.0, Some(1.2), Some(0.3), None).unwrap();

		let wheel = stage.define_prim("/World/Wheel", &tf::Token::new("Cylinder")).unwrap();
		bind_material(&wheel, &material).unwrap();
		bind_physics_material(&wheel, &material).unwrap();

		let binding = usd_shade::MaterialBindingApi::new(wheel.clone());
		assert_eq!(binding.direct_binding(), Some(p("/World/Looks/Tire")));
		assert_eq!(binding.direct_binding_for(&usd_shade::TOKENS.physics), Some(p("/World/Looks/Tire")));

		let capture = tf::DiagnosticCapture::begin();
		let missing = Material::from_prim_unchecked(stage.prim_at_path("/World/Looks/Missing"));
		assert!(add_physics_to_material(&missing, 1.0, None, None, None).is_err());
		assert!(capture.has(DiagnosticKind::Warning, "Unable to add physics to invalid material </World/Looks/Missing>"));
		assert!(bind_physics_material(&wheel, &missing).is_err());
		assert!(capture.has(DiagnosticKind::Warning, "UsdShadeMaterial </World/Looks/Missing> is not valid"));
	}
}
