//! Geometric primitives with display color, display opacity and extent.
//!
//! Every shape comes in three forms: at a path on a stage, as a named child
//! of a parent prim (`_in`), and on an existing prim (`_on`). The extent is
//! always authored from the shape's attributes.

use crate::{
	Error, Result, gf, sdf, tf, tf_runtime_error, tf_warn, usd,
	usd::SchemaBase,
	usd_geom::{self, TOKENS},
};

use super::{is_editable_prim, is_editable_prim_location, is_editable_prim_location_in};

fn invalid_location(type_name: &str, reason: &str) -> Error {
	let message = format!("Unable to define UsdGeom{} due to an invalid location: {}", type_name, reason);
	tf_runtime_error!("{}", message);
	Error::InvalidArgument(message)
}

fn check_axis(type_name: &str, axis: &tf::Token) -> Result<()> {
	if [&TOKENS.x, &TOKENS.y, &TOKENS.z].contains(&axis) {
		return Ok(());
	}
	let message = format!(
		"Unable to define UsdGeom{} due to an invalid axis: \"{}\" is not one of \"X\", \"Y\" or \"Z\"",
		type_name, axis
	);
	tf_runtime_error!("{}", message);
	Err(Error::InvalidArgument(message))
}

/// Define a prim of `type_name`, let `author` set its shape attributes, then
/// author the display primvars and the extent.
fn define_gprim<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	type_name: &str,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
	author: impl FnOnce(&usd::Prim<'a>),
) -> Result<usd::Prim<'a>> {
	is_editable_prim_location(stage, path).map_err(|reason| invalid_location(type_name, &reason))?;

	let prim = stage
		.define_prim(path.clone(), &tf::Token::new(type_name))
		.inspect_err(|err| {
			tf_runtime_error!("Unable to define UsdGeom{} at \"{}\": {}", type_name, path, err);
		})?;
	author(&prim);

	let gprim = usd_geom::Gprim::from_prim_unchecked(prim.clone());
	if let Some(color) = display_color {
		gprim.create_display_color_attr().set(vec![color]);
	}
	if let Some(opacity) = display_opacity {
		gprim.create_display_opacity_attr().set(vec![opacity]);
	}

	if let Some(extent) = usd_geom::compute_schema_extent(&prim) {
		usd_geom::Boundable::from_prim_unchecked(prim.clone())
			.create_extent_attr()
			.set(vec![gf::Vec3f::from(extent.min), gf::Vec3f::from(extent.max)]);
	}
	Ok(prim)
}

fn child_path(parent: &usd::Prim, name: &str, type_name: &str) -> Result<sdf::Path> {
	is_editable_prim_location_in(parent, name).map_err(|reason| invalid_location(type_name, &reason))?;
	Ok(parent.path().append_child(&tf::Token::new(name)))
}

/// Prepare `prim` to be redefined as `type_name`.
///
/// Warns when an unrelated type is replaced. When the prim already has the
/// type, display primvars that are not given again are blocked.
fn redefine_path(
	prim: &usd::Prim,
	type_name: &str,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<sdf::Path> {
	if !prim.is_valid() {
		let message = format!("Unable to define UsdGeom{} on invalid prim", type_name);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	is_editable_prim(prim).map_err(|reason| invalid_location(type_name, &reason))?;

	let original = prim.type_name();
	if !["", type_name, "Scope", "Xform"].contains(&original.as_str()) {
		tf_warn!(
			"Redefining prim at \"{}\" from type \"{}\" to \"{}\". Expected original type to be \"\" or \"Scope\" or \"Xform\".",
			prim.path(),
			original,
			type_name
		);
	}

	if original.as_str() == type_name {
		let gprim = usd_geom::Gprim::from_prim_unchecked(prim.clone());
		if display_color.is_none() && prim.has_attribute(&TOKENS.primvars_display_color) {
			gprim.display_color_attr().block();
		}
		if display_opacity.is_none() && prim.has_attribute(&TOKENS.primvars_display_opacity) {
			gprim.display_opacity_attr().block();
		}
	}
	Ok(prim.path().clone())
}

/// Define a plane of `width` along its first tangent and `length` along its
/// second, facing `axis`. Typical values are 2, 2 and Z.
#[allow(clippy::too_many_arguments)]
pub fn define_plane<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	width: f64,
	length: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Plane<'a>> {
	check_axis("Plane", axis)?;
	let prim = define_gprim(stage, path, "Plane", display_color, display_opacity, |prim| {
		let plane = usd_geom::Plane::from_prim_unchecked(prim.clone());
		plane.create_axis_attr().set(axis.clone());
		plane.create_width_attr().set(width);
		plane.create_length_attr().set(length);
	})?;
	Ok(usd_geom::Plane::from_prim_unchecked(prim))
}

#[allow(clippy::too_many_arguments)]
pub fn define_plane_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	width: f64,
	length: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Plane<'a>> {
	let path = child_path(parent, name, "Plane")?;
	define_plane(parent.stage(), &path, width, length, axis, display_color, display_opacity)
}

pub fn define_plane_on<'a>(
	prim: &usd::Prim<'a>,
	width: f64,
	length: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Plane<'a>> {
	let path = redefine_path(prim, "Plane", display_color, display_opacity)?;
	define_plane(prim.stage(), &path, width, length, axis, display_color, display_opacity)
}

/// Define a sphere of `radius` (typically 1).
pub fn define_sphere<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	radius: f64,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Sphere<'a>> {
	let prim = define_gprim(stage, path, "Sphere", display_color, display_opacity, |prim| {
		usd_geom::Sphere::from_prim_unchecked(prim.clone())
			.create_radius_attr()
			.set(radius);
	})?;
	Ok(usd_geom::Sphere::from_prim_unchecked(prim))
}

pub fn define_sphere_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	radius: f64,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Sphere<'a>> {
	let path = child_path(parent, name, "Sphere")?;
	define_sphere(parent.stage(), &path, radius, display_color, display_opacity)
}

pub fn define_sphere_on<'a>(
	prim: &usd::Prim<'a>,
	radius: f64,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Sphere<'a>> {
	let path = redefine_path(prim, "Sphere", display_color, display_opacity)?;
	define_sphere(prim.stage(), &path, radius, display_color, display_opacity)
}

/// Define a cube with edges of `size` (typically 2).
pub fn define_cube<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	size: f64,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cube<'a>> {
	let prim = define_gprim(stage, path, "Cube", display_color, display_opacity, |prim| {
		usd_geom::Cube::from_prim_unchecked(prim.clone())
			.create_size_attr()
			.set(size);
	})?;
	Ok(usd_geom::Cube::from_prim_unchecked(prim))
}

pub fn define_cube_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	size: f64,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cube<'a>> {
	let path = child_path(parent, name, "Cube")?;
	define_cube(parent.stage(), &path, size, display_color, display_opacity)
}

pub fn define_cube_on<'a>(
	prim: &usd::Prim<'a>,
	size: f64,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cube<'a>> {
	let path = redefine_path(prim, "Cube", display_color, display_opacity)?;
	define_cube(prim.stage(), &path, size, display_color, display_opacity)
}

/// Author `radius`, `height` and `axis` on one of the axial shapes.
fn author_axial(prim: &usd::Prim, radius: f64, height: f64, axis: &tf::Token) {
	prim.create_attribute(&TOKENS.radius, &sdf::VALUE_TYPE_NAMES.double, false)
		.set(radius);
	prim.create_attribute(&TOKENS.height, &sdf::VALUE_TYPE_NAMES.double, false)
		.set(height);
	prim.create_uniform_attribute(&TOKENS.axis, &sdf::VALUE_TYPE_NAMES.token)
		.set(axis.clone());
}

/// Define a cone of `radius` and `height` whose apex points along `axis`.
/// Typical values are 1, 2 and Z.
#[allow(clippy::too_many_arguments)]
pub fn define_cone<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cone<'a>> {
	check_axis("Cone", axis)?;
	let prim = define_gprim(stage, path, "Cone", display_color, display_opacity, |prim| {
		author_axial(prim, radius, height, axis);
	})?;
	Ok(usd_geom::Cone::from_prim_unchecked(prim))
}

#[allow(clippy::too_many_arguments)]
pub fn define_cone_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cone<'a>> {
	let path = child_path(parent, name, "Cone")?;
	define_cone(parent.stage(), &path, radius, height, axis, display_color, display_opacity)
}

pub fn define_cone_on<'a>(
	prim: &usd::Prim<'a>,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cone<'a>> {
	let path = redefine_path(prim, "Cone", display_color, display_opacity)?;
	define_cone(prim.stage(), &path, radius, height, axis, display_color, display_opacity)
}

/// Define a closed cylinder of `radius` and `height` along `axis`.
/// Typical values are 1, 2 and Z.
#[allow(clippy::too_many_arguments)]
pub fn define_cylinder<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cylinder<'a>> {
	check_axis("Cylinder", axis)?;
	let prim = define_gprim(stage, path, "Cylinder", display_color, display_opacity, |prim| {
		author_axial(prim, radius, height, axis);
	})?;
	Ok(usd_geom::Cylinder::from_prim_unchecked(prim))
}

#[allow(clippy::too_many_arguments)]
pub fn define_cylinder_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cylinder<'a>> {
	let path = child_path(parent, name, "Cylinder")?;
	define_cylinder(parent.stage(), &path, radius, height, axis, display_color, display_opacity)
}

pub fn define_cylinder_on<'a>(
	prim: &usd::Prim<'a>,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Cylinder<'a>> {
	let path = redefine_path(prim, "Cylinder", display_color, display_opacity)?;
	define_cylinder(prim.stage(), &path, radius, height, axis, display_color, display_opacity)
}

/// Define a capsule whose cylindrical part has `radius` and `height` along
/// `axis`; the end caps add `radius` on both sides. Typical values are 1, 2
/// and Z.
#[allow(clippy::too_many_arguments)]
pub fn define_capsule<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Capsule<'a>> {
	check_axis("Capsule", axis)?;
	let prim = define_gprim(stage, path, "Capsule", display_color, display_opacity, |prim| {
		author_axial(prim, radius, height, axis);
	})?;
	Ok(usd_geom::Capsule::from_prim_unchecked(prim))
}

#[allow(clippy::too_many_arguments)]
pub fn define_capsule_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Capsule<'a>> {
	let path = child_path(parent, name, "Capsule")?;
	define_capsule(parent.stage(), &path, radius, height, axis, display_color, display_opacity)
}

pub fn define_capsule_on<'a>(
	prim: &usd::Prim<'a>,
	radius: f64,
	height: f64,
	axis: &tf::Token,
	display_color: Option<gf::Vec3f>,
	display_opacity: Option<f32>,
) -> Result<usd_geom::Capsule<'a>> {
	let path = redefine_path(prim, "Capsule", display_color, display_opacity)?;
	define_capsule(prim.stage(), &path, radius, height, axis, display_color, display_opacity)
}
