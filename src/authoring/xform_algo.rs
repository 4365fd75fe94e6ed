//! Local transforms authored as the common xform op stack.

use super::stage_algo::{is_editable_prim, is_editable_prim_location, is_editable_prim_location_in};
use crate::{Error, Result, gf, sdf, tf, tf_runtime_error, tf_warn, usd, usd::SchemaBase, usd_geom};
use usd_geom::{Precision, XformOpType};

const PIVOT_SUFFIX: &str = "pivot";

/// Order in which the three angles of a rotation are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
	#[default]
	Xyz,
	Xzy,
	Yxz,
	Yzx,
	Zxy,
	Zyx,
}

impl RotationOrder {
	pub fn op_type(self) -> XformOpType {
		match self {
			RotationOrder::Xyz => XformOpType::RotateXYZ,
			RotationOrder::Xzy => XformOpType::RotateXZY,
			RotationOrder::Yxz => XformOpType::RotateYXZ,
			RotationOrder::Yzx => XformOpType::RotateYZX,
			RotationOrder::Zxy => XformOpType::RotateZXY,
			RotationOrder::Zyx => XformOpType::RotateZYX,
		}
	}
}

fn xformable<'a>(prim: &usd::Prim<'a>) -> Result<usd_geom::Xformable<'a>> {
	if let Err(reason) = is_editable_prim(prim) {
		let message = format!("Unable to set local transform on <{}>: {}", prim.path(), reason);
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	usd_geom::Xformable::from_prim(prim.clone()).ok_or_else(|| {
		let message = format!("Unable to set local transform on <{}>: not a UsdGeomXformable", prim.path());
		tf_warn!("{}", message);
		Error::InvalidArgument(message)
	})
}

/// Replace the local transform of `prim` with translate, pivot, rotate and
/// scale components. Rotation angles are in degrees.
///
/// The authored op order is `translate`, `translate:pivot`, `rotate<Order>`,
/// `scale`, `!invert!translate:pivot`.
pub fn set_local_transform(
	prim: &usd::Prim,
	translation: gf::Vec3d,
	pivot: gf::Vec3d,
	rotation: gf::Vec3f,
	rotation_order: RotationOrder,
	scale: gf::Vec3f,
) -> Result<()> {
	let xformable = xformable(prim)?;
	xformable.clear_xform_op_order();

	let translate = xformable.add_translate_op(Precision::Double, None)?;
	let pivot_op = xformable.add_translate_op(Precision::Float, Some(PIVOT_SUFFIX))?;
	let rotate = xformable.add_rotate_op(rotation_order.op_type(), Precision::Float)?;
	let scale_op = xformable.add_scale_op(Precision::Float, None)?;
	let inverse_pivot = xformable.add_xform_op(XformOpType::Translate, Precision::Float, Some(PIVOT_SUFFIX), true)?;

	translate.set(translation);
	pivot_op.set(gf::Vec3f::from(pivot));
	rotate.set(rotation);
	scale_op.set(scale);
	xformable.set_xform_op_order(&[translate, pivot_op, rotate, scale_op, inverse_pivot], false);
	Ok(())
}

/// Replace the local transform of `prim` with `transform`, storing the
/// rotation as an `orient` quaternion.
pub fn set_local_transform_from(prim: &usd::Prim, transform: &gf::Transform3d) -> Result<()> {
	let xformable = xformable(prim)?;
	xformable.clear_xform_op_order();

	let translate = xformable.add_translate_op(Precision::Double, None)?;
	let pivot_op = xformable.add_translate_op(Precision::Float, Some(PIVOT_SUFFIX))?;
	let orient = xformable.add_orient_op(Precision::Float)?;
	let scale_op = xformable.add_scale_op(Precision::Float, None)?;
	let inverse_pivot = xformable.add_xform_op(XformOpType::Translate, Precision::Float, Some(PIVOT_SUFFIX), true)?;

	translate.set(transform.translation);
	pivot_op.set(gf::Vec3f::from(transform.pivot));
	orient.set(gf::Quatf::from(transform.rotation.normalized()));
	scale_op.set(gf::Vec3f::from(transform.scale));
	xformable.set_xform_op_order(&[translate, pivot_op, orient, scale_op, inverse_pivot], false);
	Ok(())
}

/// Replace the local transform of `prim` with a single `transform` op.
pub fn set_local_transform_matrix(prim: &usd::Prim, matrix: &gf::Matrix4d) -> Result<()> {
	let xformable = xformable(prim)?;
	xformable.clear_xform_op_order();
	let op = xformable.add_transform_op()?;
	op.set(*matrix);
	xformable.set_xform_op_order(&[op], false);
	Ok(())
}

/// Return the composed local transform of `prim`, identity when it is not
/// transformable.
pub fn local_transform_matrix(prim: &usd::Prim) -> gf::Matrix4d {
	usd_geom::Xformable::from_prim(prim.clone())
		.map(|xformable| xformable.local_transformation())
		.unwrap_or_else(gf::Matrix4d::identity)
}

/// Define an `Xform` at `path`, optionally with a local transform.
pub fn define_xform<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	transform: Option<&gf::Transform3d>,
) -> Result<usd_geom::Xform<'a>> {
	if let Err(reason) = is_editable_prim_location(stage, path) {
		let message = format!("Unable to define UsdGeomXform due to an invalid location: {}", reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let xform = usd_geom::Xform::define(stage, path.clone()).inspect_err(|err| {
		tf_runtime_error!("Unable to define UsdGeomXform at \"{}\": {}", path, err);
	})?;

	if let Some(transform) = transform {
		set_local_transform_from(&xform, transform)?;
	}
	Ok(xform)
}

/// Define an `Xform` named `name` below `parent`.
pub fn define_xform_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	transform: Option<&gf::Transform3d>,
) -> Result<usd_geom::Xform<'a>> {
	if let Err(reason) = is_editable_prim_location_in(parent, name) {
		let message = format!("Unable to define UsdGeomXform due to an invalid location: {}", reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	let path = parent.path().append_child(&tf::Token::new(name));
	define_xform(parent.stage(), &path, transform)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	#[test]
	fn components_author_the_common_op_stack() {
		let stage = usd::Stage::create_in_memory();
		let xform = define_xform(&stage, &p("/World"), None).unwrap();
		set_local_transform(
			&xform,
			gf::Vec3d::new(10.0, 0.0, 0.0),
			gf::Vec3d::new(1.0, 0.0, 0.0),
			gf::Vec3f::new(0.0, 0.0, 90.0),
			RotationOrder::Xyz,
			gf::Vec3f::new(2.0, 2.0, 2.0),
		)
		.unwrap();

		let order: Vec<String> = xform
			.xformable()
			.xform_op_order()
			.iter()
			.map(|name| name.as_str().to_string())
			.collect();
		assert_eq!(
			order,
			[
				"xformOp:translate",
				"xformOp:translate:pivot",
				"xformOp:rotateXYZ",
				"xformOp:scale",
				"!invert!xformOp:translate:pivot",
			]
		);

		// Scaled and rotated about the pivot at (1, 0, 0), then moved.
		let p = local_transform_matrix(&xform).transform(gf::Vec3d::new(2.0, 0.0, 0.0));
		assert_abs_diff_eq!(p.x, 11.0, epsilon = 1e-5);
		assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-5);
		assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-5);
	}

	#[test]
	fn transform_round_trips_through_orient() {
		let stage = usd::Stage::create_in_memory();
		let transform = gf::Transform3d {
			translation: gf::Vec3d::new(0.0, 30.0, 0.0),
			rotation: glam::DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2).into(),
			scale: gf::Vec3d::new(2.0, 0.5, 0.5),
			pivot: gf::Vec3d::default(),
		};
		let xform = define_xform(&stage, &p("/Body"), Some(&transform)).unwrap();

		let expected = transform.matrix().transform(gf::Vec3d::new(1.0, 2.0, 3.0));
		let actual = local_transform_matrix(&xform).transform(gf::Vec3d::new(1.0, 2.0, 3.0));
		assert_abs_diff_eq!(actual.x, expected.x, epsilon = 1e-5);
		assert_abs_diff_eq!(actual.y, expected.y, epsilon = 1e-5);
		assert_abs_diff_eq!(actual.z, expected.z, epsilon = 1e-5);
	}

	#[test]
	fn matrix_replaces_previous_ops() {
		let stage = usd::Stage::create_in_memory();
		let xform = define_xform(&stage, &p("/World"), Some(&gf::Transform3d::default())).unwrap();
		let matrix = gf::Matrix4d::from_translation(gf::Vec3d::new(1.0, 2.0, 3.0));
		set_local_transform_matrix(&xform, &matrix).unwrap();
		assert_eq!(xform.xformable().xform_op_order(), vec![tf::Token::new("xformOp:transform")]);
		assert_eq!(local_transform_matrix(&xform), matrix);
	}

	#[test]
	fn rejects_non_xformable_prims_and_bad_locations() {
		let stage = usd::Stage::create_in_memory();
		let scope = usd_geom::Scope::define(&stage, "/Looks").unwrap();
		let err = set_local_transform_matrix(&scope, &gf::Matrix4d::identity()).unwrap_err();
		assert!(err.to_string().contains("not a UsdGeomXformable"));
		assert!(local_transform_matrix(&scope).is_identity());

		let err = define_xform_in(&scope, "1Bad", None).unwrap_err();
		assert!(err.to_string().contains("\"1Bad\" is not a valid prim name"));
	}
}
