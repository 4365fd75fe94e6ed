//! Physics joints between rigid bodies.
//!
//! A joint is placed with a [`JointFrame`]: a position and orientation
//! given in world space or in the local space of one of the two bodies.
//! The frame is converted into the `localPos0/1` and `localRot0/1` of each
//! connected body using the composed world transforms of the stage, so the
//! bodies may be authored in other layers than the joint.

use super::stage_algo::{is_editable_prim_location, is_editable_prim_location_in};
use crate::{Error, Result, gf, sdf, tf, tf_runtime_error, usd, usd::SchemaBase, usd_geom, usd_physics};
use usd_physics::{FixedJoint, Joint, PrismaticJoint, RevoluteJoint, SphericalJoint};

/// The coordinate space a [`JointFrame`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointFrameSpace {
	Body0,
	Body1,
	#[default]
	World,
}

/// Position and orientation of a joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointFrame {
	pub space: JointFrameSpace,
	pub position: gf::Vec3d,
	pub orientation: gf::Quatd,
}

impl JointFrame {
	pub fn new(space: JointFrameSpace, position: gf::Vec3d, orientation: gf::Quatd) -> Self {
		Self {
			space,
			position,
			orientation,
		}
	}

	/// A frame at `position` in world space, aligned with the world axes.
	pub fn world(position: gf::Vec3d) -> Self {
		Self::new(JointFrameSpace::World, position, gf::Quatd::identity())
	}
}

impl Default for JointFrame {
	fn default() -> Self {
		Self::world(gf::Vec3d::default())
	}
}

/// The type of joint to author, with the parameters specific to it.
///
/// `axis` is a direction in the joint frame. Limits that are `None` are
/// left unauthored, which means unlimited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
	Fixed,
	Revolute {
		axis: gf::Vec3f,
		lower_limit: Option<f32>,
		upper_limit: Option<f32>,
	},
	Prismatic {
		axis: gf::Vec3f,
		lower_limit: Option<f32>,
		upper_limit: Option<f32>,
	},
	Spherical {
		axis: gf::Vec3f,
		cone_angle0_limit: Option<f32>,
		cone_angle1_limit: Option<f32>,
	},
}

impl JointKind {
	pub fn schema_type(&self) -> &'static str {
		match self {
			JointKind::Fixed => "PhysicsFixedJoint",
			JointKind::Revolute { .. } => "PhysicsRevoluteJoint",
			JointKind::Prismatic { .. } => "PhysicsPrismaticJoint",
			JointKind::Spherical { .. } => "PhysicsSphericalJoint",
		}
	}

	pub fn axis(&self) -> Option<gf::Vec3f> {
		match *self {
			JointKind::Fixed => None,
			JointKind::Revolute { axis, .. } | JointKind::Prismatic { axis, .. } | JointKind::Spherical { axis, .. } => {
				Some(axis)
			}
		}
	}
}

/// Return the rotation carrying the X axis onto the unit vector `axis`.
fn align_vector_to_x_axis(axis: glam::Vec3) -> gf::Quatd {
	if axis.length() < f32::EPSILON || (axis.x - 1.0).abs() < f32::EPSILON {
		return gf::Quatd::identity();
	}
	if (axis.x + 1.0).abs() < f32::EPSILON {
		return gf::Quatd::new(0.0, 0.0, 1.0, 0.0);
	}

	let rotation_axis = glam::Vec3::X.cross(axis).normalize_or_zero();
	if rotation_axis.length() < f32::EPSILON {
		return gf::Quatd::identity();
	}
	let angle = f64::from(axis.dot(glam::Vec3::X)).clamp(-1.0, 1.0).acos();
	let (sin, cos) = (angle / 2.0).sin_cos();
	gf::Quatd::new(
		cos,
		f64::from(rotation_axis.x) * sin,
		f64::from(rotation_axis.y) * sin,
		f64::from(rotation_axis.z) * sin,
	)
}

/// Return the `physics:axis` token for `axis`, and `orientation` rotated so
/// that the principal axis named by the token points along `axis`.
///
/// The six signed principal axes map to their own token; any other
/// direction maps to `X` with the rotation folded into the orientation. A
/// zero-length axis yields `X` and the identity orientation.
pub fn axis_alignment(axis: gf::Vec3f, orientation: gf::Quatd) -> (tf::Token, gf::Quatd) {
	let tokens = &usd_physics::TOKENS;
	let axis = glam::Vec3::new(axis.x, axis.y, axis.z).normalize_or_zero();
	if axis.length() < f32::EPSILON {
		return (tokens.x.clone(), gf::Quatd::identity());
	}

	let is = |value: f32, target: f32| (value - target).abs() < f32::EPSILON;
	let d = |value: f32| f64::from(value);

	if is(axis.x, 1.0) {
		(tokens.x.clone(), orientation)
	} else if is(axis.y, 1.0) {
		(tokens.y.clone(), orientation)
	} else if is(axis.z, 1.0) {
		(tokens.z.clone(), orientation)
	} else if is(axis.x, -1.0) {
		let half_turn = gf::Quatd::new(d(axis.y), d(axis.z), d(axis.x), 0.0);
		(tokens.x.clone(), orientation * half_turn)
	} else if is(axis.y, -1.0) {
		let half_turn = gf::Quatd::new(d(axis.x), d(axis.y), d(axis.z), 0.0);
		(tokens.y.clone(), orientation * half_turn)
	} else if is(axis.z, -1.0) {
		let half_turn = gf::Quatd::new(d(axis.y), d(axis.z), d(axis.x), 0.0);
		(tokens.z.clone(), orientation * half_turn)
	} else {
		(tokens.x.clone(), orientation * align_vector_to_x_axis(axis))
	}
}

/// Express the joint frame in the local space of the target body.
fn compute_local_transform(
	target_transform: &gf::Matrix4d,
	other_transform: &gf::Matrix4d,
	target_space: JointFrameSpace,
	frame: &JointFrame,
	orientation: gf::Quatd,
) -> Option<(gf::Vec3d, gf::Quatd)> {
	if frame.space == target_space {
		return Some((frame.position, orientation));
	}

	let (world_position, world_rotation) = if frame.space == JointFrameSpace::World {
		(frame.position, orientation)
	} else {
		(
			other_transform.transform(frame.position),
			other_transform.extract_rotation() * orientation,
		)
	};

	// Joint rotations cannot carry scale or shear, only the position sees them.
	let local_position = target_transform.inverse()?.transform(world_position);
	let local_rotation = target_transform.extract_rotation().inverse() * world_rotation;
	Some((local_position, local_rotation))
}

fn set_axis(joint: &Joint, axis: &tf::Token) {
	let prim = joint.prim().clone();
	if let Some(revolute) = RevoluteJoint::from_prim(prim.clone()) {
		revolute.create_axis_attr().set(axis.clone());
	} else if let Some(prismatic) = PrismaticJoint::from_prim(prim.clone()) {
		prismatic.create_axis_attr().set(axis.clone());
	} else if let Some(spherical) = SphericalJoint::from_prim(prim) {
		spherical.create_axis_attr().set(axis.clone());
	}
}

/// Author the axis and local frames of `joint` for the given bodies.
fn set_physics_joint(
	joint: &Joint,
	body0: Option<&usd::Prim>,
	body1: Option<&usd::Prim>,
	frame: &JointFrame,
	axis: Option<gf::Vec3f>,
) -> Result<()> {
	let mut orientation = frame.orientation;
	if let Some(axis) = axis {
		let (token, aligned) = axis_alignment(axis, orientation);
		orientation = aligned;
		set_axis(joint, &token);
	}

	let mut cache = usd_geom::XformCache::new();
	let mut world = |body: Option<&usd::Prim>| body.map_or_else(gf::Matrix4d::identity, |body| cache.local_to_world(body));
	let body0_transform = world(body0);
	let body1_transform = world(body1);

	let singular = |body: &usd::Prim| {
		let message = format!(
			"Unable to compute the joint frame of <{}>: the world transform of <{}> is not invertible",
			joint.path(),
			body.path()
		);
		tf_runtime_error!("{}", message);
		Error::InvalidArgument(message)
	};

	if let Some(body) = body0 {
		let (position, rotation) = compute_local_transform(
			&body0_transform,
			&body1_transform,
			JointFrameSpace::Body0,
			frame,
			orientation,
		)
		.ok_or_else(|| singular(body))?;
		joint.create_local_pos0_attr().set(gf::Vec3f::from(position));
		joint.create_local_rot0_attr().set(gf::Quatf::from(rotation));
	}

	if let Some(body) = body1 {
		let (position, rotation) = compute_local_transform(
			&body1_transform,
			&body0_transform,
			JointFrameSpace::Body1,
			frame,
			orientation,
		)
		.ok_or_else(|| singular(body))?;
		joint.create_local_pos1_attr().set(gf::Vec3f::from(position));
		joint.create_local_rot1_attr().set(gf::Quatf::from(rotation));
	}
	Ok(())
}

fn validate_joint_arguments(
	stage: &usd::Stage,
	path: &sdf::Path,
	body0: Option<&usd::Prim>,
	body1: Option<&usd::Prim>,
	frame: &JointFrame,
) -> std::result::Result<(), String> {
	is_editable_prim_location(stage, path).map_err(|reason| format!("An invalid location: {}", reason))?;

	if body0.is_none() && body1.is_none() {
		return Err("Body0 or Body1 are not specified. One of these must exist.".to_string());
	}
	for (label, body) in [("Body0", body0), ("Body1", body1)] {
		if let Some(body) = body {
			if usd_geom::Xformable::from_prim(body.clone()).is_none() {
				return Err(format!("{}( \"{}\" ) is not a UsdGeomXformable", label, body.path()));
			}
		}
	}
	check_frame_space(body0, body1, frame)
		.map_err(|label| format!("{} is specified in the JointFrame Space, but {} does not exist.", label, label))
}

/// Fail with the name of the body the frame is expressed in when it is missing.
fn check_frame_space(
	body0: Option<&usd::Prim>,
	body1: Option<&usd::Prim>,
	frame: &JointFrame,
) -> std::result::Result<(), &'static str> {
	match frame.space {
		JointFrameSpace::Body0 if body0.is_none() => Err("Body0"),
		JointFrameSpace::Body1 if body1.is_none() => Err("Body1"),
		_ => Ok(()),
	}
}

fn target_body(rel: &usd::Relationship, label: &str, body: &usd::Prim, schema: &str) -> Result<()> {
	if rel.set_targets(vec![body.path().clone()]) {
		return Ok(());
	}
	let message = format!(
		"Unable to set {}( \"{}\" ) for {} at \"{}\"",
		label,
		body.path(),
		schema,
		rel.path().prim_path()
	);
	tf_runtime_error!("{}", message);
	Err(Error::Authority(message))
}

fn clear_body(rel: &usd::Relationship, label: &str) -> Result<()> {
	if rel.clear_targets(true) {
		return Ok(());
	}
	let message = format!(
		"Unable to clear {} relationships for PhysicsJoint at \"{}\"",
		label,
		rel.path().prim_path()
	);
	tf_runtime_error!("{}", message);
	Err(Error::Authority(message))
}

fn valid<'p, 'a>(body: Option<&'p usd::Prim<'a>>) -> Option<&'p usd::Prim<'a>> {
	body.filter(|body| body.is_valid())
}

fn author_limits(joint: &Joint, kind: &JointKind) {
	let prim = joint.prim().clone();
	let set = |attr: usd::Attribute, value: Option<f32>| {
		if let Some(value) = value {
			attr.set(value);
		}
	};
	match *kind {
		JointKind::Fixed => {}
		JointKind::Revolute {
			lower_limit,
			upper_limit,
			..
		} => {
			let revolute = RevoluteJoint::from_prim_unchecked(prim);
			set(revolute.create_lower_limit_attr(), lower_limit);
			set(revolute.create_upper_limit_attr(), upper_limit);
		}
		JointKind::Prismatic {
			lower_limit,
			upper_limit,
			..
		} => {
			let prismatic = PrismaticJoint::from_prim_unchecked(prim);
			set(prismatic.create_lower_limit_attr(), lower_limit);
			set(prismatic.create_upper_limit_attr(), upper_limit);
		}
		JointKind::Spherical {
			cone_angle0_limit,
			cone_angle1_limit,
			..
		} => {
			let spherical = SphericalJoint::from_prim_unchecked(prim);
			set(spherical.create_cone_angle0_limit_attr(), cone_angle0_limit);
			set(spherical.create_cone_angle1_limit_attr(), cone_angle1_limit);
		}
	}
}

/// Define a joint of `kind` at `path` connecting `body0` and `body1`.
///
/// Either body may be `None` or invalid to constrain against the world,
/// but not both. Bodies must be transformable.
pub fn define_physics_joint<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	kind: &JointKind,
) -> Result<Joint<'a>> {
	let schema = kind.schema_type();
	let (body0, body1) = (valid(body0), valid(body1));
	if let Err(reason) = validate_joint_arguments(stage, path, body0, body1, frame) {
		let message = format!("Unable to define {} at \"{}\": {}", schema, path, reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let prim = stage.define_prim(path.clone(), &tf::Token::new(schema)).inspect_err(|err| {
		tf_runtime_error!("Unable to define {} at \"{}\": {}", schema, path, err);
	})?;
	let joint = Joint::from_prim_unchecked(prim);
	if let Some(body) = body0 {
		target_body(&joint.create_body0_rel(), "body0", body, schema)?;
	}
	if let Some(body) = body1 {
		target_body(&joint.create_body1_rel(), "body1", body, schema)?;
	}

	set_physics_joint(&joint, body0, body1, frame, kind.axis())?;
	author_limits(&joint, kind);
	Ok(joint)
}

fn joint_path(parent: &usd::Prim, name: &str, schema: &str) -> Result<sdf::Path> {
	if let Err(reason) = is_editable_prim_location_in(parent, name) {
		let message = format!("Unable to define {} due to an invalid location: {}", schema, reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	Ok(parent.path().append_child(&tf::Token::new(name)))
}

/// Define a joint of `kind` named `name` below `parent`. See [`define_physics_joint`].
pub fn define_physics_joint_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	kind: &JointKind,
) -> Result<Joint<'a>> {
	let path = joint_path(parent, name, kind.schema_type())?;
	define_physics_joint(parent.stage(), &path, body0, body1, frame, kind)
}

/// Define a joint removing all degrees of freedom between two bodies.
pub fn define_physics_fixed_joint<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
) -> Result<FixedJoint<'a>> {
	let joint = define_physics_joint(stage, path, body0, body1, frame, &JointKind::Fixed)?;
	Ok(FixedJoint::from_prim_unchecked(joint.prim().clone()))
}

pub fn define_physics_fixed_joint_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
) -> Result<FixedJoint<'a>> {
	let path = joint_path(parent, name, JointKind::Fixed.schema_type())?;
	define_physics_fixed_joint(parent.stage(), &path, body0, body1, frame)
}

/// Define a hinge rotating around `axis`, with limits in degrees.
///
/// The principal axes, positive or negative, are authored as the joint
/// axis. Any other direction is authored as `X`, with the joint frame
/// rotated onto it.
#[allow(clippy::too_many_arguments)]
pub fn define_physics_revolute_joint<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	axis: gf::Vec3f,
	lower_limit: Option<f32>,
	upper_limit: Option<f32>,
) -> Result<RevoluteJoint<'a>> {
	let kind = JointKind::Revolute {
		axis,
		lower_limit,
		upper_limit,
	};
	let joint = define_physics_joint(stage, path, body0, body1, frame, &kind)?;
	Ok(RevoluteJoint::from_prim_unchecked(joint.prim().clone()))
}

#[allow(clippy::too_many_arguments)]
pub fn define_physics_revolute_joint_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	axis: gf::Vec3f,
	lower_limit: Option<f32>,
	upper_limit: Option<f32>,
) -> Result<RevoluteJoint<'a>> {
	let path = joint_path(parent, name, "PhysicsRevoluteJoint")?;
	define_physics_revolute_joint(parent.stage(), &path, body0, body1, frame, axis, lower_limit, upper_limit)
}

/// Define a slider along `axis`, with limits in distance.
#[allow(clippy::too_many_arguments)]
pub fn define_physics_prismatic_joint<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	axis: gf::Vec3f,
	lower_limit: Option<f32>,
	upper_limit: Option<f32>,
) -> Result<PrismaticJoint<'a>> {
	let kind = JointKind::Prismatic {
		axis,
		lower_limit,
		upper_limit,
	};
	let joint = define_physics_joint(stage, path, body0, body1, frame, &kind)?;
	Ok(PrismaticJoint::from_prim_unchecked(joint.prim().clone()))
}

#[allow(clippy::too_many_arguments)]
pub fn define_physics_prismatic_joint_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	axis: gf::Vec3f,
	lower_limit: Option<f32>,
	upper_limit: Option<f32>,
) -> Result<PrismaticJoint<'a>> {
	let path = joint_path(parent, name, "PhysicsPrismaticJoint")?;
	define_physics_prismatic_joint(parent.stage(), &path, body0, body1, frame, axis, lower_limit, upper_limit)
}

/// Define a ball and socket joint, optionally limited to a cone around `axis`.
#[allow(clippy::too_many_arguments)]
pub fn define_physics_spherical_joint<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	axis: gf::Vec3f,
	cone_angle0_limit: Option<f32>,
	cone_angle1_limit: Option<f32>,
) -> Result<SphericalJoint<'a>> {
	let kind = JointKind::Spherical {
		axis,
		cone_angle0_limit,
		cone_angle1_limit,
	};
	let joint = define_physics_joint(stage, path, body0, body1, frame, &kind)?;
	Ok(SphericalJoint::from_prim_unchecked(joint.prim().clone()))
}

#[allow(clippy::too_many_arguments)]
pub fn define_physics_spherical_joint_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	body0: Option<&usd::Prim<'a>>,
	body1: Option<&usd::Prim<'a>>,
	frame: &JointFrame,
	axis: gf::Vec3f,
	cone_angle0_limit: Option<f32>,
	cone_angle1_limit: Option<f32>,
) -> Result<SphericalJoint<'a>> {
	let path = joint_path(parent, name, "PhysicsSphericalJoint")?;
	define_physics_spherical_joint(
		parent.stage(),
		&path,
		body0,
		body1,
		frame,
		axis,
		cone_angle0_limit,
		cone_angle1_limit,
	)
}

fn frame_space_error(joint: &Joint, label: &str) -> Error {
	let message = format!("{} is not specified for PhysicsJoint at \"{}\"", label, joint.path());
	tf_runtime_error!("{}", message);
	Error::InvalidArgument(message)
}

/// Recompute the local frames of `joint` for its current bodies.
///
/// With `axis`, the joint axis is re-aligned as well.
pub fn align_physics_joint(joint: &Joint, frame: &JointFrame, axis: Option<gf::Vec3f>) -> Result<()> {
	let targets0 = joint.body0();
	let targets1 = joint.body1();
	if targets0.is_none() && targets1.is_none() {
		let message = "Unable to align PhysicsJoint on invalid joint".to_string();
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let stage = joint.stage();
	let body0 = targets0.map(|path| stage.prim_at_path(path)).filter(|prim| prim.is_valid());
	let body1 = targets1.map(|path| stage.prim_at_path(path)).filter(|prim| prim.is_valid());
	check_frame_space(body0.as_ref(), body1.as_ref(), frame).map_err(|label| frame_space_error(joint, label))?;

	set_physics_joint(joint, body0.as_ref(), body1.as_ref(), frame, axis)
}

/// Retarget `joint` to `body0` and `body1` and recompute its local frames.
///
/// A missing body clears the corresponding relationship at the edit target.
pub fn connect_physics_joint(
	joint: &Joint,
	body0: Option<&usd::Prim>,
	body1: Option<&usd::Prim>,
	frame: &JointFrame,
	axis: Option<gf::Vec3f>,
) -> Result<()> {
	let (body0, body1) = (valid(body0), valid(body1));
	check_frame_space(body0, body1, frame).map_err(|label| frame_space_error(joint, label))?;

	let path = joint.path();
	if body0.is_none() && body1.is_none() {
		let message = format!("Body0 and Body1 are not specified for PhysicsJoint at \"{}\"", path);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	match body0 {
		Some(body) => target_body(&joint.create_body0_rel(), "body0", body, "PhysicsJoint")?,
		None => clear_body(&joint.body0_rel(), "body0")?,
	}
	match body1 {
		Some(body) => target_body(&joint.create_body1_rel(), "body1", body, "PhysicsJoint")?,
		None => clear_body(&joint.body1_rel(), "body1")?,
	}

	set_physics_joint(joint, body0, body1, frame, axis)
}
