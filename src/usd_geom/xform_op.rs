use super::TOKENS;
use crate::{gf, sdf::VALUE_TYPE_NAMES, tf, usd, vt};
use glam::{DMat4, DQuat, DVec3, dvec3};
use half::f16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XformOpType {
	// Scalar
	TranslateX,
	TranslateY,
	TranslateZ,
	// Vec3
	Translate,

	// Scalar
	ScaleX,
	ScaleY,
	ScaleZ,
	// Vec3
	Scale,

	// Scalar
	RotateX,
	RotateY,
	RotateZ,

	// Vec3
	RotateXYZ,
	RotateXZY,
	RotateYXZ,
	RotateYZX,
	RotateZXY,
	RotateZYX,

	// Quat
	Orient,

	// Matrix4
	Transform,
}

impl XformOpType {
	pub fn as_str(&self) -> &'static str {
		use XformOpType::*;
		match self {
			TranslateX => "translateX",
			TranslateY => "translateY",
			TranslateZ => "translateZ",
			Translate => "translate",
			ScaleX => "scaleX",
			ScaleY => "scaleY",
			ScaleZ => "scaleZ",
			Scale => "scale",
			RotateX => "rotateX",
			RotateY => "rotateY",
			RotateZ => "rotateZ",
			RotateXYZ => "rotateXYZ",
			RotateXZY => "rotateXZY",
			RotateYXZ => "rotateYXZ",
			RotateYZX => "rotateYZX",
			RotateZXY => "rotateZXY",
			RotateZYX => "rotateZYX",
			Orient => "orient",
			Transform => "transform",
		}
	}

	/// Return the value type name of an op of this type at `precision`.
	pub fn type_name(&self, precision: Precision) -> tf::Token {
		use XformOpType::*;
		let name = match (self, precision) {
			(Transform, _) => return VALUE_TYPE_NAMES.matrix4d.clone(),
			(Orient, Precision::Double) => "quatd",
			(Orient, Precision::Float) => "quatf",
			(Orient, Precision::Half) => "quath",
			(Translate | Scale | RotateXYZ | RotateXZY | RotateYXZ | RotateYZX | RotateZXY | RotateZYX, p) => match p {
				Precision::Double => "double3",
				Precision::Float => "float3",
				Precision::Half => "half3",
			},
			(_, Precision::Double) => "double",
			(_, Precision::Float) => "float",
			(_, Precision::Half) => "half",
		};
		tf::Token::new(name)
	}
}

impl TryFrom<&str> for XformOpType {
	type Error = ();
	fn try_from(s: &str) -> Result<Self, Self::Error> {
		Ok(match s {
			"translateX" => XformOpType::TranslateX,
			"translateY" => XformOpType::TranslateY,
			"translateZ" => XformOpType::TranslateZ,
			"translate" => XformOpType::Translate,
			"scaleX" => XformOpType::ScaleX,
			"scaleY" => XformOpType::ScaleY,
			"scaleZ" => XformOpType::ScaleZ,
			"scale" => XformOpType::Scale,
			"rotateX" => XformOpType::RotateX,
			"rotateY" => XformOpType::RotateY,
			"rotateZ" => XformOpType::RotateZ,
			"rotateXYZ" => XformOpType::RotateXYZ,
			"rotateXZY" => XformOpType::RotateXZY,
			"rotateYXZ" => XformOpType::RotateYXZ,
			"rotateYZX" => XformOpType::RotateYZX,
			"rotateZXY" => XformOpType::RotateZXY,
			"rotateZYX" => XformOpType::RotateZYX,
			"orient" => XformOpType::Orient,
			"transform" => XformOpType::Transform,
			_ => return Err(()),
		})
	}
}

/// Precision with which the value of an op is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
	#[default]
	Double,
	Float,
	Half,
}

/// Schema wrapper for [`usd::Attribute`] for authoring and computing
/// transformation operations, as consumed by the Xformable schema.
#[derive(Debug, Clone, PartialEq)]
pub struct XformOp<'a> {
	attr: usd::Attribute<'a>,
	op_type: XformOpType,
	is_inverse: bool,
}

impl<'a> XformOp<'a> {
	/// Return the attribute name of an op, e.g. `xformOp:translate:pivot`.
	pub fn attribute_name(op_type: XformOpType, suffix: Option<&str>) -> tf::Token {
		match suffix {
			Some(suffix) if !suffix.is_empty() => {
				tf::Token::new(format!("{}{}:{}", TOKENS.xform_op_prefix, op_type.as_str(), suffix))
			}
			_ => tf::Token::new(format!("{}{}", TOKENS.xform_op_prefix, op_type.as_str())),
		}
	}

	/// Return the entry of the op in `xformOpOrder`, e.g. `!invert!xformOp:translate:pivot`.
	pub fn op_name(op_type: XformOpType, suffix: Option<&str>, is_inverse: bool) -> tf::Token {
		let name = Self::attribute_name(op_type, suffix);
		if is_inverse {
			tf::Token::new(format!("{}{}", TOKENS.inverse_prefix, name))
		} else {
			name
		}
	}

	/// Interpret an `xformOpOrder` entry of `prim`.
	pub fn from_op_name(prim: &usd::Prim<'a>, op_name: &tf::Token) -> Option<Self> {
		let (attr_name, is_inverse) = match op_name.as_str().strip_prefix(TOKENS.inverse_prefix.as_str()) {
			Some(rest) => (rest, true),
			None => (op_name.as_str(), false),
		};
		let op_type = attr_name
			.strip_prefix(TOKENS.xform_op_prefix.as_str())?
			.split(':')
			.next()
			.and_then(|s| XformOpType::try_from(s).ok())?;
		Some(Self {
			attr: prim.attribute(&tf::Token::new(attr_name)),
			op_type,
			is_inverse,
		})
	}

	pub fn attr(&self) -> &usd::Attribute<'a> {
		&self.attr
	}

	pub fn op_type(&self) -> XformOpType {
		self.op_type
	}

	pub fn is_inverse_op(&self) -> bool {
		self.is_inverse
	}

	pub fn name(&self) -> tf::Token {
		self.attr.name()
	}

	/// Return this op's entry in `xformOpOrder`.
	pub fn op_order_name(&self) -> tf::Token {
		if self.is_inverse {
			tf::Token::new(format!("{}{}", TOKENS.inverse_prefix, self.attr.name()))
		} else {
			self.attr.name()
		}
	}

	pub fn get_value(&self) -> Option<vt::Value> {
		self.attr.get_value()
	}

	pub fn set(&self, value: impl Into<vt::Value>) -> bool {
		self.attr.set(value)
	}

	/// Return the transformation of this op, in row-vector convention.
	pub fn op_transform(&self) -> Option<gf::Matrix4d> {
		let value = self.get_value()?;
		op_transform(self.op_type, &value, self.is_inverse)
	}
}

fn get_scalar(value: &vt::Value) -> Option<f64> {
	value
		.get::<f64>()
		.or_else(|| value.get::<f32>().map(|v| v.into()))
		.or_else(|| value.get::<f16>().map(|v| v.into()))
}

fn get_vec3(value: &vt::Value) -> Option<DVec3> {
	value
		.get::<gf::Vec3d>()
		.or_else(|| value.get::<gf::Vec3f>().map(|v| v.into()))
		.or_else(|| value.get::<gf::Vec3h>().map(|v| v.into()))
		.map(DVec3::from)
}

fn get_quat(value: &vt::Value) -> Option<DQuat> {
	value
		.get::<gf::Quatd>()
		.or_else(|| value.get::<gf::Quatf>().map(|v| v.into()))
		.or_else(|| value.get::<gf::Quath>().map(|v| v.into()))
		.map(DQuat::from)
}

/// Compose the rotation of a three-angle rotate op. Angles are in degrees
/// and the first axis named by the op is applied first.
pub(crate) fn euler_rotation(op_type: XformOpType, degrees: DVec3) -> Option<DQuat> {
	use XformOpType::*;
	let rx = DQuat::from_rotation_x(degrees.x.to_radians());
	let ry = DQuat::from_rotation_y(degrees.y.to_radians());
	let rz = DQuat::from_rotation_z(degrees.z.to_radians());
	Some(match op_type {
		RotateXYZ => rz * ry * rx,
		RotateXZY => ry * rz * rx,
		RotateYXZ => rz * rx * ry,
		RotateYZX => rx * rz * ry,
		RotateZXY => ry * rx * rz,
		RotateZYX => rx * ry * rz,
		_ => return None,
	})
}

fn op_transform(op_type: XformOpType, value: &vt::Value, is_inverse: bool) -> Option<gf::Matrix4d> {
	use XformOpType::*;

	let matrix = match op_type {
		TranslateX => DMat4::from_translation(dvec3(get_scalar(value)?, 0.0, 0.0)),
		TranslateY => DMat4::from_translation(dvec3(0.0, get_scalar(value)?, 0.0)),
		TranslateZ => DMat4::from_translation(dvec3(0.0, 0.0, get_scalar(value)?)),
		Translate => DMat4::from_translation(get_vec3(value)?),

		ScaleX => DMat4::from_scale(dvec3(get_scalar(value)?, 1.0, 1.0)),
		ScaleY => DMat4::from_scale(dvec3(1.0, get_scalar(value)?, 1.0)),
		ScaleZ => DMat4::from_scale(dvec3(1.0, 1.0, get_scalar(value)?)),
		Scale => DMat4::from_scale(get_vec3(value)?),

		RotateX => DMat4::from_rotation_x(get_scalar(value)?.to_radians()),
		RotateY => DMat4::from_rotation_y(get_scalar(value)?.to_radians()),
		RotateZ => DMat4::from_rotation_z(get_scalar(value)?.to_radians()),
		RotateXYZ | RotateXZY | RotateYXZ | RotateYZX | RotateZXY | RotateZYX => {
			DMat4::from_quat(euler_rotation(op_type, get_vec3(value)?)?)
		}

		Orient => DMat4::from_quat(get_quat(value)?.normalize()),
		Transform => value.get::<gf::Matrix4d>()?.to_glam(),
	};

	let matrix = if is_inverse {
		if matrix.determinant().abs() < f64::EPSILON {
			return None;
		}
		matrix.inverse()
	} else {
		matrix
	};
	Some(gf::Matrix4d::from_glam(matrix))
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn op_names() {
		assert_eq!(
			XformOp::op_name(XformOpType::Translate, Some("pivot"), true).as_str(),
			"!invert!xformOp:translate:pivot"
		);
		assert_eq!(XformOp::attribute_name(XformOpType::RotateXYZ, None).as_str(), "xformOp:rotateXYZ");
		assert_eq!(XformOpType::Orient.type_name(Precision::Float).as_str(), "quatf");
		assert_eq!(XformOpType::RotateX.type_name(Precision::Double).as_str(), "double");
	}

	#[test]
	fn rotations_are_in_degrees() {
		let m = op_transform(XformOpType::RotateZ, &vt::Value::new(90.0f64), false).unwrap();
		let p = m.transform(gf::Vec3d::new(1.0, 0.0, 0.0));
		assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
		assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);

		let m = op_transform(XformOpType::Translate, &vt::Value::new(gf::Vec3d::new(1.0, 2.0, 3.0)), true).unwrap();
		assert_eq!(m.extract_translation(), gf::Vec3d::new(-1.0, -2.0, -3.0));
	}

	#[test]
	fn euler_order_applies_first_axis_first() {
		// X then Z: +Y goes to +Z, then stays on +Z.
		let q = euler_rotation(XformOpType::RotateXYZ, dvec3(90.0, 0.0, 90.0)).unwrap();
		let p = q * DVec3::Y;
		assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-12);
		// Z then X: +Y goes to -X, then stays on -X.
		let q = euler_rotation(XformOpType::RotateZYX, dvec3(90.0, 0.0, 90.0)).unwrap();
		let p = q * DVec3::Y;
		assert_abs_diff_eq!(p.x, -1.0, epsilon = 1e-12);
	}
}
