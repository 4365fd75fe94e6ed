//! Graphics Foundations

use glam::{DMat4, DQuat, DVec3};
use half::f16;

use std::ops::Mul;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2<T> {
	pub x: T,
	pub y: T,
}

impl<T> Vec2<T> {
	pub fn new(x: T, y: T) -> Self {
		Self { x, y }
	}
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3<T> {
	pub x: T,
	pub y: T,
	pub z: T,
}

impl<T> Vec3<T> {
	pub fn new(x: T, y: T, z: T) -> Self {
		Self { x, y, z }
	}
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec4<T> {
	pub x: T,
	pub y: T,
	pub z: T,
	pub w: T,
}

impl<T> Vec4<T> {
	pub fn new(x: T, y: T, z: T, w: T) -> Self {
		Self { x, y, z, w }
	}
}

pub type Vec2h = Vec2<f16>;
pub type Vec2f = Vec2<f32>;
pub type Vec2d = Vec2<f64>;
pub type Vec2i = Vec2<i32>;

pub type Vec3h = Vec3<f16>;
pub type Vec3f = Vec3<f32>;
pub type Vec3d = Vec3<f64>;
pub type Vec3i = Vec3<i32>;

pub type Vec4h = Vec4<f16>;
pub type Vec4f = Vec4<f32>;
pub type Vec4d = Vec4<f64>;
pub type Vec4i = Vec4<i32>;

impl From<Vec3h> for Vec3d {
	fn from(v: Vec3h) -> Self {
		Self::new(v.x.into(), v.y.into(), v.z.into())
	}
}

impl From<Vec3f> for Vec3d {
	fn from(v: Vec3f) -> Self {
		Self::new(v.x.into(), v.y.into(), v.z.into())
	}
}

impl From<Vec3d> for Vec3f {
	fn from(v: Vec3d) -> Self {
		Self::new(v.x as f32, v.y as f32, v.z as f32)
	}
}

impl From<DVec3> for Vec3d {
	fn from(v: DVec3) -> Self {
		Self::new(v.x, v.y, v.z)
	}
}

impl From<Vec3d> for DVec3 {
	fn from(v: Vec3d) -> Self {
		DVec3::new(v.x, v.y, v.z)
	}
}

impl From<Vec3f> for DVec3 {
	fn from(v: Vec3f) -> Self {
		DVec3::new(v.x.into(), v.y.into(), v.z.into())
	}
}

/// Quaternion stored as imaginary `(i, j, k)` and real `w` parts.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quat<T> {
	pub i: T,
	pub j: T,
	pub k: T,
	pub w: T,
}

impl<T> Quat<T> {
	/// Construct from the real part followed by the imaginary parts.
	pub fn new(w: T, i: T, j: T, k: T) -> Self {
		Self { i, j, k, w }
	}
}

pub type Quath = Quat<f16>;
pub type Quatf = Quat<f32>;
pub type Quatd = Quat<f64>;

impl Quatd {
	pub fn identity() -> Self {
		Self::new(1.0, 0.0, 0.0, 0.0)
	}

	pub fn normalized(&self) -> Self {
		DQuat::from(*self).normalize().into()
	}

	pub fn inverse(&self) -> Self {
		DQuat::from(*self).inverse().into()
	}
}

impl Quatf {
	pub fn identity() -> Self {
		Self::new(1.0, 0.0, 0.0, 0.0)
	}
}

impl Mul for Quatd {
	type Output = Quatd;
	fn mul(self, rhs: Quatd) -> Quatd {
		(DQuat::from(self) * DQuat::from(rhs)).into()
	}
}

impl From<Quath> for Quatd {
	fn from(q: Quath) -> Self {
		Self::new(q.w.into(), q.i.into(), q.j.into(), q.k.into())
	}
}

impl From<Quatf> for Quatd {
	fn from(q: Quatf) -> Self {
		Self::new(q.w.into(), q.i.into(), q.j.into(), q.k.into())
	}
}

impl From<Quatd> for Quatf {
	fn from(q: Quatd) -> Self {
		Self::new(q.w as f32, q.i as f32, q.j as f32, q.k as f32)
	}
}

impl From<DQuat> for Quatd {
	fn from(q: DQuat) -> Self {
		Self::new(q.w, q.x, q.y, q.z)
	}
}

impl From<Quatd> for DQuat {
	fn from(q: Quatd) -> Self {
		DQuat::from_xyzw(q.i, q.j, q.k, q.w)
	}
}

/// A 4x4 matrix in row-vector convention: points transform as `p * M`
/// and translation lives in the last row.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4d {
	pub data: [[f64; 4]; 4],
}

impl Default for Matrix4d {
	fn default() -> Self {
		Self::identity()
	}
}

impl Matrix4d {
	pub fn identity() -> Self {
		Self::from_glam(DMat4::IDENTITY)
	}

	pub fn from_array(data: [[f64; 4]; 4]) -> Self {
		Self { data }
	}

	pub fn from_translation(t: Vec3d) -> Self {
		Self::from_glam(DMat4::from_translation(t.into()))
	}

	pub fn from_rotation(q: Quatd) -> Self {
		Self::from_glam(DMat4::from_quat(q.into()))
	}

	pub fn from_scale(s: Vec3d) -> Self {
		Self::from_glam(DMat4::from_scale(s.into()))
	}

	/// The rows of a row-vector matrix are the columns of its column-vector
	/// transpose, so no reordering is needed.
	pub fn from_glam(m: DMat4) -> Self {
		Self {
			data: m.to_cols_array_2d(),
		}
	}

	pub fn to_glam(&self) -> DMat4 {
		DMat4::from_cols_array_2d(&self.data)
	}

	pub fn inverse(&self) -> Option<Self> {
		let m = self.to_glam();
		let det = m.determinant();
		if det.abs() <= f64::EPSILON * 1e-3 {
			return None;
		}
		Some(Self::from_glam(m.inverse()))
	}

	/// Transform a point, including translation.
	pub fn transform(&self, p: Vec3d) -> Vec3d {
		self.to_glam().transform_point3(p.into()).into()
	}

	pub fn transform_dir(&self, v: Vec3d) -> Vec3d {
		self.to_glam().transform_vector3(v.into()).into()
	}

	pub fn extract_translation(&self) -> Vec3d {
		Vec3d::new(self.data[3][0], self.data[3][1], self.data[3][2])
	}

	/// Return the rotation with scale and shear factored out.
	pub fn extract_rotation(&self) -> Quatd {
		let (_, rotation, _) = self.to_glam().to_scale_rotation_translation();
		rotation.normalize().into()
	}

	/// Return a copy with only rotation and translation.
	pub fn remove_scale_shear(&self) -> Self {
		let translation = self.extract_translation();
		Self::from_rotation(self.extract_rotation()) * Self::from_translation(translation)
	}

	pub fn is_identity(&self) -> bool {
		*self == Self::identity()
	}
}

/// Row-vector composition: `a * b` applies `a` first.
impl Mul for Matrix4d {
	type Output = Matrix4d;
	fn mul(self, rhs: Matrix4d) -> Matrix4d {
		Matrix4d::from_glam(rhs.to_glam() * self.to_glam())
	}
}

/// An axis-aligned box. The empty box has `min = +MAX` and `max = -MAX`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range3d {
	pub min: Vec3d,
	pub max: Vec3d,
}

impl Default for Range3d {
	fn default() -> Self {
		Self::empty()
	}
}

impl Range3d {
	pub fn new(min: Vec3d, max: Vec3d) -> Self {
		Self { min, max }
	}

	pub fn empty() -> Self {
		Self {
			min: Vec3d::new(f64::MAX, f64::MAX, f64::MAX),
			max: Vec3d::new(f64::MIN, f64::MIN, f64::MIN),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
	}

	pub fn union_with_point(&mut self, p: Vec3d) {
		self.min = Vec3d::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
		self.max = Vec3d::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
	}

	pub fn union_with(&mut self, other: &Range3d) {
		if other.is_empty() {
			return;
		}
		self.union_with_point(other.min);
		self.union_with_point(other.max);
	}

	/// Axis-aligned bound of this box after transformation by `m`.
	pub fn transformed(&self, m: &Matrix4d) -> Range3d {
		if self.is_empty() {
			return *self;
		}
		let mut result = Range3d::empty();
		for corner in 0..8 {
			let p = Vec3d::new(
				if corner & 1 == 0 { self.min.x } else { self.max.x },
				if corner & 2 == 0 { self.min.y } else { self.max.y },
				if corner & 4 == 0 { self.min.z } else { self.max.z },
			);
			result.union_with_point(m.transform(p));
		}
		result
	}
}

// Not an official USD type, but useful for external interop.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
	pub translation: Vec3d,
	pub rotation: Quatd,
	pub scale: Vec3d,
	pub pivot: Vec3d,
}

impl Default for Transform3d {
	fn default() -> Self {
		Self {
			translation: Vec3d::default(),
			rotation: Quatd::identity(),
			scale: Vec3d::new(1.0, 1.0, 1.0),
			pivot: Vec3d::default(),
		}
	}
}

impl Transform3d {
	/// Compose as `-pivot * scale * rotate * pivot * translate`.
	pub fn matrix(&self) -> Matrix4d {
		let pivot = DVec3::from(self.pivot);
		Matrix4d::from_translation((-pivot).into())
			* Matrix4d::from_scale(self.scale)
			* Matrix4d::from_rotation(self.rotation)
			* Matrix4d::from_translation(self.pivot)
			* Matrix4d::from_translation(self.translation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn row_vector_composition() {
		let t = Matrix4d::from_translation(Vec3d::new(1.0, 2.0, 3.0));
		let s = Matrix4d::from_scale(Vec3d::new(2.0, 2.0, 2.0));
		// Scale first, then translate.
		let p = (s * t).transform(Vec3d::new(1.0, 1.0, 1.0));
		assert_eq!(p, Vec3d::new(3.0, 4.0, 5.0));
		assert_eq!(t.data[3], [1.0, 2.0, 3.0, 1.0]);
	}

	#[test]
	fn inverse_round_trip() {
		let m = Matrix4d::from_scale(Vec3d::new(2.0, 0.5, 0.5))
			* Matrix4d::from_translation(Vec3d::new(0.0, 30.0, 0.0));
		let inv = m.inverse().unwrap_or_default();
		let p = inv.transform(m.transform(Vec3d::new(5.0, 1.0, -2.0)));
		assert_abs_diff_eq!(p.x, 5.0, epsilon = 1e-12);
		assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
		assert_abs_diff_eq!(p.z, -2.0, epsilon = 1e-12);
		assert!(Matrix4d::from_scale(Vec3d::default()).inverse().is_none());
	}

	#[test]
	fn remove_scale_shear_keeps_rotation() {
		let q = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2);
		let m = Matrix4d::from_scale(Vec3d::new(3.0, 3.0, 3.0))
			* Matrix4d::from_rotation(q.into())
			* Matrix4d::from_translation(Vec3d::new(1.0, 0.0, 0.0));
		let r = m.remove_scale_shear();
		let p = r.transform(Vec3d::new(1.0, 0.0, 0.0));
		assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-9);
		assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-9);
	}

	#[test]
	fn range_transform() {
		let mut r = Range3d::empty();
		assert!(r.is_empty());
		r.union_with_point(Vec3d::new(-1.0, -1.0, -1.0));
		r.union_with_point(Vec3d::new(1.0, 1.0, 1.0));
		let moved = r.transformed(&Matrix4d::from_translation(Vec3d::new(10.0, 0.0, 0.0)));
		assert_eq!(moved.min, Vec3d::new(9.0, -1.0, -1.0));
		assert_eq!(moved.max, Vec3d::new(11.0, 1.0, 1.0));
	}
}
