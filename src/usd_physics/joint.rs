use super::TOKENS;
use crate::{gf, sdf, sdf::VALUE_TYPE_NAMES, usd, usd::SchemaBase};

usd::declare_typed_schema!(
	/// A joint constrains the movement of rigid bodies. `physics:body0` and
	/// `physics:body1` target the constrained bodies, and the joint frame is
	/// expressed relative to each body by `localPos0/1` and `localRot0/1`.
	///
	/// A missing body constrains against the world frame.
	Joint,
	"PhysicsJoint"
);

usd::declare_typed_schema!(
	/// Removes all degrees of freedom between the two bodies.
	FixedJoint,
	"PhysicsFixedJoint"
);

usd::declare_typed_schema!(
	/// Allows rotation around the joint axis, optionally limited in degrees.
	RevoluteJoint,
	"PhysicsRevoluteJoint"
);

usd::declare_typed_schema!(
	/// Allows translation along the joint axis, optionally limited in distance.
	PrismaticJoint,
	"PhysicsPrismaticJoint"
);

usd::declare_typed_schema!(
	/// Ball and socket joint, with an optional cone limit around the joint axis.
	SphericalJoint,
	"PhysicsSphericalJoint"
);

macro_rules! attr {
	($get:ident, $create:ident, $token:ident, $type:ident) => {
		pub fn $get(&self) -> usd::Attribute<'a> {
			self.attribute(&TOKENS.$token)
		}

		pub fn $create(&self) -> usd::Attribute<'a> {
			self.create_attribute(&TOKENS.$token, &VALUE_TYPE_NAMES.$type, false)
		}
	};
}

macro_rules! axis_attr {
	() => {
		pub fn axis_attr(&self) -> usd::Attribute<'a> {
			self.attribute(&TOKENS.axis)
		}

		pub fn create_axis_attr(&self) -> usd::Attribute<'a> {
			self.create_uniform_attribute(&TOKENS.axis, &VALUE_TYPE_NAMES.token)
		}
	};
}

macro_rules! as_joint {
	($($name:ident),*) => {
		$(
			impl<'a> $name<'a> {
				/// View this prim through the common joint API.
				pub fn joint(&self) -> Joint<'a> {
					Joint::from_prim_unchecked(self.prim.clone())
				}
			}
		)*
	};
}

as_joint!(FixedJoint, RevoluteJoint, PrismaticJoint, SphericalJoint);

impl<'a> Joint<'a> {
	pub fn body0_rel(&self) -> usd::Relationship<'a> {
		self.relationship(&TOKENS.body0)
	}

	pub fn create_body0_rel(&self) -> usd::Relationship<'a> {
		self.create_relationship(&TOKENS.body0, false)
	}

	pub fn body1_rel(&self) -> usd::Relationship<'a> {
		self.relationship(&TOKENS.body1)
	}

	pub fn create_body1_rel(&self) -> usd::Relationship<'a> {
		self.create_relationship(&TOKENS.body1, false)
	}

	/// Return the first `physics:body0` target.
	pub fn body0(&self) -> Option<sdf::Path> {
		self.body0_rel().targets().into_iter().next()
	}

	/// Return the first `physics:body1` target.
	pub fn body1(&self) -> Option<sdf::Path> {
		self.body1_rel().targets().into_iter().next()
	}

	attr!(local_pos0_attr, create_local_pos0_attr, local_pos0, point3f);
	attr!(local_pos1_attr, create_local_pos1_attr, local_pos1, point3f);
	attr!(local_rot0_attr, create_local_rot0_attr, local_rot0, quatf);
	attr!(local_rot1_attr, create_local_rot1_attr, local_rot1, quatf);
	attr!(joint_enabled_attr, create_joint_enabled_attr, joint_enabled, bool);
	attr!(collision_enabled_attr, create_collision_enabled_attr, collision_enabled, bool);
	attr!(break_force_attr, create_break_force_attr, break_force, float);
	attr!(break_torque_attr, create_break_torque_attr, break_torque, float);

	pub fn local_pos0(&self) -> gf::Vec3f {
		self.local_pos0_attr().get().unwrap_or_default()
	}

	pub fn local_pos1(&self) -> gf::Vec3f {
		self.local_pos1_attr().get().unwrap_or_default()
	}

	pub fn local_rot0(&self) -> gf::Quatf {
		self.local_rot0_attr().get().unwrap_or_else(gf::Quatf::identity)
	}

	pub fn local_rot1(&self) -> gf::Quatf {
		self.local_rot1_attr().get().unwrap_or_else(gf::Quatf::identity)
	}
}

impl<'a> RevoluteJoint<'a> {
	axis_attr!();
	attr!(lower_limit_attr, create_lower_limit_attr, lower_limit, float);
	attr!(upper_limit_attr, create_upper_limit_attr, upper_limit, float);
}

impl<'a> PrismaticJoint<'a> {
	axis_attr!();
	attr!(lower_limit_attr, create_lower_limit_attr, lower_limit, float);
	attr!(upper_limit_attr, create_upper_limit_attr, upper_limit, float);
}

impl<'a> SphericalJoint<'a> {
	axis_attr!();
	attr!(cone_angle0_limit_attr, create_cone_angle0_limit_attr, cone_angle0_limit, float);
	attr!(cone_angle1_limit_attr, create_cone_angle1_limit_attr, cone_angle1_limit, float);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tf;

	#[test]
	fn typed_joints_share_the_joint_api() {
		let stage = usd::Stage::create_in_memory();
		stage.define_prim("/World/A", &tf::Token::new("Cube")).unwrap();
		let hinge = RevoluteJoint::define(&stage, "/World/Hinge").unwrap();
		let joint = hinge.joint();
		assert!(Joint::get(&stage, "/World/Hinge").is_some());
		assert!(FixedJoint::get(&stage, "/World/Hinge").is_none());

		assert!(joint.create_body0_rel().set_targets(vec![sdf::Path::from("/World/A")]));
		assert_eq!(joint.body0(), Some(sdf::Path::from("/World/A")));
		assert_eq!(joint.body1(), None);
		assert_eq!(joint.local_rot0(), gf::Quatf::identity());

		assert!(hinge.create_axis_attr().set(TOKENS.y.clone()));
		assert_eq!(hinge.axis_attr().get::<tf::Token>(), Some(TOKENS.y.clone()));
		assert!(hinge.create_lower_limit_attr().set(-45.0f32));
		assert_eq!(hinge.lower_limit_attr().get::<f32>(), Some(-45.0));
	}
}
