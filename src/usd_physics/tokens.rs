use crate::{declare_public_tokens, tf};

declare_public_tokens!(Tokens, TOKENS, [
	x: "X",
	y: "Y",
	z: "Z",

	body0: "physics:body0",
	body1: "physics:body1",
	local_pos0: "physics:localPos0",
	local_pos1: "physics:localPos1",
	local_rot0: "physics:localRot0",
	local_rot1: "physics:localRot1",
	joint_enabled: "physics:jointEnabled",
	collision_enabled: "physics:collisionEnabled",
	exclude_from_articulation: "physics:excludeFromArticulation",
	break_force: "physics:breakForce",
	break_torque: "physics:breakTorque",

	axis: "physics:axis",
	lower_limit: "physics:lowerLimit",
	upper_limit: "physics:upperLimit",
	cone_angle0_limit: "physics:coneAngle0Limit",
	cone_angle1_limit: "physics:coneAngle1Limit",

	dynamic_friction: "physics:dynamicFriction",
	static_friction: "physics:staticFriction",
	restitution: "physics:restitution",
	density: "physics:density",

	rigid_body_api: "PhysicsRigidBodyAPI",
	material_api: "PhysicsMaterialAPI",
	collision_api: "PhysicsCollisionAPI",
]);
