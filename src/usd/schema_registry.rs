use crate::tf;

/// Typed schemas and their direct base schema.
const SCHEMA_BASES: &[(&str, &str)] = &[
	("Imageable", "Typed"),
	("Scope", "Imageable"),
	("Xformable", "Imageable"),
	("Xform", "Xformable"),
	("Boundable", "Xformable"),
	("Gprim", "Boundable"),
	("Cube", "Gprim"),
	("Sphere", "Gprim"),
	("Cylinder", "Gprim"),
	("Cone", "Gprim"),
	("Capsule", "Gprim"),
	("Plane", "Gprim"),
	("PointBased", "Gprim"),
	("Mesh", "PointBased"),
	("Points", "PointBased"),
	("BasisCurves", "PointBased"),
	("Camera", "Xformable"),
	("NodeGraph", "Typed"),
	("Material", "NodeGraph"),
	("Shader", "Typed"),
	("PhysicsJoint", "Imageable"),
	("PhysicsFixedJoint", "PhysicsJoint"),
	("PhysicsRevoluteJoint", "PhysicsJoint"),
	("PhysicsPrismaticJoint", "PhysicsJoint"),
	("PhysicsSphericalJoint", "PhysicsJoint"),
	("PhysicsDistanceJoint", "PhysicsJoint"),
	("PhysicsScene", "Typed"),
];

/// Return the direct base of the typed schema `type_name`.
pub fn base_schema(type_name: &str) -> Option<&'static str> {
	SCHEMA_BASES
		.iter()
		.find(|(schema, _)| *schema == type_name)
		.map(|(_, base)| *base)
}

/// Return true if `type_name` is `schema_type` or derives from it.
pub fn is_a(type_name: &tf::Token, schema_type: &tf::Token) -> bool {
	if type_name.is_empty() {
		return false;
	}
	let mut current = Some(type_name.as_str());
	while let Some(schema) = current {
		if schema == schema_type.as_str() {
			return true;
		}
		current = base_schema(schema);
	}
	false
}
