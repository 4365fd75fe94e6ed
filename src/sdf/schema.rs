use crate::{declare_public_tokens, tf};

declare_public_tokens!(FieldKeys, FIELD_KEYS, [
	active: "active",
	api_schemas: "apiSchemas",
	comment: "comment",
	connection_paths: "connectionPaths",
	custom: "custom",
	custom_data: "customData",
	custom_layer_data: "customLayerData",
	default: "default",
	default_prim: "defaultPrim",
	display_name: "displayName",
	documentation: "documentation",
	instanceable: "instanceable",
	kind: "kind",
	meters_per_unit: "metersPerUnit",
	payload: "payload",
	references: "references",
	specifier: "specifier",
	sub_layers: "subLayers",
	target_paths: "targetPaths",
	type_name: "typeName",
	up_axis: "upAxis",
	variability: "variability",
]);

declare_public_tokens!(ChildrenKeys, CHILDREN_KEYS, [
	prim_children: "primChildren",
	property_children: "properties",
]);

declare_public_tokens!(ValueTypeNames, VALUE_TYPE_NAMES, [
	bool: "bool",
	int: "int",
	float: "float",
	float2: "float2",
	float3: "float3",
	float4: "float4",
	double: "double",
	double2: "double2",
	double3: "double3",
	double4: "double4",
	color3f: "color3f",
	color4f: "color4f",
	normal3f: "normal3f",
	point3f: "point3f",
	vector3f: "vector3f",
	tex_coord2f: "texCoord2f",
	quatf: "quatf",
	quatd: "quatd",
	matrix4d: "matrix4d",
	token: "token",
	string: "string",
	asset: "asset",
	color3f_array: "color3f[]",
	float_array: "float[]",
	float3_array: "float3[]",
	point3f_array: "point3f[]",
	token_array: "token[]",
]);

/// Return the array flavor of `type_name` (`float3` becomes `float3[]`).
pub fn array_type_name(type_name: &tf::Token) -> tf::Token {
	if type_name.as_str().ends_with("[]") {
		type_name.clone()
	} else {
		tf::Token::new(format!("{}[]", type_name))
	}
}

/// Return the scalar flavor of `type_name` (`float3[]` becomes `float3`).
pub fn scalar_type_name(type_name: &tf::Token) -> tf::Token {
	match type_name.as_str().strip_suffix("[]") {
		Some(scalar) => tf::Token::new(scalar),
		None => type_name.clone(),
	}
}
