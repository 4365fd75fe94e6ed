use crate::{declare_public_tokens, tf};

declare_public_tokens!(Tokens, TOKENS, [
	xform_op_order: "xformOpOrder",
	xform_op_prefix: "xformOp:",
	inverse_prefix: "!invert!",
	reset_xform_stack: "!resetXformStack!",
	pivot: "pivot",

	purpose: "purpose",
	default_: "default",
	render: "render",
	proxy: "proxy",
	guide: "guide",

	visibility: "visibility",
	inherited: "inherited",
	invisible: "invisible",

	extent: "extent",
	extents_hint: "extentsHint",
	points: "points",
	size: "size",
	radius: "radius",
	height: "height",
	width: "width",
	length: "length",
	axis: "axis",
	x: "X",
	y: "Y",
	z: "Z",

	primvars_display_color: "primvars:displayColor",
	primvars_display_opacity: "primvars:displayOpacity",

	up_axis: "upAxis",
	meters_per_unit: "metersPerUnit",

	geom_model_api: "GeomModelAPI",
	xformable: "Xformable",
	boundable: "Boundable",
	imageable: "Imageable",
	gprim: "Gprim",
]);

/// Return the purposes in the order used by extents hints.
pub fn ordered_purpose_tokens() -> [tf::Token; 4] {
	[
		TOKENS.default_.clone(),
		TOKENS.render.clone(),
		TOKENS.proxy.clone(),
		TOKENS.guide.clone(),
	]
}
