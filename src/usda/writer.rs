use crate::{
	gf,
	sdf::{self, CHILDREN_KEYS, FIELD_KEYS},
	tf,
	vt::{self, ValueStore},
};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Fields written as part of a declaration rather than as metadata.
fn is_structural_field(field: &tf::Token) -> bool {
	*field == FIELD_KEYS.specifier
		|| *field == FIELD_KEYS.type_name
		|| *field == FIELD_KEYS.default
		|| *field == FIELD_KEYS.custom
		|| *field == FIELD_KEYS.variability
		|| *field == FIELD_KEYS.connection_paths
		|| *field == FIELD_KEYS.target_paths
		|| *field == CHILDREN_KEYS.prim_children
		|| *field == CHILDREN_KEYS.property_children
}

pub(crate) fn write_layer(layer: &sdf::Layer) -> String {
	let guard = layer.data();
	let data: &dyn sdf::AbstractData = &**guard;
	let root = sdf::Path::absolute_root_path();

	let mut out = String::from("#usda 1.0\n");

	let metadata: Vec<(tf::Token, vt::Value)> = data
		.list(&root)
		.into_iter()
		.filter(|field| *field != CHILDREN_KEYS.prim_children)
		.filter_map(|field| data.get(&root, &field).map(|value| (field, value)))
		.collect();

	if !metadata.is_empty() {
		out.push_str("(\n");
		for (field, value) in &metadata {
			write_metadata_entry(&mut out, 1, field, value);
		}
		out.push_str(")\n");
	}

	for child in children(data, &root, &CHILDREN_KEYS.prim_children) {
		out.push('\n');
		write_prim(&mut out, data, &root.append_child(&child), 0);
	}

	out
}

fn children(data: &dyn sdf::AbstractData, path: &sdf::Path, key: &tf::Token) -> Vec<tf::Token> {
	data.get(path, key)
		.and_then(|v| v.get::<vt::Array<tf::Token>>())
		.unwrap_or_default()
}

fn indent(out: &mut String, depth: usize) {
	for _ in 0..depth {
		out.push_str(INDENT);
	}
}

fn write_prim(out: &mut String, data: &dyn sdf::AbstractData, path: &sdf::Path, depth: usize) {
	let specifier = data
		.get(path, &FIELD_KEYS.specifier)
		.and_then(|v| v.get::<sdf::Specifier>())
		.unwrap_or(sdf::Specifier::Over);
	let type_name = data
		.get(path, &FIELD_KEYS.type_name)
		.and_then(|v| v.get::<tf::Token>())
		.unwrap_or_default();

	indent(out, depth);
	out.push_str(specifier.as_str());
	if !type_name.is_empty() {
		let _ = write!(out, " {}", type_name);
	}
	let _ = write!(out, " \"{}\"", path.name());

	let metadata: Vec<(tf::Token, vt::Value)> = data
		.list(path)
		.into_iter()
		.filter(|field| !is_structural_field(field))
		.filter_map(|field| data.get(path, &field).map(|value| (field, value)))
		.collect();

	if !metadata.is_empty() {
		out.push_str(" (\n");
		for (field, value) in &metadata {
			write_metadata_entry(out, depth + 1, field, value);
		}
		indent(out, depth);
		out.push(')');
	}
	out.push('\n');

	indent(out, depth);
	out.push_str("{\n");

	let properties = children(data, path, &CHILDREN_KEYS.property_children);
	for name in &properties {
		write_property(out, data, &path.append_property(name), depth + 1);
	}

	let prim_children = children(data, path, &CHILDREN_KEYS.prim_children);
	for (i, child) in prim_children.iter().enumerate() {
		if i > 0 || !properties.is_empty() {
			out.push('\n');
		}
		write_prim(out, data, &path.append_child(child), depth + 1);
	}

	indent(out, depth);
	out.push_str("}\n");
}

fn write_property(out: &mut String, data: &dyn sdf::AbstractData, path: &sdf::Path, depth: usize) {
	let name = path.name();
	let field = |key: &tf::Token| data.get(path, key);

	let metadata: Vec<(tf::Token, vt::Value)> = data
		.list(path)
		.into_iter()
		.filter(|f| !is_structural_field(f))
		.filter_map(|f| data.get(path, &f).map(|value| (f, value)))
		.collect();

	let mut prefix = String::new();
	if field(&FIELD_KEYS.custom).and_then(|v| v.get::<bool>()) == Some(true) {
		prefix.push_str("custom ");
	}
	if field(&FIELD_KEYS.variability).and_then(|v| v.get::<sdf::Variability>())
		== Some(sdf::Variability::Uniform)
	{
		prefix.push_str("uniform ");
	}

	if data.spec_type(path) == Some(sdf::SpecType::Relationship) {
		let targets = field(&FIELD_KEYS.target_paths).and_then(|v| v.get::<sdf::PathListOp>());
		match targets {
			Some(op) if op.is_explicit => {
				indent(out, depth);
				let _ = write!(out, "{}rel {} = {}", prefix, name, format_targets(&op.explicit_items));
				write_property_metadata(out, depth, &metadata);
			}
			Some(op) => {
				write_list_op_lines(out, depth, &format!("{}rel {}", prefix, name), &op, |items| {
					format_targets(items)
				});
			}
			None => {
				indent(out, depth);
				let _ = write!(out, "{}rel {}", prefix, name);
				write_property_metadata(out, depth, &metadata);
			}
		}
		return;
	}

	let type_name = field(&FIELD_KEYS.type_name)
		.and_then(|v| v.get::<tf::Token>())
		.unwrap_or_default();
	let declaration = format!("{}{} {}", prefix, type_name, name);

	indent(out, depth);
	out.push_str(&declaration);
	if let Some(value) = field(&FIELD_KEYS.default) {
		let _ = write!(out, " = {}", format_value(&value));
	}
	write_property_metadata(out, depth, &metadata);

	if let Some(op) = field(&FIELD_KEYS.connection_paths).and_then(|v| v.get::<sdf::PathListOp>()) {
		let connect = format!("{}{} {}.connect", prefix, type_name, name);
		if op.is_explicit {
			indent(out, depth);
			let _ = writeln!(out, "{} = {}", connect, format_targets(&op.explicit_items));
		} else {
			write_list_op_lines(out, depth, &connect, &op, |items| format_targets(items));
		}
	}
}

fn write_property_metadata(out: &mut String, depth: usize, metadata: &[(tf::Token, vt::Value)]) {
	if metadata.is_empty() {
		out.push('\n');
		return;
	}
	out.push_str(" (\n");
	for (field, value) in metadata {
		write_metadata_entry(out, depth + 1, field, value);
	}
	indent(out, depth);
	out.push_str(")\n");
}

fn write_list_op_lines<T: Clone + PartialEq>(
	out: &mut String,
	depth: usize,
	declaration: &str,
	op: &sdf::ListOp<T>,
	format: impl Fn(&[T]) -> String,
) {
	if op.is_explicit {
		indent(out, depth);
		let _ = writeln!(out, "{} = {}", declaration, format(&op.explicit_items));
		return;
	}
	for (keyword, items) in [
		("delete", &op.deleted_items),
		("prepend", &op.prepended_items),
		("append", &op.appended_items),
	] {
		if !items.is_empty() {
			indent(out, depth);
			let _ = writeln!(out, "{} {} = {}", keyword, declaration, format(items));
		}
	}
}

fn write_metadata_entry(out: &mut String, depth: usize, field: &tf::Token, value: &vt::Value) {
	let key = field.as_str();
	match value.store() {
		ValueStore::TokenListOp(op) => write_list_op_lines(out, depth, key, op, |items| {
			format_list(items.iter().map(|t| quote(t.as_str())))
		}),
		ValueStore::StringListOp(op) => write_list_op_lines(out, depth, key, op, |items| {
			format_list(items.iter().map(|s| quote(s)))
		}),
		ValueStore::PathListOp(op) => write_list_op_lines(out, depth, key, op, |items| format_targets(items)),
		ValueStore::ReferenceListOp(op) => write_list_op_lines(out, depth, key, op, |items| {
			format_arcs(items.iter().map(|r| (r.asset_path.as_str(), &r.prim_path)))
		}),
		ValueStore::PayloadListOp(op) => write_list_op_lines(out, depth, key, op, |items| {
			format_arcs(items.iter().map(|p| (p.asset_path.as_str(), &p.prim_path)))
		}),
		ValueStore::Dictionary(dict) => {
			indent(out, depth);
			let _ = write!(out, "{} = ", key);
			write_dictionary(out, depth, dict);
			out.push('\n');
		}
		ValueStore::StringArray(paths) if *field == FIELD_KEYS.sub_layers => {
			indent(out, depth);
			let _ = writeln!(out, "{} = [", key);
			for (i, path) in paths.iter().enumerate() {
				indent(out, depth + 1);
				let separator = if i + 1 < paths.len() { "," } else { "" };
				let _ = writeln!(out, "@{}@{}", path, separator);
			}
			indent(out, depth);
			out.push_str("]\n");
		}
		_ => {
			indent(out, depth);
			let _ = writeln!(out, "{} = {}", key, format_value(value));
		}
	}
}

fn write_dictionary(out: &mut String, depth: usize, dict: &vt::Dictionary) {
	out.push_str("{\n");
	for (key, value) in dict {
		indent(out, depth + 1);
		if let Some(inner) = value.get::<vt::Dictionary>() {
			let _ = write!(out, "dictionary {} = ", key);
			write_dictionary(out, depth + 1, &inner);
			out.push('\n');
		} else {
			let _ = writeln!(out, "{} {} = {}", dictionary_type_name(value), key, format_value(value));
		}
	}
	indent(out, depth);
	out.push('}');
}

fn dictionary_type_name(value: &vt::Value) -> &'static str {
	match value.store() {
		ValueStore::Bool(_) => "bool",
		ValueStore::Int(_) => "int",
		ValueStore::Int64(_) => "int64",
		ValueStore::Float(_) => "float",
		ValueStore::Double(_) => "double",
		ValueStore::Token(_) => "token",
		ValueStore::TokenArray(_) => "token[]",
		ValueStore::StringArray(_) => "string[]",
		ValueStore::AssetPath(_) => "asset",
		ValueStore::Vec3f(_) => "float3",
		ValueStore::Vec3d(_) => "double3",
		_ => "string",
	}
}

fn quote(s: &str) -> String {
	let mut quoted = String::with_capacity(s.len() + 2);
	quoted.push('"');
	for c in s.chars() {
		match c {
			'"' => quoted.push_str("\\\""),
			'\\' => quoted.push_str("\\\\"),
			'\n' => quoted.push_str("\\n"),
			c => quoted.push(c),
		}
	}
	quoted.push('"');
	quoted
}

fn format_list(items: impl Iterator<Item = String>) -> String {
	format!("[{}]", items.collect::<Vec<_>>().join(", "))
}

fn format_targets(items: &[sdf::Path]) -> String {
	match items {
		[] => "None".to_string(),
		[single] => format!("<{}>", single),
		_ => format_list(items.iter().map(|p| format!("<{}>", p))),
	}
}

fn format_arcs<'a>(items: impl ExactSizeIterator<Item = (&'a str, &'a sdf::Path)>) -> String {
	let single = items.len() == 1;
	let formatted: Vec<String> = items
		.map(|(asset_path, prim_path)| {
			let mut arc = String::new();
			if !asset_path.is_empty() {
				let _ = write!(arc, "@{}@", asset_path);
			}
			if !prim_path.is_empty() {
				let _ = write!(arc, "<{}>", prim_path);
			}
			arc
		})
		.collect();
	if single {
		formatted.into_iter().next().unwrap_or_default()
	} else {
		format!("[{}]", formatted.join(", "))
	}
}

fn fmt_float(v: f64) -> String {
	if v.is_nan() {
		"nan".to_string()
	} else if v.is_infinite() {
		if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
	} else {
		format!("{}", v)
	}
}

fn fmt_f32(v: f32) -> String {
	if v.is_finite() {
		format!("{}", v)
	} else {
		fmt_float(v as f64)
	}
}

fn fmt_vec2f(v: &gf::Vec2f) -> String {
	format!("({}, {})", fmt_f32(v.x), fmt_f32(v.y))
}

fn fmt_vec3f(v: &gf::Vec3f) -> String {
	format!("({}, {}, {})", fmt_f32(v.x), fmt_f32(v.y), fmt_f32(v.z))
}

fn fmt_vec3d(v: &gf::Vec3d) -> String {
	format!("({}, {}, {})", fmt_float(v.x), fmt_float(v.y), fmt_float(v.z))
}

fn fmt_vec4f(v: &gf::Vec4f) -> String {
	format!("({}, {}, {}, {})", fmt_f32(v.x), fmt_f32(v.y), fmt_f32(v.z), fmt_f32(v.w))
}

fn format_value(value: &vt::Value) -> String {
	match value.store() {
		ValueStore::Empty => String::new(),
		ValueStore::ValueBlock => "None".to_string(),
		ValueStore::Bool(v) => v.to_string(),
		ValueStore::BoolArray(v) => format_list(v.iter().map(|b| b.to_string())),
		ValueStore::Int(v) => v.to_string(),
		ValueStore::IntArray(v) => format_list(v.iter().map(|i| i.to_string())),
		ValueStore::Int64(v) => v.to_string(),
		ValueStore::Half(v) => fmt_f32(v.to_f32()),
		ValueStore::Float(v) => fmt_f32(*v),
		ValueStore::FloatArray(v) => format_list(v.iter().map(|f| fmt_f32(*f))),
		ValueStore::Double(v) => fmt_float(*v),
		ValueStore::DoubleArray(v) => format_list(v.iter().map(|f| fmt_float(*f))),
		ValueStore::Vec2i(v) => format!("({}, {})", v.x, v.y),
		ValueStore::Vec2f(v) => fmt_vec2f(v),
		ValueStore::Vec2fArray(v) => format_list(v.iter().map(fmt_vec2f)),
		ValueStore::Vec2d(v) => format!("({}, {})", fmt_float(v.x), fmt_float(v.y)),
		ValueStore::Vec3i(v) => format!("({}, {}, {})", v.x, v.y, v.z),
		ValueStore::Vec3h(v) => fmt_vec3f(&gf::Vec3f::new(v.x.to_f32(), v.y.to_f32(), v.z.to_f32())),
		ValueStore::Vec3f(v) => fmt_vec3f(v),
		ValueStore::Vec3fArray(v) => format_list(v.iter().map(fmt_vec3f)),
		ValueStore::Vec3d(v) => fmt_vec3d(v),
		ValueStore::Vec3dArray(v) => format_list(v.iter().map(fmt_vec3d)),
		ValueStore::Vec4i(v) => format!("({}, {}, {}, {})", v.x, v.y, v.z, v.w),
		ValueStore::Vec4f(v) => fmt_vec4f(v),
		ValueStore::Vec4fArray(v) => format_list(v.iter().map(fmt_vec4f)),
		ValueStore::Vec4d(v) => format!(
			"({}, {}, {}, {})",
			fmt_float(v.x),
			fmt_float(v.y),
			fmt_float(v.z),
			fmt_float(v.w)
		),
		ValueStore::Quath(q) => format!(
			"({}, {}, {}, {})",
			fmt_f32(q.w.to_f32()),
			fmt_f32(q.i.to_f32()),
			fmt_f32(q.j.to_f32()),
			fmt_f32(q.k.to_f32())
		),
		ValueStore::Quatf(q) => format!(
			"({}, {}, {}, {})",
			fmt_f32(q.w),
			fmt_f32(q.i),
			fmt_f32(q.j),
			fmt_f32(q.k)
		),
		ValueStore::Quatd(q) => format!(
			"({}, {}, {}, {})",
			fmt_float(q.w),
			fmt_float(q.i),
			fmt_float(q.j),
			fmt_float(q.k)
		),
		ValueStore::Matrix4d(m) => format!(
			"( {} )",
			m.data
				.iter()
				.map(|row| format!(
					"({}, {}, {}, {})",
					fmt_float(row[0]),
					fmt_float(row[1]),
					fmt_float(row[2]),
					fmt_float(row[3])
				))
				.collect::<Vec<_>>()
				.join(", ")
		),
		ValueStore::Token(t) => quote(t.as_str()),
		ValueStore::TokenArray(v) => format_list(v.iter().map(|t| quote(t.as_str()))),
		ValueStore::String(s) => quote(s),
		ValueStore::StringArray(v) => format_list(v.iter().map(|s| quote(s))),
		ValueStore::TokenListOp(op) => format_list(op.ordered_elements().iter().map(|t| quote(t.as_str()))),
		ValueStore::StringListOp(op) => format_list(op.ordered_elements().iter().map(|s| quote(s))),
		ValueStore::PathListOp(op) => format_targets(&op.ordered_elements()),
		ValueStore::ReferenceListOp(op) => {
			let items = op.ordered_elements();
			format_arcs(items.iter().map(|r| (r.asset_path.as_str(), &r.prim_path)))
		}
		ValueStore::PayloadListOp(op) => {
			let items = op.ordered_elements();
			format_arcs(items.iter().map(|p| (p.asset_path.as_str(), &p.prim_path)))
		}
		ValueStore::Path(p) => format!("<{}>", p),
		ValueStore::PathArray(v) => format_list(v.iter().map(|p| format!("<{}>", p))),
		ValueStore::AssetPath(a) => format!("@{}@", a.authored_path),
		ValueStore::Specifier(s) => s.as_str().to_string(),
		ValueStore::Variability(v) => match v {
			sdf::Variability::Varying => "varying".to_string(),
			sdf::Variability::Uniform => "uniform".to_string(),
		},
		ValueStore::Dictionary(dict) => {
			let mut out = String::new();
			write_dictionary(&mut out, 0, dict);
			out
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	#[test]
	fn writes_layer_metadata_and_prims() {
		let layer = sdf::Layer::create_anonymous("writer");
		layer.set_default_prim(&t("World"));
		layer.set_root_field(&FIELD_KEYS.up_axis, t("Y"));
		layer.insert_sub_layer_path("./Geometry.usda", None);

		layer.create_prim_spec(&p("/World"), sdf::Specifier::Def, &t("Xform"));
		layer.set_field(&p("/World"), &FIELD_KEYS.kind, t("component"));
		let mut payloads = sdf::PayloadListOp::default();
		payloads.prepend(sdf::Payload::new("./Payload/Contents.usda", sdf::Path::empty_path()));
		layer.set_field(&p("/World"), &FIELD_KEYS.payload, payloads);

		layer.create_property_spec(&p("/World.size"), sdf::SpecType::Attribute, Some(&t("double")), false);
		layer.set_field(&p("/World.size"), &FIELD_KEYS.default, 2.0f64);

		let text = write_layer(&layer);
		assert!(text.starts_with("#usda 1.0\n"));
		assert!(text.contains("defaultPrim = \"World\""));
		assert!(text.contains("@./Geometry.usda@"));
		assert!(text.contains("def Xform \"World\" ("));
		assert!(text.contains("kind = \"component\""));
		assert!(text.contains("prepend payload = @./Payload/Contents.usda@"));
		assert!(text.contains("double size = 2"));
	}

	#[test]
	fn writes_connections_and_blocks() {
		let layer = sdf::Layer::create_anonymous("writer");
		layer.create_prim_spec(&p("/Mat"), sdf::Specifier::Def, &t("Material"));
		layer.create_property_spec(&p("/Mat.outputs:surface"), sdf::SpecType::Attribute, Some(&t("token")), false);
		layer.set_field(
			&p("/Mat.outputs:surface"),
			&FIELD_KEYS.connection_paths,
			sdf::PathListOp::explicit(vec![p("/Mat/Shader.outputs:surface")]),
		);
		layer.create_property_spec(&p("/Mat.inputs:opacity"), sdf::SpecType::Attribute, Some(&t("float")), false);
		layer.set_field(&p("/Mat.inputs:opacity"), &FIELD_KEYS.default, vt::Value::block());

		let text = write_layer(&layer);
		assert!(text.contains("token outputs:surface.connect = </Mat/Shader.outputs:surface>"));
		assert!(text.contains("float inputs:opacity = None"));
	}
}
