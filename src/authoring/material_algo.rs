//! Materials built from `UsdPreviewSurface` shader networks.
//!
//! [`define_preview_material`] authors a material whose universal surface is
//! a `PreviewSurface` shader. Texture readers, primvar readers and a material
//! interface can then be added on top of it. Every texture reader samples the
//! `st` primvar through one shared `TexCoordReader` shader.

use super::stage_algo::{is_editable_prim, is_editable_prim_location, is_editable_prim_location_in};
use crate::{
	Error, Result, gf, sdf, sdf::VALUE_TYPE_NAMES, tf, tf_runtime_error, tf_warn, usd, usd::SchemaBase,
	usd_shade::{self, ConnectableApi, Input, Material, Shader},
	vt,
};

mod tokens {
	use crate::{declare_public_tokens, tf};

	declare_public_tokens!(Tokens, TOKENS, [
		color_space_auto: "auto",
		color_space_raw: "raw",
		color_space_srgb: "sRGB",

		ups_id: "UsdPreviewSurface",
		uv_reader_id: "UsdPrimvarReader_float2",
		uv_tex_id: "UsdUVTexture",

		ups_name: "PreviewSurface",
		uv_reader_name: "TexCoordReader",
		diffuse_texture_name: "DiffuseTexture",
		normal_texture_name: "NormalTexture",
		orm_texture_name: "ORMTexture",
		roughness_texture_name: "RoughnessTexture",
		metallic_texture_name: "MetallicTexture",
		opacity_texture_name: "OpacityTexture",

		diffuse_color: "diffuseColor",
		normal: "normal",
		occlusion: "occlusion",
		metallic: "metallic",
		roughness: "roughness",
		opacity: "opacity",
		opacity_threshold: "opacityThreshold",
		ior: "ior",

		file: "file",
		source_color_space: "sourceColorSpace",
		st: "st",
		fallback: "fallback",
		scale: "scale",
		bias: "bias",
		rgb: "rgb",
		r: "r",
		g: "g",
		b: "b",

		varname: "varname",
		result: "result",
	]);
}

use tokens::TOKENS;

/// Extensions of textures assumed to hold 8-bit channels.
const EIGHT_BIT_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tga", "gif"];

/// Color space of the texels of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
	/// Let the renderer decide from the texture's metadata.
	#[default]
	Auto,
	/// Data textures: normals, roughness, masks.
	Raw,
	Srgb,
}

/// Return the `sourceColorSpace` token of `color_space`.
pub fn color_space_token(color_space: ColorSpace) -> &'static tf::Token {
	match color_space {
		ColorSpace::Auto => &TOKENS.color_space_auto,
		ColorSpace::Raw => &TOKENS.color_space_raw,
		ColorSpace::Srgb => &TOKENS.color_space_srgb,
	}
}

fn to_linear(value: f32) -> f32 {
	if value <= 0.04045 {
		value / 12.92
	} else {
		((value + 0.055) / 1.055).powf(2.4)
	}
}

fn from_linear(value: f32) -> f32 {
	let test = value * 12.92;
	if test <= 0.04045 {
		test
	} else {
		value.powf(1.0 / 2.4) * 1.055 - 0.055
	}
}

/// Convert an sRGB encoded color to linear.
pub fn srgb_to_linear(color: gf::Vec3f) -> gf::Vec3f {
	gf::Vec3f::new(to_linear(color.x), to_linear(color.y), to_linear(color.z))
}

/// Convert a linear color to sRGB encoding.
pub fn linear_to_srgb(color: gf::Vec3f) -> gf::Vec3f {
	gf::Vec3f::new(from_linear(color.x), from_linear(color.y), from_linear(color.z))
}

/// Define an empty material named `name` below `parent`.
pub fn create_material<'a>(parent: &usd::Prim<'a>, name: &str) -> Result<Material<'a>> {
	if let Err(reason) = is_editable_prim_location_in(parent, name) {
		let message = format!("Unable to create UsdShadeMaterial due to an invalid location: {}", reason);
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	let path = parent.path().append_child(&tf::Token::new(name));
	Material::define(parent.stage(), path)
}

/// Check that `material` may be bound to `prim` at the edit target.
pub(super) fn validate_binding(prim: &usd::Prim, material: &Material) -> Result<()> {
	let message = match (prim.is_valid(), material.is_valid()) {
		(false, false) => Some(format!(
			"UsdPrim <{}> and UsdShadeMaterial <{}> are not valid, cannot bind material to prim",
			prim.path(),
			material.path()
		)),
		(true, false) => Some(format!(
			"UsdShadeMaterial <{}> is not valid, cannot bind material to prim",
			material.path()
		)),
		(false, true) => Some(format!("UsdPrim <{}> is not valid, cannot bind material to prim", prim.path())),
		(true, true) => None,
	};
	if let Some(message) = message {
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	if let Err(reason) = is_editable_prim(prim) {
		let message = format!("Unable to bind material to <{}>: {}", prim.path(), reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	Ok(())
}

/// Bind `material` directly to `prim`.
pub fn bind_material(prim: &usd::Prim, material: &Material) -> Result<()> {
	validate_binding(prim, material)?;
	let bound = usd_shade::MaterialBindingApi::apply(prim).is_some_and(|binding| binding.bind(material));
	if !bound {
		let message = format!("Unable to bind <{}> to <{}>", material.path(), prim.path());
		tf_runtime_error!("{}", message);
		return Err(Error::Authority(message));
	}
	Ok(())
}

/// Return the shader driving the universal surface output of `material`.
pub fn compute_effective_preview_surface_shader<'a>(material: &Material<'a>) -> Option<Shader<'a>> {
	if !material.is_valid() {
		return None;
	}
	material.compute_surface_source(&[])
}

fn check_unit_range(name: &str, value: f32) -> std::result::Result<(), String> {
	if (0.0..=1.0).contains(&value) {
		Ok(())
	} else {
		Err(format!("{} value {:.6} is outside range [0.0 - 1.0].", name, value))
	}
}

/// Define a material at `path` driven by a `UsdPreviewSurface` shader.
///
/// `opacity`, `roughness` and `metallic` must lie in `[0, 1]`; nothing is
/// authored when one does not.
pub fn define_preview_material<'a>(
	stage: &'a usd::Stage,
	path: &sdf::Path,
	color: gf::Vec3f,
	opacity: f32,
	roughness: f32,
	metallic: f32,
) -> Result<Material<'a>> {
	if let Err(reason) = is_editable_prim_location(stage, path) {
		let message = format!("Unable to define UsdShadeMaterial due to an invalid location: {}", reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let parameters = check_unit_range("Opacity", opacity)
		.and_then(|_| check_unit_range("Roughness", roughness))
		.and_then(|_| check_unit_range("Metallic", metallic));
	if let Err(reason) = parameters {
		let message = format!(
			"Unable to define UsdShadeMaterial at \"{}\" due to an invalid shader parameter value: {}",
			path, reason
		);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let material = Material::define(stage, path.clone()).inspect_err(|err| {
		tf_runtime_error!("Unable to define UsdShadeMaterial at \"{}\": {}", path, err);
	})?;
	if is_editable_prim_location_in(&material, TOKENS.ups_name.as_str()).is_err() {
		let message = format!(
			"Unable to define UsdShadeShader named \"{}\" as a child of \"{}\"",
			TOKENS.ups_name, path
		);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let shader = Shader::define(stage, path.append_child(&TOKENS.ups_name))?;
	shader.set_shader_id(&TOKENS.ups_id);
	let universal = &usd_shade::TOKENS.universal_render_context;
	let surface = shader.create_output(&usd_shade::TOKENS.surface, &VALUE_TYPE_NAMES.token);
	material.create_surface_output(universal).connect_to_source(surface.path());
	let displacement = shader.create_output(&usd_shade::TOKENS.displacement, &VALUE_TYPE_NAMES.token);
	material.create_displacement_output(universal).connect_to_source(displacement.path());

	shader.create_input(&TOKENS.diffuse_color, &VALUE_TYPE_NAMES.color3f).set(color);
	shader.create_input(&TOKENS.opacity, &VALUE_TYPE_NAMES.float).set(opacity);
	shader.create_input(&TOKENS.roughness, &VALUE_TYPE_NAMES.float).set(roughness);
	shader.create_input(&TOKENS.metallic, &VALUE_TYPE_NAMES.float).set(metallic);
	Ok(material)
}

/// Define a preview material named `name` below `parent`. See [`define_preview_material`].
pub fn define_preview_material_in<'a>(
	parent: &usd::Prim<'a>,
	name: &str,
	color: gf::Vec3f,
	opacity: f32,
	roughness: f32,
	metallic: f32,
) -> Result<Material<'a>> {
	if let Err(reason) = is_editable_prim_location_in(parent, name) {
		let message = format!("Unable to define UsdShadeMaterial due to an invalid location: {}", reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	let path = parent.path().append_child(&tf::Token::new(name));
	define_preview_material(parent.stage(), &path, color, opacity, roughness, metallic)
}

/// Return the `UsdPreviewSurface` shader of `material`.
fn preview_surface<'a>(material: &Material<'a>) -> Result<Shader<'a>> {
	compute_effective_preview_surface_shader(material)
		.filter(|shader| shader.shader_id().as_ref() == Some(&TOKENS.ups_id))
		.ok_or_else(|| {
			let message = format!(
				"Material <{}> must first be defined using define_preview_material()",
				material.path()
			);
			tf_warn!("{}", message);
			Error::Structure(message)
		})
}

/// Return the input `name` of `surface`, authoring `default` when it does
/// not exist, along with its current value.
fn float_input<'a>(surface: &Shader<'a>, name: &tf::Token, default: f32) -> (Input<'a>, f32) {
	let input = surface.input(name).unwrap_or_else(|| {
		let input = surface.create_input(name, &VALUE_TYPE_NAMES.float);
		input.set(default);
		input
	});
	let value = input.get::<f32>().unwrap_or(default);
	(input, value)
}

fn define_shader<'a>(material: &Material<'a>, name: &tf::Token, id: &tf::Token) -> Result<Shader<'a>> {
	let path = material.path().append_child(name);
	let shader = Shader::get(material.stage(), path.clone())
		.map(Ok)
		.unwrap_or_else(|| Shader::define(material.stage(), path.clone()))
		.map_err(|err| {
			let message = format!("Cannot add shader <{}> to <{}>: {}", path, material.path(), err);
			tf_runtime_error!("{}", message);
			Error::Authority(message)
		})?;
	shader.set_shader_id(id);
	Ok(shader)
}

/// Find or create the `st` reader shared by every texture of `material`.
fn acquire_tex_coord_reader<'a>(material: &Material<'a>) -> Result<Shader<'a>> {
	let reader = define_shader(material, &TOKENS.uv_reader_name, &TOKENS.uv_reader_id)?;
	reader
		.create_input(&TOKENS.varname, &VALUE_TYPE_NAMES.token)
		.set(TOKENS.st.clone());
	reader.create_output(&TOKENS.result, &VALUE_TYPE_NAMES.float2);
	Ok(reader)
}

fn acquire_texture_reader<'a>(
	material: &Material<'a>,
	name: &tf::Token,
	texture: &sdf::AssetPath,
	color_space: ColorSpace,
	fallback: gf::Vec4f,
) -> Result<Shader<'a>> {
	let uv_reader = acquire_tex_coord_reader(material)?;
	let uv = uv_reader.create_output(&TOKENS.result, &VALUE_TYPE_NAMES.float2);

	let reader = define_shader(material, name, &TOKENS.uv_tex_id)?;
	reader.create_input(&TOKENS.fallback, &VALUE_TYPE_NAMES.float4).set(fallback);
	reader.create_input(&TOKENS.file, &VALUE_TYPE_NAMES.asset).set(texture.clone());
	reader
		.create_input(&TOKENS.source_color_space, &VALUE_TYPE_NAMES.token)
		.set(color_space_token(color_space).clone());
	reader
		.create_input(&TOKENS.st, &VALUE_TYPE_NAMES.float2)
		.connect_to_source(uv.path());
	Ok(reader)
}

fn is_eight_bit_texture(texture: &sdf::AssetPath) -> bool {
	std::path::Path::new(&texture.authored_path)
		.extension()
		.and_then(|extension| extension.to_str())
		.is_some_and(|extension| {
			EIGHT_BIT_EXTENSIONS
				.iter()
				.any(|known| known.eq_ignore_ascii_case(extension))
		})
}

/// Drive the diffuse color of a preview material with a color texture. The
/// current diffuse color becomes the texture's fallback.
pub fn add_diffuse_texture_to_preview_material(material: &Material, texture: &sdf::AssetPath) -> Result<()> {
	let surface = preview_surface(material)?;
	let input = surface.input(&TOKENS.diffuse_color).unwrap_or_else(|| {
		let input = surface.create_input(&TOKENS.diffuse_color, &VALUE_TYPE_NAMES.color3f);
		input.set(gf::Vec3f::default());
		input
	});
	let color = input.get::<gf::Vec3f>().unwrap_or_default();
	let fallback = gf::Vec4f::new(color.x, color.y, color.z, 1.0);

	let reader = acquire_texture_reader(
		material,
		&TOKENS.diffuse_texture_name,
		texture,
		ColorSpace::Auto,
		fallback,
	)?;
	input.connect_to_source(reader.create_output(&TOKENS.rgb, &VALUE_TYPE_NAMES.float3).path());
	Ok(())
}

/// Drive the normal of a preview material with a tangent space normal map.
///
/// Textures with 8-bit channels get a scale and bias that map `[0, 1]` to
/// `[-1, 1]`.
pub fn add_normal_texture_to_preview_material(material: &Material, texture: &sdf::AssetPath) -> Result<()> {
	let surface = preview_surface(material)?;
	let fallback = gf::Vec4f::new(0.0, 0.0, 1.0, 1.0);
	let reader = acquire_texture_reader(
		material,
		&TOKENS.normal_texture_name,
		texture,
		ColorSpace::Raw,
		fallback,
	)?;

	let output = reader.create_output(&TOKENS.rgb, &VALUE_TYPE_NAMES.float3);
	surface
		.create_input(&TOKENS.normal, &VALUE_TYPE_NAMES.normal3f)
		.connect_to_source(output.path());

	if is_eight_bit_texture(texture) {
		reader
			.create_input(&TOKENS.scale, &VALUE_TYPE_NAMES.float4)
			.set(gf::Vec4f::new(2.0, 2.0, 2.0, 1.0));
		reader
			.create_input(&TOKENS.bias, &VALUE_TYPE_NAMES.float4)
			.set(gf::Vec4f::new(-1.0, -1.0, -1.0, 0.0));
	}
	Ok(())
}

/// Drive occlusion, roughness and metallic of a preview material with the
/// red, green and blue channels of one texture.
pub fn add_orm_texture_to_preview_material(material: &Material, texture: &sdf::AssetPath) -> Result<()> {
	let surface = preview_surface(material)?;
	let occlusion = surface.create_input(&TOKENS.occlusion, &VALUE_TYPE_NAMES.float);
	let (roughness_input, roughness) = float_input(&surface, &TOKENS.roughness, 0.5);
	let (metallic_input, metallic) = float_input(&surface, &TOKENS.metallic, 0.0);
	let fallback = gf::Vec4f::new(1.0, roughness, metallic, 1.0);

	let reader = acquire_texture_reader(material, &TOKENS.orm_texture_name, texture, ColorSpace::Raw, fallback)?;
	occlusion.connect_to_source(reader.create_output(&TOKENS.r, &VALUE_TYPE_NAMES.float).path());
	roughness_input.connect_to_source(reader.create_output(&TOKENS.g, &VALUE_TYPE_NAMES.float).path());
	metallic_input.connect_to_source(reader.create_output(&TOKENS.b, &VALUE_TYPE_NAMES.float).path());
	Ok(())
}

fn add_single_channel_texture(
	material: &Material,
	texture: &sdf::AssetPath,
	reader_name: &tf::Token,
	input_name: &tf::Token,
	default: f32,
) -> Result<()> {
	let surface = preview_surface(material)?;
	let (input, value) = float_input(&surface, input_name, default);
	let fallback = gf::Vec4f::new(value, 0.0, 0.0, 1.0);
	let reader = acquire_texture_reader(material, reader_name, texture, ColorSpace::Raw, fallback)?;
	input.connect_to_source(reader.create_output(&TOKENS.r, &VALUE_TYPE_NAMES.float).path());
	Ok(())
}

/// Drive the roughness of a preview material with the red channel of a texture.
pub fn add_roughness_texture_to_preview_material(material: &Material, texture: &sdf::AssetPath) -> Result<()> {
	add_single_channel_texture(material, texture, &TOKENS.roughness_texture_name, &TOKENS.roughness, 0.5)
}

/// Drive the metallic of a preview material with the red channel of a texture.
pub fn add_metallic_texture_to_preview_material(material: &Material, texture: &sdf::AssetPath) -> Result<()> {
	add_single_channel_texture(material, texture, &TOKENS.metallic_texture_name, &TOKENS.metallic, 0.0)
}

/// Drive the opacity of a preview material with the red channel of a texture.
///
/// The surface gets an `ior` of 1 and the smallest positive opacity
/// threshold, so the texture cuts geometry out.
pub fn add_opacity_texture_to_preview_material(material: &Material, texture: &sdf::AssetPath) -> Result<()> {
	add_single_channel_texture(material, texture, &TOKENS.opacity_texture_name, &TOKENS.opacity, 1.0)?;
	let surface = preview_surface(material)?;
	surface.create_input(&TOKENS.ior, &VALUE_TYPE_NAMES.float).set(1.0f32);
	surface
		.create_input(&TOKENS.opacity_threshold, &VALUE_TYPE_NAMES.float)
		.set(f32::EPSILON);
	Ok(())
}

/// Return the `UsdPrimvarReader_<type>` suffix reading values of `type_name`.
fn primvar_reader_type(type_name: &tf::Token) -> Option<&'static str> {
	Some(match type_name.as_str() {
		"float" => "float",
		"float2" | "texCoord2f" => "float2",
		"float3" | "color3f" => "float3",
		"float4" | "color4f" => "float4",
		"int" => "int",
		"string" | "token" => "string",
		"normal3f" => "normal",
		"point3f" => "point",
		"vector3f" => "vector",
		"matrix4d" => "matrix",
		_ => return None,
	})
}

fn fallback_matches(reader_type: &str, value: &vt::Value) -> bool {
	match reader_type {
		"float" => value.is::<f32>(),
		"float2" => value.is::<gf::Vec2f>(),
		"float3" | "normal" | "point" | "vector" => value.is::<gf::Vec3f>(),
		"float4" => value.is::<gf::Vec4f>(),
		"int" => value.is::<i32>(),
		"string" => value.is::<String>(),
		"matrix" => value.is::<gf::Matrix4d>(),
		_ => false,
	}
}

/// Connect the surface input `input_name` of a preview material to a reader
/// of the primvar `primvar_name`.
///
/// Readers are shared per primvar and value type, and are named after the
/// primvar with namespace delimiters removed, e.g. `displayColorPrimvarReader`.
/// A `fallback` of the wrong type is skipped with a warning.
pub fn add_primvar_shader_to_preview_material(
	material: &Material,
	input_name: &str,
	primvar_name: &str,
	fallback: Option<vt::Value>,
) -> Result<()> {
	let fail = |reason: String| {
		let message = format!(
			"Unable to connect input \"{}\" of <{}> to primvar \"{}\": {}",
			input_name,
			material.path(),
			primvar_name,
			reason
		);
		tf_runtime_error!("{}", message);
		Error::Structure(message)
	};

	let surface = preview_surface(material)?;
	let Some(input) = surface.input(&tf::Token::new(input_name)) else {
		return Err(fail(format!("the input does not exist on <{}>", surface.path())));
	};
	let base_name: String = primvar_name.chars().filter(|c| *c != ':').collect();
	if !sdf::Path::is_valid_identifier(&base_name) {
		return Err(fail(format!("\"{}\" is not a valid primvar name", primvar_name)));
	}
	let type_name = input.type_name();
	let Some(reader_type) = primvar_reader_type(&type_name) else {
		return Err(fail(format!("no primvar reader supports values of type \"{}\"", type_name)));
	};
	if input.connectability() == usd_shade::TOKENS.interface_only {
		return Err(fail("the input can only connect to the material interface".to_string()));
	}

	let reader_id = tf::Token::new(format!("UsdPrimvarReader_{}", reader_type));
	let mut reader_name = tf::Token::new(format!("{}PrimvarReader", base_name));
	let taken = Shader::get(material.stage(), material.path().append_child(&reader_name))
		.is_some_and(|existing| existing.shader_id().as_ref() != Some(&reader_id));
	if taken {
		reader_name = tf::Token::new(format!("{}PrimvarReader_{}", base_name, reader_type));
	}

	let reader = define_shader(material, &reader_name, &reader_id)?;
	reader
		.create_input(&TOKENS.varname, &VALUE_TYPE_NAMES.token)
		.set(tf::Token::new(primvar_name));
	if let Some(fallback) = fallback {
		if fallback_matches(reader_type, &fallback) {
			reader.create_input(&TOKENS.fallback, &type_name).set(fallback);
		} else {
			tf_warn!(
				"Fallback value for <{}> does not match the reader type \"{}\", it is not authored",
				reader.path(),
				reader_type
			);
		}
	}
	let output = reader.create_output(&TOKENS.result, &type_name);
	input.connect_to_source(output.path());
	Ok(())
}

fn source_shader<'a>(stage: &'a usd::Stage, input: &Input) -> Option<Shader<'a>> {
	input
		.connected_sources()
		.into_iter()
		.find_map(|source| Shader::from_prim(stage.prim_at_path(source.prim_path())))
}

/// Promote the authored values of a preview material's surface shader, and
/// of the texture readers connected to it, to inputs on the material.
///
/// Surface inputs keep their names; reader inputs are named
/// `<Reader>:<input>`. The shader inputs are left with only a connection to
/// the new material input. Inputs that are already connected are skipped, so
/// repeated calls only promote new values.
pub fn add_preview_material_interface(material: &Material) -> Result<()> {
	let outputs = material.effective_surface_outputs();
	if outputs.len() != 1 {
		let message = format!(
			"Unable to add a material interface to <{}>: it has {} effective surface outputs, exactly one is required",
			material.path(),
			outputs.len()
		);
		tf_runtime_error!("{}", message);
		return Err(Error::Structure(message));
	}

	let stage = material.stage();
	let Some(surface) = outputs[0]
		.connected_sources()
		.into_iter()
		.find_map(|source| Shader::from_prim(stage.prim_at_path(source.prim_path())))
	else {
		let message = format!("Unable to find the surface shader of <{}>", material.path());
		tf_runtime_error!("{}", message);
		return Err(Error::Structure(message));
	};

	let mut shaders = vec![(surface.clone(), None)];
	for input in surface.inputs() {
		if let Some(reader) = source_shader(stage, &input) {
			if !shaders.iter().any(|(shader, _)| *shader == reader) {
				let name = reader.name();
				shaders.push((reader, Some(name)));
			}
		}
	}

	for (shader, prefix) in &shaders {
		for input in shader.inputs() {
			if input.has_connected_source() || !input.has_authored_value() {
				continue;
			}
			let Some(value) = input.get_value() else {
				continue;
			};
			let name = match prefix {
				Some(prefix) => tf::Token::new(format!("{}:{}", prefix, input.base_name())),
				None => input.base_name(),
			};
			let interface = material.create_input(&name, &input.type_name());
			interface.set(value);
			input.connect_to_source(interface.path());
			input.clear();
			if input.has_authored_value() {
				input.block();
			}
		}
	}
	Ok(())
}

fn material_shaders<'a>(prim: &usd::Prim<'a>, shaders: &mut Vec<Shader<'a>>) {
	for child in prim.children() {
		if let Some(shader) = Shader::from_prim(child.clone()) {
			shaders.push(shader);
		}
		material_shaders(&child, shaders);
	}
}

/// Remove the inputs of `material` and disconnect the shader inputs that
/// consume them.
///
/// With `bake_values`, each consumer receives the value it resolved through
/// the interface; otherwise its value is cleared. Interface inputs the edit
/// target cannot remove are blocked instead.
pub fn remove_material_interface(material: &Material, bake_values: bool) -> Result<()> {
	if !material.is_valid() {
		let message = format!("Unable to remove the interface of invalid material <{}>", material.path());
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let mut shaders = Vec::new();
	material_shaders(material, &mut shaders);

	for interface in material.inputs() {
		let value = interface.get_value();
		let consumers = shaders
			.iter()
			.flat_map(|shader| shader.inputs())
			.filter(|input| input.connected_sources().contains(interface.path()));

		for consumer in consumers {
			consumer.disconnect_source();
			match (&value, bake_values) {
				(Some(value), true) => {
					consumer.set(value.clone());
				}
				_ => {
					consumer.clear();
					if consumer.has_authored_value() {
						consumer.block();
					}
				}
			}
		}

		if interface.has_spec_authority() {
			interface.remove_spec();
		} else {
			interface.block();
		}
	}
	Ok(())
}
