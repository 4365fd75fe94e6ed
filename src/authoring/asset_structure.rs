//! Layer layout of an atomic asset.
//!
//! An asset is authored as an interface layer that payloads a `Payload/Contents`
//! layer. The contents layer sublayers one content layer per domain, and
//! content layers reference prims from sibling library layers:
//!
//! ```text
//! Flower.usda                  interface, payload to ./Payload/Contents.usdc
//! Payload/Contents.usdc        sublayers ./Physics.usdc, ./Materials.usdc, ./Geometry.usdc
//! Payload/Geometry.usdc        content layer, references ./GeometryLibrary.usdc
//! Payload/GeometryLibrary.usdc library layer, `class` default prim
//! ```

use super::path_resolver::relative_identifier;
use super::stage_algo::{StageConfig, is_editable_prim_location, is_editable_prim_location_in};
use crate::{
	Error, Result, declare_public_tokens, kind, sdf, tf, tf_runtime_error, tf_warn, usd, usd::SchemaBase, usd_geom,
};
use std::path::{Path, PathBuf};

declare_public_tokens!(AssetTokens, ASSET_TOKENS, [
	asset: "Asset",
	contents: "Contents",
	geometry: "Geometry",
	library: "Library",
	materials: "Materials",
	payload: "Payload",
	physics: "Physics",
	textures: "Textures",
]);

pub fn asset_token() -> &'static tf::Token {
	&ASSET_TOKENS.asset
}

/// Name of the root layer of an asset payload.
pub fn contents_token() -> &'static tf::Token {
	&ASSET_TOKENS.contents
}

pub fn geometry_token() -> &'static tf::Token {
	&ASSET_TOKENS.geometry
}

/// Suffix of library layer names.
pub fn library_token() -> &'static tf::Token {
	&ASSET_TOKENS.library
}

pub fn materials_token() -> &'static tf::Token {
	&ASSET_TOKENS.materials
}

/// Name of the directory that holds the payload layers.
pub fn payload_token() -> &'static tf::Token {
	&ASSET_TOKENS.payload
}

pub fn physics_token() -> &'static tf::Token {
	&ASSET_TOKENS.physics
}

pub fn textures_token() -> &'static tf::Token {
	&ASSET_TOKENS.textures
}

/// Options of [`add_asset_content`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssetContentOptions {
	/// File extension of the content layer.
	pub format: String,
	pub file_format_args: sdf::FileFormatArguments,
	/// Insert the layer as the strongest sublayer instead of the weakest.
	pub prepend_layer: bool,
	/// Define a `Scope` named after the content below the default prim.
	pub create_scope: bool,
}

impl Default for AssetContentOptions {
	fn default() -> Self {
		Self {
			format: "usdc".to_string(),
			file_format_args: sdf::FileFormatArguments::new(),
			prepend_layer: true,
			create_scope: true,
		}
	}
}

/// `.usd` layers of an asset structure are written as text.
fn structure_format_arguments(format: &str, args: &sdf::FileFormatArguments) -> sdf::FileFormatArguments {
	let mut args = args.clone();
	if format == "usd" {
		args.entry(sdf::FORMAT_ARG.to_string())
			.or_insert_with(|| sdf::FileFormat::Usda.extension().to_string());
	}
	args
}

fn layer_identifier(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}

/// Return the directory of the edit target of `stage`, which new structure
/// layers are created relative to.
fn structure_directory(stage: &usd::Stage, role: &str, action: &str, requires_default_prim: bool) -> Result<PathBuf> {
	let fail = |reason: String| {
		let message = format!("Unable to {} due to {}", action, reason);
		tf_warn!("{}", message);
		Error::InvalidArgument(message)
	};

	let edit_target = stage.edit_target();
	let Some(path) = edit_target.real_path() else {
		return Err(fail(format!("an anonymous {} stage", role)));
	};
	if requires_default_prim && !stage.has_default_prim() {
		return Err(fail(format!("an invalid {} stage: it has no default prim", role)));
	}
	Ok(path.parent().map(Path::to_path_buf).unwrap_or_default())
}

/// Create the root layer of the asset payload at `Payload/Contents.<format>`
/// next to the edit target of `stage`.
///
/// The new stage has the same default prim name, metrics and authoring
/// metadata as `stage`, and its default prim is an `Xform`. Nothing is
/// payloaded yet; see [`add_asset_interface`].
pub fn create_asset_payload(
	stage: &usd::Stage,
	format: &str,
	file_format_args: &sdf::FileFormatArguments,
) -> Result<usd::Stage> {
	let directory = structure_directory(stage, "asset", "create the asset payload", true)?;
	let identifier = layer_identifier(
		&directory
			.join(payload_token().as_str())
			.join(format!("{}.{}", contents_token(), format)),
	);

	let config = StageConfig::from_stage(stage);
	let payload = config.create_stage(&identifier, &structure_format_arguments(format, file_format_args))?;
	let default_path = payload.default_prim().path().clone();
	usd_geom::Xform::define(&payload, default_path)?;
	Ok(payload)
}

/// Create the content layer `<name>.<format>` next to the edit target of
/// `stage` and add it to the sublayers of that edit target.
///
/// The content layer's default prim has the same name as the default prim of
/// `stage`, so its opinions land on the same prims once sublayered.
pub fn add_asset_content(stage: &usd::Stage, name: &str, options: &AssetContentOptions) -> Result<usd::Stage> {
	let directory = structure_directory(stage, "payload", "add asset content", true)?;
	if !sdf::Path::is_valid_identifier(name) {
		let message = format!(
			"Unable to add asset content due to an invalid content name: \"{}\" is not a valid identifier",
			name
		);
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let identifier = layer_identifier(&directory.join(format!("{}.{}", name, options.format)));
	let config = StageConfig::from_stage(stage);
	let content = config.create_stage(
		&identifier,
		&structure_format_arguments(&options.format, &options.file_format_args),
	)?;

	let edit_target = stage.edit_target();
	let sublayer = relative_identifier(content.root_layer().identifier(), edit_target.identifier());
	if !edit_target.sub_layer_paths().contains(&sublayer) {
		let index = options.prepend_layer.then_some(0);
		edit_target.insert_sub_layer_path(&sublayer, index);
	}

	if options.create_scope {
		let path = content.default_prim().path().append_child(&tf::Token::new(name));
		define_scope(&content, &path)?;
	}
	Ok(content)
}

/// Create the library layer `<name>Library.<format>` next to the edit target
/// of `stage`.
///
/// The library is not sublayered. Its default prim is named `name` and is a
/// `class`, so library prims are only ever seen through references.
pub fn add_asset_library(
	stage: &usd::Stage,
	name: &str,
	format: &str,
	file_format_args: &sdf::FileFormatArguments,
) -> Result<usd::Stage> {
	let directory = structure_directory(stage, "content", "add asset library", false)?;
	if !sdf::Path::is_valid_identifier(name) {
		let message = format!(
			"Unable to add asset library due to an invalid library name: \"{}\" is not a valid identifier",
			name
		);
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}

	let identifier = layer_identifier(&directory.join(format!("{}{}.{}", name, library_token(), format)));
	let config = StageConfig {
		default_prim_name: name.to_string(),
		..StageConfig::from_stage(stage)
	};
	let library = config.create_stage(&identifier, &structure_format_arguments(format, file_format_args))?;
	library.default_prim().set_specifier(sdf::Specifier::Class);
	Ok(library)
}

/// Payload the default prim of `source` into `stage`, making `stage` the
/// interface layer of the asset.
///
/// `stage` is reconfigured with the default prim name, metrics and authoring
/// metadata of `source`. The default prim becomes a `component` model with
/// an extents hint covering the payloaded content.
pub fn add_asset_interface(stage: &usd::Stage, source: &usd::Stage) -> Result<()> {
	let fail = |reason: &str| {
		let message = format!("Unable to add asset interface due to {}", reason);
		tf_warn!("{}", message);
		Error::InvalidArgument(message)
	};
	if stage.edit_target().is_anonymous() {
		return Err(fail("an anonymous stage"));
	}
	if source.root_layer().is_anonymous() {
		return Err(fail("an anonymous source stage"));
	}
	if !source.has_default_prim() {
		return Err(fail("an invalid source stage: it has no default prim"));
	}

	StageConfig::from_stage(source).configure(stage)?;

	let path = stage.default_prim().path().clone();
	let prim = define_payload(stage, &path, &source.default_prim())?;
	usd::ModelApi::new(prim.clone()).set_kind(&kind::KIND_TOKENS.component)?;

	let model = usd_geom::GeomModelApi::apply(&prim).ok_or_else(|| {
		let message = format!("Unable to apply GeomModelAPI to <{}>", prim.path());
		tf_runtime_error!("{}", message);
		Error::Authority(message)
	})?;
	let mut cache = usd_geom::BBoxCache::new(usd_geom::ordered_purpose_tokens());
	model.set_extents_hint(model.compute_extents_hint(&mut cache));
	Ok(())
}

/// Define a `Scope` at `path`.
pub fn define_scope<'a>(stage: &'a usd::Stage, path: &sdf::Path) -> Result<usd_geom::Scope<'a>> {
	if let Err(reason) = is_editable_prim_location(stage, path) {
		let message = format!("Unable to define UsdGeomScope due to an invalid location: {}", reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	usd_geom::Scope::define(stage, path.clone()).inspect_err(|err| {
		tf_runtime_error!("Unable to define UsdGeomScope at \"{}\": {}", path, err);
	})
}

/// Define a `Scope` named `name` below `parent`.
pub fn define_scope_in<'a>(parent: &usd::Prim<'a>, name: &str) -> Result<usd_geom::Scope<'a>> {
	if let Err(reason) = is_editable_prim_location_in(parent, name) {
		let message = format!("Unable to define UsdGeomScope due to an invalid location: {}", reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	define_scope(parent.stage(), &parent.path().append_child(&tf::Token::new(name)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcKind {
	Reference,
	Payload,
}

impl ArcKind {
	fn label(self) -> &'static str {
		match self {
			ArcKind::Reference => "UsdReference",
			ArcKind::Payload => "UsdPayload",
		}
	}
}

fn define_arc<'a>(stage: &'a usd::Stage, path: &sdf::Path, source: &usd::Prim, arc: ArcKind) -> Result<usd::Prim<'a>> {
	let fail = |reason: String| {
		let message = format!("Unable to define {} at \"{}\" due to {}", arc.label(), path, reason);
		tf_runtime_error!("{}", message);
		message
	};

	if let Err(reason) = is_editable_prim_location(stage, path) {
		return Err(Error::InvalidArgument(fail(format!("an invalid location: {}", reason))));
	}
	if !source.is_valid() || source.is_pseudo_root() {
		return Err(Error::InvalidArgument(fail("an invalid source prim".to_string())));
	}

	let source_stage = source.stage();
	let source_layer = source_stage.root_layer();
	let internal = source_layer.identifier() == stage.root_layer().identifier();
	let asset_path = if internal {
		if source.path() == path {
			return Err(Error::Structure(fail(format!(
				"the source prim <{}> pointing to itself",
				source.path()
			))));
		}
		String::new()
	} else {
		let edit_target = stage.edit_target();
		if edit_target.is_anonymous() {
			return Err(Error::InvalidArgument(fail("an anonymous referencing stage".to_string())));
		}
		if source_layer.is_anonymous() {
			return Err(Error::InvalidArgument(fail("an anonymous source stage".to_string())));
		}
		relative_identifier(source_layer.identifier(), edit_target.identifier())
	};

	// The default prim is targeted implicitly.
	let prim_path = if source_stage.has_default_prim() && source_stage.default_prim().path() == source.path() {
		sdf::Path::empty_path()
	} else {
		source.path().clone()
	};

	let prim = stage
		.define_prim(path.clone(), &source.type_name())
		.map_err(|err| Error::Authority(fail(err.to_string())))?;
	prim.set_specifier(source.specifier());

	let added = match arc {
		ArcKind::Reference => prim.references().add(sdf::Reference::new(asset_path, prim_path)),
		ArcKind::Payload => prim.payloads().add(sdf::Payload::new(asset_path, prim_path)),
	};
	if !added {
		return Err(Error::Authority(fail("a failure to author the arc".to_string())));
	}
	Ok(prim)
}

fn define_arc_in<'a>(
	parent: &usd::Prim<'a>,
	source: &usd::Prim,
	name: Option<&str>,
	arc: ArcKind,
) -> Result<usd::Prim<'a>> {
	let source_name = source.name();
	let name = name.unwrap_or(source_name.as_str());
	if let Err(reason) = is_editable_prim_location_in(parent, name) {
		let message = format!("Unable to define {} due to an invalid location: {}", arc.label(), reason);
		tf_runtime_error!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	define_arc(parent.stage(), &parent.path().append_child(&tf::Token::new(name)), source, arc)
}

/// Define a prim at `path` that references `source`.
///
/// The prim takes the type name and specifier of `source`. A source on
/// another layer is addressed relative to the edit target, a source on the
/// same root layer is referenced internally, and a source that is its
/// stage's default prim is targeted without a prim path.
pub fn define_reference<'a>(stage: &'a usd::Stage, path: &sdf::Path, source: &usd::Prim) -> Result<usd::Prim<'a>> {
	define_arc(stage, path, source, ArcKind::Reference)
}

/// Define a prim below `parent` that references `source`, named `name` or
/// after the source prim.
pub fn define_reference_in<'a>(
	parent: &usd::Prim<'a>,
	source: &usd::Prim,
	name: Option<&str>,
) -> Result<usd::Prim<'a>> {
	define_arc_in(parent, source, name, ArcKind::Reference)
}

/// Define a prim at `path` that payloads `source`. See [`define_reference`].
pub fn define_payload<'a>(stage: &'a usd::Stage, path: &sdf::Path, source: &usd::Prim) -> Result<usd::Prim<'a>> {
	define_arc(stage, path, source, ArcKind::Payload)
}

pub fn define_payload_in<'a>(parent: &usd::Prim<'a>, source: &usd::Prim, name: Option<&str>) -> Result<usd::Prim<'a>> {
	define_arc_in(parent, source, name, ArcKind::Payload)
}
