//! Stage creation, configuration and saving, and the prim location checks
//! shared by every authoring operation.

use super::layer_algo::{
	default_authoring_metadata, has_layer_authoring_metadata, layer_authoring_metadata, set_layer_authoring_metadata,
};
use crate::{Error, Result, sdf, tf, tf_status, tf_warn, usd, usd::SchemaBase, usd_geom};
use serde::{Deserialize, Serialize};

/// Check that `path` is a location where a prim may be authored on `stage`.
///
/// The error holds the reason, e.g. `"/A/B" is an instance proxy, authoring is not allowed.`
pub fn is_editable_prim_location(stage: &usd::Stage, path: &sdf::Path) -> std::result::Result<(), String> {
	if !path.is_absolute_prim_path() {
		return Err(format!("\"{}\" is not a valid absolute prim path.", path));
	}
	let prim = stage.prim_at_path(path.clone());
	if prim.is_valid() && prim.is_instance_proxy() {
		return Err(format!("\"{}\" is an instance proxy, authoring is not allowed.", path));
	}
	Ok(())
}

/// Check that a child prim named `name` may be authored below `parent`.
pub fn is_editable_prim_location_in(parent: &usd::Prim, name: &str) -> std::result::Result<(), String> {
	if !parent.is_valid() {
		return Err("Invalid UsdPrim".to_string());
	}
	if parent.is_instance_proxy() {
		return Err(format!("\"{}\" is an instance proxy, authoring is not allowed.", parent.path()));
	}
	if !sdf::Path::is_valid_identifier(name) {
		return Err(format!("\"{}\" is not a valid prim name", name));
	}
	let path = parent.path().append_child(&tf::Token::new(name));
	let prim = parent.stage().prim_at_path(path.clone());
	if prim.is_valid() && prim.is_instance_proxy() {
		return Err(format!("\"{}\" is an instance proxy, authoring is not allowed.", path));
	}
	Ok(())
}

/// Check that `prim` itself may be edited.
pub fn is_editable_prim(prim: &usd::Prim) -> std::result::Result<(), String> {
	if !prim.is_valid() {
		return Err("Invalid UsdPrim".to_string());
	}
	if prim.is_instance_proxy() {
		return Err(format!("\"{}\" is an instance proxy, authoring is not allowed.", prim.path()));
	}
	Ok(())
}

fn validate_stage_metrics(up_axis: &tf::Token, linear_units: f64) -> std::result::Result<tf::Token, String> {
	let axis = match up_axis.as_str() {
		"Y" | "y" => usd_geom::TOKENS.y.clone(),
		"Z" | "z" => usd_geom::TOKENS.z.clone(),
		other => return Err(format!("Unsupported up axis value \"{}\"", other)),
	};
	if !(linear_units > 0.0) {
		return Err(format!(
			"Linear units value must be greater than zero, received {:.6}",
			linear_units
		));
	}
	Ok(axis)
}

fn unchecked_configure(
	stage: &usd::Stage,
	default_prim_name: &str,
	up_axis: &tf::Token,
	linear_units: f64,
	authoring_metadata: Option<&str>,
) -> Result<()> {
	usd_geom::set_stage_meters_per_unit(stage, linear_units)?;
	usd_geom::set_stage_up_axis(stage, up_axis)?;

	let layer = stage.root_layer();
	let name = tf::Token::new(default_prim_name);
	let path = sdf::Path::absolute_root_path().append_child(&name);
	if !layer.has_spec(&path) {
		layer.create_prim_spec(&path, sdf::Specifier::Def, &usd_geom::Scope::schema_type());
	}
	layer.set_default_prim(&name);

	if let Some(metadata) = authoring_metadata {
		set_layer_authoring_metadata(layer, metadata);
	}
	Ok(())
}

/// Create a new stage at `identifier`, configure it and write it to disk.
///
/// Without `authoring_metadata`, the root layer is stamped with
/// [`default_authoring_metadata`].
pub fn create_stage(
	identifier: &str,
	default_prim_name: &str,
	up_axis: &tf::Token,
	linear_units: f64,
	authoring_metadata: Option<&str>,
	file_format_args: &sdf::FileFormatArguments,
) -> Result<usd::Stage> {
	let fail = |reason: String| {
		let message = format!("Unable to create UsdStage at \"{}\" due to {}", identifier, reason);
		tf_warn!("{}", message);
		Error::InvalidArgument(message)
	};

	if identifier.is_empty() || sdf::FileFormat::for_identifier(identifier, file_format_args).is_none() {
		return Err(fail("an invalid identifier".to_string()));
	}
	if !sdf::Path::is_valid_identifier(default_prim_name) {
		return Err(fail(format!(
			"an invalid default prim name: \"{}\" is not a valid identifier",
			default_prim_name
		)));
	}
	let up_axis = validate_stage_metrics(up_axis, linear_units)
		.map_err(|reason| fail(format!("invalid stage metrics: {}", reason)))?;

	let stage = usd::Stage::create_new(identifier, file_format_args).inspect_err(|err| {
		tf_warn!("Unable to create UsdStage at \"{}\": {}", identifier, err);
	})?;

	let metadata = authoring_metadata
		.map(str::to_string)
		.unwrap_or_else(default_authoring_metadata);
	unchecked_configure(&stage, default_prim_name, &up_axis, linear_units, Some(&metadata))?;
	stage.save()?;
	Ok(stage)
}

/// Configure the default prim, metrics and authoring metadata of `stage`.
///
/// The default prim is defined as a `Scope` on the root layer when it has no
/// spec there.
pub fn configure_stage(
	stage: &usd::Stage,
	default_prim_name: &str,
	up_axis: &tf::Token,
	linear_units: f64,
	authoring_metadata: Option<&str>,
) -> Result<()> {
	let identifier = stage.root_layer().identifier();
	if !sdf::Path::is_valid_identifier(default_prim_name) {
		let message = format!(
			"Unable to configure UsdStage at \"{}\" due to an invalid default prim name: \"{}\" is not a valid identifier",
			identifier, default_prim_name
		);
		tf_warn!("{}", message);
		return Err(Error::InvalidArgument(message));
	}
	let up_axis = validate_stage_metrics(up_axis, linear_units).map_err(|reason| {
		let message = format!(
			"Failed to configure UsdStage at \"{}\" due to invalid stage metrics: {}",
			identifier, reason
		);
		tf_warn!("{}", message);
		Error::InvalidArgument(message)
	})?;

	unchecked_configure(stage, default_prim_name, &up_axis, linear_units, authoring_metadata)
}

/// Save every dirty layer of `stage`.
///
/// `authoring_metadata` is stamped on dirty file layers that do not record
/// it yet, and `comment` replaces their comment.
pub fn save_stage(stage: &usd::Stage, authoring_metadata: Option<&str>, comment: Option<&str>) -> Result<()> {
	let dirty: Vec<_> = stage
		.used_layers()
		.into_iter()
		.filter(|layer| layer.is_dirty() && !layer.is_anonymous())
		.collect();

	if let Some(metadata) = authoring_metadata {
		for layer in dirty.iter().filter(|layer| !has_layer_authoring_metadata(layer)) {
			set_layer_authoring_metadata(layer, metadata);
		}
	}

	let name = stage.root_layer().display_name();
	match comment {
		Some(comment) => {
			tf_status!("Saving \"{}\" with comment \"{}\"", name, comment);
			for layer in &dirty {
				layer.set_comment(comment);
			}
		}
		None => tf_status!("Saving \"{}\"", name),
	}
	stage.save()
}

/// Stage settings kept by pipelines, e.g. in a JSON or TOML config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageConfig {
	pub default_prim_name: String,
	pub up_axis: String,
	pub linear_units: f64,
	pub authoring_metadata: Option<String>,
}

impl Default for StageConfig {
	fn default() -> Self {
		Self {
			default_prim_name: "World".to_string(),
			up_axis: "Y".to_string(),
			linear_units: usd_geom::LinearUnits::CENTIMETERS,
			authoring_metadata: None,
		}
	}
}

impl StageConfig {
	/// Create a stage at `identifier` with these settings.
	pub fn create_stage(&self, identifier: &str, file_format_args: &sdf::FileFormatArguments) -> Result<usd::Stage> {
		create_stage(
			identifier,
			&self.default_prim_name,
			&tf::Token::new(&self.up_axis),
			self.linear_units,
			self.authoring_metadata.as_deref(),
			file_format_args,
		)
	}

	/// Apply these settings to an existing stage.
	pub fn configure(&self, stage: &usd::Stage) -> Result<()> {
		configure_stage(
			stage,
			&self.default_prim_name,
			&tf::Token::new(&self.up_axis),
			self.linear_units,
			self.authoring_metadata.as_deref(),
		)
	}

	/// Read the settings back from a configured stage.
	pub fn from_stage(stage: &usd::Stage) -> Self {
		let layer = stage.root_layer();
		Self {
			default_prim_name: layer.default_prim().as_str().to_string(),
			up_axis: usd_geom::stage_up_axis(stage).as_str().to_string(),
			linear_units: usd_geom::stage_meters_per_unit(stage),
			authoring_metadata: has_layer_authoring_metadata(layer)
				.then(|| layer_authoring_metadata(layer)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tf::DiagnosticKind;

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	#[test]
	fn configure_defines_default_prim_and_metrics() {
		let stage = usd::Stage::create_in_memory();
		configure_stage(&stage, "Car", &t("z"), usd_geom::LinearUnits::METERS, Some("Test 1.0")).unwrap();

		assert_eq!(usd_geom::stage_up_axis(&stage), usd_geom::TOKENS.z);
		assert_eq!(usd_geom::stage_meters_per_unit(&stage), 1.0);
		let default_prim = stage.default_prim();
		assert_eq!(default_prim.path(), &p("/Car"));
		assert!(usd_geom::Scope::from_prim(default_prim).is_some());
		assert_eq!(layer_authoring_metadata(stage.root_layer()), "Test 1.0");
	}

	#[test]
	fn configure_keeps_an_existing_default_prim() {
		let stage = usd::Stage::create_in_memory();
		usd_geom::Xform::define(&stage, "/Car").unwrap();
		configure_stage(&stage, "Car", &t("Y"), 0.01, None).unwrap();
		assert!(usd_geom::Xform::get(&stage, "/Car").is_some());
	}

	#[test]
	fn configure_rejects_invalid_input() {
		let stage = usd::Stage::create_in_memory();
		let capture = tf::DiagnosticCapture::begin();

		assert!(configure_stage(&stage, "1Car", &t("Y"), 0.01, None).is_err());
		assert!(capture.has(DiagnosticKind::Warning, "invalid default prim name: \"1Car\" is not a valid identifier"));

		let err = configure_stage(&stage, "Car", &t("X"), 0.01, None).unwrap_err();
		assert!(err.to_string().ends_with("invalid stage metrics: Unsupported up axis value \"X\""));

		let err = configure_stage(&stage, "Car", &t("Y"), 0.0, None).unwrap_err();
		assert!(err.to_string().contains("received 0.000000"));
		assert!(!stage.has_default_prim());
	}

	#[test]
	fn editable_locations() {
		let stage = usd::Stage::create_in_memory();
		let world = stage.define_prim("/World", &t("Xform")).unwrap();
		assert_eq!(is_editable_prim_location(&stage, &p("/World/Cube")), Ok(()));
		assert_eq!(
			is_editable_prim_location(&stage, &p("World")),
			Err("\"World\" is not a valid absolute prim path.".to_string())
		);
		assert_eq!(is_editable_prim_location_in(&world, "Cube"), Ok(()));
		assert_eq!(
			is_editable_prim_location_in(&world, "1Cube"),
			Err("\"1Cube\" is not a valid prim name".to_string())
		);
		assert_eq!(
			is_editable_prim_location_in(&stage.prim_at_path("/Missing"), "Cube"),
			Err("Invalid UsdPrim".to_string())
		);
		assert_eq!(is_editable_prim(&world), Ok(()));
	}

	#[test]
	fn config_round_trips_through_json() {
		let config: StageConfig = serde_json::from_str(r#"{"defaultPrimName": "Car", "upAxis": "Z"}"#).unwrap();
		assert_eq!(config.default_prim_name, "Car");
		assert_eq!(config.linear_units, usd_geom::LinearUnits::CENTIMETERS);

		let stage = usd::Stage::create_in_memory();
		config.configure(&stage).unwrap();
		assert_eq!(StageConfig::from_stage(&stage), config);

		let json = serde_json::to_value(&config).unwrap();
		assert_eq!(json["upAxis"], "Z");
	}
}
