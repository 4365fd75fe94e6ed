use super::TOKENS;
use crate::{Error, Result, tf, usd};

/// Common `metersPerUnit` values.
pub struct LinearUnits;

impl LinearUnits {
	pub const NANOMETERS: f64 = 1e-9;
	pub const MICROMETERS: f64 = 1e-6;
	pub const MILLIMETERS: f64 = 0.001;
	pub const CENTIMETERS: f64 = 0.01;
	pub const METERS: f64 = 1.0;
	pub const KILOMETERS: f64 = 1000.0;
	pub const LIGHT_YEARS: f64 = 9_460_730_472_580_800.0;
	pub const INCHES: f64 = 0.0254;
	pub const FEET: f64 = 0.3048;
	pub const YARDS: f64 = 0.9144;
	pub const MILES: f64 = 1609.344;
}

/// Fallback up axis of stages without `upAxis` metadata.
pub fn fallback_up_axis() -> tf::Token {
	TOKENS.y.clone()
}

/// Return the stage's `upAxis`, or `Y` when unauthored.
pub fn stage_up_axis(stage: &usd::Stage) -> tf::Token {
	stage
		.root_layer()
		.root_field_value(&TOKENS.up_axis)
		.and_then(|v| v.get::<tf::Token>())
		.unwrap_or_else(fallback_up_axis)
}

/// Author `upAxis` on the stage's root layer. Only `Y` and `Z` are accepted.
pub fn set_stage_up_axis(stage: &usd::Stage, axis: &tf::Token) -> Result<()> {
	if *axis != TOKENS.y && *axis != TOKENS.z {
		return Err(Error::InvalidArgument(format!("Unsupported up axis value \"{}\"", axis)));
	}
	stage.root_layer().set_root_field(&TOKENS.up_axis, axis.clone());
	Ok(())
}

/// Return the stage's `metersPerUnit`, or centimeters when unauthored.
pub fn stage_meters_per_unit(stage: &usd::Stage) -> f64 {
	stage
		.root_layer()
		.root_field_value(&TOKENS.meters_per_unit)
		.and_then(|v| v.get::<f64>())
		.unwrap_or(LinearUnits::CENTIMETERS)
}

pub fn has_authored_meters_per_unit(stage: &usd::Stage) -> bool {
	stage.root_layer().root_field_value(&TOKENS.meters_per_unit).is_some()
}

/// Author `metersPerUnit` on the stage's root layer.
pub fn set_stage_meters_per_unit(stage: &usd::Stage, meters_per_unit: f64) -> Result<()> {
	if !(meters_per_unit > 0.0) {
		return Err(Error::InvalidArgument(format!(
			"Linear units value must be greater than zero, received {:.6}",
			meters_per_unit
		)));
	}
	stage.root_layer().set_root_field(&TOKENS.meters_per_unit, meters_per_unit);
	Ok(())
}

/// Return true if `a` and `b` are the same unit, within a relative epsilon.
pub fn linear_units_are(a: f64, b: f64) -> bool {
	let epsilon = 1e-4;
	(a - b).abs() / a.abs().max(b.abs()) < epsilon
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn metrics_fallbacks_and_validation() {
		let stage = usd::Stage::create_in_memory();
		assert_eq!(stage_up_axis(&stage), TOKENS.y);
		assert_eq!(stage_meters_per_unit(&stage), LinearUnits::CENTIMETERS);

		set_stage_up_axis(&stage, &TOKENS.z).unwrap();
		set_stage_meters_per_unit(&stage, LinearUnits::METERS).unwrap();
		assert_eq!(stage_up_axis(&stage), TOKENS.z);
		assert!(linear_units_are(stage_meters_per_unit(&stage), 1.0));

		let err = set_stage_up_axis(&stage, &tf::Token::new("X")).unwrap_err();
		assert_eq!(err.to_string(), "Unsupported up axis value \"X\"");
		let err = set_stage_meters_per_unit(&stage, -1.0).unwrap_err();
		assert_eq!(err.to_string(), "Linear units value must be greater than zero, received -1.000000");
	}
}
