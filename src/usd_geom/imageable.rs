use super::TOKENS;
use crate::{sdf::VALUE_TYPE_NAMES, tf, usd};

usd::declare_typed_schema!(
	/// Base class for all prims that may require rendering or visualization of some sort.
	Imageable,
	"Imageable"
);

impl<'a> Imageable<'a> {
	pub fn purpose_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.purpose)
	}

	pub fn create_purpose_attr(&self) -> usd::Attribute<'a> {
		self.create_uniform_attribute(&TOKENS.purpose, &VALUE_TYPE_NAMES.token)
	}

	pub fn visibility_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.visibility)
	}

	pub fn create_visibility_attr(&self) -> usd::Attribute<'a> {
		self.create_attribute(&TOKENS.visibility, &VALUE_TYPE_NAMES.token, false)
	}

	pub fn compute_purpose(&self) -> tf::Token {
		compute_purpose(self)
	}

	pub fn compute_visibility(&self) -> tf::Token {
		compute_visibility(self)
	}

	/// Author `visibility = invisible` at the edit target.
	pub fn make_invisible(&self) -> bool {
		self.create_visibility_attr().set(TOKENS.invisible.clone())
	}
}

/// Compute the effective purpose of `prim`.
///
/// An authored purpose is inherited by all descendants, so the outermost
/// authored opinion wins. Prims without one have the `default` purpose.
pub fn compute_purpose(prim: &usd::Prim) -> tf::Token {
	let mut purpose = None;
	let mut current = prim.clone();
	while !current.path().is_empty() && !current.is_pseudo_root() {
		if let Some(authored) = current.attribute(&TOKENS.purpose).get::<tf::Token>() {
			purpose = Some(authored);
		}
		current = current.parent();
	}
	purpose.unwrap_or_else(|| TOKENS.default_.clone())
}

/// Compute the effective visibility of `prim`, `invisible` when it or any
/// ancestor is invisible.
pub fn compute_visibility(prim: &usd::Prim) -> tf::Token {
	let mut current = prim.clone();
	while !current.path().is_empty() && !current.is_pseudo_root() {
		if current.attribute(&TOKENS.visibility).get::<tf::Token>().as_ref() == Some(&TOKENS.invisible) {
			return TOKENS.invisible.clone();
		}
		current = current.parent();
	}
	TOKENS.inherited.clone()
}
