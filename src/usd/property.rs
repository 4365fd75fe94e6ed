use super::{Attribute, Object, Relationship};
use crate::{sdf, tf, usd};

/// Base class for [`usd::Attribute`] and [`usd::Relationship`] scenegraph objects.
#[derive(Clone, PartialEq)]
pub struct Property<'a>(Object<'a>);

impl<'a> Property<'a> {
	pub(crate) fn new(stage: &'a usd::Stage, path: sdf::Path) -> Self {
		Property(Object::new(stage, path))
	}

	/// Return true if any contributing site holds a spec for this property.
	pub fn is_valid(&self) -> bool {
		matches!(
			self.spec_type(),
			Some(sdf::SpecType::Attribute | sdf::SpecType::Relationship)
		)
	}

	pub fn prim(&self) -> usd::Prim<'a> {
		self.stage().prim_at_path(self.path().prim_path())
	}

	/// Return the namespace prefix of the property name (`inputs` for `inputs:diffuseColor`).
	pub fn namespace(&self) -> tf::Token {
		let name = self.name();
		match name.as_str().rsplit_once(':') {
			Some((namespace, _)) => tf::Token::new(namespace),
			None => tf::Token::empty(),
		}
	}

	/// Return the property name without its namespace prefix.
	pub fn base_name(&self) -> tf::Token {
		let name = self.name();
		match name.as_str().rsplit_once(':') {
			Some((_, base)) => tf::Token::new(base),
			None => name,
		}
	}

	pub fn is_custom(&self) -> bool {
		self.metadata::<bool>(&sdf::FIELD_KEYS.custom).unwrap_or(false)
	}

	pub fn as_attribute(&self) -> Option<Attribute<'a>> {
		(self.spec_type() == Some(sdf::SpecType::Attribute))
			.then(|| Attribute::new(self.stage(), self.path().clone()))
	}

	pub fn as_relationship(&self) -> Option<Relationship<'a>> {
		(self.spec_type() == Some(sdf::SpecType::Relationship))
			.then(|| Relationship::new(self.stage(), self.path().clone()))
	}

	/// Return true if the edit target holds the strongest spec for this
	/// property, so that it may remove it.
	pub fn has_spec_authority(&self) -> bool {
		self.stage().has_spec_authority(self.path())
	}

	/// Remove this property's spec from the edit target.
	pub fn remove_spec(&self) -> bool {
		self.stage().remove_prim(self.path())
	}
}

impl<'a> std::ops::Deref for Property<'a> {
	type Target = Object<'a>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl std::fmt::Debug for Property<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Property{:?}", self.0)
	}
}
