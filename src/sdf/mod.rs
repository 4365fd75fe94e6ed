//! Scene Description Foundations

mod abstract_data;
mod file_format;
mod layer;
mod list_op;
mod path;
mod schema;

pub use abstract_data::*;
pub use file_format::*;
pub use layer::*;
pub use list_op::*;
pub use path::*;
pub use schema::{
	CHILDREN_KEYS, ChildrenKeys, FIELD_KEYS, FieldKeys, VALUE_TYPE_NAMES, ValueTypeNames,
	array_type_name, scalar_type_name,
};

use crate::vt;

/// An enum that specifies the type of an object.
/// Objects have fields and are adressable by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecType {
	Unknown,
	Attribute,
	Prim,
	PseudoRoot,
	Relationship,
}

/// An enum that identifies the possible specifiers for a PrimSpec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specifier {
	Def,
	Over,
	Class,
}

impl Specifier {
	pub fn as_str(&self) -> &'static str {
		match self {
			Specifier::Def => "def",
			Specifier::Over => "over",
			Specifier::Class => "class",
		}
	}

	/// Return true for `def` and `class`, the specifiers that define a prim.
	pub fn is_defining(&self) -> bool {
		!matches!(self, Specifier::Over)
	}
}

/// An enum that identifies variability types for attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variability {
	#[default]
	Varying,
	Uniform,
}

/// Represents a reference and all its meta data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reference {
	/// The asset path to the external layer. Empty for an internal reference.
	pub asset_path: String,
	/// The path to the referenced prim in the external layer.
	/// Empty to target the layer's default prim.
	pub prim_path: Path,
	/// The custom data associated with the reference.
	pub custom_data: vt::Dictionary,
}

impl Reference {
	pub fn new(asset_path: impl Into<String>, prim_path: impl Into<Path>) -> Self {
		Self {
			asset_path: asset_path.into(),
			prim_path: prim_path.into(),
			custom_data: vt::Dictionary::new(),
		}
	}

	pub fn is_internal(&self) -> bool {
		self.asset_path.is_empty()
	}
}

/// Represents a payload and all its meta data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Payload {
	/// The asset path to the external layer. Empty for an internal payload.
	pub asset_path: String,
	/// The root prim path to the referenced prim in the external layer.
	pub prim_path: Path,
}

impl Payload {
	pub fn new(asset_path: impl Into<String>, prim_path: impl Into<Path>) -> Self {
		Self {
			asset_path: asset_path.into(),
			prim_path: prim_path.into(),
		}
	}
}

/// Contains an asset path and optional resolved path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPath {
	pub authored_path: String,
	pub resolved_path: String,
}

impl AssetPath {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			authored_path: path.into(),
			resolved_path: String::new(),
		}
	}

	/// Return the asset path. If the resolved path is not empty it is
	/// returned, otherwise the authored path is returned.
	pub fn asset_path(&self) -> &str {
		if !self.resolved_path.is_empty() {
			&self.resolved_path
		} else {
			&self.authored_path
		}
	}
}

impl From<&str> for AssetPath {
	fn from(path: &str) -> Self {
		Self::new(path)
	}
}
