use crate::{Result, sdf, tf, usd};

/// The base trait for all schema types in Usd.
///
/// Schema objects hold a [`usd::Prim`] internally and provide a
/// layer of specific named API atop the underlying scene graph.
pub trait SchemaBase<'a>: Sized {
	/// The typed schema name, or the applied API schema name.
	const SCHEMA_TYPE: &'static str;

	/// Wrap `prim` without checking its type.
	fn from_prim_unchecked(prim: usd::Prim<'a>) -> Self;

	fn prim(&self) -> &usd::Prim<'a>;

	fn schema_type() -> tf::Token {
		tf::Token::new(Self::SCHEMA_TYPE)
	}

	/// Return the schema holding the prim at `path`, if that prim is of this schema's type.
	fn get(stage: &'a usd::Stage, path: impl Into<sdf::Path>) -> Option<Self> {
		Self::from_prim(stage.prim_at_path(path))
	}

	/// Wrap `prim` if it is valid and of this schema's type.
	fn from_prim(prim: usd::Prim<'a>) -> Option<Self> {
		(prim.is_valid() && prim.is_a(&Self::schema_type())).then(|| Self::from_prim_unchecked(prim))
	}

	/// Define a prim of this schema's type at `path` in the edit target.
	fn define(stage: &'a usd::Stage, path: impl Into<sdf::Path>) -> Result<Self> {
		stage
			.define_prim(path, &Self::schema_type())
			.map(Self::from_prim_unchecked)
	}
}

/// Declares a typed schema wrapper around [`usd::Prim`].
macro_rules! declare_typed_schema {
	($(#[$meta:meta])* $name:ident, $schema:literal) => {
		$(#[$meta])*
		#[derive(Debug, Clone, PartialEq)]
		pub struct $name<'a> {
			prim: $crate::usd::Prim<'a>,
		}

		impl<'a> $crate::usd::SchemaBase<'a> for $name<'a> {
			const SCHEMA_TYPE: &'static str = $schema;

			fn from_prim_unchecked(prim: $crate::usd::Prim<'a>) -> Self {
				Self { prim }
			}

			fn prim(&self) -> &$crate::usd::Prim<'a> {
				&self.prim
			}
		}

		impl<'a> std::ops::Deref for $name<'a> {
			type Target = $crate::usd::Prim<'a>;
			fn deref(&self) -> &Self::Target {
				&self.prim
			}
		}
	};
}

pub(crate) use declare_typed_schema;
