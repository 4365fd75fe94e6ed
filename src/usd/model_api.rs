use super::Prim;
use crate::{Error, Result, kind, sdf::FIELD_KEYS, tf};

/// Model-level API for a prim: the `kind` metadata and model hierarchy queries.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelApi<'a> {
	prim: Prim<'a>,
}

impl<'a> ModelApi<'a> {
	pub fn new(prim: Prim<'a>) -> Self {
		Self { prim }
	}

	pub fn prim(&self) -> &Prim<'a> {
		&self.prim
	}

	/// Return the composed kind, empty when none is authored.
	pub fn kind(&self) -> tf::Token {
		self.prim.metadata(&FIELD_KEYS.kind).unwrap_or_default()
	}

	/// Author `kind` at the edit target.
	///
	/// Fails on invalid prims, the pseudo-root, and when a layer stronger than
	/// the edit target already holds a kind opinion.
	pub fn set_kind(&self, kind: &tf::Token) -> Result<()> {
		let path = self.prim.path();
		if !self.prim.is_valid() {
			return Err(Error::InvalidArgument(format!("Unable to set the kind of invalid prim <{}>", path)));
		}
		if self.prim.is_pseudo_root() {
			return Err(Error::InvalidArgument("Unable to set the kind of the pseudo-root".to_string()));
		}
		let stage = self.prim.stage();
		if !stage.has_authority(path, &FIELD_KEYS.kind) {
			return Err(Error::Authority(format!(
				"Unable to set the kind of <{}> at edit target @{}@",
				path,
				stage.edit_target().identifier()
			)));
		}
		if self.prim.set_metadata(&FIELD_KEYS.kind, kind.clone()) {
			Ok(())
		} else {
			Err(Error::Authority(format!("Unable to set the kind of <{}>", path)))
		}
	}

	/// Return true if this prim's kind is a model kind, and its parent is a
	/// group or the pseudo-root.
	pub fn is_model(&self) -> bool {
		kind::is_a(&self.kind(), &kind::KIND_TOKENS.model) && self.parent_is_group()
	}

	/// Return true if this prim's kind is a group kind, and its parent is a
	/// group or the pseudo-root.
	pub fn is_group(&self) -> bool {
		kind::is_a(&self.kind(), &kind::KIND_TOKENS.group) && self.parent_is_group()
	}

	fn parent_is_group(&self) -> bool {
		let parent = self.prim.parent();
		parent.is_pseudo_root() || ModelApi::new(parent).is_group()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::usd;

	#[test]
	fn model_hierarchy() {
		let t = tf::Token::new;
		let stage = usd::Stage::create_in_memory();
		let world = stage.define_prim("/World", &t("Xform")).unwrap();
		let car = stage.define_prim("/World/Car", &t("Xform")).unwrap();

		ModelApi::new(car.clone()).set_kind(&t("component")).unwrap();
		assert!(!ModelApi::new(car.clone()).is_model());

		ModelApi::new(world.clone()).set_kind(&t("assembly")).unwrap();
		assert!(ModelApi::new(car.clone()).is_model());
		assert!(ModelApi::new(world).is_group());
		assert!(ModelApi::new(stage.pseudo_root()).set_kind(&t("group")).is_err());
		assert!(ModelApi::new(stage.prim_at_path("/Missing")).set_kind(&t("group")).is_err());
	}
}
