//! Kind
//!
//! Kinds classify prims for structural navigation of asset hierarchies.
//! The built-in kinds form a small hierarchy:
//!
//! - `model`
//!   - `component`
//!   - `group`
//!     - `assembly`
//! - `subcomponent`

use crate::{declare_public_tokens, tf};

declare_public_tokens!(KindTokens, KIND_TOKENS, [
	model: "model",
	component: "component",
	group: "group",
	assembly: "assembly",
	subcomponent: "subcomponent",
]);

/// Return the base kind of `kind`, or `None` for root kinds and unknown kinds.
pub fn base_kind(kind: &tf::Token) -> Option<tf::Token> {
	let base = match kind.as_str() {
		"component" | "group" => &KIND_TOKENS.model,
		"assembly" => &KIND_TOKENS.group,
		_ => return None,
	};
	Some(base.clone())
}

/// Return true if `kind` is a known kind.
pub fn is_known(kind: &tf::Token) -> bool {
	matches!(
		kind.as_str(),
		"model" | "component" | "group" | "assembly" | "subcomponent"
	)
}

/// Return true if `kind` is `base` or derives from it.
pub fn is_a(kind: &tf::Token, base: &tf::Token) -> bool {
	if !is_known(kind) {
		return false;
	}
	let mut current = Some(kind.clone());
	while let Some(k) = current {
		if k == *base {
			return true;
		}
		current = base_kind(&k);
	}
	false
}

/// Return true if `kind` is one of the model kinds, or a subcomponent.
pub fn is_model_hierarchy_kind(kind: &tf::Token) -> bool {
	is_a(kind, &KIND_TOKENS.model) || *kind == KIND_TOKENS.subcomponent
}
