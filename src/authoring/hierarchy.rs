//! Kind hierarchies of component and assembly models.

use crate::{kind::KIND_TOKENS, tf, tf_runtime_error, tf_warn, usd};

fn set_kind(prim: &usd::Prim, kind: &tf::Token) -> bool {
	match usd::ModelApi::new(prim.clone()).set_kind(kind) {
		Ok(()) => true,
		Err(err) => {
			tf_runtime_error!("{}", err);
			false
		}
	}
}

fn check_root(prim: &usd::Prim, hierarchy: &str) -> bool {
	if !prim.is_valid() {
		tf_runtime_error!("Unable to configure the {} hierarchy of an invalid prim <{}>", hierarchy, prim.path());
		return false;
	}
	true
}

/// Make `prim` a component model.
///
/// Components below it become subcomponents, and any other kind below it is
/// cleared, except below subcomponents whose subtrees are left as they are.
/// Returns false if a kind could not be authored at the edit target.
pub fn configure_component_hierarchy(prim: &usd::Prim) -> bool {
	if !check_root(prim, "component") || !set_kind(prim, &KIND_TOKENS.component) {
		return false;
	}
	configure_component_descendants(prim)
}

fn configure_component_descendants(prim: &usd::Prim) -> bool {
	let mut ok = true;
	for child in prim.children() {
		let kind = usd::ModelApi::new(child.clone()).kind();
		if kind.is_empty() {
			ok &= configure_component_descendants(&child);
		} else if kind == KIND_TOKENS.component {
			ok &= set_kind(&child, &KIND_TOKENS.subcomponent);
		} else if kind == KIND_TOKENS.subcomponent {
			continue;
		} else if set_kind(&child, &tf::Token::empty()) {
			ok &= configure_component_descendants(&child);
		} else {
			ok = false;
		}
	}
	ok
}

/// Make `prim` an assembly model.
///
/// Components, groups and assemblies below it keep their kind. Subcomponents
/// are converted to components, which is reported with a warning and a false
/// return. Prims without a kind become groups when a model is found below
/// them. The walk does not descend into components.
pub fn configure_assembly_hierarchy(prim: &usd::Prim) -> bool {
	if !check_root(prim, "assembly") || !set_kind(prim, &KIND_TOKENS.assembly) {
		return false;
	}
	let (ok, _) = configure_assembly_descendants(prim, prim);
	ok
}

/// Returns whether every kind was left valid, and whether a model was found.
fn configure_assembly_descendants(root: &usd::Prim, prim: &usd::Prim) -> (bool, bool) {
	let mut ok = true;
	let mut has_model = false;
	for child in prim.children() {
		let (child_ok, child_is_model) = configure_assembly_descendant(root, &child);
		ok &= child_ok;
		has_model |= child_is_model;
	}
	(ok, has_model)
}

fn configure_assembly_descendant(root: &usd::Prim, prim: &usd::Prim) -> (bool, bool) {
	let kind = usd::ModelApi::new(prim.clone()).kind();

	if kind == KIND_TOKENS.component {
		return (true, true);
	}
	if kind == KIND_TOKENS.subcomponent {
		tf_warn!(
			"Found subcomponent <{}> in assembly <{}>, converting it to a component",
			prim.path(),
			root.path()
		);
		set_kind(prim, &KIND_TOKENS.component);
		return (false, true);
	}

	let (ok, has_model) = configure_assembly_descendants(root, prim);
	if kind == KIND_TOKENS.assembly || kind == KIND_TOKENS.group {
		return (ok, true);
	}
	if kind.is_empty() && !has_model {
		return (ok, false);
	}
	(set_kind(prim, &KIND_TOKENS.group) && ok, true)
}
