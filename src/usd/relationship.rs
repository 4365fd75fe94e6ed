use super::Property;
use crate::{
	sdf::{self, FIELD_KEYS},
	usd,
};

/// A [`usd::Relationship`] creates dependencies between scenegraph objects by allowing a prim to target other prims, attributes, or relationships.
#[derive(Clone, PartialEq)]
pub struct Relationship<'a>(Property<'a>);

impl<'a> Relationship<'a> {
	pub(crate) fn new(stage: &'a usd::Stage, path: sdf::Path) -> Self {
		Relationship(Property::new(stage, path))
	}

	pub fn is_valid(&self) -> bool {
		self.spec_type() == Some(sdf::SpecType::Relationship)
	}

	/// Return the composed targets, in stage namespace.
	pub fn targets(&self) -> Vec<sdf::Path> {
		self.metadata::<sdf::PathListOp>(&FIELD_KEYS.target_paths)
			.map(|op| op.ordered_elements())
			.unwrap_or_default()
	}

	pub fn has_authored_targets(&self) -> bool {
		self.has_authored_metadata(&FIELD_KEYS.target_paths)
	}

	/// Author an explicit target list at the edit target.
	pub fn set_targets(&self, targets: Vec<sdf::Path>) -> bool {
		self.set_metadata(&FIELD_KEYS.target_paths, sdf::PathListOp::explicit(targets))
	}

	/// Add `target` to the back of the prepend list at the edit target.
	pub fn add_target(&self, target: sdf::Path) -> bool {
		let mut op = self
			.stage()
			.edit_target()
			.field_as::<sdf::PathListOp>(self.path(), &FIELD_KEYS.target_paths)
			.unwrap_or_default();
		op.prepend(target);
		self.set_metadata(&FIELD_KEYS.target_paths, op)
	}

	/// Remove the target opinion from the edit target. With `remove_spec`,
	/// the relationship spec itself is removed when nothing else is authored on it.
	pub fn clear_targets(&self, remove_spec: bool) -> bool {
		let layer = self.stage().edit_target();
		if !layer.permission_to_edit() {
			return false;
		}
		layer.erase_field(self.path(), &FIELD_KEYS.target_paths);
		if remove_spec && layer.has_spec(self.path()) {
			let only_structure = layer.list_fields(self.path()).iter().all(|field| {
				*field == FIELD_KEYS.custom || *field == FIELD_KEYS.variability || *field == FIELD_KEYS.type_name
			});
			if only_structure {
				layer.remove_spec(self.path());
			}
		}
		true
	}
}

impl<'a> std::ops::Deref for Relationship<'a> {
	type Target = Property<'a>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl std::fmt::Debug for Relationship<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Relationship{:?}", *self.0)
	}
}
