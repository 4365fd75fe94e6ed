use super::{Attribute, Object, Payloads, Property, References, Relationship, schema_registry};
use crate::{
	sdf::{self, FIELD_KEYS},
	tf, usd, vt,
};

/// [`usd::Prim`] is the sole persistent scenegraph object on a [`usd::Stage`],
/// and is the embodiment of a "Prim" as described in the *Universal Scene Description Composition Compendium*.
///
/// A `Prim` is a handle: it may name a location with no composed prim, see [`Prim::is_valid`].
#[derive(Clone, PartialEq)]
pub struct Prim<'a>(Object<'a>);

impl<'a> Prim<'a> {
	pub(crate) fn new(stage: &'a usd::Stage, path: sdf::Path) -> Self {
		Prim(Object::new(stage, path))
	}

	pub fn is_valid(&self) -> bool {
		self.path().is_absolute_root() || self.stage().prim_index(self.path()).is_some()
	}

	pub fn is_pseudo_root(&self) -> bool {
		self.path().is_absolute_root()
	}

	pub fn parent(&self) -> Prim<'a> {
		Prim::new(self.stage(), self.path().parent_path())
	}

	/// Return the composed specifier. The strongest `def` or `class` wins over any `over`.
	pub fn specifier(&self) -> sdf::Specifier {
		let opinions = self.stage().opinions(self.path(), &FIELD_KEYS.specifier);
		opinions
			.iter()
			.filter_map(|o| o.value.get::<sdf::Specifier>())
			.find(|s| s.is_defining())
			.unwrap_or(sdf::Specifier::Over)
	}

	pub fn set_specifier(&self, specifier: sdf::Specifier) -> bool {
		self.set_metadata(&FIELD_KEYS.specifier, specifier)
	}

	pub fn type_name(&self) -> tf::Token {
		self.metadata(&FIELD_KEYS.type_name).unwrap_or_default()
	}

	pub fn set_type_name(&self, type_name: &tf::Token) -> bool {
		self.set_metadata(&FIELD_KEYS.type_name, type_name.clone())
	}

	/// Return true if this prim and all of its ancestors have a defining specifier.
	pub fn is_defined(&self) -> bool {
		if self.is_pseudo_root() {
			return true;
		}
		self.is_valid() && self.specifier().is_defining() && self.parent().is_defined()
	}

	/// Return true if this prim or one of its ancestors is a `class`.
	pub fn is_abstract(&self) -> bool {
		if self.is_pseudo_root() {
			return false;
		}
		self.specifier() == sdf::Specifier::Class || self.parent().is_abstract()
	}

	pub fn is_active(&self) -> bool {
		self.metadata::<bool>(&FIELD_KEYS.active).unwrap_or(true)
	}

	pub fn set_active(&self, active: bool) -> bool {
		self.set_metadata(&FIELD_KEYS.active, active)
	}

	/// Return the active, defined, non-abstract children of this prim.
	pub fn children(&self) -> Vec<Prim<'a>> {
		self.all_children()
			.into_iter()
			.filter(|child| child.is_active() && child.is_defined() && !child.is_abstract())
			.collect()
	}

	/// Return every composed child of this prim.
	pub fn all_children(&self) -> Vec<Prim<'a>> {
		let stage = self.stage();
		stage
			.compose_children(self.path())
			.iter()
			.map(|name| Prim::new(stage, self.path().append_child(name)))
			.filter(|child| child.is_valid())
			.collect()
	}

	pub fn child(&self, name: &tf::Token) -> Prim<'a> {
		Prim::new(self.stage(), self.path().append_child(name))
	}
}

/// Schemas
impl<'a> Prim<'a> {
	/// Return true if this prim's type is `schema_type` or derives from it.
	pub fn is_a(&self, schema_type: &tf::Token) -> bool {
		schema_registry::is_a(&self.type_name(), schema_type)
	}

	/// Return the composed list of applied API schemas.
	pub fn applied_schemas(&self) -> vt::Array<tf::Token> {
		self.metadata::<sdf::TokenListOp>(&FIELD_KEYS.api_schemas)
			.map(|op| op.ordered_elements())
			.unwrap_or_default()
	}

	pub fn has_api(&self, schema_name: &tf::Token) -> bool {
		self.applied_schemas().contains(schema_name)
	}

	/// Prepend `schema_name` to the `apiSchemas` opinion of the edit target.
	pub fn apply_api(&self, schema_name: &tf::Token) -> bool {
		if !self.is_valid() || self.is_pseudo_root() {
			return false;
		}
		let mut op = self
			.stage()
			.edit_target()
			.field_as::<sdf::TokenListOp>(self.path(), &FIELD_KEYS.api_schemas)
			.unwrap_or_default();
		if op.has_item(schema_name) && !op.deleted_items.contains(schema_name) {
			return true;
		}
		op.deleted_items.retain(|item| item != schema_name);
		op.prepend(schema_name.clone());
		self.set_metadata(&FIELD_KEYS.api_schemas, op)
	}
}

/// Instancing
impl<'a> Prim<'a> {
	pub fn is_instanceable(&self) -> bool {
		self.metadata::<bool>(&FIELD_KEYS.instanceable).unwrap_or(false)
	}

	pub fn set_instanceable(&self, instanceable: bool) -> bool {
		self.set_metadata(&FIELD_KEYS.instanceable, instanceable)
	}

	/// Return true if this prim is instanceable and brings in content through
	/// a reference or payload.
	pub fn is_instance(&self) -> bool {
		self.is_instanceable()
			&& self
				.stage()
				.prim_index(self.path())
				.is_some_and(|index| index.nodes().len() > 1)
	}

	/// Return true if this prim is a descendant of an instance.
	pub fn is_instance_proxy(&self) -> bool {
		let mut ancestor = self.parent();
		while !ancestor.path().is_empty() && !ancestor.is_pseudo_root() {
			if ancestor.is_instance() {
				return true;
			}
			ancestor = ancestor.parent();
		}
		false
	}
}

/// Properties
impl<'a> Prim<'a> {
	/// Return the composed properties of this prim, sorted by name.
	pub fn properties(&self) -> Vec<Property<'a>> {
		let stage = self.stage();
		stage
			.compose_properties(self.path())
			.iter()
			.map(|name| Property::new(stage, self.path().append_property(name)))
			.collect()
	}

	pub fn property_names(&self) -> vt::Array<tf::Token> {
		self.stage().compose_properties(self.path())
	}

	/// Return a [`usd::Property`] with the given `name`.
	pub fn property(&self, name: &tf::Token) -> Property<'a> {
		Property::new(self.stage(), self.path().append_property(name))
	}
}

/// Attributes
impl<'a> Prim<'a> {
	/// Return a [`usd::Attribute`] with the given `name`.
	pub fn attribute(&self, name: &tf::Token) -> Attribute<'a> {
		Attribute::new(self.stage(), self.path().append_property(name))
	}

	pub fn has_attribute(&self, name: &tf::Token) -> bool {
		self.attribute(name).is_valid()
	}

	/// Return the attributes of this prim whose name starts with `prefix`.
	pub fn attributes_in_namespace(&self, prefix: &str) -> Vec<Attribute<'a>> {
		self.property_names()
			.iter()
			.filter(|name| name.as_str().starts_with(prefix))
			.map(|name| self.attribute(name))
			.filter(|attr| attr.is_valid())
			.collect()
	}

	/// Author an attribute spec named `name` at the edit target.
	///
	/// An existing attribute keeps its authored type.
	pub fn create_attribute(&self, name: &tf::Token, type_name: &tf::Token, custom: bool) -> Attribute<'a> {
		let attr = self.attribute(name);
		if !self.is_valid() || self.is_pseudo_root() {
			return attr;
		}
		let Ok(layer) = self.stage().editable_target() else {
			return attr;
		};
		let type_name = match attr.type_name() {
			existing if !existing.is_empty() => existing,
			_ => type_name.clone(),
		};
		layer.create_property_spec(attr.path(), sdf::SpecType::Attribute, Some(&type_name), custom);
		attr
	}

	/// Author a `uniform` attribute spec named `name` at the edit target.
	pub fn create_uniform_attribute(&self, name: &tf::Token, type_name: &tf::Token) -> Attribute<'a> {
		let attr = self.create_attribute(name, type_name, false);
		attr.set_metadata(&FIELD_KEYS.variability, sdf::Variability::Uniform);
		attr
	}
}

/// Relationships
impl<'a> Prim<'a> {
	/// Return a [`usd::Relationship`] with the given `name`.
	pub fn relationship(&self, name: &tf::Token) -> Relationship<'a> {
		Relationship::new(self.stage(), self.path().append_property(name))
	}

	pub fn has_relationship(&self, name: &tf::Token) -> bool {
		self.relationship(name).is_valid()
	}

	/// Author a relationship spec named `name` at the edit target.
	pub fn create_relationship(&self, name: &tf::Token, custom: bool) -> Relationship<'a> {
		let rel = self.relationship(name);
		if !self.is_valid() || self.is_pseudo_root() {
			return rel;
		}
		if let Ok(layer) = self.stage().editable_target() {
			layer.create_property_spec(rel.path(), sdf::SpecType::Relationship, None, custom);
		}
		rel
	}
}

/// Composition arcs
impl<'a> Prim<'a> {
	pub fn references(&self) -> References<'a> {
		References::new(self.clone())
	}

	pub fn payloads(&self) -> Payloads<'a> {
		Payloads::new(self.clone())
	}

	pub fn has_authored_references(&self) -> bool {
		!self.references().items().is_empty()
	}

	pub fn has_payload(&self) -> bool {
		!self.payloads().items().is_empty()
	}
}

impl<'a> std::ops::Deref for Prim<'a> {
	type Target = Object<'a>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl std::fmt::Debug for Prim<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Prim{:?}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	#[test]
	fn children_skip_inactive_and_classes() {
		let stage = usd::Stage::create_in_memory();
		stage.define_prim("/World/A", &t("Xform")).unwrap();
		stage.define_prim("/World/B", &t("Xform")).unwrap();
		stage.create_class_prim("/World/C").unwrap();
		stage.override_prim("/World/D").unwrap();

		let world = stage.prim_at_path("/World");
		world.child(&t("B")).set_active(false);

		let names: Vec<tf::Token> = world.children().iter().map(|c| c.name()).collect();
		assert_eq!(names, vec![t("A")]);
		assert_eq!(world.all_children().len(), 4);
		assert!(stage.prim_at_path("/World/C").is_abstract());
	}

	#[test]
	fn inactive_prims_hide_descendants() {
		let stage = usd::Stage::create_in_memory();
		stage.define_prim("/World/A/Leaf", &t("Cube")).unwrap();
		stage.prim_at_path("/World/A").set_active(false);
		assert!(stage.prim_at_path("/World/A").is_valid());
		assert!(!stage.prim_at_path("/World/A/Leaf").is_valid());
	}

	#[test]
	fn apply_api_once() {
		let stage = usd::Stage::create_in_memory();
		let prim = stage.define_prim("/World", &t("Xform")).unwrap();
		assert!(prim.apply_api(&t("GeomModelAPI")));
		assert!(prim.apply_api(&t("GeomModelAPI")));
		assert_eq!(prim.applied_schemas(), vec![t("GeomModelAPI")]);
		assert!(prim.has_api(&t("GeomModelAPI")));
	}

	#[test]
	fn attributes_keep_their_type() {
		let stage = usd::Stage::create_in_memory();
		let prim = stage.define_prim("/World", &t("Xform")).unwrap();
		let attr = prim.create_attribute(&t("size"), &t("double"), false);
		attr.set(2.0f64);
		let again = prim.create_attribute(&t("size"), &t("float"), false);
		assert_eq!(again.type_name(), t("double"));
		assert_eq!(again.get::<f64>(), Some(2.0));
		assert!(prim.has_attribute(&t("size")));
		assert!(!prim.has_attribute(&t("radius")));
	}
}
