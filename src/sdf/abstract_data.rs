use crate::{sdf, tf, vt};
use std::collections::BTreeMap;

/// Interface for scene description data storage.
pub trait AbstractData: Send + Sync {
	/// Create a new spec at `path` with the given `spec_type`.
	/// If the spec already exists, the spec type will be changed.
	fn create_spec(&mut self, path: &sdf::Path, spec_type: sdf::SpecType);

	/// Remove the spec at `path` and all of its fields.
	fn erase_spec(&mut self, path: &sdf::Path);

	/// Return the type of the spec at `path`.
	fn spec_type(&self, path: &sdf::Path) -> Option<sdf::SpecType>;

	fn has_spec(&self, path: &sdf::Path) -> bool {
		self.spec_type(path).is_some()
	}

	/// Return the value of the given `path` and `field`.
	fn get(&self, path: &sdf::Path, field: &tf::Token) -> Option<vt::Value>;

	/// Set the value of the given `path` and `field`.
	fn set(&mut self, path: &sdf::Path, field: &tf::Token, value: vt::Value);

	/// Remove `field` from the spec at `path`.
	fn erase(&mut self, path: &sdf::Path, field: &tf::Token);

	/// Return the names of all the fields that are set at `path`.
	fn list(&self, path: &sdf::Path) -> Vec<tf::Token>;

	/// Return the paths of every spec, in path order.
	fn visit_specs(&self) -> Vec<sdf::Path>;
}

#[derive(Debug, Clone)]
struct Spec {
	spec_type: sdf::SpecType,
	fields: BTreeMap<tf::Token, vt::Value>,
}

/// In-memory spec store.
#[derive(Debug, Clone, Default)]
pub struct Data {
	specs: BTreeMap<sdf::Path, Spec>,
}

impl Data {
	pub fn new() -> Self {
		let mut data = Self::default();
		data.create_spec(&sdf::Path::absolute_root_path(), sdf::SpecType::PseudoRoot);
		data
	}
}

impl AbstractData for Data {
	fn create_spec(&mut self, path: &sdf::Path, spec_type: sdf::SpecType) {
		self.specs
			.entry(path.clone())
			.and_modify(|spec| spec.spec_type = spec_type)
			.or_insert_with(|| Spec {
				spec_type,
				fields: BTreeMap::new(),
			});
	}

	fn erase_spec(&mut self, path: &sdf::Path) {
		self.specs.remove(path);
	}

	fn spec_type(&self, path: &sdf::Path) -> Option<sdf::SpecType> {
		self.specs.get(path).map(|spec| spec.spec_type)
	}

	fn get(&self, path: &sdf::Path, field: &tf::Token) -> Option<vt::Value> {
		self.specs.get(path)?.fields.get(field).cloned()
	}

	fn set(&mut self, path: &sdf::Path, field: &tf::Token, value: vt::Value) {
		if let Some(spec) = self.specs.get_mut(path) {
			spec.fields.insert(field.clone(), value);
		}
	}

	fn erase(&mut self, path: &sdf::Path, field: &tf::Token) {
		if let Some(spec) = self.specs.get_mut(path) {
			spec.fields.remove(field);
		}
	}

	fn list(&self, path: &sdf::Path) -> Vec<tf::Token> {
		self.specs
			.get(path)
			.map(|spec| spec.fields.keys().cloned().collect())
			.unwrap_or_default()
	}

	fn visit_specs(&self) -> Vec<sdf::Path> {
		self.specs.keys().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fields_need_a_spec() {
		let mut data = Data::new();
		let path = sdf::Path::from("/World");
		let kind = tf::Token::new("kind");

		data.set(&path, &kind, vt::Value::new(tf::Token::new("component")));
		assert!(data.get(&path, &kind).is_none());

		data.create_spec(&path, sdf::SpecType::Prim);
		data.set(&path, &kind, vt::Value::new(tf::Token::new("component")));
		assert_eq!(data.list(&path), vec![kind.clone()]);

		data.erase(&path, &kind);
		assert!(data.get(&path, &kind).is_none());
		assert!(data.has_spec(&path));
	}
}
