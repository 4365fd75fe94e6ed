use crate::{
	Error, Result,
	sdf::{self, CHILDREN_KEYS, FIELD_KEYS},
	tf, usda,
	vt::{self, ValueType},
};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static LAYER_REGISTRY_LOCK: OnceLock<Mutex<HashMap<String, Arc<Layer>>>> = OnceLock::new();
static ANONYMOUS_LAYER_COUNT: AtomicU64 = AtomicU64::new(0);
static CHANGE_GENERATION: AtomicU64 = AtomicU64::new(0);

fn get_layer_registry() -> &'static Mutex<HashMap<String, Arc<Layer>>> {
	LAYER_REGISTRY_LOCK.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Return a counter that increases whenever any layer's content changes.
pub fn change_generation() -> u64 {
	CHANGE_GENERATION.load(Ordering::Acquire)
}

/// Return `identifier` as an absolute, lexically normalized path using `/`
/// separators. Anonymous identifiers are returned unchanged.
pub fn normalize_identifier(identifier: &str) -> String {
	if identifier.starts_with("anon:") {
		return identifier.to_string();
	}

	let path = Path::new(identifier);
	let absolute = if path.is_absolute() {
		path.to_path_buf()
	} else {
		std::env::current_dir().unwrap_or_default().join(path)
	};

	let mut normalized = PathBuf::new();
	for component in absolute.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	normalized.to_string_lossy().replace('\\', "/")
}

/// A scene description container that can combine with other such containers
/// to form simple component assets, and successively larger aggregates.
/// The contents of a Layer adhere to the [sdf::AbstractData] data model.
///
/// Layers are registered by identifier for the lifetime of the process, so
/// stages resolve sublayers, references and payloads without reading files.
pub struct Layer {
	identifier: String,
	anonymous: bool,
	format: sdf::FileFormat,
	args: sdf::FileFormatArguments,
	data: RwLock<Box<dyn sdf::AbstractData>>,
	dirty: AtomicBool,
	permission_to_edit: AtomicBool,
}

impl std::fmt::Debug for Layer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Layer")
			.field("identifier", &self.identifier)
			.field("format", &self.format)
			.finish()
	}
}

/// Creation and lookup
impl Layer {
	fn new(identifier: String, anonymous: bool, format: sdf::FileFormat, args: sdf::FileFormatArguments) -> Self {
		Self {
			identifier,
			anonymous,
			format,
			args,
			data: RwLock::new(Box::new(sdf::Data::new())),
			dirty: AtomicBool::new(false),
			permission_to_edit: AtomicBool::new(true),
		}
	}

	/// Create a new empty layer at `identifier` and write it to disk.
	///
	/// A layer previously registered under the same identifier is replaced.
	pub fn create_new(identifier: &str, args: &sdf::FileFormatArguments) -> Result<Arc<Self>> {
		let format = sdf::FileFormat::for_identifier(identifier, args).ok_or_else(|| {
			Error::InvalidArgument(format!("\"{}\" does not name a supported file format", identifier))
		})?;

		let identifier = normalize_identifier(identifier);
		let layer = Arc::new(Self::new(identifier.clone(), false, format, args.clone()));
		layer.save()?;

		get_layer_registry()
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(identifier, layer.clone());

		log::debug!("created layer {}", layer.identifier);
		Ok(layer)
	}

	/// Create a new in-memory layer. `tag` becomes part of its identifier.
	pub fn create_anonymous(tag: &str) -> Arc<Self> {
		let count = ANONYMOUS_LAYER_COUNT.fetch_add(1, Ordering::Relaxed);
		let identifier = format!("anon:{:016x}:{}", count, tag);
		let layer = Arc::new(Self::new(
			identifier.clone(),
			true,
			sdf::FileFormat::Usda,
			sdf::FileFormatArguments::new(),
		));

		get_layer_registry()
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(identifier, layer.clone());

		layer
	}

	/// Return the registered layer for `identifier`.
	pub fn find(identifier: &str) -> Option<Arc<Self>> {
		let identifier = normalize_identifier(identifier);
		get_layer_registry()
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&identifier)
			.cloned()
	}

	/// Return the registered layer for `identifier`, creating it when none exists.
	pub fn find_or_create(identifier: &str, args: &sdf::FileFormatArguments) -> Result<Arc<Self>> {
		match Self::find(identifier) {
			Some(layer) => Ok(layer),
			None => Self::create_new(identifier, args),
		}
	}
}

/// Identity
impl Layer {
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	pub fn is_anonymous(&self) -> bool {
		self.anonymous
	}

	/// Return the file path of this layer, or `None` for anonymous layers.
	pub fn real_path(&self) -> Option<PathBuf> {
		(!self.anonymous).then(|| PathBuf::from(&self.identifier))
	}

	/// Return the file name of the layer, or the tag of an anonymous layer.
	pub fn display_name(&self) -> &str {
		self.identifier.rsplit(['/', ':']).next().unwrap_or_default()
	}

	pub fn file_format(&self) -> sdf::FileFormat {
		self.format
	}

	pub fn file_format_arguments(&self) -> &sdf::FileFormatArguments {
		&self.args
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty.load(Ordering::Acquire)
	}

	pub fn permission_to_edit(&self) -> bool {
		self.permission_to_edit.load(Ordering::Acquire)
	}

	pub fn set_permission_to_edit(&self, allow: bool) {
		self.permission_to_edit.store(allow, Ordering::Release);
	}

	/// Resolve `asset_path` against the directory of this layer.
	pub fn resolve_path(&self, asset_path: &str) -> String {
		if asset_path.is_empty() || asset_path.starts_with("anon:") {
			return asset_path.to_string();
		}

		let path = Path::new(asset_path);
		if path.is_absolute() || self.anonymous {
			return normalize_identifier(asset_path);
		}

		let base = Path::new(&self.identifier)
			.parent()
			.unwrap_or(Path::new("/"));
		normalize_identifier(&base.join(path).to_string_lossy())
	}
}

/// Spec access
impl Layer {
	pub(crate) fn data(&self) -> RwLockReadGuard<'_, Box<dyn sdf::AbstractData>> {
		self.data.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn data_mut(&self) -> RwLockWriteGuard<'_, Box<dyn sdf::AbstractData>> {
		self.dirty.store(true, Ordering::Release);
		CHANGE_GENERATION.fetch_add(1, Ordering::AcqRel);
		self.data.write().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn has_spec(&self, path: &sdf::Path) -> bool {
		self.data().has_spec(path)
	}

	pub fn spec_type(&self, path: &sdf::Path) -> Option<sdf::SpecType> {
		self.data().spec_type(path)
	}

	pub fn field(&self, path: &sdf::Path, key: &tf::Token) -> Option<vt::Value> {
		self.data().get(path, key)
	}

	pub fn field_as<T: ValueType>(&self, path: &sdf::Path, key: &tf::Token) -> Option<T> {
		self.field(path, key).and_then(|v| v.get::<T>())
	}

	pub fn has_field(&self, path: &sdf::Path, key: &tf::Token) -> bool {
		self.data().get(path, key).is_some()
	}

	pub fn list_fields(&self, path: &sdf::Path) -> Vec<tf::Token> {
		self.data().list(path)
	}

	/// Set a field on an existing spec. Returns false if there is no spec at `path`.
	pub fn set_field(&self, path: &sdf::Path, key: &tf::Token, value: impl Into<vt::Value>) -> bool {
		if !self.has_spec(path) {
			return false;
		}
		self.data_mut().set(path, key, value.into());
		true
	}

	pub fn erase_field(&self, path: &sdf::Path, key: &tf::Token) {
		if self.has_field(path, key) {
			self.data_mut().erase(path, key);
		}
	}

	/// Return the names of the prim children of the spec at `path`.
	pub fn prim_children(&self, path: &sdf::Path) -> Vec<tf::Token> {
		self.field_as::<vt::Array<tf::Token>>(path, &CHILDREN_KEYS.prim_children)
			.unwrap_or_default()
	}

	/// Return the names of the properties of the prim spec at `path`.
	pub fn property_names(&self, path: &sdf::Path) -> Vec<tf::Token> {
		self.field_as::<vt::Array<tf::Token>>(path, &CHILDREN_KEYS.property_children)
			.unwrap_or_default()
	}

	/// Create or update the prim spec at `path`.
	///
	/// Missing ancestors are created as `over` specs. An empty `type_name`
	/// leaves the authored type untouched.
	pub fn create_prim_spec(&self, path: &sdf::Path, specifier: sdf::Specifier, type_name: &tf::Token) -> bool {
		if !path.is_absolute_prim_path() {
			return false;
		}

		let mut data = self.data_mut();
		ensure_prim_spec(data.as_mut(), path);
		data.set(path, &FIELD_KEYS.specifier, vt::Value::new(specifier));
		if !type_name.is_empty() {
			data.set(path, &FIELD_KEYS.type_name, vt::Value::new(type_name.clone()));
		}
		true
	}

	/// Make sure a prim spec exists at `path`, creating `over` specs as needed.
	pub fn ensure_prim_spec(&self, path: &sdf::Path) -> bool {
		if !path.is_absolute_prim_path() {
			return false;
		}
		if self.spec_type(path) == Some(sdf::SpecType::Prim) {
			return true;
		}
		ensure_prim_spec(self.data_mut().as_mut(), path);
		true
	}

	/// Create the attribute or relationship spec at `path`, creating the
	/// owning prim spec as an `over` if needed.
	pub fn create_property_spec(
		&self,
		path: &sdf::Path,
		spec_type: sdf::SpecType,
		type_name: Option<&tf::Token>,
		custom: bool,
	) -> bool {
		if !path.is_prim_property_path() || !path.is_absolute_path() {
			return false;
		}

		let prim_path = path.prim_path();
		let name = path.name_token();

		let mut data = self.data_mut();
		ensure_prim_spec(data.as_mut(), &prim_path);
		if data.spec_type(path) != Some(spec_type) {
			data.create_spec(path, spec_type);
		}
		add_child_name(data.as_mut(), &prim_path, &CHILDREN_KEYS.property_children, &name);

		if let Some(type_name) = type_name {
			data.set(path, &FIELD_KEYS.type_name, vt::Value::new(type_name.clone()));
		}
		if custom {
			data.set(path, &FIELD_KEYS.custom, vt::Value::new(true));
		}
		true
	}

	/// Remove the spec at `path` together with every spec beneath it.
	pub fn remove_spec(&self, path: &sdf::Path) -> bool {
		if !self.has_spec(path) || path.is_absolute_root() {
			return false;
		}

		let mut data = self.data_mut();
		for spec_path in data.visit_specs() {
			if spec_path.has_prefix(path) {
				data.erase_spec(&spec_path);
			}
		}

		let (owner, key) = if path.is_prim_property_path() {
			(path.prim_path(), &CHILDREN_KEYS.property_children)
		} else {
			(path.parent_path(), &CHILDREN_KEYS.prim_children)
		};
		remove_child_name(data.as_mut(), &owner, key, &path.name_token());
		true
	}

	/// Return true if the spec at `path` holds no fields besides its
	/// specifier and children lists.
	pub fn is_inert_spec(&self, path: &sdf::Path) -> bool {
		self.list_fields(path).iter().all(|field| {
			*field == FIELD_KEYS.specifier
				|| *field == CHILDREN_KEYS.prim_children
				|| *field == CHILDREN_KEYS.property_children
		}) && self.prim_children(path).is_empty()
			&& self.property_names(path).is_empty()
	}

	/// Remove every spec and all layer metadata.
	pub fn clear(&self) {
		*self.data_mut() = Box::new(sdf::Data::new());
	}
}

fn ensure_prim_spec(data: &mut dyn sdf::AbstractData, path: &sdf::Path) {
	if path.is_absolute_root() || data.spec_type(path) == Some(sdf::SpecType::Prim) {
		return;
	}

	let parent = path.parent_path();
	ensure_prim_spec(data, &parent);

	data.create_spec(path, sdf::SpecType::Prim);
	if data.get(path, &FIELD_KEYS.specifier).is_none() {
		data.set(path, &FIELD_KEYS.specifier, vt::Value::new(sdf::Specifier::Over));
	}
	add_child_name(data, &parent, &CHILDREN_KEYS.prim_children, &path.name_token());
}

fn add_child_name(data: &mut dyn sdf::AbstractData, owner: &sdf::Path, key: &tf::Token, name: &tf::Token) {
	let mut names = data
		.get(owner, key)
		.and_then(|v| v.get::<vt::Array<tf::Token>>())
		.unwrap_or_default();
	if !names.contains(name) {
		names.push(name.clone());
		data.set(owner, key, vt::Value::new(names));
	}
}

fn remove_child_name(data: &mut dyn sdf::AbstractData, owner: &sdf::Path, key: &tf::Token, name: &tf::Token) {
	let Some(mut names) = data.get(owner, key).and_then(|v| v.get::<vt::Array<tf::Token>>()) else {
		return;
	};
	names.retain(|n| n != name);
	if names.is_empty() {
		data.erase(owner, key);
	} else {
		data.set(owner, key, vt::Value::new(names));
	}
}

/// Metadata
impl Layer {
	fn root_field<T: ValueType>(&self, key: &tf::Token) -> Option<T> {
		self.field_as(&sdf::Path::absolute_root_path(), key)
	}

	/// Set layer metadata. An empty value clears the field.
	pub fn set_root_field(&self, key: &tf::Token, value: impl Into<vt::Value>) {
		let value = value.into();
		if value.is_empty() {
			self.erase_field(&sdf::Path::absolute_root_path(), key);
		} else {
			self.set_field(&sdf::Path::absolute_root_path(), key, value);
		}
	}

	pub fn root_field_value(&self, key: &tf::Token) -> Option<vt::Value> {
		self.field(&sdf::Path::absolute_root_path(), key)
	}

	/// Return this layer's 'defaultPrim' metadata.
	pub fn default_prim(&self) -> tf::Token {
		self.root_field(&FIELD_KEYS.default_prim).unwrap_or_default()
	}

	pub fn has_default_prim(&self) -> bool {
		!self.default_prim().is_empty()
	}

	pub fn set_default_prim(&self, name: &tf::Token) {
		self.set_root_field(&FIELD_KEYS.default_prim, name.clone());
	}

	pub fn clear_default_prim(&self) {
		self.erase_field(&sdf::Path::absolute_root_path(), &FIELD_KEYS.default_prim);
	}

	/// Return this layer's 'defaultPrim' metadata interpreted as an absolute prim path.
	pub fn default_prim_as_path(&self) -> sdf::Path {
		let default_prim_token = self.default_prim();
		if default_prim_token.is_empty() {
			return sdf::Path::empty_path();
		}
		if default_prim_token.as_str().starts_with('/') {
			return sdf::Path::from(default_prim_token.as_str());
		}
		sdf::Path::absolute_root_path().append_child(&default_prim_token)
	}

	pub fn sub_layer_paths(&self) -> vt::Array<String> {
		self.root_field(&FIELD_KEYS.sub_layers).unwrap_or_default()
	}

	pub fn set_sub_layer_paths(&self, paths: vt::Array<String>) {
		if paths.is_empty() {
			self.erase_field(&sdf::Path::absolute_root_path(), &FIELD_KEYS.sub_layers);
		} else {
			self.set_root_field(&FIELD_KEYS.sub_layers, paths);
		}
	}

	/// Insert a sublayer path at `index`, or append it when `index` is `None`
	/// or past the end. Sublayers are ordered strongest first.
	pub fn insert_sub_layer_path(&self, path: &str, index: Option<usize>) {
		let mut paths = self.sub_layer_paths();
		let index = index.unwrap_or(paths.len()).min(paths.len());
		paths.insert(index, path.to_string());
		self.set_sub_layer_paths(paths);
	}

	pub fn custom_layer_data(&self) -> vt::Dictionary {
		self.root_field(&FIELD_KEYS.custom_layer_data).unwrap_or_default()
	}

	pub fn set_custom_layer_data(&self, data: vt::Dictionary) {
		if data.is_empty() {
			self.erase_field(&sdf::Path::absolute_root_path(), &FIELD_KEYS.custom_layer_data);
		} else {
			self.set_root_field(&FIELD_KEYS.custom_layer_data, data);
		}
	}

	pub fn comment(&self) -> String {
		self.root_field(&FIELD_KEYS.comment).unwrap_or_default()
	}

	pub fn set_comment(&self, comment: &str) {
		self.set_root_field(&FIELD_KEYS.comment, comment.to_string());
	}
}

/// Serialization
impl Layer {
	/// Return the text form of this layer.
	pub fn export_to_string(&self) -> String {
		usda::write_layer(self)
	}

	/// Write this layer to `path` without changing its identity.
	pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		write_text(path, &self.export_to_string())
	}

	/// Write this layer to its file and clear the dirty flag.
	pub fn save(&self) -> Result<()> {
		let Some(path) = self.real_path() else {
			return Err(Error::InvalidArgument(format!(
				"Cannot save anonymous layer \"{}\"",
				self.identifier
			)));
		};
		write_text(&path, &self.export_to_string())?;
		self.dirty.store(false, Ordering::Release);
		log::debug!("saved layer {}", self.identifier);
		Ok(())
	}
}

fn write_text(path: &Path, text: &str) -> Result<()> {
	let io_error = |source| Error::Io {
		path: path.to_path_buf(),
		source,
	};
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).map_err(io_error)?;
	}
	std::fs::write(path, text).map_err(io_error)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn p(s: &str) -> sdf::Path {
		sdf::Path::from(s)
	}

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	#[test]
	fn prim_specs_create_ancestors() {
		let layer = Layer::create_anonymous("test");
		assert!(layer.create_prim_spec(&p("/World/Geometry/Cube"), sdf::Specifier::Def, &t("Cube")));

		assert_eq!(layer.prim_children(&sdf::Path::absolute_root_path()), vec![t("World")]);
		assert_eq!(layer.prim_children(&p("/World")), vec![t("Geometry")]);
		assert_eq!(
			layer.field_as::<sdf::Specifier>(&p("/World"), &FIELD_KEYS.specifier),
			Some(sdf::Specifier::Over)
		);
		assert_eq!(
			layer.field_as::<tf::Token>(&p("/World/Geometry/Cube"), &FIELD_KEYS.type_name),
			Some(t("Cube"))
		);
		assert!(layer.is_dirty());
	}

	#[test]
	fn remove_spec_removes_subtree() {
		let layer = Layer::create_anonymous("test");
		layer.create_prim_spec(&p("/World/A/B"), sdf::Specifier::Def, &t(""));
		layer.create_property_spec(&p("/World/A.size"), sdf::SpecType::Attribute, Some(&t("double")), false);

		assert!(layer.remove_spec(&p("/World/A")));
		assert!(!layer.has_spec(&p("/World/A/B")));
		assert!(!layer.has_spec(&p("/World/A.size")));
		assert!(layer.prim_children(&p("/World")).is_empty());
	}

	#[test]
	fn sub_layer_insertion() {
		let layer = Layer::create_anonymous("test");
		layer.insert_sub_layer_path("./a.usda", None);
		layer.insert_sub_layer_path("./b.usda", None);
		layer.insert_sub_layer_path("./c.usda", Some(0));
		assert_eq!(layer.sub_layer_paths(), vec!["./c.usda", "./a.usda", "./b.usda"]);
	}

	#[test]
	fn resolve_relative_to_layer() {
		let layer = Arc::new(Layer::new(
			"/assets/Car/Car.usda".to_string(),
			false,
			sdf::FileFormat::Usda,
			sdf::FileFormatArguments::new(),
		));
		assert_eq!(layer.resolve_path("./Payload/Contents.usda"), "/assets/Car/Payload/Contents.usda");
		assert_eq!(layer.resolve_path("../Wheel/Wheel.usda"), "/assets/Wheel/Wheel.usda");
		assert_eq!(layer.resolve_path(""), "");
		assert_eq!(layer.display_name(), "Car.usda");
	}

	#[test]
	fn anonymous_layers_are_registered() {
		let layer = Layer::create_anonymous("scratch");
		assert!(layer.is_anonymous());
		assert!(layer.identifier().ends_with(":scratch"));
		let found = Layer::find(layer.identifier()).map(|l| Arc::ptr_eq(&l, &layer));
		assert_eq!(found, Some(true));
		assert!(layer.save().is_err());
	}
}
