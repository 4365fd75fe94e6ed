use super::{Prim, PrimRange};
use crate::{
	Error, Result, pcp,
	sdf::{self, CHILDREN_KEYS, FIELD_KEYS},
	tf, vt,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

#[derive(Default)]
struct CompositionCache {
	generation: u64,
	layer_stack: Option<Arc<pcp::LayerStack>>,
	indices: HashMap<sdf::Path, Option<Arc<pcp::PrimIndex>>>,
}

/// An opinion for a field, along with the index node it was found at.
#[derive(Debug, Clone)]
pub(crate) struct Opinion {
	pub node: usize,
	pub value: vt::Value,
}

/// The outermost container for scene description, which owns and presents composed prims as a scenegraph,
/// following the composition recipe recursively described in its associated "root layer".
///
/// All authoring goes to the stage's edit target, a layer of the root layer stack.
pub struct Stage {
	root_layer: Arc<sdf::Layer>,
	edit_target: RwLock<Arc<sdf::Layer>>,
	cache: Mutex<CompositionCache>,
}

impl std::fmt::Debug for Stage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Stage")
			.field("root_layer", &self.root_layer.identifier())
			.finish()
	}
}

/// Creation
impl Stage {
	/// Create a new stage with a new, empty root layer written at `identifier`.
	pub fn create_new(identifier: &str, args: &sdf::FileFormatArguments) -> Result<Self> {
		let layer = sdf::Layer::create_new(identifier, args)?;
		Ok(Self::open_layer(layer))
	}

	/// Create a new stage with an anonymous root layer.
	pub fn create_in_memory() -> Self {
		Self::open_layer(sdf::Layer::create_anonymous("stage"))
	}

	/// Open the stage whose root layer is registered under `identifier`.
	pub fn open(identifier: &str) -> Result<Self> {
		sdf::Layer::find(identifier)
			.map(Self::open_layer)
			.ok_or_else(|| Error::LayerNotFound(identifier.to_string()))
	}

	pub fn open_layer(root_layer: Arc<sdf::Layer>) -> Self {
		Self {
			edit_target: RwLock::new(root_layer.clone()),
			root_layer,
			cache: Mutex::new(CompositionCache::default()),
		}
	}
}

/// Layers and edit target
impl Stage {
	pub fn root_layer(&self) -> &Arc<sdf::Layer> {
		&self.root_layer
	}

	/// Return the local layer stack: the root layer and its sublayers, strongest first.
	pub fn layer_stack(&self) -> Arc<pcp::LayerStack> {
		let mut cache = self.cache();
		if let Some(layer_stack) = &cache.layer_stack {
			return layer_stack.clone();
		}
		let layer_stack = Arc::new(pcp::LayerStack::new(self.root_layer.clone()));
		cache.layer_stack = Some(layer_stack.clone());
		layer_stack
	}

	pub fn edit_target(&self) -> Arc<sdf::Layer> {
		self.edit_target
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Direct authoring to `layer`, which must belong to the local layer stack.
	pub fn set_edit_target(&self, layer: &Arc<sdf::Layer>) -> Result<()> {
		if !self.layer_stack().contains(layer) {
			return Err(Error::InvalidArgument(format!(
				"Layer @{}@ is not in the local LayerStack rooted at @{}@",
				layer.identifier(),
				self.root_layer.identifier()
			)));
		}
		*self.edit_target.write().unwrap_or_else(PoisonError::into_inner) = layer.clone();
		Ok(())
	}

	/// Return every layer contributing to this stage: the local layer stack,
	/// then the layers reached through references and payloads.
	pub fn used_layers(&self) -> Vec<Arc<sdf::Layer>> {
		let mut layers: Vec<Arc<sdf::Layer>> = self.layer_stack().layers.clone();
		for prim in self.traverse_all() {
			let Some(index) = self.prim_index(prim.path()) else {
				continue;
			};
			for (_, layer, _) in index.sites() {
				if !layers.iter().any(|l| Arc::ptr_eq(l, layer)) {
					layers.push(layer.clone());
				}
			}
		}
		layers
	}

	/// Save every dirty, non-anonymous layer used by this stage.
	pub fn save(&self) -> Result<()> {
		for layer in self.used_layers() {
			if layer.is_dirty() && !layer.is_anonymous() {
				layer.save()?;
			}
		}
		Ok(())
	}
}

/// Prims
impl Stage {
	pub fn pseudo_root(&self) -> Prim<'_> {
		Prim::new(self, sdf::Path::absolute_root_path())
	}

	/// Return the prim at `path`. Check [`Prim::is_valid`] on the result.
	pub fn prim_at_path(&self, path: impl Into<sdf::Path>) -> Prim<'_> {
		Prim::new(self, path.into())
	}

	/// Return the prim named by the root layer's `defaultPrim` metadata.
	pub fn default_prim(&self) -> Prim<'_> {
		self.prim_at_path(self.root_layer.default_prim_as_path())
	}

	pub fn has_default_prim(&self) -> bool {
		self.default_prim().is_valid()
	}

	/// Set the root layer's `defaultPrim` metadata to `prim`.
	pub fn set_default_prim(&self, prim: &Prim) -> Result<()> {
		let path = prim.path();
		if !prim.is_valid() || !path.parent_path().is_absolute_root() {
			return Err(Error::InvalidArgument(format!(
				"<{}> is not a valid root prim and cannot become the default prim",
				path
			)));
		}
		self.root_layer.set_default_prim(&path.name_token());
		Ok(())
	}

	pub fn clear_default_prim(&self) {
		self.root_layer.clear_default_prim();
	}

	/// Define a prim at `path` in the edit target.
	///
	/// Ancestors that are not yet defined become typeless `def` prims.
	pub fn define_prim(&self, path: impl Into<sdf::Path>, type_name: &tf::Token) -> Result<Prim<'_>> {
		self.author_prim(path.into(), sdf::Specifier::Def, type_name)
	}

	/// Author an `over` for the prim at `path` in the edit target.
	pub fn override_prim(&self, path: impl Into<sdf::Path>) -> Result<Prim<'_>> {
		let path = path.into();
		self.check_prim_path(&path)?;
		let layer = self.editable_target()?;
		layer.ensure_prim_spec(&path);
		Ok(self.prim_at_path(path))
	}

	/// Define an abstract `class` prim at `path` in the edit target.
	pub fn create_class_prim(&self, path: impl Into<sdf::Path>) -> Result<Prim<'_>> {
		self.author_prim(path.into(), sdf::Specifier::Class, &tf::Token::empty())
	}

	/// Remove the prim spec at `path`, and all of its descendants, from the edit target.
	pub fn remove_prim(&self, path: &sdf::Path) -> bool {
		let layer = self.edit_target();
		layer.permission_to_edit() && layer.remove_spec(path)
	}

	fn author_prim(&self, path: sdf::Path, specifier: sdf::Specifier, type_name: &tf::Token) -> Result<Prim<'_>> {
		self.check_prim_path(&path)?;
		let layer = self.editable_target()?;

		let parent = path.parent_path();
		if !parent.is_absolute_root() && !self.prim_at_path(parent.clone()).is_defined() {
			self.author_prim(parent, sdf::Specifier::Def, &tf::Token::empty())?;
		}

		layer.create_prim_spec(&path, specifier, type_name);
		Ok(self.prim_at_path(path))
	}

	fn check_prim_path(&self, path: &sdf::Path) -> Result<()> {
		if path.is_absolute_prim_path() {
			Ok(())
		} else {
			Err(Error::InvalidArgument(format!("<{}> is not a valid absolute prim path", path)))
		}
	}

	pub(crate) fn editable_target(&self) -> Result<Arc<sdf::Layer>> {
		let layer = self.edit_target();
		if layer.permission_to_edit() {
			Ok(layer)
		} else {
			Err(Error::Authority(format!(
				"Cannot author to layer @{}@ without permission to edit",
				layer.identifier()
			)))
		}
	}

	/// Traverse the active, defined, non-abstract prims below the pseudo-root in depth-first order.
	pub fn traverse(&self) -> PrimRange<'_> {
		PrimRange::children_of(self.pseudo_root())
	}

	/// Traverse every composed prim, regardless of activation or specifier.
	pub fn traverse_all(&self) -> PrimRange<'_> {
		PrimRange::children_of(self.pseudo_root()).all_prims()
	}
}

/// Authority
impl Stage {
	/// Return true if an opinion for `field` authored at the edit target would
	/// be the strongest in the local layer stack.
	pub fn has_authority(&self, path: &sdf::Path, field: &tf::Token) -> bool {
		let target = self.edit_target();
		if !target.permission_to_edit() {
			return false;
		}
		let layer_stack = self.layer_stack();
		let Some(target_pos) = layer_stack
			.layers
			.iter()
			.position(|l| l.identifier() == target.identifier())
		else {
			return false;
		};
		!layer_stack.layers[..target_pos]
			.iter()
			.any(|layer| layer.has_field(path, field))
	}

	/// Return true if the edit target holds the strongest spec at `path` and
	/// may therefore remove it.
	pub fn has_spec_authority(&self, path: &sdf::Path) -> bool {
		let target = self.edit_target();
		if !target.permission_to_edit() || !target.has_spec(path) {
			return false;
		}
		self.layer_stack()
			.layers
			.iter()
			.find(|layer| layer.has_spec(path))
			.is_some_and(|layer| layer.identifier() == target.identifier())
	}
}

/// Composition
impl Stage {
	fn cache(&self) -> std::sync::MutexGuard<'_, CompositionCache> {
		let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
		let generation = sdf::change_generation();
		if cache.generation != generation {
			*cache = CompositionCache {
				generation,
				..Default::default()
			};
		}
		cache
	}

	/// Return the prim index of the prim at `path` (or owning `path`), if that
	/// prim exists on the composed stage.
	pub(crate) fn prim_index(&self, path: &sdf::Path) -> Option<Arc<pcp::PrimIndex>> {
		let prim_path = path.prim_path();
		if !prim_path.is_absolute_prim_path() && !prim_path.is_absolute_root() {
			return None;
		}

		if let Some(cached) = self.cache().indices.get(&prim_path) {
			return cached.clone();
		}

		let index = self.compute_prim_index(&prim_path);
		self.cache().indices.insert(prim_path, index.clone());
		index
	}

	fn compute_prim_index(&self, prim_path: &sdf::Path) -> Option<Arc<pcp::PrimIndex>> {
		let layer_stack = self.layer_stack();

		if !prim_path.is_absolute_root() {
			let parent_path = prim_path.parent_path();
			if !parent_path.is_absolute_root() {
				self.prim_index(&parent_path)?;
				let active = self
					.resolve_value(&parent_path, &FIELD_KEYS.active)
					.and_then(|v| v.get::<bool>())
					.unwrap_or(true);
				if !active {
					return None;
				}
			}
			let name = prim_path.name_token();
			if !self.compose_children(&parent_path).contains(&name) {
				return None;
			}
		}

		let index = pcp::PrimIndex::new(layer_stack, prim_path.clone());
		(index.is_valid() && (prim_path.is_absolute_root() || index.has_specs())).then(|| Arc::new(index))
	}

	/// Return every opinion for `field` at `path`, strongest first.
	pub(crate) fn opinions(&self, path: &sdf::Path, field: &tf::Token) -> Vec<Opinion> {
		let Some(index) = self.prim_index(path) else {
			return Vec::new();
		};

		let property = path.is_prim_property_path().then(|| path.name_token());
		index
			.sites()
			.filter_map(|(node, layer, site_path)| {
				let site = match &property {
					Some(name) => site_path.append_property(name),
					None => site_path.clone(),
				};
				layer.field(&site, field).map(|value| Opinion { node, value })
			})
			.collect()
	}

	/// Return the composed spec type of the object at `path`.
	pub(crate) fn spec_type(&self, path: &sdf::Path) -> Option<sdf::SpecType> {
		let index = self.prim_index(path)?;
		let property = path.is_prim_property_path().then(|| path.name_token());
		index.sites().find_map(|(_, layer, site_path)| {
			let site = match &property {
				Some(name) => site_path.append_property(name),
				None => site_path.clone(),
			};
			layer.spec_type(&site)
		})
	}

	/// Resolve the value of `field` at `path` across all contributing sites.
	///
	/// The strongest opinion wins, except that dictionaries merge key by key
	/// and list ops compose. Path list ops are mapped to the stage namespace
	/// and returned as explicit lists. A value block yields `None`.
	pub(crate) fn resolve_value(&self, path: &sdf::Path, field: &tf::Token) -> Option<vt::Value> {
		let opinions = self.opinions(path, field);
		let strongest = opinions.first()?;
		if strongest.value.is_block() {
			return None;
		}

		if let Some(mut merged) = strongest.value.get::<vt::Dictionary>() {
			for weaker in opinions.iter().skip(1) {
				if let Some(dict) = weaker.value.get::<vt::Dictionary>() {
					merge_dictionary(&mut merged, dict);
				}
			}
			return Some(vt::Value::new(merged));
		}

		if strongest.value.is::<sdf::PathListOp>() {
			let index = self.prim_index(path)?;
			let ops: Vec<sdf::PathListOp> = opinions
				.iter()
				.filter_map(|opinion| {
					let op = opinion.value.get::<sdf::PathListOp>()?;
					Some(op.map(|p| index.map_to_root(opinion.node, p).unwrap_or_else(|| p.clone())))
				})
				.collect();
			return Some(vt::Value::new(sdf::PathListOp::explicit(sdf::ListOp::compose(ops.iter()))));
		}

		macro_rules! compose_list_op {
			($type:ty) => {
				if strongest.value.is::<$type>() {
					let ops: Vec<$type> = opinions.iter().filter_map(|o| o.value.get::<$type>()).collect();
					return Some(vt::Value::new(<$type>::explicit(sdf::ListOp::compose(ops.iter()))));
				}
			};
		}

		compose_list_op!(sdf::TokenListOp);
		compose_list_op!(sdf::StringListOp);
		compose_list_op!(sdf::ReferenceListOp);
		compose_list_op!(sdf::PayloadListOp);

		Some(strongest.value.clone())
	}

	/// Return the composed child names of the prim at `path`.
	pub(crate) fn compose_children(&self, path: &sdf::Path) -> vt::Array<tf::Token> {
		self.compose_names(path, &CHILDREN_KEYS.prim_children, false)
	}

	/// Return the composed property names of the prim at `path`, sorted.
	pub(crate) fn compose_properties(&self, path: &sdf::Path) -> vt::Array<tf::Token> {
		self.compose_names(path, &CHILDREN_KEYS.property_children, true)
	}

	fn compose_names(&self, path: &sdf::Path, key: &tf::Token, sorted: bool) -> vt::Array<tf::Token> {
		let Some(index) = self.prim_index(path) else {
			return vt::Array::new();
		};

		let mut names: Vec<tf::Token> = Vec::new();
		for (_, layer, site_path) in index.sites() {
			for name in layer.field_as::<vt::Array<tf::Token>>(site_path, key).unwrap_or_default() {
				if !names.contains(&name) {
					names.push(name);
				}
			}
		}

		if sorted {
			names.sort();
		}
		names
	}
}

fn merge_dictionary(strong: &mut vt::Dictionary, weak: vt::Dictionary) {
	for (key, weak_value) in weak {
		match strong.get_mut(&key) {
			Some(strong_value) => {
				if let (Some(mut strong_dict), Some(weak_dict)) =
					(strong_value.get::<vt::Dictionary>(), weak_value.get::<vt::Dictionary>())
				{
					merge_dictionary(&mut strong_dict, weak_dict);
					*strong_value = vt::Value::new(strong_dict);
				}
			}
			None => {
				strong.insert(key, weak_value);
			}
		}
	}
}
