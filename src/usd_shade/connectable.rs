use super::TOKENS;
use crate::{sdf, tf, usd, vt};

fn prefixed(prefix: &tf::Token, name: &tf::Token) -> tf::Token {
	if name.as_str().starts_with(prefix.as_str()) {
		name.clone()
	} else {
		tf::Token::new(format!("{}{}", prefix, name))
	}
}

/// Remove the connection opinion at the edit target, and author an empty
/// explicit list if a weaker layer still connects `attr`.
fn disconnect(attr: &usd::Attribute) -> bool {
	if !attr.clear_connections() {
		return false;
	}
	if attr.has_authored_connections() {
		return attr.set_connections(Vec::new());
	}
	true
}

fn has_valid_source(stage: &usd::Stage, sources: &[sdf::Path]) -> bool {
	sources
		.iter()
		.any(|source| stage.prim_at_path(source.prim_path()).is_valid())
}

/// An input on a shader or node graph: an attribute in the `inputs:`
/// namespace, which may hold a value or connect to a source.
#[derive(Clone, PartialEq)]
pub struct Input<'a> {
	attr: usd::Attribute<'a>,
}

impl<'a> Input<'a> {
	pub(crate) fn new(prim: &usd::Prim<'a>, name: &tf::Token) -> Self {
		Self {
			attr: prim.attribute(&prefixed(&TOKENS.inputs, name)),
		}
	}

	pub(crate) fn create(prim: &usd::Prim<'a>, name: &tf::Token, type_name: &tf::Token) -> Self {
		Self {
			attr: prim.create_attribute(&prefixed(&TOKENS.inputs, name), type_name, false),
		}
	}

	/// Wrap `attr` if it is in the `inputs:` namespace.
	pub fn from_attribute(attr: usd::Attribute<'a>) -> Option<Self> {
		Self::is_input(&attr).then_some(Self { attr })
	}

	pub fn is_input(attr: &usd::Attribute) -> bool {
		attr.name().as_str().starts_with(TOKENS.inputs.as_str())
	}

	pub fn attr(&self) -> &usd::Attribute<'a> {
		&self.attr
	}

	/// Return the name without the `inputs:` prefix.
	pub fn base_name(&self) -> tf::Token {
		let name = self.attr.name();
		match name.as_str().strip_prefix(TOKENS.inputs.as_str()) {
			Some(base) => tf::Token::new(base),
			None => name,
		}
	}

	pub fn connectability(&self) -> tf::Token {
		self.attr
			.metadata::<tf::Token>(&TOKENS.connectability)
			.unwrap_or_else(|| TOKENS.full.clone())
	}

	pub fn set_connectability(&self, connectability: &tf::Token) -> bool {
		self.attr.set_metadata(&TOKENS.connectability, connectability.clone())
	}

	/// Author a connection from this input to the attribute at `source`.
	pub fn connect_to_source(&self, source: &sdf::Path) -> bool {
		self.attr.set_connections(vec![source.clone()])
	}

	pub fn connected_sources(&self) -> Vec<sdf::Path> {
		self.attr.connections()
	}

	/// Return true if this input connects to an attribute on a valid prim.
	pub fn has_connected_source(&self) -> bool {
		has_valid_source(self.attr.stage(), &self.connected_sources())
	}

	/// Return true if this input connects to an input of a material or node graph.
	pub fn is_connected_to_interface(&self) -> bool {
		self.connected_sources().iter().any(|source| {
			let prim = self.attr.stage().prim_at_path(source.prim_path());
			prim.is_a(&tf::Token::new("NodeGraph")) && source.name().starts_with(TOKENS.inputs.as_str())
		})
	}

	/// Break the connections of this input at the edit target.
	pub fn disconnect_source(&self) -> bool {
		disconnect(&self.attr)
	}

	/// Remove the connection opinion at the edit target only.
	pub fn clear_sources(&self) -> bool {
		self.attr.clear_connections()
	}

	/// Compute the value that flows into this input. Connections to other
	/// inputs are followed; a connection to an output yields `None`.
	pub fn compute_value(&self) -> Option<vt::Value> {
		let mut current = self.clone();
		let mut visited = Vec::new();
		loop {
			let Some(source) = current.connected_sources().into_iter().next() else {
				return current.attr.get_value();
			};
			if visited.contains(&source) {
				return None;
			}
			visited.push(source.clone());
			let attr = current.attr.stage().prim_at_path(source.prim_path()).attribute(&source.name_token());
			current = Input::from_attribute(attr)?;
		}
	}
}

impl<'a> std::ops::Deref for Input<'a> {
	type Target = usd::Attribute<'a>;
	fn deref(&self) -> &Self::Target {
		&self.attr
	}
}

impl std::fmt::Debug for Input<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Input<{}>", self.attr.path())
	}
}

/// An output on a shader, node graph or material: an attribute in the
/// `outputs:` namespace.
#[derive(Clone, PartialEq)]
pub struct Output<'a> {
	attr: usd::Attribute<'a>,
}

impl<'a> Output<'a> {
	pub(crate) fn new(prim: &usd::Prim<'a>, name: &tf::Token) -> Self {
		Self {
			attr: prim.attribute(&prefixed(&TOKENS.outputs, name)),
		}
	}

	pub(crate) fn create(prim: &usd::Prim<'a>, name: &tf::Token, type_name: &tf::Token) -> Self {
		Self {
			attr: prim.create_attribute(&prefixed(&TOKENS.outputs, name), type_name, false),
		}
	}

	pub fn from_attribute(attr: usd::Attribute<'a>) -> Option<Self> {
		attr.name()
			.as_str()
			.starts_with(TOKENS.outputs.as_str())
			.then_some(Self { attr })
	}

	pub fn attr(&self) -> &usd::Attribute<'a> {
		&self.attr
	}

	/// Return the name without the `outputs:` prefix.
	pub fn base_name(&self) -> tf::Token {
		let name = self.attr.name();
		match name.as_str().strip_prefix(TOKENS.outputs.as_str()) {
			Some(base) => tf::Token::new(base),
			None => name,
		}
	}

	pub fn connect_to_source(&self, source: &sdf::Path) -> bool {
		self.attr.set_connections(vec![source.clone()])
	}

	pub fn connected_sources(&self) -> Vec<sdf::Path> {
		self.attr.connections()
	}

	pub fn has_connected_source(&self) -> bool {
		has_valid_source(self.attr.stage(), &self.connected_sources())
	}

	pub fn disconnect_source(&self) -> bool {
		disconnect(&self.attr)
	}
}

impl<'a> std::ops::Deref for Output<'a> {
	type Target = usd::Attribute<'a>;
	fn deref(&self) -> &Self::Target {
		&self.attr
	}
}

impl std::fmt::Debug for Output<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Output<{}>", self.attr.path())
	}
}

/// Inputs and outputs shared by shaders, node graphs and materials.
pub trait ConnectableApi<'a>: usd::SchemaBase<'a> {
	fn create_input(&self, name: &tf::Token, type_name: &tf::Token) -> Input<'a> {
		Input::create(self.prim(), name, type_name)
	}

	/// Return the input named `name`, if it is authored.
	fn input(&self, name: &tf::Token) -> Option<Input<'a>> {
		let input = Input::new(self.prim(), name);
		input.is_valid().then_some(input)
	}

	fn inputs(&self) -> Vec<Input<'a>> {
		self.prim()
			.attributes_in_namespace(TOKENS.inputs.as_str())
			.into_iter()
			.filter_map(Input::from_attribute)
			.collect()
	}

	fn create_output(&self, name: &tf::Token, type_name: &tf::Token) -> Output<'a> {
		Output::create(self.prim(), name, type_name)
	}

	fn output(&self, name: &tf::Token) -> Option<Output<'a>> {
		let output = Output::new(self.prim(), name);
		output.is_valid().then_some(output)
	}

	fn outputs(&self) -> Vec<Output<'a>> {
		self.prim()
			.attributes_in_namespace(TOKENS.outputs.as_str())
			.into_iter()
			.filter_map(Output::from_attribute)
			.collect()
	}
}
