use super::{ConnectableApi, TOKENS};
use crate::{sdf::VALUE_TYPE_NAMES, tf, usd};

usd::declare_typed_schema!(
	/// Base class for all USD shaders. Shaders are the building blocks of
	/// shading networks, identified by their `info:id`.
	Shader,
	"Shader"
);

usd::declare_typed_schema!(
	/// A container for shading nodes and other node graphs, exposing an
	/// interface of inputs and outputs.
	NodeGraph,
	"NodeGraph"
);

impl<'a> ConnectableApi<'a> for Shader<'a> {}
impl<'a> ConnectableApi<'a> for NodeGraph<'a> {}

impl<'a> Shader<'a> {
	pub fn id_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.info_id)
	}

	/// Return the identifier of the shader implementation.
	pub fn shader_id(&self) -> Option<tf::Token> {
		self.id_attr().get::<tf::Token>()
	}

	pub fn set_shader_id(&self, id: &tf::Token) -> bool {
		self.create_uniform_attribute(&TOKENS.info_id, &VALUE_TYPE_NAMES.token)
			.set(id.clone())
	}
}
