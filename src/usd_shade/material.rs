use super::{ConnectableApi, Output, Shader, TOKENS};
use crate::{sdf, sdf::VALUE_TYPE_NAMES, tf, usd, usd::SchemaBase};

usd::declare_typed_schema!(
	/// A Material provides a container into which multiple "render contexts"
	/// can add data that defines a "shading material" for a renderer.
	///
	/// Its terminal outputs are `outputs:surface` and `outputs:displacement`
	/// for the universal render context, and `outputs:<context>:surface`
	/// for specific ones.
	Material,
	"Material"
);

impl<'a> ConnectableApi<'a> for Material<'a> {}

fn terminal_name(render_context: &tf::Token, terminal: &tf::Token) -> tf::Token {
	if render_context.is_empty() {
		terminal.clone()
	} else {
		tf::Token::new(format!("{}:{}", render_context, terminal))
	}
}

impl<'a> Material<'a> {
	pub fn create_surface_output(&self, render_context: &tf::Token) -> Output<'a> {
		self.create_output(&terminal_name(render_context, &TOKENS.surface), &VALUE_TYPE_NAMES.token)
	}

	pub fn surface_output(&self, render_context: &tf::Token) -> Option<Output<'a>> {
		self.output(&terminal_name(render_context, &TOKENS.surface))
	}

	pub fn create_displacement_output(&self, render_context: &tf::Token) -> Output<'a> {
		self.create_output(&terminal_name(render_context, &TOKENS.displacement), &VALUE_TYPE_NAMES.token)
	}

	pub fn displacement_output(&self, render_context: &tf::Token) -> Option<Output<'a>> {
		self.output(&terminal_name(render_context, &TOKENS.displacement))
	}

	/// Return the surface outputs of every render context.
	pub fn surface_outputs(&self) -> Vec<Output<'a>> {
		self.outputs()
			.into_iter()
			.filter(|output| {
				let name = output.base_name();
				name == TOKENS.surface || name.as_str().ends_with(":surface")
			})
			.collect()
	}

	/// Return the surface outputs that connect to a shader.
	pub fn effective_surface_outputs(&self) -> Vec<Output<'a>> {
		self.surface_outputs()
			.into_iter()
			.filter(|output| self.source_shader(output).is_some())
			.collect()
	}

	/// Compute the shader driving the surface terminal, trying each of
	/// `render_contexts` and then the universal render context.
	pub fn compute_surface_source(&self, render_contexts: &[tf::Token]) -> Option<Shader<'a>> {
		render_contexts
			.iter()
			.chain(std::iter::once(&TOKENS.universal_render_context))
			.find_map(|context| {
				let output = self.surface_output(context)?;
				self.source_shader(&output)
			})
	}

	/// Follow the connections of `output` through node graph outputs to a shader.
	fn source_shader(&self, output: &Output<'a>) -> Option<Shader<'a>> {
		let stage = self.stage();
		let mut sources = output.connected_sources();
		let mut visited: Vec<sdf::Path> = Vec::new();
		while let Some(source) = sources.into_iter().next() {
			if visited.contains(&source) {
				return None;
			}
			visited.push(source.clone());

			let prim = stage.prim_at_path(source.prim_path());
			if let Some(shader) = Shader::from_prim(prim.clone()) {
				return Some(shader);
			}
			let next = Output::from_attribute(prim.attribute(&source.name_token()))?;
			sources = next.connected_sources();
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	#[test]
	fn surface_source_per_render_context() {
		let stage = usd::Stage::create_in_memory();
		let material = Material::define(&stage, "/Looks/Mat").unwrap();
		assert!(material.compute_surface_source(&[]).is_none());

		let preview = Shader::define(&stage, "/Looks/Mat/Preview").unwrap();
		let out = preview.create_output(&TOKENS.surface, &VALUE_TYPE_NAMES.token);
		material
			.create_surface_output(&TOKENS.universal_render_context)
			.connect_to_source(out.path());

		let mdl = Shader::define(&stage, "/Looks/Mat/Mdl").unwrap();
		let mdl_out = mdl.create_output(&t("out"), &VALUE_TYPE_NAMES.token);
		material.create_surface_output(&t("mdl")).connect_to_source(mdl_out.path());

		assert_eq!(material.compute_surface_source(&[]), Some(preview.clone()));
		assert_eq!(material.compute_surface_source(&[t("mdl")]), Some(mdl));
		assert_eq!(material.compute_surface_source(&[t("ri")]), Some(preview));
		assert_eq!(material.surface_outputs().len(), 2);
		assert_eq!(material.effective_surface_outputs().len(), 2);
	}

	#[test]
	fn node_graph_outputs_are_followed() {
		let stage = usd::Stage::create_in_memory();
		let material = Material::define(&stage, "/Looks/Mat").unwrap();
		let graph = crate::usd_shade::NodeGraph::define(&stage, "/Looks/Mat/Graph").unwrap();
		let shader = Shader::define(&stage, "/Looks/Mat/Graph/Surface").unwrap();
		let shader_out = shader.create_output(&TOKENS.surface, &VALUE_TYPE_NAMES.token);
		let graph_out = graph.create_output(&t("surface"), &VALUE_TYPE_NAMES.token);
		graph_out.connect_to_source(shader_out.path());
		material
			.create_surface_output(&TOKENS.universal_render_context)
			.connect_to_source(graph_out.path());

		assert_eq!(material.compute_surface_source(&[]), Some(shader));
	}
}
