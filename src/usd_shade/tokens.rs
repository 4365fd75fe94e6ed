use crate::{declare_public_tokens, tf};

declare_public_tokens!(Tokens, TOKENS, [
	inputs: "inputs:",
	outputs: "outputs:",
	info_id: "info:id",
	connectability: "connectability",
	full: "full",
	interface_only: "interfaceOnly",

	surface: "surface",
	displacement: "displacement",
	volume: "volume",
	universal_render_context: "",

	material_binding: "material:binding",
	material_binding_api: "MaterialBindingAPI",
	all_purpose: "",
	physics: "physics",
	node_graph: "NodeGraph",
]);
