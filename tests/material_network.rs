use openusd_exchange::{
	authoring::*,
	gf, sdf, tf,
	tf::DiagnosticKind,
	usd,
	usd::SchemaBase,
	usd_geom,
	usd_shade::{ConnectableApi, Material, MaterialBindingApi, Shader},
};

fn p(s: &str) -> sdf::Path {
	sdf::Path::from(s)
}

fn t(s: &str) -> tf::Token {
	tf::Token::new(s)
}

fn textured_material<'a>(stage: &'a usd::Stage, path: &str) -> Material<'a> {
	let material = define_preview_material(stage, &p(path), gf::Vec3f::new(0.8, 0.1, 0.1), 1.0, 0.4, 0.0).unwrap();
	add_diffuse_texture_to_preview_material(&material, &sdf::AssetPath::new("./Textures/color.png")).unwrap();
	add_roughness_texture_to_preview_material(&material, &sdf::AssetPath::new("./Textures/roughness.png")).unwrap();
	material
}

#[test]
fn textures_share_one_uv_reader() {
	let stage = usd::Stage::create_in_memory();
	let material = textured_material(&stage, "/World/Looks/Paint");

	let uv_readers: Vec<_> = material
		.children()
		.into_iter()
		.filter_map(Shader::from_prim)
		.filter(|shader| shader.shader_id() == Some(t("UsdPrimvarReader_float2")))
		.collect();
	assert_eq!(uv_readers.len(), 1);
	assert_eq!(uv_readers[0].path(), &p("/World/Looks/Paint/TexCoordReader"));

	for name in ["DiffuseTexture", "RoughnessTexture"] {
		let reader = Shader::get(&stage, p("/World/Looks/Paint").append_child(&t(name))).unwrap();
		assert_eq!(reader.shader_id(), Some(t("UsdUVTexture")));
		assert_eq!(
			reader.input(&t("st")).unwrap().connected_sources(),
			vec![p("/World/Looks/Paint/TexCoordReader.outputs:result")]
		);
	}

	// The constants authored before the textures become their fallbacks.
	let diffuse = Shader::get(&stage, "/World/Looks/Paint/DiffuseTexture").unwrap();
	assert_eq!(
		diffuse.input(&t("fallback")).unwrap().get::<gf::Vec4f>(),
		Some(gf::Vec4f::new(0.8, 0.1, 0.1, 1.0))
	);
	let roughness = Shader::get(&stage, "/World/Looks/Paint/RoughnessTexture").unwrap();
	assert_eq!(
		roughness.input(&t("fallback")).unwrap().get::<gf::Vec4f>(),
		Some(gf::Vec4f::new(0.4, 0.0, 0.0, 1.0))
	);
	assert_eq!(
		diffuse.input(&t("sourceColorSpace")).unwrap().get::<tf::Token>(),
		Some(t("auto"))
	);
}

#[test]
fn opacity_textures_enable_cutouts() {
	let stage = usd::Stage::create_in_memory();
	let material = define_preview_material(&stage, &p("/Looks/Leaf"), gf::Vec3f::new(0.1, 0.6, 0.1), 1.0, 0.5, 0.0).unwrap();
	add_opacity_texture_to_preview_material(&material, &sdf::AssetPath::new("./Textures/mask.png")).unwrap();

	let surface = compute_effective_preview_surface_shader(&material).unwrap();
	assert_eq!(surface.input(&t("ior")).unwrap().get::<f32>(), Some(1.0));
	assert_eq!(surface.input(&t("opacityThreshold")).unwrap().get::<f32>(), Some(f32::EPSILON));
	assert_eq!(
		surface.input(&t("opacity")).unwrap().connected_sources(),
		vec![p("/Looks/Leaf/OpacityTexture.outputs:r")]
	);
}

#[test]
fn interface_promotes_and_bakes_values() {
	let stage = usd::Stage::create_in_memory();
	let material = textured_material(&stage, "/Looks/Paint");
	add_preview_material_interface(&material).unwrap();

	let surface = compute_effective_preview_surface_shader(&material).unwrap();
	let opacity = surface.input(&t("opacity")).unwrap();
	assert_eq!(opacity.connected_sources(), vec![p("/Looks/Paint.inputs:opacity")]);
	assert!(!opacity.has_authored_value());
	assert_eq!(opacity.compute_value().and_then(|value| value.get::<f32>()), Some(1.0));

	let file = material.input(&t("DiffuseTexture:file")).unwrap();
	assert_eq!(
		file.get::<sdf::AssetPath>().map(|path| path.authored_path),
		Some("./Textures/color.png".to_string())
	);
	// Connected inputs stay connected to their readers.
	assert!(material.input(&t("diffuseColor")).is_none());

	remove_material_interface(&material, true).unwrap();
	assert!(material.inputs().is_empty());
	assert!(!opacity.has_connected_source());
	assert!(opacity.has_authored_value());
	assert_eq!(opacity.get::<f32>(), Some(1.0));

	let diffuse = Shader::get(&stage, "/Looks/Paint/DiffuseTexture").unwrap();
	let file = diffuse.input(&t("file")).unwrap();
	assert!(!file.has_connected_source());
	assert!(file.has_authored_value());
}

#[test]
fn interface_removal_without_baking_leaves_no_values() {
	let stage = usd::Stage::create_in_memory();
	let material = textured_material(&stage, "/Looks/Paint");
	add_preview_material_interface(&material).unwrap();
	remove_material_interface(&material, false).unwrap();

	let surface = compute_effective_preview_surface_shader(&material).unwrap();
	for name in ["opacity", "metallic"] {
		let input = surface.input(&t(name)).unwrap();
		assert!(!input.has_connected_source());
		assert!(!input.has_authored_value());
	}
	// Texture connections are not part of the interface.
	assert!(surface.input(&t("roughness")).unwrap().has_connected_source());
}

#[test]
fn interface_requires_one_surface() {
	let stage = usd::Stage::create_in_memory();
	let looks = usd_geom::Scope::define(&stage, "/Looks").unwrap();
	let material = create_material(&looks, "Empty").unwrap();
	let capture = tf::DiagnosticCapture::begin();

	let err = add_preview_material_interface(&material).unwrap_err();
	assert!(err.to_string().contains("0 effective surface outputs"));
	assert!(capture.has(DiagnosticKind::RuntimeError, "exactly one is required"));
}

#[test]
fn binding_reports_invalid_objects() {
	let stage = usd::Stage::create_in_memory();
	let material = define_preview_material(&stage, &p("/Looks/Red"), gf::Vec3f::new(1.0, 0.0, 0.0), 1.0, 0.5, 0.0).unwrap();
	let cube = stage.define_prim("/World/Cube", &t("Cube")).unwrap();

	bind_material(&cube, &material).unwrap();
	let binding = MaterialBindingApi::new(cube.clone());
	assert_eq!(binding.direct_binding(), Some(p("/Looks/Red")));
	assert_eq!(binding.compute_bound_material(), Some(material.clone()));

	let capture = tf::DiagnosticCapture::begin();
	let missing = stage.prim_at_path("/World/Missing");
	assert!(bind_material(&missing, &material).is_err());
	assert!(capture.has(DiagnosticKind::Warning, "UsdPrim </World/Missing> is not valid"));

	let no_material = Material::from_prim_unchecked(stage.prim_at_path("/Looks/Missing"));
	assert!(bind_material(&cube, &no_material).is_err());
	assert!(capture.has(DiagnosticKind::Warning, "UsdShadeMaterial </Looks/Missing> is not valid"));
	assert!(bind_material(&missing, &no_material).is_err());
	assert!(capture.has(DiagnosticKind::Warning, "are not valid, cannot bind material to prim"));
}

struct LayeredFlower {
	_asset: usd::Stage,
	payload: usd::Stage,
	materials: usd::Stage,
}

/// A flower payload whose materials are authored in the weaker `Materials`
/// content layer while the payload root layer stays the stronger edit target.
fn layered_flower(dir: &std::path::Path) -> LayeredFlower {
	let args = sdf::FileFormatArguments::new();
	let identifier = dir.join("Flower.usda").to_string_lossy().replace('\\', "/");
	let asset = create_stage(&identifier, "Flower", &usd_geom::TOKENS.y, 0.01, None, &args).unwrap();
	let payload = create_asset_payload(&asset, "usda", &args).unwrap();
	let options = AssetContentOptions {
		format: "usda".to_string(),
		..Default::default()
	};
	let materials = add_asset_content(&payload, "Materials", &options).unwrap();
	LayeredFlower {
		_asset: asset,
		payload,
		materials,
	}
}

fn weak_interface<'a>(flower: &'a LayeredFlower) -> Material<'a> {
	let payload = &flower.payload;
	payload.set_edit_target(flower.materials.root_layer()).unwrap();
	let material = define_preview_material(
		payload,
		&p("/Flower/Materials/Paint"),
		gf::Vec3f::new(0.8, 0.1, 0.1),
		1.0,
		0.4,
		0.0,
	)
	.unwrap();
	add_diffuse_texture_to_preview_material(&material, &sdf::AssetPath::new("./Textures/color.png")).unwrap();
	add_preview_material_interface(&material).unwrap();
	payload.set_edit_target(payload.root_layer()).unwrap();
	material
}

#[test]
fn stronger_layers_extend_the_interface() {
	let dir = tempfile::tempdir().unwrap();
	let flower = layered_flower(dir.path());
	let material = weak_interface(&flower);

	add_roughness_texture_to_preview_material(&material, &sdf::AssetPath::new("./Textures/roughness.png")).unwrap();
	add_preview_material_interface(&material).unwrap();

	let surface = compute_effective_preview_surface_shader(&material).unwrap();
	for name in ["diffuseColor", "roughness", "metallic", "opacity"] {
		assert!(surface.input(&t(name)).unwrap().has_connected_source(), "{name}");
	}
	assert_eq!(
		surface.input(&t("roughness")).unwrap().connected_sources(),
		vec![p("/Flower/Materials/Paint/RoughnessTexture.outputs:r")]
	);

	assert!(material.input(&t("DiffuseTexture:file")).is_some());
	let interface = material.input(&t("RoughnessTexture:file")).unwrap();
	assert!(flower.payload.root_layer().has_spec(interface.path()));
	assert!(!flower.materials.root_layer().has_spec(interface.path()));

	let roughness = Shader::get(&flower.payload, "/Flower/Materials/Paint/RoughnessTexture").unwrap();
	assert_eq!(
		roughness.input(&t("file")).unwrap().connected_sources(),
		vec![p("/Flower/Materials/Paint.inputs:RoughnessTexture:file")]
	);
}

#[test]
fn stronger_layers_remove_the_interface() {
	let dir = tempfile::tempdir().unwrap();
	let flower = layered_flower(dir.path());
	let material = weak_interface(&flower);

	remove_material_interface(&material, true).unwrap();

	// The weaker interface is blocked, not removed.
	let interface = material.input(&t("opacity")).unwrap();
	assert!(flower.materials.root_layer().has_spec(interface.path()));
	assert!(!interface.has_authored_value());

	let surface = compute_effective_preview_surface_shader(&material).unwrap();
	let opacity = surface.input(&t("opacity")).unwrap();
	assert!(!opacity.has_connected_source());
	assert!(opacity.has_authored_value());
	assert_eq!(opacity.get::<f32>(), Some(1.0));
	assert!(flower.payload.root_layer().has_spec(opacity.path()));

	let diffuse = Shader::get(&flower.payload, "/Flower/Materials/Paint/DiffuseTexture").unwrap();
	let file = diffuse.input(&t("file")).unwrap();
	assert!(!file.has_connected_source());
	assert_eq!(
		file.get::<sdf::AssetPath>().map(|path| path.authored_path),
		Some("./Textures/color.png".to_string())
	);
}
