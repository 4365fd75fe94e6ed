use openusd_exchange::{authoring::*, gf, kind::KIND_TOKENS, sdf, tf, tf::DiagnosticKind, usd, usd::SchemaBase, usd_geom};
use std::path::Path;

fn p(s: &str) -> sdf::Path {
	sdf::Path::from(s)
}

fn identifier(dir: &Path, name: &str) -> String {
	dir.join(name).to_string_lossy().replace('\\', "/")
}

fn text() -> AssetContentOptions {
	AssetContentOptions {
		format: "usda".to_string(),
		..Default::default()
	}
}

fn flower(dir: &Path) -> usd::Stage {
	create_stage(
		&identifier(dir, "Flower.usda"),
		"Flower",
		&usd_geom::TOKENS.y,
		usd_geom::LinearUnits::CENTIMETERS,
		Some("Flower Builder 1.0"),
		&sdf::FileFormatArguments::new(),
	)
	.unwrap()
}

#[test]
fn content_sublayers_follow_the_insert_order() {
	let dir = tempfile::tempdir().unwrap();
	let asset = flower(dir.path());
	let payload = create_asset_payload(&asset, "usda", &sdf::FileFormatArguments::new()).unwrap();

	add_asset_content(&payload, "First", &text()).unwrap();
	let appended = AssetContentOptions {
		prepend_layer: false,
		..text()
	};
	add_asset_content(&payload, "Second", &appended).unwrap();
	add_asset_content(&payload, "Third", &text()).unwrap();

	assert_eq!(
		payload.root_layer().sub_layer_paths(),
		vec!["./Third.usda", "./First.usda", "./Second.usda"]
	);
	for name in ["First", "Second", "Third"] {
		assert!(dir.path().join("Payload").join(format!("{}.usda", name)).is_file());
		let scope = p("/Flower").append_child(&tf::Token::new(name));
		assert!(usd_geom::Scope::get(&payload, scope).is_some());
	}

	// Adding the same content again does not duplicate the sublayer.
	add_asset_content(&payload, "First", &text()).unwrap();
	assert_eq!(payload.root_layer().sub_layer_paths().len(), 3);
}

#[test]
fn flower_asset() {
	let dir = tempfile::tempdir().unwrap();
	let asset = flower(dir.path());

	let payload = create_asset_payload(&asset, "usda", &sdf::FileFormatArguments::new()).unwrap();
	assert_eq!(payload.root_layer().identifier(), identifier(dir.path(), "Payload/Contents.usda"));
	assert!(usd_geom::Xform::get(&payload, "/Flower").is_some());
	assert_eq!(StageConfig::from_stage(&payload), StageConfig::from_stage(&asset));

	let geometry = add_asset_content(&payload, "Geometry", &text()).unwrap();
	add_asset_content(&payload, "Materials", &text()).unwrap();

	let library = add_asset_library(&geometry, "Geometry", "usda", &sdf::FileFormatArguments::new()).unwrap();
	assert_eq!(library.root_layer().identifier(), identifier(dir.path(), "Payload/GeometryLibrary.usda"));
	assert_eq!(library.default_prim().specifier(), sdf::Specifier::Class);
	let petal = usd_geom::Xform::define(&library, "/Geometry/Petal").unwrap();

	let scope = geometry.prim_at_path("/Flower/Geometry");
	let instance = define_reference_in(&scope, &petal, Some("Petal0")).unwrap();
	assert_eq!(instance.type_name(), usd_geom::Xform::schema_type());
	assert_eq!(
		instance.references().items(),
		vec![sdf::Reference::new("./GeometryLibrary.usda", p("/Geometry/Petal"))]
	);

	add_asset_interface(&asset, &payload).unwrap();
	let root = asset.default_prim();
	assert_eq!(root.path(), &p("/Flower"));
	assert_eq!(
		root.payloads().items(),
		vec![sdf::Payload::new("./Payload/Contents.usda", sdf::Path::empty_path())]
	);
	assert_eq!(usd::ModelApi::new(root.clone()).kind(), KIND_TOKENS.component);
	assert!(usd_geom::GeomModelApi::new(root.clone()).extents_hint().is_some());
	assert!(asset.prim_at_path("/Flower/Geometry/Petal0").is_valid());

	save_stage(&asset, None, Some("Initial flower")).unwrap();
	assert!(dir.path().join("Flower.usda").is_file());
}

#[test]
fn interface_requires_a_configured_source() {
	let dir = tempfile::tempdir().unwrap();
	let asset = flower(dir.path());
	let source = usd::Stage::create_new(&identifier(dir.path(), "Empty.usda"), &sdf::FileFormatArguments::new()).unwrap();
	let capture = tf::DiagnosticCapture::begin();

	let err = add_asset_interface(&asset, &source).unwrap_err();
	assert!(err.to_string().contains("an invalid source stage: it has no default prim"));
	assert!(capture.has(DiagnosticKind::Warning, "Unable to add asset interface"));
	assert!(asset.default_prim().payloads().items().is_empty());

	let err = add_asset_content(&asset, "Bad Name", &text()).unwrap_err();
	assert!(err.to_string().contains("\"Bad Name\" is not a valid identifier"));
	assert!(!dir.path().join("Bad Name.usda").exists());
}

#[test]
fn weaker_layers_cannot_override_the_kind() {
	let dir = tempfile::tempdir().unwrap();
	let asset = flower(dir.path());
	let payload = create_asset_payload(&asset, "usda", &sdf::FileFormatArguments::new()).unwrap();
	let geometry = add_asset_content(&payload, "Geometry", &text()).unwrap();

	let petal = usd_geom::Xform::define(&geometry, "/Flower/Geometry/Petal").unwrap();
	usd::ModelApi::new(petal.prim().clone()).set_kind(&KIND_TOKENS.component).unwrap();
	usd::ModelApi::new(payload.default_prim()).set_kind(&KIND_TOKENS.assembly).unwrap();

	payload.set_edit_target(geometry.root_layer()).unwrap();
	let capture = tf::DiagnosticCapture::begin();
	assert!(!configure_component_hierarchy(&payload.default_prim()));
	assert!(capture.has(DiagnosticKind::RuntimeError, "Unable to set the kind of"));

	assert_eq!(usd::ModelApi::new(payload.default_prim()).kind(), KIND_TOKENS.assembly);
	assert!(!geometry.root_layer().has_field(&p("/Flower"), &sdf::FIELD_KEYS.kind));
	let petal = payload.prim_at_path("/Flower/Geometry/Petal");
	assert_eq!(usd::ModelApi::new(petal).kind(), KIND_TOKENS.component);
}

#[test]
fn extents_hint_covers_the_placed_geometry() {
	let dir = tempfile::tempdir().unwrap();
	let asset = flower(dir.path());
	let payload = create_asset_payload(&asset, "usda", &sdf::FileFormatArguments::new()).unwrap();
	let geometry = add_asset_content(&payload, "Geometry", &text()).unwrap();

	let cube = usd_geom::Cube::define(&geometry, "/Flower/Geometry/Pot").unwrap();
	cube.create_size_attr().set(10.0_f64);
	let transform = gf::Transform3d {
		translation: gf::Vec3d::new(2.0, 0.0, 0.0),
		..Default::default()
	};
	set_local_transform_from(cube.prim(), &transform).unwrap();

	add_asset_interface(&asset, &payload).unwrap();
	let hint = usd_geom::GeomModelApi::new(asset.default_prim()).extents_hint();
	assert_eq!(
		hint,
		Some(vec![gf::Vec3f::new(-3.0, -5.0, -5.0), gf::Vec3f::new(7.0, 5.0, 5.0)])
	);
}
