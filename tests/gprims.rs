use openusd_exchange::{authoring::*, gf, sdf, tf, usd, usd_geom};

fn p(s: &str) -> sdf::Path {
	sdf::Path::from(s)
}

#[test]
fn imported_shapes_get_valid_names() {
	let dir = tempfile::tempdir().unwrap();
	let identifier = dir.path().join("Blocks.usda").to_string_lossy().replace('\\', "/");
	let args = sdf::FileFormatArguments::new();
	let asset = create_stage(&identifier, "Blocks", &usd_geom::TOKENS.z, 1.0, None, &args).unwrap();
	let payload = create_asset_payload(&asset, "usda", &args).unwrap();
	let options = AssetContentOptions {
		format: "usda".to_string(),
		..Default::default()
	};
	let geometry = add_asset_content(&payload, "Geometry", &options).unwrap();
	let scope = geometry.prim_at_path("/Blocks/Geometry");

	// Names as they come from a source application.
	let source_names = ["Red Block", "Red Block", "2nd block", "Geometry"];
	let mut names = ValidChildNameCache::new();
	let allocated = names.valid_child_names(&scope, &source_names);
	assert_eq!(allocated.len(), 4);
	assert_eq!(allocated[3], tf::Token::new("Geometry"));
	assert_ne!(allocated[0], allocated[1]);

	let red = gf::Vec3f::new(1.0, 0.0, 0.0);
	for (index, (name, source)) in allocated.iter().zip(source_names).enumerate() {
		let cube = define_cube_in(&scope, name.as_str(), 1.0, Some(red), None).unwrap();
		assert!(set_display_name(&cube, source));
		let transform = gf::Transform3d {
			translation: gf::Vec3d::new(2.0 * index as f64, 0.0, 0.0),
			..Default::default()
		};
		set_local_transform_from(&cube, &transform).unwrap();
	}

	let second = payload.prim_at_path(scope.path().append_child(&allocated[1]));
	assert_eq!(compute_effective_display_name(&second), "Red Block");
	let another = valid_child_name(&payload.prim_at_path("/Blocks/Geometry"), "Red Block").unwrap();
	assert!(!allocated.contains(&another));

	define_sphere_in(&payload.default_prim(), "Marker", 0.5, None, Some(0.5)).unwrap();

	add_asset_interface(&asset, &payload).unwrap();
	let hint = usd_geom::GeomModelApi::new(asset.default_prim()).extents_hint().unwrap();
	assert_eq!(hint[0], gf::Vec3f::new(-0.5, -0.5, -0.5));
	assert_eq!(hint[1], gf::Vec3f::new(6.5, 0.5, 0.5));
	assert_eq!(usd::ModelApi::new(asset.prim_at_path(p("/Blocks"))).kind(), tf::Token::new("component"));
}
