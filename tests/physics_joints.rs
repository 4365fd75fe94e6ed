use approx::assert_abs_diff_eq;
use openusd_exchange::{authoring::*, gf, sdf, tf, tf::DiagnosticKind, usd, usd_geom, usd_physics::Joint};
use openusd_exchange::usd::SchemaBase;

fn p(s: &str) -> sdf::Path {
	sdf::Path::from(s)
}

fn place(prim: &usd::Prim, translation: gf::Vec3d) {
	let transform = gf::Transform3d {
		translation,
		rotation: gf::Quatd::identity(),
		scale: gf::Vec3d::new(2.0, 0.5, 0.5),
		pivot: gf::Vec3d::default(),
	};
	set_local_transform_from(prim, &transform).unwrap();
}

fn assert_pos(actual: gf::Vec3f, x: f32) {
	assert_abs_diff_eq!(actual.x, x, epsilon = 1e-5);
	assert_abs_diff_eq!(actual.y, 0.0, epsilon = 1e-5);
	assert_abs_diff_eq!(actual.z, 0.0, epsilon = 1e-5);
}

#[test]
fn joints_author_in_the_physics_layer() {
	let dir = tempfile::tempdir().unwrap();
	let identifier = dir.path().join("Robot.usda").to_string_lossy().replace('\\', "/");
	let args = sdf::FileFormatArguments::new();
	let asset = create_stage(&identifier, "Robot", &usd_geom::TOKENS.y, 0.01, None, &args).unwrap();
	let payload = create_asset_payload(&asset, "usda", &args).unwrap();

	let options = AssetContentOptions {
		format: "usda".to_string(),
		..Default::default()
	};
	let geometry = add_asset_content(&payload, "Geometry", &options).unwrap();
	let physics = add_asset_content(&payload, "Physics", &options).unwrap();

	for (name, x) in [("Cube0", 0.0), ("Cube1", 21.0)] {
		let cube = geometry
			.define_prim(p("/Robot/Geometry").append_child(&tf::Token::new(name)), &tf::Token::new("Cube"))
			.unwrap();
		place(&cube, gf::Vec3d::new(x, 30.0, 0.0));
	}

	payload.set_edit_target(physics.root_layer()).unwrap();
	let body0 = payload.prim_at_path("/Robot/Geometry/Cube0");
	let body1 = payload.prim_at_path("/Robot/Geometry/Cube1");
	let frame = JointFrame::world(gf::Vec3d::new(10.5, 30.0, 0.0));
	let scope = payload.prim_at_path("/Robot/Physics");
	let joint = define_physics_fixed_joint_in(&scope, "Fixed", Some(&body0), Some(&body1), &frame)
		.unwrap()
		.joint();

	assert!(physics.root_layer().has_spec(&p("/Robot/Physics/Fixed")));
	assert!(!geometry.root_layer().has_spec(&p("/Robot/Physics/Fixed")));
	assert!(!payload.root_layer().has_spec(&p("/Robot/Physics/Fixed")));
	assert_pos(joint.local_pos0(), 5.25);
	assert_pos(joint.local_pos1(), -5.25);
}

#[test]
fn reconnecting_to_the_world() {
	let stage = usd::Stage::create_in_memory();
	let body0 = stage.define_prim("/World/Cube0", &tf::Token::new("Cube")).unwrap();
	let body1 = stage.define_prim("/World/Cube1", &tf::Token::new("Cube")).unwrap();
	place(&body0, gf::Vec3d::new(0.0, 30.0, 0.0));
	place(&body1, gf::Vec3d::new(21.0, 30.0, 0.0));
	let frame = JointFrame::world(gf::Vec3d::new(10.5, 30.0, 0.0));

	let slider = define_physics_prismatic_joint(
		&stage,
		&p("/World/Slider"),
		Some(&body0),
		Some(&body1),
		&frame,
		gf::Vec3f::new(0.0, 1.0, 0.0),
		Some(0.0),
		Some(10.0),
	)
	.unwrap();
	assert_eq!(slider.axis_attr().get::<tf::Token>(), Some(tf::Token::new("Y")));
	assert_eq!(slider.upper_limit_attr().get::<f32>(), Some(10.0));

	let joint = Joint::get(&stage, "/World/Slider").unwrap();
	connect_physics_joint(&joint, Some(&stage.prim_at_path("/World/Missing")), Some(&body1), &frame, None).unwrap();
	assert_eq!(joint.body0_rel().targets().len(), 0);
	assert_eq!(joint.body1(), Some(p("/World/Cube1")));
	assert_pos(joint.local_pos1(), -5.25);

	let capture = tf::DiagnosticCapture::begin();
	assert!(connect_physics_joint(&joint, None, None, &frame, None).is_err());
	assert!(capture.has(DiagnosticKind::RuntimeError, "Body0 and Body1 are not specified for PhysicsJoint"));
	assert_eq!(joint.body1(), Some(p("/World/Cube1")));
}

#[test]
fn spherical_joints_with_cone_limits() {
	let stage = usd::Stage::create_in_memory();
	let body = stage.define_prim("/World/Pendulum", &tf::Token::new("Sphere")).unwrap();
	let frame = JointFrame::new(JointFrameSpace::Body0, gf::Vec3d::new(0.0, 1.0, 0.0), gf::Quatd::identity());

	let ball = define_physics_spherical_joint(
		&stage,
		&p("/World/Ball"),
		Some(&body),
		None,
		&frame,
		gf::Vec3f::new(1.0, 0.0, 0.0),
		Some(30.0),
		None,
	)
	.unwrap();
	assert_eq!(ball.axis_attr().get::<tf::Token>(), Some(tf::Token::new("X")));
	assert_eq!(ball.cone_angle0_limit_attr().get::<f32>(), Some(30.0));
	assert!(!ball.cone_angle1_limit_attr().has_authored_value());

	let joint = ball.joint();
	assert_eq!(joint.body1(), None);
	assert!(!joint.local_pos1_attr().has_authored_value());
	assert_eq!(joint.local_pos0(), gf::Vec3f::new(0.0, 1.0, 0.0));
}

fn place_rotated(prim: &usd::Prim, translation: gf::Vec3d, rotation: gf::Quatd) {
	let transform = gf::Transform3d {
		translation,
		rotation,
		scale: gf::Vec3d::new(1.0, 1.0, 1.0),
		pivot: gf::Vec3d::default(),
	};
	set_local_transform_from(prim, &transform).unwrap();
}

fn quarter_turn_z() -> gf::Quatd {
	gf::Quatd::new(std::f64::consts::FRAC_1_SQRT_2, 0.0, 0.0, std::f64::consts::FRAC_1_SQRT_2)
}

fn assert_vec(actual: gf::Vec3f, expected: [f32; 3]) {
	assert_abs_diff_eq!(actual.x, expected[0], epsilon = 1e-5);
	assert_abs_diff_eq!(actual.y, expected[1], epsilon = 1e-5);
	assert_abs_diff_eq!(actual.z, expected[2], epsilon = 1e-5);
}

// The frame is a quarter turn back around Z in the local space of the rotated body.
fn assert_undoes_quarter_turn(rotation: gf::Quatf) {
	let half = std::f32::consts::FRAC_1_SQRT_2;
	assert_abs_diff_eq!(rotation.w.abs(), half, epsilon = 1e-5);
	assert_abs_diff_eq!(rotation.k.abs(), half, epsilon = 1e-5);
	assert_abs_diff_eq!(rotation.i, 0.0, epsilon = 1e-5);
	assert_abs_diff_eq!(rotation.j, 0.0, epsilon = 1e-5);
	assert!(rotation.w * rotation.k < 0.0);
}

fn rotated_bodies(stage: &usd::Stage) -> (usd::Prim<'_>, usd::Prim<'_>) {
	let body0 = stage.define_prim("/World/Arm", &tf::Token::new("Cube")).unwrap();
	let body1 = stage.define_prim("/World/Base", &tf::Token::new("Cube")).unwrap();
	place_rotated(&body0, gf::Vec3d::new(10.0, 0.0, 0.0), quarter_turn_z());
	place_rotated(&body1, gf::Vec3d::new(0.0, 0.0, 0.0), gf::Quatd::identity());
	(body0, body1)
}

#[test]
fn world_frames_on_rotated_bodies() {
	let stage = usd::Stage::create_in_memory();
	let (body0, body1) = rotated_bodies(&stage);
	let frame = JointFrame::world(gf::Vec3d::new(10.0, 2.0, 0.0));

	let joint = define_physics_fixed_joint(&stage, &p("/World/Fixed"), Some(&body0), Some(&body1), &frame)
		.unwrap()
		.joint();
	assert_vec(joint.local_pos0(), [2.0, 0.0, 0.0]);
	assert_undoes_quarter_turn(joint.local_rot0());
	assert_vec(joint.local_pos1(), [10.0, 2.0, 0.0]);
	assert_abs_diff_eq!(joint.local_rot1().w.abs(), 1.0, epsilon = 1e-5);
}

#[test]
fn body1_frames_on_rotated_bodies() {
	let stage = usd::Stage::create_in_memory();
	let (body0, body1) = rotated_bodies(&stage);
	let frame = JointFrame::new(JointFrameSpace::Body1, gf::Vec3d::new(10.0, 2.0, 0.0), gf::Quatd::identity());

	let joint = define_physics_fixed_joint(&stage, &p("/World/Fixed"), Some(&body0), Some(&body1), &frame)
		.unwrap()
		.joint();
	assert_eq!(joint.local_pos1(), gf::Vec3f::new(10.0, 2.0, 0.0));
	assert_eq!(joint.local_rot1(), gf::Quatf::identity());
	assert_vec(joint.local_pos0(), [2.0, 0.0, 0.0]);
	assert_undoes_quarter_turn(joint.local_rot0());
}
