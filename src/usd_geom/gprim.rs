use super::TOKENS;
use crate::{gf, sdf::VALUE_TYPE_NAMES, tf, usd, vt};

usd::declare_typed_schema!(
	/// Boundable introduces the ability for a prim to persistently cache a
	/// rectilinear, local-space extent.
	Boundable,
	"Boundable"
);

usd::declare_typed_schema!(
	/// Base class for the geometric primitives, carrying their display color
	/// and opacity.
	Gprim,
	"Gprim"
);

usd::declare_typed_schema!(
	/// Defines a primitive rectilinear cube centered at the origin.
	Cube,
	"Cube"
);

usd::declare_typed_schema!(
	/// Defines a primitive sphere centered at the origin.
	Sphere,
	"Sphere"
);

usd::declare_typed_schema!(
	/// Defines a primitive cylinder with closed ends, centered at the origin,
	/// whose spine is along the specified `axis`.
	Cylinder,
	"Cylinder"
);

usd::declare_typed_schema!(
	/// Defines a primitive cone, centered at the origin, whose spine is along
	/// the specified `axis`, with the apex of the cone pointing in the
	/// direction of the positive axis.
	Cone,
	"Cone"
);

usd::declare_typed_schema!(
	/// Defines a primitive capsule, i.e. a cylinder capped by two half
	/// spheres, centered at the origin.
	Capsule,
	"Capsule"
);

usd::declare_typed_schema!(
	/// Defines a primitive plane, centered at the origin, whose normal is the
	/// specified `axis`.
	Plane,
	"Plane"
);

usd::declare_typed_schema!(
	/// Encodes a mesh with optional subdivision properties and features.
	Mesh,
	"Mesh"
);

usd::declare_typed_schema!(Points, "Points");

macro_rules! double_attr {
	($get:ident, $create:ident, $token:ident) => {
		pub fn $get(&self) -> usd::Attribute<'a> {
			self.attribute(&TOKENS.$token)
		}

		pub fn $create(&self) -> usd::Attribute<'a> {
			self.create_attribute(&TOKENS.$token, &VALUE_TYPE_NAMES.double, false)
		}
	};
}

macro_rules! axis_attr {
	() => {
		pub fn axis_attr(&self) -> usd::Attribute<'a> {
			self.attribute(&TOKENS.axis)
		}

		pub fn create_axis_attr(&self) -> usd::Attribute<'a> {
			self.create_uniform_attribute(&TOKENS.axis, &VALUE_TYPE_NAMES.token)
		}
	};
}

/// `primvars:displayColor` and `primvars:displayOpacity`, shared by every gprim.
macro_rules! display_attrs {
	() => {
		pub fn display_color_attr(&self) -> usd::Attribute<'a> {
			self.attribute(&TOKENS.primvars_display_color)
		}

		pub fn create_display_color_attr(&self) -> usd::Attribute<'a> {
			self.create_attribute(&TOKENS.primvars_display_color, &VALUE_TYPE_NAMES.color3f_array, false)
		}

		pub fn display_opacity_attr(&self) -> usd::Attribute<'a> {
			self.attribute(&TOKENS.primvars_display_opacity)
		}

		pub fn create_display_opacity_attr(&self) -> usd::Attribute<'a> {
			self.create_attribute(&TOKENS.primvars_display_opacity, &VALUE_TYPE_NAMES.float_array, false)
		}
	};
}

impl<'a> Boundable<'a> {
	pub fn extent_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.extent)
	}

	pub fn create_extent_attr(&self) -> usd::Attribute<'a> {
		self.create_attribute(&TOKENS.extent, &VALUE_TYPE_NAMES.float3_array, false)
	}

	/// Return the authored extent, or the extent computed from the prim's
	/// schema attributes.
	pub fn compute_extent(&self) -> Option<gf::Range3d> {
		compute_extent(self)
	}
}

impl<'a> Gprim<'a> {
	display_attrs!();
}

impl<'a> Cube<'a> {
	double_attr!(size_attr, create_size_attr, size);
	display_attrs!();
}

impl<'a> Sphere<'a> {
	double_attr!(radius_attr, create_radius_attr, radius);
	display_attrs!();
}

impl<'a> Plane<'a> {
	double_attr!(width_attr, create_width_attr, width);
	double_attr!(length_attr, create_length_attr, length);
	axis_attr!();
	display_attrs!();
}

impl<'a> Cylinder<'a> {
	double_attr!(radius_attr, create_radius_attr, radius);
	double_attr!(height_attr, create_height_attr, height);
	axis_attr!();
	display_attrs!();
}

impl<'a> Cone<'a> {
	double_attr!(radius_attr, create_radius_attr, radius);
	double_attr!(height_attr, create_height_attr, height);
	axis_attr!();
	display_attrs!();
}

impl<'a> Capsule<'a> {
	double_attr!(radius_attr, create_radius_attr, radius);
	double_attr!(height_attr, create_height_attr, height);
	axis_attr!();
	display_attrs!();
}

impl<'a> Mesh<'a> {
	pub fn points_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.points)
	}

	pub fn create_points_attr(&self) -> usd::Attribute<'a> {
		self.create_attribute(&TOKENS.points, &VALUE_TYPE_NAMES.point3f_array, false)
	}
}

impl<'a> Points<'a> {
	pub fn points_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.points)
	}

	pub fn create_points_attr(&self) -> usd::Attribute<'a> {
		self.create_attribute(&TOKENS.points, &VALUE_TYPE_NAMES.point3f_array, false)
	}
}

fn double_value(prim: &usd::Prim, name: &tf::Token, fallback: f64) -> f64 {
	let attr = prim.attribute(name);
	attr.get::<f64>()
		.or_else(|| attr.get::<f32>().map(f64::from))
		.unwrap_or(fallback)
}

fn axis_value(prim: &usd::Prim) -> tf::Token {
	prim.attribute(&TOKENS.axis)
		.get::<tf::Token>()
		.unwrap_or_else(|| TOKENS.z.clone())
}

/// Extent of a shape of `radius` around `axis` with half length `half` along it.
fn axial_extent(axis: &tf::Token, radius: f64, half: f64) -> gf::Range3d {
	let max = if *axis == TOKENS.x {
		gf::Vec3d::new(half, radius, radius)
	} else if *axis == TOKENS.y {
		gf::Vec3d::new(radius, half, radius)
	} else {
		gf::Vec3d::new(radius, radius, half)
	};
	gf::Range3d::new(gf::Vec3d::new(-max.x, -max.y, -max.z), max)
}

fn authored_extent(prim: &usd::Prim) -> Option<gf::Range3d> {
	let extent = prim.attribute(&TOKENS.extent).get::<vt::Array<gf::Vec3f>>()?;
	match extent.as_slice() {
		[min, max] => Some(gf::Range3d::new((*min).into(), (*max).into())),
		_ => None,
	}
}

fn points_extent(prim: &usd::Prim) -> Option<gf::Range3d> {
	let points = prim.attribute(&TOKENS.points).get::<vt::Array<gf::Vec3f>>()?;
	let mut range = gf::Range3d::empty();
	for point in points {
		range.union_with_point(point.into());
	}
	Some(range)
}

/// Return the local-space extent of a boundable `prim`.
///
/// An authored `extent` wins. Otherwise the extent is computed from the
/// attributes of the known gprim types; other prims have no extent.
pub fn compute_extent(prim: &usd::Prim) -> Option<gf::Range3d> {
	authored_extent(prim).or_else(|| compute_schema_extent(prim))
}

/// Return the extent implied by the schema attributes of `prim`, ignoring
/// any authored `extent`.
pub fn compute_schema_extent(prim: &usd::Prim) -> Option<gf::Range3d> {
	let type_name = prim.type_name();
	match type_name.as_str() {
		"Cube" => {
			let half = double_value(prim, &TOKENS.size, 2.0) * 0.5;
			Some(gf::Range3d::new(gf::Vec3d::new(-half, -half, -half), gf::Vec3d::new(half, half, half)))
		}
		"Sphere" => {
			let r = double_value(prim, &TOKENS.radius, 1.0);
			Some(gf::Range3d::new(gf::Vec3d::new(-r, -r, -r), gf::Vec3d::new(r, r, r)))
		}
		"Cylinder" | "Cone" => {
			let radius = double_value(prim, &TOKENS.radius, 1.0);
			let height = double_value(prim, &TOKENS.height, 2.0);
			Some(axial_extent(&axis_value(prim), radius, height * 0.5))
		}
		"Plane" => {
			let width = double_value(prim, &TOKENS.width, 2.0) * 0.5;
			let length = double_value(prim, &TOKENS.length, 2.0) * 0.5;
			let axis = axis_value(prim);
			let max = if axis == TOKENS.x {
				gf::Vec3d::new(0.0, length, width)
			} else if axis == TOKENS.y {
				gf::Vec3d::new(width, 0.0, length)
			} else {
				gf::Vec3d::new(width, length, 0.0)
			};
			Some(gf::Range3d::new(gf::Vec3d::new(-max.x, -max.y, -max.z), max))
		}
		"Capsule" => {
			let radius = double_value(prim, &TOKENS.radius, 0.5);
			let height = double_value(prim, &TOKENS.height, 1.0);
			Some(axial_extent(&axis_value(prim), radius, height * 0.5 + radius))
		}
		_ if prim.is_a(&tf::Token::new("PointBased")) => points_extent(prim),
		_ => None,
	}
}
