use super::{Precision, TOKENS, XformOp, XformOpType};
use crate::{Error, Result, gf, sdf::VALUE_TYPE_NAMES, tf, usd, vt};

usd::declare_typed_schema!(
	/// Base class for all transformable prims, which allows arbitrary
	/// sequences of component affine transformations to be encoded.
	///
	/// The ops are listed in the `xformOpOrder` attribute. The first op in
	/// the list is the outermost: it is applied last to a point.
	Xformable,
	"Xformable"
);

usd::declare_typed_schema!(
	/// Concrete prim schema for a transform, which implements Xformable.
	Xform,
	"Xform"
);

usd::declare_typed_schema!(
	/// Grouping prim that does not carry a transform.
	Scope,
	"Scope"
);

impl<'a> Xform<'a> {
	pub fn xformable(&self) -> Xformable<'a> {
		Xformable {
			prim: self.prim.clone(),
		}
	}
}

impl<'a> Xformable<'a> {
	pub fn xform_op_order_attr(&self) -> usd::Attribute<'a> {
		self.attribute(&TOKENS.xform_op_order)
	}

	pub fn create_xform_op_order_attr(&self) -> usd::Attribute<'a> {
		self.create_uniform_attribute(&TOKENS.xform_op_order, &VALUE_TYPE_NAMES.token_array)
	}

	/// Return the authored `xformOpOrder`, including any reset token.
	pub fn xform_op_order(&self) -> vt::Array<tf::Token> {
		self.xform_op_order_attr()
			.get::<vt::Array<tf::Token>>()
			.unwrap_or_default()
	}

	/// Return true if this prim does not inherit its parent's transformation.
	pub fn resets_xform_stack(&self) -> bool {
		self.xform_op_order().first() == Some(&TOKENS.reset_xform_stack)
	}

	/// Return the ops in `xformOpOrder`, skipping anything before a reset
	/// token and entries that do not name an op.
	pub fn ordered_xform_ops(&self) -> Vec<XformOp<'a>> {
		let order = self.xform_op_order();
		let start = order
			.iter()
			.rposition(|name| *name == TOKENS.reset_xform_stack)
			.map(|i| i + 1)
			.unwrap_or(0);
		order[start..]
			.iter()
			.filter_map(|name| XformOp::from_op_name(&self.prim, name))
			.collect()
	}

	/// Author `xformOpOrder` from `ops`, with a leading reset token when
	/// `resets_xform_stack` is set.
	pub fn set_xform_op_order(&self, ops: &[XformOp], resets_xform_stack: bool) -> bool {
		let mut order = Vec::with_capacity(ops.len() + 1);
		if resets_xform_stack {
			order.push(TOKENS.reset_xform_stack.clone());
		}
		order.extend(ops.iter().map(|op| op.op_order_name()));
		self.create_xform_op_order_attr().set(order)
	}

	/// Author an empty `xformOpOrder`, making this prim's local transform identity.
	pub fn clear_xform_op_order(&self) -> bool {
		self.create_xform_op_order_attr().set(vt::Array::<tf::Token>::new())
	}

	/// Append a new op to `xformOpOrder` and create its attribute.
	///
	/// Inverse ops share the attribute of the forward op with the same
	/// type and suffix.
	pub fn add_xform_op(
		&self,
		op_type: XformOpType,
		precision: Precision,
		suffix: Option<&str>,
		is_inverse: bool,
	) -> Result<XformOp<'a>> {
		let op_name = XformOp::op_name(op_type, suffix, is_inverse);
		let mut order = self.xform_op_order();
		if order.contains(&op_name) {
			return Err(Error::InvalidArgument(format!(
				"XformOp <{}> already exists in xformOpOrder of <{}>",
				op_name,
				self.path()
			)));
		}

		let attr_name = XformOp::attribute_name(op_type, suffix);
		let attr = self.create_attribute(&attr_name, &op_type.type_name(precision), false);
		if !attr.is_valid() {
			return Err(Error::Authority(format!(
				"Unable to create XformOp <{}> on <{}>",
				attr_name,
				self.path()
			)));
		}

		order.push(op_name.clone());
		self.create_xform_op_order_attr().set(order);
		XformOp::from_op_name(&self.prim, &op_name)
			.ok_or_else(|| Error::InvalidArgument(format!("Invalid XformOp name <{}>", op_name)))
	}

	pub fn add_translate_op(&self, precision: Precision, suffix: Option<&str>) -> Result<XformOp<'a>> {
		self.add_xform_op(XformOpType::Translate, precision, suffix, false)
	}

	pub fn add_scale_op(&self, precision: Precision, suffix: Option<&str>) -> Result<XformOp<'a>> {
		self.add_xform_op(XformOpType::Scale, precision, suffix, false)
	}

	pub fn add_rotate_op(&self, op_type: XformOpType, precision: Precision) -> Result<XformOp<'a>> {
		self.add_xform_op(op_type, precision, None, false)
	}

	pub fn add_orient_op(&self, precision: Precision) -> Result<XformOp<'a>> {
		self.add_xform_op(XformOpType::Orient, precision, None, false)
	}

	pub fn add_transform_op(&self) -> Result<XformOp<'a>> {
		self.add_xform_op(XformOpType::Transform, Precision::Double, None, false)
	}

	/// Compute the local transformation from the ordered ops.
	///
	/// Ops without a value contribute identity.
	pub fn local_transformation(&self) -> gf::Matrix4d {
		self.ordered_xform_ops()
			.iter()
			.rev()
			.filter_map(|op| op.op_transform())
			.fold(gf::Matrix4d::identity(), |acc, m| acc * m)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::usd::SchemaBase;
	use approx::assert_abs_diff_eq;

	#[test]
	fn ops_compose_outermost_first() {
		let stage = usd::Stage::create_in_memory();
		let xform = Xform::define(&stage, "/World").unwrap().xformable();

		xform
			.add_translate_op(Precision::Double, None)
			.unwrap()
			.set(gf::Vec3d::new(10.0, 0.0, 0.0));
		xform
			.add_rotate_op(XformOpType::RotateZ, Precision::Float)
			.unwrap()
			.set(90.0f32);
		xform
			.add_scale_op(Precision::Float, None)
			.unwrap()
			.set(gf::Vec3f::new(2.0, 2.0, 2.0));

		assert_eq!(
			xform.xform_op_order(),
			vec![
				tf::Token::new("xformOp:translate"),
				tf::Token::new("xformOp:rotateZ"),
				tf::Token::new("xformOp:scale"),
			]
		);

		// Scale, then rotate, then translate.
		let p = xform.local_transformation().transform(gf::Vec3d::new(1.0, 0.0, 0.0));
		assert_abs_diff_eq!(p.x, 10.0, epsilon = 1e-6);
		assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-6);
		assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-6);
	}

	#[test]
	fn duplicate_ops_are_rejected_and_inverse_ops_share_attributes() {
		let stage = usd::Stage::create_in_memory();
		let xform = Xform::define(&stage, "/World").unwrap().xformable();

		let pivot = xform.add_translate_op(Precision::Float, Some("pivot")).unwrap();
		pivot.set(gf::Vec3f::new(1.0, 2.0, 3.0));
		assert!(xform.add_translate_op(Precision::Float, Some("pivot")).is_err());
		let inverse = xform
			.add_xform_op(XformOpType::Translate, Precision::Float, Some("pivot"), true)
			.unwrap();
		assert_eq!(inverse.attr(), pivot.attr());
		assert!(xform.local_transformation().is_identity());
	}

	#[test]
	fn reset_xform_stack() {
		let stage = usd::Stage::create_in_memory();
		let xform = Xform::define(&stage, "/World").unwrap().xformable();
		let op = xform.add_translate_op(Precision::Double, None).unwrap();
		op.set(gf::Vec3d::new(1.0, 0.0, 0.0));
		assert!(!xform.resets_xform_stack());

		assert!(xform.set_xform_op_order(&[op], true));
		assert!(xform.resets_xform_stack());
		assert_eq!(xform.ordered_xform_ops().len(), 1);
		assert!(xform.clear_xform_op_order());
		assert!(xform.local_transformation().is_identity());
	}
}
