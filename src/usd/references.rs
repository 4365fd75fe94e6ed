use super::Prim;
use crate::{
	sdf::{self, FIELD_KEYS},
	tf,
	vt::{self, ValueType},
};
use std::marker::PhantomData;

/// Edits a list-op valued composition arc field of a prim at the stage's edit target.
pub struct ArcEditor<'a, T> {
	prim: Prim<'a>,
	field: &'static tf::Token,
	_marker: PhantomData<T>,
}

/// Editor for the `references` of a prim.
pub type References<'a> = ArcEditor<'a, sdf::Reference>;

/// Editor for the `payload` arcs of a prim.
pub type Payloads<'a> = ArcEditor<'a, sdf::Payload>;

impl<'a> References<'a> {
	pub(crate) fn new(prim: Prim<'a>) -> Self {
		Self {
			prim,
			field: &FIELD_KEYS.references,
			_marker: PhantomData,
		}
	}

	pub fn add_reference(&self, reference: sdf::Reference) -> bool {
		self.add(reference)
	}

	/// Add a reference to `prim_path` within the same layer stack.
	pub fn add_internal_reference(&self, prim_path: sdf::Path) -> bool {
		self.add(sdf::Reference::new("", prim_path))
	}
}

impl<'a> Payloads<'a> {
	pub(crate) fn new(prim: Prim<'a>) -> Self {
		Self {
			prim,
			field: &FIELD_KEYS.payload,
			_marker: PhantomData,
		}
	}

	pub fn add_payload(&self, payload: sdf::Payload) -> bool {
		self.add(payload)
	}
}

impl<'a, T> ArcEditor<'a, T>
where
	T: Clone + PartialEq,
	sdf::ListOp<T>: ValueType + Into<vt::Value>,
{
	pub fn prim(&self) -> &Prim<'a> {
		&self.prim
	}

	/// Add `item` to the back of the prepend list. An item that is already
	/// present leaves the list op unchanged.
	pub fn add(&self, item: T) -> bool {
		if !self.prim.is_valid() || self.prim.is_pseudo_root() {
			return false;
		}
		let mut op = self.authored_op().unwrap_or_default();
		op.prepend(item);
		self.prim.set_metadata(self.field, op)
	}

	/// Remove `item` from every list of the edit target's list op.
	pub fn remove(&self, item: &T) -> bool {
		let Some(mut op) = self.authored_op() else {
			return true;
		};
		op.remove(item);
		self.prim.set_metadata(self.field, op)
	}

	/// Author an explicit list of arcs at the edit target.
	pub fn set(&self, items: Vec<T>) -> bool {
		self.prim.set_metadata(self.field, sdf::ListOp::explicit(items))
	}

	/// Remove the arc opinion from the edit target.
	pub fn clear(&self) -> bool {
		self.prim.clear_metadata(self.field)
	}

	/// Return the list op authored at the edit target.
	pub fn authored_op(&self) -> Option<sdf::ListOp<T>> {
		self.prim
			.stage()
			.edit_target()
			.field_as::<sdf::ListOp<T>>(self.prim.path(), self.field)
	}

	/// Return the composed arcs, strongest first.
	pub fn items(&self) -> Vec<T> {
		self.prim
			.metadata::<sdf::ListOp<T>>(self.field)
			.map(|op| op.ordered_elements())
			.unwrap_or_default()
	}
}
