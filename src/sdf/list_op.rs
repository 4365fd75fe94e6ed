use crate::{sdf, tf};

/// Enum for specifying one of the list editing operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOpType {
	Explicit,
	Deleted,
	Prepended,
	Appended,
}

/// Value type representing a list-edit operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOp<T> {
	pub is_explicit: bool,
	pub explicit_items: Vec<T>,
	pub prepended_items: Vec<T>,
	pub appended_items: Vec<T>,
	pub deleted_items: Vec<T>,
}

impl<T> Default for ListOp<T> {
	fn default() -> Self {
		Self {
			is_explicit: false,
			explicit_items: Vec::new(),
			prepended_items: Vec::new(),
			appended_items: Vec::new(),
			deleted_items: Vec::new(),
		}
	}
}

pub type TokenListOp = ListOp<tf::Token>;
pub type StringListOp = ListOp<String>;
pub type PathListOp = ListOp<sdf::Path>;
pub type ReferenceListOp = ListOp<sdf::Reference>;
pub type PayloadListOp = ListOp<sdf::Payload>;

impl<T: Clone + PartialEq> ListOp<T> {
	/// Create an explicit list op holding `items`.
	pub fn explicit(items: Vec<T>) -> Self {
		Self {
			is_explicit: true,
			explicit_items: items,
			..Default::default()
		}
	}

	pub fn set_explicit_items(&mut self, items: Vec<T>) {
		*self = Self::explicit(items);
	}

	pub fn items(&self, op_type: ListOpType) -> &[T] {
		match op_type {
			ListOpType::Explicit => &self.explicit_items,
			ListOpType::Deleted => &self.deleted_items,
			ListOpType::Prepended => &self.prepended_items,
			ListOpType::Appended => &self.appended_items,
		}
	}

	/// Add `item` to the back of the prepended items.
	///
	/// An item that is already prepended stays where it is. For an explicit
	/// list op the item is added to the back of the explicit items instead.
	pub fn prepend(&mut self, item: T) {
		if self.is_explicit {
			if !self.explicit_items.contains(&item) {
				self.explicit_items.push(item);
			}
			return;
		}
		self.deleted_items.retain(|i| *i != item);
		if !self.prepended_items.contains(&item) {
			self.prepended_items.push(item);
		}
	}

	/// Add `item` to the back of the appended items.
	pub fn append(&mut self, item: T) {
		if self.is_explicit {
			if !self.explicit_items.contains(&item) {
				self.explicit_items.push(item);
			}
			return;
		}
		self.deleted_items.retain(|i| *i != item);
		if !self.appended_items.contains(&item) {
			self.appended_items.push(item);
		}
	}

	/// Mark `item` as deleted, removing it from the added items.
	pub fn delete(&mut self, item: T) {
		if self.is_explicit {
			self.explicit_items.retain(|i| *i != item);
			return;
		}
		self.prepended_items.retain(|i| *i != item);
		self.appended_items.retain(|i| *i != item);
		if !self.deleted_items.contains(&item) {
			self.deleted_items.push(item);
		}
	}

	/// Remove `item` from every list without recording a deletion.
	pub fn remove(&mut self, item: &T) {
		self.explicit_items.retain(|i| i != item);
		self.prepended_items.retain(|i| i != item);
		self.appended_items.retain(|i| i != item);
		self.deleted_items.retain(|i| i != item);
	}

	pub fn has_item(&self, item: &T) -> bool {
		self.explicit_items.contains(item)
			|| self.prepended_items.contains(item)
			|| self.appended_items.contains(item)
			|| self.deleted_items.contains(item)
	}

	/// Return true if this list op has no opinion at all.
	pub fn is_empty(&self) -> bool {
		!self.is_explicit
			&& self.prepended_items.is_empty()
			&& self.appended_items.is_empty()
			&& self.deleted_items.is_empty()
	}

	/// Apply the edits of this list op to `items`.
	pub fn apply_operations(&self, items: &mut Vec<T>) {
		if self.is_explicit {
			*items = dedup(&self.explicit_items);
			return;
		}

		items.retain(|i| !self.deleted_items.contains(i));

		let prepended = dedup(&self.prepended_items);
		items.retain(|i| !prepended.contains(i));
		let rest = std::mem::replace(items, prepended);
		items.extend(rest);

		for item in dedup(&self.appended_items) {
			items.retain(|i| *i != item);
			items.push(item);
		}
	}

	/// Compose list ops ordered strongest first into the resulting items.
	pub fn compose<'a>(ops: impl DoubleEndedIterator<Item = &'a ListOp<T>>) -> Vec<T>
	where
		T: 'a,
	{
		let mut items = Vec::new();
		for op in ops.rev() {
			op.apply_operations(&mut items);
		}
		items
	}

	/// Return the items this list op produces on its own.
	pub fn ordered_elements(&self) -> Vec<T> {
		let mut items = Vec::new();
		self.apply_operations(&mut items);
		items
	}

	pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> ListOp<U> {
		ListOp {
			is_explicit: self.is_explicit,
			explicit_items: self.explicit_items.iter().map(&f).collect(),
			prepended_items: self.prepended_items.iter().map(&f).collect(),
			appended_items: self.appended_items.iter().map(&f).collect(),
			deleted_items: self.deleted_items.iter().map(&f).collect(),
		}
	}
}

fn dedup<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
	let mut result: Vec<T> = Vec::with_capacity(items.len());
	for item in items {
		if !result.contains(item) {
			result.push(item.clone());
		}
	}
	result
}
