use super::Prim;

/// A depth-first, pre-order traversal of a prim subtree.
///
/// Call [`PrimRange::prune_children`] to skip the descendants of the prim
/// most recently returned.
pub struct PrimRange<'a> {
	stack: Vec<Prim<'a>>,
	last: Option<Prim<'a>>,
	pruned: bool,
	all: bool,
}

impl<'a> PrimRange<'a> {
	/// Traverse `root` and its descendants.
	pub fn new(root: Prim<'a>) -> Self {
		Self {
			stack: vec![root],
			last: None,
			pruned: false,
			all: false,
		}
	}

	/// Traverse the descendants of `root`, excluding `root` itself.
	pub fn children_of(root: Prim<'a>) -> Self {
		Self {
			stack: Vec::new(),
			last: Some(root),
			pruned: false,
			all: false,
		}
	}

	/// Include inactive, undefined and abstract prims.
	pub fn all_prims(mut self) -> Self {
		self.all = true;
		self
	}

	pub fn prune_children(&mut self) {
		self.pruned = true;
	}

	fn children(&self, prim: &Prim<'a>) -> Vec<Prim<'a>> {
		if self.all { prim.all_children() } else { prim.children() }
	}
}

impl<'a> Iterator for PrimRange<'a> {
	type Item = Prim<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(last) = self.last.take() {
			if !self.pruned {
				let children = self.children(&last);
				self.stack.extend(children.into_iter().rev());
			}
		}
		self.pruned = false;

		let prim = self.stack.pop()?;
		self.last = Some(prim.clone());
		Some(prim)
	}
}
