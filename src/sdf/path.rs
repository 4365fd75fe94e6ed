use crate::tf;

/// A path value used to locate objects in layers or scenegraphs.
///
/// Paths are kept in their textual form. Text that does not parse as a prim
/// or property path becomes the [`Path::empty_path`].
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Path {
	text: String,
}

impl Path {
	/// The empty path value.
	pub const fn empty_path() -> Self {
		Self {
			text: String::new(),
		}
	}

	/// The absolute path representing the top of the namespace hierarchy.
	pub fn absolute_root_path() -> Self {
		Self {
			text: "/".to_string(),
		}
	}

	/// The relative path representing "self".
	pub fn reflexive_relative_path() -> Self {
		Self {
			text: ".".to_string(),
		}
	}

	fn from_text_unchecked(text: String) -> Self {
		Self { text }
	}

	/// Return true if `name` is a legal prim or property name: an alphabetic
	/// character or `_` followed by alphanumerics or `_`.
	pub fn is_valid_identifier(name: &str) -> bool {
		let mut chars = name.chars();
		match chars.next() {
			Some(c) if c.is_alphabetic() || c == '_' => {}
			_ => return false,
		}
		chars.all(|c| c.is_alphanumeric() || c == '_')
	}

	/// Return true if `name` is one or more identifiers joined by `:`.
	pub fn is_valid_namespaced_identifier(name: &str) -> bool {
		!name.is_empty() && name.split(':').all(Self::is_valid_identifier)
	}

	/// Split into the prim part and the optional property name.
	fn split(&self) -> (&str, Option<&str>) {
		split_property(&self.text)
	}
}

fn split_property(text: &str) -> (&str, Option<&str>) {
	let elem_start = text.rfind('/').map_or(0, |i| i + 1);
	let last = &text[elem_start..];
	if last == "." || last == ".." {
		return (text, None);
	}
	match last.find('.') {
		Some(dot) => {
			let split_at = elem_start + dot;
			(&text[..split_at], Some(&text[split_at + 1..]))
		}
		None => (text, None),
	}
}

fn parse(text: &str) -> Option<Path> {
	if text.is_empty() {
		return Some(Path::empty_path());
	}
	if text == "/" {
		return Some(Path::absolute_root_path());
	}

	let (prim, prop) = split_property(text);
	if let Some(prop) = prop
		&& (!Path::is_valid_namespaced_identifier(prop) || prim.is_empty() || prim == "/")
	{
		return None;
	}

	if let Some(rest) = prim.strip_prefix('/') {
		if !rest.split('/').all(Path::is_valid_identifier) {
			return None;
		}
	} else {
		let mut seen_name = false;
		for element in prim.split('/') {
			match element {
				"." if prim == "." => {}
				".." if !seen_name => {}
				name if Path::is_valid_identifier(name) => seen_name = true,
				_ => return None,
			}
		}
	}

	Some(Path::from_text_unchecked(text.to_string()))
}

/// Querying paths.
impl Path {
	/// Returns true if this path is the [`Self::empty_path`].
	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	/// Returns true if this path is the [`Self::absolute_root_path`].
	pub fn is_absolute_root(&self) -> bool {
		self.text == "/"
	}

	pub fn is_absolute_path(&self) -> bool {
		self.text.starts_with('/')
	}

	/// Returns whether the path identifies a prim.
	pub fn is_prim_path(&self) -> bool {
		!self.is_empty() && !self.is_absolute_root() && self.split().1.is_none()
	}

	/// Returns whether the path is an absolute path identifying a prim.
	pub fn is_absolute_prim_path(&self) -> bool {
		self.is_absolute_path() && self.is_prim_path()
	}

	/// Returns whether the path identifies a prim's property.
	pub fn is_prim_property_path(&self) -> bool {
		self.split().1.is_some()
	}

	/// Return the path that identifies this path's namespace parent.
	///
	/// Note that the parent path of a relative parent path (`..`) is a relative grandparent path (`../..`).
	/// Use caution writing loops that walk to parent paths since relative paths have infinitely many ancestors.
	/// To more safely traverse ancestor paths, consider using [`Self::ancestors_range`].
	pub fn parent_path(&self) -> Self {
		if self.is_empty() || self.is_absolute_root() {
			return Self::empty_path();
		}

		// If this is a property-like path, trim that first.
		let (prim, prop) = self.split();
		if prop.is_some() {
			return Self::from_text_unchecked(prim.to_string());
		}

		if self.text == "." {
			return Self::from_text_unchecked("..".to_string());
		}
		if self.text.ends_with("..") {
			return Self::from_text_unchecked(format!("{}/..", self.text));
		}

		match self.text.rfind('/') {
			Some(0) => Self::absolute_root_path(),
			Some(i) => Self::from_text_unchecked(self.text[..i].to_string()),
			None => Self::reflexive_relative_path(),
		}
	}

	/// Return a range for iterating over the ancestors of this path.
	///
	/// The range provides iteration over the prefixes of a path, ordered from longest to shortest.
	/// Starting with the path itself and ending with a single element path, not including the empty/root path.
	pub fn ancestors_range(&self) -> PathAncestorsRange {
		PathAncestorsRange { path: self.clone() }
	}

	/// Returns the name of the prim or property identified by the path.
	pub fn name(&self) -> String {
		self.name_str().to_string()
	}

	pub fn name_token(&self) -> tf::Token {
		tf::Token::new(self.name_str())
	}

	fn name_str(&self) -> &str {
		if self.is_absolute_root() {
			return "";
		}
		match self.split() {
			(_, Some(prop)) => prop,
			(prim, None) => prim.rsplit('/').next().unwrap_or_default(),
		}
	}

	/// Return the prim path, stripping any property part.
	pub fn prim_path(&self) -> Self {
		Self::from_text_unchecked(self.split().0.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Return true if `prefix` is this path or one of its ancestors.
	pub fn has_prefix(&self, prefix: &Path) -> bool {
		if prefix.is_empty() || self.is_empty() {
			return false;
		}
		if prefix.is_absolute_root() {
			return self.is_absolute_path();
		}
		match self.text.strip_prefix(prefix.text.as_str()) {
			Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('.'),
			None => false,
		}
	}

	/// Replace the prefix `old` with `new`, or return this path unchanged
	/// when `old` is not a prefix.
	pub fn replace_prefix(&self, old: &Path, new: &Path) -> Self {
		if !self.has_prefix(old) || new.is_empty() {
			return self.clone();
		}

		let rest = if old.is_absolute_root() {
			&self.text[..]
		} else {
			&self.text[old.text.len()..]
		};

		if rest.is_empty() || rest == "/" {
			return new.clone();
		}
		if new.is_absolute_root() {
			return match rest.starts_with('/') {
				true => Self::from_text_unchecked(rest.to_string()),
				false => Self::empty_path(),
			};
		}
		Self::from_text_unchecked(format!("{}{}", new.text, rest))
	}
}

/// Creating new paths by modifying existing paths.
impl Path {
	/// Creates a path by appending an element for `child_name` to this path.
	///
	/// This path must be a prim path, the AbsoluteRootPath or the ReflexiveRelativePath.
	pub fn append_child(&self, child_name: &tf::Token) -> Self {
		if self.is_empty()
			|| self.is_prim_property_path()
			|| !Self::is_valid_identifier(child_name.as_str())
		{
			return Self::empty_path();
		}

		match self.text.as_str() {
			"/" => Self::from_text_unchecked(format!("/{}", child_name)),
			"." => Self::from_text_unchecked(child_name.to_string()),
			text => Self::from_text_unchecked(format!("{}/{}", text, child_name)),
		}
	}

	/// Creates a path by appending an element for `prop_name` to this path.
	///
	/// This path must be a prim path or the ReflexiveRelativePath.
	pub fn append_property(&self, prop_name: &tf::Token) -> Self {
		if self.is_empty()
			|| self.is_absolute_root()
			|| self.is_prim_property_path()
			|| !Self::is_valid_namespaced_identifier(prop_name.as_str())
		{
			return Self::empty_path();
		}

		Self::from_text_unchecked(format!("{}.{}", self.text, prop_name))
	}
}

impl Default for Path {
	fn default() -> Self {
		Self::empty_path()
	}
}

impl From<&str> for Path {
	fn from(s: &str) -> Self {
		parse(s).unwrap_or_else(Self::empty_path)
	}
}

impl From<String> for Path {
	fn from(s: String) -> Self {
		Self::from(s.as_str())
	}
}

impl From<&Path> for Path {
	fn from(p: &Path) -> Self {
		p.clone()
	}
}

impl std::fmt::Display for Path {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(&self.text)
	}
}

pub struct PathAncestorsRange {
	path: Path,
}

impl std::iter::Iterator for PathAncestorsRange {
	type Item = Path;

	fn next(&mut self) -> Option<Self::Item> {
		if self.path.is_empty() || self.path.is_absolute_root() || self.path.as_str() == "." {
			return None;
		}

		let current_path = self.path.clone();
		let parent = self.path.parent_path();
		self.path = if parent.is_absolute_root() || parent.as_str() == "." {
			Path::empty_path()
		} else {
			parent
		};

		Some(current_path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn p(s: &str) -> Path {
		Path::from(s)
	}

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	#[test]
	fn parse_validity() {
		assert_eq!(p("/foo/bar").as_str(), "/foo/bar");
		assert_eq!(p("/foo/bar.inputs:diffuseColor").as_str(), "/foo/bar.inputs:diffuseColor");
		assert_eq!(p("../foo").as_str(), "../foo");
		assert!(p("/foo/1bar").is_empty());
		assert!(p("/foo//bar").is_empty());
		assert!(p("/.prop").is_empty());
		assert!(p("/foo.inputs:").is_empty());
	}

	#[test]
	fn append_child() {
		assert_eq!(p("/foo").append_child(&t("bar")), p("/foo/bar"));
		assert_eq!(p("foo").append_child(&t("bar")), p("foo/bar"));
		assert_eq!(p("/").append_child(&t("bar")), p("/bar"));
		assert_eq!(p("/foo.prop").append_child(&t("bar")), Path::empty_path());
		assert_eq!(p("/foo").append_child(&t("1bar")), Path::empty_path());
	}

	#[test]
	fn append_property() {
		assert_eq!(p("/foo").append_property(&t("prop")), p("/foo.prop"));
		assert_eq!(
			p("/foo").append_property(&t("prop:foo:bar")),
			p("/foo.prop:foo:bar")
		);
		assert_eq!(
			p("/foo.prop").append_property(&t("prop2")),
			Path::empty_path()
		);
		assert_eq!(
			p("/foo.prop").append_property(&t("prop2:foo:bar")),
			Path::empty_path()
		);
	}

	#[test]
	fn parent_path() {
		assert_eq!(p("/foo").parent_path(), Path::absolute_root_path());
		assert_eq!(p("/foo/bar").parent_path(), p("/foo"));
		assert_eq!(p("foo/bar").parent_path(), p("foo"));
		assert_eq!(p("/foo.prop").parent_path(), p("/foo"));
		assert_eq!(p("foo.prop").parent_path(), p("foo"));
		assert_eq!(p("/foo.prop:bar").parent_path(), p("/foo"));
		assert_eq!(p("..").parent_path().as_str(), "../..");
	}

	#[test]
	fn ancestors_range() {
		let path = p("/foo/bar/baz");
		let mut ancestors = path.ancestors_range();
		assert_eq!(ancestors.next(), Some(p("/foo/bar/baz")));
		assert_eq!(ancestors.next(), Some(p("/foo/bar")));
		assert_eq!(ancestors.next(), Some(p("/foo")));
		assert_eq!(ancestors.next(), None);

		let path = p("/foo/bar/baz.prop");
		let mut ancestors = path.ancestors_range();
		assert_eq!(ancestors.next(), Some(p("/foo/bar/baz.prop")));
		assert_eq!(ancestors.next(), Some(p("/foo/bar/baz")));
		assert_eq!(ancestors.next(), Some(p("/foo/bar")));
		assert_eq!(ancestors.next(), Some(p("/foo")));
		assert_eq!(ancestors.next(), None);
	}

	#[test]
	fn prefixes() {
		assert!(p("/foo/bar").has_prefix(&p("/foo")));
		assert!(p("/foo.prop").has_prefix(&p("/foo")));
		assert!(p("/foo").has_prefix(&Path::absolute_root_path()));
		assert!(!p("/foobar").has_prefix(&p("/foo")));

		assert_eq!(p("/foo/bar.x").replace_prefix(&p("/foo"), &p("/baz")), p("/baz/bar.x"));
		assert_eq!(p("/foo/bar").replace_prefix(&p("/foo"), &Path::absolute_root_path()), p("/bar"));
		assert_eq!(p("/foo/bar").replace_prefix(&Path::absolute_root_path(), &p("/root")), p("/root/foo/bar"));
		assert_eq!(p("/other").replace_prefix(&p("/foo"), &p("/baz")), p("/other"));
	}

	#[test]
	fn identifiers() {
		assert!(Path::is_valid_identifier("World"));
		assert!(Path::is_valid_identifier("_private2"));
		assert!(!Path::is_valid_identifier("2World"));
		assert!(!Path::is_valid_identifier("Wor ld"));
		assert!(!Path::is_valid_identifier(""));
		assert!(Path::is_valid_namespaced_identifier("inputs:file"));
		assert!(!Path::is_valid_namespaced_identifier("inputs::file"));
	}

	#[test]
	fn print() {
		assert_eq!(p("/foo").to_string(), "/foo");
		assert_eq!(p("/foo/bar").to_string(), "/foo/bar");
		assert_eq!(p("foo/bar").to_string(), "foo/bar");
		assert_eq!(p("/foo.prop").to_string(), "/foo.prop");
		assert_eq!(p("/foo.prop").name(), "prop");
		assert_eq!(p("/foo/bar").name(), "bar");
	}
}
