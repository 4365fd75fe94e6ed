//! Valid and unique prim and property names, and prim display names.
//!
//! Names that are not valid identifiers are encoded with a Bootstring
//! variant over the identifier alphabet and prefixed with `tn__`, so the
//! original name can be recovered from the encoded one.

use std::collections::HashMap;

use crate::{Error, Result, sdf::FIELD_KEYS, sdf, tf, tf_coding_error, tf_runtime_error, usd};

const PREFIX: &str = "tn__";
const DELIMITER: char = '_';
const DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = 62;
const T_MIN: u64 = 1;
const T_MAX: u64 = 52;
const SKEW: u64 = 38;
const DAMP: u64 = 700;
const INITIAL_BIAS: u64 = 72;
const INITIAL_N: u64 = 0;

fn is_basic(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

fn threshold(k: u64, bias: u64) -> u64 {
	if k <= bias {
		T_MIN
	} else if k >= bias + T_MAX {
		T_MAX
	} else {
		k - bias
	}
}

fn adapt(delta: u64, num_points: u64, first_time: bool) -> u64 {
	let mut delta = if first_time { delta / DAMP } else { delta / 2 };
	delta += delta / num_points;
	let mut k = 0;
	while delta > ((BASE - T_MIN) * T_MAX) / 2 {
		delta /= BASE - T_MIN;
		k += BASE;
	}
	k + (BASE - T_MIN + 1) * delta / (delta + SKEW)
}

fn digit(value: u64) -> char {
	DIGITS[value as usize] as char
}

/// Encode `name` so the result only holds identifier characters.
fn encode(name: &str) -> String {
	let input: Vec<u64> = name.chars().map(u64::from).collect();
	let basic = |c: u64| char::from_u32(c as u32).is_some_and(is_basic);

	let mut output: String = name.chars().filter(|&c| is_basic(c)).collect();
	let basic_count = output.chars().count() as u64;
	let mut handled = basic_count;
	if basic_count > 0 {
		output.push(DELIMITER);
	}

	let mut n = INITIAL_N;
	let mut delta = 0;
	let mut bias = INITIAL_BIAS;
	while (handled as usize) < input.len() {
		let Some(m) = input.iter().copied().filter(|&c| c >= n && !basic(c)).min() else {
			break;
		};
		delta += (m - n) * (handled + 1);
		n = m;

		for &c in &input {
			if c < n || basic(c) {
				delta += 1;
			} else if c == n {
				let mut q = delta;
				let mut k = BASE;
				loop {
					let t = threshold(k, bias);
					if q < t {
						break;
					}
					output.push(digit(t + (q - t) % (BASE - t)));
					q = (q - t) / (BASE - t);
					k += BASE;
				}
				output.push(digit(q));
				bias = adapt(delta, handled + 1, handled == basic_count);
				delta = 0;
				handled += 1;
			}
		}
		delta += 1;
		n += 1;
	}
	output
}

/// Return `name` unchanged when it is a valid identifier, otherwise its
/// `tn__` encoding.
fn make_valid_identifier(name: &str) -> String {
	if sdf::Path::is_valid_identifier(name) {
		return name.to_string();
	}
	format!("{}{}", PREFIX, encode(name))
}

/// Make `name` a valid prim name.
pub fn valid_prim_name(name: &str) -> tf::Token {
	tf::Token::new(make_valid_identifier(name))
}

/// Make `name` a valid property name. Each `:` separated namespace is made
/// valid on its own.
pub fn valid_property_name(name: &str) -> tf::Token {
	let parts: Vec<String> = name.split(':').map(make_valid_identifier).collect();
	tf::Token::new(parts.join(":"))
}

#[derive(Debug, Default)]
struct NameReservation {
	used: Vec<tf::Token>,
	start_indices: HashMap<String, usize>,
}

impl NameReservation {
	fn reserve(&mut self, names: impl IntoIterator<Item = tf::Token>) {
		self.used.extend(names);
	}

	fn reserve_children(&mut self, prim: &usd::Prim) {
		self.reserve(prim.all_children().iter().map(|child| child.name()));
	}

	/// Allocate one unique valid name per requested name, in order.
	///
	/// A taken name gets a `_<n>` suffix on the original name. Suffixed names
	/// that are requested later in `names` are skipped, so those requests
	/// keep their name.
	fn allocate<S: AsRef<str>>(&mut self, names: &[S], make_valid: fn(&str) -> tf::Token) -> Vec<tf::Token> {
		let mut result = Vec::with_capacity(names.len());
		for (index, original) in names.iter().enumerate() {
			let original = original.as_ref();
			let valid = make_valid(original);
			let mut name = valid.clone();
			loop {
				if !self.used.contains(&name) {
					let requested_later = names[index + 1..].iter().any(|later| later.as_ref() == name.as_str());
					if name == valid || !requested_later {
						self.used.push(name.clone());
						result.push(name);
						break;
					}
				}
				let start = self.start_indices.entry(original.to_string()).or_default();
				*start += 1;
				name = make_valid(&format!("{}_{}", original, start));
			}
		}
		result
	}
}

/// Make each of `names` a valid prim name that is unique among the results
/// and distinct from `reserved_names`.
pub fn valid_prim_names<S: AsRef<str>>(names: &[S], reserved_names: &[tf::Token]) -> Vec<tf::Token> {
	let mut reservation = NameReservation::default();
	reservation.reserve(reserved_names.iter().cloned());
	reservation.allocate(names, valid_prim_name)
}

/// Make each of `names` a valid property name that is unique among the
/// results and distinct from `reserved_names`.
pub fn valid_property_names<S: AsRef<str>>(names: &[S], reserved_names: &[tf::Token]) -> Vec<tf::Token> {
	let mut reservation = NameReservation::default();
	reservation.reserve(reserved_names.iter().cloned());
	reservation.allocate(names, valid_property_name)
}

/// Make `name` a valid prim name that no child of `prim` uses yet.
pub fn valid_child_name(prim: &usd::Prim, name: &str) -> Result<tf::Token> {
	let mut cache = ValidChildNameCache::new();
	cache.valid_child_name(prim, name)
}

/// Make each of `names` a valid prim name that no child of `prim` uses and
/// that is unique among the results.
pub fn valid_child_names<S: AsRef<str>>(prim: &usd::Prim, names: &[S]) -> Vec<tf::Token> {
	ValidChildNameCache::new().valid_child_names(prim, names)
}

/// Child names allocated per parent prim.
///
/// The existing children of a parent are reserved the first time it is
/// seen. Names handed out later stay reserved until the parent is cleared,
/// so prims can be defined after a whole batch of names is allocated.
#[derive(Debug, Default)]
pub struct ValidChildNameCache {
	parents: HashMap<sdf::Path, NameReservation>,
}

impl ValidChildNameCache {
	pub fn new() -> Self {
		Self::default()
	}

	fn reservation(&mut self, prim: &usd::Prim) -> Option<&mut NameReservation> {
		if !prim.is_valid() {
			tf_coding_error!("Unable to reserve the child names of invalid prim <{}>", prim.path());
			return None;
		}
		let reservation = self.parents.entry(prim.path().clone()).or_insert_with(|| {
			let mut reservation = NameReservation::default();
			reservation.reserve_children(prim);
			reservation
		});
		Some(reservation)
	}

	/// Allocate unique valid child names of `prim`. Returns nothing for an
	/// invalid prim.
	pub fn valid_child_names<S: AsRef<str>>(&mut self, prim: &usd::Prim, names: &[S]) -> Vec<tf::Token> {
		match self.reservation(prim) {
			Some(reservation) => reservation.allocate(names, valid_prim_name),
			None => Vec::new(),
		}
	}

	pub fn valid_child_name(&mut self, prim: &usd::Prim, name: &str) -> Result<tf::Token> {
		self.valid_child_names(prim, &[name]).pop().ok_or_else(|| {
			let message = format!(
				"Could not produce a valid child name for <{}> based on the preferred name {}",
				prim.path(),
				name
			);
			tf_runtime_error!("{}", message);
			Error::InvalidArgument(message)
		})
	}

	/// Reserve the current children of `prim` again, e.g. after prims were
	/// defined outside of the cache.
	pub fn update(&mut self, prim: &usd::Prim) {
		if let Some(reservation) = self.reservation(prim) {
			reservation.reserve_children(prim);
		}
	}

	/// Forget every name allocated below `prim`.
	pub fn clear(&mut self, prim: &usd::Prim) {
		self.parents.remove(prim.path());
	}
}

/// Return the display name of `prim`, empty when none is authored.
pub fn display_name(prim: &usd::Prim) -> String {
	prim.metadata::<String>(&FIELD_KEYS.display_name).unwrap_or_default()
}

/// Author the display name of `prim` at the edit target.
pub fn set_display_name(prim: &usd::Prim, name: &str) -> bool {
	prim.set_metadata(&FIELD_KEYS.display_name, name.to_string())
}

/// Remove the display name opinion of the edit target.
pub fn clear_display_name(prim: &usd::Prim) -> bool {
	prim.clear_metadata(&FIELD_KEYS.display_name)
}

/// Author an empty display name, hiding weaker display names.
pub fn block_display_name(prim: &usd::Prim) -> bool {
	set_display_name(prim, "")
}

/// Return the display name of `prim`, or its name when the display name is
/// empty.
pub fn compute_effective_display_name(prim: &usd::Prim) -> String {
	let name = display_name(prim);
	if name.is_empty() {
		return prim.name().as_str().to_string();
	}
	name
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tf::DiagnosticKind;

	fn t(s: &str) -> tf::Token {
		tf::Token::new(s)
	}

	fn from_digit(c: char) -> u64 {
		DIGITS.iter().position(|&d| d as char == c).unwrap() as u64
	}

	fn decode(name: &str) -> String {
		let Some(encoded) = name.strip_prefix(PREFIX) else {
			return name.to_string();
		};
		let (basic, digits) = match encoded.rfind(DELIMITER) {
			Some(index) => (&encoded[..index], &encoded[index + 1..]),
			None => ("", encoded),
		};

		let mut output: Vec<char> = basic.chars().collect();
		let mut n = INITIAL_N;
		let mut i = 0;
		let mut bias = INITIAL_BIAS;
		let mut digits = digits.chars();
		while let Some(mut c) = digits.next() {
			let old_i = i;
			let mut w = 1;
			let mut k = BASE;
			loop {
				let value = from_digit(c);
				i += value * w;
				let t = threshold(k, bias);
				if value < t {
					break;
				}
				w *= BASE - t;
				k += BASE;
				c = digits.next().unwrap();
			}
			let length = output.len() as u64 + 1;
			bias = adapt(i - old_i, length, old_i == 0);
			n += i / length;
			i %= length;
			output.insert(i as usize, char::from_u32(n as u32).unwrap());
			i += 1;
		}
		output.into_iter().collect()
	}

	#[test]
	fn valid_identifiers_are_unchanged() {
		for name in ["Cube", "_private", "Cube_01", "Würfel"] {
			assert_eq!(valid_prim_name(name), t(name));
		}
	}

	#[test]
	fn invalid_names_are_encoded() {
		for name in ["1Cube", "Cube 01", "my-mesh.obj", "", "立方体 (2)", "a:b", "____"] {
			let valid = valid_prim_name(name);
			assert!(sdf::Path::is_valid_identifier(valid.as_str()), "{valid}");
			assert!(valid.as_str().starts_with("tn__") || sdf::Path::is_valid_identifier(name));
			assert_eq!(decode(valid.as_str()), name, "{valid}");
		}
		assert_eq!(valid_prim_name(""), t("tn__"));
		assert_eq!(valid_prim_name("1Cube"), t("tn__1Cube_"));
	}

	#[test]
	fn property_names_keep_their_namespaces() {
		assert_eq!(valid_property_name("primvars:displayColor"), t("primvars:displayColor"));
		let valid = valid_property_name("inputs:base color");
		assert!(valid.as_str().starts_with("inputs:tn__"));
		assert!(sdf::Path::is_valid_namespaced_identifier(valid.as_str()));
		assert_eq!(decode(valid.as_str().trim_start_matches("inputs:")), "base color");
		assert_eq!(valid_property_name(""), t("tn__"));
	}

	#[test]
	fn names_are_made_unique() {
		let names = valid_prim_names(&["Cube", "Cube", "Cube_1", "Cube"], &[t("Sphere")]);
		assert_eq!(names, vec![t("Cube"), t("Cube_2"), t("Cube_1"), t("Cube_3")]);

		let names = valid_prim_names(&["Sphere", "1Sphere"], &[t("Sphere")]);
		assert_eq!(names[0], t("Sphere_1"));
		assert!(names[1].as_str().starts_with("tn__"));

		let names = valid_property_names(&["inputs:a", "inputs:a"], &[]);
		assert_eq!(names, vec![t("inputs:a"), t("inputs:a_1")]);
	}

	#[test]
	fn child_names_avoid_existing_children() {
		let stage = usd::Stage::create_in_memory();
		stage.define_prim("/World/Cube", &t("Cube")).unwrap();
		stage.define_prim("/World/Cube_1", &t("Cube")).unwrap();
		let world = stage.prim_at_path("/World");

		assert_eq!(valid_child_name(&world, "Cube").unwrap(), t("Cube_2"));
		assert_eq!(valid_child_names(&world, &["Cube", "Sphere"]), vec![t("Cube_2"), t("Sphere")]);
		assert_eq!(valid_child_name(&stage.pseudo_root(), "World").unwrap(), t("World_1"));

		let mut cache = ValidChildNameCache::new();
		assert_eq!(cache.valid_child_name(&world, "Cube").unwrap(), t("Cube_2"));
		// Names handed out stay reserved until the parent is cleared.
		assert_eq!(cache.valid_child_name(&world, "Cube").unwrap(), t("Cube_3"));

		stage.define_prim("/World/Sphere", &t("Sphere")).unwrap();
		cache.update(&world);
		assert_eq!(cache.valid_child_name(&world, "Sphere").unwrap(), t("Sphere_1"));

		cache.clear(&world);
		assert_eq!(cache.valid_child_name(&world, "Cube").unwrap(), t("Cube_2"));
	}

	#[test]
	fn invalid_parents_have_no_child_names() {
		let stage = usd::Stage::create_in_memory();
		let missing = stage.prim_at_path("/Missing");
		let capture = tf::DiagnosticCapture::begin();

		assert!(valid_child_names(&missing, &["Cube"]).is_empty());
		assert!(capture.has(DiagnosticKind::CodingError, "invalid prim </Missing>"));

		let err = valid_child_name(&missing, "Cube").unwrap_err();
		assert!(err.to_string().contains("Could not produce a valid child name for </Missing>"));
		assert!(capture.has(DiagnosticKind::RuntimeError, "based on the preferred name Cube"));
	}

	#[test]
	fn display_names_fall_back_to_the_prim_name() {
		let stage = usd::Stage::create_in_memory();
		let prim = stage.define_prim("/World/tn__Cube01_", &t("Cube")).unwrap();
		assert_eq!(display_name(&prim), "");
		assert_eq!(compute_effective_display_name(&prim), "tn__Cube01_");

		assert!(set_display_name(&prim, "Cube 01"));
		assert_eq!(display_name(&prim), "Cube 01");
		assert_eq!(compute_effective_display_name(&prim), "Cube 01");

		assert!(block_display_name(&prim));
		assert!(prim.has_authored_metadata(&FIELD_KEYS.display_name));
		assert_eq!(compute_effective_display_name(&prim), "tn__Cube01_");

		assert!(clear_display_name(&prim));
		assert!(!prim.has_authored_metadata(&FIELD_KEYS.display_name));
	}
}
