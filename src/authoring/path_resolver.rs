//! Relative asset paths between layers.

use crate::sdf;

/// A lexically normalized absolute path split into its root and components.
#[derive(Debug, PartialEq)]
struct Location {
	root: String,
	components: Vec<String>,
}

impl Location {
	fn parse(identifier: &str) -> Self {
		let text = identifier.replace('\\', "/");
		let (root, rest) = split_root(&text);
		let (root, rest) = match root {
			Some(root) => (root, rest.to_string()),
			// Relative identifiers are taken from the working directory.
			None => {
				let absolute = sdf::normalize_identifier(&text);
				let (root, rest) = split_root(&absolute);
				(root.unwrap_or_default(), rest.to_string())
			}
		};

		let mut components: Vec<String> = Vec::new();
		for component in rest.split('/') {
			match component {
				"" | "." => {}
				".." => {
					components.pop();
				}
				other => components.push(other.to_string()),
			}
		}
		Self { root, components }
	}
}

/// Split the root off an absolute path. Drive letters are compared without case.
fn split_root(text: &str) -> (Option<String>, &str) {
	let bytes = text.as_bytes();
	if let Some(rest) = text.strip_prefix("//") {
		// UNC share: //server/share
		let mut parts = rest.splitn(3, '/');
		let server = parts.next().unwrap_or_default();
		let share = parts.next().unwrap_or_default();
		let root = format!("//{}/{}", server, share).to_ascii_lowercase();
		return (Some(root), parts.next().unwrap_or_default());
	}
	if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
		let root = text[..2].to_ascii_uppercase();
		return (Some(root), &text[2..]);
	}
	if text.starts_with('/') {
		return (Some(String::new()), text);
	}
	(None, text)
}

/// Return the path of `source_identifier` relative to the directory of
/// `referencing_identifier`, suitable for authoring in a composition arc.
///
/// The result uses `/` separators and always starts with `./` or `../`.
/// When the two identifiers do not share a filesystem root, the source
/// identifier is returned unchanged.
pub fn relative_identifier(source_identifier: &str, referencing_identifier: &str) -> String {
	let source = Location::parse(source_identifier);
	let referencing = Location::parse(referencing_identifier);
	if source.root != referencing.root {
		return source_identifier.to_string();
	}

	let directory = &referencing.components[..referencing.components.len().saturating_sub(1)];
	let common = directory
		.iter()
		.zip(source.components.iter())
		.take_while(|(a, b)| a == b)
		.count();

	let mut parts: Vec<&str> = Vec::new();
	parts.extend(std::iter::repeat_n("..", directory.len() - common));
	parts.extend(source.components[common..].iter().map(String::as_str));
	let relative = parts.join("/");

	if relative.starts_with('.') || relative.starts_with('/') {
		relative
	} else {
		format!("./{}", relative)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn anchors_same_directory() {
		assert_eq!(relative_identifier("/assets/car/Geometry.usda", "/assets/car/Contents.usda"), "./Geometry.usda");
		assert_eq!(relative_identifier("/assets/car/Payload/Contents.usdc", "/assets/car/car.usda"), "./Payload/Contents.usdc");
	}

	#[test]
	fn climbs_to_parents() {
		assert_eq!(relative_identifier("/assets/car/car.usda", "/assets/car/Payload/Contents.usda"), "../car.usda");
		assert_eq!(relative_identifier("/lib/wheel.usda", "/assets/car/Payload/Contents.usda"), "../../../lib/wheel.usda");
	}

	#[test]
	fn normalizes_separators_and_dots() {
		assert_eq!(relative_identifier("C:\\assets\\car\\Geometry.usda", "C:/assets/car/./Contents.usda"), "./Geometry.usda");
		assert_eq!(relative_identifier("c:/assets/x/../car/A.usd", "C:/assets/car/B.usd"), "./A.usd");
	}

	#[test]
	fn different_roots_fall_back_to_absolute() {
		assert_eq!(relative_identifier("D:/assets/car.usda", "C:/work/scene.usda"), "D:/assets/car.usda");
		assert_eq!(relative_identifier("//server/share/car.usda", "/work/scene.usda"), "//server/share/car.usda");
	}
}
