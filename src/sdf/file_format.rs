use std::collections::BTreeMap;

/// Arguments that select how a layer is encoded, e.g. `format = usda`.
pub type FileFormatArguments = BTreeMap<String, String>;

/// Argument key that overrides the encoding implied by the extension.
pub const FORMAT_ARG: &str = "format";

/// The on-disk encoding of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
	/// Text encoding.
	Usda,
	/// Binary encoding.
	Usdc,
}

impl FileFormat {
	/// Return the encoding for a format name or file extension.
	///
	/// The generic `usd` extension selects the binary encoding.
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_ascii_lowercase().as_str() {
			"usda" => Some(FileFormat::Usda),
			"usdc" | "usd" => Some(FileFormat::Usdc),
			_ => None,
		}
	}

	/// Return the encoding for a layer at `identifier`, honoring a `format`
	/// argument in `args`.
	pub fn for_identifier(identifier: &str, args: &FileFormatArguments) -> Option<Self> {
		if let Some(format) = args.get(FORMAT_ARG) {
			return Self::from_extension(format);
		}
		let extension = std::path::Path::new(identifier).extension()?.to_str()?;
		Self::from_extension(extension)
	}

	pub fn extension(&self) -> &'static str {
		match self {
			FileFormat::Usda => "usda",
			FileFormat::Usdc => "usdc",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn format_from_identifier() {
		let none = FileFormatArguments::new();
		assert_eq!(FileFormat::for_identifier("/a/b.usda", &none), Some(FileFormat::Usda));
		assert_eq!(FileFormat::for_identifier("/a/b.usd", &none), Some(FileFormat::Usdc));
		assert_eq!(FileFormat::for_identifier("/a/b.abc", &none), None);

		let text = FileFormatArguments::from([(FORMAT_ARG.to_string(), "usda".to_string())]);
		assert_eq!(FileFormat::for_identifier("/a/b.usd", &text), Some(FileFormat::Usda));
	}
}
