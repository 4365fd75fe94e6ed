use std::path::PathBuf;

/// Errors reported by authoring operations.
///
/// The `Display` text of every variant is the message posted to the
/// diagnostic sink when the operation fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// An invalid or anonymous stage, an invalid prim, an invalid name, or an
	/// out-of-range value.
	#[error("{0}")]
	InvalidArgument(String),

	/// The scene is not shaped the way the operation requires.
	#[error("{0}")]
	Structure(String),

	/// The current edit target cannot author or remove the opinion.
	#[error("{0}")]
	Authority(String),

	#[error("failed to write layer \"{path}\": {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("no layer found for \"{0}\"")]
	LayerNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
