/// Token for efficient comparison, assignment, and hashing of known strings.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
	data: String,
}

impl Token {
	pub fn new(name: impl ToString) -> Self {
		Token {
			data: name.to_string(),
		}
	}

	pub fn empty() -> Self {
		Token {
			data: String::new(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn as_str(&self) -> &str {
		&self.data
	}
}

impl std::fmt::Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.data)
	}
}

impl From<&str> for Token {
	fn from(value: &str) -> Self {
		Token::new(value)
	}
}

impl From<String> for Token {
	fn from(data: String) -> Self {
		Token { data }
	}
}

impl From<&Token> for Token {
	fn from(value: &Token) -> Self {
		value.clone()
	}
}

impl AsRef<str> for Token {
	fn as_ref(&self) -> &str {
		&self.data
	}
}

impl PartialEq<str> for Token {
	fn eq(&self, other: &str) -> bool {
		self.data == other
	}
}

impl PartialEq<&str> for Token {
	fn eq(&self, other: &&str) -> bool {
		self.data == *other
	}
}

macro_rules! declare_public_tokens {
	($struct:ident, $static:ident, [$($name:ident: $value:expr),* $(,)?]) => {
		pub struct $struct {
			$(pub $name: tf::Token,)*
		}

		pub static $static: std::sync::LazyLock<$struct> = std::sync::LazyLock::new(|| {
			$struct {
				$($name: tf::Token::new($value),)*
			}
		});
	};
}

pub(crate) use declare_public_tokens;
