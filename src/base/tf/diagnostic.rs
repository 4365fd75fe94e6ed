//! Diagnostic reporting.
//!
//! Authoring operations report problems as diagnostics in addition to their
//! return values. Diagnostics go to the innermost [`DiagnosticSink`] installed
//! on the current thread with a [`DiagnosticScope`], and to the `log` facade
//! when no sink is installed.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a posted diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
	Status,
	Warning,
	RuntimeError,
	CodingError,
}

impl std::fmt::Display for DiagnosticKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let name = match self {
			DiagnosticKind::Status => "status",
			DiagnosticKind::Warning => "warning",
			DiagnosticKind::RuntimeError => "runtime error",
			DiagnosticKind::CodingError => "coding error",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub kind: DiagnosticKind,
	pub message: String,
}

/// Receiver of posted diagnostics.
pub trait DiagnosticSink: Send + Sync {
	fn post(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
	fn post(&self, diagnostic: &Diagnostic) {
		match diagnostic.kind {
			DiagnosticKind::Status => log::info!(target: "tf", "{}", diagnostic.message),
			DiagnosticKind::Warning => log::warn!(target: "tf", "{}", diagnostic.message),
			DiagnosticKind::RuntimeError | DiagnosticKind::CodingError => {
				log::error!(target: "tf", "{}: {}", diagnostic.kind, diagnostic.message)
			}
		}
	}
}

/// Keeps every posted diagnostic in memory.
#[derive(Debug, Default)]
pub struct CapturingSink {
	diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CapturingSink {
	pub fn diagnostics(&self) -> Vec<Diagnostic> {
		self.diagnostics
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	pub fn clear(&self) {
		self.diagnostics
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}

	/// Return true if a diagnostic of `kind` containing `fragment` was posted.
	pub fn has(&self, kind: DiagnosticKind, fragment: &str) -> bool {
		self.diagnostics
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.any(|d| d.kind == kind && d.message.contains(fragment))
	}

	pub fn count(&self, kind: DiagnosticKind) -> usize {
		self.diagnostics
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.filter(|d| d.kind == kind)
			.count()
	}
}

impl DiagnosticSink for CapturingSink {
	fn post(&self, diagnostic: &Diagnostic) {
		self.diagnostics
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(diagnostic.clone());
	}
}

thread_local! {
	static SINKS: RefCell<Vec<Arc<dyn DiagnosticSink>>> = const { RefCell::new(Vec::new()) };
}

/// Installs a sink on the current thread until dropped.
///
/// Scopes nest; the innermost one receives diagnostics.
pub struct DiagnosticScope {
	// Scopes are tied to the thread-local stack they pushed onto.
	_not_send: PhantomData<*const ()>,
}

impl DiagnosticScope {
	pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
		SINKS.with(|sinks| sinks.borrow_mut().push(sink));
		DiagnosticScope {
			_not_send: PhantomData,
		}
	}
}

impl Drop for DiagnosticScope {
	fn drop(&mut self) {
		SINKS.with(|sinks| {
			sinks.borrow_mut().pop();
		});
	}
}

/// A [`CapturingSink`] installed for the lifetime of this value.
pub struct DiagnosticCapture {
	sink: Arc<CapturingSink>,
	_scope: DiagnosticScope,
}

impl DiagnosticCapture {
	pub fn begin() -> Self {
		let sink = Arc::new(CapturingSink::default());
		let scope = DiagnosticScope::new(sink.clone());
		DiagnosticCapture {
			sink,
			_scope: scope,
		}
	}

	pub fn diagnostics(&self) -> Vec<Diagnostic> {
		self.sink.diagnostics()
	}

	pub fn has(&self, kind: DiagnosticKind, fragment: &str) -> bool {
		self.sink.has(kind, fragment)
	}

	pub fn count(&self, kind: DiagnosticKind) -> usize {
		self.sink.count(kind)
	}

	pub fn is_empty(&self) -> bool {
		self.sink.diagnostics().is_empty()
	}
}

/// Post a diagnostic to the current thread's sink.
pub fn post(kind: DiagnosticKind, message: impl Into<String>) {
	let diagnostic = Diagnostic {
		kind,
		message: message.into(),
	};

	let sink = SINKS.with(|sinks| sinks.borrow().last().cloned());
	match sink {
		Some(sink) => sink.post(&diagnostic),
		None => LogSink.post(&diagnostic),
	}
}

macro_rules! tf_status {
	($($arg:tt)*) => {
		$crate::tf::post($crate::tf::DiagnosticKind::Status, format!($($arg)*))
	};
}

macro_rules! tf_warn {
	($($arg:tt)*) => {
		$crate::tf::post($crate::tf::DiagnosticKind::Warning, format!($($arg)*))
	};
}

macro_rules! tf_runtime_error {
	($($arg:tt)*) => {
		$crate::tf::post($crate::tf::DiagnosticKind::RuntimeError, format!($($arg)*))
	};
}

macro_rules! tf_coding_error {
	($($arg:tt)*) => {
		$crate::tf::post($crate::tf::DiagnosticKind::CodingError, format!($($arg)*))
	};
}

pub(crate) use {tf_coding_error, tf_runtime_error, tf_status, tf_warn};
