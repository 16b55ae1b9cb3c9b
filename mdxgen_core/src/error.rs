use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MdxError {
	#[error(transparent)]
	#[diagnostic(code(mdxgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{path}`: {source}")]
	#[diagnostic(code(mdxgen::read_file))]
	ReadFile {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{path}`: {source}")]
	#[diagnostic(
		code(mdxgen::write_file),
		help("check that the file and its parent directory are writable")
	)]
	WriteFile {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("not a directory: `{0}`")]
	#[diagnostic(
		code(mdxgen::not_a_directory),
		help("pass the root of the documentation tree with `--path`")
	)]
	NotADirectory(String),

	#[error("meta file not found: `{0}`")]
	#[diagnostic(
		code(mdxgen::meta_not_found),
		help("run `mdxgen root-meta` first to generate the hierarchical meta file")
	)]
	MetaNotFound(String),

	#[error("invalid JSON in `{path}`: {reason}")]
	#[diagnostic(code(mdxgen::meta_json))]
	MetaJson { path: String, reason: String },

	#[error("unexpected structure in `{path}`: {reason}")]
	#[diagnostic(
		code(mdxgen::meta_shape),
		help("a meta file must be an object with exactly one key whose value is an array")
	)]
	MetaShape { path: String, reason: String },

	#[error("failed to serialize meta document: {0}")]
	#[diagnostic(code(mdxgen::serialize))]
	Serialize(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdxgen::config_parse),
		help("check that mdxgen.toml is valid TOML with optional [index] and [exclude] sections")
	)]
	ConfigParse(String),

	#[error("step `{0}` was cancelled")]
	#[diagnostic(code(mdxgen::cancelled))]
	Cancelled(&'static str),
}

impl MdxError {
	pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
		Self::ReadFile {
			path: path.display().to_string(),
			source,
		}
	}

	pub(crate) fn write(path: &std::path::Path, source: std::io::Error) -> Self {
		Self::WriteFile {
			path: path.display().to_string(),
			source,
		}
	}
}

pub type MdxResult<T> = Result<T, MdxError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
