use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;
use serde_yaml_ng::Mapping;
use serde_yaml_ng::Value;

use crate::naming::built_in_regex;

/// Title substituted for documents whose frontmatter could not be parsed.
pub const INVALID_FRONTMATTER_TITLE: &str = "INVALID FRONTMATTER";

static QUOTED_FIELD: LazyLock<Regex> = LazyLock::new(|| {
	built_in_regex(r"^(\s*(?:title|description)\s*:\s*)'(.*)'(\s*(?:#.*)?)$")
});

/// Byte offsets of a `---` delimited block at the very top of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterBlock {
	/// Start of the first line after the opening delimiter.
	pub body_start: usize,
	/// Start of the closing delimiter line.
	pub body_end: usize,
	/// First byte after the closing delimiter line (including its newline).
	pub end: usize,
}

impl FrontmatterBlock {
	/// The raw YAML text between the two delimiters.
	pub fn body<'a>(&self, content: &'a str) -> &'a str {
		&content[self.body_start..self.body_end]
	}
}

/// The outcome of reading a document's frontmatter.
#[derive(Debug, Clone, PartialEq)]
pub enum Frontmatter {
	/// The document does not start with a delimited block.
	Absent,
	/// The block parsed. Non-mapping YAML is treated as an empty mapping.
	Parsed(Mapping),
	/// The block exists but is not valid YAML.
	Invalid(String),
}

impl Frontmatter {
	/// The non-empty `title` field, when the block parsed and has one.
	pub fn title(&self) -> Option<String> {
		let Self::Parsed(mapping) = self else {
			return None;
		};

		let title = match mapping.get("title")? {
			Value::String(value) => value.trim().to_string(),
			Value::Number(value) => value.to_string(),
			Value::Bool(value) => value.to_string(),
			_ => return None,
		};

		(!title.is_empty()).then_some(title)
	}

	/// The mapping callers see when they do not distinguish failure states.
	///
	/// Absent frontmatter is empty and invalid frontmatter becomes
	/// `{"title": "INVALID FRONTMATTER"}`.
	pub fn into_mapping(self) -> Mapping {
		match self {
			Self::Absent => Mapping::new(),
			Self::Parsed(mapping) => mapping,
			Self::Invalid(_) => {
				let mut mapping = Mapping::new();
				mapping.insert(
					Value::String("title".to_string()),
					Value::String(INVALID_FRONTMATTER_TITLE.to_string()),
				);
				mapping
			}
		}
	}

	pub fn is_invalid(&self) -> bool {
		matches!(self, Self::Invalid(_))
	}
}

fn is_delimiter(line: &str) -> bool {
	line.strip_prefix("---")
		.is_some_and(|rest| rest.trim_end().is_empty())
}

/// Locate the frontmatter block, if the first line is a `---` delimiter and a
/// later line closes it.
pub fn locate_frontmatter(content: &str) -> Option<FrontmatterBlock> {
	let mut lines = content.split_inclusive('\n');
	let first = lines.next()?;
	if !is_delimiter(first) {
		return None;
	}

	let body_start = first.len();
	let mut offset = body_start;
	for line in lines {
		if is_delimiter(line) {
			return Some(FrontmatterBlock {
				body_start,
				body_end: offset,
				end: offset + line.len(),
			});
		}
		offset += line.len();
	}

	None
}

/// Parse a YAML frontmatter body. Tabs are expanded to two spaces first.
pub fn parse_frontmatter_body(body: &str) -> Result<Mapping, String> {
	let value: Value =
		serde_yaml_ng::from_str(&body.replace('\t', "  ")).map_err(|e| e.to_string())?;

	Ok(match value {
		Value::Mapping(mapping) => mapping,
		_ => Mapping::new(),
	})
}

/// Extract the frontmatter of a document without ever failing.
pub fn extract_frontmatter(content: &str) -> Frontmatter {
	let Some(block) = locate_frontmatter(content) else {
		return Frontmatter::Absent;
	};

	match parse_frontmatter_body(block.body(content)) {
		Ok(mapping) => Frontmatter::Parsed(mapping),
		Err(reason) => Frontmatter::Invalid(reason),
	}
}

/// Double the inner single quotes of single-quoted `title:` and
/// `description:` values.
///
/// Returns `None` when no line needed a change.
pub fn repair_quoted_fields(body: &str) -> Option<String> {
	let mut changed = false;
	let lines = body
		.split_inclusive('\n')
		.map(|line| {
			let (text, newline) = split_line_ending(line);
			match QUOTED_FIELD.captures(text) {
				Some(captures) if captures[2].contains('\'') => {
					changed = true;
					format!("{}{newline}", double_inner_quotes(&captures))
				}
				_ => line.to_string(),
			}
		})
		.collect::<String>();

	changed.then_some(lines)
}

fn double_inner_quotes(captures: &Captures<'_>) -> String {
	format!(
		"{}'{}'{}",
		&captures[1],
		captures[2].replace('\'', "''"),
		captures.get(3).map_or("", |m| m.as_str())
	)
}

fn split_line_ending(line: &str) -> (&str, &str) {
	if let Some(text) = line.strip_suffix("\r\n") {
		(text, "\r\n")
	} else if let Some(text) = line.strip_suffix('\n') {
		(text, "\n")
	} else {
		(line, "")
	}
}
