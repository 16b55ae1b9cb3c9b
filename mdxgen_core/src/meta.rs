use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::MdxError;
use crate::MdxResult;

/// Default file name of the per-directory flat meta documents.
pub const META_FILE_NAME: &str = "_meta.json";

/// Default file name of the hierarchical meta document at the root. It must
/// differ from [`META_FILE_NAME`] because the root directory has a flat meta
/// document of its own.
pub const ROOT_META_FILE_NAME: &str = "_meta.tree.json";

/// A document leaf in the hierarchical meta tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
	/// File name including its extension.
	pub name: String,
	pub title: String,
	/// Path relative to the tree root, always with forward slashes.
	pub path: String,
}

/// A directory in the hierarchical meta tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
	pub title: String,
	/// Directory relative to the tree root, always with forward slashes.
	pub folder: String,
	pub children: Vec<MetaEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaEntry {
	Category(CategoryEntry),
	Document(DocumentEntry),
}

impl MetaEntry {
	pub fn title(&self) -> &str {
		match self {
			Self::Category(category) => &category.title,
			Self::Document(document) => &document.title,
		}
	}

	/// The link target of this entry: the folder of a category or the path of
	/// a document.
	pub fn target(&self) -> &str {
		match self {
			Self::Category(category) => &category.folder,
			Self::Document(document) => &document.path,
		}
	}
}

/// Totals of a hierarchical tree, used for step summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeTotals {
	pub files: usize,
	pub folders: usize,
}

impl TreeTotals {
	pub fn of(entries: &[MetaEntry]) -> Self {
		let mut totals = Self::default();
		for entry in entries {
			match entry {
				MetaEntry::Document(_) => totals.files += 1,
				MetaEntry::Category(category) => {
					let inner = Self::of(&category.children);
					totals.folders += 1 + inner.folders;
					totals.files += inner.files;
				}
			}
		}
		totals
	}
}

/// One row of a per-directory flat `_meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
	pub file: String,
	pub title: String,
	/// Parsed from a leading numeric prefix. Serialized as `null` when absent.
	pub order: Option<u64>,
}

/// A meta document: a single label mapped to an ordered list of entries.
///
/// On disk this is an object with exactly one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDocument<T> {
	pub label: String,
	pub entries: Vec<T>,
}

pub type TreeMeta = MetaDocument<MetaEntry>;
pub type FlatMeta = MetaDocument<FlatEntry>;

impl<T> MetaDocument<T> {
	pub fn new(label: impl Into<String>, entries: Vec<T>) -> Self {
		Self {
			label: label.into(),
			entries,
		}
	}
}

impl<T: Serialize> Serialize for MetaDocument<T> {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(1))?;
		map.serialize_entry(&self.label, &self.entries)?;
		map.end()
	}
}

impl<T: Serialize> MetaDocument<T> {
	/// Pretty JSON with two-space indentation, raw UTF-8 and a trailing newline.
	pub fn to_pretty_json(&self) -> MdxResult<String> {
		let mut json =
			serde_json::to_string_pretty(self).map_err(|e| MdxError::Serialize(e.to_string()))?;
		json.push('\n');
		Ok(json)
	}

	pub fn to_value(&self) -> MdxResult<Value> {
		serde_json::to_value(self).map_err(|e| MdxError::Serialize(e.to_string()))
	}
}

impl<T: DeserializeOwned> MetaDocument<T> {
	/// Read and parse a meta document from disk.
	pub fn load(path: &Path) -> MdxResult<Self> {
		if !path.is_file() {
			return Err(MdxError::MetaNotFound(path.display().to_string()));
		}

		let raw = std::fs::read_to_string(path).map_err(|e| MdxError::read(path, e))?;
		let value: Value = serde_json::from_str(&raw).map_err(|e| {
			MdxError::MetaJson {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		})?;

		Self::from_value(value, path)
	}

	/// Interpret a parsed JSON value. `path` is only used in error messages.
	pub fn from_value(value: Value, path: &Path) -> MdxResult<Self> {
		let shape_error = |reason: String| {
			MdxError::MetaShape {
				path: path.display().to_string(),
				reason,
			}
		};

		let Value::Object(object) = value else {
			return Err(shape_error("top level is not an object".to_string()));
		};

		if object.len() != 1 {
			return Err(shape_error(format!(
				"expected exactly one top-level key, found {}",
				object.len()
			)));
		}

		let Some((label, entries)) = object.into_iter().next() else {
			return Err(shape_error("no top-level key".to_string()));
		};

		let Value::Array(items) = entries else {
			return Err(shape_error(format!("value of `{label}` is not an array")));
		};

		let entries = items
			.into_iter()
			.enumerate()
			.map(|(index, item)| {
				serde_json::from_value(item)
					.map_err(|e| shape_error(format!("entry {index} of `{label}`: {e}")))
			})
			.collect::<MdxResult<Vec<T>>>()?;

		Ok(Self { label, entries })
	}
}
