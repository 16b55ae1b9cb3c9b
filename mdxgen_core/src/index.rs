use std::collections::BTreeMap;
use std::path::Path;

use crate::MdxError;
use crate::MdxResult;
use crate::MetaEntry;
use crate::StepContext;
use crate::StepKind;
use crate::StepOptions;
use crate::StepReport;
use crate::StepStats;
use crate::TreeMeta;
use crate::files::write_atomic;

const STEP: StepKind = StepKind::GenerateIndex;

/// Paragraph rendered under the heading unless one is configured.
pub const DEFAULT_INTRO: &str = "Welcome to the documentation. Click on any section below to \
                                 explore its pages.";

/// Descriptions shown under well-known category titles.
pub const BUILT_IN_DESCRIPTIONS: &[(&str, &str)] = &[
	(
		"Rasi",
		"The Rasi, or zodiac signs, represent the twelve divisions of the ecliptic, each with \
		 unique characteristics.",
	),
	(
		"Houses",
		"The twelve houses of the birth chart represent different areas of life, such as self, \
		 wealth, family, and career.",
	),
	(
		"Planets",
		"The planets are the primary actors in the astrological chart, influencing various \
		 aspects of life based on their positions.",
	),
	(
		"Dasha System",
		"Dasha systems are planetary periods that indicate the timing of events in a person's \
		 life.",
	),
	(
		"Vimsottari Dasha",
		"Vimsottari Dasha is a widely used dasha system based on a 120-year cycle.",
	),
	(
		"Yogani Dasha",
		"Yogini Dasha is another type of dasha system that focuses on the effects of the eight \
		 Yoginis.",
	),
	(
		"Nakshatra",
		"Nakshatras are the lunar mansions, or constellations, that the Moon passes through, \
		 adding another layer to astrological interpretation.",
	),
	(
		"Planet in Houses",
		"The placement of each planet in a specific house further defines their influence on \
		 the individual.",
	),
	(
		"House Lord Placements",
		"Analyzing where the lord of each house is placed reveals the strengths and weaknesses \
		 of that house's domain.",
	),
	(
		"Planet in Rasi Placement",
		"The Rasi (sign) in which a planet is placed modifies its nature and expression.",
	),
	(
		"Remedies",
		"Remedies in Vedic astrology provide ways to mitigate negative planetary influences and \
		 enhance positive ones.",
	),
	(
		"Lord in Houses",
		"This section explores the effects when the lord of one house is placed in another \
		 house.",
	),
	(
		"Planets Conjunctions",
		"Planetary conjunctions, where two or more planets are close together, create unique \
		 and significant effects.",
	),
	(
		"Chart Analysis",
		"This section covers the holistic process of interpreting a birth chart, integrating \
		 the knowledge of all the above elements.",
	),
	(
		"Planet in Nakshatra",
		"Understanding the placement of planets within specific nakshatras provides deeper \
		 insights.",
	),
	(
		"Ashtakavarga",
		"Ashtakavarga is a system for evaluating the strength and beneficence of each planet.",
	),
	(
		"Vastu",
		"Vastu Shastra is the ancient Indian science of architecture and environment, aiming to \
		 harmonize spaces with natural forces.",
	),
	(
		"Numerology",
		"Numerology explores the hidden meanings of numbers and their influence on human lives.",
	),
	(
		"Upagrahas",
		"Upagrahas are shadow planets or sub-planets that add further nuance to a chart \
		 analysis.",
	),
];

/// Everything the index page needs besides the tree itself.
#[derive(Debug, Clone)]
pub struct IndexLayout {
	pub heading: String,
	pub intro: String,
	descriptions: BTreeMap<String, String>,
}

impl IndexLayout {
	/// A layout with the built-in description table.
	pub fn new(heading: impl Into<String>, intro: impl Into<String>) -> Self {
		let descriptions = BUILT_IN_DESCRIPTIONS
			.iter()
			.map(|(title, description)| ((*title).to_string(), (*description).to_string()))
			.collect();

		Self {
			heading: heading.into(),
			intro: intro.into(),
			descriptions,
		}
	}

	/// Add or replace descriptions. Later values win.
	#[must_use]
	pub fn with_descriptions(mut self, extra: &BTreeMap<String, String>) -> Self {
		self.descriptions
			.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
		self
	}

	pub fn description(&self, title: &str) -> Option<&str> {
		self.descriptions
			.get(title)
			.map(String::as_str)
			.filter(|description| !description.is_empty())
	}
}

/// Render the index page for a hierarchical meta document.
///
/// Lines are joined with `\n`. Every top-level entry is followed by an empty
/// line.
pub fn render_index(meta: &TreeMeta, layout: &IndexLayout) -> String {
	let mut lines = vec![
		format!("# {}", layout.heading),
		String::new(),
		layout.intro.clone(),
		String::new(),
		"## Sections".to_string(),
		String::new(),
	];

	for entry in &meta.entries {
		lines.push(format!("### [{}]({})", entry.title(), entry.target()));

		if let MetaEntry::Category(category) = entry {
			if let Some(description) = layout.description(&category.title) {
				lines.push(format!("_{description}_"));
			}
			render_children(&category.children, layout, 0, &mut lines);
		}

		lines.push(String::new());
	}

	lines.join("\n")
}

fn render_children(
	children: &[MetaEntry],
	layout: &IndexLayout,
	depth: usize,
	lines: &mut Vec<String>,
) {
	let indent = "  ".repeat(depth);
	for child in children {
		lines.push(format!("{indent}- [{}]({})", child.title(), child.target()));

		if let MetaEntry::Category(category) = child {
			if let Some(description) = layout.description(&category.title) {
				lines.push(format!("{indent}  _{description}_"));
			}
			render_children(&category.children, layout, depth + 1, lines);
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
	pub sections: usize,
	pub written: bool,
	pub unchanged: bool,
}

/// Render the index page from the root meta file and write it next to it.
pub fn generate_index(
	root: &Path,
	options: &StepOptions,
	ctx: &StepContext,
) -> MdxResult<StepReport> {
	let meta_path = options.index_meta_path(root);
	let meta = TreeMeta::load(&meta_path)?;
	let output = options.index_output_path(&meta_path);

	let layout = IndexLayout::new(
		options
			.config
			.index
			.heading
			.clone()
			.unwrap_or_else(|| meta.label.clone()),
		options
			.config
			.index
			.intro
			.clone()
			.unwrap_or_else(|| DEFAULT_INTRO.to_string()),
	)
	.with_descriptions(&options.config.index.descriptions);

	let rendered = render_index(&meta, &layout);
	let unchanged = std::fs::read_to_string(&output).is_ok_and(|existing| existing == rendered);
	let mut report = StepReport::new(STEP, options.dry_run);

	if unchanged {
		ctx.info(STEP, format!("{} is already up to date", output.display()));
	} else {
		report.record_change(&output);
		if !options.dry_run {
			write_index(&output, &rendered)?;
			ctx.info(
				STEP,
				format!(
					"generated {} with {} sections",
					output.display(),
					meta.entries.len()
				),
			);
		}
	}

	report.stats = StepStats::Index(IndexStats {
		sections: meta.entries.len(),
		written: !unchanged && !options.dry_run,
		unchanged,
	});

	Ok(report)
}

fn write_index(output: &Path, rendered: &str) -> MdxResult<()> {
	if let Some(parent) = output.parent() {
		std::fs::create_dir_all(parent).map_err(|e| MdxError::write(parent, e))?;
	}
	write_atomic(output, rendered)
}
