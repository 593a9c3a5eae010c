//! Form definition handling: sections, fields and repeatable entry groups.
//!
//! A form is described by a JSON document (or the built-in application form)
//! and its values are an opaque name → string map. Repeatable entry fields
//! are addressed as `"{group}.{position}.{field}"`, e.g. `education.2.institution`.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::repeater::Repeaters;
use crate::types::{FieldKind, RepeatGroup};

/// Field id assigned to the phone input by the form backend
pub const DEFAULT_PHONE_FIELD: &str = "entry.297979220";

/// Max length used when a multiline field declares `max_length: 0`
pub const DEFAULT_MAX_LENGTH: usize = 500;

fn default_phone_field() -> String {
    DEFAULT_PHONE_FIELD.to_string()
}

/// A single named input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldSpec {
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Text,
            required: false,
            max_length: None,
            options: Vec::new(),
        }
    }

    pub fn multiline(name: &str, label: &str, max_length: usize) -> Self {
        Self {
            kind: FieldKind::Multiline,
            max_length: Some(max_length),
            ..Self::text(name, label)
        }
    }

    pub fn phone(name: &str, label: &str) -> Self {
        Self {
            kind: FieldKind::Phone,
            ..Self::text(name, label)
        }
    }

    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        Self {
            kind: FieldKind::Select,
            options: options.iter().map(|o| o.to_string()).collect(),
            ..Self::text(name, label)
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Counter limit for this field, if it carries a character counter.
    ///
    /// Only multiline fields with a declared max length get one; a declared
    /// length of zero falls back to `default_max`.
    pub fn counter_limit(&self, default_max: usize) -> Option<usize> {
        match (self.kind, self.max_length) {
            (FieldKind::Multiline, Some(0)) => Some(default_max),
            (FieldKind::Multiline, Some(max)) => Some(max),
            _ => None,
        }
    }
}

/// One page of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Repeatable group rendered below this section's own fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeater: Option<RepeatGroup>,
}

/// Pre-allocated entry templates of one repeatable group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeaterSpec {
    pub group: RepeatGroup,
    /// Number of entry templates present, positions `1..=slots`
    pub slots: u8,
    /// Fields of a single entry
    pub fields: Vec<FieldSpec>,
}

/// Full form description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub title: String,
    #[serde(default = "default_phone_field")]
    pub phone_field: String,
    pub sections: Vec<SectionSpec>,
    #[serde(default)]
    pub repeaters: Vec<RepeaterSpec>,
}

/// Name of a field inside a repeatable entry
pub fn entry_field_name(group: RepeatGroup, position: u8, field: &str) -> String {
    format!("{}.{}.{}", group, position, field)
}

/// Split an entry field name into group, position and field.
/// Returns `None` for names that are not entry fields.
pub fn parse_entry_field_name(name: &str) -> Option<(RepeatGroup, u8, &str)> {
    let mut parts = name.splitn(3, '.');
    let group = RepeatGroup::from_str(parts.next()?).ok()?;
    let position = parts.next()?.parse().ok()?;
    let field = parts.next()?;
    Some((group, position, field))
}

impl FormDefinition {
    /// Save the definition to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize form definition to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write form definition to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load a definition from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read form definition from {:?}", path.as_ref()))?;

        let definition: Self =
            serde_json::from_str(&content).context("Failed to parse form definition JSON")?;

        debug!(
            "Loaded form definition '{}' with {} sections",
            definition.title,
            definition.sections.len()
        );
        Ok(definition)
    }

    /// Validate the definition's internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            anyhow::bail!("Form must have at least one section");
        }

        let mut names = BTreeSet::new();
        for (index, section) in self.sections.iter().enumerate() {
            if section.title.trim().is_empty() {
                anyhow::bail!("Section {} has an empty title", index);
            }
            for field in &section.fields {
                check_field(field)?;
                if !names.insert(field.name.as_str()) {
                    anyhow::bail!("Duplicate field name '{}'", field.name);
                }
            }
        }

        let mut declared = BTreeSet::new();
        for repeater in &self.repeaters {
            if !declared.insert(repeater.group) {
                anyhow::bail!("Repeater '{}' is declared more than once", repeater.group);
            }
            let max = repeater.group.max_entries();
            if repeater.slots == 0 || repeater.slots > max {
                anyhow::bail!(
                    "Repeater '{}' must have between 1 and {} slots",
                    repeater.group,
                    max
                );
            }
            if repeater.fields.is_empty() {
                anyhow::bail!("Repeater '{}' has no fields", repeater.group);
            }
            let mut entry_names = BTreeSet::new();
            for field in &repeater.fields {
                check_field(field)?;
                if field.name.contains('.') {
                    anyhow::bail!(
                        "Entry field '{}' of repeater '{}' cannot contain '.'",
                        field.name,
                        repeater.group
                    );
                }
                if !entry_names.insert(field.name.as_str()) {
                    anyhow::bail!(
                        "Duplicate field name '{}' in repeater '{}'",
                        field.name,
                        repeater.group
                    );
                }
            }
            let hosts = self
                .sections
                .iter()
                .filter(|s| s.repeater == Some(repeater.group))
                .count();
            if hosts != 1 {
                anyhow::bail!(
                    "Repeater '{}' must be hosted by exactly one section (found {})",
                    repeater.group,
                    hosts
                );
            }
        }

        for section in &self.sections {
            if let Some(group) = section.repeater {
                if !declared.contains(&group) {
                    anyhow::bail!(
                        "Section '{}' hosts undeclared repeater '{}'",
                        section.title,
                        group
                    );
                }
            }
        }

        match self.resolve_field(&self.phone_field) {
            Some(field) if field.kind != FieldKind::Phone => {
                anyhow::bail!("Phone field '{}' must have kind 'phone'", self.phone_field);
            }
            Some(_) => {}
            None => warn!(
                "Phone field '{}' is not part of the form; phone checks are skipped",
                self.phone_field
            ),
        }

        Ok(())
    }

    /// Number of sections (steps)
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Section at a step index; `None` when the index is out of range
    pub fn section(&self, step: i32) -> Option<&SectionSpec> {
        usize::try_from(step).ok().and_then(|i| self.sections.get(i))
    }

    /// Entry templates of a group
    pub fn repeater(&self, group: RepeatGroup) -> Option<&RepeaterSpec> {
        self.repeaters.iter().find(|r| r.group == group)
    }

    /// Field names of one entry of a group, in declaration order
    pub fn entry_field_names(&self, group: RepeatGroup, position: u8) -> Vec<String> {
        self.repeater(group)
            .map(|r| {
                r.fields
                    .iter()
                    .map(|f| entry_field_name(group, position, &f.name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a field spec by full name (including entry field names)
    pub fn resolve_field(&self, name: &str) -> Option<&FieldSpec> {
        if let Some(field) = self
            .sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .find(|f| f.name == name)
        {
            return Some(field);
        }

        let (group, position, field) = parse_entry_field_name(name)?;
        let repeater = self.repeater(group)?;
        if position == 0 || position > repeater.slots {
            return None;
        }
        repeater.fields.iter().find(|f| f.name == field)
    }

    /// Names of the fields shown on a step: the section's own fields followed
    /// by the fields of every visible entry of its repeater
    pub fn step_fields(&self, step: i32, repeaters: &Repeaters) -> Vec<String> {
        let Some(section) = self.section(step) else {
            return Vec::new();
        };

        let mut names: Vec<String> = section.fields.iter().map(|f| f.name.clone()).collect();
        if let Some(group) = section.repeater {
            if let Some(state) = repeaters.get(group) {
                for position in state.visible_positions() {
                    names.extend(self.entry_field_names(group, position));
                }
            }
        }
        names
    }

    /// Every field the form can hold, including entries that are hidden
    pub fn all_field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sections
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.name.clone()))
            .collect();
        for repeater in &self.repeaters {
            for position in 1..=repeater.slots {
                names.extend(self.entry_field_names(repeater.group, position));
            }
        }
        names
    }

    /// Whether the phone field exists in this form
    pub fn has_phone_field(&self) -> bool {
        self.resolve_field(&self.phone_field).is_some()
    }

    /// The built-in job application form
    pub fn builtin() -> Self {
        Self {
            title: "Job Application Form".to_string(),
            phone_field: default_phone_field(),
            sections: vec![
                SectionSpec {
                    title: "Personal Information".to_string(),
                    description: "Tell us who you are and how to reach you.".to_string(),
                    fields: vec![
                        FieldSpec::text("entry.1843290461", "Full name").required(),
                        FieldSpec::phone(DEFAULT_PHONE_FIELD, "Phone number").required(),
                        FieldSpec::text("entry.1204572839", "Email address").required(),
                        FieldSpec::text("entry.730158923", "City"),
                        FieldSpec::select(
                            "entry.1578220041",
                            "Gender",
                            &["Female", "Male", "Prefer not to say"],
                        ),
                    ],
                    repeater: None,
                },
                SectionSpec {
                    title: "Education".to_string(),
                    description: "List your education, most recent first.".to_string(),
                    fields: Vec::new(),
                    repeater: Some(RepeatGroup::Education),
                },
                SectionSpec {
                    title: "Work Experience".to_string(),
                    description: "List the positions you have held.".to_string(),
                    fields: Vec::new(),
                    repeater: Some(RepeatGroup::Experience),
                },
                SectionSpec {
                    title: "Training".to_string(),
                    description: "Courses and certifications (optional).".to_string(),
                    fields: Vec::new(),
                    repeater: Some(RepeatGroup::Training),
                },
                SectionSpec {
                    title: "Motivation".to_string(),
                    description: "A few words about why you are applying.".to_string(),
                    fields: vec![
                        FieldSpec::multiline("entry.917338560", "Why do you want this position?", 500)
                            .required(),
                        FieldSpec::multiline("entry.61502734", "Anything else we should know?", 1000),
                    ],
                    repeater: None,
                },
            ],
            repeaters: vec![
                RepeaterSpec {
                    group: RepeatGroup::Education,
                    slots: RepeatGroup::Education.max_entries(),
                    fields: vec![
                        FieldSpec::select(
                            "level",
                            "Level",
                            &["Certificate", "Diploma", "Bachelor", "Master", "PhD"],
                        )
                        .required(),
                        FieldSpec::text("institution", "Institution").required(),
                        FieldSpec::text("field", "Field of study"),
                        FieldSpec::text("year", "Graduation year"),
                    ],
                },
                RepeaterSpec {
                    group: RepeatGroup::Experience,
                    slots: RepeatGroup::Experience.max_entries(),
                    fields: vec![
                        FieldSpec::text("employer", "Employer").required(),
                        FieldSpec::text("position", "Position").required(),
                        FieldSpec::text("years", "Years"),
                    ],
                },
                RepeaterSpec {
                    group: RepeatGroup::Training,
                    slots: RepeatGroup::Training.max_entries(),
                    fields: vec![
                        FieldSpec::text("course", "Course"),
                        FieldSpec::text("provider", "Provider"),
                        FieldSpec::text("year", "Year"),
                    ],
                },
            ],
        }
    }
}

impl Default for FormDefinition {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_field(field: &FieldSpec) -> Result<()> {
    if field.name.trim().is_empty() {
        anyhow::bail!("Field '{}' has an empty name", field.label);
    }
    if field.kind == FieldKind::Select && field.options.is_empty() {
        anyhow::bail!("Select field '{}' has no options", field.name);
    }
    Ok(())
}

/// Current values of every field, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field; empty when never set
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn clear(&mut self, name: &str) {
        if let Some(value) = self.0.get_mut(name) {
            value.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Load a name → value JSON object (e.g. saved responses)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read responses from {:?}", path.as_ref()))?;
        serde_json::from_str(&content).context("Failed to parse responses JSON")
    }
}

impl From<BTreeMap<String, String>> for FormValues {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
