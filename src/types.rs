//! Type-safe enums shared across the form engine
//!
//! Stringly-typed values from the form definition and settings files are
//! parsed into these enums so matching is exhaustive.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Repeatable entry group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RepeatGroup {
    Education,
    Experience,
    Training,
}

impl RepeatGroup {
    /// Maximum number of visible entries for this group
    pub const fn max_entries(self) -> u8 {
        match self {
            Self::Education => 8,
            Self::Experience => 9,
            Self::Training => 6,
        }
    }

    /// What a full group holds, as worded in the limit message
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Education => "education entries",
            Self::Experience => "experiences",
            Self::Training => "training entries",
        }
    }

    /// Heading shown above the group's entries
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Experience => "Work Experience",
            Self::Training => "Training & Certifications",
        }
    }
}

/// Input kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input
    #[default]
    Text,
    /// Multi-line text area; eligible for a character counter
    Multiline,
    /// Phone number input
    Phone,
    /// Choice from a fixed option list
    Select,
}

/// Visual state of a character counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CounterLevel {
    #[default]
    Normal,
    Warning,
    LimitReached,
}

/// How step navigation treats the ends of the section list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NavigationBounds {
    /// Previous/next move the index freely, even outside the section list
    #[default]
    Unbounded,
    /// The index stays within `0..total`
    Clamped,
}

/// When the phone format rule applies to an empty value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PhoneRequirement {
    /// Empty values pass; only a present value is format-checked
    WhenPresent,
    /// Empty values fail like malformed ones
    Always,
}

/// Named phone policy: navigation and final submission differ on empty values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonePolicy {
    pub navigation: PhoneRequirement,
    pub submission: PhoneRequirement,
}

impl Default for PhonePolicy {
    fn default() -> Self {
        Self {
            navigation: PhoneRequirement::WhenPresent,
            submission: PhoneRequirement::Always,
        }
    }
}
