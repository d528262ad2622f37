//! Rule table for medication label fields.
//!
//! Every heuristic is one [`FieldRule`]. Rules for the same field are tried
//! in ascending priority and the first candidate wins, so labelled matches
//! are listed ahead of their fallbacks.

pub mod dates;
pub mod patterns;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::LabelText;
use patterns::{
    ASCII_LETTER, COMPANY_FORM, DATE_TOKEN, DOSAGE, EXPIRY_LABEL, INGREDIENT_LABEL,
    NAME_EXCLUSION,
};

pub use dates::{
    format_canonical, format_display, last_day_of_month, normalize_date, normalize_date_str,
    resolve_year, DateNormalizer,
};

/// A field on the medication form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Manufacturer,
    ActiveIngredient,
    ExpiryDate,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::Manufacturer,
        Field::ActiveIngredient,
        Field::ExpiryDate,
    ];

    /// Key used on the wire and in the form.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Manufacturer => "manufacturer",
            Field::ActiveIngredient => "activeIngredient",
            Field::ExpiryDate => "expiryDate",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// How a rule finds its candidate.
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// The `value` group of the first match in the full text.
    Capture(&'static Regex),
    /// The `value` group of the first match in the lowercased text.
    CaptureLowercase(&'static Regex),
    /// The first line the pattern matches.
    Line(&'static Regex),
    /// The first line with a letter, no excluded keyword, and short enough
    /// to be a product name.
    NameLine { exclude: &'static Regex },
}

/// One ordered extraction heuristic.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Rule identifier, reported as provenance.
    pub name: &'static str,
    /// Field this rule fills.
    pub field: Field,
    /// Lower runs first.
    pub priority: u8,
    pub strategy: Strategy,
}

impl FieldRule {
    /// Raw candidate this rule finds in the text, before compaction or
    /// date normalization.
    pub fn candidate(&self, label: &LabelText) -> Option<String> {
        match self.strategy {
            Strategy::Capture(pattern) => capture(pattern, label.text()),
            Strategy::CaptureLowercase(pattern) => capture(pattern, label.lower()),
            Strategy::Line(pattern) => label
                .lines()
                .iter()
                .find(|line| pattern.is_match(line))
                .cloned(),
            Strategy::NameLine { exclude } => label
                .lines()
                .iter()
                .find(|line| {
                    ASCII_LETTER.is_match(line)
                        && !exclude.is_match(line)
                        && line.chars().count() <= label.max_name_length()
                })
                .cloned(),
        }
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().to_string())
}

lazy_static! {
    /// All rules, grouped by field and sorted by priority.
    pub static ref RULES: Vec<FieldRule> = vec![
        FieldRule {
            name: "ingredient-label",
            field: Field::ActiveIngredient,
            priority: 0,
            strategy: Strategy::Capture(&INGREDIENT_LABEL),
        },
        FieldRule {
            name: "ingredient-dosage-line",
            field: Field::ActiveIngredient,
            priority: 1,
            strategy: Strategy::Line(&DOSAGE),
        },
        FieldRule {
            name: "manufacturer-company-form",
            field: Field::Manufacturer,
            priority: 0,
            strategy: Strategy::Line(&COMPANY_FORM),
        },
        FieldRule {
            name: "name-first-plain-line",
            field: Field::Name,
            priority: 0,
            strategy: Strategy::NameLine { exclude: &NAME_EXCLUSION },
        },
        FieldRule {
            name: "expiry-label",
            field: Field::ExpiryDate,
            priority: 0,
            strategy: Strategy::CaptureLowercase(&EXPIRY_LABEL),
        },
        FieldRule {
            name: "expiry-bare-token",
            field: Field::ExpiryDate,
            priority: 1,
            strategy: Strategy::Capture(&DATE_TOKEN),
        },
    ];
}

/// Rules for one field, in the order they are tried.
pub fn rules_for(field: Field) -> impl Iterator<Item = &'static FieldRule> {
    RULES.iter().filter(move |rule| rule.field == field)
}

/// Look up a rule by name.
pub fn rule(name: &str) -> Option<&'static FieldRule> {
    RULES.iter().find(|rule| rule.name == name)
}
