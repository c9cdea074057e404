//! Field type classification
//!
//! Field types travel as free-form strings (`"text"`, `"number_integer"`,
//! `"codelist"` ...). The codec only needs to know which optional attributes
//! apply to a type, so the strings are grouped here once.

const TEXT_LIKE: &[&str] = &[
    "text",
    "email",
    "tel",
    "phone",
    "number",
    "number_integer",
    "number_decimal",
    "textarea",
];

const NUMERIC: &[&str] = &["number", "number_integer"];

const CHOICE: &[&str] = &["codelist", "multiselect_codelist"];

const ADVANCED: &[&str] = &[
    "codelist",
    "multiselect_codelist",
    "attachment",
    "label",
    "link",
    "external_link",
];

/// Which optional attributes a field type carries in an exported form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldKind {
    /// Gets a placeholder text
    pub text_like: bool,
    /// Gets an auto increment flag
    pub numeric: bool,
    /// Gets codelist items
    pub choice: bool,
    /// Gets a heading level
    pub label: bool,
    /// Counts towards `hasAdvancedFields`
    pub advanced: bool,
}

impl FieldKind {
    /// Classify a field type string, ignoring case
    pub fn of(field_type: &str) -> Self {
        let lower = field_type.to_lowercase();
        let t = lower.as_str();
        Self {
            text_like: TEXT_LIKE.contains(&t),
            numeric: NUMERIC.contains(&t),
            choice: CHOICE.contains(&t),
            label: t == "label",
            advanced: ADVANCED.contains(&t),
        }
    }
}
