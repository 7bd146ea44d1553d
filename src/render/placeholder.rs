use std::ops::Range;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::Value;

use crate::report::Warning;
use crate::variables::VariableMap;

/// A named string function applied to a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    Lowercase,
    Uppercase,
    /// Strip underscores, then lowercase.
    NoCase,
    /// Strip underscores, keep case.
    RemoveUnderscores,
    Unknown(String),
}

impl Transformation {
    pub fn parse(name: &str) -> Self {
        match name {
            "lowercase" => Transformation::Lowercase,
            "uppercase" => Transformation::Uppercase,
            "nocase" => Transformation::NoCase,
            "remove_" => Transformation::RemoveUnderscores,
            other => Transformation::Unknown(other.to_string()),
        }
    }

    /// Apply to `value`. Unknown transformations pass the value through.
    pub fn apply(&self, value: &str) -> String {
        match self {
            Transformation::Lowercase => value.to_lowercase(),
            Transformation::Uppercase => value.to_uppercase(),
            Transformation::NoCase => value.replace('_', "").to_lowercase(),
            Transformation::RemoveUnderscores => value.replace('_', ""),
            Transformation::Unknown(_) => value.to_string(),
        }
    }
}

/// A `${name}` or `${name-transformation}` token found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The full match, delimiters included.
    pub raw: &'a str,
    pub name: &'a str,
    pub transformation: Option<Transformation>,
}

impl<'a> Placeholder<'a> {
    /// Build a token from its raw match and the text between `${` and `}`.
    ///
    /// The inner text splits on the first `-` only, so `${a-b-c}` is variable
    /// `a` with transformation `b-c`.
    pub fn parse(raw: &'a str, inner: &'a str) -> Self {
        match inner.split_once('-') {
            Some((name, transformation)) => Placeholder {
                raw,
                name,
                transformation: Some(Transformation::parse(transformation)),
            },
            None => Placeholder {
                raw,
                name: inner,
                transformation: None,
            },
        }
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(.*?)\}").expect("valid regex"))
}

/// Find every placeholder in `text`, left to right and non-overlapping.
///
/// Each item carries the byte range of the raw match in `text`.
pub fn placeholders(text: &str) -> impl Iterator<Item = (Range<usize>, Placeholder<'_>)> {
    placeholder_pattern().captures_iter(text).map(|caps| {
        let whole = caps.get(0).expect("group 0 is always present");
        let inner = caps.get(1).map_or("", |m| m.as_str());
        (whole.range(), Placeholder::parse(whole.as_str(), inner))
    })
}

/// The substitution for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub warning: Option<Warning>,
}

impl Resolved {
    fn clean(text: String) -> Self {
        Self {
            text,
            warning: None,
        }
    }

    fn with_warning(text: String, warning: Warning) -> Self {
        Self {
            text,
            warning: Some(warning),
        }
    }
}

/// Resolve a placeholder against `variables`.
///
/// Never fails: a missing variable, or a transformation on a non-string
/// value, yields the raw placeholder text. An unknown transformation yields
/// the untransformed value.
pub fn resolve(placeholder: &Placeholder<'_>, variables: &VariableMap) -> Resolved {
    let Some(value) = variables.get(placeholder.name) else {
        return Resolved::with_warning(
            placeholder.raw.to_string(),
            Warning::UnresolvedVariable {
                placeholder: placeholder.raw.to_string(),
            },
        );
    };

    let Some(transformation) = &placeholder.transformation else {
        return Resolved::clean(scalar_text(value));
    };

    let Value::String(value) = value else {
        return Resolved::with_warning(
            placeholder.raw.to_string(),
            Warning::NonStringValue {
                name: placeholder.name.to_string(),
            },
        );
    };

    match transformation {
        Transformation::Unknown(name) => Resolved::with_warning(
            value.clone(),
            Warning::UnknownTransformation { name: name.clone() },
        ),
        known => Resolved::clean(known.apply(value)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
