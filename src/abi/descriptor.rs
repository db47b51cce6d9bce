//! Describes which contract functions to call and how the list call's
//! parallel columns map onto blog record fields.

use super::codec::function_selector;
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A logical field carried by one column of the list call's return tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlogField {
    Id,
    Title,
    Description,
    User,
    PublishTime,
    Cover,
    BlogUrl,
}

impl BlogField {
    const REQUIRED: [Self; 5] = [
        Self::Id,
        Self::Title,
        Self::Description,
        Self::User,
        Self::PublishTime,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::User => "user",
            Self::PublishTime => "publishTime",
            Self::Cover => "cover",
            Self::BlogUrl => "blogUrl",
        }
    }

    /// Map a return parameter name from a contract ABI (`uuids`, `titles`, ...)
    #[must_use]
    pub fn from_abi_name(name: &str) -> Option<Self> {
        match name {
            "uuids" | "ids" => Some(Self::Id),
            "titles" => Some(Self::Title),
            "descriptions" => Some(Self::Description),
            "users" | "authors" => Some(Self::User),
            "publishTimes" => Some(Self::PublishTime),
            "covers" => Some(Self::Cover),
            "blogUrls" | "urls" => Some(Self::BlogUrl),
            _ => None,
        }
    }
}

impl fmt::Display for BlogField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered field list matching the arrival order of the list call's columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BlogField>", into = "Vec<BlogField>")]
pub struct FieldLayout(Vec<BlogField>);

impl FieldLayout {
    pub fn new(fields: Vec<BlogField>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(*field) {
                return Err(Error::invalid_input(
                    "layout",
                    format!("field '{field}' appears more than once"),
                ));
            }
        }
        if let Some(missing) = BlogField::REQUIRED.iter().find(|f| !seen.contains(f)) {
            return Err(Error::invalid_input(
                "layout",
                format!("required field '{missing}' is missing"),
            ));
        }
        Ok(Self(fields))
    }

    /// `id, title, description, user, publishTime, cover`
    #[must_use]
    pub fn standard() -> Self {
        let mut fields = BlogField::REQUIRED.to_vec();
        fields.push(BlogField::Cover);
        Self(fields)
    }

    /// [`standard`](Self::standard) followed by `blogUrl`
    #[must_use]
    pub fn with_blog_url() -> Self {
        let mut fields = BlogField::REQUIRED.to_vec();
        fields.extend([BlogField::Cover, BlogField::BlogUrl]);
        Self(fields)
    }

    /// The five required fields only
    #[must_use]
    pub fn minimal() -> Self {
        Self(BlogField::REQUIRED.to_vec())
    }

    #[must_use]
    pub fn fields(&self) -> &[BlogField] {
        &self.0
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn position(&self, field: BlogField) -> Option<usize> {
        self.0.iter().position(|f| *f == field)
    }
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<BlogField>> for FieldLayout {
    type Error = Error;

    fn try_from(fields: Vec<BlogField>) -> Result<Self> {
        Self::new(fields)
    }
}

impl From<FieldLayout> for Vec<BlogField> {
    fn from(layout: FieldLayout) -> Self {
        layout.0
    }
}

/// The two read-only functions the adapter calls, plus the list layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiDescriptor {
    /// Zero-argument function returning the parallel `bytes[]` columns
    pub list_function: String,
    /// One-argument `(bytes)` function returning a single `bytes` body
    pub content_function: String,
    pub layout: FieldLayout,
}

impl Default for AbiDescriptor {
    fn default() -> Self {
        Self {
            list_function: "getBlogList".to_string(),
            content_function: "getFile".to_string(),
            layout: FieldLayout::standard(),
        }
    }
}

impl AbiDescriptor {
    /// Build a descriptor from human-readable ABI fragments, e.g.
    ///
    /// ```text
    /// function getBlogList() public view returns (bytes[] memory uuids, bytes[] memory titles, ...)
    /// function getFile(bytes memory name) public view virtual returns (bytes memory blog)
    /// ```
    pub fn from_human_readable(list_fragment: &str, content_fragment: &str) -> Result<Self> {
        let list = Fragment::parse(list_fragment)?;
        if !list.inputs.is_empty() {
            return Err(Error::invalid_input(
                "list_function",
                format!("'{}' must take no arguments", list.name),
            ));
        }
        let fields = list
            .outputs
            .iter()
            .map(|param| {
                if param.ty != "bytes[]" {
                    return Err(Error::invalid_input(
                        "list_function",
                        format!("return parameter '{}' is {}, expected bytes[]", param.name, param.ty),
                    ));
                }
                BlogField::from_abi_name(&param.name).ok_or_else(|| {
                    Error::invalid_input(
                        "list_function",
                        format!("return parameter '{}' names no known blog field", param.name),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let content = Fragment::parse(content_fragment)?;
        let single_bytes = |params: &[Param]| params.len() == 1 && params[0].ty == "bytes";
        if !single_bytes(&content.inputs) || !single_bytes(&content.outputs) {
            return Err(Error::invalid_input(
                "content_function",
                format!("'{}' must map one bytes argument to one bytes value", content.name),
            ));
        }

        let descriptor = Self {
            list_function: list.name,
            content_function: content.name,
            layout: FieldLayout::new(fields)?,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    #[must_use]
    pub fn list_signature(&self) -> String {
        format!("{}()", self.list_function)
    }

    #[must_use]
    pub fn content_signature(&self) -> String {
        format!("{}(bytes)", self.content_function)
    }

    #[must_use]
    pub fn list_selector(&self) -> [u8; 4] {
        function_selector(&self.list_signature())
    }

    #[must_use]
    pub fn content_selector(&self) -> [u8; 4] {
        function_selector(&self.content_signature())
    }

    pub fn validate(&self) -> Result<()> {
        for (field, name) in [
            ("list_function", &self.list_function),
            ("content_function", &self.content_function),
        ] {
            if !is_identifier(name) {
                return Err(Error::invalid_input(
                    field,
                    format!("'{name}' is not a valid function name"),
                ));
            }
        }
        // Re-run layout checks; the layout may have been built field by field.
        FieldLayout::new(self.layout.fields().to_vec()).map(drop)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[derive(Debug)]
struct Param {
    ty: String,
    name: String,
}

#[derive(Debug)]
struct Fragment {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
}

impl Fragment {
    fn parse(fragment: &str) -> Result<Self> {
        let pattern = Regex::new(
            r"^\s*function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(([^)]*)\)[^()]*?(?:returns\s*\(([^)]*)\))?\s*;?\s*$",
        )
        .map_err(|e| Error::invalid_input("abi", e.to_string()))?;

        let caps = pattern.captures(fragment).ok_or_else(|| {
            Error::invalid_input("abi", format!("cannot parse fragment '{}'", fragment.trim()))
        })?;

        Ok(Self {
            name: caps[1].to_string(),
            inputs: parse_params(&caps[2]),
            outputs: caps.get(3).map(|m| parse_params(m.as_str())).unwrap_or_default(),
        })
    }
}

fn parse_params(list: &str) -> Vec<Param> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let tokens: Vec<&str> = p.split_whitespace().collect();
            let name = match tokens.as_slice() {
                [_, .., last] if !matches!(*last, "memory" | "calldata" | "storage") => {
                    (*last).to_string()
                }
                _ => String::new(),
            };
            Param {
                ty: tokens.first().copied().unwrap_or_default().to_string(),
                name,
            }
        })
        .collect()
}
