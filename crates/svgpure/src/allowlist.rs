//! Element and attribute allow-lists

use indexmap::IndexSet;

use crate::error::{Error, ErrorKind, Result};

/// Presentation and geometry attributes kept by every built-in profile
pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    "d",
    "xmlns",
    "style",
    "x",
    "y",
    "rx",
    "ry",
    "height",
    "width",
    "fill",
    "stroke",
    "stroke-width",
    "viewBox",
    "transform",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-opacity",
    "fill-opacity",
    "fill-rule",
    "clip-rule",
    "cx",
    "cy",
    "r",
];

/// Containers, paint servers and filter primitives
pub const BROAD_ELEMENTS: &[&str] = &[
    "svg",
    "path",
    "rect",
    "g",
    "defs",
    "linearGradient",
    "stop",
    "radialGradient",
    "clipPath",
    "mask",
    "filter",
    "feGaussianBlur",
    "feOffset",
    "feBlend",
    "feColorMatrix",
    "feMerge",
    "feMergeNode",
    "feComposite",
    "feFlood",
    "feTile",
    "feTurbulence",
    "feDisplacementMap",
    "feDiffuseLighting",
    "feSpecularLighting",
    "feDistantLight",
    "fePointLight",
    "feSpotLight",
    "feMorphology",
    "feConvolveMatrix",
    "feImage",
    "feComponentTransfer",
    "feFuncR",
    "feFuncG",
    "feFuncB",
    "feFuncA",
];

pub const MINIMAL_ELEMENTS: &[&str] = &["svg", "path", "rect", "g"];

/// Built-in element vocabulary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Profile {
    #[default]
    Broad,
    Minimal,
}

impl Profile {
    pub const fn elements(self) -> &'static [&'static str] {
        match self {
            Self::Broad => BROAD_ELEMENTS,
            Self::Minimal => MINIMAL_ELEMENTS,
        }
    }
}

/// Names that survive sanitization. Membership is exact and case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allowlist {
    elements: IndexSet<String>,
    attributes: IndexSet<String>,
}

impl Allowlist {
    /// Build and validate an allow-list.
    ///
    /// Fails when both sets are empty or any name is empty or contains whitespace.
    pub fn new<E, A>(elements: E, attributes: A) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let list = Self {
            elements: elements.into_iter().map(Into::into).collect(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        };
        list.validate()?;
        Ok(list)
    }

    /// Profile elements with the default attribute set
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            elements: profile.elements().iter().map(|s| s.to_string()).collect(),
            attributes: DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Broad profile: containers, paint servers and filter primitives
    pub fn broad() -> Self {
        Self::for_profile(Profile::Broad)
    }

    /// Minimal profile: `svg`, `path`, `rect` and `g`
    pub fn minimal() -> Self {
        Self::for_profile(Profile::Minimal)
    }

    /// Add element names; call [`Allowlist::validate`] afterwards
    pub fn extend_elements<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.elements.extend(names.into_iter().map(Into::into));
    }

    /// Add attribute names; call [`Allowlist::validate`] afterwards
    pub fn extend_attributes<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.attributes.extend(names.into_iter().map(Into::into));
    }

    /// Check that the lists are non-empty and every name is usable
    pub fn validate(&self) -> Result<()> {
        if self.elements.is_empty() && self.attributes.is_empty() {
            return Err(Error::config(ErrorKind::EmptyAllowlists));
        }
        if let Some(bad) = self
            .elements
            .iter()
            .chain(&self.attributes)
            .find(|name| !is_valid_name(name))
        {
            return Err(Error::config(ErrorKind::InvalidName { name: bad.clone() }));
        }
        Ok(())
    }

    /// Exact, case-sensitive element name lookup
    pub fn allows_element(&self, name: &str) -> bool {
        self.elements.contains(name)
    }

    /// Exact, case-sensitive attribute name lookup
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}
