//! Parse, sanitize and serialize in one call

use tracing::trace;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::sanitize::{Sanitizer, Stats};
use crate::xml::{serialize_element, Config as ParserConfig, Parser};

/// Tag name the purifier looks for when none is configured
pub const DEFAULT_ROOT: &str = "svg";

/// Result of purifying one document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purified {
    /// Markup of the sanitized root element only
    pub output: String,
    pub stats: Stats,
}

/// Document-level driver around a [`Sanitizer`]
#[derive(Clone, Debug)]
pub struct Purifier {
    sanitizer: Sanitizer,
    root: String,
    parser: ParserConfig,
}

impl Purifier {
    /// Create a purifier emitting the `svg` element with default parser limits
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self {
            sanitizer,
            root: DEFAULT_ROOT.to_string(),
            parser: ParserConfig::default(),
        }
    }

    /// Tag name of the element to sanitize and emit
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Limits applied while parsing each document
    pub const fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = config;
        self
    }

    pub const fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Limits used when parsing
    pub const fn parser_config(&self) -> ParserConfig {
        self.parser
    }

    /// Parse `input`, locate the first element named after the configured
    /// root, sanitize it and serialize it. Everything outside that element,
    /// including the XML declaration, is discarded.
    pub fn purify(&self, input: &[u8]) -> Result<Purified> {
        let doc = Parser::with_config(input, self.parser).parse()?;
        trace!(document_element = %doc.root.name, root = %self.root, "parsed document");

        let mut root = doc.into_element(&self.root).ok_or_else(|| {
            Error::new(
                ErrorKind::RootNotFound {
                    name: self.root.clone(),
                },
                Span::empty(),
            )
        })?;
        let stats = self.sanitizer.sanitize_in_place(&mut root);

        Ok(Purified {
            output: serialize_element(&root),
            stats,
        })
    }
}

/// Purify `input` with `sanitizer`, emitting the first `root_name` element
pub fn purify(input: &str, sanitizer: &Sanitizer, root_name: &str) -> Result<String> {
    Purifier::new(sanitizer.clone())
        .with_root(root_name)
        .purify(input.as_bytes())
        .map(|purified| purified.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::Allowlist;
    use crate::error::Category;

    const INKSCAPE: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!-- Created with Inkscape (http://www.inkscape.org/) -->
<svg
   width="24"
   height="24"
   viewBox="0 0 24 24"
   version="1.1"
   id="svg5"
   inkscape:version="1.2"
   xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
   xmlns="http://www.w3.org/2000/svg">
  <sodipodi:namedview id="namedview7" pagecolor="#ffffff" />
  <defs id="defs2" />
  <g inkscape:label="Layer 1" id="layer1">
    <path
       style="fill:#000000;stroke-width:0.5"
       d="M 2,2 H 22 V 22 H 2 Z"
       id="rect1" />
  </g>
</svg>
"##;

    #[test]
    fn test_purify_inkscape_export() -> Result<()> {
        let sanitizer = Sanitizer::new(Allowlist::broad())?;
        let out = purify(INKSCAPE, &sanitizer, "svg")?;
        assert_eq!(
            out,
            "<svg width=\"24\" height=\"24\" viewBox=\"0 0 24 24\" xmlns=\"http://www.w3.org/2000/svg\">\
             <defs/><g><path style=\"fill:#000000;stroke-width:0.5\" d=\"M 2,2 H 22 V 22 H 2 Z\"/></g></svg>"
        );
        Ok(())
    }

    #[test]
    fn test_purify_reports_stats() -> Result<()> {
        let purifier = Purifier::new(Sanitizer::new(Allowlist::minimal())?);
        let purified = purifier.purify(INKSCAPE.as_bytes())?;
        // namedview and defs
        assert_eq!(purified.stats.elements_removed, 2);
        assert!(purified.stats.attributes_removed >= 6);
        Ok(())
    }

    #[test]
    fn test_root_located_by_name() -> Result<()> {
        let input = "<html><body><p>hi</p><svg class=\"i\"><rect x=\"1\"/></svg></body></html>";
        let sanitizer = Sanitizer::new(Allowlist::minimal())?;
        assert_eq!(purify(input, &sanitizer, "svg")?, "<svg><rect x=\"1\"/></svg>");
        Ok(())
    }

    #[test]
    fn test_missing_root_is_malformed_input() -> Result<()> {
        let sanitizer = Sanitizer::new(Allowlist::minimal())?;
        let err = purify("<html/>", &sanitizer, "svg").err();
        assert_eq!(err.as_ref().map(Error::category), Some(Category::MalformedInput));
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::RootNotFound {
                name: "svg".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn test_nesting_past_max_depth_is_rejected() -> Result<()> {
        let purifier = Purifier::new(Sanitizer::new(Allowlist::minimal())?)
            .with_parser_config(ParserConfig::new(3, 0));
        assert_eq!(purifier.parser_config().max_depth, 3);

        let shallow = purifier.purify(b"<svg><g><g/></g></svg>")?;
        assert_eq!(shallow.output, "<svg><g><g/></g></svg>");

        let err = purifier.purify(b"<svg><g><g><g/></g></g></svg>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 3 })
        );
        Ok(())
    }

    #[test]
    fn test_parse_failure_propagates() -> Result<()> {
        let sanitizer = Sanitizer::new(Allowlist::minimal())?;
        let err = purify("<svg><g></svg>", &sanitizer, "svg").err();
        assert!(matches!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MismatchedTag { .. })
        ));
        Ok(())
    }
}
