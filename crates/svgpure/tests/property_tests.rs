//! Property-based tests for the sanitizer
//!
//! These tests use proptest to verify, for arbitrary trees and allow-lists:
//! 1. Idempotence: sanitizing sanitized output changes nothing
//! 2. Closure: surviving elements and attributes are all allowed
//! 3. The root is never removed
//! 4. Rejected subtrees vanish entirely
//! 5. Whitespace is gone from text and sibling order is preserved
//! 6. Serialized output reparses to the same element structure

use proptest::prelude::*;
use svgpure::{from_str, to_string, Allowlist, Element, Node, Options, Sanitizer};

const TAGS: &[&str] = &["svg", "g", "path", "rect", "title", "script", "defs"];
const ATTRS: &[&str] = &["d", "x", "y", "class", "id", "fill", "onload"];

fn arb_text() -> impl Strategy<Value = String> {
    "[a-c \t\n]{0,8}"
}

fn arb_attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (prop::sample::select(ATTRS), "[a-z0-9 ]{0,6}")
            .prop_map(|(name, value)| (name.to_string(), value)),
        0..4,
    )
}

fn arb_element() -> impl Strategy<Value = Element> {
    let leaf = (prop::sample::select(TAGS), arb_attributes()).prop_map(|(name, attrs)| {
        let mut element = Element::new(name);
        element.attributes.extend(attrs);
        element
    });

    leaf.prop_recursive(4, 48, 6, |inner| {
        let node = prop_oneof![
            4 => inner.prop_map(Node::Element),
            2 => arb_text().prop_map(Node::Text),
            1 => "[a-z ]{0,5}".prop_map(Node::Comment),
            1 => "[a-z]{0,5}".prop_map(Node::CData),
        ];
        (
            prop::sample::select(TAGS),
            arb_attributes(),
            prop::collection::vec(node, 0..6),
        )
            .prop_map(|(name, attrs, children)| {
                let mut element = Element::new(name);
                element.attributes.extend(attrs);
                element.children = children;
                element
            })
    })
}

fn arb_allowlist() -> impl Strategy<Value = Allowlist> {
    (
        prop::sample::subsequence(TAGS, 0..=TAGS.len()),
        prop::sample::subsequence(ATTRS, 1..=ATTRS.len()),
    )
        .prop_map(|(elements, attributes)| {
            Allowlist::new(elements, attributes).unwrap_or_else(|_| Allowlist::minimal())
        })
}

fn arb_options() -> impl Strategy<Value = Options> {
    (any::<bool>(), any::<bool>()).prop_map(|(strip_whitespace, filter_root_attributes)| Options {
        strip_whitespace,
        filter_root_attributes,
    })
}

fn walk<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    out.push(element);
    for child in element.elements() {
        walk(child, out);
    }
}

fn descendants(root: &Element) -> Vec<&Element> {
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

fn texts(element: &Element) -> Vec<String> {
    let mut out = Vec::new();
    for child in &element.children {
        match child {
            Node::Text(text) => out.push(text.clone()),
            Node::Element(child) => out.extend(texts(child)),
            _ => {}
        }
    }
    out
}

fn sanitizer(allowlist: Allowlist, options: Options) -> Result<Sanitizer, TestCaseError> {
    Sanitizer::new(allowlist)
        .map(|s| s.with_options(options))
        .map_err(|e| TestCaseError::fail(e.to_string()))
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(
        root in arb_element(),
        allowlist in arb_allowlist(),
        options in arb_options(),
    ) {
        let s = sanitizer(allowlist, options)?;
        let once = s.sanitize(root);
        let twice = s.sanitize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn output_only_holds_allowed_names(root in arb_element(), allowlist in arb_allowlist()) {
        let s = sanitizer(allowlist.clone(), Options::default())?;
        let out = s.sanitize(root);
        for (i, element) in descendants(&out).into_iter().enumerate() {
            if i > 0 {
                prop_assert!(allowlist.allows_element(&element.name), "element {}", element.name);
            }
            for name in element.attributes.keys() {
                prop_assert!(allowlist.allows_attribute(name), "attribute {}", name);
            }
            for child in &element.children {
                prop_assert!(matches!(child, Node::Element(_) | Node::Text(_)));
            }
        }
    }

    #[test]
    fn root_is_never_removed(root in arb_element(), allowlist in arb_allowlist()) {
        let name = root.name.clone();
        let s = sanitizer(allowlist, Options::default())?;
        prop_assert_eq!(s.sanitize(root).name, name);
    }

    #[test]
    fn root_attributes_untouched_when_root_filtering_off(
        root in arb_element(),
        allowlist in arb_allowlist(),
    ) {
        let options = Options { filter_root_attributes: false, ..Options::default() };
        let before = root.attributes.clone();
        let s = sanitizer(allowlist, options)?;
        prop_assert_eq!(s.sanitize(root).attributes, before);
    }

    #[test]
    fn rejected_subtrees_vanish(children in prop::collection::vec(arb_element(), 0..5)) {
        // only <script> is rejected; nothing below a <script> may survive
        let allowlist = Allowlist::new(
            TAGS.iter().copied().filter(|t| *t != "script"),
            ATTRS.iter().copied(),
        ).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut root = Element::new("svg");
        root.children = children.iter().cloned().map(Node::Element).collect();

        let expected_survivors: usize = children
            .iter()
            .map(count_outside_script)
            .sum::<usize>() + 1;
        let out = sanitizer(allowlist, Options::default())?.sanitize(root);
        prop_assert_eq!(descendants(&out).len(), expected_survivors);
    }

    #[test]
    fn text_has_no_whitespace_when_stripping(root in arb_element(), allowlist in arb_allowlist()) {
        let out = sanitizer(allowlist, Options::default())?.sanitize(root);
        for text in texts(&out) {
            prop_assert!(!text.contains([' ', '\t', '\n']), "text {:?}", text);
        }
    }

    #[test]
    fn surviving_siblings_keep_order(root in arb_element(), allowlist in arb_allowlist()) {
        let expected: Vec<String> = root
            .elements()
            .filter(|e| allowlist.allows_element(&e.name))
            .map(|e| e.name.clone())
            .collect();
        let out = sanitizer(allowlist, Options::default())?.sanitize(root);
        let actual: Vec<String> = out.elements().map(|e| e.name.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn serialized_output_reparses(root in arb_element(), allowlist in arb_allowlist()) {
        let out = sanitizer(allowlist, Options::default())?.sanitize(root);
        let reparsed = from_str(&to_string(&out)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(shape(&reparsed.root), shape(&out));
    }
}

fn count_outside_script(element: &Element) -> usize {
    if element.name == "script" {
        return 0;
    }
    1 + element.elements().map(count_outside_script).sum::<usize>()
}

/// Names and attributes of every element, in document order
fn shape(root: &Element) -> Vec<(String, Vec<(String, String)>)> {
    descendants(root)
        .into_iter()
        .map(|e| {
            let attrs = e
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            (e.name.clone(), attrs)
        })
        .collect()
}
