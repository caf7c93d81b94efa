//! Tree to markup text

use crate::xml::model::{Document, Element, Node};

/// Serialize a whole document, prolog and epilog included
pub fn serialize_document(doc: &Document) -> String {
    let mut output = String::new();
    for node in &doc.prolog {
        write_node(node, &mut output);
        output.push('\n');
    }
    write_element(&doc.root, &mut output);
    for node in &doc.epilog {
        output.push('\n');
        write_node(node, &mut output);
    }
    output
}

/// Serialize a single element subtree
pub fn serialize_element(element: &Element) -> String {
    let mut output = String::new();
    write_element(element, &mut output);
    output
}

fn write_element(element: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);

    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        escape_into(value, true, output);
        output.push('"');
    }

    // empty text never comes out of the parser, so it can't force an end tag
    if element.children.iter().all(is_empty_text) {
        output.push_str("/>");
        return;
    }

    output.push('>');
    for child in &element.children {
        write_node(child, output);
    }
    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

fn is_empty_text(node: &Node) -> bool {
    matches!(node, Node::Text(text) if text.is_empty())
}

fn write_node(node: &Node, output: &mut String) {
    match node {
        Node::Element(element) => write_element(element, output),
        Node::Text(text) => escape_into(text, false, output),
        Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        Node::CData(text) => {
            output.push_str("<![CDATA[");
            output.push_str(text);
            output.push_str("]]>");
        }
        Node::ProcessingInstruction { target, data } => {
            output.push_str("<?");
            output.push_str(target);
            if !data.is_empty() {
                output.push(' ');
                output.push_str(data);
            }
            output.push_str("?>");
        }
        Node::Doctype(body) => {
            output.push_str("<!DOCTYPE ");
            output.push_str(body);
            output.push('>');
        }
    }
}

fn escape_into(input: &str, in_attribute: bool, output: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if in_attribute => output.push_str("&quot;"),
            // keep literal newlines and tabs from being normalized away on reparse
            '\n' if in_attribute => output.push_str("&#10;"),
            '\t' if in_attribute => output.push_str("&#9;"),
            '\r' => output.push_str("&#13;"),
            _ => output.push(ch),
        }
    }
}
