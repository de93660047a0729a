//! Read-only query layer over an html5ever DOM.
//!
//! The checkers only ever ask "which elements match this tag path" and
//! "does this element carry that attribute", so this wraps `RcDom` with
//! exactly those lookups. Missing elements and attributes come back as
//! empty vectors and `None`. Tree walks keep their own stack, so nesting
//! depth is bounded by memory rather than the call stack.

use std::borrow::Cow;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tokenizer::TokenizerOpts;
use html5ever::tree_builder::{
    Attribute, ElementFlags, NodeOrText, QuirksMode, TreeBuilderOpts, TreeSink,
};
use html5ever::{parse_document, ExpandedName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// A parsed HTML page.
pub struct Document {
    dom: RcDom,
    errors: Vec<String>,
}

impl Document {
    /// Parses page bytes; invalid UTF-8 is replaced, and malformed markup is
    /// repaired the way a browser would.
    pub fn parse(source: &[u8]) -> Self {
        let text = String::from_utf8_lossy(source);
        let opts = ParseOpts {
            tokenizer: TokenizerOpts {
                exact_errors: true,
                ..Default::default()
            },
            tree_builder: TreeBuilderOpts {
                exact_errors: true,
                ..Default::default()
            },
        };
        parse_document(LocatedErrors::default(), opts).one(&*text)
    }

    /// Parser diagnostics as `line N - message`, in the order they were raised.
    pub fn parse_errors(&self) -> Vec<String> {
        self.errors.clone()
    }

    /// Elements matching a descendant selector of tag names, such as
    /// `"nav a"`, in document order.
    pub fn select(&self, selector: &str) -> Vec<Element> {
        let path: Vec<String> = selector
            .split_whitespace()
            .map(|tag| tag.to_ascii_lowercase())
            .collect();
        let Some((target, ancestors)) = path.split_last() else {
            return Vec::new();
        };

        let mut found = Vec::new();
        // Names of the open elements above the node being visited.
        let mut open: Vec<String> = Vec::new();
        let mut pending = vec![(self.dom.document.clone(), 0)];
        while let Some((node, depth)) = pending.pop() {
            open.truncate(depth);
            if let Some(name) = element_name(&node) {
                if &name == target && has_ancestors(&open, ancestors) {
                    found.push(Element(node.clone()));
                }
                open.push(name);
            }
            let child_depth = open.len();
            for child in node.children.borrow().iter().rev() {
                pending.push((child.clone(), child_depth));
            }
        }
        found
    }

    /// First element matching `selector`.
    pub fn first(&self, selector: &str) -> Option<Element> {
        self.select(selector).into_iter().next()
    }

    /// Returns true if any element matches `selector`.
    pub fn contains(&self, selector: &str) -> bool {
        self.first(selector).is_some()
    }
}

/// `RcDom` sink that tags each parse error with the line it was raised on.
struct LocatedErrors {
    dom: RcDom,
    line: u64,
    errors: Vec<String>,
}

impl Default for LocatedErrors {
    fn default() -> Self {
        Self {
            dom: RcDom::default(),
            line: 1,
            errors: Vec::new(),
        }
    }
}

impl TreeSink for LocatedErrors {
    type Handle = Handle;
    type Output = Document;

    fn finish(self) -> Document {
        Document {
            dom: self.dom,
            errors: self.errors,
        }
    }

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        self.errors.push(format!("line {} - {}", self.line, msg));
    }

    fn set_current_line(&mut self, line_number: u64) {
        self.line = line_number;
    }

    fn get_document(&mut self) -> Handle {
        self.dom.get_document()
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> ExpandedName<'a> {
        self.dom.elem_name(target)
    }

    fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> Handle {
        self.dom.create_element(name, attrs, flags)
    }

    fn create_comment(&mut self, text: StrTendril) -> Handle {
        self.dom.create_comment(text)
    }

    fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> Handle {
        self.dom.create_pi(target, data)
    }

    fn append(&mut self, parent: &Handle, child: NodeOrText<Handle>) {
        self.dom.append(parent, child)
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        self.dom
            .append_based_on_parent_node(element, prev_element, child)
    }

    fn append_doctype_to_document(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        self.dom
            .append_doctype_to_document(name, public_id, system_id)
    }

    fn get_template_contents(&mut self, target: &Handle) -> Handle {
        self.dom.get_template_contents(target)
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        self.dom.same_node(x, y)
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.dom.set_quirks_mode(mode)
    }

    fn append_before_sibling(&mut self, sibling: &Handle, new_node: NodeOrText<Handle>) {
        self.dom.append_before_sibling(sibling, new_node)
    }

    fn add_attrs_if_missing(&mut self, target: &Handle, attrs: Vec<Attribute>) {
        self.dom.add_attrs_if_missing(target, attrs)
    }

    fn remove_from_parent(&mut self, target: &Handle) {
        self.dom.remove_from_parent(target)
    }

    fn reparent_children(&mut self, node: &Handle, new_parent: &Handle) {
        self.dom.reparent_children(node, new_parent)
    }

    fn is_mathml_annotation_xml_integration_point(&self, handle: &Handle) -> bool {
        self.dom.is_mathml_annotation_xml_integration_point(handle)
    }
}

/// One element of a [`Document`].
#[derive(Clone)]
pub struct Element(Handle);

impl Element {
    /// Lower-case tag name.
    pub fn name(&self) -> String {
        element_name(&self.0).unwrap_or_default()
    }

    /// Attribute value, or `None` when the attribute is absent.
    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| (*a.name.local).eq_ignore_ascii_case(name))
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    /// Returns true if the attribute is present, even when empty.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Descendant text with whitespace runs collapsed.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        let mut pending = vec![self.0.clone()];
        while let Some(node) = pending.pop() {
            if let NodeData::Text { contents } = &node.data {
                raw.push_str(&contents.borrow());
                raw.push(' ');
            }
            pending.extend(node.children.borrow().iter().rev().cloned());
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Compact markup for report lines, e.g. `<a class="x">Home</a>`.
    pub fn describe(&self) -> String {
        let name = self.name();
        let mut out = format!("<{}", name);
        if let NodeData::Element { attrs, .. } = &self.0.data {
            for a in attrs.borrow().iter() {
                out.push_str(&format!(" {}=\"{}\"", &*a.name.local, &*a.value));
            }
        }
        out.push('>');
        if !VOID_ELEMENTS.contains(&name.as_str()) {
            out.push_str(&self.text());
            out.push_str(&format!("</{}>", name));
        }
        out
    }
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some((*name.local).to_ascii_lowercase()),
        _ => None,
    }
}

// `required` must appear, in order, among the open elements.
fn has_ancestors(open: &[String], required: &[String]) -> bool {
    let mut open = open.iter().rev();
    required
        .iter()
        .rev()
        .all(|want| open.any(|have| have == want))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Home</title></head>
<body class="main">
  <nav><ul><li><a href="index.html">Home</a></li><li><a name="top">Top</a></li></ul></nav>
  <section><a href="https://example.com">Out</a></section>
  <img src="cat.png">
</body></html>"#;

    #[test]
    fn select_matches_descendants_only() {
        let doc = Document::parse(PAGE.as_bytes());
        assert_eq!(doc.select("a").len(), 3);
        assert_eq!(doc.select("nav a").len(), 2);
        assert_eq!(doc.select("nav section a").len(), 0);
        assert_eq!(doc.select("html nav a").len(), 2);
    }

    #[test]
    fn missing_things_are_none() {
        let doc = Document::parse(PAGE.as_bytes());
        assert!(doc.first("footer").is_none());
        let top = doc.select("nav a").into_iter().nth(1);
        assert_eq!(top.as_ref().and_then(|a| a.attr("href")), None);
        assert_eq!(top.and_then(|a| a.attr("name")), Some("top".to_string()));
    }

    #[test]
    fn parser_supplies_implied_elements() {
        let doc = Document::parse(b"<p>bare fragment");
        assert!(doc.contains("body"));
        assert!(doc.contains("p"));
    }

    #[test]
    fn describe_renders_compact_markup() {
        let doc = Document::parse(PAGE.as_bytes());
        let described: Vec<_> = doc.select("nav a").iter().map(Element::describe).collect();
        assert_eq!(described[0], r#"<a href="index.html">Home</a>"#);
        assert_eq!(described[1], r#"<a name="top">Top</a>"#);
        let img = doc.first("img").map(|i| i.describe());
        assert_eq!(img.as_deref(), Some(r#"<img src="cat.png">"#));
    }

    #[test]
    fn body_attributes_are_visible() {
        let doc = Document::parse(PAGE.as_bytes());
        let body = doc.first("body");
        assert_eq!(body.and_then(|b| b.attr("class")), Some("main".to_string()));
    }

    #[test]
    fn well_formed_page_has_no_parse_errors() {
        let doc = Document::parse(PAGE.as_bytes());
        assert!(doc.parse_errors().is_empty(), "{:?}", doc.parse_errors());
        let broken = Document::parse(b"<html><body><p>missing doctype</p></body></html>");
        assert!(!broken.parse_errors().is_empty());
    }

    #[test]
    fn parse_errors_name_their_line() {
        let doc = Document::parse(b"<!DOCTYPE html>\n<html><body>\n<p>stray</div>\n</body></html>");
        let errors = doc.parse_errors();
        assert!(errors.first().is_some_and(|e| e.starts_with("line 3 - ")), "{:?}", errors);
    }

    #[test]
    fn deep_nesting_is_walked_without_recursion() {
        let page = format!("<!DOCTYPE html><body>{}deep", "<div>".repeat(20_000));
        let doc = Document::parse(page.as_bytes());
        assert_eq!(doc.select("div").len(), 20_000);
        assert_eq!(doc.first("body").map(|b| b.text()).as_deref(), Some("deep"));
    }
}
