use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::style::Style;
use crate::error::{AppError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data exactly as written, entities still escaped.
    Text(String),
    /// Comments, CDATA, processing instructions, declarations and doctypes, verbatim.
    Markup(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Attribute {
    name: String,
    /// Escaped form, as it appears between the quotes.
    value: String,
}

/// One element of the vector document.
///
/// The original start tag is kept until an attribute changes, so elements nobody
/// edits serialize to the exact bytes they were parsed from. Interaction-only
/// style (pointer cursor, hover/selection filters) lives in a separate live layer
/// that is rendered for the on-screen view but never exported.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
    self_closing: bool,
    raw_start: Option<String>,
    live: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
            raw_start: None,
            live: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| AppError::Svg(format!("bad attribute in <{name}>: {e}")))?;
            attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                // A bare `"` can only come from a single-quoted value; rewritten tags use double quotes.
                value: String::from_utf8_lossy(attr.value.as_ref()).replace('"', "&quot;"),
            });
        }
        Ok(Self {
            raw_start: Some(String::from_utf8_lossy(start).into_owned()),
            name,
            attributes,
            children: Vec::new(),
            self_closing,
            live: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without a namespace prefix (`svg:g` -> `g`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn is_group(&self) -> bool {
        self.local_name() == "g"
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        let raw = &self.attributes.iter().find(|a| a.name == name)?.value;
        Some(match unescape(raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw.clone(),
        })
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        let value = escape(value).into_owned();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
        self.raw_start = None;
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name != name);
        let removed = self.attributes.len() != before;
        if removed {
            self.raw_start = None;
        }
        removed
    }

    pub fn style(&self) -> Style {
        Style::parse(&self.attr("style").unwrap_or_default())
    }

    /// Store `style`, dropping the attribute when nothing is left in it.
    pub fn set_style(&mut self, style: &Style) {
        if style.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", &style.to_string());
        }
    }

    /// Set a paint property both inline and as a presentation attribute, so
    /// whichever one a renderer honours, the value survives serialization.
    pub fn set_paint(&mut self, property: &str, value: &str) {
        let mut style = self.style();
        style.set(property, value);
        self.set_style(&style);
        self.set_attr(property, value);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_child(&mut self, node: Node) {
        self.self_closing = false;
        self.children.push(node);
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// All descendant elements in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        fn walk<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
            for child in el.child_elements() {
                out.push(child);
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    pub fn for_each_descendant_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                f(el);
                el.for_each_descendant_mut(f);
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id().as_deref() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id().as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(el) => el.find_mut(id),
            _ => None,
        })
    }

    /// Set (`Some`) or clear (`None`) an interaction-only style property.
    pub fn set_live(&mut self, property: &str, value: Option<&str>) {
        self.live.retain(|(p, _)| p != property);
        if let Some(value) = value {
            self.live.push((property.to_string(), value.to_string()));
        }
    }

    pub fn live(&self, property: &str) -> Option<&str> {
        self.live
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn clear_live(&mut self) {
        self.live.clear();
    }

    fn write_to(&self, out: &mut String, live: bool) {
        out.push('<');
        let with_live = live && !self.live.is_empty();
        match &self.raw_start {
            Some(raw) if !with_live => out.push_str(raw),
            _ => {
                out.push_str(&self.name);
                let live_style = with_live.then(|| {
                    let mut style = self.style();
                    for (property, value) in &self.live {
                        style.set(property, value);
                    }
                    escape(&style.to_string()).into_owned()
                });
                for attr in &self.attributes {
                    let value = match (&live_style, attr.name.as_str()) {
                        (Some(style), "style") => style,
                        _ => &attr.value,
                    };
                    push_attr(out, &attr.name, value);
                }
                if let Some(style) = &live_style {
                    if !self.attributes.iter().any(|a| a.name == "style") {
                        push_attr(out, "style", style);
                    }
                }
            }
        }

        if self.self_closing && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            write_node(child, out, live);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, escaped_value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(escaped_value);
    out.push('"');
}

fn write_node(node: &Node, out: &mut String, live: bool) {
    match node {
        Node::Element(el) => el.write_to(out, live),
        Node::Text(text) | Node::Markup(text) => out.push_str(text),
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// A parsed SVG file: whatever precedes the root, the `<svg>` root, whatever follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn node(&mut self, node: Node) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
        } else if self.root.is_none() {
            self.prolog.push(node);
        } else {
            self.epilog.push(node);
        }
    }

    fn element(&mut self, element: Element) -> Result<()> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(Node::Element(element));
        } else if self.root.is_none() {
            self.root = Some(element);
        } else {
            return Err(AppError::Svg("more than one root element".into()));
        }
        Ok(())
    }
}

impl SvgDocument {
    pub fn parse(markup: &str) -> Result<Self> {
        let mut reader = Reader::from_str(markup);
        let mut tree = TreeBuilder::default();

        loop {
            match reader.read_event()? {
                Event::Start(start) => tree.open.push(Element::from_start(&start, false)?),
                Event::Empty(start) => tree.element(Element::from_start(&start, true)?)?,
                Event::End(_) => {
                    let element = tree
                        .open
                        .pop()
                        .ok_or_else(|| AppError::Svg("unexpected closing tag".into()))?;
                    tree.element(element)?;
                }
                Event::Text(text) => tree.node(Node::Text(lossy(&text).into_owned())),
                Event::CData(data) => tree.node(Node::Markup(format!("<![CDATA[{}]]>", lossy(&data)))),
                Event::Comment(comment) => tree.node(Node::Markup(format!("<!--{}-->", lossy(&comment)))),
                Event::Decl(decl) => tree.node(Node::Markup(format!("<?{}?>", lossy(&decl)))),
                Event::PI(pi) => tree.node(Node::Markup(format!("<?{}?>", lossy(&pi)))),
                Event::DocType(doctype) => {
                    tree.node(Node::Markup(format!("<!DOCTYPE {}>", lossy(&doctype).trim())))
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = tree.open.last() {
            return Err(AppError::Svg(format!("unclosed <{}>", open.name)));
        }
        let root = tree
            .root
            .ok_or_else(|| AppError::Svg("document has no root element".into()))?;
        if root.local_name() != "svg" {
            return Err(AppError::Svg(format!(
                "root element is <{}>, expected <svg>",
                root.name
            )));
        }

        Ok(Self {
            prolog: tree.prolog,
            root,
            epilog: tree.epilog,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.root.find_mut(id)
    }

    pub fn has_declaration(&self) -> bool {
        self.prolog
            .iter()
            .any(|n| matches!(n, Node::Markup(m) if m.starts_with("<?xml ")))
    }

    fn render(&self, live: bool) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            write_node(node, &mut out, live);
        }
        self.root.write_to(&mut out, live);
        for node in &self.epilog {
            write_node(node, &mut out, live);
        }
        out
    }

    /// Markup without the interaction layer.
    pub fn to_markup(&self) -> String {
        self.render(false)
    }

    /// Markup as shown on screen, highlights and pointer cursors included.
    pub fn to_live_markup(&self) -> String {
        self.render(true)
    }
}
