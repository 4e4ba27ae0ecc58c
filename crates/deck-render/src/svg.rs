// ABOUTME: Minimal SVG element tree with builder methods and XML escaping.
// ABOUTME: Interactive elements carry a data-key naming their interaction target.

use std::fmt;

use deck_core::Color;
use deck_layout::{Point, Rect};

/// Attribute holding the interaction target of an element
pub const KEY_ATTR: &str = "data-key";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Coordinates with at most two decimals and no trailing zeros
pub fn num(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let s = format!("{:.2}", rounded);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value
    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Numeric attribute formatted with [`num`]
    pub fn num(self, name: &str, value: f32) -> Self {
        self.attr(name, num(value))
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn key(self, key: &str) -> Self {
        self.attr(KEY_ATTR, key)
    }

    pub fn fill(self, color: Color) -> Self {
        self.attr("fill", color.css())
    }

    pub fn stroke(self, color: Color, width: f32) -> Self {
        self.attr("stroke", color.css()).num("stroke-width", width)
    }

    pub fn opacity(self, opacity: f32) -> Self {
        self.num("opacity", opacity)
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn text(mut self, content: &str) -> Self {
        self.children.push(Node::Text(content.to_string()));
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of this element and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }

    /// Depth-first walk over this element and all nested elements
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            if let Node::Element(e) = child {
                e.walk(visit);
            }
        }
    }

    pub fn find_by_key(&self, key: &str) -> Option<&Element> {
        let mut found = None;
        self.walk(&mut |e| {
            if found.is_none() && e.get_attr(KEY_ATTR) == Some(key) {
                found = Some(e);
            }
        });
        found
    }

    /// All `data-key` values in document order
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.walk(&mut |e| {
            if let Some(k) = e.get_attr(KEY_ATTR) {
                keys.push(k.to_string());
            }
        });
        keys
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        let mut count = 0;
        self.walk(&mut |e| {
            if e.tag == tag {
                count += 1;
            }
        });
        count
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attrs {
            write!(f, " {}=\"{}\"", name, escape(value, true))?;
        }
        if self.children.is_empty() {
            return write!(f, "/>");
        }
        write!(f, ">")?;
        for child in &self.children {
            match child {
                Node::Element(e) => write!(f, "{}", e)?,
                Node::Text(t) => write!(f, "{}", escape(t, false))?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn rect(r: Rect) -> Element {
    Element::new("rect")
        .num("x", r.x)
        .num("y", r.y)
        .num("width", r.width.max(0.0))
        .num("height", r.height.max(0.0))
}

pub fn line(from: Point, to: Point) -> Element {
    Element::new("line")
        .num("x1", from.x)
        .num("y1", from.y)
        .num("x2", to.x)
        .num("y2", to.y)
}

pub fn circle(center: Point, radius: f32) -> Element {
    Element::new("circle")
        .num("cx", center.x)
        .num("cy", center.y)
        .num("r", radius)
}

pub fn path(d: &str) -> Element {
    Element::new("path").attr("d", d)
}

pub fn polygon(points: &str) -> Element {
    Element::new("polygon").attr("points", points)
}

pub fn polyline(points: &str) -> Element {
    Element::new("polyline").attr("points", points).attr("fill", "none")
}

pub fn text(at: Point, content: &str) -> Element {
    Element::new("text").num("x", at.x).num("y", at.y).text(content)
}

pub fn group() -> Element {
    Element::new("g")
}

/// Native SVG tooltip for the enclosing element
pub fn title(content: &str) -> Element {
    Element::new("title").text(content)
}

/// A standalone `<svg>` document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: f32,
    pub height: f32,
    pub root: Element,
}

impl Document {
    pub fn new(width: f32, height: f32) -> Self {
        let root = Element::new("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .num("width", width)
            .num("height", height)
            .attr("viewBox", format!("0 0 {} {}", num(width), num(height)));
        Self {
            width,
            height,
            root,
        }
    }

    pub fn push(&mut self, child: Element) {
        self.root.push(child);
    }

    pub fn find_by_key(&self, key: &str) -> Option<&Element> {
        self.root.find_by_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.root.keys()
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        self.root.count_tag(tag)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
