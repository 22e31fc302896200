// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Owned SVG markup tree.
//!
//! Documents are parsed with `quick-xml` into a small mutable tree of
//! [`Element`] and [`Node`] values. The tree keeps attribute order, text,
//! CDATA and comments so unrelated structure survives a parse/serialize cycle.
//! Element names are kept verbatim; lookups compare local names so namespaced
//! and plain SVG documents behave the same.

use std::{collections::HashMap, fs, path::Path};

use quick_xml::{
    Reader, Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event}
};
use tracing::debug;

use crate::error::{self, Error};

/// Path from the root element to a descendant, as ordinals among element
/// children at each level.
///
/// Ordinals ignore text and comment nodes, so replacing an element's text never
/// invalidates paths recorded for other elements.
pub type ElementPath = Vec<usize>;

/// Child node of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Unescaped character data.
    Text(String),
    /// Raw CDATA section contents.
    CData(String),
    /// Raw comment contents.
    Comment(String)
}

/// Markup element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified element name as written in the source.
    pub name:       String,
    /// Attributes in document order with unescaped values.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children:   Vec<Node>
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            attributes: Vec::new(),
            children:   Vec::new()
        }
    }

    /// Builder-style attribute setter used when assembling synthetic blocks.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Returns the local part of the element name.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Returns the value of the attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the element identifier.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Sets an attribute, replacing the value in place when it already exists.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value))
        }
    }

    /// Appends a child element.
    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Iterates over direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None
        })
    }

    /// Returns the leading text of the element, before its first child
    /// element or comment.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(value) | Node::CData(value) => text.push_str(value),
                _ => break
            }
        }
        text
    }

    /// Replaces the leading text of the element.
    ///
    /// Child elements and the text that follows them are left untouched.
    pub fn set_text(&mut self, text: &str) {
        let leading = self
            .children
            .iter()
            .take_while(|node| matches!(node, Node::Text(_) | Node::CData(_)))
            .count();
        self.children.drain(..leading);
        if !text.is_empty() {
            self.children.insert(0, Node::Text(text.to_owned()));
        }
    }

    /// Concatenates every descendant text and CDATA node in document order.
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }

    /// Returns `true` when this element or any descendant satisfies
    /// `predicate`.
    pub fn any_in_subtree<F>(&self, predicate: &F) -> bool
    where
        F: Fn(&Element) -> bool
    {
        predicate(self) || self.elements().any(|child| child.any_in_subtree(predicate))
    }

    /// Finds the first element in document order carrying identifier `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.elements().find_map(|child| child.find_by_id(id))
    }

    /// Mutable counterpart of [`Element::find_by_id`].
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(child) => child.find_by_id_mut(id),
            _ => None
        })
    }

    /// Detaches the first descendant element, in document order, carrying
    /// identifier `id`.
    ///
    /// The element itself is never removed; callers own the root.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        for index in 0..self.children.len() {
            let matches =
                matches!(&self.children[index], Node::Element(child) if child.id() == Some(id));
            if matches {
                return match self.children.remove(index) {
                    Node::Element(element) => Some(element),
                    _ => None
                };
            }
            if let Node::Element(child) = &mut self.children[index]
                && let Some(removed) = child.remove_by_id(id)
            {
                return Some(removed);
            }
        }
        None
    }

    /// Removes descendant elements for which `remove` returns `true`.
    ///
    /// Traversal is top-down: removed elements are not descended into, kept
    /// elements are. Returns the number of removed elements.
    pub fn retain_descendants<F>(&mut self, remove: &mut F) -> usize
    where
        F: FnMut(&Element) -> bool
    {
        let mut removed = 0;
        self.children.retain(|node| match node {
            Node::Element(child) => {
                let drop = remove(child);
                if drop {
                    removed += 1;
                }
                !drop
            }
            _ => true
        });
        for node in &mut self.children {
            if let Node::Element(child) = node {
                removed += child.retain_descendants(remove);
            }
        }
        removed
    }

    fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let Some((&first, rest)) = path.split_first() else {
            return Some(self);
        };
        let child = self
            .children
            .iter_mut()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None
            })
            .nth(first)?;
        child.element_at_mut(rest)
    }

    fn index_into(&self, path: &mut ElementPath, index: &mut HashMap<String, ElementPath>) {
        if let Some(id) = self.id() {
            index.entry(id.to_owned()).or_insert_with(|| path.clone());
        }
        for (ordinal, child) in self.elements().enumerate() {
            path.push(ordinal);
            child.index_into(path, index);
            path.pop();
        }
    }
}

/// Parsed SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Doctype and comments that precede the root element.
    pub prolog:   Vec<String>,
    /// Root element.
    pub root:     Element,
    /// Comments that follow the root element.
    pub epilog:   Vec<String>,
    doctype_slot: Option<usize>
}

impl Document {
    /// Wraps a root element into a document without prolog.
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
            doctype_slot: None
        }
    }

    /// Parses SVG markup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgParse`] for malformed markup, unknown entities or a
    /// missing root element.
    ///
    /// # Example
    ///
    /// ```
    /// use profile_card::Document;
    ///
    /// let document = Document::parse("<svg><text id=\"a\">1</text></svg>")?;
    /// assert_eq!(document.root.find_by_id("a").map(|e| e.text()), Some("1".to_owned()));
    /// # Ok::<(), profile_card::Error>(())
    /// ```
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(source);
        reader.trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut doctype_slot = None;

        loop {
            let event = reader.read_event().map_err(|source| {
                Error::svg_parse(format!("at byte {}: {source}", reader.buffer_position()))
            })?;
            match event {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::svg_parse("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|source| Error::svg_parse(source.to_string()))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::CData(value));
                    }
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8_lossy(&comment).into_owned();
                    match (stack.last_mut(), root.is_some()) {
                        (Some(parent), _) => parent.children.push(Node::Comment(value)),
                        (None, false) => prolog.push(format!("<!--{value}-->")),
                        (None, true) => epilog.push(format!("<!--{value}-->"))
                    }
                }
                Event::DocType(doctype) => {
                    doctype_slot = Some(prolog.len());
                    prolog.push(String::from_utf8_lossy(&doctype).into_owned());
                }
                Event::Decl(_) => {}
                Event::PI(_) => debug!("dropping processing instruction"),
                Event::Eof => break
            }
        }

        if !stack.is_empty() {
            return Err(Error::svg_parse("unexpected end of document inside an element"));
        }
        let root = root.ok_or_else(|| Error::svg_parse("document has no root element"))?;

        Ok(Self {
            prolog,
            root,
            epilog,
            doctype_slot
        })
    }

    /// Reads and parses an SVG file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgIo`] when the file cannot be read and
    /// [`Error::SvgParse`] for malformed markup.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = fs::read_to_string(path).map_err(|source| error::svg_io_error(path, source))?;
        Self::parse(&source)
    }

    /// Serializes the document with an XML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgParse`] when the writer rejects an event.
    pub fn to_xml_string(&self) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        write_event(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_event(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;

        for (position, entry) in self.prolog.iter().enumerate() {
            if Some(position) == self.doctype_slot {
                write_event(&mut writer, Event::DocType(BytesText::from_escaped(entry.as_str())))?;
            } else {
                write_event(&mut writer, Event::Text(BytesText::from_escaped(entry.as_str())))?;
            }
            write_event(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
        }

        write_element(&mut writer, &self.root)?;

        for entry in &self.epilog {
            write_event(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
            write_event(&mut writer, Event::Text(BytesText::from_escaped(entry.as_str())))?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|source| Error::svg_parse(format!("serialized document is not UTF-8: {source}")))
    }

    /// Serializes the document and writes it to `path`, UTF-8 encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgIo`] when the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let contents = self.to_xml_string()?;
        fs::write(path, contents).map_err(|source| error::svg_io_error(path, source))
    }

    /// Builds an identifier index for patch-time lookups.
    ///
    /// The first element in document order wins when an identifier repeats.
    pub fn id_index(&self) -> HashMap<String, ElementPath> {
        let mut index = HashMap::new();
        let mut path = Vec::new();
        self.root.index_into(&mut path, &mut index);
        index
    }

    /// Resolves a path recorded by [`Document::id_index`].
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        self.root.element_at_mut(path)
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn collect_text(element: &Element, buffer: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(value) | Node::CData(value) => buffer.push_str(value),
            Node::Element(child) => collect_text(child, buffer),
            Node::Comment(_) => {}
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|source| Error::svg_parse(source.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|source| Error::svg_parse(source.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), Error> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::svg_parse("document has more than one root element"))
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), Error> {
    writer
        .write_event(event)
        .map_err(|source| Error::svg_parse(format!("failed to serialize SVG: {source}")))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(value) => write_event(writer, Event::Text(BytesText::new(value)))?,
            Node::CData(value) => write_event(writer, Event::CData(BytesCData::new(value.as_str())))?,
            Node::Comment(value) => {
                write_event(writer, Event::Comment(BytesText::from_escaped(value.as_str())))?
            }
        }
    }
    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- card -->
<svg xmlns="http://www.w3.org/2000/svg" width="985" height="530">
<style>.key {fill: #ffa657;}</style>
<text x="390" y="30" fill="#c9d1d9"><tspan class="key">Uptime</tspan>:<tspan class="cc" id="age_data_dots"> ... </tspan><tspan class="value" id="age_data">1 year</tspan></text>
<text x="15" y="30"><![CDATA[a < b]]></text>
</svg>"##;

    #[test]
    fn parse_preserves_attribute_order_and_prolog_comment() {
        let document = Document::parse(TEMPLATE).expect("template parses");
        assert_eq!(document.prolog, vec!["<!-- card -->".to_owned()]);
        assert_eq!(document.root.local_name(), "svg");
        assert_eq!(document.root.attributes[0].0, "xmlns");
        assert_eq!(document.root.attribute("width"), Some("985"));
    }

    #[test]
    fn find_by_id_returns_first_match_in_document_order() {
        let document = Document::parse(
            "<svg><g><text id=\"dup\">first</text></g><text id=\"dup\">second</text></svg>"
        )
        .expect("parses");
        let found = document.root.find_by_id("dup").expect("found");
        assert_eq!(found.text(), "first");
    }

    #[test]
    fn set_text_replaces_leading_text_only() {
        let mut element = Document::parse("<text>old<tspan>child</tspan>tail</text>")
            .expect("parses")
            .root;
        element.set_text("new");
        assert_eq!(element.text(), "new");
        assert_eq!(element.text_content(), "newchildtail");
    }

    #[test]
    fn set_text_on_empty_element_inserts_text() {
        let mut element = Element::new("tspan");
        element.set_text("42");
        assert_eq!(element.children, vec![Node::Text("42".to_owned())]);
    }

    #[test]
    fn text_content_includes_cdata() {
        let document = Document::parse(TEMPLATE).expect("parses");
        assert!(document.root.text_content().contains("a < b"));
    }

    #[test]
    fn serialization_roundtrip_is_stable() {
        let document = Document::parse(TEMPLATE).expect("parses");
        let first = document.to_xml_string().expect("serializes");
        let second = Document::parse(&first)
            .expect("reparses")
            .to_xml_string()
            .expect("serializes again");
        assert_eq!(first, second);
        assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(first.contains("<![CDATA[a < b]]>"));
    }

    #[test]
    fn serialization_escapes_text_and_attributes() {
        let mut root = Element::new("svg").with_attribute("data-label", "a \"b\" & c");
        let mut text = Element::new("text");
        text.set_text("<tag> & more");
        root.push_element(text);

        let output = Document::new(root).to_xml_string().expect("serializes");
        assert!(output.contains("&lt;tag&gt; &amp; more"));
        assert!(output.contains("a &quot;b&quot; &amp; c"));
    }

    #[test]
    fn doctype_survives_roundtrip() {
        let source = "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\"><svg/>";
        let output = Document::parse(source)
            .expect("parses")
            .to_xml_string()
            .expect("serializes");
        assert!(output.contains("<!DOCTYPE svg PUBLIC"));
    }

    #[test]
    fn remove_by_id_detaches_nested_element() {
        let mut document =
            Document::parse("<svg><g><g id=\"block\"><text/></g></g></svg>").expect("parses");
        let removed = document.root.remove_by_id("block").expect("removed");
        assert_eq!(removed.local_name(), "g");
        assert!(document.root.find_by_id("block").is_none());
    }

    #[test]
    fn remove_by_id_follows_document_order() {
        let mut document = Document::parse(
            "<svg><g><text id=\"dup\">nested</text></g><text id=\"dup\">sibling</text></svg>"
        )
        .expect("parses");
        let removed = document.root.remove_by_id("dup").expect("removed");
        assert_eq!(removed.text(), "nested");
        assert_eq!(document.root.find_by_id("dup").map(Element::text), Some("sibling".to_owned()));
    }

    #[test]
    fn id_index_paths_resolve_to_elements() {
        let mut document = Document::parse(TEMPLATE).expect("parses");
        let index = document.id_index();
        let path = index.get("age_data").expect("indexed").clone();
        let element = document.element_at_mut(&path).expect("resolves");
        assert_eq!(element.text(), "1 year");
    }

    #[test]
    fn local_name_strips_prefix() {
        let element = Element::new("svg:text");
        assert_eq!(element.local_name(), "text");
    }

    #[test]
    fn parse_rejects_unbalanced_markup() {
        let error = Document::parse("<svg><text></svg>").expect_err("must fail");
        assert!(matches!(error, Error::SvgParse { .. }));
    }

    #[test]
    fn parse_rejects_empty_input() {
        let error = Document::parse("   ").expect_err("must fail");
        assert!(matches!(error, Error::SvgParse { .. }));
    }
}
