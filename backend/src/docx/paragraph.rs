//! Paragraph-level text handling.
//!
//! A paragraph's visible text is the concatenation of its runs, counting runs
//! wrapped in a hyperlink. When substitution changes that text, the paragraph
//! is rewritten in one pass: the first run's properties are captured, every
//! text-bearing run is removed and a single run carrying those properties and
//! the final text takes the first run's place. Breaks, drawings and other
//! inline objects of the removed runs are carried into the new run. Other
//! children (paragraph properties, bookmarks, proofing marks) stay where they
//! are.

use super::xml::{qualified, XmlDocument, XmlElement, XmlNode};

const DEFAULT_FONT: &str = "Times New Roman";

/// Calls `visit` for every paragraph of the part, including paragraphs nested
/// in table cells and text boxes. Nested paragraphs are visited before the
/// paragraph that contains them.
pub fn for_each_paragraph(document: &XmlDocument, visit: &mut dyn FnMut(&XmlElement)) {
    if let Some(root) = document.root() {
        walk(root, visit);
    }
}

fn walk(element: &XmlElement, visit: &mut dyn FnMut(&XmlElement)) {
    for child in element.elements() {
        walk(child, visit);
        if child.is("p") {
            visit(child);
        }
    }
}

pub fn for_each_paragraph_mut(document: &mut XmlDocument, visit: &mut dyn FnMut(&mut XmlElement)) {
    if let Some(root) = document.root_mut() {
        walk_mut(root, visit);
    }
}

fn walk_mut(element: &mut XmlElement, visit: &mut dyn FnMut(&mut XmlElement)) {
    for child in element.children.iter_mut() {
        if let XmlNode::Element(child) = child {
            walk_mut(child, visit);
            if child.is("p") {
                visit(child);
            }
        }
    }
}

/// Stands in the assembled text for a run child that is not text: a page or
/// column break, a drawing, a text box, a field character. The rewritten run
/// puts the original element back at the marker's position.
pub const OBJECT_MARKER: char = '\u{FFFC}';

/// Run children kept verbatim when a paragraph is rewritten.
fn is_inline_object(piece: &XmlElement) -> bool {
    match piece.local_name() {
        "br" => !matches!(piece.attribute("type"), None | Some("textWrapping")),
        "drawing" | "pict" | "object" | "AlternateContent" | "sym" | "fldChar" | "instrText"
        | "footnoteReference" | "endnoteReference" | "commentReference" => true,
        _ => false,
    }
}

/// True for a direct run, or a hyperlink wrapping runs.
fn holds_text(element: &XmlElement) -> bool {
    element.is("r") || (element.is("hyperlink") && element.elements().any(|e| e.is("r")))
}

/// Runs whose text is visible in the paragraph: direct runs and runs inside
/// direct `w:hyperlink` children, in document order.
fn text_runs(paragraph: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    paragraph.elements().flat_map(|child| {
        let runs: Vec<&XmlElement> = if child.is("r") {
            vec![child]
        } else if child.is("hyperlink") {
            child.elements().filter(|e| e.is("r")).collect()
        } else {
            Vec::new()
        };
        runs
    })
}

/// Visible text of a paragraph: `w:t` content, tabs and line breaks of its
/// runs, with `OBJECT_MARKER` where a run holds a non-text element.
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for run in text_runs(paragraph) {
        for piece in run.elements() {
            if is_inline_object(piece) {
                text.push(OBJECT_MARKER);
                continue;
            }
            match piece.local_name() {
                "t" => text.push_str(&piece.text()),
                "tab" => text.push('\t'),
                "br" | "cr" => text.push('\n'),
                _ => {}
            }
        }
    }
    text
}

/// Character formatting captured from a run's `w:rPr`.
#[derive(Debug, Clone, Default)]
pub struct RunStyle {
    properties: Option<XmlElement>,
}

impl RunStyle {
    pub fn capture(run: &XmlElement) -> Self {
        Self {
            properties: run.child("rPr").cloned(),
        }
    }

    /// Style used when a paragraph has no run to borrow formatting from.
    pub fn default_font(prefix: Option<&str>) -> Self {
        let fonts = XmlElement::new(qualified(prefix, "rFonts"))
            .with_attribute(qualified(prefix, "ascii"), DEFAULT_FONT)
            .with_attribute(qualified(prefix, "hAnsi"), DEFAULT_FONT);
        Self {
            properties: Some(XmlElement::new(qualified(prefix, "rPr")).with_child(fonts)),
        }
    }

    fn property(&self, local: &str) -> Option<&XmlElement> {
        self.properties.as_ref().and_then(|p| p.child(local))
    }

    fn toggle(&self, local: &str) -> Option<bool> {
        self.property(local).map(|e| {
            !matches!(e.attribute("val"), Some("0") | Some("false") | Some("off"))
        })
    }

    pub fn bold(&self) -> Option<bool> {
        self.toggle("b")
    }

    pub fn italic(&self) -> Option<bool> {
        self.toggle("i")
    }

    pub fn underline(&self) -> Option<&str> {
        self.property("u").and_then(|u| u.attribute("val"))
    }

    pub fn font(&self) -> Option<&str> {
        self.property("rFonts")
            .and_then(|f| f.attribute("ascii").or_else(|| f.attribute("hAnsi")))
    }

    /// Font size in half-points, as stored in `w:sz`.
    pub fn size(&self) -> Option<u32> {
        self.property("sz")
            .and_then(|s| s.attribute("val"))
            .and_then(|v| v.parse().ok())
    }

    pub fn color(&self) -> Option<&str> {
        self.property("color").and_then(|c| c.attribute("val"))
    }

    /// A new run with these properties holding `text`. Tabs and newlines are
    /// written as `w:tab` and `w:br`; each `OBJECT_MARKER` takes the next
    /// element of `objects`. Objects left over are appended.
    pub fn build_run(
        &self,
        prefix: Option<&str>,
        text: &str,
        objects: Vec<XmlElement>,
    ) -> XmlElement {
        let mut run = XmlElement::new(qualified(prefix, "r"));
        if let Some(properties) = &self.properties {
            run.children.push(XmlNode::Element(properties.clone()));
        }

        let mut objects = objects.into_iter();
        let mut pending = String::new();
        for ch in text.chars() {
            let element = match ch {
                '\t' => XmlElement::new(qualified(prefix, "tab")),
                '\n' => XmlElement::new(qualified(prefix, "br")),
                OBJECT_MARKER => match objects.next() {
                    Some(object) => object,
                    None => continue,
                },
                _ => {
                    pending.push(ch);
                    continue;
                }
            };
            flush_text(&mut run, prefix, &mut pending);
            run.children.push(XmlNode::Element(element));
        }
        flush_text(&mut run, prefix, &mut pending);
        run.children.extend(objects.map(XmlNode::Element));
        run
    }
}

fn flush_text(run: &mut XmlElement, prefix: Option<&str>, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let t = XmlElement::new(qualified(prefix, "t"))
        .with_attribute("xml:space", "preserve")
        .with_text(std::mem::take(pending));
    run.children.push(XmlNode::Element(t));
}

/// Replaces all text-bearing runs of `paragraph` with one run holding
/// `text`, formatted like the original first run. Hyperlinks whose runs are
/// merged this way are removed; inline objects move into the new run.
pub fn rewrite_paragraph(paragraph: &mut XmlElement, text: &str) -> RunStyle {
    let prefix = paragraph.prefix().map(str::to_owned);
    let prefix = prefix.as_deref();
    let objects: Vec<XmlElement> = text_runs(paragraph)
        .flat_map(|run| run.elements().filter(|e| is_inline_object(e)).cloned())
        .collect();
    let style = text_runs(paragraph).next().map(RunStyle::capture);
    let first = paragraph
        .children
        .iter()
        .position(|n| n.as_element().is_some_and(holds_text));

    match (first, style) {
        (Some(index), Some(style)) => {
            paragraph.children[index] = XmlNode::Element(style.build_run(prefix, text, objects));

            let mut position = 0;
            paragraph.children.retain(|node| {
                let keep = position == index || !node.as_element().is_some_and(holds_text);
                position += 1;
                keep
            });
            style
        }
        _ => {
            let style = RunStyle::default_font(prefix);
            paragraph
                .children
                .push(XmlNode::Element(style.build_run(prefix, text, objects)));
            style
        }
    }
}
