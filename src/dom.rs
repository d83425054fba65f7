//! A small HTML element tree for patching the host document.
//!
//! [`Document::parse`] scans the source into a tree of [`Element`]s that
//! remember the byte spans of their opening tag, inner content, and closing
//! tag. Edits are expressed against those spans and serialized back into a
//! new string, so everything outside the edited region is reproduced byte for
//! byte. The scanner is forgiving in the way browsers are: unknown markup is
//! treated as text, stray closing tags are ignored, and unclosed elements end
//! where their parent (or the document) ends.

use std::ops::Range;

/// Elements which never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// An element in a parsed [`Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// The lowercased tag name.
    pub name: String,

    /// Attributes in source order. Names are lowercased; values are kept as
    /// written (without the surrounding quotes).
    pub attributes: Vec<(String, String)>,

    /// The span of the opening tag, `<` through `>`.
    pub open: Range<usize>,

    /// The span between the opening and closing tags. Empty for void and
    /// self-closing elements.
    pub inner: Range<usize>,

    /// The span of the closing tag, if the source has one.
    pub close: Option<Range<usize>>,

    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Reports whether `class` is one of the whitespace-separated entries of
    /// the element's `class` attribute.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Iterates over every element below this one in document order. The
    /// element itself is not included.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// A pre-order iterator over a subtree. See [`Element::descendants`] and
/// [`Document::elements`].
pub struct Descendants<'e> {
    stack: Vec<&'e Element>,
}

impl<'e> Iterator for Descendants<'e> {
    type Item = &'e Element;

    fn next(&mut self) -> Option<&'e Element> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// A parsed HTML document borrowing its source text.
#[derive(Debug)]
pub struct Document<'a> {
    source: &'a str,
    roots: Vec<Element>,
}

impl<'a> Document<'a> {
    pub fn parse(source: &'a str) -> Document<'a> {
        Document {
            source,
            roots: Scanner::new(source).scan(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The top-level elements of the document.
    pub fn roots(&self) -> &[Element] {
        &self.roots
    }

    /// Iterates over every element in document order.
    pub fn elements(&self) -> Descendants<'_> {
        Descendants {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Returns the first element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.elements().find(|e| e.id() == Some(id))
    }

    /// The source text between the element's opening and closing tags.
    pub fn inner_html(&self, element: &Element) -> &'a str {
        &self.source[element.inner.clone()]
    }

    /// Serializes the document with `markup` inserted before the existing
    /// content of `parent`.
    pub fn prepend_child(&self, parent: &Element, markup: &str) -> String {
        self.splice(parent.inner.start..parent.inner.start, markup)
    }

    /// Serializes the document with `markup` inserted after the existing
    /// content of `parent`. Trailing whitespace before the closing tag stays
    /// after `markup`, so the closing tag keeps its indentation.
    pub fn append_child(&self, parent: &Element, markup: &str) -> String {
        let inner = self.inner_html(parent);
        let at = parent.inner.start + inner.trim_end().len();
        self.splice(at..at, markup)
    }

    /// Serializes the document with the content of `parent` replaced by
    /// `markup`.
    pub fn replace_children(&self, parent: &Element, markup: &str) -> String {
        self.splice(parent.inner.clone(), markup)
    }

    fn splice(&self, range: Range<usize>, markup: &str) -> String {
        let mut out =
            String::with_capacity(self.source.len() + markup.len() - (range.end - range.start));
        out.push_str(&self.source[..range.start]);
        out.push_str(markup);
        out.push_str(&self.source[range.end..]);
        out
    }
}

/// Builds the element tree. Open elements live on `stack`; when an element
/// closes it's moved into its parent's children (or into `roots`).
struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    stack: Vec<Element>,
    roots: Vec<Element>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            source,
            pos: 0,
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn scan(mut self) -> Vec<Element> {
        let source = self.source;
        while let Some(offset) = source[self.pos..].find('<') {
            let start = self.pos + offset;
            let rest = &source[start..];
            self.pos = if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(end) => start + end + "-->".len(),
                    None => source.len(),
                }
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                match rest.find('>') {
                    Some(end) => start + end + 1,
                    None => source.len(),
                }
            } else if rest.starts_with("</") {
                self.end_tag(start)
            } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.start_tag(start)
            } else {
                start + 1
            };
        }

        let end = source.len();
        while !self.stack.is_empty() {
            self.close_top(end, None);
        }
        self.roots
    }

    // Parses the opening tag at `start` and returns the position to resume
    // scanning from.
    fn start_tag(&mut self, start: usize) -> usize {
        let name_start = start + 1;
        let name_end = name_start + tag_name_len(&self.source[name_start..]);
        let tag_end = match find_tag_end(self.source, name_end) {
            Some(end) => end,
            // Not a complete tag; treat the `<` as text.
            None => return start + 1,
        };

        let name = self.source[name_start..name_end].to_ascii_lowercase();
        let attr_source = self.source[name_end..tag_end].trim_end();
        let self_closing = attr_source.ends_with('/');
        let attributes = parse_attributes(attr_source.trim_end_matches('/'));
        let open = start..tag_end + 1;

        let mut element = Element {
            name,
            attributes,
            open: open.clone(),
            inner: open.end..open.end,
            close: None,
            children: Vec::new(),
        };

        if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
            self.attach(element);
            return open.end;
        }

        if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
            let closing = format!("</{}", element.name);
            let resume = match find_ignore_ascii_case(&self.source[open.end..], &closing) {
                Some(offset) => {
                    let close_start = open.end + offset;
                    let close_end = self.source[close_start..]
                        .find('>')
                        .map_or(self.source.len(), |i| close_start + i + 1);
                    element.inner = open.end..close_start;
                    element.close = Some(close_start..close_end);
                    close_end
                }
                None => {
                    element.inner = open.end..self.source.len();
                    self.source.len()
                }
            };
            self.attach(element);
            return resume;
        }

        self.stack.push(element);
        open.end
    }

    // Parses the closing tag at `start` and returns the position to resume
    // scanning from.
    fn end_tag(&mut self, start: usize) -> usize {
        let name_start = start + 2;
        let name_len = tag_name_len(&self.source[name_start..]);
        let tag_end = match self.source[name_start..].find('>') {
            Some(i) => name_start + i,
            None => return self.source.len(),
        };
        let name = self.source[name_start..name_start + name_len].to_ascii_lowercase();

        // A closing tag with no matching open element is ignored.
        if let Some(depth) = self.stack.iter().rposition(|e| e.name == name) {
            while self.stack.len() > depth + 1 {
                self.close_top(start, None);
            }
            self.close_top(start, Some(start..tag_end + 1));
        }
        tag_end + 1
    }

    fn close_top(&mut self, inner_end: usize, close: Option<Range<usize>>) {
        if let Some(mut element) = self.stack.pop() {
            element.inner.end = inner_end;
            element.close = close;
            self.attach(element);
        }
    }

    fn attach(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.roots.push(element),
        }
    }
}

fn tag_name_len(s: &str) -> usize {
    s.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
        .unwrap_or(s.len())
}

// Finds the `>` which ends the tag whose attributes start at `from`, skipping
// over quoted attribute values.
fn find_tag_end(source: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in source[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(from + i),
            (None, '<') => return None,
            (None, _) => {}
        }
    }
    None
}

fn parse_attributes(mut s: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    loop {
        s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if s.is_empty() {
            return attributes;
        }

        let name_len = s
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(s.len());
        let name = s[..name_len].to_ascii_lowercase();
        s = s[name_len..].trim_start();

        let value = match s.strip_prefix('=') {
            None => String::new(),
            Some(rest) => {
                let rest = rest.trim_start();
                let (value, remaining) = match rest.chars().next() {
                    Some(q @ '"') | Some(q @ '\'') => match rest[1..].find(q) {
                        Some(end) => (&rest[1..end + 1], &rest[end + 2..]),
                        None => (&rest[1..], ""),
                    },
                    _ => {
                        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                        (&rest[..end], &rest[end..])
                    }
                };
                s = remaining;
                value.to_owned()
            }
        };
        attributes.push((name, value));
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
