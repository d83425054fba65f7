//! Inserts rendered fragments into named sections of the host document.
//!
//! A section is an element whose `id` is the section id. Entries live in a
//! list element carrying the configured list class, which is either the
//! section element itself or its first descendant with that class:
//!
//! ```html
//! <section id="tech">
//!   <h2>Tech</h2>
//!   <ul class="entry-list">
//!     <li>...</li>
//!   </ul>
//! </section>
//! ```

use crate::dom::{Document, Element};
use crate::render;

/// The result of [`insert`].
#[derive(Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The fragment was prepended; holds the new document.
    Inserted(String),

    /// The section already holds an entry with this title. The document is
    /// unchanged.
    Duplicate,

    /// The section or its list couldn't be found. The document is unchanged.
    SectionMissing,
}

/// Locates the entry list of the section `section_id`.
pub fn find_list<'d>(doc: &'d Document, section_id: &str, list_class: &str) -> Option<&'d Element> {
    let section = doc.find_by_id(section_id)?;
    if section.has_class(list_class) {
        return Some(section);
    }
    section.descendants().find(|e| e.has_class(list_class))
}

// Reports whether any `h3` in `elements` holds exactly the escaped title.
fn has_heading<'e>(doc: &Document, mut elements: impl Iterator<Item = &'e Element>, title: &str) -> bool {
    let escaped = render::escape(title);
    elements.any(|e| e.name == "h3" && doc.inner_html(e) == escaped)
}

/// Reports whether an entry titled `title` exists anywhere in `document`.
pub fn contains_title(document: &str, title: &str) -> bool {
    let doc = Document::parse(document);
    has_heading(&doc, doc.elements(), title)
}

/// Prepends `fragment` to the entry list of `section_id` (newest first),
/// unless the list already holds an entry titled `title`. `fragment` is
/// expected to be the rendering of a note titled `title`.
pub fn insert(
    document: &str,
    section_id: &str,
    list_class: &str,
    fragment: &str,
    title: &str,
) -> Insertion {
    let doc = Document::parse(document);
    let list = match find_list(&doc, section_id, list_class) {
        Some(list) => list,
        None => return Insertion::SectionMissing,
    };
    if has_heading(&doc, list.descendants(), title) {
        return Insertion::Duplicate;
    }
    Insertion::Inserted(doc.prepend_child(list, &format!("\n{}", fragment)))
}

/// Replaces the whole content of the entry list of `section_id` with
/// `fragments`, in order. Returns `None` if the section can't be found.
pub fn replace(
    document: &str,
    section_id: &str,
    list_class: &str,
    fragments: &[String],
) -> Option<String> {
    let doc = Document::parse(document);
    let list = find_list(&doc, section_id, list_class)?;
    let markup = match fragments.is_empty() {
        true => String::from("\n"),
        false => format!("\n\n{}\n\n", fragments.join("\n\n")),
    };
    Some(doc.replace_children(list, &format!("{}{}", markup, closing_indent(&doc, list))))
}

/// Appends `fragment` after the existing entries of `section_id`. Returns
/// `None` if the section can't be found.
pub fn append(document: &str, section_id: &str, list_class: &str, fragment: &str) -> Option<String> {
    let doc = Document::parse(document);
    let list = find_list(&doc, section_id, list_class)?;
    Some(doc.append_child(list, &format!("\n{}", fragment)))
}

// The whitespace between the start of the line holding the list's closing
// tag and the tag itself.
fn closing_indent<'d>(doc: &Document<'d>, list: &Element) -> &'d str {
    let before = &doc.source()[..list.inner.end];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let indent = &before[line_start..];
    match indent.trim().is_empty() {
        true => indent,
        false => "",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::note::Note;

    const PAGE: &str = r#"<html>
<body>
  <section id="latest">
    <ul class="entry-list">
    </ul>
  </section>
  <section id="tech">
    <h2>Tech</h2>
    <ul class="entry-list">
    </ul>
  </section>
  <ul id="books" class="entry-list"></ul>
</body>
</html>
"#;

    fn note(title: &str) -> (String, String) {
        let note: Note = format!("# {}\ndate: 2024-01-01\nbody of {}", title, title)
            .parse()
            .unwrap();
        (render::fragment(&note), note.title)
    }

    fn inserted(result: Insertion) -> String {
        match result {
            Insertion::Inserted(doc) => doc,
            other => panic!("expected insertion, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_is_newest_first() {
        let (a, a_title) = note("A");
        let (b, b_title) = note("B");
        let doc = inserted(insert(PAGE, "tech", "entry-list", &a, &a_title));
        let doc = inserted(insert(&doc, "tech", "entry-list", &b, &b_title));
        let a_at = doc.find("<h3>A</h3>").unwrap();
        let b_at = doc.find("<h3>B</h3>").unwrap();
        assert!(b_at < a_at);
        // Nothing leaked into the other sections.
        let latest = &doc[..doc.find(r#"<section id="tech">"#).unwrap()];
        assert!(!latest.contains("<h3>"));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let (a, title) = note("A");
        let once = inserted(insert(PAGE, "tech", "entry-list", &a, &title));
        assert_eq!(insert(&once, "tech", "entry-list", &a, &title), Insertion::Duplicate);
    }

    #[test]
    fn test_duplicates_are_scoped_per_section() {
        let (a, title) = note("A");
        let doc = inserted(insert(PAGE, "tech", "entry-list", &a, &title));
        let doc = inserted(insert(&doc, "latest", "entry-list", &a, &title));
        assert_eq!(doc.matches("<h3>A</h3>").count(), 2);
    }

    #[test]
    fn test_insert_preserves_everything_else() {
        let (a, title) = note("A");
        let doc = inserted(insert(PAGE, "tech", "entry-list", &a, &title));
        let anchor = "<h2>Tech</h2>\n    <ul class=\"entry-list\">";
        let at = PAGE.find(anchor).unwrap() + anchor.len();
        assert_eq!(&doc[..at], &PAGE[..at]);
        assert!(doc.ends_with(&PAGE[at..]));
        assert_eq!(doc.len(), PAGE.len() + a.len() + 1);
    }

    #[test]
    fn test_list_may_be_the_section() {
        let (a, title) = note("A");
        let doc = inserted(insert(PAGE, "books", "entry-list", &a, &title));
        assert!(doc.contains(&format!("<ul id=\"books\" class=\"entry-list\">\n{}</ul>", a)));
    }

    #[test]
    fn test_missing_section() {
        let (a, title) = note("A");
        assert_eq!(insert(PAGE, "travel", "entry-list", &a, &title), Insertion::SectionMissing);
        assert_eq!(insert(PAGE, "tech", "no-such-list", &a, &title), Insertion::SectionMissing);
        assert_eq!(append(PAGE, "travel", "entry-list", &a), None);
        assert_eq!(replace(PAGE, "travel", "entry-list", &[a]), None);
    }

    #[test]
    fn test_contains_title() {
        let (a, title) = note("Fish & <Chips>");
        assert!(!contains_title(PAGE, &title));
        let doc = inserted(insert(PAGE, "books", "entry-list", &a, &title));
        assert!(contains_title(&doc, &title));
        assert!(!contains_title(&doc, "Fish"));
    }

    #[test]
    fn test_replace() {
        let (a, _) = note("A");
        let (b, _) = note("B");
        let doc = replace(PAGE, "tech", "entry-list", &[b.clone(), a.clone()]).unwrap();
        assert!(doc.contains(&format!(
            "<ul class=\"entry-list\">\n\n{}\n\n{}\n\n    </ul>",
            b, a
        )));
        // Replacing again gives the same document.
        assert_eq!(replace(&doc, "tech", "entry-list", &[b, a]).unwrap(), doc);
    }

    #[test]
    fn test_append_keeps_order() {
        let (a, _) = note("A");
        let (b, _) = note("B");
        let doc = append(PAGE, "tech", "entry-list", &a).unwrap();
        let doc = append(&doc, "tech", "entry-list", &b).unwrap();
        assert!(doc.find("<h3>A</h3>").unwrap() < doc.find("<h3>B</h3>").unwrap());
        assert!(doc.contains("</li>\n    </ul>\n  </section>"));
    }
}
