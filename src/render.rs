//! Renders [`Note`]s into the HTML list-item fragments that get inserted into
//! the host document.

use crate::note::{Note, LINE_BREAK};
use pulldown_cmark::escape::escape_html;

/// Escapes `&`, `<`, `>`, `"` and `'` so that author text can never introduce
/// markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, text);
    out.replace('\'', "&#39;")
}

/// Returns the heading markup for a title exactly as it appears in a rendered
/// fragment. Duplicate detection matches against this.
pub fn title_heading(title: &str) -> String {
    format!("<h3>{}</h3>", escape(title))
}

/// Escapes a note body, then restores the [`LINE_BREAK`] markers. Escaping
/// has to come first: a body containing the marker's escaped text
/// (`&lt;br&gt;`) is escaped to `&amp;lt;br&amp;gt;` and so can't be turned
/// into a break.
pub fn body(text: &str) -> String {
    escape(text).replace(&escape(LINE_BREAK), LINE_BREAK)
}

/// Renders a [`Note`] as a single `<li>` fragment.
pub fn fragment(note: &Note) -> String {
    format!(
        r#"        <li>
            {}
            <p><strong>Date:</strong> {}</p>
            <p><strong>Tags:</strong> {}</p>
            <p>{}</p>
        </li>"#,
        title_heading(&note.title),
        escape(&note.date),
        escape(&note.tags),
        body(&note.body),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fragment_example() {
        let note: Note = "# Hello\ntags: x\ndate: 2024-01-01\nBody line"
            .parse()
            .unwrap();
        let html = fragment(&note);
        assert!(html.contains("<h3>Hello</h3>"));
        assert!(html.contains("<strong>Date:</strong> 2024-01-01"));
        assert!(html.contains("<strong>Tags:</strong> x"));
        assert!(html.contains("<p>Body line</p>"));
        assert!(html.trim_start().starts_with("<li>"));
        assert!(html.ends_with("</li>"));
    }

    #[test]
    fn test_script_is_escaped() {
        let note: Note = "# <b>T</b>\ndate: \"now\" & 'then'\n<script>alert(1)</script>\nnext"
            .parse()
            .unwrap();
        let html = fragment(&note);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;<br>next"));
        assert!(html.contains("<h3>&lt;b&gt;T&lt;/b&gt;</h3>"));
        assert!(html.contains("&quot;now&quot; &amp; &#39;then&#39;"));
    }

    #[test]
    fn test_escaped_marker_is_not_a_break() {
        assert_eq!(body("a&lt;br&gt;b"), "a&amp;lt;br&amp;gt;b");
        assert_eq!(body("a<br>b"), "a<br>b");
    }

    #[test]
    fn test_title_heading() {
        assert_eq!(title_heading("Fish & Chips"), "<h3>Fish &amp; Chips</h3>");
    }
}
