//! Post-processing of rendered pages.

mod pretty;

use lol_html::{RewriteStrSettings, element, rewrite_str};

pub use pretty::prettify;

const MARKDOWN_SUFFIX: &str = ".md";
const HTML_SUFFIX: &str = ".html";

/// A single href changed by [`rewrite_md_links`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRewrite {
    pub from: String,
    pub to: String,
}

/// Points anchors at `.html` documents instead of their `.md` sources.
///
/// Only hrefs ending in `.md` and not starting with `http` are touched.
pub fn rewrite_md_links(document: &str) -> Result<(String, Vec<LinkRewrite>), String> {
    let mut rewrites = Vec::new();

    let output = rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                if let Some(href) = el.get_attribute("href") {
                    if let Some(to) = rewrite_href(&href) {
                        el.set_attribute("href", &to)?;
                        rewrites.push(LinkRewrite { from: href, to });
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| err.to_string())?;

    Ok((output, rewrites))
}

fn rewrite_href(href: &str) -> Option<String> {
    if href.starts_with("http") {
        return None;
    }
    href.strip_suffix(MARKDOWN_SUFFIX)
        .map(|stem| format!("{stem}{HTML_SUFFIX}"))
}

/// Single-line serialization: every line break is removed.
pub fn compact(document: &str) -> String {
    document.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_md_links_are_rewritten() {
        let (out, rewrites) =
            rewrite_md_links(r#"<p><a href="sibling.md">s</a> <a href="../up/doc.md">u</a></p>"#)
                .unwrap();

        assert_eq!(
            out,
            r#"<p><a href="sibling.html">s</a> <a href="../up/doc.html">u</a></p>"#
        );
        assert_eq!(rewrites.len(), 2);
        assert_eq!(rewrites[0].from, "sibling.md");
        assert_eq!(rewrites[0].to, "sibling.html");
    }

    #[test]
    fn external_and_other_links_are_left_alone() {
        let input = concat!(
            r#"<a href="http://example.com/x.md">a</a>"#,
            r#"<a href="https://example.com/y.md">b</a>"#,
            r#"<a href="page.html">c</a>"#,
            r#"<a href="notes.mdx">d</a>"#,
            r#"<a name="anchor">e</a>"#,
        );
        let (out, rewrites) = rewrite_md_links(input).unwrap();

        assert_eq!(out, input);
        assert!(rewrites.is_empty());
    }

    #[test]
    fn only_the_trailing_extension_changes() {
        assert_eq!(rewrite_href("v1.md/notes.md").as_deref(), Some("v1.md/notes.html"));
        assert_eq!(rewrite_href("page.md#top"), None);
    }

    #[test]
    fn compact_removes_line_breaks() {
        assert_eq!(compact("<p>\r\n a\n</p>\n"), "<p> a</p>");
    }
}
