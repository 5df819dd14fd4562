//! Markdown to HTML fragment conversion.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const HIGHLIGHT_THEME: &str = "base16-ocean.dark";
const EXTENSION_PREFIX: &str = "markdown.extensions.";

/// The parser options and post-processing passes a set of extension names
/// turns on.
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    options: Options,
    highlight: bool,
    hard_breaks: bool,
    ignored: Vec<String>,
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self {
            options: Options::empty(),
            highlight: false,
            hard_breaks: false,
            ignored: Vec::new(),
        }
    }
}

impl ExtensionSet {
    /// Resolves extension identifiers. Unknown names are collected in
    /// [`ignored`](Self::ignored) rather than rejected.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Self {
        let mut set = Self::default();

        for name in names {
            let raw = name.as_ref().trim();
            let id = raw.strip_prefix(EXTENSION_PREFIX).unwrap_or(raw);
            match id {
                "tables" => set.options.insert(Options::ENABLE_TABLES),
                "footnotes" => set.options.insert(Options::ENABLE_FOOTNOTES),
                "strikethrough" => set.options.insert(Options::ENABLE_STRIKETHROUGH),
                "tasklists" => set.options.insert(Options::ENABLE_TASKLISTS),
                "smarty" => set.options.insert(Options::ENABLE_SMART_PUNCTUATION),
                "attr_list" => set.options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
                "def_list" => set.options.insert(Options::ENABLE_DEFINITION_LIST),
                "meta" => set.options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS),
                "math" => set.options.insert(Options::ENABLE_MATH),
                "gfm" => set.options.insert(Options::ENABLE_GFM),
                "extra" => set.options.insert(
                    Options::ENABLE_TABLES
                        | Options::ENABLE_FOOTNOTES
                        | Options::ENABLE_DEFINITION_LIST
                        | Options::ENABLE_HEADING_ATTRIBUTES,
                ),
                // Fenced code is part of CommonMark.
                "fenced_code" => {}
                "nl2br" => set.hard_breaks = true,
                "codehilite" => set.highlight = true,
                _ => set.ignored.push(raw.to_string()),
            }
        }

        set
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Converts raw Markdown into an HTML fragment.
    pub fn to_html(&self, markdown: &str) -> String {
        let mut events = Vec::new();
        let mut parser = Parser::new_ext(markdown, self.options);

        while let Some(event) = parser.next() {
            match event {
                Event::Start(Tag::MetadataBlock(_)) => {
                    // Front matter is configuration, not content.
                    for inner in parser.by_ref() {
                        if matches!(inner, Event::End(TagEnd::MetadataBlock(_))) {
                            break;
                        }
                    }
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) if self.highlight => {
                    let mut code = String::new();
                    for inner in parser.by_ref() {
                        match inner {
                            Event::End(TagEnd::CodeBlock) => break,
                            Event::Text(text) => code.push_str(&text),
                            _ => {}
                        }
                    }
                    events.push(Event::Html(highlight(&lang, &code).into()));
                }
                Event::SoftBreak if self.hard_breaks => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn highlight(lang: &str, code: &str) -> String {
    let token = lang.split_whitespace().next().unwrap_or_default();
    let syntax = SYNTAX_SET
        .find_syntax_by_token(token)
        .or_else(|| match token {
            "nix" => SYNTAX_SET.find_syntax_by_name("JavaScript"),
            "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
            _ => None,
        });

    let plain = || format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(code));

    match (syntax, THEME_SET.themes.get(HIGHLIGHT_THEME)) {
        (Some(syntax), Some(theme)) if !token.is_empty() => {
            highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| plain())
        }
        _ => plain(),
    }
}
