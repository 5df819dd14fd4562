//! Indented, one-node-per-line HTML serialization.

const INDENT: &str = " ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are reproduced verbatim.
const RAW_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

#[derive(Debug)]
enum Token<'a> {
    /// `<!DOCTYPE>`, comments and other declarations.
    Markup(&'a str),
    Open(&'a str),
    Close(&'a str),
    /// Void and self-closing tags.
    Standalone(&'a str),
    /// An opening raw element tag, its contents and its closing tag.
    Raw(&'a str),
    Text(&'a str),
}

/// Pretty-prints a document: one tag or text run per line, indented by
/// nesting depth.
pub fn prettify(document: &str) -> String {
    let mut out = String::with_capacity(document.len() + document.len() / 4);
    let mut depth = 0usize;

    for token in Tokenizer::new(document) {
        match token {
            Token::Close(raw) => {
                depth = depth.saturating_sub(1);
                push_line(&mut out, depth, raw);
            }
            Token::Open(raw) => {
                push_line(&mut out, depth, raw);
                depth += 1;
            }
            Token::Markup(raw) | Token::Standalone(raw) | Token::Raw(raw) => {
                push_line(&mut out, depth, raw)
            }
            Token::Text(text) => {
                for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    push_line(&mut out, depth, line);
                }
            }
        }
    }

    out
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(content);
    out.push('\n');
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consumes `len` bytes and returns them.
    fn take(&mut self, len: usize) -> &'a str {
        let start = self.pos;
        self.pos = (self.pos + len).min(self.input.len());
        &self.input[start..self.pos]
    }

    fn markup(&mut self, terminator: &str) -> Token<'a> {
        let len = self
            .rest()
            .find(terminator)
            .map_or(self.rest().len(), |i| i + terminator.len());
        Token::Markup(self.take(len))
    }

    fn tag(&mut self) -> Token<'a> {
        let len = tag_len(self.rest());
        let raw = self.take(len);
        let closing = raw.starts_with("</");
        let name = tag_name(raw);

        if closing {
            return Token::Close(raw);
        }
        if raw.ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str()) {
            return Token::Standalone(raw);
        }
        if RAW_ELEMENTS.contains(&name.as_str()) {
            let start = self.pos - raw.len();
            let end = find_closing(self.rest(), &name).unwrap_or(self.rest().len());
            self.take(end);
            return Token::Raw(&self.input[start..self.pos]);
        }
        Token::Open(raw)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        if rest.starts_with("<!--") {
            return Some(self.markup("-->"));
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            return Some(self.markup(">"));
        }
        if starts_tag(rest) {
            return Some(self.tag());
        }

        // Text runs until the next real tag; a stray `<` stays text.
        let mut len = rest.len();
        for (i, _) in rest.match_indices('<').filter(|&(i, _)| i > 0) {
            if starts_tag(&rest[i..]) || rest[i..].starts_with("<!") {
                len = i;
                break;
            }
        }
        Some(Token::Text(self.take(len)))
    }
}

fn starts_tag(s: &str) -> bool {
    let mut chars = s.chars();
    if chars.next() != Some('<') {
        return false;
    }
    match chars.next() {
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

/// Length of the tag at the start of `s`, honouring quoted attribute values.
///
/// A quote only opens a value directly after `=`; elsewhere it is an
/// ordinary character, as in `<img alt=don't>`.
fn tag_len(s: &str) -> usize {
    let mut quote = None;
    let mut after_eq = false;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if after_eq => quote = Some(c),
            (None, '>') => return i + 1,
            (None, '=') => {
                after_eq = true;
                continue;
            }
            (None, c) if c.is_whitespace() && after_eq => continue,
            _ => {}
        }
        after_eq = false;
    }
    s.len()
}

fn tag_name(raw: &str) -> String {
    raw.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Offset just past the closing tag for `name`, searched case-insensitively.
fn find_closing(s: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    let lower = s.to_ascii_lowercase();
    let start = lower.find(&needle)?;
    let end = s[start..].find('>').map_or(s.len(), |i| start + i + 1);
    Some(end)
}
