//! Lenient HTML fragment parser. It builds a plain tree and never rewrites
//! content: text and attribute values are kept exactly as written, so a parse
//! followed by serialization returns equivalent markup.

pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<ParsedNode>,
    },
    Text(String),
    Comment(String),
    Doctype(String),
}

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<ParsedNode>,
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Consumes up to (and including) `terminator`, returning the text before it.
    /// Without a terminator the remainder of the input is returned.
    fn take_until(&mut self, terminator: &str) -> &'a str {
        let rest = self.rest();
        match rest.find(terminator) {
            Some(offset) => {
                self.pos += offset + terminator.len();
                &rest[..offset]
            }
            None => {
                self.pos = self.input.len();
                rest
            }
        }
    }
}

pub(crate) fn parse_fragment(html: &str) -> Vec<ParsedNode> {
    let mut cursor = Cursor {
        input: html,
        pos: 0,
    };
    let mut root: Vec<ParsedNode> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    while !cursor.is_done() {
        let rest = cursor.rest();
        let node = if rest.starts_with("<!--") {
            cursor.pos += 4;
            Some(ParsedNode::Comment(cursor.take_until("-->").to_string()))
        } else if rest.starts_with("<!") {
            cursor.pos += 2;
            Some(ParsedNode::Doctype(cursor.take_until(">").to_string()))
        } else if rest.starts_with("</") && starts_tag_name(&rest[2..]) {
            cursor.pos += 2;
            let tag = cursor
                .take_while(is_tag_name_char)
                .to_ascii_lowercase();
            cursor.take_until(">");
            close_element(&mut root, &mut stack, &tag);
            None
        } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
            cursor.pos += 1;
            parse_start_tag(&mut cursor, &mut stack)
        } else {
            let text = take_text(&mut cursor);
            Some(ParsedNode::Text(text.to_string()))
        };

        if let Some(node) = node {
            push_node(&mut root, &mut stack, node);
        }
    }

    while let Some(open) = stack.pop() {
        let node = ParsedNode::Element {
            tag: open.tag,
            attrs: open.attrs,
            children: open.children,
        };
        push_node(&mut root, &mut stack, node);
    }

    root
}

fn starts_tag_name(rest: &str) -> bool {
    rest.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic())
}

fn is_tag_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':'
}

fn take_text<'a>(cursor: &mut Cursor<'a>) -> &'a str {
    let start = cursor.pos;
    // A lone '<' that does not open markup is ordinary text.
    if cursor.peek() == Some('<') {
        cursor.bump();
    }
    cursor.take_while(|ch| ch != '<');
    &cursor.input[start..cursor.pos]
}

fn push_node(root: &mut Vec<ParsedNode>, stack: &mut [OpenElement], node: ParsedNode) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => root.push(node),
    }
}

fn close_element(root: &mut Vec<ParsedNode>, stack: &mut Vec<OpenElement>, tag: &str) {
    if !stack.iter().any(|open| open.tag == tag) {
        return;
    }
    while let Some(open) = stack.pop() {
        let matched = open.tag == tag;
        let node = ParsedNode::Element {
            tag: open.tag,
            attrs: open.attrs,
            children: open.children,
        };
        push_node(root, stack, node);
        if matched {
            break;
        }
    }
}

fn parse_start_tag(cursor: &mut Cursor<'_>, stack: &mut Vec<OpenElement>) -> Option<ParsedNode> {
    let tag = cursor.take_while(is_tag_name_char).to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some('>') => {
                cursor.bump();
                break;
            }
            Some('/') => {
                cursor.bump();
                if cursor.peek() == Some('>') {
                    cursor.bump();
                    self_closing = true;
                    break;
                }
            }
            Some(_) => {
                if let Some((name, value)) = parse_attribute(cursor) {
                    if !attrs.iter().any(|(existing, _)| *existing == name) {
                        attrs.push((name, value));
                    }
                }
            }
        }
    }

    if self_closing || is_void(&tag) {
        return Some(ParsedNode::Element {
            tag,
            attrs,
            children: Vec::new(),
        });
    }

    if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
        let body = take_raw_text(cursor, &tag);
        let children = if body.is_empty() {
            Vec::new()
        } else {
            vec![ParsedNode::Text(body.to_string())]
        };
        return Some(ParsedNode::Element {
            tag,
            attrs,
            children,
        });
    }

    stack.push(OpenElement {
        tag,
        attrs,
        children: Vec::new(),
    });
    None
}

fn parse_attribute(cursor: &mut Cursor<'_>) -> Option<(String, String)> {
    let name = cursor
        .take_while(|ch| !ch.is_whitespace() && ch != '=' && ch != '>' && ch != '/')
        .to_ascii_lowercase();
    if name.is_empty() {
        // Stray character such as a quote; skip it so the tag can still close.
        cursor.bump();
        return None;
    }

    cursor.skip_whitespace();
    if cursor.peek() != Some('=') {
        return Some((name, String::new()));
    }
    cursor.bump();
    cursor.skip_whitespace();

    let value = match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            cursor.bump();
            let mut terminator = [0u8; 4];
            cursor.take_until(quote.encode_utf8(&mut terminator)).to_string()
        }
        _ => cursor
            .take_while(|ch| !ch.is_whitespace() && ch != '>')
            .to_string(),
    };
    Some((name, value))
}

fn take_raw_text<'a>(cursor: &mut Cursor<'a>, tag: &str) -> &'a str {
    let rest = cursor.rest();
    let closing = format!("</{tag}");
    let lowered = rest.to_ascii_lowercase();
    match lowered.find(&closing) {
        Some(offset) => {
            cursor.pos += offset;
            cursor.take_until(">");
            &rest[..offset]
        }
        None => {
            cursor.pos = cursor.input.len();
            rest
        }
    }
}
