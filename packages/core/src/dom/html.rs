//! HTML serialization and fragment parsing
//!
//! The parser is a small tolerant tokenizer for the markup this crate and
//! the quote dialog produce. It is not an HTML5 tree builder: unknown end
//! tags are ignored, unclosed elements are closed at the end of input,
//! comments and doctypes are skipped.

use crate::dom::document::VOID_TAGS;
use crate::dom::{Document, DomError, NodeId, NodeKind};
use regex::Regex;
use std::sync::LazyLock;

/// `name`, `name=value`, `name="value"`, `name='value'`
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#).unwrap()
});

/// Numeric and common named character references
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    "mdash" => Some('\u{2014}'),
                    "ndash" => Some('\u{2013}'),
                    "ldquo" => Some('\u{201c}'),
                    "rdquo" => Some('\u{201d}'),
                    "lsquo" => Some('\u{2018}'),
                    "rsquo" => Some('\u{2019}'),
                    "hellip" => Some('\u{2026}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Serialize inline styles as a `style` attribute value
pub fn style_attribute(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a `style` attribute into ordered declarations
pub fn parse_style_attribute(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim().to_ascii_lowercase(), v.trim());
            (!k.is_empty() && !v.is_empty()).then(|| (k, v.to_string()))
        })
        .collect()
}

impl Document {
    /// Markup of a node including itself
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Markup of a node's children
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeKind::Element(data)) => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                if !data.styles.is_empty() {
                    out.push_str(" style=\"");
                    out.push_str(&escape_attribute(&style_attribute(&data.styles)));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&data.tag.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&data.tag);
                out.push('>');
            }
            None => {}
        }
    }

    /// Parse an HTML fragment into detached top-level nodes
    ///
    /// # Errors
    ///
    /// `DomError::Parse` for a tag that is never closed with `>`.
    pub fn parse_fragment(&mut self, html: &str) -> Result<Vec<NodeId>, DomError> {
        let mut top_level = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut rest = html;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                self.push_text(&stack, &mut top_level, rest)?;
                break;
            };
            if lt > 0 {
                self.push_text(&stack, &mut top_level, &rest[..lt])?;
                rest = &rest[lt..];
            }

            if let Some(after) = rest.strip_prefix("<!--") {
                rest = match after.find("-->") {
                    Some(end) => &after[end + 3..],
                    None => "",
                };
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                let end = rest
                    .find('>')
                    .ok_or_else(|| DomError::parse("unterminated declaration"))?;
                rest = &rest[end + 1..];
                continue;
            }

            // "<" not followed by a tag name is literal text
            let opens_tag = rest[1..]
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic() || c == '/')
                .unwrap_or(false);
            if !opens_tag {
                self.push_text(&stack, &mut top_level, "<")?;
                rest = &rest[1..];
                continue;
            }

            let end = rest.find('>').ok_or_else(|| {
                DomError::parse(format!("unterminated tag near '{}'", truncate(rest)))
            })?;
            let tag_body = &rest[1..end];
            rest = &rest[end + 1..];

            if let Some(name) = tag_body.strip_prefix('/') {
                let name = name.trim().to_ascii_lowercase();
                if let Some(pos) = stack
                    .iter()
                    .rposition(|&open| self.tag(open) == Some(name.as_str()))
                {
                    stack.truncate(pos);
                }
                continue;
            }

            let self_closing = tag_body.trim_end().ends_with('/');
            let tag_body = tag_body.trim_end().trim_end_matches('/');
            let name_end = tag_body
                .find(|c: char| c.is_whitespace())
                .unwrap_or(tag_body.len());
            let name = &tag_body[..name_end];

            let element = self.create_element(name);
            for caps in ATTRIBUTE.captures_iter(&tag_body[name_end..]) {
                let attr = caps[1].to_ascii_lowercase();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| decode_entities(m.as_str()))
                    .unwrap_or_default();
                if attr == "style" {
                    for (k, v) in parse_style_attribute(&value) {
                        self.set_style(element, &k, v)?;
                    }
                } else {
                    self.set_attribute(element, &attr, value)?;
                }
            }

            match stack.last() {
                Some(&parent) => self.append_child(parent, element)?,
                None => top_level.push(element),
            }
            if !self_closing && !self.is_void(element) {
                stack.push(element);
            }
        }

        Ok(top_level)
    }

    fn push_text(
        &mut self,
        stack: &[NodeId],
        top_level: &mut Vec<NodeId>,
        raw: &str,
    ) -> Result<(), DomError> {
        let text = decode_entities(raw);
        match stack.last() {
            Some(&parent) => {
                // Merge with a preceding text sibling
                if let Some(last) = self.last_child(parent) {
                    if let Some(existing) = self.text(last) {
                        let merged = format!("{}{}", existing, text);
                        return self.set_text(last, merged);
                    }
                }
                let node = self.create_text(text);
                self.append_child(parent, node)
            }
            None => {
                if text.trim().is_empty() {
                    return Ok(());
                }
                let node = self.create_text(text);
                top_level.push(node);
                Ok(())
            }
        }
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(24).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_escapes_and_styles() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "a \"b\"").unwrap();
        doc.set_style(p, "color", "red").unwrap();
        doc.set_style(p, "font-size", "1em").unwrap();
        let t = doc.create_text("x < y & z");
        let br = doc.create_element("br");
        doc.append_child(p, t).unwrap();
        doc.append_child(p, br).unwrap();

        assert_eq!(
            doc.outer_html(p),
            r#"<p title="a &quot;b&quot;" style="color: red; font-size: 1em">x &lt; y &amp; z<br></p>"#
        );
    }

    #[test]
    fn test_parse_nested_fragment() {
        let mut doc = Document::new();
        let nodes = doc
            .parse_fragment(
                r#"<blockquote class="q" data-style-id='modern' style="color: red;"><p>Hi &amp; bye<br/>next</p></blockquote>"#,
            )
            .unwrap();

        assert_eq!(nodes.len(), 1);
        let quote = nodes[0];
        assert_eq!(doc.tag(quote), Some("blockquote"));
        assert_eq!(doc.attribute(quote, "data-style-id"), Some("modern"));
        assert_eq!(doc.style(quote, "color"), Some("red"));
        assert_eq!(doc.text_content(quote), "Hi & bye\nnext");
        assert!(!doc.is_connected(quote));
    }

    #[test]
    fn test_parse_tolerates_sloppy_markup() {
        let mut doc = Document::new();
        let nodes = doc
            .parse_fragment("<!-- note --><div><span>open<p disabled>text</div></i>tail")
            .unwrap();

        assert_eq!(nodes.len(), 2);
        let div = nodes[0];
        assert_eq!(doc.text_content(div), "opentext");
        assert_eq!(doc.text(nodes[1]), Some("tail"));
        let p = doc.descendants(div)[2];
        assert_eq!(doc.attribute(p, "disabled"), Some(""));
    }

    #[test]
    fn test_unterminated_tag_is_an_error() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.parse_fragment("<p class=\"x\""),
            Err(DomError::Parse(_))
        ));
    }

    #[test]
    fn test_html_survives_reparse() {
        let mut doc = Document::new();
        let html = r#"<footer class="f" style="text-align: right">&#8212; <cite>Book</cite>, Ann</footer>"#;
        let nodes = doc.parse_fragment(html).unwrap();
        assert_eq!(
            doc.outer_html(nodes[0]),
            "<footer class=\"f\" style=\"text-align: right\">\u{2014} <cite>Book</cite>, Ann</footer>"
        );
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let mut doc = Document::new();
        let nodes = doc.parse_fragment("<p>1 < 2 > 0</p>").unwrap();
        assert_eq!(doc.text_content(nodes[0]), "1 < 2 > 0");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&lt;&#65;&#x42;&unknown;"), "<AB&unknown;");
    }
}
