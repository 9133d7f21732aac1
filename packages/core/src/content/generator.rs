//! Quote markup generation and extraction
//!
//! Generated structure:
//!
//! ```text
//! <blockquote class="aurora-quote" role="blockquote" data-style-id="..." style="...">
//!   <span class="aurora-quote__before" aria-hidden="true">“</span>    (optional)
//!   <p class="aurora-quote__text">line one<br>line two</p>
//!   <footer class="aurora-quote__footer">— <cite class="aurora-quote__cite">Source</cite>, Author</footer>
//! </blockquote>
//! ```
//!
//! Only configured style fields are written inline, so an unset field never
//! overrides the host page's stylesheet.

use crate::constants::{
    BEFORE_CLASS, CITE_CLASS, DEFAULT_STYLE_ID, FOOTER_CLASS, FOOTER_DASH, QUOTE_CLASS, QUOTE_ROLE,
    QUOTE_TAG, STYLE_ID_ATTR, TEXT_CLASS,
};
use crate::content::css::{
    cite_declarations, decode_glyph, footer_declarations, glyph_declarations,
    glyph_is_positioned, quote_declarations,
};
use crate::dom::{Document, DomError, NodeId};
use crate::models::{ContentData, StyleDefinition};

/// Build the quotation subtree for `data` in `style`
///
/// The returned container is detached; the caller inserts it.
pub fn generate(
    doc: &mut Document,
    data: &ContentData,
    style: &StyleDefinition,
) -> Result<NodeId, DomError> {
    let quote = &style.quote_style;

    let container = doc.create_element(QUOTE_TAG);
    doc.set_attribute(container, "class", QUOTE_CLASS)?;
    doc.set_attribute(container, "role", QUOTE_ROLE)?;
    doc.set_attribute(container, STYLE_ID_ATTR, style.id.as_str())?;
    for (prop, value) in quote_declarations(quote) {
        doc.set_style(container, prop, value)?;
    }

    let glyph = quote
        .before_content
        .as_deref()
        .map(decode_glyph)
        .filter(|g| !g.trim().is_empty());
    if let Some(glyph) = glyph {
        let positioned = glyph_is_positioned(quote);
        if positioned {
            doc.set_style(container, "position", "relative")?;
        }

        let span = doc.create_element("span");
        doc.set_attribute(span, "class", BEFORE_CLASS)?;
        doc.set_attribute(span, "aria-hidden", "true")?;
        if positioned {
            doc.set_style(span, "position", "absolute")?;
        }
        for (prop, value) in glyph_declarations(quote) {
            doc.set_style(span, prop, value)?;
        }
        let text = doc.create_text(glyph);
        doc.append_child(span, text)?;
        doc.append_child(container, span)?;
    }

    let body = doc.create_element("p");
    doc.set_attribute(body, "class", TEXT_CLASS)?;
    for (i, line) in data.text.trim().split('\n').enumerate() {
        if i > 0 {
            let br = doc.create_element("br");
            doc.append_child(body, br)?;
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !line.is_empty() {
            let text = doc.create_text(line);
            doc.append_child(body, text)?;
        }
    }
    doc.append_child(container, body)?;

    if data.has_attribution() {
        let footer = build_footer(doc, data, style)?;
        doc.append_child(container, footer)?;
    }

    Ok(container)
}

fn build_footer(
    doc: &mut Document,
    data: &ContentData,
    style: &StyleDefinition,
) -> Result<NodeId, DomError> {
    let footer_style = &style.footer_style;

    let footer = doc.create_element("footer");
    doc.set_attribute(footer, "class", FOOTER_CLASS)?;
    for (prop, value) in footer_declarations(footer_style) {
        doc.set_style(footer, prop, value)?;
    }

    let dash = doc.create_text(format!("{} ", FOOTER_DASH));
    doc.append_child(footer, dash)?;

    if let Some(source) = data.source() {
        let cite = doc.create_element("cite");
        doc.set_attribute(cite, "class", CITE_CLASS)?;
        for (prop, value) in cite_declarations(footer_style) {
            doc.set_style(cite, prop, value)?;
        }
        let text = doc.create_text(source);
        doc.append_child(cite, text)?;
        doc.append_child(footer, cite)?;

        if data.author().is_some() {
            let comma = doc.create_text(", ");
            doc.append_child(footer, comma)?;
        }
    }

    if let Some(author) = data.author() {
        let text = doc.create_text(author);
        doc.append_child(footer, text)?;
    }

    Ok(footer)
}

/// Outer HTML of [`generate`], built in a scratch document
pub fn to_html(data: &ContentData, style: &StyleDefinition) -> Result<String, DomError> {
    let mut doc = Document::new();
    let node = generate(&mut doc, data, style)?;
    Ok(doc.outer_html(node))
}

/// Recover the content of a quotation container
///
/// Returns `None` when `node` is not a `<blockquote>`. What comes back is
/// [`ContentData::normalized`] of what was rendered: surrounding whitespace
/// and `\r` before line breaks are not preserved. The attribution line is
/// split using the `<cite>` element; separators (`—`, commas, whitespace)
/// around the author are dropped, so an author or source that itself
/// contains `—` or `,` at its edges does not survive a round trip. Inner
/// commas (`Smith, John`) do.
pub fn extract(doc: &Document, node: NodeId) -> Option<ContentData> {
    if doc.tag(node) != Some(QUOTE_TAG) {
        return None;
    }

    let style_id = doc
        .attribute(node, STYLE_ID_ATTR)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_STYLE_ID);

    let descendants = doc.descendants(node);
    let footer = descendants
        .iter()
        .copied()
        .find(|&d| doc.has_class(d, FOOTER_CLASS))
        .or_else(|| descendants.iter().copied().find(|&d| doc.tag(d) == Some("footer")));

    let text = match descendants.iter().copied().find(|&d| doc.has_class(d, TEXT_CLASS)) {
        Some(body) => doc.text_content(body),
        None => doc
            .children(node)
            .iter()
            .filter(|&&child| Some(child) != footer && !doc.has_class(child, BEFORE_CLASS))
            .map(|&child| doc.text_content(child))
            .collect(),
    };

    let mut data = ContentData::new(text.trim()).with_style(style_id);

    if let Some(footer) = footer {
        let cite = doc
            .descendants(footer)
            .into_iter()
            .find(|&d| doc.tag(d) == Some("cite"));

        let source = cite.map(|c| doc.text_content(c));
        let author: String = doc
            .children(footer)
            .iter()
            .filter(|&&child| Some(child) != cite && !cite.is_some_and(|c| doc.contains(child, c)))
            .map(|&child| doc.text_content(child))
            .collect();

        data.source = source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        data.author = Some(trim_separators(&author).to_string()).filter(|a| !a.is_empty());
    }

    Some(data)
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '\u{2014}')
}

/// Nearest quotation container at or above `node`
pub fn find_enclosing(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.closest(node, |doc, id| {
        doc.tag(id) == Some(QUOTE_TAG)
            && (doc.has_class(id, QUOTE_CLASS) || doc.attribute(id, STYLE_ID_ATTR).is_some())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{preset, presets, FooterStyle, QuoteStyle};

    fn plain_style() -> StyleDefinition {
        StyleDefinition {
            id: "plain".to_string(),
            name: "Plain".to_string(),
            description: None,
            is_custom: true,
            quote_style: QuoteStyle {
                color: Some("#111".to_string()),
                ..Default::default()
            },
            footer_style: FooterStyle {
                color: Some("#777".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_generate_minimal_markup() {
        let html = to_html(&ContentData::new("Hello"), &plain_style()).unwrap();
        assert_eq!(
            html,
            r#"<blockquote class="aurora-quote" role="blockquote" data-style-id="plain" style="color: #111"><p class="aurora-quote__text">Hello</p></blockquote>"#
        );
    }

    #[test]
    fn test_footer_formats() {
        let style = plain_style();
        let both = ContentData::new("x").with_author("Ann").with_source("Book");
        let author_only = ContentData::new("x").with_author("Ann");
        let source_only = ContentData::new("x").with_source("Book").with_author("  ");

        let mut doc = Document::new();
        for (data, expected) in [
            (both, "\u{2014} Book, Ann"),
            (author_only, "\u{2014} Ann"),
            (source_only, "\u{2014} Book"),
        ] {
            let quote = generate(&mut doc, &data, &style).unwrap();
            let footer = doc.last_child(quote).unwrap();
            assert!(doc.has_class(footer, FOOTER_CLASS));
            assert_eq!(doc.text_content(footer), expected);
        }
    }

    #[test]
    fn test_glyph_is_decoded_and_positioned() {
        let elegant = preset("elegant").unwrap();
        let mut doc = Document::new();
        let quote = generate(&mut doc, &ContentData::new("x"), elegant).unwrap();

        let glyph = doc.first_child(quote).unwrap();
        assert!(doc.has_class(glyph, BEFORE_CLASS));
        assert_eq!(doc.attribute(glyph, "aria-hidden"), Some("true"));
        assert_eq!(doc.text_content(glyph), "\u{275D}");
        assert_eq!(doc.style(glyph, "position"), Some("absolute"));
        assert_eq!(doc.style(glyph, "top"), Some("-0.2em"));
        assert_eq!(doc.style(quote, "position"), Some("relative"));
    }

    #[test]
    fn test_no_glyph_without_before_content() {
        let modern = preset("modern").unwrap();
        let mut doc = Document::new();
        let quote = generate(&mut doc, &ContentData::new("x"), modern).unwrap();

        assert!(doc
            .descendants(quote)
            .iter()
            .all(|&d| !doc.has_class(d, BEFORE_CLASS)));
        assert!(doc.style(quote, "position").is_none());
        assert_eq!(doc.style(quote, "border-radius"), Some("8px"));
    }

    #[test]
    fn test_multiline_text_uses_line_breaks() {
        let html = to_html(&ContentData::new("one\ntwo"), &plain_style()).unwrap();
        assert!(html.contains("<p class=\"aurora-quote__text\">one<br>two</p>"));

        let mut doc = Document::new();
        let quote = doc.parse_fragment(&html).unwrap()[0];
        assert_eq!(extract(&doc, quote).unwrap().text, "one\ntwo");
    }

    #[test]
    fn test_round_trip_across_presets() {
        let data = ContentData::new("Stay hungry, stay foolish.")
            .with_author("Steve Jobs")
            .with_source("Stanford Commencement");

        for style in presets() {
            let data = data.clone().with_style(style.id.as_str());
            let html = to_html(&data, style).unwrap();

            let mut doc = Document::new();
            let quote = doc.parse_fragment(&html).unwrap()[0];
            assert_eq!(extract(&doc, quote), Some(data), "round trip in {}", style.id);
        }
    }

    fn round_trip(data: &ContentData) -> Option<ContentData> {
        let mut doc = Document::new();
        let quote = generate(&mut doc, data, &plain_style()).unwrap();
        extract(&doc, quote)
    }

    #[test]
    fn test_round_trip_returns_normalized_content() {
        let padded = ContentData::new("  padded text ")
            .with_author(" Ann ")
            .with_style("plain");
        let crlf = ContentData::new("a\r\nb").with_style("plain");

        for data in [padded, crlf] {
            assert_ne!(round_trip(&data).as_ref(), Some(&data));
            assert_eq!(round_trip(&data), Some(data.normalized()));
        }
    }

    #[test]
    fn test_round_trip_source_only() {
        let data = ContentData::new("x").with_source("The Book").with_style("plain");
        assert_eq!(round_trip(&data), Some(data));
    }

    #[test]
    fn test_round_trip_author_with_inner_comma() {
        let data = ContentData::new("x")
            .with_author("Smith, John")
            .with_source("Collected Letters")
            .with_style("plain");
        assert_eq!(round_trip(&data), Some(data));

        let author_only = ContentData::new("x").with_author("Smith, John").with_style("plain");
        assert_eq!(round_trip(&author_only), Some(author_only));
    }

    #[test]
    fn test_extract_rejects_other_elements() {
        let mut doc = Document::new();
        let p = doc.parse_fragment("<p>nope</p>").unwrap()[0];
        assert!(extract(&doc, p).is_none());
    }

    #[test]
    fn test_extract_foreign_blockquote() {
        let mut doc = Document::new();
        let quote = doc
            .parse_fragment("<blockquote>Plain words<footer>\u{2014} Someone</footer></blockquote>")
            .unwrap()[0];

        let data = extract(&doc, quote).unwrap();
        assert_eq!(data.text, "Plain words");
        assert_eq!(data.style_id, DEFAULT_STYLE_ID);
        assert_eq!(data.author.as_deref(), Some("Someone"));
        assert!(data.source.is_none());
    }

    #[test]
    fn test_find_enclosing() {
        let mut doc = Document::new();
        let root = doc.root();
        let quote = generate(&mut doc, &ContentData::new("inner"), &plain_style()).unwrap();
        doc.append_child(root, quote).unwrap();
        let plain = doc.parse_fragment("<blockquote><p>x</p></blockquote>").unwrap()[0];
        doc.append_child(root, plain).unwrap();

        let body = doc.children(quote)[0];
        let text = doc.first_child(body).unwrap();
        assert_eq!(find_enclosing(&doc, text), Some(quote));
        assert_eq!(find_enclosing(&doc, quote), Some(quote));

        let plain_text = doc.descendants(plain)[1];
        assert_eq!(find_enclosing(&doc, plain_text), None);
    }
}
