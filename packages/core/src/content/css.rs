//! CSS subset
//!
//! Maps style fields to CSS declarations (for inline rendering and stylesheet
//! export) and reads a best-effort subset of CSS back into a style. Nesting,
//! media queries, custom properties and `var()` are ignored.

use crate::models::{FooterStyle, QuoteStyle, StyleDefinition};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// `@media ... { a { } b { } }` and other at-rule blocks, one nesting level
static AT_RULE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[^{;]*\{(?:[^{}]*\{[^{}]*\})*[^{}]*\}").unwrap());

static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap());

/// `\u201C` (JavaScript-style) escapes as stored by the style editor
static JS_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u\{?([0-9a-fA-F]{4,6})\}?").unwrap());

/// `\201C ` (CSS-style) escapes, optionally followed by one space
static CSS_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([0-9a-fA-F]{1,6}) ?").unwrap());

/// Inline declarations for the quote container
pub fn quote_declarations(style: &QuoteStyle) -> Vec<(&'static str, &str)> {
    let fields = [
        ("background", &style.background),
        ("border-left", &style.border_left),
        ("border-radius", &style.border_radius),
        ("padding", &style.padding),
        ("margin", &style.margin),
        ("color", &style.color),
        ("font-size", &style.font_size),
        ("font-family", &style.font_family),
        ("font-style", &style.font_style),
        ("font-weight", &style.font_weight),
        ("line-height", &style.line_height),
        ("box-shadow", &style.box_shadow),
    ];
    present(&fields)
}

/// Inline declarations for the decorative glyph
pub fn glyph_declarations(style: &QuoteStyle) -> Vec<(&'static str, &str)> {
    let fields = [
        ("color", &style.before_color),
        ("font-size", &style.before_font_size),
        ("font-family", &style.before_font_family),
        ("opacity", &style.before_opacity),
        ("top", &style.before_top),
        ("left", &style.before_left),
    ];
    present(&fields)
}

/// Inline declarations for the attribution footer
pub fn footer_declarations(style: &FooterStyle) -> Vec<(&'static str, &str)> {
    let fields = [
        ("color", &style.color),
        ("font-size", &style.font_size),
        ("font-style", &style.font_style),
        ("font-weight", &style.font_weight),
        ("text-align", &style.text_align),
        ("margin-top", &style.margin_top),
    ];
    present(&fields)
}

/// Inline declarations for the cited-source element
pub fn cite_declarations(style: &FooterStyle) -> Vec<(&'static str, &str)> {
    let fields = [
        ("color", &style.cite_color),
        ("font-style", &style.cite_font_style),
        ("font-weight", &style.cite_font_weight),
    ];
    present(&fields)
}

fn present<'a>(fields: &[(&'static str, &'a Option<String>)]) -> Vec<(&'static str, &'a str)> {
    fields
        .iter()
        .filter_map(|(prop, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (*prop, v))
        })
        .collect()
}

/// Whether the glyph is absolutely positioned (needs a positioned container)
pub fn glyph_is_positioned(style: &QuoteStyle) -> bool {
    [&style.before_top, &style.before_left]
        .into_iter()
        .any(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
}

/// Resolve a stored glyph value to the text to render
///
/// Strips one pair of surrounding quotes and decodes `\uXXXX` and CSS
/// `\XXXX` escapes: `"\u201C"` renders as `“`.
pub fn decode_glyph(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| {
            trimmed
                .strip_prefix(q)
                .and_then(|rest| rest.strip_suffix(q))
        })
        .unwrap_or(trimmed);

    let decoded = JS_ESCAPE.replace_all(unquoted, |caps: &regex::Captures| {
        decode_code_point(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    CSS_ESCAPE
        .replace_all(&decoded, |caps: &regex::Captures| {
            decode_code_point(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_code_point(hex: &str) -> Option<String> {
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleTarget {
    Quote,
    Glyph,
    Footer,
    Cite,
}

fn classify(selector: &str) -> RuleTarget {
    let selector = selector.to_ascii_lowercase();
    if selector.contains(":before") {
        RuleTarget::Glyph
    } else if selector.contains("cite") {
        RuleTarget::Cite
    } else if selector.contains("footer") {
        RuleTarget::Footer
    } else {
        RuleTarget::Quote
    }
}

/// Read quote and footer styles from CSS text
///
/// Accepts rule blocks (`blockquote { ... }`, `blockquote::before { ... }`,
/// `footer { ... }`, `cite { ... }`) or a bare declaration list, which is
/// applied to the quote container. Unknown properties are skipped.
pub fn parse_stylesheet(css: &str) -> (QuoteStyle, FooterStyle) {
    let mut quote = QuoteStyle::default();
    let mut footer = FooterStyle::default();

    let css = COMMENT.replace_all(css, "");
    let css = AT_RULE_BLOCK.replace_all(&css, "");

    let mut saw_rule = false;
    for caps in RULE.captures_iter(&css) {
        saw_rule = true;
        let target = classify(caps[1].trim());
        for (prop, value) in declarations(&caps[2]) {
            apply(target, &prop, value, &mut quote, &mut footer);
        }
    }
    if !saw_rule {
        for (prop, value) in declarations(&css) {
            apply(RuleTarget::Quote, &prop, value, &mut quote, &mut footer);
        }
    }

    (quote, footer)
}

fn declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            if prop.is_empty() || prop.starts_with("--") || value.is_empty() || value.contains("var(")
            {
                return None;
            }
            Some((prop, value.to_string()))
        })
        .collect()
}

fn apply(
    target: RuleTarget,
    prop: &str,
    value: String,
    quote: &mut QuoteStyle,
    footer: &mut FooterStyle,
) {
    let slot = match (target, prop) {
        (RuleTarget::Quote, "background" | "background-color") => &mut quote.background,
        (RuleTarget::Quote, "border-left") => &mut quote.border_left,
        (RuleTarget::Quote, "border-radius") => &mut quote.border_radius,
        (RuleTarget::Quote, "padding") => &mut quote.padding,
        (RuleTarget::Quote, "margin") => &mut quote.margin,
        (RuleTarget::Quote, "color") => &mut quote.color,
        (RuleTarget::Quote, "font-size") => &mut quote.font_size,
        (RuleTarget::Quote, "font-family") => &mut quote.font_family,
        (RuleTarget::Quote, "font-style") => &mut quote.font_style,
        (RuleTarget::Quote, "font-weight") => &mut quote.font_weight,
        (RuleTarget::Quote, "line-height") => &mut quote.line_height,
        (RuleTarget::Quote, "box-shadow") => &mut quote.box_shadow,

        (RuleTarget::Glyph, "content") => &mut quote.before_content,
        (RuleTarget::Glyph, "color") => &mut quote.before_color,
        (RuleTarget::Glyph, "font-size") => &mut quote.before_font_size,
        (RuleTarget::Glyph, "font-family") => &mut quote.before_font_family,
        (RuleTarget::Glyph, "opacity") => &mut quote.before_opacity,
        (RuleTarget::Glyph, "top") => &mut quote.before_top,
        (RuleTarget::Glyph, "left") => &mut quote.before_left,

        (RuleTarget::Footer, "color") => &mut footer.color,
        (RuleTarget::Footer, "font-size") => &mut footer.font_size,
        (RuleTarget::Footer, "font-style") => &mut footer.font_style,
        (RuleTarget::Footer, "font-weight") => &mut footer.font_weight,
        (RuleTarget::Footer, "text-align") => &mut footer.text_align,
        (RuleTarget::Footer, "margin-top") => &mut footer.margin_top,

        (RuleTarget::Cite, "color") => &mut footer.cite_color,
        (RuleTarget::Cite, "font-style") => &mut footer.cite_font_style,
        (RuleTarget::Cite, "font-weight") => &mut footer.cite_font_weight,

        _ => {
            tracing::debug!("Ignoring unsupported CSS property '{}'", prop);
            return;
        }
    };
    *slot = Some(value);
}

/// Render a style as a standalone stylesheet scoped to its `data-style-id`
///
/// The output parses back through [`parse_stylesheet`] to the same fields.
pub fn to_stylesheet(style: &StyleDefinition) -> String {
    let scope = format!(
        ".{}[{}=\"{}\"]",
        crate::constants::QUOTE_CLASS,
        crate::constants::STYLE_ID_ATTR,
        style.id
    );
    let q = &style.quote_style;
    let f = &style.footer_style;

    let mut glyph = Vec::new();
    if let Some(content) = q.before_content.as_deref() {
        glyph.push(("content", content));
    }
    glyph.extend(glyph_declarations(q));

    let blocks = [
        (scope.clone(), quote_declarations(q)),
        (format!("{}::before", scope), glyph),
        (format!("{} footer", scope), footer_declarations(f)),
        (format!("{} footer cite", scope), cite_declarations(f)),
    ];

    let mut out = String::new();
    for (selector, decls) in blocks {
        if decls.is_empty() {
            continue;
        }
        out.push_str(&selector);
        out.push_str(" {\n");
        for (prop, value) in decls {
            out.push_str(&format!("  {}: {};\n", prop, value));
        }
        out.push_str("}\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::presets;

    #[test]
    fn test_only_configured_fields_are_emitted() {
        let style = QuoteStyle {
            color: Some("#123".to_string()),
            padding: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(quote_declarations(&style), vec![("color", "#123")]);
        assert!(glyph_declarations(&style).is_empty());
    }

    #[test]
    fn test_blank_offsets_do_not_position_glyph() {
        let mut style = QuoteStyle {
            before_content: Some("\"\\201C\"".to_string()),
            before_top: Some(" ".to_string()),
            before_left: Some(String::new()),
            ..Default::default()
        };
        assert!(!glyph_is_positioned(&style));

        style.before_left = Some("-0.2em".to_string());
        assert!(glyph_is_positioned(&style));
    }

    #[test]
    fn test_decode_glyph() {
        assert_eq!(decode_glyph("\"\\u201C\""), "\u{201C}");
        assert_eq!(decode_glyph("'\\275D'"), "\u{275D}");
        assert_eq!(decode_glyph("\"!\""), "!");
        assert_eq!(decode_glyph("\u{00AB}"), "\u{00AB}");
        assert_eq!(decode_glyph("\"\""), "");
    }

    #[test]
    fn test_parse_rule_blocks() {
        let css = r#"
            /* quote card */
            .q { background-color: #fff; color: #222 !important; font-size: 1em; --accent: red; }
            .q::before { content: "\201C"; opacity: .4; }
            .q footer { color: #777; text-align: right; }
            .q footer cite { font-style: italic; }
            @media (max-width: 600px) { .q { padding: 0; } }
        "#;

        let (quote, footer) = parse_stylesheet(css);

        assert_eq!(quote.background.as_deref(), Some("#fff"));
        assert_eq!(quote.color.as_deref(), Some("#222"));
        assert_eq!(quote.before_content.as_deref(), Some("\"\\201C\""));
        assert_eq!(quote.before_opacity.as_deref(), Some(".4"));
        assert!(quote.padding.is_none());
        assert_eq!(footer.text_align.as_deref(), Some("right"));
        assert_eq!(footer.cite_font_style.as_deref(), Some("italic"));
    }

    #[test]
    fn test_bare_declarations_apply_to_quote() {
        let (quote, footer) = parse_stylesheet("color: red; margin: 0");
        assert_eq!(quote.color.as_deref(), Some("red"));
        assert_eq!(quote.margin.as_deref(), Some("0"));
        assert_eq!(footer, FooterStyle::default());
    }

    #[test]
    fn test_stylesheet_reparses_to_same_fields() {
        for preset in presets() {
            let css = to_stylesheet(preset);
            let (quote, footer) = parse_stylesheet(&css);
            assert_eq!(quote, preset.quote_style, "quote fields of {}", preset.id);
            assert_eq!(footer, preset.footer_style, "footer fields of {}", preset.id);
        }
    }
}
