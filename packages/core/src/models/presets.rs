//! Built-in style presets
//!
//! Presets are listed in declaration order; that order is the order they
//! appear in the style picker and at the head of every style stream emission.

use crate::models::{FooterStyle, QuoteStyle, StyleDefinition};
use std::sync::LazyLock;

fn v(value: &str) -> Option<String> {
    Some(value.to_string())
}

static PRESETS: LazyLock<Vec<StyleDefinition>> = LazyLock::new(|| {
    vec![
        StyleDefinition {
            id: "classic".to_string(),
            name: "Classic".to_string(),
            description: Some("Serif italic quote with a left rule".to_string()),
            is_custom: false,
            quote_style: QuoteStyle {
                background: v("#f9f9f9"),
                border_left: v("4px solid #cccccc"),
                padding: v("1em 1.5em"),
                margin: v("1.5em 0"),
                color: v("#333333"),
                font_size: v("1.1em"),
                font_family: v("Georgia, serif"),
                font_style: v("italic"),
                line_height: v("1.6"),
                before_content: v("\"\\u201C\""),
                before_color: v("#cccccc"),
                before_font_size: v("3em"),
                before_opacity: v("0.6"),
                ..Default::default()
            },
            footer_style: FooterStyle {
                color: v("#666666"),
                font_size: v("0.9em"),
                font_style: v("normal"),
                text_align: v("right"),
                margin_top: v("0.5em"),
                cite_font_style: v("italic"),
                ..Default::default()
            },
        },
        StyleDefinition {
            id: "modern".to_string(),
            name: "Modern".to_string(),
            description: Some("Bold sans-serif card with an accent border".to_string()),
            is_custom: false,
            quote_style: QuoteStyle {
                background: v("#eef4ff"),
                border_left: v("6px solid #3b82f6"),
                border_radius: v("8px"),
                padding: v("1.25em 1.5em"),
                color: v("#1e293b"),
                font_size: v("1.15em"),
                font_family: v("'Inter', 'Helvetica Neue', Arial, sans-serif"),
                font_weight: v("500"),
                line_height: v("1.5"),
                box_shadow: v("0 2px 6px rgba(0, 0, 0, 0.08)"),
                ..Default::default()
            },
            footer_style: FooterStyle {
                color: v("#3b82f6"),
                font_size: v("0.85em"),
                font_weight: v("600"),
                text_align: v("left"),
                margin_top: v("0.75em"),
                cite_color: v("#1d4ed8"),
                ..Default::default()
            },
        },
        StyleDefinition {
            id: "elegant".to_string(),
            name: "Elegant".to_string(),
            description: Some("Centered serif quote with a large decorative mark".to_string()),
            is_custom: false,
            quote_style: QuoteStyle {
                background: v("#fffdf7"),
                padding: v("2em 2.5em"),
                margin: v("2em auto"),
                color: v("#4a3f35"),
                font_size: v("1.25em"),
                font_family: v("'Playfair Display', Georgia, serif"),
                font_style: v("italic"),
                line_height: v("1.7"),
                before_content: v("'\\u275D'"),
                before_color: v("#c9a227"),
                before_font_size: v("4em"),
                before_font_family: v("Georgia, serif"),
                before_opacity: v("0.35"),
                before_top: v("-0.2em"),
                before_left: v("0.1em"),
                ..Default::default()
            },
            footer_style: FooterStyle {
                color: v("#8c7b6b"),
                font_size: v("0.9em"),
                font_style: v("normal"),
                text_align: v("center"),
                margin_top: v("1em"),
                cite_font_style: v("italic"),
                cite_color: v("#c9a227"),
                ..Default::default()
            },
        },
        StyleDefinition {
            id: "minimal".to_string(),
            name: "Minimal".to_string(),
            description: Some("Plain text with a thin rule".to_string()),
            is_custom: false,
            quote_style: QuoteStyle {
                background: v("transparent"),
                border_left: v("2px solid #e5e5e5"),
                padding: v("0 1em"),
                color: v("#555555"),
                font_size: v("1em"),
                ..Default::default()
            },
            footer_style: FooterStyle {
                color: v("#999999"),
                font_size: v("0.85em"),
                ..Default::default()
            },
        },
        StyleDefinition {
            id: "highlight".to_string(),
            name: "Highlight".to_string(),
            description: Some("High-contrast callout for key statements".to_string()),
            is_custom: false,
            quote_style: QuoteStyle {
                background: v("#fff7d6"),
                border_left: v("5px solid #f59e0b"),
                border_radius: v("4px"),
                padding: v("1em 1.25em"),
                color: v("#78350f"),
                font_size: v("1.2em"),
                font_weight: v("700"),
                line_height: v("1.4"),
                before_content: v("\"!\""),
                before_color: v("#f59e0b"),
                before_font_size: v("2em"),
                ..Default::default()
            },
            footer_style: FooterStyle {
                color: v("#92400e"),
                font_size: v("0.9em"),
                font_weight: v("600"),
                text_align: v("right"),
                cite_font_weight: v("700"),
                ..Default::default()
            },
        },
    ]
});

/// All presets in declaration order
pub fn presets() -> &'static [StyleDefinition] {
    PRESETS.as_slice()
}

/// Look up a preset by id
pub fn preset(id: &str) -> Option<&'static StyleDefinition> {
    PRESETS.iter().find(|p| p.id == id)
}

pub fn is_preset_id(id: &str) -> bool {
    preset(id).is_some()
}

/// The fallback preset ("classic")
pub fn default_preset() -> &'static StyleDefinition {
    &PRESETS[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_STYLE_ID;

    #[test]
    fn test_five_presets_in_declaration_order() {
        let ids: Vec<&str> = presets().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["classic", "modern", "elegant", "minimal", "highlight"]);
    }

    #[test]
    fn test_presets_are_not_custom_and_valid() {
        for preset in presets() {
            assert!(!preset.is_custom, "{} must not be custom", preset.id);
            assert!(preset.validate().is_ok(), "{} must validate", preset.id);
        }
    }

    #[test]
    fn test_default_preset_is_classic() {
        assert_eq!(default_preset().id, DEFAULT_STYLE_ID);
        assert!(is_preset_id("elegant"));
        assert!(!is_preset_id("does-not-exist"));
    }
}
