//! Typed capability registry
//!
//! Editor plugins look each other up by a closed set of capabilities rather
//! than by name. Each provider declares the options type it hands out, so a
//! lookup for [`QuoteCapability`] returns [`QuoteOptions`] without casting
//! at the call site.

use crate::models::StyleDefinition;
use crate::services::StyleService;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;

/// Insertable content kinds known to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCapability {
    Blockquote,
    Emoji,
    Table,
    Image,
    Video,
}

/// A plugin that provides one content capability
pub trait CapabilityProvider: Send + Sync + 'static {
    const KIND: ContentCapability;

    type Options: Clone;

    fn options(&self) -> Self::Options;
}

#[derive(Default)]
pub struct CapabilityRegistry {
    providers: HashMap<ContentCapability, Box<dyn Any + Send + Sync>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider of the same capability
    ///
    /// Returns `true` when an earlier provider was replaced.
    pub fn register<P: CapabilityProvider>(&mut self, provider: P) -> bool {
        let replaced = self.providers.insert(P::KIND, Box::new(provider)).is_some();
        if replaced {
            tracing::debug!("Replaced provider for {:?}", P::KIND);
        }
        replaced
    }

    /// Options of the registered provider of type `P`
    pub fn options<P: CapabilityProvider>(&self) -> Option<P::Options> {
        self.providers
            .get(&P::KIND)?
            .downcast_ref::<P>()
            .map(P::options)
    }

    pub fn is_registered(&self, capability: ContentCapability) -> bool {
        self.providers.contains_key(&capability)
    }
}

/// Options the blockquote capability exposes to other plugins
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteOptions {
    pub styles: Vec<StyleDefinition>,
    pub default_style_id: String,
}

/// Blockquote capability backed by the style service
#[derive(Clone)]
pub struct QuoteCapability {
    service: StyleService,
}

impl QuoteCapability {
    pub fn new(service: StyleService) -> Self {
        Self { service }
    }
}

impl CapabilityProvider for QuoteCapability {
    const KIND: ContentCapability = ContentCapability::Blockquote;

    type Options = QuoteOptions;

    fn options(&self) -> QuoteOptions {
        QuoteOptions {
            styles: self.service.all_styles(),
            default_style_id: self.service.config().default_style_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuroraConfig;
    use crate::db::MemoryStyleStore;
    use crate::models::presets;
    use std::sync::Arc;

    struct EmojiCapability;

    impl CapabilityProvider for EmojiCapability {
        const KIND: ContentCapability = ContentCapability::Emoji;
        type Options = Vec<&'static str>;

        fn options(&self) -> Vec<&'static str> {
            vec!["smile", "wave"]
        }
    }

    #[tokio::test]
    async fn test_typed_lookup() {
        let service = StyleService::new(Arc::new(MemoryStyleStore::new()), AuroraConfig::default())
            .await
            .unwrap();

        let mut registry = CapabilityRegistry::new();
        assert!(registry.options::<QuoteCapability>().is_none());

        assert!(!registry.register(QuoteCapability::new(service)));
        assert!(!registry.register(EmojiCapability));

        let quote = registry.options::<QuoteCapability>().unwrap();
        assert_eq!(quote.styles.len(), presets().len());
        assert_eq!(quote.default_style_id, "classic");
        assert_eq!(registry.options::<EmojiCapability>().unwrap(), vec!["smile", "wave"]);
        assert!(!registry.is_registered(ContentCapability::Table));
    }

    #[test]
    fn test_register_replaces_same_capability() {
        struct OtherEmoji;
        impl CapabilityProvider for OtherEmoji {
            const KIND: ContentCapability = ContentCapability::Emoji;
            type Options = ();
            fn options(&self) {}
        }

        let mut registry = CapabilityRegistry::new();
        registry.register(EmojiCapability);
        assert!(registry.register(OtherEmoji));

        // Lookup by the old provider type no longer matches the stored one
        assert!(registry.options::<EmojiCapability>().is_none());
        assert!(registry.options::<OtherEmoji>().is_some());
    }
}
