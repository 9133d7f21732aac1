//! Constants shared with the host integration
//!
//! The markup class names are part of the persisted document format: quotes
//! inserted by older builds are re-parsed by [`crate::content::extract`], so
//! these values must never change.

/// Maximum number of live (non-deleted) custom styles per store
pub const MAX_CUSTOM_STYLES: usize = 100;

/// Fallback style when a quote references an unknown or deleted style
pub const DEFAULT_STYLE_ID: &str = "classic";

/// Version string written to (and required from) export envelopes
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Container element tag for a quotation
pub const QUOTE_TAG: &str = "blockquote";

/// Class identifying the quotation container
pub const QUOTE_CLASS: &str = "aurora-quote";

/// ARIA role set on the quotation container
pub const QUOTE_ROLE: &str = "blockquote";

/// Attribute carrying the style reference on the container
pub const STYLE_ID_ATTR: &str = "data-style-id";

/// Class of the decorative "before" glyph element
pub const BEFORE_CLASS: &str = "aurora-quote__before";

/// Class of the quoted text body element
pub const TEXT_CLASS: &str = "aurora-quote__text";

/// Class of the attribution footer element
pub const FOOTER_CLASS: &str = "aurora-quote__footer";

/// Class of the cited-source element inside the footer
pub const CITE_CLASS: &str = "aurora-quote__cite";

/// Separator that opens the attribution line
pub const FOOTER_DASH: &str = "\u{2014}";
