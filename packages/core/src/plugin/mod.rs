//! Plugin Façade
//!
//! - [`QuotePlugin`] - toolbar entry points (execute, edit, complete, destroy)
//! - [`dialog`] - contract with the host's quote dialog
//! - [`registry`] - typed lookup of insertion capabilities across plugins

pub mod dialog;
mod facade;
pub mod registry;


pub use dialog::{DialogHandle, DialogHost, DialogMode, DialogOutcome, DialogRequest};
pub use facade::{EditingContext, PluginError, QuotePlugin, QuotePluginOptions};
pub use registry::{
    CapabilityProvider, CapabilityRegistry, ContentCapability, QuoteCapability, QuoteOptions,
};
