//! Quote plugin façade
//!
//! Toolbar-facing entry points of the blockquote tool. The plugin owns at
//! most one open dialog; the selection captured when it opened travels with
//! it and is consumed when the dialog completes.

use crate::content::{extract, find_enclosing, generate};
use crate::dom::{CursorContext, Document, DomError, NodeId, Range, SelectionSnapshot};
use crate::insertion::{InsertionEngine, InsertionError};
use crate::models::{ContentData, ValidationError};
use crate::plugin::dialog::{DialogHandle, DialogHost, DialogMode, DialogOutcome, DialogRequest};
use crate::plugin::registry::{CapabilityRegistry, QuoteCapability};
use crate::services::{StyleService, StyleServiceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error(transparent)]
    Service(#[from] StyleServiceError),

    #[error(transparent)]
    Insertion(#[from] InsertionError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("Invalid quote content: {0}")]
    Validation(#[from] ValidationError),

    #[error("No quote dialog is open")]
    NoActiveDialog,

    #[error("Dialog returned no insertable content")]
    EmptyContent,

    #[error("Quote plugin has been destroyed")]
    Destroyed,
}

/// The document, caret and editing surface a command acts on
pub struct EditingContext<'a> {
    pub doc: &'a mut Document,
    pub cursor: &'a mut dyn CursorContext,
    pub surface: NodeId,
}

impl<'a> EditingContext<'a> {
    pub fn new(doc: &'a mut Document, cursor: &'a mut dyn CursorContext, surface: NodeId) -> Self {
        Self {
            doc,
            cursor,
            surface,
        }
    }
}

/// Options for [`QuotePlugin::execute`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotePluginOptions {
    /// Style pre-selected in the dialog (default: configured default style)
    pub initial_style_id: Option<String>,

    /// Pre-fill the quote text with the selected text
    pub prefill_selection: bool,
}

impl Default for QuotePluginOptions {
    fn default() -> Self {
        Self {
            initial_style_id: None,
            prefill_selection: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveMode {
    Insert,
    Edit { target: NodeId },
}

#[derive(Debug)]
struct ActiveDialog {
    handle: DialogHandle,
    mode: ActiveMode,
    snapshot: Option<SelectionSnapshot>,
}

pub struct QuotePlugin {
    service: StyleService,
    engine: InsertionEngine,
    dialogs: Box<dyn DialogHost>,
    active: Option<ActiveDialog>,
    destroyed: bool,
}

impl QuotePlugin {
    pub fn new(service: StyleService, dialogs: Box<dyn DialogHost>) -> Self {
        Self {
            service,
            engine: InsertionEngine::new(),
            dialogs,
            active: None,
            destroyed: false,
        }
    }

    /// Use a custom insertion engine (e.g. host legacy editing commands)
    pub fn with_engine(mut self, engine: InsertionEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Expose the blockquote capability to other plugins
    pub fn register(&self, registry: &mut CapabilityRegistry) {
        registry.register(QuoteCapability::new(self.service.clone()));
    }

    pub fn has_open_dialog(&self) -> bool {
        self.active.is_some()
    }

    /// Open the insert dialog
    ///
    /// Captures the selection first (opening the dialog moves focus away)
    /// and pre-fills the quote text with the selected text. Returns `true`
    /// once the dialog is shown; `false` when another dialog is already open
    /// or the plugin was destroyed.
    pub fn execute(&mut self, ctx: &mut EditingContext<'_>, options: &QuotePluginOptions) -> bool {
        if !self.can_open("execute") {
            return false;
        }

        let snapshot = self.engine.snapshot(&*ctx.cursor, ctx.doc, ctx.surface);
        let prefill = match (&snapshot, options.prefill_selection) {
            (Some(snapshot), true) => ctx.doc.range_text(snapshot.range()).trim().to_string(),
            _ => String::new(),
        };
        let style_id = options
            .initial_style_id
            .clone()
            .unwrap_or_else(|| self.service.config().default_style_id.clone());

        self.open(
            DialogMode::Insert,
            ContentData::new(prefill).with_style(style_id),
            ActiveMode::Insert,
            snapshot,
        );
        true
    }

    /// Whether the caret sits inside a quotation on this surface
    pub fn is_active(&self, ctx: &EditingContext<'_>) -> bool {
        ctx.cursor
            .range()
            .filter(|range| ctx.doc.contains(ctx.surface, range.start.node))
            .and_then(|range| find_enclosing(&*ctx.doc, range.start.node))
            .is_some()
    }

    /// Re-open the dialog for the quotation containing `node`
    ///
    /// On confirm the quotation is replaced in place. Returns `false` when
    /// `node` is not inside a quotation, a dialog is already open, or the
    /// plugin was destroyed.
    pub fn edit_quote(&mut self, ctx: &mut EditingContext<'_>, node: NodeId) -> bool {
        if !self.can_open("edit_quote") {
            return false;
        }

        let Some(target) = find_enclosing(ctx.doc, node) else {
            tracing::debug!("Node {} is not inside a quotation", node);
            return false;
        };
        let Some(data) = extract(ctx.doc, target) else {
            tracing::warn!("Could not read quotation {}", target);
            return false;
        };

        let snapshot = self.engine.snapshot(&*ctx.cursor, ctx.doc, ctx.surface);
        self.open(DialogMode::Edit, data, ActiveMode::Edit { target }, snapshot);
        true
    }

    fn can_open(&self, operation: &str) -> bool {
        if self.destroyed {
            tracing::debug!("Ignoring {} on destroyed quote plugin", operation);
            return false;
        }
        if self.active.is_some() {
            tracing::debug!("Quote dialog already open, ignoring {}", operation);
            return false;
        }
        true
    }

    fn open(
        &mut self,
        mode: DialogMode,
        initial: ContentData,
        active_mode: ActiveMode,
        snapshot: Option<SelectionSnapshot>,
    ) {
        let handle = self.dialogs.open(DialogRequest {
            mode,
            initial,
            styles: self.service.all_styles(),
        });
        self.active = Some(ActiveDialog {
            handle,
            mode: active_mode,
            snapshot,
        });
    }

    /// Finish the open dialog with the user's decision
    ///
    /// The dialog is closed in every case. `Cancel` leaves the document
    /// untouched and returns `Ok(None)`; otherwise the placed quotation is
    /// returned.
    pub async fn complete(
        &mut self,
        ctx: &mut EditingContext<'_>,
        outcome: DialogOutcome,
    ) -> Result<Option<NodeId>, PluginError> {
        if self.destroyed {
            return Err(PluginError::Destroyed);
        }
        let active = self.active.take().ok_or(PluginError::NoActiveDialog)?;
        self.dialogs.close(active.handle);

        let node = match outcome {
            DialogOutcome::Cancel => {
                tracing::debug!("Quote dialog cancelled");
                return Ok(None);
            }
            DialogOutcome::Insert { html } => {
                let nodes = ctx.doc.parse_fragment(&html)?;
                nodes
                    .into_iter()
                    .find(|&n| ctx.doc.is_element(n))
                    .ok_or(PluginError::EmptyContent)?
            }
            DialogOutcome::Confirm(data) => self.render(ctx.doc, &data).await?,
        };

        self.place(ctx, active, node).map(Some)
    }

    /// Render and insert a quotation at the current selection, without a
    /// dialog
    pub async fn insert_quote(
        &mut self,
        ctx: &mut EditingContext<'_>,
        data: &ContentData,
    ) -> Result<NodeId, PluginError> {
        if self.destroyed {
            return Err(PluginError::Destroyed);
        }
        let node = self.render(ctx.doc, data).await?;
        let snapshot = self.engine.snapshot(&*ctx.cursor, ctx.doc, ctx.surface);
        let report = self
            .engine
            .insert(ctx.doc, ctx.cursor, ctx.surface, snapshot, node)?;
        Ok(report.inserted)
    }

    async fn render(&self, doc: &mut Document, data: &ContentData) -> Result<NodeId, PluginError> {
        data.validate()?;
        let style = self.service.resolve_style(&data.style_id).await?;
        Ok(generate(doc, data, &style)?)
    }

    fn place(
        &self,
        ctx: &mut EditingContext<'_>,
        active: ActiveDialog,
        node: NodeId,
    ) -> Result<NodeId, PluginError> {
        if let ActiveMode::Edit { target } = active.mode {
            if ctx.doc.is_connected(target) {
                ctx.doc.replace(target, node)?;
                let after = ctx.doc.point_after(node)?;
                ctx.cursor.focus(ctx.surface);
                ctx.cursor.set_range(Range::collapsed(after));
                return Ok(node);
            }
            tracing::warn!("Edited quotation {} was removed, inserting instead", target);
        }

        let report = self
            .engine
            .insert(ctx.doc, ctx.cursor, ctx.surface, active.snapshot, node)?;
        Ok(report.inserted)
    }

    /// Close any open dialog and stop accepting commands
    ///
    /// Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if let Some(active) = self.active.take() {
            self.dialogs.close(active.handle);
        }
        if !self.destroyed {
            tracing::debug!("Quote plugin destroyed");
            self.destroyed = true;
        }
    }
}

impl std::fmt::Debug for QuotePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotePlugin")
            .field("active", &self.active)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
