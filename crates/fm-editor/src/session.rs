//! Edit session controller.
//!
//! `EditorSession` owns everything one open document needs: the live
//! document, its undo history, page geometry, the active tool, and the drag
//! controller. The host UI forwards input and commands here and redraws
//! from `overlay()` afterwards.
//!
//! Every committed edit goes through the same path: touch the document,
//! record it in history, then upsert it into the saved-documents list.

use crate::backend::{ExportedPdf, LoadGate, LoadTicket, LoadedPdf, PdfBackend, RenderedPage};
use crate::config::EditorConfig;
use crate::drag::{DragController, DragEvent, DragOptions};
use crate::error::EditError;
use crate::history::HistoryManager;
use crate::input::{InputEvent, PointerAction};
use crate::tools::{self, TextProperties, ToolInput, ToolKind};
use fm_core::model::{Document, FieldPatch, FieldSpec};
use fm_core::{DocumentId, FieldError, FieldId, PageGeometry, Point, Rect};
use fm_render::{OverlayBox, hit_test, overlay_current_page};
use fm_store::{KeyValueStore, KvGateway, PersistenceGateway};

/// Positions closer than this (PDF units) count as unmoved.
const MOVE_EPSILON: f64 = 1e-6;

/// Result of a click with the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed(FieldId),
    /// Signature tool: the host must collect a signature and call
    /// `add_signature`.
    NeedsSignature,
    /// Image tool: the host must pick an image and call `add_image`.
    NeedsImage,
    /// No tool is active.
    NoTool,
}

/// Notifications from pointer handling, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    DragStarted(FieldId),
    /// Live overlay position in canvas pixels; the document is unchanged
    /// until the drag ends.
    DragMoved { id: FieldId, left: f64, top: f64 },
    /// Drag released. `moved` is false when the field ended where it began
    /// (or was deleted mid-drag), in which case nothing was committed.
    DragEnded { id: FieldId, moved: bool },
    DragCancelled(FieldId),
    /// Press on bare page cleared the selection.
    Deselected,
}

pub struct EditorSession<G: PersistenceGateway> {
    config: EditorConfig,
    gateway: G,
    document: Option<Document>,
    history: HistoryManager,
    geometry: PageGeometry,
    /// 0 while unknown (e.g. a saved document opened before its PDF).
    page_count: u32,
    active_tool: Option<ToolKind>,
    text_props: TextProperties,
    drag: DragController<FieldId>,
    selected: Option<FieldId>,
    loads: LoadGate,
}

impl<G: PersistenceGateway> EditorSession<G> {
    pub fn new(config: EditorConfig, gateway: G) -> Self {
        let drag = DragController::new(DragOptions {
            grid_size: config.grid_size,
            constrain_to_parent: config.constrain_drag,
        });
        Self {
            history: HistoryManager::new(config.max_history),
            geometry: PageGeometry::new(config.default_scale),
            text_props: TextProperties::from_config(&config),
            config,
            gateway,
            document: None,
            page_count: 0,
            active_tool: None,
            drag,
            selected: None,
            loads: LoadGate::new(),
        }
    }

    /// Startup: reload persisted history and return the most recently
    /// updated saved document, if any. The caller decides whether to open it.
    pub fn restore(&mut self) -> Option<Document> {
        self.history.load(&mut self.gateway);
        self.gateway.most_recent_document()
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Overlay boxes for the current page, selected field on top.
    pub fn overlay(&self) -> Vec<OverlayBox> {
        match &self.document {
            Some(doc) => overlay_current_page(doc, &self.geometry, self.selected),
            None => Vec::new(),
        }
    }

    // ─── Documents ───────────────────────────────────────────────────────

    pub fn new_document(&mut self, name: &str, page_count: u32) -> Result<&Document, EditError> {
        if page_count == 0 {
            return Err(EditError::UserInput("a PDF needs at least one page".to_string()));
        }
        let doc = Document::new(name);
        log::info!("new document {} ({name}, {page_count} pages)", doc.id);
        self.reset_view();
        // Undo never crosses into a different PDF.
        self.history.clear(&mut self.gateway);
        self.page_count = page_count;
        Ok(self.commit(doc))
    }

    /// Reserve a ticket for an asynchronous PDF load. Issuing a new ticket
    /// invalidates every earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.loads.issue()
    }

    /// Finish a load started with `begin_load`. Returns `Ok(false)` and
    /// changes nothing when a newer load has been started since.
    pub fn complete_load(&mut self, ticket: LoadTicket, pdf: LoadedPdf) -> Result<bool, EditError> {
        if !self.loads.is_current(ticket) {
            log::warn!("dropping stale load of {}", pdf.name);
            return Ok(false);
        }
        self.new_document(&pdf.name, pdf.page_count)?;
        let scale = self.geometry.scale;
        self.page_rendered(pdf.page_width * scale, pdf.page_height * scale);
        Ok(true)
    }

    /// Make `doc` the live document without recording history.
    pub fn open_document(&mut self, doc: Document) {
        log::info!("opening document {} ({})", doc.id, doc.name);
        self.reset_view();
        self.page_count = 0;
        self.document = Some(doc);
    }

    pub fn open_saved(&mut self, id: &DocumentId) -> Result<&Document, EditError> {
        let doc = self
            .gateway
            .get_document(id)
            .ok_or_else(|| EditError::NotFound(format!("saved document {id}")))?;
        self.open_document(doc);
        self.document.as_ref().ok_or_else(EditError::no_document)
    }

    /// Page count reported by the backend once the PDF bytes are available.
    pub fn set_page_count(&mut self, page_count: u32) {
        self.page_count = page_count;
    }

    pub fn saved_documents(&mut self) -> Vec<Document> {
        self.gateway.list_documents()
    }

    pub fn search_saved(&mut self, query: &str) -> Vec<Document> {
        self.gateway.search_documents(query)
    }

    pub fn delete_saved(&mut self, id: &DocumentId) -> Result<(), EditError> {
        self.gateway.delete_document(id)?;
        log::info!("deleted saved document {id}");
        Ok(())
    }

    pub fn clear_saved(&mut self) -> Result<(), EditError> {
        self.gateway.clear_all_documents()?;
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> Result<(), EditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditError::UserInput("document name is empty".to_string()));
        }
        let next = self.require_document()?.renamed(name);
        self.commit(next);
        Ok(())
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Change zoom. A rendered page is rescaled in place until the next
    /// render.
    pub fn set_scale(&mut self, scale: f64) -> Result<(), EditError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EditError::UserInput(format!("scale must be positive, got {scale}")));
        }
        let ratio = scale / self.geometry.scale;
        self.geometry.page_width_px *= ratio;
        self.geometry.page_height_px *= ratio;
        self.geometry.scale = scale;
        self.cancel_drag();
        Ok(())
    }

    /// Record the raster size of the page now on screen.
    pub fn page_rendered(&mut self, width_px: f64, height_px: f64) {
        self.geometry.page_width_px = width_px;
        self.geometry.page_height_px = height_px;
        log::debug!(
            "page rendered at {width_px}x{height_px}px (scale {})",
            self.geometry.scale
        );
    }

    pub fn render_current_page<B: PdfBackend>(
        &mut self,
        backend: &mut B,
    ) -> Result<RenderedPage, EditError> {
        let page = self.require_document()?.current_page.saturating_sub(1);
        if self.page_count == 0 {
            self.page_count = backend.page_count();
        }
        let rendered = backend.render_page(page, self.geometry.scale)?;
        self.page_rendered(rendered.width, rendered.height);
        Ok(rendered)
    }

    /// Canvas top-left in client coordinates.
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.geometry.canvas_origin = origin;
    }

    pub fn change_page(&mut self, page: u32) -> Result<(), EditError> {
        if page == 0 || (self.page_count > 0 && page > self.page_count) {
            return Err(EditError::UserInput(format!(
                "page {page} is out of range (1..={})",
                self.page_count
            )));
        }
        let next = self.require_document()?.with_current_page(page);
        self.cancel_drag();
        self.selected = None;
        self.commit(next);
        Ok(())
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    pub fn select_tool(&mut self, tool: Option<ToolKind>) {
        self.active_tool = tool;
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.active_tool
    }

    pub fn text_properties(&self) -> &TextProperties {
        &self.text_props
    }

    pub fn set_text_properties(&mut self, props: TextProperties) -> Result<(), EditError> {
        self.text_props = props.validated()?;
        Ok(())
    }

    /// Click on the page with the active tool at a client position.
    pub fn place_at(&mut self, client: Point, input: ToolInput) -> Result<Placement, EditError> {
        let page = self.require_document()?.current_page.saturating_sub(1);
        let Some(tool) = self.active_tool else {
            return Ok(Placement::NoTool);
        };
        let at = self.geometry.screen_to_pdf(client);
        match (tool, input) {
            (ToolKind::Text, ToolInput::Text(text)) => self.add_text(&text, at, page).map(Placement::Placed),
            (ToolKind::Text, ToolInput::None) => Err(FieldError::EmptyText.into()),
            (ToolKind::Checkbox, _) => self.add_checkbox(true, at, page).map(Placement::Placed),
            (ToolKind::Signature, _) => Ok(Placement::NeedsSignature),
            (ToolKind::Image, _) => Ok(Placement::NeedsImage),
        }
    }

    // ─── Fields ──────────────────────────────────────────────────────────

    /// Add a text field anchored at `at` (PDF space) on a 0-based page.
    pub fn add_text(&mut self, text: &str, at: Point, page: u32) -> Result<FieldId, EditError> {
        let spec = tools::text_field(text, at, page, &self.text_props);
        self.add_field(spec)
    }

    pub fn add_checkbox(&mut self, checked: bool, at: Point, page: u32) -> Result<FieldId, EditError> {
        let spec = tools::checkbox_field(checked, at, page, &self.config);
        self.add_field(spec)
    }

    /// Add a signature image on the current page at the default position.
    pub fn add_signature(&mut self, data_url: &str) -> Result<FieldId, EditError> {
        let page = self.require_document()?.current_page.saturating_sub(1);
        let spec = tools::signature_field(data_url, page, &self.config);
        self.add_field(spec)
    }

    pub fn add_image(
        &mut self,
        sources: Vec<String>,
        at: Point,
        page: u32,
        width: f64,
        height: f64,
    ) -> Result<FieldId, EditError> {
        if sources.is_empty() {
            return Err(EditError::UserInput("image field needs a source".to_string()));
        }
        self.add_field(tools::image_field(sources, at, page, width, height))
    }

    pub fn add_field(&mut self, spec: FieldSpec) -> Result<FieldId, EditError> {
        let doc = self.require_document()?;
        spec.validate(self.known_page_count())?;
        let (next, id) = doc.add_field(spec);
        self.commit(next);
        Ok(id)
    }

    /// Apply `patch` to a field. Unknown IDs are a silent no-op.
    pub fn update_field(&mut self, id: FieldId, patch: &FieldPatch) -> Result<(), EditError> {
        let doc = self.require_document()?;
        let Some(field) = doc.field(id) else {
            log::debug!("update of missing field {id} ignored");
            return Ok(());
        };
        patch.validate(field, self.known_page_count())?;
        let next = doc.update_field(id, patch);
        self.commit(next);
        Ok(())
    }

    /// Remove a field, cancelling any drag of it. Returns whether it existed.
    pub fn delete_field(&mut self, id: FieldId) -> Result<bool, EditError> {
        let doc = self.require_document()?;
        if doc.field(id).is_none() {
            return Ok(false);
        }
        let next = doc.remove_field(id);
        if self.drag.cancel_if(|dragged| *dragged == id) {
            log::debug!("drag of {id} cancelled by delete");
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit(next);
        Ok(true)
    }

    pub fn clear_fields(&mut self) -> Result<(), EditError> {
        let next = self.require_document()?.clear_fields();
        self.cancel_drag();
        self.selected = None;
        self.commit(next);
        Ok(())
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent) -> Option<SessionEvent> {
        match event.action()? {
            PointerAction::Press(p) => self.press(p),
            PointerAction::Move(p) => {
                let id = self.drag.payload().copied()?;
                let canvas = self.geometry.screen_to_canvas(p);
                match self.drag.update(canvas)? {
                    DragEvent::Moved { x, y } => Some(SessionEvent::DragMoved { id, left: x, top: y }),
                    _ => None,
                }
            }
            PointerAction::Release => match self.drag.end()? {
                DragEvent::Ended { x, y, payload } => Some(self.finish_drag(payload, x, y)),
                _ => None,
            },
            PointerAction::Cancel => {
                let id = self.drag.payload().copied()?;
                self.drag.cancel();
                log::debug!("drag of {id} cancelled by focus loss");
                Some(SessionEvent::DragCancelled(id))
            }
        }
    }

    fn press(&mut self, client: Point) -> Option<SessionEvent> {
        let doc = self.document.as_ref()?;
        let canvas = self.geometry.screen_to_canvas(client);
        let Some(id) = hit_test(doc, &self.geometry, canvas) else {
            return self.selected.take().map(|_| SessionEvent::Deselected);
        };
        let field = doc.field(id)?;
        let element = self.geometry.field_rect(field);
        let parent = (self.config.constrain_drag && self.geometry.is_rendered()).then(|| {
            Rect::new(0.0, 0.0, self.geometry.page_width_px, self.geometry.page_height_px)
        });
        self.selected = Some(id);
        match self.drag.begin(canvas, element, parent, id) {
            DragEvent::Started(id) => Some(SessionEvent::DragStarted(id)),
            _ => None,
        }
    }

    /// Commit a released drag at canvas position (`left`, `top`).
    fn finish_drag(&mut self, id: FieldId, left: f64, top: f64) -> SessionEvent {
        let Some(field) = self.document.as_ref().and_then(|d| d.field(id)) else {
            log::debug!("drag ended on missing field {id}");
            return SessionEvent::DragEnded { id, moved: false };
        };
        let to = self.geometry.canvas_to_pdf(left, top, field.height);
        if (to.x - field.x).abs() < MOVE_EPSILON && (to.y - field.y).abs() < MOVE_EPSILON {
            return SessionEvent::DragEnded { id, moved: false };
        }
        let moved = self.update_field(id, &FieldPatch::position(to.x, to.y)).is_ok();
        SessionEvent::DragEnded { id, moved }
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(doc) = self.history.undo(&mut self.gateway) else {
            return false;
        };
        self.restore_snapshot(doc);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(doc) = self.history.redo(&mut self.gateway) else {
            return false;
        };
        self.restore_snapshot(doc);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Burn every field into the PDF and return the bytes as `<name>.pdf`.
    pub fn export<B: PdfBackend>(&self, backend: &mut B) -> Result<ExportedPdf, EditError> {
        let doc = self.require_document()?;
        if doc.fields.is_empty() {
            return Err(EditError::UserInput("no fields to export".to_string()));
        }
        for field in &doc.fields {
            backend.draw_field(field)?;
        }
        let filename = format!("{}.pdf", doc.name);
        let bytes = backend.export(&doc.fields, &filename)?;
        log::info!("exported {filename} ({} fields, {} bytes)", doc.fields.len(), bytes.len());
        Ok(ExportedPdf { filename, bytes })
    }
}

impl<S: KeyValueStore> EditorSession<KvGateway<S>> {
    /// Session over a key-value store, with the gateway's saved-document
    /// cap taken from `config`.
    pub fn with_store(config: EditorConfig, store: S) -> Self {
        let gateway = KvGateway::with_config(store, config.gateway_config());
        Self::new(config, gateway)
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

impl<G: PersistenceGateway> EditorSession<G> {
    fn require_document(&self) -> Result<&Document, EditError> {
        self.document.as_ref().ok_or_else(EditError::no_document)
    }

    fn known_page_count(&self) -> Option<u32> {
        (self.page_count > 0).then_some(self.page_count)
    }

    /// Touch, record in history, upsert into saved documents.
    fn commit(&mut self, next: Document) -> &Document {
        let doc = self.document.insert(next);
        doc.touch();
        self.history.save(doc, &mut self.gateway);
        if let Err(e) = self.gateway.save_document(doc) {
            log::warn!("failed to save document {}: {e}", doc.id);
        }
        doc
    }

    /// Replace the live document with a history snapshot.
    fn restore_snapshot(&mut self, doc: Document) {
        self.cancel_drag();
        if let Some(id) = self.selected
            && doc.field(id).is_none()
        {
            self.selected = None;
        }
        self.document = Some(doc);
    }

    fn cancel_drag(&mut self) {
        if let Some(id) = self.drag.payload().copied() {
            self.drag.cancel();
            log::debug!("drag of {id} cancelled");
        }
    }

    fn reset_view(&mut self) {
        self.cancel_drag();
        self.selected = None;
        self.geometry.page_width_px = 0.0;
        self.geometry.page_height_px = 0.0;
    }
}
