//! Integration tests: pointer input, placement, and export through
//! `EditorSession`.
//!
//! Page is US Letter (612×792pt) rendered at scale 1.5, so the canvas is
//! 918×1188px. A checkbox at PDF (0, 780) with size 12 covers canvas
//! (0, 0)–(18, 18).

use fm_core::model::*;
use fm_core::{FieldId, Point};
use fm_editor::*;
use fm_store::{KvGateway, MemoryStore};
use pretty_assertions::assert_eq;

type Session = EditorSession<KvGateway<MemoryStore>>;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn session_with(config: EditorConfig) -> Session {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = EditorSession::new(config, KvGateway::new(MemoryStore::new()));
    s.new_document("form", 2).unwrap();
    s.page_rendered(918.0, 1188.0);
    s
}

fn session() -> Session {
    session_with(EditorConfig::default())
}

fn down(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerDown { x, y }
}

fn mv(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove { x, y }
}

fn up(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerUp { x, y }
}

fn corner_checkbox(s: &mut Session) -> FieldId {
    s.add_checkbox(true, Point::new(0.0, 780.0), 0).unwrap()
}

// ─── Dragging ────────────────────────────────────────────────────────────

#[test]
fn drag_snaps_to_grid() {
    let mut s = session_with(EditorConfig {
        grid_size: 10,
        ..EditorConfig::default()
    });
    let id = corner_checkbox(&mut s);

    assert_eq!(s.handle_input(&down(5.0, 5.0)), Some(SessionEvent::DragStarted(id)));
    assert_eq!(
        s.handle_input(&mv(28.0, 52.0)),
        Some(SessionEvent::DragMoved {
            id,
            left: 20.0,
            top: 50.0
        })
    );
    assert_eq!(
        s.handle_input(&up(28.0, 52.0)),
        Some(SessionEvent::DragEnded { id, moved: true })
    );

    let field = s.document().unwrap().field(id).unwrap();
    assert!(close(field.x, 20.0 / 1.5));
    assert!(close(field.y, (1188.0 - 50.0) / 1.5 - 12.0));
}

#[test]
fn drag_respects_canvas_origin() {
    let mut s = session();
    s.set_canvas_origin(Point::new(40.0, 100.0));
    let id = corner_checkbox(&mut s);

    assert_eq!(s.handle_input(&down(45.0, 105.0)), Some(SessionEvent::DragStarted(id)));
    assert_eq!(
        s.handle_input(&mv(345.0, 405.0)),
        Some(SessionEvent::DragMoved {
            id,
            left: 300.0,
            top: 300.0
        })
    );
    s.handle_input(&up(345.0, 405.0));

    let field = s.document().unwrap().field(id).unwrap();
    assert!(close(field.x, 200.0));
    assert!(close(field.y, (1188.0 - 300.0) / 1.5 - 12.0));
}

#[test]
fn drag_is_clamped_to_page() {
    let mut s = session();
    let id = corner_checkbox(&mut s);

    s.handle_input(&down(5.0, 5.0));
    assert_eq!(
        s.handle_input(&mv(5000.0, -300.0)),
        Some(SessionEvent::DragMoved {
            id,
            left: 900.0,
            top: 0.0
        })
    );
}

#[test]
fn drag_only_commits_on_release() {
    let mut s = session();
    let id = corner_checkbox(&mut s);
    let undo_before = s.history().undo_count();

    s.handle_input(&down(5.0, 5.0));
    s.handle_input(&mv(100.0, 100.0));
    s.handle_input(&mv(200.0, 200.0));
    assert_eq!(s.document().unwrap().field(id).unwrap().x, 0.0);
    assert_eq!(s.history().undo_count(), undo_before);

    s.handle_input(&up(200.0, 200.0));
    assert_eq!(s.history().undo_count(), undo_before + 1);
}

#[test]
fn click_without_move_commits_nothing() {
    let mut s = session();
    let id = corner_checkbox(&mut s);
    let undo_before = s.history().undo_count();

    s.handle_input(&down(5.0, 5.0));
    assert_eq!(
        s.handle_input(&up(5.0, 5.0)),
        Some(SessionEvent::DragEnded { id, moved: false })
    );
    assert_eq!(s.history().undo_count(), undo_before);
    assert_eq!(s.selected(), Some(id));
}

#[test]
fn blur_cancels_drag() {
    let mut s = session();
    let id = corner_checkbox(&mut s);

    s.handle_input(&down(5.0, 5.0));
    s.handle_input(&mv(300.0, 300.0));
    assert_eq!(s.handle_input(&InputEvent::Blur), Some(SessionEvent::DragCancelled(id)));
    assert_eq!(s.handle_input(&up(300.0, 300.0)), None);
    assert_eq!(s.document().unwrap().field(id).unwrap().x, 0.0);
}

#[test]
fn deleting_dragged_field_cancels_drag() {
    let mut s = session();
    let id = corner_checkbox(&mut s);

    s.handle_input(&down(5.0, 5.0));
    assert!(s.delete_field(id).unwrap());
    assert!(!s.is_dragging());
    assert_eq!(s.handle_input(&mv(50.0, 50.0)), None);
    assert_eq!(s.handle_input(&up(50.0, 50.0)), None);
    assert_eq!(s.selected(), None);
}

#[test]
fn touch_drives_drag_with_first_point() {
    let mut s = session();
    let id = corner_checkbox(&mut s);

    let started = s.handle_input(&InputEvent::touch_start(&[(5.0, 5.0), (400.0, 400.0)]));
    assert_eq!(started, Some(SessionEvent::DragStarted(id)));
    s.handle_input(&InputEvent::touch_move(&[(65.0, 5.0)]));
    assert_eq!(
        s.handle_input(&InputEvent::TouchEnd),
        Some(SessionEvent::DragEnded { id, moved: true })
    );
    assert!(close(s.document().unwrap().field(id).unwrap().x, 40.0));
}

#[test]
fn topmost_field_wins_and_bare_page_deselects() {
    let mut s = session();
    let _under = corner_checkbox(&mut s);
    let over = corner_checkbox(&mut s);

    assert_eq!(s.handle_input(&down(5.0, 5.0)), Some(SessionEvent::DragStarted(over)));
    s.handle_input(&up(5.0, 5.0));

    assert_eq!(s.handle_input(&down(600.0, 600.0)), Some(SessionEvent::Deselected));
    assert_eq!(s.handle_input(&down(600.0, 600.0)), None);
}

#[test]
fn selected_overlay_is_raised() {
    let mut s = session();
    let id = corner_checkbox(&mut s);
    s.handle_input(&down(5.0, 5.0));

    let overlay = s.overlay();
    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay[0].id, id);
    assert_eq!(overlay[0].z_index, 100);
}

// ─── Placement ───────────────────────────────────────────────────────────

#[test]
fn text_tool_places_at_click() {
    let mut s = session();
    s.select_tool(Some(ToolKind::Text));

    let placed = s
        .place_at(Point::new(150.0, 300.0), ToolInput::Text("Jane".into()))
        .unwrap();
    let Placement::Placed(id) = placed else {
        panic!("expected a placed field, got {placed:?}");
    };
    let field = s.document().unwrap().field(id).unwrap();
    assert_eq!(field.content, FieldContent::Text("Jane".into()));
    assert!(close(field.x, 100.0));
    assert!(close(field.y, 592.0));
    assert!(close(field.width, 4.0 * 12.0 * 0.6));
}

#[test]
fn text_tool_requires_text() {
    let mut s = session();
    s.select_tool(Some(ToolKind::Text));
    let err = s.place_at(Point::new(10.0, 10.0), ToolInput::None).unwrap_err();
    assert!(err.is_user_input());
    let err = s
        .place_at(Point::new(10.0, 10.0), ToolInput::Text("   ".into()))
        .unwrap_err();
    assert!(err.is_user_input());
    assert!(s.document().unwrap().fields.is_empty());
}

#[test]
fn checkbox_tool_places_checked_box() {
    let mut s = session();
    s.select_tool(Some(ToolKind::Checkbox));
    let Placement::Placed(id) = s.place_at(Point::new(30.0, 30.0), ToolInput::None).unwrap() else {
        panic!("checkbox not placed");
    };
    let field = s.document().unwrap().field(id).unwrap();
    assert_eq!(field.content, FieldContent::Checkbox(true));
    assert_eq!((field.width, field.height), (12.0, 12.0));
}

#[test]
fn signature_and_image_tools_defer_to_host() {
    let mut s = session();
    assert_eq!(s.place_at(Point::ORIGIN, ToolInput::None).unwrap(), Placement::NoTool);
    s.select_tool(Some(ToolKind::Signature));
    assert_eq!(s.place_at(Point::ORIGIN, ToolInput::None).unwrap(), Placement::NeedsSignature);
    s.select_tool(Some(ToolKind::Image));
    assert_eq!(s.place_at(Point::ORIGIN, ToolInput::None).unwrap(), Placement::NeedsImage);
}

#[test]
fn signature_format_is_checked() {
    let mut s = session();
    let err = s.add_signature("data:image/gif;base64,R0lG").unwrap_err();
    assert!(err.is_user_input());
    assert!(err.to_string().contains("unsupported image format"));

    s.change_page(2).unwrap();
    let id = s.add_signature("data:image/png;base64,iVBO").unwrap();
    let field = s.document().unwrap().field(id).unwrap();
    assert_eq!(field.page, 1);
    assert_eq!((field.x, field.y, field.width, field.height), (100.0, 100.0, 200.0, 80.0));
}

#[test]
fn text_properties_apply_to_new_text() {
    let mut s = session();
    s.set_text_properties(TextProperties {
        font_size: 20.0,
        color: "blue".into(),
    })
    .unwrap();
    let id = s.add_text("Hi", Point::new(0.0, 0.0), 0).unwrap();
    let field = s.document().unwrap().field(id).unwrap();
    assert_eq!(field.font_size, Some(20.0));
    assert_eq!(field.color.as_deref(), Some("#0000FF"));
    assert!(close(field.height, 24.0));
}

// ─── Backend ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakePdf {
    drawn: Vec<FieldId>,
    rendered: Vec<(u32, f64)>,
}

impl PdfBackend for FakePdf {
    fn page_count(&self) -> u32 {
        2
    }

    fn render_page(&mut self, page: u32, scale: f64) -> Result<RenderedPage, BackendError> {
        self.rendered.push((page, scale));
        Ok(RenderedPage {
            width: 612.0 * scale,
            height: 792.0 * scale,
        })
    }

    fn draw_field(&mut self, field: &Field) -> Result<(), BackendError> {
        self.drawn.push(field.id);
        Ok(())
    }

    fn export(&mut self, fields: &[Field], filename: &str) -> Result<Vec<u8>, BackendError> {
        Ok(format!("%PDF-1.7 {filename} {}", fields.len()).into_bytes())
    }
}

#[test]
fn export_requires_fields() {
    let s = session();
    let err = s.export(&mut FakePdf::default()).unwrap_err();
    assert!(matches!(err, EditError::UserInput(_)));
}

#[test]
fn export_draws_every_field() {
    let mut s = session();
    let a = corner_checkbox(&mut s);
    let b = s.add_text("Total", Point::new(50.0, 50.0), 1).unwrap();

    let mut pdf = FakePdf::default();
    let out = s.export(&mut pdf).unwrap();
    assert_eq!(out.filename, "form.pdf");
    assert_eq!(pdf.drawn, vec![a, b]);
    assert_eq!(out.bytes, b"%PDF-1.7 form.pdf 2".to_vec());
}

#[test]
fn render_tracks_current_page_and_scale() {
    let mut s = session();
    s.change_page(2).unwrap();
    s.set_scale(2.0).unwrap();

    let mut pdf = FakePdf::default();
    let page = s.render_current_page(&mut pdf).unwrap();
    assert_eq!(pdf.rendered, vec![(1, 2.0)]);
    assert_eq!(page.height, 1584.0);
    assert_eq!(s.geometry().page_height_px, 1584.0);
}
