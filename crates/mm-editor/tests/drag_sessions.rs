//! Integration tests: full pointer flows through `MindmapEditor`.

use mm_core::config::EngineConfig;
use mm_core::geometry::{Point, Side, Size};
use mm_core::id::{ConnectionId, NodeId};
use mm_core::model::{ConnectionEnd, Node, PortRef};
use mm_core::scene::Scene;
use mm_editor::{DragSession, InputEvent, MindmapEditor, PointerTarget, SceneMutation};
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn place(scene: &mut Scene, name: &str, x: f32, y: f32) -> NodeId {
    let node = Node::from_parts(
        NodeId::intern(name),
        Point::new(x, y),
        Size::new(120.0, 80.0),
        name,
        &EngineConfig::default(),
    );
    scene.add_node(node).unwrap()
}

/// A at (0,0) and B at (300,0), both 120×80.
fn two_nodes(prefix: &str) -> (MindmapEditor, NodeId, NodeId) {
    let mut scene = Scene::default();
    let a = place(&mut scene, &format!("{prefix}_a"), 0.0, 0.0);
    let b = place(&mut scene, &format!("{prefix}_b"), 300.0, 0.0);
    (MindmapEditor::with_scene(scene), a, b)
}

fn link(editor: &mut MindmapEditor, from: (f32, f32), to: (f32, f32)) -> Vec<SceneMutation> {
    editor.handle(&InputEvent::moved(from.0 - 20.0, from.1));
    editor.handle(&InputEvent::down(from.0, from.1));
    editor.handle(&InputEvent::moved(to.0, to.1));
    editor.handle(&InputEvent::up(to.0, to.1))
}

fn only_connection(editor: &MindmapEditor) -> ConnectionId {
    let ids: Vec<_> = editor.scene().connections().map(|c| c.id).collect();
    assert_eq!(ids.len(), 1);
    ids[0]
}

// ─── Create-Link ─────────────────────────────────────────────────────────

#[test]
fn link_then_move_reroutes() {
    init_logger();
    let (mut editor, a, b) = two_nodes("flow");

    let committed = link(&mut editor, (120.0, 40.0), (300.0, 40.0));
    assert_eq!(
        committed,
        vec![SceneMutation::Connect {
            start: PortRef::new(a, Side::Right),
            end: PortRef::new(b, Side::Left),
        }]
    );
    let id = only_connection(&editor);
    assert_eq!(editor.scene().node(a).unwrap().connection_ids(), &[id]);
    assert_eq!(editor.scene().node(b).unwrap().connection_ids(), &[id]);

    // Drag A's body down by 50; it snaps to (-10, 60).
    editor.handle(&InputEvent::down(60.0, 40.0));
    editor.handle(&InputEvent::moved(60.0, 90.0));
    editor.handle(&InputEvent::up(60.0, 90.0));

    let a_node = editor.scene().node(a).unwrap();
    assert_eq!(a_node.position(), Point::new(-10.0, 60.0));
    let route = editor.scene().connection_route(id).unwrap();
    assert_eq!(route.start, a_node.port_position(Side::Right));
    assert_eq!(route.end, Point::new(300.0, 40.0));
}

#[test]
fn link_highlights_target_while_dragging() {
    init_logger();
    let (mut editor, _, b) = two_nodes("hl");
    editor.handle(&InputEvent::moved(100.0, 40.0));
    editor.handle(&InputEvent::down(120.0, 40.0));
    editor.handle(&InputEvent::moved(302.0, 42.0));
    assert_eq!(editor.overlay().highlighted, Some(b));
    editor.handle(&InputEvent::moved(200.0, 200.0));
    assert_eq!(editor.overlay().highlighted, None);
}

#[test]
fn link_released_over_nothing_creates_nothing() {
    init_logger();
    let (mut editor, _, _) = two_nodes("void");
    let committed = link(&mut editor, (120.0, 40.0), (700.0, 700.0));
    assert!(committed.is_empty());
    assert_eq!(editor.scene().connection_count(), 0);
    assert!(editor.session().is_idle());
    assert_eq!(editor.overlay().link_preview, None);
}

#[test]
fn link_to_own_port_is_discarded() {
    init_logger();
    let (mut editor, _, _) = two_nodes("own");
    // A's bottom port
    let committed = link(&mut editor, (120.0, 40.0), (60.0, 80.0));
    assert!(committed.is_empty());
    assert_eq!(editor.scene().connection_count(), 0);
}

#[test]
fn second_pointer_down_is_ignored() {
    init_logger();
    let (mut editor, a, b) = two_nodes("busy");
    editor.handle(&InputEvent::moved(100.0, 40.0));
    editor.handle(&InputEvent::down(120.0, 40.0));
    assert_eq!(editor.session().name(), "link");

    editor.handle(&InputEvent::down_on(500.0, 500.0, PointerTarget::Canvas));
    editor.handle(&InputEvent::down_on(0.0, 0.0, PointerTarget::Node(a)));
    assert_eq!(editor.session().name(), "link");

    editor.handle(&InputEvent::moved(300.0, 40.0));
    let committed = editor.handle(&InputEvent::up(300.0, 40.0));
    assert_eq!(committed.len(), 1);
    let conn = editor
        .scene()
        .connection(only_connection(&editor))
        .copied()
        .unwrap();
    assert_eq!(conn.end, PortRef::new(b, Side::Left));
}

// ─── Retarget-Link ───────────────────────────────────────────────────────

fn linked(prefix: &str) -> (MindmapEditor, NodeId, NodeId, NodeId, ConnectionId) {
    let mut scene = Scene::default();
    let a = place(&mut scene, &format!("{prefix}_a"), 0.0, 0.0);
    let b = place(&mut scene, &format!("{prefix}_b"), 300.0, 0.0);
    let c = place(&mut scene, &format!("{prefix}_c"), 0.0, 300.0);
    let id = scene
        .add_connection(PortRef::new(a, Side::Right), PortRef::new(b, Side::Left))
        .unwrap();
    (MindmapEditor::with_scene(scene), a, b, c, id)
}

#[test]
fn retarget_onto_another_node() {
    init_logger();
    let (mut editor, a, b, c, id) = linked("retarget");

    editor.handle(&InputEvent::down(307.0, 40.0));
    assert_eq!(editor.session().name(), "retarget");
    editor.handle(&InputEvent::moved(60.0, 302.0));

    let overlay = editor.overlay();
    assert_eq!(overlay.highlighted, Some(c));
    let preview = overlay.retarget_preview.unwrap();
    assert_eq!(preview.connection, id);
    assert_eq!(preview.fixed, Point::new(120.0, 40.0));
    assert_eq!(preview.moving, Point::new(60.0, 302.0));

    editor.handle(&InputEvent::up(60.0, 300.0));
    let conn = *editor.scene().connection(id).unwrap();
    assert_eq!(conn.start, PortRef::new(a, Side::Right));
    assert_eq!(conn.end, PortRef::new(c, Side::Top));
    assert!(editor.scene().node(b).unwrap().connection_ids().is_empty());
    assert_eq!(editor.scene().node(c).unwrap().connection_ids(), &[id]);
}

#[test]
fn connected_port_starts_another_link() {
    init_logger();
    let (mut editor, a, b, _, first) = linked("fanout");
    let d = NodeId::intern("fanout_d");
    let mut scene_with_d = editor.snapshot();
    scene_with_d.nodes.push(mm_core::codec::NodeRecord {
        id: Some(d.as_str().to_string()),
        text: Some("D".into()),
        width: Some(120.0),
        height: Some(80.0),
        position: Some(mm_core::codec::PositionRecord { x: 300.0, y: 200.0 }),
    });
    editor.load(&scene_with_d);

    // A's right port already carries `first`; pressing on it links again.
    editor.handle(&InputEvent::moved(100.0, 40.0));
    editor.handle(&InputEvent::down(120.0, 40.0));
    assert_eq!(editor.session().name(), "link");
    editor.handle(&InputEvent::moved(300.0, 240.0));
    let committed = editor.handle(&InputEvent::up(300.0, 240.0));
    assert_eq!(
        committed,
        vec![SceneMutation::Connect {
            start: PortRef::new(a, Side::Right),
            end: PortRef::new(d, Side::Left),
        }]
    );

    assert_eq!(editor.scene().connection_count(), 2);
    let kept = *editor.scene().connection(first).unwrap();
    assert_eq!(kept.start, PortRef::new(a, Side::Right));
    assert_eq!(kept.end, PortRef::new(b, Side::Left));
    assert_eq!(editor.scene().node(a).unwrap().connection_ids().len(), 2);
}

#[test]
fn endpoint_ring_outside_port_starts_retarget() {
    init_logger();
    let (mut editor, _, _, _, id) = linked("ring");
    // 7 from B's left port: outside the port radius, inside the grab threshold
    editor.handle(&InputEvent::down(307.0, 40.0));
    match editor.session() {
        DragSession::Retarget(s) => {
            assert_eq!(s.connection, id);
            assert_eq!(s.end, ConnectionEnd::End);
        }
        other => panic!("expected retarget, got {other:?}"),
    }
}

#[test]
fn retarget_released_over_nothing_reverts() {
    init_logger();
    let (mut editor, a, b, _, id) = linked("revert");
    let before = *editor.scene().connection(id).unwrap();

    editor.handle(&InputEvent::down(307.0, 40.0));
    editor.handle(&InputEvent::moved(700.0, 700.0));
    let committed = editor.handle(&InputEvent::up(700.0, 700.0));

    assert!(committed.is_empty());
    assert_eq!(*editor.scene().connection(id).unwrap(), before);
    assert_eq!(editor.scene().node(a).unwrap().connection_ids(), &[id]);
    assert_eq!(editor.scene().node(b).unwrap().connection_ids(), &[id]);
    assert_eq!(editor.overlay().retarget_preview, None);
}

#[test]
fn retarget_never_highlights_fixed_node() {
    init_logger();
    let (mut editor, _, _, _, _) = linked("fixed");
    editor.handle(&InputEvent::down(307.0, 40.0));
    // A's bottom port; A holds the fixed end
    editor.handle(&InputEvent::moved(60.0, 80.0));
    assert_eq!(editor.overlay().highlighted, None);
}

// ─── Resize & actions ────────────────────────────────────────────────────

#[test]
fn resize_through_pointer_clamps() {
    init_logger();
    let (mut editor, a, _) = two_nodes("shrink");
    editor.select(Some(a));
    editor.handle(&InputEvent::down(120.0, 80.0));
    assert_eq!(editor.session().name(), "resize");
    editor.handle(&InputEvent::moved(10.0, 5.0));
    editor.handle(&InputEvent::up(10.0, 5.0));
    let node = editor.scene().node(a).unwrap();
    assert_eq!(node.size(), Size::new(50.0, 40.0));
    assert_eq!(node.center(), Point::new(60.0, 40.0));
}

#[test]
fn snapshot_and_reload() {
    init_logger();
    let (mut editor, _, _, _, _) = linked("reload");
    let snapshot = editor.snapshot();
    editor.clear();
    assert!(editor.scene().is_empty());
    editor.load(&snapshot);
    assert_eq!(editor.snapshot(), snapshot);
}
