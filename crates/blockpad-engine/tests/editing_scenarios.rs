//! End-to-end behaviour through the controller, the way a host drives it.

use std::cell::RefCell;
use std::rc::Rc;

use blockpad_engine::modules::clipboard::{ClipboardPayload, FORMATS_MIME, TEXT_MIME};
use blockpad_engine::{
    Block, BlockId, BlockKind, CaretRequest, EditorController, EditorEvent, EditorSettings,
    EventKind, Inline, Key, KeyEvent, Platform, PointerEvent, SelectionState, StaticLayout,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn block(id: &str, text: &str) -> Block {
    Block {
        id: BlockId::from(id),
        ..Block::paragraph(text)
    }
}

fn id(value: &str) -> BlockId {
    BlockId::from(value)
}

fn texts(controller: &EditorController) -> Vec<String> {
    controller.blocks().iter().map(Block::text).collect()
}

fn settings() -> EditorSettings {
    EditorSettings {
        platform: Platform::Other,
        ..EditorSettings::default()
    }
}

fn stacked(blocks: Vec<Block>) -> EditorController {
    let ids: Vec<BlockId> = blocks.iter().map(|block| block.id.clone()).collect();
    EditorController::builder(blocks)
        .settings(settings())
        .layout(StaticLayout::stacked(&ids, 20.0))
        .build()
}

#[test]
fn test_split_paragraph_in_two() {
    let blocks: Vec<Block> = serde_json::from_str(
        r#"[{"id":"b1","type":"PARAGRAPH","contents":[{"id":"i1","type":"TEXT","text":"hello world"}]}]"#,
    )
    .unwrap();
    let mut controller = EditorController::new(blocks);

    let new_id = controller.split_block(&id("b1"), 5, 0).unwrap();

    assert_eq!(texts(&controller), vec!["hello", " world"]);
    assert_eq!(controller.blocks()[0].id, id("b1"));
    assert_eq!(controller.blocks()[1].id, new_id);

    controller.flush_deferred();
    let caret = controller.caret_position().unwrap();
    assert_eq!(caret.block_id, new_id);
    assert_eq!(caret.index, 0);
}

#[test]
fn test_oversized_ranges_are_clamped() {
    let mut controller = EditorController::new(vec![block("b1", "hello world")]);

    assert!(controller.delete_text(&id("b1"), 5, usize::MAX));
    assert_eq!(texts(&controller), vec!["hello"]);
    assert!(controller.split_block(&id("b1"), 2, usize::MAX).is_some());
    assert_eq!(texts(&controller), vec!["he", ""]);
    assert!(controller.get_formats(&id("b1"), 0, usize::MAX).is_empty());

    controller.advance_time(u64::MAX);
    controller.advance_time(u64::MAX);
    assert!(controller.undo());
    assert_eq!(texts(&controller), vec!["hello"]);
}

#[test]
fn test_deleting_the_only_block_leaves_an_empty_paragraph() {
    let mut controller = EditorController::new(vec![block("b1", "text")]);

    assert!(controller.delete_blocks(&[id("b1")]));

    let blocks = controller.blocks();
    assert_eq!(blocks.len(), 1);
    assert_ne!(blocks[0].id, id("b1"));
    assert_eq!(blocks[0].kind, BlockKind::Paragraph);
    assert_eq!(blocks[0].contents.len(), 1);
    assert_eq!(blocks[0].text(), "");
}

#[test]
fn test_copy_block_range() {
    let mut controller = EditorController::new(vec![block("b1", "A"), block("b2", "B")]);
    controller.select_all();

    let data = controller.copy().unwrap();

    let payload: serde_json::Value = serde_json::from_str(&data[FORMATS_MIME]).unwrap();
    assert_eq!(payload["type"], "blocks");
    assert_eq!(payload["data"].as_array().unwrap().len(), 2);
    assert_eq!(data[TEXT_MIME], "A\nB");
    assert_eq!(
        ClipboardPayload::from_data(&data).unwrap().unwrap().plain_text(),
        "A\nB"
    );
}

#[test]
fn test_paste_inlines_moves_caret_past_them() {
    let mut controller = EditorController::new(vec![block("b1", "0123456789")]);
    controller.set_caret_position(CaretRequest::at(id("b1"), 2));
    let data = ClipboardPayload::Inlines(vec![Inline::text("wxyz")])
        .to_data()
        .unwrap();

    assert!(controller.paste(&data));

    assert_eq!(texts(&controller), vec!["01wxyz23456789"]);
    assert_eq!(controller.caret_position().unwrap().index, 6);
}

#[test]
fn test_cut_then_paste_moves_blocks() {
    let mut controller =
        EditorController::new(vec![block("b1", "one"), block("b2", "two"), block("b3", "three")]);
    controller.pointer_down(PointerEvent::on_block(id("b2"), 30.0, 0));
    controller.pointer_move(PointerEvent::on_block(id("b3"), 50.0, 100));
    controller.pointer_up();
    controller.flush_deferred();

    let data = controller.cut().unwrap();
    assert_eq!(texts(&controller), vec!["one"]);

    controller.set_caret_position(CaretRequest::at(id("b1"), 0));
    assert!(controller.paste(&data));
    assert_eq!(texts(&controller), vec!["one", "two", "three"]);
}

#[test]
fn test_malformed_paste_is_ignored() {
    let mut controller = EditorController::new(vec![block("b1", "abc")]);
    controller.set_caret_position(CaretRequest::at(id("b1"), 1));
    let mut data = blockpad_engine::ClipboardData::new();
    data.insert(FORMATS_MIME.to_string(), "{not json".to_string());

    assert!(!controller.paste(&data));
    assert_eq!(texts(&controller), vec!["abc"]);
    assert!(!controller.can_undo());
}

#[rstest]
#[case::upward("b3", "b1")]
#[case::downward("b1", "b3")]
fn test_drag_selects_inclusive_range(#[case] from: &str, #[case] to: &str) {
    let mut controller = stacked(vec![
        block("b0", "zero"),
        block("b1", "one"),
        block("b2", "two"),
        block("b3", "three"),
        block("b4", "four"),
    ]);

    controller.pointer_down(PointerEvent::on_block(id(from), 0.0, 0));
    controller.pointer_move(PointerEvent::on_block(id(to), 0.0, 100));
    controller.pointer_up();
    controller.flush_deferred();

    let selected: Vec<BlockId> = controller
        .selected_blocks()
        .into_iter()
        .map(|block| block.id)
        .collect();
    assert_eq!(selected, vec![id("b1"), id("b2"), id("b3")]);
    assert_eq!(controller.caret_position(), None);
}

#[test]
fn test_drag_within_one_block_keeps_caret() {
    let mut controller = stacked(vec![block("b0", "zero"), block("b1", "one")]);

    controller.pointer_down(PointerEvent::on_block(id("b0"), 5.0, 0).with_index(2));
    controller.pointer_move(PointerEvent::on_block(id("b0"), 6.0, 100));
    controller.pointer_up();

    assert!(controller.selected_block_ids().is_empty());
    assert_eq!(controller.caret_position().unwrap().index, 2);
}

#[test]
fn test_reset_is_idempotent() {
    let mut controller = EditorController::new(vec![block("b1", "a"), block("b2", "b")]);
    let announced = Rc::new(RefCell::new(Vec::new()));
    let sink = announced.clone();
    controller.subscribe(EventKind::BlocksSelected, move |event| {
        if let EditorEvent::BlocksSelected { ids } = event {
            sink.borrow_mut().push(ids.clone());
        }
    });
    controller.select_all();
    announced.borrow_mut().clear();

    assert!(controller.reset_selection());
    let after_first = controller.selection_state().clone();
    assert!(controller.reset_selection());

    assert_eq!(controller.selection_state(), &after_first);
    assert_eq!(after_first, SelectionState::NoSelection);
    assert_eq!(*announced.borrow(), vec![Vec::<BlockId>::new(), Vec::new()]);
}

#[test]
fn test_click_after_drag_keeps_selection_until_settled() {
    let mut controller = stacked(vec![block("b0", "zero"), block("b1", "one")]);
    controller.pointer_down(PointerEvent::on_block(id("b0"), 0.0, 0));
    controller.pointer_move(PointerEvent::on_block(id("b1"), 0.0, 100));
    controller.pointer_up();

    controller.click_outside();
    assert_eq!(controller.selected_block_ids().len(), 2);

    controller.flush_deferred();
    controller.click_outside();
    assert!(controller.selected_block_ids().is_empty());
}

#[test]
fn test_split_then_merge_restores_text() {
    let mut controller = EditorController::new(vec![block("b1", "hello world")]);

    let tail = controller.split_block(&id("b1"), 5, 0).unwrap();
    assert!(controller.merge_block(&id("b1"), &tail));

    assert_eq!(texts(&controller), vec!["hello world"]);
    controller.flush_deferred();
    assert_eq!(controller.caret_position().unwrap().index, 5);
}

#[test]
fn test_undo_redo_through_keyboard() {
    let mut controller =
        EditorController::builder(vec![block("b1", "hello world")]).settings(settings()).build();
    controller.set_caret_position(CaretRequest::at(id("b1"), 5));

    assert!(controller.key_down(KeyEvent::new(Key::Enter)));
    assert_eq!(texts(&controller), vec!["hello", " world"]);

    assert!(controller.key_down(KeyEvent::new(Key::Char('z')).ctrl()));
    assert_eq!(texts(&controller), vec!["hello world"]);
    assert!(controller.can_redo());

    assert!(controller.key_down(KeyEvent::new(Key::Char('y')).ctrl()));
    assert_eq!(texts(&controller), vec!["hello", " world"]);
}

#[test]
fn test_typing_burst_undoes_as_one_step() {
    let mut controller = EditorController::new(vec![block("b1", "")]);

    controller.insert_text(&id("b1"), 0, "a");
    controller.insert_text(&id("b1"), 1, "b");
    controller.insert_text(&id("b1"), 2, "c");
    controller.advance_time(5_000);
    controller.insert_text(&id("b1"), 3, "d");

    assert!(controller.undo());
    assert_eq!(texts(&controller), vec!["abc"]);
    assert!(controller.undo());
    assert_eq!(texts(&controller), vec![""]);
    assert!(!controller.undo());
}

#[test]
fn test_ordered_list_labels() {
    let mut items: Vec<Block> = ["a", "b", "c"]
        .iter()
        .map(|text| Block {
            kind: BlockKind::OrderedList,
            ..block(text, text)
        })
        .collect();
    items[2].attributes.insert("indent".to_string(), 1.into());
    let controller = EditorController::new(items);

    assert_eq!(controller.list_label(&id("a")).as_deref(), Some("1."));
    assert_eq!(controller.list_label(&id("b")).as_deref(), Some("2."));
    assert_eq!(controller.list_label(&id("c")).as_deref(), Some("a."));
}

#[test]
fn test_remote_edit_does_not_enter_local_history() {
    let mut local = EditorController::new(vec![block("b1", "shared")]);
    let mut remote = EditorController::new(vec![block("b1", "shared")]);

    remote.insert_text(&id("b1"), 6, "!");
    let outgoing = remote.drain_outgoing();
    assert_eq!(outgoing.len(), 1);

    for op in outgoing {
        assert!(local.apply_remote(op));
    }
    assert_eq!(texts(&local), vec!["shared!"]);
    assert!(!local.can_undo());
    assert!(local.drain_outgoing().is_empty());
}

#[test]
fn test_destroy_revokes_module_subscriptions() {
    let mut controller = EditorController::new(vec![block("b1", "a")]);
    let external = controller.subscribe(EventKind::EditorChanged, |_| {});
    controller.split_block(&id("b1"), 1, 0);
    assert!(controller.pending_tasks() > 0);

    controller.destroy();

    assert!(controller.is_destroyed());
    assert_eq!(controller.event_bus().subscriber_count(), 1);
    assert!(controller.event_bus().is_subscribed(external));
    assert_eq!(controller.pending_tasks(), 0);
    assert!(controller.module_names().is_empty());
}

#[test]
fn test_missing_module_is_a_noop() {
    use blockpad_engine::ModuleName;

    let mut controller = EditorController::builder(vec![block("b1", "a")])
        .modules(&[ModuleName::Logger])
        .build();

    assert_eq!(controller.module_names(), vec![ModuleName::Logger]);
    assert_eq!(controller.split_block(&id("b1"), 0, 0), None);
    assert!(!controller.undo());
    assert_eq!(texts(&controller), vec!["a"]);
}
