//! Properties that must hold for any sequence of commands
//!
//! Commands are generated against whatever document exists at the time,
//! so block and offset choices are taken modulo the current sizes.

use blockpad_engine::{Block, BlockId, DocumentStore, EditorController, History};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

#[derive(Debug, Clone)]
enum Command {
    InsertText { block: usize, index: usize, text: String },
    DeleteText { block: usize, index: usize, length: usize },
    Split { block: usize, index: usize },
    Merge { block: usize },
    DeleteBlock { block: usize },
    DeleteRange { from: usize, count: usize },
    Create { block: usize },
    Undo,
    Redo,
    Pause,
}

fn short_text() -> impl Strategy<Value = String> {
    "[a-z é]{0,6}"
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0usize..8, 0usize..16, "[a-z]{1,4}")
            .prop_map(|(block, index, text)| Command::InsertText { block, index, text }),
        (0usize..8, 0usize..16, 0usize..6)
            .prop_map(|(block, index, length)| Command::DeleteText { block, index, length }),
        (0usize..8, 0usize..16).prop_map(|(block, index)| Command::Split { block, index }),
        (0usize..8).prop_map(|block| Command::Merge { block }),
        (0usize..8).prop_map(|block| Command::DeleteBlock { block }),
        (0usize..8, 1usize..4).prop_map(|(from, count)| Command::DeleteRange { from, count }),
        (0usize..8).prop_map(|block| Command::Create { block }),
        any::<bool>().prop_map(|redo| if redo { Command::Redo } else { Command::Undo }),
        Just(Command::Pause),
    ]
}

fn document(texts: &[String]) -> Vec<Block> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| Block {
            id: BlockId::from(format!("b{index}")),
            ..Block::paragraph(text.clone())
        })
        .collect()
}

fn pick(controller: &EditorController, block: usize) -> BlockId {
    let blocks = controller.blocks();
    blocks[block % blocks.len()].id.clone()
}

fn run(controller: &mut EditorController, command: &Command) {
    match command {
        Command::InsertText { block, index, text } => {
            let id = pick(controller, *block);
            let index = index % (controller.block_length(&id) + 1);
            controller.insert_text(&id, index, text);
        }
        Command::DeleteText { block, index, length } => {
            let id = pick(controller, *block);
            let index = index % (controller.block_length(&id) + 1);
            controller.delete_text(&id, index, *length);
        }
        Command::Split { block, index } => {
            let id = pick(controller, *block);
            let index = index % (controller.block_length(&id) + 1);
            controller.split_block(&id, index, 0);
        }
        Command::Merge { block } => {
            let blocks = controller.blocks();
            if blocks.len() > 1 {
                let index = 1 + block % (blocks.len() - 1);
                let (target, source) = (blocks[index - 1].id.clone(), blocks[index].id.clone());
                controller.merge_block(&target, &source);
            }
        }
        Command::DeleteBlock { block } => {
            let id = pick(controller, *block);
            controller.delete_block(Some(&id));
        }
        Command::DeleteRange { from, count } => {
            let blocks = controller.blocks();
            let from = from % blocks.len();
            let ids: Vec<BlockId> = blocks
                .iter()
                .skip(from)
                .take(*count)
                .map(|block| block.id.clone())
                .collect();
            controller.delete_blocks(&ids);
        }
        Command::Create { block } => {
            let id = pick(controller, *block);
            controller.create_block(Some(&id));
        }
        Command::Undo => {
            controller.undo();
        }
        Command::Redo => {
            controller.redo();
        }
        Command::Pause => controller.advance_time(2_000),
    }
}

fn outline(controller: &EditorController) -> Vec<(BlockId, String)> {
    controller
        .blocks()
        .iter()
        .map(|block| (block.id.clone(), block.text()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn document_never_loses_its_last_block_or_inline(
        texts in proptest::collection::vec(short_text(), 1..5),
        commands in proptest::collection::vec(command_strategy(), 0..30),
    ) {
        let mut controller = EditorController::new(document(&texts));

        for command in &commands {
            run(&mut controller, command);
            controller.flush_deferred();

            prop_assert!(!controller.blocks().is_empty());
            for block in controller.blocks() {
                prop_assert!(!block.contents.is_empty(), "{:?} after {:?}", block, command);
            }
        }
    }

    #[test]
    fn undoing_everything_restores_the_document(
        texts in proptest::collection::vec(short_text(), 1..5),
        commands in proptest::collection::vec(command_strategy(), 0..30),
    ) {
        let mut controller = EditorController::new(document(&texts));
        let original = outline(&controller);

        for command in &commands {
            run(&mut controller, command);
        }
        controller.optimize_op();
        let edited = outline(&controller);
        let depth = controller.context().history().undo_depth();

        while controller.undo() {}
        prop_assert_eq!(outline(&controller), original);

        for _ in 0..depth {
            prop_assert!(controller.redo());
        }
        prop_assert_eq!(outline(&controller), edited);
    }

    #[test]
    fn content_update_round_trips(
        text in "[a-zé ]{0,12}",
        index in 0usize..14,
        length in 0usize..6,
        inserted in "[a-z]{0,4}",
    ) {
        let original = Block {
            id: BlockId::from("b1"),
            ..Block::paragraph(text)
        };
        let mut store = DocumentStore::new(vec![original.clone()]);

        let index = index.min(original.len());
        let mut updated = original.clone();
        updated.contents = blockpad_engine::editing::contents::delete_contents(
            &original.contents,
            index,
            length,
        );
        updated.contents =
            blockpad_engine::editing::contents::insert_text(&updated.contents, index, &inserted);
        let edited = updated.clone();

        let ops = store.update_block(updated);
        let mut history = History::new(10);
        for op in ops {
            history.push(op);
        }

        if history.can_undo() {
            history.undo(&mut store).unwrap();
        }
        prop_assert_eq!(&store.get_blocks()[0], &original);

        if history.can_redo() {
            history.redo(&mut store).unwrap();
            prop_assert_eq!(store.get_blocks()[0].text(), edited.text());
        }
    }
}
