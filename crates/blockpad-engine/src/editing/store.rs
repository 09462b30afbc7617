use std::collections::{HashMap, HashSet};

use crate::error::{EngineError, Result};
use crate::history::{Operation, diff};
use crate::models::{Attributes, Block, BlockId, BlockKind, Inline};

/// In-memory ordered collection of blocks, the single source of truth for
/// content.
///
/// Every mutating method returns the operations describing what it did so
/// the caller can record them. Child blocks live beside the top-level list,
/// keyed by their parent's id, so history can address them independently.
///
/// The store always holds at least one block and every block at least one
/// inline; deletions that would empty it synthesize a fresh paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStore {
    blocks: Vec<Block>,
    children: HashMap<BlockId, Vec<Block>>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DocumentStore {
    /// Later blocks repeating an earlier id are given fresh ids.
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut store = Self {
            blocks,
            children: HashMap::new(),
        };
        let mut seen = HashSet::new();
        for block in &mut store.blocks {
            block.ensure_placeholder();
            if !seen.insert(block.id.clone()) {
                block.id = BlockId::generate();
                seen.insert(block.id.clone());
            }
        }
        if store.blocks.is_empty() {
            store.blocks.push(Block::new(BlockKind::Paragraph));
        }
        store
    }

    pub fn get_blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get_block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    /// Flattened text length; 0 for an unknown id
    pub fn get_block_length(&self, id: &BlockId) -> usize {
        self.get_block(id).map(Block::len).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn first_block(&self) -> &Block {
        &self.blocks[0]
    }

    /// Insert after `after`, or append when it is absent or unknown. A block
    /// whose id is already taken is given a fresh one.
    pub fn create_block(&mut self, mut block: Block, after: Option<&BlockId>) -> Operation {
        block.ensure_placeholder();
        if self.get_block(&block.id).is_some() {
            block.id = BlockId::generate();
        }

        let index = after
            .and_then(|id| self.block_index(id))
            .map(|index| index + 1)
            .unwrap_or(self.blocks.len());
        let prev_block_id = index
            .checked_sub(1)
            .map(|prev| self.blocks[prev].id.clone());
        self.blocks.insert(index, block.clone());

        Operation::AddBlock {
            block_id: block.id.clone(),
            block,
            prev_block_id,
            position: None,
        }
    }

    /// Replace the block with the same id; no-op if the id is unknown.
    ///
    /// A change of kind or attributes is recorded as a remove/add pair at
    /// the same position, content changes as an update. `meta` is written
    /// through without being recorded.
    pub fn update_block(&mut self, mut block: Block) -> Vec<Operation> {
        let Some(index) = self.block_index(&block.id) else {
            return Vec::new();
        };
        block.ensure_placeholder();
        let old = std::mem::replace(&mut self.blocks[index], block.clone());

        if old.kind != block.kind || old.attributes != block.attributes {
            let prev_block_id = index
                .checked_sub(1)
                .map(|prev| self.blocks[prev].id.clone());
            return vec![
                Operation::RemoveBlock {
                    block_id: old.id.clone(),
                    block: old,
                    prev_block_id: prev_block_id.clone(),
                    children: Vec::new(),
                    position: None,
                },
                Operation::AddBlock {
                    block_id: block.id.clone(),
                    block,
                    prev_block_id,
                    position: None,
                },
            ];
        }

        let (redo, undo) = diff::diff_contents(&old.contents, &block.contents);
        if redo.is_empty() {
            return Vec::new();
        }
        vec![Operation::UpdateContents {
            block_id: block.id,
            undo,
            redo,
            position: None,
        }]
    }

    /// Remove one block (and its children)
    pub fn delete_block(&mut self, id: &BlockId) -> Vec<Operation> {
        self.delete_blocks(std::slice::from_ref(id))
    }

    /// Remove every listed block that exists. If nothing would remain, a
    /// fresh empty paragraph is appended and recorded as well.
    pub fn delete_blocks(&mut self, ids: &[BlockId]) -> Vec<Operation> {
        let mut ops = Vec::new();
        for id in ids {
            let Some(index) = self.block_index(id) else {
                continue;
            };
            let block = self.blocks.remove(index);
            let prev_block_id = index
                .checked_sub(1)
                .map(|prev| self.blocks[prev].id.clone());
            let children = self.children.remove(id).unwrap_or_default();
            ops.push(Operation::RemoveBlock {
                block_id: block.id.clone(),
                block,
                prev_block_id,
                children,
                position: None,
            });
        }

        if self.blocks.is_empty() && !ops.is_empty() {
            ops.push(self.create_block(Block::new(BlockKind::Paragraph), None));
        }
        ops
    }

    /// Write derived data without recording history
    pub fn set_meta(&mut self, id: &BlockId, meta: Option<Attributes>) -> bool {
        match self.blocks.iter_mut().find(|block| &block.id == id) {
            Some(block) if block.meta != meta => {
                block.meta = meta;
                true
            }
            _ => false,
        }
    }

    pub fn get_child_blocks(&self, parent: &BlockId) -> &[Block] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_child_block(&self, parent: &BlockId, id: &BlockId) -> Option<&Block> {
        self.get_child_blocks(parent)
            .iter()
            .find(|block| &block.id == id)
    }

    /// Insert a child under `parent` after `after` (or at the end). No-op
    /// when the parent does not exist.
    pub fn create_child_block(
        &mut self,
        parent: &BlockId,
        mut block: Block,
        after: Option<&BlockId>,
    ) -> Option<Operation> {
        self.get_block(parent)?;
        block.ensure_placeholder();
        if self.get_child_block(parent, &block.id).is_some() {
            block.id = BlockId::generate();
        }

        let children = self.children.entry(parent.clone()).or_default();
        let index = after
            .and_then(|id| children.iter().position(|child| &child.id == id))
            .map(|index| index + 1)
            .unwrap_or(children.len());
        let prev_block_id = index.checked_sub(1).map(|prev| children[prev].id.clone());
        children.insert(index, block.clone());

        Some(Operation::ChildAddBlock {
            parent_block_id: parent.clone(),
            block_id: block.id.clone(),
            block,
            prev_block_id,
            position: None,
        })
    }

    /// Replace a child's contents; kind and attributes changes are recorded
    /// as a child remove/add pair.
    pub fn update_child_block(&mut self, parent: &BlockId, mut block: Block) -> Vec<Operation> {
        let Some(children) = self.children.get_mut(parent) else {
            return Vec::new();
        };
        let Some(index) = children.iter().position(|child| child.id == block.id) else {
            return Vec::new();
        };
        block.ensure_placeholder();
        let old = std::mem::replace(&mut children[index], block.clone());

        if old.kind != block.kind || old.attributes != block.attributes {
            let prev_block_id = index.checked_sub(1).map(|prev| children[prev].id.clone());
            return vec![
                Operation::ChildRemoveBlock {
                    parent_block_id: parent.clone(),
                    block_id: old.id.clone(),
                    block: old,
                    prev_block_id: prev_block_id.clone(),
                    position: None,
                },
                Operation::ChildAddBlock {
                    parent_block_id: parent.clone(),
                    block_id: block.id.clone(),
                    block,
                    prev_block_id,
                    position: None,
                },
            ];
        }

        let (redo, undo) = diff::diff_contents(&old.contents, &block.contents);
        if redo.is_empty() {
            return Vec::new();
        }
        vec![Operation::ChildUpdateContents {
            parent_block_id: parent.clone(),
            block_id: block.id,
            undo,
            redo,
            position: None,
        }]
    }

    pub fn delete_child_block(&mut self, parent: &BlockId, id: &BlockId) -> Option<Operation> {
        let children = self.children.get_mut(parent)?;
        let index = children.iter().position(|child| &child.id == id)?;
        let block = children.remove(index);
        let prev_block_id = index.checked_sub(1).map(|prev| children[prev].id.clone());
        if children.is_empty() {
            self.children.remove(parent);
        }
        Some(Operation::ChildRemoveBlock {
            parent_block_id: parent.clone(),
            block_id: block.id.clone(),
            block,
            prev_block_id,
            position: None,
        })
    }

    // Unrecorded primitives used by history replay. They may pass through an
    // empty intermediate state; `check_invariants` runs once replay is done.

    pub(crate) fn insert_raw(&mut self, block: Block, prev: Option<&BlockId>) -> Result<()> {
        if self.get_block(&block.id).is_some() {
            return Err(EngineError::DuplicateBlock(block.id));
        }
        let index = match prev {
            None => 0,
            Some(prev) => {
                self.block_index(prev)
                    .ok_or_else(|| EngineError::InvalidReference(prev.clone()))?
                    + 1
            }
        };
        self.blocks.insert(index, block);
        Ok(())
    }

    pub(crate) fn remove_raw(&mut self, id: &BlockId) -> Result<Block> {
        let index = self
            .block_index(id)
            .ok_or_else(|| EngineError::BlockNotFound(id.clone()))?;
        Ok(self.blocks.remove(index))
    }

    pub(crate) fn set_contents_raw(&mut self, id: &BlockId, contents: Vec<Inline>) -> Result<()> {
        let block = self
            .blocks
            .iter_mut()
            .find(|block| &block.id == id)
            .ok_or_else(|| EngineError::BlockNotFound(id.clone()))?;
        block.contents = contents;
        Ok(())
    }

    pub(crate) fn take_children_raw(&mut self, parent: &BlockId) -> Vec<Block> {
        self.children.remove(parent).unwrap_or_default()
    }

    pub(crate) fn restore_children_raw(&mut self, parent: &BlockId, children: Vec<Block>) {
        if !children.is_empty() {
            self.children.insert(parent.clone(), children);
        }
    }

    pub(crate) fn children_mut_raw(&mut self, parent: &BlockId) -> Result<&mut Vec<Block>> {
        if self.get_block(parent).is_none() {
            return Err(EngineError::BlockNotFound(parent.clone()));
        }
        Ok(self.children.entry(parent.clone()).or_default())
    }

    pub(crate) fn prune_children_raw(&mut self) {
        self.children.retain(|_, children| !children.is_empty());
    }

    pub(crate) fn check_invariants(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(EngineError::EmptyDocument);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(id: &str, text: &str) -> Block {
        Block {
            id: BlockId::from(id),
            ..Block::paragraph(text)
        }
    }

    fn ids(store: &DocumentStore) -> Vec<&str> {
        store
            .get_blocks()
            .iter()
            .map(|block| block.id.as_str())
            .collect()
    }

    #[test]
    fn test_new_store_is_never_empty() {
        let store = DocumentStore::new(Vec::new());
        assert_eq!(store.len(), 1);
        assert_eq!(store.first_block().contents.len(), 1);
    }

    #[test]
    fn test_new_store_renames_duplicate_ids() {
        let store = DocumentStore::new(vec![block("a", "1"), block("a", "2"), block("b", "3")]);

        let blocks = store.get_blocks();
        assert_eq!(blocks[0].id.as_str(), "a");
        assert_ne!(blocks[1].id.as_str(), "a");
        assert_ne!(blocks[1].id.as_str(), "b");
        assert_eq!(blocks[1].text(), "2");
        assert_eq!(blocks[2].id.as_str(), "b");
    }

    #[test]
    fn test_create_after_and_append() {
        let mut store = DocumentStore::new(vec![block("a", "1"), block("c", "3")]);

        let op = store.create_block(block("b", "2"), Some(&BlockId::from("a")));
        store.create_block(block("d", "4"), Some(&BlockId::from("missing")));

        assert_eq!(ids(&store), vec!["a", "b", "c", "d"]);
        assert!(matches!(
            op,
            Operation::AddBlock { prev_block_id: Some(ref prev), .. } if prev.as_str() == "a"
        ));
    }

    #[test]
    fn test_update_unknown_block_is_noop() {
        let mut store = DocumentStore::new(vec![block("a", "1")]);
        let ops = store.update_block(block("zzz", "x"));
        assert!(ops.is_empty());
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn test_update_contents_records_diff() {
        let mut store = DocumentStore::new(vec![block("a", "1")]);
        let mut updated = store.get_block(&BlockId::from("a")).unwrap().clone();
        updated.contents[0].text = "12".to_string();

        let ops = store.update_block(updated);

        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], Operation::UpdateContents { .. }));
        assert_eq!(store.get_block_length(&BlockId::from("a")), 2);
    }

    #[test]
    fn test_kind_change_records_replace_pair() {
        let mut store = DocumentStore::new(vec![block("a", "1")]);
        let mut updated = store.get_block(&BlockId::from("a")).unwrap().clone();
        updated.kind = BlockKind::Header(1);

        let ops = store.update_block(updated);

        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], Operation::RemoveBlock { .. }));
        assert!(matches!(ops[1], Operation::AddBlock { .. }));
    }

    #[test]
    fn test_deleting_everything_synthesizes_paragraph() {
        let mut store = DocumentStore::new(vec![block("a", "1"), block("b", "2")]);

        let ops = store.delete_blocks(&[BlockId::from("a"), BlockId::from("b")]);

        assert_eq!(ops.len(), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.first_block().kind, BlockKind::Paragraph);
        assert!(store.first_block().is_empty());
    }

    #[test]
    fn test_delete_unknown_ids_is_noop() {
        let mut store = DocumentStore::new(vec![block("a", "1")]);
        assert!(store.delete_block(&BlockId::from("nope")).is_empty());
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn test_child_blocks_are_scoped_to_parent() {
        let mut store = DocumentStore::new(vec![block("a", "1")]);
        let parent = BlockId::from("a");

        let op = store.create_child_block(&parent, block("c1", "child"), None);
        assert!(matches!(op, Some(Operation::ChildAddBlock { .. })));
        assert!(store.create_child_block(&BlockId::from("x"), block("c2", ""), None).is_none());

        assert_eq!(store.get_child_blocks(&parent).len(), 1);
        assert!(store.get_child_block(&parent, &BlockId::from("c1")).is_some());

        let ops = store.delete_block(&parent);
        assert!(matches!(
            &ops[0],
            Operation::RemoveBlock { children, .. } if children.len() == 1
        ));
        assert!(store.get_child_blocks(&parent).is_empty());
    }

    #[test]
    fn test_set_meta_reports_changes() {
        let mut store = DocumentStore::new(vec![block("a", "1")]);
        let meta = Some(Attributes::from([("listNumber".to_string(), 1.into())]));

        assert!(store.set_meta(&BlockId::from("a"), meta.clone()));
        assert!(!store.set_meta(&BlockId::from("a"), meta));
    }
}
