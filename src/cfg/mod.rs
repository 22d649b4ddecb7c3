//! Lightweight CFG analyses.

use crate::entity::PerEntity;
use crate::ir::{Block, FunctionBody};
use smallvec::SmallVec;

pub mod postorder;

/// Auxiliary analyses of the control-flow graph.
#[derive(Clone, Debug)]
pub struct CFGInfo {
    /// Entry block.
    pub entry: Block,
    /// Successors of each block, in terminator operand order.
    pub succs: PerEntity<Block, SmallVec<[Block; 4]>>,
    /// Postorder traversal of the blocks reachable from the entry.
    pub postorder: Vec<Block>,
    /// Position of each block in `postorder`, if reachable.
    pub postorder_pos: PerEntity<Block, Option<usize>>,
}

impl CFGInfo {
    /// Takes the body's materialized edges as given; call
    /// `FunctionBody::validate` first to make sure they are sound.
    pub fn new(f: &FunctionBody) -> CFGInfo {
        let mut succs: PerEntity<Block, SmallVec<[Block; 4]>> = PerEntity::default();
        for (block, def) in f.blocks.entries() {
            succs[block].extend(def.succs.iter().copied());
        }

        let postorder = postorder::calculate(f.entry, |block| &succs[block][..]);
        let mut postorder_pos = PerEntity::default();
        for (i, &block) in postorder.iter().enumerate() {
            postorder_pos[block] = Some(i);
        }
        log::trace!(
            "CFGInfo: {} blocks, {} reachable",
            f.blocks.len(),
            postorder.len()
        );

        CFGInfo {
            entry: f.entry,
            succs,
            postorder,
            postorder_pos,
        }
    }

    pub fn succs(&self, block: Block) -> &[Block] {
        &self.succs[block][..]
    }

    pub fn is_reachable(&self, block: Block) -> bool {
        self.postorder_pos[block].is_some()
    }

    /// Reverse postorder of the reachable blocks.
    pub fn rpo(&self) -> impl Iterator<Item = Block> + '_ {
        self.postorder.iter().rev().copied()
    }
}
