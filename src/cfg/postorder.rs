//! Postorder computation.

use crate::entity::PerEntity;
use crate::ir::Block;
use smallvec::{smallvec, SmallVec};

/// Postorder of the blocks reachable from `entry`: a block is emitted
/// once every block first discovered through it has been emitted.
/// Successors are explored in the order `succ_blocks` lists them, so
/// the result is deterministic.
pub fn calculate<'a, SuccFn: Fn(Block) -> &'a [Block]>(
    entry: Block,
    succ_blocks: SuccFn,
) -> Vec<Block> {
    let mut order = vec![];
    let mut visited: PerEntity<Block, bool> = PerEntity::default();
    // Explicit DFS stack of (block, next successor to try).
    let mut stack: SmallVec<[(Block, usize); 64]> = smallvec![(entry, 0)];
    visited[entry] = true;

    while let Some(top) = stack.last_mut() {
        let (block, next) = *top;
        match succ_blocks(block).get(next) {
            Some(&succ) => {
                top.1 += 1;
                if !visited[succ] {
                    log::trace!("postorder: {} -> {}", block, succ);
                    visited[succ] = true;
                    stack.push((succ, 0));
                }
            }
            None => {
                log::trace!("postorder: finished {}", block);
                order.push(block);
                stack.pop();
            }
        }
    }

    order
}
