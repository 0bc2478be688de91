mod arena;
mod handle;
mod node;
mod raw_scapegoat_tree;

pub(crate) use arena::Arena;
pub(crate) use handle::Handle;
pub(crate) use node::{Direction, Node, Stack};
pub(crate) use raw_scapegoat_tree::RawScapegoatTree;
