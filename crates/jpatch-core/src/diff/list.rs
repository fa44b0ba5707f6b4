use super::diff_impl;
use crate::lcs::{Span, SplitNode};
use crate::{DiffOptions, Patch, PatchOperation, Pointer, Value};

pub(super) fn diff_lists(
    lhs: &[Value],
    rhs: &[Value],
    path: &mut Pointer,
    options: &DiffOptions,
    patch: &mut Patch,
) {
    let tree = SplitNode::build(lhs, rhs);
    let mut walker = ListWalker { lhs, rhs, path, options, patch, cursor: 0 };
    walker.visit(&tree);
}

/// Emits operations for one array while walking its split tree in order.
///
/// `cursor` is the index, in the array as patched so far, of the first
/// element not yet visited.
struct ListWalker<'a> {
    lhs: &'a [Value],
    rhs: &'a [Value],
    path: &'a mut Pointer,
    options: &'a DiffOptions,
    patch: &'a mut Patch,
    cursor: usize,
}

impl ListWalker<'_> {
    fn visit(&mut self, node: &SplitNode) {
        match node {
            SplitNode::Matched { left, before, after, .. } => {
                self.visit(before);
                self.cursor += left.len();
                self.visit(after);
            }
            SplitNode::Unmatched { left, right } => self.edit(*left, *right),
        }
    }

    fn edit(&mut self, left: Option<Span>, right: Option<Span>) {
        let (lhs, rhs) = (self.lhs, self.rhs);
        let removed = left.map_or(&[][..], |span| &lhs[span.range()]);
        let added = right.map_or(&[][..], |span| &rhs[span.range()]);
        let paired = removed.len().min(added.len());

        for (offset, (old, new)) in removed.iter().zip(added).enumerate() {
            self.path.push((self.cursor + offset).to_string());
            diff_impl(old, new, self.path, self.options, self.patch);
            self.path.pop();
        }

        // Each removal shifts the next surplus element into the same slot.
        let slot = self.path.clone().with_index(self.cursor + paired);
        for _ in paired..removed.len() {
            self.patch.push(PatchOperation::remove(slot.clone()));
        }

        for (offset, value) in added.iter().enumerate().skip(paired) {
            let at = self.path.clone().with_index(self.cursor + offset);
            self.patch.push(PatchOperation::add(at, value.clone()));
        }

        self.cursor += added.len();
    }
}
