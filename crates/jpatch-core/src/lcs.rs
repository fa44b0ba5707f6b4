//! Common-run matching and the split tree built on top of it.
//!
//! [`longest_common_run`] finds the longest stretch of elements that appears
//! contiguously in both sequences. [`SplitNode::build`] applies it
//! recursively: the run splits both sequences into the parts before it and
//! the parts after it, and each pair of parts is matched again until no
//! common element is left. The leaves of the resulting tree are the regions
//! the differ has to edit.

use std::ops::Range;

use tracing::trace;

/// Half-open index range `[start, end)` into one of the compared sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// First index covered by the span.
    pub start: usize,
    /// One past the last index covered by the span.
    pub end: usize,
}

impl Span {
    /// Creates a span; `start` must not exceed `end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} exceeds end {end}");
        Self { start, end }
    }

    /// Number of indices covered.
    #[must_use]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    /// Returns `true` when the span covers nothing.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns the span as a slice range.
    #[must_use]
    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

/// A common run: `left` indexes the first sequence, `right` the second.
/// Both spans have the same, non-zero length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Location of the run in the first sequence.
    pub left: Span,
    /// Location of the run in the second sequence.
    pub right: Span,
}

/// Finds the longest run of elements present contiguously in both `lhs` and `rhs`.
///
/// Returns `None` when the sequences share no element. When several runs
/// share the maximal length, the one whose last element comes last in
/// row-major order of the `lhs × rhs` table wins.
///
/// ```
/// # use jpatch_core::lcs::{longest_common_run, Span};
/// let found = longest_common_run(&[1, 2, 3, 4], &[0, 1, 2, 3, 5]).unwrap();
/// assert_eq!(found.left, Span::new(0, 3));
/// assert_eq!(found.right, Span::new(1, 4));
/// assert!(longest_common_run(&[1, 2], &[3, 4]).is_none());
/// ```
#[must_use]
pub fn longest_common_run<T: PartialEq>(lhs: &[T], rhs: &[T]) -> Option<Match> {
    longest_common_run_in(lhs, rhs, Span::new(0, lhs.len()), Span::new(0, rhs.len()))
}

/// Like [`longest_common_run`], restricted to `lhs[left]` and `rhs[right]`.
///
/// The returned spans are absolute indices into `lhs` and `rhs`.
#[must_use]
pub fn longest_common_run_in<T: PartialEq>(
    lhs: &[T],
    rhs: &[T],
    left: Span,
    right: Span,
) -> Option<Match> {
    let a = &lhs[left.range()];
    let b = &rhs[right.range()];

    // Row `i` holds, for each `j`, the length of the common run ending at
    // a[i - 1] and b[j - 1]. Only the previous row is needed.
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    let mut best = 0usize;
    let mut best_end = (0usize, 0usize);

    for (i, a_item) in a.iter().enumerate() {
        for (j, b_item) in b.iter().enumerate() {
            if a_item == b_item {
                let run = previous[j] + 1;
                current[j + 1] = run;
                if run >= best {
                    best = run;
                    best_end = (i + 1, j + 1);
                }
            } else {
                current[j + 1] = 0;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    if best == 0 {
        return None;
    }

    let (a_end, b_end) = best_end;
    let found = Match {
        left: Span::new(left.start + a_end - best, left.start + a_end),
        right: Span::new(right.start + b_end - best, right.start + b_end),
    };
    trace!(left = ?found.left, right = ?found.right, "common run");
    Some(found)
}

/// Recursive decomposition of two sequences into matched and unmatched regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitNode {
    /// A region where the two sides share no element.
    ///
    /// `None` marks a side with no elements; both `None` is an empty region.
    Unmatched {
        /// Elements of the first sequence in this region.
        left: Option<Span>,
        /// Elements of the second sequence in this region.
        right: Option<Span>,
    },
    /// A common run with the regions on either side of it.
    Matched {
        /// Location of the run in the first sequence.
        left: Span,
        /// Location of the run in the second sequence.
        right: Span,
        /// Region strictly before the run on both sides.
        before: Box<SplitNode>,
        /// Region strictly after the run on both sides.
        after: Box<SplitNode>,
    },
}

impl SplitNode {
    /// Builds the split tree over the whole of `lhs` and `rhs`.
    ///
    /// Recurses once per common run, so the tree depth is at most
    /// `min(lhs.len(), rhs.len())`.
    ///
    /// ```
    /// # use jpatch_core::lcs::{SplitNode, Span};
    /// let tree = SplitNode::build(&[0, 1, 2, 3], &[1, 2, 4, 5]);
    /// let SplitNode::Matched { left, right, .. } = &tree else { panic!("expected a match") };
    /// assert_eq!((*left, *right), (Span::new(1, 3), Span::new(0, 2)));
    /// ```
    #[must_use]
    pub fn build<T: PartialEq>(lhs: &[T], rhs: &[T]) -> Self {
        Self::build_in(lhs, rhs, Span::new(0, lhs.len()), Span::new(0, rhs.len()))
    }

    fn build_in<T: PartialEq>(lhs: &[T], rhs: &[T], left: Span, right: Span) -> Self {
        let found = if left.is_empty() || right.is_empty() {
            None
        } else {
            longest_common_run_in(lhs, rhs, left, right)
        };

        let Some(Match { left: run_left, right: run_right }) = found else {
            return Self::Unmatched {
                left: (!left.is_empty()).then_some(left),
                right: (!right.is_empty()).then_some(right),
            };
        };

        let before = Self::build_in(
            lhs,
            rhs,
            Span::new(left.start, run_left.start),
            Span::new(right.start, run_right.start),
        );
        let after = Self::build_in(
            lhs,
            rhs,
            Span::new(run_left.end, left.end),
            Span::new(run_right.end, right.end),
        );
        Self::Matched {
            left: run_left,
            right: run_right,
            before: Box::new(before),
            after: Box::new(after),
        }
    }

    /// Returns `true` for a leaf with nothing on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Unmatched { left: None, right: None })
    }

    /// Visits the tree in sequence order: `before`, the node itself, `after`.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&SplitNode),
    {
        match self {
            Self::Unmatched { .. } => visit(self),
            Self::Matched { before, after, .. } => {
                before.walk(visit);
                visit(self);
                after.walk(visit);
            }
        }
    }

    /// Collects the non-empty unmatched leaves in sequence order.
    #[must_use]
    pub fn unmatched(&self) -> Vec<(Option<Span>, Option<Span>)> {
        let mut leaves = Vec::new();
        self.walk(&mut |node| {
            if let Self::Unmatched { left, right } = node {
                if left.is_some() || right.is_some() {
                    leaves.push((*left, *right));
                }
            }
        });
        leaves
    }
}
