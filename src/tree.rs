//! The structured-tree contract: decomposing composite values into numeric
//! leaves and reconstructing them.
//!
//! The framework's numeric engine never inspects state types directly.
//! Instead, every composite value implements [`TreeNode`], which splits it
//! into an ordered list of leaves plus the metadata needed to rebuild it.
//! The engine maps, zips, or differentiates over the leaves and hands them
//! back; [`TreeNode::recompose`] restores the original structure.
//!
//! [`Tree`] is the generic nested payload used wherever the shape of the
//! data is only known at runtime: prognostic variable collections,
//! diagnostic outputs, and opaque randomness cores.

use std::collections::BTreeMap;

use thiserror::Error;

/// A type that can be decomposed into numeric leaves and reconstructed.
///
/// Implementors guarantee that `recompose(meta, leaves)` is the identity
/// when applied to the output of `decompose`, and that the leaf order is
/// deterministic.
pub trait TreeNode<N>: Sized {
    /// Reconstruction metadata: everything about the value except its leaves.
    type Meta;

    /// Splits the value into its ordered leaves and reconstruction metadata.
    fn decompose(self) -> (Vec<N>, Self::Meta);

    /// Rebuilds a value from metadata and an ordered list of leaves.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::LeafCount`] if the number of leaves does not
    /// match what the metadata describes.
    fn recompose(meta: Self::Meta, leaves: Vec<N>) -> Result<Self, TreeError>;

    /// Applies `f` to every leaf, preserving structure.
    ///
    /// # Errors
    ///
    /// Propagates any [`TreeError`] from reconstruction. For well-behaved
    /// implementations this cannot fail, since the leaf count is unchanged.
    fn map_leaves<F>(self, f: F) -> Result<Self, TreeError>
    where
        F: FnMut(N) -> N,
    {
        let (leaves, meta) = self.decompose();
        Self::recompose(meta, leaves.into_iter().map(f).collect())
    }
}

/// An error from rebuilding or combining structured trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("expected {expected} leaves, got {actual}")]
    LeafCount { expected: usize, actual: usize },

    #[error("tree structures do not match")]
    StructureMismatch,
}

/// A nested payload of numeric leaves.
///
/// Maps iterate in key order, so leaf ordering is deterministic and two
/// trees built from the same entries always decompose identically.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<N> {
    /// A payload with no leaves.
    Empty,
    /// A single numeric value.
    Leaf(N),
    /// An ordered sequence of subtrees.
    List(Vec<Tree<N>>),
    /// Named subtrees, ordered by key.
    Map(BTreeMap<String, Tree<N>>),
}

/// The structure of a [`Tree`] with its leaves elided.
///
/// Produced by [`TreeNode::decompose`] and consumed by
/// [`TreeNode::recompose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeShape {
    Empty,
    Leaf,
    List(Vec<TreeShape>),
    Map(Vec<(String, TreeShape)>),
}

impl TreeShape {
    /// Number of leaves a tree with this shape holds.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Leaf => 1,
            Self::List(shapes) => shapes.iter().map(Self::leaf_count).sum(),
            Self::Map(entries) => entries.iter().map(|(_, s)| s.leaf_count()).sum(),
        }
    }
}

impl<N> Tree<N> {
    /// Number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Leaf(_) => 1,
            Self::List(items) => items.iter().map(Self::leaf_count).sum(),
            Self::Map(entries) => entries.values().map(Self::leaf_count).sum(),
        }
    }

    /// The shape of this tree, without consuming it.
    #[must_use]
    pub fn shape(&self) -> TreeShape {
        match self {
            Self::Empty => TreeShape::Empty,
            Self::Leaf(_) => TreeShape::Leaf,
            Self::List(items) => TreeShape::List(items.iter().map(Self::shape).collect()),
            Self::Map(entries) => TreeShape::Map(
                entries
                    .iter()
                    .map(|(name, tree)| (name.clone(), tree.shape()))
                    .collect(),
            ),
        }
    }

    /// Transforms every leaf with `f`, preserving structure.
    ///
    /// Unlike [`TreeNode::map_leaves`], this can change the leaf type and
    /// cannot fail.
    pub fn map<M, F>(self, mut f: F) -> Tree<M>
    where
        F: FnMut(N) -> M,
    {
        self.map_inner(&mut f)
    }

    fn map_inner<M, F>(self, f: &mut F) -> Tree<M>
    where
        F: FnMut(N) -> M,
    {
        match self {
            Self::Empty => Tree::Empty,
            Self::Leaf(leaf) => Tree::Leaf(f(leaf)),
            Self::List(items) => {
                Tree::List(items.into_iter().map(|tree| tree.map_inner(f)).collect())
            }
            Self::Map(entries) => Tree::Map(
                entries
                    .into_iter()
                    .map(|(name, tree)| (name, tree.map_inner(f)))
                    .collect(),
            ),
        }
    }

    /// Combines two trees of identical structure leaf by leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StructureMismatch`] if the trees differ in
    /// shape, length, or map keys at any level.
    pub fn try_zip_map<F>(self, other: Self, mut f: F) -> Result<Self, TreeError>
    where
        F: FnMut(N, N) -> N,
    {
        self.zip_inner(other, &mut f)
    }

    fn zip_inner<F>(self, other: Self, f: &mut F) -> Result<Self, TreeError>
    where
        F: FnMut(N, N) -> N,
    {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ok(Self::Empty),
            (Self::Leaf(a), Self::Leaf(b)) => Ok(Self::Leaf(f(a, b))),
            (Self::List(a), Self::List(b)) if a.len() == b.len() => {
                let items = a
                    .into_iter()
                    .zip(b)
                    .map(|(x, y)| x.zip_inner(y, f))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::List(items))
            }
            (Self::Map(a), Self::Map(b)) if a.len() == b.len() => {
                let mut entries = BTreeMap::new();
                for ((name_a, x), (name_b, y)) in a.into_iter().zip(b) {
                    if name_a != name_b {
                        return Err(TreeError::StructureMismatch);
                    }
                    entries.insert(name_a, x.zip_inner(y, f)?);
                }
                Ok(Self::Map(entries))
            }
            _ => Err(TreeError::StructureMismatch),
        }
    }

    fn collect_leaves(self, out: &mut Vec<N>) -> TreeShape {
        match self {
            Self::Empty => TreeShape::Empty,
            Self::Leaf(leaf) => {
                out.push(leaf);
                TreeShape::Leaf
            }
            Self::List(items) => TreeShape::List(
                items
                    .into_iter()
                    .map(|tree| tree.collect_leaves(out))
                    .collect(),
            ),
            Self::Map(entries) => TreeShape::Map(
                entries
                    .into_iter()
                    .map(|(name, tree)| (name, tree.collect_leaves(out)))
                    .collect(),
            ),
        }
    }
}

impl<N> Default for Tree<N> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<N> From<N> for Tree<N> {
    fn from(leaf: N) -> Self {
        Self::Leaf(leaf)
    }
}

impl<N> TreeNode<N> for Tree<N> {
    type Meta = TreeShape;

    fn decompose(self) -> (Vec<N>, TreeShape) {
        let mut leaves = Vec::with_capacity(self.leaf_count());
        let shape = self.collect_leaves(&mut leaves);
        (leaves, shape)
    }

    fn recompose(meta: TreeShape, leaves: Vec<N>) -> Result<Self, TreeError> {
        let expected = meta.leaf_count();
        let actual = leaves.len();
        if actual != expected {
            return Err(TreeError::LeafCount { expected, actual });
        }
        let mut iter = leaves.into_iter();
        match build(&meta, &mut iter) {
            Some(tree) => Ok(tree),
            None => Err(TreeError::LeafCount { expected, actual }),
        }
    }
}

fn build<N>(shape: &TreeShape, leaves: &mut std::vec::IntoIter<N>) -> Option<Tree<N>> {
    match shape {
        TreeShape::Empty => Some(Tree::Empty),
        TreeShape::Leaf => leaves.next().map(Tree::Leaf),
        TreeShape::List(shapes) => {
            let mut items = Vec::with_capacity(shapes.len());
            for shape in shapes {
                items.push(build(shape, leaves)?);
            }
            Some(Tree::List(items))
        }
        TreeShape::Map(entries) => {
            let mut map = BTreeMap::new();
            for (name, shape) in entries {
                map.insert(name.clone(), build(shape, leaves)?);
            }
            Some(Tree::Map(map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree<i64> {
        Tree::Map(BTreeMap::from([
            (
                "temperature".to_string(),
                Tree::List(vec![Tree::Leaf(270), Tree::Leaf(280), Tree::Leaf(290)]),
            ),
            ("pressure".to_string(), Tree::Leaf(101_325)),
            ("unused".to_string(), Tree::Empty),
        ]))
    }

    #[test]
    fn decompose_orders_leaves_by_key() {
        let (leaves, _) = sample().decompose();
        // "pressure" sorts before "temperature".
        assert_eq!(leaves, vec![101_325, 270, 280, 290]);
    }

    #[test]
    fn round_trip_is_identity() {
        let tree = sample();
        let (leaves, shape) = tree.clone().decompose();
        let rebuilt = Tree::recompose(shape, leaves).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn recompose_rejects_wrong_leaf_count() {
        let (mut leaves, shape) = sample().decompose();
        leaves.pop();
        assert_eq!(
            Tree::recompose(shape, leaves),
            Err(TreeError::LeafCount {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn map_transforms_every_leaf() {
        let doubled = sample().map(|leaf| leaf * 2);
        let (leaves, _) = doubled.decompose();
        assert_eq!(leaves, vec![202_650, 540, 560, 580]);
    }

    #[test]
    fn map_leaves_matches_map() {
        let tree = sample();
        let via_trait = tree.clone().map_leaves(|leaf| leaf + 1).unwrap();
        let direct = tree.map(|leaf| leaf + 1);
        assert_eq!(via_trait, direct);
    }

    #[test]
    fn zip_map_combines_elementwise() {
        let sum = sample().try_zip_map(sample(), |a, b| a + b).unwrap();
        let (leaves, _) = sum.decompose();
        assert_eq!(leaves, vec![202_650, 540, 560, 580]);
    }

    #[test]
    fn zip_map_rejects_different_structures() {
        let a = Tree::List(vec![Tree::Leaf(1), Tree::Leaf(2)]);
        let b = Tree::List(vec![Tree::Leaf(1)]);
        assert_eq!(a.try_zip_map(b, |x, y| x + y), Err(TreeError::StructureMismatch));

        let a = Tree::Map(BTreeMap::from([("u".to_string(), Tree::Leaf(1))]));
        let b = Tree::Map(BTreeMap::from([("v".to_string(), Tree::Leaf(1))]));
        assert_eq!(a.try_zip_map(b, |x, y| x + y), Err(TreeError::StructureMismatch));
    }

    #[test]
    fn empty_tree_has_no_leaves() {
        let (leaves, shape) = Tree::<i64>::Empty.decompose();
        assert!(leaves.is_empty());
        assert_eq!(shape.leaf_count(), 0);
        assert_eq!(Tree::recompose(shape, leaves).unwrap(), Tree::Empty);
    }
}
