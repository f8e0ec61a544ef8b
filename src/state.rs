//! Simulation-state containers.
//!
//! [`ModelState`] bundles everything a model step produces: the prognostic
//! variables it evolves, optional diagnostic output, and optional
//! randomness state. [`Randomness`] describes the model's random process.
//! Both are registered tree nodes, so the numeric engine can traverse them
//! leaf by leaf, and `ModelState` additionally composes like a struct of
//! numbers via [`try_add`](ModelState::try_add),
//! [`try_sub`](ModelState::try_sub), and [`scale`](ModelState::scale).

use std::collections::BTreeMap;

use crate::{
    numeric::Numeric,
    tree::{Tree, TreeError, TreeNode, TreeShape},
};

/// Simulation state split into prognostic, diagnostic, and randomness groups.
///
/// Instances are immutable in the functional sense: every operation returns
/// a new state rather than mutating in place. The diagnostic and randomness
/// mappings default to freshly constructed empty maps.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelState<N> {
    /// Prognostic variables describing the evolving simulation state.
    pub prognostics: Tree<N>,
    /// Diagnostic values derived during the step.
    pub diagnostics: BTreeMap<String, Tree<N>>,
    /// Randomness state describing the stochasticity of the model.
    pub randomness: BTreeMap<String, Tree<N>>,
}

impl<N> ModelState<N> {
    /// Creates a state holding only prognostics, with empty diagnostic and
    /// randomness mappings.
    pub fn new(prognostics: Tree<N>) -> Self {
        Self {
            prognostics,
            diagnostics: BTreeMap::new(),
            randomness: BTreeMap::new(),
        }
    }

    /// Replaces the diagnostic mapping.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: BTreeMap<String, Tree<N>>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Replaces the randomness mapping.
    #[must_use]
    pub fn with_randomness(mut self, randomness: BTreeMap<String, Tree<N>>) -> Self {
        self.randomness = randomness;
        self
    }
}

impl<N: Numeric> ModelState<N> {
    /// Adds two states leaf by leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StructureMismatch`] if the states do not share
    /// the same structure (tree shapes and mapping keys).
    pub fn try_add(self, other: Self) -> Result<Self, TreeError> {
        self.try_zip(other, |a, b| a + b)
    }

    /// Subtracts `other` from `self` leaf by leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::StructureMismatch`] if the states do not share
    /// the same structure.
    pub fn try_sub(self, other: Self) -> Result<Self, TreeError> {
        self.try_zip(other, |a, b| a - b)
    }

    /// Scales every leaf by `factor`.
    #[must_use]
    pub fn scale(self, factor: N) -> Self {
        Self {
            prognostics: self.prognostics.map(|leaf| leaf * factor.clone()),
            diagnostics: scale_map(self.diagnostics, &factor),
            randomness: scale_map(self.randomness, &factor),
        }
    }

    fn try_zip<F>(self, other: Self, mut f: F) -> Result<Self, TreeError>
    where
        F: FnMut(N, N) -> N,
    {
        Ok(Self {
            prognostics: self.prognostics.try_zip_map(other.prognostics, &mut f)?,
            diagnostics: zip_maps(self.diagnostics, other.diagnostics, &mut f)?,
            randomness: zip_maps(self.randomness, other.randomness, &mut f)?,
        })
    }
}

fn scale_map<N: Numeric>(
    entries: BTreeMap<String, Tree<N>>,
    factor: &N,
) -> BTreeMap<String, Tree<N>> {
    entries
        .into_iter()
        .map(|(name, tree)| (name, tree.map(|leaf| leaf * factor.clone())))
        .collect()
}

fn zip_maps<N, F>(
    a: BTreeMap<String, Tree<N>>,
    b: BTreeMap<String, Tree<N>>,
    f: &mut F,
) -> Result<BTreeMap<String, Tree<N>>, TreeError>
where
    F: FnMut(N, N) -> N,
{
    if a.len() != b.len() {
        return Err(TreeError::StructureMismatch);
    }
    let mut out = BTreeMap::new();
    for ((name_a, tree_a), (name_b, tree_b)) in a.into_iter().zip(b) {
        if name_a != name_b {
            return Err(TreeError::StructureMismatch);
        }
        out.insert(name_a, tree_a.try_zip_map(tree_b, &mut *f)?);
    }
    Ok(out)
}

/// Reconstruction metadata for [`ModelState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStateMeta {
    prognostics: TreeShape,
    diagnostics: Vec<(String, TreeShape)>,
    randomness: Vec<(String, TreeShape)>,
}

impl ModelStateMeta {
    fn leaf_count(&self) -> usize {
        let maps: usize = self
            .diagnostics
            .iter()
            .chain(&self.randomness)
            .map(|(_, shape)| shape.leaf_count())
            .sum();
        self.prognostics.leaf_count() + maps
    }
}

/// Leaves are ordered prognostics first, then diagnostics and randomness in
/// key order.
impl<N> TreeNode<N> for ModelState<N> {
    type Meta = ModelStateMeta;

    fn decompose(self) -> (Vec<N>, ModelStateMeta) {
        let mut leaves = Vec::new();
        let (mut prognostic_leaves, prognostics) = self.prognostics.decompose();
        leaves.append(&mut prognostic_leaves);
        let diagnostics = decompose_map(self.diagnostics, &mut leaves);
        let randomness = decompose_map(self.randomness, &mut leaves);
        (
            leaves,
            ModelStateMeta {
                prognostics,
                diagnostics,
                randomness,
            },
        )
    }

    fn recompose(meta: ModelStateMeta, leaves: Vec<N>) -> Result<Self, TreeError> {
        let expected = meta.leaf_count();
        let actual = leaves.len();
        if actual != expected {
            return Err(TreeError::LeafCount { expected, actual });
        }
        let mut iter = leaves.into_iter();
        let count = meta.prognostics.leaf_count();
        let prognostics = Tree::recompose(meta.prognostics, iter.by_ref().take(count).collect())?;
        let diagnostics = recompose_map(meta.diagnostics, &mut iter)?;
        let randomness = recompose_map(meta.randomness, &mut iter)?;
        Ok(Self {
            prognostics,
            diagnostics,
            randomness,
        })
    }
}

fn decompose_map<N>(
    entries: BTreeMap<String, Tree<N>>,
    leaves: &mut Vec<N>,
) -> Vec<(String, TreeShape)> {
    let mut shapes = Vec::with_capacity(entries.len());
    for (name, tree) in entries {
        let (mut tree_leaves, shape) = tree.decompose();
        leaves.append(&mut tree_leaves);
        shapes.push((name, shape));
    }
    shapes
}

fn recompose_map<N>(
    shapes: Vec<(String, TreeShape)>,
    leaves: &mut std::vec::IntoIter<N>,
) -> Result<BTreeMap<String, Tree<N>>, TreeError> {
    let mut out = BTreeMap::new();
    for (name, shape) in shapes {
        let count = shape.leaf_count();
        out.insert(
            name,
            Tree::recompose(shape, leaves.by_ref().take(count).collect())?,
        );
    }
    Ok(out)
}

/// State describing the model's random process.
///
/// The generator key and step counter are leaves alongside whatever nested
/// payload the random process keeps in `core`, so the numeric engine
/// traverses into all three.
#[derive(Debug, Clone, PartialEq)]
pub struct Randomness<N> {
    /// Random-generator key.
    pub prng_key: N,
    /// Step counter for the random process.
    pub prng_step: N,
    /// Opaque nested payload owned by the random process.
    pub core: Tree<N>,
}

impl<N: Numeric> Randomness<N> {
    /// Creates a randomness state at step zero with an empty core.
    pub fn new(prng_key: N) -> Self {
        Self {
            prng_key,
            prng_step: N::from(0),
            core: Tree::Empty,
        }
    }

    /// Replaces the nested core payload.
    #[must_use]
    pub fn with_core(mut self, core: Tree<N>) -> Self {
        self.core = core;
        self
    }
}

/// Leaves are `(prng_key, prng_step)` followed by the core's leaves; the
/// metadata is the core's shape.
impl<N> TreeNode<N> for Randomness<N> {
    type Meta = TreeShape;

    fn decompose(self) -> (Vec<N>, TreeShape) {
        let (core_leaves, core_shape) = self.core.decompose();
        let mut leaves = Vec::with_capacity(2 + core_leaves.len());
        leaves.push(self.prng_key);
        leaves.push(self.prng_step);
        leaves.extend(core_leaves);
        (leaves, core_shape)
    }

    fn recompose(meta: TreeShape, leaves: Vec<N>) -> Result<Self, TreeError> {
        let expected = 2 + meta.leaf_count();
        let actual = leaves.len();
        if actual != expected {
            return Err(TreeError::LeafCount { expected, actual });
        }
        let mut iter = leaves.into_iter();
        match (iter.next(), iter.next()) {
            (Some(prng_key), Some(prng_step)) => Ok(Self {
                prng_key,
                prng_step,
                core: Tree::recompose(meta, iter.collect())?,
            }),
            _ => Err(TreeError::LeafCount { expected, actual }),
        }
    }
}
