//! Cartesian product enumeration over small sets of variables.
//!
//! [`CartesianProduct`] walks every joint assignment of an ordered node list,
//! odometer style: the first node changes fastest and carries into the next
//! when its domain wraps. [`summary_of`] and [`max_of`] fold a function over
//! all assignments of a neighbourhood with one pivot node held fixed.

use std::collections::HashMap;
use std::hash::Hash;

use crate::core::{Assignment, CellId, Occupancy};
use crate::error::{GridError, Result};

/// Finite domain of every node.
pub trait SampleSpace<N> {
    type Value: Copy;

    /// Values `node` may take, in enumeration order.
    fn domain(&self, node: &N) -> &[Self::Value];
}

/// `{Free, Occupied}` for every cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySpace;

impl SampleSpace<CellId> for BinarySpace {
    type Value = Occupancy;

    fn domain(&self, _node: &CellId) -> &[Occupancy] {
        &Occupancy::ALL
    }
}

/// Explicit per-node domains. Unknown nodes have an empty domain.
impl<N: Eq + Hash, V: Copy> SampleSpace<N> for HashMap<N, Vec<V>> {
    type Value = V;

    fn domain(&self, node: &N) -> &[V] {
        self.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Write target for enumerated values.
pub trait Assign<N, V> {
    fn assign(&mut self, node: N, value: V);
}

impl<N: Eq + Hash, V> Assign<N, V> for HashMap<N, V> {
    fn assign(&mut self, node: N, value: V) {
        self.insert(node, value);
    }
}

impl Assign<CellId, Occupancy> for Assignment {
    fn assign(&mut self, node: CellId, value: Occupancy) {
        self.set(node, value);
    }
}

/// Enumerator over every joint assignment of `nodes`.
///
/// ```ignore
/// let nodes = [CellId(0), CellId(1)];
/// let mut product = CartesianProduct::new(&nodes, &BinarySpace);
/// let mut assignment = Assignment::new();
/// while product.advance(&mut assignment)? {
///     // 4 iterations: FF, OF, FO, OO
/// }
/// ```
#[derive(Debug)]
pub struct CartesianProduct<'a, N, S> {
    nodes: &'a [N],
    space: &'a S,

    /// Domain position of each node.
    positions: Vec<usize>,

    /// The previous call wrote the final configuration.
    last_iteration: bool,

    /// `false` has been returned.
    exhausted: bool,
}

impl<'a, N: Clone, S: SampleSpace<N>> CartesianProduct<'a, N, S> {
    pub fn new(nodes: &'a [N], space: &'a S) -> Self {
        let mut product = Self {
            nodes,
            space,
            positions: vec![0; nodes.len()],
            last_iteration: false,
            exhausted: false,
        };
        product.reset();
        product
    }

    /// Restart from the first configuration.
    pub fn reset(&mut self) {
        self.positions.iter_mut().for_each(|p| *p = 0);
        self.exhausted = false;
        // A node with nothing to assign leaves no configuration
        self.last_iteration = self
            .nodes
            .iter()
            .any(|node| self.space.domain(node).is_empty());
    }

    /// Number of configurations, `∏ |domain|`.
    pub fn len(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| self.space.domain(node).len())
            .product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the current configuration into `target` and step forward.
    ///
    /// Returns `Ok(true)` once per configuration, then `Ok(false)` once (the
    /// target is left untouched), then [`GridError::EnumerationExhausted`]
    /// until [`reset`](Self::reset).
    pub fn advance<A: Assign<N, S::Value>>(&mut self, target: &mut A) -> Result<bool> {
        if self.exhausted {
            return Err(GridError::EnumerationExhausted);
        }
        if self.last_iteration {
            self.exhausted = true;
            return Ok(false);
        }

        let mut carry = true;
        for (node, position) in self.nodes.iter().zip(self.positions.iter_mut()) {
            let domain = self.space.domain(node);
            target.assign(node.clone(), domain[*position]);

            if carry {
                *position += 1;
                if *position == domain.len() {
                    *position = 0;
                } else {
                    carry = false;
                }
            }
        }

        self.last_iteration = carry;
        Ok(true)
    }
}

/// Sum of `func` over every assignment of `dependent` with `pivot` fixed to
/// `pivot_value`.
///
/// `pivot` may or may not appear in `dependent`; it is never enumerated.
pub fn summary_of<N, S, A, F>(
    mut func: F,
    dependent: &[N],
    space: &S,
    pivot: &N,
    pivot_value: S::Value,
) -> Result<f64>
where
    N: Clone + PartialEq,
    S: SampleSpace<N>,
    A: Assign<N, S::Value> + Default,
    F: FnMut(&A) -> f64,
{
    let mut total = 0.0;
    fold_neighborhood(dependent, space, pivot, pivot_value, |a: &A| {
        total += func(a)
    })?;
    Ok(total)
}

/// Maximum of `func` over the same assignments as [`summary_of`].
///
/// Starts from `-∞`, so all-negative log-potentials are handled.
pub fn max_of<N, S, A, F>(
    mut func: F,
    dependent: &[N],
    space: &S,
    pivot: &N,
    pivot_value: S::Value,
) -> Result<f64>
where
    N: Clone + PartialEq,
    S: SampleSpace<N>,
    A: Assign<N, S::Value> + Default,
    F: FnMut(&A) -> f64,
{
    let mut best = f64::NEG_INFINITY;
    fold_neighborhood(dependent, space, pivot, pivot_value, |a: &A| {
        best = best.max(func(a))
    })?;
    Ok(best)
}

fn fold_neighborhood<N, S, A, F>(
    dependent: &[N],
    space: &S,
    pivot: &N,
    pivot_value: S::Value,
    mut visit: F,
) -> Result<()>
where
    N: Clone + PartialEq,
    S: SampleSpace<N>,
    A: Assign<N, S::Value> + Default,
    F: FnMut(&A),
{
    let others: Vec<N> = dependent.iter().filter(|n| *n != pivot).cloned().collect();

    let mut assignment = A::default();
    assignment.assign(pivot.clone(), pivot_value);

    let mut product = CartesianProduct::new(&others, space);
    while product.advance(&mut assignment)? {
        visit(&assignment);
    }
    Ok(())
}
