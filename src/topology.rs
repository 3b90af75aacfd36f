//! Read-only adjacency structures for the two graphs an embedding relates.
//!
//! Both graphs are stored as symmetric CSR matrices so that neighbour enumeration is a slice of
//! the column index array and never allocates.

use crate::error::{EmbeddingError, Result};
use sprs::{CsMat, TriMat};
use std::collections::BTreeSet;

/// Builds a symmetric 0/1 adjacency matrix from an undirected edge list, dropping self-loops and
/// duplicate edges.
fn symmetric_adjacency(num_nodes: usize, edges: &[(usize, usize)]) -> Result<CsMat<u8>> {
    let mut unique = BTreeSet::new();
    for &(a, b) in edges {
        for node in [a, b] {
            if node >= num_nodes {
                return Err(EmbeddingError::NodeOutOfRange {
                    node,
                    len: num_nodes,
                });
            }
        }
        if a != b {
            unique.insert((a.min(b), a.max(b)));
        }
    }

    let mut adjacency = TriMat::<u8>::new((num_nodes, num_nodes));
    for (a, b) in unique {
        adjacency.add_triplet(a, b, 1);
        adjacency.add_triplet(b, a, 1);
    }

    Ok(adjacency.to_csr())
}

/// Returns the row of a CSR matrix as a slice of column indices.
fn row(matrix: &CsMat<u8>, i: usize) -> &[usize] {
    let indptr = matrix.indptr();
    let offsets = indptr.raw_storage();
    let base = offsets[0];
    &matrix.indices()[offsets[i] - base..offsets[i + 1] - base]
}

/// The physical coupling graph of the annealer. Node ids are dense, `0..num_nodes()`.
#[derive(Debug, Clone)]
pub struct HardwareTopology {
    adjacency: CsMat<u8>,
}

impl HardwareTopology {
    /// Builds the topology from a list of couplers.
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if a coupler names a node `>= num_nodes`.
    pub fn new(num_nodes: usize, couplers: &[(usize, usize)]) -> Result<Self> {
        Ok(Self {
            adjacency: symmetric_adjacency(num_nodes, couplers)?,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.rows()
    }

    pub fn num_couplers(&self) -> usize {
        self.adjacency.nnz() / 2
    }

    /// Hardware neighbours of `node`.
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` for an unknown node.
    pub fn neighbors(&self, node: usize) -> Result<&[usize]> {
        self.check(node)?;
        Ok(row(&self.adjacency, node))
    }

    /// Unchecked neighbour lookup for callers that validated `node` already.
    pub(crate) fn neighbors_of(&self, node: usize) -> &[usize] {
        row(&self.adjacency, node)
    }

    /// Whether a coupler joins `a` and `b`. Out-of-range ids are never adjacent.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        a < self.num_nodes() && b < self.num_nodes() && self.adjacency.get(a, b).is_some()
    }

    /// Every coupler once, as `(low, high)`.
    pub fn couplers(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_nodes()).flat_map(move |a| {
            self.neighbors_of(a)
                .iter()
                .filter(move |&&b| a < b)
                .map(move |&b| (a, b))
        })
    }

    fn check(&self, node: usize) -> Result<()> {
        if node < self.num_nodes() {
            Ok(())
        } else {
            Err(EmbeddingError::NodeOutOfRange {
                node,
                len: self.num_nodes(),
            })
        }
    }
}

/// The logical graph whose edges must each be realised by at least one coupler between the
/// corresponding chains.
#[derive(Debug, Clone)]
pub struct LogicalRequirementGraph {
    adjacency: CsMat<u8>,
}

impl LogicalRequirementGraph {
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if an edge names a vertex `>= num_vertices`.
    pub fn new(num_vertices: usize, required: &[(usize, usize)]) -> Result<Self> {
        Ok(Self {
            adjacency: symmetric_adjacency(num_vertices, required)?,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.rows()
    }

    pub fn num_required(&self) -> usize {
        self.adjacency.nnz() / 2
    }

    /// Logical vertices sharing a required edge with `vertex`.
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` for an unknown vertex.
    pub fn required_incident(&self, vertex: usize) -> Result<&[usize]> {
        if vertex >= self.num_vertices() {
            return Err(EmbeddingError::NodeOutOfRange {
                node: vertex,
                len: self.num_vertices(),
            });
        }
        Ok(row(&self.adjacency, vertex))
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.required_incident(vertex).map_or(0, <[usize]>::len)
    }

    pub fn is_required(&self, a: usize, b: usize) -> bool {
        a < self.num_vertices() && b < self.num_vertices() && self.adjacency.get(a, b).is_some()
    }

    /// Every required edge once, as `(low, high)`.
    pub fn required_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_vertices()).flat_map(move |a| {
            row(&self.adjacency, a)
                .iter()
                .filter(move |&&b| a < b)
                .map(move |&b| (a, b))
        })
    }
}
