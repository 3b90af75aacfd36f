//! Error types for the repair engine.
//!
//! Every fallible operation validates its inputs before touching the partition or the ledger, so
//! an `Err` always means no state was changed.

use std::fmt;
use thiserror::Error;

/// Result type for repair operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Why a `(from, to)` pair is not a legal swap-shift move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveViolation {
    SameNode,
    NotAdjacent,
    OutOfRange,
}

impl fmt::Display for MoveViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameNode => write!(f, "nodes are identical"),
            Self::NotAdjacent => write!(f, "nodes share no coupler"),
            Self::OutOfRange => write!(f, "node id outside the hardware graph"),
        }
    }
}

/// Defects in an initial chain assignment handed to a repair session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedDefect {
    /// The owner map does not cover exactly the hardware nodes.
    WrongLength { expected: usize, found: usize },
    /// A hardware node is owned by a logical vertex that does not exist.
    UnknownOwner { node: usize, owner: usize },
    /// A logical vertex with required edges owns no hardware node.
    MissingChain { vertex: usize },
    /// A hardware node was listed in more than one chain.
    DuplicateNode { node: usize },
    /// A hardware node was listed in no chain.
    UnassignedNode { node: usize },
}

impl fmt::Display for SeedDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { expected, found } => {
                write!(f, "owner map has {found} entries, hardware has {expected} nodes")
            }
            Self::UnknownOwner { node, owner } => {
                write!(f, "node {node} is owned by unknown logical vertex {owner}")
            }
            Self::MissingChain { vertex } => {
                write!(f, "logical vertex {vertex} has required edges but no chain")
            }
            Self::DuplicateNode { node } => write!(f, "node {node} appears in several chains"),
            Self::UnassignedNode { node } => write!(f, "node {node} belongs to no chain"),
        }
    }
}

/// Why the connectivity policy refused a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    WouldEmptyChain,
    WouldSplitChain,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldEmptyChain => write!(f, "chain would become empty"),
            Self::WouldSplitChain => write!(f, "chain would split"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbeddingError {
    /// The pair does not describe a shift onto a hardware-adjacent node.
    #[error("invalid move ({from} -> {to}): {reason}")]
    InvalidMove {
        from: usize,
        to: usize,
        reason: MoveViolation,
    },

    /// The initial chain assignment cannot seed a repair session.
    #[error("malformed seed: {0}")]
    MalformedSeed(SeedDefect),

    /// The move is legal but the configured connectivity policy refuses it.
    #[error("move of node {node} rejected for chain {chain}: {reason}")]
    MoveRejected {
        node: usize,
        chain: usize,
        reason: RejectReason,
    },

    #[error("node {node} out of range (graph has {len} nodes)")]
    NodeOutOfRange { node: usize, len: usize },

    /// An update would drive a contact weight below zero; the ledger no longer matches the partition.
    #[error("contact ledger underflow on chain pair ({a}, {b})")]
    LedgerUnderflow { a: usize, b: usize },
}
