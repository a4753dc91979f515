use std::fmt;

/// Coordinate axis, used to report which coordinate was read before being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Usage errors. Every mutating call validates its operands before touching the graph, so an
/// `Err` always leaves the graph unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("a link cannot connect a node to itself")]
    SelfLoop,
    #[error("node handle belongs to a different graph")]
    ForeignNode,
    #[error("link handle belongs to a different graph")]
    ForeignLink,
    #[error("node handle refers to a deleted node")]
    StaleNode,
    #[error("link handle refers to a deleted link")]
    StaleLink,
    #[error("{axis} coordinate read before it was set")]
    UnsetCoordinate { axis: Axis },
}

pub type Result<T> = std::result::Result<T, Error>;
