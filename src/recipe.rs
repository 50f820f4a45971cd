//! Elements of a build recipe
//!
//! A recipe is an ordered list of [`RecipeElement`] values. Literal elements
//! are immutable byte snapshots taken when they were appended; repeat
//! elements hold a shared handle to another [`DataBuilder`] and are only
//! evaluated when the owning recipe is materialized.

use std::fmt::{Debug, Display};

use crate::builder::DataBuilder;
use crate::target::Target;
use crate::util::HexBlob;

/// Single unit of a [`DataBuilder`] recipe
///
/// Equality and hashing are structural: literals compare by content, and
/// repeats compare by count and by the structural equality of their patterns.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum RecipeElement {
    /// Fixed bytes, copied out of the caller's buffer at append time
    Literal(Box<[u8]>),
    /// `count` successive materializations of `pattern`
    Repeat { count: u32, pattern: DataBuilder },
}

impl RecipeElement {
    /// Creates a literal element holding a private copy of `bytes`
    pub(crate) fn literal(bytes: &[u8]) -> Self {
        Self::Literal(bytes.into())
    }

    /// Appends the materialized bytes of this element to `buf`, returning the number written.
    ///
    /// A repeat element materializes its pattern afresh for every repetition,
    /// so the pattern's current recipe is what gets written.
    pub fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            RecipeElement::Literal(data) => buf.push_all(data),
            RecipeElement::Repeat { count, pattern } => {
                (0..*count).map(|_| pattern.write_to(buf)).sum()
            }
        }
    }

    /// Number of bytes [`write_to`](RecipeElement::write_to) would currently produce,
    /// saturating at `usize::MAX`
    pub fn encoded_len(&self) -> usize {
        match self {
            RecipeElement::Literal(data) => data.len(),
            RecipeElement::Repeat { count, pattern } => {
                (*count as usize).saturating_mul(pattern.encoded_len())
            }
        }
    }
}

impl Debug for RecipeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeElement::Literal(data) => f.debug_tuple("Literal").field(&HexBlob(data)).finish(),
            RecipeElement::Repeat { count, pattern } => f
                .debug_struct("Repeat")
                .field("count", count)
                .field("pattern", pattern)
                .finish(),
        }
    }
}

impl Display for RecipeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeElement::Literal(data) => write!(f, "{:?}", HexBlob(data)),
            RecipeElement::Repeat { count, pattern } => write!(f, "{count}x{pattern}"),
        }
    }
}
