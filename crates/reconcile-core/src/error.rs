use std::error::Error as StdError;

use reconcile_html::TokenizeError;
use thiserror::Error;

use crate::node::Address;

/// Failures of the offset-tracking tree builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer could not continue.
    #[error("tokenizer failure: {0}")]
    Tokenizer(#[from] TokenizeError),

    /// No `<` could be found scanning back from a start tag's end.
    #[error("malformed markup: no '<' found at or before byte {offset}")]
    MalformedMarkup {
        /// Where the backward scan started.
        offset: usize,
    },

    /// A backward scan was asked to cover an impossible window.
    #[error("invalid scan window {start}..={end} for a {len}-byte source")]
    Bounds {
        /// Lowest offset of the window.
        start: usize,
        /// Highest offset of the window (scanned first).
        end: usize,
        /// Length of the source.
        len: usize,
    },

    /// An end tag arrived while no element was open.
    #[error("unexpected end tag </{name}> at byte {offset}: no element is open")]
    UnexpectedEndTag {
        /// Name of the stray end tag.
        name: String,
        /// Offset just past the end tag.
        offset: usize,
    },
}

/// A positional address that walks off the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("address {address} is out of range at depth {depth}: index {index} but {len} live children")]
pub struct AddressOutOfRange {
    /// The full address being resolved.
    pub address: Address,
    /// Depth at which the walk failed.
    pub depth: usize,
    /// The index requested at that depth.
    pub index: usize,
    /// How many live children were actually there.
    pub len: usize,
}

impl AddressOutOfRange {
    /// Attach the index of the patch whose target could not be located.
    #[must_use]
    pub fn at_patch(self, patch: usize) -> ApplyError {
        ApplyError::OutOfRange {
            patch,
            address: self.address,
            depth: self.depth,
            index: self.index,
            len: self.len,
        }
    }
}

/// Failures while applying a patch batch. Patches before `patch` have already
/// been applied and are not rolled back.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A target or parent address does not exist in the live tree.
    #[error(
        "patch {patch}: address {address} is out of range at depth {depth}: index {index} but {len} live children"
    )]
    OutOfRange {
        /// Index of the failing patch in the batch.
        patch: usize,
        /// The address being resolved.
        address: Address,
        /// Depth at which the walk failed.
        depth: usize,
        /// The index requested at that depth.
        index: usize,
        /// How many live children were actually there.
        len: usize,
    },

    /// The live document rejected a mutation.
    #[error("patch {patch}: live document rejected the mutation")]
    Host {
        /// Index of the failing patch in the batch.
        patch: usize,
        /// The host's own error.
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl ApplyError {
    /// Index of the patch that failed.
    #[must_use]
    pub const fn patch_index(&self) -> usize {
        match self {
            Self::OutOfRange { patch, .. } | Self::Host { patch, .. } => *patch,
        }
    }

    pub(crate) fn host<E>(patch: usize) -> impl FnOnce(E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        move |err| Self::Host {
            patch,
            source: Box::new(err),
        }
    }
}
