use thiserror::Error;

/// Fatal tokenizer failures. Recoverable parse errors are only warned about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// The input ended before a tag was closed with `>`.
    #[error("input ended inside the tag starting at byte {offset}")]
    EofInTag {
        /// Offset of the tag's `<`.
        offset: usize,
    },
}
