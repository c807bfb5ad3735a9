use std::io;
use thiserror::Error;

/// Failures surfaced by the pipeline entry points.
///
/// Directive handling has no error channel of its own: a paragraph that does
/// not match the pattern is skipped, and an identifier the resolver cannot
/// map still produces a frame, just one with an unresolvable source.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The destination writer failed while HTML was being streamed out.
    #[error("i/o failure while streaming rendered html")]
    Io(#[from] io::Error),

    /// lol_html rejected the document during the post-pass.
    #[error("html post-pass failed: {0}")]
    Rewrite(String),
}
