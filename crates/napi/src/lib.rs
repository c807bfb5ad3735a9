#![deny(missing_docs)]
//! Node/Electron bindings that surface the frameflow pipeline.

use frameflow_core::{BaseUrlResolver, RewriteOptions};
use napi_derive::napi;

/// Returns the version string reported by the core crate.
#[napi]
pub fn version() -> String {
    frameflow_core::version().to_string()
}

/// Rewrites one rendered markdown fragment, resolving directive arguments
/// against `resource_base` (the URL the host serves its document store
/// under).
#[napi]
pub fn render_fragment(input: String, resource_base: String) -> napi::Result<String> {
    let resolver = BaseUrlResolver::new(resource_base);

    frameflow_core::render_fragment(&input, &resolver, &RewriteOptions::default())
        .map_err(|err| napi::Error::from_reason(err.to_string()))
}
