//! Browser-side bindings the note host calls once per rendered fragment.
//!
//! The host's post-processing pipeline hands over the fragment's markdown
//! source together with its storage adapter (a resolver callback); the
//! rewritten HTML comes back as a string or as streamed chunks.

use frameflow_core::{RenderError, ResourceResolver, RewriteOptions};
use js_sys::Function;
use std::io::{self, Write};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Rewrites one rendered markdown fragment and returns the final HTML.
///
/// `resolve` is the host's storage adapter: called with each trimmed
/// directive argument, it returns the locator the frame should point at.
#[wasm_bindgen(js_name = render_fragment)]
pub fn render_fragment(
    input: &str,
    resolve: &Function,
    options: JsValue,
) -> Result<String, JsError> {
    let options = parse_options(options)?;
    let resolver = JsResolver::new(resolve.clone());

    frameflow_core::render_fragment(input, &resolver, &options).map_err(to_js_error)
}

/// Streams rewritten HTML chunks into the provided JavaScript callback.
///
/// The callback is invoked with each UTF-8 chunk the pipeline produces, so
/// callers can forward output to a `WritableStream`, append to the DOM
/// incrementally, or buffer it manually.
#[wasm_bindgen(js_name = stream_fragment)]
pub fn stream_fragment(
    input: &str,
    resolve: &Function,
    chunk_callback: &Function,
    options: JsValue,
) -> Result<(), JsError> {
    let options = parse_options(options)?;
    let resolver = JsResolver::new(resolve.clone());
    let writer = JsChunkWriter::new(chunk_callback.clone());

    frameflow_core::stream_fragment(input, &resolver, &options, writer).map_err(to_js_error)?;
    Ok(())
}

/// Returns the version string reported by the core crate.
#[wasm_bindgen]
pub fn version() -> String {
    frameflow_core::version().to_string()
}

fn parse_options(options: JsValue) -> Result<RewriteOptions, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(RewriteOptions::default());
    }

    serde_wasm_bindgen::from_value(options).map_err(|err| JsError::new(&err.to_string()))
}

fn to_js_error(err: RenderError) -> JsError {
    JsError::new(&err.to_string())
}

/// Host storage adapter surfaced as a JS callback.
///
/// Resolution is infallible on the Rust side, so a callback that throws or
/// returns a non-string falls back to the raw identifier; the resulting
/// frame renders broken, which is the contracted failure mode.
struct JsResolver {
    callback: Function,
}

impl JsResolver {
    fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl ResourceResolver for JsResolver {
    fn resolve(&self, identifier: &str) -> String {
        self.callback
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(identifier))
            .ok()
            .and_then(|value| value.as_string())
            .unwrap_or_else(|| identifier.to_string())
    }
}

struct JsChunkWriter {
    callback: Function,
}

impl JsChunkWriter {
    fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl Write for JsChunkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = std::str::from_utf8(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        self.callback
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(chunk))
            .map_err(js_callback_error)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn js_callback_error(err: JsValue) -> io::Error {
    let message = err
        .as_string()
        .or_else(|| {
            js_sys::JSON::stringify(&err)
                .ok()
                .and_then(|s| s.as_string())
        })
        .unwrap_or_else(|| "callback threw".to_string());
    io::Error::other(message)
}
