//! WASM bindings for the CSS custom-property resolver.
//!
//! Exposes `transform()` and `transformSources()` to JavaScript via wasm-bindgen.
//! Both return a JS object `{ css, variables }` or throw on a parse failure.

use cssvars_transform::{Options, Transformed, Warning};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Transform one stylesheet.
///
/// `options` takes the camelCase keys of the library's `Options`; `undefined` or
/// `null` selects the defaults. `onWarning` receives each warning message.
#[wasm_bindgen]
pub fn transform(
    css: &str,
    options: JsValue,
    on_warning: Option<js_sys::Function>,
) -> Result<JsValue, JsError> {
    transform_sources(vec![css.to_string()], options, on_warning)
}

/// Transform several stylesheets as one, in order.
#[wasm_bindgen(js_name = transformSources)]
pub fn transform_sources(
    sources: Vec<String>,
    options: JsValue,
    on_warning: Option<js_sys::Function>,
) -> Result<JsValue, JsError> {
    let options = decode_options(options)?;
    let sources: Vec<&str> = sources.iter().map(String::as_str).collect();

    let mut callback_failed = false;
    let transformed = run(&sources, &options, |warning| {
        if let Some(callback) = &on_warning {
            let message = JsValue::from_str(&warning.to_string());
            callback_failed |= callback.call1(&JsValue::NULL, &message).is_err();
        }
    })
    .map_err(|e| JsError::new(&e))?;

    if callback_failed {
        return Err(JsError::new("onWarning callback threw"));
    }

    // Plain objects rather than JS Maps for the variable table.
    transformed
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Get the resolver version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn decode_options(options: JsValue) -> Result<Options, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(Options::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsError::new(&format!("Invalid options: {e}")))
}

fn run<F>(sources: &[&str], options: &Options, on_warning: F) -> Result<Transformed, String>
where
    F: FnMut(Warning),
{
    cssvars_transform::transform_sources(sources, options, on_warning).map_err(|e| e.to_string())
}
