//! WASM bindings
//!
//! Runs a sectional analysis in the browser from the same JSON request the
//! HTTP server accepts.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::io::{run_request, AnalysisReport, AnalysisRequest};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<AnalysisReport>,
    ms_elapsed: u64,
}

/// Analyze a section
///
/// Takes the JSON analysis request and returns a JSON envelope with either
/// the report or an error message. Intended to be called from a Web Worker.
#[wasm_bindgen]
pub fn analyze(request_json: &str) -> String {
    let start = js_sys::Date::now();

    let outcome = AnalysisRequest::from_json(request_json)
        .map_err(|e| format!("Failed to parse request: {}", e))
        .and_then(|request| run_request(&request).map_err(|e| e.to_string()));

    let elapsed = js_sys::Date::now() - start;
    let response = match outcome {
        Ok(mut report) => {
            report.metadata.computation_time = Some(elapsed / 1000.0);
            AnalysisResponse {
                success: true,
                error: None,
                results: Some(report),
                ms_elapsed: elapsed as u64,
            }
        }
        Err(error) => AnalysisResponse {
            success: false,
            error: Some(error),
            results: None,
            ms_elapsed: elapsed as u64,
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"Serialization failed: {}"}}"#, e)
    })
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
