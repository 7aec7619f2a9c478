//! Zia Junior compiler as a WASM module for browser environments.
//!
//! This crate exposes block-to-source generation and the direct
//! interpreter via `wasm-bindgen`, for use from the block editor page.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { generate, preview } from 'zia-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(generate(workspaceJson, "{}"));
//! // { success: true, source: "var x = 2 + 3;\nafficher x;\n", hash: "…", warnings: [] }
//!
//! const log = JSON.parse(preview(result.source, false));
//! // { success: true, text: "📦 Variable x = 5\n📺 5", entries: [ … ] }
//!
//! const hello = JSON.parse(example("hello"));
//! // { success: true, project: { blocks: [ … ] }, message: "Exemple \"hello\" chargé! …" }
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;
use zia_compiler::{
    example as find_example, ProjectDocument, RunConfig, RunOutcome, Workspace, EXAMPLES,
};
use zia_eval::{Interpreter, InterpreterConfig, NoInput, OutputLog, VirtualClock};

/// JSON payload of [`generate`].
#[derive(Debug, Serialize)]
struct GenerateResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl GenerateResponse {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            source: None,
            hash: None,
            warnings: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// JSON payload of [`preview`] and [`run`].
#[derive(Debug, Serialize)]
struct RunResponse {
    success: bool,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<RunOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<OutputLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RunResponse {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            text: String::new(),
            outcome: None,
            entries: None,
            error: Some(error.to_string()),
        }
    }
}

/// JSON payload of [`example`].
#[derive(Debug, Serialize)]
struct ExampleResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// One entry of [`examples`].
#[derive(Debug, Serialize)]
struct ExampleSummary {
    name: &'static str,
    title: &'static str,
}

fn to_json(value: &impl Serialize) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"error":"Serialization error: {}"}}"#,
            e.to_string().replace('"', "'")
        )
    })
}

fn parse_config(config_json: &str) -> Result<RunConfig, serde_json::Error> {
    if config_json.trim().is_empty() {
        Ok(RunConfig::default())
    } else {
        RunConfig::from_json(config_json)
    }
}

fn generate_response(project_json: &str, config_json: &str) -> GenerateResponse {
    let config = match parse_config(config_json) {
        Ok(config) => config,
        Err(e) => return GenerateResponse::failure(e),
    };
    let (mut workspace, warnings) = match Workspace::from_project(project_json, config) {
        Ok(loaded) => loaded,
        Err(e) => return GenerateResponse::failure(e),
    };
    let result = workspace.generate();
    GenerateResponse {
        success: true,
        source: Some(result.program.text()),
        hash: Some(result.hash.clone()),
        warnings: warnings.iter().map(ToString::to_string).collect(),
        error: None,
    }
}

/// Generate Zia source from a saved workspace.
///
/// `config_json` is a partial `RunConfig` (an empty string means defaults).
/// Returns a JSON string:
/// ```json
/// { "success": true, "source": "…", "hash": "…", "warnings": [] }
/// ```
/// On failure `success` is `false` and `error` holds the message.
#[wasm_bindgen]
pub fn generate(project_json: &str, config_json: &str) -> String {
    to_json(&generate_response(project_json, config_json))
}

/// Same as [`generate`], returned as a JS object instead of a string.
#[wasm_bindgen]
pub fn generate_object(project_json: &str, config_json: &str) -> Result<JsValue, JsValue> {
    let response = generate_response(project_json, config_json);
    serde_wasm_bindgen::to_value(&response).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Run Zia source on the direct interpreter.
///
/// Pauses complete immediately and `demander` answers are empty. Returns
/// the log as text and as structured entries.
#[wasm_bindgen]
pub fn preview(source: &str, strict: bool) -> String {
    let interpreter = Interpreter::new(InterpreterConfig { strict });
    let log = interpreter.execute_with(source, NoInput, &mut VirtualClock::new());
    to_json(&RunResponse {
        success: true,
        text: log.to_string(),
        outcome: None,
        entries: Some(log),
        error: None,
    })
}

/// Generate a saved workspace and run it on the configured backend.
///
/// No native engine is attached in this module, so the `native` backend
/// reports that the engine is still loading.
#[wasm_bindgen]
pub fn run(project_json: &str, config_json: &str) -> String {
    let response = parse_config(config_json)
        .map_err(|e| e.to_string())
        .and_then(|config| {
            Workspace::from_project(project_json, config).map_err(|e| e.to_string())
        })
        .map(|(mut workspace, _)| {
            let outcome = workspace.run_with(NoInput, &mut VirtualClock::new());
            RunResponse {
                success: true,
                text: outcome.to_string(),
                outcome: Some(outcome),
                entries: None,
                error: None,
            }
        })
        .unwrap_or_else(RunResponse::failure);
    to_json(&response)
}

/// Fetch a built-in example program as a project document, ready to be
/// loaded into the editor.
#[wasm_bindgen]
pub fn example(name: &str) -> String {
    let response = find_example(name)
        .and_then(|example| Ok((example.document()?, example.loaded_message())))
        .map(|(project, message)| ExampleResponse {
            success: true,
            project: Some(project),
            message: Some(message),
            error: None,
        })
        .unwrap_or_else(|e| ExampleResponse {
            success: false,
            project: None,
            message: None,
            error: Some(e.to_string()),
        });
    to_json(&response)
}

/// List the built-in examples as `[{ "name": …, "title": … }]`.
#[wasm_bindgen]
pub fn examples() -> String {
    let summaries: Vec<ExampleSummary> = EXAMPLES
        .iter()
        .map(|e| ExampleSummary {
            name: e.name,
            title: e.title,
        })
        .collect();
    to_json(&summaries)
}

/// Return the compiler version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"{
      "variables": [{ "id": "v1", "name": "x" }],
      "blocks": [{
        "type": "var_declaration",
        "fields": { "VAR": "v1" },
        "inputs": { "VALUE": { "type": "math_number", "fields": { "NUM": "5" } } },
        "next": {
          "type": "afficher_text",
          "inputs": { "TEXT": { "type": "variables_get", "fields": { "VAR": "v1" } } }
        }
      }]
    }"#;

    fn parse(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_generate() {
        let out = parse(&generate(PROJECT, ""));
        assert_eq!(out["success"], true);
        assert_eq!(out["source"], "var x = 5;\nafficher x;\n");
        assert_eq!(out["warnings"], serde_json::json!([]));
    }

    #[test]
    fn test_generate_reports_bad_json() {
        let out = parse(&generate("{", ""));
        assert_eq!(out["success"], false);
        assert!(out["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid project document"));
    }

    #[test]
    fn test_generate_honours_indent() {
        let project = r#"{ "blocks": [{
          "type": "controls_tantque",
          "inputs": { "DO": { "type": "controls_quitter" } }
        }] }"#;
        let out = parse(&generate(project, r#"{"generator": {"indent_width": 2}}"#));
        assert_eq!(out["source"], "tantque (faux) {\n  quitter;\n}\n");
    }

    #[test]
    fn test_preview() {
        let out = parse(&preview("var x = 2 + 3;\nafficher x;", false));
        assert_eq!(out["text"], "📦 Variable x = 5\n📺 5");
        assert_eq!(out["entries"][0]["kind"], "declaration");
    }

    #[test]
    fn test_run_interpreter_backend() {
        let out = parse(&run(PROJECT, ""));
        assert_eq!(out["success"], true);
        assert_eq!(out["text"], "📦 Variable x = 5\n📺 5");
        assert_eq!(out["outcome"]["outcome"], "interpreted");
    }

    #[test]
    fn test_run_native_backend_without_engine() {
        let out = parse(&run(PROJECT, r#"{"backend": "native"}"#));
        assert_eq!(out["outcome"]["outcome"], "engine_loading");
    }

    #[test]
    fn test_example_loads_and_generates() {
        let out = parse(&example("hello"));
        assert_eq!(out["success"], true);
        assert_eq!(out["project"]["blocks"][0]["type"], "afficher_text");
        assert!(out["message"].as_str().unwrap().starts_with("Exemple \"hello\""));

        let project = out["project"].to_string();
        let generated = parse(&generate(&project, ""));
        assert_eq!(
            generated["source"],
            "afficher \"Bonjour! Je suis Zia Junior 🎉\";\n"
        );
    }

    #[test]
    fn test_unknown_example() {
        let out = parse(&example("robot"));
        assert_eq!(out["success"], false);
        assert_eq!(out["error"], "no example program named 'robot'");
    }

    #[test]
    fn test_examples_lists_names() {
        let out = parse(&examples());
        let names: Vec<&str> = out
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["hello", "count", "story"]);
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
