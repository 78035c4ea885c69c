//! Student detail tools, including the two chained save flows.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::forms::fetch_application_form;
use super::{DEFAULT_LANGUAGE, DEFAULT_MODE, params, parse_args};
use crate::client::{CallOptions, OapClient};
use crate::envelope::ToolResult;
use crate::error::ToolError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentKey {
    oap_name: String,
    email: String,
    application_id: String,
}

impl StudentKey {
    async fn fetch(&self, client: &OapClient) -> Result<Value, ToolError> {
        let query = params([
            ("oapName", self.oap_name.as_str()),
            ("email", self.email.as_str()),
            ("applicationId", self.application_id.as_str()),
        ]);
        Ok(client
            .call("oap/getstudentdetails", Method::GET, CallOptions::params(query))
            .await?)
    }
}

pub(super) async fn get_student_details(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let key: StudentKey = parse_args(args)?;
    let result = key.fetch(client).await?;
    Ok(ToolResult::json(&result))
}

async fn save(
    client: &OapClient,
    oap_name: &str,
    mode: &str,
    detail: Option<Value>,
) -> Result<Value, ToolError> {
    let options = CallOptions {
        payload: detail,
        params: Some(params([("oapName", oap_name), ("mode", mode)])),
    };
    Ok(client.call("oap/savestudentdetails", Method::POST, options).await?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveDetailsArgs {
    oap_name: String,
    mode: String,
    oap_detail: Option<Value>,
}

/// Save, then fetch the APPLICATION form so the caller does not have to
/// guess the next call. Returns `{ saveResult, nextFormConfig }`.
pub(super) async fn save_student_details(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: SaveDetailsArgs = parse_args(args)?;
    let save_result = save(client, &args.oap_name, &args.mode, args.oap_detail).await?;
    let next_form_config =
        fetch_application_form(client, &args.oap_name, &args.mode, DEFAULT_LANGUAGE).await?;
    Ok(ToolResult::json(&json!({
        "saveResult": save_result,
        "nextFormConfig": next_form_config,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressArgs {
    #[serde(flatten)]
    key: StudentKey,
    #[serde(default)]
    section_data: Value,
}

/// Fetch → merge → save.
///
/// The save endpoint needs a mode; it comes from the stored record's `mode`
/// field, falling back to AGENT.
pub(super) async fn save_application_progress(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: ProgressArgs = parse_args(args)?;
    let current = args.key.fetch(client).await?;
    let mode = record_mode(&current);
    let merged = merge_shallow(current, args.section_data);
    debug!(oap = %args.key.oap_name, %mode, "saving merged application progress");
    let save_result = save(client, &args.key.oap_name, &mode, Some(merged)).await?;
    Ok(ToolResult::json(&save_result))
}

/// Uppercased `mode` of a student record, or [`DEFAULT_MODE`].
fn record_mode(record: &Value) -> String {
    record
        .get("mode")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MODE)
        .to_uppercase()
}

/// Overlay the top-level keys of `patch` onto `base`.
///
/// Non-object values contribute no keys, so a non-object `base` is treated
/// as empty and a non-object `patch` leaves `base` unchanged.
fn merge_shallow(base: Value, patch: Value) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(patch) = patch {
        merged.extend(patch);
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_top_level_keys_only() {
        let base = json!({ "a": 1, "nested": { "x": 1, "y": 2 }, "keep": true });
        let patch = json!({ "a": 2, "nested": { "x": 9 } });
        assert_eq!(
            merge_shallow(base, patch),
            json!({ "a": 2, "nested": { "x": 9 }, "keep": true })
        );
    }

    #[test]
    fn merge_onto_non_object_starts_empty() {
        assert_eq!(merge_shallow(json!("oops"), json!({ "a": 1 })), json!({ "a": 1 }));
        assert_eq!(merge_shallow(Value::Null, Value::Null), json!({}));
    }

    #[test]
    fn non_object_patch_is_ignored() {
        assert_eq!(merge_shallow(json!({ "a": 1 }), json!([1, 2])), json!({ "a": 1 }));
    }

    #[test]
    fn mode_comes_from_record_uppercased() {
        assert_eq!(record_mode(&json!({ "mode": "student" })), "STUDENT");
        assert_eq!(record_mode(&json!({ "mode": "" })), "AGENT");
        assert_eq!(record_mode(&json!({ "mode": 3 })), "AGENT");
        assert_eq!(record_mode(&json!({})), "AGENT");
    }
}
