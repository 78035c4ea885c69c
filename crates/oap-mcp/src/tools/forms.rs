//! OAP configuration, form and section lookups.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{APPLICATION_FORM, DEFAULT_LANGUAGE, DEFAULT_MODE, params, parse_args};
use crate::client::{CallOptions, OapClient};
use crate::envelope::ToolResult;
use crate::error::ToolError;

#[derive(Deserialize)]
struct OapDetailsArgs {
    name: String,
    mode: String,
    language: String,
}

/// Name and mode are uppercased; the OAP API keys on the uppercase form.
pub(super) async fn get_oap_details(client: &OapClient, args: Value) -> Result<ToolResult, ToolError> {
    let args: OapDetailsArgs = parse_args(args)?;
    let query = params([
        ("name", args.name.to_uppercase().as_str()),
        ("mode", args.mode.to_uppercase().as_str()),
        ("language", args.language.as_str()),
    ]);
    let result = client.call("oap", Method::GET, CallOptions::params(query)).await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
struct FormDetailsArgs {
    oap: String,
    mode: String,
    form: String,
    language: String,
}

pub(super) async fn get_oap_form_details(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: FormDetailsArgs = parse_args(args)?;
    let query = params([
        ("oap", args.oap.as_str()),
        ("mode", args.mode.as_str()),
        ("form", args.form.as_str()),
        ("language", args.language.as_str()),
    ]);
    let result = client.call("oap/forms", Method::GET, CallOptions::params(query)).await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionDetailsArgs {
    oap: String,
    mode: String,
    form_name: String,
    section_name: String,
    language: String,
}

pub(super) async fn get_oap_section_details(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: SectionDetailsArgs = parse_args(args)?;
    let query = params([
        ("oap", args.oap.as_str()),
        ("mode", args.mode.as_str()),
        ("formName", args.form_name.as_str()),
        ("sectionName", args.section_name.as_str()),
        ("language", args.language.as_str()),
    ]);
    let result = client
        .call("oap/form/sections", Method::GET, CallOptions::params(query))
        .await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionConfigArgs {
    oap_name: String,
    form_name: String,
    mode: String,
    language: String,
}

pub(super) async fn get_section_config(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: SectionConfigArgs = parse_args(args)?;
    let query = params([
        ("oapName", args.oap_name.as_str()),
        ("formName", args.form_name.as_str()),
        ("mode", args.mode.as_str()),
        ("language", args.language.as_str()),
    ]);
    let result = client.call("oap/sections", Method::GET, CallOptions::params(query)).await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
struct StartApplicationArgs {
    oap: String,
    mode: Option<String>,
}

/// Every application opens on BASIC_INFO / STUDENT_INFO.
pub(super) async fn start_new_application(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: StartApplicationArgs = parse_args(args)?;
    let mode = args.mode.as_deref().unwrap_or(DEFAULT_MODE).to_uppercase();
    let query = params([
        ("oap", args.oap.to_uppercase().as_str()),
        ("mode", mode.as_str()),
        ("formName", "BASIC_INFO"),
        ("sectionName", "STUDENT_INFO"),
        ("language", DEFAULT_LANGUAGE),
    ]);
    let result = client
        .call("oap/form/sections", Method::GET, CallOptions::params(query))
        .await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
struct FormConfigArgs {
    oap: String,
    mode: Option<String>,
    language: Option<String>,
}

/// Returns `{ "formDetails": ... }`; callers walk `formDetails.section[]`.
pub(super) async fn get_application_form_config(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: FormConfigArgs = parse_args(args)?;
    let form_details = fetch_application_form(
        client,
        &args.oap,
        args.mode.as_deref().unwrap_or(DEFAULT_MODE),
        args.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
    )
    .await?;
    Ok(ToolResult::json(&json!({ "formDetails": form_details })))
}

/// GET `oap/forms` for the APPLICATION form of `oap`.
pub(super) async fn fetch_application_form(
    client: &OapClient,
    oap: &str,
    mode: &str,
    language: &str,
) -> Result<Value, ToolError> {
    let query = params([
        ("oap", oap.to_uppercase().as_str()),
        ("form", APPLICATION_FORM),
        ("mode", mode.to_uppercase().as_str()),
        ("language", language),
    ]);
    Ok(client.call("oap/forms", Method::GET, CallOptions::params(query)).await?)
}
