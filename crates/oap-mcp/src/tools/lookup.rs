//! Single-call pass-through tools.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::parse_args;
use crate::client::{CallOptions, OapClient};
use crate::envelope::ToolResult;
use crate::error::ToolError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupArgs {
    name: String,
    query_params: Option<Map<String, Value>>,
}

pub(super) async fn get_lookup_data(client: &OapClient, args: Value) -> Result<ToolResult, ToolError> {
    let args: LookupArgs = parse_args(args)?;
    let options = CallOptions::default().with_params(args.query_params);
    let result = client.call(&args.name, Method::GET, options).await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpportunityArgs {
    opportunity_id: String,
    query_params: Option<Map<String, Value>>,
}

pub(super) async fn get_opportunity_details(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: OpportunityArgs = parse_args(args)?;
    let endpoint = format!("oap/opportunity/{}", args.opportunity_id);
    let options = CallOptions::default().with_params(args.query_params);
    let result = client.call(&endpoint, Method::GET, options).await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadArgs {
    /// Absent or `null` means no request body.
    payload: Option<Value>,
    query_params: Option<Map<String, Value>>,
}

pub(super) async fn submit_change_request(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: PayloadArgs = parse_args(args)?;
    let options = CallOptions { payload: args.payload, params: args.query_params };
    let result = client.call("oap/submitchangerequest", Method::POST, options).await?;
    Ok(ToolResult::json(&result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationIdArgs {
    application_id: String,
}

pub(super) async fn get_application_access_info(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: ApplicationIdArgs = parse_args(args)?;
    let endpoint = format!("oap/accessinfo/{}", args.application_id);
    let result = client.call(&endpoint, Method::GET, CallOptions::default()).await?;
    Ok(ToolResult::json(&result))
}

pub(super) async fn upsert_application_access_info(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: PayloadArgs = parse_args(args)?;
    let result = client
        .call("oap/accessinfo", Method::PATCH, CallOptions { payload: args.payload, params: None })
        .await?;
    Ok(ToolResult::json(&result))
}

pub(super) async fn upload_student_ocr_document(
    client: &OapClient,
    args: Value,
) -> Result<ToolResult, ToolError> {
    let args: PayloadArgs = parse_args(args)?;
    let result = client
        .call(
            "oap/uploadstudentOcrdocument",
            Method::POST,
            CallOptions { payload: args.payload, params: None },
        )
        .await?;
    Ok(ToolResult::json(&result))
}

pub(super) async fn post_ocr(client: &OapClient, args: Value) -> Result<ToolResult, ToolError> {
    let args: PayloadArgs = parse_args(args)?;
    let result = client.post_ocr(args.payload).await?;
    Ok(ToolResult::json(&result))
}
