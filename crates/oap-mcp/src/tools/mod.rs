//! The OAP tool set.
//!
//! Each [`OapOperation`] is one MCP tool. Simple operations are a single
//! pass-through call; `save_student_details` and `save_application_progress`
//! chain several upstream calls and reshape the combined result.

mod forms;
mod lookup;
mod student;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::catalog::{ToolCatalog, ToolHandler};
use crate::client::OapClient;
use crate::envelope::ToolResult;
use crate::error::ToolError;

/// Mode used when a tool does not receive one.
pub const DEFAULT_MODE: &str = "AGENT";
/// Language used when a tool does not receive one.
pub const DEFAULT_LANGUAGE: &str = "en";
/// Form fetched after a save and by `get_application_form_config`.
pub const APPLICATION_FORM: &str = "APPLICATION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OapOperation {
    LookupData,
    OapDetails,
    OapFormDetails,
    OapSectionDetails,
    SectionConfig,
    StudentDetails,
    SaveStudentDetails,
    OpportunityDetails,
    SubmitChangeRequest,
    ApplicationAccessInfo,
    UpsertApplicationAccessInfo,
    UploadStudentOcrDocument,
    PostOcr,
    StartNewApplication,
    ApplicationFormConfig,
    SaveApplicationProgress,
}

impl OapOperation {
    pub const ALL: [OapOperation; 16] = [
        Self::LookupData,
        Self::OapDetails,
        Self::OapFormDetails,
        Self::OapSectionDetails,
        Self::SectionConfig,
        Self::StudentDetails,
        Self::SaveStudentDetails,
        Self::OpportunityDetails,
        Self::SubmitChangeRequest,
        Self::ApplicationAccessInfo,
        Self::UpsertApplicationAccessInfo,
        Self::UploadStudentOcrDocument,
        Self::PostOcr,
        Self::StartNewApplication,
        Self::ApplicationFormConfig,
        Self::SaveApplicationProgress,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LookupData => "get_lookup_data",
            Self::OapDetails => "get_oap_details",
            Self::OapFormDetails => "get_oap_form_details",
            Self::OapSectionDetails => "get_oap_section_details",
            Self::SectionConfig => "get_section_config",
            Self::StudentDetails => "get_student_details",
            Self::SaveStudentDetails => "save_student_details",
            Self::OpportunityDetails => "get_opportunity_details",
            Self::SubmitChangeRequest => "submit_change_request",
            Self::ApplicationAccessInfo => "get_application_access_info",
            Self::UpsertApplicationAccessInfo => "upsert_application_access_info",
            Self::UploadStudentOcrDocument => "upload_student_ocr_document",
            Self::PostOcr => "post_ocr",
            Self::StartNewApplication => "start_new_application",
            Self::ApplicationFormConfig => "get_application_form_config",
            Self::SaveApplicationProgress => "save_application_progress",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::LookupData => "Get lookup data by name",
            Self::OapDetails => "Get OAP configuration details",
            Self::OapFormDetails => "Get specific form details for an OAP",
            Self::OapSectionDetails => "Get specific section details for a form",
            Self::SectionConfig => "Get list of sections for a form",
            Self::StudentDetails => "Get student details",
            Self::SaveStudentDetails => {
                "Save student details and automatically fetch next form config"
            }
            Self::OpportunityDetails => "Get opportunity details",
            Self::SubmitChangeRequest => "Submit change request",
            Self::ApplicationAccessInfo => "Get application access info",
            Self::UpsertApplicationAccessInfo => "Upsert application access info",
            Self::UploadStudentOcrDocument => "Upload student OCR document",
            Self::PostOcr => "Post OCR",
            Self::StartNewApplication => {
                "Start a new application and get the first section configuration"
            }
            Self::ApplicationFormConfig => {
                "Get Application Form Configuration (returns list of sections)"
            }
            Self::SaveApplicationProgress => "Save application progress (Fetch -> Merge -> Save)",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Self::LookupData => object_schema(
                &[("name", string("Lookup name, used as the endpoint path"))],
                &[("queryParams", query_params())],
            ),
            Self::OapDetails => object_schema(
                &[
                    ("name", string("Name of the OAP")),
                    ("mode", string("Mode (e.g., 'STUDENT', 'AGENT')")),
                    ("language", string("Language code (e.g., 'en')")),
                ],
                &[],
            ),
            Self::OapFormDetails => object_schema(
                &[
                    ("oap", string("OAP Name")),
                    ("mode", string("Mode")),
                    ("form", string("Form Name")),
                    ("language", string("Language code")),
                ],
                &[],
            ),
            Self::OapSectionDetails => object_schema(
                &[
                    ("oap", string("OAP Name")),
                    ("mode", string("Mode")),
                    ("formName", string("Form Name")),
                    ("sectionName", string("Section Name")),
                    ("language", string("Language code")),
                ],
                &[],
            ),
            Self::SectionConfig => object_schema(
                &[
                    ("oapName", string("OAP Name")),
                    ("formName", string("Form Name")),
                    ("mode", string("Mode")),
                    ("language", string("Language code")),
                ],
                &[],
            ),
            Self::StudentDetails => object_schema(
                &[
                    ("oapName", string("OAP Name")),
                    ("email", string("Student Email")),
                    ("applicationId", string("Application ID")),
                ],
                &[],
            ),
            Self::SaveStudentDetails => object_schema(
                &[
                    ("oapName", string("OAP Name")),
                    ("mode", string("Mode currently used")),
                ],
                &[("oapDetail", any("OAP Detail Object"))],
            ),
            Self::OpportunityDetails => object_schema(
                &[("opportunityId", string("Opportunity ID"))],
                &[("queryParams", query_params())],
            ),
            Self::SubmitChangeRequest => object_schema(
                &[],
                &[("payload", any("Change request body")), ("queryParams", query_params())],
            ),
            Self::ApplicationAccessInfo => {
                object_schema(&[("applicationId", string("Application ID"))], &[])
            }
            Self::UpsertApplicationAccessInfo => {
                object_schema(&[], &[("payload", any("Access info body"))])
            }
            Self::UploadStudentOcrDocument => {
                object_schema(&[], &[("payload", any("Document upload body"))])
            }
            Self::PostOcr => object_schema(&[], &[("payload", any("OCR request body"))]),
            Self::StartNewApplication => object_schema(
                &[("oap", string("OAP Name (e.g., UCW)"))],
                &[("mode", string("Mode (default: AGENT)"))],
            ),
            Self::ApplicationFormConfig => object_schema(
                &[("oap", string("OAP Name"))],
                &[
                    ("mode", string("Mode (default: AGENT)")),
                    ("language", string("Language (default: en)")),
                ],
            ),
            Self::SaveApplicationProgress => object_schema(
                &[
                    ("oapName", string("OAP Name")),
                    ("email", string("Student Email")),
                    ("applicationId", string("Application ID")),
                ],
                &[("sectionData", any("Data to merge and save"))],
            ),
        }
    }
}

/// Binds one [`OapOperation`] to the client it calls through.
struct OapTool {
    client: OapClient,
    op: OapOperation,
}

#[async_trait]
impl ToolHandler for OapTool {
    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let c = &self.client;
        match self.op {
            OapOperation::LookupData => lookup::get_lookup_data(c, args).await,
            OapOperation::OapDetails => forms::get_oap_details(c, args).await,
            OapOperation::OapFormDetails => forms::get_oap_form_details(c, args).await,
            OapOperation::OapSectionDetails => forms::get_oap_section_details(c, args).await,
            OapOperation::SectionConfig => forms::get_section_config(c, args).await,
            OapOperation::StudentDetails => student::get_student_details(c, args).await,
            OapOperation::SaveStudentDetails => student::save_student_details(c, args).await,
            OapOperation::OpportunityDetails => lookup::get_opportunity_details(c, args).await,
            OapOperation::SubmitChangeRequest => lookup::submit_change_request(c, args).await,
            OapOperation::ApplicationAccessInfo => {
                lookup::get_application_access_info(c, args).await
            }
            OapOperation::UpsertApplicationAccessInfo => {
                lookup::upsert_application_access_info(c, args).await
            }
            OapOperation::UploadStudentOcrDocument => {
                lookup::upload_student_ocr_document(c, args).await
            }
            OapOperation::PostOcr => lookup::post_ocr(c, args).await,
            OapOperation::StartNewApplication => forms::start_new_application(c, args).await,
            OapOperation::ApplicationFormConfig => {
                forms::get_application_form_config(c, args).await
            }
            OapOperation::SaveApplicationProgress => {
                student::save_application_progress(c, args).await
            }
        }
    }
}

/// Register every [`OapOperation`] on `catalog`.
pub fn register_oap_tools(catalog: &mut ToolCatalog, client: OapClient) -> Result<(), ToolError> {
    for op in OapOperation::ALL {
        catalog.register(
            op.name(),
            op.description(),
            op.input_schema(),
            Arc::new(OapTool { client: client.clone(), op }),
        )?;
    }
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Build a `Map` of string query parameters.
fn params<const N: usize>(pairs: [(&str, &str); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned())))
        .collect()
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn any(description: &str) -> Value {
    json!({ "description": description })
}

fn query_params() -> Value {
    json!({ "type": "object", "description": "Extra query string parameters" })
}

fn object_schema(required: &[(&str, Value)], optional: &[(&str, Value)]) -> Value {
    let mut properties = Map::new();
    for (name, schema) in required.iter().chain(optional) {
        properties.insert((*name).to_owned(), schema.clone());
    }
    let required: Vec<&str> = required.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
