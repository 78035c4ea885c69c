use utoipa::OpenApi;

use crate::routes::{chats, health, mcp, notes};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "oap-server",
        description = "Notes, chats and the OAP MCP tool gateway",
        version = "0.1.0"
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(notes::NotesApi::openapi());
    root.merge(chats::ChatsApi::openapi());
    root.merge(mcp::McpApi::openapi());
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = serde_json::to_value(get_docs()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in ["/health", "/api/notes", "/api/notes/{id}", "/chats", "/chats/{id}/messages", "/mcp"] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
    }
}
