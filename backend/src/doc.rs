//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API:
//! endpoint paths from the inbound layer, schema wrappers for the domain
//! error envelope, and the bearer-token security scheme. Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::inbound::http::categories::CategoryResponse;
use crate::inbound::http::complaints::{
    AttachmentResponse, CategoryCountResponse, ComplaintDetailResponse, ComplaintSummaryResponse,
    CreateComplaintResponse, DashboardStatsResponse, MessageResponse, StatusSummaryResponse,
    StatusUpdateResponse, UpdateStatusRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Redress complaint-management API",
        description = "HTTP interface for complaint submission, triage, and the status ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::complaints::submit_complaint,
        crate::inbound::http::complaints::my_complaints,
        crate::inbound::http::complaints::all_complaints,
        crate::inbound::http::complaints::dashboard_stats,
        crate::inbound::http::complaints::complaint_detail,
        crate::inbound::http::complaints::update_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        CategoryResponse,
        ComplaintSummaryResponse,
        StatusUpdateResponse,
        AttachmentResponse,
        ComplaintDetailResponse,
        CreateComplaintResponse,
        MessageResponse,
        UpdateStatusRequest,
        StatusSummaryResponse,
        CategoryCountResponse,
        DashboardStatsResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_contains_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/categories",
            "/api/complaints",
            "/api/complaints/my-complaints",
            "/api/complaints/stats/dashboard",
            "/api/complaints/{id}",
            "/api/complaints/{id}/status",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}
