//! OpenAPI documentation configuration

use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

/// Combined OpenAPI documentation for the storefront API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Spectacles API",
        version = "0.1.0",
        description = "Storefront backend: accounts, eyewear catalog and orders",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:4000", description = "Local development server")
    ),
    nest(
        (path = "/api/v1", api = domain_users::ApiDoc),
        (path = "/api/v1/spectacles", api = domain_spectacles::ApiDoc),
        (path = "/api/v1/orders", api = domain_orders::ApiDoc)
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by signup or login"))
                        .build(),
                ),
            )
        }
    }
}
