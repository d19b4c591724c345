//! Service banner and health check.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct Endpoints {
    pub users: &'static str,
    pub blogs: &'static str,
}

#[derive(Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// GET /
pub async fn banner() -> HttpResponse {
    HttpResponse::Ok().json(BannerResponse {
        message: "WriteFlow API is running!",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            users: "/api/v1/user",
            blogs: "/api/v1/blog",
        },
    })
}

/// GET /health
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
