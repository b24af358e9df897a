use actix_web::HttpResponse;

/// GET /health_check: liveness probe, touches neither the database nor the cache
pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
