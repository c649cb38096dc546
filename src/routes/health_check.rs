use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Used by the load balancer. Empty body; viewing the status requires
/// `curl -v`.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
