use actix::Addr;
use actix_web::{get, http::header::ContentType, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use super::registry::Registry;
use super::session::WsSession;

#[get("/health_check")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// The served client application. Opaque to the relay: it is the producer
/// and consumer of the JSON envelopes, nothing more.
#[get("/")]
async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(include_str!("../../static/index.html"))
}

/// The identifier segment of the path is the client's authoritative identity
/// for the whole connection; `client_id` fields inside message bodies are
/// advisory and ignored.
#[get("/ws/{client_id}")]
async fn join(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    registry: web::Data<Addr<Registry>>,
) -> Result<HttpResponse, Error> {
    let client_id = path.into_inner();
    let session = WsSession::new(client_id, registry.get_ref().clone());
    ws::start(session, &req, stream)
}
