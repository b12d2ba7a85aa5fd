use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use futures_util::StreamExt;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ChatError;
use crate::models::ChatResponse;
use crate::AppState;

/// Collects the request body, refusing anything over `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::Bytes, ChatError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(ChatError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

pub async fn chat(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, ChatError> {
    let request_id = Uuid::new_v4();
    let body = read_body(payload, state.max_body_size);

    async move {
        match state.ai_service.handle(http_req.method(), body).await {
            Ok(result) => Ok(HttpResponse::Ok().json(ChatResponse::from(result))),
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!(error = %e, "chat request failed");
                } else {
                    warn!(error = %e, "chat request rejected");
                }
                Err(e)
            }
        }
    }
    .instrument(info_span!("chat", %request_id))
    .await
}
