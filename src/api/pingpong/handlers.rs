//! Ping/pong handlers.

use std::time::Duration;

use axum::{extract::State, http::HeaderMap, Json};

use crate::api::pingpong::models::{
    PingRequest, PongResponse, SendPingRequest, SendPingResponse, INVALID_PING, PONG,
};
use crate::api::API_V1_PREFIX;
use crate::http::server::AppState;
use crate::observability::context::{inject_context, RequestContext};

/// Timeout for the outbound call to the peer's `/pong`.
pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Answer `Ping` (trimmed, any case) with `Pong`.
pub async fn pong(
    State(state): State<AppState>,
    cx: RequestContext,
    Json(request): Json<PingRequest>,
) -> Json<PongResponse> {
    let logger = &state.logger;
    crate::info!(logger, cx = &cx, ping_message = &request.message, "Received ping request");

    if !request.message.trim().eq_ignore_ascii_case("ping") {
        crate::warning!(
            logger,
            cx = &cx,
            expected = "Ping",
            received_message = &request.message,
            "Invalid ping message received"
        );
        return Json(PongResponse {
            message: INVALID_PING.to_string(),
        });
    }

    crate::info!(logger, cx = &cx, "Responding with Pong");
    Json(PongResponse {
        message: PONG.to_string(),
    })
}

/// Send `request.message` to `{url}/api/v1/pong` and report the answer.
pub async fn ping(
    State(state): State<AppState>,
    cx: RequestContext,
    Json(request): Json<SendPingRequest>,
) -> Json<SendPingResponse> {
    let logger = &state.logger;
    crate::info!(
        logger,
        cx = &cx,
        url = &request.url,
        ping_message = &request.message,
        "Sending ping to remote service"
    );

    let (status_code, response_message) = match send_ping(&state.client, &cx, &request).await {
        Ok(answer) => answer,
        Err(e) if e.is_status() => {
            crate::error!(
                logger,
                cx = &cx,
                url = &request.url,
                status_code = e.status().map(|s| s.as_u16()),
                err = &e,
                "HTTP error when sending ping"
            );
            return Json(SendPingResponse::failed());
        }
        Err(e) if e.is_decode() => {
            crate::error!(
                logger,
                cx = &cx,
                url = &request.url,
                err = &e,
                "Unexpected error when sending ping"
            );
            return Json(SendPingResponse::failed());
        }
        Err(e) => {
            crate::error!(
                logger,
                cx = &cx,
                url = &request.url,
                err = &e,
                "Request error when sending ping"
            );
            return Json(SendPingResponse::failed());
        }
    };

    crate::info!(
        logger,
        cx = &cx,
        url = &request.url,
        status_code = status_code,
        response_message = &response_message,
        "Received response from remote service"
    );

    if response_message != PONG {
        crate::warning!(
            logger,
            cx = &cx,
            url = &request.url,
            response_message = &response_message,
            "Unexpected response message from remote service"
        );
        return Json(SendPingResponse {
            success: false,
            response_message: Some(response_message),
        });
    }

    Json(SendPingResponse {
        success: true,
        response_message: Some(response_message),
    })
}

async fn send_ping(
    client: &reqwest::Client,
    cx: &RequestContext,
    request: &SendPingRequest,
) -> Result<(u16, String), reqwest::Error> {
    let mut headers = HeaderMap::new();
    inject_context(cx, &mut headers);

    let url = format!("{}{API_V1_PREFIX}/pong", request.url.trim_end_matches('/'));
    let response = client
        .post(url)
        .timeout(PING_TIMEOUT)
        .headers(headers)
        .json(&PingRequest {
            message: request.message.clone(),
        })
        .send()
        .await?
        .error_for_status()?;

    let status = response.status().as_u16();
    let body: PongResponse = response.json().await?;
    Ok((status, body.message))
}
