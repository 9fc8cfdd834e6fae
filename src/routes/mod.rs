use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use http::{HeaderMap, Request, Response};
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::Any;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers;
use crate::models::AppState;

pub fn init(state: AppState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any);
    let trace = TraceLayer::new_for_http()
        .make_span_with(|_request: &Request<axum::body::Body>| tracing::debug_span!("http-request"))
        .on_request(|request: &Request<axum::body::Body>, _span: &Span| {
            tracing::debug!("started {} {}", request.method(), request.uri().path())
        })
        .on_response(
            |_response: &Response<axum::body::Body>, latency: Duration, _span: &Span| {
                tracing::debug!("response generated in {:?}", latency)
            },
        )
        .on_body_chunk(|chunk: &Bytes, _latency: Duration, _span: &Span| {
            tracing::debug!("sending {} bytes", chunk.len())
        })
        .on_eos(
            |_trailers: Option<&HeaderMap>, stream_duration: Duration, _span: &Span| {
                tracing::debug!("stream closed after {:?}", stream_duration)
            },
        )
        .on_failure(
            |error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                tracing::error!("something went wrong: {error:?} latency: {latency:?}")
            },
        );
    Router::new()
        .route("/status", get(handlers::status))
        .route("/countries", get(handlers::list).post(handlers::create))
        .route("/countries/refresh", post(handlers::refresh))
        .route("/countries/image", get(handlers::image))
        .route(
            "/countries/{name}",
            get(handlers::get_one)
                .delete(handlers::delete_one)
                .patch(handlers::update_one),
        )
        .with_state(state)
        .layer(trace)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
}
