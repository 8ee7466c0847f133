//! HTTP surface: one POST handler per test family
//!
//! Handlers are thin: deserialize, normalize, call the engine, map the
//! error taxonomy onto status codes. All computation stays synchronous
//! inside the stats crate.

use axum::{http::StatusCode, routing::post, Json, Router};
use hypatia_core::StatError;
use hypatia_stats::{
    one_sample_t_test, paired_t_test, proportion_z_test, two_sample_t_test, two_sample_z_test,
    OneSampleTReport, PairedTReport, ProportionZReport, TwoSampleTReport, TwoSampleZReport,
};
use serde::Serialize;

use crate::input::{
    OneSampleTRequest, PairedTRequest, ProportionZRequest, TwoSampleTRequest, TwoSampleZRequest,
};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Classify a failure, log it, and build the wire error.
fn map_err(endpoint: &'static str, err: StatError) -> ApiError {
    if err.is_client_error() {
        tracing::error!(endpoint, code = err.code(), "{err}");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )
    } else {
        tracing::error!(endpoint, code = err.code(), "unexpected failure: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "An unexpected error occurred. Please try again later.".to_string(),
            }),
        )
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/api/z-test", post(z_test))
        .route("/api/two-sample-z-test", post(two_sample_z))
        .route("/api/one-sample-t-test", post(one_sample_t))
        .route("/api/two-sample-t-test", post(two_sample_t))
        .route("/api/paired-t-test", post(paired_t))
}

// Sync cores, separated from the extractors so tests can drive them
// without a socket.

fn run_z_test(request: &ProportionZRequest) -> Result<ProportionZReport, StatError> {
    let input = request.normalize()?;
    proportion_z_test(
        input.group1,
        input.group2,
        input.yates_correction,
        &input.options,
    )
}

fn run_two_sample_z(request: &TwoSampleZRequest) -> Result<TwoSampleZReport, StatError> {
    let input = request.normalize()?;
    two_sample_z_test(
        &input.group1,
        &input.group2,
        (&input.labels.0, &input.labels.1),
        &input.grouping_variable,
        &input.options,
    )
}

fn run_one_sample_t(request: &OneSampleTRequest) -> Result<OneSampleTReport, StatError> {
    let input = request.normalize()?;
    one_sample_t_test(&input.sample, input.population_mean, &input.options)
}

fn run_two_sample_t(request: &TwoSampleTRequest) -> Result<TwoSampleTReport, StatError> {
    let input = request.normalize()?;
    two_sample_t_test(
        &input.group1,
        &input.group2,
        (&input.labels.0, &input.labels.1),
        &input.options,
    )
}

fn run_paired_t(request: &PairedTRequest) -> Result<PairedTReport, StatError> {
    let input = request.normalize()?;
    paired_t_test(&input.before, &input.after, &input.options)
}

async fn z_test(Json(request): Json<ProportionZRequest>) -> Result<Json<ProportionZReport>, ApiError> {
    tracing::info!(endpoint = "z-test", "request received");
    run_z_test(&request)
        .map(Json)
        .map_err(|e| map_err("z-test", e))
}

async fn two_sample_z(
    Json(request): Json<TwoSampleZRequest>,
) -> Result<Json<TwoSampleZReport>, ApiError> {
    tracing::info!(endpoint = "two-sample-z-test", "request received");
    run_two_sample_z(&request)
        .map(Json)
        .map_err(|e| map_err("two-sample-z-test", e))
}

async fn one_sample_t(
    Json(request): Json<OneSampleTRequest>,
) -> Result<Json<OneSampleTReport>, ApiError> {
    tracing::info!(endpoint = "one-sample-t-test", "request received");
    run_one_sample_t(&request)
        .map(Json)
        .map_err(|e| map_err("one-sample-t-test", e))
}

async fn two_sample_t(
    Json(request): Json<TwoSampleTRequest>,
) -> Result<Json<TwoSampleTReport>, ApiError> {
    tracing::info!(endpoint = "two-sample-t-test", "request received");
    run_two_sample_t(&request)
        .map(Json)
        .map_err(|e| map_err("two-sample-t-test", e))
}

async fn paired_t(Json(request): Json<PairedTRequest>) -> Result<Json<PairedTReport>, ApiError> {
    tracing::info!(endpoint = "paired-t-test", "request received");
    run_paired_t(&request)
        .map(Json)
        .map_err(|e| map_err("paired-t-test", e))
}
