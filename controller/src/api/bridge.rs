use crate::api::model::{AllocateRequest, AnalyzeRequest, ErrorBody, ImageList};
use crate::workflow::runner::{AnalysisResult, Runner};
use anyhow::Context;
use log::{info, warn};
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use trafficcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use trafficcore::CountVector;
use warp::http::StatusCode;
use warp::reply::{self, Json, WithStatus};
use warp::{Filter, Rejection, Reply};

pub fn bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

type Response = WithStatus<Json>;

fn respond<T: Serialize>(body: &T, status: StatusCode) -> Response {
    reply::with_status(reply::json(body), status)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    respond(&ErrorBody::new(message), status)
}

/// HTTP surface over the workflow runner: image listing, analysis, and
/// direct timing allocation.
#[derive(Clone)]
pub struct ApiBridge {
    runner: Arc<Runner>,
    latest: Arc<RwLock<Option<AnalysisResult>>>,
    metrics: Arc<MetricsRecorder>,
}

impl ApiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            runner,
            latest: Arc::new(RwLock::new(None)),
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn publish(&self, result: &AnalysisResult) {
        if let Ok(mut guard) = self.latest.write() {
            *guard = Some(result.clone());
        }
        info!(
            "published counts {} ({}) cycle {}s",
            result.counts, result.prediction, result.timings.cycle_length
        );
    }

    pub fn latest(&self) -> Option<AnalysisResult> {
        self.latest.read().ok().and_then(|guard| guard.clone())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let bridge = self.clone();
        let state = warp::any().map(move || bridge.clone());

        let images = warp::path("images")
            .and(warp::path::end())
            .and(warp::get())
            .and(state.clone())
            .and_then(list_images);

        let analyze = warp::path("analyze")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state.clone())
            .and_then(analyze_image);

        let allocate = warp::path("allocate")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state.clone())
            .and_then(allocate_plan);

        let latest = warp::path("latest")
            .and(warp::path::end())
            .and(warp::get())
            .and(state.clone())
            .map(|bridge: ApiBridge| reply::json(&bridge.latest()));

        let metrics = warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(state)
            .map(|bridge: ApiBridge| reply::json(&bridge.metrics()));

        images.or(analyze).or(allocate).or(latest).or(metrics)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<S>(self, addr: SocketAddr, shutdown: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding HTTP bridge to {}", addr))?;
        info!("HTTP bridge listening on {}", bound);
        server.await;
        Ok(())
    }

    /// Accepts paths as given or relative to the data directory.
    fn resolve_image(&self, requested: &str) -> Option<PathBuf> {
        let candidate = PathBuf::from(requested);
        if candidate.is_file() {
            return Some(candidate);
        }
        let in_data_dir = self.runner.config().data_dir.join(&candidate);
        in_data_dir.is_file().then_some(in_data_dir)
    }
}

async fn list_images(bridge: ApiBridge) -> Result<Response, Infallible> {
    match bridge.runner.list_images() {
        Ok(images) => Ok(respond(&ImageList { images }, StatusCode::OK)),
        Err(err) => {
            warn!("image listing error: {:#}", err);
            bridge.metrics.record_error();
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Listing images failed: {:#}", err),
            ))
        }
    }
}

async fn analyze_image(request: AnalyzeRequest, bridge: ApiBridge) -> Result<Response, Infallible> {
    let requested = match request.image_path {
        Some(path) if !path.trim().is_empty() => path,
        _ => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                "Image path is required",
            ))
        }
    };
    let Some(path) = bridge.resolve_image(&requested) else {
        return Ok(error_response(
            StatusCode::NOT_FOUND,
            format!("Image not found: {}", requested),
        ));
    };

    match bridge.runner.analyze_path(&path) {
        Ok(result) => {
            bridge.metrics.record_analysis(result.counts.total());
            bridge.publish(&result);
            Ok(respond(&result, StatusCode::OK))
        }
        Err(err) => {
            warn!("analyze error: {:#}", err);
            bridge.metrics.record_error();
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Analysis failed: {:#}", err),
            ))
        }
    }
}

async fn allocate_plan(request: AllocateRequest, bridge: ApiBridge) -> Result<Response, Infallible> {
    let plan = CountVector::try_from(request.counts)
        .and_then(|counts| bridge.runner.allocate(&counts, request.label));
    match plan {
        Ok(plan) => {
            bridge.metrics.record_allocation();
            Ok(respond(&plan, StatusCode::OK))
        }
        Err(err) => {
            bridge.metrics.record_error();
            Ok(error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))
        }
    }
}
