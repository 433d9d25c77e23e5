use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::client::PredictClient;
use crate::controller::{Controller, PendingPredict, UiState};
use crate::preview::SelectedFile;
use crate::render::render_page;

#[derive(Clone)]
pub struct AppState {
    controller: Arc<Mutex<Controller>>,
    client: PredictClient,
}

impl AppState {
    pub fn new(client: PredictClient) -> Self {
        Self {
            controller: Arc::new(Mutex::new(Controller::new())),
            client,
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/choose", get(open_chooser))
        .route(
            "/select",
            post(select_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/submit", post(submit))
        .route("/food", get(select_food))
        .route("/tab/:index", get(select_tab))
        .route("/state", get(snapshot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let controller = state.controller.lock().await;
    Html(render_page(controller.state()))
}

async fn open_chooser(State(state): State<AppState>) -> Redirect {
    state.controller.lock().await.open_file_chooser();
    Redirect::to("/")
}

async fn select_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, StatusCode> {
    let mut selected = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let declared_mime = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(bad_upload)?;

        // An empty file input still submits a nameless, empty part.
        if name.is_empty() && bytes.is_empty() {
            continue;
        }
        let name = if name.is_empty() { "image".to_string() } else { name };
        selected = Some(SelectedFile::new(name, bytes.to_vec(), declared_mime.as_deref()));
    }

    state.controller.lock().await.select_file(selected);
    Ok(Redirect::to("/"))
}

fn bad_upload(err: MultipartError) -> StatusCode {
    warn!("Rejecting upload: {}", err);
    StatusCode::BAD_REQUEST
}

async fn submit(State(state): State<AppState>) -> Redirect {
    let pending = state.controller.lock().await.begin_submit();
    match pending {
        Ok(pending) => {
            tokio::spawn(run_prediction(state.clone(), pending));
        }
        Err(err) => debug!("Submit ignored: {}", err),
    }
    Redirect::to("/")
}

/// The controller lock is not held while the request is in flight.
async fn run_prediction(state: AppState, pending: PendingPredict) {
    let outcome = state.client.predict(&pending.file).await;
    state
        .controller
        .lock()
        .await
        .finish_submit(pending.seq, outcome);
}

#[derive(Deserialize)]
struct FoodQuery {
    label: String,
}

async fn select_food(State(state): State<AppState>, Query(query): Query<FoodQuery>) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.select_food(&query.label) {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            warn!("{}", err);
            (StatusCode::NOT_FOUND, Html(render_page(controller.state()))).into_response()
        }
    }
}

async fn select_tab(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.select_tab(index) {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            warn!("{}", err);
            (StatusCode::CONFLICT, Html(render_page(controller.state()))).into_response()
        }
    }
}

async fn snapshot(State(state): State<AppState>) -> Json<UiState> {
    let controller = state.controller.lock().await;
    Json(controller.state().clone())
}
