use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ControllerError, PredictError};
use crate::models::{FoodEntry, PredictReply, Prediction, Recipe, RecipeCatalog};
use crate::preview::{Preview, SelectedFile};

pub const PLACEHOLDER_TEXT: &str = "No file chosen, yet!";
pub const NO_FILE_NOTICE: &str = "Please choose an image first.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    FileSelected,
    Submitting,
    ResultsShown,
    ErrorShown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultView {
    #[default]
    Empty,
    Predictions(Vec<Prediction>),
    /// Error text reported by the prediction service, shown verbatim.
    Rejected(String),
    ServerError,
}

/// Everything the page shows. Rendering reads only this.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UiState {
    pub chooser_open: bool,
    pub file: Option<SelectedFile>,
    pub preview: Option<Preview>,
    pub submit_enabled: bool,
    pub loading: bool,
    pub notice: Option<String>,
    pub results: ResultView,
    pub catalog: Option<RecipeCatalog>,
    pub selected_food: Option<String>,
    pub selected_tab: Option<usize>,
    /// Responses tagged with any other sequence number are dropped.
    pub latest_seq: u64,
}

impl UiState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            return Phase::Submitting;
        }
        match self.results {
            ResultView::Predictions(_) => Phase::ResultsShown,
            ResultView::Rejected(_) | ResultView::ServerError => Phase::ErrorShown,
            ResultView::Empty if self.file.is_some() => Phase::FileSelected,
            ResultView::Empty => Phase::Idle,
        }
    }

    pub fn selected_entry(&self) -> Option<&FoodEntry> {
        let label = self.selected_food.as_deref()?;
        self.catalog.as_ref()?.find(label)
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.selected_entry()?.recipes.get(self.selected_tab?)
    }

    fn clear_results(&mut self) {
        self.results = ResultView::Empty;
        self.catalog = None;
        self.selected_food = None;
        self.selected_tab = None;
    }
}

/// A request handed out by [`Controller::begin_submit`].
#[derive(Debug, Clone)]
pub struct PendingPredict {
    pub seq: u64,
    pub file: SelectedFile,
}

#[derive(Debug, Default)]
pub struct Controller {
    state: UiState,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn open_file_chooser(&mut self) {
        self.state.chooser_open = true;
    }

    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            debug!("File selection cleared");
            self.state.file = None;
            self.state.preview = None;
            self.state.submit_enabled = false;
            return;
        };

        info!("Selected {} ({}, {} bytes)", file.name, file.mime, file.bytes.len());
        // Any request still in flight belongs to the previous file.
        self.state.latest_seq += 1;
        self.state.preview = Some(Preview::from_file(&file));
        self.state.file = Some(file);
        self.state.submit_enabled = true;
        self.state.loading = false;
        self.state.notice = None;
        self.state.clear_results();
    }

    pub fn begin_submit(&mut self) -> Result<PendingPredict, ControllerError> {
        let Some(file) = self.state.file.clone() else {
            error!("Submit requested with no file selected");
            self.state.notice = Some(NO_FILE_NOTICE.to_string());
            return Err(ControllerError::NoFileSelected);
        };

        self.state.latest_seq += 1;
        self.state.submit_enabled = false;
        self.state.loading = true;
        self.state.notice = None;
        self.state.clear_results();

        Ok(PendingPredict {
            seq: self.state.latest_seq,
            file,
        })
    }

    /// Returns `false` when the outcome was stale and dropped.
    pub fn finish_submit(
        &mut self,
        seq: u64,
        outcome: Result<PredictReply, PredictError>,
    ) -> bool {
        if seq != self.state.latest_seq {
            debug!(
                "Discarding response #{} (latest is #{})",
                seq, self.state.latest_seq
            );
            return false;
        }

        match outcome {
            Ok(PredictReply::Rejected(message)) => {
                warn!("Prediction service reported: {}", message);
                self.state.results = ResultView::Rejected(message);
            }
            Ok(PredictReply::Predicted {
                predictions,
                catalog,
            }) => {
                info!("✅ Received {} predictions", predictions.len());
                self.state.results = ResultView::Predictions(predictions);
                self.state.catalog = catalog.filter(|catalog| !catalog.is_empty());
            }
            Err(err) => {
                error!("Prediction request #{} failed: {}", seq, err);
                self.state.results = ResultView::ServerError;
            }
        }

        self.state.submit_enabled = self.state.file.is_some();
        self.state.loading = false;
        true
    }

    pub fn select_food(&mut self, label: &str) -> Result<(), ControllerError> {
        let entry = self
            .state
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.find(label))
            .ok_or_else(|| ControllerError::UnknownFood(label.to_string()))?;

        let first_tab = (!entry.recipes.is_empty()).then_some(0);
        self.state.selected_food = Some(entry.label.clone());
        self.state.selected_tab = first_tab;
        Ok(())
    }

    pub fn select_tab(&mut self, index: usize) -> Result<(), ControllerError> {
        if self.state.selected_entry().is_none() {
            return Err(ControllerError::NoFoodSelected);
        }
        self.state.selected_tab = Some(index);
        Ok(())
    }
}
