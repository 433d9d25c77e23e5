use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// One `(label, confidence)` pair. On the wire this is a 2-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

impl From<(String, f64)> for Prediction {
    fn from((label, confidence): (String, f64)) -> Self {
        Self { label, confidence }
    }
}

impl From<Prediction> for (String, f64) {
    fn from(prediction: Prediction) -> Self {
        (prediction.label, prediction.confidence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Body of a `/predict` response, before it is classified.
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub predictions: Option<Vec<Prediction>>,
    /// Kept raw so an unrecognised shape costs the catalog, not the predictions.
    #[serde(default)]
    pub recipes: Option<serde_json::Value>,
}

/// The prediction service has shipped `recipes` in three shapes over time.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipesPayload {
    Unavailable { error: String },
    List(Vec<Recipe>),
    Catalog(BTreeMap<String, Vec<Recipe>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictReply {
    /// The service answered with an `error` field.
    Rejected(String),
    Predicted {
        predictions: Vec<Prediction>,
        catalog: Option<RecipeCatalog>,
    },
}

impl PredictResponse {
    /// `None` when the body has neither an `error` nor a `predictions` field.
    pub fn into_reply(self) -> Option<PredictReply> {
        if let Some(error) = self.error {
            return Some(PredictReply::Rejected(error));
        }
        let predictions = self.predictions?;
        let catalog = self
            .recipes
            .and_then(|raw| match serde_json::from_value::<RecipesPayload>(raw) {
                Ok(payload) => Some(payload),
                Err(err) => {
                    warn!("Ignoring recipes in an unrecognised shape: {}", err);
                    None
                }
            })
            .and_then(|payload| RecipeCatalog::from_payload(payload, &predictions));
        Some(PredictReply::Predicted {
            predictions,
            catalog,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodEntry {
    pub label: String,
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeCatalog {
    entries: Vec<FoodEntry>,
}

impl RecipeCatalog {
    /// Entries that match a prediction come first, in prediction order.
    /// The rest follow alphabetically.
    pub fn from_payload(payload: RecipesPayload, predictions: &[Prediction]) -> Option<Self> {
        match payload {
            RecipesPayload::Unavailable { error } => {
                warn!("Prediction service could not provide recipes: {}", error);
                None
            }
            RecipesPayload::List(recipes) => {
                let Some(top) = predictions.first() else {
                    warn!("Dropping {} recipes: no prediction to attach them to", recipes.len());
                    return None;
                };
                Some(Self {
                    entries: vec![FoodEntry {
                        label: top.label.clone(),
                        recipes,
                    }],
                })
            }
            RecipesPayload::Catalog(map) => {
                let ranked: Vec<String> = predictions
                    .iter()
                    .map(|p| normalize_label(&p.label))
                    .collect();
                let mut entries: Vec<FoodEntry> = map
                    .into_iter()
                    .map(|(label, recipes)| FoodEntry { label, recipes })
                    .collect();
                // BTreeMap order is alphabetical and sort_by_key is stable.
                entries.sort_by_key(|entry| {
                    let key = normalize_label(&entry.label);
                    ranked
                        .iter()
                        .position(|label| *label == key)
                        .unwrap_or(usize::MAX)
                });
                Some(Self { entries })
            }
        }
    }

    pub fn entries(&self) -> &[FoodEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, label: &str) -> Option<&FoodEntry> {
        let wanted = normalize_label(label);
        self.entries
            .iter()
            .find(|entry| normalize_label(&entry.label) == wanted)
    }
}

/// Lowercases and collapses `_`, `-` and whitespace runs to single spaces.
pub fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_label(label: &str) -> String {
    label.replace('_', " ")
}
