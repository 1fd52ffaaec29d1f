use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use ndarray::{Array2, Axis};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use regex::Regex;

use crate::types::Prediction;

/// Pretrained sequence classifier plus its label table.
///
/// Takes the normalized `(N, 225)` sequence, runs the ONNX session on the
/// batched `(1, N, 225)` tensor, and maps the argmax class through the
/// label table. The winning score is the reported confidence.
pub struct SignClassifier {
    session: Session,
    labels: Vec<String>,
}

impl SignClassifier {
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("failed to load classifier model from {}", model_path.display())
            })?;
        let labels = load_labels(labels_path)?;
        log::info!(
            "sign classifier ready with {} labels from {}",
            labels.len(),
            model_path.display()
        );
        Ok(Self { session, labels })
    }

    pub fn predict(&mut self, sequence: &Array2<f32>) -> Result<Prediction> {
        let input = sequence.clone().insert_axis(Axis(0));
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run classifier session")?;

        if outputs.len() < 1 {
            return Err(anyhow!("classifier returned no outputs"));
        }

        let scores = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = scores.iter().copied().collect();
        let (index, confidence) =
            best_class(&flattened).ok_or_else(|| anyhow!("classifier returned no scores"))?;
        let label = self.labels.get(index).cloned().ok_or_else(|| {
            anyhow!(
                "class index {index} outside label table of {} entries",
                self.labels.len()
            )
        })?;

        Ok(Prediction {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

fn load_labels(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read label table {}", path.display()))?;
    let labels: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse label table {}", path.display()))?;
    if labels.is_empty() {
        return Err(anyhow!("label table {} is empty", path.display()));
    }
    Ok(labels)
}

/// Index and value of the highest score; the first maximum wins on ties.
pub fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, score) in scores.iter().copied().enumerate() {
        let improved = match best {
            Some((_, current)) => score > current,
            None => true,
        };
        if improved {
            best = Some((index, score));
        }
    }
    best
}

static PAPER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)paper").expect("paper pattern is valid"));
static DIGIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Label cleanup applied only on the live frame endpoint: any-case
/// "paper" becomes "Letter" and digits are stripped.
pub fn clean_live_label(label: &str) -> String {
    let renamed = PAPER_PATTERN.replace_all(label, "Letter");
    DIGIT_PATTERN.replace_all(&renamed, "").into_owned()
}
