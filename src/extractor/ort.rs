use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ort::session::{Session, SessionOutputs, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{HolisticEngine, common};
use crate::types::{Frame, HAND_POINTS, LandmarkSet, POSE_POINTS, zero_points};

/// Detection score below which a landmark group is treated as absent.
const MIN_DETECTION_CONFIDENCE: f32 = 0.5;

struct LandmarkOutput {
    landmarks: Vec<[f32; 3]>,
    confidence: f32,
    handedness: f32,
}

/// ORT-backed holistic extractor: a pose-estimation session for the body
/// and a hand-landmark session whose handedness output decides which
/// hand slot the detection fills.
pub struct OrtHolisticEngine {
    pose_session: Session,
    hand_session: Session,
}

impl OrtHolisticEngine {
    pub fn load(pose_model: &Path, hand_model: &Path) -> Result<Self> {
        let pose_session = build_session(pose_model)?;
        let hand_session = build_session(hand_model)?;
        log::info!(
            "holistic extractor ready (pose: {}, hand: {})",
            pose_model.display(),
            hand_model.display()
        );
        Ok(Self {
            pose_session,
            hand_session,
        })
    }
}

fn build_session(model_path: &Path) -> Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(2)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))
}

impl HolisticEngine for OrtHolisticEngine {
    fn extract(&mut self, frame: &Frame) -> Result<LandmarkSet> {
        let pose = run_landmark_model(
            &mut self.pose_session,
            frame,
            common::POSE_INPUT_SIZE,
            POSE_POINTS,
        )?;
        let hand = run_landmark_model(
            &mut self.hand_session,
            frame,
            common::HAND_INPUT_SIZE,
            HAND_POINTS,
        )?;

        let pose_points = if pose.confidence >= MIN_DETECTION_CONFIDENCE {
            pose.landmarks
        } else {
            zero_points(POSE_POINTS)
        };

        let mut left_hand = zero_points(HAND_POINTS);
        let mut right_hand = zero_points(HAND_POINTS);
        if hand.confidence >= MIN_DETECTION_CONFIDENCE {
            // handedness: 1.0 = right hand
            if hand.handedness >= 0.5 {
                right_hand = hand.landmarks;
            } else {
                left_hand = hand.landmarks;
            }
        }

        Ok(LandmarkSet {
            pose: pose_points,
            left_hand,
            right_hand,
        })
    }
}

fn run_landmark_model(
    session: &mut Session,
    frame: &Frame,
    input_size: u32,
    count: usize,
) -> Result<LandmarkOutput> {
    let (input, letterbox) = common::prepare_frame_with_size(frame, input_size)?;
    let tensor = Tensor::from_array(input)?;
    let outputs = session
        .run(ort::inputs![tensor])
        .context("failed to run ORT session")?;

    if outputs.len() < 1 {
        return Err(anyhow!("model returned no outputs"));
    }

    let coords = outputs[0].try_extract_array::<f32>()?;
    let flattened: Vec<f32> = coords.iter().copied().collect();
    let raw = common::decode_landmarks(&flattened, count)?;

    let confidence = scalar_output(&outputs, 1);
    let handedness = scalar_output(&outputs, 2);

    Ok(LandmarkOutput {
        landmarks: common::normalize_landmarks(&raw, &letterbox),
        confidence: confidence.clamp(0.0, 1.0),
        handedness,
    })
}

fn scalar_output(outputs: &SessionOutputs<'_>, index: usize) -> f32 {
    if outputs.len() > index {
        outputs[index]
            .try_extract_array::<f32>()
            .ok()
            .and_then(|values| values.iter().next().copied())
            .unwrap_or(0.0)
    } else {
        0.0
    }
}
