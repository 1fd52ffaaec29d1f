use std::thread;

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, unbounded};
use tokio::sync::oneshot;

use crate::classifier::SignClassifier;
use crate::extractor::HolisticEngine;
use crate::sequence::normalize_sequence;
use crate::types::{Frame, Prediction};

/// One prediction request: decoded frames in, label + confidence out.
pub struct PredictJob {
    frames: Vec<Frame>,
    reply: oneshot::Sender<Result<Prediction>>,
}

/// Cloneable handle the HTTP handlers use to submit work to the
/// inference worker thread.
#[derive(Clone)]
pub struct PredictorHandle {
    job_tx: Sender<PredictJob>,
}

impl PredictorHandle {
    pub async fn predict(&self, frames: Vec<Frame>) -> Result<Prediction> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.job_tx
            .send(PredictJob {
                frames,
                reply: reply_tx,
            })
            .map_err(|_| anyhow!("inference worker has shut down"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("inference worker dropped the request"))?
    }

    /// Handle with no worker behind it; every predict call fails. Lets
    /// router tests exercise paths that never reach inference.
    pub fn disconnected() -> Self {
        let (job_tx, _) = unbounded();
        Self { job_tx }
    }
}

/// Spawn the worker thread that owns the extractor engine and the
/// classifier. ORT sessions need `&mut` access, so all inference funnels
/// through this single thread.
pub fn start_worker<E: HolisticEngine>(
    engine: E,
    classifier: SignClassifier,
    target_len: usize,
) -> (PredictorHandle, thread::JoinHandle<()>) {
    let (job_tx, job_rx) = unbounded();
    let handle = thread::spawn(move || run_worker_loop(engine, classifier, target_len, job_rx));
    (PredictorHandle { job_tx }, handle)
}

fn run_worker_loop<E: HolisticEngine>(
    mut engine: E,
    mut classifier: SignClassifier,
    target_len: usize,
    job_rx: Receiver<PredictJob>,
) {
    while let Ok(job) = job_rx.recv() {
        let result = process_frames(&mut engine, &mut classifier, target_len, &job.frames);
        let _ = job.reply.send(result);
    }
    log::info!("inference worker shutting down");
}

fn process_frames<E: HolisticEngine>(
    engine: &mut E,
    classifier: &mut SignClassifier,
    target_len: usize,
    frames: &[Frame],
) -> Result<Prediction> {
    let mut keypoint_rows = Vec::with_capacity(frames.len());
    for frame in frames {
        match engine.extract(frame) {
            Ok(landmarks) => keypoint_rows.push(landmarks.flatten()),
            Err(err) => log::warn!("landmark extraction failed: {err:?}"),
        }
    }

    if keypoint_rows.is_empty() {
        log::warn!("no landmarks extracted, classifying a zero sequence");
    } else if keypoint_rows.len() < target_len {
        log::info!(
            "padding sequence with {} zero frames",
            target_len - keypoint_rows.len()
        );
    } else if keypoint_rows.len() > target_len {
        log::info!("truncating sequence to {target_len} frames");
    }

    let sequence = normalize_sequence(&keypoint_rows, target_len);
    classifier.predict(&sequence)
}
