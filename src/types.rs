pub const POSE_POINTS: usize = 33;
pub const HAND_POINTS: usize = 21;

/// Width of one flattened keypoint row: 75 points x 3 coordinates.
pub const FEATURE_DIM: usize = (POSE_POINTS + 2 * HAND_POINTS) * 3;

/// A single decoded video frame as a tightly packed RGBA buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Per-frame landmark output: body pose plus both hands, each point an
/// `[x, y, z]` estimate. A group that was not detected in the frame is a
/// zero-filled placeholder of the correct arity, so flattening always
/// yields exactly [`FEATURE_DIM`] values.
#[derive(Clone, Debug)]
pub struct LandmarkSet {
    pub pose: Vec<[f32; 3]>,
    pub left_hand: Vec<[f32; 3]>,
    pub right_hand: Vec<[f32; 3]>,
}

pub fn zero_points(count: usize) -> Vec<[f32; 3]> {
    vec![[0.0; 3]; count]
}

impl LandmarkSet {
    pub fn empty() -> Self {
        Self {
            pose: zero_points(POSE_POINTS),
            left_hand: zero_points(HAND_POINTS),
            right_hand: zero_points(HAND_POINTS),
        }
    }

    pub fn flatten(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(FEATURE_DIM);
        let groups = [
            (&self.pose, POSE_POINTS),
            (&self.left_hand, HAND_POINTS),
            (&self.right_hand, HAND_POINTS),
        ];
        for (points, expected) in groups {
            for point in points.iter().take(expected) {
                values.extend_from_slice(point);
            }
            for _ in points.len()..expected {
                values.extend_from_slice(&[0.0; 3]);
            }
        }
        values
    }
}

/// One classification result: a gesture name and the winning score.
#[derive(Clone, Debug)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}
