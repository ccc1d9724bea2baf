//! Skeleton data model: landmarks, frames and frame sequences.
//!
//! A frame is one time-sampled snapshot of every landmark in the reference
//! layout. Sequences are built either by loading a recording or by
//! appending frames while a capture is running.

use crate::constants::NUM_LANDMARKS;
use crate::{Error, Result};
use nalgebra::Point3;

/// Named skeletal points of the reference layout, in record order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    Head,
    ShoulderCenter,
    ShoulderLeft,
    ShoulderRight,
    ElbowLeft,
    ElbowRight,
    WristLeft,
    WristRight,
    Spine,
    HipCenter,
    HipLeft,
    HipRight,
    KneeLeft,
    KneeRight,
    AnkleLeft,
    AnkleRight,
}

impl Landmark {
    /// All landmarks in the order they appear in a frame
    pub const ALL: [Landmark; NUM_LANDMARKS] = [
        Landmark::Head,
        Landmark::ShoulderCenter,
        Landmark::ShoulderLeft,
        Landmark::ShoulderRight,
        Landmark::ElbowLeft,
        Landmark::ElbowRight,
        Landmark::WristLeft,
        Landmark::WristRight,
        Landmark::Spine,
        Landmark::HipCenter,
        Landmark::HipLeft,
        Landmark::HipRight,
        Landmark::KneeLeft,
        Landmark::KneeRight,
        Landmark::AnkleLeft,
        Landmark::AnkleRight,
    ];

    /// Position of this landmark inside a frame
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::ShoulderCenter => "shoulder-center",
            Self::ShoulderLeft => "shoulder-left",
            Self::ShoulderRight => "shoulder-right",
            Self::ElbowLeft => "elbow-left",
            Self::ElbowRight => "elbow-right",
            Self::WristLeft => "wrist-left",
            Self::WristRight => "wrist-right",
            Self::Spine => "spine",
            Self::HipCenter => "hip-center",
            Self::HipLeft => "hip-left",
            Self::HipRight => "hip-right",
            Self::KneeLeft => "knee-left",
            Self::KneeRight => "knee-right",
            Self::AnkleLeft => "ankle-left",
            Self::AnkleRight => "ankle-right",
        }
    }
}

/// One snapshot of all landmark positions
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    points: Vec<Point3<f64>>,
}

impl Frame {
    /// Create a frame from positions in layout order
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points does not match the reference layout
    pub fn new(points: Vec<Point3<f64>>) -> Result<Self> {
        if points.len() != NUM_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Frame needs {NUM_LANDMARKS} landmarks, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Create a frame without checking the landmark count.
    ///
    /// Consumers such as the cycle detector assert the count themselves.
    #[must_use]
    pub fn from_points_unchecked(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Frame with every landmark at the origin
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            points: vec![Point3::origin(); NUM_LANDMARKS],
        }
    }

    /// Position of a landmark
    #[must_use]
    pub fn landmark(&self, landmark: Landmark) -> &Point3<f64> {
        &self.points[landmark.index()]
    }

    /// Replace the position of a landmark
    pub fn set_landmark(&mut self, landmark: Landmark, position: Point3<f64>) {
        self.points[landmark.index()] = position;
    }

    /// All positions in layout order
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Number of landmarks in this frame
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the frame has no landmarks at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Ordered collection of frames sharing one landmark layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Create an empty sequence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, rejecting one whose layout differs from the frames already held
    ///
    /// # Errors
    ///
    /// Returns an error if the landmark count differs from the first frame
    pub fn push(&mut self, frame: Frame) -> Result<()> {
        if let Some(first) = self.frames.first() {
            if first.len() != frame.len() {
                return Err(Error::InvalidInput(format!(
                    "Frame has {} landmarks, sequence uses {}",
                    frame.len(),
                    first.len()
                )));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Frame at `index`, if it exists
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence holds no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate over the frames in order
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Give up the frames
    #[must_use]
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl TryFrom<Vec<Frame>> for FrameSequence {
    type Error = Error;

    fn try_from(frames: Vec<Frame>) -> Result<Self> {
        let mut sequence = Self::new();
        for frame in frames {
            sequence.push(frame)?;
        }
        Ok(sequence)
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
