use dont_blink_core::BlinkSample;
use glam::Vec2;

/// Eye aspect ratio below which an eye counts as closed.
pub const DEFAULT_EAR_THRESHOLD: f32 = 0.15;

/// Normalized bounding box area a face must exceed to be considered.
pub const DEFAULT_MIN_FACE_AREA: f32 = 0.01;

/// Computes the eye aspect ratio of six eye landmarks.
///
/// Points are ordered around the eye starting at the outer corner, so that
/// `p0`/`p3` span the eye horizontally and `p1`/`p5`, `p2`/`p4` vertically.
/// Fewer than six points, or a degenerate horizontal span, read as a wide
/// open eye (`1.0`).
#[must_use]
pub fn eye_aspect_ratio(points: &[Vec2]) -> f32 {
    let [p0, p1, p2, p3, p4, p5, ..] = points else {
        return 1.0;
    };
    let horizontal = p0.distance(*p3);
    if horizontal <= f32::EPSILON {
        return 1.0;
    }
    (p1.distance(*p5) + p2.distance(*p4)) / (2.0 * horizontal)
}

/// Normalized face rectangle reported by the tracker, origin bottom-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Bottom-left corner in normalized image coordinates.
    pub origin: Vec2,
    /// Width and height in normalized image coordinates.
    pub size: Vec2,
}

impl BoundingBox {
    /// Creates a new bounding box.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Normalized area covered by the box.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Maps a point expressed relative to the box into image coordinates.
    #[must_use]
    pub fn to_image(&self, point: Vec2) -> Vec2 {
        self.origin + point * self.size
    }
}

/// One face detected in a camera frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceObservation {
    /// Face rectangle in normalized image coordinates.
    pub bounding_box: BoundingBox,
    /// Left eye landmarks relative to the bounding box, if tracked.
    pub left_eye: Option<Vec<Vec2>>,
    /// Right eye landmarks relative to the bounding box, if tracked.
    pub right_eye: Option<Vec<Vec2>>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }
}

impl FaceObservation {
    fn eye_aspect_ratio(&self, eye: Option<&[Vec2]>) -> Option<f32> {
        let points: Vec<Vec2> = eye?
            .iter()
            .map(|point| self.bounding_box.to_image(*point))
            .collect();
        Some(eye_aspect_ratio(&points))
    }
}

/// Turns face observations into blink samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeClassifier {
    ear_threshold: f32,
    min_face_area: f32,
}

impl EyeClassifier {
    /// Creates a classifier with the provided thresholds.
    #[must_use]
    pub const fn new(ear_threshold: f32, min_face_area: f32) -> Self {
        Self {
            ear_threshold,
            min_face_area,
        }
    }

    /// Eye aspect ratio below which an eye counts as closed.
    #[must_use]
    pub const fn ear_threshold(&self) -> f32 {
        self.ear_threshold
    }

    /// Area a face must exceed to be considered.
    #[must_use]
    pub const fn min_face_area(&self) -> f32 {
        self.min_face_area
    }

    /// Reports whether an eye with the given aspect ratio is closed.
    #[must_use]
    pub fn is_closed(&self, ear: f32) -> bool {
        ear < self.ear_threshold
    }

    /// Picks the largest face whose area exceeds the minimum.
    #[must_use]
    pub fn select_face<'a>(&self, faces: &'a [FaceObservation]) -> Option<&'a FaceObservation> {
        faces
            .iter()
            .filter(|face| face.bounding_box.area() > self.min_face_area)
            .max_by(|a, b| a.bounding_box.area().total_cmp(&b.bounding_box.area()))
    }

    /// Classifies one camera frame.
    ///
    /// A frame without an acceptable face reports the face as not visible.
    /// An eye without landmarks counts as open.
    #[must_use]
    pub fn classify(&self, faces: &[FaceObservation]) -> BlinkSample {
        let Some(face) = self.select_face(faces) else {
            return BlinkSample::NO_FACE;
        };
        let closed = |eye: &Option<Vec<Vec2>>| {
            face.eye_aspect_ratio(eye.as_deref())
                .is_some_and(|ear| self.is_closed(ear))
        };
        BlinkSample {
            face_visible: true,
            left_blink: closed(&face.left_eye),
            right_blink: closed(&face.right_eye),
        }
    }
}

impl Default for EyeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EAR_THRESHOLD, DEFAULT_MIN_FACE_AREA)
    }
}
