#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Blink signal plumbing between the face tracker and the game loop.
//!
//! The tracker runs on its own thread and classifies every camera frame into a
//! [`BlinkSample`](dont_blink_core::BlinkSample) using the eye aspect ratio of
//! the largest visible face. Each sample is published into a [`BlinkMailbox`]
//! that the game loop reads once per frame without ever blocking the tracker.

mod landmarks;
mod mailbox;

pub use landmarks::{
    eye_aspect_ratio, BoundingBox, EyeClassifier, FaceObservation, DEFAULT_EAR_THRESHOLD,
    DEFAULT_MIN_FACE_AREA,
};
pub use mailbox::BlinkMailbox;
