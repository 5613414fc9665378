use std::{sync::mpsc, thread};

use dont_blink_core::BlinkSample;
use dont_blink_system_blink::{BlinkMailbox, BoundingBox, EyeClassifier, FaceObservation};
use glam::Vec2;

#[test]
fn reader_sees_the_last_sample_published_by_another_thread() {
    let mailbox = BlinkMailbox::new();
    let writer = mailbox.clone();
    let blink = BlinkSample {
        face_visible: true,
        left_blink: true,
        right_blink: true,
    };

    let handle = thread::spawn(move || {
        for frame in 0..1_000 {
            let sample = if frame % 2 == 0 {
                BlinkSample::NO_FACE
            } else {
                BlinkSample::OPEN_EYES
            };
            writer.publish(sample);
        }
        writer.publish(blink);
    });
    handle.join().expect("capture thread");

    assert_eq!(mailbox.latest(), blink);
}

#[test]
fn concurrent_reads_only_observe_published_samples() {
    let mailbox = BlinkMailbox::new();
    let writer = mailbox.clone();
    let (done_tx, done_rx) = mpsc::channel();
    let allowed = [BlinkSample::OPEN_EYES, BlinkSample::NO_FACE];

    let handle = thread::spawn(move || {
        for frame in 0..10_000 {
            writer.publish(allowed[frame % 2]);
        }
        done_tx.send(()).expect("signal completion");
    });

    while done_rx.try_recv().is_err() {
        assert!(allowed.contains(&mailbox.latest()));
    }
    handle.join().expect("capture thread");
    assert_eq!(mailbox.latest(), BlinkSample::NO_FACE);
}

#[test]
fn classified_frames_flow_through_the_mailbox() {
    let classifier = EyeClassifier::default();
    let mailbox = BlinkMailbox::default();
    let closed_eye: Vec<_> = [0.0, 0.33, 0.66, 1.0, 0.66, 0.33]
        .into_iter()
        .map(|x| Vec2::new(x, 0.5))
        .collect();
    let frame = [FaceObservation {
        bounding_box: BoundingBox::new(Vec2::ZERO, Vec2::splat(0.5)),
        left_eye: Some(closed_eye.clone()),
        right_eye: Some(closed_eye),
    }];

    mailbox.publish(classifier.classify(&frame));
    assert!(mailbox.latest().blink_detected());

    mailbox.publish(classifier.classify(&[]));
    assert_eq!(mailbox.latest(), BlinkSample::NO_FACE);
}
