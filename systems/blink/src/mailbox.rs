use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use dont_blink_core::BlinkSample;

const FACE_VISIBLE: u8 = 0b001;
const LEFT_BLINK: u8 = 0b010;
const RIGHT_BLINK: u8 = 0b100;

/// Single-slot, last-write-wins hand-off of the latest blink sample.
///
/// Clones share the same slot. Publishing and reading are wait-free, so the
/// capture thread never stalls the game loop and vice versa. Intermediate
/// samples published between two reads are lost.
#[derive(Clone, Debug)]
pub struct BlinkMailbox {
    slot: Arc<AtomicU8>,
}

impl BlinkMailbox {
    /// Creates a mailbox holding [`BlinkSample::OPEN_EYES`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(AtomicU8::new(encode(BlinkSample::OPEN_EYES))),
        }
    }

    /// Replaces the stored sample.
    pub fn publish(&self, sample: BlinkSample) {
        self.slot.store(encode(sample), Ordering::Release);
    }

    /// Reads the most recently published sample.
    #[must_use]
    pub fn latest(&self) -> BlinkSample {
        decode(self.slot.load(Ordering::Acquire))
    }
}

impl Default for BlinkMailbox {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(sample: BlinkSample) -> u8 {
    let mut bits = 0;
    if sample.face_visible {
        bits |= FACE_VISIBLE;
    }
    if sample.left_blink {
        bits |= LEFT_BLINK;
    }
    if sample.right_blink {
        bits |= RIGHT_BLINK;
    }
    bits
}

fn decode(bits: u8) -> BlinkSample {
    BlinkSample {
        face_visible: bits & FACE_VISIBLE != 0,
        left_blink: bits & LEFT_BLINK != 0,
        right_blink: bits & RIGHT_BLINK != 0,
    }
}
