//! Touch report decoding.
//!
//! The controller reports touches as a fixed 24-byte block read from
//! [`crate::reg::DATA_REG`]:
//!
//! | Offset        | Content                                              |
//! |---------------|------------------------------------------------------|
//! | `0`           | number of fingers on the panel                       |
//! | `1..4`        | unused                                               |
//! | `4 + 4i`      | finger `i`: X, little-endian `u16`, low 12 bits      |
//! | `6 + 4i`      | finger `i`: Y, little-endian `u16`, low 12 bits      |
//!
//! The upper nibble of the Y high byte (`7 + 4i`) carries the finger id.

/// Length of one raw touch report.
pub const FRAME_LEN: usize = 24;
/// Most fingers the controller tracks at once.
pub const MAX_FINGERS: usize = 5;

const COORD_MASK: u16 = 0x0FFF;
const CONTACTS_OFFSET: usize = 4;
const CONTACT_LEN: usize = 4;

/// A report that cannot be a valid touch frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The finger count exceeds [`MAX_FINGERS`]; the read is corrupt.
    InvalidFingerCount(u8),
}

/// One finger on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchPoint {
    x: u16,
    y: u16,
    finger_id: u8,
}

impl TouchPoint {
    /// X coordinate, `0..=4095`.
    pub fn x(&self) -> u16 {
        self.x
    }

    /// Y coordinate, `0..=4095`.
    pub fn y(&self) -> u16 {
        self.y
    }

    /// Finger identifier assigned by the controller, `0..=15`.
    pub fn finger_id(&self) -> u8 {
        self.finger_id
    }
}

/// A decoded touch report: up to five fingers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchFrame {
    finger_count: u8,
    points: [TouchPoint; MAX_FINGERS],
}

impl TouchFrame {
    /// Number of fingers in this frame. Zero means nothing touches the panel.
    pub fn finger_count(&self) -> u8 {
        self.finger_count
    }

    /// Returns `true` if at least one finger is down.
    pub fn is_touch(&self) -> bool {
        self.finger_count > 0
    }

    /// The touch points, in report order.
    pub fn points(&self) -> &[TouchPoint] {
        &self.points[..self.finger_count as usize]
    }
}

/// A raw report exactly as read from the data register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame(pub [u8; FRAME_LEN]);

impl RawFrame {
    /// Finger count byte as reported, not yet validated.
    pub fn finger_count(&self) -> u8 {
        self.0[0]
    }

    fn contact(&self, index: usize) -> TouchPoint {
        let start = CONTACTS_OFFSET + index * CONTACT_LEN;
        let c = &self.0[start..start + CONTACT_LEN];
        TouchPoint {
            x: u16::from_le_bytes([c[0], c[1]]) & COORD_MASK,
            y: u16::from_le_bytes([c[2], c[3]]) & COORD_MASK,
            finger_id: c[3] >> 4,
        }
    }

    /// Decodes the report. See [`decode`].
    pub fn decode(&self) -> Result<TouchFrame, DecodeError> {
        let finger_count = self.finger_count();
        if finger_count as usize > MAX_FINGERS {
            return Err(DecodeError::InvalidFingerCount(finger_count));
        }

        let mut frame = TouchFrame {
            finger_count,
            ..TouchFrame::default()
        };
        for (index, point) in frame.points[..finger_count as usize]
            .iter_mut()
            .enumerate()
        {
            *point = self.contact(index);
        }
        Ok(frame)
    }
}

impl TryFrom<&RawFrame> for TouchFrame {
    type Error = DecodeError;

    fn try_from(raw: &RawFrame) -> Result<Self, Self::Error> {
        raw.decode()
    }
}

/// Parses a raw 24-byte report into a [`TouchFrame`].
///
/// Pure: identical bytes always decode to the identical frame. A finger
/// count above five is rejected rather than clamped.
pub fn decode(raw: &[u8; FRAME_LEN]) -> Result<TouchFrame, DecodeError> {
    RawFrame(*raw).decode()
}
