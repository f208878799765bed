//! Controller lifecycle.

/// Where the controller is in its lifecycle.
///
/// ```text
/// Uninitialized ──► BringingUp ──► Ready
///                     ▲    │         │
///                     │    ▼         ▼
///                     └── Faulted ◄──┘
/// ```
///
/// A new bring-up may start from any state; that is the only way out of
/// `Faulted`. Frames can only be read while `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing has been sent to the device yet.
    Uninitialized,
    /// A bring-up sequence is running.
    BringingUp,
    /// The device is running its firmware and reporting touches.
    Ready,
    /// The last bring-up failed or the bus stopped answering.
    Faulted,
}

impl ControllerState {
    /// Returns `true` when frame reads are allowed.
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }

    pub(crate) fn begin_bring_up(&mut self) {
        log::debug!("touch state {:?} -> BringingUp", self);
        *self = Self::BringingUp;
    }

    pub(crate) fn finish_bring_up(&mut self, ok: bool) {
        debug_assert_eq!(*self, Self::BringingUp);
        *self = if ok { Self::Ready } else { Self::Faulted };
    }

    pub(crate) fn fault(&mut self) {
        if *self != Self::Faulted {
            log::debug!("touch state {:?} -> Faulted", self);
            *self = Self::Faulted;
        }
    }
}
