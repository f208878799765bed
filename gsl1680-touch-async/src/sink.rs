//! Consumer side: moving queued frames to whatever renders them.

use core::fmt::Debug;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use embedded_isr_queue::Consumer;

use crate::frame::TouchFrame;

/// Receives decoded frames on the task side.
pub trait TouchSink {
    /// Called once per frame taken off the queue, in push order.
    fn on_frame(&mut self, frame: &TouchFrame);
}

impl<F> TouchSink for F
where
    F: FnMut(&TouchFrame),
{
    fn on_frame(&mut self, frame: &TouchFrame) {
        self(frame)
    }
}

/// Hands every frame currently queued to `sink` and returns how many there were.
pub fn drain<S, const N: usize>(consumer: &mut Consumer<'_, TouchFrame, N>, sink: &mut S) -> usize
where
    S: TouchSink + ?Sized,
{
    let mut forwarded = 0;
    while let Some(frame) = consumer.pop() {
        sink.on_frame(&frame);
        forwarded += 1;
    }
    forwarded
}

/// Forwards frames to `sink` as they arrive. Never returns.
pub async fn forward<S, const N: usize>(consumer: &mut Consumer<'_, TouchFrame, N>, sink: &mut S)
where
    S: TouchSink + ?Sized,
{
    let mut dropped = consumer.overflow_count();
    loop {
        let frame = consumer.next().await;

        let overflow = consumer.overflow_count();
        if overflow != dropped {
            log::debug!("{} touch frames dropped before delivery", overflow - dropped);
            dropped = overflow;
        }
        sink.on_frame(&frame);
    }
}

/// Marker color for a finger id.
pub fn finger_color(finger_id: u8) -> Rgb565 {
    match finger_id {
        1 => Rgb565::RED,
        2 => Rgb565::GREEN,
        3 => Rgb565::BLUE,
        4 => Rgb565::YELLOW,
        5 => Rgb565::WHITE,
        _ => Rgb565::CYAN,
    }
}

/// A sink that draws a filled circle under every finger.
///
/// Coordinates are used as reported; frames without fingers draw nothing.
pub struct FingerMarkers<D> {
    target: D,
    radius: u32,
}

impl<D> FingerMarkers<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    /// Marker radius used by [`FingerMarkers::new`].
    pub const DEFAULT_RADIUS: u32 = 20;

    /// Draws markers of [`Self::DEFAULT_RADIUS`] on `target`.
    pub fn new(target: D) -> Self {
        Self::with_radius(target, Self::DEFAULT_RADIUS)
    }

    /// Draws markers of `radius` pixels on `target`.
    pub fn with_radius(target: D, radius: u32) -> Self {
        Self { target, radius }
    }

    /// The draw target.
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Gives the draw target back.
    pub fn release(self) -> D {
        self.target
    }
}

impl<D> TouchSink for FingerMarkers<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    fn on_frame(&mut self, frame: &TouchFrame) {
        for point in frame.points() {
            let center = Point::new(i32::from(point.x()), i32::from(point.y()));
            let style = PrimitiveStyle::with_fill(finger_color(point.finger_id()));
            if let Err(err) = Circle::with_center(center, self.radius * 2 + 1)
                .into_styled(style)
                .draw(&mut self.target)
            {
                log::warn!("Error drawing touch marker: {err:?}");
            }
        }
    }
}
