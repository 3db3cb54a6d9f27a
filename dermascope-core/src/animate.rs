//! Eased count-up frames for animated numeric displays
//!
//! Global invariants enforced:
//! - Frames are emitted in strictly increasing elapsed time
//! - The final frame equals the target exactly
//! - A sequence is consumed once and cannot be restarted
//! - No frame is emitted after cancellation

use crate::error::{Error, Result};
use serde::Serialize;
use std::cell::Cell;
use std::iter::FusedIterator;
use std::ops::ControlFlow;
use std::rc::Rc;

/// Default frame cadence, roughly one display refresh at 60Hz
pub const DEFAULT_FRAME_INTERVAL_MS: i64 = 16;

/// Cubic ease-out: `1 - (1 - t)^3`, with `t` clamped to [0, 1]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// One displayed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Frame {
    pub index: usize,
    pub elapsed_ms: i64,
    pub value: f64,
}

/// Cancels a running [`DisplaySequence`] from outside the consuming loop
///
/// Single-threaded by construction (`Rc`), matching the UI event loop.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Rc<Cell<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Finite, lazy, one-shot sequence of eased frames
///
/// Deliberately not `Clone`: once consumed or cancelled it stays done.
#[derive(Debug)]
pub struct DisplaySequence {
    start: f64,
    target: f64,
    duration_ms: i64,
    frame_interval_ms: i64,
    last_index: usize,
    next_index: usize,
    cancelled: Rc<Cell<bool>>,
}

/// Animate from 0 to `target` over `duration_ms` at the default cadence
pub fn present(target: f64, duration_ms: i64) -> Result<DisplaySequence> {
    present_from(0.0, target, duration_ms, DEFAULT_FRAME_INTERVAL_MS)
}

/// Animate from `start` to `target` with an explicit frame cadence
///
/// If the eased value lands on `target` before the last scheduled frame
/// (long runs at fine cadence), that frame is emitted as the final one.
pub fn present_from(
    start: f64,
    target: f64,
    duration_ms: i64,
    frame_interval_ms: i64,
) -> Result<DisplaySequence> {
    if duration_ms <= 0 {
        return Err(Error::InvalidDuration(duration_ms));
    }
    if frame_interval_ms <= 0 {
        return Err(Error::InvalidDuration(frame_interval_ms));
    }
    if !start.is_finite() {
        return Err(Error::InvalidTarget(start));
    }
    if !target.is_finite() {
        return Err(Error::InvalidTarget(target));
    }
    if !(target - start).is_finite() {
        return Err(Error::InvalidTarget(target));
    }

    // ceil(duration / interval) steps after the t = 0 frame
    let steps = duration_ms / frame_interval_ms
        + i64::from(duration_ms % frame_interval_ms != 0);

    Ok(DisplaySequence {
        start,
        target,
        duration_ms,
        frame_interval_ms,
        last_index: steps as usize,
        next_index: 0,
        cancelled: Rc::new(Cell::new(false)),
    })
}

impl DisplaySequence {
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn frame_interval_ms(&self) -> i64 {
        self.frame_interval_ms
    }

    /// Handle that can stop this sequence from elsewhere (e.g. widget teardown)
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Rc::clone(&self.cancelled),
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// True once the final frame was emitted or the sequence was cancelled
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.next_index > self.last_index
    }

    fn has_reached_target(&self, value: f64) -> bool {
        if self.target >= self.start {
            value >= self.target
        } else {
            value <= self.target
        }
    }

    fn frame_at(&self, index: usize) -> Frame {
        if index == self.last_index {
            return Frame {
                index,
                elapsed_ms: self.duration_ms,
                value: self.target,
            };
        }
        let elapsed_ms = (index as i64)
            .saturating_mul(self.frame_interval_ms)
            .min(self.duration_ms);
        let t = elapsed_ms as f64 / self.duration_ms as f64;
        Frame {
            index,
            elapsed_ms,
            value: self.start + (self.target - self.start) * ease_out_cubic(t),
        }
    }
}

impl Iterator for DisplaySequence {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.is_done() {
            return None;
        }
        let mut frame = self.frame_at(self.next_index);
        if frame.index < self.last_index && self.has_reached_target(frame.value) {
            // the curve rounded onto the target early; this frame ends the run
            frame.value = self.target;
            self.next_index = self.last_index + 1;
            return Some(frame);
        }
        self.next_index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_done() {
            return (0, Some(0));
        }
        // an outside cancel can cut the sequence short at any time
        (0, Some(self.last_index - self.next_index + 1))
    }
}

impl FusedIterator for DisplaySequence {}

/// Host timer facility that paces frame delivery
pub trait FrameTicker {
    /// Block (or yield) until the next frame is due
    fn wait(&mut self, interval_ms: i64);
}

/// Deliver frames to `sink`, waiting on `ticker` between them
///
/// `sink` returns `ControlFlow::Break(())` to stop early; the sequence is
/// cancelled and dropped. Returns the number of frames delivered.
pub fn drive<T, F>(mut sequence: DisplaySequence, ticker: &mut T, mut sink: F) -> usize
where
    T: FrameTicker + ?Sized,
    F: FnMut(Frame) -> ControlFlow<()>,
{
    let interval = sequence.frame_interval_ms();
    let mut delivered = 0;

    loop {
        if delivered > 0 {
            if sequence.is_done() {
                break;
            }
            ticker.wait(interval);
        }
        let Some(frame) = sequence.next() else {
            break;
        };
        delivered += 1;
        if sink(frame).is_break() {
            sequence.cancel();
            tracing::debug!(delivered, "animation stopped by consumer");
            break;
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingTicker {
        waits: Vec<i64>,
    }

    impl FrameTicker for CountingTicker {
        fn wait(&mut self, interval_ms: i64) {
            self.waits.push(interval_ms);
        }
    }

    #[test]
    fn test_final_frame_is_exact_target() {
        let frames: Vec<Frame> = present(100.0, 1000).unwrap().collect();
        let last = frames.last().unwrap();
        assert_eq!(last.value, 100.0);
        assert_eq!(last.elapsed_ms, 1000);
        for frame in &frames[..frames.len() - 1] {
            assert!(frame.value < 100.0, "frame {:?} reached target early", frame);
        }
    }

    #[test]
    fn test_starts_at_start_value() {
        let mut seq = present_from(25.0, 75.0, 500, 50).unwrap();
        let first = seq.next().unwrap();
        assert_eq!(first.value, 25.0);
        assert_eq!(first.elapsed_ms, 0);
    }

    #[test]
    fn test_frames_monotonic_in_time_and_value() {
        let frames: Vec<Frame> = present(100.0, 1000).unwrap().collect();
        for pair in frames.windows(2) {
            assert!(pair[1].elapsed_ms > pair[0].elapsed_ms);
            assert!(pair[1].value >= pair[0].value);
        }
    }

    #[test]
    fn test_frame_count_rounds_up() {
        // 1000 / 16 = 62.5 -> 63 steps plus the t = 0 frame
        assert_eq!(present(100.0, 1000).unwrap().count(), 64);
        assert_eq!(present_from(0.0, 1.0, 100, 25).unwrap().count(), 5);
        assert_eq!(present_from(0.0, 1.0, 5, 16).unwrap().count(), 2);
    }

    #[test]
    fn test_cubic_ease_out_curve() {
        let frames: Vec<Frame> = present_from(0.0, 100.0, 100, 50).unwrap().collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].value, 0.0);
        // t = 0.5 -> 1 - 0.125
        assert!((frames[1].value - 87.5).abs() < 1e-9);
        assert_eq!(frames[2].value, 100.0);
    }

    #[test]
    fn test_descending_target() {
        let frames: Vec<Frame> = present_from(80.0, 20.0, 200, 16).unwrap().collect();
        assert_eq!(frames.last().unwrap().value, 20.0);
        for pair in frames.windows(2) {
            assert!(pair[1].value <= pair[0].value);
        }
    }

    #[test]
    fn test_invalid_duration() {
        assert_eq!(present(100.0, 0).unwrap_err(), Error::InvalidDuration(0));
        assert_eq!(present(100.0, -5).unwrap_err(), Error::InvalidDuration(-5));
        assert_eq!(
            present_from(0.0, 1.0, 100, 0).unwrap_err(),
            Error::InvalidDuration(0)
        );
    }

    #[test]
    fn test_invalid_target() {
        assert!(matches!(
            present(f64::NAN, 100).unwrap_err(),
            Error::InvalidTarget(_)
        ));
        assert!(matches!(
            present_from(f64::INFINITY, 1.0, 100, 16).unwrap_err(),
            Error::InvalidTarget(_)
        ));
    }

    #[test]
    fn test_unrepresentable_span_rejected() {
        assert!(matches!(
            present_from(-1e308, 1e308, 100, 50).unwrap_err(),
            Error::InvalidTarget(_)
        ));
        let frames: Vec<Frame> = present_from(-1e307, 1e307, 100, 50).unwrap().collect();
        assert!(frames.iter().all(|f| f.value.is_finite()));
    }

    #[test]
    fn test_long_run_ends_when_curve_saturates() {
        let frames: Vec<Frame> = present_from(0.0, 100.0, 300_000, 1).unwrap().collect();
        let (last, rest) = frames.split_last().unwrap();
        assert_eq!(last.value, 100.0);
        assert!(rest.iter().all(|f| f.value < 100.0));
        for pair in frames.windows(2) {
            assert!(pair[1].elapsed_ms > pair[0].elapsed_ms);
        }
    }

    #[test]
    fn test_long_descending_run_ends_when_curve_saturates() {
        let frames: Vec<Frame> = present_from(100.0, 0.0, 300_000, 1).unwrap().collect();
        let (last, rest) = frames.split_last().unwrap();
        assert_eq!(last.value, 0.0);
        assert!(rest.iter().all(|f| f.value > 0.0));
    }

    #[test]
    fn test_flat_run_is_single_frame() {
        let frames: Vec<Frame> = present_from(42.0, 42.0, 1000, 16).unwrap().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].value, 42.0);
    }

    #[test]
    fn test_cancel_before_first_frame() {
        let mut seq = present(100.0, 1000).unwrap();
        seq.cancel();
        assert!(seq.next().is_none());
        assert!(seq.next().is_none());
        assert_eq!(seq.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_cancel_handle_stops_mid_run() {
        let mut seq = present(100.0, 1000).unwrap();
        let handle = seq.cancel_handle();
        assert!(seq.next().is_some());
        assert!(seq.next().is_some());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(seq.next().is_none());
    }

    #[test]
    fn test_exhausted_sequence_stays_done() {
        let mut seq = present_from(0.0, 1.0, 10, 10).unwrap();
        assert_eq!(seq.by_ref().count(), 2);
        assert!(seq.is_done());
        assert!(seq.next().is_none());
    }

    #[test]
    fn test_drive_waits_between_frames_only() {
        let mut ticker = CountingTicker::default();
        let mut values = Vec::new();
        let seq = present_from(0.0, 10.0, 100, 25).unwrap();
        let delivered = drive(seq, &mut ticker, |frame| {
            values.push(frame.value);
            ControlFlow::Continue(())
        });
        assert_eq!(delivered, 5);
        assert_eq!(ticker.waits, vec![25, 25, 25, 25]);
        assert_eq!(*values.last().unwrap(), 10.0);
    }

    #[test]
    fn test_drive_stops_on_break() {
        let mut ticker = CountingTicker::default();
        let seq = present(100.0, 1000).unwrap();
        let delivered = drive(seq, &mut ticker, |frame| {
            if frame.index == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(delivered, 3);
        assert_eq!(ticker.waits.len(), 2);
    }

    #[test]
    fn test_drive_cancelled_sequence_emits_nothing() {
        let mut ticker = CountingTicker::default();
        let seq = present(100.0, 1000).unwrap();
        seq.cancel_handle().cancel();
        let delivered = drive(seq, &mut ticker, |_| ControlFlow::Continue(()));
        assert_eq!(delivered, 0);
        assert!(ticker.waits.is_empty());
    }
}
