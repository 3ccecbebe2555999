//! Execution history: the frames recorded along the current path of the
//! execution tree, replayed across executions by the enumerator.
//!
//! The history is an arena of [`Frame`]s addressed by position plus a
//! cursor.  Each execution starts with the cursor at zero; every acquire
//! either replays the frame at the cursor or appends a new one.  Frames past
//! the cursor were recorded by the previous execution and are only kept so
//! that their mode index survives until the path reaches them again.

use crate::mode::Mode;
use crate::options::Options;
use crate::violation::Violation;

/// Per-operation record: which mode is active and whether it was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    key: String,
    modes: Vec<Mode>,
    mode_index: usize,
    released: bool,
    ignore_fault: bool,
}

impl Frame {
    /// A fresh frame for `key`, selecting its first legal mode.
    pub fn new(key: impl Into<String>, opts: Options) -> Self {
        Self {
            key: key.into(),
            modes: opts.modes(),
            mode_index: 0,
            released: !opts.requires_release(),
            ignore_fault: opts.ignores_fault(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn mode_index(&self) -> usize {
        self.mode_index
    }

    /// The mode in force for this execution.
    pub fn mode(&self) -> Mode {
        self.modes[self.mode_index]
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn ignores_fault(&self) -> bool {
        self.ignore_fault
    }
}

/// Ordered frames plus the position cursor of the running execution.
#[derive(Debug, Clone, Default)]
pub struct History {
    frames: Vec<Frame>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames held, including those past the cursor.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Position of the next acquire in the running execution.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Frames reached so far in the running execution.
    pub fn reached(&self) -> &[Frame] {
        &self.frames[..self.cursor]
    }

    /// Start a new execution from the first position.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Record `frame` at the cursor and advance the cursor.
    ///
    /// On a replayed position the previous frame's mode index is carried
    /// over; the options may change between executions, the key may not.
    /// Returns the position the frame was stored at.
    pub fn record(&mut self, mut frame: Frame) -> Result<usize, Violation> {
        let pos = self.cursor;
        if pos == self.frames.len() {
            if self.reached().iter().any(|f| f.key == frame.key) {
                return Err(Violation::DuplicateKey { key: frame.key });
            }
            self.frames.push(frame);
        } else {
            let previous = &self.frames[pos];
            if previous.key != frame.key || previous.mode_index >= frame.modes.len() {
                return Err(Violation::NonDeterministic { key: frame.key });
            }
            frame.mode_index = previous.mode_index;
            self.frames[pos] = frame;
        }
        self.cursor += 1;
        Ok(pos)
    }

    pub fn frame(&self, pos: usize) -> &Frame {
        &self.frames[pos]
    }

    /// Mark the frame at `pos` as owning nothing left to release.
    pub fn mark_released(&mut self, pos: usize) {
        self.frames[pos].released = true;
    }

    /// Match a release of `key` against the nearest unreleased frame.
    ///
    /// The frame found is marked released even when it belongs to another
    /// key, so a single misordered release is reported once.
    pub fn release(&mut self, key: &str) -> Result<(), Violation> {
        for frame in self.frames[..self.cursor].iter_mut().rev() {
            if !frame.released {
                frame.released = true;
                if frame.key != key {
                    return Err(Violation::OutOfOrder {
                        key: key.to_string(),
                        expected: frame.key.clone(),
                    });
                }
                return Ok(());
            }
            if frame.key == key {
                return Err(Violation::AlreadyReleased {
                    key: key.to_string(),
                });
            }
        }
        Err(Violation::UnmatchedRelease {
            key: key.to_string(),
        })
    }

    /// The most recently acquired frame of this execution still unreleased.
    pub fn last_unreleased(&self) -> Option<&Frame> {
        self.reached().iter().rev().find(|f| !f.released)
    }

    /// Move to the next leaf of the execution tree.
    ///
    /// Increments the mode of the last frame, dropping frames whose modes
    /// are exhausted.  Returns false once every combination was visited.
    pub fn advance(&mut self) -> bool {
        while let Some(last) = self.frames.last_mut() {
            last.mode_index += 1;
            if last.mode_index < last.modes.len() {
                return true;
            }
            self.frames.pop();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Options {
        Options::new()
    }

    #[test]
    fn first_execution_takes_success() {
        let mut h = History::new();
        let pos = h.record(Frame::new("reader", all())).unwrap();
        assert_eq!(pos, 0);
        assert_eq!(h.frame(pos).mode(), Mode::NoFault);
        assert!(!h.frame(pos).is_released());
        assert_eq!(h.cursor(), 1);
    }

    #[test]
    fn advance_walks_modes_then_backtracks() {
        let mut h = History::new();
        h.record(Frame::new("a", Options::new().no_abort())).unwrap();
        h.record(Frame::new("b", all())).unwrap();

        let mut seen = Vec::new();
        loop {
            seen.push(h.frames.iter().map(Frame::mode).collect::<Vec<_>>());
            if !h.advance() {
                break;
            }
            // Straight-line scenario: both points are always reached.
            h.rewind();
            h.record(Frame::new("a", Options::new().no_abort())).unwrap();
            h.record(Frame::new("b", all())).unwrap();
        }
        use Mode::*;
        assert_eq!(
            seen,
            vec![
                vec![NoFault, NoFault],
                vec![NoFault, Fault],
                vec![NoFault, Abort],
                vec![Fault, NoFault],
                vec![Fault, Fault],
                vec![Fault, Abort],
            ]
        );
    }

    #[test]
    fn replay_carries_mode_index() {
        let mut h = History::new();
        h.record(Frame::new("reader", all())).unwrap();
        assert!(h.advance());
        h.rewind();
        h.record(Frame::new("reader", all())).unwrap();
        assert_eq!(h.frame(0).mode(), Mode::Fault);
    }

    #[test]
    fn replay_with_other_key_is_non_deterministic() {
        let mut h = History::new();
        h.record(Frame::new("reader", all())).unwrap();
        h.rewind();
        let err = h.record(Frame::new("writer", all())).unwrap_err();
        assert_eq!(err, Violation::NonDeterministic { key: "writer".into() });
    }

    #[test]
    fn replay_with_narrower_modes_is_non_deterministic() {
        let mut h = History::new();
        h.record(Frame::new("reader", all())).unwrap();
        h.advance();
        h.advance();
        h.rewind();
        let err = h
            .record(Frame::new("reader", Options::new().no_abort()))
            .unwrap_err();
        assert!(matches!(err, Violation::NonDeterministic { .. }));
    }

    #[test]
    fn duplicate_key_in_one_execution() {
        let mut h = History::new();
        h.record(Frame::new("reader", all())).unwrap();
        let err = h.record(Frame::new("reader", all())).unwrap_err();
        assert_eq!(err, Violation::DuplicateKey { key: "reader".into() });
    }

    #[test]
    fn release_matches_nearest_unreleased() {
        let mut h = History::new();
        h.record(Frame::new("o1", all())).unwrap();
        h.record(Frame::new("o2", all())).unwrap();
        h.release("o2").unwrap();
        h.release("o1").unwrap();
        assert!(h.last_unreleased().is_none());
    }

    #[test]
    fn release_out_of_order_names_expected_frame() {
        let mut h = History::new();
        h.record(Frame::new("o1", all())).unwrap();
        h.record(Frame::new("o2", all())).unwrap();
        let err = h.release("o1").unwrap_err();
        assert_eq!(
            err,
            Violation::OutOfOrder {
                key: "o1".into(),
                expected: "o2".into(),
            }
        );
        // The misordered frame was consumed.
        assert_eq!(h.last_unreleased().map(Frame::key), Some("o1"));
    }

    #[test]
    fn double_release_and_no_release_frames() {
        let mut h = History::new();
        h.record(Frame::new("o1", all())).unwrap();
        h.release("o1").unwrap();
        assert_eq!(
            h.release("o1").unwrap_err(),
            Violation::AlreadyReleased { key: "o1".into() }
        );

        let mut h = History::new();
        h.record(Frame::new("o1", Options::new().no_release())).unwrap();
        assert_eq!(
            h.release("o1").unwrap_err(),
            Violation::AlreadyReleased { key: "o1".into() }
        );
    }

    #[test]
    fn unmatched_release() {
        let mut h = History::new();
        assert_eq!(
            h.release("o2").unwrap_err(),
            Violation::UnmatchedRelease { key: "o2".into() }
        );
    }

    #[test]
    fn release_ignores_frames_past_cursor() {
        let mut h = History::new();
        h.record(Frame::new("o1", all())).unwrap();
        h.rewind();
        assert!(matches!(
            h.release("o1"),
            Err(Violation::UnmatchedRelease { .. })
        ));
    }
}
