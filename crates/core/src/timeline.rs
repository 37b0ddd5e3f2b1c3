//! Execution timelines.

use serde::{Deserialize, Serialize};
use crate::{Pid, Tick};

/// A contiguous interval during which one process holds the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Process on the CPU
    pub pid: Pid,
    /// Inclusive start
    pub start: Tick,
    /// Exclusive end
    pub end: Tick,
}

impl Segment {
    /// Create a segment.
    pub fn new(pid: Pid, start: Tick, end: Tick) -> Self {
        Self { pid, start, end }
    }

    /// Length of the segment.
    pub fn duration(&self) -> Tick {
        self.end - self.start
    }
}

impl From<(u32, Tick, Tick)> for Segment {
    fn from((pid, start, end): (u32, Tick, Tick)) -> Self {
        Self::new(Pid::new(pid), start, end)
    }
}

/// Ordered sequence of segments on a single CPU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Empty intervals are dropped.
    pub fn push(&mut self, pid: Pid, start: Tick, end: Tick) {
        if start < end {
            self.segments.push(Segment::new(pid, start, end));
        }
    }

    /// Collapse back-to-back runs of the same pid into single segments.
    ///
    /// Two segments merge only when the pid matches and the second starts
    /// exactly where the first ended.
    pub fn merged(self) -> Self {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for seg in self.segments {
            match merged.last_mut() {
                Some(last) if last.pid == seg.pid && last.end == seg.start => last.end = seg.end,
                _ => merged.push(seg),
            }
        }
        Self { segments: merged }
    }

    /// Segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the timeline has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total time the CPU was busy.
    pub fn total_exec(&self) -> Tick {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// Earliest segment start.
    pub fn first_start(&self) -> Option<Tick> {
        self.segments.iter().map(|s| s.start).min()
    }

    /// Latest segment end.
    pub fn last_end(&self) -> Option<Tick> {
        self.segments.iter().map(|s| s.end).max()
    }

    /// Distance from the first start to the last end, 0 when empty.
    pub fn span(&self) -> Tick {
        match (self.first_start(), self.last_end()) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        }
    }

    /// Segments belonging to one pid.
    pub fn for_pid(&self, pid: Pid) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter().filter(move |s| s.pid == pid)
    }
}

impl From<Vec<Segment>> for Timeline {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<Segment> for Timeline {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self { segments: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl IntoIterator for Timeline {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}
