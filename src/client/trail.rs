use std::collections::VecDeque;

pub const TRAIL_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Most recent positions, oldest first, never more than `TRAIL_CAPACITY`.
#[derive(Debug, Clone, Default)]
pub struct TrailBuffer {
    points: VecDeque<TrailPoint>,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    pub fn append(&mut self, point: TrailPoint) {
        if self.points.len() == TRAIL_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn to_vec(&self) -> Vec<TrailPoint> {
        self.points.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
