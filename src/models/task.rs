//! Tasks and their mapping onto the temporal network.
//!
//! A task occupies three consecutive timepoints — start, pickup, delivery —
//! and five constraints: one window per timepoint (relative to the zero
//! timepoint), a travel duration between start and pickup, and a work
//! duration between pickup and delivery. Consecutive tasks are linked by a
//! `[0, inf)` wait constraint.
//!
//! Task `position` 1 maps to nodes 1..=3, position 2 to nodes 4..=6, and so
//! on; node 0 is reserved for the zero timepoint. Inserting or removing a
//! task relabels every later node by ±3.

use serde::{Deserialize, Serialize};

use super::{DurationDistribution, TemporalNetwork, Timepoint, TimepointKind};

/// Absolute execution window of a timepoint, relative to the zero timepoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimepointWindow {
    /// Earliest allowed time.
    pub earliest: f64,
    /// Latest allowed time.
    pub latest: f64,
}

impl TimepointWindow {
    /// Creates a window `[earliest, latest]`.
    pub fn new(earliest: f64, latest: f64) -> Self {
        Self { earliest, latest }
    }

    /// Shifts the window by `offset`.
    fn shifted(self, offset: f64) -> Self {
        Self {
            earliest: self.earliest + offset,
            latest: self.latest + offset,
        }
    }
}

/// A schedulable task: three timepoints plus travel and work durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task id.
    pub id: String,
    /// Window of the start timepoint.
    pub start: TimepointWindow,
    /// Window of the pickup timepoint.
    pub pickup: TimepointWindow,
    /// Window of the delivery timepoint.
    pub delivery: TimepointWindow,
    /// Duration from start to pickup.
    pub travel_time: DurationDistribution,
    /// Duration from pickup to delivery.
    pub work_time: DurationDistribution,
}

impl Task {
    /// Creates a task from its pickup window.
    ///
    /// The start and delivery windows are derived by shifting the pickup
    /// window by the mean travel and work durations.
    pub fn new(
        id: impl Into<String>,
        pickup: TimepointWindow,
        travel_time: DurationDistribution,
        work_time: DurationDistribution,
    ) -> Self {
        let start = pickup.shifted(-travel_time.mean());
        let delivery = pickup.shifted(work_time.mean());
        Self {
            id: id.into(),
            start,
            pickup,
            delivery,
            travel_time,
            work_time,
        }
    }

    /// Overrides the start window.
    pub fn with_start_window(mut self, window: TimepointWindow) -> Self {
        self.start = window;
        self
    }

    /// Overrides the delivery window.
    pub fn with_delivery_window(mut self, window: TimepointWindow) -> Self {
        self.delivery = window;
        self
    }
}

/// First node id of the task at `position` (positions start at 1).
fn start_node_id(position: usize) -> usize {
    3 * position - 2
}

impl TemporalNetwork {
    /// Inserts a task at `position`, displacing later tasks.
    ///
    /// Adds three timepoints with their windows, a travel constraint
    /// (contingent unless degenerate), a work constraint, and wait
    /// constraints linking the task to its neighbors.
    ///
    /// # Panics
    /// Panics if `position` is 0; positions start at 1.
    pub fn insert_task(&mut self, task: &Task, position: usize) {
        assert!(position >= 1, "task positions start at 1, got {position}");
        let start_id = start_node_id(position);
        let pickup_id = start_id + 1;
        let delivery_id = start_id + 2;

        // Break the wait link the new task is spliced into
        if start_id > 1 && self.has_edge(start_id - 1, start_id) {
            self.remove_constraint(start_id - 1, start_id);
        }

        self.shift_nodes(start_id, 3);

        self.add_timepoint(start_id, Timepoint::new(&task.id, TimepointKind::Start));
        self.add_constraint(0, start_id, task.start.earliest, task.start.latest);

        self.add_timepoint(pickup_id, Timepoint::new(&task.id, TimepointKind::Pickup));
        self.add_constraint(0, pickup_id, task.pickup.earliest, task.pickup.latest);

        self.add_timepoint(delivery_id, Timepoint::new(&task.id, TimepointKind::Delivery));
        self.add_constraint(0, delivery_id, task.delivery.earliest, task.delivery.latest);

        let mut chain = vec![start_id, pickup_id, delivery_id];
        if self.has_node(delivery_id + 1) {
            chain.push(delivery_id + 1);
        }
        if start_id > 0 && self.has_node(start_id - 1) {
            chain.insert(0, start_id - 1);
        }

        for pair in chain.windows(2) {
            self.link_timepoints(pair[0], pair[1], task);
        }
    }

    /// Removes the task at `position`, displacing later tasks back.
    ///
    /// # Panics
    /// Panics if `position` is 0; positions start at 1.
    pub fn remove_task(&mut self, position: usize) {
        assert!(position >= 1, "task positions start at 1, got {position}");
        let start_id = start_node_id(position);
        let pickup_id = start_id + 1;
        let delivery_id = start_id + 2;

        let relink = self.has_node(start_id - 1) && self.has_node(delivery_id + 1);

        self.remove_timepoint(start_id);
        self.remove_timepoint(pickup_id);
        self.remove_timepoint(delivery_id);

        self.shift_nodes(start_id, -3);

        if relink {
            let prev = start_id - 1;
            if self
                .timepoint(prev)
                .is_some_and(|tp| tp.kind == TimepointKind::Delivery)
            {
                self.add_constraint(prev, prev + 1, 0.0, f64::INFINITY);
            }
        }
    }

    /// Ids of the tasks in the network, in schedule order.
    pub fn get_tasks(&self) -> Vec<String> {
        self.nodes()
            .filter_map(|i| {
                let tp = self.timepoint(i)?;
                if tp.kind == TimepointKind::Start {
                    tp.task_id.clone()
                } else {
                    None
                }
            })
            .collect()
    }

    /// Adds the constraint between consecutive timepoints `i` and `j`,
    /// dispatched on the kind of `i`.
    fn link_timepoints(&mut self, i: usize, j: usize, task: &Task) {
        let Some(kind) = self.timepoint(i).map(|tp| tp.kind) else {
            return;
        };
        match kind {
            TimepointKind::Start => self.add_duration_constraint(i, j, &task.travel_time),
            TimepointKind::Pickup => self.add_duration_constraint(i, j, &task.work_time),
            // Wait between the end of one task and the start of the next
            TimepointKind::Delivery => self.add_constraint(i, j, 0.0, f64::INFINITY),
            TimepointKind::Zero | TimepointKind::Generic => {}
        }
    }

    /// A degenerate duration becomes a fixed requirement constraint; any
    /// other duration is contingent.
    fn add_duration_constraint(&mut self, i: usize, j: usize, duration: &DurationDistribution) {
        if duration.is_degenerate() {
            let mean = duration.mean();
            self.add_constraint(i, j, mean, mean);
        } else {
            self.add_contingent_constraint(i, j, duration.clone());
        }
    }
}
