use crossbeam_channel::Sender;

/// Dense state capture emitted at the configured output interval.
///
/// Carries everything reporting needs, the grids for rasters and the means
/// for the tabular record, so consumers on other threads never reach back
/// into the live simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub step: u64,
    pub time: f64,
    pub mean_prey: f64,
    pub mean_predators: f64,
    pub width: usize,
    pub height: usize,
    pub prey: Vec<f64>,
    pub predators: Vec<f64>,
}

/// Destination for frames produced by the run loop.
///
/// The engine pushes and forgets; a sink that buffers or crosses a channel
/// keeps the stepping loop free of I/O stalls.
pub trait FrameSink {
    fn record(&mut self, frame: Frame);
}

/// Channel hand-off to a consumer thread. A disconnected receiver drops
/// the frame rather than failing the run.
impl FrameSink for Sender<Frame> {
    fn record(&mut self, frame: Frame) {
        let _ = self.send(frame);
    }
}

/// In-memory collection, used by tests and trace comparisons.
impl FrameSink for Vec<Frame> {
    fn record(&mut self, frame: Frame) {
        self.push(frame);
    }
}

/// Adapter for closures, so ad-hoc consumers need no named type.
pub struct SinkFn<F>(pub F);

impl<F: FnMut(Frame)> FrameSink for SinkFn<F> {
    fn record(&mut self, frame: Frame) {
        (self.0)(frame);
    }
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Frame>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn frame(step: u64) -> Frame {
        Frame {
            step,
            time: step as f64 * 0.5,
            mean_prey: 1.0,
            mean_predators: 0.5,
            width: 1,
            height: 1,
            prey: vec![1.0],
            predators: vec![0.5],
        }
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<Frame> = Vec::new();
        sink.record(frame(0));
        sink.record(frame(10));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].step, 10);
    }

    #[test]
    fn channel_sink_delivers_frames() {
        let (mut tx, rx) = unbounded::<Frame>();
        tx.record(frame(3));
        assert_eq!(rx.recv().unwrap().step, 3);
    }

    #[test]
    fn disconnected_channel_is_not_an_error() {
        let (mut tx, rx) = unbounded::<Frame>();
        drop(rx);
        tx.record(frame(1));
    }

    #[test]
    fn closure_sink_observes_each_frame() {
        let mut seen = Vec::new();
        {
            let mut sink = SinkFn(|frame: Frame| seen.push(frame.step));
            sink.record(frame(0));
            sink.record(frame(10));
        }
        assert_eq!(seen, vec![0, 10]);
    }
}
