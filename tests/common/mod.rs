#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use embedded_hal::digital::{ErrorType, InputPin};
use octolamp::config::LampConfig;
use octolamp::{ChannelError, ChannelHost, LampController, OutputLine, OutputRegisters, Sequence};

pub type TestController = LampController<RecordingRegisters, FakeLevel, FakeChannelHost>;

pub const HOLD: Duration = Duration::from_millis(2);

/// Short timings, default quiet interval
pub const TEST_CONFIG: LampConfig = LampConfig {
    quiet_interval: Duration::from_millis(100),
    settle_delay: Duration::from_millis(1),
    hold: HOLD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On(OutputLine),
    Off(OutputLine),
}

/// Output registers in memory, recording every write in order.
#[derive(Default)]
pub struct RecordingRegisters {
    levels: [AtomicBool; 3],
    log: Mutex<Vec<(Toggle, Instant)>>,
}

impl RecordingRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggles(&self) -> Vec<Toggle> {
        self.log.lock().unwrap().iter().map(|(toggle, _)| *toggle).collect()
    }

    pub fn timed_toggles(&self) -> Vec<(Toggle, Instant)> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn lit(&self) -> Vec<OutputLine> {
        OutputLine::ALL
            .into_iter()
            .filter(|line| self.is_set(*line))
            .collect()
    }

    fn record(&self, toggle: Toggle) {
        self.log.lock().unwrap().push((toggle, Instant::now()));
    }
}

impl OutputRegisters for RecordingRegisters {
    fn set_line(&self, line: OutputLine) {
        self.levels[line.index()].store(true, Ordering::SeqCst);
        self.record(Toggle::On(line));
    }

    fn clear_line(&self, line: OutputLine) {
        self.levels[line.index()].store(false, Ordering::SeqCst);
        self.record(Toggle::Off(line));
    }

    fn is_set(&self, line: OutputLine) -> bool {
        self.levels[line.index()].load(Ordering::SeqCst)
    }
}

/// Toggles a sequence is expected to produce.
pub fn sequence_toggles(sequence: Sequence) -> Vec<Toggle> {
    sequence
        .lines()
        .into_iter()
        .flat_map(|line| [Toggle::On(line), Toggle::Off(line)])
        .collect()
}

/// Input line with a level the test can change after handing it over.
#[derive(Clone)]
pub struct FakeLevel(Arc<AtomicBool>);

impl FakeLevel {
    pub fn new(high: bool) -> Self {
        Self(Arc::new(AtomicBool::new(high)))
    }

    pub fn set_high(&self, high: bool) {
        self.0.store(high, Ordering::SeqCst);
    }
}

impl ErrorType for FakeLevel {
    type Error = Infallible;
}

impl InputPin for FakeLevel {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct HostState {
    published: AtomicBool,
    failing: AtomicBool,
    publish_calls: AtomicU32,
    withdraw_calls: AtomicU32,
}

/// Channel host whose state stays observable after it moved into the
/// controller.
#[derive(Clone, Default)]
pub struct FakeChannelHost(Arc<HostState>);

impl FakeChannelHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_published(&self) -> bool {
        self.0.published.load(Ordering::SeqCst)
    }

    pub fn publish_calls(&self) -> u32 {
        self.0.publish_calls.load(Ordering::SeqCst)
    }

    pub fn withdraw_calls(&self) -> u32 {
        self.0.withdraw_calls.load(Ordering::SeqCst)
    }
}

impl ChannelHost for FakeChannelHost {
    fn publish(&mut self) -> Result<(), ChannelError> {
        self.0.publish_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::Rejected);
        }
        self.0.published.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn withdraw(&mut self) {
        self.0.withdraw_calls.fetch_add(1, Ordering::SeqCst);
        self.0.published.store(false, Ordering::SeqCst);
    }
}

pub struct Rig {
    pub controller: TestController,
    pub level: FakeLevel,
    pub host: FakeChannelHost,
}

impl Rig {
    /// Controller started at tick 0 with the detection line high
    pub fn new() -> Self {
        Self::with_config(TEST_CONFIG)
    }

    pub fn with_config(config: LampConfig) -> Self {
        let level = FakeLevel::new(true);
        let host = FakeChannelHost::new();
        let controller = LampController::new(
            config,
            RecordingRegisters::new(),
            level.clone(),
            host.clone(),
            Instant::from_millis(0),
        );
        // Drop the startup baseline writes
        controller.registers().clear_log();
        Self {
            controller,
            level,
            host,
        }
    }

    /// Run a detection edge at tick 150 through both halves and forget the
    /// toggles it produced.
    pub fn activated() -> Self {
        let rig = Self::new();
        assert!(rig.controller.on_detection_edge(Instant::from_millis(150)));
        block_on(rig.controller.handle_detection());
        assert!(rig.controller.is_active());
        rig.controller.registers().clear_log();
        rig
    }

    pub fn registers(&self) -> &RecordingRegisters {
        self.controller.registers()
    }

    /// Channel existence and the active flag must always agree.
    pub fn assert_lifecycle_consistent(&self) {
        assert_eq!(self.controller.is_active(), self.host.is_published());
    }
}
