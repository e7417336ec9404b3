use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::Mutex,
    signal::Signal,
};
use embassy_time::{Instant, Timer};
use embedded_hal::digital::InputPin;
use log::{debug, error, info, warn};

use super::animation::AnimationPlayer;
use crate::{
    config::LampConfig,
    controllers::{ChannelEndpoint, ControlChannel},
    domain::{
        entity::{EdgeSignal, LampState, Sequence},
        ports::{ChannelHost, OutputRegisters},
    },
    edge::EdgeGates,
};

/// Everything mutated under the activation lock.
struct Activation<S, H> {
    /// Live level of the detection line
    sense: S,
    host: H,
    channel_published: bool,
}

/// Point-in-time view of the controller for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub active: bool,
    pub init_failed: bool,
    pub open_count: u32,
    pub requested: Option<LampState>,
    pub accepted_edges: u32,
    pub rejected_edges: u32,
}

/// Lamp controller owning every piece of mutable state.
///
/// Edges enter through the non-blocking top-halves
/// ([`on_detection_edge`](Self::on_detection_edge),
/// [`on_removal_edge`](Self::on_removal_edge)), which only debounce and
/// queue work. The queued bottom-halves run on a worker task under the
/// activation lock. The control channel uses its own lock; the two locks are
/// never nested.
pub struct LampController<R, S, H> {
    config: LampConfig,
    player: AnimationPlayer<R>,
    gates: EdgeGates,
    active: AtomicBool,
    init_failed: AtomicBool,
    accepted_edges: AtomicU32,
    rejected_edges: AtomicU32,
    activation: Mutex<CriticalSectionRawMutex, Activation<S, H>>,
    channel: ControlChannel,
    detection_work: Signal<CriticalSectionRawMutex, ()>,
    removal_work: Signal<CriticalSectionRawMutex, ()>,
}

impl<R, S, H> LampController<R, S, H>
where
    R: OutputRegisters,
    S: InputPin,
    H: ChannelHost,
{
    /// Create an inactive controller and drive every output line low.
    ///
    /// `start` seeds both debounce gates.
    pub fn new(config: LampConfig, registers: R, sense: S, host: H, start: Instant) -> Self {
        let player = AnimationPlayer::new(registers, config.hold);
        player.clear_all();

        Self {
            config,
            player,
            gates: EdgeGates::new(start, config.quiet_interval),
            active: AtomicBool::new(false),
            init_failed: AtomicBool::new(false),
            accepted_edges: AtomicU32::new(0),
            rejected_edges: AtomicU32::new(0),
            activation: Mutex::new(Activation {
                sense,
                host,
                channel_published: false,
            }),
            channel: ControlChannel::new(),
            detection_work: Signal::new(),
            removal_work: Signal::new(),
        }
    }

    /// Top-half of the detection pipeline. Never blocks.
    ///
    /// Returns `true` when the bottom-half was queued.
    pub fn on_detection_edge(&self, now: Instant) -> bool {
        if !self.debounce(EdgeSignal::Detection, now) {
            return false;
        }
        if self.init_failed.load(Ordering::Acquire) || self.active.load(Ordering::Acquire) {
            return false;
        }
        self.detection_work.signal(());
        true
    }

    /// Top-half of the removal pipeline. Never blocks.
    ///
    /// Returns `true` when the bottom-half was queued.
    pub fn on_removal_edge(&self, now: Instant) -> bool {
        if !self.debounce(EdgeSignal::Removal, now) {
            return false;
        }
        if !self.active.load(Ordering::Acquire) {
            return false;
        }
        self.removal_work.signal(());
        true
    }

    fn debounce(&self, signal: EdgeSignal, now: Instant) -> bool {
        let accepted = self.gates.accept(signal, now);
        let counter = if accepted {
            &self.accepted_edges
        } else {
            debug!("activation: {:?} edge bounced", signal);
            &self.rejected_edges
        };
        counter.fetch_add(1, Ordering::Relaxed);
        accepted
    }

    /// Bottom-half of the detection pipeline.
    ///
    /// Confirms the edge after the settle delay, publishes the control
    /// channel and plays the arrival sequence, all under the activation lock.
    pub async fn handle_detection(&self) {
        let mut activation = self.activation.lock().await;
        if self.init_failed.load(Ordering::Acquire) {
            return;
        }

        Timer::after(self.config.settle_delay).await;
        match activation.sense.is_high() {
            Ok(true) => {}
            Ok(false) => {
                debug!("activation: detection edge resolved to no event");
                return;
            }
            Err(_) => {
                warn!("activation: detection line unreadable");
                return;
            }
        }

        if activation.channel_published {
            return;
        }

        if let Err(err) = activation.host.publish() {
            self.init_failed.store(true, Ordering::Release);
            error!(
                "activation: control channel creation failed: {:?}, detection disabled until restart",
                err
            );
            return;
        }
        activation.channel_published = true;
        self.active.store(true, Ordering::Release);
        info!("activation: lamp active");

        self.player.play(Sequence::Arrival).await;
    }

    /// Bottom-half of the removal pipeline.
    ///
    /// Plays the departure sequence, then withdraws the control channel.
    pub async fn handle_removal(&self) {
        let mut activation = self.activation.lock().await;
        if !activation.channel_published {
            warn!("activation: removal without a control channel");
            return;
        }

        self.player.play(Sequence::Departure).await;

        activation.host.withdraw();
        activation.channel_published = false;
        self.active.store(false, Ordering::Release);
        self.channel.reset_references();
        info!("activation: lamp inactive");
    }

    /// Wait for queued detection work and run it.
    pub async fn run_detection_worker(&self) {
        loop {
            self.detection_work.wait().await;
            self.handle_detection().await;
        }
    }

    /// Wait for queued removal work and run it.
    pub async fn run_removal_worker(&self) {
        loop {
            self.removal_work.wait().await;
            self.handle_removal().await;
        }
    }

    /// Withdraw the control channel and drive every output line low.
    pub async fn shutdown(&self) {
        let mut activation = self.activation.lock().await;
        if activation.channel_published {
            activation.host.withdraw();
            activation.channel_published = false;
        }
        self.active.store(false, Ordering::Release);
        self.channel.reset_references();
        self.player.clear_all();
        info!("activation: lamp shut down");
    }

    /// Byte-oriented control channel surface.
    ///
    /// Only usable while the lamp is active, see [`ChannelEndpoint`].
    pub fn endpoint(&self) -> ChannelEndpoint<'_, R> {
        ChannelEndpoint::new(&self.channel, &self.player, &self.active)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn init_failed(&self) -> bool {
        self.init_failed.load(Ordering::Acquire)
    }

    /// Whether deferred work is queued for the pipeline of `signal`.
    pub fn work_pending(&self, signal: EdgeSignal) -> bool {
        match signal {
            EdgeSignal::Detection => self.detection_work.signaled(),
            EdgeSignal::Removal => self.removal_work.signaled(),
        }
    }

    pub fn registers(&self) -> &R {
        self.player.registers()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            active: self.is_active(),
            init_failed: self.init_failed(),
            open_count: self.channel.open_count(),
            requested: self.channel.requested().await,
            accepted_edges: self.accepted_edges.load(Ordering::Relaxed),
            rejected_edges: self.rejected_edges.load(Ordering::Relaxed),
        }
    }
}
