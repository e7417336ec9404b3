use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use log::{debug, info, warn};

use crate::{
    app::AnimationPlayer,
    domain::{
        entity::{LampCommand, LampState, Sequence},
        ports::{ChannelError, OutputRegisters},
    },
};

/// Payload returned by a read when no valid state was requested yet.
pub const INVALID_STATE_PAYLOAD: &[u8] = b"Invalid state\n";

/// State behind the control channel.
///
/// The requested state lives behind its own lock, independent from the
/// activation lock. The open count is lock-free.
pub struct ControlChannel {
    open_count: AtomicU32,
    requested: Mutex<CriticalSectionRawMutex, Option<LampState>>,
}

impl ControlChannel {
    pub const fn new() -> Self {
        Self {
            open_count: AtomicU32::new(0),
            requested: Mutex::new(None),
        }
    }

    pub fn open_count(&self) -> u32 {
        self.open_count.load(Ordering::Acquire)
    }

    pub async fn requested(&self) -> Option<LampState> {
        *self.requested.lock().await
    }

    /// Drop every open reference once the channel is withdrawn.
    pub(crate) fn reset_references(&self) {
        let dropped = self.open_count.swap(0, Ordering::AcqRel);
        if dropped > 0 {
            debug!("channel: withdrawn with {} open references", dropped);
        }
    }
}

impl Default for ControlChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a control channel read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelReading {
    /// Little-endian `u32` encoding of the requested state
    State([u8; 4]),
    Invalid,
}

impl ChannelReading {
    fn from_requested(requested: Option<LampState>) -> Self {
        match requested {
            Some(state) => ChannelReading::State(u32::from(state.as_u8()).to_le_bytes()),
            None => ChannelReading::Invalid,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ChannelReading::State(bytes) => bytes.as_slice(),
            ChannelReading::Invalid => INVALID_STATE_PAYLOAD,
        }
    }

    pub fn state(&self) -> Option<u32> {
        match self {
            ChannelReading::State(bytes) => Some(u32::from_le_bytes(*bytes)),
            ChannelReading::Invalid => None,
        }
    }
}

/// Byte-oriented surface of the control channel.
///
/// Borrowed from the owning controller; commands drive the same output
/// registers as the edge pipelines but are serialized only by the channel
/// lock. An endpoint kept past a withdrawal refuses `open` and `read` with
/// [`ChannelError::Withdrawn`] until the lamp is active again.
pub struct ChannelEndpoint<'a, R> {
    channel: &'a ControlChannel,
    player: &'a AnimationPlayer<R>,
    active: &'a AtomicBool,
}

impl<'a, R: OutputRegisters> ChannelEndpoint<'a, R> {
    pub(crate) const fn new(
        channel: &'a ControlChannel,
        player: &'a AnimationPlayer<R>,
        active: &'a AtomicBool,
    ) -> Self {
        Self {
            channel,
            player,
            active,
        }
    }

    fn ensure_published(&self) -> Result<(), ChannelError> {
        if self.active.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(ChannelError::Withdrawn)
        }
    }

    /// Returns the number of open references after opening.
    pub fn open(&self) -> Result<u32, ChannelError> {
        self.ensure_published()?;
        let count = self.channel.open_count.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("channel: opened, {} references", count);
        Ok(count)
    }

    /// Returns `false` when there was no open reference to release.
    ///
    /// References still held when the channel was withdrawn are already
    /// gone, closing them is a quiet no-op.
    pub fn close(&self) -> bool {
        if self.ensure_published().is_err() {
            debug!("channel: close after withdrawal");
            return false;
        }

        let released = self
            .channel
            .open_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            })
            .is_ok();

        if released {
            debug!("channel: closed");
        } else {
            warn!("channel: close without a matching open");
        }
        released
    }

    pub async fn read(&self) -> Result<ChannelReading, ChannelError> {
        let requested = self.channel.requested.lock().await;
        self.ensure_published()?;
        Ok(ChannelReading::from_requested(*requested))
    }

    /// Request a state transition.
    ///
    /// Always reports the whole payload as accepted. Malformed payloads,
    /// out-of-range values and writes while the lamp is inactive leave every
    /// state untouched.
    pub async fn write(&self, payload: &[u8]) -> usize {
        let accepted = payload.len();

        let Some(state) = parse_state(payload) else {
            debug!("channel: ignoring invalid payload");
            return accepted;
        };

        let mut requested = self.channel.requested.lock().await;
        if !self.active.load(Ordering::Acquire) {
            debug!("channel: lamp inactive, ignoring state {}", state.as_u8());
            return accepted;
        }

        let previous = requested.replace(state);
        info!("channel: state {} requested", state.as_u8());

        match state.command() {
            LampCommand::LineOn(line) => self.player.set_line(line),
            LampCommand::LineOff(line) => self.player.clear_line(line),
            LampCommand::Play(Sequence::Arrival) => self.player.play(Sequence::Arrival).await,
            LampCommand::Play(Sequence::Departure) => {
                self.player.play(Sequence::Departure).await;
                // Only a single-line "on" state is restored
                if let Some(LampCommand::LineOn(line)) = previous.map(LampState::command) {
                    self.player.set_line(line);
                }
            }
            LampCommand::Reserved => {
                info!("channel: state {} drives no output", state.as_u8());
            }
        }

        accepted
    }
}

/// Parse the first decimal integer of the payload.
///
/// Leading ASCII whitespace and an optional sign are accepted, anything after
/// the digits is ignored. Returns `None` for payloads without a leading
/// integer and for values outside `0..=8`.
pub fn parse_state(payload: &[u8]) -> Option<LampState> {
    let text = payload.trim_ascii_start();
    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, text),
    };

    let len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for digit in &digits[..len] {
        value = value
            .checked_mul(10)?
            .checked_add(i64::from(digit - b'0'))?;
    }
    if negative {
        value = -value;
    }

    LampState::from_raw(value)
}
