/// One of the three indicator lines of the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLine {
    A,
    B,
    C,
}

impl OutputLine {
    pub const ALL: [OutputLine; 3] = [OutputLine::A, OutputLine::B, OutputLine::C];

    pub const fn index(self) -> usize {
        match self {
            OutputLine::A => 0,
            OutputLine::B => 1,
            OutputLine::C => 2,
        }
    }
}

/// Hardware signal feeding one of the interrupt pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSignal {
    /// Rising edge, an object was placed
    Detection,
    /// Falling edge, the object was removed
    Removal,
}

impl EdgeSignal {
    pub(crate) const fn index(self) -> usize {
        match self {
            EdgeSignal::Detection => 0,
            EdgeSignal::Removal => 1,
        }
    }
}

/// Fixed animation sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// A, B, C
    Arrival,
    /// C, B, A
    Departure,
}

impl Sequence {
    pub const fn lines(self) -> [OutputLine; 3] {
        match self {
            Sequence::Arrival => [OutputLine::A, OutputLine::B, OutputLine::C],
            Sequence::Departure => [OutputLine::C, OutputLine::B, OutputLine::A],
        }
    }
}

/// Numeric state requested through the control channel.
///
/// Only values `0..=8` can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampState(u8);

impl LampState {
    pub const MAX: u8 = 8;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw >= 0 && raw <= Self::MAX as i64 {
            Some(LampState(raw as u8))
        } else {
            None
        }
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    pub const fn command(self) -> LampCommand {
        match self.0 {
            0 => LampCommand::LineOn(OutputLine::A),
            1 => LampCommand::LineOn(OutputLine::B),
            2 => LampCommand::LineOn(OutputLine::C),
            3 => LampCommand::LineOff(OutputLine::A),
            4 => LampCommand::LineOff(OutputLine::B),
            5 => LampCommand::LineOff(OutputLine::C),
            6 => LampCommand::Play(Sequence::Arrival),
            7 => LampCommand::Play(Sequence::Departure),
            _ => LampCommand::Reserved,
        }
    }
}

/// Action carried by a [`LampState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampCommand {
    LineOn(OutputLine),
    LineOff(OutputLine),
    Play(Sequence),
    /// State 8 is stored and readable but drives no output
    Reserved,
}
