use crate::domain::entity::OutputLine;

/// Raw access to the three output lines.
///
/// Every call is a single atomic register write. Callers share the
/// implementation without a lock, so sequences of calls are not ordered
/// between independent callers.
pub trait OutputRegisters {
    /// Drive the line high
    fn set_line(&self, line: OutputLine);

    /// Drive the line low
    fn clear_line(&self, line: OutputLine);

    /// Read back the driven level of the line
    fn is_set(&self, line: OutputLine) -> bool;
}

impl<T: OutputRegisters + ?Sized> OutputRegisters for &T {
    fn set_line(&self, line: OutputLine) {
        (**self).set_line(line);
    }

    fn clear_line(&self, line: OutputLine) {
        (**self).clear_line(line);
    }

    fn is_set(&self, line: OutputLine) -> bool {
        (**self).is_set(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The host already exposes a channel
    AlreadyPublished,
    /// The host refused to expose the channel
    Rejected,
    /// The channel is not exposed while the lamp is inactive
    Withdrawn,
}

/// Hosting side of the control channel.
///
/// Makes the control channel visible to other processes while the lamp is
/// active and hides it again on deactivation.
pub trait ChannelHost {
    /// Expose the control channel
    fn publish(&mut self) -> Result<(), ChannelError>;

    /// Stop exposing the control channel
    fn withdraw(&mut self);
}
