use log::info;

use crate::domain::ports::{ChannelError, ChannelHost};

/// Channel host for a single controller session.
///
/// Keeps track of whether the control channel is currently exposed and
/// refuses to expose it twice. It only records the exposure; making the
/// channel reachable from other processes is left to the platform, which
/// drives [`LampController::endpoint`](crate::LampController::endpoint).
#[derive(Debug, Default)]
pub struct SessionChannelHost {
    name: &'static str,
    published: bool,
    publications: u32,
}

impl SessionChannelHost {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            published: false,
            publications: 0,
        }
    }

    pub const fn is_published(&self) -> bool {
        self.published
    }

    /// How many times the channel was exposed in this session
    pub const fn publications(&self) -> u32 {
        self.publications
    }
}

impl ChannelHost for SessionChannelHost {
    fn publish(&mut self) -> Result<(), ChannelError> {
        if self.published {
            return Err(ChannelError::AlreadyPublished);
        }
        self.published = true;
        self.publications = self.publications.saturating_add(1);
        info!("channel_host: {} exposed", self.name);
        Ok(())
    }

    fn withdraw(&mut self) {
        if self.published {
            self.published = false;
            info!("channel_host: {} withdrawn", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_once_until_withdrawn() {
        let mut host = SessionChannelHost::new("octolamp");

        assert_eq!(host.publish(), Ok(()));
        assert_eq!(host.publish(), Err(ChannelError::AlreadyPublished));
        assert!(host.is_published());

        host.withdraw();
        assert!(!host.is_published());
        assert_eq!(host.publish(), Ok(()));
        assert_eq!(host.publications(), 2);
    }
}
