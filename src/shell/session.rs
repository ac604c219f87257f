//! Process-lifetime imaging session
//!
//! Holds whatever the platform needs initialized before thumbnails can be
//! requested. It is created once at startup by the host and released when
//! dropped, instead of living in static storage.

use crate::core::error::Result;
use log::{debug, info};
use std::marker::PhantomData;

/// RAII scope for the platform imaging subsystem
///
/// On Windows this keeps COM initialized on the creating thread for as long
/// as the session lives. It is tied to that thread and is neither `Send` nor
/// `Sync`.
pub struct ImagingSession {
    #[cfg(windows)]
    _com: crate::shell::win_shell::ComGuard,
    _not_send: PhantomData<*const ()>,
}

impl ImagingSession {
    /// Start the imaging subsystem on the current thread
    pub fn start() -> Result<Self> {
        #[cfg(windows)]
        let com = crate::shell::win_shell::initialize_com()?;

        info!("Imaging session started");

        Ok(Self {
            #[cfg(windows)]
            _com: com,
            _not_send: PhantomData,
        })
    }
}

impl Drop for ImagingSession {
    fn drop(&mut self) {
        debug!("Imaging session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_start_and_drop() {
        let session = ImagingSession::start().unwrap();
        drop(session);

        // A second session after release must start cleanly
        let _again = ImagingSession::start().unwrap();
    }
}
