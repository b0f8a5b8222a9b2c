use std::time::Instant;

use super::RTCSession;
use crate::session::event::{RTCSessionEvent, RTCTransportEvent};
use shared::error::{Error, Result};

/// Drives the session as a sans-I/O protocol: transport signals go in
/// through `handle_event`, session notifications come out of `poll_event`.
/// The session carries no payload and keeps no timers.
impl sansio::Protocol<(), (), RTCTransportEvent> for RTCSession {
    type Rout = ();
    type Wout = ();
    type Eout = RTCSessionEvent;
    type Error = Error;
    type Time = Instant;

    fn handle_read(&mut self, _msg: ()) -> Result<()> {
        Ok(())
    }

    fn poll_read(&mut self) -> Option<Self::Rout> {
        None
    }

    fn handle_write(&mut self, _msg: ()) -> Result<()> {
        Ok(())
    }

    fn poll_write(&mut self) -> Option<Self::Wout> {
        None
    }

    fn handle_event(&mut self, evt: RTCTransportEvent) -> Result<()> {
        let result = self.handle_transport_event(evt);
        self.flush_events();
        result
    }

    fn poll_event(&mut self) -> Option<Self::Eout> {
        self.events.pop_front()
    }

    fn handle_timeout(&mut self, _now: Instant) -> Result<()> {
        Ok(())
    }

    fn poll_timeout(&mut self) -> Option<Self::Time> {
        None
    }

    fn close(&mut self) -> Result<()> {
        RTCSession::close(self)
    }
}
