use crossbeam_channel::Sender;

use crate::session::candidate::RTCIceCandidate;
use crate::session::state::{RTCIceGatheringState, RTCSignalingState};
use shared::error::{Error, Result};

/// Local candidates gathered for one content.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCIceCandidatesEvent {
    pub content_name: String,
    pub candidates: Vec<RTCIceCandidate>,
}

/// Notifications the session produces for its owner.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RTCSessionEvent {
    OnIceCandidatesEvent(RTCIceCandidatesEvent),
    /// Carries the name of the transport that finished gathering.
    OnIceGatheringCompleteEvent(String),
    OnIceGatheringStateChangeEvent(RTCIceGatheringState),
    OnSignalingStateChangeEvent(RTCSignalingState),
    /// The session hit a fatal error. Emitted at most once.
    OnErrorEvent,
}

impl RTCSessionEvent {
    fn is_observed(&self) -> bool {
        matches!(
            self,
            RTCSessionEvent::OnIceCandidatesEvent(_)
                | RTCSessionEvent::OnIceGatheringCompleteEvent(_)
                | RTCSessionEvent::OnErrorEvent
        )
    }
}

/// Receives candidate, gathering and error notifications as they are
/// flushed. Without a registered observer they stay queued for
/// [`poll_event`](sansio::Protocol::poll_event).
pub trait RTCSessionObserver {
    fn on_ice_candidates(&mut self, content_name: &str, candidates: &[RTCIceCandidate]);
    fn on_ice_gathering_complete(&mut self, transport_name: &str);
    fn on_error(&mut self);
}

/// Delivers an observed event, handing it back when the observer does not
/// consume events of its kind.
pub(crate) fn dispatch(
    observer: &mut dyn RTCSessionObserver,
    event: RTCSessionEvent,
) -> Option<RTCSessionEvent> {
    if !event.is_observed() {
        return Some(event);
    }
    match event {
        RTCSessionEvent::OnIceCandidatesEvent(e) => {
            observer.on_ice_candidates(&e.content_name, &e.candidates)
        }
        RTCSessionEvent::OnIceGatheringCompleteEvent(transport_name) => {
            observer.on_ice_gathering_complete(&transport_name)
        }
        RTCSessionEvent::OnErrorEvent => observer.on_error(),
        _ => {}
    }
    None
}

/// Signals raised by transports. They arrive on arbitrary threads and are
/// applied on the session's thread by
/// [`process_transport_events`](crate::session::RTCSession::process_transport_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RTCTransportEvent {
    CandidatesReady {
        content_name: String,
        candidates: Vec<RTCIceCandidate>,
    },
    GatheringComplete {
        transport_name: String,
    },
    /// The transport needs signaling before it can start connectivity checks.
    RequestSignaling {
        transport_name: String,
    },
    Connecting {
        transport_name: String,
    },
    Writable {
        transport_name: String,
    },
    Failed {
        transport_name: String,
        reason: String,
    },
}

impl RTCTransportEvent {
    pub(crate) fn transport_name(&self) -> Option<&str> {
        match self {
            RTCTransportEvent::CandidatesReady { .. } => None,
            RTCTransportEvent::GatheringComplete { transport_name }
            | RTCTransportEvent::RequestSignaling { transport_name }
            | RTCTransportEvent::Connecting { transport_name }
            | RTCTransportEvent::Writable { transport_name }
            | RTCTransportEvent::Failed { transport_name, .. } => Some(transport_name),
        }
    }
}

/// Sending half handed to every transport the session creates.
///
/// Cloneable and `Send`, so transports may keep a copy on their own threads.
#[derive(Debug, Clone)]
pub struct RTCTransportEventSender {
    tx: Sender<RTCTransportEvent>,
}

impl RTCTransportEventSender {
    pub(crate) fn new(tx: Sender<RTCTransportEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: RTCTransportEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|err| Error::Other(format!("session is gone: {err}")))
    }

    pub fn candidates_ready(
        &self,
        content_name: &str,
        candidates: Vec<RTCIceCandidate>,
    ) -> Result<()> {
        self.send(RTCTransportEvent::CandidatesReady {
            content_name: content_name.to_owned(),
            candidates,
        })
    }

    pub fn gathering_complete(&self, transport_name: &str) -> Result<()> {
        self.send(RTCTransportEvent::GatheringComplete {
            transport_name: transport_name.to_owned(),
        })
    }

    pub fn request_signaling(&self, transport_name: &str) -> Result<()> {
        self.send(RTCTransportEvent::RequestSignaling {
            transport_name: transport_name.to_owned(),
        })
    }

    pub fn connecting(&self, transport_name: &str) -> Result<()> {
        self.send(RTCTransportEvent::Connecting {
            transport_name: transport_name.to_owned(),
        })
    }

    pub fn writable(&self, transport_name: &str) -> Result<()> {
        self.send(RTCTransportEvent::Writable {
            transport_name: transport_name.to_owned(),
        })
    }

    pub fn failed(&self, transport_name: &str, reason: &str) -> Result<()> {
        self.send(RTCTransportEvent::Failed {
            transport_name: transport_name.to_owned(),
            reason: reason.to_owned(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl RTCSessionObserver for Recorder {
        fn on_ice_candidates(&mut self, content_name: &str, candidates: &[RTCIceCandidate]) {
            self.calls
                .push(format!("candidates {content_name} {}", candidates.len()));
        }

        fn on_ice_gathering_complete(&mut self, transport_name: &str) {
            self.calls.push(format!("complete {transport_name}"));
        }

        fn on_error(&mut self) {
            self.calls.push("error".to_owned());
        }
    }

    #[test]
    fn test_dispatch_to_observer() {
        let mut recorder = Recorder::default();

        let events = vec![
            RTCSessionEvent::OnIceCandidatesEvent(RTCIceCandidatesEvent {
                content_name: "audio".to_owned(),
                candidates: vec![RTCIceCandidate::host("audio", "1", "10.0.0.1", 5000)],
            }),
            RTCSessionEvent::OnSignalingStateChangeEvent(RTCSignalingState::Stable),
            RTCSessionEvent::OnIceGatheringCompleteEvent("audio".to_owned()),
            RTCSessionEvent::OnErrorEvent,
        ];

        let left: Vec<RTCSessionEvent> = events
            .into_iter()
            .filter_map(|event| dispatch(&mut recorder, event))
            .collect();

        assert_eq!(
            left,
            vec![RTCSessionEvent::OnSignalingStateChangeEvent(
                RTCSignalingState::Stable
            )]
        );
        assert_eq!(
            recorder.calls,
            vec![
                "candidates audio 1".to_owned(),
                "complete audio".to_owned(),
                "error".to_owned(),
            ]
        );
    }

    #[test]
    fn test_transport_event_sender() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sender = RTCTransportEventSender::new(tx);

        assert!(sender.writable("audio").is_ok());
        let event = rx.try_recv().ok();
        assert_eq!(
            event.as_ref().and_then(|e| e.transport_name()),
            Some("audio")
        );

        drop(rx);
        assert!(sender.connecting("audio").is_err());
    }
}
