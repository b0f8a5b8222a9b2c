#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rtc_session::data_channel::RTCDataChannelId;
use rtc_session::data_channel::parameters::DataChannelParameters;
use rtc_session::session::RTCSession;
use rtc_session::session::candidate::RTCIceCandidate;
use rtc_session::session::channel::{
    ChannelManager, DataMediaChannel, MediaChannel, RTCMediaChannel, VideoMediaChannel,
    VoiceMediaChannel,
};
use rtc_session::session::configuration::RTCConfiguration;
use rtc_session::session::configuration::media_constraints::RTCMediaConstraints;
use rtc_session::session::event::{RTCSessionObserver, RTCTransportEventSender};
use rtc_session::session::provider::{RTCAudioOptions, RTCVideoCapturer, RTCVideoRenderer};
use rtc_session::session::sdp::{
    RTCCodec, RTCCryptoParams, RTCMediaContent, RTCMediaKind, RTCSdpType, RTCStreamParams,
    RTCTransportDescription,
};
use shared::error::{Error, Result};

pub fn init_log() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Everything the fake collaborators were asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateChannel(RTCMediaKind, String, String),
    DestroyChannel(String),
    LocalContent(String, RTCSdpType),
    RemoteContent(String, RTCSdpType),
    SetTransport(String, String),
    Enable(String, bool),
    SetPlayout(u32, bool),
    SetAudioSend(u32, bool),
    SetVideoSend(u32, bool),
    SetCapturer(u32, Option<String>),
    SetRenderer(u32, Option<String>),
    InsertDtmf(u32, Option<u32>, String, u32),
    OpenStream(RTCDataChannelId, String),

    CreateTransport(String),
    DestroyTransport(String),
    LocalTransportDescription(String, RTCSdpType),
    RemoteTransportDescription(String, RTCSdpType),
    StartGathering(String, Vec<String>),
    AddRemoteCandidates(String, Vec<String>),
    BundleEnabled(bool),
    SignalingReady(String),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn count(calls: &CallLog, pred: impl Fn(&Call) -> bool) -> usize {
    calls.borrow().iter().filter(|c| pred(c)).count()
}

pub fn has_call(calls: &CallLog, call: &Call) -> bool {
    calls.borrow().iter().any(|c| c == call)
}

pub fn position(calls: &CallLog, call: &Call) -> Option<usize> {
    calls.borrow().iter().position(|c| c == call)
}

/// Content names every channel refuses to take content for.
pub type Refusals = Rc<RefCell<Vec<String>>>;

pub fn refusals(content_names: &[&str]) -> Refusals {
    Rc::new(RefCell::new(
        content_names.iter().map(|name| (*name).to_owned()).collect(),
    ))
}

struct FakeChannel {
    content_name: String,
    log: CallLog,
    dtmf: bool,
    refused: Refusals,
}

impl FakeChannel {
    fn push(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn refuses(&self, content: &RTCMediaContent) -> bool {
        self.refused.borrow().contains(&content.name)
    }
}

impl MediaChannel for FakeChannel {
    fn set_local_content(&mut self, content: &RTCMediaContent, action: RTCSdpType) -> Result<()> {
        if self.refuses(content) {
            return Err(Error::Other(format!("{} refused", content.name)));
        }
        self.push(Call::LocalContent(content.name.clone(), action));
        Ok(())
    }

    fn set_remote_content(
        &mut self,
        content: &RTCMediaContent,
        action: RTCSdpType,
    ) -> Result<()> {
        if self.refuses(content) {
            return Err(Error::Other(format!("{} refused", content.name)));
        }
        self.push(Call::RemoteContent(content.name.clone(), action));
        Ok(())
    }

    fn set_transport(&mut self, transport_name: &str) {
        self.push(Call::SetTransport(
            self.content_name.clone(),
            transport_name.to_owned(),
        ));
    }

    fn enable(&mut self, enabled: bool) {
        self.push(Call::Enable(self.content_name.clone(), enabled));
    }
}

impl VoiceMediaChannel for FakeChannel {
    fn set_playout(&mut self, ssrc: u32, enable: bool) -> Result<()> {
        self.push(Call::SetPlayout(ssrc, enable));
        Ok(())
    }

    fn set_send(&mut self, ssrc: u32, enable: bool, _options: &RTCAudioOptions) -> Result<()> {
        self.push(Call::SetAudioSend(ssrc, enable));
        Ok(())
    }

    fn can_insert_dtmf(&self) -> bool {
        self.dtmf
    }

    fn insert_dtmf(
        &mut self,
        send_ssrc: u32,
        play_ssrc: Option<u32>,
        tones: &str,
        duration_ms: u32,
    ) -> Result<()> {
        self.push(Call::InsertDtmf(
            send_ssrc,
            play_ssrc,
            tones.to_owned(),
            duration_ms,
        ));
        Ok(())
    }
}

impl VideoMediaChannel for FakeChannel {
    fn set_send(&mut self, ssrc: u32, enable: bool) -> Result<()> {
        self.push(Call::SetVideoSend(ssrc, enable));
        Ok(())
    }

    fn set_capturer(
        &mut self,
        ssrc: u32,
        capturer: Option<Box<dyn RTCVideoCapturer>>,
    ) -> Result<()> {
        self.push(Call::SetCapturer(
            ssrc,
            capturer.map(|c| c.id().to_owned()),
        ));
        Ok(())
    }

    fn set_renderer(
        &mut self,
        ssrc: u32,
        renderer: Option<Box<dyn RTCVideoRenderer>>,
    ) -> Result<()> {
        self.push(Call::SetRenderer(
            ssrc,
            renderer.map(|r| r.id().to_owned()),
        ));
        Ok(())
    }
}

impl DataMediaChannel for FakeChannel {
    fn open_stream(&mut self, id: RTCDataChannelId, params: &DataChannelParameters) -> Result<()> {
        self.push(Call::OpenStream(id, params.label.clone()));
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct FakeChannelManager {
    pub log: CallLog,
    pub fail_kind: Option<RTCMediaKind>,
    pub refused: Refusals,
    pub dtmf: bool,
}

impl FakeChannelManager {
    fn channel(&self, kind: RTCMediaKind, content_name: &str, transport_name: &str) -> Result<FakeChannel> {
        if self.fail_kind == Some(kind) {
            return Err(Error::Other(format!("no {kind} engine")));
        }
        self.log.borrow_mut().push(Call::CreateChannel(
            kind,
            content_name.to_owned(),
            transport_name.to_owned(),
        ));
        Ok(FakeChannel {
            content_name: content_name.to_owned(),
            log: self.log.clone(),
            dtmf: self.dtmf,
            refused: self.refused.clone(),
        })
    }
}

impl ChannelManager for FakeChannelManager {
    fn create_voice_channel(
        &mut self,
        content_name: &str,
        transport_name: &str,
    ) -> Result<Box<dyn VoiceMediaChannel>> {
        Ok(Box::new(self.channel(
            RTCMediaKind::Audio,
            content_name,
            transport_name,
        )?))
    }

    fn create_video_channel(
        &mut self,
        content_name: &str,
        transport_name: &str,
    ) -> Result<Box<dyn VideoMediaChannel>> {
        Ok(Box::new(self.channel(
            RTCMediaKind::Video,
            content_name,
            transport_name,
        )?))
    }

    fn create_data_channel(
        &mut self,
        content_name: &str,
        transport_name: &str,
    ) -> Result<Box<dyn DataMediaChannel>> {
        Ok(Box::new(self.channel(
            RTCMediaKind::Data,
            content_name,
            transport_name,
        )?))
    }

    fn destroy_channel(&mut self, content_name: &str, _channel: RTCMediaChannel) {
        self.log
            .borrow_mut()
            .push(Call::DestroyChannel(content_name.to_owned()));
    }
}

pub type Senders = Rc<RefCell<HashMap<String, RTCTransportEventSender>>>;

#[derive(Default, Clone)]
pub struct FakeTransportLayer {
    pub log: CallLog,
    pub senders: Senders,
    pub fail_create: bool,
    pub refuse_candidates: bool,
    /// Transport names that refuse ICE descriptions.
    pub refused: Refusals,
}

impl FakeTransportLayer {
    fn check_refused(&self, transport_name: &str) -> Result<()> {
        if self.refused.borrow().iter().any(|name| name == transport_name) {
            return Err(Error::Other(format!("{transport_name} refused")));
        }
        Ok(())
    }
}

impl rtc_session::session::transport::TransportLayer for FakeTransportLayer {
    fn create_transport(
        &mut self,
        transport_name: &str,
        events: RTCTransportEventSender,
    ) -> Result<()> {
        if self.fail_create {
            return Err(Error::Other("out of ports".to_owned()));
        }
        self.log
            .borrow_mut()
            .push(Call::CreateTransport(transport_name.to_owned()));
        self.senders
            .borrow_mut()
            .insert(transport_name.to_owned(), events);
        Ok(())
    }

    fn destroy_transport(&mut self, transport_name: &str) {
        self.log
            .borrow_mut()
            .push(Call::DestroyTransport(transport_name.to_owned()));
        self.senders.borrow_mut().remove(transport_name);
    }

    fn set_local_transport_description(
        &mut self,
        transport_name: &str,
        _description: &RTCTransportDescription,
        action: RTCSdpType,
    ) -> Result<()> {
        self.check_refused(transport_name)?;
        self.log.borrow_mut().push(Call::LocalTransportDescription(
            transport_name.to_owned(),
            action,
        ));
        Ok(())
    }

    fn set_remote_transport_description(
        &mut self,
        transport_name: &str,
        _description: &RTCTransportDescription,
        action: RTCSdpType,
    ) -> Result<()> {
        self.check_refused(transport_name)?;
        self.log.borrow_mut().push(Call::RemoteTransportDescription(
            transport_name.to_owned(),
            action,
        ));
        Ok(())
    }

    fn start_gathering(&mut self, transport_name: &str, content_names: &[String]) -> Result<()> {
        self.log.borrow_mut().push(Call::StartGathering(
            transport_name.to_owned(),
            content_names.to_vec(),
        ));
        Ok(())
    }

    fn add_remote_candidates(
        &mut self,
        transport_name: &str,
        candidates: &[RTCIceCandidate],
    ) -> Result<()> {
        if self.refuse_candidates {
            return Err(Error::Other("ice agent refused".to_owned()));
        }
        self.log.borrow_mut().push(Call::AddRemoteCandidates(
            transport_name.to_owned(),
            candidates.iter().map(|c| c.address.clone()).collect(),
        ));
        Ok(())
    }

    fn set_bundle_enabled(&mut self, enabled: bool) {
        self.log.borrow_mut().push(Call::BundleEnabled(enabled));
    }

    fn signaling_ready(&mut self, transport_name: &str) {
        self.log
            .borrow_mut()
            .push(Call::SignalingReady(transport_name.to_owned()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Candidates(String, Vec<String>),
    GatheringComplete(String),
    Error,
}

#[derive(Default, Clone)]
pub struct RecordingObserver {
    pub log: Rc<RefCell<Vec<Observed>>>,
}

impl RTCSessionObserver for RecordingObserver {
    fn on_ice_candidates(&mut self, content_name: &str, candidates: &[RTCIceCandidate]) {
        self.log.borrow_mut().push(Observed::Candidates(
            content_name.to_owned(),
            candidates.iter().map(|c| c.address.clone()).collect(),
        ));
    }

    fn on_ice_gathering_complete(&mut self, transport_name: &str) {
        self.log
            .borrow_mut()
            .push(Observed::GatheringComplete(transport_name.to_owned()));
    }

    fn on_error(&mut self) {
        self.log.borrow_mut().push(Observed::Error);
    }
}

/// A session wired to fakes, plus handles on what the fakes record.
pub struct Peer {
    pub session: RTCSession,
    pub calls: CallLog,
    pub senders: Senders,
}

impl Peer {
    pub fn new(configuration: RTCConfiguration) -> Result<Self> {
        Self::with_fakes(
            configuration,
            FakeChannelManager::default(),
            FakeTransportLayer::default(),
        )
    }

    /// Channel manager and transport layer share one call log.
    pub fn with_fakes(
        configuration: RTCConfiguration,
        mut channel_manager: FakeChannelManager,
        mut transport_layer: FakeTransportLayer,
    ) -> Result<Self> {
        let calls = CallLog::default();
        channel_manager.log = calls.clone();
        transport_layer.log = calls.clone();
        let senders = transport_layer.senders.clone();
        let session = RTCSession::new(
            configuration,
            Box::new(channel_manager),
            Box::new(transport_layer),
        )?;
        Ok(Self {
            session,
            calls,
            senders,
        })
    }

    pub fn sender(&self, transport_name: &str) -> RTCTransportEventSender {
        self.senders
            .borrow()
            .get(transport_name)
            .cloned()
            .unwrap_or_else(|| panic!("no transport {transport_name}"))
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.session
            .channels()
            .iter()
            .map(|c| c.content_name().to_owned())
            .collect()
    }
}

/// A content as a remote peer would describe it: one codec, one crypto
/// suite and fixed ICE credentials.
pub fn remote_content(name: &str, kind: RTCMediaKind) -> RTCMediaContent {
    let codec = match kind {
        RTCMediaKind::Audio => RTCCodec::new(111, "opus", 48000, 2),
        RTCMediaKind::Video => RTCCodec::new(96, "VP8", 90000, 0),
        _ => RTCCodec::new(109, "google-data", 90000, 0),
    };
    RTCMediaContent {
        codecs: vec![codec],
        cryptos: vec![RTCCryptoParams {
            tag: 1,
            crypto_suite: "AES_CM_128_HMAC_SHA1_80".to_owned(),
            key_params: "inline:remote".to_owned(),
        }],
        transport: RTCTransportDescription {
            ice_ufrag: "rfrag".to_owned(),
            ice_pwd: "rpwdrpwdrpwdrpwdrpwdrpwd".to_owned(),
            candidates: vec![],
        },
        ..RTCMediaContent::new(name, kind)
    }
}

pub fn with_stream(mut content: RTCMediaContent, track_id: &str, ssrc: u32) -> RTCMediaContent {
    content.streams.push(RTCStreamParams {
        id: track_id.to_owned(),
        stream_label: "stream".to_owned(),
        cname: "remote-cname".to_owned(),
        ssrcs: vec![ssrc],
    });
    content
}

pub fn candidate(content_name: &str, address: &str) -> RTCIceCandidate {
    RTCIceCandidate::host(content_name, "1", address, 50000)
}

/// Runs a full offer/answer exchange, leaving both peers stable.
pub fn negotiate(offerer: &mut Peer, answerer: &mut Peer) -> Result<()> {
    let constraints = RTCMediaConstraints::default();
    negotiate_with(offerer, answerer, &constraints, &constraints)
}

pub fn negotiate_with(
    offerer: &mut Peer,
    answerer: &mut Peer,
    offer_constraints: &RTCMediaConstraints,
    answer_constraints: &RTCMediaConstraints,
) -> Result<()> {
    let offer = offerer.session.create_offer(offer_constraints)?;
    offerer.session.set_local_description(offer.clone())?;
    answerer.session.set_remote_description(offer.clone())?;
    let answer = answerer.session.create_answer(answer_constraints, &offer)?;
    answerer.session.set_local_description(answer.clone())?;
    offerer.session.set_remote_description(answer)
}

pub struct FakeCapturer(pub &'static str);

impl RTCVideoCapturer for FakeCapturer {
    fn id(&self) -> &str {
        self.0
    }
}

pub struct FakeRenderer(pub &'static str);

impl RTCVideoRenderer for FakeRenderer {
    fn id(&self) -> &str {
        self.0
    }
}
