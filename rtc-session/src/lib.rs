//! # RTC Session - Sans-I/O JSEP negotiation core
//!
//! This crate implements the offer/answer side of a WebRTC peer session:
//!
//! - applying local and remote session descriptions through the JSEP
//!   signaling state machine,
//! - creating and destroying one media channel per negotiated content,
//!   sharing transports across BUNDLE groups,
//! - trickling ICE candidates in both directions, including candidates that
//!   arrive before the content they belong to,
//! - enforcing the crypto policy on every description.
//!
//! Codecs, devices, the ICE/DTLS/SRTP wire protocols and SDP text are out
//! of scope. They live behind the [`ChannelManager`](session::channel::ChannelManager),
//! [`TransportLayer`](session::transport::TransportLayer) and
//! [`SessionDescriptionFactory`](session::description_factory::SessionDescriptionFactory)
//! traits.
//!
//! Transport signals are delivered through a channel and applied by
//! [`RTCSession::process_transport_events`](session::RTCSession::process_transport_events)
//! or, equivalently, through the session's `sansio::Protocol` implementation.

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod data_channel;
pub mod session;

pub use shared;
