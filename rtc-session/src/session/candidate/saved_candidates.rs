use std::collections::{HashMap, VecDeque};

use super::RTCIceCandidate;

/// Remote candidates waiting for their content to appear in the remote
/// description.
///
/// Candidates are kept per content name and handed back in arrival order.
/// Candidates that only carry an m-line index wait unresolved until a remote
/// description can name their content.
#[derive(Default, Debug)]
pub struct SavedCandidateQueue {
    queues: HashMap<String, VecDeque<(u64, RTCIceCandidate)>>,
    unresolved: VecDeque<(u64, RTCIceCandidate)>,
    next_seq: u64,
}

impl SavedCandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn push(&mut self, content_name: &str, candidate: RTCIceCandidate) {
        let seq = self.next_seq();
        self.queues
            .entry(content_name.to_owned())
            .or_default()
            .push_back((seq, candidate));
    }

    /// Saves a candidate whose content is only known by m-line index.
    pub fn push_unresolved(&mut self, candidate: RTCIceCandidate) {
        let seq = self.next_seq();
        self.unresolved.push_back((seq, candidate));
    }

    /// Files every unresolved candidate under the content `content_at` names
    /// for its m-line index, keeping arrival order within each content.
    ///
    /// Returns the candidates whose index names no content; they are no
    /// longer saved.
    pub fn resolve(
        &mut self,
        mut content_at: impl FnMut(u16) -> Option<String>,
    ) -> Vec<RTCIceCandidate> {
        let mut dropped = vec![];
        for (seq, mut candidate) in std::mem::take(&mut self.unresolved) {
            let Some(content_name) = candidate.sdp_mline_index.and_then(&mut content_at) else {
                dropped.push(candidate);
                continue;
            };
            candidate.sdp_mid = Some(content_name.clone());
            let queue = self.queues.entry(content_name).or_default();
            let pos = queue.partition_point(|(s, _)| *s < seq);
            queue.insert(pos, (seq, candidate));
        }
        dropped
    }

    /// Removes and returns every candidate saved for `content_name`, oldest first.
    pub fn take(&mut self, content_name: &str) -> Vec<RTCIceCandidate> {
        self.queues
            .remove(content_name)
            .map(|queue| queue.into_iter().map(|(_, c)| c).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum::<usize>() + self.unresolved.len()
    }

    pub fn len_for(&self, content_name: &str) -> usize {
        self.queues.get(content_name).map_or(0, VecDeque::len)
    }

    pub fn len_unresolved(&self) -> usize {
        self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unresolved.is_empty() && self.queues.values().all(VecDeque::is_empty)
    }

    pub fn clear(&mut self) {
        self.queues.clear();
        self.unresolved.clear();
    }
}
