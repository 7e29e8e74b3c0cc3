//! Decides whether the current candidate deserves a reply.
//!
//! Checks run in a fixed order and stop at the first that applies. Dedup and
//! the self-signature guard come before the trigger match, so an answered or
//! echoed message stays suppressed even when it contains the trigger phrase.

use std::fmt;

use crate::gateway::Message;
use crate::storage::LastReplied;

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NoCandidate,
    AlreadyReplied,
    /// Body carries our own reply marker (bot-to-bot echo).
    SelfSignature,
    NoTrigger,
    Respond,
}

impl Verdict {
    pub fn should_respond(self) -> bool {
        self == Verdict::Respond
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::NoCandidate => "no candidate today",
            Verdict::AlreadyReplied => "already replied",
            Verdict::SelfSignature => "body carries our own signature",
            Verdict::NoTrigger => "trigger phrase absent",
            Verdict::Respond => "respond",
        };
        f.write_str(s)
    }
}

pub fn evaluate(
    candidate: Option<&Message>,
    last_replied: &LastReplied,
    trigger: &str,
    self_signature: &str,
) -> Verdict {
    let Some(candidate) = candidate else {
        return Verdict::NoCandidate;
    };
    if last_replied.matches(&candidate.id) {
        return Verdict::AlreadyReplied;
    }
    if !self_signature.is_empty() && candidate.body.contains(self_signature) {
        return Verdict::SelfSignature;
    }
    if !contains_ignore_case(&candidate.body, trigger) {
        return Verdict::NoTrigger;
    }
    Verdict::Respond
}

pub fn should_respond(
    candidate: Option<&Message>,
    last_replied: &LastReplied,
    trigger: &str,
    self_signature: &str,
) -> bool {
    evaluate(candidate, last_replied, trigger, self_signature).should_respond()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
