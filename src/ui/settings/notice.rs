use std::time::{Duration, Instant};

/// How long a notice stays visible unless replaced sooner.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    expires_at: Instant,
}

/// Single-slot notice area: each new notice replaces the prior one and
/// auto-dismisses after [`NOTICE_TTL`]. Expiry is checked against an injected
/// instant so tests never sleep.
#[derive(Debug, Default)]
pub struct NoticeSlot {
    current: Option<Notice>,
}

impl NoticeSlot {
    pub fn set(&mut self, kind: NoticeKind, text: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            kind,
            text: text.into(),
            expires_at: now + NOTICE_TTL,
        });
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(notice) = &self.current {
            if now >= notice.expires_at {
                self.current = None;
            }
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notice_replaces_the_prior_one() {
        let now = Instant::now();
        let mut slot = NoticeSlot::default();
        slot.set(NoticeKind::Error, "first", now);
        slot.set(NoticeKind::Success, "second", now);
        let notice = slot.current().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.text, "second");
    }

    #[test]
    fn notice_expires_after_the_ttl() {
        let now = Instant::now();
        let mut slot = NoticeSlot::default();
        slot.set(NoticeKind::Success, "saved", now);

        slot.tick(now + NOTICE_TTL - Duration::from_millis(1));
        assert!(slot.current().is_some());

        slot.tick(now + NOTICE_TTL);
        assert!(slot.current().is_none());
    }
}
