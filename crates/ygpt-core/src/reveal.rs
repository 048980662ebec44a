//! Fake streaming: reveal an answer one character at a time.

use futures_util::{Stream, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::mpsc;
use tokio::time::Sleep;

use crate::config::DelayRange;

/// Every prefix of `text`, growing by one character, ending with `text`.
pub fn prefixes(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.char_indices()
        .map(move |(i, c)| &text[..i + c.len_utf8()])
}

/// A timed stream of growing prefixes of an answer.
///
/// The first prefix is ready immediately; each following one waits a random
/// delay from the configured range. The stream is finite and cannot be
/// restarted. Dropping it stops the reveal.
///
/// Pauses are tokio timers, so it must be polled inside a tokio runtime with
/// the time driver enabled.
pub struct Reveal {
    text: String,
    // byte offset where each prefix ends
    ends: Vec<usize>,
    next: usize,
    delay: DelayRange,
    rng: StdRng,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Reveal {
    pub fn new(text: impl Into<String>, delay: DelayRange) -> Self {
        Self::with_rng(text, delay, StdRng::from_entropy())
    }

    pub fn with_rng(text: impl Into<String>, delay: DelayRange, rng: StdRng) -> Self {
        let text = text.into();
        let ends: Vec<usize> = prefixes(&text).map(str::len).collect();
        Self {
            text,
            ends,
            next: 0,
            delay,
            rng,
            sleep: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.ends.len() - self.next
    }
}

impl Stream for Reveal {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        let this = self.get_mut();

        if this.next >= this.ends.len() {
            return Poll::Ready(None);
        }

        if let Some(sleep) = this.sleep.as_mut() {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;
        }

        let end = this.ends[this.next];
        this.next += 1;

        if this.next < this.ends.len() {
            let pause = this.delay.sample(&mut this.rng);
            this.sleep = Some(Box::pin(tokio::time::sleep(pause)));
        }

        Poll::Ready(Some(this.text[..end].to_string()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

/// Progress of a reply being revealed into the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    /// New content for the assistant message at `index`
    Prefix { index: usize, text: String },
    /// The reply at `index` is complete
    Finished { index: usize },
}

/// Drive `reveal` to completion, sending each prefix to the transcript owner.
///
/// Stops early if the receiving side has gone away.
pub async fn present<E>(index: usize, mut reveal: Reveal, tx: mpsc::UnboundedSender<E>)
where
    E: From<ReplyEvent>,
{
    let total = reveal.remaining();

    while let Some(text) = reveal.next().await {
        if tx.send(ReplyEvent::Prefix { index, text }.into()).is_err() {
            tracing::debug!(index, "transcript closed mid-reply");
            return;
        }
    }

    let _ = tx.send(ReplyEvent::Finished { index }.into());
    tracing::debug!(index, chars = total, "reply revealed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    fn seeded(text: &str) -> Reveal {
        Reveal::with_rng(text, DelayRange::instant(), StdRng::seed_from_u64(1))
    }

    #[test]
    fn prefixes_grow_one_char_at_a_time() {
        let all: Vec<&str> = prefixes("abc").collect();
        assert_eq!(all, vec!["a", "ab", "abc"]);
        assert_eq!(prefixes("").count(), 0);
    }

    #[test]
    fn prefixes_respect_multibyte_chars() {
        let all: Vec<&str> = prefixes("hé🤖").collect();
        assert_eq!(all, vec!["h", "hé", "hé🤖"]);
    }

    #[tokio::test]
    async fn reveal_emits_every_length_once() {
        let answer = "Sorry, I can only answer one very specific question.";
        let emitted: Vec<String> = seeded(answer).collect().await;

        assert_eq!(emitted.len(), answer.chars().count());
        for (i, prefix) in emitted.iter().enumerate() {
            assert_eq!(prefix.chars().count(), i + 1);
            assert!(answer.starts_with(prefix.as_str()));
        }
        assert_eq!(emitted.last().map(String::as_str), Some(answer));
    }

    #[tokio::test]
    async fn empty_answer_completes_immediately() {
        let mut reveal = seeded("");
        assert_eq!(reveal.size_hint(), (0, Some(0)));
        assert_eq!(reveal.next().await, None);
    }

    #[tokio::test]
    async fn finished_reveal_stays_finished() {
        let mut reveal = seeded("x");
        assert_eq!(reveal.next().await.as_deref(), Some("x"));
        assert_eq!(reveal.next().await, None);
        assert_eq!(reveal.next().await, None);
    }

    #[tokio::test]
    async fn size_hint_counts_down() {
        let mut reveal = seeded("abcd");
        assert_eq!(reveal.size_hint(), (4, Some(4)));
        reveal.next().await;
        assert_eq!(reveal.size_hint(), (3, Some(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_prefixes_only() {
        let delay = DelayRange::new(10, 25);
        let mut reveal = Reveal::with_rng("abcdef", delay, StdRng::seed_from_u64(9));

        // same seed, same draws: one pause per gap between six prefixes
        let mut draws = StdRng::seed_from_u64(9);
        let expected: Vec<Duration> = (0..5).map(|_| delay.sample(&mut draws)).collect();

        let start = Instant::now();
        let mut stamps = Vec::new();
        while let Some(prefix) = reveal.next().await {
            stamps.push((prefix, start.elapsed()));
        }

        assert_eq!(stamps.len(), 6);
        assert_eq!(stamps[0], ("a".to_string(), Duration::ZERO));
        assert_eq!(stamps[5].0, "abcdef");

        let gaps: Vec<Duration> = stamps.windows(2).map(|w| w[1].1 - w[0].1).collect();
        assert_eq!(gaps, expected);
        for gap in &gaps {
            assert!(
                (Duration::from_millis(10)..=Duration::from_millis(25)).contains(gap),
                "{gap:?} outside 10..=25ms"
            );
        }

        // no trailing pause once the last prefix is out
        assert_eq!(start.elapsed(), stamps[5].1);
    }

    #[tokio::test]
    async fn present_sends_prefixes_then_finished() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ReplyEvent>();
        present(3, seeded("hey"), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                ReplyEvent::Prefix { index: 3, text: "h".into() },
                ReplyEvent::Prefix { index: 3, text: "he".into() },
                ReplyEvent::Prefix { index: 3, text: "hey".into() },
                ReplyEvent::Finished { index: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn present_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<ReplyEvent>();
        drop(rx);
        // must return rather than spin through the whole answer
        present(0, seeded("a fairly long answer"), tx).await;
    }
}
