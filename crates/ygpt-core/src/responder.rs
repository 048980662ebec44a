use rand::Rng;

use crate::config::{Config, ConfigError, DelayRange};
use crate::matcher::Matcher;

/// Which canned reply was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Special,
    /// Index into the configured fallback answers
    Fallback(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub kind: AnswerKind,
    pub text: String,
}

/// Picks the reply for a user message: the special answer when the trigger
/// matches, a random fallback otherwise.
#[derive(Debug, Clone)]
pub struct Responder {
    matcher: Matcher,
    special_answer: String,
    // never empty, checked in `new`
    fallback_answers: Vec<String>,
    stream_delay: DelayRange,
}

impl Responder {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            matcher: Matcher::new(config.trigger_mode, &config.trigger),
            special_answer: config.special_answer.clone(),
            fallback_answers: config.fallback_answers.clone(),
            stream_delay: config.stream_delay,
        })
    }

    pub fn stream_delay(&self) -> DelayRange {
        self.stream_delay
    }

    pub fn fallback_answers(&self) -> &[String] {
        &self.fallback_answers
    }

    pub fn respond(&self, input: &str) -> Answer {
        self.respond_with(input, &mut rand::thread_rng())
    }

    pub fn respond_with<R: Rng + ?Sized>(&self, input: &str, rng: &mut R) -> Answer {
        if self.matcher.is_match(input) {
            tracing::debug!(mode = self.matcher.mode().as_str(), "trigger matched");
            return Answer {
                kind: AnswerKind::Special,
                text: self.special_answer.clone(),
            };
        }

        let index = rng.gen_range(0..self.fallback_answers.len());
        tracing::debug!(index, "no match, using fallback answer");
        Answer {
            kind: AnswerKind::Fallback(index),
            text: self.fallback_answers[index].clone(),
        }
    }
}
