//! The type/hold/delete state machine behind the hero headline.
//!
//! [`TextCycler`] is pure: it never sleeps. Each [`TextCycler::tick`] applies
//! one transition and returns how long the caller should wait before the next
//! one, so the same machine can be driven by a tokio timer, a test loop, or a
//! frame scheduler.

use serde::Serialize;
use std::time::Duration;

use crate::CyclerError;

/// Whether the displayed text is currently growing or shrinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Typing,
    Deleting,
}

/// Pacing for the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclerTimings {
    /// Delay between characters while typing.
    pub type_delay: Duration,
    /// Delay between characters while deleting.
    pub delete_delay: Duration,
    /// Pause on a fully typed phrase before deleting starts.
    pub hold: Duration,
}

impl Default for CyclerTimings {
    fn default() -> Self {
        Self {
            type_delay: Duration::from_millis(150),
            delete_delay: Duration::from_millis(100),
            hold: Duration::from_millis(1500),
        }
    }
}

/// Point-in-time view of a cycler, as published to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclerSnapshot {
    pub displayed: String,
    pub phrase_index: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct TextCycler {
    phrases: Vec<String>,
    /// Character count per phrase, cached so ticks stay O(1) in the common case.
    lengths: Vec<usize>,
    phrase_index: usize,
    /// Number of characters of the current phrase on screen.
    shown: usize,
    direction: Direction,
    timings: CyclerTimings,
}

impl TextCycler {
    /// Build a cycler over `phrases`, starting at phrase 0 with nothing shown.
    ///
    /// ```
    /// use folio_typewriter::{CyclerTimings, Direction, TextCycler};
    ///
    /// let cycler = TextCycler::new(["A", "BC"], CyclerTimings::default()).unwrap();
    /// assert_eq!(cycler.displayed(), "");
    /// assert_eq!(cycler.phrase_index(), 0);
    /// assert_eq!(cycler.direction(), Direction::Typing);
    /// ```
    pub fn new<I, S>(phrases: I, timings: CyclerTimings) -> Result<Self, CyclerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return Err(CyclerError::NoPhrases);
        }
        if let Some(index) = phrases.iter().position(|p| p.is_empty()) {
            return Err(CyclerError::EmptyPhrase { index });
        }
        let lengths = phrases.iter().map(|p| p.chars().count()).collect();
        Ok(Self {
            phrases,
            lengths,
            phrase_index: 0,
            shown: 0,
            direction: Direction::Typing,
            timings,
        })
    }

    /// Delay before the very first tick after mount.
    pub fn initial_delay(&self) -> Duration {
        self.timings.type_delay
    }

    /// Apply one transition; returns the wait before the next tick.
    ///
    /// ```
    /// use folio_typewriter::{CyclerTimings, TextCycler};
    ///
    /// let timings = CyclerTimings::default();
    /// let mut cycler = TextCycler::new(["Hi"], timings).unwrap();
    /// assert_eq!(cycler.tick(), timings.type_delay);
    /// assert_eq!(cycler.displayed(), "H");
    /// assert_eq!(cycler.tick(), timings.hold);
    /// assert_eq!(cycler.displayed(), "Hi");
    /// assert_eq!(cycler.tick(), timings.delete_delay);
    /// assert_eq!(cycler.displayed(), "H");
    /// ```
    pub fn tick(&mut self) -> Duration {
        let full = self.lengths[self.phrase_index];
        match self.direction {
            Direction::Typing if self.shown < full => {
                self.shown += 1;
                if self.shown == full {
                    self.timings.hold
                } else {
                    self.timings.type_delay
                }
            }
            // The hold has elapsed on a complete phrase: start deleting now.
            Direction::Typing => {
                self.direction = Direction::Deleting;
                self.shrink()
            }
            Direction::Deleting => self.shrink(),
        }
    }

    fn shrink(&mut self) -> Duration {
        self.shown = self.shown.saturating_sub(1);
        if self.shown > 0 {
            return self.timings.delete_delay;
        }
        self.direction = Direction::Typing;
        self.phrase_index = (self.phrase_index + 1) % self.phrases.len();
        tracing::trace!(
            phrase_index = self.phrase_index,
            "typewriter.phrase.advance"
        );
        self.timings.type_delay
    }

    /// The visible prefix of the current phrase.
    pub fn displayed(&self) -> &str {
        let phrase = self.current_phrase();
        let end = phrase
            .char_indices()
            .nth(self.shown)
            .map_or(phrase.len(), |(idx, _)| idx);
        &phrase[..end]
    }

    pub fn current_phrase(&self) -> &str {
        &self.phrases[self.phrase_index]
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn timings(&self) -> CyclerTimings {
        self.timings
    }

    pub fn snapshot(&self) -> CyclerSnapshot {
        CyclerSnapshot {
            displayed: self.displayed().to_string(),
            phrase_index: self.phrase_index,
            direction: self.direction,
        }
    }
}
