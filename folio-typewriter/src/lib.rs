//! Typewriter text cycling for the hero headline.
//!
//! A fixed rotation of phrases is typed out one character at a time, held,
//! deleted, and followed by the next phrase, forever.
//!
//! - [`TextCycler`]: the pure state machine (no timers)
//! - [`Typewriter`]: drives a cycler on tokio and publishes frames over a
//!   `watch` channel, with explicit `start()`/`stop()`
//!
//! Default pacing is 150ms per typed character, 100ms per deleted character
//! and a 1500ms hold on each complete phrase.

mod cycler;
mod driver;

pub use cycler::{CyclerSnapshot, CyclerTimings, Direction, TextCycler};
pub use driver::Typewriter;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CyclerError {
    #[error("typewriter needs at least one phrase")]
    NoPhrases,

    #[error("phrase {index} is empty")]
    EmptyPhrase { index: usize },

    #[error("typewriter already started")]
    AlreadyStarted,

    #[error("typewriter was stopped; build a new one to restart")]
    Stopped,

    #[error("no tokio runtime available to drive the typewriter")]
    NoRuntime,
}
