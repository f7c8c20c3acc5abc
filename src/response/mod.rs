//! Respondent flow: answering a published survey.

pub mod collector;
pub mod timer;

pub use collector::{
    CollectorError, CollectorState, Progress, QuestionIssue, ResponseCollector, INVALID_LINK_MESSAGE,
};
pub use timer::{Stopwatch, Ticker, TICK_PERIOD};
