use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::Mutex;

/// Minimum spacing between two generated timestamps
///
/// Shaarli ids have a one-second resolution and a colliding id overwrites
/// the existing link.
pub const MIN_SPACING: Duration = Duration::from_millis(1000);

/// Produces link creation timestamps at most once per second
///
/// Callers sharing a generator are serialized: a call made less than
/// [`MIN_SPACING`] after the previous one waits for the remainder.
#[derive(Debug, Default)]
pub struct IdGenerator {
    /// Timestamp handed out by the last call
    last: Mutex<Option<DateTime<Local>>>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a timestamp at least [`MIN_SPACING`] after the previous one
    ///
    /// The lock is held while waiting, so concurrent callers queue up and
    /// each gets its own second.
    pub async fn generate(&self) -> DateTime<Local> {
        let mut last = self.last.lock().await;

        loop {
            let now = Local::now();
            match time_until_next(*last, now) {
                Some(wait) => {
                    tracing::debug!("Id requested too early, waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                None => {
                    *last = Some(now);
                    return now;
                }
            }
        }
    }
}

/// Time left before a new timestamp may be generated, `None` if it may be now
fn time_until_next(last: Option<DateTime<Local>>, now: DateTime<Local>) -> Option<Duration> {
    let last = last?;
    // after a clock step backwards, wait until a full second past `last` again
    let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
    if elapsed < MIN_SPACING {
        Some(MIN_SPACING - elapsed)
    } else {
        None
    }
}
