use tokio::time::{sleep, Duration};

use crate::policy::SyncTimings;

/// Moments in the interaction sequence where the page gets time to react.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Settle {
    Scroll,
    Hover,
    Press,
    Activate,
    BroadClick,
    Option,
}

impl Settle {
    pub fn duration(self, timings: &SyncTimings) -> Duration {
        let ms = match self {
            Settle::Scroll => timings.scroll_settle_ms,
            Settle::Hover => timings.hover_settle_ms,
            Settle::Press => timings.press_settle_ms,
            Settle::Activate => timings.activate_settle_ms,
            Settle::BroadClick => timings.broad_click_settle_ms,
            Settle::Option => timings.option_settle_ms,
        };
        Duration::from_millis(ms)
    }
}

pub async fn settle(timings: &SyncTimings, step: Settle) {
    let pause = step.duration(timings);
    if !pause.is_zero() {
        sleep(pause).await;
    }
}
