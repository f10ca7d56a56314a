use std::time::{Duration, Instant};

/// Outcome of one redraw's worth of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameAdvance {
    /// Wall time since the previous frame, before clamping.
    pub(crate) frame_dt: Duration,
    pub(crate) ticks: u32,
    /// Backlog discarded because the tick cap was hit.
    pub(crate) dropped: Duration,
}

/// Fixed-timestep bookkeeping for the frame loop.
///
/// Each frame adds its clamped wall time to a backlog that is paid out in
/// whole ticks, at most `max_ticks` per frame. A backlog still a full tick
/// behind after the cap is dropped.
#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    tick: Duration,
    max_frame_delta: Duration,
    max_ticks: u32,
    min_present_interval: Option<Duration>,
    backlog: Duration,
    last_frame: Instant,
    last_present: Instant,
}

impl FrameClock {
    /// Zero rates and durations fall back to the loop defaults; a zero render
    /// cap means uncapped.
    pub(crate) fn new(
        target_tps: u32,
        max_frame_delta: Duration,
        max_ticks: u32,
        max_render_fps: Option<u32>,
        now: Instant,
    ) -> Self {
        let max_frame_delta = if max_frame_delta.is_zero() {
            Duration::from_millis(250)
        } else {
            max_frame_delta
        };
        Self {
            tick: Duration::from_secs_f64(1.0 / f64::from(target_tps.max(1))),
            max_frame_delta,
            max_ticks: max_ticks.max(1),
            min_present_interval: max_render_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
            backlog: Duration::ZERO,
            last_frame: now,
            last_present: now,
        }
    }

    pub(crate) fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub(crate) fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub(crate) fn render_cap(&self) -> Option<Duration> {
        self.min_present_interval
    }

    pub(crate) fn advance(&mut self, now: Instant) -> FrameAdvance {
        let frame_dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.backlog = self
            .backlog
            .saturating_add(frame_dt.min(self.max_frame_delta));

        let ticks = (self.backlog.as_nanos() / self.tick.as_nanos())
            .min(u128::from(self.max_ticks)) as u32;
        self.backlog -= self.tick * ticks;

        let dropped = if self.backlog >= self.tick {
            std::mem::take(&mut self.backlog)
        } else {
            Duration::ZERO
        };
        FrameAdvance {
            frame_dt,
            ticks,
            dropped,
        }
    }

    /// How long to wait before presenting so the render cap holds.
    pub(crate) fn present_delay(&self, now: Instant) -> Duration {
        let Some(interval) = self.min_present_interval else {
            return Duration::ZERO;
        };
        interval.saturating_sub(now.saturating_duration_since(self.last_present))
    }

    pub(crate) fn mark_presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn clock(tps: u32, max_ticks: u32, render_cap: Option<u32>) -> (FrameClock, Instant) {
        let start = Instant::now();
        (FrameClock::new(tps, ms(250), max_ticks, render_cap, start), start)
    }

    #[test]
    fn whole_ticks_are_paid_out_and_the_rest_carries_over() {
        let (mut clock, start) = clock(50, 5, None);

        let first = clock.advance(start + ms(50));
        assert_eq!((first.ticks, first.dropped), (2, Duration::ZERO));
        assert_eq!(first.frame_dt, ms(50));

        let second = clock.advance(start + ms(60));
        assert_eq!(second.ticks, 1);
    }

    #[test]
    fn backlog_past_the_tick_cap_is_dropped() {
        let (mut clock, start) = clock(50, 3, None);

        let advance = clock.advance(start + ms(200));
        assert_eq!(advance.ticks, 3);
        assert_eq!(advance.dropped, ms(140));
        assert_eq!(clock.advance(start + ms(210)).ticks, 0);
    }

    #[test]
    fn long_stalls_are_clamped_before_ticking() {
        let (mut clock, start) = clock(10, 10, None);

        let advance = clock.advance(start + Duration::from_secs(5));
        assert_eq!(advance.frame_dt, Duration::from_secs(5));
        assert_eq!(advance.ticks, 2);
        assert_eq!(advance.dropped, Duration::ZERO);
    }

    #[test]
    fn zero_settings_fall_back_to_usable_values() {
        let start = Instant::now();
        let clock = FrameClock::new(0, Duration::ZERO, 0, Some(0), start);
        assert_eq!(clock.tick_seconds(), 1.0);
        assert_eq!(clock.max_ticks(), 1);
        assert_eq!(clock.render_cap(), None);
        assert_eq!(clock.present_delay(start), Duration::ZERO);
    }

    #[test]
    fn render_cap_waits_out_the_rest_of_the_interval() {
        let (mut clock, start) = clock(60, 5, Some(50));

        assert_eq!(clock.present_delay(start + ms(5)), ms(15));
        assert_eq!(clock.present_delay(start + ms(30)), Duration::ZERO);

        clock.mark_presented(start + ms(30));
        assert_eq!(clock.present_delay(start + ms(40)), ms(10));
    }
}
