//! What each display line shows.
//!
//! Line 0 always shows one headline sensor (normally RPM) next to the alarm
//! indicator. Line 1 rotates through a list of [`Page`]s.
//!
//! # Indicator
//!
//! Every [`Watch`]ed sensor is read and classified on each render; the worst
//! combined alert picks the indicator pattern (see
//! [`AlertFlags::indicator`]).

use crate::alert::{AlertFlags, scale_value};
use crate::frame::{AlarmStatus, LedFrame, Line};
use crate::reader::SensorReader;
use crate::sensor::SensorDescriptor;

/// One screen of line 1.
#[derive(Clone, Copy, Debug)]
pub enum Page {
    /// A single sensor with `decimal` digits after the point.
    Number {
        sensor: &'static SensorDescriptor,
        decimal: u8,
    },
    /// Two sensors side by side in tenths, e.g. left and right tank.
    DualGauge {
        left: &'static SensorDescriptor,
        right: &'static SensorDescriptor,
    },
}

/// A sensor that feeds the alarm indicator, with how many consecutive
/// channels it spans (thermocouple banks span one per cylinder).
#[derive(Clone, Copy, Debug)]
pub struct Watch {
    pub sensor: &'static SensorDescriptor,
    pub channels: u8,
}

impl Watch {
    pub const fn single(sensor: &'static SensorDescriptor) -> Self {
        Self { sensor, channels: 1 }
    }
}

/// Worst alert over every watched channel.
pub fn watched_alerts(
    reader: &SensorReader<'_>,
    watched: &[Watch],
) -> AlertFlags {
    AlertFlags::worst(watched.iter().flat_map(|watch| {
        (0..watch.channels).map(move |channel| reader.alert_state(Some(watch.sensor), channel))
    }))
}

/// Line 0: the headline sensor with the indicator.
pub fn render_headline(
    reader: &SensorReader<'_>,
    sensor: &SensorDescriptor,
    status: AlarmStatus,
) -> LedFrame {
    let value = scale_value(sensor, reader.read(sensor, 0));
    LedFrame::number(Line::Upper, status, value, 0)
}

/// Line 1: the current page.
pub fn render_page(
    reader: &SensorReader<'_>,
    page: &Page,
) -> LedFrame {
    let value = |sensor: &SensorDescriptor| scale_value(sensor, reader.read(sensor, 0));
    match *page {
        Page::Number { sensor, decimal } => {
            LedFrame::number(Line::Lower, AlarmStatus::Normal, value(sensor), decimal)
        }
        Page::DualGauge { left, right } => LedFrame::dual_gauge(value(left), value(right)),
    }
}

// =============================================================================
// Page rotation
// =============================================================================

/// Cycles through the pages on a fixed dwell time.
#[derive(Debug)]
pub struct Rotation {
    index: usize,
    count: usize,
    dwell_ms: u64,
    /// Set on the first call, so a late start still shows page 0 in full.
    shown_since_ms: Option<u64>,
}

impl Rotation {
    pub const fn new(
        count: usize,
        dwell_ms: u64,
    ) -> Self {
        Self {
            index: 0,
            count,
            dwell_ms,
            shown_since_ms: None,
        }
    }

    /// Page index to show at `now_ms`.
    pub fn current(
        &mut self,
        now_ms: u64,
    ) -> usize {
        if self.count == 0 {
            return 0;
        }
        let since = *self.shown_since_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) >= self.dwell_ms {
            self.index = (self.index + 1) % self.count;
            self.shown_since_ms = Some(now_ms);
        }
        self.index
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
