//! Raw sample storage fed from interrupt context.
//!
//! [`SampleStore`] owns everything that crosses the interrupt/main-loop
//! boundary. It is split once into ports, one per execution context:
//!
//! | Port | Context | May write |
//! |------|---------|-----------|
//! | [`TickPort`] | periodic tick | ADC bank, fuel-flow rate, hobbs |
//! | [`TachPort`] | tach rising edge | RPM ring, pulse flag |
//! | [`FuelFlowPort`] | fuel-flow rising edge | cumulative pulses, fuel remaining |
//! | [`ThermocouplePort`] | thermocouple converter | thermocouple bank |
//! | [`MainPort`] | main loop | engine-running flag, pulse flag, dirty flag |
//!
//! State private to one context (rotation indexes, window history, the hobbs
//! pre-load, the bounded fuel counter) lives in that context's port, so no
//! other context can reach it.

use crate::cell::{SharedCell, WordCell};
use crate::config::{FUEL_WINDOW_TICKS, HOBBS_COUNT_INTERVAL, HOBBS_TICKS, RPM_NUMERATOR};
use crate::persist::{PersistentStatus, Settings, StatusRecord, StatusStorage, StorageError};

// =============================================================================
// Sizes
// =============================================================================

/// Number of multiplexed analog channels.
pub const ADC_CHANNELS: usize = 12;

/// Samples kept per analog channel for averaging.
pub const ADC_DEPTH: usize = 4;

/// Slots in the RPM ring.
pub const RPM_SLOTS: usize = 8;

/// Fuel-flow windows the rate is counted over.
pub const FUEL_WINDOWS: usize = 4;

/// Thermocouple probes, plus one reference-junction slot after them.
pub const THERMOCOUPLE_PROBES: usize = 8;

/// Index of the reference-junction slot in the thermocouple bank.
pub const REFERENCE_SLOT: usize = THERMOCOUPLE_PROBES;

const _: () = assert!(ADC_DEPTH.is_power_of_two());
const _: () = assert!(RPM_SLOTS.is_power_of_two());
const _: () = assert!(FUEL_WINDOWS.is_power_of_two());

// =============================================================================
// Collaborators and shared aggregates
// =============================================================================

/// Source of raw 10-bit analog conversions.
pub trait AnalogSource {
    /// `None` for a failed conversion or a channel the board does not wire.
    fn read(
        &mut self,
        channel: usize,
    ) -> Option<u16>;
}

/// Last `ADC_DEPTH` conversions of every channel; `None` marks a failed one.
pub type AdcBank = [[Option<u16>; ADC_DEPTH]; ADC_CHANNELS];

/// Thermocouple readings in quarter °C; `None` marks an open or faulted probe.
pub type ThermocoupleBank = [Option<i16>; THERMOCOUPLE_PROBES + 1];

#[derive(Clone, Copy, Debug)]
struct TachRing {
    rpm: [u32; RPM_SLOTS],
    did_pulse: bool,
    stopped: bool,
}

/// How to initialise the counters that straddle a power cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Startup {
    /// Start the bounded fuel counter at zero and the hobbs pre-load full.
    Fresh,
    /// Assume half a fuel unit and half a hobbs interval were lost at the last
    /// shutdown, so the error does not accumulate in one direction.
    AssumeHalfLost,
}

// =============================================================================
// SampleStore
// =============================================================================

/// All state shared between interrupt producers and the main loop.
pub struct SampleStore {
    settings: Settings,
    adc: SharedCell<AdcBank>,
    tach: SharedCell<TachRing>,
    thermocouples: SharedCell<ThermocoupleBank>,
    status: SharedCell<StatusRecord>,
    /// Written by the fuel-flow port only.
    fuel_pulses: WordCell,
    /// Written by the tick port only.
    fuel_rate: WordCell,
    /// Written by the main port only.
    engine_running: WordCell,
    taken: SharedCell<bool>,
}

impl SampleStore {
    pub const fn new(
        settings: Settings,
        status: PersistentStatus,
    ) -> Self {
        Self {
            settings,
            adc: SharedCell::new([[None; ADC_DEPTH]; ADC_CHANNELS]),
            tach: SharedCell::new(TachRing {
                rpm: [0; RPM_SLOTS],
                did_pulse: false,
                stopped: true,
            }),
            thermocouples: SharedCell::new([None; THERMOCOUPLE_PROBES + 1]),
            status: SharedCell::new(StatusRecord::new(status)),
            fuel_pulses: WordCell::new(0),
            fuel_rate: WordCell::new(0),
            engine_running: WordCell::new(0),
            taken: SharedCell::new(false),
        }
    }

    /// Hand out the per-context ports. Only the first call succeeds.
    pub fn split(
        &self,
        startup: Startup,
    ) -> Option<Ports<'_>> {
        let already = self.taken.lock(|taken| core::mem::replace(taken, true));
        if already {
            return None;
        }

        let (fuel_pending, hobbs_countdown) = match startup {
            Startup::Fresh => (0, HOBBS_COUNT_INTERVAL),
            Startup::AssumeHalfLost => (self.settings.k_factor / 2, HOBBS_COUNT_INTERVAL / 2),
        };

        Some(Ports {
            tick: TickPort {
                store: self,
                adc_index: 0,
                fuel_history: [0; FUEL_WINDOWS],
                fuel_index: 0,
                hobbs_countdown,
                fuel_window_ticks: 0,
                hobbs_ticks: 0,
            },
            tach: TachPort {
                store: self,
                index: 0,
                last_edge_us: None,
            },
            fuel_flow: FuelFlowPort {
                store: self,
                pending: fuel_pending,
            },
            thermocouple: ThermocouplePort { store: self },
            main: MainPort { store: self },
        })
    }
}

/// One port per execution context.
pub struct Ports<'a> {
    pub tick: TickPort<'a>,
    pub tach: TachPort<'a>,
    pub fuel_flow: FuelFlowPort<'a>,
    pub thermocouple: ThermocouplePort<'a>,
    pub main: MainPort<'a>,
}

// =============================================================================
// Periodic tick
// =============================================================================

/// Periodic-tick producer: ADC rotation, fuel-flow windowing, hobbs counting.
pub struct TickPort<'a> {
    store: &'a SampleStore,
    adc_index: usize,
    fuel_history: [u32; FUEL_WINDOWS],
    fuel_index: usize,
    hobbs_countdown: u16,
    fuel_window_ticks: u16,
    hobbs_ticks: u16,
}

impl TickPort<'_> {
    /// Run one periodic tick: sample every channel, and advance the fuel window
    /// and hobbs pre-load on their slower cadences.
    pub fn on_tick(
        &mut self,
        source: &mut impl AnalogSource,
    ) {
        self.sample_adc(source);

        self.fuel_window_ticks += 1;
        if self.fuel_window_ticks >= FUEL_WINDOW_TICKS {
            self.fuel_window_ticks = 0;
            self.advance_fuel_window();
        }

        self.hobbs_ticks += 1;
        if self.hobbs_ticks >= HOBBS_TICKS {
            self.hobbs_ticks = 0;
            self.count_hobbs();
        }
    }

    /// Convert every channel and overwrite the oldest sample of each.
    pub fn sample_adc(
        &mut self,
        source: &mut impl AnalogSource,
    ) {
        // conversions are slow; take them before entering the critical section
        let mut column = [None; ADC_CHANNELS];
        for (channel, slot) in column.iter_mut().enumerate() {
            *slot = source.read(channel);
        }

        let index = self.adc_index;
        self.store.adc.lock(|bank| {
            for (samples, &value) in bank.iter_mut().zip(column.iter()) {
                samples[index] = value;
            }
        });
        self.adc_index = (index + 1) & (ADC_DEPTH - 1);
    }

    /// Publish pulses counted over the last `FUEL_WINDOWS` windows.
    pub fn advance_fuel_window(&mut self) {
        self.fuel_index = (self.fuel_index + 1) & (FUEL_WINDOWS - 1);
        let total = self.store.fuel_pulses.load();
        let rate = total.wrapping_sub(self.fuel_history[self.fuel_index]);
        self.store.fuel_rate.store(rate);
        self.fuel_history[self.fuel_index] = total;
    }

    /// Step the hobbs pre-load while the engine runs; on exhaustion count a
    /// persisted hobbs tick.
    pub fn count_hobbs(&mut self) {
        if self.store.engine_running.load() == 0 {
            return;
        }
        self.hobbs_countdown = self.hobbs_countdown.saturating_sub(1);
        if self.hobbs_countdown == 0 {
            self.store.status.lock(StatusRecord::record_hobbs_tick);
            self.hobbs_countdown = HOBBS_COUNT_INTERVAL;
        }
    }

    /// Steps left before the next persisted hobbs tick.
    pub fn hobbs_countdown(&self) -> u16 { self.hobbs_countdown }
}

// =============================================================================
// Tachometer edge
// =============================================================================

/// Tachometer rising-edge producer.
pub struct TachPort<'a> {
    store: &'a SampleStore,
    index: usize,
    last_edge_us: Option<u32>,
}

impl TachPort<'_> {
    /// Record an edge seen at `now_us` (free-running microsecond clock).
    pub fn on_edge(
        &mut self,
        now_us: u32,
    ) {
        let rpm = match self.last_edge_us {
            Some(last) => match now_us.wrapping_sub(last) {
                0 => None,
                interval => Some(RPM_NUMERATOR / interval),
            },
            None => None,
        };
        self.last_edge_us = Some(now_us);

        let index = self.index;
        self.store.tach.lock(|tach| {
            if let Some(rpm) = rpm {
                tach.rpm[index] = rpm;
            }
            tach.did_pulse = true;
        });
        if rpm.is_some() {
            self.index = (index + 1) & (RPM_SLOTS - 1);
        }
    }
}

// =============================================================================
// Fuel-flow edge
// =============================================================================

/// Fuel-flow transducer rising-edge producer.
pub struct FuelFlowPort<'a> {
    store: &'a SampleStore,
    pending: u16,
}

impl FuelFlowPort<'_> {
    /// Count one transducer pulse.
    pub fn on_edge(&mut self) {
        let total = self.store.fuel_pulses.load().wrapping_add(1);
        self.store.fuel_pulses.store(total);

        let k_factor = self.store.settings.k_factor;
        if k_factor == 0 {
            return;
        }
        self.pending += 1;
        if self.pending >= k_factor {
            self.store.status.lock(StatusRecord::record_fuel_unit);
            self.pending = 0;
        }
    }

    /// Pulses counted toward the next fuel unit.
    pub fn pending(&self) -> u16 { self.pending }
}

// =============================================================================
// Thermocouple converter
// =============================================================================

/// Producer for the thermocouple converter's readings.
pub struct ThermocouplePort<'a> {
    store: &'a SampleStore,
}

impl ThermocouplePort<'_> {
    /// Store a probe reading (quarter °C) or a fault. Out-of-range slots are
    /// ignored.
    pub fn publish(
        &mut self,
        slot: usize,
        reading: Option<i16>,
    ) {
        if slot > REFERENCE_SLOT {
            return;
        }
        self.store.thermocouples.lock(|bank| bank[slot] = reading);
    }

    /// Store the reference-junction temperature.
    pub fn publish_reference(
        &mut self,
        reading: Option<i16>,
    ) {
        self.publish(REFERENCE_SLOT, reading);
    }
}

// =============================================================================
// Main loop
// =============================================================================

/// Main-loop consumer. Every read copies out under synchronization.
pub struct MainPort<'a> {
    store: &'a SampleStore,
}

impl MainPort<'_> {
    /// Fuel-flow pulses per fuel unit, fixed at startup.
    pub fn k_factor(&self) -> u16 { self.store.settings.k_factor }

    /// Copy of the last `ADC_DEPTH` samples of `channel`.
    pub fn adc_samples(
        &self,
        channel: usize,
    ) -> Option<[Option<u16>; ADC_DEPTH]> {
        if channel >= ADC_CHANNELS {
            return None;
        }
        Some(self.store.adc.lock(|bank| bank[channel]))
    }

    /// Copy of the whole RPM ring.
    pub fn rpm_ring(&self) -> [u32; RPM_SLOTS] { self.store.tach.lock(|tach| tach.rpm) }

    /// Copy of the thermocouple bank.
    pub fn thermocouples(&self) -> ThermocoupleBank { self.store.thermocouples.snapshot() }

    /// Pulses counted over the last fuel-flow windows.
    pub fn fuel_flow_count(&self) -> u32 { self.store.fuel_rate.load() }

    /// Copy of the persistent status.
    pub fn status(&self) -> PersistentStatus { self.store.status.lock(|record| record.status) }

    /// Whether the status changed since the last successful commit.
    pub fn is_dirty(&self) -> bool { self.store.status.lock(|record| record.dirty) }

    /// Tell the tick context whether hobbs time should accumulate.
    pub fn set_engine_running(
        &self,
        running: bool,
    ) {
        self.store.engine_running.store(u32::from(running));
    }

    /// Periodic activity check for the tachometer.
    ///
    /// Consumes the pulse flag; if no pulse arrived since the previous check
    /// the engine is stopped and the ring is zeroed. Returns whether pulses
    /// are arriving.
    pub fn check_tach(&self) -> bool {
        let (active, just_stopped) = self.store.tach.lock(|tach| {
            if tach.did_pulse {
                tach.did_pulse = false;
                tach.stopped = false;
                (true, false)
            } else {
                tach.rpm = [0; RPM_SLOTS];
                let just_stopped = !tach.stopped;
                tach.stopped = true;
                (false, just_stopped)
            }
        });
        if just_stopped {
            #[cfg(target_arch = "arm")]
            defmt::debug!("tach: no pulses, ring cleared");
        }
        active
    }

    /// Write the status through `storage` if it is dirty.
    ///
    /// The snapshot is taken inside a critical section and the write happens
    /// outside it. The dirty flag is cleared only if nothing changed while the
    /// write was in flight. Returns whether a commit was attempted.
    pub fn commit_if_dirty(
        &self,
        storage: &mut impl StatusStorage,
    ) -> Result<bool, StorageError> {
        let Some((status, revision)) = self
            .store
            .status
            .lock(|record| record.dirty.then_some((record.status, record.revision)))
        else {
            return Ok(false);
        };

        match storage.commit(&status) {
            Ok(()) => {
                let cleared = self.store.status.lock(|record| record.mark_committed(revision));
                #[cfg(target_arch = "arm")]
                defmt::debug!("status committed: {}", status);
                if !cleared {
                    #[cfg(target_arch = "arm")]
                    defmt::debug!("status changed during commit, still dirty");
                }
                Ok(true)
            }
            Err(error) => {
                #[cfg(target_arch = "arm")]
                defmt::warn!("status commit failed: {}", error);
                Err(error)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Analog source returning `base + channel` and bumping `base` per sweep.
    struct Ramp {
        base: u16,
    }

    impl AnalogSource for Ramp {
        fn read(
            &mut self,
            channel: usize,
        ) -> Option<u16> {
            let value = self.base + channel as u16;
            if channel == ADC_CHANNELS - 1 {
                self.base += 100;
            }
            Some(value)
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        commits: Vec<PersistentStatus>,
        fail: bool,
    }

    impl StatusStorage for MemoryStorage {
        fn load(&mut self) -> Result<(Settings, PersistentStatus), StorageError> {
            self.commits.last().map(|s| (Settings::default(), *s)).ok_or(StorageError::Blank)
        }

        fn commit(
            &mut self,
            status: &PersistentStatus,
        ) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Device);
            }
            self.commits.push(*status);
            Ok(())
        }
    }

    fn store_with_k(k_factor: u16) -> SampleStore {
        SampleStore::new(Settings { k_factor }, PersistentStatus::default())
    }

    #[test]
    fn test_split_only_once() {
        let store = store_with_k(38);
        assert!(store.split(Startup::Fresh).is_some());
        assert!(store.split(Startup::Fresh).is_none());
    }

    #[test]
    fn test_adc_rotation_overwrites_oldest() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();
        let mut ramp = Ramp { base: 0 };

        for _ in 0..ADC_DEPTH {
            ports.tick.sample_adc(&mut ramp);
        }
        assert_eq!(ports.main.adc_samples(3), Some([Some(3), Some(103), Some(203), Some(303)]));

        // fifth sweep lands in slot 0
        ports.tick.sample_adc(&mut ramp);
        assert_eq!(ports.main.adc_samples(3), Some([Some(403), Some(103), Some(203), Some(303)]));
    }

    #[test]
    fn test_adc_channel_out_of_range() {
        let store = store_with_k(38);
        let ports = store.split(Startup::Fresh).unwrap();
        assert_eq!(ports.main.adc_samples(ADC_CHANNELS), None);
    }

    #[test]
    fn test_adc_bank_starts_unsampled() {
        let store = store_with_k(38);
        let ports = store.split(Startup::Fresh).unwrap();
        assert_eq!(ports.main.adc_samples(0), Some([None; ADC_DEPTH]));
    }

    #[test]
    fn test_tach_records_rpm_from_interval() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();

        ports.tach.on_edge(1_000);
        assert_eq!(ports.main.rpm_ring(), [0; RPM_SLOTS], "first edge only arms the timer");

        ports.tach.on_edge(11_000);
        assert_eq!(ports.main.rpm_ring()[0], RPM_NUMERATOR / 10_000);
    }

    #[test]
    fn test_tach_ring_wraps() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();

        let mut now = 0u32;
        ports.tach.on_edge(now);
        for _ in 0..RPM_SLOTS {
            now += 10_000;
            ports.tach.on_edge(now);
        }
        // ninth interval is shorter and overwrites slot 0
        now += 5_000;
        ports.tach.on_edge(now);
        let ring = ports.main.rpm_ring();
        assert_eq!(ring[0], RPM_NUMERATOR / 5_000);
        assert_eq!(ring[1], RPM_NUMERATOR / 10_000);
    }

    #[test]
    fn test_tach_interval_survives_clock_wrap() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();
        ports.tach.on_edge(u32::MAX - 4_999);
        ports.tach.on_edge(5_000);
        assert_eq!(ports.main.rpm_ring()[0], RPM_NUMERATOR / 10_000);
    }

    #[test]
    fn test_check_tach_zeroes_stale_ring() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();
        ports.tach.on_edge(0);
        ports.tach.on_edge(20_000);

        assert!(ports.main.check_tach(), "pulse since last check");
        assert_ne!(ports.main.rpm_ring()[0], 0);

        assert!(!ports.main.check_tach(), "no pulse since last check");
        assert_eq!(ports.main.rpm_ring(), [0; RPM_SLOTS]);
    }

    #[test]
    fn test_fuel_window_rate_over_four_windows() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();

        for pulses in [5, 5, 5, 5, 2] {
            for _ in 0..pulses {
                ports.fuel_flow.on_edge();
            }
            ports.tick.advance_fuel_window();
        }
        // last four windows: 5 + 5 + 5 + 2
        assert_eq!(ports.main.fuel_flow_count(), 17);
    }

    #[test]
    fn test_fuel_k_factor_end_to_end() {
        let store = SampleStore::new(
            Settings { k_factor: 38 },
            PersistentStatus {
                fuel: 100,
                ..Default::default()
            },
        );
        let mut ports = store.split(Startup::Fresh).unwrap();

        for _ in 0..19 {
            ports.fuel_flow.on_edge();
        }
        assert_eq!(ports.fuel_flow.pending(), 19);
        assert_eq!(ports.main.status().fuel, 100);
        assert!(!ports.main.is_dirty());

        for _ in 0..19 {
            ports.fuel_flow.on_edge();
        }
        assert_eq!(ports.fuel_flow.pending(), 0);
        assert_eq!(ports.main.status().fuel, 99);
        assert!(ports.main.is_dirty());
    }

    #[test]
    fn test_zero_k_factor_never_consumes_fuel() {
        let store = SampleStore::new(
            Settings { k_factor: 0 },
            PersistentStatus {
                fuel: 10,
                ..Default::default()
            },
        );
        let mut ports = store.split(Startup::Fresh).unwrap();
        for _ in 0..100 {
            ports.fuel_flow.on_edge();
        }
        assert_eq!(ports.main.status().fuel, 10);
    }

    #[test]
    fn test_startup_assume_half_lost() {
        let store = store_with_k(38);
        let ports = store.split(Startup::AssumeHalfLost).unwrap();
        assert_eq!(ports.fuel_flow.pending(), 19);
        assert_eq!(ports.tick.hobbs_countdown(), HOBBS_COUNT_INTERVAL / 2);
    }

    #[test]
    fn test_hobbs_counts_only_while_running() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();

        for _ in 0..HOBBS_COUNT_INTERVAL {
            ports.tick.count_hobbs();
        }
        assert_eq!(ports.main.status().hobbs, 0);

        ports.main.set_engine_running(true);
        for _ in 0..HOBBS_COUNT_INTERVAL - 1 {
            ports.tick.count_hobbs();
        }
        assert_eq!(ports.main.status().hobbs, 0);
        ports.tick.count_hobbs();
        assert_eq!(ports.main.status().hobbs, 1);
        assert!(ports.main.is_dirty());
        assert_eq!(ports.tick.hobbs_countdown(), HOBBS_COUNT_INTERVAL);
    }

    #[test]
    fn test_on_tick_schedules_slow_work() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();
        ports.main.set_engine_running(true);
        let mut ramp = Ramp { base: 0 };

        ports.fuel_flow.on_edge();
        for _ in 0..FUEL_WINDOW_TICKS - 1 {
            ports.tick.on_tick(&mut ramp);
        }
        assert_eq!(ports.main.fuel_flow_count(), 0);
        ports.tick.on_tick(&mut ramp);
        assert_eq!(ports.main.fuel_flow_count(), 1);

        let ticks_so_far = FUEL_WINDOW_TICKS;
        for _ in ticks_so_far..HOBBS_TICKS {
            ports.tick.on_tick(&mut ramp);
        }
        assert_eq!(ports.tick.hobbs_countdown(), HOBBS_COUNT_INTERVAL - 1);
    }

    #[test]
    fn test_thermocouple_publish() {
        let store = store_with_k(38);
        let mut ports = store.split(Startup::Fresh).unwrap();
        ports.thermocouple.publish(2, Some(400));
        ports.thermocouple.publish_reference(Some(100));
        ports.thermocouple.publish(REFERENCE_SLOT + 1, Some(1));

        let bank = ports.main.thermocouples();
        assert_eq!(bank[2], Some(400));
        assert_eq!(bank[REFERENCE_SLOT], Some(100));
        assert_eq!(bank[0], None);
    }

    #[test]
    fn test_commit_if_dirty() {
        let store = store_with_k(1);
        let mut ports = store.split(Startup::Fresh).unwrap();
        let mut storage = MemoryStorage::default();

        assert_eq!(ports.main.commit_if_dirty(&mut storage), Ok(false));

        store.status.lock(|record| record.status.fuel = 5);
        ports.fuel_flow.on_edge();
        assert_eq!(ports.main.commit_if_dirty(&mut storage), Ok(true));
        assert_eq!(storage.commits.last().map(|s| s.fuel), Some(4));
        assert!(!ports.main.is_dirty());
    }

    #[test]
    fn test_failed_commit_stays_dirty() {
        let store = store_with_k(1);
        let mut ports = store.split(Startup::Fresh).unwrap();
        let mut storage = MemoryStorage {
            fail: true,
            ..Default::default()
        };

        store.status.lock(|record| record.status.fuel = 5);
        ports.fuel_flow.on_edge();
        assert_eq!(ports.main.commit_if_dirty(&mut storage), Err(StorageError::Device));
        assert!(ports.main.is_dirty());
    }
}
