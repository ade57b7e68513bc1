//! Control loop and tick pacing.
//!
//! Provides portable pacing without async/await or platform-specific timers.
//! The caller passes the current time and is responsible for sleeping between
//! polls.

use embassy_time::{Duration, Instant};
use embedded_storage::Storage;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::engine::{ControllerConfig, PatchEngine};
use crate::store::{ProgramRecord, ProgramStore, StoreError};
use crate::{BrightnessRenderer, Peripherals, RemoteDecoder};

/// Result of a single poll.
#[derive(Debug, Clone, Copy)]
pub struct LoopResult {
    /// Whether the generators and renderer advanced during this poll.
    pub ticked: bool,
    /// Program loaded during this poll, if any.
    pub loaded: Option<u8>,
    /// Earliest time the next tick can happen.
    pub next_tick: Instant,
    /// How long the caller may sleep before polling again.
    pub sleep_duration: Duration,
}

/// Single-threaded control loop.
///
/// Every poll:
/// - samples inputs into the source table
/// - handles at most one remote code, loading a program if one is selected
/// - once more than the tick period has passed, advances the oscillator,
///   gate mask, automatic cycling, patches and renderer exactly once
///
/// # Usage
///
/// ```ignore
/// let mut control = ControlLoop::new(renderer, board, receiver, flash, &config);
/// control.start(Instant::from_millis(now_ms()));
///
/// loop {
///     let result = control.poll(Instant::from_millis(now_ms()));
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct ControlLoop<R, P, D, S, const N: usize>
where
    R: BrightnessRenderer,
    P: Peripherals,
    D: RemoteDecoder,
    S: Storage,
{
    renderer: R,
    peripherals: P,
    decoder: D,
    store: ProgramStore<S, N>,
    engine: PatchEngine<N>,
    fallback: Option<ProgramRecord<N>>,
    tick_period: Duration,
    startup_blink: Duration,
    ack_blink: Duration,
    last_tick: Instant,
}

impl<R, P, D, S, const N: usize> ControlLoop<R, P, D, S, N>
where
    R: BrightnessRenderer,
    P: Peripherals,
    D: RemoteDecoder,
    S: Storage,
{
    /// Create a new control loop.
    pub fn new(
        renderer: R,
        peripherals: P,
        decoder: D,
        storage: S,
        config: &ControllerConfig<N>,
    ) -> Self {
        Self {
            renderer,
            peripherals,
            decoder,
            store: ProgramStore::new(storage),
            engine: PatchEngine::new(config),
            fallback: config.fallback.clone(),
            tick_period: config.tick_period,
            startup_blink: config.startup_blink,
            ack_blink: config.ack_blink,
            last_tick: Instant::from_millis(0),
        }
    }

    /// Read the store and put the first program in force.
    ///
    /// An unreadable or foreign store counts as empty, in which case the
    /// fallback program is used. Blinks the activity indicator once.
    pub fn start(&mut self, now: Instant) {
        let header = match self.store.open() {
            Ok(header) => Some(header),
            Err(_err) => {
                #[cfg(feature = "esp32-log")]
                println!("store: header unreadable, running without programs");
                None
            }
        };
        let (count, cycle_rate) = header
            .map(|h| (h.program_count, h.cycle_rate))
            .unwrap_or_default();
        self.engine.remote_mut().set_programs(count, cycle_rate);

        if count == 0 || !self.load(1) {
            if let Some(fallback) = &self.fallback {
                self.engine.apply_program(fallback, &mut self.renderer);
            }
        }

        self.blink(self.startup_blink);
        self.last_tick = now;
    }

    /// Run one loop iteration.
    pub fn poll(&mut self, now: Instant) -> LoopResult {
        let mut loaded = None;

        self.engine.refresh(&mut self.peripherals, now);

        if let Some(code) = self.decoder.poll() {
            if let Some(request) = self.engine.handle_code(code) {
                if self.load(request.0) {
                    loaded = Some(request.0);
                    self.blink(self.ack_blink);
                }
            }
        }

        let ticked = now.saturating_duration_since(self.last_tick) > self.tick_period;
        if ticked {
            self.last_tick = now;
            if let Some(request) = self.engine.tick(&mut self.renderer) {
                if self.load(request.0) {
                    loaded = Some(request.0);
                }
            }
        }

        let next_tick = self.last_tick + self.tick_period + Duration::from_millis(1);
        LoopResult {
            ticked,
            loaded,
            next_tick,
            sleep_duration: next_tick.saturating_duration_since(now),
        }
    }

    /// Load program `index` from the store and put it in force.
    ///
    /// Returns `false` and keeps the current program if it cannot be read.
    pub fn load(&mut self, index: u8) -> bool {
        match self.store.load(index) {
            Ok(record) => {
                self.engine.apply_program(&record, &mut self.renderer);
                self.engine.remote_mut().set_current_program(index);
                #[cfg(feature = "esp32-log")]
                println!("program {} loaded", index);
                true
            }
            Err(_err) => {
                #[cfg(feature = "esp32-log")]
                println!("program {} could not be loaded", index);
                false
            }
        }
    }

    /// Store the configuration currently in force as program `index`.
    pub fn save(&mut self, index: u8) -> Result<(), StoreError<S::Error>> {
        let record = self.engine.capture_program(&self.renderer);
        self.store.save(index, &record)
    }

    /// Bounded, blocking acknowledgement blink.
    fn blink(&mut self, duration: Duration) {
        self.peripherals.set_activity(true);
        self.peripherals.pause(duration);
        self.peripherals.set_activity(false);
    }

    pub fn engine(&self) -> &PatchEngine<N> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PatchEngine<N> {
        &mut self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Engine and renderer together, for the programming helpers.
    pub fn engine_and_renderer(&mut self) -> (&mut PatchEngine<N>, &mut R) {
        (&mut self.engine, &mut self.renderer)
    }

    pub fn peripherals(&self) -> &P {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut P {
        &mut self.peripherals
    }

    pub fn store(&self) -> &ProgramStore<S, N> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgramStore<S, N> {
        &mut self.store
    }
}
