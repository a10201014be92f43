//! Periodic transmission scheduler shared by every node type.
//!
//! Messages are registered by a small numeric id and a rate in Hz. The rate
//! is turned into a period in main-loop ticks; each call to
//! [`MessageScheduler::due`] counts down every entry and returns the ids that
//! reached zero, reloading their period. Rate changes remove and re-add the
//! entry, so a new rate starts a fresh period.
use crate::error::ScheduleError;
use heapless::Vec;

/// Highest rate accepted from a rate-change command.
pub const MAX_COMMAND_RATE_HZ: u8 = 100;

/// One registered periodic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduledMessage {
    pub id: u8,
    /// Period in ticks.
    pub period: u16,
    /// Ticks left before the next transmission.
    pub countdown: u16,
}

//==================================================================================RATE_REQUEST
/// Interpretation of one byte of a rate-change command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RateRequest {
    /// `0xFF`: leave the current rate.
    Keep,
    /// `0x00`: reserved to stop the message. Not acted upon.
    Disable,
    /// `1..=100` Hz.
    Hz(u8),
    /// Anything else; ignored.
    OutOfRange(u8),
}

impl From<u8> for RateRequest {
    fn from(raw: u8) -> Self {
        match raw {
            0xFF => RateRequest::Keep,
            0x00 => RateRequest::Disable,
            1..=MAX_COMMAND_RATE_HZ => RateRequest::Hz(raw),
            other => RateRequest::OutOfRange(other),
        }
    }
}

//==================================================================================SCHEDULER
/// Fixed-capacity registry of periodic messages.
#[derive(Debug, Clone)]
pub struct MessageScheduler<const N: usize> {
    tick_hz: u16,
    entries: Vec<ScheduledMessage, N>,
    last_tick: Option<u32>,
}

impl<const N: usize> MessageScheduler<N> {
    pub const fn new(tick_hz: u16) -> Self {
        Self {
            tick_hz,
            entries: Vec::new(),
            last_tick: None,
        }
    }

    /// Period in ticks for `rate_hz`; the rate must be non-zero and no faster
    /// than the tick.
    pub fn period_for(&self, rate_hz: u8) -> Result<u16, ScheduleError> {
        if rate_hz == 0 || u16::from(rate_hz) > self.tick_hz {
            return Err(ScheduleError::InvalidRate {
                rate_hz,
                tick_hz: self.tick_hz,
            });
        }
        Ok(self.tick_hz / u16::from(rate_hz))
    }

    /// Register `id` to be sent `rate_hz` times per second.
    pub fn add(&mut self, id: u8, rate_hz: u8) -> Result<(), ScheduleError> {
        if self.contains(id) {
            return Err(ScheduleError::DuplicateId { id });
        }
        let period = self.period_for(rate_hz)?;
        self.entries
            .push(ScheduledMessage {
                id,
                period,
                countdown: period,
            })
            .map_err(|_| ScheduleError::RegistryFull)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Scheduled message {} every {} ticks", id, period);
        Ok(())
    }

    /// Unregister `id`. Returns whether it was registered.
    pub fn remove(&mut self, id: u8) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: u8) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn get(&self, id: u8) -> Option<&ScheduledMessage> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids due at `current_tick`, in registration order. Meant to be called
    /// once per tick; ticks skipped between two calls are counted, and a
    /// second call for the same tick returns nothing.
    pub fn due(&mut self, current_tick: u32) -> Vec<u8, N> {
        let elapsed = match self.last_tick {
            Some(last) => current_tick.wrapping_sub(last),
            None => 1,
        };
        self.last_tick = Some(current_tick);

        let mut due = Vec::new();
        if elapsed == 0 {
            return due;
        }
        let elapsed = u16::try_from(elapsed).unwrap_or(u16::MAX);
        for entry in self.entries.iter_mut() {
            if entry.countdown <= elapsed {
                entry.countdown = entry.period;
                // Capacity matches the registry, so this cannot overflow.
                let _ = due.push(entry.id);
            } else {
                entry.countdown -= elapsed;
            }
        }
        due
    }

    /// Apply one rate request to `id`. A new rate replaces the entry (phase
    /// restarts); every other request leaves it untouched. Returns whether
    /// the schedule changed.
    pub fn apply_rate(&mut self, id: u8, request: RateRequest) -> Result<bool, ScheduleError> {
        match request {
            RateRequest::Hz(rate_hz) => {
                // Validate before removing so a bad rate never loses the entry.
                self.period_for(rate_hz)?;
                self.remove(id);
                self.add(id, rate_hz)?;
                Ok(true)
            }
            RateRequest::Keep => Ok(false),
            RateRequest::Disable | RateRequest::OutOfRange(_) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Ignoring rate request {} for message {}", request, id);
                Ok(false)
            }
        }
    }
}
