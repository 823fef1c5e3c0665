//! Bounded busy-waiting
//!
//! The controller signals completion only through its busy bit. Waits are
//! bounded by a number of polls computed from a timeout and the core clock,
//! there is no timer available inside a flash algorithm.

/// Core clock after reset, used when the caller does not provide one.
pub const DEFAULT_CLOCK_HZ: u32 = 32_000_000;

/// Approximate core cycles spent per poll of the status register.
pub const CYCLES_PER_POLL: u32 = 8;

/// Upper bound on the number of status register polls of one wait.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Budget {
    polls: Option<u32>,
}

impl Budget {
    /// Never give up waiting.
    pub const UNBOUNDED: Budget = Budget { polls: None };

    /// Budget allowing exactly `polls` polls of a busy status.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::poll::Budget;
    ///
    /// assert_eq!(Budget::from_polls(3).polls(), Some(3));
    /// ```
    pub const fn from_polls(polls: u32) -> Budget {
        Budget { polls: Some(polls) }
    }

    /// Budget for a timeout of `ms` milliseconds at `clock_hz`.
    ///
    /// A zero clock is replaced by [`DEFAULT_CLOCK_HZ`], a zero timeout
    /// disables the bound. The result is at least one poll.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::poll::Budget;
    ///
    /// // 400 ms at 32 MHz, 8 cycles per poll
    /// assert_eq!(Budget::from_millis(400, 32_000_000).polls(), Some(1_600_000));
    /// assert_eq!(Budget::from_millis(400, 0), Budget::from_millis(400, 32_000_000));
    /// assert_eq!(Budget::from_millis(0, 32_000_000), Budget::UNBOUNDED);
    /// assert_eq!(Budget::from_millis(1, 1).polls(), Some(1));
    /// ```
    pub const fn from_millis(ms: u32, clock_hz: u32) -> Budget {
        if ms == 0 {
            return Budget::UNBOUNDED;
        }
        let clock_hz: u64 = if clock_hz == 0 {
            DEFAULT_CLOCK_HZ as u64
        } else {
            clock_hz as u64
        };
        let polls: u64 = (ms as u64) * clock_hz / 1000 / (CYCLES_PER_POLL as u64);
        let polls: u32 = if polls > u32::MAX as u64 {
            u32::MAX
        } else if polls == 0 {
            1
        } else {
            polls as u32
        };
        Budget::from_polls(polls)
    }

    /// Number of polls, `None` if unbounded.
    pub const fn polls(&self) -> Option<u32> {
        self.polls
    }

    /// Start a wait with this budget.
    pub const fn start(self) -> Countdown {
        Countdown {
            remaining: self.polls,
        }
    }
}

/// Remaining polls of one wait.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    /// Account for one poll.
    ///
    /// Returns `false` once the budget is exhausted.
    ///
    /// # Example
    ///
    /// ```
    /// use stm32h5xx_flash_algo::poll::Budget;
    ///
    /// let mut countdown = Budget::from_polls(2).start();
    /// assert!(countdown.tick());
    /// assert!(countdown.tick());
    /// assert!(!countdown.tick());
    ///
    /// let mut forever = Budget::UNBOUNDED.start();
    /// assert!(forever.tick());
    /// ```
    pub fn tick(&mut self) -> bool {
        match self.remaining.as_mut() {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }
}

/// Poll budgets of a session.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Budgets {
    /// Unlock and lock sequences.
    pub lock: Budget,
    /// Sector erase.
    pub erase: Budget,
    /// Mass erase of both banks.
    pub mass_erase: Budget,
    /// Quad-word programming.
    pub program: Budget,
}
