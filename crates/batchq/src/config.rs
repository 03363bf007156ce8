/// Configuration for [`Queue`](crate::Queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Item buffer capacity reserved up front (default: 0, grow on demand)
    pub initial_capacity: usize,
    /// Enable metrics collection (a few relaxed atomic adds per operation)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(initial_capacity: usize, enable_metrics: bool) -> Self {
        Self {
            initial_capacity,
            enable_metrics,
        }
    }

    /// Sets the initial item buffer capacity.
    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Turns metrics collection on or off.
    pub const fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            enable_metrics: false,
        }
    }
}

/// Low overhead configuration (preallocated 1K item buffer, no metrics)
pub const LOW_OVERHEAD_CONFIG: Config = Config::new(1024, false);

/// Instrumented configuration (grow on demand, metrics on)
pub const INSTRUMENTED_CONFIG: Config = Config::new(0, true);
