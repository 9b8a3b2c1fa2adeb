use jiff::tz::TimeZone;

/// Default limit on nested routine calls while encoding one value.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options captured by every unit an [`EncoderRegistry`](crate::EncoderRegistry)
/// builds.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Zone used to turn civil dates and date-times into instants
    /// (default: UTC)
    pub time_zone: TimeZone,

    /// Maximum nesting of documents and arrays below the root while
    /// encoding (default: 256)
    pub max_depth: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            time_zone: TimeZone::UTC,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncoderOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zone civil date/time values are interpreted in.
    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Set the nesting limit.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
