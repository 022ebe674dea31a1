/// A time value, measured backwards from the present.
///
/// The present is `0` and larger values are further in the past.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(f64);

impl Time {
    /// The time of the sample.
    pub const PRESENT: Time = Time(0.0);

    /// Create a new Time
    ///
    /// # Returns
    ///
    /// * `Some` if `value` is finite and non-negative
    /// * `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// let t = asgsim_core::Time::new(1.5).unwrap();
    /// assert_eq!(f64::from(t), 1.5);
    /// assert!(asgsim_core::Time::new(-1.0).is_none());
    /// assert!(asgsim_core::Time::new(f64::NAN).is_none());
    /// ```
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// The time as a raw value.
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Move `elapsed` units further into the past.
    pub fn before(self, elapsed: f64) -> Option<Self> {
        Self::new(self.0 + elapsed)
    }

    /// Move `elapsed` units towards the present.
    pub fn after(self, elapsed: f64) -> Option<Self> {
        Self::new(self.0 - elapsed)
    }
}

/// The elapsed time between two points.
impl std::ops::Sub for Time {
    type Output = f64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

impl TryFrom<f64> for Time {
    type Error = crate::Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(crate::Error::TimeError(value))
    }
}

impl From<Time> for f64 {
    fn from(value: Time) -> Self {
        value.0
    }
}

impl PartialEq<f64> for Time {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<f64> for Time {
    fn partial_cmp(&self, other: &f64) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}
