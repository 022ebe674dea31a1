type LowLevelIdType = u32;

/// Identifier of a lineage in an event history.
///
/// Identifiers are strictly positive.
/// `1..=N` are the sampled lineages and
/// every lineage created by the dual process
/// receives a larger, fresh value.
///
/// ```
/// # use asgsim_core::LineageId;
/// let l = LineageId::new(3).unwrap();
/// assert_eq!(l, 3);
/// assert_eq!(l.index(), 2);
/// assert!(LineageId::new(0).is_none());
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, std::hash::Hash)]
pub struct LineageId(pub(crate) LowLevelIdType);

impl LineageId {
    /// The first sample.
    pub const FIRST: LineageId = Self(1);

    /// Create a new id.
    ///
    /// # Returns
    ///
    /// * `Some` if `value` > 0
    /// * `None` otherwise
    pub fn new(value: LowLevelIdType) -> Option<Self> {
        if value > 0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Zero-based position of this lineage in
    /// a vector holding lineages `1..`.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for LineageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for LineageId {
    type Error = crate::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        LowLevelIdType::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(crate::Error::LineageIdError(value as i64))
    }
}

impl TryFrom<i64> for LineageId {
    type Error = crate::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        LowLevelIdType::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(crate::Error::LineageIdError(value))
    }
}

impl From<LineageId> for LowLevelIdType {
    fn from(item: LineageId) -> Self {
        item.0
    }
}

impl From<LineageId> for usize {
    fn from(item: LineageId) -> Self {
        item.0 as usize
    }
}

impl PartialEq<LowLevelIdType> for LineageId {
    fn eq(&self, other: &LowLevelIdType) -> bool {
        self.0 == *other
    }
}

impl PartialEq<LineageId> for LowLevelIdType {
    fn eq(&self, other: &LineageId) -> bool {
        *self == other.0
    }
}

impl PartialOrd<LowLevelIdType> for LineageId {
    fn partial_cmp(&self, other: &LowLevelIdType) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialOrd<LineageId> for LowLevelIdType {
    fn partial_cmp(&self, other: &LineageId) -> Option<std::cmp::Ordering> {
        self.partial_cmp(&other.0)
    }
}

/// The allelic type carried by a lineage.
///
/// Selection always favors [`AlleleType::Advantaged`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, std::hash::Hash)]
pub enum AlleleType {
    /// Type `0`
    #[default]
    Disadvantaged = 0,
    /// Type `1`
    Advantaged = 1,
}

impl AlleleType {
    /// Both types, in numeric order.
    pub const ALL: [AlleleType; 2] = [AlleleType::Disadvantaged, AlleleType::Advantaged];

    /// The other type.
    ///
    /// ```
    /// # use asgsim_core::AlleleType;
    /// assert_eq!(AlleleType::Advantaged.flip(), AlleleType::Disadvantaged);
    /// ```
    pub fn flip(self) -> Self {
        match self {
            AlleleType::Disadvantaged => AlleleType::Advantaged,
            AlleleType::Advantaged => AlleleType::Disadvantaged,
        }
    }

    /// Resolve a selective event between a continuing
    /// and an incoming potential parent.
    ///
    /// The incoming parent is only used when it
    /// carries the advantaged type, so the result is
    /// the logical OR of the two.
    ///
    /// ```
    /// # use asgsim_core::AlleleType;
    /// use AlleleType::*;
    /// assert_eq!(AlleleType::select(Disadvantaged, Disadvantaged), Disadvantaged);
    /// assert_eq!(AlleleType::select(Disadvantaged, Advantaged), Advantaged);
    /// assert_eq!(AlleleType::select(Advantaged, Disadvantaged), Advantaged);
    /// ```
    pub fn select(continuing: AlleleType, incoming: AlleleType) -> Self {
        continuing | incoming
    }

    pub fn is_advantaged(self) -> bool {
        self == AlleleType::Advantaged
    }
}

impl std::ops::BitOr for AlleleType {
    type Output = AlleleType;

    fn bitor(self, rhs: Self) -> Self::Output {
        AlleleType::from(self.is_advantaged() || rhs.is_advantaged())
    }
}

impl From<bool> for AlleleType {
    fn from(value: bool) -> Self {
        if value {
            AlleleType::Advantaged
        } else {
            AlleleType::Disadvantaged
        }
    }
}

impl From<AlleleType> for u8 {
    fn from(value: AlleleType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for AlleleType {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AlleleType::Disadvantaged),
            1 => Ok(AlleleType::Advantaged),
            _ => Err(crate::Error::AlleleTypeError(i64::from(value))),
        }
    }
}

impl TryFrom<i32> for AlleleType {
    type Error = crate::Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AlleleType::Disadvantaged),
            1 => Ok(AlleleType::Advantaged),
            _ => Err(crate::Error::AlleleTypeError(i64::from(value))),
        }
    }
}

impl std::fmt::Display for AlleleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", u8::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_id_conversions() {
        assert!(LineageId::try_from(0_usize).is_err());
        assert!(LineageId::try_from(-1_i64).is_err());
        assert_eq!(
            LineageId::try_from(u64::MAX as usize),
            Err(crate::Error::LineageIdError(-1))
        );
        let l = LineageId::try_from(7_usize).unwrap();
        assert_eq!(usize::from(l), 7);
        assert_eq!(l.next(), 8);
        assert!(l < 8);
    }

    #[test]
    fn test_allele_type_conversions() {
        assert_eq!(AlleleType::try_from(0_u8), Ok(AlleleType::Disadvantaged));
        assert_eq!(AlleleType::try_from(1_i32), Ok(AlleleType::Advantaged));
        assert_eq!(
            AlleleType::try_from(2_i32),
            Err(crate::Error::AlleleTypeError(2))
        );
        assert_eq!(u8::from(AlleleType::Advantaged), 1);
        assert_eq!(AlleleType::Advantaged.to_string(), "1");
    }

    #[test]
    fn test_flip_is_an_involution() {
        for a in AlleleType::ALL {
            assert_ne!(a.flip(), a);
            assert_eq!(a.flip().flip(), a);
        }
    }
}
