//! Field validation verdicts

/// Reason code attached to an invalid field
pub type ReasonCode = &'static str;

/// Verdict of a field validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validation {
    /// Field is valid
    Valid,
    /// Field is invalid for the given reason
    Invalid(ReasonCode),
}

impl Validation {
    /// Whether the field is valid
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Reason code of an invalid field
    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }

    /// [`Validation::Valid`] when `condition` holds, otherwise invalid with `reason`
    pub fn check(condition: bool, reason: ReasonCode) -> Self {
        if condition {
            Self::Valid
        } else {
            Self::Invalid(reason)
        }
    }
}

/// Raw value paired with its validation verdict
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldState<T> {
    /// Value the verdict was computed for
    pub value: T,
    /// Verdict
    pub validation: Validation,
}

impl<T> FieldState<T> {
    /// Create new [`FieldState`]
    pub fn new(value: T, validation: Validation) -> Self {
        Self { value, validation }
    }

    /// Field that is always valid
    pub fn valid(value: T) -> Self {
        Self::new(value, Validation::Valid)
    }

    /// Whether the field is valid
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }
}

impl<T: Default> Default for FieldState<T> {
    fn default() -> Self {
        Self::valid(T::default())
    }
}
