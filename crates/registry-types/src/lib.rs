/// Literal placeholder stored when a conditional or derived value does not apply.
pub const NOT_APPLICABLE: &str = "N/A";

/// Errors that can occur when creating validated registry value types.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// The text was neither the `N/A` sentinel nor a valid value
    #[error("invalid value '{0}'")]
    Invalid(String),
}

/// A medical record number.
///
/// The input is trimmed of leading and trailing whitespace during construction, so two
/// `Mrn`s compare equal exactly when their trimmed texts do. Matching is case-sensitive.
/// An empty MRN is representable: it is the state of a form before the user types one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mrn(String);

impl Mrn {
    /// Creates a new `Mrn` from the given input, trimming surrounding whitespace.
    pub fn new(input: impl AsRef<str>) -> Self {
        Self(input.as_ref().trim().to_owned())
    }

    /// Returns the trimmed MRN text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when no MRN has been entered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares against raw (untrimmed) text the way lookups do.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.trim()
    }
}

impl std::fmt::Display for Mrn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Mrn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Mrn {
    fn from(value: &str) -> Self {
        Mrn::new(value)
    }
}

impl serde::Serialize for Mrn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Mrn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Mrn::new(s))
    }
}

/// A value that only exists when its companion answer is "Yes" (or "Present").
///
/// On disk the absent case is the literal sentinel [`NOT_APPLICABLE`], never an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicable<T> {
    Value(T),
    NotApplicable,
}

impl<T> Applicable<T> {
    /// Keeps `value` only when `condition` holds.
    pub fn when(condition: bool, value: T) -> Self {
        if condition {
            Applicable::Value(value)
        } else {
            Applicable::NotApplicable
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Applicable::Value(v) => Some(v),
            Applicable::NotApplicable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applicable<U> {
        match self {
            Applicable::Value(v) => Applicable::Value(f(v)),
            Applicable::NotApplicable => Applicable::NotApplicable,
        }
    }
}

impl<T> Default for Applicable<T> {
    fn default() -> Self {
        Applicable::NotApplicable
    }
}

impl<T> Applicable<T> {
    /// Parses a stored cell: the sentinel (or an empty cell) is `NotApplicable`, anything else
    /// must be accepted by `parse_value`.
    pub fn parse(
        text: &str,
        parse_value: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Self, ValueError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == NOT_APPLICABLE {
            return Ok(Applicable::NotApplicable);
        }
        parse_value(trimmed)
            .map(Applicable::Value)
            .ok_or_else(|| ValueError::Invalid(trimmed.to_owned()))
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Applicable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applicable::Value(v) => write!(f, "{v}"),
            Applicable::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl<T: serde::Serialize> serde::Serialize for Applicable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Applicable::Value(v) => v.serialize(serializer),
            Applicable::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}
