//! Target address model.

/// Target address model, passed to the build driver as `address-model=<bits>`.
///
/// Detected once from the pointer width this binary was compiled for.
///
/// # Example
///
/// ```
/// use boostup_schema::AddressModel;
///
/// let current = AddressModel::current();
/// assert!(matches!(current.bits(), 32 | 64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AddressModel {
    /// 32-bit targets.
    Bits32,
    /// 64-bit targets.
    Bits64,
}

impl AddressModel {
    /// Get the current address model
    pub fn current() -> Self {
        #[cfg(target_pointer_width = "32")]
        {
            Self::Bits32
        }
        #[cfg(not(target_pointer_width = "32"))]
        {
            Self::Bits64
        }
    }

    /// Number of bits.
    pub fn bits(&self) -> u8 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }
}

impl From<AddressModel> for u8 {
    fn from(value: AddressModel) -> Self {
        value.bits()
    }
}

impl TryFrom<u8> for AddressModel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(Self::Bits32),
            64 => Ok(Self::Bits64),
            _ => Err(format!("Unsupported address model: {value}")),
        }
    }
}

impl std::fmt::Display for AddressModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl std::str::FromStr for AddressModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches("bit") {
            "32" => Ok(Self::Bits32),
            "64" => Ok(Self::Bits64),
            _ => Err(format!("Unknown address model: {s}")),
        }
    }
}
