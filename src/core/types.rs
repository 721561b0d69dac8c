use serde::{Deserialize, Serialize};

/// Unique identifier for a beacon in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeaconId(pub String);

impl BeaconId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BeaconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BeaconId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for an organization in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl OrganizationId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference genome a query position is expressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceGenome {
    Hg18,
    Hg19,
    Hg38,
}

impl ReferenceGenome {
    /// UCSC-style name (hg18, hg19, hg38)
    #[must_use]
    pub fn ucsc_name(self) -> &'static str {
        match self {
            Self::Hg18 => "hg18",
            Self::Hg19 => "hg19",
            Self::Hg38 => "hg38",
        }
    }

    /// GRC-style assembly name used by NCBI, ICGC and GA4GH style APIs
    #[must_use]
    pub fn grc_name(self) -> &'static str {
        match self {
            Self::Hg18 => "NCBI36",
            Self::Hg19 => "GRCh37",
            Self::Hg38 => "GRCh38",
        }
    }

    /// Parse either naming style, case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hg18" | "ncbi36" => Some(Self::Hg18),
            "hg19" | "grch37" => Some(Self::Hg19),
            "hg38" | "grch38" => Some(Self::Hg38),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceGenome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ucsc_name())
    }
}

impl std::str::FromStr for ReferenceGenome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown reference genome: {s}"))
    }
}

/// Three-valued answer of a beacon
///
/// `Unknown` means the beacon neither confirmed presence nor absence:
/// it timed out, failed at the transport level, or answered in a way
/// that could not be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriBool {
    True,
    False,
    #[default]
    Unknown,
}

impl TriBool {
    #[must_use]
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<bool> for TriBool {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl From<Option<bool>> for TriBool {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}

impl Serialize for TriBool {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TriBool {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.into())
    }
}

impl std::fmt::Display for TriBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "yes"),
            Self::False => write!(f, "no"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Why a result is `Unknown` (or otherwise not a plain provider answer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The requested beacon does not exist or is not visible
    InvalidBeacon,
    /// Chromosome, position or allele was missing
    InvalidQuery,
    /// The beacon is switched off in the catalog
    Disabled,
    /// No answer arrived within the dispatch deadline
    Timeout,
    /// Connection failure, malformed URL, or empty body
    Transport,
    /// The provider answered with something its parser does not recognize
    UnrecognizedResponse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidBeacon => "invalid beacon",
            Self::InvalidQuery => "invalid query",
            Self::Disabled => "disabled",
            Self::Timeout => "timeout",
            Self::Transport => "transport error",
            Self::UnrecognizedResponse => "unrecognized response",
        };
        write!(f, "{s}")
    }
}
