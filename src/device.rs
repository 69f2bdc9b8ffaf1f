use crate::Error;
use regex::Regex;
use std::sync::OnceLock;

const DEVICE_ID_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.:-]{0,63}$";

#[allow(clippy::expect_used)]
fn device_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    PATTERN.get_or_init(|| Regex::new(DEVICE_ID_PATTERN).expect("pattern should compile"))
}

/// A sensor's identifier.
///
/// 1 to 64 characters, starting with a letter or digit.
/// Characters supported: a-z A-Z 0-9 _ . : -
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug)]
pub struct DeviceId(String);

impl DeviceId {
    /// Validates and wraps a device identifier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the identifier is malformed.
    pub fn new(id: &str) -> crate::Result<Self> {
        if device_id_pattern().is_match(id) {
            Ok(Self(id.to_owned()))
        } else {
            Err(Error::invalid(
                "device_id",
                id,
                "must be 1-64 characters of a-z, A-Z, 0-9, '_', '.', ':' or '-'",
            ))
        }
    }

    /// The identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for DeviceId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Restricts a query to one device, or none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Readings of every device
    #[default]
    All,

    /// Readings of a single device
    Device(DeviceId),
}

impl DeviceFilter {
    /// Builds a filter from an optional raw identifier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the identifier is malformed.
    pub fn parse(id: Option<&str>) -> crate::Result<Self> {
        id.map_or(Ok(Self::All), |id| DeviceId::new(id).map(Self::Device))
    }

    /// Returns `true` if readings of `device_id` pass the filter.
    #[must_use]
    pub fn matches(&self, device_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Device(id) => id.as_str() == device_id,
        }
    }
}

impl std::fmt::Display for DeviceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Device(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn accepts_station_ids() -> crate::Result<()> {
        for id in ["Station-01", "a", "node_7.sensor:2"] {
            assert_eq!(id, DeviceId::new(id)?.as_str());
        }
        Ok(())
    }

    #[test]
    fn rejects_malformed_ids() {
        let too_long = "x".repeat(65);

        for id in ["", "-leading", "has space", "semi;colon", too_long.as_str()] {
            assert!(
                matches!(DeviceId::new(id), Err(Error::InvalidArgument(ref e)) if e.argument == "device_id"),
                "{id:?} should be rejected",
            );
        }
    }

    #[test]
    fn filter_defaults_to_all() -> crate::Result<()> {
        let filter = DeviceFilter::parse(None)?;
        assert_eq!(DeviceFilter::All, filter);
        assert_eq!("all", filter.to_string());
        assert!(filter.matches("anything"));
        Ok(())
    }

    #[test]
    fn filter_single_device() -> crate::Result<()> {
        let filter = DeviceFilter::parse(Some("Station-02"))?;
        assert_eq!("Station-02", filter.to_string());
        assert!(filter.matches("Station-02"));
        assert!(!filter.matches("Station-03"));
        Ok(())
    }
}
