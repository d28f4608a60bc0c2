use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Netflix regions supported by the availability index, as
/// `(two-letter code, index catalog id)` pairs.
const SUPPORTED: &[(&str, &str)] = &[
    ("ar", "21"),
    ("au", "23"),
    ("be", "26"),
    ("br", "29"),
    ("ca", "33"),
    ("cz", "307"),
    ("fr", "45"),
    ("de", "39"),
    ("gr", "327"),
    ("hk", "331"),
    ("hu", "334"),
    ("is", "265"),
    ("in", "337"),
    ("il", "336"),
    ("it", "269"),
    ("jp", "267"),
    ("lt", "357"),
    ("mx", "65"),
    ("nl", "67"),
    ("pl", "392"),
    ("pt", "268"),
    ("ro", "400"),
    ("ru", "402"),
    ("sg", "408"),
    ("sk", "412"),
    ("za", "447"),
    ("kr", "348"),
    ("es", "270"),
    ("se", "73"),
    ("ch", "34"),
    ("th", "425"),
    ("gb", "46"),
    ("us", "78"),
];

/// A validated Netflix region.
///
/// Construction only succeeds for codes in the supported set, so a
/// `Region` value in hand means the configuration check already passed.
/// Validation happens at startup, before any section processing begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    code: &'static str,
    catalog_id: &'static str,
}

impl Region {
    /// The two-letter region code (e.g. `"us"`).
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The availability index's internal id for this region, used in
    /// search query URLs.
    pub fn catalog_id(&self) -> &'static str {
        self.catalog_id
    }

    /// All supported region codes.
    pub fn supported_codes() -> impl Iterator<Item = &'static str> {
        SUPPORTED.iter().map(|(code, _)| *code)
    }
}

impl FromStr for Region {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        SUPPORTED
            .iter()
            .find(|(code, _)| *code == lower)
            .map(|&(code, catalog_id)| Region { code, catalog_id })
            .ok_or_else(|| AppError::UnsupportedRegion(s.to_string()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_codes() {
        let us: Region = "us".parse().unwrap();
        assert_eq!(us.code(), "us");
        assert_eq!(us.catalog_id(), "78");

        let se: Region = "se".parse().unwrap();
        assert_eq!(se.catalog_id(), "73");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let gb: Region = "GB".parse().unwrap();
        assert_eq!(gb.code(), "gb");
        assert_eq!(gb.catalog_id(), "46");
    }

    #[test]
    fn test_parse_unsupported_code_is_fatal() {
        let err = "xx".parse::<Region>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedRegion(_)));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("\"xx\""));
    }

    #[test]
    fn test_supported_codes_complete() {
        let codes: Vec<_> = Region::supported_codes().collect();
        assert_eq!(codes.len(), 33);
        assert!(codes.contains(&"us"));
        assert!(codes.contains(&"cz"));
    }
}
