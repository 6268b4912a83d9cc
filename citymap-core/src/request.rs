use crate::{
    constants::{
        DEFAULT_CIRCLE, DEFAULT_DILATE, DEFAULT_LOCATION, DEFAULT_RADIUS, MAX_DILATE, MAX_RADIUS,
        MIN_RADIUS,
    },
    palette::ColorScheme,
};

use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("location cannot be empty")]
    EmptyLocation,
    #[error("radius {0} is outside the {min}..={max} range", min = MIN_RADIUS, max = MAX_RADIUS)]
    RadiusOutOfRange(u32),
    #[error("dilate {0} exceeds the maximum of {max}", max = MAX_DILATE)]
    DilateOutOfRange(u32),
}

/// A free-text place name, resolved by the geocoder downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(raw: &str) -> Result<Self, RequestError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RequestError::EmptyLocation);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map radius around the location, in metres.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Radius(u32);

impl Radius {
    pub fn new(raw: u32) -> Result<Self, RequestError> {
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&raw) {
            return Err(RequestError::RadiusOutOfRange(raw));
        }

        Ok(Self(raw))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Outward expansion of the boundary before clipping, in metres.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Dilate(u32);

impl Dilate {
    pub fn new(raw: u32) -> Result<Self, RequestError> {
        if raw > MAX_DILATE {
            return Err(RequestError::DilateOutOfRange(raw));
        }

        Ok(Self(raw))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Everything the renderer needs besides layers and styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapRequest {
    location: Location,
    radius: Radius,
    circle: bool,
    dilate: Dilate,
    color_scheme: ColorScheme,
    /// Named backend preset, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<String>,
}

impl MapRequest {
    pub fn new(
        location: Location,
        radius: Radius,
        circle: bool,
        dilate: Dilate,
        color_scheme: ColorScheme,
    ) -> Self {
        Self {
            location,
            radius,
            circle,
            dilate,
            color_scheme,
            preset: None,
        }
    }

    pub fn with_preset(mut self, preset: Option<String>) -> Self {
        self.preset = preset;
        self
    }

    /// Validates raw form values into a request.
    pub fn try_from_raw(
        location: &str,
        radius: u32,
        circle: bool,
        dilate: u32,
        color_scheme: ColorScheme,
    ) -> Result<Self, RequestError> {
        Ok(Self::new(
            Location::new(location)?,
            Radius::new(radius)?,
            circle,
            Dilate::new(dilate)?,
            color_scheme,
        ))
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn radius(&self) -> Radius {
        self.radius
    }

    pub fn circle(&self) -> bool {
        self.circle
    }

    pub fn dilate(&self) -> Dilate {
        self.dilate
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            location: Location(DEFAULT_LOCATION.to_string()),
            radius: Radius(DEFAULT_RADIUS),
            circle: DEFAULT_CIRCLE,
            dilate: Dilate(DEFAULT_DILATE),
            color_scheme: ColorScheme::default(),
            preset: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_radius_bounds() {
        assert!(Radius::new(100).is_ok());
        assert!(Radius::new(5000).is_ok());
        assert_eq!(Radius::new(99), Err(RequestError::RadiusOutOfRange(99)));
        assert_eq!(Radius::new(5001), Err(RequestError::RadiusOutOfRange(5001)));
        assert_eq!(
            RequestError::RadiusOutOfRange(0).to_string(),
            "radius 0 is outside the 100..=5000 range"
        );
    }

    #[test]
    fn test_dilate_bounds() {
        assert_eq!(Dilate::new(0).map(|d| d.get()), Ok(0));
        assert_eq!(Dilate::new(500).map(|d| d.get()), Ok(500));
        assert_eq!(Dilate::new(501), Err(RequestError::DilateOutOfRange(501)));
    }

    #[test]
    fn test_location_is_trimmed() {
        assert_eq!(Location::new("  Paris  ").unwrap().as_str(), "Paris");
        assert_eq!(Location::new("   "), Err(RequestError::EmptyLocation));
        assert_eq!(Location::new(""), Err(RequestError::EmptyLocation));
    }

    #[test]
    fn test_try_from_raw() {
        let request =
            MapRequest::try_from_raw("Lisbon", 2500, false, 50, ColorScheme::Colour).unwrap();

        assert_eq!(request.location().as_str(), "Lisbon");
        assert_eq!(request.radius().get(), 2500);
        assert!(!request.circle());
        assert_eq!(request.dilate().get(), 50);
        assert_eq!(request.color_scheme(), ColorScheme::Colour);

        assert_eq!(
            MapRequest::try_from_raw("Lisbon", 20, true, 0, ColorScheme::Greyscale),
            Err(RequestError::RadiusOutOfRange(20))
        );
    }

    #[test]
    fn test_default_request() {
        let request = MapRequest::default();

        assert_eq!(request.location().as_str(), "Bristol, UK");
        assert_eq!(request.radius().get(), 1000);
        assert!(request.circle());
        assert_eq!(request.dilate().get(), 200);
        assert_eq!(request.color_scheme(), ColorScheme::Greyscale);
    }
}
