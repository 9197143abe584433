// Region endpoint sets
//
// The portal is deployed per region; each region has its own web host
// plus a shared OAuth token host. Only EU is live today.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::error::Error;

/// A vendor deployment region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// `app-eu.kodaksmarthome.com`
    Eu,
}

/// Returned when parsing a region code the portal does not serve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not supported")]
pub struct UnsupportedRegion(pub String);

impl Region {
    /// Every region the client knows about.
    pub const ALL: &'static [Self] = &[Self::Eu];

    /// The short region code used in configuration (`"EU"`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Eu => "EU",
        }
    }

    /// The fixed endpoint set for this region.
    pub fn endpoints(self) -> Result<Endpoints, Error> {
        match self {
            Self::Eu => Endpoints::new(
                "https://app-eu.kodaksmarthome.com/web",
                "https://api-t01-r3.perimetersafe.com/v1/oauth/token",
            ),
        }
    }
}

impl FromStr for Region {
    type Err = UnsupportedRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedRegion(s.to_owned()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolved URLs for one deployment.
///
/// Only the web base and the token URL are independent; every other
/// endpoint hangs off the web base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    web: Url,
    token: Url,
    origin: String,
}

impl Endpoints {
    /// Build an endpoint set from a web base (e.g.
    /// `https://app-eu.kodaksmarthome.com/web`) and an OAuth token URL.
    pub fn new(web: &str, token: &str) -> Result<Self, Error> {
        let web = Url::parse(web.trim_end_matches('/'))?;
        let token = Url::parse(token)?;
        let origin = web.origin().ascii_serialization();
        Ok(Self { web, token, origin })
    }

    /// The web application base.
    pub fn web(&self) -> &Url {
        &self.web
    }

    /// `POST` target of the password grant, also probed with `OPTIONS`.
    pub fn token(&self) -> &Url {
        &self.token
    }

    /// Scheme + host of the web application, sent as `Origin`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Sent as `Referer`.
    pub fn referer(&self) -> String {
        format!("{}/", self.web_base())
    }

    /// `{web}/authenticate`
    pub fn authenticate(&self) -> Result<Url, Error> {
        self.web_url("authenticate")
    }

    /// `{web}/user/device`
    pub fn devices(&self) -> Result<Url, Error> {
        self.web_url("user/device")
    }

    /// `{web}/user/device/event`
    pub fn device_events(&self) -> Result<Url, Error> {
        self.web_url("user/device/event")
    }

    /// `{web}/#/user/logout`
    pub fn logout(&self) -> Result<Url, Error> {
        self.web_url("#/user/logout")
    }

    fn web_base(&self) -> &str {
        self.web.as_str().trim_end_matches('/')
    }

    fn web_url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}/{path}", self.web_base()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_region_case_insensitively() {
        assert_eq!("EU".parse::<Region>(), Ok(Region::Eu));
        assert_eq!("eu".parse::<Region>(), Ok(Region::Eu));
        assert_eq!(Region::Eu.to_string(), "EU");
    }

    #[test]
    fn rejects_unknown_region() {
        assert_eq!(
            "BR".parse::<Region>(),
            Err(UnsupportedRegion("BR".into()))
        );
    }

    #[test]
    fn derives_endpoints_from_web_base() -> Result<(), Error> {
        let endpoints = Region::Eu.endpoints()?;
        assert_eq!(endpoints.origin(), "https://app-eu.kodaksmarthome.com");
        assert_eq!(
            endpoints.referer(),
            "https://app-eu.kodaksmarthome.com/web/"
        );
        assert_eq!(
            endpoints.authenticate()?.as_str(),
            "https://app-eu.kodaksmarthome.com/web/authenticate"
        );
        assert_eq!(
            endpoints.devices()?.as_str(),
            "https://app-eu.kodaksmarthome.com/web/user/device"
        );
        assert_eq!(
            endpoints.device_events()?.as_str(),
            "https://app-eu.kodaksmarthome.com/web/user/device/event"
        );
        assert_eq!(
            endpoints.token().as_str(),
            "https://api-t01-r3.perimetersafe.com/v1/oauth/token"
        );
        Ok(())
    }

    #[test]
    fn trailing_slash_on_web_base_is_ignored() -> Result<(), Error> {
        let endpoints = Endpoints::new("http://127.0.0.1:8080/web/", "http://127.0.0.1:8080/token")?;
        assert_eq!(
            endpoints.devices()?.as_str(),
            "http://127.0.0.1:8080/web/user/device"
        );
        assert_eq!(endpoints.origin(), "http://127.0.0.1:8080");
        Ok(())
    }
}
