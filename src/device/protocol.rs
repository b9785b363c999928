use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport scheme used to reach the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TLS without certificate verification; modems ship self-signed certs
    Https,
    Http,
}

impl Protocol {
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Https => "https",
            Protocol::Http => "http",
        }
    }

    /// The scheme to try after a transport failure
    pub fn toggled(self) -> Self {
        match self {
            Protocol::Https => Protocol::Http,
            Protocol::Http => Protocol::Https,
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Https
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "https" => Ok(Protocol::Https),
            "http" => Ok(Protocol::Http),
            other => Err(format!("unknown protocol: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_an_involution() {
        assert_eq!(Protocol::Https.toggled(), Protocol::Http);
        assert_eq!(Protocol::Http.toggled(), Protocol::Https);
        assert_eq!(Protocol::Https.toggled().toggled(), Protocol::Https);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("HTTP".parse::<Protocol>(), Ok(Protocol::Http));
        assert_eq!("https".parse::<Protocol>(), Ok(Protocol::Https));
        assert!("ftp".parse::<Protocol>().is_err());
    }
}
