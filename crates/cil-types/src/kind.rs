use std::fmt;

use serde::{Deserialize, Serialize};

/// Origin of a tracked debt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebtKind {
    /// A product sale paid partially at the counter.
    Sale,
    /// A service (repair) transaction paid partially at pickup.
    Service,
}

impl DebtKind {
    /// Stable lowercase code for persisted-state mappings.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sale => "Sale",
            Self::Service => "Service",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DebtKind::Sale.code(), "sale");
        assert_eq!(DebtKind::Service.code(), "service");
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", DebtKind::Sale), "Sale");
        assert_eq!(format!("{}", DebtKind::Service), "Service");
    }

    #[test]
    fn serde_roundtrip() {
        let kind = DebtKind::Service;
        let json = serde_json::to_string(&kind).unwrap();
        let parsed: DebtKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);
    }
}
