//! Small protocol enumerations shared by the packet and record layers.

use std::fmt;

/// Transport packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PacketType {
    /// Acknowledgement of a previously received packet.
    Response = 0,
    /// Application data.
    AppData = 1,
    /// Application data with a digital signature.
    SignedAppData = 2,
}

impl PacketType {
    /// Parses a packet type from its wire value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Response),
            1 => Some(Self::AppData),
            2 => Some(Self::SignedAppData),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Response => "EGTS_PT_RESPONSE",
            Self::AppData => "EGTS_PT_APPDATA",
            Self::SignedAppData => "EGTS_PT_SIGNED_APPDATA",
        };
        f.write_str(name)
    }
}

/// Two-bit routing priority used by packets and service records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Priority {
    /// `00`
    #[default]
    Highest = 0,
    /// `01`
    High = 1,
    /// `10`
    Normal = 2,
    /// `11`
    Low = 3,
}

impl Priority {
    /// Builds a priority from the low two bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Highest,
            1 => Self::High,
            2 => Self::Normal,
            _ => Self::Low,
        }
    }

    /// Returns the two-bit wire value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Service type carried in the source/recipient fields of a service record.
///
/// Values without a named constant are preserved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ServiceType(u8);

impl ServiceType {
    /// No service.
    pub const UNDEFINED: Self = Self(0);
    /// Authentication service.
    pub const AUTH: Self = Self(1);
    /// Telematics data service.
    pub const TELEDATA: Self = Self(2);
    /// Commands service.
    pub const COMMANDS: Self = Self(4);
    /// Firmware update service.
    pub const FIRMWARE: Self = Self(9);
    /// Emergency call service.
    pub const ECALL: Self = Self(10);

    /// Creates a service type from its wire value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<u8> for ServiceType {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}
