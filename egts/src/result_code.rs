//! Protocol status codes reported back to terminals.

use std::fmt;

/// An 8-bit processing result placed in response packets.
///
/// Only the named constants are defined by the protocol; any other value
/// decoded from the wire is carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResultCode(u8);

impl ResultCode {
    /// Processed successfully.
    pub const OK: Self = Self(0);
    /// Processing in progress.
    pub const IN_PROGRESS: Self = Self(1);
    /// Unsupported protocol.
    pub const UNS_PROTOCOL: Self = Self(128);
    /// Decryption error.
    pub const DECRYPT_ERROR: Self = Self(129);
    /// Processing denied.
    pub const PROC_DENIED: Self = Self(130);
    /// Incorrect header format.
    pub const INC_HEADERFORM: Self = Self(131);
    /// Incorrect data format.
    pub const INC_DATAFORM: Self = Self(132);
    /// Unsupported type.
    pub const UNS_TYPE: Self = Self(133);
    /// Wrong number of parameters.
    pub const NOTEN_PARAMS: Self = Self(134);
    /// Repeated processing attempt.
    pub const DBL_PROC: Self = Self(135);
    /// Source data processing denied.
    pub const PROC_SRC_DENIED: Self = Self(136);
    /// Header checksum error.
    pub const HEADERCRC_ERROR: Self = Self(137);
    /// Data checksum error.
    pub const DATACRC_ERROR: Self = Self(138);
    /// Incorrect data length.
    pub const INVDATALEN: Self = Self(139);
    /// Route not found.
    pub const ROUTE_NFOUND: Self = Self(140);
    /// Route closed.
    pub const ROUTE_CLOSED: Self = Self(141);
    /// Routing denied.
    pub const ROUTE_DENIED: Self = Self(142);
    /// Invalid address.
    pub const INVADDR: Self = Self(143);
    /// Retransmission limit exceeded.
    pub const TTLEXPIRED: Self = Self(144);
    /// No acknowledgement.
    pub const NO_ACK: Self = Self(145);
    /// Object not found.
    pub const OBJ_NFOUND: Self = Self(146);
    /// Event not found.
    pub const EVNT_NFOUND: Self = Self(147);
    /// Service not found.
    pub const SRVC_NFOUND: Self = Self(148);
    /// Service denied.
    pub const SRVC_DENIED: Self = Self(149);
    /// Unknown service type.
    pub const SRVC_UNKN: Self = Self(150);
    /// Authorization denied.
    pub const AUTH_DENIED: Self = Self(151);
    /// Object already exists.
    pub const ALREADY_EXISTS: Self = Self(152);
    /// Identifier not found.
    pub const ID_NFOUND: Self = Self(153);
    /// Incorrect date and time.
    pub const INC_DATETIME: Self = Self(154);
    /// Input/output error.
    pub const IO_ERROR: Self = Self(155);
    /// Insufficient resources.
    pub const NO_RES_AVAIL: Self = Self(156);
    /// Module internal fault.
    pub const MODULE_FAULT: Self = Self(157);
    /// Module power circuit fault.
    pub const MODULE_PWR_FLT: Self = Self(158);
    /// Module microcontroller fault.
    pub const MODULE_PROC_FLT: Self = Self(159);
    /// Module software fault.
    pub const MODULE_SW_FLT: Self = Self(160);
    /// Module firmware fault.
    pub const MODULE_FW_FLT: Self = Self(161);
    /// Module input/output fault.
    pub const MODULE_IO_FLT: Self = Self(162);
    /// Module memory fault.
    pub const MODULE_MEM_FLT: Self = Self(163);
    /// Test failed.
    pub const TEST_FAILED: Self = Self(164);

    const NAMES: [(Self, &'static str); 39] = [
        (Self::OK, "OK"),
        (Self::IN_PROGRESS, "IN_PROGRESS"),
        (Self::UNS_PROTOCOL, "UNS_PROTOCOL"),
        (Self::DECRYPT_ERROR, "DECRYPT_ERROR"),
        (Self::PROC_DENIED, "PROC_DENIED"),
        (Self::INC_HEADERFORM, "INC_HEADERFORM"),
        (Self::INC_DATAFORM, "INC_DATAFORM"),
        (Self::UNS_TYPE, "UNS_TYPE"),
        (Self::NOTEN_PARAMS, "NOTEN_PARAMS"),
        (Self::DBL_PROC, "DBL_PROC"),
        (Self::PROC_SRC_DENIED, "PROC_SRC_DENIED"),
        (Self::HEADERCRC_ERROR, "HEADERCRC_ERROR"),
        (Self::DATACRC_ERROR, "DATACRC_ERROR"),
        (Self::INVDATALEN, "INVDATALEN"),
        (Self::ROUTE_NFOUND, "ROUTE_NFOUND"),
        (Self::ROUTE_CLOSED, "ROUTE_CLOSED"),
        (Self::ROUTE_DENIED, "ROUTE_DENIED"),
        (Self::INVADDR, "INVADDR"),
        (Self::TTLEXPIRED, "TTLEXPIRED"),
        (Self::NO_ACK, "NO_ACK"),
        (Self::OBJ_NFOUND, "OBJ_NFOUND"),
        (Self::EVNT_NFOUND, "EVNT_NFOUND"),
        (Self::SRVC_NFOUND, "SRVC_NFOUND"),
        (Self::SRVC_DENIED, "SRVC_DENIED"),
        (Self::SRVC_UNKN, "SRVC_UNKN"),
        (Self::AUTH_DENIED, "AUTH_DENIED"),
        (Self::ALREADY_EXISTS, "ALREADY_EXISTS"),
        (Self::ID_NFOUND, "ID_NFOUND"),
        (Self::INC_DATETIME, "INC_DATETIME"),
        (Self::IO_ERROR, "IO_ERROR"),
        (Self::NO_RES_AVAIL, "NO_RES_AVAIL"),
        (Self::MODULE_FAULT, "MODULE_FAULT"),
        (Self::MODULE_PWR_FLT, "MODULE_PWR_FLT"),
        (Self::MODULE_PROC_FLT, "MODULE_PROC_FLT"),
        (Self::MODULE_SW_FLT, "MODULE_SW_FLT"),
        (Self::MODULE_FW_FLT, "MODULE_FW_FLT"),
        (Self::MODULE_IO_FLT, "MODULE_IO_FLT"),
        (Self::MODULE_MEM_FLT, "MODULE_MEM_FLT"),
        (Self::TEST_FAILED, "TEST_FAILED"),
    ];

    /// Creates a result code from its wire value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` for [`ResultCode::OK`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK.0
    }

    /// Returns the protocol name of a defined code.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, name)| *name)
    }

    /// Iterates over every code the protocol defines.
    pub fn defined() -> impl Iterator<Item = Self> {
        Self::NAMES.iter().map(|(code, _)| *code)
    }
}

impl From<u8> for ResultCode {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<ResultCode> for u8 {
    fn from(code: ResultCode) -> Self {
        code.0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "UNKNOWN ({})", self.0),
        }
    }
}
