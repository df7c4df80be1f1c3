//! Splitting a byte stream into transport frames.
//!
//! The splitter keeps no state between calls apart from the last rejected
//! bytes, so a connection reader can call it after every partial read with
//! the whole unconsumed buffer.

use tracing::{trace, warn};

use crate::error::FrameError;
use crate::limits::Limits;
use crate::packet::{frame_len, HEADER_LEN, PROTOCOL_VERSION};

/// Bytes needed to read the header length and frame data length fields.
const LENGTH_PREFIX: usize = 10;

/// Outcome of one [`FrameSplitter::split`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Bytes the caller should drop from the front of its buffer.
    pub consumed: usize,
    /// The complete frame, if one was found.
    pub frame: Option<&'a [u8]>,
}

impl<'a> Split<'a> {
    /// No frame yet; read more input.
    pub const NEED_MORE: Self = Self {
        consumed: 0,
        frame: None,
    };

    const fn frame(frame: &'a [u8]) -> Self {
        Self {
            consumed: frame.len(),
            frame: Some(frame),
        }
    }
}

/// Framing contract for a protocol carried over a byte stream.
pub trait FrameSplitter {
    /// Inspects the unconsumed buffer and returns at most one frame.
    ///
    /// `at_eof` is `true` once the stream has ended and `buf` will not grow.
    fn split<'a>(&mut self, buf: &'a [u8], at_eof: bool) -> Result<Split<'a>, FrameError>;

    /// Bytes behind the last rejection, for logging.
    fn bad_data(&self) -> Option<&[u8]>;
}

/// State of the buffer as seen by [`EgtsSplitter::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameState {
    /// The stream ended cleanly.
    Done,
    /// Not enough bytes to read the declared lengths.
    WaitingForHeader,
    /// The lengths are known but the frame is incomplete.
    WaitingForBody { needed: usize },
    /// A complete frame of this many bytes starts the buffer.
    Emit(usize),
    /// The buffer cannot continue as a valid stream.
    Reject(FrameError),
}

/// EGTS frame splitter.
#[derive(Debug, Clone)]
pub struct EgtsSplitter {
    max_frame_bytes: usize,
    bad_data: Option<Vec<u8>>,
}

impl Default for EgtsSplitter {
    fn default() -> Self {
        Self::with_limits(&Limits::default())
    }
}

impl EgtsSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a splitter enforcing `limits.max_frame_bytes`.
    #[must_use]
    pub const fn with_limits(limits: &Limits) -> Self {
        Self {
            max_frame_bytes: limits.max_frame_bytes,
            bad_data: None,
        }
    }

    /// Classifies the buffer without consuming anything.
    pub fn classify(&self, buf: &[u8], at_eof: bool) -> FrameState {
        if buf.is_empty() && at_eof {
            return FrameState::Done;
        }
        if buf.len() > 1 && buf[0] != PROTOCOL_VERSION {
            return FrameState::Reject(FrameError::InconsistentData { len: buf.len() });
        }
        if buf.len() < LENGTH_PREFIX {
            return if at_eof {
                FrameState::Reject(FrameError::TruncatedTail {
                    needed: HEADER_LEN,
                    available: buf.len(),
                })
            } else {
                FrameState::WaitingForHeader
            };
        }

        let header_len = usize::from(buf[3]);
        if header_len < HEADER_LEN {
            return FrameState::Reject(FrameError::InconsistentData { len: buf.len() });
        }
        let frame_data_length = usize::from(u16::from_le_bytes([buf[5], buf[6]]));
        let total = frame_len(header_len, frame_data_length);
        if total > self.max_frame_bytes {
            return FrameState::Reject(FrameError::FrameTooLarge {
                len: total,
                limit: self.max_frame_bytes,
            });
        }
        if buf.len() >= total {
            FrameState::Emit(total)
        } else if at_eof {
            FrameState::Reject(FrameError::TruncatedTail {
                needed: total,
                available: buf.len(),
            })
        } else {
            FrameState::WaitingForBody {
                needed: total - buf.len(),
            }
        }
    }
}

impl FrameSplitter for EgtsSplitter {
    fn split<'a>(&mut self, buf: &'a [u8], at_eof: bool) -> Result<Split<'a>, FrameError> {
        match self.classify(buf, at_eof) {
            FrameState::Done | FrameState::WaitingForHeader | FrameState::WaitingForBody { .. } => {
                Ok(Split::NEED_MORE)
            }
            FrameState::Emit(len) => {
                trace!(len, "frame");
                Ok(Split::frame(&buf[..len]))
            }
            FrameState::Reject(err) => {
                warn!(len = buf.len(), %err, "rejecting stream data");
                self.bad_data = Some(buf.to_vec());
                Err(err)
            }
        }
    }

    fn bad_data(&self) -> Option<&[u8]> {
        self.bad_data.as_deref()
    }
}

/// Iterator over the frames of a complete capture.
///
/// Stops after the first framing error.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    rest: &'a [u8],
    splitter: EgtsSplitter,
    failed: bool,
}

impl<'a> Frames<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, &Limits::default())
    }

    #[must_use]
    pub const fn with_limits(buf: &'a [u8], limits: &Limits) -> Self {
        Self {
            rest: buf,
            splitter: EgtsSplitter::with_limits(limits),
            failed: false,
        }
    }

    /// Bytes not yet returned as frames.
    #[must_use]
    pub const fn remaining(&self) -> &'a [u8] {
        self.rest
    }

    /// Bytes behind the framing error, if one occurred.
    #[must_use]
    pub fn bad_data(&self) -> Option<&[u8]> {
        self.splitter.bad_data()
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<&'a [u8], FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.splitter.split(self.rest, true) {
            Ok(Split {
                consumed,
                frame: Some(frame),
            }) => {
                self.rest = &self.rest[consumed..];
                Some(Ok(frame))
            }
            Ok(Split { frame: None, .. }) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
