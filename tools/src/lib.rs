//! Inspection and debugging tools for EGTS captures.
//!
//! This crate provides utilities for looking at raw telematics traffic:
//!
//! - Split a capture into frames and report where each one starts
//! - Summarize headers, service records and subrecords per frame
//! - Decode frames into structured JSON
//! - Build the acknowledgements a platform would send back
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see why a frame was rejected.

use anyhow::{Context, Result};
use egts::{
    CodecOptions, Counters, Frames, Limits, Packet, PacketHeader, ResultCode, ServiceDataRecord,
};
use serde::Serialize;

/// Reads capture bytes, either raw or as hex text with arbitrary whitespace.
pub fn parse_input(raw: &[u8], hex_input: bool) -> Result<Vec<u8>> {
    if !hex_input {
        return Ok(raw.to_vec());
    }
    let text = std::str::from_utf8(raw).context("hex input is not utf-8")?;
    let digits: String = text.split_whitespace().collect();
    hex::decode(digits).context("parse hex input")
}

/// Position of one frame inside a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSpan {
    pub offset: usize,
    pub len: usize,
}

/// Result of splitting a whole capture.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub total_bytes: usize,
    pub frames: Vec<FrameSpan>,
    /// Framing error that stopped the split, if any.
    pub error: Option<String>,
    /// Offset and length of the rejected bytes.
    pub bad_data: Option<FrameSpan>,
}

/// Splits `bytes` into frames without decoding them.
pub fn split_capture(bytes: &[u8], limits: &Limits) -> SplitReport {
    let mut frames = Frames::with_limits(bytes, limits);
    let mut spans = Vec::new();
    let mut offset = 0;
    let mut error = None;
    let mut bad_data = None;

    while let Some(next) = frames.next() {
        match next {
            Ok(frame) => {
                spans.push(FrameSpan {
                    offset,
                    len: frame.len(),
                });
                offset += frame.len();
            }
            Err(err) => {
                error = Some(err.to_string());
                bad_data = frames.bad_data().map(|data| FrameSpan {
                    offset,
                    len: data.len(),
                });
            }
        }
    }

    SplitReport {
        total_bytes: bytes.len(),
        frames: spans,
        error,
        bad_data,
    }
}

/// One subrecord as listed by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct SubrecordSummary {
    pub tag: u8,
    pub kind: String,
    /// Payload length when re-encoded.
    pub length: Option<u16>,
}

/// One service data record as listed by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub record_number: u16,
    pub source_service: u8,
    pub recipient_service: u8,
    pub object_id: Option<u32>,
    pub subrecords: Vec<SubrecordSummary>,
}

impl RecordSummary {
    fn of(record: &ServiceDataRecord) -> Self {
        Self {
            record_number: record.record_number,
            source_service: record.source_service.raw(),
            recipient_service: record.recipient_service.raw(),
            object_id: record.object_id,
            subrecords: record
                .records
                .iter()
                .map(|sub| {
                    let kind = sub.subrecord_type();
                    SubrecordSummary {
                        tag: kind.raw(),
                        kind: format!("{kind:?}"),
                        length: sub.wire_length().ok(),
                    }
                })
                .collect(),
        }
    }
}

/// Structure and status of one frame.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub span: FrameSpan,
    pub header: Option<PacketHeader>,
    pub records: Vec<RecordSummary>,
    /// Status the platform would report for this frame.
    pub result_code: ResultCode,
    pub error: Option<String>,
}

/// Decodes every frame of a capture and summarizes it.
///
/// Framing errors end the report; the split report says where.
pub fn inspect_capture(bytes: &[u8], options: &CodecOptions) -> Vec<InspectReport> {
    decode_capture(bytes, options)
        .frames
        .into_iter()
        .map(|frame| InspectReport {
            span: frame.span,
            header: frame
                .packet
                .as_ref()
                .map(|packet| packet.header)
                .or(frame.header),
            records: frame
                .packet
                .as_ref()
                .map(|packet| packet.service_records().iter().map(RecordSummary::of).collect())
                .unwrap_or_default(),
            result_code: frame.result_code,
            error: frame.error,
        })
        .collect()
}

/// One decoded frame.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedFrame {
    pub span: FrameSpan,
    pub packet: Option<Packet>,
    /// Verified header of a frame whose body failed to decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PacketHeader>,
    pub result_code: ResultCode,
    pub error: Option<String>,
}

/// Every frame of a capture, decoded.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    pub frames: Vec<DecodedFrame>,
    pub framing_error: Option<String>,
}

pub fn decode_capture(bytes: &[u8], options: &CodecOptions) -> DecodeReport {
    let mut frames = Vec::new();
    let mut framing_error = None;
    let mut offset = 0;

    for next in Frames::with_limits(bytes, options.limits()) {
        let frame = match next {
            Ok(frame) => frame,
            Err(err) => {
                framing_error = Some(err.to_string());
                break;
            }
        };
        let span = FrameSpan {
            offset,
            len: frame.len(),
        };
        offset += frame.len();

        frames.push(match Packet::decode(frame, options) {
            Ok(packet) => DecodedFrame {
                span,
                packet: Some(packet),
                header: None,
                result_code: ResultCode::OK,
                error: None,
            },
            Err(err) => DecodedFrame {
                span,
                packet: None,
                header: err.header,
                result_code: err.result_code(),
                error: Some(err.to_string()),
            },
        });
    }

    DecodeReport {
        frames,
        framing_error,
    }
}

/// Renders a decode report for terminals.
pub fn format_decode_pretty(report: &DecodeReport) -> String {
    let mut out = String::new();
    for frame in &report.frames {
        out.push_str(&format!(
            "== frame @{} ({} bytes): {} ==\n",
            frame.span.offset, frame.span.len, frame.result_code
        ));
        if let Some(packet) = &frame.packet {
            out.push_str(&format!("{packet:#?}\n"));
        }
        if let Some(error) = &frame.error {
            out.push_str(&format!("error: {error}\n"));
        }
    }
    if let Some(error) = &report.framing_error {
        out.push_str(&format!("framing error: {error}\n"));
    }
    out
}

/// Builds the responses a platform would send for every frame.
///
/// Frames that fail after their header was verified are answered with the
/// failure's result code; frames with an untrusted header get nothing.
pub fn respond_capture(
    bytes: &[u8],
    options: &CodecOptions,
    counters: &Counters,
) -> Result<Vec<Vec<u8>>> {
    let mut responses = Vec::new();
    for (index, frame) in Frames::with_limits(bytes, options.limits()).enumerate() {
        let frame = frame.with_context(|| format!("split frame #{index}"))?;
        let response = match Packet::decode(frame, options) {
            Ok(packet) => packet
                .response(counters)
                .with_context(|| format!("build response for frame #{index}"))?,
            Err(err) => {
                tracing::info!(index, %err, "answering rejected frame");
                err.response(counters)
                    .with_context(|| format!("build error response for frame #{index}"))?
                    .unwrap_or_default()
            }
        };
        if !response.is_empty() {
            responses.push(response);
        }
    }
    Ok(responses)
}
