//! Client command parsing (`L`, `I`, `C<ID>…`, `M<ID>…`, `R<ID>[<FF>]`) and
//! device message parsing (identification / sensor frames).
//!
//! Both parsers are total and panic-free: anything that doesn't match a
//! known shape simply parses to `None`, which callers treat as "drop this
//! frame silently" per the protocol's failure semantics.

use crate::device_id::DeviceId;

/// A parsed client command, borrowing the original frame text where the
/// complete frame (plus a trailing newline) needs to be forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    /// `L` — list registered device IDs.
    List,
    /// `I` — ping every registered device.
    IdentifyAll,
    /// `C<ID>…` or `M<ID>…` — forward the whole frame to `target` unchanged.
    Forward { target: DeviceId, frame: &'a str },
    /// `R<ID>` — one-shot sample request, no subscription change.
    RequestOnce { target: DeviceId, frame: &'a str },
    /// `R<ID><FF>` — streaming request; `subscribe` is `false` when `<FF>` is `00`.
    RequestStream {
        target: DeviceId,
        frame: &'a str,
        subscribe: bool,
    },
}

/// Parses one client frame. `frame` must already be a single line with no
/// `\r`/`\n` (see [`crate::frame::split_frames`]).
pub fn parse_client_command(frame: &str) -> Option<ClientCommand<'_>> {
    let mut chars = frame.chars();
    let letter = chars.next()?;
    match letter {
        'L' if frame.len() == 1 => Some(ClientCommand::List),
        'I' if frame.len() == 1 => Some(ClientCommand::IdentifyAll),
        'C' | 'M' => {
            let target = DeviceId::parse(frame.get(1..5)?)?;
            Some(ClientCommand::Forward { target, frame })
        }
        'R' => parse_request(frame),
        _ => None,
    }
}

fn parse_request(frame: &str) -> Option<ClientCommand<'_>> {
    let target = DeviceId::parse(frame.get(1..5)?)?;
    match frame.len() {
        5 => Some(ClientCommand::RequestOnce { target, frame }),
        7 => {
            let freq = frame.get(5..7)?;
            if !freq.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let subscribe = !freq.eq_ignore_ascii_case("00");
            Some(ClientCommand::RequestStream {
                target,
                frame,
                subscribe,
            })
        }
        _ => None,
    }
}

/// A parsed device frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage<'a> {
    /// A bare 4-hex-char identification frame.
    Identify(DeviceId),
    /// An 18-hex-char sensor frame: `id(4) | aX(2) | aY(2) | aZ(2) | rssi(8)`.
    /// The hub routes on `device_id` alone; it does not decode the rest.
    Sensor { device_id: DeviceId, frame: &'a str },
}

/// Parses one device frame.
pub fn parse_device_message(frame: &str) -> Option<DeviceMessage<'_>> {
    if frame.len() == 4 {
        return DeviceId::parse(frame).map(DeviceMessage::Identify);
    }
    if frame.len() == 18 && frame.bytes().all(|b| b.is_ascii_hexdigit()) {
        let device_id = DeviceId::parse(&frame[..4])?;
        return Some(DeviceMessage::Sensor { device_id, frame });
    }
    None
}
