//! Messages carried on the bridge link
//!
//! Controller → bridge: session setup, publishes and subscriptions.
//! Bridge → controller: link status, inbound messages and update progress.

use heapless::{String, Vec};

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

// Message type IDs: controller → bridge
pub const MSG_CONNECT: u8 = 0x01;
pub const MSG_PUBLISH: u8 = 0x02;
pub const MSG_SUBSCRIBE: u8 = 0x03;

// Message type IDs: bridge → controller
pub const MSG_LINK_STATUS: u8 = 0x81;
pub const MSG_INBOUND: u8 = 0x82;
pub const MSG_UPDATE: u8 = 0x83;

/// Longest topic carried on the link
pub const MAX_TOPIC_LEN: usize = 64;
/// Longest message body carried on the link
pub const MAX_BODY_LEN: usize = 64;

const FLAG_RETAINED: u8 = 0x01;

const UPDATE_STARTED: u8 = 0;
const UPDATE_PROGRESS: u8 = 1;
const UPDATE_FINISHED: u8 = 2;

type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

fn put(out: &mut Payload, bytes: &[u8]) -> Result<(), FrameError> {
    out.extend_from_slice(bytes)
        .map_err(|_| FrameError::PayloadTooLarge)
}

fn put_str(out: &mut Payload, s: &str) -> Result<(), FrameError> {
    let len = u8::try_from(s.len()).map_err(|_| FrameError::PayloadTooLarge)?;
    put(out, &[len])?;
    put(out, s.as_bytes())
}

/// Sequential reader over a frame payload
struct Fields<'a> {
    buf: &'a [u8],
}

impl<'a> Fields<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn byte(&mut self) -> Result<u8, FrameError> {
        let (&b, rest) = self.buf.split_first().ok_or(FrameError::Truncated)?;
        self.buf = rest;
        Ok(b)
    }

    fn str<const N: usize>(&mut self) -> Result<String<N>, FrameError> {
        let len = self.byte()? as usize;
        if self.buf.len() < len {
            return Err(FrameError::Truncated);
        }
        let (head, rest) = self.buf.split_at(len);
        self.buf = rest;
        let text = core::str::from_utf8(head).map_err(|_| FrameError::InvalidField)?;
        String::try_from(text).map_err(|_| FrameError::InvalidField)
    }

    fn rest<const N: usize>(&mut self) -> Result<Vec<u8, N>, FrameError> {
        let body = Vec::from_slice(self.buf).map_err(|_| FrameError::InvalidField)?;
        self.buf = &[];
        Ok(body)
    }
}

/// Messages from the controller to the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerMessage<'a> {
    /// Open a broker session with a last will
    Connect {
        client_id: &'a str,
        will_topic: &'a str,
        will_payload: &'a [u8],
    },
    /// Publish a message
    Publish {
        retained: bool,
        topic: &'a str,
        payload: &'a [u8],
    },
    /// Subscribe to a topic
    Subscribe { qos: u8, topic: &'a str },
}

impl ControllerMessage<'_> {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut payload = Payload::new();
        let msg_type = match self {
            ControllerMessage::Connect {
                client_id,
                will_topic,
                will_payload,
            } => {
                put_str(&mut payload, client_id)?;
                put_str(&mut payload, will_topic)?;
                put(&mut payload, will_payload)?;
                MSG_CONNECT
            }
            ControllerMessage::Publish {
                retained,
                topic,
                payload: body,
            } => {
                put(&mut payload, &[if *retained { FLAG_RETAINED } else { 0 }])?;
                put_str(&mut payload, topic)?;
                put(&mut payload, body)?;
                MSG_PUBLISH
            }
            ControllerMessage::Subscribe { qos, topic } => {
                put(&mut payload, &[*qos])?;
                put_str(&mut payload, topic)?;
                MSG_SUBSCRIBE
            }
        };
        Frame::new(msg_type, &payload)
    }
}

/// Firmware update progress reported by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateEvent {
    /// An image transfer has begun
    Started,
    /// Transfer progress in percent
    Progress(u8),
    /// Transfer ended; `true` when the image was accepted
    Finished(bool),
}

/// Messages from the bridge to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeMessage {
    /// Broker session state changed
    LinkStatus { connected: bool },
    /// A message arrived on a subscribed topic
    Inbound {
        topic: String<MAX_TOPIC_LEN>,
        payload: Vec<u8, MAX_BODY_LEN>,
    },
    /// Firmware update progress
    Update(UpdateEvent),
}

impl BridgeMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let mut fields = Fields::new(&frame.payload);
        match frame.msg_type {
            MSG_LINK_STATUS => Ok(BridgeMessage::LinkStatus {
                connected: fields.byte()? != 0,
            }),
            MSG_INBOUND => {
                let topic = fields.str()?;
                let payload = fields.rest()?;
                Ok(BridgeMessage::Inbound { topic, payload })
            }
            MSG_UPDATE => {
                let event = match fields.byte()? {
                    UPDATE_STARTED => UpdateEvent::Started,
                    UPDATE_PROGRESS => UpdateEvent::Progress(fields.byte()?.min(100)),
                    UPDATE_FINISHED => UpdateEvent::Finished(fields.byte()? != 0),
                    _ => return Err(FrameError::InvalidField),
                };
                Ok(BridgeMessage::Update(event))
            }
            other => Err(FrameError::UnknownType(other)),
        }
    }

    /// Encode this message into a frame (bridge side and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut payload = Payload::new();
        let msg_type = match self {
            BridgeMessage::LinkStatus { connected } => {
                put(&mut payload, &[*connected as u8])?;
                MSG_LINK_STATUS
            }
            BridgeMessage::Inbound { topic, payload: body } => {
                put_str(&mut payload, topic)?;
                put(&mut payload, body)?;
                MSG_INBOUND
            }
            BridgeMessage::Update(event) => {
                let bytes = match event {
                    UpdateEvent::Started => [UPDATE_STARTED, 0],
                    UpdateEvent::Progress(pct) => [UPDATE_PROGRESS, *pct],
                    UpdateEvent::Finished(ok) => [UPDATE_FINISHED, *ok as u8],
                };
                put(&mut payload, &bytes)?;
                MSG_UPDATE
            }
        };
        Frame::new(msg_type, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_layout() {
        let frame = ControllerMessage::Publish {
            retained: true,
            topic: "dev/roller/status",
            payload: b"online",
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.msg_type, MSG_PUBLISH);
        assert_eq!(frame.payload[0], FLAG_RETAINED);
        assert_eq!(frame.payload[1], 17);
        assert_eq!(&frame.payload[2..19], b"dev/roller/status");
        assert_eq!(&frame.payload[19..], b"online");
    }

    #[test]
    fn test_connect_layout() {
        let frame = ControllerMessage::Connect {
            client_id: "roller",
            will_topic: "s",
            will_payload: b"offline",
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.msg_type, MSG_CONNECT);
        assert_eq!(frame.payload[0], 6);
        assert_eq!(&frame.payload[1..7], b"roller");
        assert_eq!(&frame.payload[7..9], &[1, b's']);
        assert_eq!(&frame.payload[9..], b"offline");
    }

    #[test]
    fn test_subscribe_layout() {
        let frame = ControllerMessage::Subscribe {
            qos: 0,
            topic: "a/b",
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame.msg_type, MSG_SUBSCRIBE);
        assert_eq!(frame.payload.as_slice(), &[0, 3, b'a', b'/', b'b']);
    }

    #[test]
    fn test_inbound_parse() {
        let frame = Frame::new(MSG_INBOUND, &[3, b'x', b'/', b'y', b'O', b'N']).unwrap();
        match BridgeMessage::from_frame(&frame).unwrap() {
            BridgeMessage::Inbound { topic, payload } => {
                assert_eq!(topic.as_str(), "x/y");
                assert_eq!(payload.as_slice(), b"ON");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_inbound_truncated_topic() {
        let frame = Frame::new(MSG_INBOUND, &[10, b'x']).unwrap();
        assert_eq!(BridgeMessage::from_frame(&frame), Err(FrameError::Truncated));
    }

    #[test]
    fn test_inbound_body_too_long() {
        let mut raw = [b'z'; 70];
        raw[0] = 1;
        let frame = Frame::new(MSG_INBOUND, &raw).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&frame),
            Err(FrameError::InvalidField)
        );
    }

    #[test]
    fn test_link_status_and_update() {
        let up = Frame::new(MSG_LINK_STATUS, &[1]).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&up),
            Ok(BridgeMessage::LinkStatus { connected: true })
        );

        let progress = Frame::new(MSG_UPDATE, &[UPDATE_PROGRESS, 250]).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&progress),
            Ok(BridgeMessage::Update(UpdateEvent::Progress(100)))
        );

        let bad = Frame::new(MSG_UPDATE, &[9, 0]).unwrap();
        assert_eq!(
            BridgeMessage::from_frame(&bad),
            Err(FrameError::InvalidField)
        );
    }

    #[test]
    fn test_unknown_type() {
        let frame = Frame::empty(0x7F);
        assert_eq!(
            BridgeMessage::from_frame(&frame),
            Err(FrameError::UnknownType(0x7F))
        );
    }

    #[test]
    fn test_bridge_message_through_frame() {
        let original = BridgeMessage::Update(UpdateEvent::Finished(false));
        let frame = original.to_frame().unwrap();
        assert_eq!(BridgeMessage::from_frame(&frame), Ok(original));
    }
}
