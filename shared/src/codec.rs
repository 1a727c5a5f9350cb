//! Radio frame codec
//!
//! All frames are laid out as:
//! ```text
//! [ 1 byte: tag ][ 8 bytes: target address, LE (commands only) ][ payload ]
//! ```
//!
//! Multi-byte fields are little-endian. The frame length is fixed by the tag
//! except for LCD text, compound LED strip chunks and user topics; decoding
//! checks the length before touching the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::address::DeviceAddress;
use crate::color::Color;
use crate::compound::CompoundChunk;
use crate::frame::{
    BatteryFormat, Brightness, Effect, EffectKind, Frame, LcdButton, LcdText, MagnetChannel, Pulse,
    RelayChannel, RelayState, Request, SensorChannel, Telemetry, ThermometerScale,
};
use crate::tag::{Layout, MessageTag};

/// Errors that can occur while decoding a frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty frame")]
    Empty,

    #[error("unknown tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("{tag:?} frame has {actual} bytes, layout requires {expected:?}")]
    BadLength {
        tag: MessageTag,
        expected: Layout,
        actual: usize,
    },

    #[error("{tag:?} frame has invalid `{field}`")]
    InvalidField {
        tag: MessageTag,
        field: &'static str,
    },
}

type DecodeFn = fn(MessageTag, &mut &[u8]) -> Result<Frame, DecodeError>;

/// Encode a frame into a freshly allocated buffer
pub fn encode(frame: &Frame) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    encode_into(frame, &mut buf);
    buf.freeze()
}

/// Encode a frame, appending to `buf`
pub fn encode_into(frame: &Frame, buf: &mut BytesMut) {
    buf.put_u8(frame.tag().byte());
    match frame {
        Frame::Command { target, request } => {
            buf.put_u64_le(target.raw());
            encode_request(request, buf);
        }
        Frame::Telemetry(telemetry) => encode_telemetry(telemetry, buf),
    }
}

fn encode_request(request: &Request, buf: &mut BytesMut) {
    match request {
        Request::LedSet { state }
        | Request::RelayPowerSet { state }
        | Request::ModuleRelaySet { state, .. } => buf.put_u8(u8::from(*state)),
        Request::LedGet
        | Request::RelayPowerGet
        | Request::ModuleRelayGet { .. }
        | Request::LcdScreenClear => {}
        Request::ModuleRelayPulse { pulse, .. } => {
            buf.put_u8(u8::from(pulse.direction));
            buf.put_i32_le(pulse.duration_ms);
        }
        Request::LcdTextSet(text) => {
            buf.put_i8(text.x);
            buf.put_i8(text.y);
            buf.put_u8(text.font);
            buf.put_u8(u8::from(text.color));
            buf.put_u8(text.text().len() as u8);
            buf.put_slice(text.text().as_bytes());
            buf.put_u8(0);
        }
        Request::LedStripColorSet(color) => {
            buf.put_u8(color.r);
            buf.put_u8(color.g);
            buf.put_u8(color.b);
            buf.put_u8(color.w);
        }
        Request::LedStripBrightnessSet(brightness) => buf.put_u8(brightness.level()),
        Request::LedStripCompoundSet(chunk) => {
            buf.put_u8(chunk.seq);
            buf.put_slice(&chunk.data);
        }
        Request::LedStripEffectSet(effect) => {
            buf.put_u8(effect.kind() as u8);
            buf.put_u16_le(effect.wait().unwrap_or(0));
            // colour goes out white-first
            let color = effect.color().unwrap_or_default();
            buf.put_u8(color.w);
            buf.put_u8(color.b);
            buf.put_u8(color.g);
            buf.put_u8(color.r);
        }
        Request::LedStripThermometerSet(scale) => {
            buf.put_f32_le(scale.temperature);
            buf.put_i8(scale.min);
            buf.put_i8(scale.max);
        }
        Request::ThermostatUpdate { index, value } => {
            buf.put_u8(*index);
            buf.put_f32_le(*value);
        }
    }
}

fn encode_telemetry(telemetry: &Telemetry, buf: &mut BytesMut) {
    match telemetry {
        Telemetry::PushButton { count }
        | Telemetry::LcdButton { count, .. }
        | Telemetry::Pir { count }
        | Telemetry::AccelerometerAlert { count } => buf.put_u16_le(*count),
        Telemetry::Thermometer {
            channel,
            temperature: value,
        }
        | Telemetry::Humidity {
            channel,
            percentage: value,
        }
        | Telemetry::LuxMeter {
            channel,
            illuminance: value,
        } => {
            buf.put_u8(channel.0);
            buf.put_f32_le(*value);
        }
        Telemetry::Co2 {
            concentration: value,
        }
        | Telemetry::ThermostatSetPoint { temperature: value } => buf.put_f32_le(*value),
        Telemetry::Battery { format, voltage } => {
            buf.put_u8(format.byte());
            buf.put_f32_le(*voltage);
        }
        Telemetry::Led { state } | Telemetry::RelayPower { state } => {
            buf.put_u8(u8::from(*state))
        }
        Telemetry::ModuleRelay { state, .. } => buf.put_u8(state.byte()),
        Telemetry::FloodDetector { kind, alarm } => {
            buf.put_u8(*kind);
            buf.put_u8(u8::from(*alarm));
        }
        Telemetry::Acceleration { x, y, z } => {
            buf.put_f32_le(*x);
            buf.put_f32_le(*y);
            buf.put_f32_le(*z);
        }
        Telemetry::MagnetSwitch { channel, state } => {
            buf.put_u8(channel.byte());
            buf.put_u8(u8::from(*state));
        }
        Telemetry::WateringHumidity { level }
        | Telemetry::WateringPump { level }
        | Telemetry::WateringWaterLevel { level } => buf.put_u8(*level),
        Telemetry::UserBool { topic, value } => {
            buf.put_u8(u8::from(*value));
            put_topic(topic, buf);
        }
        Telemetry::UserInt { topic, value } => {
            buf.put_i32_le(*value);
            put_topic(topic, buf);
        }
        Telemetry::UserFloat { topic, value } => {
            buf.put_f32_le(*value);
            put_topic(topic, buf);
        }
    }
}

fn put_topic(topic: &str, buf: &mut BytesMut) {
    buf.put_slice(topic.as_bytes());
    buf.put_u8(0);
}

/// Decode one frame.
///
/// The tag selects a decoder from [`decoder`]; the frame length is checked
/// against the tag layout before any field is read.
pub fn decode(frame: &[u8]) -> Result<Frame, DecodeError> {
    let (&tag_byte, _) = frame.split_first().ok_or(DecodeError::Empty)?;
    let tag = MessageTag::try_from(tag_byte).map_err(DecodeError::UnknownTag)?;

    let layout = tag.layout();
    if !layout.accepts(frame.len()) {
        return Err(DecodeError::BadLength {
            tag,
            expected: layout,
            actual: frame.len(),
        });
    }

    let mut body = &frame[1..];
    decoder(tag)(tag, &mut body)
}

/// Decode function for each tag
pub fn decoder(tag: MessageTag) -> DecodeFn {
    use MessageTag::*;
    match tag {
        LedSet | LedGet | RelayPowerSet | RelayPowerGet | Relay0Set | Relay0Get | Relay0PulseSet
        | Relay1Set | Relay1Get | Relay1PulseSet => decode_switch_command,
        LcdTextSet => decode_lcd_text,
        LcdScreenClear => decode_lcd_clear,
        LedStripColorSet => decode_color_set,
        LedStripBrightnessSet => decode_brightness,
        LedStripCompoundSet => decode_compound,
        LedStripEffectSet => decode_effect,
        LedStripThermometerSet => decode_thermometer_set,
        ThermostatUpdate => decode_thermostat_update,

        PushButton | LcdButtonLeft | LcdButtonRight | Pir | AccelerometerAlert => decode_counter,
        Thermometer | Humidity | LuxMeter => decode_sensor,
        Co2 | ThermostatSetPointTemperature => decode_scalar,
        Battery => decode_battery,
        Led | RelayPower | Relay0 | Relay1 => decode_state_report,
        FloodDetector | MagnetSwitchState => decode_contact,
        AccelerometerAcceleration => decode_acceleration,
        WateringHumidity | WateringPump | WateringWaterLevel => decode_watering,
        UserTopicBool | UserTopicInt | UserTopicFloat => decode_user_topic,
    }
}

fn command(body: &mut &[u8], request: Request) -> Result<Frame, DecodeError> {
    Ok(Frame::Command {
        target: get_address(body),
        request,
    })
}

fn telemetry(telemetry: Telemetry) -> Result<Frame, DecodeError> {
    Ok(Frame::Telemetry(telemetry))
}

fn get_address(body: &mut &[u8]) -> DeviceAddress {
    DeviceAddress::new(body.get_u64_le())
}

fn get_bool(tag: MessageTag, body: &mut &[u8], field: &'static str) -> Result<bool, DecodeError> {
    match body.get_u8() {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodeError::InvalidField { tag, field }),
    }
}

/// Peer reports: any nonzero byte is true
fn get_flag(body: &mut &[u8]) -> bool {
    body.get_u8() != 0
}

fn invalid(tag: MessageTag, field: &'static str) -> DecodeError {
    DecodeError::InvalidField { tag, field }
}

fn decode_switch_command(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    use MessageTag::*;
    let target = get_address(body);
    let channel = match tag {
        Relay0Set | Relay0Get | Relay0PulseSet => RelayChannel::Zero,
        _ => RelayChannel::One,
    };
    let request = match tag {
        LedSet => Request::LedSet {
            state: get_bool(tag, body, "state")?,
        },
        LedGet => Request::LedGet,
        RelayPowerSet => Request::RelayPowerSet {
            state: get_bool(tag, body, "state")?,
        },
        RelayPowerGet => Request::RelayPowerGet,
        Relay0Set | Relay1Set => Request::ModuleRelaySet {
            channel,
            state: get_bool(tag, body, "state")?,
        },
        Relay0PulseSet | Relay1PulseSet => {
            let direction = get_bool(tag, body, "direction")?;
            let pulse = Pulse::new(direction, body.get_i32_le().into())
                .map_err(|_| invalid(tag, "duration"))?;
            Request::ModuleRelayPulse { channel, pulse }
        }
        _ => Request::ModuleRelayGet { channel },
    };
    Ok(Frame::Command { target, request })
}

fn decode_lcd_text(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let x = body.get_i8();
    let y = body.get_i8();
    let font = body.get_u8();
    let color = get_bool(tag, body, "color")?;
    let len = body.get_u8() as usize;

    // text plus its terminator must fill the rest of the frame exactly
    if body.len() != len + 1 || body[len] != 0 {
        return Err(invalid(tag, "text"));
    }
    let text = std::str::from_utf8(&body[..len]).map_err(|_| invalid(tag, "text"))?;
    let text = LcdText::new(x.into(), y.into(), font.into(), color, text)
        .map_err(|_| invalid(tag, "text"))?;
    body.advance(len + 1);

    Ok(Frame::Command {
        target,
        request: Request::LcdTextSet(text),
    })
}

fn decode_color_set(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let color = Color::rgbw(body.get_u8(), body.get_u8(), body.get_u8(), body.get_u8());
    Ok(Frame::Command {
        target,
        request: Request::LedStripColorSet(color),
    })
}

fn decode_brightness(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let brightness =
        Brightness::new(body.get_u8().into()).map_err(|_| invalid(tag, "brightness"))?;
    Ok(Frame::Command {
        target,
        request: Request::LedStripBrightnessSet(brightness),
    })
}

fn decode_compound(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let seq = body.get_u8();
    let data = body.copy_to_bytes(body.remaining());
    Ok(Frame::Command {
        target,
        request: Request::LedStripCompoundSet(CompoundChunk { seq, data }),
    })
}

fn decode_effect(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let kind = EffectKind::from_byte(body.get_u8()).ok_or_else(|| invalid(tag, "effect"))?;
    let wait = body.get_u16_le();
    let w = body.get_u8();
    let b = body.get_u8();
    let g = body.get_u8();
    let r = body.get_u8();
    let effect = Effect::new(kind, Some(wait.into()), Some(Color::rgbw(r, g, b, w)))
        .map_err(|_| invalid(tag, "effect"))?;
    Ok(Frame::Command {
        target,
        request: Request::LedStripEffectSet(effect),
    })
}

fn decode_thermometer_set(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let scale = ThermometerScale {
        temperature: body.get_f32_le(),
        min: body.get_i8(),
        max: body.get_i8(),
    };
    Ok(Frame::Command {
        target,
        request: Request::LedStripThermometerSet(scale),
    })
}

fn decode_thermostat_update(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let target = get_address(body);
    let index = body.get_u8();
    let value = body.get_f32_le();
    Ok(Frame::Command {
        target,
        request: Request::ThermostatUpdate { index, value },
    })
}

fn decode_counter(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let count = body.get_u16_le();
    let telemetry = match tag {
        MessageTag::PushButton => Telemetry::PushButton { count },
        MessageTag::LcdButtonLeft => Telemetry::LcdButton {
            button: LcdButton::Left,
            count,
        },
        MessageTag::LcdButtonRight => Telemetry::LcdButton {
            button: LcdButton::Right,
            count,
        },
        MessageTag::Pir => Telemetry::Pir { count },
        _ => Telemetry::AccelerometerAlert { count },
    };
    Ok(Frame::Telemetry(telemetry))
}

fn decode_sensor(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let channel = SensorChannel(body.get_u8());
    let value = body.get_f32_le();
    let telemetry = match tag {
        MessageTag::Thermometer => Telemetry::Thermometer {
            channel,
            temperature: value,
        },
        MessageTag::Humidity => Telemetry::Humidity {
            channel,
            percentage: value,
        },
        _ => Telemetry::LuxMeter {
            channel,
            illuminance: value,
        },
    };
    Ok(Frame::Telemetry(telemetry))
}

fn decode_state_report(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let telemetry = match tag {
        MessageTag::Led => Telemetry::Led {
            state: get_flag(body),
        },
        MessageTag::RelayPower => Telemetry::RelayPower {
            state: get_flag(body),
        },
        _ => {
            let channel = if tag == MessageTag::Relay0 {
                RelayChannel::Zero
            } else {
                RelayChannel::One
            };
            let state = RelayState::from_byte(body.get_u8()).ok_or_else(|| invalid(tag, "state"))?;
            Telemetry::ModuleRelay { channel, state }
        }
    };
    Ok(Frame::Telemetry(telemetry))
}

fn decode_lcd_clear(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    command(body, Request::LcdScreenClear)
}

fn decode_scalar(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let value = body.get_f32_le();
    telemetry(match tag {
        MessageTag::Co2 => Telemetry::Co2 {
            concentration: value,
        },
        _ => Telemetry::ThermostatSetPoint { temperature: value },
    })
}

fn decode_battery(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let format = BatteryFormat::from_byte(body.get_u8());
    telemetry(Telemetry::Battery {
        format,
        voltage: body.get_f32_le(),
    })
}

fn decode_contact(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let first = body.get_u8();
    if tag == MessageTag::FloodDetector {
        let alarm = get_flag(body);
        telemetry(Telemetry::FloodDetector { kind: first, alarm })
    } else {
        let state = get_flag(body);
        telemetry(Telemetry::MagnetSwitch {
            channel: MagnetChannel::from_byte(first),
            state,
        })
    }
}

fn decode_acceleration(_: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    telemetry(Telemetry::Acceleration {
        x: body.get_f32_le(),
        y: body.get_f32_le(),
        z: body.get_f32_le(),
    })
}

fn decode_watering(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    let level = body.get_u8();
    telemetry(match tag {
        MessageTag::WateringHumidity => Telemetry::WateringHumidity { level },
        MessageTag::WateringPump => Telemetry::WateringPump { level },
        _ => Telemetry::WateringWaterLevel { level },
    })
}

fn decode_user_topic(tag: MessageTag, body: &mut &[u8]) -> Result<Frame, DecodeError> {
    enum Value {
        Bool(bool),
        Int(i32),
        Float(f32),
    }

    let value = match tag {
        MessageTag::UserTopicBool => Value::Bool(get_flag(body)),
        MessageTag::UserTopicInt => Value::Int(body.get_i32_le()),
        _ => Value::Float(body.get_f32_le()),
    };

    // the topic runs to the first NUL, or to the end of the frame
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    let topic = std::str::from_utf8(&body[..end]).map_err(|_| invalid(tag, "topic"))?;
    if topic.is_empty() {
        return Err(invalid(tag, "topic"));
    }
    let topic = topic.to_string();
    body.advance(body.len());

    let telemetry = match value {
        Value::Bool(value) => Telemetry::UserBool { topic, value },
        Value::Int(value) => Telemetry::UserInt { topic, value },
        Value::Float(value) => Telemetry::UserFloat { topic, value },
    };
    Ok(Frame::Telemetry(telemetry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::{CompoundProgram, Segment};

    const B: DeviceAddress = DeviceAddress::new(0x0000_1122_3344_5566);

    fn roundtrip(frame: Frame) {
        let encoded = encode(&frame);
        assert!(
            frame.tag().layout().accepts(encoded.len()),
            "{:?} encoded to {} bytes",
            frame.tag(),
            encoded.len()
        );
        assert_eq!(decode(&encoded), Ok(frame));
    }

    #[test]
    fn test_command_roundtrips() {
        let requests = vec![
            Request::LedSet { state: true },
            Request::LedGet,
            Request::RelayPowerSet { state: false },
            Request::RelayPowerGet,
            Request::ModuleRelaySet {
                channel: RelayChannel::One,
                state: true,
            },
            Request::ModuleRelayGet {
                channel: RelayChannel::Zero,
            },
            Request::ModuleRelayPulse {
                channel: RelayChannel::One,
                pulse: Pulse::new(false, 1500).unwrap(),
            },
            Request::LcdTextSet(LcdText::new(10, 40, 28, true, "Hello").unwrap()),
            Request::LcdTextSet(LcdText::new(0, 0, 15, false, "").unwrap()),
            Request::LcdScreenClear,
            Request::LedStripColorSet(Color::rgbw(1, 2, 3, 4)),
            Request::LedStripBrightnessSet(Brightness::new(55).unwrap()),
            Request::LedStripEffectSet(Effect::new(EffectKind::Test, None, None).unwrap()),
            Request::LedStripEffectSet(Effect::new(EffectKind::Rainbow, Some(30), None).unwrap()),
            Request::LedStripEffectSet(
                Effect::new(EffectKind::ColorWipe, Some(65535), Some(Color::rgb(9, 8, 7)))
                    .unwrap(),
            ),
            Request::LedStripThermometerSet(ThermometerScale::new(-4.25, -20, 40).unwrap()),
            Request::ThermostatUpdate {
                index: 2,
                value: 22.5,
            },
        ];
        for request in requests {
            roundtrip(Frame::command(B, request));
        }
    }

    #[test]
    fn test_compound_chunk_roundtrip() {
        let program = CompoundProgram::new(vec![
            Segment {
                count: 5,
                color: Color::rgb(0xff, 0, 0),
            };
            12
        ]);
        for chunk in program.chunks() {
            roundtrip(Frame::command(B, Request::LedStripCompoundSet(chunk)));
        }
    }

    #[test]
    fn test_telemetry_roundtrips() {
        let reports = vec![
            Telemetry::PushButton { count: 513 },
            Telemetry::LcdButton {
                button: LcdButton::Right,
                count: 3,
            },
            Telemetry::Thermometer {
                channel: SensorChannel(0x48),
                temperature: 23.75,
            },
            Telemetry::Humidity {
                channel: SensorChannel(0x40),
                percentage: 45.5,
            },
            Telemetry::LuxMeter {
                channel: SensorChannel(0xc4),
                illuminance: 300.0,
            },
            Telemetry::Co2 {
                concentration: 812.0,
            },
            Telemetry::Battery {
                format: BatteryFormat::Mini,
                voltage: 2.95,
            },
            Telemetry::Led { state: true },
            Telemetry::RelayPower { state: false },
            Telemetry::ModuleRelay {
                channel: RelayChannel::One,
                state: RelayState::Unknown,
            },
            Telemetry::Pir { count: 7 },
            Telemetry::FloodDetector {
                kind: 1,
                alarm: true,
            },
            Telemetry::AccelerometerAlert { count: 65535 },
            Telemetry::Acceleration {
                x: 0.5,
                y: -1.0,
                z: 9.81,
            },
            Telemetry::MagnetSwitch {
                channel: MagnetChannel::B,
                state: true,
            },
            Telemetry::ThermostatSetPoint { temperature: 21.0 },
            Telemetry::WateringHumidity { level: 40 },
            Telemetry::WateringPump { level: 1 },
            Telemetry::WateringWaterLevel { level: 0 },
            Telemetry::UserBool {
                topic: "door/open".into(),
                value: true,
            },
            Telemetry::UserInt {
                topic: "counter".into(),
                value: -42,
            },
            Telemetry::UserFloat {
                topic: "soil/moisture".into(),
                value: 0.25,
            },
        ];
        for report in reports {
            roundtrip(Frame::Telemetry(report));
        }
    }

    #[test]
    fn test_brightness_wire_layout() {
        let frame = Frame::command(
            B,
            Request::LedStripBrightnessSet(Brightness::new(55).unwrap()),
        );
        let mut expected = vec![MessageTag::LedStripBrightnessSet.byte()];
        expected.extend_from_slice(&B.to_le_bytes());
        expected.push(55);
        assert_eq!(&encode(&frame)[..], &expected[..]);
    }

    #[test]
    fn test_effect_color_is_white_first() {
        let effect =
            Effect::new(EffectKind::TheaterChase, Some(0x0102), Some(Color::rgbw(0xaa, 0xbb, 0xcc, 0xdd)))
                .unwrap();
        let encoded = encode(&Frame::command(B, Request::LedStripEffectSet(effect)));
        assert_eq!(encoded.len(), 16);
        assert_eq!(&encoded[9..], &[5, 0x02, 0x01, 0xdd, 0xcc, 0xbb, 0xaa]);
    }

    #[test]
    fn test_pir_frame() {
        let frame = decode(&[MessageTag::Pir.byte(), 0x07, 0x00]).unwrap();
        assert_eq!(frame, Frame::Telemetry(Telemetry::Pir { count: 7 }));
    }

    #[test]
    fn test_short_pulse_frame_is_rejected() {
        let frame = [MessageTag::Relay0PulseSet.byte(), 0x01];
        assert!(matches!(
            decode(&frame),
            Err(DecodeError::BadLength {
                tag: MessageTag::Relay0PulseSet,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_fixed_lengths_are_exact() {
        let mut long = encode(&Frame::Telemetry(Telemetry::Pir { count: 1 })).to_vec();
        long.push(0);
        assert!(matches!(decode(&long), Err(DecodeError::BadLength { .. })));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(decode(&[]), Err(DecodeError::Empty));
        assert_eq!(decode(&[0xee, 1, 2]), Err(DecodeError::UnknownTag(0xee)));
    }

    #[test]
    fn test_invalid_bool_byte_in_command() {
        let mut frame = vec![MessageTag::LedSet.byte()];
        frame.extend_from_slice(&[0; 8]);
        frame.push(7);
        assert_eq!(
            decode(&frame),
            Err(DecodeError::InvalidField {
                tag: MessageTag::LedSet,
                field: "state"
            })
        );
    }

    #[test]
    fn test_nonzero_report_byte_is_true() {
        assert_eq!(
            decode(&[MessageTag::Led.byte(), 7]),
            Ok(Frame::Telemetry(Telemetry::Led { state: true }))
        );
        assert_eq!(
            decode(&[MessageTag::FloodDetector.byte(), 1, 0x80]),
            Ok(Frame::Telemetry(Telemetry::FloodDetector {
                kind: 1,
                alarm: true
            }))
        );
        assert_eq!(
            decode(&[MessageTag::UserTopicBool.byte(), 2, b'x', 0]),
            Ok(Frame::Telemetry(Telemetry::UserBool {
                topic: "x".into(),
                value: true
            }))
        );
        assert_eq!(
            decode(&[MessageTag::RelayPower.byte(), 0]),
            Ok(Frame::Telemetry(Telemetry::RelayPower { state: false }))
        );
    }

    #[test]
    fn test_user_topic_minimum_length() {
        assert!(matches!(
            decode(&[MessageTag::UserTopicInt.byte(), 1, 0, 0, 0]),
            Err(DecodeError::BadLength { .. })
        ));
        // only a terminator: no topic to publish under
        assert!(matches!(
            decode(&[MessageTag::UserTopicBool.byte(), 1, 0]),
            Err(DecodeError::InvalidField { field: "topic", .. })
        ));
    }

    #[test]
    fn test_user_topic_without_terminator() {
        let frame = [MessageTag::UserTopicBool.byte(), 1, b'a', b'b'];
        assert_eq!(
            decode(&frame),
            Ok(Frame::Telemetry(Telemetry::UserBool {
                topic: "ab".into(),
                value: true
            }))
        );
    }

    #[test]
    fn test_lcd_text_length_field_must_match() {
        let frame = Frame::command(
            B,
            Request::LcdTextSet(LcdText::new(1, 2, 15, true, "abc").unwrap()),
        );
        let mut bytes = encode(&frame).to_vec();
        // claim 4 text bytes while carrying 3
        bytes[13] = 4;
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidField { field: "text", .. })
        ));
    }

    #[test]
    fn test_brightness_out_of_range_on_wire() {
        let mut bytes = vec![MessageTag::LedStripBrightnessSet.byte()];
        bytes.extend_from_slice(&B.to_le_bytes());
        bytes.push(101);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidField { field: "brightness", .. })
        ));
    }
}
