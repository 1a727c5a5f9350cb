//! LCD module

use meshgate_shared::limits::DEFAULT_LCD_FONT;
use meshgate_shared::{LcdText, Payload, ValidationError};

use super::HandlerContext;
use crate::hardware::Hardware;

/// Font sizes the gateway's own display can render
const LOCAL_FONTS: [u8; 6] = [11, 13, 15, 24, 28, 33];

/// `{"x", "y", "text", "font"?, "color"?}`
pub fn parse_text(payload: &Payload) -> Result<LcdText, ValidationError> {
    let x = payload.key_int("x")?;
    let y = payload.key_int("y")?;
    let text = payload.key_str("text")?;
    let font = payload.key_int_or("font", i64::from(DEFAULT_LCD_FONT))?;
    let color = payload.key_bool_or("color", true)?;
    LcdText::new(x, y, font, color, text)
}

/// LCD requests the gateway's own display can serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LcdRequest {
    Text(LcdText),
    Clear,
}

/// Draws on the local display; there is no state to report back
pub fn execute<H: Hardware>(ctx: &mut HandlerContext, hardware: &mut H, request: LcdRequest) {
    match request {
        LcdRequest::Text(mut text) => {
            if !ctx.lcd_initialised {
                hardware.lcd_clear();
                ctx.lcd_initialised = true;
            }
            if !LOCAL_FONTS.contains(&text.font) {
                text.font = DEFAULT_LCD_FONT;
            }
            hardware.lcd_draw_text(&text);
        }
        LcdRequest::Clear => {
            hardware.lcd_clear();
            ctx.lcd_initialised = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::{HardwareCall, RecordingHardware};
    use meshgate_shared::DeviceAddress;
    use serde_json::json;

    #[test]
    fn test_parse_text_defaults() {
        let text = parse_text(&Payload::from(json!({"x": 5, "y": 10, "text": "Hi"})))
            .expect("valid");
        assert_eq!((text.x, text.y, text.font, text.color), (5, 10, 15, true));
        assert_eq!(text.text(), "Hi");
    }

    #[test]
    fn test_parse_text_errors() {
        assert!(parse_text(&Payload::from(json!({"x": 5, "text": "Hi"}))).is_err());
        assert!(parse_text(&Payload::from(json!({"x": 300, "y": 0, "text": "Hi"}))).is_err());
        let long = "x".repeat(32);
        assert!(matches!(
            parse_text(&Payload::from(json!({"x": 0, "y": 0, "text": long}))),
            Err(ValidationError::TextTooLong { len: 32, max: 31 })
        ));
    }

    #[test]
    fn test_unsupported_font_falls_back() {
        let mut ctx = HandlerContext::new(DeviceAddress::new(1), "test");
        let mut hardware = RecordingHardware::default();
        let text = LcdText::new(0, 0, 99, true, "big").expect("text");
        execute(&mut ctx, &mut hardware, LcdRequest::Text(text));

        let expected = LcdText::new(0, 0, 15, true, "big").expect("text");
        assert_eq!(
            hardware.calls,
            vec![HardwareCall::LcdClear, HardwareCall::LcdDrawText(expected)]
        );
    }

    #[test]
    fn test_screen_cleared_once() {
        let mut ctx = HandlerContext::new(DeviceAddress::new(1), "test");
        let mut hardware = RecordingHardware::default();
        for text in ["one", "two"] {
            let text = LcdText::new(0, 0, 24, false, text).expect("text");
            execute(&mut ctx, &mut hardware, LcdRequest::Text(text));
        }
        let clears = hardware
            .calls
            .iter()
            .filter(|call| **call == HardwareCall::LcdClear)
            .count();
        assert_eq!(clears, 1);
        assert_eq!(hardware.calls.len(), 3);
    }
}
