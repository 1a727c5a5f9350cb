//! LED strip commands, forwarded to peers only

use meshgate_shared::{
    Brightness, Color, CompoundProgram, Effect, EffectKind, Payload, Request, ThermometerScale,
    ValidationError,
};

pub fn parse_color(payload: &Payload) -> Result<Color, ValidationError> {
    Color::parse(payload.as_str("color")?)
}

pub fn parse_brightness(payload: &Payload) -> Result<Brightness, ValidationError> {
    Brightness::new(payload.as_int("brightness")?)
}

/// One request per chunk, in sequence order
pub fn parse_compound(payload: &Payload) -> Result<Vec<Request>, ValidationError> {
    let program = CompoundProgram::from_payload(payload)?;
    Ok(program.chunks().map(Request::LedStripCompoundSet).collect())
}

/// `{"type": name, "wait"?: ms, "color"?: "#RRGGBB"}`
pub fn parse_effect(payload: &Payload) -> Result<Effect, ValidationError> {
    let index = payload.field("type")?.as_enum("type", &EffectKind::NAMES)?;
    let kind = EffectKind::from_index(index).ok_or(ValidationError::UnknownVariant {
        field: "type",
        value: index.to_string(),
    })?;

    let wait = payload.get("wait").map(|w| w.as_int("wait")).transpose()?;
    let color = payload
        .get("color")
        .map(|c| c.as_str("color").and_then(Color::parse))
        .transpose()?;

    Effect::new(kind, wait, color)
}

/// `{"temperature", "min", "max"}`
pub fn parse_thermometer(payload: &Payload) -> Result<ThermometerScale, ValidationError> {
    let temperature = payload.key_float("temperature")? as f32;
    ThermometerScale::new(temperature, payload.key_int("min")?, payload.key_int("max")?)
}
