use meshgate_shared::{check_range, Payload, Request, ValidationError};

/// `{"index": 0..=255, "value": number}`
pub fn parse_update(payload: &Payload) -> Result<Request, ValidationError> {
    let index = check_range("index", payload.key_int("index")?, 0, u8::MAX as i64)? as u8;
    let value = payload.key_float("value")? as f32;
    Ok(Request::ThermostatUpdate { index, value })
}
