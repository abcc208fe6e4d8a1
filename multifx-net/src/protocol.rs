//! Wire-level conventions of the mod-host line protocol.

use multifx_types::InstanceNum;

use crate::NetError;

/// Well-known mod-host control port.
pub const DEFAULT_PORT: u16 = 5555;

/// System capture/playback ports (two mono channels each).
pub const SYSTEM_CAPTURE_1: &str = "system:capture_1";
pub const SYSTEM_CAPTURE_2: &str = "system:capture_2";
pub const SYSTEM_PLAYBACK_1: &str = "system:playback_1";
pub const SYSTEM_PLAYBACK_2: &str = "system:playback_2";

/// Result code for a successful command (other than `add`, which echoes
/// the instance number).
pub const OK: i32 = 0;

/// Host rejection: the LV2 URI did not resolve to an installed plugin.
pub const ERR_LV2_INVALID_URI: i32 = -101;

/// Jack port name for a port on a live instance: `effect_<num>:<port>`.
pub fn effect_port(num: InstanceNum, port: &str) -> String {
    format!("effect_{}:{}", num, port)
}

/// Human-readable hint for a known host rejection code.
pub fn describe_code(code: i32) -> Option<&'static str> {
    match code {
        ERR_LV2_INVALID_URI => Some("invalid LV2 URI, is the plugin installed?"),
        _ => None,
    }
}

/// Extract the numeric result from a response line.
///
/// The host echoes the verb followed by the result token, e.g.
/// `resp 0` or `add http://... 3`. Anything without a numeric second
/// token is a protocol error, distinct from a transport failure.
pub fn parse_result(response: &str) -> Result<i32, NetError> {
    let mut tokens = response.split_whitespace();
    let Some(_verb) = tokens.next() else {
        return Err(NetError::Protocol("empty response".into()));
    };
    let Some(token) = tokens.next() else {
        return Err(NetError::Protocol(format!(
            "missing result token in {:?}",
            response.trim_end()
        )));
    };
    token.parse::<i32>().map_err(|_| {
        NetError::Protocol(format!(
            "non-numeric result token {:?} in {:?}",
            token,
            response.trim_end()
        ))
    })
}
