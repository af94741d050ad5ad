use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The 32 integer registers, in hardware numbering (`ZERO` = x0).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
    Eq,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum Reg {
    #[default]
    ZERO,
    RA,
    SP,
    GP,
    TP,
    T0,
    T1,
    T2,
    #[strum(serialize = "fp", to_string = "s0")]
    S0,
    S1,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
    S10,
    S11,
    T3,
    T4,
    T5,
    T6,
}

impl Reg {
    /// Accepts `x<n>` with n in [0, 31] or an ABI alias.
    pub fn parse(s: &str) -> Result<Self, String> {
        if let Some(num) = s.strip_prefix('x') {
            if let Ok(n) = num.parse::<u8>() {
                if n < 32 {
                    return Ok(Reg::from(n));
                }
            }
            return Err(format!("Unknown reg name: {s}"));
        }
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }
}
