//! Physical units attached to catalog columns.
//!
//! Remote services describe column units with VOUnit-style strings such as
//! `mag`, `km/s`, `erg.s-1.cm-2` or `10-3Jy`. [`Unit`] validates those strings
//! against a fixed vocabulary of base symbols and SI prefixes and keeps the
//! trimmed source text as its canonical form. Anything outside the grammar is
//! rejected; field metadata maps such strings to "no unit" instead of failing.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::prelude::*;

/// Symbols that accept an SI prefix (`mJy`, `km`, `GHz`, ...).
const PREFIXABLE_SYMBOLS: &[&str] = &[
    "m", "s", "g", "K", "A", "mol", "cd", "rad", "sr", "Hz", "N", "Pa", "J", "W", "C", "V", "F",
    "Ohm", "S", "Wb", "T", "H", "lm", "lx", "Bq", "Gy", "Sv", "eV", "Jy", "pc", "yr", "a", "erg",
    "G", "barn", "byte", "bit", "B", "ct", "ph", "pix", "L", "D", "R", "arcsec",
];

/// Symbols that are only valid exactly as written.
const PLAIN_SYMBOLS: &[&str] = &[
    "%", "deg", "arcmin", "mas", "uas", "min", "h", "d", "mag", "AU", "au", "solMass", "solLum",
    "solRad", "Angstrom", "angstrom", "lyr", "Ry", "u", "count", "photon", "pixel", "beam",
    "chan", "bin", "voxel", "adu", "Sun", "Msun", "jupiterMass", "jupiterRad", "earthMass",
    "earthRad", "dex", "dB", "unknown", "UNKNOWN",
];

/// SI prefixes, two-letter forms first so `da` wins over `d`.
const PREFIXES: &[&str] = &[
    "da", "y", "z", "a", "f", "p", "n", "u", "µ", "m", "c", "d", "h", "k", "M", "G", "T", "P",
    "E", "Z", "Y",
];

static FACTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sym>[A-Za-zµ%]+)(?:(?:\*\*|\^)?\(?(?P<pow>[+-]?\d+)\)?)?$")
        .unwrap_or_else(|e| unreachable!("static unit regex is valid: {e}"))
});

static SCALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:10(?P<exp>[+-]\d+)|(?P<num>\d+(?:\.\d*)?(?:[eE][+-]?\d+)?))")
        .unwrap_or_else(|e| unreachable!("static scale regex is valid: {e}"))
});

/// Errors raised when a unit string is outside the supported grammar.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
pub enum UnitParseError {
    /// The unit string was empty or only whitespace.
    #[snafu(display("unit string is empty"))]
    Empty,

    /// A factor did not match `[prefix]symbol[power]`.
    #[snafu(display("malformed unit factor '{factor}' in '{unit}'"))]
    MalformedFactor {
        /// Full unit string being parsed.
        unit: String,
        /// Offending factor.
        factor: String,
    },

    /// The symbol is not part of the known vocabulary.
    #[snafu(display("unknown unit symbol '{symbol}' in '{unit}'"))]
    UnknownSymbol {
        /// Full unit string being parsed.
        unit: String,
        /// Offending symbol (without prefix or power).
        symbol: String,
    },
}

/// One `[prefix]symbol[power]` term of a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFactor {
    /// SI prefix, empty when absent.
    pub prefix: &'static str,
    /// Base symbol from the known vocabulary.
    pub symbol: &'static str,
    /// Signed integer power; negative for factors after `/`.
    pub power: i32,
}

/// A validated physical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    text: String,
    scale: f64,
    factors: Vec<UnitFactor>,
}

impl Unit {
    /// Parse a VOUnit-style string.
    pub fn parse(raw: &str) -> Result<Self, UnitParseError> {
        let text = raw.trim();
        ensure!(!text.is_empty(), EmptySnafu);

        let mut scale = 1.0;
        let mut factors = Vec::new();

        for (i, part) in text.split('/').enumerate() {
            let sign = if i == 0 { 1 } else { -1 };
            for token in split_factors(part) {
                let rest = take_scale(token, &mut scale, sign);
                if rest.is_empty() {
                    continue;
                }
                let mut factor = parse_factor(text, rest)?;
                factor.power = factor.power.checked_mul(sign).with_context(|| {
                    MalformedFactorSnafu {
                        unit: text,
                        factor: rest,
                    }
                })?;
                factors.push(factor);
            }
        }

        if factors.is_empty() && scale == 1.0 {
            return MalformedFactorSnafu {
                unit: text,
                factor: text,
            }
            .fail();
        }

        Ok(Unit {
            text: text.to_string(),
            scale,
            factors,
        })
    }

    /// Parse leniently: empty or unparsable strings give `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        Unit::parse(raw).ok()
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Leading numeric scale factor (1.0 when absent).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Parsed factors in source order.
    pub fn factors(&self) -> &[UnitFactor] {
        &self.factors
    }
}

/// Split one side of a `/` into factor tokens.
///
/// `.` separates factors except between two digits (`0.1`), `*` separates
/// except as part of `**`, and whitespace always separates.
fn split_factors(part: &str) -> Vec<&str> {
    let bytes = part.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let is_sep = match c {
            b'.' => {
                let prev_digit = i > 0 && bytes[i - 1].is_ascii_digit();
                let next_digit = i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit();
                !(prev_digit && next_digit)
            }
            b'*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    i += 2;
                    continue;
                }
                i > 0 && bytes[i - 1] != b'*'
            }
            b' ' | b'\t' => true,
            _ => false,
        };

        if is_sep {
            if start < i {
                out.push(&part[start..i]);
            }
            start = i + 1;
        }
        i += 1;
    }

    if start < part.len() {
        out.push(&part[start..]);
    }
    out
}

/// Strip a leading numeric scale (`10-3`, `1e-3`, `0.1`) and fold it into `scale`.
fn take_scale<'a>(token: &'a str, scale: &mut f64, sign: i32) -> &'a str {
    let Some(caps) = SCALE_RE.captures(token) else {
        return token;
    };

    let value = if let Some(exp) = caps.name("exp") {
        exp.as_str().parse::<i32>().ok().map(|e| 10f64.powi(e))
    } else {
        caps.name("num").and_then(|n| n.as_str().parse::<f64>().ok())
    };

    match value {
        Some(v) if v != 0.0 => {
            *scale *= if sign > 0 { v } else { 1.0 / v };
            &token[caps.get(0).map_or(0, |m| m.end())..]
        }
        _ => token,
    }
}

fn parse_factor(unit: &str, token: &str) -> Result<UnitFactor, UnitParseError> {
    let caps = FACTOR_RE
        .captures(token)
        .with_context(|| MalformedFactorSnafu {
            unit,
            factor: token,
        })?;

    let raw_symbol = caps.name("sym").map_or("", |m| m.as_str());
    let power = match caps.name("pow") {
        Some(p) => p.as_str().parse::<i32>().map_err(|_| {
            MalformedFactorSnafu {
                unit,
                factor: token,
            }
            .build()
        })?,
        None => 1,
    };

    let (prefix, symbol) = resolve_symbol(raw_symbol).with_context(|| UnknownSymbolSnafu {
        unit,
        symbol: raw_symbol,
    })?;

    Ok(UnitFactor {
        prefix,
        symbol,
        power,
    })
}

fn resolve_symbol(raw: &str) -> Option<(&'static str, &'static str)> {
    if let Some(sym) = lookup(PLAIN_SYMBOLS, raw).or_else(|| lookup(PREFIXABLE_SYMBOLS, raw)) {
        return Some(("", sym));
    }

    PREFIXES.iter().find_map(|prefix| {
        let rest = raw.strip_prefix(prefix)?;
        let sym = lookup(PREFIXABLE_SYMBOLS, rest)?;
        Some((*prefix, sym))
    })
}

fn lookup(table: &'static [&'static str], raw: &str) -> Option<&'static str> {
    table.iter().copied().find(|s| *s == raw)
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Unit::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde helper: a unit that is not a string, or fails to parse, becomes
/// `None`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Unit>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(Unit::parse_lenient))
}
