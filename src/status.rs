use std::collections::HashMap;
use std::ops::RangeInclusive;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

lazy_static::lazy_static! {
    static ref FORMATTING_RE: Regex = Regex::new("§.").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{1,16}$").unwrap();

    /// Legacy chat color names to their one-character formatting codes.
    static ref COLOR_CODES: HashMap<&'static str, char> = HashMap::from([
        ("black", '0'),
        ("dark_blue", '1'),
        ("dark_green", '2'),
        ("dark_aqua", '3'),
        ("dark_red", '4'),
        ("dark_purple", '5'),
        ("gold", '6'),
        ("gray", '7'),
        ("dark_gray", '8'),
        ("blue", '9'),
        ("green", 'a'),
        ("aqua", 'b'),
        ("red", 'c'),
        ("light_purple", 'd'),
        ("yellow", 'e'),
        ("white", 'f'),
        ("reset", 'r'),
    ]);

    /// Protocol numbers to the finest version label containing them,
    /// scanned in order, newest first.
    /// See https://wiki.vg/Protocol_version_numbers
    static ref VERSIONS: Vec<(&'static str, RangeInclusive<i64>)> = vec![
        ("1.17", 755..=755),
        ("1.16.5", 754..=754), // 1.16.4 - 1.16.5 = 754
        ("1.16.3", 752..=753),
        ("1.16.2", 738..=751),
        ("1.16.1", 736..=736),
        ("1.16", 701..=735),

        ("1.15.2", 576..=578),
        ("1.15.1", 574..=575),
        ("1.15", 550..=573),

        ("1.14.4", 491..=498),
        ("1.14.3", 486..=490),
        ("1.14.2", 481..=485),
        ("1.14.1", 478..=480),
        ("1.14", 441..=477),

        ("1.13.2", 402..=404),
        ("1.13.1", 394..=401),
        ("1.13", 341..=393),

        ("1.12.2", 339..=340),
        ("1.12.1", 336..=338),
        ("1.12", 317..=335),

        ("1.11.2", 316..=316),
        ("1.11", 301..=315),

        ("1.10.2", 201..=210),

        ("1.9.4", 109..=110),
        ("1.9.1", 108..=108),
        ("1.9", 48..=107),
        ("1.8.9", 6..=47),

        ("1.7.10", 4..=5),
        ("1.7.9", 0..=3),
    ];
}

const FAVICON_PREFIX: &str = "data:image/png;base64,";

/// Wire shape of the status response JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    pub version: RawVersion,
    pub players: RawPlayers,
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub modinfo: Option<RawModInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVersion {
    pub name: String,
    pub protocol: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayers {
    pub max: i64,
    pub online: i64,
    #[serde(default)]
    pub sample: Option<Vec<PlayerSample>>,
}

/// A `sample` entry, retained verbatim so callers keep access to UUIDs
/// even for entries the name filter rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModInfo {
    #[serde(rename = "modList", default)]
    pub mod_list: Vec<ModEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEntry {
    pub modid: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// The server's MOTD, either a bare string or a legacy text component.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Plain(String),
    Component(TextComponent),
}

/// Legacy chat-formatting JSON. `extra` entries concatenate left to right.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextComponent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub underlined: Option<bool>,
    #[serde(default)]
    pub strikethrough: Option<bool>,
    #[serde(default)]
    pub obfuscated: Option<bool>,
    #[serde(default)]
    pub extra: Option<Vec<TextComponent>>,
}

/// Normalized ping result.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub motd: Motd,
    pub players: Players,
    pub favicon: Favicon,
    pub mods: Mods,
    pub version: Version,
    /// Attached after the pong round trip; `None` when the pong payload
    /// could not be decoded.
    pub ping: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Motd {
    /// MOTD with legacy `§` formatting codes intact.
    pub default: String,
    /// MOTD with every formatting code stripped.
    pub clear: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Players {
    pub max: i64,
    pub online: i64,
    /// Sample names that look like legal usernames.
    pub list: Vec<String>,
    /// The unfiltered sample, exactly as the server sent it.
    pub sample: Vec<PlayerSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Favicon {
    /// The raw data URI as sent by the server.
    pub icon: Option<String>,
    /// Decoded PNG bytes.
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Mods {
    pub names: Vec<String>,
    pub list: Vec<ModEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Version {
    pub protocol: i64,
    /// Version label resolved from the protocol number, if any is known.
    pub major: Option<String>,
    /// The server's self-reported name, or `"Vanilla"` when it matches
    /// the resolved label.
    pub name: String,
}

/// Parses the wire JSON into a [`ServerStatus`] with `ping` unset.
pub fn parse_status(json: &str) -> Result<ServerStatus, ParseError> {
    let raw: RawStatus = serde_json::from_str(json)?;

    Ok(ServerStatus {
        motd: parse_motd(raw.description.as_ref()),
        players: parse_players(raw.players),
        favicon: parse_favicon(raw.favicon)?,
        mods: parse_mods(raw.modinfo),
        version: parse_version(raw.version),
        ping: None,
    })
}

fn parse_motd(description: Option<&Description>) -> Motd {
    let default = match description {
        Some(Description::Plain(text)) => text.clone(),
        Some(Description::Component(component)) => {
            // `extra`, when present, is the authoritative rendering and
            // replaces the base text entirely.
            match &component.extra {
                Some(extra) => flatten_extra(extra),
                None => component
                    .text
                    .clone()
                    .or_else(|| component.translate.clone())
                    .unwrap_or_default(),
            }
        }
        None => String::new(),
    };

    let clear = clear_formatting(&default);

    Motd { default, clear }
}

/// Renders each entry with its style codes prepended in the fixed order
/// bold, italic, underlined, strikethrough, obfuscated, color, then
/// concatenates the entries in sequence order.
fn flatten_extra(extra: &[TextComponent]) -> String {
    let mut out = String::new();

    for entry in extra {
        let mut text = entry.text.clone().unwrap_or_default();

        if entry.bold.unwrap_or(false) {
            text = format!("§l{}", text);
        }
        if entry.italic.unwrap_or(false) {
            text = format!("§o{}", text);
        }
        if entry.underlined.unwrap_or(false) {
            text = format!("§n{}", text);
        }
        if entry.strikethrough.unwrap_or(false) {
            text = format!("§m{}", text);
        }
        if entry.obfuscated.unwrap_or(false) {
            text = format!("§k{}", text);
        }
        if let Some(color) = &entry.color {
            // Unknown color names contribute no prefix.
            if let Some(code) = COLOR_CODES.get(color.as_str()) {
                text = format!("§{}{}", code, text);
            }
        }

        out.push_str(&text);
    }

    out
}

/// Strips every `§` + one character formatting sequence.
pub fn clear_formatting(text: &str) -> String {
    FORMATTING_RE.replace_all(text, "").into_owned()
}

fn parse_players(players: RawPlayers) -> Players {
    let sample = players.sample.unwrap_or_default();

    let list = sample
        .iter()
        .filter(|entry| NAME_RE.is_match(&entry.name))
        .map(|entry| entry.name.clone())
        .collect();

    Players {
        max: players.max,
        online: players.online,
        list,
        sample,
    }
}

fn parse_favicon(favicon: Option<String>) -> Result<Favicon, ParseError> {
    match favicon {
        Some(icon) => {
            let stripped = icon.strip_prefix(FAVICON_PREFIX).unwrap_or(&icon);
            let data = BASE64.decode(stripped)?;

            Ok(Favicon {
                icon: Some(icon),
                data: Some(data),
            })
        }
        None => Ok(Favicon {
            icon: None,
            data: None,
        }),
    }
}

fn parse_mods(modinfo: Option<RawModInfo>) -> Mods {
    match modinfo {
        Some(info) if !info.mod_list.is_empty() => Mods {
            names: info.mod_list.iter().map(|m| m.modid.clone()).collect(),
            list: info.mod_list,
        },
        _ => Mods {
            names: vec![],
            list: vec![],
        },
    }
}

fn parse_version(version: RawVersion) -> Version {
    let major = major_version(version.protocol);

    let name = match &major {
        Some(label) if *label == version.name => "Vanilla".to_string(),
        _ => clear_formatting(&version.name),
    };

    Version {
        protocol: version.protocol,
        major,
        name,
    }
}

/// Resolves a protocol number to the first version label whose range
/// contains it.
pub fn major_version(protocol: i64) -> Option<String> {
    VERSIONS
        .iter()
        .find(|(_, range)| range.contains(&protocol))
        .map(|(label, _)| (*label).to_string())
}
