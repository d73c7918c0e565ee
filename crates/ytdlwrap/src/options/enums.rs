//! Enumerated option values
//!
//! The first variant of every enum is the "unspecified" default: assigning it
//! leaves the option unset. Names are matched case-insensitively and always
//! serialized lower-case.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

/// Enum types usable as typed option values.
pub trait FlagEnum: Copy + FromStr + Into<&'static str> + VariantNames {}

impl<T> FlagEnum for T where T: Copy + FromStr + Into<&'static str> + VariantNames {}

/// Container for merged video+audio downloads (`--merge-output-format`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr, VariantNames, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMergeFormat {
    #[default]
    Unspecified,
    Mp4,
    Mkv,
    Ogg,
    Webm,
    Flv,
}

/// Target audio codec for `--audio-format`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr, VariantNames, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AudioConversionFormat {
    #[default]
    Best,
    Aac,
    Alac,
    Flac,
    M4a,
    Mp3,
    Opus,
    Vorbis,
    Wav,
}

/// Container to re-encode into with `--recode-video`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr, VariantNames, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum VideoRecodeFormat {
    #[default]
    None,
    Mp4,
    Mkv,
    Ogg,
    Webm,
    Flv,
    Avi,
    Mov,
    Gif,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_variant_is_default() {
        assert_eq!(DownloadMergeFormat::VARIANTS[0], DownloadMergeFormat::default().to_string());
        assert_eq!(AudioConversionFormat::VARIANTS[0], AudioConversionFormat::default().to_string());
        assert_eq!(VideoRecodeFormat::VARIANTS[0], VideoRecodeFormat::default().to_string());
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("MP3".parse::<AudioConversionFormat>().unwrap(), AudioConversionFormat::Mp3);
        assert_eq!("Mkv".parse::<VideoRecodeFormat>().unwrap(), VideoRecodeFormat::Mkv);
        assert!("divx".parse::<VideoRecodeFormat>().is_err());
    }

    #[test]
    fn test_lowercase_names() {
        let name: &'static str = DownloadMergeFormat::Webm.into();
        assert_eq!(name, "webm");
        assert_eq!(AudioConversionFormat::M4a.to_string(), "m4a");
    }
}
