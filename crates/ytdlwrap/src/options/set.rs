//! Option sets: one slot per known catalog flag plus custom flags

use chrono::NaiveDate;
use log::debug;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::error::{YtdlError, YtdlResult};
use crate::options::catalog::{Flag, CATALOG};
use crate::options::enums::FlagEnum;
use crate::options::option::{discovered_value, split_flag, CliOption};
use crate::options::value::OptionValue;

/// Full set of options for one yt-dlp invocation.
///
/// Holds one slot per catalog entry (see [`Flag`]) plus an ordered list of
/// custom options the catalog does not know. Typed accessors for every
/// catalog entry are generated in [`crate::options::catalog`].
///
/// # Example
///
/// ```
/// use ytdlwrap::options::{AudioConversionFormat, OptionSet};
///
/// let mut opts = OptionSet::default();
/// opts.set_extract_audio(true);
/// opts.set_audio_format(AudioConversionFormat::Mp3);
/// assert_eq!(opts.option_flags(), vec!["--extract-audio", "--audio-format \"mp3\""]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    known: Vec<CliOption>,
    custom: Vec<CliOption>,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            known: CATALOG.iter().map(CliOption::from_spec).collect(),
            custom: Vec::new(),
        }
    }
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(&self, flag: Flag) -> &CliOption {
        &self.known[flag as usize]
    }

    pub fn option_mut(&mut self, flag: Flag) -> &mut CliOption {
        &mut self.known[flag as usize]
    }

    pub fn is_set(&self, flag: Flag) -> bool {
        self.option(flag).is_set()
    }

    pub fn unset(&mut self, flag: Flag) {
        self.option_mut(flag).clear();
    }

    /// Sets a catalog option from an untyped value, checking its kind.
    pub fn set(&mut self, flag: Flag, value: OptionValue) -> YtdlResult<()> {
        self.option_mut(flag).set(value)
    }

    pub fn custom_options(&self) -> &[CliOption] {
        &self.custom
    }

    /// Catalog options in declaration order, then custom options in insertion order.
    pub fn options(&self) -> impl Iterator<Item = &CliOption> {
        self.known.iter().chain(self.custom.iter())
    }

    /// Adds a custom option unless an identical one (same flag and value) exists.
    pub fn add_custom_option(&mut self, flag: impl Into<String>, value: impl Into<OptionValue>) {
        self.push_custom(CliOption::custom(flag, value));
    }

    /// Updates the value of every custom option with this flag.
    ///
    /// Fails with a conversion error if the value kind does not match the
    /// existing option's kind. Unknown flags are ignored.
    pub fn set_custom_option(&mut self, flag: &str, value: impl Into<OptionValue>) -> YtdlResult<()> {
        let value = value.into();
        for option in self.custom.iter_mut().filter(|o| o.matches(flag)) {
            option.set(value.clone())?;
        }
        Ok(())
    }

    /// Removes every custom option with this flag.
    pub fn delete_custom_option(&mut self, flag: &str) {
        self.custom.retain(|o| !o.matches(flag));
    }

    /// Serialized `flag value` strings of every set option.
    pub fn option_flags(&self) -> Vec<String> {
        self.options().flat_map(CliOption::to_flags).collect()
    }

    /// Argument tokens for spawning yt-dlp directly.
    pub fn to_args(&self) -> Vec<String> {
        self.options().flat_map(CliOption::to_args).collect()
    }

    /// Parses option lines strictly: every flag must be in the catalog.
    ///
    /// Blank lines and `#` comments are skipped. Errors carry the 1-based
    /// line index.
    pub fn from_lines<I, S>(lines: I) -> YtdlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse_lines(lines, false)
    }

    /// Parses a yt-dlp configuration, keeping unknown flags as custom options.
    ///
    /// A flag without a value becomes a boolean custom option, anything else a
    /// string custom option.
    pub fn from_config_lines<I, S>(lines: I) -> YtdlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse_lines(lines, true)
    }

    fn parse_lines<I, S>(lines: I, keep_unknown: bool) -> YtdlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (flag, raw) = split_flag(line);
            match Flag::from_alias(flag) {
                Some(known) => set
                    .option_mut(known)
                    .set_from_str(line)
                    .map_err(|e| e.at_line(index + 1))?,
                None if keep_unknown => {
                    debug!("Keeping unknown option '{}' as custom option", flag);
                    set.push_custom(CliOption::custom(flag, discovered_value(raw)));
                }
                None => return Err(YtdlError::format(line).at_line(index + 1)),
            }
        }
        Ok(set)
    }

    /// Loads a yt-dlp configuration file (one option per line).
    pub fn load_config_file(path: impl AsRef<Path>) -> YtdlResult<Self> {
        let path = path.as_ref();
        debug!("Loading option config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_config_lines(content.lines())
    }

    /// Writes every set option to a file, one per line.
    pub fn write_config_file(&self, path: impl AsRef<Path>) -> YtdlResult<()> {
        let mut content = self.option_flags().join("\n");
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns a copy where every option set in `other` replaces ours.
    ///
    /// Catalog slots are replaced as a whole (multi-valued ones included).
    /// Custom options are merged: an entry from `other` equal to one of ours
    /// in flag and value is dropped, keeping the position of the first.
    pub fn override_options(&self, other: &OptionSet) -> OptionSet {
        let mut merged = self.clone();
        for (slot, theirs) in merged.known.iter_mut().zip(&other.known) {
            if theirs.is_set() {
                *slot = theirs.clone();
            }
        }
        for option in &other.custom {
            merged.push_custom(option.clone());
        }
        merged
    }

    fn push_custom(&mut self, option: CliOption) {
        let duplicate = self
            .custom
            .iter()
            .any(|o| o.flag() == option.flag() && o.to_string() == option.to_string());
        if !duplicate {
            self.custom.push(option);
        }
    }

    pub(crate) fn get_bool(&self, flag: Flag) -> bool {
        self.option(flag)
            .value()
            .and_then(OptionValue::as_bool)
            .unwrap_or_default()
    }

    pub(crate) fn get_str(&self, flag: Flag) -> Option<&str> {
        self.option(flag).value().and_then(OptionValue::as_str)
    }

    pub(crate) fn get_int(&self, flag: Flag) -> Option<i64> {
        self.option(flag).value().and_then(OptionValue::as_int)
    }

    pub(crate) fn get_float(&self, flag: Flag) -> Option<f64> {
        self.option(flag).value().and_then(OptionValue::as_float)
    }

    pub(crate) fn get_date(&self, flag: Flag) -> Option<NaiveDate> {
        self.option(flag).value().and_then(OptionValue::as_date)
    }

    pub(crate) fn get_strs(&self, flag: Flag) -> Vec<&str> {
        self.option(flag)
            .values()
            .iter()
            .filter_map(OptionValue::as_str)
            .collect()
    }

    pub(crate) fn get_enum<T: FlagEnum + Default>(&self, flag: Flag) -> T {
        self.get_str(flag)
            .and_then(|name| name.parse::<T>().ok())
            .unwrap_or_default()
    }

    pub(crate) fn assign(&mut self, flag: Flag, value: OptionValue) {
        self.option_mut(flag).assign(value);
    }

    pub(crate) fn assign_all(&mut self, flag: Flag, values: Vec<OptionValue>) {
        self.option_mut(flag).assign_all(values);
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.option_flags().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::enums::{AudioConversionFormat, DownloadMergeFormat, VideoRecodeFormat};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_has_no_flags() {
        let opts = OptionSet::default();
        assert!(opts.option_flags().is_empty());
        assert_eq!(opts.to_string(), "");
    }

    #[test]
    fn test_typed_accessors() {
        let mut opts = OptionSet::default();
        opts.set_format("mp4/bestvideo");
        opts.set_retries(10);
        opts.set_date_after(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        opts.set_merge_output_format(DownloadMergeFormat::Mkv);

        assert_eq!(opts.format(), Some("mp4/bestvideo"));
        assert_eq!(opts.retries(), Some(10));
        assert_eq!(opts.merge_output_format(), DownloadMergeFormat::Mkv);
        assert_eq!(opts.recode_video(), VideoRecodeFormat::None);
        assert_eq!(
            opts.option_flags(),
            vec![
                "--dateafter 20190101",
                "--retries 10",
                "--format \"mp4/bestvideo\"",
                "--merge-output-format \"mkv\"",
            ]
        );
    }

    #[test]
    fn test_setting_default_clears() {
        let mut opts = OptionSet::default();
        opts.set_audio_format(AudioConversionFormat::Mp3);
        opts.set_audio_format(AudioConversionFormat::Best);
        opts.set_quiet(true);
        opts.set_quiet(false);
        assert!(!opts.is_set(Flag::AudioFormat));
        assert!(opts.option_flags().is_empty());
    }

    #[test]
    fn test_unset() {
        let mut opts = OptionSet::default();
        opts.set_proxy("socks5://127.0.0.1:1080");
        opts.unset(Flag::Proxy);
        assert_eq!(opts.proxy(), None);
    }

    #[test]
    fn test_from_lines_round_trip() {
        let lines = [
            "-x",
            "--audio-format \"mp3\"",
            "-o \"~/Music/%(title)s.%(ext)s\"",
            "--datebefore 20200322",
            "--ppa \"ffmpeg:-ac 2\"",
            "--ppa \"ffmpeg:-ar 44100\"",
        ];
        let opts = OptionSet::from_lines(lines).unwrap();
        assert!(opts.extract_audio());
        assert_eq!(opts.audio_format(), AudioConversionFormat::Mp3);
        assert_eq!(opts.postprocessor_args(), vec!["ffmpeg:-ac 2", "ffmpeg:-ar 44100"]);

        let reparsed = OptionSet::from_lines(opts.option_flags()).unwrap();
        assert_eq!(reparsed, opts);
    }

    #[test]
    fn test_from_lines_skips_comments_and_blanks() {
        let opts = OptionSet::from_lines(["# comment", "", "   ", "--no-mtime"]).unwrap();
        assert_eq!(opts.option_flags(), vec!["--no-mtime"]);
    }

    #[test]
    fn test_from_lines_unknown_flag_reports_line() {
        let err = OptionSet::from_lines(["--quiet", "--frobnicate"]).unwrap_err();
        assert!(matches!(err, YtdlError::Format { line: Some(2), .. }));
    }

    #[test]
    fn test_from_lines_bad_value_is_conversion_error() {
        let err = OptionSet::from_lines(["--retries ten"]).unwrap_err();
        assert!(matches!(err, YtdlError::ValueConversion { ref flag, .. } if flag == "--retries"));
    }

    #[test]
    fn test_config_lines_keep_unknown_flags() {
        let opts = OptionSet::from_config_lines(["--quiet", "--sponsorblock-mark \"all\"", "--no-colors"]).unwrap();
        assert!(opts.quiet());
        assert_eq!(
            opts.option_flags(),
            vec!["--quiet", "--sponsorblock-mark \"all\"", "--no-colors"]
        );
    }

    #[test]
    fn test_custom_options() {
        let mut opts = OptionSet::default();
        opts.add_custom_option("--sponsorblock-mark", "all");
        opts.add_custom_option("--sponsorblock-mark", "all");
        assert_eq!(opts.custom_options().len(), 1);

        opts.set_custom_option("--sponsorblock-mark", "sponsor").unwrap();
        assert_eq!(opts.option_flags(), vec!["--sponsorblock-mark \"sponsor\""]);

        let err = opts.set_custom_option("--sponsorblock-mark", 3_i64).unwrap_err();
        assert!(matches!(err, YtdlError::ValueConversion { .. }));

        opts.delete_custom_option("--sponsorblock-mark");
        assert!(opts.custom_options().is_empty());
    }

    #[test]
    fn test_override_replaces_set_slots_only() {
        let mut base = OptionSet::default();
        base.set_format("best");
        base.set_output("/tmp/%(title)s.%(ext)s");

        let mut overrides = OptionSet::default();
        overrides.set_format("worst");
        overrides.set_quiet(true);

        let merged = base.override_options(&overrides);
        assert_eq!(merged.format(), Some("worst"));
        assert_eq!(merged.output(), Some("/tmp/%(title)s.%(ext)s"));
        assert!(merged.quiet());
        assert_eq!(base.format(), Some("best"));
    }

    #[test]
    fn test_override_with_empty_set_is_identity() {
        let mut base = OptionSet::default();
        base.set_format("best");
        base.set_retries(3);
        base.add_custom_option("--sponsorblock-mark", "all");
        assert_eq!(base.override_options(&OptionSet::default()), base);
    }

    #[test]
    fn test_override_replaces_multi_slot_wholesale() {
        let mut base = OptionSet::default();
        base.set_postprocessor_args(["a", "b"]);
        let mut overrides = OptionSet::default();
        overrides.set_postprocessor_args(["c"]);

        let merged = base.override_options(&overrides);
        assert_eq!(merged.postprocessor_args(), vec!["c"]);
    }

    #[test]
    fn test_override_deduplicates_custom_options() {
        let mut base = OptionSet::default();
        base.add_custom_option("--a", true);
        base.add_custom_option("--b", "1");
        let mut overrides = OptionSet::default();
        overrides.add_custom_option("--b", "1");
        overrides.add_custom_option("--c", true);

        let merged = base.override_options(&overrides);
        assert_eq!(merged.option_flags(), vec!["--a", "--b \"1\"", "--c"]);
    }

    #[test]
    fn test_to_args_tokens() {
        let mut opts = OptionSet::default();
        opts.set_output("/tmp/a b.%(ext)s");
        opts.set_newline(true);
        assert_eq!(opts.to_args(), vec!["--output", "/tmp/a b.%(ext)s", "--newline"]);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yt-dlp.conf");

        let mut opts = OptionSet::default();
        opts.set_write_subs(true);
        opts.set_sub_langs("en,de");
        opts.add_custom_option("--sponsorblock-mark", "all");
        opts.write_config_file(&path).unwrap();

        let loaded = OptionSet::load_config_file(&path).unwrap();
        assert_eq!(loaded, opts);
    }

    #[test]
    fn test_load_missing_config_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = OptionSet::load_config_file(dir.path().join("missing.conf")).unwrap_err();
        assert!(matches!(err, YtdlError::Io(_)));
    }
}
