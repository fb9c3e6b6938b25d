use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// First seed of the default benchmark ladder.
pub const DEFAULT_SEED_START: u64 = 0x5EED_0001;

/// Parses a simulation seed. Accepts decimal or `0x` hex, with optional `_`
/// digit separators (`0x5EED_0001`).
pub fn parse_seed(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let digits = trimmed.replace('_', "");
    if digits.is_empty() {
        bail!("empty seed");
    }
    match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => {
            u64::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed: {trimmed}"))
        }
        None => digits
            .parse::<u64>()
            .with_context(|| format!("invalid decimal seed: {trimmed}")),
    }
}

/// Fixed-width form used in report file names and `seed=` output lines.
pub fn seed_to_hex(seed: u64) -> String {
    format!("0x{seed:016x}")
}

pub fn parse_seed_csv(input: &str) -> Result<Vec<u64>> {
    let seeds = parse_seed_tokens(input.split(','))?;
    if seeds.is_empty() {
        bail!("no seeds parsed from --seeds");
    }
    Ok(seeds)
}

/// One seed per line; blank lines and `#` comments are skipped.
pub fn parse_seed_file(path: &Path) -> Result<Vec<u64>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    let lines = data
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'));
    let seeds = parse_seed_tokens(lines)
        .with_context(|| format!("bad seed in {}", path.display()))?;
    if seeds.is_empty() {
        bail!("seed file {} had no seeds", path.display());
    }
    Ok(seeds)
}

fn parse_seed_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec<u64>> {
    tokens
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_seed)
        .collect()
}

/// Deterministic seed ladder starting at `start` (64-bit LCG step).
pub fn seed_sequence(start: u64, count: u32) -> Vec<u64> {
    let mut out = Vec::with_capacity(count as usize);
    let mut cur = start;
    for _ in 0..count {
        out.push(cur);
        cur = cur
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
    }
    out
}

/// Where a benchmark takes its seeds from, in order of precedence: a seed
/// file, an explicit list, then a ladder of `count` seeds from `start`.
#[derive(Clone, Debug, Default)]
pub struct SeedSource {
    pub file: Option<PathBuf>,
    pub csv: Option<String>,
    pub start: Option<String>,
    pub count: u32,
}

impl SeedSource {
    pub fn resolve(&self) -> Result<Vec<u64>> {
        if let Some(path) = &self.file {
            return parse_seed_file(path);
        }
        if let Some(csv) = &self.csv {
            return parse_seed_csv(csv);
        }
        if self.count == 0 {
            return Err(anyhow!("--seed-count must be > 0"));
        }
        let start = match &self.start {
            Some(start) => parse_seed(start)?,
            None => DEFAULT_SEED_START,
        };
        Ok(seed_sequence(start, self.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal_seeds() {
        assert_eq!(parse_seed("0x10").expect("hex"), 16);
        assert_eq!(parse_seed(" 42 ").expect("decimal"), 42);
        assert_eq!(parse_seed("0x5EED_0001").expect("separated"), 0x5EED_0001);
        assert_eq!(parse_seed("1_000").expect("separated"), 1_000);
        assert!(parse_seed("").is_err());
        assert!(parse_seed("_").is_err());
        assert!(parse_seed("0xZZ").is_err());
    }

    #[test]
    fn csv_skips_blanks_and_rejects_empty() {
        assert_eq!(parse_seed_csv("1, ,0x2,").expect("csv"), vec![1, 2]);
        assert!(parse_seed_csv(" , ").is_err());
        assert!(parse_seed_csv("1,nope").is_err());
    }

    #[test]
    fn seed_file_skips_comments() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("seeds.txt");
        fs::write(&path, "# ladder\n0x01\n\n  # indented note\n7\n").expect("write");
        assert_eq!(parse_seed_file(&path).expect("seeds"), vec![1, 7]);

        fs::write(&path, "# nothing here\n").expect("write");
        assert!(parse_seed_file(&path).is_err());
    }

    #[test]
    fn seed_sequence_is_stable_and_distinct() {
        let seeds = seed_sequence(7, 5);
        assert_eq!(seeds.len(), 5);
        assert_eq!(seeds[0], 7);
        assert_eq!(seeds, seed_sequence(7, 5));
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn seed_source_precedence() {
        let ladder = SeedSource {
            count: 3,
            ..SeedSource::default()
        };
        assert_eq!(
            ladder.resolve().expect("ladder"),
            seed_sequence(DEFAULT_SEED_START, 3)
        );

        let started = SeedSource {
            start: Some("9".to_string()),
            ..ladder.clone()
        };
        assert_eq!(started.resolve().expect("ladder")[0], 9);

        let listed = SeedSource {
            csv: Some("4,5".to_string()),
            ..started
        };
        assert_eq!(listed.resolve().expect("csv"), vec![4, 5]);

        assert!(SeedSource::default().resolve().is_err());
    }

    #[test]
    fn hex_formatting_is_zero_padded() {
        assert_eq!(seed_to_hex(0xAB), "0x00000000000000ab");
    }
}
