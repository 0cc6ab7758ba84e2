use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::rule_set::RuleSet;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Cells along the longer side of the view
    pub axis_size: u32,

    /// Generations per second while running
    pub steps_per_second: u32,

    /// Chance of a cell being alive after randomizing
    pub density: f64,

    /// Seed for randomizing. `None` seeds from the OS.
    pub seed: Option<u64>,

    pub rule: RuleSet,

    /// Name of the built-in stamp selected at startup
    pub stamp: String,

    /// RLE file to load as the startup stamp, instead of `stamp`
    pub pattern_file: Option<PathBuf>,

    /// How often a held press re-applies the stamp
    pub press_interval: Duration,

    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            axis_size: Self::AXIS_SIZE,
            steps_per_second: Self::STEPS_PER_SECOND,
            density: 0.5,
            seed: None,
            rule: RuleSet::default(),
            stamp: "dot".to_string(),
            pattern_file: None,
            press_interval: Duration::ZERO,
            log_file: PathBuf::from("toroid.log"),
        }
    }
}

/// Command line flags. Every flag falls back to the matching [`Config::default`] value.
#[derive(Debug, Parser)]
#[command(name = "toroid", version, about = "Game of Life on a torus, in the terminal")]
pub struct Cli {
    /// Cells along the longer side of the view
    #[arg(
        long = "axis",
        value_name = "CELLS",
        default_value_t = Config::AXIS_SIZE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    axis_size: u32,

    /// Generations per second while running
    #[arg(
        long = "rate",
        value_name = "STEPS",
        default_value_t = Config::STEPS_PER_SECOND,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    steps_per_second: u32,

    /// Chance of a live cell when randomizing, 0 to 1
    #[arg(long, value_name = "P", default_value_t = 0.5, value_parser = parse_density)]
    density: f64,

    /// Seed for randomizing, instead of one from the OS
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Rule string such as B3/S23, b36s23 or 23/3
    #[arg(long, value_name = "RULE", default_value_t = RuleSet::default())]
    rule: RuleSet,

    /// Starting stamp from the built-in library
    #[arg(long, value_name = "NAME", default_value = "dot")]
    stamp: String,

    /// Load the starting stamp from an RLE file
    #[arg(long = "pattern-file", value_name = "FILE")]
    pattern_file: Option<PathBuf>,

    /// Repeat interval of a held press
    #[arg(long = "press-ms", value_name = "MILLISECONDS", default_value_t = 0)]
    press_ms: u64,

    /// File to write logs to
    #[arg(long = "log", value_name = "FILE", default_value = "toroid.log")]
    log_file: PathBuf,
}

fn parse_density(s: &str) -> Result<f64, String> {
    let density: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;

    if (0.0..=1.0).contains(&density) {
        Ok(density)
    } else {
        Err(format!("{density} is not in 0..=1"))
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            axis_size: cli.axis_size,
            steps_per_second: cli.steps_per_second,
            density: cli.density,
            seed: cli.seed,
            rule: cli.rule,
            stamp: cli.stamp,
            pattern_file: cli.pattern_file,
            press_interval: Duration::from_millis(cli.press_ms),
            log_file: cli.log_file,
        }
    }
}

impl Config {
    pub const AXIS_SIZE: u32 = 100;
    pub const STEPS_PER_SECOND: u32 = 50;

    /// Time between generations while running.
    pub fn step_interval(&self) -> Duration {
        Duration::from_secs(1) / self.steps_per_second.max(1)
    }
}

#[cfg(test)]
mod test {
    use clap::error::ErrorKind;

    use super::*;

    fn config(args: &str) -> Result<Config, clap::Error> {
        let args = std::iter::once("toroid").chain(args.split_whitespace());

        Cli::try_parse_from(args).map(Config::from)
    }

    fn kind_of(args: &str) -> ErrorKind {
        config(args).unwrap_err().kind()
    }

    #[test]
    fn defaults() {
        let config = config("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.step_interval(), Duration::from_millis(20));
    }

    #[test]
    fn all_flags() {
        let config = config(
            "--axis 40 --rate 10 --density 0.25 --seed 9 --rule B36/S23 --stamp glider \
             --pattern-file gun.rle --press-ms 30 --log out.log",
        )
        .unwrap();

        assert_eq!(config.axis_size, 40);
        assert_eq!(config.steps_per_second, 10);
        assert_eq!(config.density, 0.25);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.rule.to_string(), "B36/S23");
        assert_eq!(config.stamp, "glider");
        assert_eq!(config.pattern_file, Some(PathBuf::from("gun.rle")));
        assert_eq!(config.press_interval, Duration::from_millis(30));
        assert_eq!(config.log_file, PathBuf::from("out.log"));
    }

    #[test]
    fn rule_flag_reads_like_rle() {
        assert_eq!(config("--rule 23/36").unwrap().rule.to_string(), "B36/S23");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(config("--axis").is_err());
        assert_eq!(kind_of("--axis 0"), ErrorKind::ValueValidation);
        assert_eq!(kind_of("--rate 0"), ErrorKind::ValueValidation);
        assert_eq!(kind_of("--density 1.5"), ErrorKind::ValueValidation);
        assert_eq!(kind_of("--density=-0.1"), ErrorKind::ValueValidation);
        assert_eq!(kind_of("--rule Q"), ErrorKind::ValueValidation);
        assert_eq!(kind_of("--fast"), ErrorKind::UnknownArgument);
    }

    #[test]
    fn help_is_generated() {
        assert_eq!(kind_of("--help"), ErrorKind::DisplayHelp);
    }
}
