//! Command-line interface components.

use crate::config::Bc3Config;
use clap::Parser;
use std::path::PathBuf;

/// Rebuild, repair and export the budget tree of FIEBDC-3 (BC3) files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bc3_processor",
    version,
    about = "Rebuild, repair and export the budget tree of BC3 construction budgets",
    long_about = "Reads BC3 (FIEBDC-3) budget files, rebuilds the hierarchical budget tree, \
                  repairs breakdown nodes that sit beside line items, writes the repair back \
                  into a patched BC3 copy and exports the tree as a delimited table."
)]
pub struct Args {
    /// A .bc3 file, or a directory searched recursively for .bc3 files
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory for exported and patched files
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run the material conversion pre-pass and keep a normalized copy
    #[arg(long)]
    pub normalize: bool,

    /// Do not write a patched BC3 file
    #[arg(long = "no-patch", conflicts_with = "in_place")]
    pub no_patch: bool,

    /// Patch the input file itself instead of writing a copy
    #[arg(long = "in-place")]
    pub in_place: bool,

    /// Print the rebuilt tree to stdout
    #[arg(long)]
    pub tree: bool,

    /// Field delimiter of the exported table
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Layer command-line flags over a loaded configuration
    pub fn apply_to(&self, mut config: Bc3Config) -> Bc3Config {
        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir);
        }
        if let Some(delimiter) = self.delimiter {
            config = config.with_csv_delimiter(delimiter);
        }
        if self.normalize {
            config = config.with_normalize(true);
        }
        if self.no_patch {
            config = config.with_patch_source(false);
        }
        if self.in_place {
            config = config.with_in_place(true);
        }
        if self.tree {
            config = config.with_print_tree(true);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        let args = Args::parse_from(["bc3_processor", "obra.bc3"]);
        assert_eq!(args.get_log_level(), "warn");

        let args = Args::parse_from(["bc3_processor", "-vv", "obra.bc3"]);
        assert_eq!(args.get_log_level(), "debug");

        let args = Args::parse_from(["bc3_processor", "-q", "obra.bc3"]);
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "bc3_processor",
            "--normalize",
            "--no-patch",
            "--tree",
            "--delimiter",
            ",",
            "-o",
            "out",
            "obra.bc3",
        ]);
        let config = args.apply_to(Bc3Config::default());

        assert!(config.normalize);
        assert!(!config.patch_source);
        assert!(config.print_tree);
        assert_eq!(config.csv_delimiter, ',');
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let args = Args::parse_from(["bc3_processor", "obra.bc3"]);
        let loaded = Bc3Config::default()
            .with_normalize(true)
            .with_csv_delimiter('\t');
        let config = args.apply_to(loaded.clone());
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_no_patch_conflicts_with_in_place() {
        let result = Args::try_parse_from(["bc3_processor", "--no-patch", "--in-place", "x.bc3"]);
        assert!(result.is_err());
    }
}
