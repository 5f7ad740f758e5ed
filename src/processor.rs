//! Main processing engine.
//!
//! Runs the complete pipeline for each input file: read, optional
//! normalization, tree build, hierarchy repair, optional patch-back,
//! CSV export and optional tree rendering.

use crate::config::Bc3Config;
use crate::constants::{BC3_EXTENSION, output_suffixes};
use crate::error::{Bc3Error, Result};
use crate::export::export_csv;
use crate::models::{Node, ProcessingStats};
use crate::normalize::{NormalizeStats, normalize};
use crate::parser::{ParseStats, build_tree};
use crate::patch::patch;
use crate::reader::{read_lines, write_lines};
use crate::repair::repair;
use crate::report::render_tree;

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Outcome of processing a single BC3 file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub roots: Vec<Node>,
    pub parse_stats: ParseStats,
    pub normalize_stats: Option<NormalizeStats>,
    pub promoted: usize,
    pub normalized_path: Option<PathBuf>,
    pub patched_path: Option<PathBuf>,
    pub csv_path: PathBuf,
}

impl FileReport {
    /// Every file written for this input
    pub fn outputs(&self) -> Vec<PathBuf> {
        let mut outputs = Vec::new();
        outputs.extend(self.normalized_path.clone());
        outputs.extend(self.patched_path.clone());
        outputs.push(self.csv_path.clone());
        outputs
    }
}

/// Main processor for BC3 conversion
#[derive(Debug)]
pub struct Bc3Processor {
    input: PathBuf,
    config: Bc3Config,
}

impl Bc3Processor {
    /// Create a processor for a file or a directory of `.bc3` files
    pub fn new(input: PathBuf) -> Result<Self> {
        if !input.exists() {
            return Err(Bc3Error::InputNotFound { path: input });
        }
        Ok(Self {
            input,
            config: Bc3Config::default(),
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: Bc3Config) -> Self {
        self.config = config;
        self
    }

    /// Main processing entry point
    pub fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        let inputs = self.discover_inputs()?;
        info!("Processing {} BC3 files", inputs.len());

        let mut stats = ProcessingStats::default();
        for input in &inputs {
            let report = self.process_file(input)?;

            if self.config.print_tree {
                print!("{}", render_tree(&report.roots));
            }

            stats.files_processed += 1;
            stats.total_records += report.parse_stats.total_records;
            stats.records_skipped += report.parse_stats.records_skipped;
            stats.edges_dropped += report.parse_stats.edges_dropped;
            stats.nodes_built += report.roots.iter().map(Node::subtree_len).sum::<usize>();
            stats.roots += report.roots.len();
            stats.nodes_promoted += report.promoted;
            stats.codes_shortened += report
                .normalize_stats
                .as_ref()
                .map_or(0, |s| s.codes_shortened);
            stats.output_paths.extend(report.outputs());
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        Ok(stats)
    }

    /// Resolve the input into the list of BC3 files to process
    pub fn discover_inputs(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        let output_dir = self.config.output_dir.canonicalize().ok();
        let mut inputs = Vec::new();
        let walker = WalkDir::new(&self.input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // Never re-read our own outputs
                output_dir
                    .as_ref()
                    .is_none_or(|out| entry.path().canonicalize().ok().as_ref() != Some(out))
            });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_bc3(entry.path()) {
                inputs.push(entry.into_path());
            }
        }

        if inputs.is_empty() {
            return Err(Bc3Error::NoInputFiles {
                path: self.input.clone(),
            });
        }
        debug!("Discovered inputs: {:?}", inputs);
        Ok(inputs)
    }

    /// Run the full pipeline for one file
    pub fn process_file(&self, input: &Path) -> Result<FileReport> {
        info!("Processing BC3 file: {}", input.display());
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "budget".to_string());
        let output_path = |suffix: &str| self.config.output_dir.join(format!("{}{}", stem, suffix));

        let mut lines = read_lines(input)?;

        let mut normalize_stats = None;
        let mut normalized_path = None;
        if self.config.normalize {
            let result = normalize(&lines);
            let path = output_path(output_suffixes::NORMALIZED);
            write_lines(&path, &result.lines)?;
            info!("Normalized copy written to {}", path.display());
            lines = result.lines;
            normalize_stats = Some(result.stats);
            normalized_path = Some(path);
        }

        let parsed = build_tree(&lines);
        let mut roots = parsed.roots;

        let promoted = repair(&mut roots);

        let mut patched_path = None;
        if self.config.patch_source && promoted > 0 {
            let path = if self.config.in_place {
                input.to_path_buf()
            } else {
                output_path(output_suffixes::PATCHED)
            };
            write_lines(&path, &patch(&lines, &roots))?;
            info!("Patched BC3 written to {}", path.display());
            patched_path = Some(path);
        } else if self.config.patch_source {
            debug!("No promotions in {}, skipping patch-back", input.display());
        }

        let csv_path = output_path(output_suffixes::TREE_CSV);
        export_csv(&roots, &csv_path, &self.config.export_options())?;

        Ok(FileReport {
            input: input.to_path_buf(),
            roots,
            parse_stats: parsed.stats,
            normalize_stats,
            promoted,
            normalized_path,
            patched_path,
            csv_path,
        })
    }
}

fn is_bc3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BC3_EXTENSION))
}
