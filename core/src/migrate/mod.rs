use crate::config::{RunConfig, TransferMode};
use crate::error::{Result, TidyError};
use crate::extraction::FieldExtractorSet;
use crate::naming::{self, SeriesLayout};
use dicom_object::open_file;
use log::{debug, info, warn};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Failure log filename, created under the output root
pub const FAILURE_LOG_NAME: &str = "failures.csv";

/// One candidate file discovered during enumeration
///
/// Consumed exactly once by the processing step.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Directory the file was found in
    pub dir: PathBuf,
    /// Filename within that directory
    pub file_name: OsString,
}

impl WorkItem {
    /// Creates a work item
    pub fn new(dir: PathBuf, file_name: OsString) -> Self {
        Self { dir, file_name }
    }

    /// Full path to the file
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Failure captured for one work item that passed the DICOM-validity gate
#[derive(Debug, Clone)]
pub struct FailureRecord {
    /// Original directory of the file
    pub dirpath: PathBuf,
    /// Original filename
    pub filename: String,
    /// Textual error description
    pub error_info: String,
}

impl FailureRecord {
    fn from_item(item: &WorkItem, error: &TidyError) -> Self {
        Self {
            dirpath: item.dir.clone(),
            filename: item.file_name.to_string_lossy().into_owned(),
            error_info: error.to_string(),
        }
    }
}

/// Typed result of processing one work item
///
/// Distinguishes the expected skip (not a DICOM file) from an
/// unexpected failure; neither stops the batch.
#[derive(Debug)]
pub enum Outcome {
    /// File landed at the given destination
    Relocated(PathBuf),
    /// Not a DICOM file; expected noise, not logged
    SkippedNonDicom,
    /// Processing failed after the validity gate
    Failed(FailureRecord),
}

/// Totals reported at the end of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Files (or, in fast mode, directories) relocated
    pub relocated: usize,
    /// Non-DICOM files skipped
    pub skipped: usize,
    /// Work items that failed
    pub failures: usize,
    /// Failure log path, when any failure was recorded
    pub failure_log: Option<PathBuf>,
}

/// Checks if a file has a DICOM header
///
/// DICOM files carry a 128-byte preamble followed by the 4-byte `DICM`
/// magic string. Files without it are treated as expected noise
/// (thumbnails, index files) and skipped silently.
pub fn is_dicom_file(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut buffer = [0u8; 132];
    match file.read(&mut buffer) {
        Ok(n) if n >= 132 => &buffer[128..132] == b"DICM",
        _ => false,
    }
}

/// Picks a destination filename that does not collide
///
/// Appends `_1`, `_2`, ... to the stem (before the extension) until a
/// free name is found. Never overwrites an existing file.
fn next_free_name(dir: &Path, file_name: &OsStr) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .unwrap_or(file_name)
        .to_string_lossy()
        .into_owned();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1usize;
    loop {
        let alt = match &ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        let candidate = dir.join(alt);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Picks a destination directory name that does not collide
fn next_free_dir(dest: PathBuf) -> PathBuf {
    if !dest.exists() {
        return dest;
    }
    let base = dest
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 1usize;
    loop {
        let candidate = dest.with_file_name(format!("{}_{}", base, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn move_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            // rename cannot cross filesystems
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_failure_log(out_root: &Path, failures: &[FailureRecord]) -> Result<PathBuf> {
    fs::create_dir_all(out_root)?;
    let path = out_root.join(FAILURE_LOG_NAME);
    let mut writer = BufWriter::new(File::create(&path)?);
    writeln!(writer, "dirpath,filename,error_info")?;
    for record in failures {
        writeln!(
            writer,
            "{},{},{}",
            csv_field(&record.dirpath.display().to_string()),
            csv_field(&record.filename),
            csv_field(&record.error_info)
        )?;
    }
    writer.flush()?;
    Ok(path)
}

/// Walks the input tree and relocates every DICOM file it finds
///
/// Enumeration accumulates work items into a bounded batch; a full
/// batch is processed before enumeration continues, so memory stays
/// flat on very large trees. A failure local to one file never
/// propagates past its work item. Strictly sequential; the output root
/// is assumed to have no other writer for the duration of the run.
pub struct MigrationDriver {
    in_root: PathBuf,
    out_root: PathBuf,
    mode: TransferMode,
    fast: bool,
    batch_size: usize,
    layout: &'static dyn SeriesLayout,
    fields: FieldExtractorSet,
    batch: Vec<WorkItem>,
    failures: Vec<FailureRecord>,
    relocated: usize,
    skipped: usize,
}

impl MigrationDriver {
    /// Builds a driver from a validated run configuration
    ///
    /// # Errors
    ///
    /// Fails on configuration problems (invalid field specs, fast+copy,
    /// nested roots); these abort before any file is touched.
    pub fn new(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let fields = config.extractor_set()?;
        Ok(Self {
            in_root: config.in_dir.clone(),
            out_root: config.out_dir.clone(),
            mode: config.mode,
            fast: config.fast,
            batch_size: config.batch_size,
            layout: naming::layout(config.layout),
            fields,
            batch: Vec::new(),
            failures: Vec::new(),
            relocated: 0,
            skipped: 0,
        })
    }

    /// Runs the migration to completion
    ///
    /// # Errors
    ///
    /// Only an unreadable input root or an unwritable failure log abort
    /// the run; per-file failures are recorded and the run continues.
    pub fn run(&mut self) -> Result<RunSummary> {
        let root = self.in_root.clone();
        if self.fast {
            self.walk_fast(&root)?;
        } else {
            self.walk(&root)?;
            self.flush_batch();
        }
        self.finish()
    }

    fn finish(&mut self) -> Result<RunSummary> {
        let failure_log = if self.failures.is_empty() {
            None
        } else {
            Some(write_failure_log(&self.out_root, &self.failures)?)
        };
        info!(
            "run complete: {} relocated, {} skipped, {} failed",
            self.relocated,
            self.skipped,
            self.failures.len()
        );
        Ok(RunSummary {
            relocated: self.relocated,
            skipped: self.skipped,
            failures: self.failures.len(),
            failure_log,
        })
    }

    fn walk(&mut self, dir: &Path) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                // only a failure to read the input root itself is fatal
                if let Err(e) = self.walk(&path) {
                    warn!("skipping unreadable directory {}: {}", path.display(), e);
                }
            } else {
                self.batch
                    .push(WorkItem::new(dir.to_path_buf(), entry.file_name()));
                if self.batch.len() >= self.batch_size {
                    self.flush_batch();
                }
            }
        }
        Ok(())
    }

    fn flush_batch(&mut self) {
        let batch = std::mem::take(&mut self.batch);
        if batch.is_empty() {
            return;
        }
        debug!("processing batch of {} items", batch.len());
        for item in &batch {
            match self.process(item) {
                Outcome::Relocated(dest) => {
                    self.relocated += 1;
                    debug!("{} -> {}", item.path().display(), dest.display());
                }
                Outcome::SkippedNonDicom => {
                    self.skipped += 1;
                }
                Outcome::Failed(record) => {
                    warn!("failed {}: {}", item.path().display(), record.error_info);
                    self.failures.push(record);
                }
            }
        }
    }

    /// Processes one work item through parse, extract, derive and transfer
    fn process(&self, item: &WorkItem) -> Outcome {
        let src = item.path();
        if !is_dicom_file(&src) {
            return Outcome::SkippedNonDicom;
        }
        match self.relocate(item, &src) {
            Ok(dest) => Outcome::Relocated(dest),
            Err(e) => Outcome::Failed(FailureRecord::from_item(item, &e)),
        }
    }

    fn relocate(&self, item: &WorkItem, src: &Path) -> Result<PathBuf> {
        let dcm = open_file(src)?;
        let fields = self.fields.extract_all(&dcm)?;
        let relative = self.layout.derive(&fields)?;
        let dest_dir = self.out_root.join(relative);
        fs::create_dir_all(&dest_dir)?;
        let dest = next_free_name(&dest_dir, &item.file_name);
        match self.mode {
            TransferMode::Copy => {
                fs::copy(src, &dest)?;
            }
            TransferMode::Move => move_file(src, &dest)?,
        }
        Ok(dest)
    }

    /// Fast variant for pre-organized trees: a directory with no
    /// subdirectories is one series unit and moves wholesale
    fn walk_fast(&mut self, dir: &Path) -> Result<()> {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else {
                files.push(entry.file_name());
            }
        }

        if subdirs.is_empty() {
            self.process_leaf(dir, files);
        } else {
            for sub in subdirs {
                if let Err(e) = self.walk_fast(&sub) {
                    warn!("skipping unreadable directory {}: {}", sub.display(), e);
                }
            }
        }
        Ok(())
    }

    fn process_leaf(&mut self, dir: &Path, mut files: Vec<OsString>) {
        files.sort();
        let representative = match files.iter().find(|f| is_dicom_file(&dir.join(f))) {
            Some(f) => f.clone(),
            // a leaf with no recognizable DICOM file is expected noise
            None => {
                self.skipped += 1;
                return;
            }
        };

        match self.relocate_dir(dir, &dir.join(&representative)) {
            Ok(dest) => {
                self.relocated += 1;
                debug!("{} -> {}", dir.display(), dest.display());
            }
            Err(e) => {
                warn!("failed {}: {}", dir.display(), e);
                self.failures.push(FailureRecord {
                    dirpath: dir.to_path_buf(),
                    filename: representative.to_string_lossy().into_owned(),
                    error_info: e.to_string(),
                });
            }
        }
    }

    fn relocate_dir(&self, dir: &Path, representative: &Path) -> Result<PathBuf> {
        let dcm = open_file(representative)?;
        let fields = self.fields.extract_all(&dcm)?;
        let relative = self.layout.derive(&fields)?;
        let dest = self.out_root.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let dest = next_free_dir(dest);
        fs::rename(dir, &dest)?;
        Ok(dest)
    }
}
