use std::cell::{Cell, RefCell};
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;

thread_local! {
    static LOG_FILE: RefCell<Option<File>> = const { RefCell::new(None) };
    static QUIET: Cell<bool> = const { Cell::new(false) };
}

fn timestamped(data: &str) -> String {
    format!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"), data)
}

/// Appends every following log line to `path` as well, creating parent
/// directories as needed.
pub fn open(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    LOG_FILE.with(|cell| cell.replace(Some(file)));
    Ok(())
}

/// Silences stderr output. The log file, if any, still receives lines.
pub fn set_quiet(quiet: bool) {
    QUIET.with(|cell| cell.set(quiet));
}

fn quiet() -> bool {
    QUIET.with(Cell::get)
}

/// Writes one timestamped line per input line.
pub fn write(data: &str) {
    for line in data.split('\n') {
        let line = timestamped(line);
        if !quiet() {
            eprintln!("{line}");
        }
        LOG_FILE.with(|cell| {
            if let Some(file) = cell.borrow_mut().as_mut() {
                // A failing log file must not abort the run.
                let _ = writeln!(file, "{line}");
            }
        });
    }
}

/// Progress percentage, overwritten in place on stderr. Never logged to file.
pub fn progress(percent: u32) {
    if !quiet() {
        eprint!("{percent}% complete\r");
    }
}

pub fn close() {
    LOG_FILE.with(|cell| {
        if let Some(mut file) = cell.take() {
            let _ = file.flush();
        }
    });
}
