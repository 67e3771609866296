//! Named-pipe helpers shared by the camera and engine tests.
#![allow(dead_code)]

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Create a FIFO in `dir` and return its canonical path.
pub fn make_fifo(dir: &Path) -> PathBuf {
    let path = dir.join("camera.fifo");
    let status = Command::new("mkfifo").arg(&path).status().expect("run mkfifo");
    assert!(status.success(), "mkfifo failed");
    fs::canonicalize(&path).expect("canonical fifo path")
}

/// Open the encoder side. Read-write so the open does not wait for a reader.
pub fn open_encoder(fifo: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(fifo)
        .expect("open fifo writer")
}

/// Number of descriptors this process holds on `path`.
pub fn open_handles(path: &Path) -> usize {
    fs::read_dir("/proc/self/fd")
        .expect("list fds")
        .filter_map(Result::ok)
        .filter(|entry| {
            fs::read_link(entry.path())
                .map(|target| target == path)
                .unwrap_or(false)
        })
        .count()
}
