#![allow(dead_code)]

use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;

use fieldspec_batch::{HarnessConfig, JOB_KEY_VAR, StoreLocation};
use zip::write::SimpleFileOptions;

pub const JOB_KEY: &str = "1559729197714-nih.zip";

pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Write `archive` under `JOB_KEY` in a fresh store directory.
pub fn archive_store(root: &Path, archive: &[u8]) -> PathBuf {
    let store = root.join("store");
    std::fs::create_dir_all(&store).unwrap();
    std::fs::write(store.join(JOB_KEY), archive).unwrap();
    store
}

/// Config running `run.sh` with `sh`, installing via `sh requirements.sh`.
pub fn sh_config(store: StoreLocation, work_dir: PathBuf) -> HarnessConfig {
    let mut config = HarnessConfig::from_lookup(|name| {
        (name == JOB_KEY_VAR).then(|| JOB_KEY.to_string())
    })
    .unwrap();
    config.object_store = store;
    config.work_dir = work_dir;
    config.interpreter = "sh".into();
    config.entry_point = "run.sh".into();
    config.install_cmd = vec!["sh".into()];
    config.requirements = "requirements.sh".into();
    config
}

/// Serve `body` to a single HTTP request and return the base URL.
pub fn serve_once(body: Vec<u8>) -> String {
    serve_once_with_status("200 OK", body)
}

pub fn serve_once_with_status(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let reader = BufReader::new(&stream);
        for line in reader.lines() {
            match line {
                Ok(l) if l.is_empty() => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(header.as_bytes());
        let _ = stream.write_all(&body);
    });
    format!("http://{addr}/batch")
}
