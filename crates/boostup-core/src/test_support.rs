//! In-memory fakes for the network, process and progress seams.
//!
//! All three append to one shared [`EventLog`] so tests can assert on the
//! exact order of side effects across collaborators.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use boostup_schema::{AddressModel, Version};
use bzip2::Compression;
use bzip2::write::BzEncoder;
use reqwest::Url;

use crate::catalog::ReleaseCatalog;
use crate::context::Context;
use crate::error::{ProvisionError, Result};
use crate::host::Host;
use crate::io::fetch::{Fetch, Progress};
use crate::io::process::{CommandRunner, Invocation};
use crate::paths::Layout;
use crate::reporter::Reporter;

pub(crate) const INDEX_URL: &str = "https://www.boost.org/users/history/";

/// Ordered record of side effects.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

fn underscored(version: &str) -> String {
    version.replace('.', "_")
}

pub(crate) fn release_page_url(version: &str) -> String {
    format!("{INDEX_URL}version_{}.html", underscored(version))
}

pub(crate) fn archive_url(version: &str) -> String {
    format!(
        "https://archives.boost.io/release/{version}/source/boost_{}.tar.bz2",
        underscored(version)
    )
}

/// A history page listing `(version, has_download_link)` newest first.
pub(crate) fn history_html(entries: &[(&str, bool)]) -> String {
    let mut html = String::from("<html><body>\n<a href=\"/\">Boost C++ Libraries</a>\n");
    for (version, downloadable) in entries {
        html.push_str(&format!(
            "<h2><span><a href=\"/users/history/version_{}.html\">Version {version}</a></span></h2>\n\
             <p><a href=\"/doc/libs/{}/\">Documentation</a></p>\n",
            underscored(version),
            underscored(version),
        ));
        if *downloadable {
            html.push_str(&format!(
                "<p><a href=\"https://sourceforge.net/projects/boost/files/boost/{version}/\">Download</a></p>\n"
            ));
        }
    }
    html.push_str("</body></html>\n");
    html
}

pub(crate) fn release_page_html(version: &str) -> String {
    let us = underscored(version);
    format!(
        "<html><body>\n\
         <a href=\"https://archives.boost.io/release/{version}/source/boost_{us}.7z\">boost_{us}.7z</a>\n\
         <a href=\"{}\">boost_{us}.tar.bz2</a>\n\
         </body></html>\n",
        archive_url(version)
    )
}

/// A minimal source release tarball for `version`.
pub(crate) fn boost_source_archive(version: &str) -> Vec<u8> {
    let dir = format!("boost_{}", underscored(version));
    let entries: [(String, &[u8]); 3] = [
        (format!("{dir}/bootstrap.sh"), b"#!/bin/sh\necho bootstrap\n"),
        (format!("{dir}/bootstrap.bat"), b"@echo bootstrap\r\n"),
        (format!("{dir}/boost/version.hpp"), b"#define BOOST_VERSION 0\n"),
    ];

    let encoder = BzEncoder::new(Vec::new(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (path, data) in &entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Serves canned pages and files.
pub(crate) struct FakeFetch {
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    log: EventLog,
}

impl FakeFetch {
    pub(crate) fn new(log: EventLog) -> Self {
        Self {
            pages: HashMap::new(),
            files: HashMap::new(),
            log,
        }
    }

    pub(crate) fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub(crate) fn with_file(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), bytes);
        self
    }

    /// Register the release page and archive of `version`.
    pub(crate) fn with_release(self, version: &str) -> Self {
        self.with_page(&release_page_url(version), release_page_html(version))
            .with_file(&archive_url(version), boost_source_archive(version))
    }
}

fn not_found(url: &Url) -> ProvisionError {
    ProvisionError::Io(io::Error::new(io::ErrorKind::NotFound, format!("404 {url}")))
}

#[async_trait]
impl Fetch for FakeFetch {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        self.log.push(format!("fetch {url}"));
        self.pages.get(url.as_str()).cloned().ok_or_else(|| not_found(url))
    }

    async fn download(&self, url: &Url, dest: &Path, progress: Progress<'_>) -> Result<u64> {
        self.log.push(format!("download {url}"));
        let bytes = self.files.get(url.as_str()).ok_or_else(|| not_found(url))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, bytes)?;
        let len = bytes.len() as u64;
        progress(len, Some(len));
        Ok(len)
    }
}

/// Pretends to be bash/bootstrap and b2 by creating their outputs.
pub(crate) struct FakeRunner {
    log: EventLog,
    fail_on: Option<&'static str>,
}

impl FakeRunner {
    pub(crate) fn new(log: EventLog) -> Self {
        Self { log, fail_on: None }
    }

    /// Exit with status 1 for any command line containing `needle`.
    pub(crate) fn failing_on(mut self, needle: &'static str) -> Self {
        self.fail_on = Some(needle);
        self
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let line = invocation.to_string();
        let args = invocation.arg_strings();
        let kind = if line.contains("bootstrap") {
            "bootstrap"
        } else if args.iter().any(|a| a == "install") {
            "install"
        } else {
            "b2"
        };
        self.log.push(format!("run {kind} {line}"));

        if self.fail_on.is_some_and(|needle| line.contains(needle)) {
            if let Some(log) = &invocation.log {
                std::fs::create_dir_all(log.parent().unwrap())?;
                std::fs::write(log, "compiling...\nerror: simulated failure\n")?;
            }
            return Ok(Some(1));
        }

        match kind {
            "bootstrap" => std::fs::write(invocation.cwd.join("b2"), b"")?,
            "install" => {
                let prefix = args
                    .iter()
                    .find_map(|a| a.strip_prefix("--prefix="))
                    .unwrap();
                let prefix = Path::new(prefix);
                std::fs::create_dir_all(prefix.join("include/boost"))?;
                std::fs::write(prefix.join("include/boost/version.hpp"), b"")?;
                std::fs::create_dir_all(prefix.join("lib"))?;
                std::fs::write(prefix.join("lib/libboost_system.so"), b"")?;
            }
            _ => {}
        }
        Ok(Some(0))
    }
}

/// Records extraction, completion and cache-hit notifications.
pub(crate) struct RecordingReporter {
    log: EventLog,
}

impl RecordingReporter {
    pub(crate) fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl Reporter for RecordingReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &Version, _: u64, _: Option<u64>) {}
    fn extracting(&self, version: &Version, _: &Path) {
        self.log.push(format!("extract {version}"));
    }
    fn running(&self, _: &Invocation) {}
    fn done(&self, _: &Version, _: &str) {}
    fn cached(&self, version: &Version, _: &Path) {
        self.log.push(format!("cached {version}"));
    }
    fn info(&self, _: &str) {}
    fn warning(&self, msg: &str) {
        self.log.push(format!("warning {msg}"));
    }
    fn error(&self, msg: &str) {
        self.log.push(format!("error {msg}"));
    }
}

pub(crate) fn gcc_host() -> Host {
    Host::from_identity("GCC 9.3.0", AddressModel::Bits64, None).unwrap()
}

pub(crate) fn test_context(home: &Path, fetch: FakeFetch, runner: FakeRunner, log: &EventLog) -> Context {
    let catalog = ReleaseCatalog::new(Arc::new(fetch), Url::parse(INDEX_URL).unwrap());
    Context::new(
        gcc_host(),
        Layout::new(home),
        catalog,
        Arc::new(runner),
        Arc::new(RecordingReporter::new(log.clone())),
    )
}

/// Context whose index lists `versions` (all downloadable) with working release pages.
pub(crate) fn fixture(home: &Path, versions: &[&str]) -> (Context, EventLog) {
    let log = EventLog::default();
    let entries: Vec<(&str, bool)> = versions.iter().map(|v| (*v, true)).collect();
    let fetch = versions.iter().fold(
        FakeFetch::new(log.clone()).with_page(INDEX_URL, history_html(&entries)),
        |fetch, v| fetch.with_release(v),
    );
    let ctx = test_context(home, fetch, FakeRunner::new(log.clone()), &log);
    (ctx, log)
}
