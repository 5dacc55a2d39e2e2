//! Archive extraction module
//!
//! Boost ships its sources as bzip2-compressed tarballs with a single
//! top-level `boost_X_Y_Z/` directory.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use bzip2::read::BzDecoder;
use thiserror::Error;

const BZIP2_MAGIC: &[u8; 3] = b"BZh";

/// Errors produced while unpacking an archive.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Filesystem or decoder I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive is malformed or unsafe to unpack.
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Extract a tar.bz2 archive into `dest_dir`, returning the number of entries written.
pub fn extract_tar_bz2(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractError> {
    let mut file = File::open(archive_path)?;

    let mut magic = [0u8; 3];
    match file.read_exact(&mut magic) {
        Ok(()) if &magic == BZIP2_MAGIC => {}
        Ok(()) => {
            return Err(ExtractError::Archive(format!(
                "{} is not a bzip2 archive",
                archive_path.display()
            )));
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ExtractError::Archive(format!(
                "{} is truncated",
                archive_path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    }
    file.seek(SeekFrom::Start(0))?;

    extract_tar(BzDecoder::new(BufReader::new(file)), dest_dir)
}

/// Extract a tar archive from a reader
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<usize, ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    let mut count = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative_path: PathBuf = entry.path()?.components().collect();

        // Reject anything that could escape dest_dir (Zip Slip)
        if relative_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                relative_path.display()
            )));
        }

        // unpack_in refuses to write through links that resolve outside dest_dir
        let is_dir = entry.header().entry_type().is_dir();
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::Archive(format!(
                "Refusing to unpack outside destination: {}",
                relative_path.display()
            )));
        }
        if !is_dir {
            count += 1;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::Compression;
    use bzip2::write::BzEncoder;
    use tempfile::tempdir;

    fn tar_bz2(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = BzEncoder::new(Vec::new(), Compression::fast());
        let mut builder = tar::Builder::new(encoder);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_extracts_nested_tree() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("boost_1_60_0.tar.bz2");
        fs::write(
            &archive,
            tar_bz2(&[
                ("boost_1_60_0/bootstrap.sh", b"#!/bin/sh\n"),
                ("boost_1_60_0/boost/version.hpp", b"#define BOOST_VERSION 106000\n"),
            ]),
        )
        .unwrap();

        let dest = tmp.path().join("out");
        let count = extract_tar_bz2(&archive, &dest).unwrap();

        assert_eq!(count, 2);
        assert!(dest.join("boost_1_60_0/bootstrap.sh").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("boost_1_60_0/boost/version.hpp")).unwrap(),
            "#define BOOST_VERSION 106000\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_write_through_symlink() {
        let tmp = tempdir().unwrap();
        let outside = tmp.path().join("outside");
        fs::create_dir(&outside).unwrap();

        let encoder = BzEncoder::new(Vec::new(), Compression::fast());
        let mut builder = tar::Builder::new(encoder);
        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        link.set_mode(0o777);
        builder
            .append_link(&mut link, "boost_1_60_0/evil", &outside)
            .unwrap();
        let mut file = tar::Header::new_gnu();
        file.set_size(4);
        file.set_mode(0o644);
        file.set_cksum();
        builder
            .append_data(&mut file, "boost_1_60_0/evil/x", &b"pwnd"[..])
            .unwrap();
        let archive = tmp.path().join("boost_1_60_0.tar.bz2");
        fs::write(&archive, builder.into_inner().unwrap().finish().unwrap()).unwrap();

        let dest = tmp.path().join("out");
        assert!(extract_tar_bz2(&archive, &dest).is_err());
        assert!(!outside.join("x").exists());
    }

    #[test]
    fn test_rejects_non_bzip2() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("bogus.tar.bz2");
        fs::write(&archive, b"<html>not found</html>").unwrap();

        let err = extract_tar_bz2(&archive, tmp.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Archive(_)));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("empty.tar.bz2");
        fs::write(&archive, b"B").unwrap();

        let err = extract_tar_bz2(&archive, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }
}
