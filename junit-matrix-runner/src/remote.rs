// Copyright (c) The junit-matrix Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetching zip archives of reports over HTTP.

use crate::errors::RemoteFetchError;
use bytesize::ByteSize;
use camino_tempfile::{Builder, Utf8TempDir};
use std::io::Cursor;
use tracing::debug;
use zip::ZipArchive;

/// Returns true if the input names a remote archive rather than a local path.
pub fn is_remote(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Downloads the zip archive at `url` and extracts it into a fresh temporary directory.
///
/// The directory is removed when the returned handle is dropped. Bodies larger than `max_size`
/// are rejected.
pub fn fetch_archive(url: &str, max_size: ByteSize) -> Result<Utf8TempDir, RemoteFetchError> {
    debug!(url, %max_size, "downloading archive");
    let download_error = |error| RemoteFetchError::Download {
        url: url.to_owned(),
        error: Box::new(error),
    };

    let mut response = ureq::get(url).call().map_err(download_error)?;
    let bytes = response
        .body_mut()
        .with_config()
        .limit(max_size.as_u64())
        .read_to_vec()
        .map_err(download_error)?;
    debug!(url, size = %ByteSize::b(bytes.len() as u64), "download complete");

    extract_archive(url, &bytes)
}

fn extract_archive(url: &str, bytes: &[u8]) -> Result<Utf8TempDir, RemoteFetchError> {
    let dir = Builder::new()
        .prefix("junit-matrix-")
        .tempdir()
        .map_err(|error| RemoteFetchError::TempDir {
            url: url.to_owned(),
            error,
        })?;

    let extract_error = |error| RemoteFetchError::Extract {
        url: url.to_owned(),
        error,
    };
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(extract_error)?;
    archive.extract(dir.path()).map_err(extract_error)?;
    debug!(url, files = archive.len(), dir = %dir.path(), "extracted archive");

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread,
    };
    use test_case::test_case;
    use zip::{ZipWriter, write::SimpleFileOptions};

    /// Serves `body` to a single HTTP request on a local port, and returns the URL to fetch.
    fn serve_once(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bound local port");
        let addr = listener.local_addr().expect("local address");
        thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 0) && line != "\r\n" {
                line.clear();
            }
            let mut stream = reader.into_inner();
            // The client may hang up early once it sees the body is too large.
            _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .and_then(|()| stream.write_all(&body));
        });
        format!("http://{addr}/reports.zip")
    }

    fn sample_archive() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("run-1/TEST-a.xml", SimpleFileOptions::default())
            .expect("started file");
        writer.write_all(b"<testsuite/>").expect("wrote file");
        writer.finish().expect("finished archive").into_inner()
    }

    #[test_case("https://ci.example.com/artifacts.zip", true ; "https")]
    #[test_case("http://localhost:8080/a.zip", true ; "http")]
    #[test_case("reports/run-1", false ; "relative path")]
    #[test_case("/tmp/https://x", false ; "absolute path")]
    #[test_case("ftp://example.com/a.zip", false ; "unsupported scheme")]
    fn remote_inputs(input: &str, expected: bool) {
        assert_eq!(is_remote(input), expected);
    }

    #[test]
    fn extracts_nested_reports() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer
            .start_file("run-1/TEST-a.xml", options)
            .expect("started file");
        writer.write_all(b"<testsuite/>").expect("wrote file");
        writer
            .start_file("run-2/TEST-a.xml", options)
            .expect("started file");
        writer.write_all(b"<testsuite/>").expect("wrote file");
        let bytes = writer.finish().expect("finished archive").into_inner();

        let dir = extract_archive("https://example.com/a.zip", &bytes).expect("extracted");
        assert!(dir.path().join("run-1/TEST-a.xml").is_file());
        assert!(dir.path().join("run-2/TEST-a.xml").is_file());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let error = extract_archive("https://example.com/a.zip", b"not a zip")
            .expect_err("corrupt archive");
        assert!(
            matches!(error, RemoteFetchError::Extract { .. }),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn fetch_within_limit() {
        let url = serve_once(sample_archive());
        let dir = fetch_archive(&url, ByteSize::kib(64)).expect("fetched");
        assert!(dir.path().join("run-1/TEST-a.xml").is_file());
    }

    #[test]
    fn fetch_over_limit() {
        let url = serve_once(vec![0; 4096]);
        let error = fetch_archive(&url, ByteSize::kib(1)).expect_err("body too large");
        assert!(
            matches!(&error, RemoteFetchError::Download { url: u, .. } if *u == url),
            "unexpected error: {error:?}"
        );
    }
}
