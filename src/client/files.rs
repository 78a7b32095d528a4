//! Remote path helpers and chunked copying for file transfers

use std::io::{ErrorKind, Read, Write};

/// Split a remote path into its directory and final component.
///
/// `/a/b/c.txt` gives `("/a/b", "c.txt")`, `/a/b/` gives `("/a/b", "")`,
/// `/c.txt` gives `("/", "c.txt")` and a bare name has an empty directory.
pub fn split_remote_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        None => ("", path),
        Some(idx) => {
            let head = &path[..=idx];
            let tail = &path[idx + 1..];
            let trimmed = head.trim_end_matches('/');
            if trimmed.is_empty() {
                (head, tail)
            } else {
                (trimmed, tail)
            }
        }
    }
}

/// Final `/`-separated segment of a remote path
pub fn remote_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Copy `reader` into `writer` in chunks of at most `chunk_size` bytes,
/// preserving order and skipping empty reads. Returns the bytes written.
pub fn copy_chunks<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> std::io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        written += n as u64;
    }
    writer.flush()?;
    Ok(written)
}
