use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Builds an in-memory zip archive holding `entries` in the given order.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        writer.start_file(*name, options).expect("failed to start zip entry");
        writer.write_all(bytes).expect("failed to write zip entry");
    }
    writer.finish().expect("failed to finish zip").into_inner()
}

/// Creates a unique temporary directory standing in for the state repository.
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_repo_dir() -> TempDir {
    TempDir::new().expect("failed to create tempdir")
}
