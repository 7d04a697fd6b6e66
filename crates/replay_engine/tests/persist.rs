use std::fs;
use std::path::Path;

use replay_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn nested_output_dirs_are_created() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("exports").join("2024");
    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn rewriting_posts_file_replaces_it_whole() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("posts.json", "[]").unwrap();
    let second = writer.write("posts.json", r#"[{"post_index":1}]"#).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), r#"[{"post_index":1}]"#);

    let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("out");
    fs::write(&blocker, "x").unwrap();

    let err = AtomicFileWriter::new(blocker.clone())
        .write("posts.json", "[]")
        .unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
    assert!(!blocker.with_file_name("posts.json").exists());
}

#[test]
fn bare_file_names_write_to_the_current_directory() {
    let (_writer, filename) = AtomicFileWriter::for_path(Path::new("posts.json")).unwrap();
    assert_eq!(filename, "posts.json");
    assert!(AtomicFileWriter::for_path(Path::new("/")).is_err());
}
