//! Integration tests for the native host: upward search and encoded round trips.

use std::path::Path;
use tempfile::TempDir;
use typeplan_host::{ByteOrderMark, IoHost, NativeHost};

fn project() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join("src/app/widgets")).expect("create dirs");
    std::fs::create_dir_all(dir.path().join("typings")).expect("create typings");
    std::fs::write(dir.path().join("typings/lib.d.ts"), "declare var x: number;")
        .expect("write lib");
    std::fs::write(dir.path().join("src/app/util.ts"), "export var u = 1;").expect("write util");
    dir
}

#[tokio::test]
async fn finds_file_in_start_directory() {
    let project = project();
    let host = NativeHost::new(project.path());

    let found = host
        .find_file_upward(&project.path().join("src/app"), Path::new("util.ts"))
        .await
        .unwrap()
        .expect("util.ts should be found");
    assert_eq!(found.path(), project.path().join("src/app/util.ts"));
}

#[tokio::test]
async fn finds_file_in_ancestor_directory() {
    let project = project();
    let host = NativeHost::new(project.path());

    let found = host
        .find_file_upward(
            &project.path().join("src/app/widgets"),
            Path::new("typings/lib.d.ts"),
        )
        .await
        .unwrap()
        .expect("lib.d.ts should be found three levels up");
    assert_eq!(found.path(), project.path().join("typings/lib.d.ts"));
    assert_eq!(found.text(), "declare var x: number;");
}

#[tokio::test]
async fn missing_file_terminates_with_none() {
    let project = project();
    let host = NativeHost::new(project.path());

    let found = host
        .find_file_upward(
            &project.path().join("src/app/widgets"),
            Path::new("does/not/exist-7f3a.ts"),
        )
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn directories_are_not_matches() {
    let project = project();
    let host = NativeHost::new(project.path());

    let found = host
        .find_file_upward(&project.path().join("src/app/widgets"), Path::new("typings"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn relative_start_dir_resolves_against_cwd() {
    let project = project();
    let host = NativeHost::new(project.path());

    let found = host
        .find_file_upward(Path::new("src/app/widgets"), Path::new("../util.ts"))
        .await
        .unwrap()
        .expect("sibling reference should resolve");
    assert_eq!(found.path(), project.path().join("src/app/util.ts"));
}

#[tokio::test]
async fn utf16le_round_trip() {
    let project = project();
    let host = NativeHost::new(project.path());
    let original = "module greet { export var s = \"¡hola!\"; }";
    let path = project.path().join("out/le.ts");

    host.write_file(&path, original, ByteOrderMark::Utf16Le)
        .await
        .unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[..2], &[0xFF, 0xFE]);

    host.clear_cache();
    let read = host.read_file(&path).await.unwrap();
    assert_eq!(read.text(), original);
    assert_eq!(read.marker(), ByteOrderMark::Utf16Le);
}

#[tokio::test]
async fn utf8_marker_is_preserved_when_requested() {
    let project = project();
    let host = NativeHost::new(project.path());
    let path = project.path().join("bom.js");

    host.write_file(&path, "var a;", ByteOrderMark::Utf8)
        .await
        .unwrap();
    let raw = std::fs::read(&path).unwrap();
    assert_eq!(raw, b"\xEF\xBB\xBFvar a;");

    let read = host.read_file(&path).await.unwrap();
    assert_eq!(read.text(), "var a;");
    assert_eq!(read.marker(), ByteOrderMark::Utf8);
}
