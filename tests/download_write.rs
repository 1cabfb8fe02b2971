use safedoc::download::trigger_download;
use tempfile::TempDir;

#[test]
fn writes_bytes_and_releases_the_transient_handle() {
    let dir = TempDir::new().expect("temp dir");
    let path =
        trigger_download(b"abc", "a.txt", "text/plain", dir.path()).expect("write export");
    assert_eq!(std::fs::read(&path).expect("read back"), b"abc");

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().into_string().expect("utf-8 name"))
        .collect();
    assert_eq!(names, vec!["a.txt".to_string()]);
}

#[test]
fn creates_the_output_directory_on_demand() {
    let dir = TempDir::new().expect("temp dir");
    let nested = dir.path().join("out").join("exports");
    let path = trigger_download(b"{}", "b.json", "application/json", &nested)
        .expect("write export");
    assert!(path.starts_with(&nested));
    assert!(path.exists());
}

#[test]
fn same_name_overwrites_the_previous_export() {
    let dir = TempDir::new().expect("temp dir");
    trigger_download(b"first", "c.csv", "text/csv", dir.path()).expect("first write");
    let path = trigger_download(b"second", "c.csv", "text/csv", dir.path())
        .expect("second write");
    assert_eq!(std::fs::read(&path).expect("read back"), b"second");
}
