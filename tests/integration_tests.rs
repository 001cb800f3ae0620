use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use uidump_reader::DumpReaderError;
use uidump_reader::source::{DirectoryOptions, read_document_file, summarize_directory, summarize_file};

const SMALL_DUMP: &str = r#"<root><node resource-id="x1" text="Hi"/><node/></root>"#;

fn create_temp_file(base_path: &Path, file_name: &str, content: &str,) -> PathBuf {
    let file_path = base_path.join(file_name,);
    let mut file = File::create(&file_path,).expect("Failed to create temp file",);
    file.write_all(content.as_bytes(),)
        .expect("Failed to write to temp file",);
    file_path
}

fn get_fixture_path(file_name: &str,) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"),)
        .join("tests",)
        .join("fixtures",)
        .join(file_name,)
}

fn file_names(results: &[(PathBuf, uidump_reader::Summary,)],) -> Vec<String,> {
    results
        .iter()
        .map(|(p, _,)| p.file_name().unwrap().to_string_lossy().into_owned(),)
        .collect()
}

#[test]
fn test_summarize_fixture_dump() {
    let summary = summarize_file(&get_fixture_path("window_dump.xml",),).unwrap();

    assert_eq!(summary.total_elements(), 8);
    // resource-id="" still counts as present
    assert_eq!(summary.elements_with_resource_id, 4);
    assert_eq!(summary.elements_without_resource_id, 4);
    assert_eq!(summary.elements_focused, 4);
    assert_eq!(summary.elements_not_focused, 4);

    let with: Vec<&str,> = summary
        .with_resource_id_details
        .iter()
        .map(|d| d.xpath.as_str(),)
        .collect();
    assert_eq!(
        with,
        vec![
            "/hierarchy[1]/node[1]",
            "/hierarchy[1]/node[1]/node[1]",
            "/hierarchy[1]/node[1]/node[1]/node[1]",
            "/hierarchy[1]/node[1]/node[2]",
        ]
    );

    let search = &summary.with_resource_id_details[3];
    assert_eq!(search.resource_id.as_deref(), Some("com.example.notes:id/search"));
    assert_eq!(search.text.as_deref(), Some("Search"));
    assert_eq!(search.focused.as_deref(), Some("true"));
    assert_eq!(search.bounds.as_deref(), Some("[42,231][1038,357]"));

    let missing = &summary.missing_resource_id_details;
    assert_eq!(missing[0].xpath, "/hierarchy[1]");
    assert_eq!(missing[0].resource_id, None);
    assert_eq!(missing[3].xpath, "/hierarchy[1]/node[1]/node[3]/node[2]");
    assert_eq!(missing[3].text.as_deref(), Some("Ideas & plans"));
}

#[test]
fn test_summarize_utf16_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("utf16.xml",);
    let mut bytes = vec![0xFF, 0xFE];
    for unit in SMALL_DUMP.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes(),);
    }
    fs::write(&path, bytes,).unwrap();

    let summary = summarize_file(&path,).unwrap();
    assert_eq!(summary.elements_with_resource_id, 1);
    assert_eq!(summary.elements_without_resource_id, 2);
}

#[test]
fn test_utf8_character_across_sniff_boundary() {
    let dir = tempdir().unwrap();
    let prologs = [
        ("declared.xml", "<?xml version='1.0' encoding='UTF-8'?>",),
        ("bare.xml", "",),
    ];
    for (file_name, prolog,) in prologs {
        // Pad so that the first byte of 日 is the last byte of the 4096-byte sniff window.
        let open_tag = "<hierarchy pad=\"\">";
        let padding = "a".repeat(4095 - prolog.len() - open_tag.len(),);
        let content = format!(
            "{prolog}<hierarchy pad=\"{padding}\">日本<node text=\"é\"/></hierarchy>"
        );
        assert_eq!(content.find('日',), Some(4095));
        let path = create_temp_file(dir.path(), file_name, &content,);

        let decoded = read_document_file(&path,).unwrap();
        assert_eq!(decoded, content, "{file_name}");

        let summary = summarize_file(&path,).unwrap();
        assert_eq!(summary.missing_resource_id_details[1].text.as_deref(), Some("é"));
    }
}

#[test]
fn test_read_document_file_rejects_directory() {
    let dir = tempdir().unwrap();
    let result = read_document_file(dir.path(),);
    assert!(matches!(result, Err(DumpReaderError::IsADirectory { .. })));
}

#[test]
fn test_read_document_file_missing() {
    let dir = tempdir().unwrap();
    let result = read_document_file(&dir.path().join("nope.xml",),);
    assert!(matches!(result, Err(DumpReaderError::FileReadError { .. })));
}

#[test]
fn test_summarize_malformed_file() {
    let dir = tempdir().unwrap();
    let path = create_temp_file(dir.path(), "broken.xml", "<root><node></root>",);
    let err = summarize_file(&path,).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_summarize_directory_basic() {
    let dir = tempdir().unwrap();
    create_temp_file(dir.path(), "b.xml", SMALL_DUMP,);
    create_temp_file(dir.path(), "a.xml", "<hierarchy/>",);
    create_temp_file(dir.path(), "notes.txt", "not a dump",);
    create_temp_file(dir.path(), ".hidden.xml", SMALL_DUMP,);

    let results = summarize_directory(dir.path(), &DirectoryOptions::default(),).unwrap();
    assert_eq!(file_names(&results), vec!["a.xml", "b.xml"]);
    assert_eq!(results[0].1.elements_without_resource_id, 1);
    assert_eq!(results[1].1.elements_with_resource_id, 1);
}

#[test]
fn test_summarize_directory_skips_malformed() {
    let dir = tempdir().unwrap();
    create_temp_file(dir.path(), "good.xml", SMALL_DUMP,);
    create_temp_file(dir.path(), "bad.xml", "<root>",);

    let results = summarize_directory(dir.path(), &DirectoryOptions::default(),).unwrap();
    assert_eq!(file_names(&results), vec!["good.xml"]);
}

#[test]
fn test_summarize_directory_filter() {
    let dir = tempdir().unwrap();
    create_temp_file(dir.path(), "a.xml", SMALL_DUMP,);
    create_temp_file(dir.path(), "b.uix", SMALL_DUMP,);

    let options = DirectoryOptions {
        recursive:   false,
        filter_exts: Some(vec!["UIX".to_string()],),
    };
    let results = summarize_directory(dir.path(), &options,).unwrap();
    assert_eq!(file_names(&results), vec!["b.uix"]);
}

#[test]
fn test_summarize_directory_recursive() {
    let dir = tempdir().unwrap();
    create_temp_file(dir.path(), "top.xml", SMALL_DUMP,);
    let subdir = dir.path().join("subdir",);
    fs::create_dir(&subdir,).unwrap();
    create_temp_file(&subdir, "nested.xml", SMALL_DUMP,);

    let flat = summarize_directory(dir.path(), &DirectoryOptions::default(),).unwrap();
    assert_eq!(file_names(&flat), vec!["top.xml"]);

    let options = DirectoryOptions {
        recursive:   true,
        filter_exts: None,
    };
    let results = summarize_directory(dir.path(), &options,).unwrap();
    assert_eq!(results.len(), 2);
    assert!(
        results
            .iter()
            .any(|(p, _,)| p.parent().unwrap().ends_with("subdir",),)
    );
}

#[test]
fn test_cli_file_json_to_stdout() -> Result<(), Box<dyn std::error::Error,>,> {
    let mut cmd = assert_cmd::Command::cargo_bin("uidump-reader",)?;
    let output = cmd
        .arg("--file-path",)
        .arg(get_fixture_path("window_dump.xml",),)
        .args(["--format", "json",],)
        .output()?;
    assert!(output.status.success());

    let json_output: serde_json::Value = serde_json::from_slice(&output.stdout,)?;
    assert_eq!(json_output["elements_with_resource_id"], 4);
    assert_eq!(json_output["elements_not_focused"], 4);
    assert_eq!(
        json_output["missing_resource_id_details"][0]["xpath"],
        "/hierarchy[1]"
    );
    Ok((),)
}

#[test]
fn test_cli_output_to_file_infers_format() -> Result<(), Box<dyn std::error::Error,>,> {
    let temp_dir = tempdir()?;
    let input_file_path = create_temp_file(temp_dir.path(), "dump.xml", SMALL_DUMP,);
    let output_file_path = temp_dir.path().join("summary.yaml",);

    let mut cmd = assert_cmd::Command::cargo_bin("uidump-reader",)?;
    cmd.arg("--file-path",)
        .arg(&input_file_path,)
        .arg("--output-path",)
        .arg(&output_file_path,)
        .assert()
        .success();

    let output_content = fs::read_to_string(&output_file_path,)?;
    let summary: uidump_reader::Summary = serde_yaml::from_str(&output_content,)?;
    assert_eq!(summary.elements_with_resource_id, 1);
    assert_eq!(summary.elements_without_resource_id, 2);
    Ok((),)
}

#[test]
fn test_cli_directory_results() -> Result<(), Box<dyn std::error::Error,>,> {
    let temp_dir = tempdir()?;
    create_temp_file(temp_dir.path(), "one.xml", SMALL_DUMP,);
    create_temp_file(temp_dir.path(), "two.xml", "<hierarchy><node focused=\"true\"/></hierarchy>",);
    let output_file_path = temp_dir.path().join("dir_output.json",);

    let mut cmd = assert_cmd::Command::cargo_bin("uidump-reader",)?;
    cmd.arg("--directory-path",)
        .arg(temp_dir.path(),)
        .arg("--output-path",)
        .arg(&output_file_path,)
        .assert()
        .success();

    let output_content = fs::read_to_string(&output_file_path,)?;
    let json_output: serde_json::Value = serde_json::from_str(&output_content,)?;
    let entries = json_output.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let two = entries
        .iter()
        .find(|item| item["path"].as_str().unwrap().ends_with("two.xml",),)
        .unwrap();
    assert_eq!(two["result"]["elements_focused"], 1);
    assert_eq!(two["result"]["elements_not_focused"], 1);
    Ok((),)
}

#[test]
fn test_cli_malformed_file_fails() -> Result<(), Box<dyn std::error::Error,>,> {
    let temp_dir = tempdir()?;
    let input_file_path = create_temp_file(temp_dir.path(), "broken.xml", "<a><b></a>",);

    let mut cmd = assert_cmd::Command::cargo_bin("uidump-reader",)?;
    cmd.arg("--file-path",).arg(&input_file_path,).assert().failure();
    Ok((),)
}

#[test]
fn test_cli_requires_one_input() -> Result<(), Box<dyn std::error::Error,>,> {
    let mut cmd = assert_cmd::Command::cargo_bin("uidump-reader",)?;
    cmd.args(["--format", "json",],).assert().failure();

    let mut cmd = assert_cmd::Command::cargo_bin("uidump-reader",)?;
    cmd.args(["--file-path", "a.xml", "--serve",],).assert().failure();
    Ok((),)
}
