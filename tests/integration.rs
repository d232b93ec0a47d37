use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

fn papers_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("papers");
    path
}

/// Writes a config pointing the corpus into the temp dir and arXiv at
/// `arxiv_url`.
fn setup_test_env(arxiv_url: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[storage]
root = "{}/corpus"

[arxiv]
base_url = "{}"
timeout_secs = 5

[server]
bind = "127.0.0.1:7332"
"#,
        root.display(),
        arxiv_url
    );

    let config_path = config_dir.join("papers.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn seed_topic(root: &Path, slug: &str, json: &str) {
    let dir = root.join("corpus").join(slug);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("papers_info.json"), json).unwrap();
}

fn run_papers(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = papers_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run papers binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

const QUANTUM_STORE: &str = r#"{
  "2301.07041v1": {
    "title": "Surface codes",
    "authors": ["Grace Hopper"],
    "summary": "Codes on surfaces.",
    "pdf_url": "http://arxiv.org/pdf/2301.07041v1",
    "published": "2023-01-17"
  }
}"#;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2406.12345v1</id>
    <published>2024-06-18T08:30:00Z</published>
    <title>Topological qubits</title>
    <summary>Anyons.</summary>
    <author><name>Kitaev</name></author>
    <link title="pdf" href="http://arxiv.org/pdf/2406.12345v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

/// Serves `FEED` for every query on a background runtime; returns the
/// query URL.
fn spawn_arxiv_stub() -> String {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let app = axum::Router::new().route(
                "/api/query",
                axum::routing::get(|| async {
                    (
                        [(axum::http::header::CONTENT_TYPE, "application/atom+xml")],
                        FEED,
                    )
                }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    let addr = rx.recv().unwrap();
    format!("http://{}/api/query", addr)
}

fn write_two_page_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in ["Page 1", "Page 2"] {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 2,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_help() {
    let binary = papers_binary();
    let output = Command::new(&binary).arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("search"));
    assert!(stdout.contains("info"));
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("topics"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_search_stores_and_prints_ids() {
    let url = spawn_arxiv_stub();
    let (tmp, config) = setup_test_env(&url);

    let (stdout, stderr, success) =
        run_papers(&config, &["search", "Quantum Computing", "--max-results", "3"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("2406.12345v1"));
    assert!(stdout.contains("Results are saved in:"));

    let stored = fs::read_to_string(
        tmp.path()
            .join("corpus")
            .join("quantum_computing")
            .join("papers_info.json"),
    )
    .unwrap();
    assert!(stored.contains("\"Topological qubits\""));
    assert!(stored.contains("\"2024-06-18\""));
}

#[test]
fn test_search_with_unreachable_arxiv_fails() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    let (_, _, success) = run_papers(&config, &["search", "anything"]);
    assert!(!success);
    assert!(!tmp.path().join("corpus").join("anything").exists());
}

#[test]
fn test_info_found() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    seed_topic(tmp.path(), "quantum_computing", QUANTUM_STORE);

    let (stdout, stderr, success) = run_papers(&config, &["info", "2301.07041v1"]);
    assert!(success, "info failed: {}", stderr);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["title"], "Surface codes");
    assert_eq!(value["published"], "2023-01-17");
}

#[test]
fn test_info_not_found() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    seed_topic(tmp.path(), "quantum_computing", QUANTUM_STORE);

    let (stdout, _, success) = run_papers(&config, &["info", "0000.00000v0"]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "There's no saved information related to paper 0000.00000v0."
    );
}

#[test]
fn test_info_skips_corrupted_topic() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    seed_topic(tmp.path(), "aaa_broken", "{ not json");
    seed_topic(tmp.path(), "quantum_computing", QUANTUM_STORE);

    let (stdout, _, success) = run_papers(&config, &["info", "2301.07041v1"]);
    assert!(success);
    assert!(stdout.contains("Surface codes"));
}

#[test]
fn test_root_flag_overrides_config() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    let other = tmp.path().join("elsewhere");
    let dir = other.join("ml");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("papers_info.json"), QUANTUM_STORE).unwrap();

    let (stdout, _, success) = run_papers(
        &config,
        &["--root", other.to_str().unwrap(), "info", "2301.07041v1"],
    );
    assert!(success);
    assert!(stdout.contains("Surface codes"));
}

#[test]
fn test_topics_lists_status() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    seed_topic(tmp.path(), "quantum_computing", QUANTUM_STORE);
    seed_topic(tmp.path(), "broken", "[1, 2");

    let (stdout, _, success) = run_papers(&config, &["topics"]);
    assert!(success);
    let quantum = stdout
        .lines()
        .find(|l| l.starts_with("quantum_computing"))
        .unwrap();
    assert!(quantum.contains("ok"));
    assert!(quantum.contains(" 1 "));
    let broken = stdout.lines().find(|l| l.starts_with("broken")).unwrap();
    assert!(broken.contains("corrupted"));
}

#[test]
fn test_topics_empty_corpus() {
    let (_tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    let (stdout, _, success) = run_papers(&config, &["topics"]);
    assert!(success);
    assert!(stdout.contains("No topic stores"));
}

#[test]
fn test_extract_writes_sibling_text_file() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    let pdf = tmp.path().join("paper.pdf");
    write_two_page_pdf(&pdf);

    let (stdout, stderr, success) = run_papers(&config, &["extract", pdf.to_str().unwrap()]);
    assert!(success, "extract failed: {}", stderr);
    let txt = tmp.path().join("paper.txt");
    assert_eq!(stdout.trim(), txt.display().to_string());
    assert_eq!(fs::read_to_string(txt).unwrap(), "Page 1\n\nPage 2\n\n");
}

#[test]
fn test_extract_missing_file_exits_nonzero() {
    let (tmp, config) = setup_test_env("http://127.0.0.1:1/api/query");
    let pdf = tmp.path().join("nope.pdf");

    let (_, stderr, success) = run_papers(&config, &["extract", pdf.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("does not exist"));
    assert!(!tmp.path().join("nope.txt").exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "[storage\nroot = ").unwrap();

    let (_, _, success) = run_papers(&config, &["topics"]);
    assert!(!success);
}
