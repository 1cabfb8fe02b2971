use anyhow::{anyhow, Result};
use safedoc::api::{ApiHealth, BatchResult, RowResult, TextResult, ValidateApi};
use safedoc::config::Config;
use safedoc::session::{Notifier, Session};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Clone)]
struct StubApi {
    fail: bool,
    batch_rows: usize,
    text_calls: Rc<Cell<u32>>,
    csv_calls: Rc<Cell<u32>>,
}

impl ValidateApi for StubApi {
    fn health(&self) -> Result<ApiHealth> {
        Ok(ApiHealth {
            status: "ok".into(),
            service: Some("stub".into()),
        })
    }

    fn validate_text(&self, _text: &str) -> Result<TextResult> {
        self.text_calls.set(self.text_calls.get() + 1);
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(TextResult {
            status: "REVISAR".into(),
            score: 3.0,
            total_matches: 1,
            matches: vec![serde_json::json!({"tipo": "cpf"})],
            anonymized_text: Some("cliente *** retornou".into()),
        })
    }

    fn validate_csv(&self, _file: &Path) -> Result<BatchResult> {
        self.csv_calls.set(self.csv_calls.get() + 1);
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        let rows: Vec<RowResult> = (0..self.batch_rows)
            .map(|i| RowResult::new(i as u64, "PUBLICAR", 0.0))
            .collect();
        Ok(BatchResult {
            total: rows.len() as u64,
            rows,
        })
    }
}

#[derive(Clone)]
struct RecordingNotifier {
    alerts: Rc<RefCell<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

struct Fixture {
    session: Session<StubApi, RecordingNotifier>,
    text_calls: Rc<Cell<u32>>,
    csv_calls: Rc<Cell<u32>>,
    alerts: Rc<RefCell<Vec<String>>>,
    dir: TempDir,
}

fn fixture(fail: bool, batch_rows: usize) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let mut cfg = Config::default();
    cfg.output.dir = dir.path().display().to_string();

    let text_calls = Rc::new(Cell::new(0));
    let csv_calls = Rc::new(Cell::new(0));
    let alerts = Rc::new(RefCell::new(Vec::new()));

    let api = StubApi {
        fail,
        batch_rows,
        text_calls: text_calls.clone(),
        csv_calls: csv_calls.clone(),
    };
    let notifier = RecordingNotifier {
        alerts: alerts.clone(),
    };

    Fixture {
        session: Session::new(&cfg, api, notifier),
        text_calls,
        csv_calls,
        alerts,
        dir,
    }
}

fn exported_names(f: &Fixture) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(f.dir.path())
        .expect("read out dir")
        .map(|e| e.expect("entry").file_name().into_string().expect("utf-8 name"))
        .collect();
    names.sort();
    names
}

fn submit_csv(f: &mut Fixture) {
    let file = f.dir.path().join("input.csv");
    f.session.select_file(&[file]);
    f.session.submit_file();
}

#[test]
fn blank_text_never_hits_the_network() {
    let mut f = fixture(false, 0);
    f.session.submit_text("   \n\t ");
    assert_eq!(f.text_calls.get(), 0);
    assert!(f.session.text.is_empty());
}

#[test]
fn failed_submission_reverts_to_empty_with_one_alert() {
    let mut f = fixture(true, 0);
    f.session.submit_text("algum texto");
    assert_eq!(f.text_calls.get(), 1);
    assert!(f.session.text.is_empty());
    assert_eq!(f.alerts.borrow().len(), 1);
}

#[test]
fn successful_submission_populates_the_slot() {
    let mut f = fixture(false, 0);
    f.session.submit_text("algum texto");
    let res = f.session.text.populated().expect("populated");
    assert_eq!(res.status, "REVISAR");
    assert!(f.alerts.borrow().is_empty());
}

#[test]
fn submit_file_without_selection_is_a_no_op() {
    let mut f = fixture(false, 2);
    f.session.submit_file();
    assert_eq!(f.csv_calls.get(), 0);
    assert!(f.session.batch.is_empty());
}

#[test]
fn empty_selection_is_ignored() {
    let mut f = fixture(false, 2);
    f.session.select_file(&[]);
    f.session.submit_file();
    assert_eq!(f.csv_calls.get(), 0);
}

#[test]
fn failed_csv_submission_reverts_to_empty_with_one_alert() {
    let mut f = fixture(true, 2);
    submit_csv(&mut f);
    assert_eq!(f.csv_calls.get(), 1);
    assert!(f.session.batch.is_empty());
    assert_eq!(f.alerts.borrow().len(), 1);
}

#[test]
fn download_latest_prefers_a_non_empty_batch() {
    let mut f = fixture(false, 3);
    f.session.submit_text("algum texto");
    submit_csv(&mut f);

    let path = f
        .session
        .download_latest()
        .expect("export")
        .expect("something to export");
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("safedoc_resultado_lote_"));
    assert!(name.ends_with(".csv"));

    // The text path was never taken.
    assert!(exported_names(&f)
        .iter()
        .all(|n| !n.contains("texto_anonimizado")));
}

#[test]
fn download_latest_falls_back_to_text_when_batch_rows_are_empty() {
    let mut f = fixture(false, 0);
    f.session.submit_text("algum texto");
    submit_csv(&mut f);
    assert!(f.session.batch.populated().is_some());

    let path = f
        .session
        .download_latest()
        .expect("export")
        .expect("something to export");
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("safedoc_texto_anonimizado_"));
    assert!(name.ends_with(".txt"));
    assert_eq!(
        std::fs::read_to_string(&path).expect("read export"),
        "cliente *** retornou"
    );
}

#[test]
fn download_latest_on_an_empty_session_is_a_no_op() {
    let f = fixture(false, 0);
    assert!(f.session.download_latest().expect("no-op").is_none());
    assert!(exported_names(&f).is_empty());
}

#[test]
fn explicit_exports_are_no_ops_when_the_slot_is_empty() {
    let f = fixture(false, 0);
    assert!(f.session.download_text_plain().expect("no-op").is_none());
    assert!(f.session.download_text_json().expect("no-op").is_none());
    assert!(f.session.download_batch_json().expect("no-op").is_none());
    assert!(f.session.download_batch_csv().expect("no-op").is_none());
    assert!(exported_names(&f).is_empty());
}

#[test]
fn batch_csv_export_carries_the_header_and_every_row() {
    let mut f = fixture(false, 2);
    submit_csv(&mut f);

    let path = f
        .session
        .download_batch_csv()
        .expect("export")
        .expect("rows to export");
    let text = std::fs::read_to_string(&path).expect("read export");
    assert_eq!(text.lines().count(), 3);
    assert!(text.starts_with("\"index\",\"status\",\"score\",\"anonymizedText\",\"matches\""));
}

#[test]
fn text_json_export_parses_back() {
    let mut f = fixture(false, 0);
    f.session.submit_text("algum texto");

    let path = f
        .session
        .download_text_json()
        .expect("export")
        .expect("populated slot");
    let raw = std::fs::read_to_string(&path).expect("read export");
    let back: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    assert_eq!(back["status"], "REVISAR");
    assert_eq!(back["texto_anonimizado"], "cliente *** retornou");
}
