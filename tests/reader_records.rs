use anyhow::Result;
use std::io::{self, Read};

use recfile::{Field, Reader, RecError, Record};

fn init_logs() {
    // RUST_LOG=recfile=trace cargo test -- --nocapture
    let _ = env_logger::builder().is_test(true).try_init();
}

const TASKS: &str = "
%rec: Task
%key: ID

ID: T1
Name: Design architecture
EstimateLow: 4
EstimateHigh: 8

%rec: Task
ID: T2
Name: Implement feature
EstimateLow: 6
EstimateHigh: 10
DependsOn: T1

# A comment
ID: T3
Name: Testing
EstimateLow: 2
EstimateHigh: 4
DependsOn: T2

";

#[test]
fn reads_task_records_skipping_descriptors_and_comments() -> Result<()> {
    init_logs();
    let mut r = Reader::new(TASKS.as_bytes());
    let mut records = Vec::new();
    while let Some(m) = r.next_map_multi()? {
        records.push(m);
    }

    assert_eq!(records.len(), 3, "expected 3 task records");
    assert_eq!(records[0]["ID"], vec!["T1"]);
    assert_eq!(records[1]["DependsOn"], vec!["T1"]);
    assert_eq!(records[2]["EstimateHigh"], vec!["4"]);
    for rec in &records {
        assert!(!rec.contains_key("%rec") && !rec.contains_key("%key"));
    }
    Ok(())
}

#[test]
fn descriptor_only_block_yields_no_empty_record() -> Result<()> {
    let input = "%rec: Task\n%key: ID\n\nID: T1\nName: Design\n";
    let mut r = Reader::new(input.as_bytes());

    let rec = r.next_record()?.expect("one record");
    assert_eq!(
        rec.fields(),
        &[Field::new("ID", "T1"), Field::new("Name", "Design")]
    );
    assert!(r.next_record()?.is_none());
    Ok(())
}

#[test]
fn record_type_follows_rec_descriptors() -> Result<()> {
    init_logs();
    let input = "
%rec: Package
%key: ID

ID: P1
Name: Core Features

ID: ASAP
Name: ASAP

%rec: Task
%key: ID

ID: T1
Name: Design
Package: P1

ID: T2
DependsOn: T1
Package: P1
";
    let mut r = Reader::new(input.as_bytes());
    let mut seen = Vec::new();
    while let Some(rec) = r.next_record()? {
        let ty = r.record_type().unwrap_or("").to_string();
        assert!(rec.get("ID").is_some(), "record is missing ID: {rec:?}");
        assert!(rec.get("%rec").is_none());
        seen.push(ty);
    }
    assert_eq!(seen, vec!["Package", "Package", "Task", "Task"]);
    Ok(())
}

#[test]
fn duplicate_keys_in_both_views() -> Result<()> {
    let input = "ID: T3\nDependsOn: T1\nDependsOn: T2\n";

    let m = Reader::new(input.as_bytes()).next_map()?.expect("record");
    assert_eq!(m["DependsOn"], "T2");

    let mm = Reader::new(input.as_bytes())
        .next_map_multi()?
        .expect("record");
    assert_eq!(mm["DependsOn"], vec!["T1", "T2"]);

    let rec = Reader::new(input.as_bytes()).next_record()?.expect("record");
    let names: Vec<&str> = rec.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["ID", "DependsOn", "DependsOn"]);
    Ok(())
}

#[test]
fn continuation_and_multiline_values() -> Result<()> {
    let input = "Name: ab\\\ncd\n\nNote:\n+ line one\n+line two\n";
    let mut r = Reader::new(input.as_bytes());

    let first = r.next_record()?.expect("first");
    assert_eq!(first.get("Name"), Some("abcd"));

    let second = r.next_record()?.expect("second");
    assert_eq!(second.get("Note"), Some("line one\nline two"));

    assert!(r.next_record()?.is_none());
    Ok(())
}

#[test]
fn many_blank_lines_collapse() -> Result<()> {
    init_logs();
    let input = "\n\n\nA: 1\n\n\n\n# only a comment\n\n\nA: 2\n\n\n";
    let recs: Vec<Record> = Reader::new(input.as_bytes()).collect::<Result<_, _>>()?;
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].get("A"), Some("1"));
    assert_eq!(recs[1].get("A"), Some("2"));
    Ok(())
}

#[test]
fn last_field_without_trailing_newline() -> Result<()> {
    let mut r = Reader::new("A: 1\nB: 2".as_bytes());
    let rec = r.next_record()?.expect("record");
    assert_eq!(rec.len(), 2);
    assert_eq!(rec.get("B"), Some("2"));
    assert_eq!(r.line_number(), 2);
    Ok(())
}

#[test]
fn crlf_lines() -> Result<()> {
    let mut r = Reader::new("A: 1\r\nNote:\r\n+ x\r\n\r\nA: 2\r\n".as_bytes());
    let first = r.next_record()?.expect("first");
    assert_eq!(first.get("A"), Some("1"));
    assert_eq!(first.get("Note"), Some("x"));
    assert_eq!(r.next_record()?.expect("second").get("A"), Some("2"));
    Ok(())
}

#[test]
fn empty_input_is_end_of_stream() -> Result<()> {
    assert!(Reader::new("".as_bytes()).next_record()?.is_none());
    assert!(Reader::new("# c\n%rec: X\n\n\n".as_bytes()).next_record()?.is_none());
    Ok(())
}

#[test]
fn unterminated_continuation_at_eof() {
    let err = Reader::new("A: 1\nB: x\\".as_bytes()).next_record().unwrap_err();
    assert!(matches!(err, RecError::UnterminatedContinuation { line: 2 }));
}

#[test]
fn blank_line_inside_continuation() {
    let err = Reader::new("A: x\\\n\nB: 2\n".as_bytes()).next_record().unwrap_err();
    assert!(matches!(err, RecError::UnterminatedContinuation { line: 2 }));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn invalid_name_fails_without_partial_record() {
    let mut r = Reader::new("A: ok\n1bad: x\n".as_bytes());
    match r.next_record() {
        Err(RecError::MalformedField { line, text }) => {
            assert_eq!(line, 2);
            assert_eq!(text, "1bad: x");
        }
        other => panic!("expected malformed field, got {other:?}"),
    }
}

#[test]
fn line_without_colon_is_malformed() {
    let err = Reader::new("just text\n".as_bytes()).next_record().unwrap_err();
    assert!(matches!(err, RecError::MalformedField { line: 1, .. }));
}

#[test]
fn invalid_utf8_is_reported() {
    let err = Reader::new(&b"A: 1\nB: \xff\n"[..]).next_record().unwrap_err();
    assert!(matches!(err, RecError::NotUtf8 { line: 2 }));
}

#[test]
fn iterator_stops_after_first_error() {
    let mut it = Reader::new("A: 1\n\n2: x\n\nA: 3\n".as_bytes());
    assert!(it.next().unwrap().is_ok());
    assert!(it.next().unwrap().is_err());
    assert!(it.next().is_none());
}

struct FailingRead;

impl Read for FailingRead {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "source closed"))
    }
}

#[test]
fn io_errors_propagate() {
    let err = Reader::from_read(FailingRead).next_record().unwrap_err();
    match err {
        RecError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected io error, got {other:?}"),
    }
}
