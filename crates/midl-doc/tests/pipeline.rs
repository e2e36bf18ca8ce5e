//! End-to-end runs of the document stage against temporary output roots

use std::fs;
use std::path::Path;

use midl_doc::{combine, document_sources, DocConfig, DocError, Element, Source};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn read(path: &Path) -> Element {
    Element::parse(&fs::read_to_string(path).unwrap()).unwrap()
}

fn setup() -> (TempDir, DocConfig) {
    let dir = TempDir::new().unwrap();
    let config = DocConfig::default().with_output_root(dir.path().join("out"));
    (dir, config)
}

#[test]
fn getter_and_setter_become_one_property() {
    let (dir, config) = setup();
    write(
        dir.path(),
        "src/widget.idl",
        r#"
        [uuid(12345678-1234-1234-1234-123456789012), dual, helpstring("A widget")]
        interface IWidget : IDispatch {
            [propget, helpstring("Number of parts")] long Count();
            [propput] void Count([in] long val);
        };
        "#,
    );

    let report = document_sources(&[Source::new(dir.path().join("src"), "CW")], &config);
    assert!(report.is_clean(), "{:?}", report);
    assert_eq!((report.processed, report.written), (1, 1));

    let doc = read(&dir.path().join("out/CW/IWidget.xml"));
    assert_eq!(doc.name, "interface");
    assert_eq!(doc.attr("version"), Some("2011"));
    assert_eq!(doc.child_text("description"), Some("A widget"));

    let members: Vec<_> = doc.child("members").unwrap().children_named("member").collect();
    assert_eq!(members.len(), 1);
    let count = members[0];
    assert_eq!(count.attr("name"), Some("Count"));
    assert_eq!(count.attr("type"), Some("property"));
    assert_eq!(count.child("returns").unwrap().child_text("type"), Some("long"));
    assert_eq!(count.child_text("description"), Some("Number of parts"));

    let params: Vec<_> = count
        .child("parameters")
        .unwrap()
        .children_named("parameter")
        .map(|p| (p.child_text("type"), p.child_text("name")))
        .collect();
    assert_eq!(params, vec![(Some("long"), Some("val"))]);

    let syntax: Vec<_> = count.children_named("syntax").filter_map(|s| s.text.as_deref()).collect();
    assert_eq!(syntax, vec!["long Count;", "void Count(\n    long val\n);"]);
}

#[test]
fn persisted_document_combines_with_itself() {
    let (dir, config) = setup();
    write(
        dir.path(),
        "src/colors.idl",
        r#"typedef [public] enum cwColor { cwRed, [helpstring("Green")] cwGreen = cwRed + 1, cwBlue = 0x4 } cwColor;"#,
    );

    let sources = [Source::new(dir.path().join("src"), "Enums")];
    document_sources(&sources, &config);
    let path = dir.path().join("out/Enums/cwColor.xml");
    let first = read(&path);
    let merged = combine(&first, &first).unwrap();
    assert_eq!(combine(&merged, &merged).unwrap(), merged);

    // A second run over the same input converges on the same document
    let report = document_sources(&sources, &config);
    assert!(report.is_clean());
    let second = read(&path);
    assert_eq!(second, combine(&first, &first).unwrap());
    assert_eq!(combine(&second, &second).unwrap(), second);

    let values: Vec<_> = second
        .child("constants")
        .unwrap()
        .children_named("constant")
        .map(|c| (c.child_text("name"), c.child_text("value")))
        .collect();
    assert_eq!(
        values,
        vec![
            (Some("cwRed"), Some("0")),
            (Some("cwGreen"), Some("cwRed+1")),
            (Some("cwBlue"), Some("0x4")),
        ]
    );
}

#[test]
fn interface_and_typedef_under_one_name_are_rejected() {
    let (dir, config) = setup();
    write(dir.path(), "src/a.idl", "interface Shared { void Go(); }");
    write(dir.path(), "src/b.idl", "typedef enum Shared { sA } Shared;");

    let report = document_sources(&[Source::new(dir.path().join("src"), "G")], &config);
    assert_eq!(report.processed, 2);
    assert_eq!(report.rejected.len(), 1);
    assert!(matches!(report.rejected[0], DocError::KindMismatch { .. }));
    assert!(!report.is_clean());

    let doc = read(&dir.path().join("out/G/Shared.xml"));
    assert_eq!(doc.name, "interface");
}

#[test]
fn stale_document_of_other_kind_is_not_overwritten() {
    let (dir, config) = setup();
    let stale = "<?xml version=\"1.0\"?>\n<typedef name=\"IA\" version=\"2011\"/>\n";
    write(dir.path(), "out/G/IA.xml", stale);
    write(dir.path(), "src/a.idl", "interface IA { void Go(); }");

    let report = document_sources(&[Source::new(dir.path().join("src"), "G")], &config);
    assert_eq!(report.written, 0);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].1, DocError::RootMismatch { .. }));
    assert_eq!(fs::read_to_string(dir.path().join("out/G/IA.xml")).unwrap(), stale);
}

#[test]
fn contributions_from_several_files_merge() {
    let (dir, config) = setup();
    write(
        dir.path(),
        "src/one.idl",
        r#"library L { [helpstring("Shapes")] interface IShape { [helpstring("Area")] double Area(); } }"#,
    );
    write(
        dir.path(),
        "src/two/more.idl",
        r#"interface IShape { HRESULT Scale([in] double factor, [out, retval] double* result); }
           interface IOther; "#,
    );

    let config = config.with_version("7.0");
    let report = document_sources(&[Source::new(dir.path().join("src"), "Shapes")], &config);
    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(report.written, 1);
    assert!(!dir.path().join("out/Shapes/IOther.xml").exists());

    let doc = read(&dir.path().join("out/Shapes/IShape.xml"));
    assert_eq!(doc.attr("version"), Some("7.0"));
    let members: Vec<_> = doc
        .child("members")
        .unwrap()
        .children_named("member")
        .map(|m| (m.attr("name"), m.child("returns").unwrap().child_text("type")))
        .collect();
    assert_eq!(members, vec![(Some("Area"), Some("double")), (Some("Scale"), Some("double"))]);
}

#[test]
fn a_broken_file_does_not_stop_the_batch() {
    let (dir, config) = setup();
    write(dir.path(), "src/good.idl", "interface IA { void Go(); }");
    write(dir.path(), "src/broken.idl", "interface IB { void Go( }");
    write(dir.path(), "src/readme.txt", "not idl");

    let report = document_sources(&[Source::new(dir.path().join("src"), "G")], &config);
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].0.ends_with("broken.idl"));
    assert!(dir.path().join("out/G/IA.xml").is_file());
}

#[test]
fn unnamed_parameters_survive_repeated_runs() {
    let (dir, config) = setup();
    write(dir.path(), "src/a.idl", "interface IA { HRESULT F([in] long, [in] BSTR); }");
    let sources = [Source::new(dir.path().join("src"), "G")];
    let path = dir.path().join("out/G/IA.xml");

    let param_types = |doc: &Element| -> Vec<String> {
        doc.child("members")
            .unwrap()
            .child("member")
            .unwrap()
            .child("parameters")
            .unwrap()
            .children_named("parameter")
            .filter_map(|p| p.child_text("type").map(str::to_string))
            .collect()
    };

    document_sources(&sources, &config);
    let first = read(&path);
    assert_eq!(param_types(&first), vec!["long", "BSTR"]);
    assert_eq!(param_types(&combine(&first, &first).unwrap()), vec!["long", "BSTR"]);

    for _ in 0..2 {
        assert!(document_sources(&sources, &config).is_clean());
        assert_eq!(param_types(&read(&path)), vec!["long", "BSTR"]);
    }
}

#[test]
fn byte_order_mark_does_not_skip_the_file() {
    let (dir, config) = setup();
    write(dir.path(), "src/bom.idl", "\u{feff}interface IA { void Go(); }");

    let report = document_sources(&[Source::new(dir.path().join("src"), "G")], &config);
    assert!(report.is_clean(), "{:?}", report);
    assert!(dir.path().join("out/G/IA.xml").is_file());
}
