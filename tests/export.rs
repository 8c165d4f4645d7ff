use catalog_json::config::parse_catalogs;
use catalog_json::source::resolve_source;
use catalog_json::{CatalogError, attach_header, export_catalog};
use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const CATALOGS: &str = r#"<catalogs>
  <catalog name="hip_fixed" type="dat">
    <url>https://cdsarc.example/ftp/I/239/hip_fixed.dat.gz</url>
    <epoch>J1991.25</epoch>
    <fields>
      <field name="hip" start="1" end="6" prefix="HIP " renameTo="name"/>
      <field name="ra" start="8" end="19" renameTo="RA_DEG"/>
      <field name="vmag" start="21" end="25"/>
      <field name="flag" start="27" end="27"/>
    </fields>
  </catalog>
  <catalog name="heasarc_hip" type="tdat">
    <url>https://heasarc.example/dbase/tdat_files/heasarc_hip.tdat.gz</url>
    <headerUrl>heasarc_hip.header</headerUrl>
    <epoch>J2000</epoch>
    <fields>
      <field name="hip_number" prefix="HIP " renameTo="name" keepAfterCopy="true"/>
      <field name="ra"/>
      <field name="dec"/>
    </fields>
  </catalog>
</catalogs>"#;

fn gzip(path: &Path, body: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(body.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn json_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.contains(".json"))
        .collect();
    names.sort();
    names
}

#[test]
fn fixed_width_gzip_end_to_end() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let catalogs = parse_catalogs(CATALOGS).unwrap();
    let config = &catalogs[0];

    //        1         2
    // 3456789012345678901234567
    let body = concat!(
        "  1234 123.45678901  9.10 A\n",
        "short line\n",
        "HIP 77   0.00005    -1.5   \n",
    );
    gzip(&data.path().join("hip_fixed.dat.gz"), body);

    let src = resolve_source(config.url(), data.path());
    let (summary, target) = export_catalog(config, &src, out.path()).unwrap();

    assert_eq!(target, out.path().join("hip_fixed.json"));
    assert_eq!(summary.records_written, 2);
    assert_eq!(summary.malformed, 1);
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        concat!(
            "{\"name\":\"HIP 1234\",\"RA_DEG\":123.4568,\"vmag\":9.10,\"flag\":\"A\"}\n",
            "{\"name\":\"HIP 77\",\"RA_DEG\":0.0000,\"vmag\":-1.5}\n",
        )
    );
    assert_eq!(json_files(out.path()), vec!["hip_fixed.json"]);
}

#[test]
fn delimited_with_header_end_to_end() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let catalogs = parse_catalogs(CATALOGS).unwrap();

    fs::write(
        data.path().join("heasarc_hip.header"),
        "<HEADER>\ntable_name = heasarc_hip\nline[1] = hip_number ra dec class\n",
    )
    .unwrap();
    let config = attach_header(catalogs[1].clone(), None, |url| {
        resolve_source(url, data.path())
    })
    .unwrap();
    assert!(config.rule("class").is_some_and(|r| r.excluded));

    gzip(
        &data.path().join("heasarc_hip.tdat.gz"),
        concat!(
            "<HEADER>\n",
            "line[1] = hip_number ra dec class\n",
            "<DATA>\n",
            "1|0.00091185|+01.08901332|F5|\n",
            "2||-19.49883745|K3V|\n",
            "<END>\n",
        ),
    );

    let src = resolve_source(config.url(), data.path());
    let (summary, target) = export_catalog(&config, &src, out.path()).unwrap();

    assert_eq!(summary.records_written, 2);
    assert_eq!(summary.malformed, 0);
    assert_eq!(
        fs::read_to_string(target).unwrap(),
        concat!(
            "{\"hip_number\":\"HIP 1\",\"name\":\"HIP 1\",\"ra\":0.0009,\"dec\":1.0890}\n",
            "{\"hip_number\":\"HIP 2\",\"name\":\"HIP 2\",\"dec\":-19.4988}\n",
        )
    );
}

#[test]
fn failed_export_leaves_no_output() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let catalogs = parse_catalogs(CATALOGS).unwrap();
    let config = &catalogs[0];

    let src = data.path().join("hip_fixed.dat.gz");
    let body: String = (0..2000)
        .map(|i| format!("{:6} {:12.8} {:5.2} A\n", i, i as f64 * 0.173, i as f64 / 300.0))
        .collect();
    gzip(&src, &body);
    // Cut the stream in half so the decoder hits end of file mid-member.
    let bytes = fs::read(&src).unwrap();
    fs::write(&src, &bytes[..bytes.len() / 2]).unwrap();

    let err = export_catalog(config, &src, out.path()).unwrap_err();
    match &err {
        CatalogError::Io { catalog, .. } => assert_eq!(catalog, "hip_fixed"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(json_files(out.path()).is_empty());
}

#[test]
fn invalid_utf8_line_is_skipped_not_fatal() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let catalogs = parse_catalogs(CATALOGS).unwrap();
    let config = &catalogs[0];

    let src = data.path().join("hip_fixed.dat");
    let mut bytes = b"  1234 123.45678901  9.10 A\n".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
    bytes.extend_from_slice(b"    77   0.00005    -1.5   \n");
    fs::write(&src, bytes).unwrap();

    let (summary, target) = export_catalog(config, &src, out.path()).unwrap();
    assert_eq!(summary.records_written, 2);
    assert_eq!(summary.malformed, 1);
    assert_eq!(
        fs::read_to_string(target).unwrap(),
        concat!(
            "{\"name\":\"HIP 1234\",\"RA_DEG\":123.4568,\"vmag\":9.10,\"flag\":\"A\"}\n",
            "{\"name\":\"HIP 77\",\"RA_DEG\":0.0000,\"vmag\":-1.5}\n",
        )
    );
}

#[test]
fn missing_source_names_expected_path() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let catalogs = parse_catalogs(CATALOGS).unwrap();

    let src = resolve_source(catalogs[0].url(), data.path());
    let err = export_catalog(&catalogs[0], &src, out.path()).unwrap_err();
    assert!(err.to_string().contains("hip_fixed.dat.gz"), "{err}");
    assert!(json_files(out.path()).is_empty());
}
