//! Whole-document parsing against the verified samples

use atv::atv::ast::NodeKind;
use atv::atv::testing::{assert_document, AtvSamples};
use atv::{Dialect, File, ParseError, Version};
use rstest::rstest;

#[rstest]
#[case("minimal.atv")]
#[case("firewall.atv")]
#[case("override.atv")]
fn test_samples_are_canonical(#[case] name: &str) {
    let source = AtvSamples::get_string(name);
    let file = AtvSamples::file(name);
    assert_eq!(file.serialize(Dialect::Atv).unwrap(), source);
}

#[test]
fn test_every_sample_is_registered() {
    let names: Vec<&str> = AtvSamples::names().collect();
    assert_eq!(names, vec!["minimal.atv", "firewall.atv", "override.atv"]);
}

#[test]
fn test_override_sample_shape() {
    let file = AtvSamples::file("override.atv");
    assert_eq!(file.version(), &Version::new(8, 0, 2, "default"));

    assert_document(file.document())
        .kinds(&[
            NodeKind::Pragma,
            NodeKind::Pragma,
            NodeKind::Comment,
            NodeKind::Setting,
            NodeKind::Setting,
            NodeKind::Setting,
        ])
        .pragma("serial", "MG-0815")
        .setting("FW_INCOMING", |value| {
            value
                .assert_table()
                .row_ids(&[Some("r2"), Some("r3")])
                .row(1, |row| {
                    row.simple("PROTOCOL", "udp").simple("TO_PORT", "161");
                });
        })
        .setting("NTP", |value| {
            value.assert_block().setting_names(&["ENABLED"]);
        })
        .simple("HOSTNAME", "gateway-halle-3");
}

#[test]
fn test_version_pragma_is_required() {
    assert_eq!(File::parse("A = \"1\"\n"), Err(ParseError::MissingVersion));
    assert_eq!(File::parse(""), Err(ParseError::MissingVersion));
}

#[test]
fn test_syntax_error_display_names_position() {
    let err = File::parse("#version \"8.0.2-default\"\nA = {\n  B \"1\"\n}\n").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r#"3:5: expected '=', found string "1""#);
}

#[test]
fn test_parse_is_repeatable() {
    let source = AtvSamples::get_string("firewall.atv");
    assert_eq!(File::parse(source), File::parse(source));
}
