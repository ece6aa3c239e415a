//! Rendering tests: the six output formats over decoded blocks.

use asterix_decoder::{DataBlock, Decoder, OutputFormat, ParseOptions};
use serde_json::Value;
use test_utils::{data_block, hex, testdata_dir};

fn decoder() -> Decoder {
    Decoder::from_config_dir(testdata_dir().join("valid")).expect("testdata must load")
}

fn decode_one(d: &Decoder, data: &[u8], verbose: bool) -> DataBlock {
    let opts = ParseOptions {
        verbose,
        ..Default::default()
    };
    let mut out = d.parse(data, &opts);
    assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);
    out.blocks.remove(0)
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn text_lists_fields_line_by_line() {
    let d = decoder();
    let block = decode_one(&d, &data_block(48, &hex("80 01 02")), false);
    let text = d.render(&block, OutputFormat::Text, false).unwrap();

    assert!(text.starts_with("Data Block CAT048 len=6 records=1"));
    assert!(text.contains("I048/010"));
    assert!(text.contains("SAC: 1"));
    assert!(text.contains("SIC: 2"));
}

#[test]
fn text_verbose_adds_names_units_and_meanings() {
    let d = decoder();
    // TYP=2 (single SSR) plus a scaled RHO/THETA pair.
    let block = decode_one(&d, &data_block(48, &hex("30 40 01 00 20 00")), true);
    let text = d.render(&block, OutputFormat::Text, true).unwrap();

    assert!(text.contains("I048/020 : Target Report Descriptor"));
    assert!(text.contains("TYP: 2 (Single SSR detection)"));
    assert!(text.contains("RHO: 1.000 NM"));
    assert!(text.contains("THETA: 45.0000 deg"));
}

#[test]
fn text_marks_partial_records() {
    let d = decoder();
    let data = data_block(48, &hex("90 01 02 aa bb"));
    let out = d.parse(&data, &ParseOptions::default());
    let text = d.render(&out.blocks[0], OutputFormat::Text, false).unwrap();

    assert!(text.contains("<error:"));
}

// ============================================================================
// OutLine
// ============================================================================

#[test]
fn outline_is_one_line_per_record() {
    let d = decoder();
    let block = decode_one(&d, &data_block(48, &hex("80 01 02")), false);
    let line = d.render(&block, OutputFormat::OutLine, false).unwrap();

    assert_eq!(line, "CAT048;I048/010:SAC=1,SIC=2\n");
}

#[test]
fn outline_flattens_nested_paths() {
    let d = decoder();
    let block = decode_one(&d, &data_block(62, &hex("b8 01 0a 00 64 c0 08 0c 02 80")), false);
    let line = d.render(&block, OutputFormat::OutLine, false).unwrap();

    assert!(line.contains("I062/290:TRK.TRK=2.00,PSR.PSR=3.00"));
    assert!(line.contains("I062/135:QNH=0,ALT=25.00"));
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn json_hierarchical_mirrors_structure() {
    let d = decoder();
    let block = decode_one(&d, &data_block(62, &hex("b8 01 0a 00 64 c0 08 0c 02 80")), false);
    let json = d.render(&block, OutputFormat::JsonHierarchical, false).unwrap();
    let v: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(v["category"], 62);
    let record = &v["records"][0];
    assert_eq!(record["I062/010"]["SAC"], 1);
    assert_eq!(record["I062/135"]["ALT"], 25.0);
    assert_eq!(record["I062/135"]["QNH"], false);
    assert_eq!(record["I062/290"]["TRK"]["TRK"], 2.0);
    assert_eq!(record["I062/290"]["PSR"]["PSR"], 3.0);
}

#[test]
fn json_compact_flattens_keys() {
    let d = decoder();
    let block = decode_one(&d, &data_block(62, &hex("b8 01 0a 00 64 c0 08 0c 02 80")), false);
    let json = d.render(&block, OutputFormat::JsonCompact, false).unwrap();

    // Single line.
    assert!(!json.contains('\n'));
    let v: Value = serde_json::from_str(&json).unwrap();
    let record = &v["records"][0];
    assert_eq!(record["I062/290"]["TRK.TRK"], 2.0);
    assert_eq!(record["I062/290"]["PSR.PSR"], 3.0);
}

#[test]
fn json_arrays_for_repetitive_content() {
    let d = decoder();
    let block = decode_one(&d, &data_block(48, &hex("02 01 b2 00 00 00 00 00 00 40")), false);
    let json = d.render(&block, OutputFormat::JsonHierarchical, false).unwrap();
    let v: Value = serde_json::from_str(&json).unwrap();

    let regs = &v["records"][0]["I048/250"];
    assert!(regs.is_array());
    assert_eq!(regs[0]["BDS"], "40");
    assert_eq!(regs[0]["MCP_ALT"], 25600.0);
}

#[test]
fn json_reports_partial_records() {
    let d = decoder();
    let data = data_block(48, &hex("90 01 02 aa bb"));
    let out = d.parse(&data, &ParseOptions::default());
    let json = d
        .render(&out.blocks[0], OutputFormat::JsonHierarchical, false)
        .unwrap();
    let v: Value = serde_json::from_str(&json).unwrap();

    let record = &v["records"][0];
    assert_eq!(record["I048/010"]["SAC"], 1);
    assert!(record["_error"].as_str().unwrap().contains("insufficient bits"));
}

// ============================================================================
// XML
// ============================================================================

#[test]
fn xml_compact_one_field_per_leaf() {
    let d = decoder();
    let block = decode_one(&d, &data_block(48, &hex("80 01 02")), false);
    let xml = d.render(&block, OutputFormat::Xml, false).unwrap();

    assert!(xml.starts_with("<DataBlock category=\"48\" length=\"6\">"));
    assert!(xml.contains("<Item id=\"I048/010\">"));
    assert!(xml.contains("<Field name=\"SAC\">1</Field>"));
    assert!(xml.contains("<Field name=\"SIC\">2</Field>"));
    assert!(xml.ends_with("</DataBlock>"));
}

#[test]
fn xml_hierarchical_nests_groups_and_entries() {
    let d = decoder();
    let block = decode_one(&d, &data_block(62, &hex("b8 01 0a 00 64 c0 08 0c 02 80")), false);
    let xml = d.render(&block, OutputFormat::XmlHierarchical, false).unwrap();

    assert!(xml.contains("<Group name=\"TRK\">"));
    assert!(xml.contains("<Field name=\"PSR\">3.00</Field>"));

    let bds = decode_one(&d, &data_block(48, &hex("02 01 b2 00 00 00 00 00 00 40")), false);
    let xml = d.render(&bds, OutputFormat::XmlHierarchical, false).unwrap();
    assert!(xml.contains("<Entry index=\"0\">"));
    assert!(xml.contains("<Field name=\"BDS\">40</Field>"));
}

#[test]
fn xml_reports_partial_records() {
    let d = decoder();
    let data = data_block(48, &hex("90 01 02 aa bb"));
    let out = d.parse(&data, &ParseOptions::default());
    let xml = d.render(&out.blocks[0], OutputFormat::Xml, false).unwrap();

    assert!(xml.contains("<Error>"));
}

// ============================================================================
// Numeric contract
// ============================================================================

#[test]
fn scaled_values_render_at_declared_precision() {
    let d = decoder();
    // ToD raw 128 -> 1.0 s at 3 declared decimals.
    let block = decode_one(&d, &data_block(34, &hex("e0 01 02 01 00 00 80")), false);
    let text = d.render(&block, OutputFormat::Text, false).unwrap();
    assert!(text.contains("ToD: 1.000"));

    // RHO raw 3 -> 0.01171875, rounded to 3 decimals in every renderer.
    let block = decode_one(&d, &data_block(48, &hex("10 00 03 00 00")), false);
    let text = d.render(&block, OutputFormat::Text, false).unwrap();
    assert!(text.contains("RHO: 0.012"));

    let json = d.render(&block, OutputFormat::JsonHierarchical, false).unwrap();
    let v: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["records"][0]["I048/040"]["RHO"], 0.012);
}

#[test]
fn hex_fields_are_lowercase_and_padded() {
    let d = decoder();
    // Unknown BDS register renders its payload as lowercase hex.
    let block = decode_one(&d, &data_block(48, &hex("02 01 0a 0b 0c 0d 0e 0f 00 55")), false);
    let json = d.render(&block, OutputFormat::JsonHierarchical, false).unwrap();
    let v: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(v["records"][0]["I048/250"][0]["MB"], "0a0b0c0d0e0f00");
}
