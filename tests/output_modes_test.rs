// Output mode behavior through full layout requests: shape selection,
// byRow/simple agreement, full-mode structure, and serialization stability.

use layout_wasm::errors::ErrorCode;
use layout_wasm::serializer::LayoutData;
use layout_wasm::{EngineCore, LayoutOptions};

fn engine_with_font() -> EngineCore {
    let mut core = EngineCore::new();
    core.register_font(&[0x42; 256], "test-sans").unwrap();
    core
}

fn options(width: i64, mode: &str) -> LayoutOptions {
    LayoutOptions {
        viewport_width: Some(width),
        mode: Some(mode.to_string()),
        ..LayoutOptions::default()
    }
}

const TWO_LINES: &str = "<p>first line<br>second line</p>";

#[test]
fn mode_defaults_to_flat() {
    let mut core = engine_with_font();
    let env = core.layout(TWO_LINES, &LayoutOptions {
        viewport_width: Some(800),
        ..LayoutOptions::default()
    });
    assert!(matches!(env.data, Some(LayoutData::Flat(_))));
}

#[test]
fn by_row_groups_two_visual_rows() {
    let mut core = engine_with_font();
    let env = core.layout(TWO_LINES, &options(800, "byRow"));
    assert!(env.success);
    let rows = match env.data.unwrap() {
        LayoutData::ByRow(rows) => rows,
        other => panic!("expected byRow payload, got {:?}", other),
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row_index, 0);
    assert_eq!(rows[1].row_index, 1);
    assert!(rows[0].y < rows[1].y, "rows ordered by ascending y");
    // "first line" = 10 chars, "second line" = 11 chars
    assert_eq!(rows[0].children.len(), 10);
    assert_eq!(rows[1].children.len(), 11);

    for row in &rows {
        for pair in row.children.windows(2) {
            assert!(pair[0].x <= pair[1].x, "members ascend by x within a row");
        }
    }
}

#[test]
fn simple_and_by_row_agree_on_grouping() {
    // Both modes must bucket identically for the same input; simple is the
    // stripped projection of byRow.
    let mut core = engine_with_font();

    let by_row_env = core.layout(TWO_LINES, &options(800, "byRow"));
    let simple_env = core.layout(TWO_LINES, &options(800, "simple"));

    let rows = match by_row_env.data.unwrap() {
        LayoutData::ByRow(rows) => rows,
        other => panic!("expected byRow payload, got {:?}", other),
    };
    let doc = match simple_env.data.unwrap() {
        LayoutData::Simple(doc) => doc,
        other => panic!("expected simple payload, got {:?}", other),
    };

    assert_eq!(doc.version, "2.0");
    assert_eq!(rows.len(), doc.lines.len());
    for (row, line) in rows.iter().zip(doc.lines.iter()) {
        assert_eq!(row.children.len(), line.characters.len());
        assert_eq!(row.y, line.y);
        for (full, stripped) in row.children.iter().zip(line.characters.iter()) {
            assert_eq!(full.character, stripped.character);
            assert_eq!(full.x, stripped.x);
            assert_eq!(full.baseline, stripped.baseline);
        }
    }
}

#[test]
fn simple_mode_strips_style_fields() {
    let mut core = engine_with_font();
    let env = core.layout("<p>hi</p>", &options(800, "simple"));
    let json = serde_json::to_value(env.data.unwrap()).unwrap();
    let ch = &json["lines"][0]["characters"][0];
    assert!(ch.get("character").is_some());
    assert!(ch.get("baseline").is_some());
    assert!(ch.get("fontFamily").is_none(), "style must be stripped");
    assert!(ch.get("color").is_none());
}

#[test]
fn full_mode_builds_block_line_run_hierarchy() {
    let mut core = engine_with_font();
    let env = core.layout(TWO_LINES, &options(800, "full"));
    let doc = match env.data.unwrap() {
        LayoutData::Full(doc) => doc,
        other => panic!("expected full payload, got {:?}", other),
    };

    assert_eq!(doc.version, "2.0");
    assert_eq!(doc.viewport.width, 800);
    assert_eq!(doc.blocks.len(), 1);
    let block = &doc.blocks[0];
    assert_eq!(block.lines.len(), 2);
    for (idx, line) in block.lines.iter().enumerate() {
        assert_eq!(line.line_index, idx);
        // Single font and style throughout: exactly one run per line
        assert_eq!(line.runs.len(), 1);
        assert_eq!(line.runs[0].run_index, 0);
        assert_eq!(line.runs[0].font_family, "test-sans");
    }
    let total: usize = block
        .lines
        .iter()
        .flat_map(|l| l.runs.iter())
        .map(|r| r.characters.len())
        .sum();
    assert_eq!(total, 21);
}

#[test]
fn full_mode_serialization_is_stable() {
    // Same input twice must produce byte-identical JSON (no map ordering or
    // nondeterminism on the wire).
    let mut core = engine_with_font();
    let first = core.layout(TWO_LINES, &options(800, "full"));
    let second = core.layout(TWO_LINES, &options(800, "full"));
    let a = serde_json::to_string(&first.data.unwrap()).unwrap();
    let b = serde_json::to_string(&second.data.unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn flat_and_by_row_carry_the_same_characters() {
    let mut core = engine_with_font();
    let flat_env = core.layout(TWO_LINES, &options(800, "flat"));
    let row_env = core.layout(TWO_LINES, &options(800, "byRow"));

    let flat = match flat_env.data.unwrap() {
        LayoutData::Flat(chars) => chars,
        other => panic!("expected flat payload, got {:?}", other),
    };
    let rows = match row_env.data.unwrap() {
        LayoutData::ByRow(rows) => rows,
        other => panic!("expected byRow payload, got {:?}", other),
    };
    let regrouped: usize = rows.iter().map(|r| r.children.len()).sum();
    assert_eq!(flat.len(), regrouped);
}

#[test]
fn row_tolerance_override_controls_bucketing() {
    let mut core = engine_with_font();
    // With a huge tolerance every character lands in one bucket regardless
    // of its baseline.
    let env = core.layout(
        TWO_LINES,
        &LayoutOptions {
            viewport_width: Some(800),
            mode: Some("byRow".to_string()),
            row_tolerance: Some(10_000.0),
            ..LayoutOptions::default()
        },
    );
    let rows = match env.data.unwrap() {
        LayoutData::ByRow(rows) => rows,
        other => panic!("expected byRow payload, got {:?}", other),
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].children.len(), 21);
}

#[test]
fn legacy_byrow_alias_is_accepted() {
    let mut core = engine_with_font();
    let env = core.layout(TWO_LINES, &options(800, "byrow"));
    assert!(env.success);
    assert!(matches!(env.data, Some(LayoutData::ByRow(_))));
}

#[test]
fn envelope_serializes_numeric_error_codes() {
    let mut core = EngineCore::new();
    let env = core.layout("<p>hi</p>", &options(800, "flat"));
    assert!(!env.success);
    let json = serde_json::to_value(&env).unwrap();
    assert_eq!(json["success"], serde_json::json!(false));
    assert_eq!(json["errors"][0]["code"], serde_json::json!(2001));
    assert_eq!(json["errors"][0]["codeName"], serde_json::json!("FONT_NOT_LOADED"));
    assert_eq!(json["errors"][0]["severity"], serde_json::json!("error"));
    assert_eq!(env.errors[0].code, ErrorCode::FontNotLoaded);
}
