// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Project document generation tests

use anyhow::Result;
use omnibridge::document::{self, FILEPATH_TOKEN, PROJECT_TEMPLATE, TRANSFER_DATA_TOKEN};
use omnibridge::{generate, AttrValue, BridgeError, Metadata, Template};
use tempfile::TempDir;

fn axis_metadata() -> Metadata {
    vec![("mm:axis_fwd", "Z"), ("mm:axis_up", "Y"), ("mm:axis_vis", "1")]
        .into_iter()
        .collect()
}

/// Lines between the `transfer_data` scope's braces
fn transfer_data_lines(document: &str) -> Vec<&str> {
    let lines: Vec<&str> = document.lines().collect();
    let scope = lines
        .iter()
        .position(|l| l.contains("def Scope \"transfer_data\""))
        .expect("transfer_data scope");
    let open = scope + 1;
    let close = lines[open..]
        .iter()
        .position(|l| l.trim() == "}")
        .expect("closing brace")
        + open;
    lines[open + 1..close].to_vec()
}

#[test]
fn test_payload_at_token_position() -> Result<()> {
    let token_offset = PROJECT_TEMPLATE.find(FILEPATH_TOKEN).expect("filepath token");
    let payload = "../assets/char.usd";

    let output = generate(payload, &Metadata::new())?;

    // Marker removal happens after the path token, so the offset is unchanged
    assert_eq!(&output[token_offset..token_offset + payload.len()], payload);
    assert!(!output.contains(FILEPATH_TOKEN));
    assert!(!output.contains(TRANSFER_DATA_TOKEN));
    Ok(())
}

#[test]
fn test_metadata_lines_in_order() -> Result<()> {
    let metadata = Metadata::new()
        .with("mm:zeta", "last-inserted-first")
        .with("mm:alpha", "second")
        .with("mm:count", 3_i64)
        .with("mm:enabled", false);

    let output = generate("./char.usd", &metadata)?;
    let lines = transfer_data_lines(&output);

    assert_eq!(
        lines,
        vec![
            r#"        string mm:zeta = "last-inserted-first""#,
            r#"        string mm:alpha = "second""#,
            "        int mm:count = 3",
            "        bool mm:enabled = 0",
        ]
    );
    Ok(())
}

#[test]
fn test_generate_is_deterministic() -> Result<()> {
    let first = generate("./char.usd", &axis_metadata())?;
    let second = generate("./char.usd", &axis_metadata())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_empty_metadata_leaves_no_blank_line() -> Result<()> {
    let output = generate("./char.usd", &Metadata::new())?;

    assert!(transfer_data_lines(&output).is_empty());
    assert!(output.contains("    def Scope \"transfer_data\"\n    {\n    }\n"));
    assert_eq!(
        output.lines().count(),
        PROJECT_TEMPLATE.lines().count() - 1
    );
    Ok(())
}

#[test]
fn test_axis_scenario_matches_template() -> Result<()> {
    let output = generate("./char.usd", &axis_metadata())?;

    let expected = PROJECT_TEMPLATE
        .replace("@%filepath%@", "@./char.usd@")
        .replace(
            "        %transfer_data%\n",
            concat!(
                "        mm:axis_fwd = Z\n",
                "        mm:axis_up = Y\n",
                "        mm:axis_vis = 1\n",
            ),
        );
    assert_eq!(output, expected);
    assert!(!output.contains("string mm:axis_vis"));
    Ok(())
}

#[test]
fn test_pairs_with_typed_keys() -> Result<()> {
    let metadata: Metadata = vec![
        ("string mm:axis_fwd", "\"Z\""),
        ("string mm:axis_up", "\"Y\""),
        ("bool mm:axis_vis", "1"),
    ]
    .into_iter()
    .collect();

    let lines: Vec<String> = transfer_data_lines(&generate("./char.usd", &metadata)?)
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            r#"        string mm:axis_fwd = "Z""#,
            r#"        string mm:axis_up = "Y""#,
            "        bool mm:axis_vis = 1",
        ]
    );
    Ok(())
}

#[test]
fn test_names_cannot_escape_scope() {
    for name in ["mm:x}", "mm:x\"", "mm:x=", "mm:x("] {
        let typed = Metadata::new().with(name, "1").with("mm:y", "2");
        assert!(
            matches!(generate("./char.usd", &typed), Err(BridgeError::InvalidMetadata { .. })),
            "typed name {:?} should be rejected",
            name
        );

        let pairs: Metadata = vec![(name, "1"), ("mm:y", "2")].into_iter().collect();
        assert!(
            matches!(generate("./char.usd", &pairs), Err(BridgeError::InvalidMetadata { .. })),
            "pair name {:?} should be rejected",
            name
        );
    }

    let value: Metadata = std::iter::once(("mm:x", "1 }")).collect();
    assert!(matches!(
        generate("./char.usd", &value),
        Err(BridgeError::InvalidMetadata { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_written_mode_matches_plain_create() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new()?;
    let project = dir.path().join("char_project.usda");
    let plain = dir.path().join("plain.usda");

    omnibridge::write_project(&project, "./char.usd", &Metadata::new())?;
    std::fs::write(&plain, "plain")?;

    let mode = |path: &std::path::Path| -> Result<u32> {
        Ok(std::fs::metadata(path)?.permissions().mode() & 0o777)
    };
    assert_eq!(mode(&project)?, mode(&plain)?);
    Ok(())
}

#[test]
fn test_typed_axis_visibility() -> Result<()> {
    let metadata = Metadata::new()
        .with("mm:axis_fwd", "Z")
        .with("mm:axis_up", "Y")
        .with("mm:axis_vis", true);

    let output = generate("./char.usd", &metadata)?;
    assert!(output.contains("        bool mm:axis_vis = 1\n"));
    Ok(())
}

#[test]
fn test_empty_path_writes_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("char_project.usda");

    assert!(matches!(
        generate("", &Metadata::new()),
        Err(BridgeError::InvalidPath { .. })
    ));

    let result = document::write(&path, &Template::project(), "", &Metadata::new());
    assert!(matches!(result, Err(BridgeError::InvalidPath { .. })));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_invalid_path_characters() {
    for path in ["   ", "./a@b.usd", "./a\nb.usd", "./%transfer_data%.usd"] {
        let result = generate(path, &Metadata::new());
        assert!(
            matches!(result, Err(BridgeError::InvalidPath { .. })),
            "path {:?} should be rejected",
            path
        );
    }
}

#[test]
fn test_metadata_token_rejected() {
    let metadata = Metadata::new().with("mm:note", "%filepath%");
    assert!(matches!(
        generate("./char.usd", &metadata),
        Err(BridgeError::InvalidMetadata { .. })
    ));
}

#[test]
fn test_custom_template_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let template_path = dir.path().join("custom.usda");
    std::fs::write(
        &template_path,
        "#usda 1.0\n\ndef Xform \"Root\" (\n    prepend payload = @%filepath%@\n)\n{\n    %transfer_data%\n}\n",
    )?;

    let template = Template::from_file(&template_path)?;
    let metadata = Metadata::new().with("mm:tags", AttrValue::StringArray(vec!["a".into(), "b".into()]));
    let output_path = dir.path().join("out.usda");
    document::write(&output_path, &template, "./head.usd", &metadata)?;

    let written = std::fs::read_to_string(&output_path)?;
    assert_eq!(
        written,
        "#usda 1.0\n\ndef Xform \"Root\" (\n    prepend payload = @./head.usd@\n)\n{\n    string[] mm:tags = [\"a\", \"b\"]\n}\n"
    );
    Ok(())
}

#[test]
fn test_corrupted_template() {
    let broken = PROJECT_TEMPLATE.replace(TRANSFER_DATA_TOKEN, "");
    match Template::new(broken) {
        Err(err @ BridgeError::MissingPlaceholder { .. }) => assert!(!err.is_recoverable()),
        other => panic!("unexpected result: {:?}", other),
    }
}
