use appseed::artifact::{split, ScriptArtifact, SCRIPT_MARKER};

#[test]
fn split_round_trips_marker_free_sections() {
    let instructions = "Run the script from an empty directory.";
    let script = "#!/bin/sh\nmkdir -p app\necho done";
    let combined = format!("{instructions}\n{SCRIPT_MARKER}\n{script}\n");

    let artifact = split(&combined, SCRIPT_MARKER);

    assert_eq!(
        artifact,
        ScriptArtifact {
            instructions: instructions.to_string(),
            script_body: script.to_string(),
        }
    );
}

#[test]
fn missing_marker_is_a_valid_case_not_an_error() {
    let artifact = split("  #!/bin/sh\necho bare\n", SCRIPT_MARKER);
    assert_eq!(artifact.instructions, "");
    assert_eq!(artifact.script_body, "#!/bin/sh\necho bare");
}

#[test]
fn only_the_first_marker_occurrence_splits() {
    let combined = format!("before\n{SCRIPT_MARKER}\nmiddle\n{SCRIPT_MARKER}\nafter");
    let artifact = split(&combined, SCRIPT_MARKER);
    assert_eq!(artifact.instructions, "before");
    assert_eq!(artifact.script_body, format!("middle\n{SCRIPT_MARKER}\nafter"));
}

#[test]
fn custom_markers_are_supported() {
    let artifact = split("usage here === body here", "===");
    assert_eq!(artifact.instructions, "usage here");
    assert_eq!(artifact.script_body, "body here");
}

#[test]
fn splitting_is_deterministic() {
    let combined = format!("a\n{SCRIPT_MARKER}\nb");
    assert_eq!(split(&combined, SCRIPT_MARKER), split(&combined, SCRIPT_MARKER));
}
