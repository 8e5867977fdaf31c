use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Two saved versions of a page in a scratch directory
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Write a file into the fixture directory
    fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Run seodiff with the fixture directory as working directory
    fn run(&self, args: &[&str]) -> Output {
        self.run_with_stdin(args, None)
    }

    fn run_with_stdin(&self, args: &[&str], stdin: Option<&str>) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_seodiff"))
            .current_dir(self.dir.path())
            .args(args)
            .env_remove("SEODIFF_FORMAT")
            .env_remove("SEODIFF_ONLY_CHANGES")
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to run seodiff");

        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
        drop(pipe);

        child.wait_with_output().unwrap()
    }

    /// Run seodiff and return stdout, asserting success
    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "seodiff {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

const BEFORE: &str = r#"<html>
<head>
<title>Blue Widgets | Acme</title>
<link rel="canonical" href="https://acme.test/widgets">
</head>
<body>
<h1>Blue Widgets</h1>

<p>Free shipping.</p>
</body>
</html>
"#;

const AFTER: &str = r#"<html>
<head>
<title>Blue Widgets | Acme Co</title>
<link rel="canonical" href="https://acme.test/widgets/blue">
<link rel="alternate" hreflang="de" href="https://acme.test/de/widgets">
</head>
<body>
<h1>Blue Widgets</h1>

</body>
</html>
"#;

fn page_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.write_file("before.html", BEFORE.as_bytes());
    fixture.write_file("after.html", AFTER.as_bytes());
    fixture
}

// =============================================================================
// diff
// =============================================================================

#[test]
fn diff_machine_format() {
    let fixture = page_fixture();
    let out = fixture.stdout(&["diff", "before.html", "after.html", "--format", "machine"]);
    insta::assert_snapshot!(out, @r#"
    1: <html>
    2: <head>
    -3: <title>Blue Widgets | Acme</title>
    +3: <title>Blue Widgets | Acme Co</title>
    -4: <link rel="canonical" href="https://acme.test/widgets">
    +4: <link rel="canonical" href="https://acme.test/widgets/blue">
    +5: <link rel="alternate" hreflang="de" href="https://acme.test/de/widgets">
    5: </head>
    6: <body>
    7: <h1>Blue Widgets</h1>
    8: [Blank Line]
    -9: <p>Free shipping.</p>
    10: </body>
    11: </html>
    "#);
}

#[test]
fn diff_machine_only_changes() {
    let fixture = page_fixture();
    let out = fixture.stdout(&[
        "diff",
        "before.html",
        "after.html",
        "--format",
        "machine",
        "--only-changes",
    ]);
    insta::assert_snapshot!(out, @r#"
    -3: <title>Blue Widgets | Acme</title>
    +3: <title>Blue Widgets | Acme Co</title>
    -4: <link rel="canonical" href="https://acme.test/widgets">
    +4: <link rel="canonical" href="https://acme.test/widgets/blue">
    +5: <link rel="alternate" hreflang="de" href="https://acme.test/de/widgets">
    -9: <p>Free shipping.</p>
    "#);
}

#[test]
fn diff_human_format_is_escaped_html() {
    let fixture = page_fixture();
    let out = fixture.stdout(&[
        "diff",
        "before.html",
        "after.html",
        "--strip-whitespace",
        "--only-changes",
    ]);
    assert_eq!(
        out,
        "<span style='background-color: #ffdddd;'>-3: &lt;title&gt;Blue Widgets | Acme&lt;/title&gt;</span><br>\
         <span style='background-color: #ddffdd;'>+3: &lt;title&gt;Blue Widgets | Acme Co&lt;/title&gt;</span><br>\
         <span style='background-color: #ffdddd;'>-4: &lt;link rel=&quot;canonical&quot; href=&quot;https://acme.test/widgets&quot;&gt;</span><br>\
         <span style='background-color: #ddffdd;'>+4: &lt;link rel=&quot;canonical&quot; href=&quot;https://acme.test/widgets/blue&quot;&gt;</span><br>\
         <span style='background-color: #ddffdd;'>+5: &lt;link rel=&quot;alternate&quot; hreflang=&quot;de&quot; href=&quot;https://acme.test/de/widgets&quot;&gt;</span><br>\
         <span style='background-color: #ffdddd;'>-9: &lt;p&gt;Free shipping.&lt;/p&gt;</span>\n"
    );
}

#[test]
fn diff_identical_pages_only_changes_is_empty() {
    let fixture = page_fixture();
    for format in ["human", "machine", "ndiff"] {
        let out = fixture.stdout(&[
            "diff",
            "before.html",
            "before.html",
            "--format",
            format,
            "--only-changes",
        ]);
        assert_eq!(out, "", "format {format}");
    }
}

#[test]
fn diff_ndiff_format() {
    let fixture = Fixture::new();
    fixture.write_file("a.txt", b"A\nB\nC\n");
    fixture.write_file("b.txt", b"A\nX\nC\n");
    let out = fixture.stdout(&["diff", "a.txt", "b.txt", "--format", "ndiff"]);
    assert_eq!(out, "  A\n- B\n+ X\n  C\n");
}

#[test]
fn diff_sentences() {
    let fixture = Fixture::new();
    fixture.write_file("a.txt", b"Blue widgets ship free.\nThey cost five dollars.\n");
    fixture.write_file(
        "b.txt",
        b"Blue widgets ship free.\nThey cost six dollars.\nOrder today.\n",
    );
    let out = fixture.stdout(&["diff", "a.txt", "b.txt", "--sentences", "--format", "ndiff"]);
    assert_eq!(
        out,
        "  Blue widgets ship free.\n\\ No newline at end of unit\n\
         - They cost five dollars.\n\\ No newline at end of unit\n\
         + They cost six dollars.\n\\ No newline at end of unit\n\
         + Order today.\n\\ No newline at end of unit\n"
    );
}

#[test]
fn diff_sentences_drop_unicode_terminators() {
    let fixture = Fixture::new();
    fixture.write_file("a.txt", "One.\u{2028}Two.\x0c".as_bytes());
    fixture.write_file("b.txt", "One.\u{2029}Three.\u{85}".as_bytes());
    let out = fixture.stdout(&["diff", "a.txt", "b.txt", "--sentences", "--format", "ndiff"]);
    assert_eq!(
        out,
        "  One.\n\\ No newline at end of unit\n\
         - Two.\n\\ No newline at end of unit\n\
         + Three.\n\\ No newline at end of unit\n"
    );
}

#[test]
fn diff_reads_stdin() {
    let fixture = Fixture::new();
    fixture.write_file("b.txt", b"A\nX\n");
    let output = fixture.run_with_stdin(
        &["diff", "-", "b.txt", "--format", "machine", "--only-changes"],
        Some("A\nB\n"),
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "-2: B\n+2: X\n");
}

#[test]
fn diff_rejects_stdin_twice() {
    let fixture = Fixture::new();
    let output = fixture.run(&["diff", "-", "-"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("stdin"));
}

#[test]
fn diff_rejects_invalid_utf8() {
    let fixture = Fixture::new();
    fixture.write_file("a.txt", b"ok\n");
    fixture.write_file("b.txt", &[b'o', 0xff, b'\n']);
    let output = fixture.run(&["diff", "a.txt", "b.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not valid UTF-8"));
}

#[test]
fn diff_reports_missing_file() {
    let fixture = Fixture::new();
    fixture.write_file("a.txt", b"ok\n");
    let output = fixture.run(&["diff", "a.txt", "missing.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.txt"));
}

// =============================================================================
// prompt
// =============================================================================

#[test]
fn prompt_embeds_numbered_changes() {
    let fixture = page_fixture();
    fixture.write_file("instructions.txt", b"List SEO-relevant changes.\n");
    let out = fixture.stdout(&[
        "prompt",
        "before.html",
        "after.html",
        "--only-changes",
        "--instructions",
        "instructions.txt",
    ]);
    insta::assert_snapshot!(out, @r#"
    List SEO-relevant changes.

    -3: <title>Blue Widgets | Acme</title>
    +3: <title>Blue Widgets | Acme Co</title>
    -4: <link rel="canonical" href="https://acme.test/widgets">
    +4: <link rel="canonical" href="https://acme.test/widgets/blue">
    +5: <link rel="alternate" hreflang="de" href="https://acme.test/de/widgets">
    -9: <p>Free shipping.</p>
    "#);
}

#[test]
fn prompt_uses_default_instructions() {
    let fixture = page_fixture();
    let out = fixture.stdout(&["prompt", "before.html", "after.html"]);
    assert!(out.starts_with("Analyze the changes"));
    assert!(out.contains("\n\n1: <html>\n"));
}

#[test]
fn prompt_echoes_model_on_stderr() {
    let fixture = page_fixture();
    let output = fixture.run(&["prompt", "before.html", "after.html", "--model", "gpt-4-turbo"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stderr), "model: gpt-4-turbo\n");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Analyze the changes"));
}

#[test]
fn prompt_rejects_unknown_model() {
    let fixture = page_fixture();
    let output = fixture.run(&["prompt", "before.html", "after.html", "--model", "gpt-2"]);
    assert!(!output.status.success());
}

// =============================================================================
// render
// =============================================================================

#[test]
fn render_saved_script() {
    let fixture = Fixture::new();
    fixture.write_file("script.txt", b"  A\n- B\n? ^\n+ X\n? ^\n  C\n");
    let out = fixture.stdout(&["render", "script.txt", "--format", "machine"]);
    assert_eq!(out, "1: A\n-2: B\n+2: X\n3: C\n");
}

#[test]
fn render_rejects_malformed_op() {
    let fixture = Fixture::new();
    fixture.write_file("script.txt", b"  A\n! B\n");
    let output = fixture.run(&["render", "script.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn diff_then_render_matches_direct_diff() {
    let fixture = page_fixture();
    let script = fixture.stdout(&["diff", "before.html", "after.html", "--format", "ndiff"]);
    fixture.write_file("script.txt", script.as_bytes());

    let direct = fixture.stdout(&["diff", "before.html", "after.html"]);
    let rendered = fixture.stdout(&["render", "script.txt"]);
    assert_eq!(rendered, direct);
}

#[test]
fn sentence_script_round_trip_keeps_blank_placeholder() {
    let fixture = Fixture::new();
    fixture.write_file("s1.txt", b"Intro.\n\nOutro.\n");
    fixture.write_file("s2.txt", b"Intro.\nOutro.\nNew.\n");
    let script = fixture.stdout(&["diff", "s1.txt", "s2.txt", "--sentences", "--format", "ndiff"]);
    fixture.write_file("script.txt", script.as_bytes());

    let direct = fixture.stdout(&["diff", "s1.txt", "s2.txt", "--sentences"]);
    let rendered = fixture.stdout(&["render", "script.txt"]);
    assert!(direct.contains("-2: [Blank Line]"));
    assert_eq!(rendered, direct);
}

#[test]
fn script_round_trip_without_final_newline() {
    let fixture = Fixture::new();
    fixture.write_file("a.txt", b"A\nB");
    fixture.write_file("b.txt", b"A\nC");
    let script = fixture.stdout(&["diff", "a.txt", "b.txt", "--format", "ndiff"]);
    fixture.write_file("script.txt", script.as_bytes());

    let direct = fixture.stdout(&["diff", "a.txt", "b.txt"]);
    let rendered = fixture.stdout(&["render", "script.txt"]);
    assert!(direct.contains("-2: B</span>"));
    assert_eq!(rendered, direct);
}

// =============================================================================
// generators
// =============================================================================

#[test]
fn man_page_mentions_commands() {
    let fixture = Fixture::new();
    let out = fixture.stdout(&["man"]);
    assert!(out.contains("seodiff"));
    assert!(out.contains("prompt"));
}

#[test]
fn bash_completions() {
    let fixture = Fixture::new();
    let out = fixture.stdout(&["completions", "bash"]);
    assert!(out.contains("seodiff"));
}
