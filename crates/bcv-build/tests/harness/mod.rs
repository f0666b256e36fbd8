//! Test harness for pipeline and scheduler tests.
//!
//! Provides an isolated environment: a scratch base the pipeline allocates
//! job directories under, plus a bin directory of fake compiler and
//! disassembler shell scripts standing in for the real toolchain.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;

use bcv_build::pipeline::BuildPipeline;
use bcv_build::toolchain::ToolchainConfig;
use camino::Utf8PathBuf;
use tempfile::TempDir;

/// An isolated test environment.
pub struct TestEnv {
    /// Holds the fake tool scripts.
    pub bin: TempDir,
    /// Scratch base for job workspaces.
    pub scratch: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            bin: TempDir::new().expect("failed to create bin temp dir"),
            scratch: TempDir::new().expect("failed to create scratch temp dir"),
        }
    }

    pub fn scratch_base(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.scratch.path().to_path_buf())
            .expect("temp dir path is not UTF-8")
    }

    /// A pipeline over the given fake tools, with the default artifact
    /// extensions.
    pub fn pipeline(&self, compiler: &str, disassembler: &str) -> BuildPipeline {
        BuildPipeline::new(
            ToolchainConfig::new(compiler, disassembler),
            self.scratch_base(),
        )
    }

    /// Install an executable script and return its absolute path.
    pub fn install_tool(&self, name: &str, body: &str) -> String {
        let path = self.bin.path().join(name);
        let script = format!("#!/bin/sh\n{body}\n");
        std::fs::write(&path, script).expect("failed to write tool script");

        let mut perms = std::fs::metadata(&path)
            .expect("failed to stat tool script")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("failed to chmod tool script");

        path.to_str().expect("temp dir path is not UTF-8").to_string()
    }

    /// A compiler that writes the given printf escapes to the binary
    /// artifact and exits 0.
    pub fn ok_compiler(&self, printf_bytes: &str) -> String {
        self.install_tool(
            "fake-compiler",
            &format!(r#"printf '{printf_bytes}' > "${{1%.*}}.bin""#),
        )
    }

    /// A compiler that records each invocation before succeeding.
    pub fn counting_compiler(&self, printf_bytes: &str) -> String {
        self.install_tool(
            "fake-compiler",
            &format!(
                "echo run >> \"$(dirname \"$0\")/compile-count\"\nprintf '{printf_bytes}' > \"${{1%.*}}.bin\""
            ),
        )
    }

    /// A compiler that reports `message` on stderr and exits 1.
    pub fn failing_compiler(&self, message: &str) -> String {
        self.install_tool(
            "fake-compiler",
            &format!(r#"echo "{message}" >&2; exit 1"#),
        )
    }

    /// A compiler that drops a marker file, then sleeps.
    pub fn slow_compiler(&self, seconds: u32) -> String {
        self.install_tool(
            "fake-compiler",
            &format!(r#"touch "$(dirname "$0")/compiler-ran"; sleep {seconds}"#),
        )
    }

    /// A compiler that sleeps, then succeeds. Keeps the job Running long
    /// enough for status observers.
    pub fn slow_ok_compiler(&self, seconds: u32, printf_bytes: &str) -> String {
        self.install_tool(
            "fake-compiler",
            &format!("sleep {seconds}\nprintf '{printf_bytes}' > \"${{1%.*}}.bin\""),
        )
    }

    /// A disassembler that prints `text` on stdout and exits 0.
    pub fn ok_disassembler(&self, text: &str) -> String {
        self.install_tool("fake-disassembler", &format!(r#"echo "{text}""#))
    }

    /// A disassembler that reports `message` on stderr and exits 1.
    pub fn failing_disassembler(&self, message: &str) -> String {
        self.install_tool(
            "fake-disassembler",
            &format!(r#"echo "{message}" >&2; exit 1"#),
        )
    }

    /// How many times the counting compiler ran.
    pub fn compile_count(&self) -> usize {
        std::fs::read_to_string(self.bin.path().join("compile-count"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    /// Whether a tool dropped the given marker file.
    pub fn tool_ran(&self, marker: &str) -> bool {
        self.bin.path().join(marker).exists()
    }

    /// Entries left under the scratch base. Zero after a cleaned-up job.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Octal printf escapes for a byte buffer, for use in fake compilers.
pub fn printf_escapes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\{b:03o}")).collect()
}
