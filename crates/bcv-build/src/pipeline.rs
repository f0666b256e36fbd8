//! The build-and-disassemble pipeline.
//!
//! One job moves through writing the source, compiling, disassembling, and
//! reading the artifacts back, with a cancellation checkpoint between every
//! two stages. User-visible failures (a tool exiting non-zero, an
//! undeterminable target name) are values, not errors; `Err` is reserved for
//! environment faults.

use std::sync::LazyLock;

use camino::Utf8PathBuf;
use regex::Regex;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::hexdump::format_hex;
use crate::runner::{RunOutcome, ToolInvocation, run_tool};
use crate::toolchain::{ERROR_LOG, ToolchainConfig};
use crate::workspace::JobWorkspace;

/// One build job, snapshotted at submission. Later edits to the editor text
/// never affect an in-flight job.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Explicit target name; derived from the source text when `None`.
    pub target_name: Option<String>,
    /// The source text to compile.
    pub source_text: String,
    /// Ask the disassembler for verbose output.
    pub verbose: bool,
}

/// Terminal result of one accepted build job. Produced exactly once per
/// accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The compiler exited non-zero, or no target name could be determined.
    /// The message is the captured error-log content (or the fixed
    /// diagnostic for a missing target name).
    CompileError { message: String },
    /// The disassembler exited non-zero; the message is the captured
    /// error-log content.
    DisassembleError { message: String },
    /// The job was abandoned at a cancellation checkpoint.
    Cancelled,
    /// Both tools succeeded.
    Success {
        disassembly: String,
        binary_hex: String,
    },
}

/// First `public [final] class <identifier>` declaration in the source.
/// A heuristic scan, not a parser: the first match wins.
static PUBLIC_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:final\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});

/// Diagnostic for source text with no recognizable public class.
const NO_TARGET_NAME: &str = "could not determine target name";

fn extract_target_name(source: &str) -> Option<String> {
    PUBLIC_CLASS
        .captures(source)
        .map(|caps| caps[1].to_string())
}

/// Sequences one job end to end: write source, compile, disassemble, read
/// the binary and the disassembly back.
#[derive(Debug)]
pub struct BuildPipeline {
    toolchain: ToolchainConfig,
    scratch_base: Utf8PathBuf,
}

impl BuildPipeline {
    /// A pipeline allocating job workspaces under `scratch_base`.
    pub fn new(toolchain: ToolchainConfig, scratch_base: impl Into<Utf8PathBuf>) -> Self {
        Self {
            toolchain,
            scratch_base: scratch_base.into(),
        }
    }

    /// Run one build job to a terminal outcome.
    ///
    /// `Err` is reserved for internal faults (unwritable scratch directory,
    /// unlaunchable tools); every user-visible failure is an `Ok` outcome.
    /// Artifacts created along the way are removed before returning,
    /// whichever branch is taken.
    pub async fn run(&self, request: &BuildRequest, cancel: &CancelToken) -> Result<BuildOutcome> {
        let target = match request
            .target_name
            .clone()
            .or_else(|| extract_target_name(&request.source_text))
        {
            Some(name) => name,
            None => {
                // Recoverable input-shape problem: reported like a compile
                // error, without invoking any external tool.
                return Ok(BuildOutcome::CompileError {
                    message: NO_TARGET_NAME.to_string(),
                });
            }
        };

        debug!(target = %target, verbose = request.verbose, "starting build job");

        let mut workspace = JobWorkspace::allocate(&self.scratch_base).await?;

        let source_file = self.toolchain.source_file(&target);
        let binary_file = self.toolchain.binary_file(&target);

        workspace
            .write_source(&source_file, &request.source_text)
            .await?;
        let error_log = workspace.register(ERROR_LOG);
        let binary_path = workspace.register(&binary_file);
        let disasm_path = workspace.register(&self.toolchain.disasm_file(&target));

        let compile = ToolInvocation {
            program: self.toolchain.compiler.clone(),
            args: vec![source_file],
            cwd: workspace.dir().to_owned(),
            stderr_to: error_log.clone(),
            stdout_to: None,
        };
        match run_tool(&compile, cancel).await? {
            RunOutcome::Cancelled => return Ok(BuildOutcome::Cancelled),
            RunOutcome::Exited { code: 0 } => {}
            RunOutcome::Exited { code } => {
                info!(code, target = %target, "compiler reported errors");
                return Ok(BuildOutcome::CompileError {
                    message: workspace.read_text(&error_log).await?,
                });
            }
        }

        let mut args = vec![self.toolchain.disassemble_flag.clone()];
        if request.verbose {
            args.push(self.toolchain.verbose_flag.clone());
        }
        args.push(binary_file);

        let disassemble = ToolInvocation {
            program: self.toolchain.disassembler.clone(),
            args,
            cwd: workspace.dir().to_owned(),
            stderr_to: error_log.clone(),
            stdout_to: Some(disasm_path.clone()),
        };
        match run_tool(&disassemble, cancel).await? {
            RunOutcome::Cancelled => return Ok(BuildOutcome::Cancelled),
            RunOutcome::Exited { code: 0 } => {}
            RunOutcome::Exited { code } => {
                info!(code, target = %target, "disassembler reported errors");
                return Ok(BuildOutcome::DisassembleError {
                    message: workspace.read_text(&error_log).await?,
                });
            }
        }

        if cancel.is_cancelled() {
            return Ok(BuildOutcome::Cancelled);
        }

        let binary = workspace.read_bytes(&binary_path).await?;
        let disassembly = workspace.read_text(&disasm_path).await?;

        info!(target = %target, binary_len = binary.len(), "build finished");

        Ok(BuildOutcome::Success {
            disassembly,
            binary_hex: format_hex(&binary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_public_class_name() {
        assert_eq!(
            extract_target_name("public class Foo {}"),
            Some("Foo".to_string())
        );
    }

    #[test]
    fn extracts_public_final_class_name() {
        let source = "package demo;\n\npublic final class HelloWorld {\n}\n";
        assert_eq!(extract_target_name(source), Some("HelloWorld".to_string()));
    }

    #[test]
    fn first_declaration_wins() {
        let source = "public class First {}\npublic class Second {}";
        assert_eq!(extract_target_name(source), Some("First".to_string()));
    }

    #[test]
    fn non_public_or_non_class_declarations_do_not_match() {
        assert_eq!(extract_target_name("class Hidden {}"), None);
        assert_eq!(extract_target_name("public interface Shape {}"), None);
        assert_eq!(extract_target_name(""), None);
    }

    #[test]
    fn name_capture_stops_at_the_first_non_identifier() {
        assert_eq!(
            extract_target_name("public class Box<T> {}"),
            Some("Box".to_string())
        );
        assert_eq!(
            extract_target_name("public final class A extends B {}"),
            Some("A".to_string())
        );
    }
}
