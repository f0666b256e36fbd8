//! Build-and-disassemble core for the bytecode viewer.
//!
//! Given source text and a target name, the pipeline persists the source
//! into a per-job scratch workspace, invokes an external compiler, then an
//! external disassembler, renders the compiled binary as hex, and removes
//! every artifact on every exit path. A single-slot scheduler runs at most
//! one job at a time on a dedicated worker task; the submitting side never
//! blocks and receives the outcome asynchronously.

pub mod cancel;
pub mod error;
pub mod hexdump;
pub mod pipeline;
pub mod runner;
pub mod scheduler;
pub mod toolchain;
pub mod workspace;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use error::{BuildFault, Result};
pub use hexdump::format_hex;
pub use pipeline::{BuildOutcome, BuildPipeline, BuildRequest};
pub use scheduler::{JobStatus, Scheduler, Submission};
pub use toolchain::ToolchainConfig;
pub use workspace::JobWorkspace;
