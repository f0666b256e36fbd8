//! External toolchain configuration.
//!
//! The compiler and disassembler are opaque programs driven purely through
//! their command lines: program name, arguments, working directory, exit
//! code, and redirected streams.

/// Name of the shared stderr-capture artifact inside a job's scratch
/// directory. Both tools write their diagnostics here.
pub const ERROR_LOG: &str = "error.log";

/// The external programs and artifact naming for one target language.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Compiler program name or path.
    pub compiler: String,
    /// Disassembler program name or path.
    pub disassembler: String,
    /// Flag asking the disassembler to print the code section.
    pub disassemble_flag: String,
    /// Flag appended when a request asks for verbose disassembly.
    pub verbose_flag: String,
    /// Extension of the source artifact.
    pub source_ext: String,
    /// Extension of the compiled binary artifact.
    pub binary_ext: String,
    /// Extension of the disassembly artifact.
    pub disasm_ext: String,
}

impl ToolchainConfig {
    /// A toolchain with the default artifact extensions
    /// (`.src` / `.bin` / `.disasm`).
    pub fn new(compiler: impl Into<String>, disassembler: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            disassembler: disassembler.into(),
            disassemble_flag: "-c".to_string(),
            verbose_flag: "-v".to_string(),
            source_ext: "src".to_string(),
            binary_ext: "bin".to_string(),
            disasm_ext: "disasm".to_string(),
        }
    }

    /// The `javac` / `javap` toolchain. `javac` refuses foreign extensions,
    /// so the source and binary artifacts use `.java` / `.class` here.
    pub fn java() -> Self {
        Self {
            source_ext: "java".to_string(),
            binary_ext: "class".to_string(),
            ..Self::new("javac", "javap")
        }
    }

    /// File name of the source artifact for `target`.
    pub fn source_file(&self, target: &str) -> String {
        format!("{target}.{}", self.source_ext)
    }

    /// File name of the compiled binary artifact for `target`.
    pub fn binary_file(&self, target: &str) -> String {
        format!("{target}.{}", self.binary_ext)
    }

    /// File name of the disassembly artifact for `target`.
    pub fn disasm_file(&self, target: &str) -> String {
        format!("{target}.{}", self.disasm_ext)
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self::java()
    }
}
