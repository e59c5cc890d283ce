//! forge-drv - Compiler driver.
//!
//! Orchestrates one compilation:
//!
//! ```text
//! Source file (.fr)
//!        |
//!        v
//!   [forge-lex]  -> tokens
//!        |
//!        v
//!   [forge-par]  -> syntax tree
//!        |
//!        v
//!   [forge-sem]  -> annotated, type-checked tree
//!        |          (well-formedness, symbols, types, validation)
//!        v
//!   [forge-gen]  -> LLVM module -> textual IR or JIT execution
//! ```
//!
//! Every phase reports into one diagnostic sink. The driver's policy is to
//! stop the pipeline at the first phase that produced error-severity
//! diagnostics; warnings never stop anything. All collected diagnostics
//! are rendered at the end either way.

use anyhow::{anyhow, bail, Context as _};
use std::fmt::Write as _;
use std::path::Path;

use forge_gen::{Codegen, Jit};
use forge_par::ast::{NodeId, SyntaxTree};
use forge_sem::TargetInfo;
use forge_util::{Diagnostic, FileId, Messages, SourceMap};
use inkwell::context::Context;

/// Driver configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Print phase progress to stderr
    pub verbose: bool,
    /// Target facts used by the passes and codegen
    pub target: TargetInfo,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}

/// State for one compiler invocation
pub struct Session {
    pub config: Config,
    pub sources: SourceMap,
    pub messages: Messages,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sources: SourceMap::new(),
            messages: Messages::new(),
        }
    }

    /// Load a file from disk into the source map.
    pub fn load_file(&mut self, path: &Path) -> anyhow::Result<FileId> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Ok(self.sources.add_file(path.display().to_string(), content))
    }

    /// Add an in-memory source (used by tests and the JIT harness).
    pub fn add_source(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        self.sources.add_file(name, content.into())
    }

    /// Lex, parse, and run the semantic passes over one file.
    ///
    /// Always returns the tree, annotated as far as the pipeline got;
    /// check [`Session::messages`] for errors before using it further.
    pub fn analyze(&mut self, file: FileId) -> anyhow::Result<(SyntaxTree, NodeId)> {
        let source = self
            .sources
            .get(file)
            .ok_or_else(|| anyhow!("unknown file id {file:?}"))?
            .content()
            .to_string();

        if self.config.verbose {
            eprintln!("lexing...");
        }
        let tokens = forge_lex::tokenize(&source, file, &mut self.messages);

        if self.config.verbose {
            eprintln!("parsing...");
        }
        let (mut tree, unit) = forge_par::parse(tokens, &mut self.messages);
        if self.messages.has_errors() {
            return Ok((tree, unit));
        }

        if self.config.verbose {
            eprintln!("running semantic passes...");
        }
        forge_sem::analyze(&mut tree, unit, &self.config.target, &mut self.messages);
        Ok((tree, unit))
    }

    /// Compile one file to textual LLVM IR.
    pub fn compile_ir(&mut self, file: FileId) -> anyhow::Result<String> {
        let (mut tree, unit) = self.analyze(file)?;
        if self.messages.has_errors() {
            bail!("compilation failed");
        }

        if self.config.verbose {
            eprintln!("generating code...");
        }
        let module_name = self.module_name(file);
        let context = Context::create();
        let mut codegen = Codegen::new(&context, &module_name, &mut tree, self.config.target);
        codegen
            .translation_unit(unit)
            .map_err(|error| anyhow!("{error}"))?;
        Ok(codegen.module.print_to_string().to_string())
    }

    /// Compile one file and run its `main` through the JIT.
    pub fn run_jit(&mut self, file: FileId) -> anyhow::Result<i32> {
        let (mut tree, unit) = self.analyze(file)?;
        if self.messages.has_errors() {
            bail!("compilation failed");
        }

        let module_name = self.module_name(file);
        let context = Context::create();
        let mut codegen = Codegen::new(&context, &module_name, &mut tree, self.config.target);
        codegen
            .translation_unit(unit)
            .map_err(|error| anyhow!("{error}"))?;

        if self.config.verbose {
            eprintln!("running...");
        }
        let jit = Jit::new(&codegen.module).map_err(|error| anyhow!("{error}"))?;
        jit.run_main().map_err(|error| anyhow!("{error}"))
    }

    fn module_name(&self, file: FileId) -> String {
        self.sources
            .get(file)
            .map(|f| {
                Path::new(f.name())
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| f.name().to_string())
            })
            .unwrap_or_else(|| "module".to_string())
    }

    /// Render all collected diagnostics as a report.
    pub fn render_diagnostics(&self) -> String {
        let mut out = String::new();
        for diagnostic in self.messages.diagnostics() {
            self.render_diagnostic(&mut out, diagnostic);
        }

        let errors = self.messages.error_count();
        let warnings = self.messages.warning_count();
        if errors > 0 {
            let plural = if errors == 1 { "" } else { "s" };
            let _ = writeln!(out, "{errors} error{plural}");
        } else if warnings > 0 {
            let plural = if warnings == 1 { "" } else { "s" };
            let _ = writeln!(out, "{warnings} warning{plural}");
        }
        out
    }

    fn render_diagnostic(&self, out: &mut String, diagnostic: &Diagnostic) {
        let file_name = self
            .sources
            .get(diagnostic.span.file_id)
            .map(|f| f.name())
            .unwrap_or("--");
        let code = diagnostic
            .code
            .map(|c| format!(" {}", c.as_str()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}:{}:{} - {}{}: {}",
            file_name,
            diagnostic.span.line,
            diagnostic.span.column,
            diagnostic.level,
            code,
            diagnostic.message
        );
        for note in &diagnostic.notes {
            let _ = writeln!(out, "note: {note}");
        }
        for suggestion in &diagnostic.suggestions {
            let _ = writeln!(out, "suggestion: {suggestion}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_reports_into_session() {
        let mut session = Session::new(Config::new());
        let file = session.add_source("t.fr", "func f(a: u8) -> i8 { return a; }");
        session.analyze(file).unwrap();
        assert!(session.messages.has_errors());

        let report = session.render_diagnostics();
        assert!(report.contains("ETY005"), "{report}");
        assert!(report.contains("1 error"), "{report}");
    }

    #[test]
    fn test_render_includes_location_and_suggestion() {
        let mut session = Session::new(Config::new());
        let file = session.add_source("t.fr", "func f(a: u8) -> i8 {\n  return a;\n}");
        session.analyze(file).unwrap();

        let report = session.render_diagnostics();
        assert!(
            report.contains("t.fr:2:10 - error ETY005: unable to implicitly cast from type u8 to i8"),
            "{report}"
        );
        assert!(
            report.contains("suggestion: use 'as' to cast between types"),
            "{report}"
        );
    }

    #[test]
    fn test_clean_program_has_empty_report() {
        let mut session = Session::new(Config::new());
        let file = session.add_source("t.fr", "func f(a: u8) -> u8 { return a; }");
        session.analyze(file).unwrap();
        assert_eq!(session.render_diagnostics(), "");
    }

    #[test]
    fn test_warning_report_counts() {
        let mut session = Session::new(Config::new());
        let file = session.add_source("t.fr", "func f() -> u8 { return 256u8; }");
        session.analyze(file).unwrap();
        assert!(!session.messages.has_errors());

        let report = session.render_diagnostics();
        assert!(report.contains("warning WSY001"), "{report}");
        assert!(report.contains("note: was parsed as 256"), "{report}");
        assert!(report.contains("note: but got truncated to 0"), "{report}");
        assert!(report.contains("1 warning"), "{report}");
    }
}
