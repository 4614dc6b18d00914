//! opalc-drv - Compiler Driver
//!
//! Orchestrates one compilation: read the source file whole, parse it
//! into the arena IR, resolve symbol references, complete types, then
//! emit whatever the configuration asks for (the pretty-printed
//! program by default, or a token/IR dump).
//!
//! The passes themselves return typed errors; this crate is where they
//! become user-visible diagnostics in the fixed
//! `<file>:<line>: FATAL: <message>` shape, written to stderr with a
//! non-zero exit. The first error ends the run - there is no recovery
//! and no error accumulation.

use std::fmt;
use std::path::PathBuf;

use opalc_lex::TokenKind;
use opalc_par::ir::{Ir, SymbolKind};
use opalc_par::{pretty, ParseError};
use opalc_sem::{complete, resolve, CompleteError, ResolveError};
use opalc_util::{Diagnostic, FileId, SourceError, SourceMap, Span};
use thiserror::Error;

/// What the driver should print on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitKind {
    /// The pretty-printed program (the default).
    Pretty,
    /// One line per token.
    Tokens,
    /// Arena statistics and the symbol table.
    Ir,
}

impl Default for EmitKind {
    fn default() -> Self {
        EmitKind::Pretty
    }
}

/// Configuration for one compiler invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// The source file.
    pub input: PathBuf,
    /// What to print on success.
    pub emit: EmitKind,
    /// Trace the phases on stderr.
    pub verbose: bool,
}

/// Command-line usage error.
#[derive(Debug, Error)]
#[error("{message}\nusage: opalc [--emit pretty|tokens|ir] [--verbose] <file>")]
pub struct UsageError {
    pub message: String,
}

impl Config {
    /// Parse command-line arguments (without the program name).
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, UsageError> {
        let mut input = None;
        let mut emit = EmitKind::default();
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--emit" => {
                    let value = args.next().ok_or_else(|| UsageError {
                        message: "--emit needs a value".to_string(),
                    })?;
                    emit = match value.as_str() {
                        "pretty" => EmitKind::Pretty,
                        "tokens" => EmitKind::Tokens,
                        "ir" => EmitKind::Ir,
                        other => {
                            return Err(UsageError {
                                message: format!("unknown emit kind '{}'", other),
                            })
                        }
                    };
                }
                "--verbose" => verbose = true,
                other if other.starts_with("--") => {
                    return Err(UsageError {
                        message: format!("unknown option '{}'", other),
                    })
                }
                _ => {
                    if input.replace(PathBuf::from(&arg)).is_some() {
                        return Err(UsageError {
                            message: "more than one input file".to_string(),
                        });
                    }
                }
            }
        }

        let input = input.ok_or_else(|| UsageError {
            message: "no input file".to_string(),
        })?;
        Ok(Self {
            input,
            emit,
            verbose,
        })
    }
}

/// Any fatal error of the pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Complete(#[from] CompleteError),
}

impl CompileError {
    /// Location of the error, when one is known.
    fn span(&self) -> Option<Span> {
        match self {
            CompileError::Source(_) => None,
            CompileError::Parse(e) => Some(e.span()),
            CompileError::Resolve(e) => Some(e.span()),
            CompileError::Complete(e) => e.span(),
        }
    }
}

/// State for one compiler invocation.
pub struct Session {
    pub config: Config,
    pub sources: SourceMap,
}

impl Session {
    /// Create a session from a configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sources: SourceMap::new(),
        }
    }

    /// Read the configured input and run the full pipeline.
    pub fn compile(&mut self) -> Result<Ir, CompileError> {
        if self.config.verbose {
            eprintln!("reading {}", self.config.input.display());
        }
        let input = self.config.input.clone();
        let file = self.sources.load(&input)?;
        self.compile_file(file)
    }

    /// Run parse, resolve, and complete over an already-loaded file.
    pub fn compile_file(&mut self, file: FileId) -> Result<Ir, CompileError> {
        if self.config.verbose {
            eprintln!("parsing {}", self.sources.file(file).name());
        }
        let mut ir = opalc_par::parse(file, self.sources.file(file).src())?;

        if self.config.verbose {
            eprintln!("resolving {} symbol references", ir.symrefs.len());
        }
        resolve(&mut ir)?;

        if self.config.verbose {
            eprintln!("completing {} types", ir.types.len());
        }
        complete(&mut ir)?;

        Ok(ir)
    }

    /// Render the configured output for a finished IR.
    pub fn emit(&self, ir: &Ir) -> String {
        match self.config.emit {
            EmitKind::Pretty => pretty::pretty(ir),
            EmitKind::Tokens => emit_tokens(ir),
            EmitKind::Ir => emit_ir_summary(ir),
        }
    }

    /// Render a pipeline error as the user-visible diagnostic line.
    pub fn render_error(&self, err: &CompileError) -> String {
        Diagnostic::fatal(err.to_string(), err.span()).render(&self.sources)
    }
}

fn emit_tokens(ir: &Ir) -> String {
    use fmt::Write;

    let mut out = String::new();
    for (_, tok) in ir.tokens.iter_enumerated() {
        let _ = write!(out, "{}..{}\t", tok.span.start, tok.span.end);
        match tok.kind {
            TokenKind::Word(s) => {
                let _ = writeln!(out, "word\t{}", ir.str(s));
            }
            TokenKind::Int(v) => {
                let _ = writeln!(out, "int\t{}", v);
            }
            TokenKind::Str(s) => {
                let _ = writeln!(out, "string\t\"{}\"", ir.str(s));
            }
            other => {
                let _ = writeln!(out, "{}", other.describe());
            }
        }
    }
    out
}

fn emit_ir_summary(ir: &Ir) -> String {
    use fmt::Write;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "tokens={} scopes={} symbols={} symrefs={} types={} exprs={} stmts={}",
        ir.tokens.len(),
        ir.scopes.len(),
        ir.symbols.len(),
        ir.symrefs.len(),
        ir.types.len(),
        ir.exprs.len(),
        ir.stmts.len(),
    );
    for (sid, sym) in ir.symbols.iter_enumerated() {
        let kind = match sym.kind {
            SymbolKind::Type(_) => "type",
            SymbolKind::Data(_) => "data",
            SymbolKind::Array(_) => "array",
            SymbolKind::Proc(_) => "proc",
            SymbolKind::Param(_) => "param",
        };
        let _ = writeln!(
            out,
            "sym {}\t{}\t{}\tscope {}",
            sid.0,
            kind,
            ir.str(sym.name),
            sym.scope.0,
        );
    }
    out
}

/// Run the compiler for the given command-line arguments.
///
/// On success the emitted output goes to stdout. On failure the
/// returned error displays as the single diagnostic line.
pub fn run(args: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let config = Config::from_args(args).map_err(|e| anyhow::anyhow!("{}", e))?;
    let mut session = Session::new(config);
    match session.compile() {
        Ok(ir) => {
            print!("{}", session.emit(&ir));
            Ok(())
        }
        Err(err) => Err(anyhow::anyhow!("{}", session.render_error(&err))),
    }
}
