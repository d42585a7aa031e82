//! Process-wide secret masking for everything the tool prints.
//!
//! Secrets are registered once with [`add_mask`] and from then on every log line
//! written through [`Masked`] and every string passed through [`redact`] has them
//! replaced by `***`. Components never need to know which values are secret.

use std::io::{self, Write};
use std::sync::{OnceLock, RwLock};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const MASK: &str = "***";

fn registry() -> &'static RwLock<Vec<String>> {
    static MASKS: OnceLock<RwLock<Vec<String>>> = OnceLock::new();
    MASKS.get_or_init(|| RwLock::new(Vec::new()))
}

/// Registers `secret` for masking. Empty values are ignored.
///
/// Under GitHub Actions the runner is told about the secret as well, so its own
/// log viewer masks it too.
pub fn add_mask(secret: &str) {
    if secret.is_empty() {
        return;
    }
    let mut masks = match registry().write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if masks.iter().any(|m| m == secret) {
        return;
    }
    // Longest first so a secret containing another is masked whole.
    masks.push(secret.to_string());
    masks.sort_by_key(|m| std::cmp::Reverse(m.len()));
    drop(masks);

    if running_in_github_actions() {
        for line in secret.lines().filter(|l| !l.trim().is_empty()) {
            println!("::add-mask::{line}");
        }
    }
}

/// Returns `text` with every registered secret replaced.
pub fn redact(text: &str) -> String {
    let masks = match registry().read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let mut out = text.to_string();
    for secret in masks.iter() {
        if out.contains(secret.as_str()) {
            out = out.replace(secret.as_str(), MASK);
        }
    }
    out
}

pub fn running_in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").map(|v| v == "true").unwrap_or(false)
}

/// Prints the single fatal message for a failed run.
pub fn report_fatal(message: &str) {
    let message = redact(message);
    if running_in_github_actions() {
        // Workflow commands are line based.
        println!("::error::{}", message.replace('\n', "%0A"));
    } else {
        eprintln!("error: {message}");
    }
}

/// [`MakeWriter`] wrapper that redacts every formatted event before it is written.
#[derive(Debug, Clone)]
pub struct Masked<M> {
    inner: M,
}

impl<M> Masked<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for Masked<M>
where
    M: MakeWriter<'a>,
{
    type Writer = MaskingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter::new(self.inner.make_writer())
    }
}

/// Buffers one event and writes its redacted form on flush or drop.
pub struct MaskingWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: Write> MaskingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buf);
        let masked = redact(&text);
        self.buf.clear();
        self.inner.write_all(masked.as_bytes())?;
        self.inner.flush()
    }
}

impl<W: Write> Write for MaskingWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl<W: Write> Drop for MaskingWriter<W> {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}

/// Installs the global subscriber: `RUST_LOG` filtering (default `info`), masked stderr.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Masked::new(io::stderr))
        .try_init();
}
