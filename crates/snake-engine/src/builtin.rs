//! Host-provided values every engine knows about.
//!
//! The default [`crate::Implementation`] registers each of these as a
//! placeholder: a never-cancelled token, an empty stdin, and a stdout that
//! discards everything. Applications shadow them with real producers, for
//! example [`host_streams`].

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use snake_resolver::{BoxError, Resolver};

pub use tokio_util::sync::CancellationToken;

/// Standard input handle shared by every resolver in an execution.
pub struct Stdin {
  reader: Mutex<Box<dyn Read + Send>>,
}

impl Stdin {
  pub fn new(reader: impl Read + Send + 'static) -> Self {
    Self {
      reader: Mutex::new(Box::new(reader)),
    }
  }

  pub fn empty() -> Self {
    Self::new(io::empty())
  }

  /// Read everything remaining.
  pub fn read_to_string(&self) -> io::Result<String> {
    let mut reader = self
      .reader
      .lock()
      .map_err(|_| io::Error::other("stdin lock poisoned"))?;
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf)
  }
}

/// Standard output handle shared by every resolver in an execution.
pub struct Stdout {
  writer: Mutex<Box<dyn Write + Send>>,
}

impl Stdout {
  pub fn new(writer: impl Write + Send + 'static) -> Self {
    Self {
      writer: Mutex::new(Box::new(writer)),
    }
  }

  pub fn sink() -> Self {
    Self::new(io::sink())
  }

  /// A stdout writing into memory, plus a handle to read what was written.
  pub fn capture() -> (Self, Captured) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    (Self::new(Buffer(buffer.clone())), Captured(buffer))
  }

  pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
    let mut writer = self
      .writer
      .lock()
      .map_err(|_| io::Error::other("stdout lock poisoned"))?;
    writer.write_all(bytes)?;
    writer.flush()
  }

  pub fn write_line(&self, line: &str) -> io::Result<()> {
    self.write_all(format!("{line}\n").as_bytes())
  }
}

/// Read side of [`Stdout::capture`].
#[derive(Clone)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
  pub fn contents(&self) -> String {
    self
      .0
      .lock()
      .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
      .unwrap_or_default()
  }
}

struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
  fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
    self
      .0
      .lock()
      .map_err(|_| io::Error::other("capture buffer lock poisoned"))?
      .extend_from_slice(bytes);
    Ok(bytes.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Shadowable stand-ins for the host-provided types.
pub fn placeholders() -> Vec<Resolver> {
  vec![
    Resolver::from_fn("cancellation-token", || -> Result<CancellationToken, BoxError> {
      Ok(CancellationToken::new())
    })
    .shared()
    .as_placeholder(),
    Resolver::from_fn("stdin", || -> Result<Stdin, BoxError> { Ok(Stdin::empty()) })
      .shared()
      .as_placeholder(),
    Resolver::from_fn("stdout", || -> Result<Stdout, BoxError> { Ok(Stdout::sink()) })
      .shared()
      .as_placeholder(),
  ]
}

/// Producers for the process's real stdin and stdout.
pub fn host_streams() -> Vec<Resolver> {
  vec![
    Resolver::from_fn("stdin", || -> Result<Stdin, BoxError> {
      Ok(Stdin::new(io::stdin()))
    })
    .shared(),
    Resolver::from_fn("stdout", || -> Result<Stdout, BoxError> {
      Ok(Stdout::new(io::stdout()))
    })
    .shared(),
  ]
}

/// Producer handing out clones of `token`.
pub fn cancellation(token: CancellationToken) -> Resolver {
  Resolver::from_fn("cancellation-token", move || -> Result<CancellationToken, BoxError> {
    Ok(token.clone())
  })
  .shared()
}
