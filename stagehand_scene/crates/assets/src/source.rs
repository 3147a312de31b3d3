use serde_json::Value;
use stagehand_engine::{Error, Font, Result, Texture};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Encoded audio data. Decoding and playback belong to the audio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
}

/// Append-only text log backed by a file or an in-memory buffer.
pub struct LogFile {
    path: PathBuf,
    sink: Box<dyn Write>,
}

impl LogFile {
    pub fn new(path: PathBuf, sink: Box<dyn Write>) -> Self {
        Self { path, sink }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.sink, "{line}")
            .and_then(|_| self.sink.flush())
            .map_err(|e| {
                Error::WriteFailure(format!("failed to write log '{}': {e}", self.path.display()))
            })
    }
}

/// Where resource bytes come from. Paths are the handle paths, relative to
/// whatever root the loader was built with.
pub trait ResourceLoader {
    fn load_texture(&self, path: &Path) -> Result<Texture>;
    fn load_font(&self, path: &Path) -> Result<Font>;
    fn load_document(&self, path: &Path) -> Result<Value>;
    fn load_audio(&self, path: &Path) -> Result<AudioClip>;
    fn open_log(&self, path: &Path) -> Result<LogFile>;
}

pub fn parse_document(text: &str, path: &Path) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| {
        Error::InvalidConfiguration(format!("document '{}' is not valid JSON: {e}", path.display()))
    })
}

/// Loads from disk relative to `root`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl ResourceLoader for FsLoader {
    fn load_texture(&self, path: &Path) -> Result<Texture> {
        Texture::load(&self.resolve(path))
    }

    fn load_font(&self, path: &Path) -> Result<Font> {
        Font::load(&self.resolve(path))
    }

    fn load_document(&self, path: &Path) -> Result<Value> {
        let full = self.resolve(path);
        let text = std::fs::read_to_string(&full).map_err(|e| {
            Error::InvalidPath(format!("failed to open document '{}': {e}", full.display()))
        })?;
        parse_document(&text, path)
    }

    fn load_audio(&self, path: &Path) -> Result<AudioClip> {
        let full = self.resolve(path);
        let bytes = std::fs::read(&full).map_err(|e| {
            Error::InvalidPath(format!("failed to open audio '{}': {e}", full.display()))
        })?;
        Ok(AudioClip { bytes })
    }

    fn open_log(&self, path: &Path) -> Result<LogFile> {
        let full = self.resolve(path);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full)
            .map_err(|e| {
                Error::InvalidPath(format!("failed to open log '{}': {e}", full.display()))
            })?;
        Ok(LogFile::new(full, Box::new(file)))
    }
}

/// Shared byte buffer that in-memory logs write into.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Serves preloaded resources keyed by path. Every open of the same log path
/// writes into the same buffer.
#[derive(Default, Clone)]
pub struct MemoryLoader {
    textures: HashMap<PathBuf, Texture>,
    fonts: HashMap<PathBuf, Font>,
    documents: HashMap<PathBuf, String>,
    audio: HashMap<PathBuf, AudioClip>,
    logs: HashMap<PathBuf, SharedBuffer>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>, texture: Texture) -> Self {
        self.textures.insert(path.into(), texture);
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>, font: Font) -> Self {
        self.fonts.insert(path.into(), font);
        self
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.documents.insert(path.into(), text.into());
        self
    }

    pub fn with_audio(mut self, path: impl Into<PathBuf>, clip: AudioClip) -> Self {
        self.audio.insert(path.into(), clip);
        self
    }

    pub fn with_log(mut self, path: impl Into<PathBuf>, buffer: SharedBuffer) -> Self {
        self.logs.insert(path.into(), buffer);
        self
    }
}

fn missing(kind: &str, path: &Path) -> Error {
    Error::InvalidPath(format!("no in-memory {kind} at '{}'", path.display()))
}

impl ResourceLoader for MemoryLoader {
    fn load_texture(&self, path: &Path) -> Result<Texture> {
        self.textures
            .get(path)
            .cloned()
            .ok_or_else(|| missing("texture", path))
    }

    fn load_font(&self, path: &Path) -> Result<Font> {
        self.fonts
            .get(path)
            .cloned()
            .ok_or_else(|| missing("font", path))
    }

    fn load_document(&self, path: &Path) -> Result<Value> {
        let text = self
            .documents
            .get(path)
            .ok_or_else(|| missing("document", path))?;
        parse_document(text, path)
    }

    fn load_audio(&self, path: &Path) -> Result<AudioClip> {
        self.audio
            .get(path)
            .cloned()
            .ok_or_else(|| missing("audio clip", path))
    }

    fn open_log(&self, path: &Path) -> Result<LogFile> {
        let buffer = self.logs.get(path).ok_or_else(|| missing("log", path))?;
        Ok(LogFile::new(path.to_path_buf(), Box::new(buffer.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_engine::utils::Color;

    #[test]
    fn fs_loader_resolves_against_root() {
        let dir = std::env::temp_dir().join(format!("stagehand_fs_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Texture::solid(3, 2, Color::WHITE)
            .save(&dir.join("tile.png"))
            .unwrap();
        std::fs::write(dir.join("scene.json"), r#"{"id": "A"}"#).unwrap();

        let loader = FsLoader::new(&dir);
        let tex = loader.load_texture(Path::new("tile.png")).unwrap();
        assert_eq!(tex.dimensions(), (3, 2));
        let doc = loader.load_document(Path::new("scene.json")).unwrap();
        assert_eq!(doc["id"], "A");
        assert!(matches!(
            loader.load_texture(Path::new("absent.png")),
            Err(Error::InvalidPath(_))
        ));

        let mut log = loader.open_log(Path::new("run.log")).unwrap();
        log.write_line("scene loaded").unwrap();
        let written = std::fs::read_to_string(dir.join("run.log")).unwrap();
        assert!(written.contains("scene loaded"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_document_is_invalid_configuration() {
        let loader = MemoryLoader::new().with_document("bad.json", "{ nope");
        assert!(matches!(
            loader.load_document(Path::new("bad.json")),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn memory_logs_share_one_buffer() {
        let buffer = SharedBuffer::default();
        let loader = MemoryLoader::new().with_log("engine.log", buffer.clone());
        loader
            .open_log(Path::new("engine.log"))
            .unwrap()
            .write_line("one")
            .unwrap();
        loader
            .open_log(Path::new("engine.log"))
            .unwrap()
            .write_line("two")
            .unwrap();
        assert_eq!(buffer.contents(), "one\ntwo\n");
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_write_errors_are_write_failures() {
        let mut log = LogFile::new(PathBuf::from("broken.log"), Box::new(BrokenSink));
        assert!(matches!(
            log.write_line("x"),
            Err(Error::WriteFailure(_))
        ));
    }
}
