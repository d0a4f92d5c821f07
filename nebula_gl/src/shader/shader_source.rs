/// ShaderSource - combined vertex/fragment source files
///
/// One text file holds both stages. A line containing the marker token
/// (`#shader` by default) switches the active stage:
///
/// ```text
/// #shader vertex
/// #version 330 core
/// ...
/// #shader fragment
/// #version 330 core
/// ...
/// ```
///
/// Lines seen before the first recognised marker belong to no stage and are
/// dropped. A marker line naming neither stage leaves the selection unchanged.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::device::ShaderStage;
use crate::error::{Error, Result};

/// Marker token recognised when no other is configured
pub const DEFAULT_MARKER_TOKEN: &str = "#shader";

/// Path reported in `Error::SourceNotFound` for reader input
pub const READER_SOURCE_PATH: &str = "<reader>";

/// Source text of both stages of one program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgramSource {
    /// Read and split a combined source file using the default marker
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        ShaderSourceParser::default().parse_file(path)
    }

    /// Split combined source held in memory
    pub fn parse(source: &str) -> Self {
        ShaderSourceParser::default().parse_str(source)
    }

    /// Split combined source from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        ShaderSourceParser::default().parse_reader(reader)
    }

    /// Source text of one stage
    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty() && self.fragment.is_empty()
    }
}

/// Stage currently receiving lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionSelector {
    None,
    Stage(ShaderStage),
}

/// Accumulates lines into the selected stage
struct SectionSplitter<'a> {
    marker: &'a str,
    selector: SectionSelector,
    sections_seen: usize,
    output: ShaderProgramSource,
}

impl<'a> SectionSplitter<'a> {
    fn new(marker: &'a str) -> Self {
        Self {
            marker,
            selector: SectionSelector::None,
            sections_seen: 0,
            output: ShaderProgramSource::default(),
        }
    }

    fn feed(&mut self, line: &str) {
        if line.contains(self.marker) {
            // Vertex wins when a marker names both
            if line.contains("vertex") {
                self.select(ShaderStage::Vertex);
            } else if line.contains("fragment") {
                self.select(ShaderStage::Fragment);
            }
            return;
        }

        match self.selector {
            SectionSelector::None => {}
            SectionSelector::Stage(ShaderStage::Vertex) => push_line(&mut self.output.vertex, line),
            SectionSelector::Stage(ShaderStage::Fragment) => push_line(&mut self.output.fragment, line),
        }
    }

    fn select(&mut self, stage: ShaderStage) {
        self.selector = SectionSelector::Stage(stage);
        self.sections_seen += 1;
    }

    fn finish(self) -> ShaderProgramSource {
        if self.sections_seen == 0 {
            crate::nebula_warn!("nebula::ShaderSource",
                "No '{} vertex' or '{} fragment' marker found; both stages are empty",
                self.marker, self.marker);
        }
        self.output
    }
}

fn read_failed(path: &Path, error: io::Error) -> Error {
    crate::nebula_error!("nebula::ShaderSource",
        "Cannot read shader source '{}': {}", path.display(), error);
    Error::SourceNotFound {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

fn push_line(target: &mut String, line: &str) {
    target.push_str(line);
    target.push('\n');
}

/// Splitter for combined shader source with a configurable marker token
#[derive(Debug, Clone)]
pub struct ShaderSourceParser {
    marker: String,
}

impl Default for ShaderSourceParser {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_TOKEN)
    }
}

impl ShaderSourceParser {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Read and split a file
    ///
    /// Fails with `Error::SourceNotFound` when the file cannot be opened or
    /// a line cannot be read (including invalid UTF-8).
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ShaderProgramSource> {
        let path = path.as_ref();
        let not_found = |error: io::Error| read_failed(path, error);

        let file = File::open(path).map_err(not_found)?;
        let source = self.split_reader(BufReader::new(file)).map_err(not_found)?;

        crate::nebula_debug!("nebula::ShaderSource",
            "Loaded '{}' (vertex {} bytes, fragment {} bytes)",
            path.display(), source.vertex.len(), source.fragment.len());
        Ok(source)
    }

    /// Split combined source from a buffered reader
    ///
    /// A read failure (including invalid UTF-8) is reported as
    /// `Error::SourceNotFound` with the path `READER_SOURCE_PATH`.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<ShaderProgramSource> {
        self.split_reader(reader)
            .map_err(|error| read_failed(Path::new(READER_SOURCE_PATH), error))
    }

    fn split_reader<R: BufRead>(&self, reader: R) -> io::Result<ShaderProgramSource> {
        let mut splitter = SectionSplitter::new(&self.marker);
        for line in reader.lines() {
            splitter.feed(&line?);
        }
        Ok(splitter.finish())
    }

    pub fn parse_str(&self, source: &str) -> ShaderProgramSource {
        let mut splitter = SectionSplitter::new(&self.marker);
        for line in source.lines() {
            splitter.feed(line);
        }
        splitter.finish()
    }
}

#[cfg(test)]
#[path = "shader_source_tests.rs"]
mod tests;
