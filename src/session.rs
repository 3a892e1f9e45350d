//! One document-edit session: expand, scan, patch, write back.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::TempDir;

use crate::archive;
use crate::docx::{self, HighlightedRun, RunId};
use crate::error::{Error, Result, Stage, StageExt};
use crate::options::SessionOptions;
use crate::outline::{self, OutlineEntry};
use crate::part;
use crate::xml::Document;

/// Where the container was expanded.
enum WorkDir {
    /// Removed when the session is dropped.
    Temp(TempDir),
    /// Owned by the caller and left on disk.
    Kept(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(dir) => dir.path(),
            WorkDir::Kept(path) => path,
        }
    }
}

/// Supplies replacement text for a list of candidate fields.
///
/// Implemented by whatever talks to the person (or service) filling in the
/// document; the session only sees the resulting map.
pub trait ReplacementSource {
    /// Return the replacement for each field that should change. Fields
    /// left out, or mapped to blank text, stay as they are.
    fn replacements(&mut self, fields: &[String]) -> Result<HashMap<String, String>>;
}

/// A fixed map is its own source.
impl ReplacementSource for HashMap<String, String> {
    fn replacements(&mut self, _fields: &[String]) -> Result<HashMap<String, String>> {
        Ok(self.clone())
    }
}

/// An open document: its expanded working tree and the parsed main part.
///
/// ```no_run
/// use std::collections::HashMap;
/// use docfill::{Session, SessionOptions};
///
/// let mut session = Session::open("template.docx", SessionOptions::default())?;
/// println!("{:?}", session.fields());
///
/// let mut values = HashMap::new();
/// values.insert("Client Name".to_string(), "Acme Corp".to_string());
/// session.apply(&values);
/// session.save("filled.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub struct Session {
    workdir: WorkDir,
    options: SessionOptions,
    document: Document,
}

impl Session {
    /// Expand `container` and parse its main document part.
    pub fn open(container: impl AsRef<Path>, options: SessionOptions) -> Result<Self> {
        let container = container.as_ref();
        let workdir = match &options.workdir {
            Some(dir) => WorkDir::Kept(dir.clone()),
            None => WorkDir::Temp(
                tempfile::Builder::new()
                    .prefix("docfill-")
                    .tempdir()
                    .map_err(Error::Io)
                    .stage(Stage::Expand)?,
            ),
        };

        archive::expand(container, workdir.path()).stage(Stage::Expand)?;
        let bytes = part::read_part(workdir.path(), &options.document_part).stage(Stage::ReadPart)?;
        let document = Document::parse(&bytes).stage(Stage::Parse)?;

        info!(
            "opened {} ({}) in {}",
            container.display(),
            options.document_part,
            workdir.path().display()
        );
        Ok(Self {
            workdir,
            options,
            document,
        })
    }

    /// Directory the container was expanded into.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Options this session was opened with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The parsed main document part.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the parsed main document part.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Distinct highlighted fields, in document order.
    pub fn fields(&self) -> Vec<String> {
        docx::highlighted_fields(&self.document.root)
    }

    /// Every highlighted run with its positional id.
    pub fn runs(&self) -> Vec<HighlightedRun> {
        docx::highlighted_runs(&self.document.root)
    }

    /// Numbered outline of all element text.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        outline::outline(&self.document.root)
    }

    /// Replace fields by their text. Returns the number of runs changed.
    pub fn apply(&mut self, replacements: &HashMap<String, String>) -> usize {
        let patched = docx::apply_replacements(&mut self.document.root, replacements);
        info!("patched {} runs", patched);
        patched
    }

    /// Replace fields by run position. Returns the number of runs changed.
    pub fn apply_runs(&mut self, replacements: &HashMap<RunId, String>) -> usize {
        let patched = docx::apply_run_replacements(&mut self.document.root, replacements);
        info!("patched {} runs by position", patched);
        patched
    }

    /// Replace outline entries. Returns the number of text elements changed.
    pub fn apply_outline(&mut self, replacements: &HashMap<usize, String>) -> usize {
        let patched = outline::apply_outline_replacements(&mut self.document.root, replacements);
        info!("patched {} text elements from outline", patched);
        patched
    }

    /// Write the patched part back into the working tree and pack the tree
    /// into a new container at `output`. Returns the number of entries.
    pub fn save(&self, output: impl AsRef<Path>) -> Result<usize> {
        let output = output.as_ref();
        let bytes = self
            .document
            .serialize_with_indent(self.options.indent)
            .stage(Stage::Serialize)?;
        part::write_part(self.workdir.path(), &self.options.document_part, &bytes)
            .stage(Stage::WritePart)?;
        archive::repackage(self.workdir.path(), output, self.options.compression)
            .stage(Stage::Repackage)
    }

    /// Ask `source` for replacements, apply them and save to `output`.
    /// Returns the number of runs changed.
    pub fn fill_with<S>(&mut self, source: &mut S, output: impl AsRef<Path>) -> Result<usize>
    where
        S: ReplacementSource + ?Sized,
    {
        let fields = self.fields();
        let replacements = source.replacements(&fields).stage(Stage::Collect)?;
        let patched = self.apply(&replacements);
        self.save(output)?;
        Ok(patched)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("workdir", &self.workdir.path())
            .field("part", &self.options.document_part)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::fixtures::{document, run};
    use crate::error::ErrorKind;
    use std::fs;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_docx(path: &Path, body: &str) {
        let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document(body).as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_temp_workdir_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        write_docx(&input, &run("Name", Some("FFFF00")));

        let session = Session::open(&input, SessionOptions::default()).unwrap();
        let workdir = session.workdir().to_path_buf();
        assert!(workdir.join("word/document.xml").exists());
        drop(session);
        assert!(!workdir.exists());
    }

    #[test]
    fn test_kept_workdir_survives() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        write_docx(&input, &run("Name", Some("FFFF00")));

        let keep = dir.path().join("extracted_content");
        let session = Session::open(&input, SessionOptions::new().with_workdir(&keep)).unwrap();
        assert_eq!(session.fields(), ["Name"]);
        drop(session);
        assert!(keep.join("word/document.xml").exists());
    }

    #[test]
    fn test_errors_name_their_stage() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(dir.path().join("missing.docx"), SessionOptions::default())
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Expand));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let input = dir.path().join("in.docx");
        write_docx(&input, "<w:p>");
        let err = Session::open(&input, SessionOptions::default()).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Parse));
        assert_eq!(err.kind(), ErrorKind::MalformedMarkup);

        let err = Session::open(&input, SessionOptions::new().with_part("word/missing.xml"))
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::ReadPart));
        assert!(matches!(err, Error::Stage { ref source, .. } if matches!(**source, Error::NotFound(_))));
    }

    struct Refusing;

    impl ReplacementSource for Refusing {
        fn replacements(&mut self, _fields: &[String]) -> Result<HashMap<String, String>> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "cancelled",
            )))
        }
    }

    #[test]
    fn test_failed_collection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        write_docx(&input, &run("Name", Some("FFFF00")));
        let output = dir.path().join("out.docx");

        let mut session = Session::open(&input, SessionOptions::default()).unwrap();
        let err = session.fill_with(&mut Refusing, &output).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Collect));
        assert!(!output.exists());
    }
}
