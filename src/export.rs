use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::VacancyRecord;
use crate::registry::Registry;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Employment kind encoded in the parenthesized suffix of a vacancy label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    FullTime,
    PartTime,
    MiniJob,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::FullTime => "FULL_TIME",
            JobKind::PartTime => "PART_TIME",
            JobKind::MiniJob => "MINI_JOB",
        }
    }
}

pub fn map_kind(raw: &str) -> Option<JobKind> {
    match raw {
        "Vollzeit" => Some(JobKind::FullTime),
        "Teilzeit" => Some(JobKind::PartTime),
        "€450-Minijob" => Some(JobKind::MiniJob),
        _ => None,
    }
}

/// Split "Title (Kind)" at the final opening parenthesis.
///
/// Returns the trimmed title and the kind text, or `None` for the kind when
/// the label has no parenthesized segment.
pub fn split_title(label: &str) -> (&str, Option<&str>) {
    match label.rsplit_once('(') {
        Some((title, rest)) => {
            let rest = rest.trim();
            let kind = rest.strip_suffix(')').unwrap_or(rest).trim();
            (title.trim(), Some(kind))
        }
        None => (label.trim(), None),
    }
}

/// Resolve the export kind for a record, logging labels that do not map.
fn resolve_kind(record: &VacancyRecord) -> (&str, Option<JobKind>) {
    let (title, kind_raw) = split_title(&record.title_raw);
    match kind_raw {
        Some(raw) => {
            let kind = map_kind(raw);
            if kind.is_none() {
                tracing::warn!(job_id = %record.job_id, kind = %raw, "unknown vacancy kind");
            }
            (title, kind)
        }
        None => {
            tracing::warn!(job_id = %record.job_id, label = %record.title_raw, "vacancy label has no kind");
            (title, None)
        }
    }
}

struct FeedWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> FeedWriter<W> {
    fn start(&mut self, name: &str) -> Result<(), ExportError> {
        self.inner.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str) -> Result<(), ExportError> {
        self.inner.write_event(Event::Empty(BytesStart::new(name)))?;
        Ok(())
    }

    /// `<name>text</name>`, or `<name/>` when the text is empty
    fn text(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        if text.is_empty() {
            return self.empty(name);
        }
        self.start(name)?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Literal character data. A `]]>` inside the text is split across sections.
    fn cdata(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        self.start(name)?;
        let parts: Vec<&str> = text.split("]]>").collect();
        let last = parts.len() - 1;
        for (i, part) in parts.iter().enumerate() {
            let mut chunk = String::with_capacity(part.len() + 3);
            if i > 0 {
                chunk.push('>');
            }
            chunk.push_str(part);
            if i < last {
                chunk.push_str("]]");
            }
            self.inner.write_event(Event::CData(BytesCData::new(chunk)))?;
        }
        self.end(name)
    }

    fn position(&mut self, record: &VacancyRecord) -> Result<(), ExportError> {
        let (title, kind) = resolve_kind(record);

        self.start("position")?;
        self.text("link", &record.detail_url)?;
        self.text("identifier", &record.job_id)?;
        self.text("title", title)?;
        self.text("start_date", &record.start_date)?;
        self.text("kind", kind.map(|k| k.as_str()).unwrap_or(""))?;
        self.cdata("description", &record.description)?;
        self.text("top_location", &record.location_city)?;

        self.start("locations")?;
        self.text("location", &record.location_name)?;
        self.end("locations")?;

        self.empty("images")?;

        self.start("company")?;
        self.text("name", Config::COMPANY_NAME)?;
        self.start("address")?;
        self.text("street", &record.location_address)?;
        self.empty("zip")?;
        self.text("city", &record.location_city)?;
        self.end("address")?;
        self.end("company")?;

        self.text("contact_email", Config::CONTACT_EMAIL)?;
        self.end("position")
    }
}

/// Serialize the registry, in insertion order, as a `<vacancies>` document.
/// Returns the number of positions written.
pub fn write_feed<W: Write>(registry: &Registry, writer: W) -> Result<usize, ExportError> {
    let mut feed = FeedWriter {
        inner: Writer::new_with_indent(writer, b' ', 2),
    };

    feed.inner
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    if registry.is_empty() {
        feed.empty("vacancies")?;
    } else {
        feed.start("vacancies")?;
        for record in registry.iter() {
            feed.position(record)?;
        }
        feed.end("vacancies")?;
    }

    let mut out = feed.inner.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(registry.len())
}

/// Write the feed to `path`, creating missing parent directories.
pub fn export_to_file(registry: &Registry, path: &Path) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let count = write_feed(registry, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), positions = count, "feed exported");
    Ok(path.to_path_buf())
}
