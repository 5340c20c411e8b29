use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};

use crate::error::NewsError;

/// A report that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub path: PathBuf,
    /// The full Markdown document, reused as the email body.
    pub text: String,
}

/// Writes one Markdown file per collection run.
///
/// Files are named by minute (`news_YYYY-MM-DD_HH-MM.md`), so two runs in
/// the same clock minute write to the same path.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn save(&self, content: &str) -> Result<SavedReport, NewsError> {
        self.save_at(content, Local::now())
    }

    pub fn save_at(&self, content: &str, now: DateTime<Local>) -> Result<SavedReport, NewsError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| NewsError::Report {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(format!("news_{}.md", now.format("%Y-%m-%d_%H-%M")));
        let text = render(content, now);

        std::fs::write(&path, &text).map_err(|source| NewsError::Report {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), bytes = text.len(), "report saved");
        Ok(SavedReport { path, text })
    }
}

fn render(content: &str, now: DateTime<Local>) -> String {
    format!(
        "# News Report\n\
         \n\
         **Collected at**: {}\n\
         \n\
         ---\n\
         \n\
         {}\n\
         \n\
         ---\n\
         *This report was generated automatically by an AI agent*\n",
        now.format("%Y-%m-%d %H:%M"),
        content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, h, m, 0).single().unwrap()
    }

    #[test]
    fn different_minutes_write_different_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));

        let first = writer.save_at("alpha", at(9, 0)).unwrap();
        let second = writer.save_at("beta", at(9, 1)).unwrap();

        assert_ne!(first.path, second.path);
        assert!(first.path.ends_with("news_2026-10-19_09-00.md"));
        assert_eq!(std::fs::read_to_string(&first.path).unwrap(), first.text);
        assert_eq!(std::fs::read_dir(writer.output_dir()).unwrap().count(), 2);
    }

    #[test]
    fn rendered_text_contains_content_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let content = "## 経済\n\n- **A**: b\n\n---\n\n## Tech";
        let saved = ReportWriter::new(dir.path()).save_at(content, at(18, 0)).unwrap();

        assert!(saved.text.contains(content));
        assert!(saved.text.starts_with("# News Report\n"));
        assert!(saved.text.contains("**Collected at**: 2026-10-19 18:00"));
    }
}
