//! Static health-check page.
//!
//! # Responsibilities
//! - Render an HTML page with a self-updating timestamp element
//! - Optionally render a `health.json` status document
//! - Write both to disk and copy them into the build output directory
//!
//! # Design Decisions
//! - The copy only happens when the build directory exists at copy time
//! - A missing build directory is not an error

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::HealthPageConfig;
use crate::health::state::ReadyReport;
use crate::lifecycle::mode::StartupMode;

/// Name of the JSON document written next to the page.
pub const JSON_FILE_NAME: &str = "health.json";

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy { from: PathBuf, to: PathBuf, source: io::Error },

    #[error("failed to encode health document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Files touched by [`publish`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub written: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
}

/// Everything the page shows.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDocument<'a> {
    pub status: &'static str,
    pub service: &'a str,
    pub version: &'static str,
    pub mode: StartupMode,
    pub generated_at: String,
    pub dependencies: &'a [ReadyReport],
}

impl<'a> HealthDocument<'a> {
    pub fn new(
        service: &'a str,
        mode: StartupMode,
        generated_at: DateTime<Utc>,
        dependencies: &'a [ReadyReport],
    ) -> Self {
        Self {
            status: "healthy",
            service,
            version: env!("CARGO_PKG_VERSION"),
            mode,
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            dependencies,
        }
    }

    pub fn render_html(&self) -> String {
        let service = escape_html(self.service);
        let mut deps = String::new();
        for dep in self.dependencies {
            deps.push_str(&format!(
                "      <li>{} ({}) ready after {} attempt(s)</li>\n",
                escape_html(&dep.label),
                escape_html(&dep.address),
                dep.attempts
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{service} health</title>
</head>
<body>
  <h1>{service}</h1>
  <p>Status: <strong>{status}</strong></p>
  <p>Mode: {mode}</p>
  <p>Generated: <time id="generated" datetime="{generated}">{generated}</time></p>
  <p>Now: <span id="timestamp">{generated}</span></p>
  <ul id="dependencies">
{deps}  </ul>
  <script>
    (function () {{
      var el = document.getElementById("timestamp");
      function tick() {{ el.textContent = new Date().toISOString(); }}
      tick();
      setInterval(tick, 1000);
    }})();
  </script>
</body>
</html>
"#,
            service = service,
            status = self.status,
            mode = self.mode,
            generated = self.generated_at,
            deps = deps,
        )
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the page (and JSON when enabled), then copy into the build dir if present.
pub fn publish(
    config: &HealthPageConfig,
    mode: StartupMode,
    dependencies: &[ReadyReport],
) -> Result<PublishReport, PageError> {
    let doc = HealthDocument::new(&config.service_name, mode, Utc::now(), dependencies);
    let page_path = PathBuf::from(&config.path);
    let mut report = PublishReport::default();

    write_file(&page_path, &doc.render_html())?;
    report.written.push(page_path.clone());

    if config.write_json {
        let json_path = page_path.with_file_name(JSON_FILE_NAME);
        write_file(&json_path, &doc.render_json()?)?;
        report.written.push(json_path);
    }

    let build_dir = Path::new(&config.build_dir);
    if !config.build_dir.is_empty() && build_dir.is_dir() {
        for src in &report.written {
            let Some(name) = src.file_name() else { continue };
            let dest = build_dir.join(name);
            fs::copy(src, &dest).map_err(|source| PageError::Copy {
                from: src.clone(),
                to: dest.clone(),
                source,
            })?;
            report.copied.push(dest);
        }
    } else {
        tracing::debug!(build_dir = %config.build_dir, "Build directory absent, skipping health page copy");
    }

    Ok(report)
}

fn write_file(path: &Path, contents: &str) -> Result<(), PageError> {
    let wrap = |source| PageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, contents).map_err(wrap)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config_in(dir: &Path) -> HealthPageConfig {
        HealthPageConfig {
            enabled: true,
            path: dir.join("public/health.html").to_string_lossy().into_owned(),
            build_dir: dir.join("dist").to_string_lossy().into_owned(),
            service_name: "api <server>".into(),
            write_json: false,
        }
    }

    #[test]
    fn test_html_has_self_updating_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let html = HealthDocument::new("api", StartupMode::Dev, at, &[]).render_html();

        assert!(html.contains(r#"<span id="timestamp">2024-05-01T12:00:00Z</span>"#));
        assert!(html.contains("setInterval(tick, 1000)"));
        assert!(html.contains("Mode: dev"));
    }

    #[test]
    fn test_html_escapes_names() {
        let deps = vec![ReadyReport {
            label: "<redis>".into(),
            address: "redis:6379".into(),
            attempts: 2,
            elapsed_ms: 10,
        }];
        let html = HealthDocument::new("a&b", StartupMode::Serve, Utc::now(), &deps).render_html();
        assert!(html.contains("<h1>a&amp;b</h1>"));
        assert!(html.contains("&lt;redis&gt; (redis:6379) ready after 2 attempt(s)"));
    }

    #[test]
    fn test_json_document() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = HealthDocument::new("api", StartupMode::Build, at, &[]).render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["mode"], "build");
        assert_eq!(value["generated_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_publish_without_build_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let report = publish(&config, StartupMode::Serve, &[]).unwrap();
        assert_eq!(report.written.len(), 1);
        assert!(report.copied.is_empty());
        assert!(tmp.path().join("public/health.html").is_file());
        assert!(!tmp.path().join("dist").exists());
    }

    #[test]
    fn test_publish_copies_into_existing_build_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("dist")).unwrap();
        let mut config = config_in(tmp.path());
        config.write_json = true;

        let report = publish(&config, StartupMode::Serve, &[]).unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            report.copied,
            vec![
                tmp.path().join("dist/health.html"),
                tmp.path().join("dist/health.json"),
            ]
        );
        let copied = fs::read_to_string(tmp.path().join("dist/health.html")).unwrap();
        assert!(copied.contains("api &lt;server&gt;"));
    }
}
