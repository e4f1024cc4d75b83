//! Evidence artifact serving
//!
//! Directory listings and static files for the videos, screenshots, and
//! rendered report directories. Files are read from disk on every request;
//! the runner rewrites them between iterations, so nothing is cached.

use std::path::{Component, Path, PathBuf};

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

/// On-disk roots of the evidence directories
#[derive(Debug, Clone)]
pub struct ArtifactRoots {
    pub videos: PathBuf,
    pub screenshots: PathBuf,
    pub report: PathBuf,
}

/// Serve one file from below `root`
///
/// The request path is rejected unless every component is a normal name, so
/// `..` traversal cannot escape the artifact root. Missing files are 404;
/// the directories may not exist at all before the first run completes.
pub async fn serve_file(root: &Path, rel_path: &str) -> Response {
    let rel = match sanitize(rel_path) {
        Some(rel) => rel,
        None => return (StatusCode::NOT_FOUND, "File not found").into_response(),
    };

    let full = root.join(rel);
    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&full).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// Render an HTML index of the files below `root`
///
/// `mount` is the URL prefix the entries are linked under. An absent
/// directory renders as an empty listing rather than an error.
pub async fn list_dir(root: &Path, mount: &str) -> Response {
    let mut names = Vec::new();
    if let Ok(mut entries) = tokio::fs::read_dir(root).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            names.push(if is_dir { format!("{name}/") } else { name });
        }
    }
    names.sort();

    let mut items = String::new();
    for name in &names {
        items.push_str(&format!(
            r#"<li><a href="{mount}/{name}">{name}</a></li>"#
        ));
        items.push('\n');
    }

    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Index of {mount}</title></head>
<body>
<h1>Index of {mount}</h1>
<ul>
{items}</ul>
</body>
</html>
"#
    );
    Html(body).into_response()
}

/// Normalize a request path, refusing anything that could leave the root
fn sanitize(rel_path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(rel_path).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            // Leading "/" from wildcard captures is harmless
            Component::RootDir => {}
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}
