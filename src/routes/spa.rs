//! Single-page app hosting
//!
//! Exact matches under the build directory are served as files; every other
//! path gets the app's entry document so client-side routing can take over.

use crate::config::StaticFileSettings;
use crate::models::ErrorResponse;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Location of the built front-end
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

/// A file ready to be sent
#[derive(Debug)]
pub struct StaticAsset {
    pub content: Vec<u8>,
    pub content_type: String,
}

impl StaticFiles {
    pub fn new(settings: &StaticFileSettings) -> Self {
        Self {
            root: PathBuf::from(&settings.root),
            index: settings.index.clone(),
        }
    }

    /// Map a request path onto a file below the root
    ///
    /// Returns `None` for the root itself and for anything trying to climb
    /// out with `..`.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(request_path).unwrap_or(Cow::Borrowed(request_path));

        let mut path = self.root.clone();
        let mut has_segment = false;

        for segment in decoded.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s => {
                    path.push(s);
                    has_segment = true;
                }
            }
        }

        has_segment.then_some(path)
    }

    /// Load the file at `request_path`, or the entry document when there is none
    pub async fn load(&self, request_path: &str) -> std::io::Result<StaticAsset> {
        if let Some(path) = self.resolve(request_path) {
            if let Ok(meta) = fs::metadata(&path).await {
                if meta.is_file() {
                    return read_asset(&path).await;
                }
            }
        }

        self.load_index().await
    }

    /// Load the entry document
    pub async fn load_index(&self) -> std::io::Result<StaticAsset> {
        read_asset(&self.root.join(&self.index)).await
    }
}

async fn read_asset(path: &Path) -> std::io::Result<StaticAsset> {
    let content = fs::read(path).await?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let content_type = if mime.type_() == mime_guess::mime::TEXT
        || mime.subtype() == mime_guess::mime::JAVASCRIPT
        || mime.subtype() == mime_guess::mime::JSON
    {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    };

    Ok(StaticAsset {
        content,
        content_type,
    })
}

/// Catch-all handler
pub async fn serve(req: HttpRequest, files: web::Data<StaticFiles>) -> HttpResponse {
    match files.load(req.path()).await {
        Ok(asset) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, asset.content_type))
            .body(asset.content),
        Err(e) => {
            tracing::error!("Failed to load entry document for {}: {}", req.path(), e);
            HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found".to_string(),
                message: "Front-end build not found".to_string(),
                status_code: 404,
            })
        }
    }
}
