// src/bundle.rs
//
// Shipped/published artifacts: the zipped games DB, release assets, and the
// streamed downloads the ranks job shares.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use tokio::io::AsyncWriteExt;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::file::ensure_directory;
use crate::progress::Progress;

/// Make sure the games DB exists, unpacking the bundled archive if needed.
/// Returns `true` when it had to extract.
pub fn ensure_games_db(db: &Path, zip: &Path) -> Result<bool> {
    if db.exists() {
        return Ok(false);
    }
    if !zip.exists() {
        return Err(Error::MissingDatabase(db.to_path_buf()));
    }

    let name = db.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    logf!("Extracting {} from {}", db.display(), zip.display());
    extract_file(zip, |entry| file_name(entry) == name || entry.ends_with(".db"), db)?;
    Ok(true)
}

fn file_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

/// Copy the first archive member matching `want` to `dest` (written aside,
/// then renamed into place).
pub fn extract_file<F>(zip_path: &Path, want: F, dest: &Path) -> Result<PathBuf>
where
    F: Fn(&str) -> bool,
{
    let mut archive = ZipArchive::new(File::open(zip_path)?)?;

    let mut index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_file() && want(entry.name()) {
            index = Some(i);
            break;
        }
    }
    let index = index.ok_or_else(|| Error::MissingFile(zip_path.join("*")))?;

    let mut member = archive.by_index(index)?;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    let part = part_path(dest);
    {
        let mut out = File::create(&part)?;
        io::copy(&mut member, &mut out)?;
    }
    fs::rename(&part, dest)?;
    logd!("Extracted {} -> {}", member.name(), dest.display());
    Ok(dest.to_path_buf())
}

/// Unpack every member under `dir`.
pub fn extract_all(zip_path: &Path, dir: &Path) -> Result<()> {
    ensure_directory(dir)?;
    let mut archive = ZipArchive::new(File::open(zip_path)?)?;
    archive.extract(dir)?;
    logf!("Extracted {} entries to {}", archive.len(), dir.display());
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Stream a response body to `dest`. Reports percent when the size is known.
pub async fn download_to(req: RequestBuilder, dest: &Path, progress: &mut dyn Progress) -> Result<u64> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Http { status: status.as_u16(), snippet: format!("download of {}", resp.url()) });
    }

    let total = resp.content_length().unwrap_or(0);
    progress.begin(100);

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    let part = part_path(dest);
    let mut out = tokio::fs::File::create(&part).await?;
    let mut stream = resp.bytes_stream();
    let mut written: u64 = 0;
    let mut last_pct = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
        if total > 0 {
            let pct = (written * 100 / total) as usize;
            if pct != last_pct {
                last_pct = pct;
                progress.advance(pct);
                progress.log(&format!("Downloading: {pct}%"));
            }
        }
    }
    out.flush().await?;
    drop(out);
    tokio::fs::rename(&part, dest).await?;

    progress.finish();
    logf!("Downloaded {} ({written} bytes)", dest.display());
    Ok(written)
}

/// Download a published release artifact. Zips are unpacked next to it.
pub async fn fetch_release_asset(
    http: &Client,
    url: &str,
    dest: &Path,
    progress: &mut dyn Progress,
) -> Result<PathBuf> {
    download_to(http.get(url), dest, progress).await?;

    let is_zip = dest
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
    if is_zip {
        let dir = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        extract_all(dest, dir)?;
    }
    Ok(dest.to_path_buf())
}

/// File name a URL points at (`…/boardgames_db.zip?x=1` -> `boardgames_db.zip`).
pub fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|n| !n.is_empty())
}
