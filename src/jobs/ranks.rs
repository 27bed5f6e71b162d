// src/jobs/ranks.rs
//
// Ranks dump download. The dump sits behind a BGG login; the page then
// links a short-lived S3 URL to a zip holding the CSV.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::bundle::{download_to, extract_file};
use crate::config::consts::{DEBUG_PAGE, SITE_BASE};
use crate::core::BggClient;
use crate::core::html::{find_href_with_prefix, strip_tags, to_lower};
use crate::error::{Error, Result};
use crate::file::sibling;
use crate::progress::Progress;

pub const LINK_PREFIX: &str = "https://geek-export-stats.s3.amazonaws.com/boardgames_export/boardgames_ranks_";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).finish_non_exhaustive()
    }
}

/// Sign in; the session cookie lands in the client's cookie store.
pub async fn login(client: &BggClient, creds: &Credentials) -> Result<()> {
    logf!("Logging in to BGG as {}", creds.username);
    let body = json!({
        "credentials": { "username": creds.username, "password": creds.password }
    });
    let resp = client
        .http()
        .post(format!("{SITE_BASE}/login/api/v1"))
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    match login_rejection(status.as_u16(), &body) {
        None => {
            logf!("Login successful");
            Ok(())
        }
        Some(why) => Err(Error::LoginFailed(why)),
    }
}

/// Why a login response means we are still signed out, if it does.
pub fn login_rejection(status: u16, body: &str) -> Option<String> {
    let text = to_lower(&strip_tags(body));
    if text.contains("invalid") || text.contains("incorrect") || status == 401 {
        return Some(s!("invalid credentials"));
    }
    let login_form = text.contains("password") && (text.contains("sign in") || text.contains("log in"));
    if !(200..300).contains(&status) || login_form {
        return Some(format!("still on login page (HTTP {status})"));
    }
    None
}

/// The S3 link on the data dumps page, unescaped.
pub fn find_download_link(page: &str) -> Option<String> {
    find_href_with_prefix(page, LINK_PREFIX)
}

/// Log in, locate the current dump, download the zip and extract the CSV.
pub async fn download_ranks(
    client: &BggClient,
    creds: &Credentials,
    zip_path: &Path,
    csv_path: &Path,
    progress: &mut dyn Progress,
) -> Result<PathBuf> {
    login(client, creds).await?;

    logf!("Navigating to download page");
    let page = client
        .http()
        .get(format!("{SITE_BASE}/data_dumps/bg_ranks"))
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let Some(url) = find_download_link(&page) else {
        let debug = sibling(csv_path, DEBUG_PAGE);
        std::fs::write(&debug, &page)?;
        return Err(Error::LinkNotFound(debug));
    };
    logf!("Found download URL");

    download_to(client.http().get(&url), zip_path, progress).await?;

    let csv = extract_file(zip_path, |name| name.to_ascii_lowercase().ends_with(".csv"), csv_path)?;
    logf!("CSV ready: {}", csv.display());
    Ok(csv)
}
