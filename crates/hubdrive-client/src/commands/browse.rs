//! Folder commands: ls, upload, rm, mkdir, ensure-folder, open, share.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use hubdrive_core::{FormatOptions, ListingFormatter};
use hubdrive_providers::{DriveApi, FileBrowser, Role, UploadFile};
use tracing::info;

use crate::cli::LsArgs;
use crate::error::{ClientError, ClientResult};

/// Lists the browser's folder, or its parent with `--up`.
pub async fn ls<A: DriveApi>(
    browser: &mut FileBrowser<A>,
    args: &LsArgs,
    options: FormatOptions,
) -> ClientResult<()> {
    let moved = if args.up { browser.back().await? } else { false };
    if !moved {
        browser.refresh().await?;
    }

    let output = ListingFormatter::new(options)
        .render(Some(browser.current_folder()), browser.items())
        .map_err(|e| ClientError::Action(format!("failed to render listing: {}", e)))?;
    println!("{}", output);
    Ok(())
}

/// Uploads a local file, showing progress on stderr.
pub async fn upload<A: DriveApi>(
    browser: &mut FileBrowser<A>,
    path: &Path,
    name: Option<String>,
    mime_type: Option<String>,
) -> ClientResult<()> {
    let name = match name {
        Some(name) => name,
        None => upload_name(path)?,
    };
    let data = tokio::fs::read(path).await?;
    let mut file = UploadFile::new(name.clone(), data);
    if let Some(mime_type) = mime_type {
        file = file.with_mime_type(mime_type);
    }

    let tracker = browser.progress_handle();
    let reporter = tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_millis(200));
        loop {
            tick.tick().await;
            if let Some(percent) = tracker.percent() {
                eprint!("\r{}", progress_line(&name, percent));
            }
        }
    });

    let result = browser.upload(file).await;
    reporter.abort();
    eprintln!();

    let item = result?;
    println!("{}  {}", item.name, item.id);
    Ok(())
}

/// Deletes an item after confirmation on `input`, unless `yes` is set.
pub async fn rm<A: DriveApi>(
    browser: &mut FileBrowser<A>,
    id: &str,
    yes: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> ClientResult<()> {
    browser.request_delete(id);

    if !yes && !confirm(input, output, &format!("Delete {}? [y/N] ", id))? {
        browser.cancel_delete();
        return Err(ClientError::Aborted);
    }

    if browser.confirm_delete().await?.is_some() {
        println!("{}", browser.notice().unwrap_or("Deleted"));
    }
    Ok(())
}

/// Creates a folder and prints its ID.
pub async fn mkdir<A: DriveApi>(browser: &mut FileBrowser<A>, name: &str) -> ClientResult<()> {
    let folder = browser.create_folder(name).await?;
    info!(id = %folder.id, name = %folder.name, "created folder");
    println!("{}  {}", folder.name, folder.id);
    Ok(())
}

/// Prints the ID of a child folder, creating the folder if needed.
pub async fn ensure_folder<A: DriveApi>(
    browser: &mut FileBrowser<A>,
    name: &str,
) -> ClientResult<()> {
    let folder = browser.ensure_folder(name).await?;
    println!("{}", folder.id);
    Ok(())
}

/// Opens an item in the default browser.
pub async fn open<A: DriveApi>(
    browser: &mut FileBrowser<A>,
    id: &str,
    print_only: bool,
) -> ClientResult<()> {
    let item = browser.item(id).await?;
    let url = item.open_url();

    if print_only {
        println!("{}", url);
        return Ok(());
    }

    info!(url = %url, "opening item");
    open::that(&url).map_err(|e| ClientError::Action(format!("failed to open URL: {}", e)))?;
    Ok(())
}

/// Shares an item and prints one line per address.
pub async fn share<A: DriveApi>(
    browser: &mut FileBrowser<A>,
    id: &str,
    emails: &[String],
    role: Role,
) -> ClientResult<()> {
    let outcomes = browser.share(id, &emails.join(","), role).await?;

    for outcome in &outcomes {
        match &outcome.error {
            None => println!("shared with {} ({})", outcome.email, role.as_str()),
            Some(error) => eprintln!("failed to share with {}: {}", outcome.email, error),
        }
    }

    if outcomes.iter().any(|o| o.is_ok()) {
        Ok(())
    } else {
        Err(ClientError::Action("no invitation was accepted".to_string()))
    }
}

fn upload_name(path: &Path) -> ClientResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Action(format!("{} has no file name", path.display())))
}

fn progress_line(name: &str, percent: u8) -> String {
    format!("Uploading {}... {:>3}%", name, percent)
}

/// Asks a yes/no question; anything but `y` or `yes` is a no.
fn confirm(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> ClientResult<bool> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_accepts_only_yes() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false), ("", false)] {
            let mut output = Vec::new();
            let confirmed = confirm(&mut answer.as_bytes(), &mut output, "Delete? ").unwrap();
            assert_eq!(confirmed, expected, "answer {answer:?}");
            assert_eq!(output, b"Delete? ");
        }
    }

    #[test]
    fn upload_name_from_path() {
        assert_eq!(upload_name(Path::new("/tmp/report.pdf")).unwrap(), "report.pdf");
        assert!(upload_name(Path::new("/")).is_err());
    }

    #[test]
    fn progress_line_is_fixed_width() {
        assert_eq!(progress_line("a.txt", 5), "Uploading a.txt...   5%");
        assert_eq!(progress_line("a.txt", 100), "Uploading a.txt... 100%");
    }
}
