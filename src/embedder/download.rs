/// Fetches the ONNX embedding model from HuggingFace on first use.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace organisation hosting the supported models.
const HF_ORG: &str = "intfloat";

/// Files the embedder needs, with their path inside the model repository.
const MODEL_FILES: &[(&str, &str)] = &[
    ("model.onnx", "onnx/model.onnx"),
    ("tokenizer.json", "tokenizer.json"),
    ("config.json", "config.json"),
];

/// Whether every required model file exists in `model_dir`.
#[must_use]
pub fn all_files_present(model_dir: &Path) -> bool {
    MODEL_FILES
        .iter()
        .all(|(name, _)| model_dir.join(name).exists())
}

fn model_file_url(model_name: &str, url_path: &str) -> String {
    format!("https://huggingface.co/{HF_ORG}/{model_name}/resolve/main/{url_path}")
}

/// Download any missing model files for `model_name` into `model_dir`.
pub fn ensure_model_files(model_dir: &Path, model_name: &str) -> Result<()> {
    fs::create_dir_all(model_dir)
        .with_context(|| format!("failed to create model directory: {}", model_dir.display()))?;

    if all_files_present(model_dir) {
        return Ok(());
    }

    info!("Downloading {model_name} into {} (one-time)", model_dir.display());

    for &(filename, url_path) in MODEL_FILES {
        let dest = model_dir.join(filename);
        if dest.exists() {
            continue;
        }

        let url = model_file_url(model_name, url_path);
        download_file(&dest, &url).with_context(|| format!("failed to download {filename}"))?;
        info!("Downloaded {filename}");
    }

    Ok(())
}

fn download_file(dest: &Path, url: &str) -> Result<()> {
    let resp =
        reqwest::blocking::get(url).with_context(|| format!("HTTP request failed: {url}"))?;

    if !resp.status().is_success() {
        anyhow::bail!("bad status: {} for {url}", resp.status());
    }

    let pb = match resp.content_length() {
        Some(total) if total > 0 => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:40.cyan/blue} {percent}% ({bytes}/{total_bytes}) {msg}")?
                    .progress_chars("█▓░"),
            );
            pb
        }
        _ => ProgressBar::new_spinner(),
    };

    let bytes = resp.bytes().context("failed to read response body")?;
    fs::write(dest, &bytes).with_context(|| format!("failed to write {}", dest.display()))?;
    pb.set_position(bytes.len() as u64);
    pb.finish_and_clear();

    Ok(())
}
