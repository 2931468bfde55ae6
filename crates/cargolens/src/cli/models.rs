//! The `cargolens models` command for managing AI models.
//!
//! Downloads the ONNX exports CargoLens runs on: the CLIP dual encoder for
//! category tagging, the BLIP encoder/decoder for captioning, and the
//! multilingual MiniLM sentence embedder for semantic ranking.
//!
//! The upstream repos publish no digests to pin, so each download's BLAKE3
//! hash is computed over the stream and recorded in a `.blake3` sidecar
//! next to the file; later runs verify the file against the sidecar and
//! re-download on mismatch.

use blake3::Hasher as Blake3Hasher;
use clap::{Args, Subcommand};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use cargolens_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download required models (CLIP + BLIP + sentence embedder)
    Download,

    /// List installed models
    List,

    /// Show model directory path
    Path,
}

/// One downloadable model file.
struct ModelFile {
    /// Directory name under the model dir
    local_dir: &'static str,
    /// Local filename
    local_name: &'static str,
    /// Hugging Face repo
    repo: &'static str,
    /// Path within the repo
    remote_path: &'static str,
    /// Human-readable label
    label: &'static str,
}

const MODEL_FILES: &[ModelFile] = &[
    ModelFile {
        local_dir: "clip-vit-base-patch32",
        local_name: "visual.onnx",
        repo: "Xenova/clip-vit-base-patch32",
        remote_path: "onnx/vision_model.onnx",
        label: "CLIP vision encoder",
    },
    ModelFile {
        local_dir: "clip-vit-base-patch32",
        local_name: "text_model.onnx",
        repo: "Xenova/clip-vit-base-patch32",
        remote_path: "onnx/text_model.onnx",
        label: "CLIP text encoder",
    },
    ModelFile {
        local_dir: "clip-vit-base-patch32",
        local_name: "tokenizer.json",
        repo: "Xenova/clip-vit-base-patch32",
        remote_path: "tokenizer.json",
        label: "CLIP tokenizer",
    },
    ModelFile {
        local_dir: "blip-image-captioning-base",
        local_name: "vision_model.onnx",
        repo: "Xenova/blip-image-captioning-base",
        remote_path: "onnx/vision_model.onnx",
        label: "BLIP vision encoder",
    },
    ModelFile {
        local_dir: "blip-image-captioning-base",
        local_name: "text_decoder.onnx",
        repo: "Xenova/blip-image-captioning-base",
        remote_path: "onnx/decoder_model.onnx",
        label: "BLIP text decoder",
    },
    ModelFile {
        local_dir: "blip-image-captioning-base",
        local_name: "tokenizer.json",
        repo: "Xenova/blip-image-captioning-base",
        remote_path: "tokenizer.json",
        label: "BLIP tokenizer",
    },
    ModelFile {
        local_dir: "paraphrase-multilingual-minilm-l12-v2",
        local_name: "model.onnx",
        repo: "Xenova/paraphrase-multilingual-MiniLM-L12-v2",
        remote_path: "onnx/model.onnx",
        label: "Sentence embedder",
    },
    ModelFile {
        local_dir: "paraphrase-multilingual-minilm-l12-v2",
        local_name: "tokenizer.json",
        repo: "Xenova/paraphrase-multilingual-MiniLM-L12-v2",
        remote_path: "tokenizer.json",
        label: "Sentence embedder tokenizer",
    },
];

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    let model_dir = config.model_dir();

    match args.command {
        ModelsCommand::Download => {
            let client = reqwest::Client::new();

            for file in MODEL_FILES {
                let dest_dir = model_dir.join(file.local_dir);
                let dest = dest_dir.join(file.local_name);
                let sidecar = digest_path(&dest);

                if dest.exists() {
                    match std::fs::read_to_string(&sidecar) {
                        Ok(expected) => {
                            verify_blake3(&dest, expected.trim())?;
                            tracing::info!(
                                "{} already exists at {:?} (checksum verified)",
                                file.label,
                                dest
                            );
                        }
                        Err(_) => {
                            // Pre-existing file with no recorded digest.
                            let digest = hash_file(&dest)?;
                            std::fs::write(&sidecar, &digest)?;
                            tracing::info!(
                                "{} already exists at {:?} (checksum recorded)",
                                file.label,
                                dest
                            );
                        }
                    }
                    continue;
                }

                std::fs::create_dir_all(&dest_dir)?;

                let url = format!(
                    "https://huggingface.co/{}/resolve/main/{}",
                    file.repo, file.remote_path
                );
                tracing::info!("Downloading {}...", file.label);
                tracing::info!("  Source: {}", url);
                tracing::info!("  Destination: {:?}", dest);

                let digest = download_file(&client, &url, &dest, file.label).await?;
                std::fs::write(&sidecar, &digest)?;
            }

            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            if !model_dir.exists() {
                println!("No models installed.");
                println!("Run `cargolens models download` to download required models.");
                return Ok(());
            }

            println!("Installed models:");
            println!("  Directory: {}\n", model_dir.display());

            for file in MODEL_FILES {
                let path = model_dir.join(file.local_dir).join(file.local_name);
                let status = if path.exists() { "ready" } else { "not installed" };
                println!(
                    "  - {:40} {}",
                    format!("{}/{}", file.local_dir, file.local_name),
                    status
                );
            }
        }

        ModelsCommand::Path => {
            println!("{}", model_dir.display());
        }
    }

    Ok(())
}

/// Download a file from a URL to a local path, streaming to disk with a
/// progress bar. An incomplete download (fewer bytes than advertised) is
/// removed so the next run retries. Returns the BLAKE3 digest of the
/// downloaded bytes.
async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    label: &str,
) -> anyhow::Result<String> {
    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed for {label}: {e}"))?;

    let total_size = response.content_length();
    let bar = match total_size {
        Some(size) => {
            let bar = ProgressBar::new(size);
            bar.set_style(
                ProgressStyle::with_template(
                    "  {msg} [{bar:30}] {bytes}/{total_bytes} ({eta})",
                )?
                .progress_chars("=> "),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };
    bar.set_message(label.to_string());

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let mut hasher = Blake3Hasher::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
        bar.set_position(downloaded);
    }

    file.flush().await?;
    bar.finish_and_clear();

    if let Some(total) = total_size {
        if downloaded != total {
            let _ = std::fs::remove_file(dest);
            anyhow::bail!(
                "Incomplete download for {label}: got {downloaded} of {total} bytes. \
                 Partial file removed — try downloading again."
            );
        }
    }

    tracing::info!(
        "  {} complete ({:.1} MB)",
        label,
        downloaded as f64 / (1024.0 * 1024.0)
    );
    Ok(hasher.finalize().to_hex().to_string())
}

/// Sidecar path holding the recorded BLAKE3 digest for a model file.
fn digest_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".blake3");
    PathBuf::from(name)
}

/// BLAKE3 hash of a file's contents, streamed in 64KB chunks.
fn hash_file(path: &Path) -> anyhow::Result<String> {
    use std::io::Read;

    let file = std::fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("Cannot open {} for hashing: {e}", path.display()))?;
    let mut reader = std::io::BufReader::new(file);
    let mut hasher = Blake3Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Verify a model file against its recorded BLAKE3 digest.
///
/// On mismatch, removes the corrupt file so the next run re-downloads.
fn verify_blake3(path: &Path, expected: &str) -> anyhow::Result<()> {
    let actual = hash_file(path)?;

    if actual != expected {
        let _ = std::fs::remove_file(path);
        anyhow::bail!(
            "Checksum mismatch for {}:\n  expected: {}\n  actual:   {}\n\
             Corrupt file removed — try downloading again.",
            path.display(),
            expected,
            actual
        );
    }

    tracing::debug!("  Checksum verified: {}…", &actual[..16]);
    Ok(())
}
