//! smsmock CLI: render SMS mockups to files and relay images to public CDNs.
//!
//! CDN endpoints, timeouts and retry settings come from the same environment
//! variables as the HTTP service (a `.env` file is honored).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use smsmock_cli::{default_output_path, init_tracing, mime_for_path};
use smsmock_core::{
    resolve_mockup_request, AppError, CdnProvider, Config, MockupRequest, RenderResult,
    RendererKind, ResponseMode, UploadResult,
};
use smsmock_infra::{retry, CdnUploaders, RetryPolicy};
use smsmock_processing::{create_renderer, encode, RenderOutput, Renderer};

#[derive(Parser)]
#[command(name = "smsmock", about = "SMS mockup renderer and CDN relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a mockup to a file, optionally uploading it
    Render(RenderArgs),
    /// Upload an existing image file to a CDN
    Upload {
        /// Path to the image
        file: PathBuf,
        /// uguu or catbox (default: CDN_PROVIDER)
        #[arg(long)]
        provider: Option<String>,
        /// Filename reported to the CDN (default: the file's own name)
        #[arg(long)]
        filename: Option<String>,
    },
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long)]
    sender: String,
    #[arg(long)]
    message: String,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    time: Option<String>,
    /// png or jpeg; anything else renders png
    #[arg(long, default_value = "png")]
    format: String,
    /// JPEG quality in [0.1, 1.0]
    #[arg(long)]
    quality: Option<String>,
    /// html, raster or dom-capture (default: MOCKUP_RENDERER)
    #[arg(long)]
    renderer: Option<String>,
    /// TTF/OTF font file (default: MOCKUP_FONT_PATH, then system fonts)
    #[arg(long)]
    font: Option<PathBuf>,
    /// Output file (default: sms-<sender>-<millis>.<ext> in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Upload the rendered image after writing it
    #[arg(long)]
    upload: bool,
    /// uguu or catbox (default: CDN_PROVIDER)
    #[arg(long)]
    provider: Option<String>,
}

impl RenderArgs {
    fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::from([
            ("sender".to_string(), self.sender.clone()),
            ("message".to_string(), self.message.clone()),
            ("format".to_string(), self.format.clone()),
        ]);
        let optional = [
            ("date", &self.date),
            ("time", &self.time),
            ("quality", &self.quality),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.insert(key.to_string(), value.clone());
            }
        }
        params
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    output: Option<PathBuf>,
    size: usize,
    mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cdn_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<CdnProvider>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize summary")?;
    println!("{}", out);
    Ok(())
}

fn parse_provider(raw: Option<&str>) -> anyhow::Result<Option<CdnProvider>> {
    raw.map(|p| {
        CdnProvider::parse(p).ok_or_else(|| anyhow::anyhow!("Unsupported CDN provider: {}", p))
    })
    .transpose()
}

async fn render_once(
    renderer: Arc<dyn Renderer>,
    request: MockupRequest,
) -> Result<RenderResult, AppError> {
    tokio::task::spawn_blocking(move || -> Result<RenderResult, AppError> {
        let output = renderer.render(&request)?;
        Ok(encode(&output, request.format(), request.quality())?)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))?
}

async fn upload_bytes(
    config: &Config,
    provider: Option<CdnProvider>,
    data: Bytes,
    filename: &str,
    mime_type: &str,
) -> anyhow::Result<UploadResult> {
    let uploader = CdnUploaders::from_config(config)?.get(provider);
    let uploaded = retry(RetryPolicy::from_config(config), "cdn_upload", |_| {
        let uploader = uploader.clone();
        let data = data.clone();
        async move {
            uploader
                .upload(data, filename, mime_type)
                .await
                .map_err(AppError::from)
        }
    })
    .await?;
    Ok(uploaded)
}

async fn run_render(config: &Config, args: RenderArgs) -> anyhow::Result<()> {
    let kind = match args.renderer.as_deref() {
        Some(raw) => RendererKind::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("Unknown renderer '{}'", raw))?,
        None => config.renderer,
    };
    let font = args
        .font
        .clone()
        .or_else(|| config.font_path.as_ref().map(PathBuf::from));
    let provider = parse_provider(args.provider.as_deref())?;

    let request = resolve_mockup_request(&args.params(), ResponseMode::ImageBytes)?;
    let renderer = create_renderer(kind, font.as_deref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request, kind));

    if !kind.produces_surface() {
        if args.upload {
            anyhow::bail!("The html renderer produces a document; use raster or dom-capture to upload");
        }
        let document = match renderer.render(&request)? {
            RenderOutput::Document(html) => html,
            RenderOutput::Surface(_) => anyhow::bail!("Expected an HTML document"),
        };
        write_output(&output, document.as_bytes()).await?;
        return print_json(&Summary {
            output: Some(output),
            size: document.len(),
            mime_type: "text/html".to_string(),
            cdn_url: None,
            provider: None,
        });
    }

    let policy = RetryPolicy::from_config(config);
    let rendered = retry(policy, "render_mockup", |_| {
        render_once(renderer.clone(), request.clone())
    })
    .await?;
    write_output(&output, &rendered.encoded_bytes).await?;

    let uploaded = if args.upload {
        let filename = output
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| request.filename());
        Some(
            upload_bytes(
                config,
                provider,
                rendered.encoded_bytes.clone(),
                &filename,
                rendered.mime_type,
            )
            .await?,
        )
    } else {
        None
    };

    print_json(&Summary {
        output: Some(output),
        size: rendered.size_bytes,
        mime_type: rendered.mime_type.to_string(),
        cdn_url: uploaded.as_ref().map(|u| u.url.clone()),
        provider: uploaded.map(|u| u.provider),
    })
}

async fn write_output(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), size = data.len(), "Mockup written");
    Ok(())
}

async fn run_upload(
    config: &Config,
    file: PathBuf,
    provider: Option<String>,
    filename: Option<String>,
) -> anyhow::Result<()> {
    let provider = parse_provider(provider.as_deref())?;
    let data = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if data.len() > config.max_upload_size_bytes {
        anyhow::bail!(
            "{} is {} bytes, above the {} byte limit",
            file.display(),
            data.len(),
            config.max_upload_size_bytes
        );
    }

    let filename = filename
        .or_else(|| file.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .unwrap_or_else(|| "image.png".to_string());
    let size = data.len();
    let mime_type = mime_for_path(&file);
    let uploaded = upload_bytes(config, provider, Bytes::from(data), &filename, mime_type).await?;

    print_json(&Summary {
        output: None,
        size,
        mime_type: mime_type.to_string(),
        cdn_url: Some(uploaded.url),
        provider: Some(uploaded.provider),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(&config, args).await?,
        Commands::Upload {
            file,
            provider,
            filename,
        } => run_upload(&config, file, provider, filename).await?,
    }

    Ok(())
}
