use clap::{Parser, Subcommand, ValueEnum};
use rust_fgc::codec::{BitCodec, ErrorCorrector};
use rust_fgc::layout::svg::parse_hex_color;
use rust_fgc::layout::{BoundaryPolicy, SvgStyle};
use rust_fgc::models::format_bits;
use rust_fgc::session::{Session, SessionInput, SessionReply, SessionState};
use rust_fgc::tools::{binary_stats, dataset_iter, grayscale_stats, load_image};
use rust_fgc::utils::binarization::binarize;
use rust_fgc::utils::grayscale::to_luma;
use rust_fgc::{DecodeConfig, EncodeOptions, Encoder, FgcDecoder, FgcError};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "fgctool", version, about = "Fancy Galaxy Code CLI tools")]
struct Cli {
    /// Log verbosity
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Boundary {
    Closed,
    Open,
}

#[derive(Subcommand)]
enum Command {
    /// Encode text into an SVG or PNG file
    Encode {
        #[arg(long)]
        text: String,
        /// Output path; `.png` rasterizes, anything else writes SVG
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "#39a887")]
        color_inner: String,
        #[arg(long, default_value = "#0f1a3b")]
        color_outer: String,
        /// Background color; omit for a transparent SVG
        #[arg(long)]
        background: Option<String>,
        /// Write the text below the code (SVG only)
        #[arg(long)]
        label: bool,
        /// Pixels per drawing unit for PNG output
        #[arg(long, default_value_t = 12.0)]
        scale: f32,
        #[arg(long, value_enum, default_value_t = Boundary::Closed)]
        boundary: Boundary,
    },
    /// Decode an image, or every image under a directory
    Decode {
        #[arg(long)]
        image: PathBuf,
        /// Write the input with the detected geometry drawn on top
        #[arg(long)]
        annotated: Option<PathBuf>,
        /// JSON decoder settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the bitstreams and ring table for a text
    Layout {
        #[arg(long)]
        text: String,
    },
    /// Print grayscale and binary stats for an image
    Inspect {
        #[arg(long)]
        image: PathBuf,
        /// JSON decoder settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Interactive create-or-read session on stdin
    Session {
        /// Directory for encoded PNGs
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(cli.log_level))
        .with_target(false)
        .init();

    let result = match cli.command {
        Command::Encode {
            text,
            out,
            color_inner,
            color_outer,
            background,
            label,
            scale,
            boundary,
        } => encode_cmd(
            &text,
            &out,
            &color_inner,
            &color_outer,
            background.as_deref(),
            label,
            scale,
            boundary,
        ),
        Command::Decode {
            image,
            annotated,
            config,
            json,
        } => decode_cmd(&image, annotated.as_deref(), config.as_deref(), json),
        Command::Layout { text } => layout_cmd(&text),
        Command::Inspect { image, config } => inspect_cmd(&image, config.as_deref()),
        Command::Session { out_dir } => session_cmd(&out_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_cmd(
    text: &str,
    out: &Path,
    color_inner: &str,
    color_outer: &str,
    background: Option<&str>,
    label: bool,
    scale: f32,
    boundary: Boundary,
) -> Result<(), FgcError> {
    let options = EncodeOptions {
        boundary: match boundary {
            Boundary::Closed => BoundaryPolicy::Closed,
            Boundary::Open => BoundaryPolicy::Open,
        },
        ..EncodeOptions::default()
    };
    let code = Encoder::new(options)?.encode(text)?;

    let is_png = out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        code.to_image(scale).save(out)?;
    } else {
        let style = SvgStyle {
            inner: parse_hex_color(color_inner)?,
            outer: parse_hex_color(color_outer)?,
            background: background.map(parse_hex_color).transpose()?,
            ..SvgStyle::default()
        };
        std::fs::write(out, code.to_svg(style, label))?;
    }
    info!(path = %out.display(), rings = code.layout.rings.len(), "wrote code");
    println!("Wrote {}", out.display());
    Ok(())
}

fn decode_cmd(
    image: &Path,
    annotated: Option<&Path>,
    config: Option<&Path>,
    json: bool,
) -> Result<(), FgcError> {
    let mut config = DecodeConfig::load(config)?;
    config.annotate = annotated.is_some();
    let decoder = FgcDecoder::new(config)?;

    let paths: Vec<PathBuf> = dataset_iter(image, None).collect();
    if paths.is_empty() {
        eprintln!("No images found under {}", image.display());
    }
    let single = paths.len() == 1;
    let mut decoded = 0usize;

    for path in &paths {
        let img = match load_image(path) {
            Ok(img) => img,
            Err(err) => {
                eprintln!("Failed to load image {}: {}", path.display(), err);
                continue;
            }
        };
        let report = decoder.read(&img);
        if report.is_ok() {
            decoded += 1;
        }

        if let (Some(out), Some(overlay)) = (annotated, &report.annotated) {
            let target = if single {
                out.to_path_buf()
            } else {
                annotated_name(out, path)
            };
            overlay.save(&target)?;
            debug!(path = %target.display(), "wrote annotated image");
        }

        if json {
            let value = serde_json::json!({
                "image": path.display().to_string(),
                "ok": report.is_ok(),
                "version": report.outcome.as_ref().ok().map(|m| m.version),
                "text": report.text(),
                "raw_bits": format_bits(&report.raw_bits, usize::MAX),
                "corrected_bit": report.outcome.as_ref().ok().and_then(|m| m.corrected_bit),
                "elapsed_ms": report.elapsed.as_secs_f64() * 1000.0,
                "error": report.error().map(|e| e.to_string()),
                "diagnostics": {
                    "hough_circles": report.diagnostics.hough_circles,
                    "features": report.diagnostics.features,
                    "retained": report.diagnostics.retained,
                    "ring_sizes": report.diagnostics.ring_sizes,
                },
            });
            println!("{value}");
        } else {
            println!("Image: {} ({}x{})", path.display(), img.width(), img.height());
            match &report.outcome {
                Ok(message) => {
                    println!("  version: {}", message.version);
                    println!("  text: {}", message.text);
                    if let Some(bit) = message.corrected_bit {
                        println!("  corrected bit: {bit}");
                    }
                }
                Err(err) => println!("  failed: {err}"),
            }
            println!("  raw bits:\n{}", format_bits(&report.raw_bits, 60));
            println!("  elapsed: {:.2?}", report.elapsed);
        }
    }

    if !single {
        println!("Decoded {}/{} images", decoded, paths.len());
    }
    Ok(())
}

fn annotated_name(dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{stem}.annotated.png"))
}

fn layout_cmd(text: &str) -> Result<(), FgcError> {
    let encoder = Encoder::default();
    let code = encoder.encode(text)?;
    let table = &encoder.options().table;

    println!("Text: {text}");
    println!("Raw bits ({}):\n{}", code.raw_bits.len(), format_bits(&code.raw_bits, 60));
    println!(
        "Encoded bits ({}):\n{}",
        code.encoded_bits.len(),
        format_bits(&code.encoded_bits, 60)
    );
    println!("Marker: {:?}", code.layout.marker);
    println!("{:>4} {:>8} {:>8} {:>6}  bits", "ring", "deg/bit", "capacity", "used");
    for ring in &code.layout.rings {
        println!(
            "{:>4} {:>8} {:>8} {:>6}  {}",
            ring.number,
            table.degrees_per_bit(ring.number),
            ring.capacity,
            ring.data.len(),
            format_bits(&ring.data, usize::MAX)
        );
    }

    let corrected = ErrorCorrector::decode(&code.encoded_bits);
    let (version, round_trip) = BitCodec::decode(&corrected.data)?;
    println!("Round trip: version {version}, text {round_trip:?}");
    Ok(())
}

fn inspect_cmd(image: &Path, config: Option<&Path>) -> Result<(), FgcError> {
    let decoder = FgcDecoder::new(DecodeConfig::load(config)?)?;
    let img = load_image(image)?;
    let gray = to_luma(&img);
    println!("Image: {} ({}x{})", image.display(), gray.width(), gray.height());

    let stats = grayscale_stats(&gray);
    println!(
        "Grayscale range: {}-{}, average: {}",
        stats.min, stats.max, stats.avg
    );

    let (mask, threshold) = binarize(&gray, decoder.config().threshold);
    let stats = binary_stats(&mask);
    println!(
        "Binary: threshold={} ink_pixels={} total={} ink_ratio={:.2}%",
        threshold,
        stats.ink_pixels,
        stats.total_pixels,
        stats.ink_ratio * 100.0
    );

    let report = decoder.read(&img);
    let d = &report.diagnostics;
    println!("Circles: {}", d.hough_circles);
    println!(
        "Contours: {} (degenerate {}, sides {}, area {}), accepted {}",
        d.features.contours,
        d.features.degenerate,
        d.features.rejected_sides,
        d.features.rejected_area,
        d.features.accepted
    );
    println!("Retained: {}, ring sizes: {:?}", d.retained, d.ring_sizes);
    match report.error() {
        None => println!("Decoded: {}", report.text()),
        Some(err) => println!("Failed: {err}"),
    }
    Ok(())
}

fn session_cmd(out_dir: &Path) -> Result<(), FgcError> {
    let mut session = Session::default();
    let mut written = 0usize;
    print_reply(&session.handle(SessionInput::Start));

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        let input = match line {
            "" => continue,
            "/start" => SessionInput::Start,
            "/help" => SessionInput::Help,
            "/cancel" => SessionInput::Cancel,
            "/quit" => break,
            _ if session.state() == SessionState::AwaitingDecodeImage => {
                match load_image(line) {
                    Ok(img) => SessionInput::Image(img),
                    Err(err) => {
                        eprintln!("Failed to load image {line}: {err}");
                        continue;
                    }
                }
            }
            _ => SessionInput::Text(line.to_string()),
        };

        match session.handle(input) {
            SessionReply::Encoded(code) => {
                written += 1;
                let path = out_dir.join(format!("fgc-{written}.png"));
                code.to_image(12.0).save(&path)?;
                println!("Wrote {}", path.display());
            }
            reply => print_reply(&reply),
        }
    }
    Ok(())
}

fn print_reply(reply: &SessionReply) {
    match reply {
        SessionReply::Menu { prompt, choices } => {
            println!("{prompt}");
            for choice in choices {
                println!("  [{choice}]");
            }
        }
        SessionReply::Prompt(text) => println!("{text}"),
        SessionReply::Encoded(code) => println!("Encoded {:?}", code.text),
        SessionReply::Decoded(report) => match report.error() {
            None => println!("{}", report.text()),
            Some(err) => println!("Could not decode: {err}"),
        },
        SessionReply::Failed(err) => println!("Could not encode: {err}"),
    }
}
