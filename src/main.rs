mod source;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use loopcam::{pattern, DeviceSink};
use source::{Frame, FrameSource, GradientSource, StillSource};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Scrolling YUYV test gradient
    Gradient,
    /// Flat colour from --color
    Solid,
    /// Still image from --image
    Image,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output v4l2loopback device path
    #[arg(short, long, default_value = "/dev/video10")]
    device: PathBuf,

    /// Output width (must be even)
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Output height
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Frames per second to pace writes at
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Number of frames to write, 0 runs until interrupted
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Frame source
    #[arg(long, value_enum, default_value_t = SourceKind::Gradient)]
    source: SourceKind,

    /// Colour for the solid source, RRGGBB or RRGGBBAA
    #[arg(long, default_value = "ff0000")]
    color: String,

    /// Image file for the image source
    #[arg(long, required_if_eq("source", "image"))]
    image: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("loopcam starting");
    tracing::info!("Output: {} {}x{}", args.device.display(), args.width, args.height);
    tracing::info!("Target FPS: {}", args.fps);

    let mut source = create_source(&args)?;

    let mut sink: DeviceSink = DeviceSink::new();
    sink.open(&args.device)
        .context("Failed to open v4l2loopback output")?;
    sink.configure(args.width, args.height)
        .context("Failed to configure output format")?;

    let result = run_pipeline(&mut sink, source.as_mut(), args.fps, args.frames);
    sink.close();
    result
}

fn create_source(args: &Args) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match args.source {
        SourceKind::Gradient => {
            tracing::info!("Source: test gradient");
            Box::new(GradientSource::new(args.width, args.height))
        }
        SourceKind::Solid => {
            let color = pattern::parse_color(&args.color).context("Invalid --color")?;
            tracing::info!("Source: solid colour {:?}", color);
            Box::new(StillSource::solid(args.width, args.height, color)?)
        }
        SourceKind::Image => {
            let path = args.image.as_ref().context("--image is required for the image source")?;
            Box::new(StillSource::image(path, args.width, args.height)?)
        }
    };
    Ok(source)
}

fn run_pipeline(
    sink: &mut DeviceSink,
    source: &mut dyn FrameSource,
    target_fps: u32,
    max_frames: u64,
) -> Result<()> {
    let frame_duration = Duration::from_secs_f64(1.0 / target_fps as f64);
    let mut frame_count = 0u64;
    let mut total_source_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Writing frames");
    if max_frames == 0 {
        tracing::info!("Press Ctrl+C to stop");
    }

    while max_frames == 0 || frame_count < max_frames {
        let loop_start = Instant::now();

        let source_start = Instant::now();
        let frame = source.next_frame().context("Failed to produce frame")?;
        total_source_time += source_start.elapsed();

        let output_start = Instant::now();
        let written = match frame {
            Frame::Yuyv(data) => sink.write_raw(data),
            Frame::Rgba(data) => sink.write_rgba(data),
        }
        .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        if let Some((width, height)) = sink.dimensions() {
            let expected = width as usize * height as usize * 2;
            if written < expected {
                tracing::warn!("Short write: {} of {} bytes", written, expected);
            }
        }

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_source_ms = total_source_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            tracing::info!(
                "Frame {}: source={:.1}ms, output={:.1}ms",
                frame_count,
                avg_source_ms,
                avg_output_ms
            );
        }

        // Frame rate limiting
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }

    tracing::info!("Wrote {} frames", frame_count);
    Ok(())
}
