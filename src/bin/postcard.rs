use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "postcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a post's layers into a single image file.
    Compose(ComposeArgs),
    /// Deliver a post into a directory: body text, then the composite (or separate layers).
    Deliver(DeliverArgs),
    /// Print the paint order and canvas size of a post without rendering it.
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
struct RenderFlags {
    /// Minimum canvas side in pixels (overrides POSTCARD_CANVAS_SIZE).
    #[arg(long)]
    size: Option<u32>,

    /// JPEG quality 1-100 (overrides POSTCARD_JPEG_QUALITY).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Encode PNG instead of JPEG.
    #[arg(long, conflicts_with = "quality")]
    png: bool,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input post JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    render: RenderFlags,
}

#[derive(Parser, Debug)]
struct DeliverArgs {
    /// Input post JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving the numbered output files.
    #[arg(long, required_unless_present = "dry_run")]
    out_dir: Option<PathBuf>,

    /// Print what would be sent instead of writing files.
    #[arg(long, conflicts_with = "out_dir")]
    dry_run: bool,

    #[command(flatten)]
    render: RenderFlags,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input post JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Minimum canvas side in pixels (overrides POSTCARD_CANVAS_SIZE).
    #[arg(long)]
    size: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Deliver(args) => cmd_deliver(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_post_json(path: &Path) -> anyhow::Result<postcard::Post> {
    let f = File::open(path).with_context(|| format!("open post '{}'", path.display()))?;
    let post = postcard::Post::from_reader(BufReader::new(f))
        .with_context(|| format!("parse post '{}'", path.display()))?;
    Ok(post)
}

fn make_opts(flags: &RenderFlags) -> postcard::ComposeOpts {
    let mut opts = postcard::ComposeOpts::from_env();
    if let Some(side) = flags.size {
        opts = opts.with_default_canvas(postcard::Canvas::square(side));
    }
    if flags.png {
        opts = opts.with_format(postcard::OutputFormat::Png);
    } else if let Some(quality) = flags.quality {
        opts = opts.with_format(postcard::OutputFormat::Jpeg { quality });
    }
    opts
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let post = read_post_json(&args.in_path)?;
    let opts = make_opts(&args.render);

    let bytes = postcard::compose(&post.layers, &opts)?;

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} bytes)", args.out.display(), bytes.len());
    Ok(())
}

fn cmd_deliver(args: DeliverArgs) -> anyhow::Result<()> {
    let post = read_post_json(&args.in_path)?;
    let opts = make_opts(&args.render);

    let (report, target) = match args.out_dir {
        Some(dir) => {
            let mut channel = postcard::DirectoryChannel::create(dir)?;
            let report = postcard::deliver_post(&post, &mut channel, &opts)?;
            (report, channel.dir().display().to_string())
        }
        None => {
            let mut channel = postcard::RecordingChannel::default();
            let report = postcard::deliver_post(&post, &mut channel, &opts)?;
            for sent in &channel.sent {
                match sent {
                    postcard::Sent::Text(text) => println!("text  {text:?}"),
                    postcard::Sent::Photo { name, bytes } => {
                        println!("photo {name} ({} bytes)", bytes.len())
                    }
                }
            }
            (report, "dry run".to_owned())
        }
    };

    eprintln!(
        "delivered post '{}' to {}: {} text(s), {} photo(s){}",
        post.id,
        target,
        report.texts,
        report.photos,
        if report.fell_back {
            ", layers sent separately"
        } else {
            ""
        }
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let post = read_post_json(&args.in_path)?;
    let mut opts = postcard::ComposeOpts::from_env();
    if let Some(side) = args.size {
        opts = opts.with_default_canvas(postcard::Canvas::square(side));
    }

    let canvas = postcard::canvas_size(&post.layers, opts.default_canvas);
    println!("post {} by {}", post.id, post.author);
    println!("canvas {}x{}", canvas.width, canvas.height);
    for (i, layer) in postcard::paint_order(&post.layers).into_iter().enumerate() {
        println!(
            "{i:>3}  order={:<4} kind={:<10} id={}  {}",
            layer.order_index,
            layer.kind.as_str(),
            layer.id,
            describe(&postcard::LayerProps::from_layer(layer)),
        );
    }
    Ok(())
}

fn describe(props: &postcard::LayerProps) -> String {
    match props {
        postcard::LayerProps::Rect(r) => format!(
            "rect {}x{} at ({}, {})",
            r.width, r.height, r.x, r.y
        ),
        postcard::LayerProps::Image(img) => format!(
            "image at ({}, {}) scale={} opacity={}{}",
            img.x,
            img.y,
            img.scale,
            img.opacity,
            if img.payload.is_some() {
                ""
            } else {
                " (no payload)"
            }
        ),
        postcard::LayerProps::Text(t) => format!(
            "text {:?} at ({}, {}) size={} align={:?}",
            t.text, t.x, t.y, t.font_size, t.align
        ),
        postcard::LayerProps::Ignored { .. } => "ignored".to_owned(),
    }
}
