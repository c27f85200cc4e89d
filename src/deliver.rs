//! Handing finished posts to a delivery channel, with per-layer fallback.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde_json::Value;

use crate::{
    assets::decode::decode_base64,
    compose::{ComposeOpts, compose},
    foundation::error::PostcardResult,
    model::{Layer, LayerKind, Post},
    props::IMAGE_PAYLOAD_KEY,
};

/// Where finished content goes (a chat, a directory, a test recorder).
pub trait DeliveryChannel {
    /// Send a plain text message.
    fn send_text(&mut self, text: &str) -> PostcardResult<()>;

    /// Send an encoded image as a photo attachment named `name`.
    fn send_photo(&mut self, name: &str, bytes: &[u8]) -> PostcardResult<()>;
}

/// What a delivery actually sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Text messages sent.
    pub texts: usize,
    /// Photos sent.
    pub photos: usize,
    /// Whether compositing failed and layers went out one by one.
    pub fell_back: bool,
}

/// Deliver a post: body text first, then one composited photo.
///
/// When compositing fails the layers are sent individually instead; see
/// [`send_layers_separately`].
#[tracing::instrument(level = "info", skip_all, fields(post = %post.id))]
pub fn deliver_post(
    post: &Post,
    channel: &mut dyn DeliveryChannel,
    opts: &ComposeOpts,
) -> PostcardResult<DeliveryReport> {
    let mut report = DeliveryReport::default();

    if !post.body_text.is_empty() {
        channel.send_text(&post.body_text)?;
        report.texts += 1;
    }

    if post.layers.is_empty() {
        return Ok(report);
    }

    match compose(&post.layers, opts) {
        Ok(bytes) => {
            let name = format!("post.{}", opts.format.extension());
            channel.send_photo(&name, &bytes)?;
            report.photos += 1;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to compose layers, sending them separately");
            let fallback = send_layers_separately(&post.layers, channel)?;
            report.texts += fallback.texts;
            report.photos += fallback.photos;
            report.fell_back = true;
        }
    }

    Ok(report)
}

/// Send layers one by one in input order.
///
/// Image layers go out as standalone photos (undecodable base64 is logged and skipped), text
/// layers as standalone messages, everything else is dropped.
pub fn send_layers_separately(
    layers: &[Layer],
    channel: &mut dyn DeliveryChannel,
) -> PostcardResult<DeliveryReport> {
    let mut report = DeliveryReport {
        fell_back: true,
        ..DeliveryReport::default()
    };

    for layer in layers {
        match layer.kind {
            LayerKind::Image => {
                let Some(Value::String(payload)) = layer.attributes.get(IMAGE_PAYLOAD_KEY) else {
                    continue;
                };
                if payload.is_empty() {
                    continue;
                }
                let bytes = match decode_base64(payload) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(layer = %layer.id, error = %e, "failed to decode base64 image");
                        continue;
                    }
                };
                channel.send_photo(&photo_name(&bytes), &bytes)?;
                report.photos += 1;
            }
            LayerKind::Text => {
                if let Some(Value::String(text)) = layer.attributes.get("text") {
                    channel.send_text(text)?;
                    report.texts += 1;
                }
            }
            LayerKind::Rectangle | LayerKind::Other(_) => {}
        }
    }

    Ok(report)
}

fn photo_name(bytes: &[u8]) -> String {
    let ext = image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("jpg");
    format!("image.{ext}")
}

/// One send recorded by [`RecordingChannel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    /// A text message.
    Text(String),
    /// A photo attachment.
    Photo {
        /// Attachment name.
        name: String,
        /// Encoded image bytes.
        bytes: Vec<u8>,
    },
}

/// In-memory channel that records every send.
#[derive(Clone, Debug, Default)]
pub struct RecordingChannel {
    /// Sends in order.
    pub sent: Vec<Sent>,
}

impl DeliveryChannel for RecordingChannel {
    fn send_text(&mut self, text: &str) -> PostcardResult<()> {
        self.sent.push(Sent::Text(text.to_owned()));
        Ok(())
    }

    fn send_photo(&mut self, name: &str, bytes: &[u8]) -> PostcardResult<()> {
        self.sent.push(Sent::Photo {
            name: name.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Channel writing each send as a numbered file (`000-text.txt`, `001-post.jpg`, ...).
#[derive(Debug)]
pub struct DirectoryChannel {
    dir: PathBuf,
    next: usize,
}

impl DirectoryChannel {
    /// Create `dir` if needed and write into it.
    pub fn create(dir: impl Into<PathBuf>) -> PostcardResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        Ok(Self { dir, next: 0 })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> PostcardResult<()> {
        let path = self.dir.join(format!("{:03}-{name}", self.next));
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "delivered");
        self.next += 1;
        Ok(())
    }
}

impl DeliveryChannel for DirectoryChannel {
    fn send_text(&mut self, text: &str) -> PostcardResult<()> {
        self.write("text.txt", text.as_bytes())
    }

    fn send_photo(&mut self, name: &str, bytes: &[u8]) -> PostcardResult<()> {
        self.write(name, bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use base64::Engine as _;

    use super::*;
    use crate::{foundation::core::Canvas, foundation::error::PostcardError};

    fn png_b64() -> String {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 8, 7, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(buf)
    }

    fn small() -> ComposeOpts {
        ComposeOpts::default().with_default_canvas(Canvas::square(32))
    }

    #[test]
    fn body_text_then_single_photo() {
        let post = Post {
            body_text: "hello".to_owned(),
            layers: vec![Layer::new("rectangle", 0)],
            ..Post::default()
        };
        let mut ch = RecordingChannel::default();
        let report = deliver_post(&post, &mut ch, &small()).unwrap();

        assert_eq!(
            report,
            DeliveryReport {
                texts: 1,
                photos: 1,
                fell_back: false
            }
        );
        assert_eq!(ch.sent[0], Sent::Text("hello".to_owned()));
        let Sent::Photo { name, bytes } = &ch.sent[1] else {
            panic!("expected photo");
        };
        assert_eq!(name, "post.jpg");
        assert!(image::load_from_memory(bytes).is_ok());
    }

    #[test]
    fn no_text_and_no_layers_sends_nothing() {
        let mut ch = RecordingChannel::default();
        let report = deliver_post(&Post::default(), &mut ch, &small()).unwrap();
        assert_eq!(report, DeliveryReport::default());
        assert!(ch.sent.is_empty());
    }

    #[test]
    fn separate_delivery_keeps_input_order_and_drops_others() {
        let layers = vec![
            Layer::new("text", 5).with("text", "first"),
            Layer::new("rectangle", 0),
            Layer::new("image", 1).with(IMAGE_PAYLOAD_KEY, png_b64()),
            Layer::new("image", 2).with(IMAGE_PAYLOAD_KEY, "%%%"),
            Layer::new("image", 3),
            Layer::new("text", 4).with("text", 7),
            Layer::new("sticker", 0),
        ];
        let mut ch = RecordingChannel::default();
        let report = send_layers_separately(&layers, &mut ch).unwrap();

        assert_eq!(report.texts, 1);
        assert_eq!(report.photos, 1);
        assert_eq!(ch.sent.len(), 2);
        assert_eq!(ch.sent[0], Sent::Text("first".to_owned()));
        assert!(matches!(&ch.sent[1], Sent::Photo { name, .. } if name == "image.png"));
    }

    struct Refusing;

    impl DeliveryChannel for Refusing {
        fn send_text(&mut self, _text: &str) -> PostcardResult<()> {
            Err(PostcardError::delivery("offline"))
        }

        fn send_photo(&mut self, _name: &str, _bytes: &[u8]) -> PostcardResult<()> {
            Err(PostcardError::delivery("offline"))
        }
    }

    #[test]
    fn channel_errors_propagate() {
        let post = Post {
            body_text: "x".to_owned(),
            ..Post::default()
        };
        let err = deliver_post(&post, &mut Refusing, &small()).unwrap_err();
        assert!(err.to_string().contains("delivery error:"));
    }
}
