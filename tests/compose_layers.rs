use std::io::Cursor;

use base64::Engine as _;
use postcard::{Canvas, ComposeOpts, FrameRGBA, Layer, Rgba8, compose_frame};

fn opts(side: u32) -> ComposeOpts {
    ComposeOpts::default().with_default_canvas(Canvas::square(side))
}

fn png_b64(w: u32, h: u32, px: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(buf)
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    frame.pixel(x, y).unwrap()
}

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

#[test]
fn higher_order_index_paints_on_top_regardless_of_input_order() {
    let layers = vec![
        Layer::new("rectangle", 1)
            .with("x", 10)
            .with("y", 10)
            .with("width", 20)
            .with("height", 20)
            .with("color", "#ff0000"),
        Layer::new("rectangle", 0)
            .with("x", 10)
            .with("y", 10)
            .with("width", 20)
            .with("height", 20)
            .with("color", "#0000ff"),
    ];
    let frame = compose_frame(&layers, &opts(64)).unwrap();
    assert_eq!(px(&frame, 20, 20), RED);
}

#[test]
fn equal_order_index_keeps_input_order() {
    let rect = |color: &str| {
        Layer::new("rectangle", 3)
            .with("x", 0)
            .with("y", 0)
            .with("width", 32)
            .with("height", 32)
            .with("color", color)
    };
    let frame = compose_frame(&[rect("#ff0000"), rect("#0000ff")], &opts(64)).unwrap();
    assert_eq!(px(&frame, 16, 16), BLUE);

    let frame = compose_frame(&[rect("#0000ff"), rect("#ff0000")], &opts(64)).unwrap();
    assert_eq!(px(&frame, 16, 16), RED);
}

#[test]
fn canvas_grows_to_fit_layer_extent() {
    let layers = vec![
        Layer::new("rectangle", 0)
            .with("x", 100)
            .with("w", 50)
            .with("width", 50)
            .with("color", "#ff0000"),
    ];
    let frame = compose_frame(&layers, &opts(64)).unwrap();
    assert_eq!((frame.width, frame.height), (150, 64));
    assert_eq!(px(&frame, 149, 10), RED);
}

#[test]
fn rectangle_without_attributes_is_a_white_100px_square() {
    let o = opts(200).with_background(Rgba8::opaque(0, 0, 0));
    let frame = compose_frame(&[Layer::new("rectangle", 0)], &o).unwrap();
    assert_eq!(px(&frame, 50, 50), WHITE);
    assert_eq!(px(&frame, 150, 150), [0, 0, 0, 255]);
}

#[test]
fn numeric_strings_are_accepted_for_geometry() {
    let layers = vec![
        Layer::new("rectangle", 0)
            .with("x", "10")
            .with("y", "10")
            .with("width", "20")
            .with("height", "20.0")
            .with("color", "#ff0000"),
    ];
    let frame = compose_frame(&layers, &opts(64)).unwrap();
    assert_eq!(px(&frame, 15, 15), RED);
    assert_eq!(px(&frame, 5, 5), WHITE);
    assert_eq!(px(&frame, 35, 35), WHITE);
}

#[test]
fn opacity_does_not_leak_into_later_layers() {
    let faded = Layer::new("image", 0)
        .with("image_base64", png_b64(8, 8, [0, 0, 0, 255]))
        .with("opacity", 0.5);
    let solid = Layer::new("image", 1)
        .with("image_base64", png_b64(8, 8, [255, 0, 0, 255]))
        .with("x", 20)
        .with("y", 20);

    let alone = compose_frame(std::slice::from_ref(&solid), &opts(48)).unwrap();
    let both = compose_frame(&[faded, solid], &opts(48)).unwrap();

    for y in 20..28 {
        for x in 20..28 {
            assert_eq!(px(&both, x, y), px(&alone, x, y));
        }
    }
    assert_eq!(px(&both, 24, 24), RED);

    let [r, g, b, _] = px(&both, 4, 4);
    assert!((120..=135).contains(&r), "faded layer should be half grey, got {r}");
    assert_eq!((r, g), (g, b));
}

#[test]
fn broken_image_layer_is_skipped_and_others_still_paint() {
    let layers = vec![
        Layer::new("rectangle", 0)
            .with("x", 0)
            .with("y", 0)
            .with("width", 16)
            .with("height", 16)
            .with("color", "#ff0000"),
        Layer::new("image", 1).with("image_base64", ""),
        Layer::new("image", 2).with("image_base64", "!!not base64!!"),
        Layer::new("image", 3),
        Layer::new("text", 4)
            .with("text", "I")
            .with("x", 40)
            .with("y", 40)
            .with("font_size", 16)
            .with("align", "center"),
    ];
    let frame = compose_frame(&layers, &opts(64)).unwrap();
    assert_eq!(px(&frame, 8, 8), RED);

    let dark = |x: u32, y: u32| px(&frame, x, y)[0] < 128;
    let inside = (32..48).flat_map(|y| (32..48).map(move |x| (x, y)));
    assert!(inside.clone().any(|(x, y)| dark(x, y)));
    let outside = (16..64)
        .flat_map(|y| (16..64).map(move |x| (x, y)))
        .filter(|&(x, y)| !(32..48).contains(&x) || !(32..48).contains(&y));
    assert!(outside.into_iter().all(|(x, y)| !dark(x, y)));
}

#[test]
fn scaled_image_covers_scaled_extent() {
    let layers = vec![
        Layer::new("image", 0)
            .with("image_base64", png_b64(4, 4, [0, 0, 255, 255]))
            .with("x", 8)
            .with("y", 8)
            .with("scale", 3),
    ];
    let frame = compose_frame(&layers, &opts(32)).unwrap();
    assert_eq!(px(&frame, 9, 9), BLUE);
    assert_eq!(px(&frame, 18, 18), BLUE);
    assert_eq!(px(&frame, 22, 22), WHITE);
}

#[test]
fn post_json_composes_end_to_end() {
    let json = r##"{
        "post_id": "p-1",
        "post_author": 7,
        "assigned_chat_id": [1, 2],
        "main_text": "caption",
        "content": [
            {"layer_id": "bg", "type": "rectangle", "order_index": 0,
             "data": {"x": 0, "y": 0, "w": 120, "h": 90, "width": 120, "height": 90, "color": "#00ff00"}},
            {"layer_id": "title", "type": "text", "order_index": 1,
             "data": {"text": "Hi", "x": 10, "y": 40, "font_size": 24, "color": "#000000"}},
            {"layer_id": "gif", "type": "sticker", "order_index": 2, "data": null}
        ]
    }"##;
    let post = postcard::Post::from_json(json).unwrap();
    assert_eq!(post.assigned_chat_ids, vec![1, 2]);

    let bytes = postcard::compose(&post.layers, &opts(64)).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (120, 90));
    let g = img.get_pixel(100, 80).0;
    assert!(g[1] > 200 && g[0] < 60 && g[2] < 60, "expected green, got {g:?}");
}
