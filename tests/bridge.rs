//! Black-box tests of the method dispatch, driven through the public API
//! with the real image backend and synthetic JPEG fixtures.

use image::ImageEncoder;
use medias_picker::bridge::{ChannelResponder, MethodCall, Reply};
use medias_picker::config::PluginConfig;
use medias_picker::imaging::RustBackend;
use medias_picker::permission::StaticPermissions;
use medias_picker::picker::PresetPicker;
use medias_picker::plugin::MediaPickerPlugin;
use medias_picker::workdir::WorkDir;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use tempfile::TempDir;

type Plugin = MediaPickerPlugin<RustBackend, PresetPicker, StaticPermissions>;

// =========================================================================
// Fixtures
// =========================================================================

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Splice a big-endian EXIF APP1 segment holding only an orientation tag
/// directly after SOI.
fn with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(b"MM");
    payload.extend_from_slice(&42u16.to_be_bytes());
    payload.extend_from_slice(&8u32.to_be_bytes());
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&0x0112u16.to_be_bytes());
    payload.extend_from_slice(&3u16.to_be_bytes());
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&0u32.to_be_bytes());

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> String {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes(width, height)).unwrap();
    path.to_string_lossy().into_owned()
}

fn plugin(tmp: &TempDir, selection: Vec<String>, permissions: StaticPermissions) -> Plugin {
    MediaPickerPlugin::new(
        RustBackend::new(),
        PresetPicker::new(selection),
        permissions,
        WorkDir::new(tmp.path().join("TempImgs")),
    )
}

fn call(plugin: &mut Plugin, method: &str, args: Value) -> Receiver<Reply> {
    let (responder, rx) = ChannelResponder::new();
    plugin.on_method_call(&MethodCall::new(method, args), Box::new(responder));
    rx
}

fn success_paths(rx: &Receiver<Reply>) -> Vec<PathBuf> {
    match rx.try_recv().unwrap() {
        Reply::Success(Value::Array(items)) => items
            .iter()
            .map(|v| PathBuf::from(v.as_str().unwrap()))
            .collect(),
        other => panic!("expected a list of paths, got {other:?}"),
    }
}

// =========================================================================
// compressImages
// =========================================================================

#[test]
fn compress_fits_landscape_into_square_box() {
    let tmp = TempDir::new().unwrap();
    let source = write_jpeg(tmp.path(), "landscape.jpg", 1600, 1200);
    let original = std::fs::read(&source).unwrap();
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let rx = call(
        &mut p,
        "compressImages",
        json!({"maxWidth": 800, "maxHeight": 800, "quality": 70, "imgPaths": [source]}),
    );
    let paths = success_paths(&rx);

    assert_eq!(paths.len(), 1);
    assert_ne!(paths[0], PathBuf::from(&source));
    assert!(paths[0].starts_with(p.work_dir().path()));
    assert_eq!(image::image_dimensions(&paths[0]).unwrap(), (800, 600));
    assert_eq!(std::fs::read(&source).unwrap(), original, "source must be untouched");
}

#[test]
fn compress_applies_exif_rotation() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("rotated.jpg");
    std::fs::write(&source, with_orientation(&jpeg_bytes(40, 20), 6)).unwrap();
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let rx = call(
        &mut p,
        "compressImages",
        json!({"maxWidth": 100, "maxHeight": 100, "quality": 80, "imgPaths": [source]}),
    );
    let paths = success_paths(&rx);

    assert_eq!(image::image_dimensions(&paths[0]).unwrap(), (20, 40));
}

#[test]
fn compress_large_jpeg_under_tight_decode_limit() {
    let tmp = TempDir::new().unwrap();
    let source = write_jpeg(tmp.path(), "large.jpg", 2000, 2000);

    // A full decode is ~12 MB, the 1/8 scaled decode well under 4 MiB
    let mut config = PluginConfig::default();
    config.temp.base_dir = tmp.path().to_string_lossy().into_owned();
    config.compression.max_decode_bytes = 4 * 1024 * 1024;
    let mut p = MediaPickerPlugin::from_config(
        RustBackend::new(),
        PresetPicker::new(vec![]),
        StaticPermissions::granted_all(),
        &config,
    );

    let rx = call(
        &mut p,
        "compressImages",
        json!({"maxWidth": 200, "maxHeight": 200, "quality": 70, "imgPaths": [source]}),
    );
    let paths = success_paths(&rx);

    assert_ne!(paths[0], PathBuf::from(&source));
    assert!(paths[0].starts_with(p.work_dir().path()));
    assert_eq!(image::image_dimensions(&paths[0]).unwrap(), (200, 200));
}

#[test]
fn compress_falls_back_and_drops_empty_paths() {
    let tmp = TempDir::new().unwrap();
    let good = write_jpeg(tmp.path(), "good.jpg", 300, 300);
    let garbage = tmp.path().join("garbage.jpg");
    std::fs::write(&garbage, b"not an image").unwrap();
    let garbage = garbage.to_string_lossy().into_owned();
    let missing = tmp.path().join("missing.jpg").to_string_lossy().into_owned();
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let rx = call(
        &mut p,
        "compressImages",
        json!({
            "maxWidth": 100, "maxHeight": 100, "quality": 70,
            "imgPaths": [garbage, "", good, missing]
        }),
    );
    let paths = success_paths(&rx);

    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0], PathBuf::from(&garbage));
    assert!(paths[1].starts_with(p.work_dir().path()));
    assert_eq!(paths[2], PathBuf::from(&missing));
}

#[test]
fn compress_twice_produces_distinct_artifacts() {
    let tmp = TempDir::new().unwrap();
    let source = write_jpeg(tmp.path(), "twice.jpg", 64, 64);
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());
    let args = json!({"maxWidth": 32, "maxHeight": 32, "quality": 70, "imgPaths": [source]});

    let first = success_paths(&call(&mut p, "compressImages", args.clone()));
    let second = success_paths(&call(&mut p, "compressImages", args));

    assert_ne!(first[0], second[0]);
    assert!(first[0].exists() && second[0].exists());
}

#[test]
fn compress_with_missing_arguments_is_an_error_reply() {
    let tmp = TempDir::new().unwrap();
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let rx = call(&mut p, "compressImages", json!({"maxWidth": 10}));
    match rx.try_recv().unwrap() {
        Reply::Error {
            code,
            message,
            details,
        } => {
            assert_eq!(code, "invalid-arguments");
            assert!(message.contains("compressImages"));
            assert_eq!(details, Some(json!({"method": "compressImages"})));
        }
        other => panic!("expected an error reply, got {other:?}"),
    }
}

// =========================================================================
// deleteAllTempFiles
// =========================================================================

#[test]
fn delete_all_temp_files_removes_artifacts_and_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let source = write_jpeg(tmp.path(), "a.jpg", 50, 50);
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let paths = success_paths(&call(
        &mut p,
        "compressImages",
        json!({"maxWidth": 10, "maxHeight": 10, "quality": 70, "imgPaths": [source.clone()]}),
    ));
    assert!(paths[0].exists());

    let rx = call(&mut p, "deleteAllTempFiles", Value::Null);
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(json!(true)));
    assert!(!p.work_dir().path().exists());
    assert!(Path::new(&source).exists(), "sources outside the work dir survive");

    let rx = call(&mut p, "deleteAllTempFiles", Value::Null);
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(json!(true)));
}

// =========================================================================
// Permissions
// =========================================================================

#[test]
fn check_permission_reflects_both_capabilities() {
    let tmp = TempDir::new().unwrap();

    let mut granted = plugin(&tmp, vec![], StaticPermissions::granted_all());
    let rx = call(&mut granted, "checkPermission", json!({}));
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(json!(true)));

    let mut no_camera = plugin(&tmp, vec![], StaticPermissions::new(true, false));
    let rx = call(&mut no_camera, "checkPermission", json!({}));
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(json!(false)));
}

#[test]
fn request_permission_waits_for_prompt_outcome() {
    let tmp = TempDir::new().unwrap();
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let rx = call(&mut p, "requestPermission", json!({}));
    assert!(rx.try_recv().is_err());

    let requests = p.permissions().take_requests();
    for (id, capabilities) in requests {
        let grants = p.permissions().grants_for(&capabilities);
        assert!(p.on_permissions_result(id, &grants));
    }
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(json!(true)));
}

// =========================================================================
// Picking
// =========================================================================

#[test]
fn overlapping_picks_each_get_their_own_selection() {
    let tmp = TempDir::new().unwrap();
    let mut p = plugin(
        &tmp,
        vec!["/dcim/a.jpg".into(), "/dcim/clip.mp4".into()],
        StaticPermissions::granted_all(),
    );

    let images = call(
        &mut p,
        "pickImages",
        json!({"maxWidth": 800, "maxHeight": 800, "quality": 70}),
    );
    let videos = call(&mut p, "pickVideos", json!({}));
    assert_eq!(p.pending_count(), 2);

    // Deliver in reverse launch order
    let mut launched = p.picker().take_launched();
    launched.reverse();
    for (id, request) in launched {
        let selection = p.picker().selection_for(&request);
        assert!(p.on_picker_result(id, Some(selection)));
    }

    assert_eq!(images.try_recv().unwrap(), Reply::Success(json!(["/dcim/a.jpg"])));
    assert_eq!(videos.try_recv().unwrap(), Reply::Success(json!(["/dcim/clip.mp4"])));
    assert_eq!(p.pending_count(), 0);
}

#[test]
fn picked_images_are_compressed_when_configured() {
    let tmp = TempDir::new().unwrap();
    let photo = write_jpeg(tmp.path(), "photo.jpg", 400, 200);

    let mut config = PluginConfig::default();
    config.temp.base_dir = tmp.path().to_string_lossy().into_owned();
    config.compression.compress_picked = true;
    let mut p = MediaPickerPlugin::from_config(
        RustBackend::new(),
        PresetPicker::new(vec![photo.clone()]),
        StaticPermissions::granted_all(),
        &config,
    );

    let rx = call(
        &mut p,
        "pickImages",
        json!({"quantity": 1, "maxWidth": 100, "maxHeight": 100, "quality": 70}),
    );
    let launched = p.picker().take_launched();
    for (id, request) in launched {
        let selection = p.picker().selection_for(&request);
        p.on_picker_result(id, Some(selection));
    }

    let paths = success_paths(&rx);
    assert_eq!(paths.len(), 1);
    assert_ne!(paths[0], PathBuf::from(&photo));
    assert_eq!(image::image_dimensions(&paths[0]).unwrap(), (100, 50));
}

#[test]
fn unknown_method_is_not_implemented() {
    let tmp = TempDir::new().unwrap();
    let mut p = plugin(&tmp, vec![], StaticPermissions::granted_all());

    let rx = call(&mut p, "takePhoto", json!({}));
    assert_eq!(rx.try_recv().unwrap(), Reply::NotImplemented);
}
