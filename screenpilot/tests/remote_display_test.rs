//! RemoteDisplay against a local fake screenshot endpoint.

use std::io::Cursor;
use std::time::Duration;
use std::{sync::Arc, thread};

use anyhow::Result;
use image::{ImageFormat, Rgba, RgbaImage};
use screenpilot::{AgentError, RemoteDisplay};

fn encoded_frame(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

fn start_screenshot_server(body: Vec<u8>, status: u16) -> (String, Arc<tiny_http::Server>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let server_arc = Arc::new(server);
    let server_clone = server_arc.clone();

    thread::spawn(move || {
        for request in server_clone.incoming_requests() {
            assert_eq!(request.url(), "/screenshot");
            let header: tiny_http::Header = "Content-Type: image/png".parse().unwrap();
            let response = tiny_http::Response::from_data(body.clone())
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{port}"), server_arc)
}

#[tokio::test]
async fn remote_observation_uses_unit_scale_geometry() -> Result<()> {
    let (server_url, _server) = start_screenshot_server(encoded_frame(1920, 1080), 200);

    let display = RemoteDisplay::new(&server_url, Duration::from_secs(5))?;
    let observation = display.observe().await?;

    assert_eq!(observation.geometry.logical_width, 1920);
    assert_eq!(observation.geometry.logical_height, 1080);
    assert_eq!(observation.geometry.physical_width, 1920);
    assert_eq!(observation.geometry.scale_x, 1.0);
    assert_eq!(observation.geometry.scale_y, 1.0);
    assert!(!observation.image_bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_success_status_surfaces_as_input_control_error() {
    let (server_url, _server) = start_screenshot_server(b"boom".to_vec(), 500);

    let display = RemoteDisplay::new(&server_url, Duration::from_secs(5)).unwrap();
    let err = display.screenshot().await.unwrap_err();

    assert!(matches!(err, AgentError::InputControl(_)));
}

#[tokio::test]
async fn undecodable_remote_frame_is_a_geometry_error() {
    let (server_url, _server) = start_screenshot_server(b"not a png".to_vec(), 200);

    let display = RemoteDisplay::new(&server_url, Duration::from_secs(5)).unwrap();
    let err = display.observe().await.unwrap_err();

    assert!(matches!(err, AgentError::Geometry(_)));
}

#[test]
fn empty_base_url_is_rejected() {
    assert!(matches!(
        RemoteDisplay::new("", Duration::from_secs(1)),
        Err(AgentError::InvalidArgument(_))
    ));
}
