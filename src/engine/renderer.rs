//! FFmpeg render loop
//!
//! Decodes the composition's source video, normalizes orientation, composites
//! the layer stack onto the working canvas, and encodes H.264/yuv420p at the
//! instructed frame rate. Audio packets are passed through unmodified. The
//! container trailer is written only after the encode loop completes, so a
//! failed render never leaves a playable file behind.

use ffmpeg_next::software::scaling;
use ffmpeg_next::{codec, format, frame, Dictionary, Rational};
use tracing::info;

use crate::compose::Rect;
use crate::domain::model::{Dimensions, Orientation};
use crate::engine::compositor::{rotate_rgba, Canvas, RGBA_CHANNELS};
use crate::engine::ExportJob;
use crate::error::{MarkXError, MarkXResult};

/// Counters reported back by a completed render
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderStats {
    pub frames: u64,
    pub audio_packets: u64,
}

fn export_error(context: &str, e: impl std::fmt::Display) -> MarkXError {
    MarkXError::ExportError {
        message: format!("{}: {}", context, e),
    }
}

/// Render one export job to its destination path. Blocking; the exporter
/// drives this on the runtime's blocking pool.
pub(crate) fn render(job: &ExportJob) -> MarkXResult<RenderStats> {
    ffmpeg_next::init().map_err(|e| export_error("Failed to initialize FFmpeg", e))?;

    let mut input = format::input(&job.composition.source)
        .map_err(|e| export_error("Failed to open composition source", e))?;

    let video_index = job.composition.video.source_index;
    let (video_time_base, video_parameters) = {
        let stream = input.stream(video_index).ok_or_else(|| MarkXError::ExportError {
            message: format!("Source video stream {} disappeared", video_index),
        })?;
        (stream.time_base(), stream.parameters())
    };

    let mut decoder = codec::context::Context::from_parameters(video_parameters)
        .map_err(|e| export_error("Failed to create decoder context", e))?
        .decoder()
        .video()
        .map_err(|e| export_error("Failed to open video decoder", e))?;

    let mut output = format::output(&job.destination)
        .map_err(|e| export_error("Failed to create output file", e))?;

    let render_size = job.instructions.render_size;
    let fps = job.instructions.frame_rate as i32;
    let duration_secs = job.instructions.time_range.duration;

    // Video encoder
    let encoder_codec = ffmpeg_next::encoder::find(codec::Id::H264)
        .ok_or_else(|| MarkXError::ExportError {
            message: "H.264 encoder not available".to_string(),
        })?;

    let out_video_index = {
        let stream = output
            .add_stream(encoder_codec)
            .map_err(|e| export_error("Failed to add video stream", e))?;
        stream.index()
    };

    let mut encoder_builder = codec::context::Context::new_with_codec(encoder_codec)
        .encoder()
        .video()
        .map_err(|e| export_error("Failed to create video encoder", e))?;
    encoder_builder.set_width(render_size.width);
    encoder_builder.set_height(render_size.height);
    encoder_builder.set_format(format::Pixel::YUV420P);
    encoder_builder.set_time_base(Rational::new(1, fps));
    encoder_builder.set_frame_rate(Some(Rational::new(fps, 1)));
    encoder_builder.set_gop(job.instructions.frame_rate);
    if output
        .format()
        .flags()
        .contains(format::Flags::GLOBAL_HEADER)
    {
        encoder_builder.set_flags(codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder_options = Dictionary::new();
    encoder_options.set("preset", job.preset.encoder_preset());
    encoder_options.set("crf", &job.preset.crf().to_string());
    encoder_options.set("threads", &num_cpus::get().to_string());

    let mut encoder = encoder_builder
        .open_with(encoder_options)
        .map_err(|e| export_error("Failed to open video encoder", e))?;

    {
        let mut stream = output
            .stream_mut(out_video_index)
            .ok_or_else(|| MarkXError::ExportError {
                message: "Output video stream missing".to_string(),
            })?;
        stream.set_parameters(&encoder);
        stream.set_time_base(Rational::new(1, fps));
    }

    // Audio pass-through stream
    let audio_map = match &job.composition.audio {
        Some(audio) => {
            let (in_time_base, parameters) = {
                let stream =
                    input
                        .stream(audio.source_index)
                        .ok_or_else(|| MarkXError::ExportError {
                            message: format!("Source audio stream {} disappeared", audio.source_index),
                        })?;
                (stream.time_base(), stream.parameters())
            };
            let out_index = {
                let mut stream = output
                    .add_stream(ffmpeg_next::codec::encoder::find(codec::Id::None))
                    .map_err(|e| export_error("Failed to add audio stream", e))?;
                stream.set_parameters(parameters);
                stream.set_time_base(in_time_base);
                stream.index()
            };
            Some((audio.source_index, out_index, in_time_base))
        }
        None => None,
    };

    output
        .write_header()
        .map_err(|e| export_error("Failed to write output header", e))?;

    let mut pipeline = FramePipeline::new(job, render_size, &decoder)?;
    let mut stats = RenderStats {
        frames: 0,
        audio_packets: 0,
    };
    let mut last_output_pts: Option<i64> = None;
    let mut video_done = false;

    info!(
        "Rendering {} at {} / {} fps over {:.3}s",
        job.destination.display(),
        render_size,
        fps,
        duration_secs
    );

    for (stream, mut packet) in input.packets() {
        if video_done && audio_map.is_none() {
            break;
        }
        if stream.index() == video_index && !video_done {
            decoder
                .send_packet(&packet)
                .map_err(|e| export_error("Failed to send packet to decoder", e))?;
            video_done = drain_decoder(
                &mut decoder,
                &mut pipeline,
                &mut encoder,
                &mut output,
                out_video_index,
                video_time_base,
                duration_secs,
                fps,
                &mut last_output_pts,
                &mut stats,
            )?;
        } else if let Some((in_index, out_index, in_time_base)) = audio_map {
            if stream.index() == in_index {
                let packet_secs = packet
                    .pts()
                    .map(|pts| pts as f64 * f64::from(in_time_base))
                    .unwrap_or(0.0);
                if packet_secs >= duration_secs {
                    continue;
                }
                let out_time_base = output
                    .stream(out_index)
                    .map(|s| s.time_base())
                    .unwrap_or(in_time_base);
                packet.rescale_ts(in_time_base, out_time_base);
                packet.set_stream(out_index);
                packet
                    .write_interleaved(&mut output)
                    .map_err(|e| export_error("Failed to write audio packet", e))?;
                stats.audio_packets += 1;
            }
        }
    }

    // Flush the decoder for any buffered frames
    if !video_done {
        let _ = decoder.send_eof();
        drain_decoder(
            &mut decoder,
            &mut pipeline,
            &mut encoder,
            &mut output,
            out_video_index,
            video_time_base,
            duration_secs,
            fps,
            &mut last_output_pts,
            &mut stats,
        )?;
    }

    // Flush the encoder
    encoder
        .send_eof()
        .map_err(|e| export_error("Failed to flush video encoder", e))?;
    write_encoded_packets(&mut encoder, &mut output, out_video_index, fps)?;

    output
        .write_trailer()
        .map_err(|e| export_error("Failed to write output trailer", e))?;

    info!(
        "Render complete: {} frame(s), {} audio packet(s)",
        stats.frames, stats.audio_packets
    );
    Ok(stats)
}

/// Receive all decoded frames currently available, composite and encode
/// them. Returns true once the composition's time range is exhausted.
#[allow(clippy::too_many_arguments)]
fn drain_decoder(
    decoder: &mut codec::decoder::Video,
    pipeline: &mut FramePipeline,
    encoder: &mut codec::encoder::video::Encoder,
    output: &mut format::context::Output,
    out_video_index: usize,
    video_time_base: Rational,
    duration_secs: f64,
    fps: i32,
    last_output_pts: &mut Option<i64>,
    stats: &mut RenderStats,
) -> MarkXResult<bool> {
    let mut decoded = frame::Video::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        let timestamp = match decoded.timestamp() {
            Some(ts) => ts,
            None => continue,
        };
        let frame_secs = timestamp as f64 * f64::from(video_time_base);
        if frame_secs >= duration_secs {
            return Ok(true);
        }

        let output_pts = (frame_secs * fps as f64).round() as i64;
        if last_output_pts.is_some_and(|last| output_pts <= last) {
            // Source runs faster than the render rate; drop the duplicate tick
            continue;
        }
        *last_output_pts = Some(output_pts);

        let mut yuv = pipeline.compose(&decoded)?;
        yuv.set_pts(Some(output_pts));
        encoder
            .send_frame(&yuv)
            .map_err(|e| export_error("Failed to send frame to encoder", e))?;
        write_encoded_packets(encoder, output, out_video_index, fps)?;
        stats.frames += 1;
    }
    Ok(false)
}

/// Drain encoded packets into the output container
fn write_encoded_packets(
    encoder: &mut codec::encoder::video::Encoder,
    output: &mut format::context::Output,
    out_video_index: usize,
    fps: i32,
) -> MarkXResult<()> {
    let mut packet = codec::packet::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        let out_time_base = output
            .stream(out_video_index)
            .map(|s| s.time_base())
            .unwrap_or(Rational::new(1, fps));
        packet.rescale_ts(Rational::new(1, fps), out_time_base);
        packet.set_stream(out_video_index);
        packet
            .write_interleaved(output)
            .map_err(|e| export_error("Failed to write encoded packet", e))?;
    }
    Ok(())
}

/// Per-job frame composition state: scalers, the pre-scaled overlay image,
/// and the layer geometry. Scalers are built once; all frames of a track
/// share the decoder's stored format and size.
struct FramePipeline {
    render_size: Dimensions,
    stored_size: Dimensions,
    video_rect: Rect,
    overlay_rect: Rect,
    overlay_pixels: Vec<u8>,
    overlay_size: Dimensions,
    orientation: Orientation,
    decode_scaler: scaling::Context,
    fit_scaler: scaling::Context,
    encode_scaler: scaling::Context,
}

impl FramePipeline {
    fn new(
        job: &ExportJob,
        render_size: Dimensions,
        decoder: &codec::decoder::Video,
    ) -> MarkXResult<Self> {
        // The overlay is static: scale it once for the whole job
        let overlay_width = job.layers.overlay_image.width.round().max(1.0) as u32;
        let overlay_height = job.layers.overlay_image.height.round().max(1.0) as u32;
        let overlay = job.watermark.scaled_to(overlay_width, overlay_height);
        let overlay_size = Dimensions::new(overlay.width(), overlay.height());

        let orientation = job.composition.orientation.orientation;
        let stored_size = Dimensions::new(decoder.width(), decoder.height());
        let oriented_size = match orientation {
            Orientation::Right | Orientation::Left => stored_size.swapped(),
            Orientation::Up | Orientation::Down => stored_size,
        };

        let video_rect = job.layers.video_layer;
        let rect_width = video_rect.width.round().max(1.0) as u32;
        let rect_height = video_rect.height.round().max(1.0) as u32;

        let decode_scaler = scaling::Context::get(
            decoder.format(),
            stored_size.width,
            stored_size.height,
            format::Pixel::RGBA,
            stored_size.width,
            stored_size.height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| export_error("Failed to create decode scaler", e))?;

        let fit_scaler = scaling::Context::get(
            format::Pixel::RGBA,
            oriented_size.width,
            oriented_size.height,
            format::Pixel::RGBA,
            rect_width,
            rect_height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| export_error("Failed to create fit scaler", e))?;

        let encode_scaler = scaling::Context::get(
            format::Pixel::RGBA,
            render_size.width,
            render_size.height,
            format::Pixel::YUV420P,
            render_size.width,
            render_size.height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| export_error("Failed to create encode scaler", e))?;

        Ok(Self {
            render_size,
            stored_size,
            video_rect,
            overlay_rect: job.layers.overlay_image,
            overlay_pixels: overlay.into_raw(),
            overlay_size,
            orientation,
            decode_scaler,
            fit_scaler,
            encode_scaler,
        })
    }

    /// Composite one decoded frame into an encoder-ready YUV frame
    fn compose(&mut self, decoded: &frame::Video) -> MarkXResult<frame::Video> {
        // Decoded frame -> packed RGBA at its stored size
        let mut rgba = frame::Video::empty();
        self.decode_scaler
            .run(decoded, &mut rgba)
            .map_err(|e| export_error("Failed to convert frame to RGBA", e))?;
        let packed = packed_rgba(&rgba);

        // Normalize orientation so the frame displays upright
        let (oriented, oriented_size) = rotate_rgba(&packed, self.stored_size, self.orientation);

        // Fit the oriented frame into the inset video rect
        let oriented_frame = rgba_frame(&oriented, oriented_size)?;
        let mut fitted = frame::Video::empty();
        self.fit_scaler
            .run(&oriented_frame, &mut fitted)
            .map_err(|e| export_error("Failed to scale frame into video layer", e))?;
        let fitted_packed = packed_rgba(&fitted);

        // Composite the layer stack bottom-to-top
        let mut canvas = Canvas::new(self.render_size);
        canvas.blit(
            &fitted_packed,
            Dimensions::new(fitted.width(), fitted.height()),
            self.video_rect.x.round() as i64,
            self.video_rect.y.round() as i64,
        );
        canvas.blend(
            &self.overlay_pixels,
            self.overlay_size,
            self.overlay_rect.x.round() as i64,
            self.overlay_rect.y.round() as i64,
        );

        // Canvas -> YUV for the encoder
        let canvas_frame = rgba_frame(canvas.data(), self.render_size)?;
        let mut yuv = frame::Video::empty();
        self.encode_scaler
            .run(&canvas_frame, &mut yuv)
            .map_err(|e| export_error("Failed to convert canvas to YUV", e))?;

        Ok(yuv)
    }
}

/// Copy a frame's RGBA plane into a tightly packed buffer, dropping the
/// per-row padding FFmpeg may keep in its line stride.
fn packed_rgba(frame: &frame::Video) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = frame.stride(0);
    let row_bytes = width * RGBA_CHANNELS;
    let data = frame.data(0);

    let mut packed = Vec::with_capacity(row_bytes * height);
    for row in 0..height {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + row_bytes]);
    }
    packed
}

/// Build an RGBA frame from tightly packed pixel data
fn rgba_frame(packed: &[u8], size: Dimensions) -> MarkXResult<frame::Video> {
    let mut frame = frame::Video::new(format::Pixel::RGBA, size.width, size.height);
    let stride = frame.stride(0);
    let row_bytes = size.width as usize * RGBA_CHANNELS;
    if packed.len() < row_bytes * size.height as usize {
        return Err(MarkXError::ExportError {
            message: "Frame buffer shorter than its dimensions".to_string(),
        });
    }

    let data = frame.data_mut(0);
    for row in 0..size.height as usize {
        let src_start = row * row_bytes;
        let dst_start = row * stride;
        data[dst_start..dst_start + row_bytes]
            .copy_from_slice(&packed[src_start..src_start + row_bytes]);
    }
    Ok(frame)
}
