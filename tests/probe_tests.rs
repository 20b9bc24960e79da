// Integration tests for the probe pipeline, driven by the mock driver

use std::io::Cursor;

use avprobe::adapters::mock::{
    MockChapter, MockContainer, MockDecoder, MockDriver, MockProgram, MockStream, DECODER_NOT_FOUND,
    INVALID_DATA, NOT_FOUND,
};
use avprobe::convert::channel_layout::{FIVE_POINT_ONE, STEREO};
use avprobe::convert::NO_TIMESTAMP;
use avprobe::ports::{ContainerHandle, RawInputFormat};
use avprobe::{AvProbeError, AvResult, CodecId, MediaType, ProbeOptions, Prober, Rational, Stream};
use chrono::Duration;

fn mp4() -> MockContainer {
    MockContainer::new("mov,mp4,m4a,3gp,3g2,mj2", "QuickTime / MOV")
}

fn movie() -> MockContainer {
    mp4()
        .with_stream(
            MockStream::video(CodecId::H264, 1920, 1080)
                .with_sample_aspect_ratio(Rational::new(1, 1))
                .with_codec_params(|codec| {
                    codec.codec_name = Some("h264".to_string());
                    codec.codec_tag = u32::from_le_bytes(*b"avc1");
                    codec.profile_name = Some("High".to_string());
                }),
        )
        .with_stream(
            MockStream::audio(CodecId::AAC, 48000, 2, STEREO)
                .with_tag("language", "eng")
                .with_codec_params(|codec| codec.codec_name = Some("aac".to_string())),
        )
        .with_stream(MockStream::subtitle(CodecId::MOV_TEXT).with_codec_params(|codec| {
            codec.width = 640;
            codec.height = 480;
        }))
        .with_decoder(MockDecoder::new(CodecId::H264).with_coded_size(1920, 1088))
        .with_decoder(MockDecoder::new(CodecId::AAC))
        .with_decoder(MockDecoder::new(CodecId::MOV_TEXT))
        .with_timing(0, 10_000_000, 1_500_000)
        .with_tag("major_brand", "isom")
        .with_tag("encoder", "Lavf60.3.100")
}

#[test]
fn test_streams_dispatched_by_media_type() {
    let driver = MockDriver::new(movie());
    let calls = driver.calls();
    let result = Prober::new(driver).probe_input("movie.mp4").unwrap();

    assert_eq!(result.streams.len(), 3);
    for (i, stream) in result.streams.iter().enumerate() {
        assert_eq!(stream.index(), i);
    }

    let video = result.streams[0].as_video().unwrap();
    assert_eq!((video.width, video.height), (1920, 1080));
    assert_eq!((video.coded_width, video.coded_height), (1920, 1088));
    assert_eq!(video.sample_aspect_ratio, Rational::new(1, 1));
    assert_eq!(video.display_aspect_ratio, Rational::new(16, 9));
    assert_eq!(video.pixel_format.as_deref(), Some("yuv420p"));
    assert_eq!(video.info.codec_tag_string, "avc1");
    assert_eq!(video.info.profile_name.as_deref(), Some("High"));
    assert_eq!(video.info.frame_rate, Rational::new(30, 1));

    let audio = result.streams[1].as_audio().unwrap();
    assert_eq!(audio.sample_rate, 48000);
    assert_eq!(audio.channel_count, 2);
    assert_eq!(audio.channel_layout_name.as_deref(), Some("stereo"));
    assert_eq!(audio.sample_format.as_deref(), Some("fltp"));
    assert_eq!(result.streams[1].language(), Some("eng"));

    let subtitle = result.streams[2].as_subtitle().unwrap();
    assert_eq!((subtitle.width, subtitle.height), (640, 480));

    assert_eq!(calls.opens(), 1);
    assert_eq!(calls.resolves(), 1);
    assert_eq!(calls.close_input(), 1);
    assert_eq!(calls.containers_released(), 1);
    assert_eq!(calls.decoders_opened(), 3);
    assert_eq!(calls.decoders_released(), 3);
    assert_eq!(calls.last_url().as_deref(), Some("movie.mp4"));
}

#[test]
fn test_container_fields() {
    let result = Prober::new(MockDriver::new(movie())).probe_input("movie.mp4").unwrap();

    assert_eq!(result.format_name, "mov,mp4,m4a,3gp,3g2,mj2");
    assert_eq!(result.format_long_name, "QuickTime / MOV");
    assert_eq!(result.start_time, Some(Duration::zero()));
    assert_eq!(result.duration, Some(Duration::seconds(10)));
    assert_eq!(result.bit_rate, 1_500_000);
    assert_eq!(result.probe_score, 100);
    assert_eq!(result.encoder(), Some("Lavf60.3.100"));
    assert_eq!(result.tags.keys().collect::<Vec<_>>(), vec!["major_brand", "encoder"]);
    // The container reports no byte size for URL inputs
    assert_eq!(result.size, 0);
    assert_eq!(result.known_size(), None);
}

#[test]
fn test_unset_container_times_are_absent() {
    let container = mp4().with_timing(NO_TIMESTAMP, NO_TIMESTAMP, -1);
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    assert_eq!(result.start_time, None);
    assert_eq!(result.duration, None);
    assert_eq!(result.bit_rate, 0);
    assert!(result.streams.is_empty());
}

#[test]
fn test_stream_times_use_stream_clock() {
    let container = mp4().with_stream(
        MockStream::audio(CodecId::MP3, 44100, 2, STEREO).with_timing(Rational::new(1, 90000), 90000, 45000),
    );
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    let info = result.streams[0].info();
    assert_eq!(info.start_time, Some(Duration::seconds(1)));
    assert_eq!(info.duration, Some(Duration::milliseconds(500)));

    let container = mp4().with_stream(MockStream::bare().with_timing(Rational::new(1, 1000), NO_TIMESTAMP, NO_TIMESTAMP));
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    assert_eq!(result.streams[0].info().start_time, None);
    assert_eq!(result.streams[0].info().duration, None);
}

#[test]
fn test_open_failure_closes_once() {
    let driver = MockDriver::new(movie()).failing_open(NOT_FOUND);
    let calls = driver.calls();

    match Prober::new(driver).probe_input("missing.mp4") {
        Err(AvProbeError::Driver { status, message, .. }) => {
            assert_eq!(status, NOT_FOUND);
            assert_eq!(message.as_deref(), Some("No such file or directory"));
        }
        other => panic!("expected driver error, got {:?}", other),
    }
    assert_eq!(calls.resolves(), 0);
    assert_eq!(calls.close_input(), 1);
    assert_eq!(calls.containers_released(), 0);
}

#[test]
fn test_resolve_failure_closes_once() {
    let driver = MockDriver::new(movie()).failing_resolve(INVALID_DATA);
    let calls = driver.calls();

    let err = Prober::new(driver).probe_input("movie.mp4").unwrap_err();
    assert_eq!(err.status(), Some(INVALID_DATA));
    assert!(err.to_string().contains("Invalid data found when processing input"));
    assert_eq!(calls.close_input(), 1);
    assert_eq!(calls.containers_released(), 1);
    assert_eq!(calls.decoders_opened(), 0);
}

#[test]
fn test_decoder_open_failure_names_stream() {
    let container = mp4()
        .with_stream(MockStream::video(CodecId::H264, 640, 360))
        .with_stream(MockStream::audio(CodecId::AAC, 48000, 2, STEREO))
        .with_decoder(MockDecoder::new(CodecId::H264))
        .with_decoder(MockDecoder::new(CodecId::AAC).failing_open(DECODER_NOT_FOUND));
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    match Prober::new(driver).probe_input("x") {
        Err(AvProbeError::Driver { operation, status, .. }) => {
            assert_eq!(operation, "could not open codec for input stream 1");
            assert_eq!(status, DECODER_NOT_FOUND);
        }
        other => panic!("expected driver error, got {:?}", other),
    }
    // The context for stream 0 and the failed one for stream 1 are both released
    assert_eq!(calls.decoders_opened(), 1);
    assert_eq!(calls.decoders_released(), 2);
    assert_eq!(calls.close_input(), 1);
}

#[test]
fn test_decoder_allocation_failure() {
    let mut decoder = MockDecoder::new(CodecId::H264);
    decoder.alloc_fails = true;
    let container = mp4().with_stream(MockStream::video(CodecId::H264, 640, 360)).with_decoder(decoder);
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    let err = Prober::new(driver).probe_input("x").unwrap_err();
    assert!(matches!(err, AvProbeError::Allocation { .. }));
    assert_eq!(err.to_string(), "Could not allocate decoder context.");
    assert_eq!(calls.close_input(), 1);
}

#[test]
fn test_missing_decoder_is_not_an_error() {
    let container = mp4()
        .with_stream(MockStream::video(CodecId::VP9, 640, 360))
        .with_stream(MockStream::of_type(MediaType::Data, CodecId::NONE));
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    let result = Prober::new(driver).probe_input("x").unwrap();
    let video = result.streams[0].as_video().unwrap();
    assert_eq!(video.coded_width, 0);
    assert_eq!(video.info.max_bit_rate, 0);
    assert!(video.info.private_data.is_empty());
    assert!(matches!(result.streams[1], Stream::Other(_)));
    assert_eq!(calls.decoders_opened(), 0);
}

#[test]
fn test_codec_id_none_still_looks_up_a_decoder() {
    let container = mp4()
        .with_stream(MockStream::of_type(MediaType::Data, CodecId::NONE))
        .with_decoder(MockDecoder::new(CodecId::NONE));
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    let result = Prober::new(driver).probe_input("x").unwrap();
    assert!(matches!(result.streams[0], Stream::Other(_)));
    assert_eq!(calls.decoders_opened(), 1);
    assert_eq!(calls.decoders_released(), 1);
}

#[test]
fn test_unidentified_codec_skips_decoder() {
    let container = mp4()
        .with_stream(MockStream::video(CodecId::PROBE, 640, 360))
        .with_decoder(MockDecoder::new(CodecId::PROBE).with_coded_size(640, 368));
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    let result = Prober::new(driver).probe_input("x").unwrap();
    assert_eq!(result.streams[0].as_video().unwrap().coded_width, 0);
    assert!(calls.opened_time_bases().is_empty());
    assert_eq!(calls.decoders_opened(), 0);
}

#[test]
fn test_decoder_gets_stream_time_base_before_open() {
    let container = mp4()
        .with_stream(MockStream::video(CodecId::H264, 1280, 720).with_timing(Rational::new(1, 90000), 0, 0))
        .with_stream(MockStream::audio(CodecId::AAC, 44100, 2, STEREO))
        .with_decoder(MockDecoder::new(CodecId::H264))
        .with_decoder(MockDecoder::new(CodecId::AAC));
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    Prober::new(driver).probe_input("x").unwrap();
    assert_eq!(
        calls.opened_time_bases(),
        vec![Some(Rational::new(1, 90000)), Some(Rational::new(1, 44100))]
    );
}

#[test]
fn test_decoder_time_base_copied_even_when_open_fails() {
    let container = mp4()
        .with_stream(MockStream::video(CodecId::H264, 1280, 720).with_timing(Rational::new(1, 12800), 0, 0))
        .with_decoder(MockDecoder::new(CodecId::H264).failing_open(DECODER_NOT_FOUND));
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    let err = Prober::new(driver).probe_input("x").unwrap_err();
    match &err {
        AvProbeError::Driver { operation, status, .. } => {
            assert_eq!(operation, "could not open codec for input stream 0");
            assert_eq!(*status, DECODER_NOT_FOUND);
        }
        other => panic!("expected driver error, got {:?}", other),
    }
    assert!(err.to_string().contains("Decoder not found"));
    assert_eq!(calls.opened_time_bases(), vec![Some(Rational::new(1, 12800))]);
    assert_eq!(calls.decoders_released(), 1);
    assert_eq!(calls.close_input(), 1);
}

#[test]
fn test_private_data_keeps_exported_options_only() {
    let decoder = MockDecoder::new(CodecId::H264)
        .with_option("a53cc", Some("1"), true)
        .with_option("nal_length_size", Some("4"), true)
        .with_option("is_avc", Some("1"), false)
        .with_option("x264_build", None, true);
    let container = mp4()
        .with_stream(MockStream::video(CodecId::H264, 640, 360))
        .with_decoder(decoder);

    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    let private = &result.streams[0].info().private_data;
    assert_eq!(private.iter().collect::<Vec<_>>(), vec![("a53cc", "1"), ("nal_length_size", "4")]);
}

#[test]
fn test_decoder_fields_copied() {
    let mut decoder = MockDecoder::new(CodecId::H264).with_coded_size(1280, 736);
    decoder.max_bit_rate = 4_000_000;
    decoder.bits_per_raw_sample = 8;
    decoder.refs = 4;
    decoder.properties = 0x1;
    let mut audio_decoder = MockDecoder::new(CodecId::AC3);
    audio_decoder.properties = 0x2;

    let container = mp4()
        .with_stream(MockStream::video(CodecId::H264, 1280, 720))
        .with_stream(MockStream::audio(CodecId::AC3, 48000, 6, FIVE_POINT_ONE))
        .with_decoder(decoder)
        .with_decoder(audio_decoder);

    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    let video = result.streams[0].as_video().unwrap();
    assert_eq!(video.info.max_bit_rate, 4_000_000);
    assert_eq!(video.info.bits_per_raw_sample, 8);
    assert_eq!(video.info.codec_properties, 0x1);
    assert_eq!(video.refs, 4);
    assert_eq!((video.coded_width, video.coded_height), (1280, 736));

    let audio = result.streams[1].as_audio().unwrap();
    assert_eq!(audio.channel_layout_name.as_deref(), Some("5.1(side)"));
    // Decoder properties are only reported for video
    assert_eq!(audio.info.codec_properties, 0);
}

#[test]
fn test_unknown_aspect_ratio_stays_zero() {
    let container = mp4().with_stream(MockStream::video(CodecId::MPEG4, 720, 576));
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    let video = result.streams[0].as_video().unwrap();
    assert_eq!(video.sample_aspect_ratio, Rational::ZERO);
    assert_eq!(video.display_aspect_ratio, Rational::ZERO);
}

#[test]
fn test_anamorphic_display_aspect_ratio() {
    let container = mp4().with_stream(
        MockStream::video(CodecId::MPEG2VIDEO, 720, 576).with_sample_aspect_ratio(Rational::new(64, 45)),
    );
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    assert_eq!(result.streams[0].as_video().unwrap().display_aspect_ratio, Rational::new(16, 9));
}

#[test]
fn test_audio_without_layout_has_no_name() {
    let container = mp4().with_stream(MockStream::audio(CodecId::PCM_S16LE, 8000, 3, 0));
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    let audio = result.streams[0].as_audio().unwrap();
    assert_eq!(audio.channel_count, 3);
    assert_eq!(audio.channel_layout_mask, 0);
    assert_eq!(audio.channel_layout_name, None);
}

#[test]
fn test_zero_frame_rate_normalized() {
    let mut stream = MockStream::video(CodecId::MJPEG, 320, 240);
    stream.frame_rate = Rational::new(0, 0);
    stream.average_frame_rate = Rational::new(0, 0);
    let result = Prober::new(MockDriver::new(mp4().with_stream(stream))).probe_input("x").unwrap();
    assert_eq!(result.streams[0].info().frame_rate, Rational::ZERO);
    assert_eq!(result.streams[0].info().average_frame_rate, Rational::ZERO);
}

#[test]
fn test_missing_stream_record_keeps_index() {
    let container = mp4()
        .with_stream(MockStream::audio(CodecId::MP3, 44100, 2, STEREO))
        .with_missing_stream();
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    match &result.streams[1] {
        Stream::Other(info) => {
            assert_eq!(info.index, 1);
            assert_eq!(info.codec_type, MediaType::Unknown);
        }
        other => panic!("expected Other, got {:?}", other),
    }
}

#[test]
fn test_stream_ids_only_when_format_shows_them() {
    let mut stream = MockStream::video(CodecId::H264, 640, 360);
    stream.id = 0x100;

    let container = mp4().with_stream(stream.clone());
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    assert_eq!(result.streams[0].info().id, 0);

    let mut container = MockContainer::new("mpegts", "MPEG-TS (MPEG-2 Transport Stream)").with_stream(stream);
    container.format = Some(RawInputFormat {
        name: "mpegts".to_string(),
        long_name: "MPEG-TS (MPEG-2 Transport Stream)".to_string(),
        shows_ids: true,
        ..RawInputFormat::default()
    });
    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    assert_eq!(result.streams[0].info().id, 0x100);
}

#[test]
fn test_programs_and_chapters() {
    let container = mp4()
        .with_program(MockProgram {
            id: 1,
            program_num: 1,
            pmt_pid: 4096,
            pcr_pid: 256,
            metadata: vec![("service_name".to_string(), "Service01".to_string())],
        })
        .with_chapter(MockChapter {
            id: 0,
            time_base: Rational::new(1, 1000),
            start: 0,
            end: 5000,
            metadata: vec![("title".to_string(), "Intro".to_string())],
        })
        .with_chapter(MockChapter {
            id: 1,
            time_base: Rational::new(1, 1000),
            start: 5000,
            end: 10000,
            metadata: Vec::new(),
        });

    let result = Prober::new(MockDriver::new(container)).probe_input("x").unwrap();
    let program = &result.programs[0];
    assert_eq!((program.id, program.num, program.mapping_table_pid, program.clock_reference_pid), (1, 1, 4096, 256));
    assert_eq!(program.tags.get("service_name"), Some("Service01"));

    assert_eq!(result.chapters.len(), 2);
    assert_eq!(result.chapters[0].title(), Some("Intro"));
    assert_eq!(result.chapters[0].end, Some(Duration::seconds(5)));
    assert_eq!(result.chapters[1].start, Some(Duration::seconds(5)));
    assert_eq!(result.chapters[1].title(), None);
}

#[test]
fn test_duplicate_tags_fail_and_close() {
    let container = movie().with_tag("encoder", "again");
    let driver = MockDriver::new(container);
    let calls = driver.calls();

    match Prober::new(driver).probe_input("x") {
        Err(AvProbeError::DuplicateKey { key }) => assert_eq!(key, "encoder"),
        other => panic!("expected DuplicateKey, got {:?}", other),
    }
    assert_eq!(calls.close_input(), 1);
    assert_eq!(calls.decoders_released(), calls.decoders_opened());
}

#[test]
fn test_probe_reader_reports_size() {
    let mut data = b"\x1a\x45\xdf\xa3".to_vec();
    data.resize(10_000, 0);
    let mut cursor = Cursor::new(data);

    let driver = MockDriver::new(movie()).expecting_magic(b"\x1a\x45\xdf\xa3");
    let calls = driver.calls();
    let result = Prober::new(driver).probe_reader(&mut cursor).unwrap();

    assert_eq!(result.size, 10_000);
    assert_eq!(result.known_size(), Some(10_000));
    assert_eq!(calls.bytes_read(), 4096);
    assert_eq!(calls.last_buffer_size(), Some(4096));
    assert_eq!(calls.last_url().as_deref(), Some(""));
    assert_eq!(calls.close_input(), 1);
    // The caller's stream is still usable
    assert_eq!(cursor.position(), 4096);
}

#[test]
fn test_probe_reader_custom_buffer_size() {
    let mut cursor = Cursor::new(vec![0u8; 100]);
    let driver = MockDriver::new(movie());
    let calls = driver.calls();
    let options = ProbeOptions { io_buffer_size: 32 };

    Prober::with_options(driver, options).probe_reader(&mut cursor).unwrap();
    assert_eq!(calls.last_buffer_size(), Some(32));
    assert_eq!(calls.bytes_read(), 32);
}

#[test]
fn test_probe_reader_rejects_foreign_data() {
    let mut cursor = Cursor::new(b"not a media file".to_vec());
    let driver = MockDriver::new(movie()).expecting_magic(b"ftyp");
    let calls = driver.calls();

    let err = Prober::new(driver).probe_reader(&mut cursor).unwrap_err();
    assert_eq!(err.status(), Some(INVALID_DATA));
    assert_eq!(calls.close_input(), 1);
    assert_eq!(calls.containers_released(), 0);
}

#[test]
fn test_probe_forward_only_has_unknown_size() {
    let data = vec![0u8; 1000];
    let mut reader = &data[..];
    let result = Prober::new(MockDriver::new(movie())).probe_forward_only(&mut reader).unwrap();
    assert_eq!(result.size, 0);
    assert_eq!(result.known_size(), None);
    assert_eq!(result.streams.len(), 3);
}

#[test]
fn test_container_allocation_failure() {
    let mut cursor = Cursor::new(vec![0u8; 16]);
    let driver = MockDriver::new(movie()).failing_alloc();
    let calls = driver.calls();

    let err = Prober::new(driver).probe_reader(&mut cursor).unwrap_err();
    assert!(matches!(err, AvProbeError::Allocation { .. }));
    assert_eq!(calls.opens(), 0);
}

#[test]
fn test_probe_path_passes_absolute_path() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let driver = MockDriver::new(movie());
    let calls = driver.calls();

    Prober::new(driver).probe_path(file.path()).unwrap();
    assert_eq!(calls.last_url().as_deref(), file.path().to_str());
}

#[test]
fn test_validation_happens_before_the_driver() {
    let driver = MockDriver::new(movie());
    let calls = driver.calls();
    let prober = Prober::new(driver);

    assert!(prober.probe_path("").unwrap_err().is_validation());
    assert!(matches!(
        prober.probe_path("no/such/file.mkv"),
        Err(AvProbeError::NotFound { .. })
    ));
    let dir = tempfile::TempDir::new().unwrap();
    assert!(matches!(prober.probe_path(dir.path()), Err(AvProbeError::NotFound { .. })));
    assert!(prober.probe_http("ftp://example.com/a.mp4").unwrap_err().is_validation());
    assert!(prober.probe_http("example.com/a.mp4").unwrap_err().is_validation());
    assert!(prober.probe_uri("relative/path.mp4").unwrap_err().is_validation());
    assert!(prober.probe_input("").unwrap_err().is_validation());

    let mut cursor = Cursor::new(vec![0u8; 16]);
    let zero_buffer = Prober::with_options(MockDriver::new(movie()), ProbeOptions { io_buffer_size: 0 });
    assert!(zero_buffer.probe_reader(&mut cursor).unwrap_err().is_validation());

    assert_eq!(calls.opens(), 0);
    assert_eq!(calls.close_input(), 0);
}

#[test]
fn test_http_and_uri_inputs_reach_the_driver() {
    let driver = MockDriver::new(movie());
    let calls = driver.calls();
    let prober = Prober::new(driver);

    prober.probe_http("https://example.com/movie.mp4").unwrap();
    assert_eq!(calls.last_url().as_deref(), Some("https://example.com/movie.mp4"));

    prober.probe_uri("rtmp://example.com/live/stream").unwrap();
    assert_eq!(calls.last_url().as_deref(), Some("rtmp://example.com/live/stream"));

    prober.probe_http("HTTPS://Example.COM/my movie.mp4").unwrap();
    assert_eq!(calls.last_url().as_deref(), Some("https://example.com/my%20movie.mp4"));
    assert_eq!(calls.close_input(), 3);
}

#[test]
fn test_custom_visitor() {
    let driver = MockDriver::new(movie());
    let calls = driver.calls();

    let count = Prober::new(driver)
        .probe_input_with("x", |container: &MockContainer| -> AvResult<usize> { Ok(container.stream_count()) })
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(calls.decoders_opened(), 0);
    assert_eq!(calls.close_input(), 1);
}

#[test]
fn test_visitor_error_still_closes() {
    let driver = MockDriver::new(movie());
    let calls = driver.calls();

    let err = Prober::new(driver)
        .probe_input_with("x", |_: &MockContainer| -> AvResult<()> { Err(AvProbeError::validation("stop")) })
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(calls.close_input(), 1);
    assert_eq!(calls.containers_released(), 1);
}

#[test]
fn test_result_serializes() {
    let result = Prober::new(MockDriver::new(movie())).probe_input("x").unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["duration"], 10.0);
    assert_eq!(json["streams"][0]["kind"], "video");
    assert_eq!(json["streams"][1]["kind"], "audio");
    assert_eq!(json["streams"][2]["kind"], "subtitle");
    assert_eq!(json["tags"]["encoder"], "Lavf60.3.100");
}
