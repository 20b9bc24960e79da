// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::error::AvProbeError;
    use chrono::Duration;

    fn tagged(pairs: &[(&str, &str)]) -> Tags {
        Tags::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_rational_reduce_exact() {
        assert_eq!(Rational::reduce(1920, 1080, 1024 * 1024), (Rational::new(16, 9), true));
        assert_eq!(Rational::reduce(720 * 64, 576 * 45, 1024 * 1024), (Rational::new(16, 9), true));
        assert_eq!(Rational::reduce(30000, 1001, 1024 * 1024), (Rational::new(30000, 1001), true));
    }

    #[test]
    fn test_rational_reduce_sign() {
        assert_eq!(Rational::reduce(-4, 6, 1024).0, Rational::new(-2, 3));
        assert_eq!(Rational::reduce(4, -6, 1024).0, Rational::new(-2, 3));
    }

    #[test]
    fn test_rational_reduce_clamps_terms() {
        assert_eq!(Rational::reduce(1_000_000, 3, 100), (Rational::new(100, 1), false));
    }

    #[test]
    fn test_rational_basics() {
        assert_eq!(Rational::default(), Rational::ZERO);
        assert!(Rational::new(0, 1001).is_zero());
        assert_eq!(Rational::new(1, 0).to_f64(), None);
        assert_eq!(Rational::new(30000, 1001).to_string(), "30000/1001");
    }

    #[test]
    fn test_tags_keep_insertion_order() {
        let tags = tagged(&[("title", "Intro"), ("artist", "Someone"), ("album", "Demo")]);
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["title", "artist", "album"]);
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_tags_reject_duplicates() {
        let mut tags = tagged(&[("title", "A")]);
        match tags.try_insert("title", "B") {
            Err(AvProbeError::DuplicateKey { key }) => assert_eq!(key, "title"),
            other => panic!("expected DuplicateKey, got {:?}", other),
        }
        assert_eq!(tags.get("title"), Some("A"));
    }

    #[test]
    fn test_tags_set_overwrites_in_place() {
        let mut tags = tagged(&[("a", "1"), ("b", "2")]);
        tags.set("a", "3");
        tags.set("c", "4");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2"), ("c", "4")]);
    }

    #[test]
    fn test_tags_case_insensitive_lookup() {
        let tags = tagged(&[("ENCODER", "Lavf60.3.100")]);
        assert_eq!(tags.get("encoder"), None);
        assert_eq!(tags.get_ignore_case("encoder"), Some("Lavf60.3.100"));
    }

    #[test]
    fn test_tags_serde() {
        let tags = tagged(&[("z", "1"), ("a", "2")]);
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
        assert_eq!(serde_json::from_str::<Tags>(&json).unwrap(), tags);
        assert!(serde_json::from_str::<Tags>(r#"{"a":"1","a":"2"}"#).is_err());
    }

    #[test]
    fn test_probe_result_accessors() {
        let result = ProbeResult {
            tags: tagged(&[("Encoder", "Lavf")]),
            streams: vec![
                Stream::Video(VideoStream::default()),
                Stream::Audio(AudioStream {
                    info: StreamInfo {
                        index: 1,
                        ..StreamInfo::default()
                    },
                    ..AudioStream::default()
                }),
                Stream::Audio(AudioStream::default()),
                Stream::Other(StreamInfo::default()),
            ],
            ..ProbeResult::default()
        };
        assert_eq!(result.encoder(), Some("Lavf"));
        assert_eq!(result.videos().count(), 1);
        assert_eq!(result.audios().count(), 2);
        assert_eq!(result.subtitles().count(), 0);
        assert_eq!(result.known_size(), None);
        assert_eq!(result.known_bit_rate(), None);
    }

    #[test]
    fn test_stream_accessors() {
        let stream = Stream::Subtitle(SubtitleStream {
            info: StreamInfo {
                index: 2,
                codec_type: MediaType::Subtitle,
                tags: tagged(&[("LANGUAGE", "fre"), ("title", "Forced")]),
                disposition: Disposition(Disposition::DEFAULT | Disposition::FORCED),
                ..StreamInfo::default()
            },
            ..SubtitleStream::default()
        });
        assert_eq!(stream.index(), 2);
        assert_eq!(stream.codec_type(), MediaType::Subtitle);
        assert_eq!(stream.language(), Some("fre"));
        assert_eq!(stream.title(), Some("Forced"));
        assert!(stream.as_subtitle().is_some());
        assert!(stream.as_video().is_none());
        assert_eq!(stream.info().disposition.names(), vec!["default", "forced"]);
    }

    #[test]
    fn test_chapter_title() {
        let chapter = Chapter {
            tags: tagged(&[("Title", "Opening")]),
            ..Chapter::default()
        };
        assert_eq!(chapter.title(), Some("Opening"));
    }

    #[test]
    fn test_media_type_from_raw() {
        assert_eq!(MediaType::from_raw(0), MediaType::Video);
        assert_eq!(MediaType::from_raw(3), MediaType::Subtitle);
        assert_eq!(MediaType::from_raw(-1), MediaType::Unknown);
        assert_eq!(MediaType::from_raw(42), MediaType::Unknown);
    }

    #[test]
    fn test_codec_id_unidentified() {
        assert!(!CodecId::NONE.is_unidentified());
        assert!(CodecId::PROBE.is_unidentified());
        assert!(!CodecId::H264.is_unidentified());
    }

    #[test]
    fn test_stream_serializes_kind_and_flattened_fields() {
        let stream = Stream::Video(VideoStream {
            info: StreamInfo {
                index: 0,
                codec_name: Some("h264".to_string()),
                codec_type: MediaType::Video,
                start_time: Some(Duration::zero()),
                duration: Some(Duration::milliseconds(1500)),
                ..StreamInfo::default()
            },
            width: 640,
            height: 480,
            ..VideoStream::default()
        });

        let value = serde_json::to_value(&stream).unwrap();
        assert_eq!(value["kind"], "video");
        assert_eq!(value["codec_name"], "h264");
        assert_eq!(value["width"], 640);
        assert_eq!(value["start_time"], 0.0);
        assert_eq!(value["duration"], 1.5);
        assert_eq!(value["sample_aspect_ratio"]["den"], 1);

        let back: Stream = serde_json::from_value(value).unwrap();
        assert_eq!(back, stream);
    }

    #[test]
    fn test_absent_times_serialize_as_null() {
        let value = serde_json::to_value(ProbeResult::default()).unwrap();
        assert!(value["start_time"].is_null());
        assert!(value["duration"].is_null());
    }
}
