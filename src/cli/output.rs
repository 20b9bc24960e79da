//! Report rendering: JSON, YAML, or a short human-readable summary

use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::convert::time::as_seconds;
use crate::domain::model::{ProbeResult, Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Text,
}

/// Outcome of probing one input
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProbeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    pub fn success(input: String, result: ProbeResult) -> Self {
        Self {
            input,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(input: String, error: impl std::fmt::Display) -> Self {
        Self {
            input,
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

pub fn render(format: OutputFormat, reports: &[ProbeReport]) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(reports)? + "\n",
        OutputFormat::Yaml => serde_yaml::to_string(reports)?,
        OutputFormat::Text => {
            let mut out = String::new();
            for report in reports {
                render_text(&mut out, report)?;
            }
            out
        }
    };
    Ok(rendered)
}

fn render_text(out: &mut String, report: &ProbeReport) -> std::fmt::Result {
    writeln!(out, "Input: {}", report.input)?;
    if let Some(error) = &report.error {
        writeln!(out, "  error: {}", error)?;
    }
    let Some(result) = &report.result else {
        return Ok(());
    };

    write!(out, "  format: {} ({})", result.format_name, result.format_long_name)?;
    if let Some(duration) = &result.duration {
        write!(out, ", duration {:.3}s", as_seconds(duration))?;
    }
    if let Some(bit_rate) = result.known_bit_rate() {
        write!(out, ", {} b/s", bit_rate)?;
    }
    if let Some(size) = result.known_size() {
        write!(out, ", {} bytes", size)?;
    }
    writeln!(out)?;

    for (key, value) in result.tags.iter() {
        writeln!(out, "    {}: {}", key, value)?;
    }

    for program in &result.programs {
        writeln!(out, "  program {} (id {}, pmt {})", program.num, program.id, program.mapping_table_pid)?;
    }

    for chapter in &result.chapters {
        let start = chapter.start.as_ref().map(as_seconds).unwrap_or_default();
        let end = chapter.end.as_ref().map(as_seconds).unwrap_or_default();
        write!(out, "  chapter {}: {:.3}s - {:.3}s", chapter.id, start, end)?;
        if let Some(title) = chapter.title() {
            write!(out, " \"{}\"", title)?;
        }
        writeln!(out)?;
    }

    for stream in &result.streams {
        writeln!(out, "  {}", stream_line(stream))?;
    }
    Ok(())
}

fn stream_line(stream: &Stream) -> String {
    let info = stream.info();
    let mut line = format!(
        "#{} {}: {}",
        info.index,
        stream.codec_type().as_str(),
        info.codec_name.as_deref().unwrap_or("unknown")
    );
    if let Some(profile) = &info.profile_name {
        let _ = write!(line, " ({})", profile);
    }
    if let Some(language) = stream.language() {
        let _ = write!(line, " [{}]", language);
    }

    match stream {
        Stream::Video(video) => {
            let _ = write!(line, ", {}x{}", video.width, video.height);
            if !video.sample_aspect_ratio.is_zero() {
                let _ = write!(
                    line,
                    " [SAR {} DAR {}]",
                    video.sample_aspect_ratio, video.display_aspect_ratio
                );
            }
            if let Some(pixel_format) = &video.pixel_format {
                let _ = write!(line, ", {}", pixel_format);
            }
            if let Some(fps) = info.average_frame_rate.to_f64() {
                let _ = write!(line, ", {:.2} fps", fps);
            }
        }
        Stream::Audio(audio) => {
            let _ = write!(line, ", {} Hz", audio.sample_rate);
            match &audio.channel_layout_name {
                Some(layout) => {
                    let _ = write!(line, ", {}", layout);
                }
                None => {
                    let _ = write!(line, ", {} channels", audio.channel_count);
                }
            }
            if let Some(sample_format) = &audio.sample_format {
                let _ = write!(line, ", {}", sample_format);
            }
        }
        Stream::Subtitle(subtitle) if subtitle.width > 0 => {
            let _ = write!(line, ", {}x{}", subtitle.width, subtitle.height);
        }
        Stream::Subtitle(_) | Stream::Other(_) => {}
    }

    let flags = info.disposition.names();
    if !flags.is_empty() {
        let _ = write!(line, " ({})", flags.join(", "));
    }
    line
}
