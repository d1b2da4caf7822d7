//! Shared harness for normalizer integration tests.
//!
//! [`FakeTools`] writes small shell scripts into a temporary directory and
//! points a [`ToolPaths`] at them, so the full probe pipeline runs without
//! file, ffprobe, identify or pdfinfo installed.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use mediaprobe_core::{MetadataNormalizer, Tool, ToolPaths};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub struct FakeTools {
    pub dir: TempDir,
    paths: ToolPaths,
}

impl FakeTools {
    /// Every tool fails loudly until replaced, so an unexpected invocation
    /// shows up as a test failure.
    pub fn new() -> Self {
        let mut tools = Self {
            dir: tempfile::tempdir().unwrap(),
            paths: ToolPaths::from_path_env(),
        };
        for tool in Tool::ALL {
            tools.failing(tool, &format!("{} should not have been called", tool.name()));
        }
        tools
    }

    /// Install a script for `tool` whose body is `body`.
    pub fn script(&mut self, tool: Tool, body: &str) -> &mut Self {
        let path = self.dir.path().join(tool.name());
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        self.paths.set(tool, path);
        self
    }

    /// Install a tool that prints `stdout` verbatim.
    pub fn printing(&mut self, tool: Tool, stdout: &str) -> &mut Self {
        self.script(tool, &format!("cat <<'MEDIAPROBE_EOF'\n{stdout}\nMEDIAPROBE_EOF"))
    }

    /// Install a tool that writes `message` to stderr and exits non-zero.
    pub fn failing(&mut self, tool: Tool, message: &str) -> &mut Self {
        self.script(tool, &format!("echo '{message}' >&2\nexit 1"))
    }

    /// Install a `file` that answers `mime` for `--mime-type`, `encoding` for
    /// `--mime-encoding`, `description` for the plain description and
    /// `extended` for `-k`.
    pub fn file(&mut self, mime: &str, encoding: &str, description: &str, extended: &str) -> &mut Self {
        self.script(
            Tool::File,
            &format!(
                r#"case "$1 $2" in
  "--brief --mime-type") echo "{mime}" ;;
  "--brief --mime-encoding") echo "{encoding}" ;;
  "--brief --dereference") echo "{description}" ;;
  "-k --dereference") echo "{extended}" ;;
  *) echo "unexpected arguments: $*" >&2; exit 2 ;;
esac"#
            ),
        )
    }

    /// Shorthand for a `file` that only needs to classify.
    pub fn mime(&mut self, mime: &str) -> &mut Self {
        self.file(mime, "binary", "data", "data")
    }

    pub fn normalizer(&self) -> MetadataNormalizer {
        MetadataNormalizer::new(self.paths.clone())
    }

    /// Create a file with the given contents in a separate directory from
    /// the fake tools.
    pub fn fixture(&self, name: &str, contents: &[u8]) -> PathBuf {
        let dir = self.dir.path().join("fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Create a zip fixture with the given members.
    pub fn zip_fixture(&self, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = self.fixture(name, b"");
        write_zip(&path, members);
        path
    }
}

pub fn write_zip(path: &Path, members: &[(&str, &str)]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, body) in members {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub const FFPROBE_MKV: &str = r#"{
    "streams": [
        {
            "index": 0,
            "codec_name": "hevc",
            "codec_type": "video",
            "profile": "Main 10",
            "width": 3840,
            "height": 2160,
            "sample_aspect_ratio": "1:1",
            "display_aspect_ratio": "16:9",
            "pix_fmt": "yuv420p10le",
            "color_space": "bt2020nc",
            "color_transfer": "smpte2084",
            "r_frame_rate": "24000/1001",
            "tags": {"DURATION": "00:10:00.000000000"}
        },
        {
            "index": 1,
            "codec_name": "eac3",
            "codec_type": "audio",
            "sample_fmt": "fltp",
            "sample_rate": "48000",
            "channels": 6,
            "channel_layout": "5.1(side)",
            "bits_per_sample": 0,
            "bit_rate": "640000",
            "tags": {"language": "eng", "DURATION": "00:10:00.000000000"}
        },
        {
            "index": 2,
            "codec_name": "subrip",
            "codec_type": "subtitle",
            "tags": {"language": "eng"}
        },
        {
            "index": 3,
            "codec_name": "aac",
            "codec_type": "audio",
            "sample_fmt": "fltp",
            "sample_rate": "44100",
            "channels": 1,
            "duration": "599.500000"
        }
    ],
    "format": {
        "filename": "movie.mkv",
        "nb_streams": 4,
        "format_name": "matroska,webm",
        "duration": "600.042000",
        "size": "1024",
        "tags": {"title": "Test Movie", "ENCODER": "Lavf60.3.100"}
    }
}"#;

pub const FFPROBE_MPEG_PS: &str = r#"{
    "streams": [
        {
            "index": 0,
            "codec_name": "mpeg2video",
            "codec_type": "video",
            "width": 720,
            "height": 480,
            "sample_aspect_ratio": "8:9",
            "pix_fmt": "yuv420p",
            "r_frame_rate": "30000/1001",
            "bit_rate": "8000000"
        },
        {
            "index": 1,
            "codec_name": "mp2",
            "codec_type": "audio",
            "sample_fmt": "s16p",
            "sample_rate": "48000",
            "channels": 2,
            "bit_rate": "224000"
        }
    ],
    "format": {
        "format_name": "mpeg",
        "duration": "30.000000"
    }
}"#;

pub const IDENTIFY_TWO_FRAMES: &str = r#"{
    "dimensions": {
        "width": 640,
        "height": 480,
        "resolution": {
            "horizontal": 72,
            "vertical": 72,
            "unit": "PixelsPerInch"
        }
    },
    "pixel_type": "srgb",
    "codec": "TIFF",
    "bit_depth": 8,
    "compression": "LZW",
    "color_profile": ""
},{
    "dimensions": {
        "width": 160,
        "height": 120,
        "resolution": {
            "horizontal": 0,
            "vertical": 0,
            "unit": "Undefined"
        }
    },
    "pixel_type": "gray",
    "codec": "TIFF",
    "bit_depth": 16,
    "compression": "None",
    "color_profile": "Dot Gain 20%"
},"#;
