//! Content-type detection from magic bytes.
//!
//! Only the leading bytes are consulted; file extensions are ignored.

/// Number of leading bytes a sniffer ever looks at.
pub const SNIFF_LEN: usize = 512;

/// The only format the recognize endpoint accepts as-is.
pub const WAVE_CONTENT_TYPE: &str = "audio/wave";

pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Returns the MIME type for `header`, or `application/octet-stream`.
pub fn sniff_content_type(header: &[u8]) -> &'static str {
    let header = &header[..header.len().min(SNIFF_LEN)];

    if riff_form(header, b"RIFF", b"WAVE") {
        return WAVE_CONTENT_TYPE;
    }
    if riff_form(header, b"RIFF", b"AVI ") {
        return "video/avi";
    }
    if riff_form(header, b"FORM", b"AIFF") {
        return "audio/aiff";
    }
    if header.starts_with(b"ID3") || is_mpeg_frame_sync(header) {
        return "audio/mpeg";
    }
    if header.starts_with(b"OggS\x00") {
        return "application/ogg";
    }
    if header.starts_with(b"fLaC") {
        return "audio/flac";
    }
    if header.starts_with(b"MThd\x00\x00\x00\x06") {
        return "audio/midi";
    }
    if header.starts_with(b".snd") {
        return "audio/basic";
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return "video/webm";
    }
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"M4A " | b"M4B " => "audio/mp4",
            _ => "video/mp4",
        };
    }

    UNKNOWN_CONTENT_TYPE
}

fn riff_form(header: &[u8], container: &[u8; 4], form: &[u8; 4]) -> bool {
    header.len() >= 12 && &header[0..4] == container && &header[8..12] == form
}

// MPEG audio frames start with 11 set bits.
fn is_mpeg_frame_sync(header: &[u8]) -> bool {
    header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0
}
