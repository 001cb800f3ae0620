use std::io::{Read, Seek, SeekFrom};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Picks the encoding of a UI dump from its leading bytes.
///
/// A BOM wins, then the XML declaration (which defaults to UTF-8 when it
/// names no encoding), then chardetng. `last` tells the detector whether
/// `buffer` holds the whole input or only a prefix whose final character may
/// be cut off.
pub fn detect_encoding_from_buffer(buffer: &[u8], last: bool,) -> &'static Encoding {
    if let Some((encoding, _bom_len,),) = Encoding::for_bom(buffer,) {
        return encoding;
    }
    if let Some(encoding,) = declared_encoding(buffer,) {
        return encoding;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(buffer, last,);
    detector.guess(None, true,)
}

/// Encoding named by a leading `<?xml ...?>` declaration, UTF-8 if it names
/// none. `None` when there is no readable declaration or the label is unknown.
fn declared_encoding(buffer: &[u8],) -> Option<&'static Encoding,> {
    let decl = buffer.strip_prefix(b"<?xml",)?;
    if !decl.first().is_some_and(u8::is_ascii_whitespace,) {
        return None;
    }
    let end = decl.windows(2,).position(|w| w == b"?>",)?;
    let decl = &decl[..end];

    let Some(pos,) = decl.windows(8,).position(|w| w == b"encoding",) else {
        return Some(UTF_8,);
    };
    let value = decl[pos + 8..].trim_ascii_start().strip_prefix(b"=",)?.trim_ascii_start();
    let quote = *value.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &value[1..];
    let close = value.iter().position(|&b| b == quote,)?;
    // An ASCII-readable declaration cannot be UTF-16; output_encoding maps that to UTF-8.
    Encoding::for_label(&value[..close],).map(Encoding::output_encoding,)
}

/// Decodes a whole fetched body. A BOM wins over sniffing and is stripped.
pub fn decode_to_string(bytes: &[u8],) -> String {
    let encoding = detect_encoding_from_buffer(bytes, true,);
    let (res, _, _,) = encoding.decode(bytes,);
    res.into_owned()
}

pub fn get_decoded_reader(
    file: std::fs::File,
) -> std::io::Result<encoding_rs_io::DecodeReaderBytes<std::fs::File, Vec<u8,>,>,> {
    let mut buffer = [0u8; 4096];

    // Sniff the first chunk
    let mut sniff_reader = &file;
    let bytes_read = sniff_reader.read(&mut buffer,)?;
    let encoding =
        detect_encoding_from_buffer(&buffer[..bytes_read], bytes_read < buffer.len(),);

    let mut file_to_reset = file;
    file_to_reset.seek(SeekFrom::Start(0,),)?;

    // A BOM still overrides the guess and is stripped.
    Ok(encoding_rs_io::DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding,),)
        .bom_override(true,)
        .build(file_to_reset,),)
}
