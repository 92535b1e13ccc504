//! Stream filter decoding, needed by the xref-stream and object-stream
//! collaborators (both carry `/Filter FlateDecode` almost universally) as
//! well as by ordinary content streams. Adapted from the teacher's
//! `Stream::decompressed_content`/`decompress_predictor` in `object.rs`.

pub mod png;

use std::cmp::max;
use std::io::Read;

use flate2::read::ZlibDecoder;
use log::warn;

use crate::error::{Error, Result};
use crate::object::Dictionary;

/// Decode every filter named in `dict`'s `/Filter` (single name or array, in
/// the order they were applied) against `content`. Filters this crate has no
/// decoder for are passed through unchanged with a warning rather than
/// failing the whole parse — a corrupt/exotic filter on one stream should
/// not prevent the rest of the document from being read.
pub fn decode_stream(dict: &Dictionary, content: &[u8]) -> Result<Vec<u8>> {
    let Some(filter) = dict.get_opt(b"Filter") else {
        return Ok(content.to_vec());
    };
    let names: Vec<Vec<u8>> = if let Ok(name) = filter.as_name() {
        vec![name.to_vec()]
    } else if let Ok(items) = filter.as_array() {
        items.iter().filter_map(|v| v.as_name().ok().map(|n| n.to_vec())).collect()
    } else {
        return Ok(content.to_vec());
    };
    let params = decode_params_list(dict, names.len());

    let mut current = content.to_vec();
    for (i, name) in names.iter().enumerate() {
        let this_params = params.get(i).and_then(|p| p.as_ref());
        current = match name.as_slice() {
            b"FlateDecode" | b"Fl" => decompress_zlib(&current, this_params)?,
            b"LZWDecode" | b"LZW" => decompress_lzw(&current, this_params)?,
            b"ASCII85Decode" | b"A85" => decode_ascii85(&current)?,
            other => {
                warn!("no decoder for filter /{}, passing its content through unchanged", String::from_utf8_lossy(other));
                current
            }
        };
    }
    Ok(current)
}

/// `/DecodeParms` can be a single dict (applies to the one filter) or an
/// array parallel to `/Filter`.
fn decode_params_list(dict: &Dictionary, filter_count: usize) -> Vec<Option<Dictionary>> {
    match dict.get_opt(b"DecodeParms").or_else(|| dict.get_opt(b"DP")) {
        Some(v) => {
            if let Ok(d) = v.as_dict() {
                vec![Some(d.clone()); filter_count]
            } else if let Ok(items) = v.as_array() {
                items.iter().map(|item| item.as_dict().ok().cloned()).collect()
            } else {
                vec![None; filter_count]
            }
        }
        None => vec![None; filter_count],
    }
}

fn decompress_zlib(input: &[u8], params: Option<&Dictionary>) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut decoder = ZlibDecoder::new(input);
    if !input.is_empty() {
        decoder.read_to_end(&mut output).unwrap_or_else(|err| {
            warn!("zlib stream did not decode cleanly: {err}");
            0
        });
    }
    decompress_predictor(output, params)
}

fn decompress_lzw(input: &[u8], params: Option<&Dictionary>) -> Result<Vec<u8>> {
    use weezl::{decode::Decoder, BitOrder};
    const MIN_BITS: u8 = 9;

    let early_change = params
        .and_then(|p| p.get(b"EarlyChange").ok())
        .and_then(|v| v.as_i64().ok())
        .map(|v| v != 0)
        .unwrap_or(true);

    let mut decoder = if early_change {
        Decoder::with_tiff_size_switch(BitOrder::Msb, MIN_BITS - 1)
    } else {
        Decoder::new(BitOrder::Msb, MIN_BITS - 1)
    };

    let mut output = vec![];
    let result = decoder.into_stream(&mut output).decode_all(input);
    if let Err(err) = result.status {
        warn!("LZW stream did not decode cleanly: {err}");
    }
    decompress_predictor(output, params)
}

fn decompress_predictor(mut data: Vec<u8>, params: Option<&Dictionary>) -> Result<Vec<u8>> {
    if let Some(params) = params {
        let predictor = params.get(b"Predictor").and_then(|v| v.as_i64()).unwrap_or(1);
        if (10..=15).contains(&predictor) {
            let pixels_per_row = max(1, params.get(b"Columns").and_then(|v| v.as_i64()).unwrap_or(1)) as usize;
            let colors = max(1, params.get(b"Colors").and_then(|v| v.as_i64()).unwrap_or(1)) as usize;
            let bits = max(8, params.get(b"BitsPerComponent").and_then(|v| v.as_i64()).unwrap_or(8)) as usize;
            let bytes_per_pixel = colors * bits / 8;
            data = png::decode_frame(&data, bytes_per_pixel, pixels_per_row)?;
        }
    }
    Ok(data)
}

fn decode_ascii85(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = vec![];
    let mut buffer: u32 = 0;
    let mut count = 0;
    let input_no_eod = if input.len() >= 2 && &input[input.len() - 2..] == b"~>" {
        &input[..input.len() - 2]
    } else {
        input
    };
    for &ch in input_no_eod {
        if ch == b'z' {
            if count != 0 {
                return Err(Error::StreamLengthError("ASCII85: 'z' inside a group".into()));
            }
            output.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if ch.is_ascii_whitespace() {
            continue;
        }
        if !(b'!'..=b'u').contains(&ch) {
            break;
        }
        buffer = buffer
            .checked_mul(85)
            .ok_or_else(|| Error::StreamLengthError("ASCII85: multiplication overflow".into()))?;
        buffer += (ch - b'!') as u32;
        count += 1;
        if count == 5 {
            output.extend_from_slice(&buffer.to_be_bytes());
            buffer = 0;
            count = 0;
        }
    }
    if count > 0 {
        for _ in count..5 {
            buffer = buffer
                .checked_mul(85)
                .ok_or_else(|| Error::StreamLengthError("ASCII85: multiplication overflow".into()))?;
            buffer += 84;
        }
        let bytes = buffer.to_be_bytes();
        output.extend_from_slice(&bytes[..count - 1]);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn passthrough_without_filter() {
        let dict = Dictionary::new();
        assert_eq!(decode_stream(&dict, b"raw bytes").unwrap(), b"raw bytes");
    }

    #[test]
    fn flate_roundtrip() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(b"hello xref stream").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut dict = Dictionary::new();
        dict.set("Filter", crate::object::ObjectValue::Name(b"FlateDecode".to_vec()));
        let out = decode_stream(&dict, &compressed).unwrap();
        assert_eq!(out, b"hello xref stream");
    }
}
