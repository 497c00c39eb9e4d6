use std::io::Read;

use pdfcmp_types::{PdfDict, PdfObject, PdfStream};
use tracing::warn;

use crate::error::{DocError, DocResult};

#[derive(Debug, Clone, Copy)]
struct DecodeParms {
    predictor: u32,
    colors: u32,
    bits_per_component: u32,
    columns: u32,
    early_change: bool,
}

impl Default for DecodeParms {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
            early_change: true,
        }
    }
}

const MAX_DECODE_PARMS: u32 = 100_000;

/// Decode a stream's payload through its whole `/Filter` chain.
///
/// Streams without a filter are returned as stored. A filter outside the
/// supported set (Flate, LZW, ASCIIHex, ASCII85, RunLength) yields
/// [`DocError::UnsupportedFilter`]; callers that only need a best-effort view
/// fall back to the raw bytes.
pub fn decode_stream(stream: &PdfStream) -> DocResult<Vec<u8>> {
    let filters = stream_filters(&stream.dict);
    let parms = stream_decode_parms(&stream.dict, filters.len());
    let mut data = stream.data.clone();
    for (idx, filter) in filters.iter().enumerate() {
        let p = parms.get(idx).copied().flatten().unwrap_or_default();
        data = decode_filter(&data, filter, p)?;
        if is_predicted_filter(filter) && p.predictor > 1 {
            data = apply_predictor(&data, p)?;
        }
    }
    Ok(data)
}

/// Filter names of a stream in application order, without the leading `/`.
pub fn stream_filters(dict: &PdfDict) -> Vec<String> {
    match dict.get("Filter") {
        Some(PdfObject::Name(n)) => vec![n.to_string_lossy()],
        Some(PdfObject::Array(arr)) => arr
            .iter()
            .filter_map(PdfObject::as_name)
            .map(|n| n.to_string_lossy())
            .collect(),
        _ => Vec::new(),
    }
}

fn stream_decode_parms(dict: &PdfDict, filter_count: usize) -> Vec<Option<DecodeParms>> {
    let mut out = vec![None; filter_count.max(1)];
    match dict.get("DecodeParms").or_else(|| dict.get("DP")) {
        Some(PdfObject::Dictionary(d)) => out[0] = Some(decode_parms_from_dict(d)),
        Some(PdfObject::Array(arr)) => {
            for (slot, o) in out.iter_mut().zip(arr) {
                if let PdfObject::Dictionary(d) = o {
                    *slot = Some(decode_parms_from_dict(d));
                }
            }
        }
        _ => {}
    }
    out
}

fn decode_parms_from_dict(dict: &PdfDict) -> DecodeParms {
    let defaults = DecodeParms::default();
    DecodeParms {
        predictor: dict_u32(dict, "Predictor").unwrap_or(defaults.predictor),
        colors: dict_u32(dict, "Colors").unwrap_or(defaults.colors),
        bits_per_component: dict_u32(dict, "BitsPerComponent").unwrap_or(defaults.bits_per_component),
        columns: dict_u32(dict, "Columns").unwrap_or(defaults.columns),
        early_change: dict_u32(dict, "EarlyChange").map_or(defaults.early_change, |v| v != 0),
    }
}

fn dict_u32(dict: &PdfDict, key: &str) -> Option<u32> {
    match dict.get(key)? {
        PdfObject::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => Some(*n as u32),
        _ => None,
    }
}

fn is_predicted_filter(filter: &str) -> bool {
    matches!(filter, "FlateDecode" | "Fl" | "LZWDecode" | "LZW")
}

fn decode_filter(data: &[u8], filter: &str, parms: DecodeParms) -> DocResult<Vec<u8>> {
    match filter {
        "FlateDecode" | "Fl" => decode_flate(data),
        "LZWDecode" | "LZW" => decode_lzw(data, parms.early_change),
        "ASCIIHexDecode" | "AHx" => Ok(decode_ascii_hex(data)),
        "ASCII85Decode" | "A85" => Ok(decode_ascii85(data)),
        "RunLengthDecode" | "RL" => Ok(decode_run_length(data)),
        other => Err(DocError::UnsupportedFilter(other.to_string())),
    }
}

fn decode_flate(data: &[u8]) -> DocResult<Vec<u8>> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|e| DocError::Decode {
        filter: "FlateDecode".into(),
        reason: e.to_string(),
    })?;
    Ok(out)
}

fn decode_lzw(data: &[u8], early_change: bool) -> DocResult<Vec<u8>> {
    let mut decoder = if early_change {
        weezl::decode::Decoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8)
    } else {
        weezl::decode::Decoder::new(weezl::BitOrder::Msb, 8)
    };
    let mut out = Vec::new();
    let result = decoder.into_vec(&mut out).decode_all(data);
    result.status.map_err(|e| DocError::Decode {
        filter: "LZWDecode".into(),
        reason: e.to_string(),
    })?;
    Ok(out)
}

fn decode_ascii_hex(data: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = data
        .iter()
        .copied()
        .take_while(|&b| b != b'>')
        .filter_map(hex_val)
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn decode_ascii85(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut tuple = Vec::with_capacity(5);
    let mut i = 0usize;
    while i < data.len() {
        let b = data[i];
        i += 1;
        if b == b'~' {
            break;
        }
        if b == b'z' && tuple.is_empty() {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if !(b'!'..=b'u').contains(&b) {
            continue;
        }
        tuple.push(b);
        if tuple.len() == 5 {
            out.extend_from_slice(&base85_word(&tuple).to_be_bytes());
            tuple.clear();
        }
    }
    if tuple.len() > 1 {
        let padding = 5 - tuple.len();
        tuple.resize(5, b'u');
        let bytes = base85_word(&tuple).to_be_bytes();
        out.extend_from_slice(&bytes[..4 - padding]);
    }
    out
}

fn base85_word(tuple: &[u8]) -> u32 {
    tuple
        .iter()
        .fold(0u32, |acc, &c| acc.wrapping_mul(85).wrapping_add((c - b'!') as u32))
}

fn decode_run_length(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < data.len() {
        let n = data[i];
        i += 1;
        match n {
            128 => break,
            0..=127 => {
                let count = n as usize + 1;
                let end = (i + count).min(data.len());
                out.extend_from_slice(&data[i..end]);
                i = end;
            }
            _ => {
                let Some(&b) = data.get(i) else { break };
                out.extend(std::iter::repeat(b).take(257 - n as usize));
                i += 1;
            }
        }
    }
    out
}

fn apply_predictor(data: &[u8], parms: DecodeParms) -> DocResult<Vec<u8>> {
    validate_decode_parms(parms)?;
    if parms.bits_per_component != 8 || parms.columns == 0 {
        return Ok(data.to_vec());
    }
    let bpp = parms.colors as usize;
    let row_len = parms.columns as usize * bpp;
    match parms.predictor {
        2 => Ok(apply_tiff_predictor(data, bpp, row_len)),
        10..=15 => Ok(apply_png_predictor(data, bpp, row_len)),
        _ => Ok(data.to_vec()),
    }
}

fn validate_decode_parms(parms: DecodeParms) -> DocResult<()> {
    if parms.colors > MAX_DECODE_PARMS
        || parms.bits_per_component > MAX_DECODE_PARMS
        || parms.columns > MAX_DECODE_PARMS
    {
        warn!(
            colors = parms.colors,
            bits = parms.bits_per_component,
            columns = parms.columns,
            "decode parameters out of range"
        );
        return Err(DocError::Decode {
            filter: "predictor".into(),
            reason: "decode parameters exceed safe limits".into(),
        });
    }
    Ok(())
}

fn apply_tiff_predictor(data: &[u8], bpp: usize, row_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks(row_len) {
        let mut row = chunk.to_vec();
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
        out.extend_from_slice(&row);
    }
    out
}

fn apply_png_predictor(data: &[u8], bpp: usize, row_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];
    for chunk in data.chunks(row_len + 1) {
        if chunk.len() < row_len + 1 {
            break;
        }
        let (tag, encoded) = (chunk[0], &chunk[1..]);
        let mut row = encoded.to_vec();
        for j in 0..row_len {
            let left = if j >= bpp { row[j - bpp] } else { 0 };
            let up = prev[j];
            let up_left = if j >= bpp { prev[j - bpp] } else { 0 };
            let delta = match tag {
                1 => left,
                2 => up,
                3 => ((left as u16 + up as u16) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => 0,
            };
            row[j] = row[j].wrapping_add(delta);
        }
        out.extend_from_slice(&row);
        prev = row;
    }
    out
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i32 + b as i32 - c as i32;
    let pa = (p - a as i32).abs();
    let pb = (p - b as i32).abs();
    let pc = (p - c as i32).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

pub(crate) fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(10 + b - b'a'),
        b'A'..=b'F' => Some(10 + b - b'A'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn stream(filter: PdfObject, data: Vec<u8>) -> PdfStream {
        PdfStream::new(PdfDict::new().with("Filter", filter), data)
    }

    #[test]
    fn unfiltered_stream_is_returned_as_is() {
        let s = PdfStream::new(PdfDict::new(), b"BT ET".to_vec());
        assert_eq!(decode_stream(&s).unwrap(), b"BT ET");
    }

    #[test]
    fn flate_roundtrip() {
        let s = stream(PdfObject::name("FlateDecode"), zlib(b"0 0 m 10 10 l S"));
        assert_eq!(decode_stream(&s).unwrap(), b"0 0 m 10 10 l S");
    }

    #[test]
    fn filter_chain_applies_in_order() {
        let hex: String = zlib(b"q Q").iter().map(|b| format!("{b:02x}")).collect();
        let s = stream(
            PdfObject::Array(vec![PdfObject::name("AHx"), PdfObject::name("Fl")]),
            format!("{hex}>").into_bytes(),
        );
        assert_eq!(decode_stream(&s).unwrap(), b"q Q");
    }

    #[test]
    fn ascii_hex_odd_digit_pads_with_zero() {
        assert_eq!(decode_ascii_hex(b"48 6 9 7>"), vec![0x48, 0x69, 0x70]);
    }

    #[test]
    fn ascii85_known_vector() {
        assert_eq!(decode_ascii85(b"87cURD]i,\"Ebo80~>"), b"Hello World!");
        assert_eq!(decode_ascii85(b"z~>"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn run_length_literal_and_repeat() {
        assert_eq!(decode_run_length(&[2, b'a', b'b', b'c', 254, b'z', 128]), b"abczzz");
    }

    #[test]
    fn png_up_predictor() {
        let mut dict = PdfDict::new().with("Filter", PdfObject::name("FlateDecode"));
        dict.insert(
            "DecodeParms",
            PdfDict::new().with("Predictor", 12i64).with("Columns", 2i64),
        );
        let raw = [2u8, 1, 2, 2, 1, 1];
        let s = PdfStream::new(dict, zlib(&raw));
        assert_eq!(decode_stream(&s).unwrap(), vec![1, 2, 2, 3]);
    }

    #[test]
    fn unsupported_filter_is_an_error() {
        let s = stream(PdfObject::name("DCTDecode"), vec![0xff, 0xd8]);
        assert!(matches!(decode_stream(&s), Err(DocError::UnsupportedFilter(f)) if f == "DCTDecode"));
    }

    #[test]
    fn corrupt_flate_is_a_decode_error() {
        let s = stream(PdfObject::name("FlateDecode"), b"not zlib".to_vec());
        assert!(matches!(decode_stream(&s), Err(DocError::Decode { .. })));
    }

    #[test]
    fn lzw_roundtrip() {
        let mut enc = weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
        let encoded = enc.encode(b"BT /F1 12 Tf ET").unwrap();
        let s = stream(PdfObject::name("LZWDecode"), encoded);
        assert_eq!(decode_stream(&s).unwrap(), b"BT /F1 12 Tf ET");
    }
}
