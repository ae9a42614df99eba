use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};

use super::ParseError;

/// Upper bound on compression pointers followed while reading one name.
const MAX_POINTER_HOPS: usize = 16;

pub trait PacketComponent {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError>;
    fn read<E: Endianness>(&mut self, reader: &mut BitReader<&[u8], E>) -> Result<(), ParseError>;

    /// Read a component whose names may be compressed against `packet_buf`.
    fn read_with_buffer<E: Endianness>(
        &mut self,
        reader: &mut BitReader<&[u8], E>,
        _packet_buf: &[u8],
    ) -> Result<(), ParseError> {
        self.read(reader)
    }

    fn read_labels<E: Endianness>(
        &mut self,
        reader: &mut BitReader<&[u8], E>,
    ) -> Result<Vec<String>, ParseError> {
        self.read_labels_with_buffer(reader, None)
    }

    /// Labels come back with a trailing empty label for the root.
    fn read_labels_with_buffer<E: Endianness>(
        &mut self,
        reader: &mut BitReader<&[u8], E>,
        packet_buf: Option<&[u8]>,
    ) -> Result<Vec<String>, ParseError> {
        let mut labels = Vec::new();
        loop {
            let label_len = reader.read_var::<u8>(8)?;
            if label_len == 0 {
                labels.push(String::new());
                break;
            }
            if label_len & 0xC0 == 0xC0 {
                let low = reader.read_var::<u8>(8)?;
                let offset = (((label_len & 0x3F) as usize) << 8) | low as usize;
                let buf = packet_buf.ok_or(ParseError::InvalidLabel)?;
                read_labels_at(buf, offset, &mut labels)?;
                break;
            }
            if label_len > 63 {
                return Err(ParseError::InvalidLabel);
            }
            let mut buf = vec![0; label_len as usize];
            reader.read_bytes(&mut buf)?;
            labels.push(label_to_text(&buf));
        }

        Ok(labels)
    }

    fn write_labels<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
        labels: &[String],
    ) -> Result<(), ParseError> {
        for label in labels {
            let raw = label_from_text(label)?;
            if raw.len() > 63 {
                return Err(ParseError::InvalidLabel);
            }
            writer.write_var::<u8>(8, raw.len() as u8)?;
            writer.write_bytes(&raw)?;
        }
        // Names built without the root label still have to terminate.
        if labels.last().is_none_or(|l| !l.is_empty()) {
            writer.write_var::<u8>(8, 0)?;
        }

        Ok(())
    }
}

/// Follow a compression pointer chain starting at `offset` in `buf`.
fn read_labels_at(buf: &[u8], mut offset: usize, labels: &mut Vec<String>) -> Result<(), ParseError> {
    let mut hops = 0;
    loop {
        let label_len = *buf.get(offset).ok_or(ParseError::InvalidLabel)?;
        if label_len == 0 {
            labels.push(String::new());
            return Ok(());
        }
        if label_len & 0xC0 == 0xC0 {
            hops += 1;
            if hops > MAX_POINTER_HOPS {
                return Err(ParseError::InvalidLabel);
            }
            let low = *buf.get(offset + 1).ok_or(ParseError::InvalidLabel)?;
            offset = (((label_len & 0x3F) as usize) << 8) | low as usize;
            continue;
        }
        if label_len > 63 {
            return Err(ParseError::InvalidLabel);
        }
        let start = offset + 1;
        let end = start + label_len as usize;
        let raw = buf.get(start..end).ok_or(ParseError::InvalidLabel)?;
        labels.push(label_to_text(raw));
        offset = end;
    }
}

/// Presentation form of a label. Printable ASCII is kept as is; any other
/// octet, and `.` or `\`, becomes a `\DDD` decimal escape.
pub fn label_to_text(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for &octet in raw {
        if matches!(octet, 0x21..=0x7E) && octet != b'.' && octet != b'\\' {
            text.push(octet as char);
        } else {
            text.push_str(&format!("\\{:03}", octet));
        }
    }
    text
}

/// Octets of a label in presentation form.
///
/// `\DDD` is a decimal octet and `\X` is `X` taken literally.
pub fn label_from_text(text: &str) -> Result<Vec<u8>, ParseError> {
    let bytes = text.as_bytes();
    let mut raw = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] != b'\\' {
            raw.push(bytes[pos]);
            pos += 1;
            continue;
        }
        match bytes.get(pos + 1..pos + 4) {
            Some(digits) if digits.iter().all(u8::is_ascii_digit) => {
                let value = digits
                    .iter()
                    .fold(0u16, |acc, &d| acc * 10 + u16::from(d - b'0'));
                raw.push(u8::try_from(value).map_err(|_| ParseError::InvalidLabel)?);
                pos += 4;
            }
            _ => {
                raw.push(*bytes.get(pos + 1).ok_or(ParseError::InvalidLabel)?);
                pos += 2;
            }
        }
    }
    Ok(raw)
}
