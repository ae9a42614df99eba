use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};

use super::{ParseError, common::PacketComponent};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSHeader {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: bool,
    /// Authenticated data (RFC 4035)
    pub ad: bool,
    /// Checking disabled (RFC 4035)
    pub cd: bool,
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl PacketComponent for DNSHeader {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        writer.write_var::<u16>(16, self.id)?;
        writer.write_var::<u8>(1, self.qr as u8)?;
        writer.write_var::<u8>(4, self.opcode)?;
        writer.write_var::<u8>(1, self.aa as u8)?;
        writer.write_var::<u8>(1, self.tc as u8)?;
        writer.write_var::<u8>(1, self.rd as u8)?;
        writer.write_var::<u8>(1, self.ra as u8)?;
        writer.write_var::<u8>(1, self.z as u8)?;
        writer.write_var::<u8>(1, self.ad as u8)?;
        writer.write_var::<u8>(1, self.cd as u8)?;
        writer.write_var::<u8>(4, self.rcode)?;
        writer.write_var::<u16>(16, self.qdcount)?;
        writer.write_var::<u16>(16, self.ancount)?;
        writer.write_var::<u16>(16, self.nscount)?;
        writer.write_var::<u16>(16, self.arcount)?;
        Ok(())
    }

    fn read<E: Endianness>(&mut self, reader: &mut BitReader<&[u8], E>) -> Result<(), ParseError> {
        self.id = reader.read_var::<u16>(16)?;
        self.qr = reader.read_var::<u8>(1)? == 1;
        self.opcode = reader.read_var::<u8>(4)?;
        self.aa = reader.read_var::<u8>(1)? == 1;
        self.tc = reader.read_var::<u8>(1)? == 1;
        self.rd = reader.read_var::<u8>(1)? == 1;
        self.ra = reader.read_var::<u8>(1)? == 1;
        self.z = reader.read_var::<u8>(1)? == 1;
        self.ad = reader.read_var::<u8>(1)? == 1;
        self.cd = reader.read_var::<u8>(1)? == 1;
        self.rcode = reader.read_var::<u8>(4)?;
        self.qdcount = reader.read_var::<u16>(16)?;
        self.ancount = reader.read_var::<u16>(16)?;
        self.nscount = reader.read_var::<u16>(16)?;
        self.arcount = reader.read_var::<u16>(16)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream_io::BigEndian;

    #[test]
    fn test_flag_bit_positions() {
        let header = DNSHeader {
            id: 0xBEEF,
            rd: true,
            ad: true,
            cd: true,
            qdcount: 1,
            arcount: 1,
            ..Default::default()
        };

        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);
        header.write(&mut writer).unwrap();

        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[0..2], &[0xBE, 0xEF]);
        // RD is the low bit of the third octet, AD and CD sit just above RCODE
        assert_eq!(buf[2], 0x01);
        assert_eq!(buf[3], 0x30);

        let mut parsed = DNSHeader::default();
        let mut reader = BitReader::<_, BigEndian>::new(&buf[..]);
        parsed.read(&mut reader).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_truncation_flag() {
        let buf = [0x12, 0x34, 0x82, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut header = DNSHeader::default();
        let mut reader = BitReader::<_, BigEndian>::new(&buf[..]);
        header.read(&mut reader).unwrap();

        assert_eq!(header.id, 0x1234);
        assert!(header.qr);
        assert!(header.tc);
        assert!(!header.rd);
    }
}
